//! Value types shared by descriptors, the repository and the filter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Screenshot identifier: lowercase hex SHA-1 of the stored bytes
pub type ScreenshotId = String;

/// Pixel dimensions of a stored item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImgSize {
    pub x: i32,
    pub y: i32,
}

impl ImgSize {
    pub const UNKNOWN: ImgSize = ImgSize { x: -1, y: -1 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

/// Kind of media held by a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MediaType {
    Image,
    Video,
    #[default]
    Unknown,
}

/// Provenance captured once at import time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInfo {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub process: String,
    #[serde(default)]
    pub os_version: String,
    /// Older repositories wrote this field as `clrVersion`
    #[serde(default, alias = "clrVersion")]
    pub runtime_version: String,
    #[serde(default)]
    pub original_file_name: Option<String>,
}

impl ImportInfo {
    /// Capture provenance of the current process
    ///
    /// The hostname comes from `HOSTNAME`, then `COMPUTERNAME`, then
    /// `/etc/hostname`. Hosts with none of these (macOS shells usually do not
    /// export `HOSTNAME`) record an empty hostname, which indexes like any
    /// other value.
    pub fn current() -> Self {
        let username = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_default();

        let hostname = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .ok()
            .or_else(|| {
                std::fs::read_to_string("/etc/hostname")
                    .ok()
                    .map(|s| s.trim().to_string())
            })
            .unwrap_or_default();

        let process = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();

        Self {
            username,
            hostname,
            process,
            os_version: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
            runtime_version: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            original_file_name: None,
        }
    }

    pub fn with_original_file_name(mut self, name: impl Into<String>) -> Self {
        self.original_file_name = Some(name.into());
        self
    }
}

/// One caller-defined metadata pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntry {
    pub key: String,
    pub value: Value,
}

/// Ordered, open-ended caller metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Custom {
    #[serde(default)]
    pub entries: Vec<CustomEntry>,
}

impl Custom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping existing ones (keys may repeat)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push(CustomEntry {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
