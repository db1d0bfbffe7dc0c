//! Shared test utilities for integration tests
//!
//! Centralizes environment isolation and in-memory media fixtures so every
//! test sees the same setup.

use chrono::{DateTime, FixedOffset};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use screenshotr::types::ImportInfo;
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "SCREENSHOTR_ENV",
    "SCREENSHOTR__REPOSITORY__THUMBNAIL_SIZE",
    "SCREENSHOTR__FILTER__TAKE",
    "SCREENSHOTR__FILTER__SORTING",
];

/// Environment variable state to restore after test
struct EnvState(Vec<(&'static str, Option<String>)>);

impl EnvState {
    fn capture() -> Self {
        Self(
            ISOLATED_VARS
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        )
    }

    fn restore(self) {
        for (name, value) in self.0 {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointing into `test_dir`
///
/// All `SCREENSHOTR_*` variables the tests touch are cleared first and the
/// original environment is restored afterwards. `vars` are set for the
/// duration of the call.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_config_home = test_dir.path().join("xdg");
    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_config_home).unwrap();
    std::fs::create_dir_all(&test_home).unwrap();

    for name in ISOLATED_VARS {
        std::env::remove_var(name);
    }
    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_config_home.to_str().unwrap());
    for (name, value) in vars {
        std::env::set_var(name, value);
    }

    let result = f();

    env_state.restore();

    result
}

/// A small PNG whose bytes differ per `seed`
pub fn png(seed: u8, width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([seed, 128, 255 - seed])));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn at(ts: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(ts).unwrap()
}

pub fn origin(user: &str, host: &str, process: &str) -> ImportInfo {
    ImportInfo {
        username: user.into(),
        hostname: host.into(),
        process: process.into(),
        os_version: "test-os".into(),
        runtime_version: "test".into(),
        original_file_name: None,
    }
}
