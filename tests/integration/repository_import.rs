//! Integration tests for importing into the content store

use screenshotr::error::{MediaError, RepositoryError};
use screenshotr::media::{ImageBackend, MediaBackend, MediaInfo};
use screenshotr::repository::{ImportOutcome, ImportRequest, Repository};
use screenshotr::screenshot::id::compute_screenshot_id;
use screenshotr::store::StoreOptions;
use screenshotr::types::{Custom, ImgSize, MediaType};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use crate::integration::{at, origin, png};

#[test]
fn test_import_layout_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();
    let buffer = png(7, 40, 20);

    let (repo, outcome) = repo
        .import(
            &buffer,
            ImportRequest::new()
                .timestamp(at("2023-04-05T06:07:08+00:00"))
                .tags(["work", "bug"])
                .custom(Custom::new().with("ticket", 42))
                .import_info(origin("alice", "desk", "snip.exe").with_original_file_name("bug.png")),
        )
        .unwrap();
    let s = outcome.screenshot().unwrap();
    let id = compute_screenshot_id(&buffer);
    let day = temp_dir.path().join("data/2023/04/05");

    assert_eq!(repo.count(), 1);
    assert_eq!(s.size, ImgSize::new(40, 20));
    assert_eq!(s.media_type, MediaType::Image);
    assert_eq!(fs::read(day.join(format!("20230405-060708-{id}.jpg"))).unwrap(), buffer);

    let thumb = image::open(day.join(format!("20230405-060708-{id}.thumb.png"))).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (256, 256));

    let sidecar: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(day.join(format!("20230405-060708-{id}.json"))).unwrap())
            .unwrap();
    assert_eq!(sidecar["id"], id.as_str());
    assert_eq!(sidecar["bytes"], buffer.len() as u64);
    assert_eq!(sidecar["importInfo"]["username"], "alice");
    assert_eq!(sidecar["importInfo"]["originalFileName"], "bug.png");
    assert_eq!(sidecar["tags"], serde_json::json!(["bug", "work"]));
    assert_eq!(sidecar["custom"]["entries"][0]["key"], "ticket");
}

#[test]
fn test_duplicate_detected_after_restart() {
    let temp_dir = TempDir::new().unwrap();
    let buffer = png(9, 8, 8);

    let repo = Repository::init(temp_dir.path()).unwrap();
    let (_, first) = repo.import(&buffer, ImportRequest::new().tags(["x"])).unwrap();

    let reopened = Repository::init(temp_dir.path()).unwrap();
    let (after, second) = reopened.import(&buffer, ImportRequest::new().tags(["y"])).unwrap();

    assert!(second.is_duplicate());
    assert_eq!(first.screenshot().unwrap().id, second.screenshot().unwrap().id);
    assert!(second.screenshot().unwrap().tags.contains("x"));
    assert_eq!(after.count(), 1);
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

#[test]
fn test_duplicate_import_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let buffer = png(11, 16, 16);
    let when = at("2022-06-07T08:09:10+00:00");
    let day = temp_dir.path().join("data/2022/06/07");
    let aggregate = temp_dir.path().join("data/2022/06/07.json");

    let repo = Repository::init(temp_dir.path()).unwrap();
    let (repo, _) = repo.import(&buffer, ImportRequest::new().timestamp(when)).unwrap();
    let (_, again) = repo
        .import(&buffer, ImportRequest::new().timestamp(at("2024-01-01T00:00:00+00:00")))
        .unwrap();
    assert!(again.is_duplicate());

    let files = files_in(&day);
    assert_eq!(files.len(), 3, "one full-res, one thumbnail, one sidecar: {files:?}");
    assert!(!aggregate.exists());
    assert!(!temp_dir.path().join("data/2024").exists());

    // Reopening rebuilds the aggregate; a duplicate must not invalidate it.
    let reopened = Repository::init(temp_dir.path()).unwrap();
    let cached = fs::read_to_string(&aggregate).unwrap();
    let (after, outcome) = reopened.import(&buffer, ImportRequest::new().tags(["late"])).unwrap();

    assert!(outcome.is_duplicate());
    assert_eq!(after.count(), 1);
    assert_eq!(fs::read_to_string(&aggregate).unwrap(), cached);
    assert_eq!(files_in(&day), files);
}

#[test]
fn test_zero_thumbnail_size_fails_import() {
    let temp_dir = TempDir::new().unwrap();
    let options = StoreOptions {
        thumbnail_size: 0,
        ..StoreOptions::default()
    };
    let repo = Repository::init_with(temp_dir.path(), Arc::new(ImageBackend), options).unwrap();

    let err = repo
        .import(&png(12, 30, 10), ImportRequest::new().timestamp(at("2022-06-07T08:09:10+00:00")))
        .unwrap_err();

    assert!(matches!(err, RepositoryError::ImportFailed { .. }));
    assert_eq!(repo.count(), 0);
}

#[test]
fn test_unsupported_leaves_no_files() {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();

    let (repo, outcome) = repo.import(&[0u8; 64], ImportRequest::new()).unwrap();

    assert_eq!(outcome, ImportOutcome::Unsupported);
    assert_eq!(repo.count(), 0);
    assert!(walkdir::WalkDir::new(temp_dir.path().join("data"))
        .into_iter()
        .filter_map(Result::ok)
        .all(|e| !e.file_type().is_file()));
}

/// Backend that treats every non-empty buffer as a 10 second 1920x1080 video
#[derive(Default)]
struct FakeVideoBackend {
    fail_thumbnails: bool,
    calls: Mutex<Vec<(PathBuf, (u32, u32), Duration)>>,
}

impl MediaBackend for FakeVideoBackend {
    fn probe_image(&self, _buffer: &[u8]) -> Option<MediaInfo> {
        None
    }

    fn probe_video(&self, buffer: &[u8]) -> Option<MediaInfo> {
        (!buffer.is_empty()).then_some(MediaInfo {
            media_type: MediaType::Video,
            size: ImgSize::new(1920, 1080),
            duration: Some(Duration::from_secs(10)),
        })
    }

    fn image_thumbnail(&self, _buffer: &[u8], _dest: &Path, _box_size: u32) -> Result<(), MediaError> {
        unreachable!("no images in this backend")
    }

    fn video_thumbnail(
        &self,
        source: &Path,
        dest: &Path,
        target: (u32, u32),
        seek: Duration,
    ) -> Result<(), MediaError> {
        if self.fail_thumbnails {
            return Err(MediaError::Decode("broken stream".into()));
        }
        self.calls.lock().unwrap().push((source.to_path_buf(), target, seek));
        fs::write(dest, b"thumb")?;
        Ok(())
    }
}

#[test]
fn test_video_thumbnail_parameters() {
    let temp_dir = TempDir::new().unwrap();
    let backend = Arc::new(FakeVideoBackend::default());
    let options = StoreOptions {
        thumbnail_size: 200,
        video_seek: Duration::from_secs(5),
    };
    let repo = Repository::init_with(temp_dir.path(), backend.clone(), options).unwrap();

    let (_, outcome) = repo
        .import(b"not really mp4", ImportRequest::new().timestamp(at("2021-01-02T03:04:05+00:00")))
        .unwrap();
    let s = outcome.screenshot().unwrap();

    assert_eq!(s.media_type, MediaType::Video);
    let calls = backend.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (source, target, seek) = &calls[0];
    assert_eq!(source, &temp_dir.path().join(s.rel_path_full_res()));
    assert_eq!(*target, (200, 112));
    assert_eq!(*seek, Duration::from_secs(5));
}

#[test]
fn test_failed_thumbnail_keeps_repository_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let backend = Arc::new(FakeVideoBackend {
        fail_thumbnails: true,
        ..Default::default()
    });
    let repo = Repository::init_with(temp_dir.path(), backend, StoreOptions::default()).unwrap();
    let buffer = b"clip bytes".to_vec();

    let err = repo
        .import(&buffer, ImportRequest::new().timestamp(at("2021-01-02T03:04:05+00:00")))
        .unwrap_err();

    assert!(matches!(err, RepositoryError::ImportFailed { .. }));
    assert_eq!(repo.count(), 0);

    // The full-resolution file is already written and stays behind.
    let id = compute_screenshot_id(&buffer);
    let orphan = temp_dir
        .path()
        .join(format!("data/2021/01/02/20210102-030405-{id}.jpg"));
    assert!(orphan.is_file());
    assert!(!orphan.with_extension("json").exists());
}
