#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use plget_downloader::{FetchError, Fetcher, YtDlpFetcher};

/// writes an executable shell script standing in for yt-dlp.
fn fake_ytdlp(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-yt-dlp");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn streams_stdout_into_named_file() {
    let bin = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    // the watch url is the last argument
    let script = fake_ytdlp(bin.path(), r#"for last; do :; done; printf 'bytes for %s' "$last""#);

    let fetcher = YtDlpFetcher::new()
        .binary(script)
        .output_dir(out.path().join("videos"));

    let saved = fetcher.fetch("abc123").await.unwrap();

    assert_eq!(saved, out.path().join("videos").join("abc123.mp4"));
    assert_eq!(
        std::fs::read_to_string(&saved).unwrap(),
        "bytes for https://www.youtube.com/watch?v=abc123"
    );
}

#[tokio::test]
async fn failing_backend_leaves_no_partial_file() {
    let bin = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let script = fake_ytdlp(bin.path(), "printf partial; echo 'video unavailable' >&2; exit 3");

    let fetcher = YtDlpFetcher::new().binary(script).output_dir(out.path());
    let err = fetcher.fetch("gone").await.unwrap_err();

    match err {
        FetchError::ExitStatus { status, stderr } => {
            assert_eq!(status.code(), Some(3));
            assert_eq!(stderr, "video unavailable");
        }
        other => panic!("expected ExitStatus, got {other:?}"),
    }
    assert!(!out.path().join("gone.mp4").exists());
}

#[tokio::test]
async fn slow_backend_times_out() {
    let bin = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let script = fake_ytdlp(bin.path(), "exec sleep 5");

    let fetcher = YtDlpFetcher::new()
        .binary(script)
        .output_dir(out.path())
        .timeout(Duration::from_millis(200));

    let err = fetcher.fetch("slow").await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout(_)), "got {err:?}");
    assert!(!out.path().join("slow.mp4").exists());
}
