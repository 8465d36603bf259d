#![cfg(unix)]

mod common;

use common::write_script;
use img_uploader::{Transcoder, UploadError};
use std::path::Path;

#[tokio::test]
async fn test_to_webp_runs_program_with_quality() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "fake-cwebp", r#"printf 'webp-q%s-' "$2" > "$5"; cat "$3" >> "$5""#);

    let transcoder = Transcoder::new(script.to_str().unwrap());
    let webp = transcoder.to_webp(b"pixels", 80).await.unwrap();

    assert_eq!(webp, b"webp-q80-pixels");
}

#[tokio::test]
async fn test_to_webp_clamps_out_of_range_quality() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "fake-cwebp", r#"printf 'q%s' "$2" > "$5""#);
    let transcoder = Transcoder::new(script.to_str().unwrap());

    assert_eq!(transcoder.to_webp(b"x", 0).await.unwrap(), b"q95");
    assert_eq!(transcoder.to_webp(b"x", 250).await.unwrap(), b"q95");
    assert_eq!(transcoder.to_webp(b"x", 1).await.unwrap(), b"q1");
}

#[tokio::test]
async fn test_to_webp_removes_temporary_files() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "fake-cwebp", r#"printf '%s' "$3" > "$5""#);
    let transcoder = Transcoder::new(script.to_str().unwrap());

    let input_path = transcoder.to_webp(b"x", 90).await.unwrap();
    let input_path = String::from_utf8(input_path).unwrap();

    assert!(!Path::new(&input_path).exists());
    assert!(!Path::new(&input_path).parent().unwrap().exists());
}

#[tokio::test]
async fn test_to_webp_removes_temporary_files_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "failing-cwebp", r#"printf 'input=%s\n' "$3" >&2; exit 1"#);
    let transcoder = Transcoder::new(script.to_str().unwrap());

    let err = transcoder.to_webp(b"x", 90).await.unwrap_err();

    let message = err.to_string();
    let input_path = message
        .split("input=")
        .nth(1)
        .expect("script output in error")
        .trim();
    assert!(!Path::new(input_path).exists());
    assert!(!Path::new(input_path).parent().unwrap().exists());
}

#[tokio::test]
async fn test_to_webp_reports_failing_program() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "broken-cwebp",
        "echo 'Decoding of input failed' >&2; echo 'usage hint'; exit 3",
    );
    let transcoder = Transcoder::new(script.to_str().unwrap());

    let err = transcoder.to_webp(b"not an image", 95).await.unwrap_err();

    assert!(matches!(err, UploadError::Transcode { .. }));
    let message = err.to_string();
    assert!(message.contains("Decoding of input failed"));
    assert!(message.contains("usage hint"));
}

#[tokio::test]
async fn test_to_webp_missing_program() {
    let transcoder = Transcoder::new("img-uploader-no-such-cwebp");

    let err = transcoder.to_webp(b"x", 95).await.unwrap_err();

    assert!(matches!(err, UploadError::Transcode { .. }));
    let message = err.to_string();
    assert!(message.contains(transcoder.program()));
    assert!(message.contains("enable_webp=false"));
}
