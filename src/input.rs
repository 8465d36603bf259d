//! Reading image bytes from a local path or an HTTP(S) URL.

use crate::error::UploadError;
use crate::types::InputData;
use reqwest::header::CONTENT_TYPE;
use std::path::Path;
use tokio::fs;
use tracing::debug;
use url::Url;

/// Returns `true` when `s` should be fetched over HTTP rather than read from disk.
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Reads the image named by `path_or_url`.
///
/// URLs are fetched with `client`; anything else is treated as a local path.
///
/// # Errors
///
/// - `UploadError::EmptyInput` if `path_or_url` is blank.
/// - `UploadError::Http` if the download answers with a non-2xx status.
/// - `UploadError::RequestFailed` / `UploadError::IoError` on network or file errors.
pub async fn read_input(
    client: &reqwest::Client,
    path_or_url: &str,
) -> Result<InputData, UploadError> {
    let path_or_url = path_or_url.trim();
    if path_or_url.is_empty() {
        return Err(UploadError::EmptyInput);
    }

    if is_url(path_or_url) {
        return download(client, path_or_url).await;
    }

    let path = Path::new(path_or_url);
    let bytes = fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_string();
    let content_type = mime_guess::from_path(path)
        .first_raw()
        .map(str::to_string)
        .or_else(|| sniff_content_type(&bytes).map(str::to_string));

    debug!(path = %path.display(), size = bytes.len(), ?content_type, "read local image");
    Ok(InputData {
        bytes,
        name,
        content_type,
    })
}

async fn download(client: &reqwest::Client, raw_url: &str) -> Result<InputData, UploadError> {
    let url = Url::parse(raw_url)?;
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    let header_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(mime_essence)
        .filter(|s| is_valid_mime(s));
    let bytes = response.bytes().await?.to_vec();

    if !status.is_success() {
        return Err(UploadError::Http {
            context: "download",
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    let name = url_file_name(&url);
    let content_type =
        header_type.or_else(|| sniff_content_type(&bytes).map(str::to_string));

    debug!(%url, size = bytes.len(), ?content_type, "downloaded image");
    Ok(InputData {
        bytes,
        name,
        content_type,
    })
}

/// The last non-empty, percent-decoded path segment, or `image` for a root path.
fn url_file_name(url: &Url) -> String {
    let Some(segment) = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
    else {
        return "image".to_string();
    };
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Whether `value` parses as a `type/subtype` MIME type.
pub(crate) fn is_valid_mime(value: &str) -> bool {
    value.parse::<mime_guess::Mime>().is_ok()
}

/// Strips parameters such as `; charset=binary` from a `Content-Type` value.
fn mime_essence(value: &str) -> String {
    value.split(';').next().unwrap_or(value).trim().to_string()
}

/// Guesses an image MIME type from its leading magic bytes.
pub fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"BM") {
        Some("image/bmp")
    } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
        Some("image/tiff")
    } else if bytes.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        Some("image/x-icon")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection_is_prefix_based() {
        assert!(is_url("http://example.com/a.png"));
        assert!(is_url("https://example.com"));
        assert!(!is_url("ftp://example.com/a.png"));
        assert!(!is_url("/tmp/http://x"));
        assert!(!is_url("HTTPS://example.com"));
    }

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_content_type(b"\x89PNG\r\n\x1a\nrest"), Some("image/png"));
        assert_eq!(sniff_content_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_content_type(b"GIF89a...."), Some("image/gif"));
        assert_eq!(sniff_content_type(b"RIFF\x10\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_content_type(b"plain text"), None);
        assert_eq!(sniff_content_type(b""), None);
    }

    #[test]
    fn file_name_skips_trailing_slash() {
        let name = |u: &str| url_file_name(&Url::parse(u).unwrap());
        assert_eq!(name("https://host/a/photo.png/"), "photo.png");
        assert_eq!(name("https://host/a/my%20cat.jpg"), "my cat.jpg");
        assert_eq!(name("https://host/"), "image");
        assert_eq!(name("https://host"), "image");
    }

    #[test]
    fn mime_validation() {
        assert!(is_valid_mime("image/png"));
        assert!(!is_valid_mime("binary"));
        assert!(!is_valid_mime(""));
    }

    #[test]
    fn essence_drops_parameters() {
        assert_eq!(mime_essence("image/png; charset=binary"), "image/png");
        assert_eq!(mime_essence(" image/jpeg "), "image/jpeg");
    }
}
