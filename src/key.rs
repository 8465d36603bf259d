//! Content-addressed object keys.

use md5::{Digest, Md5};

/// Returns the lowercase hex MD5 digest of `bytes`.
pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Derives the object key `<md5>.<ext>` for the bytes being uploaded.
pub fn object_key(bytes: &[u8], extension: &str) -> String {
    format!("{}.{}", md5_hex(bytes), extension)
}

/// Picks the file extension for an upload that is not transcoded.
///
/// The extension of `name` wins; otherwise one is derived from `mime_type`,
/// and `bin` is the last resort.
pub fn upload_extension(name: &str, mime_type: &str) -> String {
    let from_name = std::path::Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty());
    if let Some(ext) = from_name {
        return ext.to_string();
    }

    let preferred = match mime_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        "image/tiff" => Some("tiff"),
        "image/x-icon" | "image/vnd.microsoft.icon" => Some("ico"),
        "image/svg+xml" => Some("svg"),
        "image/avif" => Some("avif"),
        "application/octet-stream" => Some("bin"),
        _ => None,
    };

    preferred
        .or_else(|| {
            mime_guess::get_mime_extensions_str(mime_type).and_then(|exts| exts.first().copied())
        })
        .unwrap_or("bin")
        .to_string()
}
