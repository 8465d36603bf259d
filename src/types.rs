use serde_json::Value;

/// The bytes of an image together with what is known about it.
#[derive(Debug, Clone)]
pub struct InputData {
    /// The raw image bytes.
    pub bytes: Vec<u8>,
    /// A display name, usually the last path segment of the file or URL.
    pub name: String,
    /// The MIME type without parameters, if one could be determined.
    pub content_type: Option<String>,
}

/// The outcome of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadResult {
    /// The object key the storage service stored the bytes under.
    pub key: String,
    /// The storage service's hash of the object.
    pub hash: String,
    /// The object size in bytes.
    pub fsize: u64,
    /// The full decoded response payload.
    pub raw: Value,
}

impl UploadResult {
    /// Builds a result from the upload response payload.
    ///
    /// `fsize` is accepted as either an integer or a floating-point numeral.
    /// When the payload carries no `key`, `requested_key` is used.
    pub(crate) fn from_payload(payload: Value, requested_key: &str) -> Self {
        let key = payload
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or(requested_key)
            .to_string();
        let hash = payload
            .get("hash")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let fsize = payload
            .get("fsize")
            .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
            .unwrap_or(0);

        Self {
            key,
            hash,
            fsize,
            raw: payload,
        }
    }
}
