use std::path::PathBuf;

/// Represents the possible errors that can occur while uploading an image.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("user_token is empty. Set it in config.json or the IMG_UPLOADER_USER_TOKEN environment variable.")]
    MissingUserToken,
    #[error("no image path or URL was given")]
    EmptyInput,
    #[error("failed to load config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Failed to parse JSON: {0}")]
    ResponseParseFailed(#[from] serde_json::Error),
    /// A dependency answered with a non-2xx status.
    #[error("{context} http error: {status} {body}")]
    Http {
        context: &'static str,
        status: u16,
        body: String,
    },
    #[error("qiniu-token api error: {message}")]
    TokenService { message: String },
    #[error("transcoding failed: {message}")]
    Transcode { message: String },
    #[error("URL parsing failed: {0}")]
    UrlParseFailed(#[from] url::ParseError),
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
