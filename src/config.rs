use crate::error::UploadError;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_BUCKET: &str = "chat68";
pub const DEFAULT_QINIU_TOKEN_URL: &str = "https://chat-go.jwzhd.com/v1/misc/qiniu-token";
pub const DEFAULT_WEBP_QUALITY: i64 = 95;
pub const DEFAULT_CWEBP_PATH: &str = "cwebp";

/// Environment variable consulted when `user_token` is empty.
pub const USER_TOKEN_ENV: &str = "IMG_UPLOADER_USER_TOKEN";

/// Runtime settings, read once from `config.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The credential sent to the token service.
    pub user_token: String,
    /// Transcode to WebP before uploading.
    pub enable_webp: bool,
    /// WebP quality, 1 to 100. Anything else is treated as 95.
    pub webp_quality: i64,
    pub bucket: String,
    pub qiniu_token_url: String,
    /// The transcoder program, looked up on `PATH` unless absolute.
    pub cwebp_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_token: String::new(),
            enable_webp: false,
            webp_quality: DEFAULT_WEBP_QUALITY,
            bucket: DEFAULT_BUCKET.to_string(),
            qiniu_token_url: DEFAULT_QINIU_TOKEN_URL.to_string(),
            cwebp_path: DEFAULT_CWEBP_PATH.to_string(),
        }
    }
}

impl Config {
    /// Reads and parses a JSON config file, then normalizes it.
    ///
    /// # Errors
    ///
    /// - `UploadError::Config` if the file cannot be read or is not valid JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| UploadError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|e| UploadError::Config {
            path: path.to_path_buf(),
            message: format!("invalid JSON: {}", e),
        })?;
        Ok(config.normalized())
    }

    /// Trims the credential and replaces blank optional fields with defaults.
    ///
    /// An empty `user_token` is filled from `IMG_UPLOADER_USER_TOKEN` when set.
    pub fn normalized(mut self) -> Self {
        self.user_token = self.user_token.trim().to_string();
        if self.user_token.is_empty() {
            if let Ok(token) = env::var(USER_TOKEN_ENV) {
                self.user_token = token.trim().to_string();
            }
        }
        if self.bucket.trim().is_empty() {
            self.bucket = DEFAULT_BUCKET.to_string();
        }
        if self.qiniu_token_url.trim().is_empty() {
            self.qiniu_token_url = DEFAULT_QINIU_TOKEN_URL.to_string();
        }
        if self.cwebp_path.trim().is_empty() {
            self.cwebp_path = DEFAULT_CWEBP_PATH.to_string();
        }
        self
    }
}

/// The default config location: `config.json` next to the executable, or in
/// the current directory when the executable's directory is unknown.
pub fn default_config_path() -> PathBuf {
    let dir = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join("config.json")
}
