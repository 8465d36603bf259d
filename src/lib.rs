//! Upload images to Qiniu object storage under content-addressed keys.
//!
//! An image is read from a local path or URL, optionally converted to WebP by
//! an external `cwebp` program, and uploaded as `<md5>.<ext>` using an upload
//! token fetched fresh from a token service.
//!
//! ## Features
//! - Local files and HTTP(S) URLs as input.
//! - Optional WebP transcoding via any `cwebp`-compatible command.
//! - Best-effort upload host discovery with a fixed fallback host.
//! - Typed error handling with [`UploadError`].
//!
//! ```no_run
//! # use img_uploader::{Config, Uploader};
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::load("config.json")?;
//! let uploader = Uploader::new(config)?;
//! let result = uploader.upload_image("assets/image.png").await?;
//! println!("uploaded as {}", result.key);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod key;
pub mod transcode;
pub mod types;

pub use client::{normalize_host, Uploader, DEFAULT_UPLOAD_HOST};
pub use config::Config;
pub use error::UploadError;
pub use input::{is_url, sniff_content_type};
pub use key::{md5_hex, object_key};
pub use transcode::{normalize_quality, Transcoder};
pub use types::{InputData, UploadResult};
