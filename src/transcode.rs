//! WebP transcoding through an external `cwebp`-compatible program.

use crate::config::DEFAULT_WEBP_QUALITY;
use crate::error::UploadError;
use std::io::ErrorKind;
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

/// Maps out-of-range qualities (`<= 0` or `> 100`) to the default of 95.
pub fn normalize_quality(quality: i64) -> u8 {
    if quality <= 0 || quality > 100 {
        DEFAULT_WEBP_QUALITY as u8
    } else {
        quality as u8
    }
}

/// Runs `<program> -q <quality> <input> -o <output>` over temporary files.
#[derive(Debug, Clone)]
pub struct Transcoder {
    program: String,
}

impl Transcoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Converts `input` to WebP at the given quality.
    ///
    /// The input and output live in a temporary directory that is removed
    /// when this function returns, whether or not the conversion succeeded.
    ///
    /// # Errors
    ///
    /// - `UploadError::Transcode` if the program cannot be started or exits non-zero.
    /// - `UploadError::IoError` if the temporary files cannot be written or read.
    pub async fn to_webp(&self, input: &[u8], quality: i64) -> Result<Vec<u8>, UploadError> {
        let quality = normalize_quality(quality);
        let dir = tempfile::Builder::new().prefix("imgutil-").tempdir()?;
        let in_path = dir.path().join("source.input");
        let out_path = dir.path().join("output.webp");

        fs::write(&in_path, input).await?;

        debug!(program = %self.program, quality, "running transcoder");
        let output = Command::new(&self.program)
            .arg("-q")
            .arg(quality.to_string())
            .arg(&in_path)
            .arg("-o")
            .arg(&out_path)
            .output()
            .await
            .map_err(|e| {
                let hint = if e.kind() == ErrorKind::NotFound {
                    " (install libwebp/cwebp or set enable_webp=false)"
                } else {
                    ""
                };
                UploadError::Transcode {
                    message: format!("failed to run {}{}: {}", self.program, hint, e),
                }
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(UploadError::Transcode {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    combined.trim()
                ),
            });
        }

        let webp = fs::read(&out_path).await?;
        Ok(webp)
    }
}
