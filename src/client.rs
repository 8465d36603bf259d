use crate::config::Config;
use crate::error::UploadError;
use crate::input::{is_valid_mime, read_input};
use crate::key::{object_key, upload_extension};
use crate::transcode::Transcoder;
use crate::types::{InputData, UploadResult};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::multipart;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// The upload host used whenever region discovery does not produce one.
pub const DEFAULT_UPLOAD_HOST: &str = "upload-z2.qiniup.com";

const DEFAULT_QUERY_URL: &str = "https://api.qiniu.com/v4/query";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const UPLOAD_USER_AGENT: &str = "QiniuDart";

/// Uploads images to a Qiniu bucket under content-addressed keys.
///
/// It holds the shared `reqwest::Client` (with a 120 second timeout per call),
/// the run's [`Config`] and the transcoder named by that config.
#[derive(Clone)]
pub struct Uploader {
    client: reqwest::Client,
    config: Config,
    transcoder: Transcoder,
    query_url: Url,
    /// The scheme used to reach the discovered upload host, `https` by default.
    pub upload_scheme: String,
}

impl Uploader {
    /// Creates a new `Uploader` for the given configuration.
    ///
    /// # Errors
    ///
    /// - `UploadError::RequestFailed` if the internal HTTP client fails to build.
    /// - `UploadError::UrlParseFailed` if the discovery URL is invalid.
    pub fn new(config: Config) -> Result<Self, UploadError> {
        Self::new_with_query_url(config, DEFAULT_QUERY_URL)
    }

    /// Creates a new `Uploader` that queries `query_url` for upload hosts.
    ///
    /// This is useful for testing against a mock server.
    pub fn new_with_query_url(config: Config, query_url: &str) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let query_url = Url::parse(query_url)?;
        let transcoder = Transcoder::new(config.cwebp_path.clone());

        Ok(Self {
            client,
            config,
            transcoder,
            query_url,
            upload_scheme: "https".to_string(),
        })
    }

    /// Reads the image at a local path or URL.
    pub async fn read_input(&self, path_or_url: &str) -> Result<InputData, UploadError> {
        read_input(&self.client, path_or_url).await
    }

    /// Exchanges the user token for a short-lived upload token.
    ///
    /// The token service must answer 2xx with `{"code": 1, "data": {"token": "..."}}`.
    ///
    /// # Errors
    ///
    /// - `UploadError::MissingUserToken` if the configured user token is blank.
    /// - `UploadError::Http` on a non-2xx status.
    /// - `UploadError::TokenService` if `code` is not 1 or the token is missing.
    pub async fn get_upload_token(&self) -> Result<String, UploadError> {
        let user_token = self.config.user_token.trim();
        if user_token.is_empty() {
            return Err(UploadError::MissingUserToken);
        }

        let url = Url::parse(&self.config.qiniu_token_url)?;
        let response = self
            .client
            .get(url)
            .header("token", user_token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Http {
                context: "qiniu-token",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let text = response.text().await?;

        let payload: Value = serde_json::from_str(&text)?;
        let code = payload
            .get("code")
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)));
        if code != Some(1) {
            return Err(UploadError::TokenService { message: text });
        }

        payload
            .get("data")
            .and_then(|d| d.get("token"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| UploadError::TokenService {
                message: format!("missing token: {}", text),
            })
    }

    /// Looks up the upload host for the configured bucket.
    ///
    /// This never fails: any problem with the lookup yields [`DEFAULT_UPLOAD_HOST`].
    pub async fn query_upload_host(&self, upload_token: &str) -> String {
        match self.try_query_upload_host(upload_token).await {
            Ok(host) => host,
            Err(reason) => {
                warn!(%reason, "upload host lookup failed, using {}", DEFAULT_UPLOAD_HOST);
                DEFAULT_UPLOAD_HOST.to_string()
            }
        }
    }

    async fn try_query_upload_host(&self, upload_token: &str) -> Result<String, String> {
        let access_key = upload_token.split(':').next().unwrap_or("");
        let mut url = self.query_url.clone();
        url.query_pairs_mut()
            .append_pair("ak", access_key)
            .append_pair("bucket", &self.config.bucket);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("status {}", response.status().as_u16()));
        }

        let payload: Value = response.json().await.map_err(|e| e.to_string())?;
        let domain = payload
            .get("hosts")
            .and_then(|h| h.get(0))
            .and_then(|h0| h0.get("up"))
            .and_then(|up| up.get("domains"))
            .and_then(|d| d.get(0))
            .and_then(Value::as_str)
            .ok_or_else(|| "no upload domain in response".to_string())?;

        let host = normalize_host(domain);
        debug!(%host, bucket = %self.config.bucket, "discovered upload host");
        Ok(host)
    }

    /// Posts `bytes` as a multipart form (`token`, `key`, `file`) to `upload_url`.
    ///
    /// # Errors
    ///
    /// - `UploadError::Http` on a non-2xx status, carrying the response body.
    /// - `UploadError::ResponseParseFailed` if the body is not JSON.
    pub async fn upload_bytes(
        &self,
        upload_url: &str,
        upload_token: &str,
        key: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<UploadResult, UploadError> {
        let mime_type = if is_valid_mime(mime_type) {
            mime_type
        } else {
            warn!(%mime_type, "invalid content type, sending application/octet-stream");
            "application/octet-stream"
        };
        let file_part = multipart::Part::bytes(bytes)
            .file_name(key.to_string())
            .mime_str(mime_type)?;

        let form = multipart::Form::new()
            .text("token", upload_token.to_string())
            .text("key", key.to_string())
            .part("file", file_part);

        let response = self
            .client
            .post(upload_url)
            .header(USER_AGENT, UPLOAD_USER_AGENT)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(UploadError::Http {
                context: "qiniu upload",
                status: status.as_u16(),
                body: format!("{} (uploadUrl={})", text, upload_url),
            });
        }
        let text = response.text().await?;

        let payload: Value = serde_json::from_str(&text)?;
        Ok(UploadResult::from_payload(payload, key))
    }

    /// Reads, optionally transcodes, and uploads one image.
    ///
    /// The object key is `<md5 of the uploaded bytes>.<extension>`, so the same
    /// bytes always land under the same key.
    ///
    /// # Errors
    ///
    /// Blank input or a blank user token fail before any network call. Every
    /// other stage propagates its error, except host discovery which falls back
    /// to [`DEFAULT_UPLOAD_HOST`].
    pub async fn upload_image(&self, path_or_url: &str) -> Result<UploadResult, UploadError> {
        let path_or_url = path_or_url.trim();
        if path_or_url.is_empty() {
            return Err(UploadError::EmptyInput);
        }
        if self.config.user_token.trim().is_empty() {
            return Err(UploadError::MissingUserToken);
        }

        let input = self.read_input(path_or_url).await?;

        let (bytes, mime_type, extension) = if self.config.enable_webp {
            let webp = self
                .transcoder
                .to_webp(&input.bytes, self.config.webp_quality)
                .await?;
            (webp, "image/webp".to_string(), "webp".to_string())
        } else {
            let mime_type = input
                .content_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let extension = upload_extension(&input.name, &mime_type);
            (input.bytes, mime_type, extension)
        };

        let key = object_key(&bytes, &extension);
        info!(%key, size = bytes.len(), %mime_type, "prepared upload");

        let upload_token = self.get_upload_token().await?;
        let host = self.query_upload_host(&upload_token).await;
        let upload_url = format!("{}://{}", self.upload_scheme, host);

        self.upload_bytes(&upload_url, &upload_token, &key, bytes, &mime_type)
            .await
    }
}

/// Reduces a discovered domain (possibly a full URL) to a bare host name.
pub fn normalize_host(domain_or_url: &str) -> String {
    let s = domain_or_url.trim();
    if s.is_empty() {
        return DEFAULT_UPLOAD_HOST.to_string();
    }
    if s.starts_with("http://") || s.starts_with("https://") {
        if let Some(host) = Url::parse(s).ok().and_then(|u| u.host_str().map(str::to_string)) {
            return host;
        }
    }
    match s.split('/').next() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => DEFAULT_UPLOAD_HOST.to_string(),
    }
}
