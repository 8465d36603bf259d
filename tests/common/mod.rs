#![allow(dead_code)]

use img_uploader::{Config, Uploader};
use serde_json::json;
use std::path::{Path, PathBuf};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/v1/misc/qiniu-token";
pub const QUERY_PATH: &str = "/v4/query";
pub const USER_TOKEN: &str = "user-token-abc";
pub const UPLOAD_TOKEN: &str = "AccessKey123:signature:policy";

/// A config pointing the token service at `server`.
pub fn test_config(server: &MockServer) -> Config {
    Config {
        user_token: USER_TOKEN.to_string(),
        qiniu_token_url: format!("{}{}", server.uri(), TOKEN_PATH),
        ..Config::default()
    }
}

/// An uploader whose token service and host discovery both live on `server`.
pub fn test_uploader(server: &MockServer, config: Config) -> Uploader {
    Uploader::new_with_query_url(config, &format!("{}{}", server.uri(), QUERY_PATH)).unwrap()
}

pub async fn mount_token_service(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .and(header("token", USER_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1,
            "msg": "success",
            "data": { "token": UPLOAD_TOKEN }
        })))
        .mount(server)
        .await;
}

pub async fn mount_host_query(server: &MockServer, domain: &str) {
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hosts": [
                { "region": "z2", "up": { "domains": [domain, "up-backup.example.com"] } }
            ]
        })))
        .mount(server)
        .await;
}

/// Writes an executable shell script standing in for `cwebp`.
///
/// The script is called as `<script> -q <quality> <input> -o <output>`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join(name);
    std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

pub const GIF_BYTES: &[u8] = b"GIF89a\x01\0\x01\0 fake gif body";
