//! HTTP client for the package service REST API.
//!
//! Every request is signed with the account secret: the signature is the
//! hex SHA-256 of `secret ‖ api-key ‖ path ‖ timestamp ‖ body-digest`, sent
//! alongside the api key and timestamp. Responses are JSON objects whose
//! `response` field is `SUCCESS` or an error code.
//!
//! The key code is generated here and never sent to the service; only a
//! checksum derived from it is submitted on finalize.

use std::io;
use std::time::Duration;

use base64::Engine;
use rand::RngCore;
use reqwest::blocking::{Body, Client};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};

use super::seal::{Digesting, Sealer};
use super::PackageClient;
use crate::core::cancel::{is_cancellation, CancelToken, Cancelled};
use crate::core::constants;
use crate::core::credential::Credential;
use crate::core::domain::{KeyCode, Package, PackageUrl, UploadedFile};
use crate::core::storage::{ReadStream, StorageItem};
use crate::error::{Error, RemoteError, Result};

/// Default per-request timeout.
const TIMEOUT: Duration = Duration::from_secs(300);

/// Random bytes in a generated key code.
const KEY_CODE_BYTES: usize = 32;

/// Client bound to one service host and account.
pub struct HttpClient {
    endpoint: String,
    credential: Credential,
    http: Client,
    cancel: CancelToken,
    work_factor: Option<u8>,
}

impl HttpClient {
    /// Create a client for `endpoint` authenticated as `credential`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Transport` if the HTTP stack cannot be set up.
    pub fn new(endpoint: &str, credential: Credential, cancel: CancelToken) -> Result<Self> {
        let http = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("courier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credential,
            http,
            cancel,
            work_factor: None,
        })
    }

    /// Override the scrypt work factor used when sealing content.
    pub fn with_work_factor(mut self, log_n: u8) -> Self {
        self.work_factor = Some(log_n);
        self
    }

    fn sealer(&self, server_secret: &str, key_code: &KeyCode) -> Sealer {
        Sealer::new(server_secret, key_code.expose()).with_work_factor(self.work_factor)
    }

    /// Send one signed request and unwrap the response envelope.
    fn call(&self, method: Method, path: &str, payload: Payload) -> std::result::Result<Value, Failure> {
        self.cancel.check().map_err(Failure::Io)?;

        let path = format!("{}{}", constants::API_BASE, path);
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

        let (body, digest, content_type) = match payload {
            Payload::Empty => (None, digest_of(b""), None),
            Payload::Json(value) => {
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| Failure::Transport(e.to_string()))?;
                let digest = digest_of(&bytes);
                (Some(Body::from(bytes)), digest, Some("application/json"))
            }
            Payload::Stream { body, len, digest } => (
                Some(Body::sized(body, len)),
                digest,
                Some("application/octet-stream"),
            ),
        };

        let signature = sign(
            self.credential.secret(),
            self.credential.username(),
            &path,
            &timestamp,
            &digest,
        );

        debug!(method = %method, path = %path, "calling package service");
        let mut request = self
            .http
            .request(method, format!("{}{}", self.endpoint, path))
            .header("ss-api-key", self.credential.username())
            .header("ss-request-timestamp", &timestamp)
            .header("ss-request-signature", signature);
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().map_err(|e| self.transport(e))?;
        let status = response.status().as_u16();
        let text = response.text().map_err(|e| self.transport(e))?;
        trace!(status, len = text.len(), "service responded");

        parse_envelope(status, &text)
    }

    /// Classify a reqwest failure. A body stream that stopped on
    /// cancellation shows up here wrapped in a transport error.
    fn transport(&self, err: reqwest::Error) -> Failure {
        if let Err(cancelled) = self.cancel.check() {
            return Failure::Io(cancelled);
        }
        if caused_by_cancellation(&err) {
            return Failure::Io(io::Error::new(io::ErrorKind::Other, Cancelled));
        }
        Failure::Transport(err.to_string())
    }

    fn package_info(&self, package_id: &str) -> std::result::Result<PackageInfo, Failure> {
        self.call(Method::GET, &format!("/package/{}/", package_id), Payload::Empty)
            .and_then(decode)
    }

    /// Seal `source` into `scratch`, then stream the ciphertext to `path`.
    fn send_sealed(
        &self,
        path: &str,
        sealer: &Sealer,
        source: &dyn StorageItem,
        expected: u64,
        scratch: &dyn StorageItem,
    ) -> std::result::Result<(), Failure> {
        let (digest, len) = seal_into(sealer, source, expected, scratch).map_err(Failure::Io)?;
        trace!(file = %source.name(), sealed_len = len, "file sealed");

        let body = scratch.open_for_read().map_err(Failure::Io)?;
        self.call(Method::POST, path, Payload::Stream { body, len, digest })?;
        Ok(())
    }
}

/// Seal `source` into `target`, returning the ciphertext digest and length.
fn seal_into(
    sealer: &Sealer,
    source: &dyn StorageItem,
    expected: u64,
    target: &dyn StorageItem,
) -> io::Result<(String, u64)> {
    let mut input = source.open_for_read()?;
    let mut output = Digesting::new(target.open_for_write()?);
    let read = sealer.seal(&mut input, &mut output)?;
    if read != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "{} changed while uploading: expected {} bytes, read {}",
                source.name(),
                expected,
                read
            ),
        ));
    }
    output.finish()
}

impl PackageClient for HttpClient {
    fn create_package(&self) -> Result<Package> {
        let created: CreatedPackage = self
            .call(Method::PUT, "/package/", Payload::Json(json!({})))
            .and_then(decode)
            .map_err(|f| f.into_error(RemoteError::CreatePackage))?;

        debug!(package_id = %created.package_id, "package created");
        Ok(Package::new(created.package_id, generate_key_code()))
    }

    fn encrypt_and_upload_file(
        &self,
        package_id: &str,
        key_code: &KeyCode,
        item: &dyn StorageItem,
    ) -> Result<UploadedFile> {
        let fail = |f: Failure| f.into_error(RemoteError::UploadFile);

        let info = self.package_info(package_id).map_err(fail)?;
        let name = item.name();
        let length = item.length().map_err(|e| fail(Failure::Io(e)))?;

        let created: CreatedFile = self
            .call(
                Method::PUT,
                &format!("/package/{}/file/", package_id),
                Payload::Json(json!({ "filename": name, "fileSize": length, "parts": 1 })),
            )
            .and_then(decode)
            .map_err(fail)?;
        debug!(file = %name, file_id = %created.file_id, length, "file registered");

        // The sibling is removed on every exit path once created.
        let scratch = item
            .create_sibling(constants::TEMP_PREFIX, constants::TEMP_SUFFIX, length)
            .map_err(|e| fail(Failure::Io(e)))?;
        let sealer = self.sealer(&info.server_secret, key_code);
        let sent = self.send_sealed(
            &format!("/package/{}/file/{}/", package_id, created.file_id),
            &sealer,
            item,
            length,
            scratch.as_ref(),
        );
        let scratch_name = scratch.name();
        if let Err(e) = scratch.delete() {
            warn!(item = %scratch_name, error = %e, "failed to remove temporary item");
        }
        sent.map_err(fail)?;

        Ok(UploadedFile {
            file_id: created.file_id,
            file_name: name,
        })
    }

    fn encrypt_and_upload_message(
        &self,
        package_id: &str,
        key_code: &KeyCode,
        message: &str,
    ) -> Result<()> {
        let fail = |f: Failure| f.into_error(RemoteError::Message);

        let info = self.package_info(package_id).map_err(fail)?;
        let sealed = self
            .sealer(&info.server_secret, key_code)
            .seal_armored(message)
            .map_err(|e| fail(Failure::Io(e)))?;

        self.call(
            Method::PUT,
            &format!("/package/{}/message/", package_id),
            Payload::Json(json!({ "message": sealed })),
        )
        .map_err(fail)?;
        Ok(())
    }

    fn update_package_life(&self, package_id: &str, days: u32) -> Result<()> {
        self.call(
            Method::POST,
            &format!("/package/{}/", package_id),
            Payload::Json(json!({ "life": days })),
        )
        .map_err(|f| f.into_error(RemoteError::UpdatePackageLife))?;
        Ok(())
    }

    fn add_recipient(&self, package_id: &str, email: &str) -> Result<()> {
        self.call(
            Method::PUT,
            &format!("/package/{}/recipient/", package_id),
            Payload::Json(json!({ "email": email })),
        )
        .map_err(|f| f.into_error(RemoteError::Recipient))?;
        Ok(())
    }

    fn finalize_package(
        &self,
        package_id: &str,
        key_code: &KeyCode,
        notify: bool,
    ) -> Result<PackageUrl> {
        let fail = |f: Failure| f.into_error(RemoteError::FinalizePackage);

        let info = self.package_info(package_id).map_err(fail)?;
        let finalized: Finalized = self
            .call(
                Method::POST,
                &format!("/package/{}/finalize/", package_id),
                Payload::Json(json!({
                    "checksum": checksum(key_code, &info.package_code),
                    "notifyRecipients": notify,
                })),
            )
            .and_then(decode)
            .map_err(fail)?;

        Ok(PackageUrl {
            url: retrieval_link(&finalized.url, key_code),
            notified: if notify { finalized.recipients } else { Vec::new() },
            message: finalized.message,
        })
    }
}

/// Request body variants.
enum Payload {
    Empty,
    Json(Value),
    Stream {
        body: ReadStream,
        len: u64,
        digest: String,
    },
}

/// Why a call failed, before it is tagged with the failing operation.
#[derive(Debug)]
enum Failure {
    Service { code: String, message: String },
    Transport(String),
    Io(io::Error),
}

impl Failure {
    /// Convert into a crate error, tagging generic failures with `wrap`.
    ///
    /// Quota and approval codes keep their own kinds whatever the operation.
    /// Cancellation is tagged with the operation it stopped.
    fn into_error(self, wrap: fn(String) -> RemoteError) -> Error {
        match self {
            Failure::Service { code, message } => match code.as_str() {
                "LIMIT_EXCEEDED" => RemoteError::LimitExceeded(message).into(),
                "APPROVER_REQUIRED" => RemoteError::ApproverRequired(message).into(),
                _ => wrap(format!("{}: {}", code, message)).into(),
            },
            Failure::Transport(message) => wrap(message).into(),
            Failure::Io(e) if is_cancellation(&e) => {
                Error::Cancelled(Error::from(wrap(String::new())).kind())
            }
            Failure::Io(e) => wrap(e.to_string()).into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPackage {
    package_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageInfo {
    package_code: String,
    server_secret: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedFile {
    file_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Finalized {
    url: String,
    #[serde(default)]
    recipients: Vec<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Whether a cancellation marker sits anywhere in the source chain of `err`.
fn caused_by_cancellation(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<Cancelled>() || cause.downcast_ref::<io::Error>().is_some_and(is_cancellation) {
            return true;
        }
        source = cause.source();
    }
    false
}

fn decode<T: DeserializeOwned>(value: Value) -> std::result::Result<T, Failure> {
    serde_json::from_value(value).map_err(|e| Failure::Transport(format!("unexpected response: {}", e)))
}

/// Unwrap a response body into its JSON object.
fn parse_envelope(status: u16, text: &str) -> std::result::Result<Value, Failure> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) if !(200..300).contains(&status) => {
            return Err(Failure::Transport(format!("HTTP {}", status)));
        }
        Err(e) => return Err(Failure::Transport(format!("malformed response: {}", e))),
    };

    let code = value
        .get("response")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN")
        .to_string();
    if code == "SUCCESS" {
        return Ok(value);
    }

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no message")
        .to_string();
    Err(Failure::Service { code, message })
}

fn digest_of(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn sign(secret: &str, api_key: &str, path: &str, timestamp: &str, body_digest: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(api_key.as_bytes());
    hasher.update(path.as_bytes());
    hasher.update(timestamp.as_bytes());
    hasher.update(body_digest.as_bytes());
    hex::encode(hasher.finalize())
}

/// Proof of key code possession submitted on finalize.
fn checksum(key_code: &KeyCode, package_code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key_code.expose().as_bytes());
    hasher.update(package_code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Append the key code as a URL fragment, which browsers never send.
fn retrieval_link(url: &str, key_code: &KeyCode) -> String {
    let separator = if url.contains('#') { '&' } else { '#' };
    format!("{}{}keyCode={}", url, separator, key_code.expose())
}

fn generate_key_code() -> KeyCode {
    let mut bytes = [0u8; KEY_CODE_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    KeyCode::new(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}
