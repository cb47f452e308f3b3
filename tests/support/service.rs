//! Fake package service.
//!
//! An `httpmock` server with one mock per package operation. Each mock is
//! routed by a matcher that also records the request it accepts, so tests
//! can inspect bodies and headers after a run. Operations can be answered
//! with an error code instead, chosen before the server starts.

use std::collections::HashMap;
use std::sync::Mutex;

use httpmock::prelude::*;
use serde_json::{json, Value};

/// Package id the service hands out.
pub const PACKAGE_ID: &str = "PKG-1";

/// File id the service hands out.
pub const FILE_ID: &str = "FILE-1";

/// Requests accepted so far, keyed by server port.
///
/// Matchers are plain function pointers, so they record through a static.
/// Pooled servers reuse ports; a starting service clears its entry.
static RECEIVED: Mutex<Option<HashMap<u16, Vec<Recorded>>>> = Mutex::new(None);

/// Every operation the service answers.
const OPERATIONS: &[&str] = &[
    "create", "info", "life", "register", "upload", "message", "recipient", "finalize",
];

/// One request as received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Recorded {
    fn from_request(req: &HttpMockRequest) -> Self {
        let headers = req
            .headers
            .iter()
            .flatten()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect();
        Self {
            method: req.method.clone(),
            path: req.path.clone(),
            headers,
            body: req.body.clone().unwrap_or_default(),
        }
    }

    /// Operation name this request maps to.
    pub fn operation(&self) -> &'static str {
        operation(&self.method, &self.path)
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn port(&self) -> Option<u16> {
        self.header("host")?.rsplit(':').next()?.parse().ok()
    }
}

/// Configures a [`FakeService`] before it starts.
#[derive(Default)]
pub struct ServiceBuilder {
    rejections: HashMap<&'static str, (String, String)>,
    notified: Vec<String>,
}

impl ServiceBuilder {
    /// Answer `op` with error `code`.
    pub fn reject(mut self, op: &'static str, code: &str, message: &str) -> Self {
        self.rejections
            .insert(op, (code.to_string(), message.to_string()));
        self
    }

    /// Recipients listed as notified when a finalize asks for notification.
    pub fn notifies(mut self, emails: &[&str]) -> Self {
        self.notified = emails.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn start(self) -> FakeService {
        let server = MockServer::start();
        received(|all| {
            all.insert(server.port(), Vec::new());
        });

        for &op in OPERATIONS {
            match self.rejections.get(op) {
                Some((code, message)) => reject(&server, op, code, message),
                None => answer(&server, op, &self.notified),
            }
        }

        FakeService {
            endpoint: server.base_url(),
            server,
        }
    }
}

/// Handle to a running fake service.
pub struct FakeService {
    endpoint: String,
    server: MockServer,
}

impl FakeService {
    /// Start a service that accepts every operation.
    pub fn start() -> Self {
        Self::builder().start()
    }

    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn requests(&self) -> Vec<Recorded> {
        received(|all| all.get(&self.server.port()).cloned().unwrap_or_default())
    }

    /// Operation names of every request, in arrival order.
    pub fn operations(&self) -> Vec<&'static str> {
        self.requests().iter().map(Recorded::operation).collect()
    }

    /// Requests for one operation.
    pub fn of(&self, op: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.operation() == op)
            .collect()
    }

    /// Server secret handed out for `package_id`.
    pub fn server_secret(package_id: &str) -> String {
        format!("secret-{}", package_id)
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        let port = self.server.port();
        received(|all| {
            all.remove(&port);
        });
    }
}

fn received<T>(f: impl FnOnce(&mut HashMap<u16, Vec<Recorded>>) -> T) -> T {
    let mut guard = RECEIVED.lock().unwrap_or_else(|e| e.into_inner());
    f(guard.get_or_insert_with(HashMap::new))
}

fn operation(method: &str, path: &str) -> &'static str {
    let rest = path.trim_start_matches("/api/v2.0/package/");
    let parts: Vec<&str> = rest.split('/').filter(|p| !p.is_empty()).collect();
    match (method, parts.as_slice()) {
        ("PUT", []) => "create",
        ("GET", [_]) => "info",
        ("POST", [_]) => "life",
        ("PUT", [_, "file"]) => "register",
        ("POST", [_, "file", _]) => "upload",
        ("PUT", [_, "message"]) => "message",
        ("PUT", [_, "recipient"]) => "recipient",
        ("POST", [_, "finalize"]) => "finalize",
        _ => "unknown",
    }
}

/// Accept `req` if it is `op` and `extra` holds, recording it once.
fn route(req: &HttpMockRequest, op: &str, extra: bool) -> bool {
    let hit = operation(&req.method, &req.path) == op && extra;
    if hit {
        let recorded = Recorded::from_request(req);
        if let Some(port) = recorded.port() {
            received(|all| all.entry(port).or_default().push(recorded));
        }
    }
    hit
}

fn asks_to_notify(req: &HttpMockRequest) -> bool {
    req.body
        .as_deref()
        .and_then(|body| serde_json::from_slice::<Value>(body).ok())
        .and_then(|v| v.get("notifyRecipients").and_then(Value::as_bool))
        .unwrap_or(false)
}

fn reject(server: &MockServer, op: &'static str, code: &str, message: &str) {
    let body = json!({ "response": code, "message": message });
    server.mock(|when, then| {
        when.matches(matcher(op));
        then.status(200).json_body(body);
    });
}

fn answer(server: &MockServer, op: &'static str, notified: &[String]) {
    let url = format!(
        "https://files.example.com/receive/?packageCode=code-{}",
        PACKAGE_ID
    );
    match op {
        "finalize" => {
            server.mock(|when, then| {
                when.matches(|req| route(req, "finalize", asks_to_notify(req)));
                then.status(200).json_body(json!({
                    "response": "SUCCESS",
                    "url": url,
                    "recipients": notified,
                    "message": "Package finalized",
                }));
            });
            server.mock(|when, then| {
                when.matches(|req| route(req, "finalize", !asks_to_notify(req)));
                then.status(200).json_body(json!({
                    "response": "SUCCESS",
                    "url": url,
                    "recipients": [],
                    "message": "Package finalized",
                }));
            });
        }
        _ => {
            let body = match op {
                "create" => json!({ "response": "SUCCESS", "packageId": PACKAGE_ID }),
                "info" => json!({
                    "response": "SUCCESS",
                    "packageId": PACKAGE_ID,
                    "packageCode": format!("code-{}", PACKAGE_ID),
                    "serverSecret": FakeService::server_secret(PACKAGE_ID),
                }),
                "register" => json!({ "response": "SUCCESS", "fileId": FILE_ID }),
                _ => json!({ "response": "SUCCESS" }),
            };
            server.mock(|when, then| {
                when.matches(matcher(op));
                then.status(200).json_body(body);
            });
        }
    }
}

/// Matcher accepting exactly the requests for `op`.
fn matcher(op: &str) -> fn(&HttpMockRequest) -> bool {
    match op {
        "create" => |req| route(req, "create", true),
        "info" => |req| route(req, "info", true),
        "life" => |req| route(req, "life", true),
        "register" => |req| route(req, "register", true),
        "upload" => |req| route(req, "upload", true),
        "message" => |req| route(req, "message", true),
        "recipient" => |req| route(req, "recipient", true),
        _ => |req| route(req, "finalize", true),
    }
}
