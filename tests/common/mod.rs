//! In-process mock of the organization API, served with `tiny_http`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use orgdash::api::ApiClient;
use orgdash::storage::{MemoryStore, TokenStore};
use serde_json::Value;
use tiny_http::{Header, Response, Server, StatusCode};

/// A request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path and query, e.g. `/api/org/reports?page=2`.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Path without the query string.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

/// What the backend answers.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, content_type: &'static str, body: &str) -> Self {
        Self {
            status,
            content_type: Some(content_type),
            body: body.to_string(),
        }
    }

    pub fn not_found() -> Self {
        Self::json(404, serde_json::json!({"success": false, "message": "Not found"}))
    }
}

/// Backend thread plus the log of requests it received. Stops on drop.
pub struct MockBackend {
    pub root: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockBackend {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> Reply + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").expect("mock server");
        let addr = server.server_addr().to_ip().expect("ip listener");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let log = Arc::clone(&requests);
        let stopping = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !stopping.load(Ordering::Relaxed) {
                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(request)) => request,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let recorded = Recorded {
                    method: request.method().as_str().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.as_str().as_str().to_string(), h.value.as_str().to_string()))
                        .collect(),
                    body,
                };

                let reply = handler(&recorded);
                log.lock().unwrap().push(recorded);

                let mut response =
                    Response::from_data(reply.body.into_bytes()).with_status_code(StatusCode(reply.status));
                if let Some(content_type) = reply.content_type {
                    response = response
                        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());
                }
                let _ = request.respond(response);
            }
        });

        Self {
            root: format!("http://{addr}"),
            requests,
            stop,
            handle: Some(handle),
        }
    }

    /// Base URL with the `/api/org` namespace, as configured in production.
    pub fn base_url(&self) -> String {
        format!("{}/api/org", self.root)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request reached the backend")
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Fresh in-memory token store and a client for `base_url` sharing it.
pub fn client_for(base_url: &str) -> (TokenStore, ApiClient) {
    let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
    let client = ApiClient::new(base_url, Some(Duration::from_secs(5)), tokens.clone());
    (tokens, client)
}

pub fn login_payload(role: &str) -> Value {
    serde_json::json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "token": "tok-123",
            "user": {
                "id": 4,
                "firstname": "Amara",
                "lastname": "Nwosu",
                "email": "amara@acme.test",
                "full_name": "Amara Nwosu"
            },
            "organization": {"id": 12, "name": "Acme Ltd", "code": "ACME", "type": "corporate"},
            "role": role,
            "permissions": ["view_dashboard", "export_data"]
        }
    })
}
