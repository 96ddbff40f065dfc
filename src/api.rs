// API transport module: a small blocking HTTP client that talks to the
// Coriolis REST API. Managers never touch reqwest directly, they build an
// `ApiRequest` and hand it to a `Transport`.

use std::fmt;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single call against the API, relative to the transport's base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_owned(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Seam between the managers and the wire. Returns `None` when the server
/// answered without a body.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<Option<Value>>;
}

/// Transport backed by a reqwest blocking client, holding the base URL of
/// the Coriolis API and an optional auth token.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure)
            .build()?;
        Ok(HttpTransport {
            client,
            base_url: config.url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(t) = &self.token {
            let val = HeaderValue::from_str(t)
                .map_err(|_| Error::Config("auth token contains invalid characters".into()))?;
            headers.insert(AUTH_TOKEN_HEADER, val);
        }
        Ok(headers)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!("{} {}", request.method, url);

        let mut req = self
            .client
            .request(request.method.into(), &url)
            .headers(self.headers()?);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let res = req.send().map_err(|e| {
            warn!("{} {} failed: {}", request.method, url, e);
            Error::Request(e)
        })?;
        let status = res.status();
        if !status.is_success() {
            warn!("{} {} returned {}", request.method, url, status);
            let txt = res.text().unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: error_message(&txt),
            });
        }
        let txt = res.text().map_err(|e| {
            warn!("{} {} body read failed: {}", request.method, url, e);
            Error::Request(e)
        })?;

        if txt.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&txt)
            .map_err(|e| Error::InvalidResponse(format!("{} {}: {}", request.method, url, e)))?;
        Ok(Some(value))
    }
}

/// Pulls a human readable message out of an API error body. The service
/// wraps faults either as `{"error": {"message": ..}}` or as
/// `{"<faultName>": {"message": ..}}`; anything else is returned verbatim.
pub fn error_message(body: &str) -> String {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return body.trim().to_owned(),
    };

    let obj = match parsed.as_object() {
        Some(o) => o,
        None => return body.trim().to_owned(),
    };

    if let Some(msg) = obj
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return msg.to_owned();
    }
    if obj.len() == 1 {
        if let Some(msg) = obj
            .values()
            .next()
            .and_then(|fault| fault.get("message"))
            .and_then(Value::as_str)
        {
            return msg.to_owned();
        }
    }
    if let Some(msg) = obj.get("message").and_then(Value::as_str) {
        return msg.to_owned();
    }
    body.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Accept one connection, read the full request, answer with `response`
    /// and hand back the raw request text.
    fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        });
        (url, handle)
    }

    fn transport(url: String) -> HttpTransport {
        HttpTransport::from_config(&Config {
            url,
            token: Some("secret-token".into()),
            insecure: false,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_send_headers_query_and_json() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 24\r\nConnection: close\r\n\r\n{\"transfer\":{\"id\":\"t1\"}}",
        );
        let request = ApiRequest::new(Method::Get, "/transfers").query("env", "e30=");
        let value = transport(url).send(&request).unwrap();
        assert_eq!(value, Some(serde_json::json!({"transfer": {"id": "t1"}})));

        let raw = server.join().unwrap();
        assert!(raw.starts_with("GET /v1/transfers?env=e30%3D HTTP/1.1\r\n"), "{raw}");
        let lower = raw.to_lowercase();
        assert!(lower.contains("\r\nx-auth-token: secret-token\r\n"), "{raw}");
        assert!(lower.contains("\r\naccept: application/json\r\n"), "{raw}");
    }

    #[test]
    fn test_send_posts_json_body() {
        let (url, server) =
            serve_once("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n");
        let request = ApiRequest::new(Method::Post, "/transfers/t1/actions")
            .body(serde_json::json!({"delete-disks": null}));
        assert_eq!(transport(url).send(&request).unwrap(), None);

        let raw = server.join().unwrap();
        assert!(raw.starts_with("POST /v1/transfers/t1/actions HTTP/1.1\r\n"));
        assert!(raw.to_lowercase().contains("content-type: application/json"));
        assert!(raw.ends_with("{\"delete-disks\":null}"), "{raw}");
    }

    #[test]
    fn test_send_empty_success_body_is_none() {
        let (url, server) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let request = ApiRequest::new(Method::Delete, "/transfers/t1");
        assert_eq!(transport(url).send(&request).unwrap(), None);
        assert!(server.join().unwrap().starts_with("DELETE /v1/transfers/t1 "));
    }

    #[test]
    fn test_send_maps_error_status() {
        let (url, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\nContent-Length: 32\r\nConnection: close\r\n\r\n{\"error\":{\"message\":\"not here\"}}",
        );
        let err = transport(url)
            .send(&ApiRequest::new(Method::Get, "/transfers/t9"))
            .unwrap_err();
        assert!(
            matches!(&err, Error::Http { status: 404, message } if message == "not here"),
            "{err:?}"
        );
        server.join().unwrap();
    }

    #[test]
    fn test_truncated_success_body_is_request_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 500\r\nConnection: close\r\n\r\n{\"a\":",
        );
        let err = transport(url)
            .send(&ApiRequest::new(Method::Delete, "/transfers/t1"))
            .unwrap_err();
        assert!(matches!(err, Error::Request(_)), "{err:?}");
        server.join().unwrap();
    }

    #[test]
    fn test_invalid_json_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 8\r\nConnection: close\r\n\r\nnot json",
        );
        let err = transport(url)
            .send(&ApiRequest::new(Method::Get, "/transfers"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)), "{err:?}");
        server.join().unwrap();
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"error": {"message": "boom", "code": 500}}"#),
            "boom"
        );
        assert_eq!(
            error_message(r#"{"itemNotFound": {"message": "no such transfer", "code": 404}}"#),
            "no such transfer"
        );
        assert_eq!(error_message(r#"{"message": "flat"}"#), "flat");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_message("[1, 2]"), "[1, 2]");
    }

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::new(Method::Get, "/endpoints")
            .query("env", "e30=")
            .body(serde_json::json!({"a": 1}));
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.query, vec![("env".to_owned(), "e30=".to_owned())]);
        assert!(req.body.is_some());
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_http_transport_from_config() {
        let config = Config {
            url: "https://coriolis.example:7667/v1/project/".into(),
            token: Some("abc".into()),
            insecure: true,
            timeout_secs: 5,
        };
        let transport = HttpTransport::from_config(&config).unwrap();
        assert_eq!(transport.base_url(), "https://coriolis.example:7667/v1/project");
        assert!(transport.has_token());
        assert!(transport.headers().unwrap().contains_key(AUTH_TOKEN_HEADER));
    }
}
