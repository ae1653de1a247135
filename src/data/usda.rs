//! USDA AMS market report integration (MARS API).
//!
//! The endpoint returns `{ "results": [ {...}, ... ] }` where every record is
//! an untyped object. We only fetch and unwrap the body here; field handling
//! lives in `io::ingest`.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::ReportError;
use crate::io::rules::RawRecord;
use crate::io::snapshot::{read_report_json, records_from_body};

/// Environment variable holding the MARS API key.
pub const API_KEY_VAR: &str = "USDA_API_KEY";

/// Anything that can produce the raw records of one report.
pub trait ReportSource {
    fn fetch(&self) -> Result<Vec<RawRecord>, ReportError>;

    /// Short human-readable origin, for logs and status lines.
    fn describe(&self) -> String;
}

impl<S: ReportSource + ?Sized> ReportSource for Box<S> {
    fn fetch(&self) -> Result<Vec<RawRecord>, ReportError> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

pub struct UsdaClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl UsdaClient {
    /// Build a client using the API key from the environment (`.env` honored).
    ///
    /// Fails fast when the key is missing; no request is attempted.
    pub fn from_env(endpoint: &str, timeout: Duration) -> Result<Self, ReportError> {
        dotenvy::dotenv().ok();
        let api_key = resolve_api_key(std::env::var(API_KEY_VAR).ok())?;
        Self::new(endpoint, api_key, timeout)
    }

    pub fn new(endpoint: &str, api_key: String, timeout: Duration) -> Result<Self, ReportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }
}

impl ReportSource for UsdaClient {
    fn fetch(&self) -> Result<Vec<RawRecord>, ReportError> {
        tracing::info!(endpoint = %self.endpoint, "fetching market report");

        let resp = self
            .client
            .get(&self.endpoint)
            .basic_auth(&self.api_key, Some(""))
            .send()
            .map_err(|e| ReportError::Transport(format!("Report request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(ReportError::Transport(format!(
                "Report request failed with status {}.",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .map_err(|e| ReportError::Transport(format!("Failed to parse report response: {e}")))?;

        let records = records_from_body(body);
        tracing::info!(records = records.len(), "market report received");
        Ok(records)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

/// A report body saved to disk (see `vog save`).
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSource for FileSource {
    fn fetch(&self) -> Result<Vec<RawRecord>, ReportError> {
        tracing::info!(path = %self.path.display(), "reading saved market report");
        read_report_json(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn resolve_api_key(value: Option<String>) -> Result<String, ReportError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ReportError::MissingCredential(format!("set {API_KEY_VAR} in the environment (.env).")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_missing_key_fails_fast() {
        assert!(matches!(resolve_api_key(None), Err(ReportError::MissingCredential(_))));
        assert!(matches!(
            resolve_api_key(Some("   ".to_string())),
            Err(ReportError::MissingCredential(_))
        ));
        assert_eq!(resolve_api_key(Some(" abc ".to_string())).unwrap(), "abc");
    }

    #[test]
    fn file_source_reads_saved_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, r#"{"results": [{"class": "Heifers", "avg_price": 250}]}"#).unwrap();

        let source: Box<dyn ReportSource> = Box::new(FileSource::new(&path));
        let records = source.fetch().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(source.describe(), path.display().to_string());
    }

    /// Serve one canned HTTP response on a local port after `delay`.
    fn serve_once(response: &'static str, delay: Duration) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            std::thread::sleep(delay);
            let _ = stream.write_all(response.as_bytes());
        });
        format!("http://{addr}/report")
    }

    fn client(endpoint: &str) -> UsdaClient {
        UsdaClient::new(endpoint, "test-key".to_string(), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn server_error_status_is_transport() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            Duration::ZERO,
        );
        let err = client(&url).fetch().unwrap_err();
        assert!(matches!(err, ReportError::Transport(ref msg) if msg.contains("500")), "{err:?}");
    }

    #[test]
    fn slow_server_times_out_as_transport() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
            Duration::from_secs(3),
        );
        let err = client(&url).fetch().unwrap_err();
        assert!(matches!(err, ReportError::Transport(_)), "{err:?}");
    }

    #[test]
    fn undecodable_body_is_transport() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot json!",
            Duration::ZERO,
        );
        let err = client(&url).fetch().unwrap_err();
        assert!(matches!(err, ReportError::Transport(_)), "{err:?}");
    }

    #[test]
    fn refused_connection_is_transport() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let err = client(&format!("http://{addr}/report")).fetch().unwrap_err();
        assert!(matches!(err, ReportError::Transport(_)), "{err:?}");
    }

    #[test]
    fn results_body_is_unwrapped() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 34\r\nConnection: close\r\n\r\n{\"results\": [{\"class\": \"Steers\"}]}",
            Duration::ZERO,
        );
        let records = client(&url).fetch().unwrap();
        assert_eq!(records.len(), 1);
    }
}
