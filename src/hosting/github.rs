use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::config::{Credentials, HostingConfig};
use crate::error::{ReleaseError, Result};
use crate::hosting::{ReleaseHost, RepoIdentity};

const COLLABORATOR: &str = "hosting";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

#[derive(Debug, Serialize)]
struct CreateReleaseRequest<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
}

/// Creates releases through the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    client: Client,
    api_url: String,
    timeout: Duration,
}

impl GitHubReleases {
    pub fn new(config: &HostingConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("monorel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReleaseError::external(COLLABORATOR, format!("cannot build HTTP client: {}", e)))?;

        Ok(GitHubReleases {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn releases_url(&self, repo: &RepoIdentity) -> String {
        format!("{}/repos/{}/releases", self.api_url, repo.name)
    }
}

impl ReleaseHost for GitHubReleases {
    fn create_release(
        &self,
        tag_name: &str,
        notes: &str,
        repo: &RepoIdentity,
        credentials: &Credentials,
    ) -> Result<()> {
        let url = self.releases_url(repo);
        debug!("POST {}", url);

        let payload = CreateReleaseRequest {
            tag_name,
            name: tag_name,
            body: notes,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(credentials.token.expose_secret())
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .json(&payload)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ReleaseError::timeout(format!("create release {}", tag_name), self.timeout)
                } else {
                    ReleaseError::external(COLLABORATOR, format!("request to {} failed: {}", url, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReleaseError::external(
                COLLABORATOR,
                format!("release {} rejected with {}: {}", tag_name, status, body.trim()),
            ));
        }

        info!("created release {} on {}", tag_name, repo.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Committer;
    use secrecy::SecretString;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn credentials() -> Credentials {
        Credentials {
            committer: Committer {
                name: "Release Bot".to_string(),
                email: "bot@example.com".to_string(),
            },
            token: SecretString::from("ghp_test".to_string()),
        }
    }

    fn repo() -> RepoIdentity {
        RepoIdentity {
            host: "github.com".to_string(),
            name: "acme/tools".to_string(),
        }
    }

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let length = text[..split]
                    .lines()
                    .find_map(|l| {
                        let (key, value) = l.split_once(':')?;
                        key.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= split + 4 + length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&raw).to_string()
    }

    /// Serve one request with `status_line` and hand back what was received
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (url, handle)
    }

    fn host(api_url: &str, timeout: Duration) -> GitHubReleases {
        let config = HostingConfig {
            api_url: api_url.to_string(),
        };
        GitHubReleases::new(&config, timeout).unwrap()
    }

    #[test]
    fn test_create_release_posts_payload() {
        let (url, server) = serve_once("201 Created", "{}");
        let host = host(&format!("{}/", url), Duration::from_secs(5));

        host.create_release("foo-v1.1.0", "## notes", &repo(), &credentials())
            .unwrap();

        let request = server.join().unwrap();
        let lower = request.to_lowercase();
        assert!(request.starts_with("POST /repos/acme/tools/releases HTTP/1.1"));
        assert!(lower.contains("authorization: bearer ghp_test"));
        assert!(lower.contains("accept: application/vnd.github+json"));
        assert!(request.contains(r#""tag_name":"foo-v1.1.0""#));
        assert!(request.contains(r#""name":"foo-v1.1.0""#));
        assert!(request.contains(r###""body":"## notes""###));
    }

    #[test]
    fn test_rejected_release_is_external_error() {
        let (url, server) = serve_once("422 Unprocessable Entity", r#"{"message":"already_exists"}"#);
        let host = host(&url, Duration::from_secs(5));

        let err = host
            .create_release("foo-v1.1.0", "notes", &repo(), &credentials())
            .unwrap_err();
        server.join().unwrap();

        assert!(err.is_external());
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("already_exists"));
    }

    #[test]
    fn test_unresponsive_host_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(2));
            drop(stream);
        });

        let host = host(&url, Duration::from_millis(200));
        let err = host
            .create_release("foo-v1.1.0", "notes", &repo(), &credentials())
            .unwrap_err();

        assert!(err.is_external());
        server.join().unwrap();
    }
}
