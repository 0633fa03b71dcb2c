pub mod scenario;

use reqwest::header::ACCEPT;
use reqwest::{redirect, Client};
pub use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("bad url: {0}")]
    Url(#[from] url::ParseError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} cannot be used as a base url")]
    NotABase(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// How much a transactor trusts the server it talks to.
///
/// The default trusts any certificate chain and any hostname, which is only
/// meant for reaching test servers with self-signed certificates. Each
/// transactor builds its own client from this, so the relaxation never
/// reaches any other connection in the process.
#[derive(Clone, Debug)]
pub struct TrustAllConfig {
    pub accept_invalid_certs: bool,
    pub accept_invalid_hostnames: bool,
    pub max_redirects: usize,
    pub timeout: Duration,
    pub credentials: Option<Credentials>,
}

impl Default for TrustAllConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: true,
            accept_invalid_hostnames: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            timeout: DEFAULT_TIMEOUT,
            credentials: None,
        }
    }
}

impl TrustAllConfig {
    /// Normal certificate and hostname verification.
    pub fn strict() -> Self {
        Self {
            accept_invalid_certs: false,
            accept_invalid_hostnames: false,
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaType {
    Json,
    Text,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Json => "application/json",
            MediaType::Text => "text/plain",
        }
    }
}

/// Status and body of one transaction. The status is not interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

pub struct TrustAllTransactor {
    base: Url,
    client: Client,
    credentials: Option<Credentials>,
}

impl TrustAllTransactor {
    pub fn new(base: &str, config: TrustAllConfig) -> Result<Self> {
        let mut base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            return Err(Error::NotABase(base.to_string()));
        }
        // without a trailing slash, join() would replace the last segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .danger_accept_invalid_hostnames(config.accept_invalid_hostnames)
            .redirect(redirect_policy(config.max_redirects))
            .timeout(config.timeout)
            .build()?;
        if config.accept_invalid_certs && base.scheme() == "https" {
            log::warn!("=> trusting any certificate presented by {}", base);
        }
        Ok(Self {
            base,
            client,
            credentials: config.credentials,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Append each segment percent-encoded, so `/`, `?` or `#` in a segment
    /// stay part of it.
    pub fn segments(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::NotABase(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// One request/response exchange. Redirects are followed by the client.
    pub async fn transact(
        &self,
        method: Method,
        path: &str,
        accept: Option<MediaType>,
    ) -> Result<Reply> {
        let url = self.url(path)?;
        self.send(method, url, accept).await
    }

    pub async fn send(&self, method: Method, url: Url, accept: Option<MediaType>) -> Result<Reply> {
        let mut req = self.client.request(method.clone(), url.clone());
        if let Some(media) = accept {
            req = req.header(ACCEPT, media.as_str());
        }
        if let Some(creds) = &self.credentials {
            req = req.basic_auth(&creds.username, Some(&creds.password));
        }
        let res = req.send().await?;
        let status = res.status().as_u16();
        let body = res.text().await?;
        log::debug!("{} {} => {}", method, url, status);
        Ok(Reply { status, body })
    }

    pub async fn get(&self, path: &str, accept: Option<MediaType>) -> Result<Reply> {
        self.transact(Method::GET, path, accept).await
    }

    pub async fn post(&self, path: &str) -> Result<Reply> {
        self.transact(Method::POST, path, None).await
    }
}

// with no redirects allowed the 3xx itself is handed back
fn redirect_policy(max_redirects: usize) -> redirect::Policy {
    match max_redirects {
        0 => redirect::Policy::none(),
        max => redirect::Policy::limited(max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let t = TrustAllTransactor::new("http://localhost:8080/app", TrustAllConfig::default())
            .unwrap();
        assert_eq!(t.base().as_str(), "http://localhost:8080/app/");
        assert_eq!(
            t.url("color/green").unwrap().as_str(),
            "http://localhost:8080/app/color/green"
        );
        assert_eq!(
            t.url("/color").unwrap().as_str(),
            "http://localhost:8080/app/color"
        );
    }

    #[test]
    fn test_segments_are_encoded() {
        let t = TrustAllTransactor::new("http://localhost:8080/app", TrustAllConfig::default())
            .unwrap();
        assert_eq!(
            t.segments(&["color", "green"]).unwrap().as_str(),
            "http://localhost:8080/app/color/green"
        );
        assert_eq!(
            t.segments(&["color", "a/b#c?d"]).unwrap().as_str(),
            "http://localhost:8080/app/color/a%2Fb%23c%3Fd"
        );
    }

    #[test]
    fn test_bad_url() {
        assert!(matches!(
            TrustAllTransactor::new("mailto:snoopy@example.com", TrustAllConfig::default()),
            Err(Error::NotABase(_))
        ));
        assert!(matches!(
            TrustAllTransactor::new("not a url", TrustAllConfig::default()),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn test_configs() {
        let relaxed = TrustAllConfig::default().with_credentials("snoopy", "pass");
        assert!(relaxed.accept_invalid_certs && relaxed.accept_invalid_hostnames);
        assert_eq!(relaxed.credentials, Some(Credentials::new("snoopy", "pass")));
        let strict = TrustAllConfig::strict();
        assert!(!strict.accept_invalid_certs && !strict.accept_invalid_hostnames);
        assert_eq!(strict.max_redirects, DEFAULT_MAX_REDIRECTS);
    }

    #[test]
    fn test_reply_json() {
        let reply = Reply {
            status: 200,
            body: "\"green\"".to_string(),
        };
        assert_eq!(reply.json::<String>().unwrap(), "green");
        let bad = Reply {
            status: 200,
            body: "green".to_string(),
        };
        assert!(matches!(bad.json::<String>(), Err(Error::Json(_))));
    }
}
