use base64::{engine::general_purpose::STANDARD, Engine as _};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::response::{self, Responder, Response};
use std::collections::BTreeMap;

pub const CHALLENGE: &str = r#"Basic realm="color""#;

/// Known users. With an empty table any well-formed credentials are let
/// through and checking them is left to whatever sits in front of the service.
#[derive(Clone, Debug, Default)]
pub struct Realm {
    users: BTreeMap<String, String>,
}

impl Realm {
    pub fn new(users: BTreeMap<String, String>) -> Self {
        Self { users }
    }

    pub fn verify(&self, creds: &BasicAuth) -> bool {
        if self.users.is_empty() {
            return true;
        }
        self.users.get(&creds.username) == Some(&creds.password)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    /// Parse an `Authorization` header value.
    pub fn parse(header: &str) -> Result<Self, AuthError> {
        let (scheme, encoded) = header.trim().split_once(' ').ok_or(AuthError::Malformed)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::Scheme(scheme.to_string()));
        }
        let decoded = String::from_utf8(STANDARD.decode(encoded.trim())?)?;
        let (username, password) = decoded.split_once(':').ok_or(AuthError::Malformed)?;
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing credentials")]
    Missing,
    #[error("unsupported auth scheme {0}")]
    Scheme(String),
    #[error("malformed credentials")]
    Malformed,
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("utf8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("rejected credentials for {0}")]
    Rejected(String),
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BasicAuth {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let header = match req.headers().get_one("Authorization") {
            Some(h) => h,
            None => return Outcome::Error((Status::Unauthorized, AuthError::Missing)),
        };
        let creds = match BasicAuth::parse(header) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{} {}: {}", req.method(), req.uri(), e);
                return Outcome::Error((Status::Unauthorized, e));
            }
        };
        let trusted = req
            .rocket()
            .state::<Realm>()
            .map_or(true, |realm| realm.verify(&creds));
        if !trusted {
            log::warn!("{} {}: rejected user {}", req.method(), req.uri(), creds.username);
            return Outcome::Error((Status::Unauthorized, AuthError::Rejected(creds.username)));
        }
        Outcome::Success(creds)
    }
}

/// 401 with the basic-auth challenge header.
pub struct Challenge;

impl<'r> Responder<'r, 'static> for Challenge {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .status(Status::Unauthorized)
            .raw_header("WWW-Authenticate", CHALLENGE)
            .ok()
    }
}

#[rocket::catch(401)]
pub fn unauthorized() -> Challenge {
    Challenge
}
