use rocket::http::{Accept, ContentType, MediaType, QMediaType};
use rocket::request::{FromRequest, Outcome, Request};
use std::convert::Infallible;

/// The representations the color resource knows how to write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Representation {
    Json,
    Text,
}

impl Representation {
    pub fn content_type(self) -> ContentType {
        match self {
            Representation::Json => ContentType::JSON,
            Representation::Text => ContentType::Plain,
        }
    }

    fn matches(self, media: &MediaType) -> bool {
        if media.top() == "*" {
            return true;
        }
        match self {
            Representation::Json => {
                media.is_json() || (media.top() == "application" && media.sub() == "*")
            }
            Representation::Text => {
                media.is_plain() || (media.top() == "text" && media.sub() == "*")
            }
        }
    }
}

/// What the client asked for in its `Accept` header.
#[derive(Clone, Debug, Default)]
pub struct Negotiation {
    accept: Option<Accept>,
}

impl Negotiation {
    pub fn new(accept: Option<Accept>) -> Self {
        Self { accept }
    }

    /// Pick one of `offered`. The client's preferred type is tried first, then
    /// the rest of its list in order. No `Accept` header takes the first offer.
    /// A range weighted `q=0` refuses whatever it names.
    pub fn select(&self, offered: &[Representation]) -> Option<Representation> {
        let accept = match &self.accept {
            None => return offered.first().copied(),
            Some(a) => a,
        };
        let allowed: Vec<Representation> = offered
            .iter()
            .copied()
            .filter(|r| !accept.iter().any(|q| refuses(q, *r)))
            .collect();
        let preferred = accept.preferred();
        if !zero_weight(preferred) {
            if let Some(r) = allowed.iter().find(|r| r.matches(preferred.media_type())) {
                return Some(*r);
            }
        }
        accept
            .iter()
            .filter(|q| !zero_weight(q))
            .find_map(|q| allowed.iter().copied().find(|r| r.matches(q.media_type())))
    }
}

fn zero_weight(q: &QMediaType) -> bool {
    q.weight().map_or(false, |w| w <= 0.0)
}

// `*/*;q=0` is not read as refusing everything named elsewhere in the list
fn refuses(q: &QMediaType, r: Representation) -> bool {
    zero_weight(q) && q.media_type().top() != "*" && r.matches(q.media_type())
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Negotiation {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(Negotiation::new(req.accept().cloned()))
    }
}
