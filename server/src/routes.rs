use crate::auth::{self, BasicAuth, Realm};
use crate::negotiate::Negotiation;
use crate::resource::{ColorResource, Rendered};
use crate::util::{Settings, TlsFiles};
use color_service_store::Error as StoreError;
use rocket::config::TlsConfig;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::{catchers, get, post, routes, Build, Config, Request, Response, Rocket, State};
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, Error>;

/// Which socket a Rocket instance binds.
#[derive(Clone, Debug)]
pub enum Listener {
    Plain,
    Tls(TlsFiles),
}

// the value rides on the path; any body is ignored
#[post("/color/<name>")]
pub fn set_color(
    user: BasicAuth,
    resource: &State<Arc<ColorResource>>,
    name: &str,
) -> Result<Status> {
    log::debug!("{} sets the color to {}", user.username, name);
    resource.set(name)?;
    Ok(Status::NoContent)
}

#[get("/color")]
pub fn color_name(
    _user: BasicAuth,
    resource: &State<Arc<ColorResource>>,
    negotiation: Negotiation,
) -> Result<Rendered> {
    resource.name(&negotiation)
}

#[get("/color/object")]
pub fn color_object(
    _user: BasicAuth,
    resource: &State<Arc<ColorResource>>,
    negotiation: Negotiation,
) -> Result<Rendered> {
    resource.object(&negotiation)
}

pub fn build_rocket(
    settings: &Settings,
    resource: Arc<ColorResource>,
    listener: &Listener,
) -> Rocket<Build> {
    let mut config = Config {
        address: settings.address,
        port: settings.http_port,
        ..Config::default()
    };
    if let Listener::Tls(files) = listener {
        config.port = settings.https_port;
        config.tls = Some(TlsConfig::from_paths(&files.certs, &files.key));
    }
    rocket::build()
        .configure(config)
        .mount(
            settings.base.as_str(),
            routes![set_color, color_name, color_object],
        )
        .register(settings.base.as_str(), catchers![auth::unauthorized])
        .attach(CORS)
        .manage(resource)
        .manage(Realm::new(settings.users.clone()))
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Color(#[from] StoreError),
    #[error("no acceptable representation")]
    NotAcceptable,
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

use rocket::response::{self, Responder};
impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> response::Result<'static> {
        log::warn!("{} {} => {}", req.method(), req.uri(), self);
        let status = match &self {
            Error::Color(StoreError::NoColorSet) => Status::NotFound,
            Error::Color(_) => Status::BadRequest,
            Error::NotAcceptable => Status::NotAcceptable,
            Error::Json(_) => return Status::InternalServerError.respond_to(req),
        };
        (status, self.to_string()).respond_to(req)
    }
}

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CHALLENGE;
    use color_service_store::{ColorStore, Palette};
    use rocket::http::{ContentType, Header};
    use rocket::local::blocking::Client;

    const SNOOPY: &str = "Basic c25vb3B5OnBhc3M=";
    const SNOOPY_WRONG: &str = "Basic c25vb3B5Ondyb25n";

    fn client_with(settings: Settings) -> Client {
        let resource = Arc::new(ColorResource::from_settings(&settings).unwrap());
        let rocket = build_rocket(&settings, resource, &Listener::Plain);
        Client::tracked(rocket).expect("valid rocket")
    }

    fn client() -> Client {
        client_with(Settings::default())
    }

    fn auth() -> Header<'static> {
        Header::new("Authorization", SNOOPY)
    }

    #[test]
    fn test_post_then_get_name() {
        let client = client();
        let res = client.post("/color/green").header(auth()).dispatch();
        assert_eq!(res.status(), Status::NoContent);

        let res = client
            .get("/color")
            .header(auth())
            .header(Header::new("Accept", "application/json"))
            .dispatch();
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.content_type(), Some(ContentType::JSON));
        let name: String = serde_json::from_str(&res.into_string().unwrap()).unwrap();
        assert_eq!(name, "green");
    }

    #[test]
    fn test_post_is_idempotent() {
        let client = client();
        for _ in 0..2 {
            let res = client.post("/color/green").header(auth()).dispatch();
            assert_eq!(res.status(), Status::NoContent);
            let res = client
                .get("/color")
                .header(auth())
                .header(Header::new("Accept", "text/plain"))
                .dispatch();
            assert_eq!(res.status(), Status::Ok);
            assert_eq!(res.into_string().unwrap(), "green");
        }
    }

    #[test]
    fn test_post_body_is_ignored() {
        let client = client();
        let res = client
            .post("/color/blue")
            .header(auth())
            .body("{\"name\":\"red\"}")
            .dispatch();
        assert_eq!(res.status(), Status::NoContent);
        let res = client.get("/color/object").header(auth()).dispatch();
        assert_eq!(
            res.into_string().unwrap(),
            r#"{"name":"blue","r":0,"g":0,"b":255}"#
        );
    }

    #[test]
    fn test_every_name_round_trips() {
        let client = client();
        let palette = Palette::default();
        for name in palette.names() {
            let res = client.post(format!("/color/{}", name)).header(auth()).dispatch();
            assert_eq!(res.status(), Status::NoContent);
            let res = client
                .get("/color/object")
                .header(auth())
                .header(Header::new("Accept", "application/json"))
                .dispatch();
            assert_eq!(res.status(), Status::Ok);
            let got: color_service_store::Color =
                serde_json::from_str(&res.into_string().unwrap()).unwrap();
            assert_eq!(Some(got), palette.lookup(name));
        }
    }

    #[test]
    fn test_unset_reads_are_404() {
        let client = client();
        let res = client.get("/color").header(auth()).dispatch();
        assert_eq!(res.status(), Status::NotFound);
        let res = client.get("/color/object").header(auth()).dispatch();
        assert_eq!(res.status(), Status::NotFound);
    }

    #[test]
    fn test_unknown_name_is_400_and_keeps_state() {
        let client = client();
        let res = client.post("/color/ultraviolet").header(auth()).dispatch();
        assert_eq!(res.status(), Status::BadRequest);
        let res = client.get("/color").header(auth()).dispatch();
        assert_eq!(res.status(), Status::NotFound);

        client.post("/color/green").header(auth()).dispatch();
        let res = client.post("/color/ultraviolet").header(auth()).dispatch();
        assert_eq!(res.status(), Status::BadRequest);
        let res = client
            .get("/color")
            .header(auth())
            .header(Header::new("Accept", "text/plain"))
            .dispatch();
        assert_eq!(res.into_string().unwrap(), "green");
    }

    #[test]
    fn test_not_acceptable() {
        let client = client();
        client.post("/color/green").header(auth()).dispatch();
        let res = client
            .get("/color/object")
            .header(auth())
            .header(Header::new("Accept", "text/plain"))
            .dispatch();
        assert_eq!(res.status(), Status::NotAcceptable);
        let res = client
            .get("/color")
            .header(auth())
            .header(Header::new("Accept", "application/xml"))
            .dispatch();
        assert_eq!(res.status(), Status::NotAcceptable);
        let res = client
            .get("/color/object")
            .header(auth())
            .header(Header::new("Accept", "text/plain, application/json;q=0"))
            .dispatch();
        assert_eq!(res.status(), Status::NotAcceptable);
    }

    #[test]
    fn test_missing_credentials_challenge() {
        let client = client();
        let res = client.post("/color/green").dispatch();
        assert_eq!(res.status(), Status::Unauthorized);
        assert_eq!(res.headers().get_one("WWW-Authenticate"), Some(CHALLENGE));
        let res = client.get("/color").dispatch();
        assert_eq!(res.status(), Status::Unauthorized);
    }

    #[test]
    fn test_realm_rejects_wrong_password() {
        let mut settings = Settings::default();
        settings
            .users
            .insert("snoopy".to_string(), "pass".to_string());
        let client = client_with(settings);
        let res = client
            .post("/color/green")
            .header(Header::new("Authorization", SNOOPY_WRONG))
            .dispatch();
        assert_eq!(res.status(), Status::Unauthorized);
        let res = client.post("/color/green").header(auth()).dispatch();
        assert_eq!(res.status(), Status::NoContent);
    }

    #[test]
    fn test_default_color_and_base() {
        let mut settings = Settings::default();
        settings.default_color = Some("blue".to_string());
        settings.base = "/app".to_string();
        let client = client_with(settings);
        let res = client.get("/app/color").header(auth()).dispatch();
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(res.into_string().unwrap(), "\"blue\"");
        let res = client.get("/color").header(auth()).dispatch();
        assert_eq!(res.status(), Status::NotFound);
    }

    #[test]
    fn test_cors_headers() {
        let client = client();
        let res = client.post("/color/red").header(auth()).dispatch();
        assert_eq!(
            res.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
    }
}
