use crate::negotiate::{Negotiation, Representation};
use crate::routes::{Error, Result};
use crate::util::Settings;
use color_service_store::{Color, ColorStore};
use rocket::http::ContentType;

/// A body plus the content type it was written in.
pub type Rendered = (ContentType, String);

const NAME_REPRESENTATIONS: [Representation; 2] = [Representation::Json, Representation::Text];
const OBJECT_REPRESENTATIONS: [Representation; 1] = [Representation::Json];

/// The HTTP-facing side of the color store. Owns the store outright.
#[derive(Debug)]
pub struct ColorResource {
    store: ColorStore,
}

impl ColorResource {
    pub fn new(store: ColorStore) -> Self {
        Self { store }
    }

    pub fn from_settings(settings: &Settings) -> color_service_store::Result<Self> {
        let palette = settings.palette.clone();
        let store = match &settings.default_color {
            Some(name) => ColorStore::with_initial(palette, name)?,
            None => ColorStore::new(palette),
        };
        Ok(Self::new(store))
    }

    pub fn set(&self, name: &str) -> Result<Color> {
        let color = self.store.set(name)?;
        log::info!(
            "=> color is now {} ({}, {}, {})",
            color.name,
            color.r,
            color.g,
            color.b
        );
        Ok(color)
    }

    /// The current name, as a JSON string or bare text.
    pub fn name(&self, negotiation: &Negotiation) -> Result<Rendered> {
        let repr = negotiation
            .select(&NAME_REPRESENTATIONS)
            .ok_or(Error::NotAcceptable)?;
        let color = self.store.get()?;
        let body = match repr {
            Representation::Json => serde_json::to_string(&color.name)?,
            Representation::Text => color.name,
        };
        Ok((repr.content_type(), body))
    }

    pub fn object(&self, negotiation: &Negotiation) -> Result<Rendered> {
        let repr = negotiation
            .select(&OBJECT_REPRESENTATIONS)
            .ok_or(Error::NotAcceptable)?;
        let color = self.store.get()?;
        let body = match repr {
            Representation::Json => serde_json::to_string(&color)?,
            Representation::Text => return Err(Error::NotAcceptable),
        };
        Ok((repr.content_type(), body))
    }
}
