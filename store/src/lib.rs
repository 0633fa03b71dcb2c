pub mod error;
pub mod palette;
pub mod store;

pub use error::Error;
pub use palette::{Palette, Rgb};
pub use store::ColorStore;

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

/// A named RGB triple, as served by the color resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(name: &str, rgb: Rgb) -> Self {
        Self {
            name: name.to_string(),
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
        }
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}
