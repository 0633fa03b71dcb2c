use crate::{Color, Error, Result};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const BLACK: Rgb = Rgb::new(0, 0, 0);
pub const WHITE: Rgb = Rgb::new(255, 255, 255);
pub const RED: Rgb = Rgb::new(255, 0, 0);
pub const GREEN: Rgb = Rgb::new(0, 255, 0);
pub const BLUE: Rgb = Rgb::new(0, 0, 255);
pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
pub const CYAN: Rgb = Rgb::new(0, 255, 255);
pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);
pub const ORANGE: Rgb = Rgb::new(255, 165, 0);
pub const PURPLE: Rgb = Rgb::new(128, 0, 128);
pub const GRAY: Rgb = Rgb::new(128, 128, 128);

const BUILTIN: [(&str, Rgb); 11] = [
    ("black", BLACK),
    ("white", WHITE),
    ("red", RED),
    ("green", GREEN),
    ("blue", BLUE),
    ("yellow", YELLOW),
    ("cyan", CYAN),
    ("magenta", MAGENTA),
    ("orange", ORANGE),
    ("purple", PURPLE),
    ("gray", GRAY),
];

/// The recognized-name mapping. Names match exactly (case-sensitive).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette(BTreeMap<String, Rgb>);

impl Default for Palette {
    fn default() -> Self {
        let table = BUILTIN
            .iter()
            .map(|(name, rgb)| (name.to_string(), *rgb))
            .collect();
        Self(table)
    }
}

impl Palette {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds a name, replacing any existing triple for it.
    pub fn insert(&mut self, name: &str, rgb: Rgb) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if let Some(old) = self.0.insert(name.to_string(), rgb) {
            log::debug!("palette entry {} replaced (was {:?})", name, old);
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Color> {
        self.0.get(name).map(|rgb| Color::new(name, *rgb))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
