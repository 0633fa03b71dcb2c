use crate::{Color, Error, Palette, Result};
use std::sync::{PoisonError, RwLock};

/// Holds the current color. Starts empty unless built `with_initial`.
#[derive(Debug)]
pub struct ColorStore {
    palette: Palette,
    current: RwLock<Option<Color>>,
}

impl ColorStore {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            current: RwLock::new(None),
        }
    }

    pub fn with_initial(palette: Palette, name: &str) -> Result<Self> {
        let store = Self::new(palette);
        store.set(name)?;
        Ok(store)
    }

    /// Replace the current color. An unknown name leaves the store untouched.
    pub fn set(&self, name: &str) -> Result<Color> {
        let color = self
            .palette
            .lookup(name)
            .ok_or_else(|| Error::UnknownColorName(name.to_string()))?;
        // a poisoned lock still holds a whole Color (or None)
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(color.clone());
        Ok(color)
    }

    pub fn get(&self) -> Result<Color> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::NoColorSet)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}
