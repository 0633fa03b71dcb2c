#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unknown color name: {0}")]
    UnknownColorName(String),
    #[error("no color has been set")]
    NoColorSet,
    #[error("color name must not be empty")]
    EmptyName,
}
