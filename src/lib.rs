use std::fmt::Display;

pub mod asset;
pub mod cache;
pub mod compose;
pub mod conf;
pub mod content;
pub mod fingerprint;
pub mod locale;
pub mod routes;
pub mod storage;
pub mod templates;
#[doc(hidden)]
pub mod testing;

/// Anything that keeps the server from starting.
#[derive(Debug)]
pub enum StartupError {
    /// The configuration could not be read or deserialized.
    Config(config::ConfigError),
    /// The asset tree could not be fingerprinted.
    Assets(asset::AssetError),
    /// The locale configuration is inconsistent.
    Locales(locale::LocaleError),
    /// Page content for a supported locale is missing or malformed.
    Content(content::ContentError),
    /// A template failed to load or parse.
    Templates(minijinja::Error),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {}", e),
            Self::Assets(e) => write!(f, "Asset error: {}", e),
            Self::Locales(e) => write!(f, "Locale error: {}", e),
            Self::Content(e) => write!(f, "Content error: {}", e),
            Self::Templates(e) => write!(f, "Template error: {}", e),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<config::ConfigError> for StartupError {
    fn from(value: config::ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<asset::AssetError> for StartupError {
    fn from(value: asset::AssetError) -> Self {
        Self::Assets(value)
    }
}

impl From<locale::LocaleError> for StartupError {
    fn from(value: locale::LocaleError) -> Self {
        Self::Locales(value)
    }
}

impl From<content::ContentError> for StartupError {
    fn from(value: content::ContentError) -> Self {
        Self::Content(value)
    }
}

impl From<minijinja::Error> for StartupError {
    fn from(value: minijinja::Error) -> Self {
        Self::Templates(value)
    }
}
