//! Locale-specific page content.
//!
//! Each section of the page lives in its own JSON file, one per locale:
//! `<content dir>/<section>/<locale>.json`. Lists that only depend on which
//! files exist in the asset tree (language flags, brand logos) are read from
//! there instead, since they are not translated.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    conf::{ServerConfig, ServerConfigAssets},
    locale::Locale,
};

pub const SECTION_INTRO: &str = "intro";
pub const SECTION_SERVICES: &str = "services";
pub const SECTION_BRANDS: &str = "brands";
pub const SECTION_ABOUT: &str = "about";
pub const SECTION_TEAM: &str = "team";
pub const SECTION_CONTACT: &str = "contact";

/// Every section a locale must provide.
pub const SECTIONS: [&str; 6] = [
    SECTION_INTRO,
    SECTION_SERVICES,
    SECTION_BRANDS,
    SECTION_ABOUT,
    SECTION_TEAM,
    SECTION_CONTACT,
];

/* -------------------------------------------------------------------------- */
/*                                   Errors                                   */
/* -------------------------------------------------------------------------- */

#[derive(Debug)]
pub enum ContentError {
    /// A fragment file does not exist.
    Missing(PathBuf),
    /// A fragment file exists but could not be read or decoded.
    Decode { path: PathBuf, reason: String },
    /// An asset directory could not be listed.
    Listing { path: PathBuf, reason: String },
}

impl Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "Missing content file {}", path.display()),
            Self::Decode { path, reason } => {
                write!(f, "Failed to decode {}: {}", path.display(), reason)
            }
            Self::Listing { path, reason } => {
                write!(f, "Failed to list {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for ContentError {}

/* -------------------------------------------------------------------------- */
/*                                  Fragments                                 */
/* -------------------------------------------------------------------------- */

/// The hero text at the top of the page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Intro {
    pub top: String,
    pub middle: String,
    pub bottom: String,
}

/// One priced item of a service card.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub description: String,
    pub price: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub icon: String,
    #[serde(rename = "prices")]
    pub services: Vec<Service>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Brands {
    pub title: String,
    pub description: String,
    /// Logo URLs. Filled in from the asset tree, never from JSON.
    #[serde(default, skip_deserializing)]
    pub images: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Social {
    pub icon: String,
    pub link: String,
    pub name: String,
    pub tag: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub socials: Vec<Social>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct About {
    pub title: String,
    pub description: String,
    pub button: String,
    pub extended: String,
    /// Loaded from the `team` section.
    #[serde(default, skip_deserializing)]
    pub team: Vec<Member>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub title: String,
    #[serde(rename = "items")]
    pub socials: Vec<Social>,
}

/// All translated sections of one locale, as decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleContent {
    pub intro: Intro,
    pub services: Vec<Card>,
    pub brands: Brands,
    pub about: About,
    pub team: Vec<Member>,
    pub contacts: Vec<Contact>,
}

/// A language flag icon found in the asset tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageIcon {
    /// Locale tag taken from the file stem, e.g. `fi` for `fi.svg`.
    pub tag: String,
    /// Public URL of the icon.
    pub url: String,
}

/* -------------------------------------------------------------------------- */
/*                                   Loader                                   */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct ContentLoader {
    content_dir: PathBuf,
    assets: ServerConfigAssets,
    languages_dir: String,
    brands_dir: String,
    stylesheet_fallback: String,
}

impl ContentLoader {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            content_dir: config.content.directory.clone(),
            assets: config.assets.clone(),
            languages_dir: config.content.languages_dir.clone(),
            brands_dir: config.content.brands_dir.clone(),
            stylesheet_fallback: config.content.stylesheet_fallback.clone(),
        }
    }

    /// Loads every section for `locale`.
    ///
    /// Any missing or malformed file fails the whole load.
    pub fn load(&self, locale: &Locale) -> Result<LocaleContent, ContentError> {
        let tag = locale.tag();
        info!("Loading content for locale {}", tag);
        Ok(LocaleContent {
            intro: self.section(SECTION_INTRO, tag)?,
            services: self.section(SECTION_SERVICES, tag)?,
            brands: self.section(SECTION_BRANDS, tag)?,
            about: self.section(SECTION_ABOUT, tag)?,
            team: self.section(SECTION_TEAM, tag)?,
            contacts: self.section(SECTION_CONTACT, tag)?,
        })
    }

    /// Path of a section's file for a locale tag.
    pub fn section_path(&self, section: &str, tag: &str) -> PathBuf {
        self.content_dir.join(section).join(format!("{}.json", tag))
    }

    fn section<T: DeserializeOwned>(&self, section: &str, tag: &str) -> Result<T, ContentError> {
        let path = self.section_path(section, tag);
        debug!("Decoding {}", path.display());
        let bytes = match std::fs::read(&path) {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentError::Missing(path));
            }
            Err(e) => {
                return Err(ContentError::Decode {
                    path,
                    reason: e.to_string(),
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| ContentError::Decode {
            path,
            reason: e.to_string(),
        })
    }

    /// Language flags available in the asset tree, sorted by file name.
    pub fn language_icons(&self) -> Result<Vec<LanguageIcon>, ContentError> {
        Ok(self
            .list_files(&self.languages_dir)?
            .into_iter()
            .map(|name| LanguageIcon {
                tag: file_stem(&name).to_string(),
                url: self.url(&self.languages_dir, &name),
            })
            .collect())
    }

    /// Brand logo URLs, sorted by file name.
    pub fn brand_images(&self) -> Result<Vec<String>, ContentError> {
        Ok(self
            .list_files(&self.brands_dir)?
            .into_iter()
            .map(|name| self.url(&self.brands_dir, &name))
            .collect())
    }

    /// URL of the site stylesheet.
    ///
    /// The last file (by name) in the asset root with `style` in its name
    /// wins, otherwise the configured fallback is used.
    pub fn stylesheet(&self) -> Result<String, ContentError> {
        let name = self
            .list_files("")?
            .into_iter()
            .rfind(|name| name.contains("style"))
            .unwrap_or_else(|| self.stylesheet_fallback.clone());
        Ok(self.url("", &name))
    }

    fn url(&self, dir: &str, name: &str) -> String {
        let dir = dir.trim_matches('/');
        match dir.is_empty() {
            true => self.assets.asset_url(name),
            false => self.assets.asset_url(&format!("{}/{}", dir, name)),
        }
    }

    /// Names of the regular, non-hidden files directly inside an asset directory.
    fn list_files(&self, dir: &str) -> Result<Vec<String>, ContentError> {
        let path = self.assets.directory.join(dir);
        let listing_error = |reason: String| ContentError::Listing {
            path: path.clone(),
            reason,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&path).map_err(|e| listing_error(e.to_string()))? {
            let entry = entry.map_err(|e| listing_error(e.to_string()))?;
            let is_file = entry
                .file_type()
                .map_err(|e| listing_error(e.to_string()))?
                .is_file();
            let name = entry.file_name().to_string_lossy().to_string();
            if is_file && !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */
