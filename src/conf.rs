use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::templates::TemplateServerContext;

fn default_port() -> u16 {
    8080
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_name() -> String {
    "Siteshelf".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_cors_max_age() -> usize {
    300
}

fn default_asset_directory() -> PathBuf {
    PathBuf::from("static")
}

fn default_url_prefix() -> String {
    "/static".to_string()
}

/// Half a day.
fn default_max_age() -> u32 {
    43200
}

fn default_index_file() -> String {
    "index.html".to_string()
}

fn default_content_directory() -> PathBuf {
    PathBuf::from("translations")
}

fn default_languages_dir() -> String {
    "icons/languages".to_string()
}

fn default_brands_dir() -> String {
    "icons/brands".to_string()
}

fn default_stylesheet_fallback() -> String {
    "output.css".to_string()
}

fn default_true() -> bool {
    true
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_supported_locales() -> Vec<LocaleEntry> {
    vec![
        LocaleEntry {
            tag: "en".to_string(),
            aliases: vec!["en-GB".to_string(), "en-US".to_string()],
        },
        LocaleEntry {
            tag: "fi".to_string(),
            aliases: vec![],
        },
        LocaleEntry {
            tag: "ru".to_string(),
            aliases: vec![],
        },
    ]
}

/* -------------------------------------------------------------------------- */
/*                                  Sections                                  */
/* -------------------------------------------------------------------------- */

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfigGeneral {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds a client gets to send its request, and to idle between requests.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// How long browsers may cache a CORS preflight answer, in seconds.
    #[serde(default = "default_cors_max_age")]
    pub cors_max_age: usize,
}

impl Default for ServerConfigGeneral {
    fn default() -> Self {
        Self {
            name: default_name(),
            bind: default_bind(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            cors_max_age: default_cors_max_age(),
        }
    }
}

/// Where static assets live and how long clients may cache them.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfigAssets {
    #[serde(default = "default_asset_directory")]
    pub directory: PathBuf,
    /// Public URL prefix the assets are mounted under.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// `Cache-Control` max-age, in seconds.
    #[serde(default = "default_max_age")]
    pub max_age: u32,
    /// Document served for directory requests. Directories without one are 404s.
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

impl ServerConfigAssets {
    /// Public URL of an asset, e.g. `/static/icons/languages/fi.svg`.
    pub fn asset_url(&self, relative: &str) -> String {
        format!(
            "{}/{}",
            self.url_prefix.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }
}

impl Default for ServerConfigAssets {
    fn default() -> Self {
        Self {
            directory: default_asset_directory(),
            url_prefix: default_url_prefix(),
            max_age: default_max_age(),
            index_file: default_index_file(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfigContent {
    /// Root of the `<section>/<locale>.json` fragments.
    #[serde(default = "default_content_directory")]
    pub directory: PathBuf,
    /// Language flag icons, relative to the asset directory.
    #[serde(default = "default_languages_dir")]
    pub languages_dir: String,
    /// Brand logos, relative to the asset directory.
    #[serde(default = "default_brands_dir")]
    pub brands_dir: String,
    /// Stylesheet used when no `*style*` file sits in the asset root.
    #[serde(default = "default_stylesheet_fallback")]
    pub stylesheet_fallback: String,
    /// Compose every locale at startup instead of on each request.
    #[serde(default = "default_true")]
    pub preload: bool,
}

impl Default for ServerConfigContent {
    fn default() -> Self {
        Self {
            directory: default_content_directory(),
            languages_dir: default_languages_dir(),
            brands_dir: default_brands_dir(),
            stylesheet_fallback: default_stylesheet_fallback(),
            preload: true,
        }
    }
}

/// A supported locale and the tags that fold into it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LocaleEntry {
    pub tag: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfigLocales {
    #[serde(default = "default_locale")]
    pub default: String,
    #[serde(default = "default_supported_locales")]
    pub supported: Vec<LocaleEntry>,
}

impl Default for ServerConfigLocales {
    fn default() -> Self {
        Self {
            default: default_locale(),
            supported: default_supported_locales(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ServerConfigTemplates {
    /// Directory of custom templates. Built-in templates are used when unset.
    pub directory: Option<PathBuf>,
}

/* -------------------------------------------------------------------------- */
/*                                    Root                                    */
/* -------------------------------------------------------------------------- */

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub general: ServerConfigGeneral,
    #[serde(default)]
    pub assets: ServerConfigAssets,
    #[serde(default)]
    pub content: ServerConfigContent,
    #[serde(default)]
    pub locales: ServerConfigLocales,
    #[serde(default)]
    pub templates: ServerConfigTemplates,
}

impl ServerConfig {
    pub fn template_server_context(&self) -> TemplateServerContext {
        TemplateServerContext {
            name: self.general.name.to_string(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
