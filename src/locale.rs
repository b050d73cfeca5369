//! Picks the display language for a request.
//!
//! Candidates come from an explicit selector (the `lang` query parameter) and
//! then from `Accept-Language`, best weight first. Each candidate is matched
//! against the supported set: exact tag or alias first, then primary language
//! subtag. Whatever cannot be matched falls back to the default locale, so
//! resolution never fails.

use std::fmt::Display;

use log::debug;

use crate::conf::{LocaleEntry, ServerConfigLocales};

#[derive(Debug, PartialEq, Eq)]
pub enum LocaleError {
    /// No locales were configured.
    NoLocales,
    /// The default locale is not in the supported set.
    UnknownDefault(String),
}

impl Display for LocaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoLocales => f.write_str("No supported locales configured"),
            Self::UnknownDefault(tag) => {
                write!(f, "Default locale \"{}\" is not a supported locale", tag)
            }
        }
    }
}

impl std::error::Error for LocaleError {}

/// A supported display language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    tag: String,
    /// Lowercased tag followed by lowercased aliases.
    names: Vec<String>,
    /// Lowercased primary subtags of `names`.
    bases: Vec<String>,
}

impl Locale {
    pub fn new(tag: &str, aliases: &[String]) -> Self {
        let names: Vec<String> = std::iter::once(tag)
            .chain(aliases.iter().map(String::as_str))
            .map(normalize)
            .collect();
        let mut bases: Vec<String> = Vec::new();
        for name in &names {
            let base = primary_subtag(name).to_string();
            if !bases.contains(&base) {
                bases.push(base);
            }
        }
        Self {
            tag: tag.to_string(),
            names,
            bases,
        }
    }

    /// Canonical tag, e.g. `en`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    fn matches_exactly(&self, candidate: &str) -> bool {
        self.names.iter().any(|n| n == candidate)
    }

    fn matches_base(&self, candidate: &str) -> bool {
        let base = primary_subtag(candidate);
        self.bases.iter().any(|b| b == base)
    }
}

impl From<&LocaleEntry> for Locale {
    fn from(entry: &LocaleEntry) -> Self {
        Self::new(&entry.tag, &entry.aliases)
    }
}

/* -------------------------------------------------------------------------- */
/*                                  Resolver                                  */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct LocaleResolver {
    supported: Vec<Locale>,
    default: usize,
}

impl LocaleResolver {
    pub fn new(supported: Vec<Locale>, default: &str) -> Result<Self, LocaleError> {
        if supported.is_empty() {
            return Err(LocaleError::NoLocales);
        }
        let default = supported
            .iter()
            .position(|l| l.tag == default)
            .ok_or_else(|| LocaleError::UnknownDefault(default.to_string()))?;
        Ok(Self { supported, default })
    }

    pub fn from_config(config: &ServerConfigLocales) -> Result<Self, LocaleError> {
        Self::new(
            config.supported.iter().map(Locale::from).collect(),
            &config.default,
        )
    }

    pub fn supported(&self) -> &[Locale] {
        &self.supported
    }

    pub fn default_locale(&self) -> &Locale {
        &self.supported[self.default]
    }

    /// Finds a supported locale by its canonical tag.
    pub fn get(&self, tag: &str) -> Option<&Locale> {
        self.supported.iter().find(|l| l.tag == tag)
    }

    /// Resolves the locale for a request.
    ///
    /// # Arguments
    ///
    /// - `explicit` - The language the client asked for directly, if any.
    /// - `accept_language` - Raw `Accept-Language` header value, if any.
    pub fn resolve(&self, explicit: Option<&str>, accept_language: Option<&str>) -> &Locale {
        let explicit = explicit.into_iter().map(|s| s.to_string());
        let preferred = accept_language
            .map(parse_accept_language)
            .unwrap_or_default();

        for candidate in explicit.chain(preferred) {
            if let Some(locale) = self.match_candidate(&candidate) {
                debug!("Resolved locale {} from \"{}\"", locale.tag, candidate);
                return locale;
            }
        }

        self.default_locale()
    }

    fn match_candidate(&self, raw: &str) -> Option<&Locale> {
        let candidate = normalize(raw);
        if candidate == "*" {
            return Some(self.default_locale());
        }
        if !is_well_formed(&candidate) {
            return None;
        }
        self.supported
            .iter()
            .find(|l| l.matches_exactly(&candidate))
            .or_else(|| self.supported.iter().find(|l| l.matches_base(&candidate)))
    }
}

/* -------------------------------------------------------------------------- */
/*                                  Utilities                                 */
/* -------------------------------------------------------------------------- */

fn normalize(tag: &str) -> String {
    tag.trim().to_ascii_lowercase().replace('_', "-")
}

fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

fn is_well_formed(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary = parts.next().unwrap_or_default();
    (1..=8).contains(&primary.len())
        && primary.chars().all(|c| c.is_ascii_alphabetic())
        && parts.all(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Splits an `Accept-Language` value into language ranges, highest weight first.
///
/// Ranges with a zero or unreadable weight are dropped. Equal weights keep
/// their original order.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut ranges: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let range = parts.next()?.trim();
            if range.is_empty() {
                return None;
            }
            let mut quality = 1.0;
            for param in parts {
                let (key, value) = param.split_once('=')?;
                if key.trim() == "q" {
                    quality = value.trim().parse::<f32>().ok()?;
                }
            }
            if !(quality > 0.0 && quality <= 1.0) {
                return None;
            }
            Some((range.to_string(), quality))
        })
        .collect();

    ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranges.into_iter().map(|(range, _)| range).collect()
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */
