//! Assembles the page view model handed to the renderer.

use std::{collections::HashMap, sync::Arc};

use log::info;
use serde::Serialize;

use crate::{
    content::{About, Brands, Card, Contact, ContentError, ContentLoader, Intro},
    locale::{Locale, LocaleResolver},
};

/// A link that switches the page to another language.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LanguageLink {
    pub href: String,
    pub src: String,
    pub alt: String,
}

/// Everything the page template needs, for one locale.
///
/// Only built by [`PageComposer::compose`] and read-only afterwards.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    lang: String,
    languages: Vec<LanguageLink>,
    stylesheet: String,
    intro: Intro,
    services: Vec<Card>,
    brands: Brands,
    about: About,
    contacts: Vec<Contact>,
}

impl PageView {
    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn languages(&self) -> &[LanguageLink] {
        &self.languages
    }

    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    pub fn intro(&self) -> &Intro {
        &self.intro
    }

    pub fn services(&self) -> &[Card] {
        &self.services
    }

    pub fn brands(&self) -> &Brands {
        &self.brands
    }

    pub fn about(&self) -> &About {
        &self.about
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }
}

/* -------------------------------------------------------------------------- */
/*                                  Composer                                  */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct PageComposer {
    loader: ContentLoader,
}

impl PageComposer {
    pub fn new(loader: ContentLoader) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &ContentLoader {
        &self.loader
    }

    /// Builds the page for an already resolved locale.
    pub fn compose(&self, locale: &Locale) -> Result<PageView, ContentError> {
        let content = self.loader.load(locale)?;

        let languages = self
            .loader
            .language_icons()?
            .into_iter()
            .map(|icon| LanguageLink {
                href: format!("?lang={}", icon.tag),
                alt: icon.tag,
                src: icon.url,
            })
            .collect();

        let mut brands = content.brands;
        brands.images = self.loader.brand_images()?;

        let mut about = content.about;
        about.team = content.team;

        Ok(PageView {
            lang: locale.tag().to_string(),
            languages,
            stylesheet: self.loader.stylesheet()?,
            intro: content.intro,
            services: content.services,
            brands,
            about,
            contacts: content.contacts,
        })
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Catalog                                  */
/* -------------------------------------------------------------------------- */

/// Where page views come from at request time.
#[derive(Debug)]
pub enum PageCatalog {
    /// Every supported locale composed at startup.
    Preloaded(HashMap<String, Arc<PageView>>),
    /// Composed again for each request.
    Lazy(PageComposer),
}

impl PageCatalog {
    /// Composes every supported locale up front. Fails on the first locale
    /// that cannot be composed.
    pub fn preload(composer: &PageComposer, resolver: &LocaleResolver) -> Result<Self, ContentError> {
        let mut views = HashMap::new();
        for locale in resolver.supported() {
            let view = composer.compose(locale)?;
            info!("Composed page for locale {}", locale.tag());
            views.insert(locale.tag().to_string(), Arc::new(view));
        }
        Ok(Self::Preloaded(views))
    }

    pub fn lazy(composer: PageComposer) -> Self {
        Self::Lazy(composer)
    }

    /// The page for `locale`.
    pub fn view(&self, locale: &Locale) -> Result<Arc<PageView>, ContentError> {
        match self {
            Self::Preloaded(views) => match views.get(locale.tag()) {
                Some(v) => Ok(v.clone()),
                None => Err(ContentError::Missing(locale.tag().into())),
            },
            Self::Lazy(composer) => composer.compose(locale).map(Arc::new),
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */
