/// The localized landing page.
use std::sync::Arc;

use actix_web::{
    HttpRequest, HttpResponse,
    http::{
        StatusCode,
        header::{ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_LANGUAGE, ContentType, VARY},
    },
    web,
};
use log::{error, info};

use crate::{
    asset::AssetSource,
    compose::PageCatalog,
    routes::{RoutingState, error_response},
    templates::render_page,
};

/// The `lang` query parameter, if present and decodable.
pub fn lang_from_query(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "lang")
        .map(|(_, value)| value.into_owned())
}

pub async fn get_index<S: AssetSource + 'static>(
    data: web::Data<RoutingState<S>>,
    req: HttpRequest,
) -> HttpResponse {
    let explicit = lang_from_query(req.query_string());
    let accept_language = req
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());

    let locale = data.resolver.resolve(explicit.as_deref(), accept_language);
    info!(
        "Serving page in {} (lang: {:?}, Accept-Language: {:?})",
        locale.tag(),
        explicit,
        accept_language
    );

    let view = match &data.catalog {
        PageCatalog::Preloaded(_) => data.catalog.view(locale),
        PageCatalog::Lazy(composer) => {
            // Composing reads every fragment from disk.
            let composer = composer.clone();
            let target = locale.clone();
            match web::block(move || composer.compose(&target)).await {
                Ok(v) => v.map(Arc::new),
                Err(e) => {
                    error!("Page composition for {} was aborted: {}", locale.tag(), e);
                    return error_response(
                        &data,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "The page could not be built",
                    );
                }
            }
        }
    };

    let view = match view {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to compose page for {}: {}", locale.tag(), e);
            return error_response(
                &data,
                StatusCode::INTERNAL_SERVER_ERROR,
                "The page could not be built",
            );
        }
    };

    match render_page(&data.jinja, &data.config, &view) {
        Ok(body) => HttpResponse::Ok()
            .content_type(ContentType::html())
            .insert_header((CACHE_CONTROL, "no-cache"))
            .insert_header((CONTENT_LANGUAGE, locale.tag()))
            .insert_header((VARY, "Accept-Language"))
            .body(body),
        Err(e) => {
            error!("Failed to render page for {}: {}", locale.tag(), e);
            error_response(
                &data,
                StatusCode::INTERNAL_SERVER_ERROR,
                "The page could not be rendered",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::lang_from_query;

    #[test]
    fn reads_the_lang_parameter() {
        assert_eq!(lang_from_query("lang=fi"), Some("fi".to_string()));
        assert_eq!(lang_from_query("x=1&lang=ru-RU"), Some("ru-RU".to_string()));
        assert!(lang_from_query("lang=%E0%A4").is_some());
        assert_eq!(lang_from_query(""), None);
        assert_eq!(lang_from_query("language=fi"), None);
    }
}
