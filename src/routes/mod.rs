use actix_cors::Cors;
use actix_web::{
    HttpResponse,
    http::{
        StatusCode,
        header::{ACCEPT, CONTENT_TYPE, ContentType, HeaderName, LINK},
    },
    web::{self, ServiceConfig},
};
use log::{error, info};
use minijinja::Environment;

use crate::{
    StartupError,
    asset::AssetSource,
    cache::CacheGate,
    compose::{PageCatalog, PageComposer},
    conf::ServerConfig,
    content::ContentLoader,
    locale::LocaleResolver,
    storage::FilesystemAssets,
    templates::{render_error, templates_from_builtin, templates_from_dir},
};

pub mod assets;
pub mod pages;

/// This serves as state for the Actix server.
///
/// Built once before the server starts and only read afterwards.
pub struct RoutingState<S: AssetSource> {
    pub config: ServerConfig,
    pub gate: CacheGate<S>,
    pub resolver: LocaleResolver,
    pub catalog: PageCatalog,
    pub jinja: Environment<'static>,
}

impl RoutingState<FilesystemAssets> {
    /// Builds the state for the directories named in `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        Self::new(config, FilesystemAssets::new(&config.assets.directory))
    }
}

impl<S: AssetSource> RoutingState<S> {
    /// Fingerprints the assets, validates locales, composes pages (unless
    /// lazy) and loads templates. Any failure means the server must not start.
    pub fn new(config: &ServerConfig, source: S) -> Result<Self, StartupError> {
        let gate = CacheGate::new(source, &config.assets)?;
        let resolver = LocaleResolver::from_config(&config.locales)?;

        let composer = PageComposer::new(ContentLoader::from_config(config));
        let catalog = match config.content.preload {
            true => PageCatalog::preload(&composer, &resolver)?,
            false => {
                info!("Pages will be composed per request");
                PageCatalog::lazy(composer)
            }
        };

        let jinja = match &config.templates.directory {
            Some(dir) => templates_from_dir(dir)?,
            None => templates_from_builtin(),
        };

        Ok(Self {
            config: config.clone(),
            gate,
            resolver,
            catalog,
            jinja,
        })
    }
}

/// Renders the error template, falling back to plain text.
pub fn error_response<S: AssetSource>(
    data: &RoutingState<S>,
    status: StatusCode,
    message: &str,
) -> HttpResponse {
    match render_error(&data.jinja, &data.config, status.as_u16(), message) {
        Ok(body) => HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(body),
        Err(e) => {
            error!("Failed to render error page: {}", e);
            HttpResponse::build(status)
                .content_type(ContentType::plaintext())
                .body(message.to_string())
        }
    }
}

async fn not_found<S: AssetSource + 'static>(data: web::Data<RoutingState<S>>) -> HttpResponse {
    error_response(&data, StatusCode::NOT_FOUND, "Not found")
}

/// Read-only cross-origin access for HTTPS origins.
pub fn cors_policy(config: &ServerConfig) -> Cors {
    Cors::default()
        .allowed_origin_fn(|origin, _| origin.as_bytes().starts_with(b"https://"))
        .allowed_methods(["GET"])
        .allowed_headers([ACCEPT, CONTENT_TYPE, HeaderName::from_static("x-csrf-token")])
        .expose_headers([LINK])
        .max_age(config.general.cors_max_age)
}

/* -------------------------------------------------------------------------- */
/*                                Registration                                */
/* -------------------------------------------------------------------------- */

/// Register default routes for the server to an Actix configuration.
pub fn register_routes_to_config<'a, S: AssetSource + 'static>(
    config: &'a mut ServiceConfig,
    asset_prefix: &str,
) -> &'a mut ServiceConfig {
    let asset_route = format!("{}/{{path:.*}}", asset_prefix.trim_end_matches('/'));
    config
        .route(&asset_route, web::get().to(assets::get_asset::<S>))
        .route("/", web::get().to(pages::get_index::<S>))
        .route("/index.html", web::get().to(pages::get_index::<S>))
        .default_service(web::to(not_found::<S>))
}

pub fn setup_service_config<'a, S: AssetSource + 'static>(
    web_config: &'a mut ServiceConfig,
    state: web::Data<RoutingState<S>>,
) -> &'a mut ServiceConfig {
    let prefix = state.config.assets.url_prefix.clone();
    web_config.app_data(state);
    register_routes_to_config::<S>(web_config, &prefix)
}
