/// Static asset delivery through the cache gate.
use actix_web::{
    HttpRequest, HttpResponse,
    http::{
        StatusCode,
        header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH},
    },
    web,
};
use log::{debug, error};

use crate::{
    asset::AssetSource,
    cache::GateResponse,
    routes::{RoutingState, error_response},
};

pub async fn get_asset<S: AssetSource + 'static>(
    data: web::Data<RoutingState<S>>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let path = path.into_inner();
    let if_none_match = req
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());

    debug!("Asset {:?} requested (If-None-Match: {:?})", path, if_none_match);

    match data.gate.handle(&path, if_none_match).await {
        Ok(GateResponse::NotModified { etag }) => HttpResponse::NotModified()
            .insert_header((CACHE_CONTROL, data.gate.cache_control()))
            .insert_header((ETAG, etag.etag()))
            .finish(),
        Ok(GateResponse::Asset { etag, asset }) => {
            debug!("Delivering {} ({}, {} bytes)", asset.name(), etag, asset.bytes().len());
            HttpResponse::Ok()
                .insert_header((CACHE_CONTROL, data.gate.cache_control()))
                .insert_header((ETAG, etag.etag()))
                .content_type(asset.mime_type())
                .body(asset.into_bytes())
        }
        Ok(GateResponse::NotFound) => error_response(&data, StatusCode::NOT_FOUND, "Asset not found"),
        Err(e) => {
            error!("Failed to serve asset {:?}: {}", path, e);
            error_response(&data, StatusCode::INTERNAL_SERVER_ERROR, "Failed to read asset")
        }
    }
}
