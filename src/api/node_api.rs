//! Cache node HTTP handlers.
//!
//! Same wire shapes as the store engine API, served from the node's cache
//! and reservation pool. Synchronous-path store failures surface as 500;
//! not-found stays a well-formed 200 business response (or a 404 on the
//! redirect route).

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use tracing::error;

use crate::api::responses::{QueryRequest, ShortenQueryResponse, ShortenRequest};
use crate::api::{QUERY_ENDPOINT, SHORTEN_ENDPOINT};
use crate::errors::ShortpoolError;
use crate::services::NodeService;
use crate::storage::codec;

pub struct NodeApi;

impl NodeApi {
    pub async fn shorten(
        node: web::Data<Arc<NodeService>>,
        form: web::Form<ShortenRequest>,
    ) -> HttpResponse {
        let url = form.into_inner().url;
        match node.create_short(&url).await {
            Ok(key) => HttpResponse::Ok().json(ShortenQueryResponse::ok(key, url)),
            Err(e) if is_internal(&e) => {
                error!(error = %e, "shorten failed against store engine");
                HttpResponse::InternalServerError().body("Internal server error")
            }
            Err(e) => HttpResponse::Ok().json(ShortenQueryResponse::failed("", &e)),
        }
    }

    pub async fn query(
        node: web::Data<Arc<NodeService>>,
        form: web::Form<QueryRequest>,
    ) -> HttpResponse {
        let key = form.into_inner().key;
        if !codec::is_valid_key(&key) {
            let err = ShortpoolError::invalid_key(format!("invalid key: {}", key));
            return HttpResponse::Ok().json(ShortenQueryResponse::failed(key, &err));
        }
        match node.resolve(&key).await {
            Ok(url) => HttpResponse::Ok().json(ShortenQueryResponse {
                succeeded: true,
                error_msg: String::new(),
                key,
                original_url: url,
            }),
            Err(e) if e.is_not_found() => {
                HttpResponse::Ok().json(ShortenQueryResponse::failed(key, &e))
            }
            Err(e) => {
                error!(key = %key, error = %e, "query failed against store engine");
                HttpResponse::InternalServerError().body("Internal server error")
            }
        }
    }

    /// Public redirect route. Non-alphanumeric paths are static assets and
    /// belong to the edge tier in front of us, so they just 404 here.
    pub async fn redirect(
        node: web::Data<Arc<NodeService>>,
        path: web::Path<String>,
    ) -> HttpResponse {
        let key = path.into_inner();
        if !codec::is_valid_key(&key) {
            return HttpResponse::NotFound().body("Not Found");
        }
        match node.resolve(&key).await {
            Ok(url) => HttpResponse::TemporaryRedirect()
                .insert_header(("Location", url))
                .finish(),
            Err(e) if e.is_not_found() => HttpResponse::NotFound().body("Not Found"),
            Err(e) => {
                error!(key = %key, error = %e, "redirect failed against store engine");
                HttpResponse::InternalServerError().body("Internal server error")
            }
        }
    }
}

fn is_internal(err: &ShortpoolError) -> bool {
    matches!(
        err,
        ShortpoolError::Unavailable(_)
            | ShortpoolError::DatabaseOperation(_)
            | ShortpoolError::Serialization(_)
    )
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(SHORTEN_ENDPOINT, web::post().to(NodeApi::shorten))
        .route(QUERY_ENDPOINT, web::post().to(NodeApi::query))
        .route("/{key}", web::get().to(NodeApi::redirect));
}
