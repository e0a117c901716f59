//! Store engine HTTP handlers.
//!
//! Form-encoded requests in, JSON out. Business failures (bad input, missing
//! key, conflicts) answer 200 with `succeeded: false`; only a broken blocking
//! pool turns into a 500. sled work runs on the actix blocking pool.

use actix_web::{HttpResponse, web};
use tracing::{debug, error};

use crate::api::responses::{
    CommitRequest, QueryRequest, ReserveRequest, ReserveResponse, ShortenQueryResponse,
    ShortenRequest,
};
use crate::api::{QUERY_ENDPOINT, RESERVE_ENDPOINT, SETRESERVE_ENDPOINT, SHORTEN_ENDPOINT};
use crate::storage::{UrlStore, codec};

pub struct StoreApi;

impl StoreApi {
    pub async fn shorten(
        store: web::Data<UrlStore>,
        form: web::Form<ShortenRequest>,
    ) -> HttpResponse {
        let url = form.into_inner().url;
        let store = store.get_ref().clone();
        let target = url.clone();
        let result = web::block(move || store.store(&target)).await;
        match result {
            Ok(Ok(key)) => {
                debug!(key = %key, "shorten succeeded");
                HttpResponse::Ok().json(ShortenQueryResponse::ok(key, url))
            }
            Ok(Err(e)) => HttpResponse::Ok().json(ShortenQueryResponse::failed("", &e)),
            Err(e) => Self::blocking_failure("shorten", &e),
        }
    }

    pub async fn query(store: web::Data<UrlStore>, form: web::Form<QueryRequest>) -> HttpResponse {
        let key = form.into_inner().key;
        let store = store.get_ref().clone();
        let lookup = key.clone();
        let result = web::block(move || store.query(&lookup)).await;
        match result {
            Ok(Ok(url)) => HttpResponse::Ok().json(ShortenQueryResponse {
                succeeded: true,
                error_msg: String::new(),
                key,
                original_url: url,
            }),
            Ok(Err(e)) => HttpResponse::Ok().json(ShortenQueryResponse::failed(key, &e)),
            Err(e) => Self::blocking_failure("query", &e),
        }
    }

    pub async fn reserve(
        store: web::Data<UrlStore>,
        form: web::Form<ReserveRequest>,
    ) -> HttpResponse {
        // u64 on the wire; anything past usize is out of range regardless
        let num = usize::try_from(form.into_inner().num).unwrap_or(usize::MAX);
        let store = store.get_ref().clone();
        let result = web::block(move || store.reserve(num)).await;
        match result {
            Ok(Ok(keys)) => {
                debug!(count = keys.len(), "reserve succeeded");
                HttpResponse::Ok().json(ReserveResponse::ok(keys))
            }
            Ok(Err(e)) => HttpResponse::Ok().json(ReserveResponse::failed(&e)),
            Err(e) => Self::blocking_failure("reserve", &e),
        }
    }

    pub async fn set_reserve(
        store: web::Data<UrlStore>,
        form: web::Form<CommitRequest>,
    ) -> HttpResponse {
        let CommitRequest { key, url } = form.into_inner();
        let store = store.get_ref().clone();
        let commit_key = key.clone();
        let commit_url = url.clone();
        let result = web::block(move || store.commit(&commit_key, &commit_url)).await;
        match result {
            Ok(Ok(())) => HttpResponse::Ok().json(ShortenQueryResponse::ok(key, url)),
            Ok(Err(e)) => HttpResponse::Ok().json(ShortenQueryResponse::failed(key, &e)),
            Err(e) => Self::blocking_failure("setReserve", &e),
        }
    }

    /// Redirect straight off the durable store. The cache node is the normal
    /// front door; this exists so a store engine is usable on its own.
    pub async fn redirect(store: web::Data<UrlStore>, path: web::Path<String>) -> HttpResponse {
        let key = path.into_inner();
        if !codec::is_valid_key(&key) {
            return HttpResponse::NotFound().body("Not Found");
        }
        let store = store.get_ref().clone();
        let lookup = key.clone();
        match web::block(move || store.query(&lookup)).await {
            Ok(Ok(url)) => HttpResponse::TemporaryRedirect()
                .insert_header(("Location", url))
                .finish(),
            Ok(Err(e)) if e.is_not_found() => HttpResponse::NotFound().body("Not Found"),
            Ok(Err(e)) => {
                error!(key = %key, error = %e, "redirect lookup failed");
                HttpResponse::InternalServerError().body("Internal server error")
            }
            Err(e) => Self::blocking_failure("redirect", &e),
        }
    }

    fn blocking_failure(op: &str, err: &actix_web::error::BlockingError) -> HttpResponse {
        error!(op, error = %err, "blocking pool failure");
        HttpResponse::InternalServerError().body("Internal server error")
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(SHORTEN_ENDPOINT, web::post().to(StoreApi::shorten))
        .route(QUERY_ENDPOINT, web::post().to(StoreApi::query))
        .route(RESERVE_ENDPOINT, web::post().to(StoreApi::reserve))
        .route(SETRESERVE_ENDPOINT, web::post().to(StoreApi::set_reserve))
        .route("/{key}", web::get().to(StoreApi::redirect));
}
