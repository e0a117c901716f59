//! End-to-end tests: multiple cache nodes over one shared store engine, plus
//! wire-level handler tests for both HTTP surfaces.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, test, web};
use async_trait::async_trait;
use tempfile::TempDir;

use shortpool::api::responses::{ReserveResponse, ShortenQueryResponse};
use shortpool::api::{
    QUERY_ENDPOINT, RESERVE_ENDPOINT, SETRESERVE_ENDPOINT, SHORTEN_ENDPOINT, node_api, store_api,
};
use shortpool::client::{LocalStoreClient, StoreClient};
use shortpool::config::NodeConfig;
use shortpool::errors::{Result, ShortpoolError};
use shortpool::services::NodeService;
use shortpool::storage::UrlStore;

fn shared_store() -> (Arc<UrlStore>, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(UrlStore::open(dir.path()).expect("open store"));
    (store, dir)
}

fn node_over(store: Arc<UrlStore>) -> Arc<NodeService> {
    let client: Arc<dyn StoreClient> = Arc::new(LocalStoreClient::new(store));
    let config = NodeConfig {
        reserve_batch: 32,
        negative_ttl_secs: 1,
        ..NodeConfig::default()
    };
    Arc::new(NodeService::new(client, &config))
}

async fn eventually(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..150 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {}", what);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_nodes_never_collide() {
    let (store, _dir) = shared_store();
    let node_a = node_over(store.clone());
    let node_b = node_over(store.clone());

    node_a.warm_up();
    node_b.warm_up();
    eventually("pool warm-up", || {
        !node_a.pool().is_empty() && !node_b.pool().is_empty()
    })
    .await;

    let mut handles = Vec::new();
    for (label, node) in [("a", node_a.clone()), ("b", node_b.clone())] {
        for i in 0..100 {
            let node = node.clone();
            let url = format!("http://example.com/{}/{}", label, i);
            handles.push(tokio::spawn(async move {
                let key = node.create_short(&url).await.unwrap();
                // same-node read-after-write holds on either path
                assert_eq!(node.resolve(&key).await.unwrap(), url);
                key
            }));
        }
    }

    let mut keys = Vec::new();
    for handle in handles {
        keys.push(handle.await.unwrap());
    }
    assert_eq!(keys.len(), 200);
    let distinct: HashSet<_> = keys.iter().collect();
    assert_eq!(distinct.len(), 200, "keys must be unique across nodes");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cross_node_read_after_background_commit() {
    let (store, _dir) = shared_store();
    let node_a = node_over(store.clone());
    let node_b = node_over(store.clone());

    node_a.warm_up();
    eventually("pool warm-up", || !node_a.pool().is_empty()).await;

    let key = node_a.create_short("http://example.com").await.unwrap();

    // node B races the background commit; its negative cache bounds the
    // staleness, so the mapping must become visible within a few TTLs
    for _ in 0..100 {
        if let Ok(url) = node_b.resolve(&key).await {
            assert_eq!(url, "http://example.com");
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("mapping never became visible on the second node");
}

#[actix_rt::test]
async fn test_store_api_wire_contract() {
    let dir = TempDir::new().unwrap();
    let store = UrlStore::open(dir.path()).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(store))
            .configure(store_api::configure),
    )
    .await;

    // shorten
    let req = test::TestRequest::post()
        .uri(SHORTEN_ENDPOINT)
        .set_form([("url", "http://example.com")])
        .to_request();
    let resp: ShortenQueryResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.succeeded);
    assert!(!resp.key.is_empty());
    assert_eq!(resp.original_url, "http://example.com");
    let key = resp.key.clone();

    // query round-trip
    let req = test::TestRequest::post()
        .uri(QUERY_ENDPOINT)
        .set_form([("key", key.as_str())])
        .to_request();
    let resp: ShortenQueryResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.succeeded);
    assert_eq!(resp.original_url, "http://example.com");

    // business failure stays HTTP 200 with succeeded=false
    let req = test::TestRequest::post()
        .uri(QUERY_ENDPOINT)
        .set_form([("key", "BADKEY")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let resp: ShortenQueryResponse = test::read_body_json(resp).await;
    assert!(!resp.succeeded);
    assert!(!resp.error_msg.is_empty());

    // invalid url is a business failure, not a 400
    let req = test::TestRequest::post()
        .uri(SHORTEN_ENDPOINT)
        .set_form([("url", "not a url")])
        .to_request();
    let resp: ShortenQueryResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!resp.succeeded);

    // reserve + setReserve
    let req = test::TestRequest::post()
        .uri(RESERVE_ENDPOINT)
        .set_form([("num", "5")])
        .to_request();
    let resp: ReserveResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.succeeded);
    assert_eq!(resp.keys.len(), 5);

    // an out-of-range reserve is a business failure, whatever the width of
    // usize on the target
    let req = test::TestRequest::post()
        .uri(RESERVE_ENDPOINT)
        .set_form([("num", "18446744073709551615")])
        .to_request();
    let over: ReserveResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!over.succeeded);
    assert!(over.keys.is_empty());

    let reserved = resp.keys[4].clone();
    let req = test::TestRequest::post()
        .uri(SETRESERVE_ENDPOINT)
        .set_form([("key", reserved.as_str()), ("url", "http://foo.com")])
        .to_request();
    let resp: ShortenQueryResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.succeeded);

    let req = test::TestRequest::post()
        .uri(QUERY_ENDPOINT)
        .set_form([("key", reserved.as_str())])
        .to_request();
    let resp: ShortenQueryResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.succeeded);
    assert_eq!(resp.original_url, "http://foo.com");

    // redirect endpoint
    let req = test::TestRequest::get().uri(&format!("/{}", key)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 307);
    assert_eq!(
        resp.headers().get("Location").unwrap(),
        "http://example.com"
    );

    let req = test::TestRequest::get().uri("/ZZZZZZ9").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // malformed body is a plain 400
    let req = test::TestRequest::post()
        .uri(SHORTEN_ENDPOINT)
        .set_form([("wrong", "field")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_node_api_wire_contract() {
    let (store, _dir) = shared_store();
    let node = node_over(store);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(node))
            .configure(node_api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(SHORTEN_ENDPOINT)
        .set_form([("url", "http://example.com")])
        .to_request();
    let resp: ShortenQueryResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.succeeded);
    let key = resp.key.clone();

    let req = test::TestRequest::post()
        .uri(QUERY_ENDPOINT)
        .set_form([("key", key.as_str())])
        .to_request();
    let resp: ShortenQueryResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.succeeded);
    assert_eq!(resp.original_url, "http://example.com");

    let req = test::TestRequest::get().uri(&format!("/{}", key)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 307);

    // unknown key: JSON failure on the api route, 404 on the redirect route
    let req = test::TestRequest::post()
        .uri(QUERY_ENDPOINT)
        .set_form([("key", "ZZZZZZ9")])
        .to_request();
    let resp: ShortenQueryResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!resp.succeeded);

    let req = test::TestRequest::get().uri("/ZZZZZZ9").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // non-alphanumeric paths belong to the edge tier, not this API
    let req = test::TestRequest::get().uri("/favicon.ico").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

/// Store client whose probe budget is spent: every create is rejected.
struct ExhaustedStore;

#[async_trait]
impl StoreClient for ExhaustedStore {
    async fn shorten(&self, _url: &str) -> Result<String> {
        Err(ShortpoolError::exhausted_keyspace(
            "no free key found in 64 probes",
        ))
    }

    async fn query(&self, key: &str) -> Result<String> {
        Err(ShortpoolError::not_found(format!("no such key: {}", key)))
    }

    async fn reserve(&self, _num: usize) -> Result<Vec<String>> {
        Err(ShortpoolError::exhausted_keyspace(
            "no free key found in 64 probes",
        ))
    }

    async fn commit(&self, _key: &str, _url: &str) -> Result<()> {
        Ok(())
    }
}

#[actix_rt::test]
async fn test_node_api_forwards_store_rejection_as_business_failure() {
    let client: Arc<dyn StoreClient> = Arc::new(ExhaustedStore);
    let node = Arc::new(NodeService::new(client, &NodeConfig::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(node))
            .configure(node_api::configure),
    )
    .await;

    // a well-formed create the store refuses is still a 200 with
    // succeeded=false, same as on the store engine's own API
    let req = test::TestRequest::post()
        .uri(SHORTEN_ENDPOINT)
        .set_form([("url", "http://example.com")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let resp: ShortenQueryResponse = test::read_body_json(resp).await;
    assert!(!resp.succeeded);
    assert!(resp.error_msg.contains("Keyspace Exhausted"));
}
