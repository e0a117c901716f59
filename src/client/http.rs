//! HTTP store client: form-encoded POSTs against the store engine's `/api`
//! endpoints, JSON responses.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::responses::{ReserveResponse, ShortenQueryResponse};
use crate::api::{QUERY_ENDPOINT, RESERVE_ENDPOINT, SETRESERVE_ENDPOINT, SHORTEN_ENDPOINT};
use crate::client::StoreClient;
use crate::errors::{Result, ShortpoolError};

pub struct HttpStoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpStoreClient {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// One reachability probe at node startup. Failure is reported, not
    /// fatal: the store may simply come up later.
    pub async fn ping(&self) {
        match self.http.get(&self.base_url).send().await {
            Ok(resp) => debug!(status = %resp.status(), "store engine reachable"),
            Err(e) => warn!(error = %e, base_url = %self.base_url, "store engine unreachable"),
        }
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.post(&url).form(form).send().await?;
        if !resp.status().is_success() {
            return Err(ShortpoolError::unavailable(format!(
                "store engine returned {} for {}",
                resp.status(),
                path
            )));
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl StoreClient for HttpStoreClient {
    async fn shorten(&self, url: &str) -> Result<String> {
        let resp: ShortenQueryResponse = self
            .post_form(SHORTEN_ENDPOINT, &[("url", url)])
            .await?;
        if resp.succeeded {
            Ok(resp.key)
        } else {
            // a store-side rejection is a business failure, not a transport
            // fault; the node validates urls itself before calling out, so
            // the remaining cause is an exhausted probe budget
            Err(ShortpoolError::exhausted_keyspace(format!(
                "store rejected shorten: {}",
                resp.error_msg
            )))
        }
    }

    async fn query(&self, key: &str) -> Result<String> {
        let resp: ShortenQueryResponse = self.post_form(QUERY_ENDPOINT, &[("key", key)]).await?;
        if resp.succeeded {
            Ok(resp.original_url)
        } else {
            // the wire flattens not-found and reserved-pending; both mean
            // "nothing to serve" to a cache node
            Err(ShortpoolError::not_found(resp.error_msg))
        }
    }

    async fn reserve(&self, num: usize) -> Result<Vec<String>> {
        let num_str = num.to_string();
        let resp: ReserveResponse = self
            .post_form(RESERVE_ENDPOINT, &[("num", num_str.as_str())])
            .await?;
        if resp.succeeded {
            Ok(resp.keys)
        } else {
            Err(ShortpoolError::database_operation(format!(
                "store rejected reserve: {}",
                resp.error_msg
            )))
        }
    }

    async fn commit(&self, key: &str, url: &str) -> Result<()> {
        let resp: ShortenQueryResponse = self
            .post_form(SETRESERVE_ENDPOINT, &[("key", key), ("url", url)])
            .await?;
        if resp.succeeded {
            Ok(())
        } else {
            Err(ShortpoolError::conflict(format!(
                "store rejected commit for {}: {}",
                key, resp.error_msg
            )))
        }
    }
}
