use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use paging_bench_summary_model::QueryParams;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{
    page_query_pairs, ApiError, CountResponse, Endpoint, PagePosition, PageResponse, ProductsApi,
};
use crate::config::BenchConfig;
use crate::executor::Executor;

/// [ProductsApi] over HTTP.
///
/// The transport timeout from [BenchConfig::request_timeout] applies to each request, so a hung
/// request fails like any other transport error.
#[derive(Debug)]
pub struct ProductsClient {
    executor: Arc<Executor>,
    http: reqwest::Client,
    products_url: Url,
    counts_url: Url,
}

impl ProductsClient {
    pub fn new(executor: Arc<Executor>, config: &BenchConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            executor,
            http,
            products_url: config.products_url.clone(),
            counts_url: config.counts_url.clone(),
        })
    }

    /// Send the request and decode the JSON body. Also returns the time until the body had been
    /// received, which leaves out decoding.
    fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        url: &Url,
        pairs: Vec<(&'static str, String)>,
    ) -> anyhow::Result<(T, Duration)> {
        log::trace!("{endpoint} {url} {pairs:?}");
        let request = self.http.get(url.clone()).query(&pairs);

        self.executor.execute_in_place(async move {
            let started = Instant::now();
            let response = request.send().await.map_err(|e| ApiError::Transport {
                endpoint,
                message: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::Status {
                    endpoint,
                    status: status.as_u16(),
                    body,
                }
                .into());
            }

            let body = response.bytes().await.map_err(|e| ApiError::Transport {
                endpoint,
                message: e.to_string(),
            })?;
            let received_in = started.elapsed();

            let value = serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
                endpoint,
                message: e.to_string(),
            })?;

            Ok((value, received_in))
        })
    }
}

impl ProductsApi for ProductsClient {
    fn count(&self, query: &QueryParams) -> anyhow::Result<CountResponse> {
        let (count, _) =
            self.get_json(Endpoint::Counts, &self.counts_url, query.filter_pairs())?;
        Ok(count)
    }

    fn page(
        &self,
        query: &QueryParams,
        position: &PagePosition<'_>,
    ) -> anyhow::Result<PageResponse> {
        let (mut response, received_in): (PageResponse, _) = self.get_json(
            Endpoint::Products,
            &self.products_url,
            page_query_pairs(query, position),
        )?;
        response.received_in = Some(received_in);

        Ok(response)
    }
}
