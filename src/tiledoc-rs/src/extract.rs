//! Paginated queries.
//!
//! Every extractor walks the store's offset pagination to the end and hands
//! back the concatenated documents; a failed page fails the whole call.

use serde_json::Value;

use crate::client::Client;
use crate::transport::Method;
use crate::{ClientError, Result};
use tiledoc_core::models::{QueryPage, QueryResponse};
use tiledoc_core::query::{Predicate, Region};

impl Client {
    /// Every feature stored at `z_layer`
    #[tracing::instrument(skip(self), fields(collection = %self.collection()))]
    pub async fn extract_items(&self, z_layer: i64) -> Result<Vec<Value>> {
        self.query(&Predicate::layer(z_layer)).await
    }

    /// Features at `z_layer` inside the `tile_size` square tile whose top left
    /// corner is (x0, y0)
    #[tracing::instrument(skip(self), fields(collection = %self.collection()))]
    pub async fn extract_tile_data(
        &self,
        z_layer: i64,
        x0: i64,
        y0: i64,
        tile_size: i64,
    ) -> Result<Vec<Value>> {
        self.query(&Predicate::tile(z_layer, x0, y0, tile_size)).await
    }

    /// Features at `z_layer` inside the inclusive box (x0, y0)..=(xf, yf)
    #[tracing::instrument(skip(self), fields(collection = %self.collection()))]
    pub async fn extract_region(
        &self,
        z_layer: i64,
        x0: i64,
        y0: i64,
        xf: i64,
        yf: i64,
    ) -> Result<Vec<Value>> {
        self.query(&Predicate::region(z_layer, Region::new(x0, y0, xf, yf)))
            .await
    }

    /// Run `predicate` and collect the documents of every page in order
    pub async fn query(&self, predicate: &Predicate) -> Result<Vec<Value>> {
        let mut offset = 0;
        let mut items = Vec::new();

        loop {
            let page = self.fetch_page(predicate, offset).await?;
            if page.has_more && page.count == 0 {
                tracing::warn!(offset, "Store reported more results on an empty page, stopping");
            }

            let has_next = page.has_next();
            offset = page.next_offset();
            items.extend(page.items);

            if !has_next {
                break;
            }
        }

        tracing::debug!(total = items.len(), "Query complete");
        Ok(items)
    }

    /// Fetch the single page of `predicate` results starting at `offset`
    pub async fn fetch_page(&self, predicate: &Predicate, offset: usize) -> Result<QueryPage> {
        let url = self.query_url(offset);
        let body = serde_json::to_value(predicate)?;

        let text = self
            .transport
            .send_request(Method::POST, &url, Some(&body))
            .await?
            .into_body(|status, reason| ClientError::ExtractData { status, reason })?;

        let response: QueryResponse = serde_json::from_str(&text)?;
        let page = response.into_page(offset);
        tracing::debug!(offset, count = page.count, has_more = page.has_more, "Fetched page");
        Ok(page)
    }

    fn query_url(&self, offset: usize) -> String {
        match self.page_limit {
            Some(limit) => format!(
                "{}?action=query&offset={}&limit={}",
                self.collection_url, offset, limit
            ),
            None => format!("{}?action=query&offset={}", self.collection_url, offset),
        }
    }
}
