//! Asset file fetching by content hash.

use bytes::Bytes;

use super::{
    build_http_client, join_url, send_checked, BoxFuture, ClientError, ClientResult,
    DEFAULT_TIMEOUT_SECS,
};

/// Retrieves the bytes of a model file by content hash.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, hash: String) -> BoxFuture<'_, ClientResult<Bytes>>;
}

/// Fetches assets from `{base_url}/contents/{hash}`.
pub struct HttpAssetFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssetFetcher {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Ok(Self {
            client: build_http_client(DEFAULT_TIMEOUT_SECS)?,
            base_url: base_url.into(),
        })
    }

    /// URL a given hash is fetched from.
    pub fn url_for(&self, hash: &str) -> String {
        join_url(&self.base_url, &format!("contents/{}", hash))
    }
}

impl AssetFetcher for HttpAssetFetcher {
    fn fetch(&self, hash: String) -> BoxFuture<'_, ClientResult<Bytes>> {
        Box::pin(async move {
            let url = self.url_for(&hash);
            let response = send_checked(self.client.get(&url), &url).await?;
            response.bytes().await.map_err(|e| ClientError::Request {
                url,
                reason: e.to_string(),
            })
        })
    }
}
