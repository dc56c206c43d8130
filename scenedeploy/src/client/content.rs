//! Content network client.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{
    build_http_client, join_url, send_checked, BoxFuture, ClientError, ClientResult,
    DEFAULT_TIMEOUT_SECS,
};
use crate::content::{build_entity, BuildEntityOptions, ContentFiles, Entity, EntityType, PreparedEntity};
use crate::identity::AuthChain;

/// Everything needed to publish a built entity.
#[derive(Debug, Clone)]
pub struct DeployEntityRequest {
    pub entity_id: String,
    /// Content hash → bytes.
    pub files: BTreeMap<String, Bytes>,
    pub auth_chain: AuthChain,
}

/// A content server (land catalyst or worlds server).
pub trait ContentClient: Send + Sync {
    /// Base URL of the server, used to resolve content by hash.
    fn content_url(&self) -> &str;

    /// Builds an entity stamped with the current time.
    ///
    /// Entity construction is local; nothing is sent.
    fn build_entity(
        &self,
        kind: EntityType,
        pointers: Vec<String>,
        metadata: Value,
        files: ContentFiles,
    ) -> ClientResult<PreparedEntity> {
        Ok(build_entity(BuildEntityOptions {
            kind,
            pointers,
            metadata,
            files,
            timestamp: Utc::now().timestamp_millis(),
        })?)
    }

    /// Uploads a signed entity and its files.
    fn deploy_entity(&self, request: DeployEntityRequest) -> BoxFuture<'_, ClientResult<()>>;

    /// Active entities claiming any of `pointers`.
    fn fetch_entities_by_pointers(
        &self,
        pointers: Vec<String>,
    ) -> BoxFuture<'_, ClientResult<Vec<Entity>>>;
}

/// HTTP implementation of [`ContentClient`].
pub struct HttpContentClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentClient {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> ClientResult<Self> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            base_url: base_url.into(),
        })
    }
}

#[derive(Serialize)]
struct PointersBody<'a> {
    pointers: &'a [String],
}

fn deploy_form(request: DeployEntityRequest) -> Form {
    let mut form = Form::new().text("entityId", request.entity_id);

    for (i, link) in request.auth_chain.into_iter().enumerate() {
        form = form
            .text(format!("authChain[{}][type]", i), link.kind.as_str())
            .text(format!("authChain[{}][payload]", i), link.payload)
            .text(format!("authChain[{}][signature]", i), link.signature);
    }

    for (hash, data) in request.files {
        let part = Part::bytes(data.to_vec()).file_name(hash.clone());
        form = form.part(hash, part);
    }

    form
}

impl ContentClient for HttpContentClient {
    fn content_url(&self) -> &str {
        &self.base_url
    }

    fn deploy_entity(&self, request: DeployEntityRequest) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            let url = join_url(&self.base_url, "entities");
            let entity_id = request.entity_id.clone();
            info!(entity_id = %entity_id, files = request.files.len(), url = %url, "Deploying entity");

            let form = deploy_form(request);
            send_checked(self.client.post(&url).multipart(form), &url).await?;

            debug!(entity_id = %entity_id, "Entity deployed");
            Ok(())
        })
    }

    fn fetch_entities_by_pointers(
        &self,
        pointers: Vec<String>,
    ) -> BoxFuture<'_, ClientResult<Vec<Entity>>> {
        Box::pin(async move {
            let url = join_url(&self.base_url, "entities/active");
            debug!(count = pointers.len(), url = %url, "Fetching entities by pointers");

            let body = PointersBody {
                pointers: &pointers,
            };
            let response = send_checked(self.client.post(&url).json(&body), &url).await?;

            response
                .json::<Vec<Entity>>()
                .await
                .map_err(|e| ClientError::Decode {
                    url: url.clone(),
                    reason: e.to_string(),
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_url_is_base() {
        let client = HttpContentClient::new("https://worlds.example/").unwrap();
        assert_eq!(client.content_url(), "https://worlds.example/");
    }

    #[test]
    fn test_build_entity_stamps_time() {
        let client = HttpContentClient::new("https://peer.example/content").unwrap();
        let before = Utc::now().timestamp_millis();
        let prepared = client
            .build_entity(
                EntityType::Scene,
                vec!["0,0".into()],
                serde_json::json!({}),
                Vec::new(),
            )
            .unwrap();
        assert!(prepared.entity.timestamp >= before);
    }

    #[test]
    fn test_build_entity_propagates_content_error() {
        let client = HttpContentClient::new("https://peer.example/content").unwrap();
        let err = client
            .build_entity(EntityType::Scene, Vec::new(), serde_json::json!({}), Vec::new())
            .unwrap_err();
        assert!(matches!(err, ClientError::Content(_)));
    }
}
