//! Builder API client: preview media and pool publishing.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info};

use super::{
    build_http_client, join_url, send_checked, BoxFuture, ClientError, ClientResult,
    DEFAULT_TIMEOUT_SECS,
};
use crate::progress::{report, ProgressCallback, ProgressStage};

/// Preview image plus the four compass shots of a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub preview: Bytes,
    pub north: Bytes,
    pub east: Bytes,
    pub south: Bytes,
    pub west: Bytes,
}

impl MediaUpload {
    /// Parts in upload order, with their form field names.
    pub fn parts(&self) -> [(&'static str, &Bytes); 5] {
        [
            ("thumbnail", &self.preview),
            ("north", &self.north),
            ("east", &self.east),
            ("south", &self.south),
            ("west", &self.west),
        ]
    }

    /// Total size of all images in bytes.
    pub fn total_bytes(&self) -> usize {
        self.parts().iter().map(|(_, b)| b.len()).sum()
    }
}

/// The builder's own backend.
pub trait BuilderApi: Send + Sync {
    /// Uploads preview media of a project.
    ///
    /// Progress, when requested, is reported under `UploadRecording`.
    fn upload_media(
        &self,
        project_id: String,
        media: MediaUpload,
        on_progress: Option<ProgressCallback>,
    ) -> BoxFuture<'_, ClientResult<()>>;

    /// Publishes a project to the public scene pool.
    fn deploy_to_pool(
        &self,
        project_id: String,
        additional_info: Option<Value>,
    ) -> BoxFuture<'_, ClientResult<()>>;

    /// Public URL of a project's uploaded preview image.
    fn preview_url(&self, project_id: &str) -> String;
}

/// HTTP implementation of [`BuilderApi`].
pub struct HttpBuilderApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBuilderApi {
    /// Creates a client for the builder API at `base_url`.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Ok(Self {
            client: build_http_client(DEFAULT_TIMEOUT_SECS)?,
            base_url: base_url.into(),
        })
    }

    fn project_url(&self, project_id: &str, path: &str) -> String {
        join_url(&self.base_url, &format!("projects/{}/{}", project_id, path))
    }
}

impl BuilderApi for HttpBuilderApi {
    fn upload_media(
        &self,
        project_id: String,
        media: MediaUpload,
        on_progress: Option<ProgressCallback>,
    ) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            let url = self.project_url(&project_id, "media");
            info!(project_id = %project_id, bytes = media.total_bytes(), "Uploading preview media");
            report(on_progress.as_ref(), ProgressStage::UploadRecording, 0);

            let mut form = Form::new();
            for (name, data) in media.parts() {
                let part = Part::bytes(data.to_vec())
                    .file_name(format!("{}.png", name))
                    .mime_str("image/png")
                    .map_err(|e| ClientError::Request {
                        url: url.clone(),
                        reason: e.to_string(),
                    })?;
                form = form.part(name, part);
            }

            send_checked(self.client.post(&url).multipart(form), &url).await?;
            report(on_progress.as_ref(), ProgressStage::UploadRecording, 100);
            Ok(())
        })
    }

    fn deploy_to_pool(
        &self,
        project_id: String,
        additional_info: Option<Value>,
    ) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            let url = self.project_url(&project_id, "pool");
            debug!(project_id = %project_id, "Publishing to pool");

            let body = additional_info.unwrap_or_else(|| Value::Object(Default::default()));
            send_checked(self.client.post(&url).json(&body), &url).await?;
            Ok(())
        })
    }

    fn preview_url(&self, project_id: &str) -> String {
        self.project_url(project_id, "media/preview.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_url() {
        let api = HttpBuilderApi::new("https://builder.example/v1/").unwrap();
        assert_eq!(
            api.preview_url("p1"),
            "https://builder.example/v1/projects/p1/media/preview.png"
        );
    }

    #[test]
    fn test_media_parts_order() {
        let media = MediaUpload {
            preview: Bytes::from_static(b"p"),
            north: Bytes::from_static(b"nn"),
            east: Bytes::from_static(b"e"),
            south: Bytes::from_static(b"s"),
            west: Bytes::from_static(b"w"),
        };
        let names: Vec<_> = media.parts().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["thumbnail", "north", "east", "south", "west"]);
        assert_eq!(media.total_bytes(), 6);
    }
}
