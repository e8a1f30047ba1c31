//! HTTP client for the shared history server

use libmapmark_core::protocol::{
    BatchResponse, DeleteResponse, BATCH_PATH, MARKERS_PATH, SNAPSHOTS_PATH, USER_HEADER,
};
use libmapmark_core::types::lenient;
use libmapmark_core::{ClientConfig, Marker, Snapshot};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use tracing::debug;

use crate::error::SyncError;

/// Client for the four server endpoints.
///
/// Each call is exactly one request. There is no retry and no timeout;
/// callers that need either wrap the future themselves.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: Client,
    base: Url,
    user: Option<String>,
}

impl SyncClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8888/api`)
    pub fn new(base_url: &str, user: Option<String>) -> Result<Self, SyncError> {
        let base = Url::parse(base_url).map_err(|e| SyncError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(SyncError::InvalidUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        Ok(Self {
            http: Client::new(),
            base,
            user: user.filter(|u| !u.is_empty()),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, SyncError> {
        Self::new(&config.server_url, config.user.clone())
    }

    /// Get the API base this client talks to
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// GET the full remote history
    pub async fn fetch_all(&self) -> Result<Vec<Snapshot>, SyncError> {
        let url = self.endpoint(SNAPSHOTS_PATH, None)?;
        debug!(%url, "fetching snapshots");
        let response = self.send(self.request(Method::GET, url)).await?;
        let snapshots: Vec<Snapshot> = lenient::records(decode(response).await?)?;
        debug!(count = snapshots.len(), "fetched snapshots");
        Ok(snapshots)
    }

    /// POST one marker; returns the server's stored form
    pub async fn push_marker_add(&self, marker: &Marker) -> Result<Marker, SyncError> {
        let url = self.endpoint(MARKERS_PATH, None)?;
        debug!(marker_id = %marker.id, x = marker.x, y = marker.y, "adding marker");
        let response = self
            .send(self.request(Method::POST, url).json(marker))
            .await?;
        decode(response).await
    }

    /// DELETE a marker by id; returns the id the server confirmed
    pub async fn push_marker_delete(&self, marker_id: &str) -> Result<String, SyncError> {
        let url = self.endpoint(MARKERS_PATH, Some(marker_id))?;
        debug!(marker_id, "deleting marker");
        let response = self.send(self.request(Method::DELETE, url)).await?;
        let body: DeleteResponse = decode(response).await?;
        Ok(body.marker_id)
    }

    /// POST a whole snapshot sequence for verbatim append on the server.
    ///
    /// The server does not deduplicate: pushing history it already has
    /// duplicates those snapshots remotely.
    pub async fn push_batch(&self, snapshots: &[Snapshot]) -> Result<String, SyncError> {
        let url = self.endpoint(BATCH_PATH, None)?;
        debug!(count = snapshots.len(), "uploading snapshots");
        let response = self
            .send(self.request(Method::POST, url).json(snapshots))
            .await?;
        let body: BatchResponse = decode(response).await?;
        Ok(body.message)
    }

    fn endpoint(&self, path: &str, id: Option<&str>) -> Result<Url, SyncError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| SyncError::InvalidUrl {
                url: self.base.to_string(),
                reason: "not a hierarchical URL".to_string(),
            })?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.user {
            Some(user) => builder.header(USER_HEADER, user),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, SyncError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| status.to_string());
        Err(SyncError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, SyncError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let client = SyncClient::new("http://localhost:8888/api", None).unwrap();
        let url = client.endpoint(SNAPSHOTS_PATH, None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8888/api/map/snapshots");

        let client = SyncClient::new("http://localhost:8888/api/", None).unwrap();
        let url = client.endpoint(BATCH_PATH, None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8888/api/map/snapshots/batch");
    }

    #[test]
    fn test_endpoint_escapes_marker_id() {
        let client = SyncClient::new("http://localhost:8888/api", None).unwrap();
        let url = client.endpoint(MARKERS_PATH, Some("odd id/1")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8888/api/map/markers/odd%20id%2F1");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            SyncClient::new("not a url", None),
            Err(SyncError::InvalidUrl { .. })
        ));
        assert!(matches!(
            SyncClient::new("mailto:someone@example.com", None),
            Err(SyncError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_empty_user_is_ignored() {
        let client = SyncClient::new("http://localhost:8888/api", Some(String::new())).unwrap();
        assert_eq!(client.user(), None);
    }
}
