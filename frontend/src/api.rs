//! API client for communicating with the switcher backend.

use fazantix_types::ConfigResponse;
use tracing::info;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Deserialization error
    Decode(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http(code, msg) => write!(f, "HTTP {} error: {}", code, msg),
            ApiError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Outbound "switch stage X to scene Y" requests.
///
/// Implementations must not wait for or interpret the outcome. Whether the
/// switch happened is only ever learned from the push channel.
pub trait SwitchGateway {
    fn switch_scene(&self, stage: &str, scene: &str);
}

/// Client for the switcher REST API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client. `base_url` points at the `/api` root,
    /// e.g. `http://localhost:8000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client for a server root URL such as `http://localhost:8000`.
    pub fn for_server(server_url: &str) -> Self {
        Self::new(format!("{}/api", server_url.trim_end_matches('/')))
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the switch request for a stage and scene.
    ///
    /// Both segments are percent-encoded so identifiers containing `/` or
    /// spaces still route to the right handler.
    pub fn scene_url(&self, stage: &str, scene: &str) -> String {
        format!(
            "{}/scene/{}/{}",
            self.base_url,
            urlencoding::encode(stage),
            urlencoding::encode(scene)
        )
    }

    /// Fetch the stage and scene lists.
    pub async fn get_config(&self) -> ApiResult<ConfigResponse> {
        let url = format!("{}/config", self.base_url);
        info!("Fetching switcher config from: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Network error fetching config: {}", e);
            ApiError::Network(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            tracing::error!("HTTP error {}: {}", status, text);
            return Err(ApiError::Http(status, text));
        }

        let config: ConfigResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse config response: {}", e);
            ApiError::Decode(e.to_string())
        })?;

        info!(
            "Loaded config with {} stages and {} scenes",
            config.stages.len(),
            config.scenes.len()
        );
        Ok(config)
    }

    /// Ask the backend to transition `stage` to `scene`.
    pub async fn set_scene(&self, stage: &str, scene: &str) -> ApiResult<()> {
        let url = self.scene_url(stage, scene);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(status, text));
        }
        Ok(())
    }
}

impl SwitchGateway for ApiClient {
    fn switch_scene(&self, stage: &str, scene: &str) {
        info!("Switching to {} on stage {}", scene, stage);

        let api = self.clone();
        let stage = stage.to_string();
        let scene = scene.to_string();
        crate::app::spawn_task(async move {
            if let Err(e) = api.set_scene(&stage, &scene).await {
                tracing::warn!("Switch request for {}/{} failed: {}", stage, scene, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_server_appends_api_root() {
        let api = ApiClient::for_server("http://mixer.local:8000/");
        assert_eq!(api.base_url(), "http://mixer.local:8000/api");
    }

    #[test]
    fn test_scene_url_plain_identifiers() {
        let api = ApiClient::new("http://localhost:8000/api");
        assert_eq!(
            api.scene_url("projector", "side-by-side"),
            "http://localhost:8000/api/scene/projector/side-by-side"
        );
    }

    #[test]
    fn test_scene_url_escapes_segments() {
        let api = ApiClient::new("http://localhost:8000/api");
        assert_eq!(
            api.scene_url("room/1", "cam 2"),
            "http://localhost:8000/api/scene/room%2F1/cam%202"
        );
    }
}
