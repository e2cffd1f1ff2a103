//! Backend API client driven by a [`ResolvedConfig`].

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;

use crate::client::resolver::ResolvedConfig;

/// Issues API calls through the resolved routing mode.
///
/// The configuration is shared, never looked up globally: construct one
/// [`ResolvedConfig`] at start-up and hand it to every client.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<ResolvedConfig>,
}

impl ApiClient {
    pub fn new(config: Arc<ResolvedConfig>) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: Arc<ResolvedConfig>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Start a request for a backend-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.build_api_url(path);
        tracing::debug!(method = %method, url = %url, "API request");
        self.client.request(method, url)
    }

    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.request(Method::GET, path).send().await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, reqwest::Error> {
        self.request(Method::POST, path).json(body).send().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::resolver::{resolve, ClientDefaults, PageProtocol};

    #[test]
    fn test_request_targets_proxy_when_proxied() {
        let defaults = ClientDefaults {
            api_base_url: "http://backend/".into(),
            ws_base_url: "ws://backend/".into(),
        };
        let config = Arc::new(resolve(
            &defaults,
            PageProtocol::Https,
            Some("https://proxy.example/api/proxy"),
        ));
        let client = ApiClient::new(config);

        let request = client.request(Method::GET, "/v1/items").build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://proxy.example/api/proxy?path=v1%2Fitems"
        );
    }
}
