//! HTTP implementation of the `GraphSource` seam.

use std::sync::Arc;
use std::time::Duration;

use domain::services::GraphSource;
use domain::FetchError;
use reqwest::Client;
use serde_json::Value;

use crate::auth::TokenProvider;

/// Upper bound on followed `@odata.nextLink` pages for one resource.
const MAX_PAGES: usize = 1000;

/// Settings for the Graph transport.
#[derive(Debug, Clone)]
pub struct GraphClientConfig {
    /// Versioned API base, e.g. `https://graph.microsoft.com/beta`.
    pub base_url: String,
    pub timeout: Duration,
}

/// Graph API client issuing authenticated GET requests.
pub struct GraphClient {
    client: Client,
    config: GraphClientConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl GraphClient {
    pub fn new(config: GraphClientConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                resource: config.base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// Absolute URL of a resource path.
    pub fn resource_url(&self, resource: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            resource.trim_start_matches('/')
        )
    }

    async fn get_page(&self, resource: &str, url: &str, token: &str) -> Result<Value, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            resource: resource.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            tracing::debug!(
                resource = %resource,
                status = %status.as_u16(),
                "Graph request failed"
            );
            return Err(FetchError::remote(resource, status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::malformed(resource, e.to_string()))
    }
}

/// Splits a collection page into its items and the next page link.
fn parse_page(resource: &str, page: Value) -> Result<(Vec<Value>, Option<String>), FetchError> {
    let Value::Object(mut body) = page else {
        return Err(FetchError::malformed(resource, "response is not a JSON object"));
    };

    let items = match body.remove("value") {
        Some(Value::Array(items)) => items,
        _ => return Err(FetchError::malformed(resource, "missing value array")),
    };

    let next_link = body
        .remove("@odata.nextLink")
        .and_then(|link| link.as_str().map(str::to_string));

    Ok((items, next_link))
}

#[async_trait::async_trait]
impl GraphSource for GraphClient {
    async fn fetch(&self, resource: &str) -> Result<Vec<Value>, FetchError> {
        let token = self.tokens.access_token().await?;

        let mut items = Vec::new();
        let mut url = self.resource_url(resource);
        for page_number in 1..=MAX_PAGES {
            let page = self.get_page(resource, &url, &token).await?;
            let (mut page_items, next_link) = parse_page(resource, page)?;
            items.append(&mut page_items);

            match next_link {
                Some(next) => {
                    tracing::debug!(resource = %resource, page = page_number, "Following next page");
                    url = next;
                }
                None => return Ok(items),
            }
        }

        Err(FetchError::malformed(
            resource,
            format!("more than {} pages", MAX_PAGES),
        ))
    }
}
