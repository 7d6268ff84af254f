//! Remote access to the instrument HTTP API.
//!
//! `InstrumentApi` is the seam the optimistic list view talks through;
//! `InstrumentHttpClient` implements it over reqwest.

use crate::error::InstrumentResult;
use crate::types::{Instrument, InstrumentId, ListOrder};
use async_trait::async_trait;

/// Operations a client can perform against the instrument API.
#[async_trait]
pub trait InstrumentApi: Send + Sync {
    async fn list(&self, order: ListOrder) -> InstrumentResult<Vec<Instrument>>;
    async fn create(&self, name: String) -> InstrumentResult<Instrument>;
    async fn update(&self, id: InstrumentId, name: String) -> InstrumentResult<Instrument>;
    async fn delete(&self, id: InstrumentId) -> InstrumentResult<()>;
}

#[cfg(feature = "client")]
pub use http::InstrumentHttpClient;

#[cfg(feature = "client")]
mod http {
    use super::InstrumentApi;
    use crate::error::{InstrumentError, InstrumentResult};
    use crate::types::{Instrument, InstrumentId, ListOrder};
    use async_trait::async_trait;
    use reqwest::{Response, StatusCode};
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};

    /// HTTP client for the instrument API.
    #[derive(Debug, Clone)]
    pub struct InstrumentHttpClient {
        base_url: String,
        client: reqwest::Client,
    }

    impl InstrumentHttpClient {
        /// Create a new HTTP client for the instrument API.
        pub fn new(base_url: &str) -> Self {
            Self::with_client(base_url, reqwest::Client::new())
        }

        pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
            Self {
                base_url: base_url.trim_end_matches('/').to_string(),
                client,
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        fn collection_url(&self) -> String {
            format!("{}/api/instruments", self.base_url)
        }

        fn item_url(&self, id: InstrumentId) -> String {
            format!("{}/api/instruments/{}", self.base_url, id)
        }

        async fn decode<T: DeserializeOwned>(
            response: Response,
            target: Option<InstrumentId>,
        ) -> InstrumentResult<T> {
            let response = check_status(response, target).await?;
            response
                .json::<T>()
                .await
                .map_err(|e| InstrumentError::Serialization(e.to_string()))
        }
    }

    fn transport(err: reqwest::Error) -> InstrumentError {
        InstrumentError::Transport(err.to_string())
    }

    /// Map a non-success response to the matching `InstrumentError`.
    ///
    /// A 404 becomes `NotFound` only when the request addressed a single id.
    async fn check_status(
        response: Response,
        target: Option<InstrumentId>,
    ) -> InstrumentResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status.to_string());

        Err(match (status, target) {
            (StatusCode::BAD_REQUEST, _) => InstrumentError::Validation(message),
            (StatusCode::NOT_FOUND, Some(id)) => InstrumentError::NotFound(id),
            _ => InstrumentError::Transport(message),
        })
    }

    #[async_trait]
    impl InstrumentApi for InstrumentHttpClient {
        async fn list(&self, order: ListOrder) -> InstrumentResult<Vec<Instrument>> {
            let response = self
                .client
                .get(self.collection_url())
                .query(&[("order", order.as_str())])
                .send()
                .await
                .map_err(transport)?;
            Self::decode(response, None).await
        }

        async fn create(&self, name: String) -> InstrumentResult<Instrument> {
            let response = self
                .client
                .post(self.collection_url())
                .json(&json!({ "name": name }))
                .send()
                .await
                .map_err(transport)?;
            Self::decode(response, None).await
        }

        async fn update(&self, id: InstrumentId, name: String) -> InstrumentResult<Instrument> {
            let response = self
                .client
                .put(self.item_url(id))
                .json(&json!({ "name": name }))
                .send()
                .await
                .map_err(transport)?;
            Self::decode(response, Some(id)).await
        }

        async fn delete(&self, id: InstrumentId) -> InstrumentResult<()> {
            let response = self
                .client
                .delete(self.item_url(id))
                .send()
                .await
                .map_err(transport)?;
            check_status(response, Some(id)).await?;
            Ok(())
        }
    }

}
