//! Typed HTTP client for the ordering API.

use async_trait::async_trait;
use common::{CatalogItem, CatalogItemId, Order, OrderId, OrderStatus, PlaceOrderRequest};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::ClientError;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    error: Option<String>,
    details: Option<Value>,
}

/// Client for the `/api` endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub async fn list_menu(&self, category: Option<&str>) -> Result<Vec<CatalogItem>, ClientError> {
        let mut request = self.http.get(self.url("/menu"));
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }
        send(request).await
    }

    pub async fn get_menu_item(&self, id: CatalogItemId) -> Result<CatalogItem, ClientError> {
        send(self.http.get(self.url(&format!("/menu/{id}")))).await
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn place_order(&self, request: &PlaceOrderRequest) -> Result<Order, ClientError> {
        send(self.http.post(self.url("/orders")).json(request)).await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, ClientError> {
        send(self.http.get(self.url("/orders"))).await
    }

    /// Fetches an order. A 404 yields `Ok(None)`.
    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>, ClientError> {
        match send(self.http.get(self.url(&format!("/orders/{id}")))).await {
            Ok(order) => Ok(Some(order)),
            Err(ClientError::Api { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ClientError> {
        let request = self
            .http
            .patch(self.url(&format!("/orders/{id}/status")))
            .json(&json!({ "status": status }));
        send(request).await
    }

    /// Advances the order one step through the demo endpoint.
    #[tracing::instrument(skip(self))]
    pub async fn simulate(&self, id: OrderId) -> Result<Order, ClientError> {
        send(self.http.post(self.url(&format!("/orders/{id}/simulate")))).await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    let envelope: Envelope<T> = match response.json().await {
        Ok(envelope) => envelope,
        Err(err) if status.is_success() => return Err(err.into()),
        Err(_) => {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                details: None,
            });
        }
    };

    if !status.is_success() || !envelope.success {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: envelope.error.unwrap_or_else(|| status.to_string()),
            details: envelope.details,
        });
    }
    envelope.data.ok_or(ClientError::MissingData)
}

/// Where an [`crate::OrderTracker`] reads orders from and sends advances to.
#[async_trait]
pub trait OrderSource: Send + Sync + 'static {
    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, ClientError>;

    async fn advance_order(&self, id: OrderId) -> Result<Order, ClientError>;
}

#[async_trait]
impl OrderSource for ApiClient {
    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, ClientError> {
        self.get_order(id).await
    }

    async fn advance_order(&self, id: OrderId) -> Result<Order, ClientError> {
        self.simulate(id).await
    }
}
