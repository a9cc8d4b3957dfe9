//! Order status provider: one HTTP call per poll.

use crate::order_id::OrderId;
use async_trait::async_trait;
use courier_core::{config::TrackerConfig, error::CourierError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Phase value that ends tracking.
pub const TERMINAL_PHASE: &str = "COMPLETED";

/// Overall lifecycle stage of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderPhase {
    Completed,
    /// Any non-terminal phase, kept verbatim for logging.
    Active(String),
}

impl OrderPhase {
    pub fn parse(raw: &str) -> Self {
        if raw == TERMINAL_PHASE {
            Self::Completed
        } else {
            Self::Active(raw.to_string())
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// One observation of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatus {
    pub phase: OrderPhase,
    /// Human-readable summary, e.g. "Your Dasher is on the way".
    /// Only absent for a completed order.
    pub summary: Option<String>,
}

/// Source of order status observations.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Fetch the current status. Transport failures, non-success responses,
    /// undecodable bodies, and missing fields all come back as `Provider` errors.
    async fn fetch(&self, order: &OrderId) -> Result<OrderStatus, CourierError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusRequest<'a> {
    pub order_identifier: &'a str,
    pub timezone: &'a str,
    pub show_upsell_flag: bool,
    pub is_direct_tracking: bool,
}

#[derive(Deserialize)]
pub(crate) struct StatusResponse {
    pub data: Option<StatusData>,
}

#[derive(Deserialize)]
pub(crate) struct StatusData {
    pub orders: Option<Vec<OrderEntry>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderEntry {
    pub order_info: Option<OrderInfo>,
    pub active_order_status: Option<ActiveOrderStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderInfo {
    pub order_phase: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActiveOrderStatus {
    pub title_summary: Option<TitleSummary>,
}

#[derive(Deserialize)]
pub(crate) struct TitleSummary {
    pub summary: Option<SummaryText>,
}

#[derive(Deserialize)]
pub(crate) struct SummaryText {
    pub text: Option<String>,
}

impl StatusResponse {
    /// Pull phase and summary out of `data.orders[0]`.
    pub(crate) fn into_status(self) -> Result<OrderStatus, CourierError> {
        let order = self
            .data
            .and_then(|d| d.orders)
            .and_then(|orders| orders.into_iter().next())
            .ok_or_else(|| CourierError::Provider("response has no data.orders[0]".into()))?;

        let phase = order
            .order_info
            .and_then(|info| info.order_phase)
            .map(|raw| OrderPhase::parse(&raw))
            .ok_or_else(|| CourierError::Provider("response has no orderInfo.orderPhase".into()))?;

        let summary = order
            .active_order_status
            .and_then(|s| s.title_summary)
            .and_then(|t| t.summary)
            .and_then(|s| s.text);

        if summary.is_none() && !phase.is_terminal() {
            return Err(CourierError::Provider(
                "response has no activeOrderStatus.titleSummary.summary.text".into(),
            ));
        }

        Ok(OrderStatus { phase, summary })
    }
}

/// Status provider that POSTs to the configured tracking endpoint.
pub struct HttpStatusProvider {
    client: reqwest::Client,
    endpoint: String,
    timezone: String,
    timeout: Duration,
}

impl HttpStatusProvider {
    /// Create from tracker config.
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            timezone: config.timezone.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl StatusProvider for HttpStatusProvider {
    async fn fetch(&self, order: &OrderId) -> Result<OrderStatus, CourierError> {
        let body = StatusRequest {
            order_identifier: order.as_str(),
            timezone: &self.timezone,
            show_upsell_flag: true,
            is_direct_tracking: false,
        };

        debug!("tracker: POST {} order={order}", self.endpoint);

        let resp = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| CourierError::Provider(format!("status request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(CourierError::Provider(format!(
                "status endpoint returned {status}: {text}"
            )));
        }

        let parsed: StatusResponse = resp
            .json()
            .await
            .map_err(|e| CourierError::Provider(format!("failed to parse status response: {e}")))?;

        parsed.into_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_id::extract_order_id;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ID: &str = "3f2b9c1e-8a4d-4e6f-9b2a-1c3d5e7f9a0b";

    fn order_body(phase: &str, summary: &str) -> serde_json::Value {
        json!({
            "data": {
                "orders": [{
                    "orderInfo": { "orderPhase": phase },
                    "activeOrderStatus": {
                        "titleSummary": { "summary": { "text": summary } }
                    }
                }]
            }
        })
    }

    fn provider_for(server: &MockServer) -> HttpStatusProvider {
        let config = TrackerConfig {
            endpoint: format!("{}/status", server.uri()),
            ..Default::default()
        };
        HttpStatusProvider::from_config(&config)
    }

    #[test]
    fn test_request_shape() {
        let body = StatusRequest {
            order_identifier: ID,
            timezone: "America/New_York",
            show_upsell_flag: true,
            is_direct_tracking: false,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "orderIdentifier": ID,
                "timezone": "America/New_York",
                "showUpsellFlag": true,
                "isDirectTracking": false,
            })
        );
    }

    #[test]
    fn test_phase_parse() {
        assert!(OrderPhase::parse("COMPLETED").is_terminal());
        assert!(!OrderPhase::parse("completed").is_terminal());
        assert_eq!(
            OrderPhase::parse("EN_ROUTE"),
            OrderPhase::Active("EN_ROUTE".into())
        );
    }

    #[test]
    fn test_into_status_missing_orders() {
        let resp: StatusResponse = serde_json::from_value(json!({ "data": { "orders": [] } })).unwrap();
        assert!(matches!(resp.into_status(), Err(CourierError::Provider(_))));

        let resp: StatusResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.into_status().is_err());
    }

    #[test]
    fn test_into_status_missing_summary_on_active_order() {
        let resp: StatusResponse = serde_json::from_value(json!({
            "data": { "orders": [{ "orderInfo": { "orderPhase": "EN_ROUTE" } }] }
        }))
        .unwrap();
        let err = resp.into_status().unwrap_err();
        assert!(err.to_string().contains("summary.text"));
    }

    #[test]
    fn test_into_status_completed_without_summary() {
        let resp: StatusResponse = serde_json::from_value(json!({
            "data": { "orders": [{ "orderInfo": { "orderPhase": "COMPLETED" } }] }
        }))
        .unwrap();
        let status = resp.into_status().unwrap();
        assert!(status.phase.is_terminal());
        assert!(status.summary.is_none());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/status"))
            .and(body_json(json!({
                "orderIdentifier": ID,
                "timezone": "America/New_York",
                "showUpsellFlag": true,
                "isDirectTracking": false,
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(order_body("EN_ROUTE", "Dasher is on the way")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let status = provider.fetch(&extract_order_id(ID).unwrap()).await.unwrap();
        assert_eq!(status.phase, OrderPhase::Active("EN_ROUTE".into()));
        assert_eq!(status.summary.as_deref(), Some("Dasher is on the way"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .fetch(&extract_order_id(ID).unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"), "got: {err}");
    }

    #[tokio::test]
    async fn test_fetch_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .fetch(&extract_order_id(ID).unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse"), "got: {err}");
    }
}
