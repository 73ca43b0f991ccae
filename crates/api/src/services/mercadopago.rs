//! MercadoPago checkout client.
//!
//! Implements the `PaymentProvider` port over the MercadoPago REST API:
//! checkout preferences are created under `/checkout/preferences` and
//! payments are read back from `/v1/payments/{id}`.

use std::time::Duration;

use domain::services::{
    PaymentProvider, Preference, PreferenceRequest, ProviderError, ProviderPayment,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::PaymentsConfig;

const STATEMENT_DESCRIPTOR: &str = "RESERVALAFECHA";

/// HTTP client for the MercadoPago API.
pub struct MercadoPagoClient {
    client: Client,
    api_base_url: String,
    access_token: String,
}

impl std::fmt::Debug for MercadoPagoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MercadoPagoClient")
            .field("api_base_url", &self.api_base_url)
            .field("configured", &!self.access_token.is_empty())
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct PreferenceBody<'a> {
    items: [PreferenceItem<'a>; 1],
    payer: PreferencePayer<'a>,
    back_urls: BackUrlsBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_return: Option<&'static str>,
    statement_descriptor: &'static str,
    external_reference: &'a str,
    notification_url: &'a str,
    expires: bool,
    binary_mode: bool,
}

#[derive(Debug, Serialize)]
struct PreferenceItem<'a> {
    id: &'a str,
    title: &'a str,
    quantity: u32,
    unit_price: i64,
    currency_id: &'a str,
}

#[derive(Debug, Serialize)]
struct PreferencePayer<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<PhoneBody<'a>>,
}

#[derive(Debug, Serialize)]
struct PhoneBody<'a> {
    area_code: &'a str,
    number: &'a str,
}

#[derive(Debug, Serialize)]
struct BackUrlsBody<'a> {
    success: &'a str,
    failure: &'a str,
    pending: &'a str,
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    id: String,
    init_point: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: serde_json::Value,
    status: Option<String>,
    external_reference: Option<String>,
    payer: Option<PayerResponse>,
}

#[derive(Debug, Deserialize)]
struct PayerResponse {
    email: Option<String>,
    phone: Option<PhoneResponse>,
}

#[derive(Debug, Deserialize)]
struct PhoneResponse {
    number: Option<String>,
}

impl From<PaymentResponse> for ProviderPayment {
    fn from(response: PaymentResponse) -> Self {
        let id = match response.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        let (payer_email, payer_phone) = match response.payer {
            Some(payer) => (
                payer.email.filter(|e| !e.is_empty()),
                payer
                    .phone
                    .and_then(|p| p.number)
                    .filter(|n| !n.is_empty()),
            ),
            None => (None, None),
        };
        Self {
            id,
            status: response.status.unwrap_or_default(),
            external_reference: response.external_reference.filter(|r| !r.is_empty()),
            payer_email,
            payer_phone,
        }
    }
}

impl MercadoPagoClient {
    /// Builds a client whose every call is bounded by the provider timeout.
    pub fn new(config: &PaymentsConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn access_token(&self) -> Result<&str, ProviderError> {
        if self.access_token.is_empty() {
            return Err(ProviderError::NotConfigured(
                "RSVP__PAYMENTS__ACCESS_TOKEN is not set".to_string(),
            ));
        }
        Ok(&self.access_token)
    }
}

/// Maps a checkout request onto the preference payload.
fn preference_body(request: &PreferenceRequest) -> PreferenceBody<'_> {
    PreferenceBody {
        items: [PreferenceItem {
            id: &request.item_id,
            title: &request.title,
            quantity: 1,
            unit_price: request.unit_price,
            currency_id: &request.currency_id,
        }],
        payer: PreferencePayer {
            email: request.payer_email.as_deref(),
            phone: request.payer_phone.as_deref().map(|number| PhoneBody {
                area_code: "",
                number,
            }),
        },
        back_urls: BackUrlsBody {
            success: &request.back_urls.success,
            failure: &request.back_urls.failure,
            pending: &request.back_urls.pending,
        },
        auto_return: request.auto_return.then_some("approved"),
        statement_descriptor: STATEMENT_DESCRIPTOR,
        external_reference: &request.external_reference,
        notification_url: &request.notification_url,
        expires: false,
        binary_mode: false,
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Request(e.to_string())
    }
}

async fn rejected(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(200)
        .collect();
    ProviderError::Rejected { status, message }
}

#[async_trait::async_trait]
impl PaymentProvider for MercadoPagoClient {
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, ProviderError> {
        let body = preference_body(request);

        let response = self
            .client
            .post(format!("{}/checkout/preferences", self.api_base_url))
            .bearer_auth(self.access_token()?)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let created: PreferenceResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        tracing::debug!(preference_id = %created.id, "MercadoPago preference created");

        Ok(Preference {
            id: created.id,
            redirect_url: created.init_point,
        })
    }

    async fn fetch_payment(
        &self,
        provider_payment_id: &str,
    ) -> Result<ProviderPayment, ProviderError> {
        if provider_payment_id.is_empty()
            || !provider_payment_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ProviderError::NotFound(provider_payment_id.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/v1/payments/{}", self.api_base_url, provider_payment_id))
            .bearer_auth(self.access_token()?)
            .send()
            .await
            .map_err(map_send_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(ProviderError::NotFound(provider_payment_id.to_string()))
            }
            status if !status.is_success() => return Err(rejected(response).await),
            _ => {}
        }

        let payment: PaymentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(payment.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::provider::BackUrls;
    use serde_json::json;

    fn request(auto_return: bool) -> PreferenceRequest {
        PreferenceRequest {
            item_id: "8c1f".to_string(),
            title: "Plan Standard - Evento".to_string(),
            unit_price: 4999,
            currency_id: "ARS".to_string(),
            payer_email: Some("host@example.com".to_string()),
            payer_phone: None,
            external_reference: "8c1f".to_string(),
            notification_url: "https://reservalafecha.test/api/payments/webhook".to_string(),
            back_urls: BackUrls {
                success: "https://reservalafecha.test/create-event?payment_id=8c1f".to_string(),
                failure: "https://reservalafecha.test/pricing?error=payment_failed".to_string(),
                pending: "https://reservalafecha.test/pricing?status=pending".to_string(),
            },
            auto_return,
        }
    }

    fn body_json(request: &PreferenceRequest) -> serde_json::Value {
        serde_json::to_value(preference_body(request)).unwrap()
    }

    #[test]
    fn test_preference_body_shape() {
        let value = body_json(&request(true));
        assert_eq!(value["items"][0]["unit_price"], 4999);
        assert_eq!(value["items"][0]["quantity"], 1);
        assert_eq!(value["items"][0]["currency_id"], "ARS");
        assert_eq!(value["external_reference"], "8c1f");
        assert_eq!(value["auto_return"], "approved");
        assert!(value["payer"].get("phone").is_none());
    }

    #[test]
    fn test_auto_return_omitted_when_disabled() {
        let value = body_json(&request(false));
        assert!(value.get("auto_return").is_none());
    }

    #[test]
    fn test_payment_response_numeric_id() {
        let response: PaymentResponse = serde_json::from_value(json!({
            "id": 123456789,
            "status": "approved",
            "external_reference": "0b6f8f7e-8d3c-4f0e-9a59-3b1b2c2f1a10",
            "payer": { "email": "payer@example.com", "phone": { "number": "1155550000" } }
        }))
        .unwrap();
        let payment = ProviderPayment::from(response);
        assert_eq!(payment.id, "123456789");
        assert_eq!(payment.status, "approved");
        assert_eq!(payment.payer_email.as_deref(), Some("payer@example.com"));
        assert_eq!(payment.payer_phone.as_deref(), Some("1155550000"));
    }

    #[test]
    fn test_payment_response_sparse_fields() {
        let response: PaymentResponse = serde_json::from_value(json!({
            "id": "42",
            "external_reference": "",
            "payer": { "email": "" }
        }))
        .unwrap();
        let payment = ProviderPayment::from(response);
        assert_eq!(payment.id, "42");
        assert_eq!(payment.status, "");
        assert!(payment.external_reference.is_none());
        assert!(payment.payer_email.is_none());
        assert!(payment.payer_phone.is_none());
    }

    #[tokio::test]
    async fn test_missing_access_token_fails_before_request() {
        let client = MercadoPagoClient::new(&PaymentsConfig::default()).unwrap();
        let result = client.fetch_payment("123").await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_unsafe_payment_id_rejected() {
        let client = MercadoPagoClient::new(&PaymentsConfig::default()).unwrap();
        let result = client.fetch_payment("../admin").await;
        assert!(matches!(result, Err(ProviderError::NotFound(_))));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = PaymentsConfig {
            access_token: "APP_USR-secret".to_string(),
            ..PaymentsConfig::default()
        };
        let client = MercadoPagoClient::new(&config).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("APP_USR-secret"));
        assert!(debug.contains("configured: true"));
    }
}
