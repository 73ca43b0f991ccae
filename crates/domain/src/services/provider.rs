//! Payment provider port.
//!
//! The checkout provider creates hosted checkout preferences and is the
//! authority on a payment's status. The HTTP client lives in the api crate.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the payment provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Payment provider request failed: {0}")]
    Request(String),

    #[error("Payment provider timed out")]
    Timeout,

    #[error("Payment provider returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Payment provider response could not be parsed: {0}")]
    Decode(String),

    #[error("Payment {0} not found at provider")]
    NotFound(String),

    /// Credentials for the provider are missing from configuration.
    #[error("Payment provider is not configured: {0}")]
    NotConfigured(String),
}

/// Redirect targets after checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// Everything needed to create a hosted checkout for one payment.
#[derive(Debug, Clone)]
pub struct PreferenceRequest {
    pub item_id: String,
    pub title: String,
    pub unit_price: i64,
    pub currency_id: String,
    pub payer_email: Option<String>,
    pub payer_phone: Option<String>,
    pub external_reference: String,
    pub notification_url: String,
    pub back_urls: BackUrls,
    pub auto_return: bool,
}

/// A created checkout preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub id: String,
    pub redirect_url: String,
}

/// Authoritative payment record fetched from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPayment {
    pub id: String,
    pub status: String,
    pub external_reference: Option<String>,
    pub payer_email: Option<String>,
    pub payer_phone: Option<String>,
}

#[async_trait::async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, ProviderError>;

    async fn fetch_payment(&self, provider_payment_id: &str)
        -> Result<ProviderPayment, ProviderError>;
}

/// In-process provider for development and testing.
///
/// Records created preferences and serves payments registered with
/// [`MockPaymentProvider::insert_payment`].
#[derive(Debug, Default)]
pub struct MockPaymentProvider {
    payments: Mutex<HashMap<String, ProviderPayment>>,
    preferences: Mutex<Vec<PreferenceRequest>>,
    /// Whether to simulate provider outages.
    pub simulate_failure: bool,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider that fails every call.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Registers (or replaces) a provider-side payment.
    pub fn insert_payment(&self, payment: ProviderPayment) {
        if let Ok(mut payments) = self.payments.lock() {
            payments.insert(payment.id.clone(), payment);
        }
    }

    /// Convenience for the common case of a payment pointing at a local id.
    pub fn set_status(&self, provider_payment_id: &str, local_payment_id: Uuid, status: &str) {
        self.insert_payment(ProviderPayment {
            id: provider_payment_id.to_string(),
            status: status.to_string(),
            external_reference: Some(local_payment_id.to_string()),
            payer_email: None,
            payer_phone: None,
        });
    }

    /// Preferences created so far, oldest first.
    pub fn created_preferences(&self) -> Vec<PreferenceRequest> {
        self.preferences
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, ProviderError> {
        if self.simulate_failure {
            tracing::warn!("Mock payment provider simulating failure");
            return Err(ProviderError::Request("Simulated failure".to_string()));
        }

        let mut preferences = self
            .preferences
            .lock()
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        preferences.push(request.clone());
        let id = format!("pref-{}", preferences.len());

        tracing::info!(
            preference_id = %id,
            external_reference = %request.external_reference,
            "Mock: Would create checkout preference"
        );

        Ok(Preference {
            redirect_url: format!("https://checkout.example.test/{}", id),
            id,
        })
    }

    async fn fetch_payment(
        &self,
        provider_payment_id: &str,
    ) -> Result<ProviderPayment, ProviderError> {
        if self.simulate_failure {
            tracing::warn!("Mock payment provider simulating failure");
            return Err(ProviderError::Timeout);
        }

        self.payments
            .lock()
            .map_err(|e| ProviderError::Request(e.to_string()))?
            .get(provider_payment_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(provider_payment_id.to_string()))
    }
}
