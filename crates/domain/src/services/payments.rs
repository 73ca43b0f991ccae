//! Payment lifecycle: checkout creation, provider notifications, lookups.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use super::provider::{BackUrls, PaymentProvider, PreferenceRequest, ProviderError};
use super::store::{PaymentStore, StoreError};
use crate::models::{
    CheckoutRequest, CheckoutSession, NewPayment, Payment, PaymentPlan, PaymentStatus,
    PaymentSummary, PaymentUpdate, PlanPricing, ProviderNotification, PLACEHOLDER_EMAIL,
};

/// Currency of every checkout item.
pub const CHECKOUT_CURRENCY: &str = "ARS";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Invalid plan")]
    InvalidPlan,

    #[error("Notification does not reference a payment")]
    MissingReference,

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Payment was modified concurrently")]
    ConcurrentUpdate,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a provider notification did to local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Not a payment notification.
    Ignored,
    /// Status (or payer details) recorded.
    Updated {
        payment_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    },
    /// The provider reported a status the state machine does not allow.
    TransitionRejected {
        payment_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

impl NotificationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationOutcome::Ignored => "ignored",
            NotificationOutcome::Updated { from, to, .. } if from == to => "unchanged",
            NotificationOutcome::Updated { .. } => "updated",
            NotificationOutcome::TransitionRejected { .. } => "transition_rejected",
        }
    }
}

/// Checkout settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    base_url: String,
    pub pricing: PlanPricing,
}

impl CheckoutSettings {
    pub fn new(base_url: &str, pricing: PlanPricing) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            pricing,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Providers refuse auto-return to local addresses.
    pub fn auto_return(&self) -> bool {
        !(self.base_url.contains("://localhost") || self.base_url.contains("://127.0.0.1"))
    }

    fn back_urls(&self, plan: PaymentPlan, payment_id: Uuid) -> BackUrls {
        let success = match plan {
            PaymentPlan::Standard => format!("{}/create-event?payment_id={}", self.base_url, payment_id),
            PaymentPlan::Premium => {
                format!("{}/premium-confirmed?payment_id={}", self.base_url, payment_id)
            }
        };
        BackUrls {
            success,
            failure: format!("{}/pricing?error=payment_failed", self.base_url),
            pending: format!("{}/pricing?status=pending", self.base_url),
        }
    }

    fn notification_url(&self) -> String {
        format!("{}/api/payments/webhook", self.base_url)
    }
}

/// Trims trailing slashes and prepends `https://` when no scheme is given.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

pub struct PaymentService {
    payments: Arc<dyn PaymentStore>,
    provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        provider: Arc<dyn PaymentProvider>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            payments,
            provider,
            settings,
        }
    }

    /// Creates a pending payment and a hosted checkout for it.
    ///
    /// The amount always comes from server-side pricing.
    pub async fn initiate_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let plan: PaymentPlan = request
            .plan
            .parse()
            .map_err(|_| PaymentError::InvalidPlan)?;
        let amount = self.settings.pricing.price_for(plan);

        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_lowercase);
        let phone = request
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let payment = self
            .payments
            .create_payment(NewPayment {
                email: email.clone().unwrap_or_else(|| PLACEHOLDER_EMAIL.to_string()),
                phone: phone.clone(),
                plan,
                amount,
            })
            .await?;

        let preference = self
            .provider
            .create_preference(&PreferenceRequest {
                item_id: payment.id.to_string(),
                title: plan.title().to_string(),
                unit_price: amount,
                currency_id: CHECKOUT_CURRENCY.to_string(),
                payer_email: email,
                payer_phone: phone,
                external_reference: payment.id.to_string(),
                notification_url: self.settings.notification_url(),
                back_urls: self.settings.back_urls(plan, payment.id),
                auto_return: self.settings.auto_return(),
            })
            .await
            .map_err(|e| {
                tracing::error!(payment_id = %payment.id, error = %e, "Failed to create checkout preference");
                e
            })?;

        self.payments
            .set_preference_id(payment.id, &preference.id)
            .await?;

        tracing::info!(
            payment_id = %payment.id,
            plan = %plan,
            amount = amount,
            "Checkout started"
        );

        Ok(CheckoutSession {
            preference_id: preference.id,
            redirect_url: preference.redirect_url,
            payment_id: payment.id,
        })
    }

    /// Reconciles local state with the provider after a webhook.
    ///
    /// Only the notification's type and referenced id are trusted; status and
    /// payer data are re-read from the provider.
    pub async fn handle_provider_notification(
        &self,
        notification: &ProviderNotification,
    ) -> Result<NotificationOutcome, PaymentError> {
        if !notification.is_payment() {
            tracing::debug!(kind = ?notification.kind, "Ignoring non-payment notification");
            return Ok(NotificationOutcome::Ignored);
        }

        let reference = notification
            .payment_reference()
            .ok_or(PaymentError::MissingReference)?;
        let remote = self.provider.fetch_payment(&reference).await?;

        let payment_id = remote
            .external_reference
            .as_deref()
            .and_then(|r| Uuid::parse_str(r).ok())
            .ok_or_else(|| {
                tracing::warn!(provider_payment_id = %remote.id, "Provider payment has no usable external reference");
                PaymentError::PaymentNotFound
            })?;

        let local = self
            .payments
            .find_payment(payment_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(payment_id = %payment_id, provider_payment_id = %remote.id, "Notification for unknown payment");
                PaymentError::PaymentNotFound
            })?;

        let next = PaymentStatus::from_provider_status(&remote.status);
        if !local.status.can_transition_to(next) {
            tracing::warn!(
                payment_id = %local.id,
                from = %local.status,
                to = %next,
                provider_status = %remote.status,
                "Ignoring invalid payment status transition"
            );
            return Ok(NotificationOutcome::TransitionRejected {
                payment_id: local.id,
                from: local.status,
                to: next,
            });
        }

        let update = PaymentUpdate {
            expected_status: local.status,
            status: next,
            provider_payment_id: remote.id.clone(),
            email: backfill_email(&local, remote.payer_email.as_deref()),
            phone: backfill_phone(&local, remote.payer_phone.as_deref()),
        };

        self.payments
            .apply_provider_update(local.id, update)
            .await?
            .ok_or(PaymentError::ConcurrentUpdate)?;

        tracing::info!(
            payment_id = %local.id,
            from = %local.status,
            to = %next,
            "Payment status reconciled"
        );

        Ok(NotificationOutcome::Updated {
            payment_id: local.id,
            from: local.status,
            to: next,
        })
    }

    pub async fn verify(&self, payment_id: Uuid) -> Result<PaymentSummary, PaymentError> {
        self.payments
            .find_payment(payment_id)
            .await?
            .map(|p| PaymentSummary::from(&p))
            .ok_or(PaymentError::PaymentNotFound)
    }

    /// Approved premium payments still waiting for their event.
    pub async fn list_pending_premium(&self) -> Result<Vec<Payment>, PaymentError> {
        Ok(self
            .payments
            .list_unused_approved(PaymentPlan::Premium)
            .await?)
    }
}

fn backfill_email(local: &Payment, payer_email: Option<&str>) -> Option<String> {
    if local.email != PLACEHOLDER_EMAIL {
        return None;
    }
    payer_email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}

fn backfill_phone(local: &Payment, payer_phone: Option<&str>) -> Option<String> {
    if local.phone.as_deref().is_some_and(|p| !p.is_empty()) {
        return None;
    }
    payer_phone
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}
