//! Domain services for the RSVP backend.
//!
//! Services hold the business rules and reach storage and the payment
//! provider only through the traits in [`store`] and [`provider`].

pub mod admin_session;
pub mod event_access;
pub mod events;
pub mod memory;
pub mod payments;
pub mod provider;
pub mod provisioning;
pub mod rsvps;
pub mod store;

pub use admin_session::{AdminSessionManager, IssuedSession, SessionError};
pub use event_access::{AccessError, AccessGrant, EventAccessService};
pub use events::{EventError, EventService};
pub use memory::InMemoryStore;
pub use payments::{CheckoutSettings, NotificationOutcome, PaymentError, PaymentService};
pub use provider::{
    MockPaymentProvider, PaymentProvider, Preference, PreferenceRequest, ProviderError,
    ProviderPayment,
};
pub use provisioning::{PaymentClaim, ProvisioningError, ProvisioningService};
pub use rsvps::{RsvpError, RsvpService};
pub use store::{EventStore, PaymentStore, RsvpStore, StoreError};
