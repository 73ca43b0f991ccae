//! Domain models for the RSVP backend.

pub mod event;
pub mod payment;
pub mod rsvp;

pub use event::{
    CreateEventRequest, CreatedEvent, Event, EventChanges, EventConfig, EventConfigInput,
    EventDetails, EventType, NewEvent, UpdateEventRequest,
};
pub use payment::{
    CheckoutRequest, CheckoutSession, NewPayment, Payment, PaymentPlan, PaymentStatus,
    PaymentSummary, PaymentUpdate, PlanPricing, ProviderNotification, PLACEHOLDER_EMAIL,
};
pub use rsvp::{Attendance, CreateRsvpRequest, Rsvp};
