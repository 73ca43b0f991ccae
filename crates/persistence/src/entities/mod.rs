//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod event;
pub mod payment;
pub mod rsvp;

pub use event::{EventConfigEntity, EventEntity, EventTypeDb};
pub use payment::{PaymentEntity, PaymentPlanDb, PaymentStatusDb};
pub use rsvp::{AttendanceDb, RsvpEntity};
