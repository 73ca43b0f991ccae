//! HTTP route handlers.

pub mod admin_session;
pub mod event_access;
pub mod events;
pub mod health;
pub mod payments;
pub mod rsvps;
