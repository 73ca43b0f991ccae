//! Custom Axum extractors.

pub mod event_access;

pub use event_access::AuthorizedEvent;
