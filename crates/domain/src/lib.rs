//! Domain layer for the RSVP backend.
//!
//! This crate contains:
//! - Domain models (Event, EventConfig, Payment, Rsvp)
//! - Persistence gateway and payment provider traits
//! - Business logic services (event access, admin sessions, payments,
//!   provisioning, RSVPs)

pub mod models;
pub mod services;
