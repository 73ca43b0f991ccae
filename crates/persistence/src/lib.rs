//! Persistence layer for the RSVP backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - PostgreSQL implementations of the domain gateway traits

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
