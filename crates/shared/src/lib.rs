//! Shared utilities and common types for the RSVP backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password hashing with Argon2id
//! - Admin session tokens (JWT, HS256)
//! - Signed per-event access tokens
//! - Random credential generation and HMAC helpers
//! - Common validation logic

pub mod access_token;
pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
