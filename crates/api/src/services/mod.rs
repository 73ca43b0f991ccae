//! Application services living at the HTTP edge.

pub mod cookies;
pub mod mercadopago;

pub use cookies::{SessionCookies, ADMIN_SESSION_COOKIE};
pub use mercadopago::MercadoPagoClient;
