//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and referrer policy)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting on credential and checkout routes (governor)
//!
//! Authentication and the role gate are extractors ([`auth`]), not layers.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, PanelGate, RequireAuth, RequireStaff, RequireSuperAdmin, clear_current_user,
    set_current_user,
};
pub use rate_limit::{auth_rate_limiter, checkout_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, set_flash, take_flash};
