//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first, see [`crate::app`])
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CSP nonce (generate per-request nonce for inline scripts)
//! 5. Security headers (CSP bound to the nonce, frame and referrer policy)
//! 6. Session layer (tower-sessions with in-memory store)
//! 7. Rate limiting on cart mutations (governor)

pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::cart_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
