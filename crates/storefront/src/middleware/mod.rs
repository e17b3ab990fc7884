//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (only when `STOREFRONT_BASE_URL` is set)
//! 4. Request ID (add unique ID to each request)
//! 5. Session layer (tower-sessions over a bounded `moka` store)

pub mod request_id;
pub mod session;

pub use request_id::{RequestId, request_id_middleware};
pub use session::{SessionCache, create_session_layer};
