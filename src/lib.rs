//! Edge Auth Gateway - request-time authentication gate for CDN edge traffic.
//!
//! This crate decides, per incoming edge request, whether the caller carries
//! a valid identity token (presented as a cookie) and answers with either
//! "forward the request unchanged" or a synthesized 302 redirect to the
//! identity provider's hosted login page.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod cookie;
pub mod error;
pub mod gate;
pub mod jwt;
pub mod observability;
pub mod request;
pub mod server;
pub mod shutdown;

pub use config::Config;
pub use error::EdgeAuthError;
pub use gate::EdgeGate;
pub use request::{EdgeDecision, EdgeRequest, EdgeResponse, HeaderRecord};
