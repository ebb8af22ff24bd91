//! Request handler module
//!
//! Routes requests to the single document endpoint.

pub mod document;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
