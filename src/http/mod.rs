//! HTTP protocol layer module
//!
//! Response builders and cache validators, independent of where the body comes from.

pub mod cache;
pub mod response;

pub use response::{
    build_304_response, build_404_response, build_405_response, build_error_response,
    build_json_response, build_options_response,
};
