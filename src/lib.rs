//! Serves a JSON document from local storage over `GET /`.
//!
//! Each request reads `scraped_data.json` (by default) from the working
//! directory, parses it and answers with the parsed value as
//! `application/json`. Missing or malformed files yield a 500 and the
//! server keeps running.

pub mod config;
pub mod document;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
