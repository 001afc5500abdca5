//! statik - static file HTTP/1.1 server
//!
//! Core library: request parsing, resource resolution, status
//! classification, response construction and the connection loop.

pub mod config;
pub mod http;
pub mod server;
