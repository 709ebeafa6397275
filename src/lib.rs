//! Builds an HTTP response (status, headers, body) and flushes it through a
//! host output facility.

pub mod http;
