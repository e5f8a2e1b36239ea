//! HTTP API: wire codec, envelopes, error taxonomy, the generic handler
//! pipeline and the route table.
pub mod codec;
pub mod error;
pub mod openapi;
pub mod pipeline;
pub mod routes;
pub mod system;
pub mod types;
