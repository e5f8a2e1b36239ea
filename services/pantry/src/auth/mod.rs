//! Caller identity: session context, session tokens and the middleware that
//! attaches one to the other.
pub mod middleware;
pub mod session;
pub mod token;
