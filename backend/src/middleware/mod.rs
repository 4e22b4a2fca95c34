//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and the access gate.

pub mod access_gate;
pub mod trace;

pub use access_gate::AccessGate;
pub use trace::Trace;
