//! `cmx-cli` - Demo harness for the cmx parallel multiplier.
//!
//! Supplies the demo input matrix and the scoped trace-file session the
//! `cmx` binary wires around a multiply.

pub mod demo;
pub mod session;

pub use session::{SessionError, TraceSession};
