//! Request middleware.
//!
//! Purpose: scope every request in a trace identifier so logs and error
//! envelopes can be correlated.

pub mod trace;

pub use trace::Trace;
