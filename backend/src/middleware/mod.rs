//! Request middleware.
//!
//! Purpose: cross-cutting request lifecycle concerns that sit outside any
//! single handler, currently request correlation.

pub mod trace;

pub use trace::Trace;
