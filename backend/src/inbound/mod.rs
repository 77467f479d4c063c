//! Inbound adapters that translate external requests into domain use case
//! calls while keeping framework details at the edge.
//!
//! HTTP handlers live under [`http`].

pub mod http;
