//! Inbound adapters that translate external requests into booking port calls
//! while keeping framework details at the edge.

pub mod http;
