//! Ambient plumbing shared by BEOS services: configuration, tracing,
//! request ids, health checks, and small serde / sea-orm helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
