//! Auth types shared across BEOS services.
//!
//! Provides access-token validation and the `AuthUser` bearer extractor.

pub mod bearer;
pub mod token;
