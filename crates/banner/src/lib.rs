//! Registration platform query client and availability evaluation.
//!
//! This crate provides:
//! - `BannerClient` for the two-round-trip session/search exchange against
//!   a Student Registration SSB deployment
//! - Wire types for the platform's JSON search envelope
//! - `evaluate` to derive a normalized [`SectionStatus`] from a raw record
//! - `SectionSource` trait for pluggable section lookup
//!
//! [`SectionStatus`]: seatwatch_core::SectionStatus

pub mod client;
pub mod records;
pub mod status;

pub use client::{BannerClient, QueryError, SectionSource};
pub use records::{SearchResponse, SectionRecord};
pub use status::evaluate;
