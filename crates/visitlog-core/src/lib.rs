//! Core types and traits for the visitlog domain history service.
//!
//! This crate provides the domain model, the registrable-domain extractor,
//! the [`DomainIndex`] contract implemented by the storage backends, and the
//! [`VisitService`] that the HTTP gateway drives.

pub mod clock;
pub mod domain;
pub mod error;
pub mod extract;
pub mod index;
pub mod range;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{Domain, DomainBatch};
pub use error::{CoreError, StoreError};
pub use extract::extract_domain;
pub use index::DomainIndex;
pub use range::TimeRange;
pub use service::VisitService;
