//! Storage backends for the visited-domain index.
//!
//! Both backends implement [`visitlog_core::DomainIndex`] as a sorted set
//! scored by the Unix second of the last visit.

pub mod memory;
pub mod redis;

pub use memory::InMemoryDomainIndex;
pub use self::redis::RedisDomainIndex;
