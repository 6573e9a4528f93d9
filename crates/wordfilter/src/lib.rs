//! The Wordfilter domain service (spec §4.11): a seeded in-memory
//! invalid-word list, no persisted state, no peer-service dependencies.

pub mod client;
pub mod handler;
pub mod proto;

pub use client::{WordfilterClient, WordfilterClientError};
pub use handler::WordfilterHandler;
