//! The Trending domain service (spec §4.10): hashtag extraction gated by
//! Wordfilter, scored in Redis. Depends on Wordfilter and Redis only.

pub mod client;
pub mod handler;
pub mod proto;

pub use client::{TrendingClient, TrendingClientError};
pub use handler::TrendingHandler;
