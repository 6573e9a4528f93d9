//! The Post domain service (spec §4.8): owns the posts table, processes new
//! post text into Trending hashtags concurrently with persisting the row,
//! and expands views by fanning out to Account and Like.

pub mod client;
pub mod domain;
pub mod exception;
pub mod handler;
pub mod peer_account;
pub mod peer_like;
pub mod proto;

pub use client::{PostClient, PostClientError};
pub use domain::{ExpandedPost, Post, PostQuery};
pub use exception::PostException;
pub use handler::PostHandler;
pub use peer_account::PeerAccountClient;
pub use peer_like::PeerLikeClient;
