//! The Like domain service (spec §4.7): delegates storage to Uniquepair under
//! domain `"like"`, expands views by fanning out to Account and Post.

pub mod client;
pub mod domain;
pub mod exception;
pub mod handler;
pub mod peer_account;
pub mod peer_post;
pub mod proto;

pub use client::{LikeClient, LikeClientError};
pub use domain::{ExpandedLike, Like, LikeQuery};
pub use exception::LikeException;
pub use handler::LikeHandler;
pub use peer_account::PeerAccountClient;
pub use peer_post::PeerPostClient;
