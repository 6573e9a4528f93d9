//! The Follow domain service (spec §4.6): delegates storage to Uniquepair
//! under domain `"follow"`, expands views by fanning out to Account.

pub mod client;
pub mod domain;
pub mod exception;
pub mod handler;
pub mod peer_account;
pub mod proto;

pub use client::{FollowClient, FollowClientError};
pub use domain::{ExpandedFollow, Follow, FollowQuery};
pub use exception::FollowException;
pub use handler::FollowHandler;
pub use peer_account::PeerAccountClient;
