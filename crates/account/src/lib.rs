//! The Account domain service (spec §4.5): owns identity and credentials,
//! expands views by fanning out to Follow, Like, and Post — the one
//! service every other domain service can reach without a local peer stub.

pub mod client;
pub mod domain;
pub mod exception;
pub mod handler;
pub mod proto;

pub use client::{AccountClient, AccountClientError};
pub use domain::{Account, AccountQuery, AccountView, ExpandedAccount};
pub use exception::AccountException;
pub use handler::AccountHandler;
