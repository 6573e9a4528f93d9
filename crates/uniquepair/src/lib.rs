//! The Uniquepair domain service (spec §4.9): generic `(domain, first_elem,
//! second_elem)` storage with no peer-service dependencies, backing Follow
//! and Like.

pub mod client;
pub mod domain;
pub mod exception;
pub mod handler;
pub mod proto;

pub use client::UniquepairClient;
pub use domain::{Uniquepair, UniquepairQuery};
pub use exception::UniquepairException;
pub use handler::UniquepairHandler;
