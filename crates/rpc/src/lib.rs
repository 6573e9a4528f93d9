//! Framed binary RPC runtime shared by every BuzzBlog service (spec §4.1).
//!
//! This crate owns the wire format, the blocking TCP transport, the
//! thread-per-connection server loop, and the blocking client stub. Domain
//! exceptions and request/response struct shapes belong to each service
//! crate; this crate only knows how to move their already-encoded bytes.

pub mod client;
pub mod codec;
pub mod exception;
pub mod exec;
pub mod meta;
pub mod server;
pub mod transport;

pub use client::{ClientConfig, ClientError, ClientStub};
pub use codec::{CodecError, FieldType, Message, MessageType, Reader, Writer};
pub use exception::{ApplicationException, ApplicationExceptionKind, NoException};
pub use exec::{ConnectionLimiter, ConnectionPermit, Executor, TaskHandle};
pub use meta::{RequestMeta, ANONYMOUS_REQUESTER};
pub use server::{bind, serve, serve_listener, RpcService, ServerConfig};
