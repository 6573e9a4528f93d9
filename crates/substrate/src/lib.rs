//! Request metadata, fan-out, logging, configuration, and CLI substrate
//! shared by every BuzzBlog service (spec §2, §4.3, §4.4, §6).
//!
//! Built on top of `buzzblog-rpc` (transport, exceptions) and
//! `buzzblog-pool` (bounded pools); every service crate depends on this one
//! instead of reaching for the lower crates directly.

pub mod cli;
pub mod config;
pub mod error;
pub mod fanout;
pub mod logging;
pub mod pools;
pub mod shutdown;
pub mod time;

pub use buzzblog_rpc::{ApplicationException, ApplicationExceptionKind, RequestMeta, ANONYMOUS_REQUESTER};
pub use cli::{CommonArgs, MicroservicePoolArgs, PostgresPoolArgs, RedisPoolArgs};
pub use config::BackendConfig;
pub use error::{dispatch_call, encode_result, ServiceError, ServiceResult};
pub use fanout::{expand_rows, Fanout, FanoutHandle, DEFAULT_FANOUT_LIMIT};
pub use logging::{logged, LogTag};
pub use pools::{db_pool, redis_pool, rpc_pool, DbPool, Endpoint, RedisPool, RpcPool};
pub use time::now_epoch;
