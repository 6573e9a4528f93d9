//! Typed client wrapper Trending imports to call Wordfilter over
//! `buzzblog-rpc`, pooled via `buzzblog-substrate`.

use std::io;
use std::sync::Arc;

use buzzblog_pool::PoolError;
use buzzblog_rpc::codec::CodecError;
use buzzblog_rpc::{ApplicationException, ClientError, NoException, RequestMeta};
use buzzblog_substrate::RpcPool;
use thiserror::Error;

use crate::proto::{IsValidWordReply, IsValidWordRequest};

#[derive(Debug, Error)]
pub enum WordfilterClientError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Application(#[from] ApplicationException),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError<ClientError>),
}

impl From<NoException> for WordfilterClientError {
    fn from(_: NoException) -> Self {
        unreachable!("NoException is never decoded from the wire")
    }
}

#[derive(Clone)]
pub struct WordfilterClient {
    pool: Arc<RpcPool>,
}

impl WordfilterClient {
    pub fn new(pool: Arc<RpcPool>) -> Self {
        WordfilterClient { pool }
    }

    pub fn is_valid_word(&self, meta: &RequestMeta, word: &str) -> Result<bool, WordfilterClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: IsValidWordReply = conn.call::<_, _, NoException, _>(
            "is_valid_word",
            &IsValidWordRequest { meta: meta.propagate(), word: word.to_string() },
        )?;
        Ok(reply.valid)
    }
}
