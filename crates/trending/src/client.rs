//! Typed client wrapper Post imports to call Trending over `buzzblog-rpc`,
//! pooled via `buzzblog-substrate`.

use std::io;
use std::sync::Arc;

use buzzblog_pool::PoolError;
use buzzblog_rpc::codec::CodecError;
use buzzblog_rpc::{ApplicationException, ClientError, NoException, RequestMeta};
use buzzblog_substrate::RpcPool;
use thiserror::Error;

use crate::proto::{
    FetchTrendingHashtagsReply, FetchTrendingHashtagsRequest, ProcessPostReply, ProcessPostRequest,
};

#[derive(Debug, Error)]
pub enum TrendingClientError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Application(#[from] ApplicationException),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError<ClientError>),
}

impl From<NoException> for TrendingClientError {
    fn from(_: NoException) -> Self {
        unreachable!("NoException is never decoded from the wire")
    }
}

#[derive(Clone)]
pub struct TrendingClient {
    pool: Arc<RpcPool>,
}

impl TrendingClient {
    pub fn new(pool: Arc<RpcPool>) -> Self {
        TrendingClient { pool }
    }

    pub fn process_post(&self, meta: &RequestMeta, text: &str) -> Result<(), TrendingClientError> {
        let mut conn = self.pool.acquire()?;
        let _: ProcessPostReply = conn.call::<_, _, NoException, _>(
            "process_post",
            &ProcessPostRequest { meta: meta.propagate(), text: text.to_string() },
        )?;
        Ok(())
    }

    pub fn fetch_trending_hashtags(&self, meta: &RequestMeta, limit: i32) -> Result<Vec<String>, TrendingClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: FetchTrendingHashtagsReply = conn.call::<_, _, NoException, _>(
            "fetch_trending_hashtags",
            &FetchTrendingHashtagsRequest { meta: meta.propagate(), limit },
        )?;
        Ok(reply.hashtags)
    }
}
