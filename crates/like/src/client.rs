//! Typed client wrapper Post and Account import to call Like over
//! `buzzblog-rpc`, pooled via `buzzblog-substrate`.

use std::io;
use std::sync::Arc;

use buzzblog_pool::PoolError;
use buzzblog_rpc::codec::CodecError;
use buzzblog_rpc::{ApplicationException, ClientError, RequestMeta};
use buzzblog_substrate::RpcPool;
use thiserror::Error;

use crate::domain::{ExpandedLike, Like, LikeQuery};
use crate::exception::LikeException;
use crate::proto::{
    CountByIdRequest, CountReply, ExpandedLikeReply, LikePostRequest, LikeReply, ListLikesReply,
    ListLikesRequest, RetrieveByIdRequest,
};

#[derive(Debug, Error)]
pub enum LikeClientError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Application(#[from] ApplicationException),
    #[error(transparent)]
    Domain(#[from] LikeException),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError<ClientError>),
}

#[derive(Clone)]
pub struct LikeClient {
    pool: Arc<RpcPool>,
}

impl LikeClient {
    pub fn new(pool: Arc<RpcPool>) -> Self {
        LikeClient { pool }
    }

    pub fn like_post(&self, meta: &RequestMeta, post_id: i32) -> Result<Like, LikeClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: LikeReply = conn.call::<_, _, LikeException, _>(
            "like_post",
            &LikePostRequest { meta: meta.propagate(), post_id },
        )?;
        Ok(reply.like)
    }

    pub fn retrieve_standard_like(&self, meta: &RequestMeta, id: i32) -> Result<Like, LikeClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: LikeReply = conn.call::<_, _, LikeException, _>(
            "retrieve_standard_like",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.like)
    }

    pub fn retrieve_expanded_like(&self, meta: &RequestMeta, id: i32) -> Result<ExpandedLike, LikeClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: ExpandedLikeReply = conn.call::<_, _, LikeException, _>(
            "retrieve_expanded_like",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.like)
    }

    pub fn delete_like(&self, meta: &RequestMeta, id: i32) -> Result<(), LikeClientError> {
        let mut conn = self.pool.acquire()?;
        conn.call::<_, crate::proto::UnitReply, LikeException, _>(
            "delete_like",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(())
    }

    pub fn list_likes(
        &self,
        meta: &RequestMeta,
        query: LikeQuery,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<ExpandedLike>, LikeClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: ListLikesReply = conn.call::<_, _, LikeException, _>(
            "list_likes",
            &ListLikesRequest { meta: meta.propagate(), query, limit, offset },
        )?;
        Ok(reply.likes)
    }

    pub fn count_likes_by_account(&self, meta: &RequestMeta, id: i32) -> Result<i32, LikeClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: CountReply = conn.call::<_, _, LikeException, _>(
            "count_likes_by_account",
            &CountByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.count)
    }

    pub fn count_likes_of_post(&self, meta: &RequestMeta, id: i32) -> Result<i32, LikeClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: CountReply = conn.call::<_, _, LikeException, _>(
            "count_likes_of_post",
            &CountByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.count)
    }
}
