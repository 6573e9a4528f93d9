//! Typed client wrapper Like, Post, and Account import to call Follow over
//! `buzzblog-rpc`, pooled via `buzzblog-substrate`.

use std::io;
use std::sync::Arc;

use buzzblog_pool::PoolError;
use buzzblog_rpc::codec::CodecError;
use buzzblog_rpc::{ApplicationException, ClientError, RequestMeta};
use buzzblog_substrate::RpcPool;
use thiserror::Error;

use crate::domain::{ExpandedFollow, Follow, FollowQuery};
use crate::exception::FollowException;
use crate::proto::{
    CheckFollowReply, CheckFollowRequest, CountByIdRequest, CountReply, ExpandedFollowReply,
    FollowAccountRequest, FollowReply, ListFollowsReply, ListFollowsRequest, RetrieveByIdRequest,
};

#[derive(Debug, Error)]
pub enum FollowClientError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Application(#[from] ApplicationException),
    #[error(transparent)]
    Domain(#[from] FollowException),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError<ClientError>),
}

#[derive(Clone)]
pub struct FollowClient {
    pool: Arc<RpcPool>,
}

impl FollowClient {
    pub fn new(pool: Arc<RpcPool>) -> Self {
        FollowClient { pool }
    }

    pub fn follow_account(&self, meta: &RequestMeta, followee_id: i32) -> Result<Follow, FollowClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: FollowReply = conn.call::<_, _, FollowException, _>(
            "follow_account",
            &FollowAccountRequest { meta: meta.propagate(), followee_id },
        )?;
        Ok(reply.follow)
    }

    pub fn retrieve_standard_follow(&self, meta: &RequestMeta, id: i32) -> Result<Follow, FollowClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: FollowReply = conn.call::<_, _, FollowException, _>(
            "retrieve_standard_follow",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.follow)
    }

    pub fn retrieve_expanded_follow(&self, meta: &RequestMeta, id: i32) -> Result<ExpandedFollow, FollowClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: ExpandedFollowReply = conn.call::<_, _, FollowException, _>(
            "retrieve_expanded_follow",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.follow)
    }

    pub fn delete_follow(&self, meta: &RequestMeta, id: i32) -> Result<(), FollowClientError> {
        let mut conn = self.pool.acquire()?;
        conn.call::<_, crate::proto::UnitReply, FollowException, _>(
            "delete_follow",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(())
    }

    pub fn list_follows(
        &self,
        meta: &RequestMeta,
        query: FollowQuery,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<ExpandedFollow>, FollowClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: ListFollowsReply = conn.call::<_, _, FollowException, _>(
            "list_follows",
            &ListFollowsRequest { meta: meta.propagate(), query, limit, offset },
        )?;
        Ok(reply.follows)
    }

    /// Never returns a domain error: a miss is `Ok(false)`.
    pub fn check_follow(&self, meta: &RequestMeta, follower_id: i32, followee_id: i32) -> Result<bool, FollowClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: CheckFollowReply = conn.call::<_, _, FollowException, _>(
            "check_follow",
            &CheckFollowRequest { meta: meta.propagate(), follower_id, followee_id },
        )?;
        Ok(reply.following)
    }

    pub fn count_followers(&self, meta: &RequestMeta, id: i32) -> Result<i32, FollowClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: CountReply = conn.call::<_, _, FollowException, _>(
            "count_followers",
            &CountByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.count)
    }

    pub fn count_followees(&self, meta: &RequestMeta, id: i32) -> Result<i32, FollowClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: CountReply = conn.call::<_, _, FollowException, _>(
            "count_followees",
            &CountByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.count)
    }
}
