//! Typed client wrapper other services (Follow, Like) import to call
//! Uniquepair over `buzzblog-rpc`, pooled via `buzzblog-substrate`.

use std::io;
use std::sync::Arc;

use buzzblog_pool::PoolError;
use buzzblog_rpc::codec::CodecError;
use buzzblog_rpc::{ApplicationException, ClientError, RequestMeta};
use buzzblog_substrate::RpcPool;
use thiserror::Error;

use crate::domain::{Uniquepair, UniquepairQuery};
use crate::exception::UniquepairException;
use crate::proto::{
    AddRequest, CountRequest, FetchRequest, FindRequest, GetRequest, RemoveRequest,
    UniquepairReply,
};

#[derive(Debug, Error)]
pub enum UniquepairClientError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Application(#[from] ApplicationException),
    #[error(transparent)]
    Domain(#[from] UniquepairException),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError<ClientError>),
}

/// A pooled handle onto the Uniquepair service. Cheap to clone (an `Arc`
/// around the shared pool); every call checks out its own connection.
#[derive(Clone)]
pub struct UniquepairClient {
    pool: Arc<RpcPool>,
}

impl UniquepairClient {
    pub fn new(pool: Arc<RpcPool>) -> Self {
        UniquepairClient { pool }
    }

    pub fn get(&self, meta: &RequestMeta, id: i32) -> Result<Uniquepair, UniquepairClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: UniquepairReply =
            conn.call::<_, _, UniquepairException, _>("get", &GetRequest { meta: meta.propagate(), id })?;
        Ok(reply.item)
    }

    pub fn add(
        &self,
        meta: &RequestMeta,
        domain: &str,
        first_elem: i32,
        second_elem: i32,
    ) -> Result<Uniquepair, UniquepairClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: UniquepairReply = conn.call::<_, _, UniquepairException, _>(
            "add",
            &AddRequest {
                meta: meta.propagate(),
                domain: domain.to_string(),
                first_elem,
                second_elem,
            },
        )?;
        Ok(reply.item)
    }

    pub fn remove(&self, meta: &RequestMeta, id: i32) -> Result<(), UniquepairClientError> {
        let mut conn = self.pool.acquire()?;
        conn.call::<_, crate::proto::UnitReply, UniquepairException, _>(
            "remove",
            &RemoveRequest { meta: meta.propagate(), id },
        )?;
        Ok(())
    }

    /// Never returns a `NotFound`-flavored error: a miss is `Ok(false)`.
    pub fn find(
        &self,
        meta: &RequestMeta,
        domain: &str,
        first_elem: i32,
        second_elem: i32,
    ) -> Result<bool, UniquepairClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: crate::proto::FindReply = conn.call::<_, _, UniquepairException, _>(
            "find",
            &FindRequest {
                meta: meta.propagate(),
                domain: domain.to_string(),
                first_elem,
                second_elem,
            },
        )?;
        Ok(reply.present)
    }

    pub fn fetch(
        &self,
        meta: &RequestMeta,
        query: UniquepairQuery,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<Uniquepair>, UniquepairClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: crate::proto::FetchReply = conn.call::<_, _, UniquepairException, _>(
            "fetch",
            &FetchRequest { meta: meta.propagate(), query, limit, offset },
        )?;
        Ok(reply.items)
    }

    pub fn count(&self, meta: &RequestMeta, query: UniquepairQuery) -> Result<i32, UniquepairClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: crate::proto::CountReply =
            conn.call::<_, _, UniquepairException, _>("count", &CountRequest { meta: meta.propagate(), query })?;
        Ok(reply.count)
    }
}
