//! Typed client wrapper other services (Like, Account) import to call Post
//! over `buzzblog-rpc`, pooled via `buzzblog-substrate`.

use std::io;
use std::sync::Arc;

use buzzblog_pool::PoolError;
use buzzblog_rpc::codec::CodecError;
use buzzblog_rpc::{ApplicationException, ClientError, RequestMeta};
use buzzblog_substrate::RpcPool;
use thiserror::Error;

use crate::domain::{ExpandedPost, Post, PostQuery};
use crate::exception::PostException;
use crate::proto::{
    CountByAuthorRequest, CountReply, CreatePostRequest, ExpandedPostReply, ListPostsReply,
    ListPostsRequest, PostReply, RetrieveByIdRequest, UnitReply,
};

#[derive(Debug, Error)]
pub enum PostClientError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Application(#[from] ApplicationException),
    #[error(transparent)]
    Domain(#[from] PostException),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError<ClientError>),
}

#[derive(Clone)]
pub struct PostClient {
    pool: Arc<RpcPool>,
}

impl PostClient {
    pub fn new(pool: Arc<RpcPool>) -> Self {
        PostClient { pool }
    }

    pub fn create_post(&self, meta: &RequestMeta, text: &str) -> Result<Post, PostClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: PostReply = conn.call::<_, _, PostException, _>(
            "create_post",
            &CreatePostRequest { meta: meta.propagate(), text: text.to_string() },
        )?;
        Ok(reply.post)
    }

    pub fn retrieve_standard_post(&self, meta: &RequestMeta, id: i32) -> Result<Post, PostClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: PostReply = conn.call::<_, _, PostException, _>(
            "retrieve_standard_post",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.post)
    }

    pub fn retrieve_expanded_post(&self, meta: &RequestMeta, id: i32) -> Result<ExpandedPost, PostClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: ExpandedPostReply = conn.call::<_, _, PostException, _>(
            "retrieve_expanded_post",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.post)
    }

    pub fn delete_post(&self, meta: &RequestMeta, id: i32) -> Result<(), PostClientError> {
        let mut conn = self.pool.acquire()?;
        conn.call::<_, UnitReply, PostException, _>(
            "delete_post",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(())
    }

    pub fn list_posts(
        &self,
        meta: &RequestMeta,
        query: PostQuery,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<ExpandedPost>, PostClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: ListPostsReply = conn.call::<_, _, PostException, _>(
            "list_posts",
            &ListPostsRequest { meta: meta.propagate(), query, limit, offset },
        )?;
        Ok(reply.posts)
    }

    pub fn count_posts_by_author(&self, meta: &RequestMeta, author_id: i32) -> Result<i32, PostClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: CountReply = conn.call::<_, _, PostException, _>(
            "count_posts_by_author",
            &CountByAuthorRequest { meta: meta.propagate(), author_id },
        )?;
        Ok(reply.count)
    }
}
