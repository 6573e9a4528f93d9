//! A locally-duplicated, lightweight client for Post's
//! `retrieve_expanded_post` — Post depends on Like (spec §2), so Like cannot
//! take a real `buzzblog-post` crate dependency without a cycle.

use std::io;
use std::sync::Arc;

use buzzblog_pool::PoolError;
use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_rpc::{ApplicationException, ClientError, NoException, RequestMeta};
use buzzblog_substrate::RpcPool;
use thiserror::Error;

use crate::domain::ExpandedPostView;

#[derive(Debug, Clone)]
struct RetrieveExpandedPostRequest {
    meta: RequestMeta,
    id: i32,
}

impl Message for RetrieveExpandedPostRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_i32_field(2, self.id);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut id = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => id = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(RetrieveExpandedPostRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            id: id.ok_or(CodecError::MissingField(2, "id"))?,
        })
    }
}

#[derive(Debug, Clone)]
struct ExpandedPostReply {
    post: ExpandedPostView,
}

impl Message for ExpandedPostReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.post.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut post = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => post = Some(r.read_struct(ExpandedPostView::decode)?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ExpandedPostReply {
            post: post.ok_or(CodecError::MissingField(1, "post"))?,
        })
    }
}

#[derive(Debug, Error)]
pub enum PeerPostError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Application(#[from] ApplicationException),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError<ClientError>),
}

impl From<NoException> for PeerPostError {
    fn from(_: NoException) -> Self {
        unreachable!("NoException is never decoded from the wire")
    }
}

#[derive(Clone)]
pub struct PeerPostClient {
    pool: Arc<RpcPool>,
}

impl PeerPostClient {
    pub fn new(pool: Arc<RpcPool>) -> Self {
        PeerPostClient { pool }
    }

    pub fn retrieve_expanded_post(
        &self,
        meta: &RequestMeta,
        id: i32,
    ) -> Result<ExpandedPostView, PeerPostError> {
        let mut conn = self.pool.acquire()?;
        let reply: ExpandedPostReply = conn.call::<_, _, NoException, _>(
            "retrieve_expanded_post",
            &RetrieveExpandedPostRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.post)
    }
}
