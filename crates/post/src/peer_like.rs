//! A locally-duplicated, lightweight client for Like's
//! `count_likes_of_post` — Like depends on Post (spec §2), so Post cannot
//! take a real `buzzblog-like` crate dependency without a cycle.

use std::io;
use std::sync::Arc;

use buzzblog_pool::PoolError;
use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_rpc::{ApplicationException, ClientError, NoException, RequestMeta};
use buzzblog_substrate::RpcPool;
use thiserror::Error;

#[derive(Debug, Clone)]
struct CountByIdRequest {
    meta: RequestMeta,
    id: i32,
}

impl Message for CountByIdRequest {
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
        Ok(CountByIdRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            id: id.ok_or(CodecError::MissingField(2, "id"))?,
        })
    }
}

#[derive(Debug, Clone)]
struct CountReply {
    count: i32,
}

impl Message for CountReply {
    fn encode(&self, w: &mut Writer) {
        w.write_i32_field(1, self.count);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut count = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => count = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(CountReply { count: count.unwrap_or(0) })
    }
}

#[derive(Debug, Error)]
pub enum PeerLikeError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Application(#[from] ApplicationException),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError<ClientError>),
}

impl From<NoException> for PeerLikeError {
    fn from(_: NoException) -> Self {
        unreachable!("NoException is never decoded from the wire")
    }
}

#[derive(Clone)]
pub struct PeerLikeClient {
    pool: Arc<RpcPool>,
}

impl PeerLikeClient {
    pub fn new(pool: Arc<RpcPool>) -> Self {
        PeerLikeClient { pool }
    }

    pub fn count_likes_of_post(&self, meta: &RequestMeta, id: i32) -> Result<i32, PeerLikeError> {
        let mut conn = self.pool.acquire()?;
        let reply: CountReply = conn.call::<_, _, NoException, _>(
            "count_likes_of_post",
            &CountByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.count)
    }
}
