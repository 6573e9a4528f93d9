//! A locally-duplicated, lightweight client for Account's
//! `retrieve_standard_account` — see `buzzblog-follow`'s module of the same
//! name for why this is duplicated rather than a real crate dependency
//! (Account depends on Like, spec §2).

use std::io;
use std::sync::Arc;

use buzzblog_pool::PoolError;
use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_rpc::{ApplicationException, ClientError, NoException, RequestMeta};
use buzzblog_substrate::RpcPool;
use thiserror::Error;

use crate::domain::AccountView;

#[derive(Debug, Clone)]
struct RetrieveStandardAccountRequest {
    meta: RequestMeta,
    id: i32,
}

impl Message for RetrieveStandardAccountRequest {
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
        Ok(RetrieveStandardAccountRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            id: id.ok_or(CodecError::MissingField(2, "id"))?,
        })
    }
}

#[derive(Debug, Clone)]
struct AccountReply {
    account: AccountView,
}

impl Message for AccountReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.account.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut account = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => account = Some(r.read_struct(AccountView::decode)?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(AccountReply {
            account: account.ok_or(CodecError::MissingField(1, "account"))?,
        })
    }
}

#[derive(Debug, Error)]
pub enum PeerAccountError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Application(#[from] ApplicationException),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError<ClientError>),
}

impl From<NoException> for PeerAccountError {
    fn from(_: NoException) -> Self {
        unreachable!("NoException is never decoded from the wire")
    }
}

#[derive(Clone)]
pub struct PeerAccountClient {
    pool: Arc<RpcPool>,
}

impl PeerAccountClient {
    pub fn new(pool: Arc<RpcPool>) -> Self {
        PeerAccountClient { pool }
    }

    pub fn retrieve_standard_account(
        &self,
        meta: &RequestMeta,
        id: i32,
    ) -> Result<AccountView, PeerAccountError> {
        let mut conn = self.pool.acquire()?;
        let reply: AccountReply = conn.call::<_, _, NoException, _>(
            "retrieve_standard_account",
            &RetrieveStandardAccountRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.account)
    }
}
