//! Typed client wrapper other services (and future consumers) import to
//! call Account over `buzzblog-rpc`, pooled via `buzzblog-substrate`.

use std::io;
use std::sync::Arc;

use buzzblog_pool::PoolError;
use buzzblog_rpc::codec::CodecError;
use buzzblog_rpc::{ApplicationException, ClientError, RequestMeta};
use buzzblog_substrate::RpcPool;
use thiserror::Error;

use crate::domain::{AccountQuery, AccountView, ExpandedAccount};
use crate::exception::AccountException;
use crate::proto::{
    AccountReply, AuthenticateUserRequest, CreateAccountRequest, ExpandedAccountReply,
    ListAccountsReply, ListAccountsRequest, RetrieveByIdRequest, UnitReply, UpdateAccountRequest,
};

#[derive(Debug, Error)]
pub enum AccountClientError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Application(#[from] ApplicationException),
    #[error(transparent)]
    Domain(#[from] AccountException),
    #[error("pool error: {0}")]
    Pool(#[from] PoolError<ClientError>),
}

#[derive(Clone)]
pub struct AccountClient {
    pool: Arc<RpcPool>,
}

impl AccountClient {
    pub fn new(pool: Arc<RpcPool>) -> Self {
        AccountClient { pool }
    }

    pub fn authenticate_user(&self, meta: &RequestMeta, username: &str, password: &str) -> Result<AccountView, AccountClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: AccountReply = conn.call::<_, _, AccountException, _>(
            "authenticate_user",
            &AuthenticateUserRequest {
                meta: meta.propagate(),
                username: username.to_string(),
                password: password.to_string(),
            },
        )?;
        Ok(reply.account)
    }

    pub fn create_account(
        &self,
        meta: &RequestMeta,
        username: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AccountView, AccountClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: AccountReply = conn.call::<_, _, AccountException, _>(
            "create_account",
            &CreateAccountRequest {
                meta: meta.propagate(),
                username: username.to_string(),
                password: password.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        )?;
        Ok(reply.account)
    }

    pub fn retrieve_standard_account(&self, meta: &RequestMeta, id: i32) -> Result<AccountView, AccountClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: AccountReply = conn.call::<_, _, AccountException, _>(
            "retrieve_standard_account",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.account)
    }

    pub fn retrieve_expanded_account(&self, meta: &RequestMeta, id: i32) -> Result<ExpandedAccount, AccountClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: ExpandedAccountReply = conn.call::<_, _, AccountException, _>(
            "retrieve_expanded_account",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(reply.account)
    }

    pub fn update_account(
        &self,
        meta: &RequestMeta,
        id: i32,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AccountView, AccountClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: AccountReply = conn.call::<_, _, AccountException, _>(
            "update_account",
            &UpdateAccountRequest {
                meta: meta.propagate(),
                id,
                password: password.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        )?;
        Ok(reply.account)
    }

    pub fn delete_account(&self, meta: &RequestMeta, id: i32) -> Result<(), AccountClientError> {
        let mut conn = self.pool.acquire()?;
        conn.call::<_, UnitReply, AccountException, _>(
            "delete_account",
            &RetrieveByIdRequest { meta: meta.propagate(), id },
        )?;
        Ok(())
    }

    pub fn list_accounts(
        &self,
        meta: &RequestMeta,
        query: AccountQuery,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<ExpandedAccount>, AccountClientError> {
        let mut conn = self.pool.acquire()?;
        let reply: ListAccountsReply = conn.call::<_, _, AccountException, _>(
            "list_accounts",
            &ListAccountsRequest { meta: meta.propagate(), query, limit, offset },
        )?;
        Ok(reply.accounts)
    }
}
