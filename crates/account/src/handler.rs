//! Business logic for the Account service (spec §4.5): own Postgres table,
//! expanded views fanned out five ways to Follow, Like, and Post.

use std::sync::Arc;

use anyhow::Context;
use buzzblog_follow::FollowClient;
use buzzblog_like::LikeClient;
use buzzblog_post::PostClient;
use buzzblog_rpc::codec::MessageType;
use buzzblog_rpc::server::RpcService;
use buzzblog_rpc::RequestMeta;
use buzzblog_substrate::{
    dispatch_call, expand_rows, logging, now_epoch, DbPool, Fanout, LogTag, ServiceError, ServiceResult,
};
use postgres::error::SqlState;
use postgres::Row;

use crate::domain::{Account, AccountView, ExpandedAccount};
use crate::exception::AccountException;
use crate::proto::{
    AccountReply, AuthenticateUserRequest, CreateAccountRequest, ExpandedAccountReply,
    ListAccountsReply, ListAccountsRequest, RetrieveByIdRequest, UnitReply, UpdateAccountRequest,
};

const MIN_ATTR_LEN: usize = 1;
const MAX_ATTR_LEN: usize = 32;

pub struct AccountHandler {
    db: Arc<DbPool>,
    follow: FollowClient,
    like: LikeClient,
    post: PostClient,
    fanout: Arc<Fanout>,
}

impl AccountHandler {
    pub fn new(
        db: Arc<DbPool>,
        follow: FollowClient,
        like: LikeClient,
        post: PostClient,
        fanout: Arc<Fanout>,
    ) -> Arc<Self> {
        Arc::new(AccountHandler { db, follow, like, post, fanout })
    }

    fn tag(&self, request_id: &str, function: &'static str) -> LogTag {
        LogTag {
            local_service: "account",
            local_function: function,
            remote: "postgres",
            remote_function: "query".to_string(),
            request_id: request_id.to_string(),
        }
    }

    pub fn authenticate_user(&self, req: AuthenticateUserRequest) -> ServiceResult<AccountReply, AccountException> {
        let tag = self.tag(&req.meta.id, "authenticate_user");
        logging::logged(logging::RPC_CALL, tag, || {
            let mut conn = self.db.acquire().context("acquiring account db connection")?;
            let row = conn
                .query_opt(
                    "SELECT id, created_at, active, username, password, first_name, last_name \
                     FROM accounts WHERE username = $1",
                    &[&req.username],
                )
                .context("querying account by username")?;
            let account = match row {
                Some(row) => row_to_account(&row),
                None => {
                    return Err(ServiceError::Domain(AccountException::InvalidCredentials(format!(
                        "no account with username {}",
                        req.username
                    ))))
                }
            };
            if !account.active {
                return Err(ServiceError::Domain(AccountException::Deactivated(format!(
                    "account {} is deactivated",
                    account.id
                ))));
            }
            if account.password != req.password {
                return Err(ServiceError::Domain(AccountException::InvalidCredentials(format!(
                    "password mismatch for account {}",
                    account.id
                ))));
            }
            Ok(AccountReply { account: AccountView::from(&account) })
        })
    }

    pub fn create_account(&self, req: CreateAccountRequest) -> ServiceResult<AccountReply, AccountException> {
        let tag = self.tag(&req.meta.id, "create_account");
        logging::logged(logging::RPC_CALL, tag, || {
            for (name, value) in [
                ("username", &req.username),
                ("password", &req.password),
                ("first_name", &req.first_name),
                ("last_name", &req.last_name),
            ] {
                let len = value.chars().count();
                if !(MIN_ATTR_LEN..=MAX_ATTR_LEN).contains(&len) {
                    return Err(ServiceError::Domain(AccountException::InvalidAttributes(format!(
                        "{name} length {len} not in {MIN_ATTR_LEN}..={MAX_ATTR_LEN}"
                    ))));
                }
            }

            let mut conn = self.db.acquire().context("acquiring account db connection")?;
            let created_at = now_epoch();
            let row = conn.query_one(
                "INSERT INTO accounts (created_at, active, username, password, first_name, last_name) \
                 VALUES ($1, TRUE, $2, $3, $4, $5) \
                 RETURNING id, created_at, active, username, password, first_name, last_name",
                &[&created_at, &req.username, &req.password, &req.first_name, &req.last_name],
            );
            match row {
                Ok(row) => Ok(AccountReply { account: AccountView::from(&row_to_account(&row)) }),
                Err(e) if is_unique_violation(&e) => Err(ServiceError::Domain(
                    AccountException::UsernameAlreadyExists(req.username.clone()),
                )),
                Err(e) => Err(anyhow::Error::from(e).context("inserting account").into()),
            }
        })
    }

    pub fn retrieve_standard_account(&self, req: RetrieveByIdRequest) -> ServiceResult<AccountReply, AccountException> {
        let tag = self.tag(&req.meta.id, "retrieve_standard_account");
        logging::logged(logging::RPC_CALL, tag, || {
            let account = self.get_account(req.id)?;
            let mut view = AccountView::from(&account);
            view.followed_by_you = self
                .follow
                .check_follow(&req.meta, req.meta.requester_id, req.id)
                .map_err(anyhow::Error::new)?;
            Ok(AccountReply { account: view })
        })
    }

    pub fn retrieve_expanded_account(&self, req: RetrieveByIdRequest) -> ServiceResult<ExpandedAccountReply, AccountException> {
        let tag = self.tag(&req.meta.id, "retrieve_expanded_account");
        logging::logged(logging::RPC_CALL, tag, || {
            let account = self.get_account(req.id)?;
            let mut view = AccountView::from(&account);
            view.followed_by_you = self
                .follow
                .check_follow(&req.meta, req.meta.requester_id, req.id)
                .map_err(anyhow::Error::new)?;
            let expanded = self.expand_one(&req.meta, view)?;
            Ok(ExpandedAccountReply { account: expanded })
        })
    }

    pub fn update_account(&self, req: UpdateAccountRequest) -> ServiceResult<AccountReply, AccountException> {
        let tag = self.tag(&req.meta.id, "update_account");
        logging::logged(logging::RPC_CALL, tag, || {
            if req.meta.requester_id != req.id {
                return Err(ServiceError::Domain(AccountException::NotAuthorized(format!(
                    "requester {} is not account {}",
                    req.meta.requester_id, req.id
                ))));
            }
            for (name, value) in [("password", &req.password), ("first_name", &req.first_name), ("last_name", &req.last_name)] {
                let len = value.chars().count();
                if !(MIN_ATTR_LEN..=MAX_ATTR_LEN).contains(&len) {
                    return Err(ServiceError::Domain(AccountException::InvalidAttributes(format!(
                        "{name} length {len} not in {MIN_ATTR_LEN}..={MAX_ATTR_LEN}"
                    ))));
                }
            }

            let mut conn = self.db.acquire().context("acquiring account db connection")?;
            let row = conn
                .query_opt(
                    "UPDATE accounts SET password = $1, first_name = $2, last_name = $3 \
                     WHERE id = $4 RETURNING id, created_at, active, username, password, first_name, last_name",
                    &[&req.password, &req.first_name, &req.last_name, &req.id],
                )
                .context("updating account")?;
            match row {
                Some(row) => Ok(AccountReply { account: AccountView::from(&row_to_account(&row)) }),
                None => Err(ServiceError::Domain(AccountException::NotFound(format!(
                    "account {} not found",
                    req.id
                )))),
            }
        })
    }

    pub fn delete_account(&self, req: RetrieveByIdRequest) -> ServiceResult<UnitReply, AccountException> {
        let tag = self.tag(&req.meta.id, "delete_account");
        logging::logged(logging::RPC_CALL, tag, || {
            if req.meta.requester_id != req.id {
                return Err(ServiceError::Domain(AccountException::NotAuthorized(format!(
                    "requester {} is not account {}",
                    req.meta.requester_id, req.id
                ))));
            }
            let mut conn = self.db.acquire().context("acquiring account db connection")?;
            let rows = conn
                .query(
                    "UPDATE accounts SET active = FALSE WHERE id = $1 AND active = TRUE RETURNING id",
                    &[&req.id],
                )
                .context("deactivating account")?;
            if rows.is_empty() {
                Err(ServiceError::Domain(AccountException::NotFound(format!(
                    "account {} not found",
                    req.id
                ))))
            } else {
                Ok(UnitReply)
            }
        })
    }

    pub fn list_accounts(&self, req: ListAccountsRequest) -> ServiceResult<ListAccountsReply, AccountException> {
        let tag = self.tag(&req.meta.id, "list_accounts");
        logging::logged(logging::RPC_CALL, tag, || {
            let mut conn = self.db.acquire().context("acquiring account db connection")?;
            let rows = fetch_active_rows(&mut conn, req.query.username.as_deref(), req.limit, req.offset)
                .context("listing accounts")?;
            let views: Vec<AccountView> = rows.iter().map(|row| AccountView::from(&row_to_account(row))).collect();
            drop(conn);

            let follow_a = self.follow.clone();
            let follow_b = self.follow.clone();
            let like = self.like.clone();
            let post = self.post.clone();
            let requester_id = req.meta.requester_id;
            let expanded = expand_rows(
                &self.fanout,
                views,
                move |view, meta| -> anyhow::Result<ExpandedAccount> {
                    let mut view = view.clone();
                    view.followed_by_you = follow_a.check_follow(meta, requester_id, view.id)?;
                    expand_account(&follow_b, &like, &post, meta, view)
                },
                &req.meta,
            )?
            .into_iter()
            .collect::<anyhow::Result<Vec<_>>>()?;

            Ok(ListAccountsReply { accounts: expanded })
        })
    }

    fn get_account(&self, id: i32) -> ServiceResult<Account, AccountException> {
        let mut conn = self.db.acquire().context("acquiring account db connection")?;
        let row = conn
            .query_opt(
                "SELECT id, created_at, active, username, password, first_name, last_name \
                 FROM accounts WHERE id = $1",
                &[&id],
            )
            .context("querying account by id")?;
        match row {
            Some(row) => Ok(row_to_account(&row)),
            None => Err(ServiceError::Domain(AccountException::NotFound(format!(
                "account {id} not found"
            )))),
        }
    }

    fn expand_one(&self, meta: &RequestMeta, account: AccountView) -> ServiceResult<ExpandedAccount, AccountException> {
        expand_account(&self.follow, &self.like, &self.post, meta, account)
            .map_err(ServiceError::Application)
    }
}

/// The five-way parallel fan-out shared by `retrieve_expanded_account` and
/// `list_accounts` (spec §4.5): follows-you, follower/followee counts, post
/// count, like count.
///
/// Uses raw OS threads rather than `Fanout::spawn`: `list_accounts` already
/// runs this per-row inside a `Fanout`-driven task, and a fixed-size
/// `Executor` pool can deadlock if every worker blocks waiting on jobs it
/// submitted back to the same bounded queue.
fn expand_account(
    follow: &FollowClient,
    like: &LikeClient,
    post: &PostClient,
    meta: &RequestMeta,
    account: AccountView,
) -> anyhow::Result<ExpandedAccount> {
    let id = account.id;
    let requester_id = meta.requester_id;

    let meta_follows_you = meta.propagate();
    let meta_followers = meta.propagate();
    let meta_followees = meta.propagate();
    let meta_posts = meta.propagate();
    let meta_likes = meta.propagate();

    let follow_a = follow.clone();
    let follow_b = follow.clone();
    let follow_c = follow.clone();
    let like = like.clone();
    let post = post.clone();

    let follows_you_handle = std::thread::spawn(move || follow_a.check_follow(&meta_follows_you, id, requester_id));
    let followers_handle = std::thread::spawn(move || follow_b.count_followers(&meta_followers, id));
    let followees_handle = std::thread::spawn(move || follow_c.count_followees(&meta_followees, id));
    let posts_handle = std::thread::spawn(move || post.count_posts_by_author(&meta_posts, id));
    let likes_handle = std::thread::spawn(move || like.count_likes_by_account(&meta_likes, id));

    let follows_you = follows_you_handle
        .join()
        .map_err(|_| anyhow::anyhow!("follows-you fan-out task panicked"))??;
    let n_followers = followers_handle
        .join()
        .map_err(|_| anyhow::anyhow!("followers fan-out task panicked"))??;
    let n_followees = followees_handle
        .join()
        .map_err(|_| anyhow::anyhow!("followees fan-out task panicked"))??;
    let n_posts = posts_handle
        .join()
        .map_err(|_| anyhow::anyhow!("posts fan-out task panicked"))??;
    let n_likes = likes_handle
        .join()
        .map_err(|_| anyhow::anyhow!("likes fan-out task panicked"))??;

    Ok(ExpandedAccount { account, follows_you, n_followers, n_followees, n_posts, n_likes })
}

impl RpcService for AccountHandler {
    fn name(&self) -> &'static str {
        "account"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "authenticate_user" => dispatch_call(payload, |req| self.authenticate_user(req)),
            "create_account" => dispatch_call(payload, |req| self.create_account(req)),
            "retrieve_standard_account" => dispatch_call(payload, |req| self.retrieve_standard_account(req)),
            "retrieve_expanded_account" => dispatch_call(payload, |req| self.retrieve_expanded_account(req)),
            "update_account" => dispatch_call(payload, |req| self.update_account(req)),
            "delete_account" => dispatch_call(payload, |req| self.delete_account(req)),
            "list_accounts" => dispatch_call(payload, |req| self.list_accounts(req)),
            other => (
                MessageType::Exception,
                buzzblog_rpc::ApplicationException::unknown_method(other).to_bytes(),
            ),
        }
    }
}

fn row_to_account(row: &Row) -> Account {
    Account {
        id: row.get("id"),
        created_at: row.get("created_at"),
        active: row.get("active"),
        username: row.get("username"),
        password: row.get("password"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
    }
}

fn fetch_active_rows(
    conn: &mut postgres::Client,
    username: Option<&str>,
    limit: i32,
    offset: i32,
) -> Result<Vec<Row>, postgres::Error> {
    const COLUMNS: &str = "id, created_at, active, username, password, first_name, last_name";
    match username {
        None => conn.query(
            &format!(
                "SELECT {COLUMNS} FROM accounts WHERE active = TRUE \
                 ORDER BY created_at DESC LIMIT $1 OFFSET $2"
            ),
            &[&limit, &offset],
        ),
        Some(username) => conn.query(
            &format!(
                "SELECT {COLUMNS} FROM accounts WHERE active = TRUE AND username = $1 \
                 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            ),
            &[&username, &limit, &offset],
        ),
    }
}

fn is_unique_violation(e: &postgres::Error) -> bool {
    e.code() == Some(&SqlState::UNIQUE_VIOLATION)
}
