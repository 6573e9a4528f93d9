//! Business logic for the Post service (spec §4.8): own Postgres table,
//! concurrent hashtag processing via Trending on create, expanded views
//! fanned out to Account and Like.

use std::sync::Arc;

use anyhow::Context;
use buzzblog_rpc::codec::MessageType;
use buzzblog_rpc::server::RpcService;
use buzzblog_rpc::RequestMeta;
use buzzblog_substrate::{
    dispatch_call, expand_rows, logging, now_epoch, DbPool, Fanout, LogTag, ServiceError, ServiceResult,
};
use buzzblog_trending::TrendingClient;
use postgres::Row;

use crate::domain::{ExpandedPost, Post};
use crate::exception::PostException;
use crate::peer_account::PeerAccountClient;
use crate::peer_like::PeerLikeClient;
use crate::proto::{
    CountByAuthorRequest, CountReply, CreatePostRequest, ExpandedPostReply, ListPostsReply,
    ListPostsRequest, PostReply, RetrieveByIdRequest, UnitReply,
};

const MIN_TEXT_LEN: usize = 1;
const MAX_TEXT_LEN: usize = 200;

pub struct PostHandler {
    db: Arc<DbPool>,
    trending: TrendingClient,
    account: PeerAccountClient,
    like: PeerLikeClient,
    fanout: Arc<Fanout>,
}

impl PostHandler {
    pub fn new(
        db: Arc<DbPool>,
        trending: TrendingClient,
        account: PeerAccountClient,
        like: PeerLikeClient,
        fanout: Arc<Fanout>,
    ) -> Arc<Self> {
        Arc::new(PostHandler { db, trending, account, like, fanout })
    }

    fn tag(&self, request_id: &str, function: &'static str) -> LogTag {
        LogTag {
            local_service: "post",
            local_function: function,
            remote: "postgres",
            remote_function: "query".to_string(),
            request_id: request_id.to_string(),
        }
    }

    pub fn create_post(&self, req: CreatePostRequest) -> ServiceResult<PostReply, PostException> {
        let tag = self.tag(&req.meta.id, "create_post");
        logging::logged(logging::RPC_CALL, tag, || {
            let len = req.text.chars().count();
            if !(MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&len) {
                return Err(ServiceError::Domain(PostException::InvalidAttributes(format!(
                    "text length {len} not in {MIN_TEXT_LEN}..={MAX_TEXT_LEN}"
                ))));
            }

            let meta_a = req.meta.propagate();
            let trending = self.trending.clone();
            let text_for_trending = req.text.clone();
            let trending_handle = self
                .fanout
                .spawn(move || trending.process_post(&meta_a, &text_for_trending));

            let db = Arc::clone(&self.db);
            let text = req.text.clone();
            let author_id = req.meta.requester_id;
            let insert_handle = self.fanout.spawn(move || -> anyhow::Result<Post> {
                let mut conn = db.acquire().context("acquiring post db connection")?;
                let created_at = now_epoch();
                let row = conn
                    .query_one(
                        "INSERT INTO posts (created_at, active, text, author_id) \
                         VALUES ($1, TRUE, $2, $3) \
                         RETURNING id, created_at, active, text, author_id",
                        &[&created_at, &text, &author_id],
                    )
                    .context("inserting post")?;
                Ok(row_to_post(&row))
            });

            let post = insert_handle.get().map_err(anyhow::Error::from)??;
            trending_handle
                .get()
                .map_err(anyhow::Error::from)?
                .context("processing post for trending hashtags")?;

            Ok(PostReply { post })
        })
    }

    pub fn retrieve_standard_post(&self, req: RetrieveByIdRequest) -> ServiceResult<PostReply, PostException> {
        let tag = self.tag(&req.meta.id, "retrieve_standard_post");
        logging::logged(logging::RPC_CALL, tag, || {
            let post = self.get_post(req.id)?;
            Ok(PostReply { post })
        })
    }

    pub fn retrieve_expanded_post(&self, req: RetrieveByIdRequest) -> ServiceResult<ExpandedPostReply, PostException> {
        let tag = self.tag(&req.meta.id, "retrieve_expanded_post");
        logging::logged(logging::RPC_CALL, tag, || {
            let post = self.get_post(req.id)?;
            let expanded = self.expand_one(&req.meta, post)?;
            Ok(ExpandedPostReply { post: expanded })
        })
    }

    pub fn delete_post(&self, req: RetrieveByIdRequest) -> ServiceResult<UnitReply, PostException> {
        let tag = self.tag(&req.meta.id, "delete_post");
        logging::logged(logging::RPC_CALL, tag, || {
            let post = self.get_post(req.id)?;
            if req.meta.requester_id != post.author_id {
                return Err(ServiceError::Domain(PostException::NotAuthorized(format!(
                    "requester {} is not author {}",
                    req.meta.requester_id, post.author_id
                ))));
            }
            let mut conn = self.db.acquire().context("acquiring post db connection")?;
            let rows = conn
                .query(
                    "UPDATE posts SET active = FALSE WHERE id = $1 AND active = TRUE RETURNING id",
                    &[&req.id],
                )
                .context("deactivating post")?;
            if rows.is_empty() {
                Err(ServiceError::Domain(PostException::NotFound(format!(
                    "post {} not found",
                    req.id
                ))))
            } else {
                Ok(UnitReply)
            }
        })
    }

    pub fn list_posts(&self, req: ListPostsRequest) -> ServiceResult<ListPostsReply, PostException> {
        let tag = self.tag(&req.meta.id, "list_posts");
        logging::logged(logging::RPC_CALL, tag, || {
            let mut conn = self.db.acquire().context("acquiring post db connection")?;
            let rows = fetch_active_rows(&mut conn, req.query.author_id, req.limit, req.offset)
                .context("listing posts")?;
            let posts: Vec<Post> = rows.iter().map(row_to_post).collect();
            drop(conn);

            let expanded = self.expand_posts(posts, &req.meta)?;
            Ok(ListPostsReply { posts: expanded })
        })
    }

    /// The row-expansion half of `list_posts`, split out so it can be
    /// exercised against a handful of already-fetched rows without a
    /// database (each row still fans its author/like-count lookups out in
    /// parallel, mirroring `expand_one`).
    pub fn expand_posts(&self, posts: Vec<Post>, meta: &RequestMeta) -> ServiceResult<Vec<ExpandedPost>, PostException> {
        let fanout = self.fanout.clone();
        let account = self.account.clone();
        let like = self.like.clone();
        let expanded = expand_rows(
            &self.fanout,
            posts,
            move |post, meta| -> anyhow::Result<ExpandedPost> {
                let meta_a = meta.propagate();
                let meta_b = meta.propagate();
                let account = account.clone();
                let like = like.clone();
                let author_id = post.author_id;
                let post_id = post.id;
                let account_handle = fanout.spawn(move || account.retrieve_standard_account(&meta_a, author_id));
                let like_handle = fanout.spawn(move || like.count_likes_of_post(&meta_b, post_id));
                let author = account_handle
                    .get()
                    .map_err(anyhow::Error::from)?
                    .map_err(anyhow::Error::from)?;
                let n_likes = like_handle
                    .get()
                    .map_err(anyhow::Error::from)?
                    .map_err(anyhow::Error::from)?;
                Ok(ExpandedPost { post: post.clone(), author, n_likes })
            },
            meta,
        )?
        .into_iter()
        .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(expanded)
    }

    /// Counts every post by the author regardless of `active` (spec §9 open
    /// question: deactivated posts still count).
    pub fn count_posts_by_author(&self, req: CountByAuthorRequest) -> ServiceResult<CountReply, PostException> {
        let tag = self.tag(&req.meta.id, "count_posts_by_author");
        logging::logged(logging::RPC_CALL, tag, || {
            let mut conn = self.db.acquire().context("acquiring post db connection")?;
            let row = conn
                .query_one(
                    "SELECT COUNT(*) FROM posts WHERE author_id = $1",
                    &[&req.author_id],
                )
                .context("counting posts by author")?;
            let count: i64 = row.get(0);
            Ok(CountReply { count: count as i32 })
        })
    }

    fn get_post(&self, id: i32) -> ServiceResult<Post, PostException> {
        let mut conn = self.db.acquire().context("acquiring post db connection")?;
        let row = conn
            .query_opt(
                "SELECT id, created_at, active, text, author_id FROM posts WHERE id = $1 AND active = TRUE",
                &[&id],
            )
            .context("querying post by id")?;
        match row {
            Some(row) => Ok(row_to_post(&row)),
            None => Err(ServiceError::Domain(PostException::NotFound(format!(
                "post {id} not found"
            )))),
        }
    }

    fn expand_one(&self, meta: &RequestMeta, post: Post) -> ServiceResult<ExpandedPost, PostException> {
        let meta_a = meta.propagate();
        let meta_b = meta.propagate();
        let account = self.account.clone();
        let like = self.like.clone();
        let author_id = post.author_id;
        let post_id = post.id;
        let account_handle = self.fanout.spawn(move || account.retrieve_standard_account(&meta_a, author_id));
        let like_handle = self.fanout.spawn(move || like.count_likes_of_post(&meta_b, post_id));
        let author = account_handle
            .get()
            .map_err(anyhow::Error::from)?
            .map_err(anyhow::Error::from)?;
        let n_likes = like_handle
            .get()
            .map_err(anyhow::Error::from)?
            .map_err(anyhow::Error::from)?;
        Ok(ExpandedPost { post, author, n_likes })
    }
}

impl RpcService for PostHandler {
    fn name(&self) -> &'static str {
        "post"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "create_post" => dispatch_call(payload, |req| self.create_post(req)),
            "retrieve_standard_post" => dispatch_call(payload, |req| self.retrieve_standard_post(req)),
            "retrieve_expanded_post" => dispatch_call(payload, |req| self.retrieve_expanded_post(req)),
            "delete_post" => dispatch_call(payload, |req| self.delete_post(req)),
            "list_posts" => dispatch_call(payload, |req| self.list_posts(req)),
            "count_posts_by_author" => dispatch_call(payload, |req| self.count_posts_by_author(req)),
            other => (
                MessageType::Exception,
                buzzblog_rpc::ApplicationException::unknown_method(other).to_bytes(),
            ),
        }
    }
}

fn row_to_post(row: &Row) -> Post {
    Post {
        id: row.get("id"),
        created_at: row.get("created_at"),
        active: row.get("active"),
        text: row.get("text"),
        author_id: row.get("author_id"),
    }
}

fn fetch_active_rows(
    conn: &mut postgres::Client,
    author_id: Option<i32>,
    limit: i32,
    offset: i32,
) -> Result<Vec<Row>, postgres::Error> {
    const COLUMNS: &str = "id, created_at, active, text, author_id";
    match author_id {
        None => conn.query(
            &format!(
                "SELECT {COLUMNS} FROM posts WHERE active = TRUE \
                 ORDER BY created_at DESC LIMIT $1 OFFSET $2"
            ),
            &[&limit, &offset],
        ),
        Some(author_id) => conn.query(
            &format!(
                "SELECT {COLUMNS} FROM posts WHERE active = TRUE AND author_id = $1 \
                 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            ),
            &[&author_id, &limit, &offset],
        ),
    }
}

