//! Business logic for the Like service (spec §4.7): all state delegated to
//! Uniquepair under domain `"like"`, expanded views fanned out to Account and
//! Post. No self-exclusion check: a user may like their own post.

use std::sync::Arc;

use buzzblog_rpc::codec::MessageType;
use buzzblog_rpc::server::RpcService;
use buzzblog_rpc::RequestMeta;
use buzzblog_substrate::{dispatch_call, expand_rows, logging, Fanout, LogTag, ServiceError, ServiceResult};
use buzzblog_uniquepair::{UniquepairClient, UniquepairException, UniquepairQuery};

use crate::domain::{ExpandedLike, Like, DOMAIN};
use crate::exception::LikeException;
use crate::peer_account::PeerAccountClient;
use crate::peer_post::PeerPostClient;
use crate::proto::{
    CountByIdRequest, CountReply, ExpandedLikeReply, LikePostRequest, LikeReply, ListLikesReply,
    ListLikesRequest, RetrieveByIdRequest, UnitReply,
};

pub struct LikeHandler {
    uniquepair: UniquepairClient,
    account: PeerAccountClient,
    post: PeerPostClient,
    fanout: Arc<Fanout>,
}

impl LikeHandler {
    pub fn new(
        uniquepair: UniquepairClient,
        account: PeerAccountClient,
        post: PeerPostClient,
        fanout: Arc<Fanout>,
    ) -> Arc<Self> {
        Arc::new(LikeHandler { uniquepair, account, post, fanout })
    }

    fn tag(&self, request_id: &str, function: &'static str) -> LogTag {
        LogTag {
            local_service: "like",
            local_function: function,
            remote: "uniquepair",
            remote_function: "rpc".to_string(),
            request_id: request_id.to_string(),
        }
    }

    pub fn like_post(&self, req: LikePostRequest) -> ServiceResult<LikeReply, LikeException> {
        let tag = self.tag(&req.meta.id, "like_post");
        logging::logged(logging::RPC_CALL, tag, || {
            let pair = self
                .uniquepair
                .add(&req.meta, DOMAIN, req.meta.requester_id, req.post_id);
            let pair = match pair {
                Ok(p) => p,
                Err(buzzblog_uniquepair::client::UniquepairClientError::Domain(
                    UniquepairException::AlreadyExists(m),
                )) => return Err(ServiceError::Domain(LikeException::AlreadyExists(m))),
                Err(e) => return Err(ServiceError::Application(anyhow::Error::new(e))),
            };
            Ok(LikeReply { like: pair.into() })
        })
    }

    pub fn retrieve_standard_like(&self, req: RetrieveByIdRequest) -> ServiceResult<LikeReply, LikeException> {
        let tag = self.tag(&req.meta.id, "retrieve_standard_like");
        logging::logged(logging::RPC_CALL, tag, || {
            let like = self.get_like(&req.meta, req.id)?;
            Ok(LikeReply { like })
        })
    }

    pub fn retrieve_expanded_like(&self, req: RetrieveByIdRequest) -> ServiceResult<ExpandedLikeReply, LikeException> {
        let tag = self.tag(&req.meta.id, "retrieve_expanded_like");
        logging::logged(logging::RPC_CALL, tag, || {
            let like = self.get_like(&req.meta, req.id)?;
            let expanded = self.expand_one(&req.meta, like)?;
            Ok(ExpandedLikeReply { like: expanded })
        })
    }

    pub fn delete_like(&self, req: RetrieveByIdRequest) -> ServiceResult<UnitReply, LikeException> {
        let tag = self.tag(&req.meta.id, "delete_like");
        logging::logged(logging::RPC_CALL, tag, || {
            let like = self.get_like(&req.meta, req.id)?;
            if req.meta.requester_id != like.account_id {
                return Err(ServiceError::Domain(LikeException::NotAuthorized(format!(
                    "requester {} is not account {}",
                    req.meta.requester_id, like.account_id
                ))));
            }
            match self.uniquepair.remove(&req.meta, req.id) {
                Ok(()) => Ok(UnitReply),
                Err(buzzblog_uniquepair::client::UniquepairClientError::Domain(
                    UniquepairException::NotFound(m),
                )) => Err(ServiceError::Domain(LikeException::NotFound(m))),
                Err(e) => Err(ServiceError::Application(anyhow::Error::new(e))),
            }
        })
    }

    pub fn list_likes(&self, req: ListLikesRequest) -> ServiceResult<ListLikesReply, LikeException> {
        let tag = self.tag(&req.meta.id, "list_likes");
        logging::logged(logging::RPC_CALL, tag, || {
            let query = UniquepairQuery {
                domain: DOMAIN.to_string(),
                first_elem: req.query.account_id,
                second_elem: req.query.post_id,
            };
            let rows = self
                .uniquepair
                .fetch(&req.meta, query, req.limit, req.offset)
                .map_err(|e| anyhow::Error::new(e))?;
            let likes: Vec<Like> = rows.into_iter().map(Like::from).collect();
            let fanout = self.fanout.clone();
            let account = self.account.clone();
            let post = self.post.clone();
            let expanded = expand_rows(
                &self.fanout,
                likes,
                move |like, meta| -> anyhow::Result<ExpandedLike> {
                    let meta_a = meta.propagate();
                    let meta_b = meta.propagate();
                    let account = account.clone();
                    let post = post.clone();
                    let account_id = like.account_id;
                    let post_id = like.post_id;
                    let account_handle = fanout.spawn(move || account.retrieve_standard_account(&meta_a, account_id));
                    let post_handle = fanout.spawn(move || post.retrieve_expanded_post(&meta_b, post_id));
                    let account_view = account_handle
                        .get()
                        .map_err(anyhow::Error::from)?
                        .map_err(anyhow::Error::from)?;
                    let post_view = post_handle
                        .get()
                        .map_err(anyhow::Error::from)?
                        .map_err(anyhow::Error::from)?;
                    Ok(ExpandedLike {
                        like: like.clone(),
                        account: account_view,
                        post: post_view,
                    })
                },
                &req.meta,
            )?
            .into_iter()
            .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(ListLikesReply { likes: expanded })
        })
    }

    pub fn count_likes_by_account(&self, req: CountByIdRequest) -> ServiceResult<CountReply, LikeException> {
        let tag = self.tag(&req.meta.id, "count_likes_by_account");
        logging::logged(logging::RPC_CALL, tag, || {
            let query = UniquepairQuery {
                domain: DOMAIN.to_string(),
                first_elem: Some(req.id),
                second_elem: None,
            };
            let count = self
                .uniquepair
                .count(&req.meta, query)
                .map_err(|e| anyhow::Error::new(e))?;
            Ok(CountReply { count })
        })
    }

    pub fn count_likes_of_post(&self, req: CountByIdRequest) -> ServiceResult<CountReply, LikeException> {
        let tag = self.tag(&req.meta.id, "count_likes_of_post");
        logging::logged(logging::RPC_CALL, tag, || {
            let query = UniquepairQuery {
                domain: DOMAIN.to_string(),
                first_elem: None,
                second_elem: Some(req.id),
            };
            let count = self
                .uniquepair
                .count(&req.meta, query)
                .map_err(|e| anyhow::Error::new(e))?;
            Ok(CountReply { count })
        })
    }

    fn get_like(&self, meta: &RequestMeta, id: i32) -> ServiceResult<Like, LikeException> {
        match self.uniquepair.get(meta, id) {
            Ok(pair) => Ok(pair.into()),
            Err(buzzblog_uniquepair::client::UniquepairClientError::Domain(
                UniquepairException::NotFound(m),
            )) => Err(ServiceError::Domain(LikeException::NotFound(m))),
            Err(e) => Err(ServiceError::Application(anyhow::Error::new(e))),
        }
    }

    fn expand_one(&self, meta: &RequestMeta, like: Like) -> ServiceResult<ExpandedLike, LikeException> {
        let meta_a = meta.propagate();
        let meta_b = meta.propagate();
        let account = self.account.clone();
        let post = self.post.clone();
        let account_id = like.account_id;
        let post_id = like.post_id;
        let account_handle = self.fanout.spawn(move || account.retrieve_standard_account(&meta_a, account_id));
        let post_handle = self.fanout.spawn(move || post.retrieve_expanded_post(&meta_b, post_id));
        let account_view = account_handle
            .get()
            .map_err(anyhow::Error::from)?
            .map_err(anyhow::Error::from)?;
        let post_view = post_handle
            .get()
            .map_err(anyhow::Error::from)?
            .map_err(anyhow::Error::from)?;
        Ok(ExpandedLike { like, account: account_view, post: post_view })
    }
}

impl RpcService for LikeHandler {
    fn name(&self) -> &'static str {
        "like"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "like_post" => dispatch_call(payload, |req| self.like_post(req)),
            "retrieve_standard_like" => dispatch_call(payload, |req| self.retrieve_standard_like(req)),
            "retrieve_expanded_like" => dispatch_call(payload, |req| self.retrieve_expanded_like(req)),
            "delete_like" => dispatch_call(payload, |req| self.delete_like(req)),
            "list_likes" => dispatch_call(payload, |req| self.list_likes(req)),
            "count_likes_by_account" => dispatch_call(payload, |req| self.count_likes_by_account(req)),
            "count_likes_of_post" => dispatch_call(payload, |req| self.count_likes_of_post(req)),
            other => (
                MessageType::Exception,
                buzzblog_rpc::ApplicationException::unknown_method(other).to_bytes(),
            ),
        }
    }
}
