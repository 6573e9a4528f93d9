//! Business logic for the Follow service (spec §4.6): all state delegated to
//! Uniquepair under domain `"follow"`, expanded views fanned out to Account.

use std::sync::Arc;

use buzzblog_rpc::codec::MessageType;
use buzzblog_rpc::server::RpcService;
use buzzblog_rpc::RequestMeta;
use buzzblog_substrate::{dispatch_call, expand_rows, logging, Fanout, LogTag, ServiceError, ServiceResult};
use buzzblog_uniquepair::{UniquepairClient, UniquepairException, UniquepairQuery};

use crate::domain::{ExpandedFollow, Follow, DOMAIN};
use crate::exception::FollowException;
use crate::peer_account::PeerAccountClient;
use crate::proto::{
    CheckFollowReply, CheckFollowRequest, CountByIdRequest, CountReply, ExpandedFollowReply,
    FollowAccountRequest, FollowReply, ListFollowsReply, ListFollowsRequest, RetrieveByIdRequest,
    UnitReply,
};

pub struct FollowHandler {
    uniquepair: UniquepairClient,
    account: PeerAccountClient,
    fanout: Arc<Fanout>,
}

impl FollowHandler {
    pub fn new(uniquepair: UniquepairClient, account: PeerAccountClient, fanout: Arc<Fanout>) -> Arc<Self> {
        Arc::new(FollowHandler { uniquepair, account, fanout })
    }

    fn tag(&self, request_id: &str, function: &'static str) -> LogTag {
        LogTag {
            local_service: "follow",
            local_function: function,
            remote: "uniquepair",
            remote_function: "rpc".to_string(),
            request_id: request_id.to_string(),
        }
    }

    pub fn follow_account(&self, req: FollowAccountRequest) -> ServiceResult<FollowReply, FollowException> {
        let tag = self.tag(&req.meta.id, "follow_account");
        logging::logged(logging::RPC_CALL, tag, || {
            if req.meta.requester_id == req.followee_id {
                return Err(ServiceError::Domain(FollowException::InvalidAttributes(
                    "cannot follow yourself".to_string(),
                )));
            }
            let pair = self
                .uniquepair
                .add(&req.meta, DOMAIN, req.meta.requester_id, req.followee_id);
            let pair = match pair {
                Ok(p) => p,
                Err(buzzblog_uniquepair::client::UniquepairClientError::Domain(
                    UniquepairException::AlreadyExists(m),
                )) => return Err(ServiceError::Domain(FollowException::AlreadyExists(m))),
                Err(e) => return Err(ServiceError::Application(anyhow::Error::new(e))),
            };
            Ok(FollowReply { follow: pair.into() })
        })
    }

    pub fn retrieve_standard_follow(&self, req: RetrieveByIdRequest) -> ServiceResult<FollowReply, FollowException> {
        let tag = self.tag(&req.meta.id, "retrieve_standard_follow");
        logging::logged(logging::RPC_CALL, tag, || {
            let follow = self.get_follow(&req.meta, req.id)?;
            Ok(FollowReply { follow })
        })
    }

    pub fn retrieve_expanded_follow(&self, req: RetrieveByIdRequest) -> ServiceResult<ExpandedFollowReply, FollowException> {
        let tag = self.tag(&req.meta.id, "retrieve_expanded_follow");
        logging::logged(logging::RPC_CALL, tag, || {
            let follow = self.get_follow(&req.meta, req.id)?;
            let expanded = self.expand_one(&req.meta, follow)?;
            Ok(ExpandedFollowReply { follow: expanded })
        })
    }

    pub fn delete_follow(&self, req: RetrieveByIdRequest) -> ServiceResult<UnitReply, FollowException> {
        let tag = self.tag(&req.meta.id, "delete_follow");
        logging::logged(logging::RPC_CALL, tag, || {
            let follow = self.get_follow(&req.meta, req.id)?;
            if req.meta.requester_id != follow.follower_id {
                return Err(ServiceError::Domain(FollowException::NotAuthorized(format!(
                    "requester {} is not follower {}",
                    req.meta.requester_id, follow.follower_id
                ))));
            }
            match self.uniquepair.remove(&req.meta, req.id) {
                Ok(()) => Ok(UnitReply),
                Err(buzzblog_uniquepair::client::UniquepairClientError::Domain(
                    UniquepairException::NotFound(m),
                )) => Err(ServiceError::Domain(FollowException::NotFound(m))),
                Err(e) => Err(ServiceError::Application(anyhow::Error::new(e))),
            }
        })
    }

    pub fn list_follows(&self, req: ListFollowsRequest) -> ServiceResult<ListFollowsReply, FollowException> {
        let tag = self.tag(&req.meta.id, "list_follows");
        logging::logged(logging::RPC_CALL, tag, || {
            let query = UniquepairQuery {
                domain: DOMAIN.to_string(),
                first_elem: req.query.follower_id,
                second_elem: req.query.followee_id,
            };
            let rows = self
                .uniquepair
                .fetch(&req.meta, query, req.limit, req.offset)
                .map_err(|e| anyhow::Error::new(e))?;
            let follows: Vec<Follow> = rows.into_iter().map(Follow::from).collect();
            let fanout = self.fanout.clone();
            let account = self.account.clone();
            let expanded = expand_rows(
                &self.fanout,
                follows,
                move |follow, meta| -> anyhow::Result<ExpandedFollow> {
                    let meta_a = meta.propagate();
                    let meta_b = meta.propagate();
                    let account_a = account.clone();
                    let account_b = account.clone();
                    let follower_id = follow.follower_id;
                    let followee_id = follow.followee_id;
                    let follower_handle = fanout.spawn(move || account_a.retrieve_standard_account(&meta_a, follower_id));
                    let followee_handle = fanout.spawn(move || account_b.retrieve_standard_account(&meta_b, followee_id));
                    let follower = follower_handle
                        .get()
                        .map_err(anyhow::Error::from)?
                        .map_err(anyhow::Error::from)?;
                    let followee = followee_handle
                        .get()
                        .map_err(anyhow::Error::from)?
                        .map_err(anyhow::Error::from)?;
                    Ok(ExpandedFollow {
                        follow: follow.clone(),
                        follower,
                        followee,
                    })
                },
                &req.meta,
            )
            .map_err(anyhow::Error::from)?
            .into_iter()
            .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(ListFollowsReply { follows: expanded })
        })
    }

    /// Never raises: a miss is `Ok(false)` (spec §4.6, §9 Open Question 2).
    pub fn check_follow(&self, req: CheckFollowRequest) -> ServiceResult<CheckFollowReply, FollowException> {
        let tag = self.tag(&req.meta.id, "check_follow");
        logging::logged(logging::RPC_CALL, tag, || {
            let present = self
                .uniquepair
                .find(&req.meta, DOMAIN, req.follower_id, req.followee_id)
                .map_err(|e| anyhow::Error::new(e))?;
            Ok(CheckFollowReply { following: present })
        })
    }

    pub fn count_followers(&self, req: CountByIdRequest) -> ServiceResult<CountReply, FollowException> {
        let tag = self.tag(&req.meta.id, "count_followers");
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

    pub fn count_followees(&self, req: CountByIdRequest) -> ServiceResult<CountReply, FollowException> {
        let tag = self.tag(&req.meta.id, "count_followees");
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

    fn get_follow(&self, meta: &RequestMeta, id: i32) -> ServiceResult<Follow, FollowException> {
        match self.uniquepair.get(meta, id) {
            Ok(pair) => Ok(pair.into()),
            Err(buzzblog_uniquepair::client::UniquepairClientError::Domain(
                UniquepairException::NotFound(m),
            )) => Err(ServiceError::Domain(FollowException::NotFound(m))),
            Err(e) => Err(ServiceError::Application(anyhow::Error::new(e))),
        }
    }

    fn expand_one(&self, meta: &RequestMeta, follow: Follow) -> ServiceResult<ExpandedFollow, FollowException> {
        let meta_a = meta.propagate();
        let meta_b = meta.propagate();
        let account_a = self.account.clone();
        let account_b = self.account.clone();
        let follower_id = follow.follower_id;
        let followee_id = follow.followee_id;
        let follower_handle = self.fanout.spawn(move || account_a.retrieve_standard_account(&meta_a, follower_id));
        let followee_handle = self.fanout.spawn(move || account_b.retrieve_standard_account(&meta_b, followee_id));
        let follower = follower_handle
            .get()
            .map_err(anyhow::Error::from)?
            .map_err(anyhow::Error::from)?;
        let followee = followee_handle
            .get()
            .map_err(anyhow::Error::from)?
            .map_err(anyhow::Error::from)?;
        Ok(ExpandedFollow { follow, follower, followee })
    }
}

impl RpcService for FollowHandler {
    fn name(&self) -> &'static str {
        "follow"
    }

    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>) {
        match method {
            "follow_account" => dispatch_call(payload, |req| self.follow_account(req)),
            "retrieve_standard_follow" => dispatch_call(payload, |req| self.retrieve_standard_follow(req)),
            "retrieve_expanded_follow" => dispatch_call(payload, |req| self.retrieve_expanded_follow(req)),
            "delete_follow" => dispatch_call(payload, |req| self.delete_follow(req)),
            "list_follows" => dispatch_call(payload, |req| self.list_follows(req)),
            "check_follow" => dispatch_call(payload, |req| self.check_follow(req)),
            "count_followers" => dispatch_call(payload, |req| self.count_followers(req)),
            "count_followees" => dispatch_call(payload, |req| self.count_followees(req)),
            other => (
                MessageType::Exception,
                buzzblog_rpc::ApplicationException::unknown_method(other).to_bytes(),
            ),
        }
    }
}
