//! Request/response wire structs for each Follow method (spec §4.6).

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_rpc::RequestMeta;

use crate::domain::{AccountView, ExpandedFollow, Follow, FollowQuery};

macro_rules! decode_loop {
    ($r:expr, $($id:literal => $slot:ident = $read:ident),+ $(,)?) => {
        $(let mut $slot = None;)+
        while let Some((field_id, ty)) = $r.read_field_begin()? {
            match field_id {
                $($id => $slot = Some($r.$read()?),)+
                _ => $r.skip_value(ty)?,
            }
        }
    };
}

#[derive(Debug, Clone)]
pub struct FollowAccountRequest {
    pub meta: RequestMeta,
    pub followee_id: i32,
}

impl Message for FollowAccountRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_i32_field(2, self.followee_id);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut followee_id = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => followee_id = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(FollowAccountRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            followee_id: followee_id.ok_or(CodecError::MissingField(2, "followee_id"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FollowReply {
    pub follow: Follow,
}

impl Message for FollowReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.follow.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut follow = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => follow = Some(r.read_struct(Follow::decode)?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(FollowReply {
            follow: follow.ok_or(CodecError::MissingField(1, "follow"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RetrieveByIdRequest {
    pub meta: RequestMeta,
    pub id: i32,
}

impl Message for RetrieveByIdRequest {
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
        Ok(RetrieveByIdRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            id: id.ok_or(CodecError::MissingField(2, "id"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExpandedFollowReply {
    pub follow: ExpandedFollow,
}

impl Message for ExpandedFollowReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.follow.follow.encode(w));
        w.write_struct_field(2, |w| self.follow.follower.encode(w));
        w.write_struct_field(3, |w| self.follow.followee.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut follow = None;
        let mut follower = None;
        let mut followee = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => follow = Some(r.read_struct(Follow::decode)?),
                2 => follower = Some(r.read_struct(AccountView::decode)?),
                3 => followee = Some(r.read_struct(AccountView::decode)?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ExpandedFollowReply {
            follow: ExpandedFollow {
                follow: follow.ok_or(CodecError::MissingField(1, "follow"))?,
                follower: follower.ok_or(CodecError::MissingField(2, "follower"))?,
                followee: followee.ok_or(CodecError::MissingField(3, "followee"))?,
            },
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnitReply;

impl Message for UnitReply {
    fn encode(&self, _w: &mut Writer) {}
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        while let Some((_, ty)) = r.read_field_begin()? {
            r.skip_value(ty)?;
        }
        Ok(UnitReply)
    }
}

#[derive(Debug, Clone)]
pub struct ListFollowsRequest {
    pub meta: RequestMeta,
    pub query: FollowQuery,
    pub limit: i32,
    pub offset: i32,
}

impl Message for ListFollowsRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_struct_field(2, |w| encode_query(&self.query, w));
        w.write_i32_field(3, self.limit);
        w.write_i32_field(4, self.offset);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut query = None;
        let mut limit = None;
        let mut offset = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => query = Some(r.read_struct(decode_query)?),
                3 => limit = Some(r.read_i32()?),
                4 => offset = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ListFollowsRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            query: query.ok_or(CodecError::MissingField(2, "query"))?,
            limit: limit.ok_or(CodecError::MissingField(3, "limit"))?,
            offset: offset.ok_or(CodecError::MissingField(4, "offset"))?,
        })
    }
}

fn encode_query(query: &FollowQuery, w: &mut Writer) {
    if let Some(v) = query.follower_id {
        w.write_i32_field(1, v);
    }
    if let Some(v) = query.followee_id {
        w.write_i32_field(2, v);
    }
}

fn decode_query(r: &mut Reader) -> Result<FollowQuery, CodecError> {
    decode_loop!(r, 1 => follower_id = read_i32, 2 => followee_id = read_i32);
    Ok(FollowQuery { follower_id, followee_id })
}

#[derive(Debug, Clone, Default)]
pub struct ListFollowsReply {
    pub follows: Vec<ExpandedFollow>,
}

impl Message for ListFollowsReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_list_field(1, &self.follows, |w, item| {
            w.write_struct_field(1, |w| item.follow.encode(w));
            w.write_struct_field(2, |w| item.follower.encode(w));
            w.write_struct_field(3, |w| item.followee.encode(w));
        });
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut follows = Vec::new();
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => {
                    follows = r.read_struct_list(|r| {
                        let mut follow = None;
                        let mut follower = None;
                        let mut followee = None;
                        while let Some((field_id, ty)) = r.read_field_begin()? {
                            match field_id {
                                1 => follow = Some(r.read_struct(Follow::decode)?),
                                2 => follower = Some(r.read_struct(AccountView::decode)?),
                                3 => followee = Some(r.read_struct(AccountView::decode)?),
                                _ => r.skip_value(ty)?,
                            }
                        }
                        Ok(ExpandedFollow {
                            follow: follow.ok_or(CodecError::MissingField(1, "follow"))?,
                            follower: follower.ok_or(CodecError::MissingField(2, "follower"))?,
                            followee: followee.ok_or(CodecError::MissingField(3, "followee"))?,
                        })
                    })?
                }
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ListFollowsReply { follows })
    }
}

#[derive(Debug, Clone)]
pub struct CheckFollowRequest {
    pub meta: RequestMeta,
    pub follower_id: i32,
    pub followee_id: i32,
}

impl Message for CheckFollowRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_i32_field(2, self.follower_id);
        w.write_i32_field(3, self.followee_id);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut follower_id = None;
        let mut followee_id = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => follower_id = Some(r.read_i32()?),
                3 => followee_id = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(CheckFollowRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            follower_id: follower_id.ok_or(CodecError::MissingField(2, "follower_id"))?,
            followee_id: followee_id.ok_or(CodecError::MissingField(3, "followee_id"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CheckFollowReply {
    pub following: bool,
}

impl Message for CheckFollowReply {
    fn encode(&self, w: &mut Writer) {
        w.write_bool_field(1, self.following);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        decode_loop!(r, 1 => following = read_bool);
        Ok(CheckFollowReply {
            following: following.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CountByIdRequest {
    pub meta: RequestMeta,
    pub id: i32,
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
pub struct CountReply {
    pub count: i32,
}

impl Message for CountReply {
    fn encode(&self, w: &mut Writer) {
        w.write_i32_field(1, self.count);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        decode_loop!(r, 1 => count = read_i32);
        Ok(CountReply {
            count: count.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_account_request_round_trips() {
        let req = FollowAccountRequest {
            meta: RequestMeta::new("r1", 1),
            followee_id: 2,
        };
        let decoded = FollowAccountRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(decoded.followee_id, 2);
    }

    #[test]
    fn list_follows_query_omits_absent_fields() {
        let req = ListFollowsRequest {
            meta: RequestMeta::new("r1", 1),
            query: FollowQuery { follower_id: Some(9), followee_id: None },
            limit: 10,
            offset: 0,
        };
        let decoded = ListFollowsRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(decoded.query.follower_id, Some(9));
        assert_eq!(decoded.query.followee_id, None);
    }
}
