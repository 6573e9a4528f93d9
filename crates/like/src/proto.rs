//! Request/response wire structs for each Like method (spec §4.7).

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_rpc::RequestMeta;

use crate::domain::{AccountView, ExpandedLike, ExpandedPostView, Like, LikeQuery};

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
pub struct LikePostRequest {
    pub meta: RequestMeta,
    pub post_id: i32,
}

impl Message for LikePostRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_i32_field(2, self.post_id);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut post_id = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => post_id = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(LikePostRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            post_id: post_id.ok_or(CodecError::MissingField(2, "post_id"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LikeReply {
    pub like: Like,
}

impl Message for LikeReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.like.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut like = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => like = Some(r.read_struct(Like::decode)?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(LikeReply {
            like: like.ok_or(CodecError::MissingField(1, "like"))?,
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
pub struct ExpandedLikeReply {
    pub like: ExpandedLike,
}

impl Message for ExpandedLikeReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.like.like.encode(w));
        w.write_struct_field(2, |w| self.like.account.encode(w));
        w.write_struct_field(3, |w| self.like.post.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut like = None;
        let mut account = None;
        let mut post = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => like = Some(r.read_struct(Like::decode)?),
                2 => account = Some(r.read_struct(AccountView::decode)?),
                3 => post = Some(r.read_struct(ExpandedPostView::decode)?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ExpandedLikeReply {
            like: ExpandedLike {
                like: like.ok_or(CodecError::MissingField(1, "like"))?,
                account: account.ok_or(CodecError::MissingField(2, "account"))?,
                post: post.ok_or(CodecError::MissingField(3, "post"))?,
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
pub struct ListLikesRequest {
    pub meta: RequestMeta,
    pub query: LikeQuery,
    pub limit: i32,
    pub offset: i32,
}

impl Message for ListLikesRequest {
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
        Ok(ListLikesRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            query: query.ok_or(CodecError::MissingField(2, "query"))?,
            limit: limit.ok_or(CodecError::MissingField(3, "limit"))?,
            offset: offset.ok_or(CodecError::MissingField(4, "offset"))?,
        })
    }
}

fn encode_query(query: &LikeQuery, w: &mut Writer) {
    if let Some(v) = query.account_id {
        w.write_i32_field(1, v);
    }
    if let Some(v) = query.post_id {
        w.write_i32_field(2, v);
    }
}

fn decode_query(r: &mut Reader) -> Result<LikeQuery, CodecError> {
    decode_loop!(r, 1 => account_id = read_i32, 2 => post_id = read_i32);
    Ok(LikeQuery { account_id, post_id })
}

#[derive(Debug, Clone, Default)]
pub struct ListLikesReply {
    pub likes: Vec<ExpandedLike>,
}

impl Message for ListLikesReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_list_field(1, &self.likes, |w, item| {
            w.write_struct_field(1, |w| item.like.encode(w));
            w.write_struct_field(2, |w| item.account.encode(w));
            w.write_struct_field(3, |w| item.post.encode(w));
        });
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut likes = Vec::new();
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => {
                    likes = r.read_struct_list(|r| {
                        let mut like = None;
                        let mut account = None;
                        let mut post = None;
                        while let Some((field_id, ty)) = r.read_field_begin()? {
                            match field_id {
                                1 => like = Some(r.read_struct(Like::decode)?),
                                2 => account = Some(r.read_struct(AccountView::decode)?),
                                3 => post = Some(r.read_struct(ExpandedPostView::decode)?),
                                _ => r.skip_value(ty)?,
                            }
                        }
                        Ok(ExpandedLike {
                            like: like.ok_or(CodecError::MissingField(1, "like"))?,
                            account: account.ok_or(CodecError::MissingField(2, "account"))?,
                            post: post.ok_or(CodecError::MissingField(3, "post"))?,
                        })
                    })?
                }
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ListLikesReply { likes })
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
    fn like_post_request_round_trips() {
        let req = LikePostRequest { meta: RequestMeta::new("r1", 1), post_id: 7 };
        let decoded = LikePostRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(decoded.post_id, 7);
    }

    #[test]
    fn list_likes_query_omits_absent_fields() {
        let req = ListLikesRequest {
            meta: RequestMeta::new("r1", 1),
            query: LikeQuery { account_id: Some(9), post_id: None },
            limit: 10,
            offset: 0,
        };
        let decoded = ListLikesRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(decoded.query.account_id, Some(9));
        assert_eq!(decoded.query.post_id, None);
    }
}
