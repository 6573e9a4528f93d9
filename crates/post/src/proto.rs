//! Request/response wire structs for each Post method (spec §4.8).

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_rpc::RequestMeta;

use crate::domain::{AccountView, ExpandedPost, Post, PostQuery};

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
pub struct CreatePostRequest {
    pub meta: RequestMeta,
    pub text: String,
}

impl Message for CreatePostRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_string_field(2, &self.text);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut text = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => text = Some(r.read_string()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(CreatePostRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            text: text.ok_or(CodecError::MissingField(2, "text"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PostReply {
    pub post: Post,
}

impl Message for PostReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.post.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut post = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => post = Some(r.read_struct(Post::decode)?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(PostReply {
            post: post.ok_or(CodecError::MissingField(1, "post"))?,
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

/// Wire-compatible with what `buzzblog-like`'s and `buzzblog-account`'s
/// locally-duplicated peer-post clients expect to decode.
#[derive(Debug, Clone)]
pub struct ExpandedPostReply {
    pub post: ExpandedPost,
}

impl Message for ExpandedPostReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.post.post.encode(w));
        w.write_struct_field(2, |w| self.post.author.encode(w));
        w.write_i32_field(3, self.post.n_likes);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut post = None;
        let mut author = None;
        let mut n_likes = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => post = Some(r.read_struct(Post::decode)?),
                2 => author = Some(r.read_struct(AccountView::decode)?),
                3 => n_likes = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ExpandedPostReply {
            post: ExpandedPost {
                post: post.ok_or(CodecError::MissingField(1, "post"))?,
                author: author.ok_or(CodecError::MissingField(2, "author"))?,
                n_likes: n_likes.unwrap_or(0),
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
pub struct ListPostsRequest {
    pub meta: RequestMeta,
    pub query: PostQuery,
    pub limit: i32,
    pub offset: i32,
}

impl Message for ListPostsRequest {
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
        Ok(ListPostsRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            query: query.ok_or(CodecError::MissingField(2, "query"))?,
            limit: limit.ok_or(CodecError::MissingField(3, "limit"))?,
            offset: offset.ok_or(CodecError::MissingField(4, "offset"))?,
        })
    }
}

fn encode_query(query: &PostQuery, w: &mut Writer) {
    if let Some(v) = query.author_id {
        w.write_i32_field(1, v);
    }
}

fn decode_query(r: &mut Reader) -> Result<PostQuery, CodecError> {
    decode_loop!(r, 1 => author_id = read_i32);
    Ok(PostQuery { author_id })
}

#[derive(Debug, Clone, Default)]
pub struct ListPostsReply {
    pub posts: Vec<ExpandedPost>,
}

impl Message for ListPostsReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_list_field(1, &self.posts, |w, item| {
            w.write_struct_field(1, |w| item.post.encode(w));
            w.write_struct_field(2, |w| item.author.encode(w));
            w.write_i32_field(3, item.n_likes);
        });
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut posts = Vec::new();
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => {
                    posts = r.read_struct_list(|r| {
                        let mut post = None;
                        let mut author = None;
                        let mut n_likes = None;
                        while let Some((field_id, ty)) = r.read_field_begin()? {
                            match field_id {
                                1 => post = Some(r.read_struct(Post::decode)?),
                                2 => author = Some(r.read_struct(AccountView::decode)?),
                                3 => n_likes = Some(r.read_i32()?),
                                _ => r.skip_value(ty)?,
                            }
                        }
                        Ok(ExpandedPost {
                            post: post.ok_or(CodecError::MissingField(1, "post"))?,
                            author: author.ok_or(CodecError::MissingField(2, "author"))?,
                            n_likes: n_likes.unwrap_or(0),
                        })
                    })?
                }
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ListPostsReply { posts })
    }
}

#[derive(Debug, Clone)]
pub struct CountByAuthorRequest {
    pub meta: RequestMeta,
    pub author_id: i32,
}

impl Message for CountByAuthorRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_i32_field(2, self.author_id);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut author_id = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => author_id = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(CountByAuthorRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            author_id: author_id.ok_or(CodecError::MissingField(2, "author_id"))?,
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
    fn create_post_request_round_trips() {
        let req = CreatePostRequest { meta: RequestMeta::new("r1", 1), text: "hello world".to_string() };
        let decoded = CreatePostRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(decoded.text, "hello world");
    }

    #[test]
    fn list_posts_query_omits_absent_author() {
        let req = ListPostsRequest {
            meta: RequestMeta::new("r1", 1),
            query: PostQuery { author_id: None },
            limit: 10,
            offset: 0,
        };
        let decoded = ListPostsRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(decoded.query.author_id, None);
    }
}
