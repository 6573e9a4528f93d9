//! The Like record (spec §3, §4.7): delegated entirely to Uniquepair under
//! domain `"like"`, `first_elem = account_id`, `second_elem = post_id`.

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_uniquepair::Uniquepair;

pub const DOMAIN: &str = "like";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Like {
    pub id: i32,
    pub created_at: i32,
    pub account_id: i32,
    pub post_id: i32,
}

impl From<Uniquepair> for Like {
    fn from(u: Uniquepair) -> Self {
        Like {
            id: u.id,
            created_at: u.created_at,
            account_id: u.first_elem,
            post_id: u.second_elem,
        }
    }
}

impl Message for Like {
    fn encode(&self, w: &mut Writer) {
        w.write_i32_field(1, self.id);
        w.write_i32_field(2, self.created_at);
        w.write_i32_field(3, self.account_id);
        w.write_i32_field(4, self.post_id);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut id = None;
        let mut created_at = None;
        let mut account_id = None;
        let mut post_id = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => id = Some(r.read_i32()?),
                2 => created_at = Some(r.read_i32()?),
                3 => account_id = Some(r.read_i32()?),
                4 => post_id = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(Like {
            id: id.ok_or(CodecError::MissingField(1, "id"))?,
            created_at: created_at.ok_or(CodecError::MissingField(2, "created_at"))?,
            account_id: account_id.ok_or(CodecError::MissingField(3, "account_id"))?,
            post_id: post_id.ok_or(CodecError::MissingField(4, "post_id"))?,
        })
    }
}

/// The same "standard account" wire shape every consuming service embeds.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountView {
    pub id: i32,
    pub created_at: i32,
    pub active: bool,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub followed_by_you: bool,
}

impl Message for AccountView {
    fn encode(&self, w: &mut Writer) {
        w.write_i32_field(1, self.id);
        w.write_i32_field(2, self.created_at);
        w.write_bool_field(3, self.active);
        w.write_string_field(4, &self.username);
        w.write_string_field(5, &self.first_name);
        w.write_string_field(6, &self.last_name);
        w.write_bool_field(7, self.followed_by_you);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut id = None;
        let mut created_at = None;
        let mut active = None;
        let mut username = None;
        let mut first_name = None;
        let mut last_name = None;
        let mut followed_by_you = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => id = Some(r.read_i32()?),
                2 => created_at = Some(r.read_i32()?),
                3 => active = Some(r.read_bool()?),
                4 => username = Some(r.read_string()?),
                5 => first_name = Some(r.read_string()?),
                6 => last_name = Some(r.read_string()?),
                7 => followed_by_you = Some(r.read_bool()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(AccountView {
            id: id.ok_or(CodecError::MissingField(1, "id"))?,
            created_at: created_at.ok_or(CodecError::MissingField(2, "created_at"))?,
            active: active.ok_or(CodecError::MissingField(3, "active"))?,
            username: username.ok_or(CodecError::MissingField(4, "username"))?,
            first_name: first_name.ok_or(CodecError::MissingField(5, "first_name"))?,
            last_name: last_name.ok_or(CodecError::MissingField(6, "last_name"))?,
            followed_by_you: followed_by_you.unwrap_or(false),
        })
    }
}

/// The "standard post" wire shape (spec §3): owned by Post, duplicated here
/// for the same reason `AccountView` is — see `peer_post.rs`.
#[derive(Debug, Clone, PartialEq)]
pub struct PostView {
    pub id: i32,
    pub created_at: i32,
    pub active: bool,
    pub text: String,
    pub author_id: i32,
}

impl Message for PostView {
    fn encode(&self, w: &mut Writer) {
        w.write_i32_field(1, self.id);
        w.write_i32_field(2, self.created_at);
        w.write_bool_field(3, self.active);
        w.write_string_field(4, &self.text);
        w.write_i32_field(5, self.author_id);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut id = None;
        let mut created_at = None;
        let mut active = None;
        let mut text = None;
        let mut author_id = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => id = Some(r.read_i32()?),
                2 => created_at = Some(r.read_i32()?),
                3 => active = Some(r.read_bool()?),
                4 => text = Some(r.read_string()?),
                5 => author_id = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(PostView {
            id: id.ok_or(CodecError::MissingField(1, "id"))?,
            created_at: created_at.ok_or(CodecError::MissingField(2, "created_at"))?,
            active: active.ok_or(CodecError::MissingField(3, "active"))?,
            text: text.ok_or(CodecError::MissingField(4, "text"))?,
            author_id: author_id.ok_or(CodecError::MissingField(5, "author_id"))?,
        })
    }
}

/// The expanded-post wire shape: standard post plus author and like count
/// (spec §4.8). Field layout must stay in lockstep with Post's own
/// `retrieve_expanded_post` reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedPostView {
    pub post: PostView,
    pub author: AccountView,
    pub n_likes: i32,
}

impl Message for ExpandedPostView {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.post.encode(w));
        w.write_struct_field(2, |w| self.author.encode(w));
        w.write_i32_field(3, self.n_likes);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut post = None;
        let mut author = None;
        let mut n_likes = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => post = Some(r.read_struct(PostView::decode)?),
                2 => author = Some(r.read_struct(AccountView::decode)?),
                3 => n_likes = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ExpandedPostView {
            post: post.ok_or(CodecError::MissingField(1, "post"))?,
            author: author.ok_or(CodecError::MissingField(2, "author"))?,
            n_likes: n_likes.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExpandedLike {
    pub like: Like,
    pub account: AccountView,
    pub post: ExpandedPostView,
}

#[derive(Debug, Clone, Default)]
pub struct LikeQuery {
    pub account_id: Option<i32>,
    pub post_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_round_trips() {
        let l = Like { id: 1, created_at: 100, account_id: 2, post_id: 3 };
        let decoded = Like::from_bytes(&l.to_bytes()).unwrap();
        assert_eq!(decoded, l);
    }

    #[test]
    fn converts_from_uniquepair() {
        let u = Uniquepair { id: 5, created_at: 10, domain: DOMAIN.to_string(), first_elem: 1, second_elem: 2 };
        let l = Like::from(u);
        assert_eq!(l, Like { id: 5, created_at: 10, account_id: 1, post_id: 2 });
    }

    #[test]
    fn expanded_post_view_round_trips() {
        let view = ExpandedPostView {
            post: PostView { id: 1, created_at: 10, active: true, text: "hi".to_string(), author_id: 9 },
            author: AccountView {
                id: 9,
                created_at: 5,
                active: true,
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: "A".to_string(),
                followed_by_you: false,
            },
            n_likes: 3,
        };
        let decoded = ExpandedPostView::from_bytes(&view.to_bytes()).unwrap();
        assert_eq!(decoded, view);
    }
}
