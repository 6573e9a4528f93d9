//! The Post record (spec §3, §4.8): owned by the post database.

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i32,
    pub created_at: i32,
    pub active: bool,
    pub text: String,
    pub author_id: i32,
}

impl Message for Post {
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
        Ok(Post {
            id: id.ok_or(CodecError::MissingField(1, "id"))?,
            created_at: created_at.ok_or(CodecError::MissingField(2, "created_at"))?,
            active: active.ok_or(CodecError::MissingField(3, "active"))?,
            text: text.ok_or(CodecError::MissingField(4, "text"))?,
            author_id: author_id.ok_or(CodecError::MissingField(5, "author_id"))?,
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

#[derive(Debug, Clone)]
pub struct ExpandedPost {
    pub post: Post,
    pub author: AccountView,
    pub n_likes: i32,
}

#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub author_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_round_trips() {
        let p = Post { id: 1, created_at: 100, active: true, text: "hello".to_string(), author_id: 3 };
        let decoded = Post::from_bytes(&p.to_bytes()).unwrap();
        assert_eq!(decoded, p);
    }
}
