//! The Follow record (spec §3, §4.6): delegated entirely to Uniquepair under
//! domain `"follow"`, `first_elem = follower_id`, `second_elem = followee_id`.

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_uniquepair::Uniquepair;

pub const DOMAIN: &str = "follow";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Follow {
    pub id: i32,
    pub created_at: i32,
    pub follower_id: i32,
    pub followee_id: i32,
}

impl From<Uniquepair> for Follow {
    fn from(u: Uniquepair) -> Self {
        Follow {
            id: u.id,
            created_at: u.created_at,
            follower_id: u.first_elem,
            followee_id: u.second_elem,
        }
    }
}

impl Message for Follow {
    fn encode(&self, w: &mut Writer) {
        w.write_i32_field(1, self.id);
        w.write_i32_field(2, self.created_at);
        w.write_i32_field(3, self.follower_id);
        w.write_i32_field(4, self.followee_id);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut id = None;
        let mut created_at = None;
        let mut follower_id = None;
        let mut followee_id = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => id = Some(r.read_i32()?),
                2 => created_at = Some(r.read_i32()?),
                3 => follower_id = Some(r.read_i32()?),
                4 => followee_id = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(Follow {
            id: id.ok_or(CodecError::MissingField(1, "id"))?,
            created_at: created_at.ok_or(CodecError::MissingField(2, "created_at"))?,
            follower_id: follower_id.ok_or(CodecError::MissingField(3, "follower_id"))?,
            followee_id: followee_id.ok_or(CodecError::MissingField(4, "followee_id"))?,
        })
    }
}

/// Account view embedded in an expanded follow (spec §4.6): the same
/// "standard account" shape every consuming service embeds — see
/// `peer_account.rs` for why this is duplicated rather than shared.
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
pub struct ExpandedFollow {
    pub follow: Follow,
    pub follower: AccountView,
    pub followee: AccountView,
}

#[derive(Debug, Clone, Default)]
pub struct FollowQuery {
    pub follower_id: Option<i32>,
    pub followee_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_round_trips() {
        let f = Follow { id: 1, created_at: 100, follower_id: 2, followee_id: 3 };
        let decoded = Follow::from_bytes(&f.to_bytes()).unwrap();
        assert_eq!(decoded, f);
    }

    #[test]
    fn converts_from_uniquepair() {
        let u = Uniquepair { id: 5, created_at: 10, domain: DOMAIN.to_string(), first_elem: 1, second_elem: 2 };
        let f = Follow::from(u);
        assert_eq!(f, Follow { id: 5, created_at: 10, follower_id: 1, followee_id: 2 });
    }
}
