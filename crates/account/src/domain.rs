//! The Account record (spec §3, §4.5): owned by the account database.

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i32,
    pub created_at: i32,
    pub active: bool,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// The "standard account" wire shape returned to callers: never carries the
/// stored password, adds the single `followed_by_you` relationship flag.
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

impl From<&Account> for AccountView {
    fn from(a: &Account) -> Self {
        AccountView {
            id: a.id,
            created_at: a.created_at,
            active: a.active,
            username: a.username.clone(),
            first_name: a.first_name.clone(),
            last_name: a.last_name.clone(),
            followed_by_you: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpandedAccount {
    pub account: AccountView,
    pub follows_you: bool,
    pub n_followers: i32,
    pub n_followees: i32,
    pub n_posts: i32,
    pub n_likes: i32,
}

#[derive(Debug, Clone, Default)]
pub struct AccountQuery {
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_view_round_trips() {
        let v = AccountView {
            id: 1,
            created_at: 100,
            active: true,
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "A".to_string(),
            followed_by_you: true,
        };
        let decoded = AccountView::from_bytes(&v.to_bytes()).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn converts_from_account_without_password() {
        let a = Account {
            id: 1,
            created_at: 100,
            active: true,
            username: "alice".to_string(),
            password: "secret".to_string(),
            first_name: "Alice".to_string(),
            last_name: "A".to_string(),
        };
        let view = AccountView::from(&a);
        assert_eq!(view.username, "alice");
        assert!(!view.followed_by_you);
    }
}
