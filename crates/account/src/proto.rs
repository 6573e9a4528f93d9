//! Request/response wire structs for each Account method (spec §4.5).

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_rpc::RequestMeta;

use crate::domain::{AccountQuery, AccountView, ExpandedAccount};

#[derive(Debug, Clone)]
pub struct AuthenticateUserRequest {
    pub meta: RequestMeta,
    pub username: String,
    pub password: String,
}

impl Message for AuthenticateUserRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_string_field(2, &self.username);
        w.write_string_field(3, &self.password);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut username = None;
        let mut password = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => username = Some(r.read_string()?),
                3 => password = Some(r.read_string()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(AuthenticateUserRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            username: username.ok_or(CodecError::MissingField(2, "username"))?,
            password: password.ok_or(CodecError::MissingField(3, "password"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateAccountRequest {
    pub meta: RequestMeta,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Message for CreateAccountRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_string_field(2, &self.username);
        w.write_string_field(3, &self.password);
        w.write_string_field(4, &self.first_name);
        w.write_string_field(5, &self.last_name);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut username = None;
        let mut password = None;
        let mut first_name = None;
        let mut last_name = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => username = Some(r.read_string()?),
                3 => password = Some(r.read_string()?),
                4 => first_name = Some(r.read_string()?),
                5 => last_name = Some(r.read_string()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(CreateAccountRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            username: username.ok_or(CodecError::MissingField(2, "username"))?,
            password: password.ok_or(CodecError::MissingField(3, "password"))?,
            first_name: first_name.ok_or(CodecError::MissingField(4, "first_name"))?,
            last_name: last_name.ok_or(CodecError::MissingField(5, "last_name"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UpdateAccountRequest {
    pub meta: RequestMeta,
    pub id: i32,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Message for UpdateAccountRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_i32_field(2, self.id);
        w.write_string_field(3, &self.password);
        w.write_string_field(4, &self.first_name);
        w.write_string_field(5, &self.last_name);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut id = None;
        let mut password = None;
        let mut first_name = None;
        let mut last_name = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => id = Some(r.read_i32()?),
                3 => password = Some(r.read_string()?),
                4 => first_name = Some(r.read_string()?),
                5 => last_name = Some(r.read_string()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(UpdateAccountRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            id: id.ok_or(CodecError::MissingField(2, "id"))?,
            password: password.ok_or(CodecError::MissingField(3, "password"))?,
            first_name: first_name.ok_or(CodecError::MissingField(4, "first_name"))?,
            last_name: last_name.ok_or(CodecError::MissingField(5, "last_name"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AccountReply {
    pub account: AccountView,
}

impl Message for AccountReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.account.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut account = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => account = Some(r.read_struct(AccountView::decode)?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(AccountReply {
            account: account.ok_or(CodecError::MissingField(1, "account"))?,
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
pub struct ExpandedAccountReply {
    pub account: ExpandedAccount,
}

impl Message for ExpandedAccountReply {
    fn encode(&self, w: &mut Writer) {
        let a = &self.account;
        w.write_struct_field(1, |w| a.account.encode(w));
        w.write_bool_field(2, a.follows_you);
        w.write_i32_field(3, a.n_followers);
        w.write_i32_field(4, a.n_followees);
        w.write_i32_field(5, a.n_posts);
        w.write_i32_field(6, a.n_likes);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut account = None;
        let mut follows_you = None;
        let mut n_followers = None;
        let mut n_followees = None;
        let mut n_posts = None;
        let mut n_likes = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => account = Some(r.read_struct(AccountView::decode)?),
                2 => follows_you = Some(r.read_bool()?),
                3 => n_followers = Some(r.read_i32()?),
                4 => n_followees = Some(r.read_i32()?),
                5 => n_posts = Some(r.read_i32()?),
                6 => n_likes = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ExpandedAccountReply {
            account: ExpandedAccount {
                account: account.ok_or(CodecError::MissingField(1, "account"))?,
                follows_you: follows_you.unwrap_or(false),
                n_followers: n_followers.unwrap_or(0),
                n_followees: n_followees.unwrap_or(0),
                n_posts: n_posts.unwrap_or(0),
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
pub struct ListAccountsRequest {
    pub meta: RequestMeta,
    pub query: AccountQuery,
    pub limit: i32,
    pub offset: i32,
}

impl Message for ListAccountsRequest {
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
        Ok(ListAccountsRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            query: query.ok_or(CodecError::MissingField(2, "query"))?,
            limit: limit.ok_or(CodecError::MissingField(3, "limit"))?,
            offset: offset.ok_or(CodecError::MissingField(4, "offset"))?,
        })
    }
}

fn encode_query(query: &AccountQuery, w: &mut Writer) {
    if let Some(v) = &query.username {
        w.write_string_field(1, v);
    }
}

fn decode_query(r: &mut Reader) -> Result<AccountQuery, CodecError> {
    let mut username = None;
    while let Some((field_id, ty)) = r.read_field_begin()? {
        match field_id {
            1 => username = Some(r.read_string()?),
            _ => r.skip_value(ty)?,
        }
    }
    Ok(AccountQuery { username })
}

#[derive(Debug, Clone, Default)]
pub struct ListAccountsReply {
    pub accounts: Vec<ExpandedAccount>,
}

impl Message for ListAccountsReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_list_field(1, &self.accounts, |w, item| {
            w.write_struct_field(1, |w| item.account.encode(w));
            w.write_bool_field(2, item.follows_you);
            w.write_i32_field(3, item.n_followers);
            w.write_i32_field(4, item.n_followees);
            w.write_i32_field(5, item.n_posts);
            w.write_i32_field(6, item.n_likes);
        });
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut accounts = Vec::new();
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => {
                    accounts = r.read_struct_list(|r| {
                        let mut account = None;
                        let mut follows_you = None;
                        let mut n_followers = None;
                        let mut n_followees = None;
                        let mut n_posts = None;
                        let mut n_likes = None;
                        while let Some((field_id, ty)) = r.read_field_begin()? {
                            match field_id {
                                1 => account = Some(r.read_struct(AccountView::decode)?),
                                2 => follows_you = Some(r.read_bool()?),
                                3 => n_followers = Some(r.read_i32()?),
                                4 => n_followees = Some(r.read_i32()?),
                                5 => n_posts = Some(r.read_i32()?),
                                6 => n_likes = Some(r.read_i32()?),
                                _ => r.skip_value(ty)?,
                            }
                        }
                        Ok(ExpandedAccount {
                            account: account.ok_or(CodecError::MissingField(1, "account"))?,
                            follows_you: follows_you.unwrap_or(false),
                            n_followers: n_followers.unwrap_or(0),
                            n_followees: n_followees.unwrap_or(0),
                            n_posts: n_posts.unwrap_or(0),
                            n_likes: n_likes.unwrap_or(0),
                        })
                    })?
                }
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ListAccountsReply { accounts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticate_user_request_round_trips() {
        let req = AuthenticateUserRequest {
            meta: RequestMeta::new("r1", 0),
            username: "alice".to_string(),
            password: "pw".to_string(),
        };
        let decoded = AuthenticateUserRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(decoded.username, "alice");
    }

    #[test]
    fn list_accounts_query_omits_absent_username() {
        let req = ListAccountsRequest {
            meta: RequestMeta::new("r1", 0),
            query: AccountQuery { username: None },
            limit: 10,
            offset: 0,
        };
        let decoded = ListAccountsRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(decoded.query.username, None);
    }
}
