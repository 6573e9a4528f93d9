//! Declared domain exceptions for Account (spec §4.1): `InvalidCredentials`,
//! `Deactivated`, `UsernameAlreadyExists`, `InvalidAttributes`,
//! `NotAuthorized`, `NotFound`.

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountException {
    #[error("invalid credentials")]
    InvalidCredentials(String),
    #[error("account deactivated: {0}")]
    Deactivated(String),
    #[error("username already exists: {0}")]
    UsernameAlreadyExists(String),
    #[error("invalid attributes: {0}")]
    InvalidAttributes(String),
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    #[error("account not found: {0}")]
    NotFound(String),
}

impl Message for AccountException {
    fn encode(&self, w: &mut Writer) {
        let (kind, message) = match self {
            AccountException::InvalidCredentials(m) => (1, m),
            AccountException::Deactivated(m) => (2, m),
            AccountException::UsernameAlreadyExists(m) => (3, m),
            AccountException::InvalidAttributes(m) => (4, m),
            AccountException::NotAuthorized(m) => (5, m),
            AccountException::NotFound(m) => (6, m),
        };
        w.write_i32_field(1, kind);
        w.write_string_field(2, message);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut kind = None;
        let mut message = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => kind = Some(r.read_i32()?),
                2 => message = Some(r.read_string()?),
                _ => r.skip_value(ty)?,
            }
        }
        let kind = kind.ok_or(CodecError::MissingField(1, "kind"))?;
        let message = message.unwrap_or_default();
        Ok(match kind {
            1 => AccountException::InvalidCredentials(message),
            2 => AccountException::Deactivated(message),
            3 => AccountException::UsernameAlreadyExists(message),
            4 => AccountException::InvalidAttributes(message),
            5 => AccountException::NotAuthorized(message),
            _ => AccountException::NotFound(message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_each_variant() {
        for exc in [
            AccountException::InvalidCredentials("bad password".to_string()),
            AccountException::Deactivated("account 1".to_string()),
            AccountException::UsernameAlreadyExists("alice".to_string()),
            AccountException::InvalidAttributes("username length 0".to_string()),
            AccountException::NotAuthorized("requester 2 != account 1".to_string()),
            AccountException::NotFound("id 9".to_string()),
        ] {
            let decoded = AccountException::from_bytes(&exc.to_bytes()).unwrap();
            assert_eq!(decoded, exc);
        }
    }
}
