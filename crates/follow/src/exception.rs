//! Declared domain exceptions for Follow (spec §4.1): `AlreadyExists`,
//! `NotFound`, `NotAuthorized`, `InvalidAttributes`.

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FollowException {
    #[error("follow already exists: {0}")]
    AlreadyExists(String),
    #[error("follow not found: {0}")]
    NotFound(String),
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    #[error("invalid attributes: {0}")]
    InvalidAttributes(String),
}

impl Message for FollowException {
    fn encode(&self, w: &mut Writer) {
        let (kind, message) = match self {
            FollowException::AlreadyExists(m) => (1, m),
            FollowException::NotFound(m) => (2, m),
            FollowException::NotAuthorized(m) => (3, m),
            FollowException::InvalidAttributes(m) => (4, m),
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
            1 => FollowException::AlreadyExists(message),
            2 => FollowException::NotFound(message),
            3 => FollowException::NotAuthorized(message),
            _ => FollowException::InvalidAttributes(message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_each_variant() {
        for exc in [
            FollowException::AlreadyExists("(1, 2)".to_string()),
            FollowException::NotFound("id 9".to_string()),
            FollowException::NotAuthorized("requester 2 != follower 1".to_string()),
            FollowException::InvalidAttributes("followee_id == requester_id".to_string()),
        ] {
            let decoded = FollowException::from_bytes(&exc.to_bytes()).unwrap();
            assert_eq!(decoded, exc);
        }
    }
}
