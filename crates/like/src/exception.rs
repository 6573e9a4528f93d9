//! Declared domain exceptions for Like (spec §4.1): `AlreadyExists`,
//! `NotFound`, `NotAuthorized`.

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LikeException {
    #[error("like already exists: {0}")]
    AlreadyExists(String),
    #[error("like not found: {0}")]
    NotFound(String),
    #[error("not authorized: {0}")]
    NotAuthorized(String),
}

impl Message for LikeException {
    fn encode(&self, w: &mut Writer) {
        let (kind, message) = match self {
            LikeException::AlreadyExists(m) => (1, m),
            LikeException::NotFound(m) => (2, m),
            LikeException::NotAuthorized(m) => (3, m),
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
            1 => LikeException::AlreadyExists(message),
            2 => LikeException::NotFound(message),
            _ => LikeException::NotAuthorized(message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_each_variant() {
        for exc in [
            LikeException::AlreadyExists("(1, 2)".to_string()),
            LikeException::NotFound("id 9".to_string()),
            LikeException::NotAuthorized("requester 2 != account 1".to_string()),
        ] {
            let decoded = LikeException::from_bytes(&exc.to_bytes()).unwrap();
            assert_eq!(decoded, exc);
        }
    }
}
