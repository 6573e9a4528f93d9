//! The request-metadata envelope carried on every RPC (spec §3, §4.3).

use crate::codec::{CodecError, Message, Reader, Writer};

/// Sentinel `requester_id` for unauthenticated/system-originated calls.
pub const ANONYMOUS_REQUESTER: i32 = -1;

/// `(id, requester_id)` attached to every call and propagated verbatim into
/// every nested RPC a handler issues, for cross-service correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    /// Opaque id, unique per top-level user request.
    pub id: String,
    /// Authenticated caller's account id, or [`ANONYMOUS_REQUESTER`].
    pub requester_id: i32,
}

impl RequestMeta {
    pub fn new(id: impl Into<String>, requester_id: i32) -> Self {
        RequestMeta {
            id: id.into(),
            requester_id,
        }
    }

    /// Derives a metadata envelope for a nested call: same `id`, same
    /// `requester_id`. Kept as a named constructor so call sites read as
    /// "propagate", not "copy".
    pub fn propagate(&self) -> Self {
        self.clone()
    }
}

impl Message for RequestMeta {
    fn encode(&self, w: &mut Writer) {
        w.write_string_field(1, &self.id);
        w.write_i32_field(2, self.requester_id);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut id = None;
        let mut requester_id = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => id = Some(r.read_string()?),
                2 => requester_id = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(RequestMeta {
            id: id.ok_or(CodecError::MissingField(1, "id"))?,
            requester_id: requester_id.ok_or(CodecError::MissingField(2, "requester_id"))?,
        })
    }
}
