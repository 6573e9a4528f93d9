//! Request/response wire structs for Wordfilter's single method (spec §4.11).

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_rpc::RequestMeta;

#[derive(Debug, Clone)]
pub struct IsValidWordRequest {
    pub meta: RequestMeta,
    pub word: String,
}

impl Message for IsValidWordRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_string_field(2, &self.word);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut word = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => word = Some(r.read_string()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(IsValidWordRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            word: word.ok_or(CodecError::MissingField(2, "word"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IsValidWordReply {
    pub valid: bool,
}

impl Message for IsValidWordReply {
    fn encode(&self, w: &mut Writer) {
        w.write_bool_field(1, self.valid);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut valid = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => valid = Some(r.read_bool()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(IsValidWordReply { valid: valid.unwrap_or(false) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips() {
        let req = IsValidWordRequest {
            meta: RequestMeta::new("r1", 3),
            word: "rust".to_string(),
        };
        let decoded = IsValidWordRequest::from_bytes(&req.to_bytes()).unwrap();
        assert_eq!(decoded.word, "rust");
        assert_eq!(decoded.meta, req.meta);
    }
}
