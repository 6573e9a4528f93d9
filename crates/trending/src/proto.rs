//! Request/response wire structs for Trending's two methods (spec §4.10).

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_rpc::RequestMeta;

#[derive(Debug, Clone)]
pub struct ProcessPostRequest {
    pub meta: RequestMeta,
    pub text: String,
}

impl Message for ProcessPostRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_string_field(2, &self.text);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut text = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => text = Some(r.read_string()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ProcessPostRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            text: text.ok_or(CodecError::MissingField(2, "text"))?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessPostReply;

impl Message for ProcessPostReply {
    fn encode(&self, _w: &mut Writer) {}
    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        while let Some((_, ty)) = r.read_field_begin()? {
            r.skip_value(ty)?;
        }
        Ok(ProcessPostReply)
    }
}

#[derive(Debug, Clone)]
pub struct FetchTrendingHashtagsRequest {
    pub meta: RequestMeta,
    pub limit: i32,
}

impl Message for FetchTrendingHashtagsRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_i32_field(2, self.limit);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut limit = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => limit = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(FetchTrendingHashtagsRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            limit: limit.ok_or(CodecError::MissingField(2, "limit"))?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchTrendingHashtagsReply {
    pub hashtags: Vec<String>,
}

impl Message for FetchTrendingHashtagsReply {
    fn encode(&self, w: &mut Writer) {
        w.write_string_list_field(1, &self.hashtags);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut hashtags = Vec::new();
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => hashtags = r.read_string_list()?,
                _ => r.skip_value(ty)?,
            }
        }
        Ok(FetchTrendingHashtagsReply { hashtags })
    }
}
