//! Request/response wire structs for each Uniquepair method (spec §4.9).

use buzzblog_rpc::codec::{CodecError, Message, Reader, Writer};
use buzzblog_rpc::RequestMeta;

use crate::domain::{Uniquepair, UniquepairQuery};

macro_rules! decode_loop {
    ($r:expr, $($id:literal => $slot:ident = $read:ident),+ $(,)?) => {
        $(let mut $slot = None;)+
        while let Some((field_id, ty)) = $r.read_field_begin()? {
            match field_id {
                $($id => $slot = Some($r.$read()?),)+
                _ => $r.skip_value(ty)?,
            }
        }
    };
}

#[derive(Debug, Clone)]
pub struct GetRequest {
    pub meta: RequestMeta,
    pub id: i32,
}

impl Message for GetRequest {
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
        Ok(GetRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            id: id.ok_or(CodecError::MissingField(2, "id"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AddRequest {
    pub meta: RequestMeta,
    pub domain: String,
    pub first_elem: i32,
    pub second_elem: i32,
}

impl Message for AddRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_string_field(2, &self.domain);
        w.write_i32_field(3, self.first_elem);
        w.write_i32_field(4, self.second_elem);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut domain = None;
        let mut first_elem = None;
        let mut second_elem = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => domain = Some(r.read_string()?),
                3 => first_elem = Some(r.read_i32()?),
                4 => second_elem = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(AddRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            domain: domain.ok_or(CodecError::MissingField(2, "domain"))?,
            first_elem: first_elem.ok_or(CodecError::MissingField(3, "first_elem"))?,
            second_elem: second_elem.ok_or(CodecError::MissingField(4, "second_elem"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RemoveRequest {
    pub meta: RequestMeta,
    pub id: i32,
}

impl Message for RemoveRequest {
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
        Ok(RemoveRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            id: id.ok_or(CodecError::MissingField(2, "id"))?,
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
pub struct FindRequest {
    pub meta: RequestMeta,
    pub domain: String,
    pub first_elem: i32,
    pub second_elem: i32,
}

impl Message for FindRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_string_field(2, &self.domain);
        w.write_i32_field(3, self.first_elem);
        w.write_i32_field(4, self.second_elem);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut domain = None;
        let mut first_elem = None;
        let mut second_elem = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => domain = Some(r.read_string()?),
                3 => first_elem = Some(r.read_i32()?),
                4 => second_elem = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(FindRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            domain: domain.ok_or(CodecError::MissingField(2, "domain"))?,
            first_elem: first_elem.ok_or(CodecError::MissingField(3, "first_elem"))?,
            second_elem: second_elem.ok_or(CodecError::MissingField(4, "second_elem"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FindReply {
    pub present: bool,
}

impl Message for FindReply {
    fn encode(&self, w: &mut Writer) {
        w.write_bool_field(1, self.present);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        decode_loop!(r, 1 => present = read_bool);
        Ok(FindReply {
            present: present.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone)]
pub struct UniquepairReply {
    pub item: Uniquepair,
}

impl Message for UniquepairReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.item.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut item = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => item = Some(r.read_struct(Uniquepair::decode)?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(UniquepairReply {
            item: item.ok_or(CodecError::MissingField(1, "item"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub meta: RequestMeta,
    pub query: UniquepairQuery,
    pub limit: i32,
    pub offset: i32,
}

impl Message for FetchRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_struct_field(2, |w| self.query.encode(w));
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
                2 => query = Some(r.read_struct(UniquepairQuery::decode)?),
                3 => limit = Some(r.read_i32()?),
                4 => offset = Some(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(FetchRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            query: query.ok_or(CodecError::MissingField(2, "query"))?,
            limit: limit.ok_or(CodecError::MissingField(3, "limit"))?,
            offset: offset.ok_or(CodecError::MissingField(4, "offset"))?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchReply {
    pub items: Vec<Uniquepair>,
}

impl Message for FetchReply {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_list_field(1, &self.items, |w, item| item.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut items = Vec::new();
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => items = r.read_struct_list(Uniquepair::decode)?,
                _ => r.skip_value(ty)?,
            }
        }
        Ok(FetchReply { items })
    }
}

#[derive(Debug, Clone)]
pub struct CountRequest {
    pub meta: RequestMeta,
    pub query: UniquepairQuery,
}

impl Message for CountRequest {
    fn encode(&self, w: &mut Writer) {
        w.write_struct_field(1, |w| self.meta.encode(w));
        w.write_struct_field(2, |w| self.query.encode(w));
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut meta = None;
        let mut query = None;
        while let Some((field_id, ty)) = r.read_field_begin()? {
            match field_id {
                1 => meta = Some(r.read_struct(RequestMeta::decode)?),
                2 => query = Some(r.read_struct(UniquepairQuery::decode)?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(CountRequest {
            meta: meta.ok_or(CodecError::MissingField(1, "meta"))?,
            query: query.ok_or(CodecError::MissingField(2, "query"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CountReply {
    pub count: i32,
}

impl Message for CountReply {
    fn encode(&self, w: &mut Writer) {
        w.write_i32_field(1, self.count);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        decode_loop!(r, 1 => count = read_i32);
        Ok(CountReply {
            count: count.unwrap_or(0),
        })
    }
}
