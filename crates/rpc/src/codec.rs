//! Binary struct/list/scalar encoding for the BuzzBlog wire protocol.
//!
//! The encoding is a small, custom field-tagged format in the spirit of the
//! Thrift binary protocol the original BuzzBlog services spoke (see
//! `buzzblog/gen/TWordfilterService.cpp` in the upstream C++ tree): every
//! struct is a sequence of `(field_id, field_type, value)` triples terminated
//! by a `Stop` marker, so a reader can skip field ids it doesn't recognize
//! instead of failing closed. Compatibility is by field id, never by name.

use std::fmt;

use thiserror::Error;

/// Wire tag for a field's payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FieldType {
    Stop = 0,
    Bool = 1,
    I32 = 2,
    String = 3,
    Struct = 4,
    List = 5,
}

impl FieldType {
    fn from_u8(b: u8) -> Result<Self, CodecError> {
        Ok(match b {
            0 => FieldType::Stop,
            1 => FieldType::Bool,
            2 => FieldType::I32,
            3 => FieldType::String,
            4 => FieldType::Struct,
            5 => FieldType::List,
            other => return Err(CodecError::UnknownFieldType(other)),
        })
    }
}

/// A `T_CALL` / `T_REPLY` / `T_EXCEPTION` message discriminator, carried in
/// every frame header alongside `(method_name, seqid)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Call = 1,
    Reply = 2,
    Exception = 3,
}

impl MessageType {
    pub fn from_u8(b: u8) -> Result<Self, CodecError> {
        Ok(match b {
            1 => MessageType::Call,
            2 => MessageType::Reply,
            3 => MessageType::Exception,
            other => return Err(CodecError::UnknownMessageType(other)),
        })
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unexpected end of buffer")]
    Eof,
    #[error("unknown field type tag {0}")]
    UnknownFieldType(u8),
    #[error("unknown message type tag {0}")]
    UnknownMessageType(u8),
    #[error("string field is not valid utf-8")]
    InvalidUtf8,
    #[error("missing required field {0} ({1})")]
    MissingField(u16, &'static str),
    #[error("frame exceeds maximum size ({0} > {1})")]
    FrameTooLarge(u32, u32),
}

/// Appends field-tagged values to an in-memory buffer.
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn field_header(&mut self, id: u16, ty: FieldType) {
        self.buf.push(ty as u8);
        self.buf.extend_from_slice(&id.to_be_bytes());
    }

    pub fn write_bool_field(&mut self, id: u16, v: bool) {
        self.field_header(id, FieldType::Bool);
        self.buf.push(v as u8);
    }

    pub fn write_i32_field(&mut self, id: u16, v: i32) {
        self.field_header(id, FieldType::I32);
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_string_field(&mut self, id: u16, v: &str) {
        self.field_header(id, FieldType::String);
        self.buf
            .extend_from_slice(&(v.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(v.as_bytes());
    }

    /// Writes a nested struct field by delegating to its own `encode`.
    pub fn write_struct_field(&mut self, id: u16, encode: impl FnOnce(&mut Writer)) {
        self.field_header(id, FieldType::Struct);
        let mut nested = Writer::new();
        encode(&mut nested);
        nested.buf.push(FieldType::Stop as u8);
        self.buf
            .extend_from_slice(&(nested.buf.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(&nested.buf);
    }

    /// Writes a list field whose elements are themselves structs.
    pub fn write_struct_list_field<T>(&mut self, id: u16, items: &[T], encode_one: impl Fn(&mut Writer, &T)) {
        self.field_header(id, FieldType::List);
        self.buf.push(FieldType::Struct as u8);
        self.buf
            .extend_from_slice(&(items.len() as u32).to_be_bytes());
        for item in items {
            let mut nested = Writer::new();
            encode_one(&mut nested, item);
            nested.buf.push(FieldType::Stop as u8);
            self.buf
                .extend_from_slice(&(nested.buf.len() as u32).to_be_bytes());
            self.buf.extend_from_slice(&nested.buf);
        }
    }

    /// Writes a list field of plain strings.
    pub fn write_string_list_field(&mut self, id: u16, items: &[String]) {
        self.field_header(id, FieldType::List);
        self.buf.push(FieldType::String as u8);
        self.buf
            .extend_from_slice(&(items.len() as u32).to_be_bytes());
        for item in items {
            self.buf
                .extend_from_slice(&(item.len() as u32).to_be_bytes());
            self.buf.extend_from_slice(item.as_bytes());
        }
    }

    pub fn write_stop(&mut self) {
        self.buf.push(FieldType::Stop as u8);
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads field-tagged values back out of a borrowed byte slice.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.pos + n > self.buf.len() {
            return Err(CodecError::Eof);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes(b.try_into().unwrap()))
    }

    /// Reads the next field header, returning `None` at the struct's `Stop` marker.
    pub fn read_field_begin(&mut self) -> Result<Option<(u16, FieldType)>, CodecError> {
        let ty = FieldType::from_u8(self.take(1)?[0])?;
        if ty == FieldType::Stop {
            return Ok(None);
        }
        let id_bytes = self.take(2)?;
        let id = u16::from_be_bytes(id_bytes.try_into().unwrap());
        Ok(Some((id, ty)))
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.take(1)?[0] != 0)
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        let b = self.take(4)?;
        Ok(i32::from_be_bytes(b.try_into().unwrap()))
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Reads a nested struct field's bytes and hands a sub-reader to `decode`.
    pub fn read_struct<T>(&mut self, decode: impl FnOnce(&mut Reader) -> Result<T, CodecError>) -> Result<T, CodecError> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        let mut nested = Reader::new(bytes);
        decode(&mut nested)
    }

    /// Reads a list of nested structs.
    pub fn read_struct_list<T>(
        &mut self,
        decode_one: impl Fn(&mut Reader) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        let _elem_ty = FieldType::from_u8(self.take(1)?[0])?;
        let len = self.u32()? as usize;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            let elem_len = self.u32()? as usize;
            let bytes = self.take(elem_len)?;
            let mut nested = Reader::new(bytes);
            out.push(decode_one(&mut nested)?);
        }
        Ok(out)
    }

    pub fn read_string_list(&mut self) -> Result<Vec<String>, CodecError> {
        let _elem_ty = FieldType::from_u8(self.take(1)?[0])?;
        let len = self.u32()? as usize;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.read_string()?);
        }
        Ok(out)
    }

    /// Skips a field's value without interpreting it, for forward
    /// compatibility with unknown field ids.
    pub fn skip_value(&mut self, ty: FieldType) -> Result<(), CodecError> {
        match ty {
            FieldType::Stop => {}
            FieldType::Bool => {
                self.take(1)?;
            }
            FieldType::I32 => {
                self.take(4)?;
            }
            FieldType::String => {
                let len = self.u32()? as usize;
                self.take(len)?;
            }
            FieldType::Struct => {
                let len = self.u32()? as usize;
                self.take(len)?;
            }
            FieldType::List => {
                let elem_ty = FieldType::from_u8(self.take(1)?[0])?;
                let len = self.u32()? as usize;
                for _ in 0..len {
                    match elem_ty {
                        FieldType::String | FieldType::Struct => {
                            let elem_len = self.u32()? as usize;
                            self.take(elem_len)?;
                        }
                        FieldType::Bool => {
                            self.take(1)?;
                        }
                        FieldType::I32 => {
                            self.take(4)?;
                        }
                        FieldType::List | FieldType::Stop => {}
                    }
                }
            }
        }
        Ok(())
    }
}

/// Implemented by every request, response, and exception struct so the
/// server/client loop can encode and decode it without knowing its shape.
pub trait Message: Sized {
    fn encode(&self, w: &mut Writer);
    fn decode(r: &mut Reader) -> Result<Self, CodecError>;

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.encode(&mut w);
        w.write_stop();
        w.into_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = Reader::new(bytes);
        Self::decode(&mut r)
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer").field("len", &self.buf.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        a: i32,
        b: String,
    }

    impl Message for Pair {
        fn encode(&self, w: &mut Writer) {
            w.write_i32_field(1, self.a);
            w.write_string_field(2, &self.b);
        }

        fn decode(r: &mut Reader) -> Result<Self, CodecError> {
            let mut a = None;
            let mut b = None;
            while let Some((id, ty)) = r.read_field_begin()? {
                match id {
                    1 => a = Some(r.read_i32()?),
                    2 => b = Some(r.read_string()?),
                    _ => r.skip_value(ty)?,
                }
            }
            Ok(Pair {
                a: a.ok_or(CodecError::MissingField(1, "a"))?,
                b: b.ok_or(CodecError::MissingField(2, "b"))?,
            })
        }
    }

    #[test]
    fn round_trips_a_struct() {
        let p = Pair { a: 42, b: "hello".into() };
        let bytes = p.to_bytes();
        let decoded = Pair::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.a, 42);
        assert_eq!(decoded.b, "hello");
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let mut w = Writer::new();
        w.write_i32_field(1, 7);
        w.write_bool_field(99, true); // unknown to `Pair`
        w.write_string_field(2, "x");
        w.write_stop();
        let decoded = Pair::from_bytes(&w.into_bytes()).unwrap();
        assert_eq!(decoded.a, 7);
        assert_eq!(decoded.b, "x");
    }

    #[test]
    fn missing_required_field_errors() {
        let mut w = Writer::new();
        w.write_i32_field(1, 7);
        w.write_stop();
        let err = Pair::from_bytes(&w.into_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::MissingField(2, _)));
    }
}
