//! Length-prefixed framing and the per-call `(method_name, message_type,
//! seqid)` header (spec §4.1).

use std::io::{self, Read, Write};

use crate::codec::{CodecError, MessageType};

/// Frames above this size are rejected; guards against a corrupt or hostile
/// length prefix causing an unbounded allocation.
pub const MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

pub struct Header {
    pub method_name: String,
    pub message_type: MessageType,
    pub seqid: i32,
}

impl Header {
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.method_name.len() as u32).to_be_bytes());
        out.extend_from_slice(self.method_name.as_bytes());
        out.push(self.message_type as u8);
        out.extend_from_slice(&self.seqid.to_be_bytes());
    }

    pub fn decode(buf: &[u8]) -> Result<(Self, usize), CodecError> {
        if buf.len() < 4 {
            return Err(CodecError::Eof);
        }
        let name_len = u32::from_be_bytes(buf[0..4].try_into().unwrap()) as usize;
        let mut pos = 4;
        if buf.len() < pos + name_len + 1 + 4 {
            return Err(CodecError::Eof);
        }
        let method_name = String::from_utf8(buf[pos..pos + name_len].to_vec())
            .map_err(|_| CodecError::InvalidUtf8)?;
        pos += name_len;
        let message_type = MessageType::from_u8(buf[pos])?;
        pos += 1;
        let seqid = i32::from_be_bytes(buf[pos..pos + 4].try_into().unwrap());
        pos += 4;
        Ok((
            Header {
                method_name,
                message_type,
                seqid,
            },
            pos,
        ))
    }
}

/// Writes one length-prefixed frame (header bytes followed by payload bytes)
/// to `stream` and flushes it.
pub fn write_frame(stream: &mut impl Write, header: &Header, payload: &[u8]) -> io::Result<()> {
    let mut body = Vec::with_capacity(16 + header.method_name.len() + payload.len());
    header.encode(&mut body);
    body.extend_from_slice(payload);
    stream.write_all(&(body.len() as u32).to_be_bytes())?;
    stream.write_all(&body)?;
    stream.flush()
}

/// Reads one length-prefixed frame from `stream`, splitting it into its
/// header and remaining payload bytes. Returns `Ok(None)` on a clean EOF
/// before any bytes of a new frame arrive (the normal way a connection ends).
pub fn read_frame(stream: &mut impl Read) -> io::Result<Option<(Header, Vec<u8>)>> {
    let mut len_buf = [0u8; 4];
    match read_exact_or_eof(stream, &mut len_buf)? {
        false => return Ok(None),
        true => {}
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            CodecError::FrameTooLarge(len, MAX_FRAME_SIZE),
        ));
    }
    let mut body = vec![0u8; len as usize];
    stream.read_exact(&mut body)?;
    let (header, consumed) = Header::decode(&body)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let payload = body[consumed..].to_vec();
    Ok(Some((header, payload)))
}

/// Like `Read::read_exact`, but distinguishes "zero bytes were available"
/// (clean EOF, function returns `Ok(false)`) from a partial read ending the
/// connection mid-frame (an error).
fn read_exact_or_eof(stream: &mut impl Read, buf: &mut [u8]) -> io::Result<bool> {
    let mut read = 0;
    while read < buf.len() {
        match stream.read(&mut buf[read..]) {
            Ok(0) => {
                return if read == 0 {
                    Ok(false)
                } else {
                    Err(io::Error::from(io::ErrorKind::UnexpectedEof))
                }
            }
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn frame_round_trips() {
        let header = Header {
            method_name: "get".into(),
            message_type: MessageType::Call,
            seqid: 5,
        };
        let mut buf = Vec::new();
        write_frame(&mut buf, &header, b"payload").unwrap();

        let mut cursor = Cursor::new(buf);
        let (decoded, payload) = read_frame(&mut cursor).unwrap().unwrap();
        assert_eq!(decoded.method_name, "get");
        assert_eq!(decoded.seqid, 5);
        assert_eq!(payload, b"payload");
    }

    #[test]
    fn empty_stream_is_clean_eof() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }
}
