//! The generic exception every service falls back to when a handler fails in
//! a way it doesn't declare a typed variant for (spec §4.1, §7).

use crate::codec::{CodecError, Message, Reader, Writer};

/// Mirrors the Thrift `TApplicationException::TApplicationExceptionType`
/// codes the original BuzzBlog services relied on — the spec's distillation
/// only names the `(error_code, message)` shape, the full enum is a
/// supplemented detail (see `SPEC_FULL.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ApplicationExceptionKind {
    Unknown = 0,
    UnknownMethod = 1,
    InvalidMessageType = 2,
    WrongMethodName = 3,
    BadSequenceId = 4,
    MissingResult = 5,
    InternalError = 6,
    ProtocolError = 7,
}

impl ApplicationExceptionKind {
    fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::UnknownMethod,
            2 => Self::InvalidMessageType,
            3 => Self::WrongMethodName,
            4 => Self::BadSequenceId,
            5 => Self::MissingResult,
            6 => Self::InternalError,
            7 => Self::ProtocolError,
            _ => Self::Unknown,
        }
    }
}

/// Any unhandled runtime failure from a handler is surfaced to the caller as
/// this exception, never a raw panic or dropped connection.
#[derive(Debug, Clone)]
pub struct ApplicationException {
    pub error_code: ApplicationExceptionKind,
    pub message: String,
}

impl ApplicationException {
    pub fn new(error_code: ApplicationExceptionKind, message: impl Into<String>) -> Self {
        ApplicationException {
            error_code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApplicationExceptionKind::InternalError, message)
    }

    pub fn unknown_method(name: &str) -> Self {
        Self::new(
            ApplicationExceptionKind::UnknownMethod,
            format!("unknown method {name:?}"),
        )
    }
}

impl std::fmt::Display for ApplicationException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApplicationException({:?}): {}", self.error_code, self.message)
    }
}

impl std::error::Error for ApplicationException {}

/// Placeholder `Exc` for methods that declare no typed domain exception
/// (spec §4.1 lists none for Wordfilter, and some Trending/Uniquepair
/// methods). `decode` always fails so [`crate::client::ClientStub::call`]
/// falls through to [`ApplicationException`] on any `T_EXCEPTION` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoException;

impl std::fmt::Display for NoException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no declared exception")
    }
}

impl std::error::Error for NoException {}

impl Message for NoException {
    fn encode(&self, _w: &mut Writer) {}

    fn decode(_r: &mut Reader) -> Result<Self, CodecError> {
        Err(CodecError::MissingField(0, "no declared exception type"))
    }
}

impl Message for ApplicationException {
    fn encode(&self, w: &mut Writer) {
        w.write_string_field(1, &self.message);
        w.write_i32_field(2, self.error_code as i32);
    }

    fn decode(r: &mut Reader) -> Result<Self, CodecError> {
        let mut message = None;
        let mut error_code = ApplicationExceptionKind::Unknown;
        while let Some((id, ty)) = r.read_field_begin()? {
            match id {
                1 => message = Some(r.read_string()?),
                2 => error_code = ApplicationExceptionKind::from_i32(r.read_i32()?),
                _ => r.skip_value(ty)?,
            }
        }
        Ok(ApplicationException {
            error_code,
            message: message.unwrap_or_default(),
        })
    }
}
