//! The error taxonomy every handler returns (spec §7): a typed domain
//! exception `E`, declared per service, or a generic infrastructure failure
//! that becomes an `ApplicationException` on the wire.

use buzzblog_rpc::codec::{Message, MessageType};
use buzzblog_rpc::{ApplicationException, ApplicationExceptionKind};

#[derive(Debug)]
pub enum ServiceError<E> {
    /// Part of the wire contract; round-trips as the service's own
    /// exception struct.
    Domain(E),
    /// Connect timeouts, pool exhaustion, unmapped backing-store failures —
    /// surfaced to the caller as a generic `ApplicationException`, never
    /// retried automatically (spec §7).
    Application(anyhow::Error),
}

impl<E> From<anyhow::Error> for ServiceError<E> {
    fn from(e: anyhow::Error) -> Self {
        ServiceError::Application(e)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for ServiceError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Domain(e) => write!(f, "{e}"),
            ServiceError::Application(e) => write!(f, "{e}"),
        }
    }
}

pub type ServiceResult<T, E> = Result<T, ServiceError<E>>;

/// Encodes a handler's result into the `(message_type, payload)` pair the
/// RPC server writes back, mapping `ServiceError::Application` onto a
/// generic `ApplicationException` (spec §4.1's "any unhandled runtime
/// failure... is surfaced as a generic ApplicationException").
pub fn encode_result<Rep, E>(result: ServiceResult<Rep, E>) -> (MessageType, Vec<u8>)
where
    Rep: Message,
    E: Message,
{
    match result {
        Ok(rep) => (MessageType::Reply, rep.to_bytes()),
        Err(ServiceError::Domain(e)) => (MessageType::Exception, e.to_bytes()),
        Err(ServiceError::Application(e)) => {
            (MessageType::Exception, ApplicationException::internal(e.to_string()).to_bytes())
        }
    }
}

/// Decodes `payload` into `Req`, runs `handler`, and encodes the result —
/// the one line every `RpcService::dispatch` match arm needs. A payload that
/// fails to decode never reaches the handler; it is reported as a
/// `ProtocolError` `ApplicationException` instead.
pub fn dispatch_call<Req, Rep, E>(
    payload: &[u8],
    handler: impl FnOnce(Req) -> ServiceResult<Rep, E>,
) -> (MessageType, Vec<u8>)
where
    Req: Message,
    Rep: Message,
    E: Message,
{
    match Req::from_bytes(payload) {
        Ok(req) => encode_result(handler(req)),
        Err(e) => (
            MessageType::Exception,
            ApplicationException::new(ApplicationExceptionKind::ProtocolError, e.to_string()).to_bytes(),
        ),
    }
}
