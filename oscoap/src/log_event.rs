use crate::result::{ProtectError, Rejection};

/// Events that might be interesting to log or aggregate into metrics.
#[allow(missing_docs)]
#[derive(Debug)]
pub enum LogEvent<'a> {
    /// A request flagged to be sent unsecured bypassed protection.
    SentUnsecured { token: &'a [u8] },
    /// A response to a request that was not protected is sent as is.
    ForwardedUnprotectedResponse { token: &'a [u8] },
    ProtectedRequest { host: &'a str, sequence_number: u64 },
    ProtectedResponse { host: &'a str },
    ProtectedNotification { host: &'a str, sequence_number: u64 },
    ProtectFailed(&'a ProtectError),
    /// A message without an Object-Security option was received and passed through.
    ReceivedUnprotected { token: &'a [u8] },
    UnprotectedRequest { host: &'a str, sequence_number: u64 },
    UnprotectedResponse { host: &'a str },
    UnprotectedNotification { host: &'a str, sequence_number: u64 },
    Rejected(&'a Rejection),
    /// A Proxy-Uri that could not be parsed was removed from an outgoing request.
    DroppedMalformedProxyUri(&'a [u8]),
    /// A request correlation record was dropped before its response arrived.
    EvictedPendingRequest { host: &'a str, token: &'a [u8] },
}
