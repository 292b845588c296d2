use crate::message::{Code, Message, MessageType, Role};

/// A type of fault that occurred because we received a bad protected message.
///
/// An unauthenticated attacker can intentionally trigger any of these, so it is best to
/// treat these as raw user input that needs to be sanitized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultType {
    /// The Object-Security option appeared more than once.
    DuplicateSecurityMarker,
    /// The envelope was missing, badly framed, or placed in both the option and the payload.
    MalformedEnvelope,
    /// A request envelope did not name the key it was sealed with.
    MissingKeyId,
    /// No security context knows the key identifier of a request.
    UnknownKeyId,
    /// No security context has a pending request for the token of a response.
    /// Not necessarily an attack, the request may have been sent unprotected.
    UnknownToken,
    /// The sequence number was already accepted or fell behind the replay window.
    ReplayedCounter,
    /// A request or notification envelope carried no sequence number.
    MissingCounter,
    /// The message failed authentication.
    FailedAuth,
    /// The message authenticated but its protected options could not be decoded.
    MalformedPlaintext,
    /// The AAD could not be serialized.
    Internal,
}

/// How the transport should answer a rejected message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectAction {
    /// Drop the message silently.
    SendNothing,
    /// Answer with an empty message of the given type.
    SendEmpty(MessageType),
    /// Answer with a response carrying `code` and a short diagnostic payload.
    SendResponse { msg_type: MessageType, code: Code, diagnostic: &'static str },
}

impl RejectAction {
    /// The rejection policy. Every per-message fault is answered according to this table and
    /// nowhere else. Non-confirmable traffic is only ever answered for a malformed envelope.
    pub fn for_fault(fault: FaultType, role: Role, confirmable: bool) -> Self {
        use FaultType::*;
        use MessageType::*;
        use RejectAction::*;
        let respond = |code, diagnostic| SendResponse { msg_type: Acknowledgement, code, diagnostic };
        match (fault, role == Role::Request, confirmable) {
            (MalformedEnvelope, _, _) => SendEmpty(Reset),
            (MissingCounter, _, _) => SendNothing,
            (_, _, false) => SendNothing,
            (DuplicateSecurityMarker, true, _) => respond(Code::BAD_REQUEST, "Security option is not repeatable"),
            (DuplicateSecurityMarker, false, _) => SendEmpty(Reset),
            (MissingKeyId, _, _) => respond(Code::BAD_REQUEST, "Failed to decode COSE"),
            (UnknownKeyId, _, _) => respond(Code::UNAUTHORIZED, "Security context not found"),
            (UnknownToken, _, _) => SendEmpty(Acknowledgement),
            (ReplayedCounter, true, _) => respond(Code::BAD_REQUEST, "Replay protection failed"),
            (FailedAuth, true, _) => respond(Code::BAD_REQUEST, "Decryption failed"),
            (MalformedPlaintext, true, _) => respond(Code::BAD_OPTION, "Malformed protected options"),
            (Internal, true, _) => respond(Code::INTERNAL_SERVER_ERROR, "Internal error"),
            (ReplayedCounter | FailedAuth | MalformedPlaintext | Internal, false, _) => SendEmpty(Acknowledgement),
        }
    }
}

/// A protected message that was refused, and what to answer it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The type of fault that has occurred. Be cautious if you choose to read this
    /// value, as an attacker has control over it.
    pub fault: FaultType,
    pub action: RejectAction,
    /// The file of this implementation from which this rejection was generated.
    #[cfg(feature = "debug")]
    pub file: &'static str,
    /// The line number from which this rejection was generated. As such this number uniquely
    /// identifies each possible rejection.
    #[cfg(feature = "debug")]
    pub line: u32,
}

impl Rejection {
    /// Build the message the transport should send back for `received`, if any.
    pub fn reply(&self, received: &Message) -> Option<Message> {
        match &self.action {
            RejectAction::SendNothing => None,
            RejectAction::SendEmpty(msg_type) => Some(received.reply(*msg_type, Code::EMPTY)),
            RejectAction::SendResponse { msg_type, code, diagnostic } => {
                Some(received.reply(*msg_type, *code).with_payload(diagnostic.as_bytes()))
            }
        }
    }
}

macro_rules! fault {
    ($fault:expr, $message:expr) => {{
        let fault = $fault;
        crate::result::Rejection {
            #[cfg(feature = "debug")]
            file: file!(),
            #[cfg(feature = "debug")]
            line: line!(),
            action: crate::result::RejectAction::for_fault(fault, $message.role(), $message.is_confirmable()),
            fault,
        }
    }};
}
pub(crate) use fault;

/// The successful outcome of protecting or unprotecting a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// The message was not subject to security processing and is handed on unmodified.
    Forward(Message),
    /// The message was protected or unprotected.
    Transformed(Message),
}
impl Transform {
    pub fn into_message(self) -> Message {
        match self {
            Transform::Forward(m) | Transform::Transformed(m) => m,
        }
    }
    pub fn is_transformed(&self) -> bool {
        matches!(self, Transform::Transformed(_))
    }
}

/// An error that can occur when attempting to protect a message.
/// In every case nothing must be sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProtectError {
    /// There is no security context for the destination of a request.
    NoSecurityContext,
    /// The sender sequence number cannot grow any further. The context must be replaced.
    SequenceNumberExhausted,
    /// The AEAD refused to encrypt. This should never occur with valid key material.
    EncryptionFailed,
    /// The protected options, the AAD or the envelope could not be encoded.
    EncodingFailed,
}
