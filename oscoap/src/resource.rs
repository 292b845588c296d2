//! Access policy of the resources an endpoint serves.
use crate::message::{Code, Message, MessageType, Role};

/// Whether a resource may only be reached through protected requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourcePolicy {
    #[default]
    Unprotected,
    Protected,
}

/// Check a request that made it through `unprotect` against the policy of its resource.
///
/// Returns the error response to send instead of handling the request, if any:
/// 4.01 when a protected resource receives a request that was not protected, and 4.02 when an
/// unprotected resource receives a protected one. Confirmable requests get a piggybacked
/// acknowledgement, others a non-confirmable response.
pub fn check_resource_policy(policy: ResourcePolicy, request: &Message) -> Option<Message> {
    if request.role() != Role::Request {
        return None;
    }
    let (code, diagnostic) = match (policy, request.is_security_processed()) {
        (ResourcePolicy::Protected, false) => (Code::UNAUTHORIZED, "Resource requires object security"),
        (ResourcePolicy::Unprotected, true) => (Code::BAD_OPTION, "Resource does not support object security"),
        _ => return None,
    };
    let msg_type = if request.is_confirmable() { MessageType::Acknowledgement } else { MessageType::NonConfirmable };
    Some(request.reply(msg_type, code).with_payload(diagnostic))
}
