use crate::aad;
use crate::application::*;
use crate::context::{nonce, PendingRequest, SecurityContext};
use crate::crypto::*;
use crate::envelope::Envelope;
use crate::message::{Message, Role};
use crate::option_codec::encode_options;
use crate::partition::{integrity_options, split, Partition};
use crate::proto::*;
use crate::result::{ProtectError, Transform};
use crate::sequence::PartialIv;
use crate::store::{log, SecurityContextStore};
#[cfg(feature = "logging")]
use crate::LogEvent::*;

impl<C: CryptoLayer> SecurityContextStore<C> {
    /// Protect an outgoing message.
    ///
    /// Requests are protected under the context of their destination host, responses under the
    /// context that holds the pending request for their token.
    /// Returns `Transform::Forward` with the message untouched when it is not subject to
    /// protection: a request flagged with `Message::send_unsecured`, a response to a request that
    /// was not protected, or an empty message.
    ///
    /// If this returns an error nothing must be sent, and no context state has changed.
    ///
    /// * `app` - Interface to the application using the security engine
    /// * `message` - The message to protect
    pub fn protect<App: ApplicationLayer>(&self, mut app: App, mut message: Message) -> Result<Transform, ProtectError> {
        let context = match message.role() {
            Role::Empty => return Ok(Transform::Forward(message)),
            Role::Request => {
                if message.take_send_unsecured() {
                    log!(app, SentUnsecured { token: &message.token });
                    return Ok(Transform::Forward(message));
                }
                match self.by_host(&message.host) {
                    Some(c) => c,
                    None => {
                        log!(app, ProtectFailed(&ProtectError::NoSecurityContext));
                        return Err(ProtectError::NoSecurityContext);
                    }
                }
            }
            Role::Response => match self.by_token(&message.token, &message.host) {
                Some(c) => c,
                None => {
                    log!(app, ForwardedUnprotectedResponse { token: &message.token });
                    return Ok(Transform::Forward(message));
                }
            },
        };
        let result = protect_with::<C, _>(&mut app, &context, message);
        if let Err(_e) = &result {
            log!(app, ProtectFailed(_e));
        }
        result
    }
}

fn protect_with<C: CryptoLayer, App: ApplicationLayer>(
    app: &mut App,
    context: &SecurityContext,
    mut message: Message,
) -> Result<Transform, ProtectError> {
    let role = message.role();
    let notification = message.is_notification();
    let uses_sequence_number = role == Role::Request || notification;
    let current_time = app.time();

    // Held until every state change of this message is committed.
    let mut state = context.state.lock().unwrap();

    let sequence_number = state.sequence_number;
    let (partial_iv, kid): (PartialIv, Vec<u8>) = if uses_sequence_number {
        if sequence_number.next().is_none() {
            return Err(ProtectError::SequenceNumberExhausted);
        }
        (sequence_number.to_partial_iv(), context.sender_id().to_vec())
    } else {
        match state.pending.get(&message.token) {
            Some(record) => (record.partial_iv.clone(), record.kid.clone()),
            None => {
                // The record was consumed by another thread after the lookup.
                drop(state);
                log!(app, ForwardedUnprotectedResponse { token: &message.token });
                return Ok(Transform::Forward(message));
            }
        }
    };

    let Partition { outer, inner, dropped_proxy_uri } = split(std::mem::take(&mut message.options), role);
    if let Some(_uri) = &dropped_proxy_uri {
        log!(app, DroppedMalformedProxyUri(_uri));
    }

    let mut integrity = Vec::new();
    encode_options(&integrity_options(notification.then_some(sequence_number.value())), &mut integrity)
        .map_err(|_| ProtectError::EncodingFailed)?;
    let aad = aad::build(message.code, &integrity, context.algorithm(), &kid, &partial_iv)
        .map_err(|_| ProtectError::EncodingFailed)?;

    let mut sealed = Vec::new();
    encode_options(&inner, &mut sealed).map_err(|_| ProtectError::EncodingFailed)?;
    if !message.payload.is_empty() {
        sealed.push(PAYLOAD_MARKER);
        sealed.extend_from_slice(&message.payload);
    }
    let sender = context.sender();
    let nonce = nonce(&sender.base_iv, &partial_iv, !uses_sequence_number);
    let tag = C::Aead::encrypt_in_place(&sender.key, &nonce, &aad, &mut sealed).ok_or(ProtectError::EncryptionFailed)?;
    sealed.extend_from_slice(&tag);

    let envelope = Envelope {
        partial_iv: uses_sequence_number.then_some(&partial_iv[..]),
        kid: (role == Role::Request).then_some(context.sender_id()),
        ciphertext: &sealed,
    };
    let mut encoded = Vec::with_capacity(sealed.len() + 2 + MAX_PARTIAL_IV_SIZE + context.sender_id().len());
    envelope.encode(&mut encoded).map_err(|_| ProtectError::EncodingFailed)?;

    // Nothing below can fail.
    message.options = outer;
    if message.payload.is_empty() {
        message.options.set(OPTION_OBJECT_SECURITY, encoded);
    } else {
        message.options.set(OPTION_OBJECT_SECURITY, Vec::new());
        message.payload = encoded;
    }
    message.mark_security_processed();

    if uses_sequence_number {
        // Checked above.
        state.sequence_number = sequence_number.next().unwrap_or(sequence_number);
    }
    match (role, notification) {
        (Role::Request, _) => {
            let record = PendingRequest { partial_iv, kid, touched: current_time };
            let evicted = state.insert_pending(message.token.clone(), record, C::SETTINGS.max_pending_requests);
            drop(state);
            if let Some(_token) = evicted {
                log!(app, EvictedPendingRequest { host: context.host(), token: &_token });
            }
            log!(app, ProtectedRequest { host: context.host(), sequence_number: sequence_number.value() });
        }
        (_, true) => {
            if let Some(record) = state.pending.get_mut(&message.token) {
                record.touched = current_time;
            }
            drop(state);
            log!(app, ProtectedNotification { host: context.host(), sequence_number: sequence_number.value() });
        }
        (_, false) => {
            state.pending.remove(&message.token);
            drop(state);
            log!(app, ProtectedResponse { host: context.host() });
        }
    }
    Ok(Transform::Transformed(message))
}
