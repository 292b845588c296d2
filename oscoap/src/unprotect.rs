use crate::aad;
use crate::application::*;
use crate::context::{nonce, PendingRequest, SecurityContext};
use crate::crypto::*;
use crate::envelope::Envelope;
use crate::message::{Message, Role};
use crate::option_codec::{decode_options, encode_options};
use crate::partition::{integrity_options, merge};
use crate::proto::*;
use crate::result::{fault, FaultType, Rejection, Transform};
use crate::sequence::{PartialIv, SequenceNumber};
use crate::store::{log, SecurityContextStore};
#[cfg(feature = "logging")]
use crate::LogEvent::*;

impl<C: CryptoLayer> SecurityContextStore<C> {
    /// Unprotect a received message.
    ///
    /// Returns `Transform::Forward` with the message untouched if it carries no Object-Security
    /// option. Whether an unprotected message may reach a resource is for the application to
    /// decide, see `resource::check_resource_policy`.
    ///
    /// If this returns a `Rejection`, the message must be dropped and `Rejection::reply` says
    /// what, if anything, to answer. Context state only changes once a message has been
    /// authenticated, so a rejected message never leaves a trace.
    ///
    /// * `app` - Interface to the application using the security engine
    /// * `message` - The message as it was received
    pub fn unprotect<App: ApplicationLayer>(&self, mut app: App, message: Message) -> Result<Transform, Rejection> {
        let result = self.unprotect_inner(&mut app, message);
        if let Err(_r) = &result {
            log!(app, Rejected(_r));
        }
        result
    }

    fn unprotect_inner<App: ApplicationLayer>(&self, app: &mut App, message: Message) -> Result<Transform, Rejection> {
        use FaultType::*;
        match message.options.count(OPTION_OBJECT_SECURITY) {
            0 => {
                log!(app, ReceivedUnprotected { token: &message.token });
                return Ok(Transform::Forward(message));
            }
            1 => {}
            _ => return Err(fault!(DuplicateSecurityMarker, message)),
        }
        let role = message.role();
        if role == Role::Empty {
            return Err(fault!(MalformedEnvelope, message));
        }
        let marker = message.options.get(OPTION_OBJECT_SECURITY).unwrap_or_default();
        let raw = match (marker.is_empty(), message.payload.is_empty()) {
            (true, false) => message.payload.clone(),
            (false, true) => marker.to_vec(),
            _ => return Err(fault!(MalformedEnvelope, message)),
        };
        let envelope = Envelope::decode(&raw).map_err(|_| fault!(MalformedEnvelope, message))?;

        let context = match role {
            Role::Request => {
                let kid = envelope.kid.ok_or_else(|| fault!(MissingKeyId, message))?;
                self.by_recipient_id(kid).ok_or_else(|| fault!(UnknownKeyId, message))?
            }
            _ => self.by_token(&message.token, &message.host).ok_or_else(|| fault!(UnknownToken, message))?,
        };
        unprotect_with::<C, _>(app, &context, &envelope, message)
    }
}

fn unprotect_with<C: CryptoLayer, App: ApplicationLayer>(
    app: &mut App,
    context: &SecurityContext,
    envelope: &Envelope<'_>,
    mut message: Message,
) -> Result<Transform, Rejection> {
    use FaultType::*;
    let role = message.role();
    let notification = message.is_notification();
    let uses_sequence_number = role == Role::Request || notification;
    let current_time = app.time();

    // Held from the replay check to the replay window update.
    let mut state = context.state.lock().unwrap();

    let (partial_iv, kid, sequence_number): (PartialIv, Vec<u8>, Option<SequenceNumber>) = if uses_sequence_number {
        let piv = envelope.partial_iv.ok_or_else(|| fault!(MissingCounter, message))?;
        let sequence_number = SequenceNumber::from_partial_iv(piv).ok_or_else(|| fault!(MissingCounter, message))?;
        if !state.window.check(sequence_number.value()) {
            return Err(fault!(ReplayedCounter, message));
        }
        (piv.iter().copied().collect(), context.recipient_id().to_vec(), Some(sequence_number))
    } else {
        let record = state.pending.get(&message.token).ok_or_else(|| fault!(UnknownToken, message))?;
        (record.partial_iv.clone(), record.kid.clone(), None)
    };

    let mut integrity = Vec::new();
    let observe = sequence_number.filter(|_| notification).map(SequenceNumber::value);
    encode_options(&integrity_options(observe), &mut integrity).map_err(|_| fault!(Internal, message))?;
    let aad = aad::build(message.code, &integrity, context.algorithm(), &kid, &partial_iv)
        .map_err(|_| fault!(Internal, message))?;

    let recipient = context.recipient();
    let nonce = nonce(&recipient.base_iv, &partial_iv, !uses_sequence_number);
    let (ciphertext, tag) = envelope.ciphertext.split_at(envelope.ciphertext.len() - AES_CCM_TAG_SIZE);
    let tag: &[u8; AES_CCM_TAG_SIZE] = tag.try_into().map_err(|_| fault!(MalformedEnvelope, message))?;
    let mut plaintext = ciphertext.to_vec();
    if !C::Aead::decrypt_in_place(&recipient.key, &nonce, &aad, &mut plaintext, tag) {
        return Err(fault!(FailedAuth, message));
    }
    let (inner, payload) = decode_options(&plaintext).map_err(|_| fault!(MalformedPlaintext, message))?;
    let payload = payload.map(<[u8]>::to_vec).unwrap_or_default();

    // Authenticated and decoded, commit.
    if let Some(sequence_number) = sequence_number {
        state.window.update(sequence_number.value());
    }
    let mut _evicted = None;
    match (role, notification) {
        (Role::Request, _) => {
            let record = PendingRequest { partial_iv, kid, touched: current_time };
            _evicted = state.insert_pending(message.token.clone(), record, C::SETTINGS.max_pending_requests);
        }
        (_, true) => {
            if let Some(record) = state.pending.get_mut(&message.token) {
                record.touched = current_time;
            }
        }
        (_, false) => {
            state.pending.remove(&message.token);
        }
    }
    drop(state);

    message.options = merge(&message.options, inner, role);
    message.payload = payload;
    message.mark_security_processed();

    if let Some(_token) = &_evicted {
        log!(app, EvictedPendingRequest { host: context.host(), token: _token });
    }
    match (role, sequence_number) {
        (Role::Request, Some(_s)) => {
            log!(app, UnprotectedRequest { host: context.host(), sequence_number: _s.value() });
        }
        (_, Some(_s)) => {
            log!(app, UnprotectedNotification { host: context.host(), sequence_number: _s.value() });
        }
        (_, None) => {
            log!(app, UnprotectedResponse { host: context.host() });
        }
    }
    Ok(Transform::Transformed(message))
}
