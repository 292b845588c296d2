use std::collections::HashMap;
use std::sync::Mutex;

use serde_cbor::Value;
use zeroize::Zeroizing;

use crate::antireplay::Window;
use crate::application::CryptoLayer;
use crate::crypto::*;
use crate::message::Token;
use crate::proto::Algorithm;
use crate::sequence::{PartialIv, SequenceNumber};

/// Identifier, key and base IV of one direction of a security context.
pub struct EndpointKeys {
    pub id: Vec<u8>,
    pub key: Zeroizing<[u8; AES_CCM_KEY_SIZE]>,
    pub base_iv: [u8; AES_CCM_NONCE_SIZE],
}
impl EndpointKeys {
    pub fn new(id: &[u8], key: [u8; AES_CCM_KEY_SIZE], base_iv: [u8; AES_CCM_NONCE_SIZE]) -> Self {
        Self { id: id.to_vec(), key: Zeroizing::new(key), base_iv }
    }
}

/// What a request was protected under, kept until its response shows up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub partial_iv: PartialIv,
    /// Key identifier of the sender of the request.
    pub kid: Vec<u8>,
    /// When the record was created, or last refreshed by a notification.
    pub touched: i64,
}

pub(crate) struct ContextState {
    pub sequence_number: SequenceNumber,
    pub window: Window,
    pub pending: HashMap<Token, PendingRequest>,
}

impl ContextState {
    /// Store a correlation record, evicting the oldest one first if the table is full.
    pub fn insert_pending(&mut self, token: Token, record: PendingRequest, max: usize) -> Option<Token> {
        let mut evicted = None;
        if !self.pending.contains_key(&token) && self.pending.len() >= max.max(1) {
            let oldest = self.pending.iter().min_by_key(|(_, r)| r.touched).map(|(t, _)| t.clone());
            if let Some(oldest) = oldest {
                self.pending.remove(&oldest);
                evicted = Some(oldest);
            }
        }
        self.pending.insert(token, record);
        evicted
    }
    /// Drop every correlation record untouched since `now - timeout`.
    pub fn expire_pending(&mut self, now: i64, timeout: u64) -> Vec<Token> {
        let mut expired = Vec::new();
        self.pending.retain(|token, r| {
            let keep = now.saturating_sub(r.touched) < timeout as i64;
            if !keep {
                expired.push(token.clone());
            }
            keep
        });
        expired
    }
}

/// Strip the brackets from an IPv6 literal and lowercase the rest, so every spelling of a
/// peer address finds the same context.
pub fn normalize_host(host: &str) -> String {
    host.trim_start_matches('[').trim_end_matches(']').to_ascii_lowercase()
}

/// The nonce for one message: the partial IV, left-padded with zeros to the nonce length,
/// XOR the base IV. Ordinary responses flip the top bit of the base IV first so they never
/// share a nonce with the request they answer.
pub fn nonce(
    base_iv: &[u8; AES_CCM_NONCE_SIZE],
    partial_iv: &[u8],
    flip: bool,
) -> [u8; AES_CCM_NONCE_SIZE] {
    let mut nonce = *base_iv;
    if flip {
        nonce[0] ^= 0x80;
    }
    let offset = AES_CCM_NONCE_SIZE.saturating_sub(partial_iv.len());
    for (n, p) in nonce[offset..].iter_mut().zip(partial_iv) {
        *n ^= p;
    }
    nonce
}

/// Shared per-peer state enabling protect and unprotect.
///
/// Key material is immutable once the context exists. The send sequence number, the replay
/// window and the pending request table live behind one mutex; a transform holds it from its
/// first read to its last write, so no two messages are ever sealed under the same sequence
/// number and no counter gets past the replay window twice.
pub struct SecurityContext {
    algorithm: Algorithm,
    host: String,
    sender: EndpointKeys,
    recipient: EndpointKeys,
    pub(crate) state: Mutex<ContextState>,
}

impl SecurityContext {
    /// Create a context from explicit key material. `host` is the address of the peer.
    pub fn new(host: &str, sender: EndpointKeys, recipient: EndpointKeys) -> Self {
        Self {
            algorithm: Algorithm::AesCcm64_64_128,
            host: normalize_host(host),
            sender,
            recipient,
            state: Mutex::new(ContextState {
                sequence_number: SequenceNumber::ZERO,
                window: Window::new(),
                pending: HashMap::new(),
            }),
        }
    }

    /// Derive both directions from a shared master secret with HKDF-SHA-256.
    ///
    /// The info for each output is the CBOR array `[id, alg, "Key" | "IV", length]`, where `id`
    /// is the identifier of the endpoint that sends with that key.
    /// Returns `None` if the KDF fails, which only happens with a broken implementation.
    pub fn derive<C: CryptoLayer>(
        host: &str,
        master_secret: &[u8],
        master_salt: &[u8],
        sender_id: &[u8],
        recipient_id: &[u8],
    ) -> Option<Self> {
        let algorithm = Algorithm::AesCcm64_64_128;
        let expand = |id: &[u8], kind: &str, okm: &mut [u8]| -> Option<()> {
            let info = serde_cbor::to_vec(&Value::Array(vec![
                Value::Bytes(id.to_vec()),
                Value::Integer(algorithm.id().into()),
                Value::Text(kind.to_string()),
                Value::Integer((okm.len() as u64).into()),
            ]))
            .ok()?;
            C::Kdf::derive(master_salt, master_secret, &info, okm).then_some(())
        };
        let mut keys = Vec::with_capacity(2);
        for id in [sender_id, recipient_id] {
            let mut key = Zeroizing::new([0u8; AES_CCM_KEY_SIZE]);
            let mut base_iv = [0u8; AES_CCM_NONCE_SIZE];
            expand(id, "Key", &mut key[..])?;
            expand(id, "IV", &mut base_iv)?;
            keys.push(EndpointKeys { id: id.to_vec(), key, base_iv });
        }
        let recipient = keys.pop()?;
        let sender = keys.pop()?;
        Some(Self::new(host, sender, recipient))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
    /// The normalized address of the peer.
    pub fn host(&self) -> &str {
        &self.host
    }
    /// Our own key identifier, sent in every request we protect.
    pub fn sender_id(&self) -> &[u8] {
        &self.sender.id
    }
    /// The key identifier of the peer, used to find this context for incoming requests.
    pub fn recipient_id(&self) -> &[u8] {
        &self.recipient.id
    }
    pub(crate) fn sender(&self) -> &EndpointKeys {
        &self.sender
    }
    pub(crate) fn recipient(&self) -> &EndpointKeys {
        &self.recipient
    }

    /// The sequence number the next request or notification will be protected with.
    pub fn sequence_number(&self) -> SequenceNumber {
        self.state.lock().unwrap().sequence_number
    }
    /// Continue counting from `sequence_number`, for a context restored from storage.
    /// Moving the sequence number backwards reuses nonces and must never be done.
    pub fn set_sequence_number(&self, sequence_number: SequenceNumber) {
        self.state.lock().unwrap().sequence_number = sequence_number;
    }
    /// A snapshot of the replay window.
    pub fn replay_window(&self) -> Window {
        self.state.lock().unwrap().window
    }
    pub fn pending_requests(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }
    pub fn has_pending_request(&self, token: &[u8]) -> bool {
        self.state.lock().unwrap().pending.keys().any(|t| &t[..] == token)
    }
}
