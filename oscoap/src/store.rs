use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

use crate::application::*;
use crate::context::{normalize_host, SecurityContext};
use crate::message::Token;
#[cfg(feature = "logging")]
use crate::LogEvent::*;

/// Macro to turn off logging at compile time.
macro_rules! log {
    ($app:expr, $event:expr) => {
        #[cfg(feature = "logging")]
        $app.event_log($event);
    };
}
pub(crate) use log;

/// Owner of every security context of the local endpoint.
///
/// One of these is created by the application and handed to whatever drives the transport.
/// Protect and unprotect resolve the context of each message through it. There is no global
/// registry, so any number of independent stores can coexist, one per endpoint or per test.
///
/// Contexts are shared as `Arc`s so a context looked up by one thread stays valid even if
/// another thread removes it from the store meanwhile.
pub struct SecurityContextStore<C: CryptoLayer> {
    /// `contexts -> context state`
    contexts: RwLock<Vec<Arc<SecurityContext>>>,
    _crypto: PhantomData<C>,
}

impl<C: CryptoLayer> Default for SecurityContextStore<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CryptoLayer> SecurityContextStore<C> {
    pub fn new() -> Self {
        Self { contexts: RwLock::new(Vec::new()), _crypto: PhantomData }
    }

    /// Add a context. A context for the same host, or with the same recipient id, is replaced,
    /// so every lookup keeps yielding at most one context.
    pub fn add(&self, context: SecurityContext) -> Arc<SecurityContext> {
        let context = Arc::new(context);
        let mut contexts = self.contexts.write().unwrap();
        contexts.retain(|c| c.host() != context.host() && c.recipient_id() != context.recipient_id());
        contexts.push(context.clone());
        context
    }
    /// Remove the context of `host` along with its pending requests.
    pub fn remove(&self, host: &str) -> Option<Arc<SecurityContext>> {
        let host = normalize_host(host);
        let mut contexts = self.contexts.write().unwrap();
        let idx = contexts.iter().position(|c| c.host() == host)?;
        Some(contexts.swap_remove(idx))
    }
    pub fn len(&self) -> usize {
        self.contexts.read().unwrap().len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The context for a peer address, in any of its spellings.
    pub fn by_host(&self, host: &str) -> Option<Arc<SecurityContext>> {
        let host = normalize_host(host);
        self.contexts.read().unwrap().iter().find(|c| c.host() == host).cloned()
    }
    /// The context whose peer sends with key identifier `kid`.
    pub fn by_recipient_id(&self, kid: &[u8]) -> Option<Arc<SecurityContext>> {
        self.contexts.read().unwrap().iter().find(|c| c.recipient_id() == kid).cloned()
    }
    /// The context of `host`, if it holds a pending request under `token`.
    ///
    /// Tokens are only unique per peer and travel in the clear, so another peer's context
    /// never matches even when it holds the same token.
    pub fn by_token(&self, token: &[u8], host: &str) -> Option<Arc<SecurityContext>> {
        let token = Token::try_from(token).ok()?;
        let context = self.by_host(host)?;
        let pending = context.state.lock().unwrap().pending.contains_key(&token);
        pending.then_some(context)
    }

    /// Perform periodic cleanup: evict every pending request that waited longer than
    /// `Settings::pending_request_timeout` for its response.
    ///
    /// This returns the number of milliseconds until it should be called again. The caller should
    /// try to satisfy this but small variations in timing are not a problem.
    pub fn service<App: ApplicationLayer>(&self, mut app: App) -> i64 {
        let current_time = app.time();
        let timeout = C::SETTINGS.pending_request_timeout;
        let mut next_service = timeout as i64;
        for context in self.contexts.read().unwrap().iter() {
            let mut state = context.state.lock().unwrap();
            for _token in state.expire_pending(current_time, timeout) {
                log!(app, EvictedPendingRequest { host: context.host(), token: &_token });
            }
            if let Some(oldest) = state.pending.values().map(|r| r.touched).min() {
                next_service = next_service.min(oldest.saturating_add(timeout as i64) - current_time);
            }
        }
        next_service.max(0)
    }
}
