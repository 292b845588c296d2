use crate::crypto::*;

/// A container for the dynamic settings of the security engine, including all time-based settings.
/// If the user wishes to measure time in units other than milliseconds for some reason, then they can
/// create an adjusted version of this struct with those units, and use it instead of the default.
pub struct Settings {
    /// How long the correlation record of a protected request is kept while waiting for its
    /// response. Records older than this are evicted by `SecurityContextStore::service`.
    ///
    /// Observe notifications refresh the record of their registration, so a live observation
    /// only expires once notifications stop arriving for this long.
    pub pending_request_timeout: u64,
    /// Maximum number of correlation records a single security context may hold.
    /// When a new request is protected or received past this limit, the oldest record is evicted.
    pub max_pending_requests: usize,
}
impl Settings {
    /// Default value for the `pending_request_timeout`.
    /// The default value is 5 minutes in ms, comfortably longer than the CoAP exchange lifetime.
    pub const PENDING_REQUEST_TIMEOUT_MS: u64 = 5 * 60 * 1000;
    /// Default value for the `max_pending_requests`.
    pub const MAX_PENDING_REQUESTS: usize = 64;
    /// Create an instance of Settings with all default values.
    /// These defaults are in units of milliseconds, so if these defaults are used, `App::time`
    /// must return timestamps in units of milliseconds as well.
    pub const fn new_ms() -> Self {
        Self {
            pending_request_timeout: Self::PENDING_REQUEST_TIMEOUT_MS,
            max_pending_requests: Self::MAX_PENDING_REQUESTS,
        }
    }
}
impl Default for Settings {
    fn default() -> Self {
        Self::new_ms()
    }
}

/// Trait to implement to select the cryptographic primitives the engine runs on.
///
/// Templating the engine on this trait lets the code here be independent of any particular
/// crypto library. Enable the `default-crypto` feature and implement `DefaultCrypto` instead
/// to get the bundled implementations.
pub trait CryptoLayer: Sized {
    /// These are constants that can be redefined from their defaults to change how long and how
    /// many request correlation records are retained.
    const SETTINGS: Settings = Settings::new_ms();

    /// The implementation of AES-CCM-64-64-128 used to protect every message.
    ///
    /// FIPS compliance requires a FIPS certified implementation.
    type Aead: AesCcm;

    /// The implementation of HKDF-SHA-256 used to derive context key material from a master secret.
    ///
    /// FIPS compliance requires use of a FIPS certified implementation.
    type Kdf: HkdfSha256;
}

/// Trait to implement to integrate the security engine into an application.
///
/// Templating the engine on this trait lets the code here be almost entirely transport, OS,
/// and use case independent.
pub trait ApplicationLayer: Sized {
    /// Should return the current time in milliseconds. Does not have to be monotonic, nor synced
    /// with remote peers. Used to age and evict request correlation records.
    fn time(&mut self) -> i64;

    /// Receives a stream of events that occur while protecting and unprotecting messages.
    /// These are provided for debugging, logging or metrics purposes, and must be used for
    /// nothing else. Do not base protocol-level decisions upon the events passed to this function.
    #[cfg(feature = "logging")]
    #[allow(unused)]
    fn event_log(&mut self, event: crate::LogEvent<'_>) {}
}

impl<A: ApplicationLayer> ApplicationLayer for &mut A {
    fn time(&mut self) -> i64 {
        (**self).time()
    }

    #[cfg(feature = "logging")]
    fn event_log(&mut self, event: crate::LogEvent<'_>) {
        (**self).event_log(event)
    }
}
