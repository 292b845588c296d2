
/// The CoAP protocol version carried in the external AAD.
pub const COAP_VERSION: u8 = 1;

/// COSE algorithm identifier of AES-CCM-64-64-128.
pub const ALG_AES_CCM_64_64_128: i64 = 12;

/// Byte separating encoded options from a payload.
pub const PAYLOAD_MARKER: u8 = 0xff;

/// Maximum length of a CoAP token.
pub const MAX_TOKEN_SIZE: usize = 8;

pub const OPTION_URI_HOST: u16 = 3;
pub const OPTION_OBSERVE: u16 = 6;
pub const OPTION_URI_PORT: u16 = 7;
pub const OPTION_URI_PATH: u16 = 11;
pub const OPTION_MAX_AGE: u16 = 14;
pub const OPTION_URI_QUERY: u16 = 15;
pub const OPTION_PROXY_URI: u16 = 35;
pub const OPTION_PROXY_SCHEME: u16 = 39;
/// The Object-Security option. Its presence marks a message as protected.
pub const OPTION_OBJECT_SECURITY: u16 = 52225;

/// Bits 0-2 of the envelope flag byte hold the partial IV length.
pub const FLAG_PARTIAL_IV_MASK: u8 = 0x07;
/// Bit 3 of the envelope flag byte is set when a key identifier follows.
pub const FLAG_KID_PRESENT: u8 = 0x08;
/// Flag bits this version never sets.
pub const FLAG_RESERVED_MASK: u8 = 0xf0;

/// A partial IV may be at most as long as the flag field can express.
pub const MAX_PARTIAL_IV_SIZE: usize = FLAG_PARTIAL_IV_MASK as usize;
/// A key identifier is prefixed by a single length byte.
pub const MAX_KID_SIZE: usize = u8::MAX as usize;

/// Only the low 24 bits of the sequence number are mirrored into the Observe option of a
/// notification.
pub const OBSERVE_VALUE_MASK: u64 = 0xff_ffff;

/// The AEAD algorithm shared by both halves of a security context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// AES-CCM with a 128-bit key, 64-bit tag and 56-bit nonce.
    AesCcm64_64_128,
}
impl Algorithm {
    /// The COSE identifier bound into the AAD and the key derivation info.
    pub const fn id(self) -> i64 {
        match self {
            Algorithm::AesCcm64_64_128 => ALG_AES_CCM_64_64_128,
        }
    }
}
