/// The specified size of an AES-128 key.
pub const AES_CCM_KEY_SIZE: usize = 16;
/// The size of an AES-CCM-64-64-128 nonce. The 7 byte nonce leaves an 8 byte length field.
pub const AES_CCM_NONCE_SIZE: usize = 7;
/// The size of an AES-CCM-64-64-128 authentication tag.
pub const AES_CCM_TAG_SIZE: usize = 8;

/// A trait for implementing AES-CCM-64-64-128, the AEAD every protected message is sealed with.
///
/// Implementations keep no state between calls, every call receives the key it must use.
pub trait AesCcm {
    /// A pure function (no side effects) that implements AES-CCM AEAD encryption.
    ///
    /// Encryption must be performed on `data` in-place.
    /// The initial plaintext of `data` must be overwritten with its ciphertext.
    ///
    /// The resulting CCM authentication tag must be returned, or `None` if the library
    /// refused to encrypt. A refusal is treated as an internal fault and nothing is sent.
    fn encrypt_in_place(
        key: &[u8; AES_CCM_KEY_SIZE],
        nonce: &[u8; AES_CCM_NONCE_SIZE],
        aad: &[u8],
        data: &mut [u8],
    ) -> Option<[u8; AES_CCM_TAG_SIZE]>;
    /// A pure function (no side effects) that implements AES-CCM AEAD decryption.
    ///
    /// Decryption must be performed on `data` in-place.
    /// The initial ciphertext of `data` must be overwritten with its plaintext.
    ///
    /// This function must check that the expected authentication tag matches `tag`,
    /// and only return `true` if they match. This must be done in constant-time.
    #[must_use]
    fn decrypt_in_place(
        key: &[u8; AES_CCM_KEY_SIZE],
        nonce: &[u8; AES_CCM_NONCE_SIZE],
        aad: &[u8],
        data: &mut [u8],
        tag: &[u8; AES_CCM_TAG_SIZE],
    ) -> bool;
}
