use ccm::aead::generic_array::GenericArray;
use ccm::aead::{AeadInPlace, KeyInit};
use ccm::consts::{U7, U8};
use ccm::Ccm;

use crate::crypto::*;

/// The RustCrypto AES-CCM instantiation matching AES-CCM-64-64-128.
pub type Aes128Ccm64 = Ccm<aes::Aes128, U8, U7>;

/// An empty struct which implements `AesCcm` using the RustCrypto `ccm` and `aes` crates.
///
/// It is just a namespace and wrapper for those crates.
pub struct CrateAesCcm;
impl AesCcm for CrateAesCcm {
    fn encrypt_in_place(
        key: &[u8; AES_CCM_KEY_SIZE],
        nonce: &[u8; AES_CCM_NONCE_SIZE],
        aad: &[u8],
        data: &mut [u8],
    ) -> Option<[u8; AES_CCM_TAG_SIZE]> {
        let cipher = Aes128Ccm64::new(GenericArray::from_slice(key));
        let tag = cipher
            .encrypt_in_place_detached(GenericArray::from_slice(nonce), aad, data)
            .ok()?;
        Some(tag.into())
    }

    fn decrypt_in_place(
        key: &[u8; AES_CCM_KEY_SIZE],
        nonce: &[u8; AES_CCM_NONCE_SIZE],
        aad: &[u8],
        data: &mut [u8],
        tag: &[u8; AES_CCM_TAG_SIZE],
    ) -> bool {
        let cipher = Aes128Ccm64::new(GenericArray::from_slice(key));
        cipher
            .decrypt_in_place_detached(GenericArray::from_slice(nonce), aad, data, GenericArray::from_slice(tag))
            .is_ok()
    }
}
