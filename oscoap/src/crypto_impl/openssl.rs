use std::ffi::{c_int, c_void};
use std::ptr::{self, NonNull};

use openssl_sys::*;

use crate::crypto::*;

/// A wrapper for a `EVP_CIPHER_CTX` that will free itself on drop.
/// Users are encouraged to not use one of these directly.
pub struct OpenSSLCtx(NonNull<openssl_sys::EVP_CIPHER_CTX>);
impl Drop for OpenSSLCtx {
    fn drop(&mut self) {
        unsafe {
            EVP_CIPHER_CTX_free(self.0.as_ptr());
        }
    }
}
impl OpenSSLCtx {
    /// Creates a new context.
    pub fn new() -> Option<Self> {
        unsafe { Some(OpenSSLCtx(NonNull::new(EVP_CIPHER_CTX_new())?)) }
    }

    /// Select AES-128-CCM with a 7 byte nonce and an 8 byte tag.
    /// On decryption `tag` is the tag the ciphertext must match, on encryption it must be null.
    pub unsafe fn ccm_init<const ENCRYPT: bool>(&self, tag: *const u8) -> bool {
        let evp_f = if ENCRYPT {
            EVP_EncryptInit_ex
        } else {
            EVP_DecryptInit_ex
        };
        let ctx = self.0.as_ptr();
        evp_f(ctx, EVP_aes_128_ccm(), ptr::null_mut(), ptr::null(), ptr::null()) > 0
            && EVP_CIPHER_CTX_ctrl(ctx, EVP_CTRL_GCM_SET_IVLEN, AES_CCM_NONCE_SIZE as c_int, ptr::null_mut()) > 0
            && EVP_CIPHER_CTX_ctrl(ctx, EVP_CTRL_GCM_SET_TAG, AES_CCM_TAG_SIZE as c_int, tag as *mut c_void) > 0
    }
    /// Assign the key and nonce of the next message.
    pub unsafe fn set_key<const ENCRYPT: bool>(&self, key: *const u8, nonce: *const u8) -> bool {
        let evp_f = if ENCRYPT {
            EVP_EncryptInit_ex
        } else {
            EVP_DecryptInit_ex
        };
        evp_f(self.0.as_ptr(), ptr::null(), ptr::null_mut(), key, nonce) > 0
    }
    /// CCM must know the total length of the text before any AAD is given.
    pub unsafe fn set_data_len<const ENCRYPT: bool>(&self, len: usize) -> bool {
        let evp_f = if ENCRYPT {
            EVP_EncryptUpdate
        } else {
            EVP_DecryptUpdate
        };
        let mut outlen = 0;
        evp_f(self.0.as_ptr(), ptr::null_mut(), &mut outlen, ptr::null(), len as c_int) > 0
    }
    /// Stream text to be encrypted or decrypted.
    ///
    /// If `output` is null, then `input` will be treated as AAD rather than plaintext or ciphertext.
    /// For CCM decryption of the text, this returns whether the tag matched.
    pub unsafe fn update<const ENCRYPT: bool>(&self, input: &[u8], output: *mut u8) -> bool {
        let evp_f = if ENCRYPT {
            EVP_EncryptUpdate
        } else {
            EVP_DecryptUpdate
        };
        let mut outlen = 0;
        evp_f(self.0.as_ptr(), output, &mut outlen, input.as_ptr(), input.len() as c_int) > 0
    }
    /// Finish encryption. CCM decryption has nothing left to do after `update`.
    pub unsafe fn finalize(&self) -> bool {
        let mut outl = 0;
        EVP_EncryptFinal_ex(self.0.as_ptr(), ptr::null_mut(), &mut outl) > 0
    }
    /// Retreive the authentication tag from this context.
    /// This must be called after `finalize` is called.
    pub unsafe fn get_tag(&self, tag: &mut [u8]) -> bool {
        EVP_CIPHER_CTX_ctrl(
            self.0.as_ptr(),
            EVP_CTRL_GCM_GET_TAG,
            tag.len() as c_int,
            tag.as_mut_ptr() as *mut c_void,
        ) > 0
    }
}

/// An empty struct which implements `AesCcm` on top of OpenSSL.
/// A fresh cipher context is allocated per message since CCM contexts cannot be reused.
pub struct OpenSSLAesCcm;
impl AesCcm for OpenSSLAesCcm {
    fn encrypt_in_place(
        key: &[u8; AES_CCM_KEY_SIZE],
        nonce: &[u8; AES_CCM_NONCE_SIZE],
        aad: &[u8],
        data: &mut [u8],
    ) -> Option<[u8; AES_CCM_TAG_SIZE]> {
        let ctx = OpenSSLCtx::new()?;
        let mut tag = [0u8; AES_CCM_TAG_SIZE];
        let ptr = data.as_mut_ptr();
        unsafe {
            let ok = ctx.ccm_init::<true>(ptr::null())
                && ctx.set_key::<true>(key.as_ptr(), nonce.as_ptr())
                && ctx.set_data_len::<true>(data.len())
                && (aad.is_empty() || ctx.update::<true>(aad, ptr::null_mut()))
                && ctx.update::<true>(data, ptr)
                && ctx.finalize()
                && ctx.get_tag(&mut tag);
            ok.then_some(tag)
        }
    }

    fn decrypt_in_place(
        key: &[u8; AES_CCM_KEY_SIZE],
        nonce: &[u8; AES_CCM_NONCE_SIZE],
        aad: &[u8],
        data: &mut [u8],
        tag: &[u8; AES_CCM_TAG_SIZE],
    ) -> bool {
        let Some(ctx) = OpenSSLCtx::new() else {
            return false;
        };
        let ptr = data.as_mut_ptr();
        unsafe {
            ctx.ccm_init::<false>(tag.as_ptr())
                && ctx.set_key::<false>(key.as_ptr(), nonce.as_ptr())
                && ctx.set_data_len::<false>(data.len())
                && (aad.is_empty() || ctx.update::<false>(aad, ptr::null_mut()))
                && ctx.update::<false>(data, ptr)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const KEY: [u8; AES_CCM_KEY_SIZE] = [0x21, 0x64, 0x42, 0xda, 0x60, 0x3c, 0x51, 0x59, 0x2d, 0xf4, 0xc3, 0xd0, 0xcd, 0x1d, 0x0d, 0x48];
    const NONCE: [u8; AES_CCM_NONCE_SIZE] = [0x01, 0x53, 0xdd, 0xfe, 0xde, 0x44, 0x19];

    #[test]
    fn seal_and_open() {
        let origin = *b"hello over openssl";
        let mut data = origin;
        let tag = OpenSSLAesCcm::encrypt_in_place(&KEY, &NONCE, b"aad", &mut data).unwrap();
        assert!(OpenSSLAesCcm::decrypt_in_place(&KEY, &NONCE, b"aad", &mut data, &tag));
        assert_eq!(data, origin);
        let mut bad_tag = tag;
        bad_tag[7] ^= 1;
        assert!(!OpenSSLAesCcm::decrypt_in_place(&KEY, &NONCE, b"aad", &mut data.clone(), &bad_tag));
    }

    #[cfg(all(feature = "aes", feature = "ccm"))]
    #[test]
    fn matches_rustcrypto() {
        use crate::crypto_impl::CrateAesCcm;
        let mut a = *b"both backends must agree on every byte";
        let mut b = a;
        let tag_a = OpenSSLAesCcm::encrypt_in_place(&KEY, &NONCE, b"", &mut a).unwrap();
        let tag_b = CrateAesCcm::encrypt_in_place(&KEY, &NONCE, b"", &mut b).unwrap();
        assert_eq!(a, b);
        assert_eq!(tag_a, tag_b);
    }
}
