use hkdf::Hkdf;
use sha2::Sha256;

use crate::crypto::*;

/// An empty struct which implements `HkdfSha256` using the RustCrypto `hkdf` and `sha2` crates.
pub struct CrateHkdfSha256;
impl HkdfSha256 for CrateHkdfSha256 {
    fn derive(salt: &[u8], ikm: &[u8], info: &[u8], okm: &mut [u8]) -> bool {
        let salt = if salt.is_empty() { None } else { Some(salt) };
        Hkdf::<Sha256>::new(salt, ikm).expand(info, okm).is_ok()
    }
}
