/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
#[cfg(all(feature = "aes", feature = "ccm"))]
mod aes_ccm;
#[cfg(all(feature = "aes", feature = "ccm"))]
pub use aes_ccm::*;
#[cfg(all(feature = "aes", feature = "ccm"))]
pub use {aes, ccm};

#[cfg(feature = "sha2")]
mod hkdf_sha256;
#[cfg(feature = "sha2")]
pub use hkdf_sha256::*;
#[cfg(feature = "sha2")]
pub use {hkdf, sha2};

#[cfg(feature = "openssl")]
mod openssl;
#[cfg(feature = "openssl")]
pub use openssl::*;
#[cfg(feature = "openssl")]
pub use openssl_sys;

/// Implement this marker trait to get a `CryptoLayer` wired to the bundled RustCrypto
/// implementations.
#[cfg(feature = "default-crypto")]
pub trait DefaultCrypto {}
#[cfg(feature = "default-crypto")]
impl<C: DefaultCrypto> crate::application::CryptoLayer for C {
    type Aead = CrateAesCcm;
    type Kdf = CrateHkdfSha256;
}
