mod aes_ccm;
mod hkdf;

pub use aes_ccm::*;
pub use hkdf::*;
