/// A HKDF-SHA-256 implementation (RFC 5869), used to expand a master secret into the
/// per-direction keys and base IVs of a security context.
pub trait HkdfSha256 {
    /// Pure function running extract-then-expand.
    ///
    /// `salt` may be empty, in which case a string of zero bytes is used as the salt.
    /// `okm` must be filled completely; return `false` if `okm` is longer than HKDF can produce.
    #[must_use]
    fn derive(salt: &[u8], ikm: &[u8], info: &[u8], okm: &mut [u8]) -> bool;
}
