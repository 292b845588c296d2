use crate::crypto::AES_CCM_TAG_SIZE;
use crate::proto::*;

/// Why a compact envelope could not be read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeError {
    /// There was not even a flag byte.
    Empty,
    /// A flag bit this version never sets was set.
    ReservedFlags,
    /// The partial IV or key identifier ran past the end of the input.
    Truncated,
    /// What is left after the header cannot even hold an authentication tag.
    CiphertextTooShort,
    /// A partial IV or key identifier is too long for its length field.
    FieldTooLong,
}

/// The compact form of a COSE_Encrypt0 object:
/// `flags | partial IV | kid length | kid | ciphertext`.
///
/// Requests carry both the partial IV and the kid, notifications only the partial IV and
/// ordinary responses neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub partial_iv: Option<&'a [u8]>,
    pub kid: Option<&'a [u8]>,
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: &'a [u8],
}

impl<'a> Envelope<'a> {
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), EnvelopeError> {
        let piv = self.partial_iv.unwrap_or_default();
        if piv.len() > MAX_PARTIAL_IV_SIZE {
            return Err(EnvelopeError::FieldTooLong);
        }
        let mut flags = piv.len() as u8;
        if self.kid.is_some() {
            flags |= FLAG_KID_PRESENT;
        }
        out.push(flags);
        out.extend_from_slice(piv);
        if let Some(kid) = self.kid {
            if kid.len() > MAX_KID_SIZE {
                return Err(EnvelopeError::FieldTooLong);
            }
            out.push(kid.len() as u8);
            out.extend_from_slice(kid);
        }
        out.extend_from_slice(self.ciphertext);
        Ok(())
    }

    pub fn decode(input: &'a [u8]) -> Result<Self, EnvelopeError> {
        let (&flags, mut rest) = input.split_first().ok_or(EnvelopeError::Empty)?;
        if flags & FLAG_RESERVED_MASK != 0 {
            return Err(EnvelopeError::ReservedFlags);
        }
        let piv_len = (flags & FLAG_PARTIAL_IV_MASK) as usize;
        let partial_iv = if piv_len > 0 {
            if rest.len() < piv_len {
                return Err(EnvelopeError::Truncated);
            }
            let (piv, r) = rest.split_at(piv_len);
            rest = r;
            Some(piv)
        } else {
            None
        };
        let kid = if flags & FLAG_KID_PRESENT != 0 {
            let (&kid_len, r) = rest.split_first().ok_or(EnvelopeError::Truncated)?;
            let kid_len = kid_len as usize;
            if r.len() < kid_len {
                return Err(EnvelopeError::Truncated);
            }
            let (kid, r) = r.split_at(kid_len);
            rest = r;
            Some(kid)
        } else {
            None
        };
        if rest.len() < AES_CCM_TAG_SIZE {
            return Err(EnvelopeError::CiphertextTooShort);
        }
        Ok(Self { partial_iv, kid, ciphertext: rest })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const CIPHERTEXT: [u8; 10] = [0xaa; 10];

    #[test]
    fn request_layout() {
        let env = Envelope { partial_iv: Some(&[0x05]), kid: Some(b"client"), ciphertext: &CIPHERTEXT };
        let mut out = Vec::new();
        env.encode(&mut out).unwrap();
        assert_eq!(hex::encode(&out[..9]), "090506636c69656e74");
        assert_eq!(&out[9..], &CIPHERTEXT);
        assert_eq!(Envelope::decode(&out).unwrap(), env);
    }

    #[test]
    fn response_layouts() {
        let mut out = Vec::new();
        Envelope { partial_iv: None, kid: None, ciphertext: &CIPHERTEXT }.encode(&mut out).unwrap();
        assert_eq!(out[0], 0x00);
        assert_eq!(&out[1..], &CIPHERTEXT);

        let mut out = Vec::new();
        let notification = Envelope { partial_iv: Some(&[0x01, 0x00]), kid: None, ciphertext: &CIPHERTEXT };
        notification.encode(&mut out).unwrap();
        assert_eq!(&out[..3], &[0x02, 0x01, 0x00]);
        assert_eq!(Envelope::decode(&out).unwrap(), notification);
    }

    #[test]
    fn empty_kid_is_still_present() {
        let env = Envelope { partial_iv: Some(&[0]), kid: Some(&[]), ciphertext: &CIPHERTEXT };
        let mut out = Vec::new();
        env.encode(&mut out).unwrap();
        assert_eq!(&out[..3], &[0x09, 0x00, 0x00]);
        assert_eq!(Envelope::decode(&out).unwrap().kid, Some(&[][..]));
    }

    #[test]
    fn rejects_malformed_framing() {
        assert_eq!(Envelope::decode(&[]), Err(EnvelopeError::Empty));
        assert_eq!(Envelope::decode(&[0x10; 12]), Err(EnvelopeError::ReservedFlags));
        assert_eq!(Envelope::decode(&[0x03, 0x01]), Err(EnvelopeError::Truncated));
        assert_eq!(Envelope::decode(&[0x08]), Err(EnvelopeError::Truncated));
        assert_eq!(Envelope::decode(&[0x08, 0x04, b'a', b'b']), Err(EnvelopeError::Truncated));
        assert_eq!(Envelope::decode(&[0x01, 0x00, 1, 2, 3]), Err(EnvelopeError::CiphertextTooShort));
        let long_kid = [0u8; 256];
        let env = Envelope { partial_iv: None, kid: Some(&long_kid), ciphertext: &CIPHERTEXT };
        assert_eq!(env.encode(&mut Vec::new()), Err(EnvelopeError::FieldTooLong));
    }
}
