use arrayvec::ArrayVec;

use crate::proto::MAX_PARTIAL_IV_SIZE;

/// The wire form of a sequence number: big-endian, at least one byte.
pub type PartialIv = ArrayVec<u8, MAX_PARTIAL_IV_SIZE>;

/// A sender sequence number.
///
/// Stored by value and only ever moved forward with `next`. Its wire form grows by a byte
/// each time it outgrows the previous length and never wraps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceNumber(u64);
impl SequenceNumber {
    /// The largest value that still fits in a partial IV.
    pub const MAX: u64 = (1 << (8 * MAX_PARTIAL_IV_SIZE)) - 1;

    pub const ZERO: SequenceNumber = SequenceNumber(0);

    pub const fn new(value: u64) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }
    pub const fn value(self) -> u64 {
        self.0
    }
    /// The following sequence number, `None` once the partial IV space is exhausted.
    pub const fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    /// Minimal big-endian bytes, a single zero byte for zero.
    pub fn to_partial_iv(self) -> PartialIv {
        let bytes = self.0.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count().min(bytes.len() - 1);
        bytes[skip..].iter().copied().collect()
    }
    /// Read a received partial IV. Leading zero bytes are tolerated.
    pub fn from_partial_iv(partial_iv: &[u8]) -> Option<Self> {
        if partial_iv.is_empty() || partial_iv.len() > MAX_PARTIAL_IV_SIZE {
            return None;
        }
        Some(Self(partial_iv.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partial_iv_grows_on_overflow() {
        assert_eq!(&SequenceNumber::ZERO.to_partial_iv()[..], &[0]);
        assert_eq!(&SequenceNumber(0xff).to_partial_iv()[..], &[0xff]);
        let s = SequenceNumber(0xff).next().unwrap();
        assert_eq!(&s.to_partial_iv()[..], &[0x01, 0x00]);
        assert_eq!(&SequenceNumber(SequenceNumber::MAX).to_partial_iv()[..], &[0xff; 7]);
    }

    #[test]
    fn exhausts_instead_of_wrapping() {
        let last = SequenceNumber::new(SequenceNumber::MAX).unwrap();
        assert_eq!(last.next(), None);
        assert_eq!(SequenceNumber::new(SequenceNumber::MAX + 1), None);
    }

    #[test]
    fn parses_received_partial_ivs() {
        assert_eq!(SequenceNumber::from_partial_iv(&[0x00, 0x05]), Some(SequenceNumber(5)));
        assert_eq!(SequenceNumber::from_partial_iv(&[0x01, 0x00]), Some(SequenceNumber(256)));
        assert_eq!(SequenceNumber::from_partial_iv(&[]), None);
        assert_eq!(SequenceNumber::from_partial_iv(&[1; 8]), None);
    }
}
