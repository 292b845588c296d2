//! CoAP option encoding, used for the protected options inside the plaintext and for the
//! integrity-only options bound into the AAD.
use crate::message::{CoapOption, OptionSet};
use crate::proto::PAYLOAD_MARKER;

/// Why a run of encoded options could not be read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecError {
    /// The input ended inside an option header or value.
    Truncated,
    /// A delta or length nibble used the reserved value 15 outside of the payload marker.
    ReservedNibble,
    /// A payload marker was not followed by any payload.
    EmptyPayload,
    /// An option number went past 65535, or a value was too long to encode.
    OutOfRange,
}

const NIBBLE_EXT_1: u8 = 13;
const NIBBLE_EXT_2: u8 = 14;
const NIBBLE_RESERVED: u8 = 15;

fn split_nibble(value: usize) -> Result<(u8, Option<u8>, Option<u16>), CodecError> {
    match value {
        0..=12 => Ok((value as u8, None, None)),
        13..=268 => Ok((NIBBLE_EXT_1, Some((value - 13) as u8), None)),
        269..=65804 => Ok((NIBBLE_EXT_2, None, Some((value - 269) as u16))),
        _ => Err(CodecError::OutOfRange),
    }
}

/// Append the encoding of every option in `options` to `out`.
pub fn encode_options(options: &OptionSet, out: &mut Vec<u8>) -> Result<(), CodecError> {
    let mut last = 0u16;
    for option in options {
        let (delta_nibble, delta_1, delta_2) = split_nibble((option.number - last) as usize)?;
        let (len_nibble, len_1, len_2) = split_nibble(option.value.len())?;
        out.push((delta_nibble << 4) | len_nibble);
        out.extend(delta_1);
        out.extend(delta_2.map(u16::to_be_bytes).iter().flatten());
        out.extend(len_1);
        out.extend(len_2.map(u16::to_be_bytes).iter().flatten());
        out.extend_from_slice(&option.value);
        last = option.number;
    }
    Ok(())
}

fn read_extended(nibble: u8, input: &mut &[u8]) -> Result<usize, CodecError> {
    match nibble {
        NIBBLE_EXT_1 => {
            let (b, rest) = input.split_first().ok_or(CodecError::Truncated)?;
            *input = rest;
            Ok(*b as usize + 13)
        }
        NIBBLE_EXT_2 => {
            if input.len() < 2 {
                return Err(CodecError::Truncated);
            }
            let v = u16::from_be_bytes([input[0], input[1]]) as usize + 269;
            *input = &input[2..];
            Ok(v)
        }
        NIBBLE_RESERVED => Err(CodecError::ReservedNibble),
        n => Ok(n as usize),
    }
}

/// Decode options until the input ends or a payload marker is found.
/// Returns the options and, if there was a marker, the non-empty payload that follows it.
pub fn decode_options(mut input: &[u8]) -> Result<(OptionSet, Option<&[u8]>), CodecError> {
    let mut options = Vec::new();
    let mut number = 0usize;
    while let Some((&header, rest)) = input.split_first() {
        input = rest;
        if header == PAYLOAD_MARKER {
            if input.is_empty() {
                return Err(CodecError::EmptyPayload);
            }
            return Ok((options.into_iter().collect(), Some(input)));
        }
        number += read_extended(header >> 4, &mut input)?;
        let len = read_extended(header & 0x0f, &mut input)?;
        if number > u16::MAX as usize {
            return Err(CodecError::OutOfRange);
        }
        if input.len() < len {
            return Err(CodecError::Truncated);
        }
        let (value, rest) = input.split_at(len);
        input = rest;
        options.push(CoapOption { number: number as u16, value: value.to_vec() });
    }
    Ok((options.into_iter().collect(), None))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::proto::*;

    #[test]
    fn encodes_small_and_extended_deltas() {
        let mut set = OptionSet::new();
        set.add(OPTION_URI_PATH, "temp");
        set.add(OPTION_PROXY_SCHEME, "coap");
        set.add(OPTION_OBJECT_SECURITY, vec![]);
        let mut out = Vec::new();
        encode_options(&set, &mut out).unwrap();
        // 11 fits the nibble, 39 - 11 = 28 needs one extension byte,
        // 52225 - 39 needs two.
        let mut expected = vec![0xb4];
        expected.extend_from_slice(b"temp");
        expected.extend_from_slice(&[0xd4, 28 - 13]);
        expected.extend_from_slice(b"coap");
        expected.push(0xe0);
        expected.extend_from_slice(&((52225 - 39 - 269) as u16).to_be_bytes());
        assert_eq!(out, expected);

        let (decoded, payload) = decode_options(&out).unwrap();
        assert_eq!(decoded, set);
        assert!(payload.is_none());
    }

    #[test]
    fn long_values_use_extended_lengths() {
        let mut set = OptionSet::new();
        set.add(OPTION_PROXY_URI, vec![b'a'; 300]);
        let mut out = Vec::new();
        encode_options(&set, &mut out).unwrap();
        assert_eq!(out[0], 0xde);
        assert_eq!(out[1], 35 - 13);
        assert_eq!(u16::from_be_bytes([out[2], out[3]]), 300 - 269);
        assert_eq!(decode_options(&out).unwrap().0, set);
    }

    #[test]
    fn stops_at_payload_marker() {
        let input = [0x61, 0x05, PAYLOAD_MARKER, 0xff, 0x01];
        let (options, payload) = decode_options(&input).unwrap();
        assert_eq!(options.get_uint(OPTION_OBSERVE), Some(5));
        assert_eq!(payload, Some(&[0xff, 0x01][..]));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(decode_options(&[0x61]).unwrap_err(), CodecError::Truncated);
        assert_eq!(decode_options(&[0xd1]).unwrap_err(), CodecError::Truncated);
        assert_eq!(decode_options(&[0xf1, 0]).unwrap_err(), CodecError::ReservedNibble);
        assert_eq!(decode_options(&[0x1f]).unwrap_err(), CodecError::ReservedNibble);
        assert_eq!(decode_options(&[0x10, PAYLOAD_MARKER]).unwrap_err(), CodecError::EmptyPayload);
        assert_eq!(decode_options(&[0xe0, 0xff, 0xfe, 0xe0, 0xff, 0xfe]).unwrap_err(), CodecError::OutOfRange);
    }

    #[test]
    fn empty_input_is_no_options() {
        let (options, payload) = decode_options(&[]).unwrap();
        assert!(options.is_empty());
        assert!(payload.is_none());
    }
}
