use std::fmt;

use arrayvec::ArrayVec;

use crate::proto::*;

/// Opaque value linking a response to the request it answers.
pub type Token = ArrayVec<u8, MAX_TOKEN_SIZE>;

/// The four CoAP message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Confirmable,
    NonConfirmable,
    Acknowledgement,
    Reset,
}

/// What a message code makes of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Request,
    Response,
    /// The empty code, or a code class this engine has no business with.
    Empty,
}

/// A CoAP message code, `class.detail` packed into one byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(pub u8);
impl Code {
    pub const EMPTY: Code = Code(0);
    pub const GET: Code = Code::new(0, 1);
    pub const POST: Code = Code::new(0, 2);
    pub const PUT: Code = Code::new(0, 3);
    pub const DELETE: Code = Code::new(0, 4);
    pub const CREATED: Code = Code::new(2, 1);
    pub const DELETED: Code = Code::new(2, 2);
    pub const VALID: Code = Code::new(2, 3);
    pub const CHANGED: Code = Code::new(2, 4);
    pub const CONTENT: Code = Code::new(2, 5);
    pub const BAD_REQUEST: Code = Code::new(4, 0);
    pub const UNAUTHORIZED: Code = Code::new(4, 1);
    pub const BAD_OPTION: Code = Code::new(4, 2);
    pub const INTERNAL_SERVER_ERROR: Code = Code::new(5, 0);

    pub const fn new(class: u8, detail: u8) -> Self {
        Self((class << 5) | (detail & 0x1f))
    }
    pub const fn class(self) -> u8 {
        self.0 >> 5
    }
    pub const fn detail(self) -> u8 {
        self.0 & 0x1f
    }
    pub fn role(self) -> Role {
        match self.class() {
            0 if self.0 != 0 => Role::Request,
            2..=5 => Role::Response,
            _ => Role::Empty,
        }
    }
}
impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.class(), self.detail())
    }
}
impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({})", self)
    }
}

/// A single option instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoapOption {
    pub number: u16,
    pub value: Vec<u8>,
}

/// The options of a message, kept sorted by option number.
/// Repeated options keep the order in which they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet(Vec<CoapOption>);
impl OptionSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an instance of option `number` after any existing instances of it.
    pub fn add(&mut self, number: u16, value: impl Into<Vec<u8>>) {
        let i = self.0.partition_point(|o| o.number <= number);
        self.0.insert(i, CoapOption { number, value: value.into() });
    }
    /// Replace every instance of option `number` with a single one.
    pub fn set(&mut self, number: u16, value: impl Into<Vec<u8>>) {
        self.remove(number);
        self.add(number, value);
    }
    pub fn set_uint(&mut self, number: u16, value: u64) {
        self.set(number, encode_uint(value));
    }

    /// The value of the first instance of option `number`.
    pub fn get(&self, number: u16) -> Option<&[u8]> {
        self.get_all(number).next()
    }
    pub fn get_uint(&self, number: u16) -> Option<u64> {
        self.get(number).and_then(decode_uint)
    }
    pub fn get_all(&self, number: u16) -> impl Iterator<Item = &[u8]> {
        self.0.iter().filter(move |o| o.number == number).map(|o| o.value.as_slice())
    }
    pub fn contains(&self, number: u16) -> bool {
        self.0.iter().any(|o| o.number == number)
    }
    pub fn count(&self, number: u16) -> usize {
        self.0.iter().filter(|o| o.number == number).count()
    }

    /// Remove every instance of option `number`, returning their values in order.
    pub fn take(&mut self, number: u16) -> Vec<Vec<u8>> {
        let mut taken = Vec::new();
        self.0.retain_mut(|o| {
            if o.number == number {
                taken.push(std::mem::take(&mut o.value));
                false
            } else {
                true
            }
        });
        taken
    }
    /// Remove every instance of option `number`, returning whether there was any.
    pub fn remove(&mut self, number: u16) -> bool {
        let len = self.0.len();
        self.0.retain(|o| o.number != number);
        self.0.len() != len
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CoapOption> {
        self.0.iter()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a CoapOption;
    type IntoIter = std::slice::Iter<'a, CoapOption>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
impl FromIterator<CoapOption> for OptionSet {
    fn from_iter<T: IntoIterator<Item = CoapOption>>(iter: T) -> Self {
        let mut set = OptionSet::new();
        for o in iter {
            set.add(o.number, o.value);
        }
        set
    }
}

/// Encode an unsigned integer option value in the fewest big-endian bytes. Zero is empty.
pub fn encode_uint(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    bytes[skip..].to_vec()
}
/// Decode an unsigned integer option value, `None` if it cannot fit in a `u64`.
pub fn decode_uint(bytes: &[u8]) -> Option<u64> {
    if bytes.len() > 8 {
        return None;
    }
    Some(bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64))
}

/// A CoAP message as seen by the security engine.
///
/// The transport owns datagram serialization. This is only the view protect and unprotect
/// operate on: header fields, the peer it is exchanged with, options and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub msg_type: MessageType,
    pub code: Code,
    pub message_id: u16,
    pub token: Token,
    /// Destination for outgoing messages, source for incoming ones.
    pub host: String,
    pub port: u16,
    pub options: OptionSet,
    pub payload: Vec<u8>,
    send_unsecured: bool,
    security_processed: bool,
}
impl Message {
    pub fn new(msg_type: MessageType, code: Code, message_id: u16) -> Self {
        Self {
            msg_type,
            code,
            message_id,
            token: Token::new(),
            host: String::new(),
            port: 0,
            options: OptionSet::new(),
            payload: Vec::new(),
            send_unsecured: false,
            security_processed: false,
        }
    }

    /// Tokens longer than eight bytes are cut to eight.
    pub fn with_token(mut self, token: &[u8]) -> Self {
        self.token = token.iter().copied().take(MAX_TOKEN_SIZE).collect();
        self
    }
    pub fn with_peer(mut self, host: &str, port: u16) -> Self {
        self.host = host.to_string();
        self.port = port;
        self
    }
    pub fn with_option(mut self, number: u16, value: impl Into<Vec<u8>>) -> Self {
        self.options.add(number, value);
        self
    }
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }
    /// Flag this request to bypass protection once, for protocol bootstrapping.
    /// The flag is consumed when the request passes through `protect`.
    pub fn send_unsecured(mut self) -> Self {
        self.send_unsecured = true;
        self
    }

    /// Build the reply skeleton to this message: same peer, same token, same message id
    /// when the reply is an acknowledgement or reset.
    pub fn reply(&self, msg_type: MessageType, code: Code) -> Message {
        let mut reply = Message::new(msg_type, code, self.message_id);
        reply.host = self.host.clone();
        reply.port = self.port;
        if code != Code::EMPTY {
            reply.token = self.token.clone();
        }
        reply
    }

    pub fn role(&self) -> Role {
        self.code.role()
    }
    pub fn is_confirmable(&self) -> bool {
        self.msg_type == MessageType::Confirmable
    }
    /// A response carrying an Observe option.
    pub fn is_notification(&self) -> bool {
        self.role() == Role::Response && self.options.contains(OPTION_OBSERVE)
    }
    pub fn is_send_unsecured(&self) -> bool {
        self.send_unsecured
    }
    pub(crate) fn take_send_unsecured(&mut self) -> bool {
        std::mem::take(&mut self.send_unsecured)
    }
    /// Whether this message went through `protect` or `unprotect` successfully.
    pub fn is_security_processed(&self) -> bool {
        self.security_processed
    }
    pub(crate) fn mark_security_processed(&mut self) {
        self.security_processed = true;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn options_stay_sorted_and_stable() {
        let mut set = OptionSet::new();
        set.add(OPTION_URI_QUERY, "b=2");
        set.add(OPTION_URI_PATH, "first");
        set.add(OPTION_URI_HOST, "example.org");
        set.add(OPTION_URI_PATH, "second");
        set.add(OPTION_URI_QUERY, "a=1");
        let numbers: Vec<u16> = set.iter().map(|o| o.number).collect();
        assert_eq!(numbers, [OPTION_URI_HOST, OPTION_URI_PATH, OPTION_URI_PATH, OPTION_URI_QUERY, OPTION_URI_QUERY]);
        let paths: Vec<&[u8]> = set.get_all(OPTION_URI_PATH).collect();
        assert_eq!(paths, [&b"first"[..], &b"second"[..]]);
        assert_eq!(set.take(OPTION_URI_QUERY), vec![b"b=2".to_vec(), b"a=1".to_vec()]);
        assert!(!set.contains(OPTION_URI_QUERY));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn uint_values_are_minimal() {
        assert_eq!(encode_uint(0), Vec::<u8>::new());
        assert_eq!(encode_uint(1), vec![1]);
        assert_eq!(encode_uint(0x0100), vec![1, 0]);
        assert_eq!(encode_uint(0xffffff), vec![0xff, 0xff, 0xff]);
        assert_eq!(decode_uint(&[]), Some(0));
        assert_eq!(decode_uint(&[0, 0, 5]), Some(5));
        assert_eq!(decode_uint(&[1; 9]), None);
    }

    #[test]
    fn code_roles() {
        assert_eq!(Code::EMPTY.role(), Role::Empty);
        assert_eq!(Code::GET.role(), Role::Request);
        assert_eq!(Code::CONTENT.role(), Role::Response);
        assert_eq!(Code::INTERNAL_SERVER_ERROR.role(), Role::Response);
        assert_eq!(Code::new(7, 1).role(), Role::Empty);
        assert_eq!(Code::BAD_OPTION.0, 0x82);
        assert_eq!(Code::UNAUTHORIZED.to_string(), "4.01");
    }

    #[test]
    fn long_tokens_are_truncated() {
        let m = Message::new(MessageType::Confirmable, Code::GET, 1).with_token(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(&m.token[..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn send_unsecured_is_one_shot() {
        let mut m = Message::new(MessageType::Confirmable, Code::GET, 1).send_unsecured();
        assert!(m.is_send_unsecured());
        assert!(m.take_send_unsecured());
        assert!(!m.take_send_unsecured());
    }
}
