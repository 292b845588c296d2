//! Fixed key material for interoperability testing.
//!
//! Every context here is public knowledge. Never use them outside of tests.
use crate::context::{EndpointKeys, SecurityContext};

/// The master secret the preset keys were derived from, `0x01..=0x23`.
pub const MASTER_SECRET: [u8; 35] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12,
    0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23,
];

pub const CLIENT_ID: &[u8] = b"client";
pub const CLIENT_KEY: [u8; 16] = [
    0x21, 0x64, 0x42, 0xda, 0x60, 0x3c, 0x51, 0x59, 0x2d, 0xf4, 0xc3, 0xd0, 0xcd, 0x1d, 0x0d, 0x48,
];
pub const CLIENT_IV: [u8; 7] = [0x01, 0x53, 0xdd, 0xfe, 0xde, 0x44, 0x19];

pub const SERVER_ID: &[u8] = b"server";
pub const SERVER_KEY: [u8; 16] = [
    0xd5, 0xcb, 0x37, 0x10, 0x37, 0x15, 0x34, 0xa1, 0xca, 0x22, 0x4e, 0x19, 0xeb, 0x96, 0xe9, 0x6d,
];
pub const SERVER_IV: [u8; 7] = [0x20, 0x75, 0x0b, 0x95, 0xf9, 0x78, 0xc8];

fn bump_last(mut key: [u8; 16]) -> [u8; 16] {
    key[15] = key[15].wrapping_add(1);
    key
}

/// The server's context for talking to the client at `client_host`.
pub fn server(client_host: &str) -> SecurityContext {
    SecurityContext::new(
        client_host,
        EndpointKeys::new(SERVER_ID, SERVER_KEY, SERVER_IV),
        EndpointKeys::new(CLIENT_ID, CLIENT_KEY, CLIENT_IV),
    )
}

/// The client's context for talking to the server at `server_host`.
pub fn client(server_host: &str) -> SecurityContext {
    SecurityContext::new(
        server_host,
        EndpointKeys::new(CLIENT_ID, CLIENT_KEY, CLIENT_IV),
        EndpointKeys::new(SERVER_ID, SERVER_KEY, SERVER_IV),
    )
}

/// Like `client`, but sending as "clienu", an id the server has no context for.
pub fn client_false_sender_id(server_host: &str) -> SecurityContext {
    SecurityContext::new(
        server_host,
        EndpointKeys::new(b"clienu", CLIENT_KEY, CLIENT_IV),
        EndpointKeys::new(SERVER_ID, SERVER_KEY, SERVER_IV),
    )
}

/// Like `client`, but sealing requests with a key the server does not share.
pub fn client_false_sender_key(server_host: &str) -> SecurityContext {
    SecurityContext::new(
        server_host,
        EndpointKeys::new(CLIENT_ID, bump_last(CLIENT_KEY), CLIENT_IV),
        EndpointKeys::new(SERVER_ID, SERVER_KEY, SERVER_IV),
    )
}

/// Like `client`, but unable to open the server's responses.
pub fn client_false_recipient_key(server_host: &str) -> SecurityContext {
    SecurityContext::new(
        server_host,
        EndpointKeys::new(CLIENT_ID, CLIENT_KEY, CLIENT_IV),
        EndpointKeys::new(SERVER_ID, bump_last(SERVER_KEY), SERVER_IV),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn broken_keys_differ_in_last_byte() {
        assert_eq!(bump_last(CLIENT_KEY)[15], 0x49);
        assert_eq!(bump_last(SERVER_KEY)[15], 0x6e);
        assert_eq!(client_false_sender_id("h").sender_id(), &[0x63, 0x6c, 0x69, 0x65, 0x6e, 0x75]);
        assert_eq!(client("h").recipient_id(), server("h").sender_id());
    }
}
