#![allow(dead_code)]
use oscoap::application::{ApplicationLayer, CryptoLayer, Settings};
use oscoap::crypto_impl::{CrateAesCcm, CrateHkdfSha256};
use oscoap::proto::*;
use oscoap::{presets, Code, Message, MessageType, SecurityContextStore};

pub const CLIENT_HOST: &str = "10.0.0.1";
pub const SERVER_HOST: &str = "10.0.0.2";
pub const TIMEOUT: u64 = 10_000;
pub const MAX_PENDING: usize = 4;

pub struct TestCrypto;
impl CryptoLayer for TestCrypto {
    const SETTINGS: Settings = Settings { pending_request_timeout: TIMEOUT, max_pending_requests: MAX_PENDING };

    type Aead = CrateAesCcm;
    type Kdf = CrateHkdfSha256;
}

pub type Store = SecurityContextStore<TestCrypto>;

#[derive(Default)]
pub struct TestApp {
    pub now: i64,
    pub events: Vec<String>,
}
impl ApplicationLayer for TestApp {
    fn time(&mut self) -> i64 {
        self.now
    }

    #[cfg(feature = "logging")]
    fn event_log(&mut self, event: oscoap::LogEvent<'_>) {
        self.events.push(format!("{:?}", event));
    }
}

/// A client and a server endpoint sharing the preset contexts.
pub struct Pair {
    pub client: Store,
    pub server: Store,
    pub client_app: TestApp,
    pub server_app: TestApp,
}
impl Pair {
    pub fn new() -> Self {
        let client = Store::new();
        client.add(presets::client(SERVER_HOST));
        let server = Store::new();
        server.add(presets::server(CLIENT_HOST));
        Self { client, server, client_app: TestApp::default(), server_app: TestApp::default() }
    }

    /// Protect `request` at the client and hand it to the server as received off the wire.
    pub fn send_request(&mut self, request: Message) -> Message {
        let protected = self.client.protect(&mut self.client_app, request).unwrap();
        assert!(protected.is_transformed());
        wire(protected.into_message(), CLIENT_HOST)
    }
    /// Protect `response` at the server and hand it to the client as received off the wire.
    pub fn send_response(&mut self, response: Message) -> Message {
        let protected = self.server.protect(&mut self.server_app, response).unwrap();
        assert!(protected.is_transformed());
        wire(protected.into_message(), SERVER_HOST)
    }
}

/// What the peer sees of `message`: the same header, options and payload, arriving from `from`.
pub fn wire(message: Message, from: &str) -> Message {
    let mut received = Message::new(message.msg_type, message.code, message.message_id)
        .with_token(&message.token)
        .with_peer(from, 5683)
        .with_payload(message.payload);
    received.options = message.options;
    received
}

pub fn get(token: &[u8], path: &str) -> Message {
    Message::new(MessageType::Confirmable, Code::GET, 0x1000 + token[0] as u16)
        .with_token(token)
        .with_peer(SERVER_HOST, 5683)
        .with_option(OPTION_URI_PATH, path)
}
