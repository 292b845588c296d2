use std::time::Instant;

use rand_core::{OsRng, RngCore};

use oscoap::application::ApplicationLayer;
use oscoap::crypto_impl::DefaultCrypto;
use oscoap::proto::*;
use oscoap::resource::{check_resource_policy, ResourcePolicy};
use oscoap::{Code, Message, MessageType, SecurityContext, SecurityContextStore};

struct DemoCrypto;
impl DefaultCrypto for DemoCrypto {}

struct Endpoint {
    name: &'static str,
    start: Instant,
}
impl ApplicationLayer for &Endpoint {
    fn time(&mut self) -> i64 {
        self.start.elapsed().as_millis() as i64
    }

    #[cfg(feature = "logging")]
    fn event_log(&mut self, event: oscoap::LogEvent<'_>) {
        println!("[{}] {:?}", self.name, event);
    }
}

/// Hand `message` to the peer as it would arrive off the wire.
fn transmit(message: Message, from: &str) -> Message {
    let mut received = Message::new(message.msg_type, message.code, message.message_id)
        .with_token(&message.token)
        .with_peer(from, 5683)
        .with_payload(message.payload);
    received.options = message.options;
    received
}

fn main() {
    const CLIENT_HOST: &str = "[fd00::1]";
    const SERVER_HOST: &str = "[fd00::2]";

    let mut master_secret = [0u8; 32];
    let mut master_salt = [0u8; 8];
    OsRng.fill_bytes(&mut master_secret);
    OsRng.fill_bytes(&mut master_salt);

    let start = Instant::now();
    let client = Endpoint { name: "client", start };
    let server = Endpoint { name: "server", start };

    let client_store = SecurityContextStore::<DemoCrypto>::new();
    client_store.add(
        SecurityContext::derive::<DemoCrypto>(SERVER_HOST, &master_secret, &master_salt, b"client", b"server")
            .expect("key derivation failed"),
    );
    let server_store = SecurityContextStore::<DemoCrypto>::new();
    server_store.add(
        SecurityContext::derive::<DemoCrypto>(CLIENT_HOST, &master_secret, &master_salt, b"server", b"client")
            .expect("key derivation failed"),
    );

    let request = Message::new(MessageType::Confirmable, Code::POST, 0x7d34)
        .with_token(&[0x4a, 0x01])
        .with_peer(SERVER_HOST, 5683)
        .with_option(OPTION_URI_PATH, "actuators")
        .with_option(OPTION_URI_PATH, "led")
        .with_payload("on");
    let protected = client_store.protect(&client, request).expect("protect failed").into_message();
    println!(
        "request on the wire: {} options, {} byte envelope",
        protected.options.len(),
        protected.payload.len()
    );

    let received = server_store
        .unprotect(&server, transmit(protected.clone(), CLIENT_HOST))
        .expect("unprotect failed")
        .into_message();
    assert!(check_resource_policy(ResourcePolicy::Protected, &received).is_none());
    println!(
        "server got {} {:?} with payload {:?}",
        received.code,
        received.options.get_all(OPTION_URI_PATH).map(String::from_utf8_lossy).collect::<Vec<_>>(),
        String::from_utf8_lossy(&received.payload)
    );

    let response = received.reply(MessageType::Acknowledgement, Code::CHANGED).with_payload("led is on");
    let protected_response = server_store.protect(&server, response).expect("protect failed").into_message();
    let answer = client_store
        .unprotect(&client, transmit(protected_response, SERVER_HOST))
        .expect("unprotect failed")
        .into_message();
    println!("client got {} with payload {:?}", answer.code, String::from_utf8_lossy(&answer.payload));

    // A captured request played back is refused.
    match server_store.unprotect(&server, transmit(protected, CLIENT_HOST)) {
        Ok(_) => println!("replay went through"),
        Err(rejection) => println!("replay refused: {:?} -> {:?}", rejection.fault, rejection.action),
    }

    println!("next service in {} ms", client_store.service(&client));
}
