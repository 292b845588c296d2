mod common;

use std::collections::HashSet;

use common::*;
use oscoap::proto::OPTION_OBJECT_SECURITY;
use oscoap::{Code, Message, MessageType, Window};
use proptest::prelude::*;

const OPTION_NUMBERS: [u16; 14] = [1, 3, 4, 5, 6, 7, 8, 11, 12, 14, 15, 17, 39, 1000];

fn arb_request() -> impl Strategy<Value = Message> {
    (
        prop::sample::select(vec![Code::GET, Code::POST, Code::PUT, Code::DELETE]),
        prop::collection::vec(1u8..=255, 1..=8),
        prop::collection::vec((prop::sample::select(OPTION_NUMBERS.to_vec()), prop::collection::vec(any::<u8>(), 0..20)), 0..8),
        prop::collection::vec(any::<u8>(), 0..64),
    )
        .prop_map(|(code, token, options, payload)| {
            let mut m = Message::new(MessageType::Confirmable, code, 1)
                .with_token(&token)
                .with_peer(SERVER_HOST, 5683)
                .with_payload(payload);
            for (number, value) in options {
                m.options.add(number, value);
            }
            m
        })
}

proptest! {
    /// The window accepts a counter iff it was never accepted and is not 32 or more behind the
    /// highest one accepted.
    #[test]
    fn window_matches_model(counters in prop::collection::vec(0u64..200, 1..200)) {
        let mut window = Window::new();
        let mut seen = HashSet::new();
        let mut highest = 0u64;
        for n in counters {
            let fresh = !seen.contains(&n) && (n > highest || highest - n < 32);
            prop_assert_eq!(window.check(n), fresh);
            prop_assert_eq!(window.update(n), fresh);
            if fresh {
                seen.insert(n);
                highest = highest.max(n);
            }
        }
    }

    #[test]
    fn increasing_counters_always_pass(start in 0u64..1 << 40, steps in prop::collection::vec(1u64..100, 1..50)) {
        let mut window = Window::new();
        let mut n = start;
        for step in steps {
            prop_assert!(window.update(n));
            prop_assert!(!window.check(n));
            n += step;
        }
    }

    #[test]
    fn request_round_trip(request in arb_request()) {
        let mut pair = Pair::new();
        let sent = pair.send_request(request.clone());
        let received = pair.server.unprotect(&mut pair.server_app, sent).unwrap().into_message();
        prop_assert_eq!(&received.options, &request.options);
        prop_assert_eq!(&received.payload, &request.payload);
        prop_assert_eq!(received.code, request.code);
    }

    #[test]
    fn single_bit_flips_are_rejected(request in arb_request(), index in any::<prop::sample::Index>(), bit in 0u8..8) {
        let mut pair = Pair::new();
        let sent = pair.send_request(request);
        let mut tampered = sent.clone();
        if tampered.payload.is_empty() {
            let mut envelope = tampered.options.take(OPTION_OBJECT_SECURITY).remove(0);
            let i = index.index(envelope.len());
            envelope[i] ^= 1 << bit;
            tampered.options.add(OPTION_OBJECT_SECURITY, envelope);
        } else {
            let i = index.index(tampered.payload.len());
            tampered.payload[i] ^= 1 << bit;
        }
        prop_assert!(pair.server.unprotect(&mut pair.server_app, tampered).is_err());
        prop_assert!(pair.server.unprotect(&mut pair.server_app, sent).is_ok());
    }
}
