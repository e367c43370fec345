//! Fuzz target for the distribution payload codec.
//!
//! # Invariants
//!
//! - Parsing never panics on arbitrary input
//! - Buffers under 52 bytes always fail with the length error
//! - Encode/parse is the identity on the three fields

#![no_main]

use arbitrary::Arbitrary;
use haven_crypto::{
    SKDM_PAYLOAD_SIZE, SenderKeyError, SenderKeyState, create_skdm_payload, parse_skdm_payload,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct SkdmScenario {
    hostile: Vec<u8>,
    distribution_id: [u8; 16],
    chain_key: [u8; 32],
    chain_index: u32,
}

fuzz_target!(|scenario: SkdmScenario| {
    match parse_skdm_payload(&scenario.hostile) {
        Ok(received) => {
            assert!(scenario.hostile.len() >= SKDM_PAYLOAD_SIZE);
            assert_eq!(received.distribution_id(), &scenario.hostile[..16]);
        }
        Err(SenderKeyError::SkdmTooShort { actual }) => {
            assert_eq!(actual, scenario.hostile.len());
            assert!(actual < SKDM_PAYLOAD_SIZE);
        }
        Err(other) => panic!("unexpected parse error: {other}"),
    }

    let state = SenderKeyState::from_parts(
        scenario.distribution_id,
        scenario.chain_key,
        scenario.chain_index,
    );
    let payload = create_skdm_payload(&state);
    let received = parse_skdm_payload(&payload).expect("fixed-size payload must parse");

    assert_eq!(received.distribution_id(), &scenario.distribution_id);
    assert_eq!(received.chain_index(), scenario.chain_index);
});
