//! Fuzz target for the sender-key wire parser.
//!
//! # Strategy
//!
//! - Arbitrary byte buffers as hostile wire messages
//! - Valid frames with selective corruption (type byte, distribution id,
//!   index, ciphertext)
//!
//! # Invariants
//!
//! - Parsing never panics; failures are structured errors
//! - A header that parses reports the exact on-wire fields
//! - Corrupted frames never decrypt

#![no_main]

use arbitrary::Arbitrary;
use haven_crypto::{
    MIN_WIRE_SIZE, WIRE_TYPE, generate_sender_key, parse_wire_header, sender_key_decrypt,
    sender_key_encrypt,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct WireScenario {
    /// Raw bytes thrown at the parser
    hostile: Vec<u8>,
    /// Plaintext for the valid-frame leg
    plaintext: Vec<u8>,
    /// Byte position to corrupt in the valid frame
    corrupt_at: usize,
    /// XOR mask for the corruption (0 keeps the frame intact)
    corrupt_mask: u8,
}

fuzz_target!(|scenario: WireScenario| {
    // INVARIANT 1: arbitrary bytes never panic the parser
    match parse_wire_header(&scenario.hostile) {
        Ok(header) => {
            assert!(scenario.hostile.len() >= MIN_WIRE_SIZE);
            assert_eq!(scenario.hostile[0], WIRE_TYPE);
            assert_eq!(&scenario.hostile[1..17], &header.distribution_id);
        }
        Err(_) => {}
    }

    // INVARIANT 2: a well-formed frame round-trips, and any corruption
    // either fails structurally or fails authentication
    let mut sender = generate_sender_key();
    let mut receiver = sender.to_receiver();
    let mut wire = sender_key_encrypt(&mut sender, &scenario.plaintext);

    let corrupted = !wire.is_empty() && scenario.corrupt_mask != 0;
    if corrupted {
        let at = scenario.corrupt_at % wire.len();
        wire[at] ^= scenario.corrupt_mask;
    }

    match sender_key_decrypt(&wire, &mut receiver) {
        Ok(decrypted) => {
            assert!(!corrupted, "corrupted frame must not decrypt");
            assert_eq!(decrypted, scenario.plaintext);
        }
        Err(_) => assert!(corrupted, "intact frame must decrypt"),
    }
});
