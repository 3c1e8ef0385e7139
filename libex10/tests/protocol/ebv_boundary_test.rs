#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{command_at, decoded_form};
use libex10::protocol::{get_ebv_bit_len, Gen2Command, Gen2CommandType};

// One- to three-byte EBV edges.
const POINTERS: [u32; 5] = [0, 127, 128, 16383, 16384];

fn every_command_type() -> Vec<Gen2CommandType> {
    (0u8..=10)
        .map(|value| Gen2CommandType::try_from(value).unwrap())
        .collect()
}

fn has_ebv_pointer(kind: Gen2CommandType) -> bool {
    matches!(
        kind,
        Gen2CommandType::Select
            | Gen2CommandType::Read
            | Gen2CommandType::Write
            | Gen2CommandType::BlockWrite
            | Gen2CommandType::BlockPermalock
            | Gen2CommandType::MarginRead
    )
}

#[test]
fn table_covers_every_command_type() {
    let kinds = every_command_type();
    assert_eq!(kinds.len(), 11);
    assert!(Gen2CommandType::try_from(11).is_err());
    for kind in kinds {
        let command = command_at(kind, 0);
        assert_eq!(command.command_type(), kind);
    }
}

#[test]
fn every_command_round_trips_at_ebv_edges() {
    common::fixtures::init_logging();
    for kind in every_command_type() {
        for pointer in POINTERS {
            let command = command_at(kind, pointer);
            let encoded = command
                .encode()
                .unwrap_or_else(|e| panic!("{} at {}: {}", kind, pointer, e));
            let decoded = Gen2Command::decode(&encoded)
                .unwrap_or_else(|e| panic!("{} at {}: {}", kind, pointer, e));
            assert_eq!(decoded, decoded_form(&command), "{} at {}", kind, pointer);
            assert_eq!(decoded.encode().unwrap(), encoded, "{} at {}", kind, pointer);
        }
    }
}

#[test]
fn pointer_width_follows_ebv_length() {
    for kind in every_command_type().into_iter().filter(|k| has_ebv_pointer(*k)) {
        let base = command_at(kind, 0).encode().unwrap().len();
        for pointer in POINTERS {
            let encoded = command_at(kind, pointer).encode().unwrap();
            assert_eq!(
                encoded.len(),
                base + get_ebv_bit_len(pointer) - 8,
                "{} at {}",
                kind,
                pointer
            );
        }
    }
}

#[test]
fn fixed_width_commands_ignore_pointer_value() {
    for kind in every_command_type().into_iter().filter(|k| !has_ebv_pointer(*k)) {
        let lengths: Vec<usize> = POINTERS
            .iter()
            .map(|&p| command_at(kind, p).encode().unwrap().len())
            .collect();
        assert!(lengths.windows(2).all(|w| w[0] == w[1]), "{}: {:?}", kind, lengths);
    }
}
