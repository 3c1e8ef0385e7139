#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{decoded_form, lock_from_bits};
use libex10::protocol::{
    AccessCommandArgs, AuthenticateCommandArgs, BlockPermalockCommandArgs, BlockPermalockReadLock,
    BlockWriteCommandArgs, Gen2Command, Gen2CommandType, KillCommandArgs, MarginReadCommandArgs,
    MemoryBank, ReadCommandArgs, ResponseType, SelectAction, SelectCommandArgs, SelectMemoryBank,
    SelectTarget, WriteCommandArgs,
};
use libex10::BitSpan;
use proptest::prelude::*;

fn memory_bank() -> impl Strategy<Value = MemoryBank> {
    (0u8..4).prop_map(|b| MemoryBank::try_from(b).unwrap())
}

fn bytes(range: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = BitSpan> {
    prop::collection::vec(any::<u8>(), range).prop_map(|b| BitSpan::from_bytes(&b))
}

// Commands carrying an EBV pointer.
fn pointer_command() -> impl Strategy<Value = Gen2Command> {
    prop_oneof![
        (memory_bank(), any::<u32>(), any::<u8>()).prop_map(|(memory_bank, word_pointer, word_count)| {
            Gen2Command::Read(ReadCommandArgs {
                memory_bank,
                word_pointer,
                word_count,
            })
        }),
        (memory_bank(), any::<u32>(), any::<u16>()).prop_map(|(memory_bank, word_pointer, data)| {
            Gen2Command::Write(WriteCommandArgs {
                memory_bank,
                word_pointer,
                data,
            })
        }),
        (
            0u8..5,
            0u8..8,
            0u8..4,
            any::<u32>(),
            prop::collection::vec(any::<u8>(), 1..=8),
            any::<bool>(),
        )
            .prop_map(|(target, action, bank, bit_pointer, mask, truncate)| {
                Gen2Command::Select(SelectCommandArgs {
                    target: SelectTarget::try_from(target).unwrap(),
                    action: SelectAction::try_from(action).unwrap(),
                    memory_bank: SelectMemoryBank::try_from(bank).unwrap(),
                    bit_pointer,
                    bit_count: (mask.len() * 8) as u8,
                    mask: Some(BitSpan::from_bytes(&mask)),
                    truncate,
                })
            }),
        (memory_bank(), any::<u32>(), 1u8..=4, bytes(2..=8)).prop_map(
            |(memory_bank, word_pointer, word_count, data)| {
                Gen2Command::BlockWrite(BlockWriteCommandArgs {
                    memory_bank,
                    word_pointer,
                    word_count,
                    data: Some(data),
                })
            }
        ),
        (0u8..2, memory_bank(), any::<u32>(), any::<u8>(), bytes(0..=4)).prop_map(
            |(read_lock, memory_bank, block_pointer, block_range, mask)| {
                Gen2Command::BlockPermalock(BlockPermalockCommandArgs {
                    read_lock: BlockPermalockReadLock::try_from(read_lock).unwrap(),
                    memory_bank,
                    block_pointer,
                    block_range,
                    mask: Some(mask),
                })
            }
        ),
        (memory_bank(), any::<u32>(), any::<u8>(), bytes(0..=8)).prop_map(
            |(memory_bank, bit_pointer, bit_length, mask)| {
                Gen2Command::MarginRead(MarginReadCommandArgs {
                    memory_bank,
                    bit_pointer,
                    bit_length,
                    mask: Some(mask),
                })
            }
        ),
    ]
}

// Commands made of fixed-width fields only.
fn fixed_field_command() -> impl Strategy<Value = Gen2Command> {
    prop_oneof![
        any::<u16>().prop_map(|password| Gen2Command::Access(AccessCommandArgs { password })),
        any::<u16>().prop_map(|password| Gen2Command::Kill1(KillCommandArgs { password })),
        any::<u16>().prop_map(|password| Gen2Command::Kill2(KillCommandArgs { password })),
        any::<u32>().prop_map(|bits| Gen2Command::Lock(lock_from_bits(bits))),
        (any::<bool>(), any::<bool>(), any::<u8>(), 0u16..0x1000, bytes(0..=16)).prop_map(
            |(send_rep, inc_rep_len, csi, length, message)| {
                Gen2Command::Authenticate(AuthenticateCommandArgs {
                    send_rep,
                    inc_rep_len,
                    csi,
                    length,
                    message: Some(message),
                    rep_len_bits: 0,
                })
            }
        ),
    ]
}

fn gen2_command() -> impl Strategy<Value = Gen2Command> {
    prop_oneof![pointer_command(), fixed_field_command()]
}

proptest! {
    #[test]
    fn decode_inverts_encode(command in gen2_command()) {
        let encoded = command.encode().unwrap();
        let decoded = Gen2Command::decode(&encoded).unwrap();
        prop_assert_eq!(decoded.encode().unwrap(), encoded);
        prop_assert_eq!(decoded, decoded_form(&command));
    }
}

#[test]
fn kill2_decodes_as_kill1() {
    let encoded = Gen2Command::Kill2(KillCommandArgs { password: 0x1234 })
        .encode()
        .unwrap();
    assert_eq!(
        Gen2Command::decode(&encoded).unwrap().command_type(),
        Gen2CommandType::Kill1
    );
}

#[test]
fn read_reply_length_follows_word_count() {
    let controls = common::fixtures::sample_read().tx_control_config();
    assert_eq!(controls.response_type, ResponseType::Immediate);
    assert!(controls.has_header_bit);
    assert_eq!(controls.rx_length, 33 + 4 * 16);

    let select = common::fixtures::sample_select().tx_control_config();
    assert_eq!(select.response_type, ResponseType::None);
    assert_eq!(select.rx_length, 0);
}

#[test]
fn select_without_mask_fails_encode() {
    let Gen2Command::Select(mut args) = common::fixtures::sample_select() else {
        unreachable!()
    };
    args.mask = None;
    assert!(Gen2Command::Select(args).encode().is_err());
}
