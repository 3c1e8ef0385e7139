// fixtures.rs: commonly used commands, packets and device buffers

use libex10::aggregate::AggregateOpBuffer;
use libex10::fifo::{make_gen2_transaction_packet, EventFifoPacket, Gen2Transaction};
use libex10::protocol::{
    AccessCommandArgs, AuthenticateCommandArgs, BlockPermalockCommandArgs, BlockPermalockReadLock,
    BlockWriteCommandArgs, Gen2Command, Gen2CommandType, KillCommandArgs, LockCommandArgs,
    MarginReadCommandArgs, MemoryBank, ReadCommandArgs, SelectAction, SelectCommandArgs,
    SelectMemoryBank, SelectTarget, WriteCommandArgs,
};
use libex10::BitSpan;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Select matching EPC bytes `e2 80`.
pub fn sample_select() -> Gen2Command {
    libex10::test_support::sample_select(&hex::decode("e280").unwrap())
}

pub fn sample_read() -> Gen2Command {
    Gen2Command::Read(ReadCommandArgs {
        memory_bank: MemoryBank::User,
        word_pointer: 200,
        word_count: 4,
    })
}

pub fn sample_write() -> Gen2Command {
    Gen2Command::Write(WriteCommandArgs {
        memory_bank: MemoryBank::Epc,
        word_pointer: 2,
        data: 0xbeef,
    })
}

/// Coarse gain 10, ramp up with no offset, exit.
pub fn ramp_up_buffer() -> AggregateOpBuffer {
    let mut buf = AggregateOpBuffer::new();
    buf.append_set_tx_coarse_gain(10).unwrap();
    buf.append_tx_ramp_up(0).unwrap();
    buf.append_exit_instruction().unwrap();
    buf
}

/// Successful Gen2Transaction packet carrying `reply` (error header
/// included) of `num_bits` bits.
pub fn gen2_reply_packet(num_bits: u16, reply: &[u8]) -> EventFifoPacket {
    make_gen2_transaction_packet(
        Gen2Transaction {
            transaction_id: 1,
            status: 1,
            num_bits,
            ..Default::default()
        },
        reply,
    )
}

/// Lock payload taken from the low 20 bits of `bits`, mask bits first.
pub fn lock_from_bits(bits: u32) -> LockCommandArgs {
    let b = |n: u32| bits & (1 << n) != 0;
    LockCommandArgs {
        kill_password_read_write_mask: b(0),
        kill_password_permalock_mask: b(1),
        access_password_read_write_mask: b(2),
        access_password_permalock_mask: b(3),
        epc_memory_write_mask: b(4),
        epc_memory_permalock_mask: b(5),
        tid_memory_write_mask: b(6),
        tid_memory_permalock_mask: b(7),
        file_0_memory_write_mask: b(8),
        file_0_memory_permalock_mask: b(9),
        kill_password_read_write_lock: b(10),
        kill_password_permalock: b(11),
        access_password_read_write_lock: b(12),
        access_password_permalock: b(13),
        epc_memory_write_lock: b(14),
        epc_memory_permalock: b(15),
        tid_memory_write_lock: b(16),
        tid_memory_permalock: b(17),
        file_0_memory_write_lock: b(18),
        file_0_memory_permalock: b(19),
    }
}

/// A command of type `kind` built around `pointer`. Commands with an EBV
/// word, bit or block pointer put it there; the others fold it into a
/// fixed-width field.
pub fn command_at(kind: Gen2CommandType, pointer: u32) -> Gen2Command {
    let low16 = (pointer & 0xffff) as u16;
    match kind {
        Gen2CommandType::Select => Gen2Command::Select(SelectCommandArgs {
            target: SelectTarget::Session2,
            action: SelectAction::Action100,
            memory_bank: SelectMemoryBank::Epc,
            bit_pointer: pointer,
            bit_count: 16,
            mask: Some(BitSpan::from_bytes(&[0xe2, 0x80])),
            truncate: false,
        }),
        Gen2CommandType::Read => Gen2Command::Read(ReadCommandArgs {
            memory_bank: MemoryBank::User,
            word_pointer: pointer,
            word_count: 2,
        }),
        Gen2CommandType::Write => Gen2Command::Write(WriteCommandArgs {
            memory_bank: MemoryBank::User,
            word_pointer: pointer,
            data: 0xbeef,
        }),
        Gen2CommandType::Kill1 => Gen2Command::Kill1(KillCommandArgs { password: low16 }),
        Gen2CommandType::Kill2 => Gen2Command::Kill2(KillCommandArgs { password: low16 }),
        Gen2CommandType::Lock => Gen2Command::Lock(lock_from_bits(pointer)),
        Gen2CommandType::Access => Gen2Command::Access(AccessCommandArgs { password: low16 }),
        Gen2CommandType::BlockWrite => Gen2Command::BlockWrite(BlockWriteCommandArgs {
            memory_bank: MemoryBank::Epc,
            word_pointer: pointer,
            word_count: 1,
            data: Some(BitSpan::from_bytes(&[0x12, 0x34])),
        }),
        Gen2CommandType::BlockPermalock => Gen2Command::BlockPermalock(BlockPermalockCommandArgs {
            read_lock: BlockPermalockReadLock::Permalock,
            memory_bank: MemoryBank::User,
            block_pointer: pointer,
            block_range: 1,
            mask: Some(BitSpan::from_bytes(&[0x80, 0x00])),
        }),
        Gen2CommandType::Authenticate => Gen2Command::Authenticate(AuthenticateCommandArgs {
            send_rep: false,
            inc_rep_len: false,
            csi: 1,
            length: low16 & 0x0fff,
            message: Some(BitSpan::from_bytes(&[0x00, 0x01, 0x02, 0x03])),
            rep_len_bits: 0,
        }),
        Gen2CommandType::MarginRead => Gen2Command::MarginRead(MarginReadCommandArgs {
            memory_bank: MemoryBank::Epc,
            bit_pointer: pointer,
            bit_length: 12,
            mask: Some(BitSpan::new(vec![0xab, 0xc0], 12).unwrap()),
        }),
    }
}

/// What `Gen2Command::decode` gives back for `command`: a Kill2 comes back
/// as Kill1, everything else unchanged.
pub fn decoded_form(command: &Gen2Command) -> Gen2Command {
    match command {
        Gen2Command::Kill2(args) => Gen2Command::Kill1(args.clone()),
        other => other.clone(),
    }
}
