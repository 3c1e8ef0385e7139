use libex10::protocol::bits::{bit_pack, bit_unpack_u32, BitReader, BitWriter};
use libex10::protocol::ebv::{ebv_length_decode, get_ebv_bit_len};
use libex10::Error;
use proptest::prelude::*;

fn bit(data: &[u8], pos: usize) -> u8 {
    (data[pos / 8] >> (7 - pos % 8)) & 1
}

proptest! {
    #[test]
    fn pack_then_unpack_any_offset(
        fill in any::<u8>(),
        offset in 0usize..64,
        bit_count in 1usize..=32,
        raw in any::<u32>(),
    ) {
        let value = if bit_count == 32 { raw } else { raw & ((1u32 << bit_count) - 1) };
        let mut buf = [fill; 16];
        let before = buf;
        let end = bit_pack(&mut buf, offset, value, bit_count).unwrap();
        prop_assert_eq!(end, offset + bit_count);
        prop_assert_eq!(bit_unpack_u32(&buf, offset, bit_count).unwrap(), value);
        for pos in (0..offset).chain(end..128) {
            prop_assert_eq!(bit(&buf, pos), bit(&before, pos), "bit {} changed", pos);
        }
    }

    #[test]
    fn ebv_length_matches_encoding(offset in 0usize..32, value in any::<u32>()) {
        let ebv_bits = get_ebv_bit_len(value);
        let mut w = BitWriter::with_bit_len(offset + ebv_bits);
        w.put(0, offset).unwrap().put_ebv(value).unwrap();
        let span = w.finish().unwrap();

        prop_assert_eq!(ebv_length_decode(span.as_bytes(), offset).unwrap(), ebv_bits / 8);
        let mut r = BitReader::new(&span);
        r.get(offset).unwrap();
        prop_assert_eq!(r.get_ebv().unwrap(), value);
        prop_assert_eq!(r.remaining(), 0);
    }
}

#[test]
fn ebv_boundaries() {
    assert_eq!(get_ebv_bit_len(127), 8);
    assert_eq!(get_ebv_bit_len(128), 16);
    assert_eq!(get_ebv_bit_len(16383), 16);
    assert_eq!(get_ebv_bit_len(16384), 24);
    // 0x81 0x80 0x00: three groups
    assert_eq!(ebv_length_decode(&[0x81, 0x80, 0x00], 0).unwrap(), 3);
    assert_eq!(ebv_length_decode(&[0x81, 0x00], 0).unwrap(), 2);
}

#[test]
fn pack_rejects_value_wider_than_field() {
    let mut buf = [0u8; 4];
    match bit_pack(&mut buf, 0, 0x10, 4) {
        Err(Error::BadParamValue(_)) => {}
        other => panic!("expected BadParamValue, got: {:?}", other),
    }
    match bit_pack(&mut buf, 30, 0x3, 4) {
        Err(Error::InvalidLength { .. }) => {}
        other => panic!("expected InvalidLength, got: {:?}", other),
    }
    assert_eq!(buf, [0; 4]);
}
