use libex10::aggregate::AggregateOpBuffer;
use libex10::registers::RegulatoryTimers;
use proptest::prelude::*;

/// One of a handful of helpers, chosen by `pick`.
fn append_step(buf: &mut AggregateOpBuffer, pick: u8, arg: u8) -> bool {
    let appended = match pick % 8 {
        0 => buf.append_set_tx_coarse_gain(arg),
        1 => buf.append_tx_ramp_up(i32::from(arg) - 128),
        2 => buf.append_identifier(u16::from(arg)),
        3 => buf.append_host_mutex(arg % 2 == 0),
        4 => buf.append_measure_rssi(arg),
        5 => buf.append_insert_fifo_event(arg % 2 == 0, None),
        6 => buf.append_set_regulatory_timers(&RegulatoryTimers {
            nominal_ms: u16::from(arg),
            ..Default::default()
        }),
        _ => buf.append_reset(arg),
    };
    appended.is_ok()
}

proptest! {
    #[test]
    fn every_start_offset_resolves(steps in prop::collection::vec((any::<u8>(), any::<u8>()), 1..40)) {
        let mut buf = AggregateOpBuffer::new();
        for (pick, arg) in steps {
            if !append_step(&mut buf, pick, arg) {
                break;
            }
        }

        // walk the encoded bytes to collect the starting offsets
        let mut starts = Vec::new();
        let mut idx = 0;
        while idx < buf.len() {
            starts.push(idx);
            idx += libex10::aggregate::instruction_size(&buf.as_bytes()[idx..]).unwrap();
        }
        prop_assert_eq!(idx, buf.len());

        for (ordinal, &start) in starts.iter().enumerate() {
            let (_, found) = buf.get_instruction_from_index(start).unwrap();
            prop_assert_eq!(found, ordinal);
        }
        for k in 0..=buf.len() {
            if !starts.contains(&k) {
                prop_assert!(buf.get_instruction_from_index(k).is_err());
            }
        }
    }

    #[test]
    fn overflow_never_changes_length(fill in 0usize..40, size in 1usize..100) {
        let mut buf = AggregateOpBuffer::with_capacity(64);
        for _ in 0..fill {
            if buf.append_exit_instruction().is_err() {
                break;
            }
        }
        let before = buf.len();
        let data = vec![0u8; size];
        let result = buf.append_reg_write(&libex10::registers::AGGREGATE_OP_BUFFER, &data);
        if before + 5 + size >= 64 {
            prop_assert!(result.is_err());
            prop_assert_eq!(buf.len(), before);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(buf.len(), before + 5 + size);
        }
    }
}
