#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use libex10::fifo::{EventFifoQueue, EventPacketType, PacketData};
use libex10::test_support::{custom_packets, small_pools};
use libex10::transport::MockTransport;
use libex10::utils::default_packet_wait;
use libex10::Error;
use serial_test::serial;

const NODES: u8 = 20;

#[test]
#[serial]
fn producer_and_consumer_threads() -> anyhow::Result<()> {
    common::fixtures::init_logging();
    let queue = Arc::new(EventFifoQueue::new(Arc::new(small_pools(2, 2)?)));

    let producer = {
        let queue = queue.clone();
        thread::spawn(move || -> libex10::Result<()> {
            for n in 0..NODES {
                let data = custom_packets(&[&[n, 0, 0, 0], &[n, 1, 0, 0]])?;
                loop {
                    match queue.push_fifo_data(&data) {
                        Ok(()) => break,
                        Err(Error::NoFreeBuffers) => thread::sleep(Duration::from_millis(1)),
                        Err(e) => return Err(e),
                    }
                }
            }
            Ok(())
        })
    };

    let mut device = MockTransport::new();
    let mut seen = Vec::new();
    while seen.len() < usize::from(NODES) * 2 {
        match queue.packet_peek(&mut device) {
            Some(packet) => {
                assert_eq!(packet.packet_type, EventPacketType::Custom);
                assert_eq!(packet.data()?, PacketData::Custom { payload_len: 4 });
                seen.push((packet.dynamic_data[0], packet.dynamic_data[1]));
                queue.packet_remove(&mut device);
            }
            None => assert!(
                !queue.packet_wait_with_timeout(default_packet_wait() * 5),
                "producer stalled after {} packets",
                seen.len()
            ),
        }
    }
    producer.join().expect("producer panicked")?;

    let expected: Vec<(u8, u8)> = (0..NODES).flat_map(|n| [(n, 0), (n, 1)]).collect();
    assert_eq!(seen, expected);

    // last node goes back once the cursor moves past it
    assert_eq!(queue.packet_peek(&mut device), None);
    assert_eq!(queue.pools().event.free_list_size(), 2);
    Ok(())
}

#[test]
#[serial]
fn unwait_releases_blocked_consumer() {
    let queue = Arc::new(EventFifoQueue::new(Arc::new(small_pools(1, 1).unwrap())));
    let waiter = {
        let queue = queue.clone();
        thread::spawn(move || queue.packet_wait())
    };
    thread::sleep(Duration::from_millis(20));
    queue.packet_unwait();
    waiter.join().unwrap();

    let mut device = MockTransport::new();
    assert_eq!(queue.packet_peek(&mut device), None);
}
