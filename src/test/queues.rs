use crate::net::{Network, NodeId, Packet, TcpSegment, Transport};
use crate::queue::{DEFAULT_PKT_BYTES, DEFAULT_QUEUE_PKTS, DropTailQueue, PacketQueue, mem_from_pkt};

fn data_pkt(net: &mut Network, size_bytes: u32) -> Packet {
    net.make_packet(
        1,
        size_bytes,
        NodeId(0),
        NodeId(1),
        Transport::Tcp(TcpSegment::Data { seq: 0, len: size_bytes }),
    )
}

#[test]
fn droptail_queue_enforces_capacity_and_preserves_order() {
    let mut net = Network::default();
    let mut q = DropTailQueue::new(100);
    assert_eq!(q.capacity_bytes(), 100);
    assert!(q.is_empty());

    let first = data_pkt(&mut net, 60);
    let first_id = first.id;
    assert!(q.enqueue(first).is_ok());
    assert_eq!(q.len(), 1);
    assert_eq!(q.bytes(), 60);

    let dropped = q.enqueue(data_pkt(&mut net, 50)).expect_err("should drop");
    assert_eq!(dropped.size_bytes, 50);
    assert_eq!(q.drops(), 1);
    assert_eq!(q.len(), 1);
    assert_eq!(q.bytes(), 60);

    assert!(q.enqueue(data_pkt(&mut net, 40)).is_ok());
    assert_eq!(q.bytes(), 100);

    assert_eq!(q.dequeue().expect("pkt").id, first_id);
    assert_eq!(q.dequeue().expect("pkt").size_bytes, 40);
    assert_eq!(q.bytes(), 0);
    assert!(q.dequeue().is_none());
}

#[test]
fn default_link_queue_holds_one_hundred_full_segments() {
    let mut net = Network::default();
    let mut q = DropTailQueue::new(mem_from_pkt(DEFAULT_QUEUE_PKTS));
    for _ in 0..DEFAULT_QUEUE_PKTS {
        assert!(q.enqueue(data_pkt(&mut net, DEFAULT_PKT_BYTES as u32)).is_ok());
    }
    assert!(q.enqueue(data_pkt(&mut net, 42)).is_err());
    assert_eq!(q.len() as u64, DEFAULT_QUEUE_PKTS);
}

#[test]
fn mem_from_pkt_multiplies_default_packet_bytes_and_saturates() {
    assert_eq!(mem_from_pkt(0), 0);
    assert_eq!(mem_from_pkt(2), DEFAULT_PKT_BYTES.saturating_mul(2));
    assert_eq!(mem_from_pkt(u64::MAX), u64::MAX);
}
