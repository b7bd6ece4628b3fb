//! Transport-layer tags carried by packets.

/// Packet transport metadata.
///
/// `Packet` is a network-layer carrier; the tag lets the destination hand the
/// segment to the protocol stack without the network knowing protocol state.
#[derive(Debug, Clone, Default)]
pub enum Transport {
    #[default]
    None,
    Tcp(TcpSegment),
}

/// TCP segment (minimal fields for simulation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcpSegment {
    /// Connection request addressed to a listening port.
    Syn { dst_port: u16 },
    SynAck,
    /// `seq` is the byte sequence number, `len` the payload bytes.
    Data { seq: u64, len: u32 },
    /// Cumulative ACK: `ack` is the next expected byte.
    Ack { ack: u64 },
}
