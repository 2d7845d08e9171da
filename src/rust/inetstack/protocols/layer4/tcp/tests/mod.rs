// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.


use crate::inetstack::{
    protocols::layer4::tcp::{
        compute_checksum,
        SeqNumber,
        TcpHeader,
    },
    test_helpers::{
        network::OutboundSegment,
        ALICE_IPV4,
        ALICE_PORT,
        BOB_IPV4,
        BOB_PORT,
    },
};
use ::anyhow::Result;
use ::bytes::Bytes;
use ::std::net::Ipv4Addr;

//=============================================================================

/// Parses a segment Alice sent to Bob, checking addressing and checksum.
pub fn extract_header(segment: OutboundSegment) -> Result<(TcpHeader, Bytes)> {
    let (dst, bytes): (Ipv4Addr, Bytes) = segment;
    crate::ensure_eq!(dst, BOB_IPV4);
    crate::ensure_eq!(compute_checksum(&bytes, &ALICE_IPV4, &BOB_IPV4), 0);
    let (header, payload): (TcpHeader, Bytes) = TcpHeader::parse(&bytes)?;
    crate::ensure_eq!(header.src_port, ALICE_PORT);
    crate::ensure_eq!(header.dst_port, BOB_PORT);
    Ok((header, payload))
}

//=============================================================================

/// Checks for a SYN+ACK answering a SYN with sequence number `peer_seq_num`.
pub fn check_packet_syn_ack(segment: OutboundSegment, peer_seq_num: SeqNumber) -> Result<()> {
    let (header, payload): (TcpHeader, Bytes) = extract_header(segment)?;
    crate::ensure_eq!(payload.len(), 0);
    crate::ensure_eq!(header.syn, true);
    crate::ensure_eq!(header.ack, true);
    crate::ensure_eq!(header.fin, false);
    crate::ensure_eq!(header.seq_num, peer_seq_num);
    crate::ensure_eq!(header.ack_num, peer_seq_num + SeqNumber::from(1));
    Ok(())
}

//=============================================================================

/// Checks for a data packet and returns its payload.
pub fn check_packet_data(
    segment: OutboundSegment,
    window_size: u16,
    seq_num: SeqNumber,
    ack_num: SeqNumber,
) -> Result<Bytes> {
    let (header, payload): (TcpHeader, Bytes) = extract_header(segment)?;
    crate::ensure_neq!(payload.len(), 0);
    crate::ensure_eq!(header.syn, false);
    crate::ensure_eq!(header.fin, false);
    crate::ensure_eq!(header.ack, true);
    crate::ensure_eq!(header.window_size, window_size);
    crate::ensure_eq!(header.seq_num, seq_num);
    crate::ensure_eq!(header.ack_num, ack_num);
    Ok(payload)
}

//=============================================================================

/// Checks for an ACK without payload.
pub fn check_packet_pure_ack(segment: OutboundSegment, seq_num: SeqNumber, ack_num: SeqNumber) -> Result<()> {
    let (header, payload): (TcpHeader, Bytes) = extract_header(segment)?;
    crate::ensure_eq!(payload.len(), 0);
    crate::ensure_eq!(header.syn, false);
    crate::ensure_eq!(header.fin, false);
    crate::ensure_eq!(header.ack, true);
    crate::ensure_eq!(header.seq_num, seq_num);
    crate::ensure_eq!(header.ack_num, ack_num);
    Ok(())
}

//=============================================================================

/// Checks for a FIN+ACK.
pub fn check_packet_fin(segment: OutboundSegment, seq_num: SeqNumber, ack_num: SeqNumber) -> Result<()> {
    let (header, payload): (TcpHeader, Bytes) = extract_header(segment)?;
    crate::ensure_eq!(payload.len(), 0);
    crate::ensure_eq!(header.fin, true);
    crate::ensure_eq!(header.ack, true);
    crate::ensure_eq!(header.syn, false);
    crate::ensure_eq!(header.seq_num, seq_num);
    crate::ensure_eq!(header.ack_num, ack_num);
    Ok(())
}
