// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    inetstack::protocols::{
        compute_generic_checksum,
        fold16,
        layer3::ip::IpProtocol,
        layer4::tcp::SeqNumber,
    },
    runtime::fail::Fail,
};
use ::bytes::{
    BufMut,
    Bytes,
    BytesMut,
};
use ::libc::EBADMSG;
use ::std::net::Ipv4Addr;

//======================================================================================================================
// Constants
//======================================================================================================================

pub const MIN_TCP_HEADER_SIZE: usize = 20;

/// Offset of the checksum field within the fixed header.
const CHECKSUM_OFFSET: usize = 16;

//======================================================================================================================
// Structures
//======================================================================================================================

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq_num: SeqNumber,
    pub ack_num: SeqNumber,

    // Octet 12: [ data offset in u32s (4 bits) ][ reserved zeros (3 bits) ] [ NS flag ]
    // The data offset is only meaningful on parsing. We never emit options, so serialization always uses the minimum.
    pub data_offset: u8,
    pub ns: bool,

    // Octet 13: [ CWR ] [ ECE ] [ URG ] [ ACK ] [ PSH ] [ RST ] [ SYN ] [ FIN ]
    pub cwr: bool,
    pub ece: bool,
    pub urg: bool,
    pub ack: bool,
    pub psh: bool,
    pub rst: bool,
    pub syn: bool,
    pub fin: bool,

    pub window_size: u16,

    // As received. Ignored when serializing, since it is always recomputed.
    pub checksum: u16,
    pub urgent_pointer: u16,
}

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl TcpHeader {
    pub fn new(src_port: u16, dst_port: u16) -> Self {
        Self {
            src_port,
            dst_port,
            seq_num: SeqNumber::from(0),
            ack_num: SeqNumber::from(0),

            data_offset: (MIN_TCP_HEADER_SIZE / 4) as u8,
            ns: false,
            cwr: false,
            ece: false,
            urg: false,
            ack: false,
            psh: false,
            rst: false,
            syn: false,
            fin: false,

            window_size: 0,
            checksum: 0,
            urgent_pointer: 0,
        }
    }

    /// Parses the TCP header at the front of `buf` and returns it along with the payload, which starts `4 *
    /// data_offset` bytes into the segment. Options are skipped. The checksum is not validated here, see
    /// [compute_checksum].
    pub fn parse(buf: &Bytes) -> Result<(Self, Bytes), Fail> {
        if buf.len() < MIN_TCP_HEADER_SIZE {
            return Err(Fail::new(EBADMSG, "TCP segment too small"));
        }
        let data_offset: u8 = buf[12] >> 4;
        let header_size: usize = data_offset as usize * 4;
        if header_size < MIN_TCP_HEADER_SIZE {
            return Err(Fail::new(EBADMSG, "TCP data offset too small"));
        }
        if buf.len() < header_size {
            return Err(Fail::new(EBADMSG, "TCP segment smaller than data offset"));
        }
        let hdr_buf: &[u8] = &buf[..MIN_TCP_HEADER_SIZE];

        let src_port: u16 = u16::from_be_bytes([hdr_buf[0], hdr_buf[1]]);
        let dst_port: u16 = u16::from_be_bytes([hdr_buf[2], hdr_buf[3]]);

        let seq_num: SeqNumber = SeqNumber::from(u32::from_be_bytes([hdr_buf[4], hdr_buf[5], hdr_buf[6], hdr_buf[7]]));
        let ack_num: SeqNumber =
            SeqNumber::from(u32::from_be_bytes([hdr_buf[8], hdr_buf[9], hdr_buf[10], hdr_buf[11]]));

        let ns: bool = (hdr_buf[12] & 1) != 0;

        let cwr: bool = (hdr_buf[13] & (1 << 7)) != 0;
        let ece: bool = (hdr_buf[13] & (1 << 6)) != 0;
        let urg: bool = (hdr_buf[13] & (1 << 5)) != 0;
        let ack: bool = (hdr_buf[13] & (1 << 4)) != 0;
        let psh: bool = (hdr_buf[13] & (1 << 3)) != 0;
        let rst: bool = (hdr_buf[13] & (1 << 2)) != 0;
        let syn: bool = (hdr_buf[13] & (1 << 1)) != 0;
        let fin: bool = (hdr_buf[13] & (1 << 0)) != 0;

        let window_size: u16 = u16::from_be_bytes([hdr_buf[14], hdr_buf[15]]);
        let checksum: u16 = u16::from_be_bytes([hdr_buf[16], hdr_buf[17]]);
        let urgent_pointer: u16 = u16::from_be_bytes([hdr_buf[18], hdr_buf[19]]);

        let header: Self = Self {
            src_port,
            dst_port,
            seq_num,
            ack_num,
            data_offset,
            ns,
            cwr,
            ece,
            urg,
            ack,
            psh,
            rst,
            syn,
            fin,
            window_size,
            checksum,
            urgent_pointer,
        };

        Ok((header, buf.slice(header_size..)))
    }

    /// Serializes the header, appends `payload` and fills in the checksum for the given address pair.
    pub fn serialize(&self, payload: &[u8], src_ipv4_addr: &Ipv4Addr, dst_ipv4_addr: &Ipv4Addr) -> Bytes {
        let mut pkt: BytesMut = BytesMut::with_capacity(self.compute_size() + payload.len());
        pkt.put_u16(self.src_port);
        pkt.put_u16(self.dst_port);
        pkt.put_u32(u32::from(self.seq_num));
        pkt.put_u32(u32::from(self.ack_num));

        let mut offset_byte: u8 = ((self.compute_size() / 4) as u8) << 4;
        if self.ns {
            offset_byte |= 1;
        }
        pkt.put_u8(offset_byte);

        let mut flags_byte: u8 = 0;
        if self.cwr {
            flags_byte |= 1 << 7;
        }
        if self.ece {
            flags_byte |= 1 << 6;
        }
        if self.urg {
            flags_byte |= 1 << 5;
        }
        if self.ack {
            flags_byte |= 1 << 4;
        }
        if self.psh {
            flags_byte |= 1 << 3;
        }
        if self.rst {
            flags_byte |= 1 << 2;
        }
        if self.syn {
            flags_byte |= 1 << 1;
        }
        if self.fin {
            flags_byte |= 1 << 0;
        }
        pkt.put_u8(flags_byte);

        pkt.put_u16(self.window_size);
        // Checksum placeholder, filled in below.
        pkt.put_u16(0);
        pkt.put_u16(self.urgent_pointer);
        pkt.extend_from_slice(payload);

        fix_checksum(&mut pkt[..], src_ipv4_addr, dst_ipv4_addr);
        pkt.freeze()
    }

    pub fn compute_size(&self) -> usize {
        MIN_TCP_HEADER_SIZE
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Computes the Internet checksum of `segment` (header and payload) prefixed with the IPv4 pseudo-header. A segment
/// carrying a correct checksum yields zero.
pub fn compute_checksum(segment: &[u8], src_ipv4_addr: &Ipv4Addr, dst_ipv4_addr: &Ipv4Addr) -> u16 {
    let mut state: u32 = 0;

    // First, fold in a "pseudo-IP" header of...
    // 1) Source address (4 bytes)
    state = compute_generic_checksum(&src_ipv4_addr.octets(), Some(state));
    // 2) Destination address (4 bytes)
    state = compute_generic_checksum(&dst_ipv4_addr.octets(), Some(state));
    // 3) 1 byte of zeros and TCP protocol number (1 byte)
    state += u16::from_be_bytes([0, IpProtocol::TCP as u8]) as u32;
    // 4) TCP segment length (2 bytes)
    state += segment.len() as u32;

    // Then the segment itself, checksum field included.
    fold16(compute_generic_checksum(segment, Some(state)))
}

/// Overwrites the checksum field of `segment` with the value that makes [compute_checksum] return zero.
pub fn fix_checksum(segment: &mut [u8], src_ipv4_addr: &Ipv4Addr, dst_ipv4_addr: &Ipv4Addr) {
    assert!(segment.len() >= MIN_TCP_HEADER_SIZE);
    segment[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&[0, 0]);
    let checksum: u16 = compute_checksum(segment, src_ipv4_addr, dst_ipv4_addr);
    segment[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&checksum.to_be_bytes());
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
