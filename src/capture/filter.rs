//! ARP request classification

use chrono::Utc;
use pnet::packet::arp::{ArpOperations, ArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::vlan::VlanPacket;
use pnet::util::MacAddr;

use crate::models::{CapturedFrame, TriggerEvent};

/// Hardware address length of an Ethernet ARP packet
const ETHERNET_HW_ADDR_LEN: u8 = 6;

/// Recognizes ARP requests sent by one hardware address.
///
/// Stateless: every frame is judged on its own. Repeats are the
/// debouncer's job.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    target: MacAddr,
}

impl EventFilter {
    pub fn new(target: MacAddr) -> Self {
        Self { target }
    }

    /// Returns a trigger if `frame` is an ARP request from the target.
    /// Anything that does not decode is simply not a trigger.
    pub fn classify(&self, frame: &CapturedFrame) -> Option<TriggerEvent> {
        let payload = arp_payload(&frame.data)?;
        let arp = ArpPacket::new(payload)?;

        if arp.get_hw_addr_len() != ETHERNET_HW_ADDR_LEN
            || arp.get_operation() != ArpOperations::Request
            || arp.get_sender_hw_addr() != self.target
        {
            return None;
        }

        Some(TriggerEvent {
            sender_mac: arp.get_sender_hw_addr(),
            sender_ip: arp.get_sender_proto_addr(),
            observed_at: frame.captured_at,
            seen_at: Utc::now(),
        })
    }
}

/// Slice of `data` holding the ARP body, looking through one 802.1Q tag
fn arp_payload(data: &[u8]) -> Option<&[u8]> {
    let ethernet = EthernetPacket::new(data)?;
    let header_len = EthernetPacket::minimum_packet_size();

    match ethernet.get_ethertype() {
        EtherTypes::Arp => Some(&data[header_len..]),
        EtherTypes::Vlan => {
            let vlan = VlanPacket::new(&data[header_len..])?;
            (vlan.get_ethertype() == EtherTypes::Arp)
                .then(|| &data[header_len + VlanPacket::minimum_packet_size()..])
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::packet::arp::{ArpHardwareTypes, ArpOperation, MutableArpPacket};
    use pnet::packet::ethernet::MutableEthernetPacket;
    use pnet::packet::vlan::MutableVlanPacket;
    use std::net::Ipv4Addr;

    const DASH: MacAddr = MacAddr(0xb4, 0x79, 0xa7, 0x00, 0x00, 0x01);
    const BROADCAST: MacAddr = MacAddr(0xff, 0xff, 0xff, 0xff, 0xff, 0xff);

    fn write_arp(buf: &mut [u8], sender: MacAddr, op: ArpOperation) {
        let mut arp = MutableArpPacket::new(buf).unwrap();
        arp.set_hardware_type(ArpHardwareTypes::Ethernet);
        arp.set_protocol_type(EtherTypes::Ipv4);
        arp.set_hw_addr_len(6);
        arp.set_proto_addr_len(4);
        arp.set_operation(op);
        arp.set_sender_hw_addr(sender);
        arp.set_sender_proto_addr(Ipv4Addr::new(192, 168, 1, 77));
        arp.set_target_hw_addr(MacAddr::zero());
        arp.set_target_proto_addr(Ipv4Addr::new(192, 168, 1, 1));
    }

    fn arp_frame(sender: MacAddr, op: ArpOperation) -> CapturedFrame {
        let mut buffer = vec![0u8; 42];
        {
            let mut eth = MutableEthernetPacket::new(&mut buffer[..14]).unwrap();
            eth.set_destination(BROADCAST);
            eth.set_source(sender);
            eth.set_ethertype(EtherTypes::Arp);
        }
        write_arp(&mut buffer[14..], sender, op);
        CapturedFrame::new(buffer)
    }

    fn tagged_arp_frame(sender: MacAddr, op: ArpOperation) -> CapturedFrame {
        let mut buffer = vec![0u8; 46];
        {
            let mut eth = MutableEthernetPacket::new(&mut buffer[..14]).unwrap();
            eth.set_destination(BROADCAST);
            eth.set_source(sender);
            eth.set_ethertype(EtherTypes::Vlan);
        }
        {
            let mut vlan = MutableVlanPacket::new(&mut buffer[14..18]).unwrap();
            vlan.set_vlan_identifier(10);
            vlan.set_ethertype(EtherTypes::Arp);
        }
        write_arp(&mut buffer[18..], sender, op);
        CapturedFrame::new(buffer)
    }

    #[test]
    fn request_from_target_is_a_trigger() {
        let filter = EventFilter::new(DASH);
        let frame = arp_frame(DASH, ArpOperations::Request);

        let event = filter.classify(&frame).expect("should trigger");
        assert_eq!(event.sender_mac, DASH);
        assert_eq!(event.sender_ip, Ipv4Addr::new(192, 168, 1, 77));
        assert_eq!(event.observed_at, frame.captured_at);
    }

    #[test]
    fn reply_from_target_is_ignored() {
        let filter = EventFilter::new(DASH);
        assert!(filter
            .classify(&arp_frame(DASH, ArpOperations::Reply))
            .is_none());
    }

    #[test]
    fn any_single_byte_difference_is_ignored() {
        let filter = EventFilter::new(DASH);
        let octets = [0xb4u8, 0x79, 0xa7, 0x00, 0x00, 0x01];

        for i in 0..6 {
            let mut other = octets;
            other[i] ^= 0x01;
            let sender = MacAddr::new(other[0], other[1], other[2], other[3], other[4], other[5]);
            assert!(
                filter
                    .classify(&arp_frame(sender, ArpOperations::Request))
                    .is_none(),
                "byte {} differs",
                i
            );
        }
    }

    #[test]
    fn non_arp_frames_are_ignored() {
        let filter = EventFilter::new(DASH);
        let mut frame = arp_frame(DASH, ArpOperations::Request);
        frame.data[12] = 0x08;
        frame.data[13] = 0x00; // IPv4

        assert!(filter.classify(&frame).is_none());
    }

    #[test]
    fn non_ethernet_hardware_length_is_ignored() {
        let filter = EventFilter::new(DASH);
        let mut frame = arp_frame(DASH, ArpOperations::Request);
        frame.data[14 + 4] = 8;

        assert!(filter.classify(&frame).is_none());
    }

    #[test]
    fn truncated_frames_are_ignored() {
        let filter = EventFilter::new(DASH);
        let frame = arp_frame(DASH, ArpOperations::Request);

        assert!(filter.classify(&CapturedFrame::new(vec![])).is_none());
        assert!(filter
            .classify(&CapturedFrame::new(frame.data[..20].to_vec()))
            .is_none());
    }

    #[test]
    fn vlan_tagged_request_is_a_trigger() {
        let filter = EventFilter::new(DASH);
        assert!(filter
            .classify(&tagged_arp_frame(DASH, ArpOperations::Request))
            .is_some());
        assert!(filter
            .classify(&tagged_arp_frame(DASH, ArpOperations::Reply))
            .is_none());
    }

    #[test]
    fn padded_frame_still_matches() {
        let filter = EventFilter::new(DASH);
        let mut frame = arp_frame(DASH, ArpOperations::Request);
        frame.data.resize(60, 0);
        assert!(filter.classify(&frame).is_some());
    }
}
