//! Interface lookup and validation

use ipnetwork::{IpNetwork, Ipv4Network};
use pnet::datalink::{self, NetworkInterface};

use crate::config::MIN_NETWORK_PREFIX_OCTETS;
use crate::error::ValidationError;
use crate::models::{InterfaceSummary, ValidatedInterface};

/// Looks the interface up by exact name
pub fn find_interface_by_name(name: &str) -> Result<NetworkInterface, ValidationError> {
    datalink::interfaces()
        .into_iter()
        .find(|iface| iface.name == name)
        .ok_or_else(|| ValidationError::InterfaceNotFound(name.to_string()))
}

/// First IPv4 network configured on the interface, in enumeration order
pub fn first_ipv4_network(interface: &NetworkInterface) -> Option<Ipv4Network> {
    interface.ips.iter().find_map(|ip| match ip {
        IpNetwork::V4(net) => Some(*net),
        IpNetwork::V6(_) => None,
    })
}

/// Checks that the interface can see the button's broadcast.
///
/// Selects the first IPv4 address, then rejects loopback (127.x.x.x) and
/// any netmask whose leading octets are not all 0xff.
pub fn validate_interface(
    interface: &NetworkInterface,
) -> Result<ValidatedInterface, ValidationError> {
    let network = first_ipv4_network(interface)
        .ok_or_else(|| ValidationError::NoAddressFound(interface.name.clone()))?;

    if network.ip().octets()[0] == 127 {
        return Err(ValidationError::LoopbackRejected(network.ip()));
    }

    let mask = network.mask().octets();
    if mask[..MIN_NETWORK_PREFIX_OCTETS].iter().any(|octet| *octet != 0xff) {
        return Err(ValidationError::NetworkTooLarge { network });
    }

    tracing::info!(
        "Using network range {} for interface {}",
        network,
        interface.name
    );

    Ok(ValidatedInterface {
        interface: interface.clone(),
        network,
    })
}

/// Resolves and validates an interface by name
pub fn validate(name: &str) -> Result<ValidatedInterface, ValidationError> {
    let interface = find_interface_by_name(name)?;
    validate_interface(&interface)
}

/// Lists every interface with its first IPv4 network
pub fn list_interfaces() -> Vec<InterfaceSummary> {
    datalink::interfaces()
        .iter()
        .map(|iface| InterfaceSummary {
            name: iface.name.clone(),
            network: first_ipv4_network(iface).map(|n| n.to_string()),
            is_loopback: iface.is_loopback(),
            is_up: iface.is_up(),
        })
        .collect()
}

#[cfg(test)]
#[path = "interface_tests.rs"]
mod interface_tests;
