//! Network module - interface lookup and validation

mod interface;

pub use interface::{
    find_interface_by_name, first_ipv4_network, list_interfaces, validate, validate_interface,
};
