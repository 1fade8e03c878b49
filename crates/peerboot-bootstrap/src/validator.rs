//! Syntax checks for hostnames, IPv4 addresses and ports, using `nom`.
//!
//! The predicates are pure. The `parse_*` functions wrap them and return
//! typed values, or an error naming the offending text and which address
//! it was meant to be.

use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{char, digit1},
    combinator::{all_consuming, verify},
    multi::separated_list1,
};
use peerboot_common::error::{PeerbootError, Result};
use peerboot_common::types::Address;

const fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

fn label(input: &str) -> IResult<&str, &str> {
    verify(take_while1(is_label_char), |l: &str| {
        l.starts_with(|c: char| c.is_ascii_alphanumeric())
            && l.ends_with(|c: char| c.is_ascii_alphanumeric())
    })
    .parse(input)
}

fn hostname(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char('.'), label).parse(input)
}

/// One of `[0-9]`, `[1-9][0-9]`, `1[0-9][0-9]`, `2[0-4][0-9]`, `25[0-5]`.
fn octet(input: &str) -> IResult<&str, &str> {
    verify(digit1, |d: &str| {
        d.len() <= 3
            && (d.len() == 1 || !d.starts_with('0'))
            && d.parse::<u16>().is_ok_and(|v| v <= 255)
    })
    .parse(input)
}

fn ipv4(input: &str) -> IResult<&str, (&str, char, &str, char, &str, char, &str)> {
    (octet, char('.'), octet, char('.'), octet, char('.'), octet).parse(input)
}

fn port(input: &str) -> IResult<&str, &str> {
    verify(digit1, |d: &str| d.parse::<u32>().is_ok_and(|v| v <= u32::from(u16::MAX))).parse(input)
}

/// Dot-separated labels of alphanumerics and inner hyphens.
#[must_use]
pub fn is_valid_hostname(s: &str) -> bool {
    all_consuming(hostname).parse(s).is_ok()
}

/// Four dot-separated decimal octets, each 0-255.
#[must_use]
pub fn is_valid_ipv4(s: &str) -> bool {
    all_consuming(ipv4).parse(s).is_ok()
}

/// Digits only, value 0-65535.
#[must_use]
pub fn is_valid_port(s: &str) -> bool {
    all_consuming(port).parse(s).is_ok()
}

/// A hostname or an IPv4 address.
#[must_use]
pub fn is_valid_address(s: &str) -> bool {
    is_valid_hostname(s) || is_valid_ipv4(s)
}

/// `host` or `host:port`. A trailing `:` with no port is rejected.
#[must_use]
pub fn is_valid_address_and_port(s: &str) -> bool {
    match s.split_once(':') {
        Some((host, port)) => is_valid_address(host) && is_valid_port(port),
        None => is_valid_address(s),
    }
}

/// Validates a bare host.
///
/// # Errors
///
/// Returns [`PeerbootError::InvalidAddress`] tagged with `label`.
pub fn parse_address(s: &str, label: &'static str) -> Result<Address> {
    if !is_valid_address(s) {
        return Err(PeerbootError::InvalidAddress {
            label,
            value: s.to_string(),
        });
    }
    Ok(Address::new(s, None))
}

/// Validates `host[:port]`. The returned address displays as `s`.
///
/// # Errors
///
/// Returns [`PeerbootError::InvalidAddress`] tagged with `label`.
pub fn parse_address_and_port(s: &str, label: &'static str) -> Result<Address> {
    let invalid = || PeerbootError::InvalidAddress {
        label,
        value: s.to_string(),
    };
    if !is_valid_address_and_port(s) {
        return Err(invalid());
    }
    match s.split_once(':') {
        Some((host, port)) => {
            let port = port.parse().map_err(|_| invalid())?;
            Ok(Address::parsed(s, host, Some(port)))
        }
        None => Ok(Address::parsed(s, s, None)),
    }
}

/// Validates a port number.
///
/// # Errors
///
/// Returns [`PeerbootError::InvalidPort`] tagged with `label`.
pub fn parse_port(s: &str, label: &'static str) -> Result<u16> {
    let invalid = || PeerbootError::InvalidPort {
        label,
        value: s.to_string(),
    };
    if !is_valid_port(s) {
        return Err(invalid());
    }
    s.parse().map_err(|_| invalid())
}
