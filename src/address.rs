//! IPv4 text to canonical 32-bit key.
//!
//! Only dotted-quad IPv4 is accepted. IPv6 literals, including the
//! IPv4-mapped `::ffff:a.b.c.d` form, are rejected along with anything that
//! is not valid UTF-8, has leading zeros, extra or missing octets, or an
//! octet above 255.

use std::net::Ipv4Addr;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("not an IPv4 address")]
pub struct InvalidAddress;

/// Encode one line as the big-endian integer of its four octets.
#[inline]
pub fn encode(line: &[u8]) -> Result<u32, InvalidAddress> {
    // Shortest is "0.0.0.0", longest "255.255.255.255"
    if line.len() < 7 || line.len() > 15 {
        return Err(InvalidAddress);
    }
    let text = std::str::from_utf8(line).map_err(|_| InvalidAddress)?;
    text.parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| InvalidAddress)
}

/// Inverse of [`encode`].
#[inline]
pub fn decode(key: u32) -> Ipv4Addr {
    Ipv4Addr::from(key)
}
