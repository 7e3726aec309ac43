use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use crate::{Error, Result, WorkerIdProvider};

/// Derives the worker id from the low 16 bits of a private IPv4 address.
///
/// Private ranges are `10.0.0.0/8`, `172.16.0.0/12` and `192.168.0.0/16`.
/// Hosts on one private network differ in their low 16 bits in most
/// deployments, which makes this a coordination-free default.
///
/// [`PrivateIpv4::detect`] looks at the address of the host's outbound
/// interface; [`PrivateIpv4::from_addrs`] picks from addresses the caller
/// already knows (for example from an interface listing). Loopback and
/// non-private addresses are skipped; with none left the provider fails with
/// [`Error::NoPrivateAddress`].
///
/// # Example
///
/// ```
/// use std::net::{IpAddr, Ipv4Addr};
/// use trillium::{PrivateIpv4, WorkerIdProvider};
///
/// let provider = PrivateIpv4::from_addrs([
///     IpAddr::V4(Ipv4Addr::LOCALHOST),
///     IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
/// ]);
/// assert_eq!(provider.worker_id(u64::from(u16::MAX)).unwrap(), (1 << 8) + 20);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PrivateIpv4 {
    candidates: Option<Vec<IpAddr>>,
}

impl PrivateIpv4 {
    /// Uses the address of the interface the host routes outbound traffic
    /// through.
    ///
    /// Only the source address of the route towards a private peer is
    /// inspected, not every interface. A host whose outbound route leaves
    /// through a public interface fails with [`Error::NoPrivateAddress`] even
    /// if it has a private interface as well; list the host's addresses with
    /// [`PrivateIpv4::from_addrs`] in that case.
    #[must_use]
    pub fn detect() -> Self {
        Self { candidates: None }
    }

    /// Picks the first usable private IPv4 address out of `addrs`.
    pub fn from_addrs(addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            candidates: Some(addrs.into_iter().collect()),
        }
    }

    /// Returns the private IPv4 address this provider would use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPrivateAddress`] if no candidate qualifies.
    pub fn address(&self) -> Result<Ipv4Addr> {
        let found = match &self.candidates {
            Some(addrs) => addrs.iter().copied().find_map(usable_ipv4),
            None => outbound_addr().and_then(usable_ipv4),
        };
        found.ok_or(Error::NoPrivateAddress)
    }
}

impl WorkerIdProvider for PrivateIpv4 {
    fn worker_id(&self, max_worker_id: u64) -> Result<u64> {
        let worker_id = lower_16_bits(self.address()?);
        if worker_id > max_worker_id {
            return Err(Error::InvalidWorkerId {
                worker_id,
                max: max_worker_id,
            });
        }
        Ok(worker_id)
    }
}

/// Reports whether `ip` lies in one of the private IPv4 ranges.
#[must_use]
pub const fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    a == 10 || (a == 172 && b >= 16 && b < 32) || (a == 192 && b == 168)
}

/// The worker id derived from an address: its last two octets.
#[must_use]
pub const fn lower_16_bits(ip: Ipv4Addr) -> u64 {
    let [_, _, c, d] = ip.octets();
    ((c as u64) << 8) | d as u64
}

fn usable_ipv4(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) if !v4.is_loopback() && is_private_ipv4(v4) => Some(v4),
        _ => None,
    }
}

/// Asks the routing table which local address reaches a private peer.
///
/// Connecting a UDP socket sends nothing; it only binds the local side to
/// the outbound interface.
fn outbound_addr() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(10, 254, 254, 254), 9)).ok()?;
    Some(socket.local_addr().ok()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn private_ranges() {
        assert!(is_private_ipv4(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(is_private_ipv4(Ipv4Addr::new(172, 16, 0, 1)));
        assert!(is_private_ipv4(Ipv4Addr::new(172, 31, 255, 255)));
        assert!(is_private_ipv4(Ipv4Addr::new(192, 168, 0, 1)));

        assert!(!is_private_ipv4(Ipv4Addr::new(172, 15, 0, 1)));
        assert!(!is_private_ipv4(Ipv4Addr::new(172, 32, 0, 1)));
        assert!(!is_private_ipv4(Ipv4Addr::new(192, 169, 0, 1)));
        assert!(!is_private_ipv4(Ipv4Addr::new(8, 8, 8, 8)));
        assert!(!is_private_ipv4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn takes_last_two_octets() {
        assert_eq!(lower_16_bits(Ipv4Addr::new(10, 1, 2, 3)), 0x0203);
        assert_eq!(lower_16_bits(Ipv4Addr::new(192, 168, 255, 255)), 65_535);
    }

    #[test]
    fn skips_unusable_candidates() {
        let provider = PrivateIpv4::from_addrs([
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
            IpAddr::V4(Ipv4Addr::new(172, 20, 3, 4)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)),
        ]);
        assert_eq!(provider.address(), Ok(Ipv4Addr::new(172, 20, 3, 4)));
        assert_eq!(provider.worker_id(65_535), Ok(0x0304));
    }

    #[test]
    fn no_candidates_means_no_address() {
        let provider = PrivateIpv4::from_addrs([IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))]);
        assert_eq!(provider.address(), Err(Error::NoPrivateAddress));
        assert_eq!(provider.worker_id(65_535), Err(Error::NoPrivateAddress));
    }

    #[test]
    fn rejects_ids_above_layout_bound() {
        let provider = PrivateIpv4::from_addrs([IpAddr::V4(Ipv4Addr::new(10, 0, 4, 0))]);
        assert_eq!(
            provider.worker_id(1023),
            Err(Error::InvalidWorkerId {
                worker_id: 1024,
                max: 1023
            })
        );
    }

    #[test]
    fn detection_yields_private_or_fails() {
        // Depends on the host's network; only the contract is checked.
        match PrivateIpv4::detect().address() {
            Ok(ip) => assert!(is_private_ipv4(ip)),
            Err(e) => assert_eq!(e, Error::NoPrivateAddress),
        }
    }
}
