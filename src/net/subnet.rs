//! IPv4 validation and /24 → /16 subnet aggregation.
//!
//! Addresses are folded into `/24` networks; once a `/16` prefix holds
//! `merge_threshold` distinct `/24` members the whole group is replaced by
//! the covering `/16`.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    net::Ipv4Addr,
    str::FromStr,
};

use thiserror::Error;

/// Number of distinct `/24` networks under one `/16` that triggers a collapse.
pub const DEFAULT_MERGE_THRESHOLD: usize = 4;

const SLASH16_MASK: u32 = 0xFFFF_0000;
const SLASH24_MASK: u32 = 0xFFFF_FF00;

/// A `/24` or `/16` IPv4 network.
///
/// Ordering is numeric on the network address (most significant octet first),
/// with the shorter prefix first when two networks share an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subnet {
    network: u32,
    prefix_len: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid subnet '{0}': expected a.b.c.d/24 or a.b.c.d/16")]
pub struct ParseSubnetError(String);

impl Subnet {
    /// The `/24` network containing `ip`.
    pub fn slash24(ip: Ipv4Addr) -> Self {
        Self {
            network: u32::from(ip) & SLASH24_MASK,
            prefix_len: 24,
        }
    }

    /// The `/16` network containing `ip`.
    pub fn slash16(ip: Ipv4Addr) -> Self {
        Self {
            network: u32::from(ip) & SLASH16_MASK,
            prefix_len: 16,
        }
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn is_slash16(&self) -> bool {
        self.prefix_len == 16
    }

    /// The `/16` this network belongs to (itself when already a `/16`).
    pub fn covering_slash16(&self) -> Self {
        Self {
            network: self.network & SLASH16_MASK,
            prefix_len: 16,
        }
    }

    /// Every possible `Subnet` value sharing this network's first two octets,
    /// as bounds for a `BTreeSet` range query.
    fn slash16_bounds(&self) -> (Self, Self) {
        let base = self.network & SLASH16_MASK;
        (
            Self {
                network: base,
                prefix_len: 0,
            },
            Self {
                network: base | !SLASH16_MASK,
                prefix_len: u8::MAX,
            },
        )
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len)
    }
}

impl FromStr for Subnet {
    type Err = ParseSubnetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSubnetError(s.to_string());
        let (addr, len) = s.split_once('/').ok_or_else(invalid)?;
        let ip = parse_ipv4(addr).ok_or_else(invalid)?;
        let subnet = match len {
            "24" => Subnet::slash24(ip),
            "16" => Subnet::slash16(ip),
            _ => return Err(invalid()),
        };
        // host bits must already be zero
        if subnet.network() != ip {
            return Err(invalid());
        }
        Ok(subnet)
    }
}

/// Parse a dotted-quad address: exactly four dot-separated decimal octets,
/// each in `0..=255`.
///
/// Unlike `Ipv4Addr::from_str` this accepts zero-padded octets such as
/// `"010"`, matching what resolution services occasionally emit.
pub fn parse_ipv4(ip: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = ip.split('.');

    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }

    if parts.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}

pub fn is_valid_ip(ip: &str) -> bool {
    parse_ipv4(ip).is_some()
}

/// The `/24` network for a dotted-quad string, or `None` when the address is
/// malformed.
pub fn to_subnet24(ip: &str) -> Option<Subnet> {
    parse_ipv4(ip).map(Subnet::slash24)
}

/// Recompute the minimal subnet set from scratch.
///
/// `/24` networks are grouped by their `/16` prefix. A group with at least
/// `threshold` distinct members, or one that already contains its `/16`, is
/// replaced by that `/16`; smaller groups are kept as-is.
pub fn merge_subnets(subnets: &BTreeSet<Subnet>, threshold: usize) -> BTreeSet<Subnet> {
    let mut groups: BTreeMap<Subnet, Vec<Subnet>> = BTreeMap::new();
    for subnet in subnets {
        groups
            .entry(subnet.covering_slash16())
            .or_default()
            .push(*subnet);
    }

    let mut merged = BTreeSet::new();
    for (slash16, members) in groups {
        if members.len() >= threshold || members.iter().any(Subnet::is_slash16) {
            merged.insert(slash16);
        } else {
            merged.extend(members);
        }
    }
    merged
}

/// Insert one `/24` and re-merge only the `/16` group it belongs to.
///
/// Produces the same set as inserting and then calling [`merge_subnets`] on
/// the whole set, without touching unrelated groups.
pub fn insert_and_merge(subnets: &mut BTreeSet<Subnet>, subnet: Subnet, threshold: usize) {
    let slash16 = subnet.covering_slash16();
    if subnets.contains(&slash16) {
        return;
    }
    subnets.insert(subnet);

    let (low, high) = subnet.slash16_bounds();
    let group: Vec<Subnet> = subnets.range(low..=high).copied().collect();
    if group.len() >= threshold {
        for member in &group {
            subnets.remove(member);
        }
        subnets.insert(slash16);
        log::debug!("collapsed {} /24 networks into {}", group.len(), slash16);
    }
}

/// Numerically ordered copy of `subnets`.
pub fn sort_subnets<'a, I>(subnets: I) -> Vec<Subnet>
where
    I: IntoIterator<Item = &'a Subnet>,
{
    let mut sorted: Vec<Subnet> = subnets.into_iter().copied().collect();
    sorted.sort();
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn set(items: &[&str]) -> BTreeSet<Subnet> {
        items.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[rstest]
    #[case("10.1.2.3", Some("10.1.2.0/24"))]
    #[case("0.0.0.0", Some("0.0.0.0/24"))]
    #[case("255.255.255.255", Some("255.255.255.0/24"))]
    #[case("010.001.002.003", Some("10.1.2.0/24"))]
    #[case("10.1.2.3.4", None)]
    #[case("10.1.2", None)]
    #[case("abc", None)]
    #[case("", None)]
    #[case("256.1.1.1", None)]
    #[case("1.2.3.-4", None)]
    #[case("1.2..4", None)]
    #[case(" 1.2.3.4", None)]
    #[case("+1.2.3.4", None)]
    fn to_subnet24_cases(#[case] ip: &str, #[case] expected: Option<&str>) {
        let subnet = to_subnet24(ip).map(|s| s.to_string());
        assert_eq!(subnet.as_deref(), expected);
    }

    #[rstest]
    #[case("1.2.3.4", true)]
    #[case("256.1.1.1", false)]
    #[case("1.2.3.256", false)]
    #[case("1.2.3", false)]
    #[case("example.com", false)]
    #[case("::1", false)]
    fn is_valid_ip_cases(#[case] ip: &str, #[case] expected: bool) {
        assert_eq!(is_valid_ip(ip), expected);
    }

    #[rstest]
    #[case("10.1.0.0/16")]
    #[case("10.1.2.0/24")]
    fn parse_subnet_roundtrip(#[case] text: &str) {
        let subnet: Subnet = text.parse().unwrap();
        assert_eq!(subnet.to_string(), text);
    }

    #[rstest]
    #[case("10.1.2.3/24", "host bits set")]
    #[case("10.1.2.0/8", "unsupported prefix")]
    #[case("10.1.2.0", "missing prefix")]
    #[case("x.1.2.0/24", "bad address")]
    fn parse_subnet_rejects_malformed(#[case] text: &str, #[case] _description: &str) {
        assert!(text.parse::<Subnet>().is_err());
    }

    #[test]
    fn merge_collapses_four_into_slash16() {
        let subnets = set(&[
            "10.1.0.0/24",
            "10.1.1.0/24",
            "10.1.2.0/24",
            "10.1.3.0/24",
        ]);
        let merged = merge_subnets(&subnets, DEFAULT_MERGE_THRESHOLD);
        assert_eq!(merged, set(&["10.1.0.0/16"]));
    }

    #[test]
    fn merge_keeps_three() {
        let subnets = set(&["10.1.0.0/24", "10.1.1.0/24", "10.1.2.0/24"]);
        let merged = merge_subnets(&subnets, DEFAULT_MERGE_THRESHOLD);
        assert_eq!(merged, subnets);
    }

    #[test]
    fn merge_groups_independently() {
        let subnets = set(&[
            "10.1.0.0/24",
            "10.1.1.0/24",
            "10.1.2.0/24",
            "10.1.3.0/24",
            "10.2.0.0/24",
            "192.168.5.0/24",
        ]);
        let merged = merge_subnets(&subnets, DEFAULT_MERGE_THRESHOLD);
        assert_eq!(merged, set(&["10.1.0.0/16", "10.2.0.0/24", "192.168.5.0/24"]));
    }

    #[test]
    fn merge_absorbs_slash24_under_existing_slash16() {
        let subnets = set(&["10.1.0.0/16", "10.1.9.0/24"]);
        let merged = merge_subnets(&subnets, DEFAULT_MERGE_THRESHOLD);
        assert_eq!(merged, set(&["10.1.0.0/16"]));
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(3, 1)]
    #[case(4, 3)]
    fn merge_respects_threshold(#[case] threshold: usize, #[case] expected_len: usize) {
        let subnets = set(&["10.1.0.0/24", "10.1.1.0/24", "10.1.2.0/24"]);
        assert_eq!(merge_subnets(&subnets, threshold).len(), expected_len);
    }

    #[test]
    fn incremental_insert_matches_full_recompute() {
        let ips = [
            "10.1.0.1", "10.1.1.1", "172.16.4.4", "10.1.2.1", "10.1.3.1", "10.1.4.1",
            "172.16.5.5", "10.2.0.1", "10.1.0.200",
        ];

        let mut incremental = BTreeSet::new();
        let mut full = BTreeSet::new();
        for ip in ips {
            let subnet = to_subnet24(ip).unwrap();
            insert_and_merge(&mut incremental, subnet, DEFAULT_MERGE_THRESHOLD);

            full.insert(subnet);
            full = merge_subnets(&full, DEFAULT_MERGE_THRESHOLD);

            assert_eq!(incremental, full, "diverged after {ip}");
        }

        assert_eq!(
            incremental,
            set(&["10.1.0.0/16", "10.2.0.0/24", "172.16.4.0/24", "172.16.5.0/24"])
        );
    }

    #[test]
    fn sort_is_numeric_not_lexical() {
        let subnets: Vec<Subnet> = vec![
            "10.10.0.0/24".parse().unwrap(),
            "10.2.0.0/24".parse().unwrap(),
        ];
        let sorted: Vec<String> = sort_subnets(&subnets)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(sorted, vec!["10.2.0.0/24", "10.10.0.0/24"]);
    }

    #[test]
    fn sort_places_slash16_before_its_first_slash24() {
        let subnets = set(&["10.1.0.0/24", "10.1.0.0/16", "9.255.255.0/24"]);
        let sorted: Vec<String> = sort_subnets(&subnets)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(sorted, vec!["9.255.255.0/24", "10.1.0.0/16", "10.1.0.0/24"]);
    }
}
