//! Plain-text allowlist exports built from a [`DomainRegistry`].

use std::fmt::Write;

use crate::{net::subnet::sort_subnets, registry::DomainRegistry};

/// One block per domain with at least one subnet:
///
/// ```text
/// // example.com
/// 93.184.216.0/24
///
/// ```
///
/// Domains are in lexical order, subnets in numeric order, and domains with
/// no subnets are left out. Returns an empty string when nothing qualifies.
pub fn render_subnet_export(registry: &DomainRegistry) -> String {
    let mut content = String::new();

    for record in registry.records().filter(|r| !r.subnets.is_empty()) {
        // writing to a String cannot fail
        let _ = writeln!(content, "// {}", record.domain);
        for subnet in sort_subnets(&record.subnets) {
            let _ = writeln!(content, "{subnet}");
        }
        content.push('\n');
    }

    content
}

/// Every observed domain in lexical order, one per line
pub fn render_domain_list(registry: &DomainRegistry) -> String {
    registry
        .records()
        .map(|r| r.domain.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn registry() -> DomainRegistry {
        let mut registry = DomainRegistry::default();
        for domain in ["zeta.example", "alpha.example", "empty.example"] {
            registry.observe(domain);
        }
        let ips: Vec<Ipv4Addr> = ["10.10.0.1", "10.2.0.1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        registry.apply_resolution("alpha.example", &ips);
        registry.apply_resolution("zeta.example", &["192.0.2.9".parse().unwrap()]);
        registry.apply_resolution("empty.example", &[]);
        registry
    }

    #[test]
    fn subnet_export_format() {
        let expected = "\
// alpha.example
10.2.0.0/24
10.10.0.0/24

// zeta.example
192.0.2.0/24

";
        assert_eq!(render_subnet_export(&registry()), expected);
    }

    #[test]
    fn subnet_export_empty_when_nothing_resolved() {
        let mut registry = DomainRegistry::default();
        registry.observe("pending.example");
        assert_eq!(render_subnet_export(&registry), "");
    }

    #[test]
    fn domain_list_includes_unresolved() {
        assert_eq!(
            render_domain_list(&registry()),
            "alpha.example\nempty.example\nzeta.example"
        );
    }
}
