use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use crate::error::ScoutError;

/// Collect observed domains from positional arguments and an optional input
/// file (`-` reads stdin). Duplicates are kept: each occurrence is one
/// observed request.
pub fn read_domains(
    input: Option<&Path>,
    positional: &[String],
) -> Result<Vec<String>, ScoutError> {
    let mut domains: Vec<String> = positional.iter().filter_map(|d| normalize(d)).collect();

    if let Some(path) = input {
        let content = if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            fs::read_to_string(path)?
        };
        domains.extend(parse_domain_lines(&content));
    }

    Ok(domains)
}

/// One domain per line; blank lines and `#` comments are skipped
pub fn parse_domain_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .filter_map(normalize)
        .collect()
}

fn normalize(raw: &str) -> Option<String> {
    let domain = raw.trim().trim_end_matches('.');
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_ascii_lowercase())
    }
}
