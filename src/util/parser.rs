use std::net::IpAddr;

use anyhow::{Result, bail};

use crate::core::common::CandidateRecord;

/// Parse a nameserver address from the command line.
pub fn parse_ipaddr(s: &str) -> Result<IpAddr> {
    match s.trim().parse::<IpAddr>() {
        Ok(a) => Ok(a),
        Err(_) => bail!("nameserver address: `{s}` is invalid"),
    }
}

/// Read candidate records from either a JSON array of records
/// or a plain list with one hostname per line.
pub fn parse_candidates(s: &str) -> Result<Vec<CandidateRecord>> {
    let trimmed = s.trim_start();
    if trimmed.starts_with('[') {
        let records: Vec<CandidateRecord> = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => bail!("candidate list is not a valid JSON array of records: {e}"),
        };
        return Ok(records);
    }

    let records = s
        .lines()
        .map(str::trim)
        // Blank lines and comments
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(CandidateRecord::new)
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ipaddr_accepts_v4_and_v6() {
        assert!(parse_ipaddr("1.1.1.1").is_ok());
        assert!(parse_ipaddr("2606:4700:4700::1111").is_ok());
    }

    #[test]
    fn parse_ipaddr_rejects_hostname() {
        assert!(parse_ipaddr("dns.example.com").is_err());
    }

    #[test]
    fn plain_list_skips_blanks_and_comments() {
        let input = "# candidates\nwww.example.com\n\n  mail.example.com  \n";
        let records = parse_candidates(input).unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.subdomain.as_str()).collect();
        assert_eq!(names, vec!["www.example.com", "mail.example.com"]);
        assert!(records.iter().all(|r| r.ips.is_none() && r.valid));
    }

    #[test]
    fn json_list_keeps_existing_state() {
        let input = r#"[
            {"subdomain": "www.example.com", "ips": "192.0.2.1"},
            {"subdomain": "mail.example.com"}
        ]"#;
        let records = parse_candidates(input).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[0].is_resolved());
        assert!(!records[1].is_resolved());
    }

    #[test]
    fn json_without_subdomain_is_error() {
        assert!(parse_candidates(r#"[{"host": "www.example.com"}]"#).is_err());
    }

    #[test]
    fn empty_input_is_empty_list() {
        assert!(parse_candidates("").unwrap().is_empty());
    }
}
