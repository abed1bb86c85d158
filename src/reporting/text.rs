use std::fmt::Write;
use crate::session::ScanSession;

const RULE_WIDE: usize = 70;
const RULE_NARROW: usize = 40;

/// Human-readable report: summary, then protected hosts, exposed hosts and
/// the unique real IPs, each group in recording order.
pub fn render_text(session: &ScanSession) -> String {
    let mut out = String::new();
    let c = session.counters();

    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDE));
    let _ = writeln!(out, "CLOUDMARE SCAN RESULTS");
    let _ = writeln!(out, "Target: {}", session.target_domain);
    let _ = writeln!(out, "Date: {}", session.scan_date.to_rfc3339());
    let _ = writeln!(out, "{}\n", "=".repeat(RULE_WIDE));

    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{}", "-".repeat(RULE_NARROW));
    let _ = writeln!(out, "Total Subdomains Scanned: {}", c.total_subdomains);
    let _ = writeln!(out, "Protected by WAF: {}", c.protected_by_waf);
    let _ = writeln!(out, "Potential Real IPs: {}", c.potential_real_ips);
    let _ = writeln!(out, "Errors: {}\n", c.errors);

    let protected: Vec<_> = session.protected().collect();
    if !protected.is_empty() {
        let _ = writeln!(out, "PROTECTED BY WAF");
        let _ = writeln!(out, "{}", "-".repeat(RULE_NARROW));
        for r in protected {
            let _ = writeln!(out, "  {}", r.candidate);
            let _ = writeln!(out, "    WAF IP: {}", r.waf_ip.as_deref().unwrap_or("-"));
            let _ = writeln!(
                out,
                "    Provider: {}\n",
                r.provider.map(|p| p.as_str()).unwrap_or("-")
            );
        }
    }

    let exposed: Vec<_> = session.exposed().collect();
    if !exposed.is_empty() {
        let _ = writeln!(out, "POTENTIAL REAL IPs (NOT PROTECTED)");
        let _ = writeln!(out, "{}", "-".repeat(RULE_NARROW));
        for r in exposed {
            let _ = writeln!(out, "  {}", r.candidate);
            let _ = writeln!(out, "    Real IP: {}\n", r.real_ip.as_deref().unwrap_or("-"));
        }
    }

    let real_ips = session.real_ips();
    if !real_ips.is_empty() {
        let _ = writeln!(out, "UNIQUE REAL IPs FOUND");
        let _ = writeln!(out, "{}", "-".repeat(RULE_NARROW));
        for ip in real_ips {
            let _ = writeln!(out, "  {}", ip);
        }
    }

    out
}
