use console::style;
use crate::models::{ComparisonResult, ScanStatus};
use crate::session::ScanSession;
use crate::utils::formatting::format_percent;

/// One coloured line per recorded result.
pub fn format_result_line(result: &ComparisonResult) -> String {
    match result.status {
        ScanStatus::Protected => format!(
            "  {} {} {}",
            style("[-]").yellow().bold(),
            result.candidate,
            style(format!(
                "protected by {} ({})",
                result.provider.map(|p| p.as_str()).unwrap_or("unknown"),
                result.waf_ip.as_deref().unwrap_or("-"),
            ))
            .dim(),
        ),
        ScanStatus::Exposed => format!(
            "  {} {} {} {}",
            style("[+]").green().bold(),
            result.candidate,
            style(format!("real IP {}", result.real_ip.as_deref().unwrap_or("-"))).green(),
            style(format!("({} match)", format_percent(result.similarity_score.unwrap_or(0.0)))).dim(),
        ),
        ScanStatus::Error => format!(
            "  {} {} {}",
            style("[x]").red(),
            result.candidate,
            style(result.cause.as_deref().unwrap_or("error")).dim(),
        ),
    }
}

/// Final console summary, printed whether or not the scan ran to completion.
pub fn print_summary(session: &ScanSession, elapsed: &str, interrupted: bool) {
    let counters = session.counters();
    println!();
    if interrupted {
        println!("  {}", style("Scan interrupted, partial results below").yellow().bold());
    }
    println!(
        "  {} {}  {}",
        style("Summary for").white().bold(),
        style(&session.target_domain).cyan().bold(),
        style(elapsed).dim(),
    );
    println!("    {:<22} {}", "Candidates checked", counters.total_subdomains);
    println!("    {:<22} {}", "Protected by WAF", style(counters.protected_by_waf).yellow());
    println!("    {:<22} {}", "Potential real IPs", style(counters.potential_real_ips).green().bold());
    println!("    {:<22} {}", "Errors", style(counters.errors).red());

    let real_ips = session.real_ips();
    if real_ips.is_empty() {
        println!("\n  {}", style("No origin IP found").dim());
    } else {
        println!("\n  {}", style("Unique real IPs").white().bold());
        for ip in real_ips {
            println!("    {} {}", style("\u{2192}").green(), ip);
        }
    }
    println!();
}
