use csv::Writer;
use crate::errors::CloudmareError;
use crate::session::ScanSession;

pub fn render_csv(session: &ScanSession) -> Result<Vec<u8>, CloudmareError> {
    let mut wtr = Writer::from_writer(vec![]);

    wtr.write_record(["Subdomain", "WAF IP", "Real IP", "WAF Provider", "Status"])?;

    for r in session.results() {
        wtr.write_record([
            r.candidate.as_str(),
            r.waf_ip.as_deref().unwrap_or_default(),
            r.real_ip.as_deref().unwrap_or_default(),
            r.provider.map(|p| p.as_str()).unwrap_or_default(),
            r.status.as_str(),
        ])?;
    }

    wtr.into_inner()
        .map_err(|e| CloudmareError::Internal(format!("Failed to flush CSV writer: {}", e)))
}
