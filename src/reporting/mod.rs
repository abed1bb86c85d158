pub mod csv;
pub mod json;
pub mod text;

use std::path::{Path, PathBuf};
use tracing::info;
use crate::config::ExportFormat;
use crate::errors::CloudmareError;
use crate::session::ScanSession;
use crate::utils::domain::domain_label;

/// Write the session in each requested format to
/// `<dir>/results-<label>.<ext>`. Returns the written paths.
pub async fn export(
    session: &ScanSession,
    formats: &[ExportFormat],
    dir: &Path,
) -> Result<Vec<PathBuf>, CloudmareError> {
    if formats.is_empty() {
        return Ok(Vec::new());
    }
    tokio::fs::create_dir_all(dir).await?;

    let base = format!("results-{}", domain_label(&session.target_domain));
    let mut written = Vec::new();
    for format in formats {
        let bytes = match format {
            ExportFormat::Json => json::render_json(session)?.into_bytes(),
            ExportFormat::Csv => csv::render_csv(session)?,
            ExportFormat::Txt => text::render_text(session).into_bytes(),
        };
        let path = dir.join(format!("{}.{}", base, format.extension()));
        tokio::fs::write(&path, &bytes).await?;
        info!(path = %path.display(), format = format.extension(), "Results saved");
        written.push(path);
    }
    Ok(written)
}
