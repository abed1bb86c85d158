use std::time::Duration;
use similar::{Algorithm, TextDiff};
use crate::errors::CloudmareError;
use super::truncation::truncate_body;

/// Upper bound on diff time for pathological bodies; the ratio is still
/// meaningful when the diff bails out early.
const DIFF_DEADLINE: Duration = Duration::from_secs(2);

/// Textual overlap between two response bodies in `[0.0, 1.0]`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a = truncate_body(a);
    let b = truncate_body(b);

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .timeout(DIFF_DEADLINE)
        .diff_chars(a, b);
    f64::from(diff.ratio()).clamp(0.0, 1.0)
}

/// [`similarity_ratio`] on the blocking pool, so a slow diff never holds up
/// the tasks sharing this executor thread.
pub async fn similarity_score(a: String, b: String) -> Result<f64, CloudmareError> {
    tokio::task::spawn_blocking(move || similarity_ratio(&a, &b))
        .await
        .map_err(|e| CloudmareError::Internal(format!("Similarity task failed: {}", e)))
}

/// Scores above the threshold match. A perfect score always matches, so a
/// threshold of 1.0 still accepts identical bodies.
pub fn is_match(score: f64, threshold: f64) -> bool {
    score >= 1.0 || score > threshold
}
