pub const MAX_BODY_LENGTH: usize = 64 * 1024;
const MAX_CAUSE_LENGTH: usize = 300;

/// Cap a response body before diffing, on a char boundary.
pub fn truncate_body(body: &str) -> &str {
    if body.len() <= MAX_BODY_LENGTH {
        return body;
    }
    let mut end = MAX_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

pub fn truncate_cause(cause: &str) -> String {
    if cause.len() <= MAX_CAUSE_LENGTH {
        cause.to_string()
    } else {
        let mut end = MAX_CAUSE_LENGTH;
        while !cause.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &cause[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_body_untouched() {
        assert_eq!(truncate_body("abc"), "abc");
    }

    #[test]
    fn test_long_body_truncated_on_boundary() {
        let body = "é".repeat(MAX_BODY_LENGTH);
        let cut = truncate_body(&body);
        assert!(cut.len() <= MAX_BODY_LENGTH);
        assert!(cut.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_truncate_cause() {
        let long = "x".repeat(400);
        let t = truncate_cause(&long);
        assert!(t.ends_with("..."));
        assert_eq!(t.len(), MAX_CAUSE_LENGTH + 3);
    }
}
