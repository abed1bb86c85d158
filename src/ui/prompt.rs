use console::{style, Term};

const AFFIRMATIVE: &[&str] = &["y", "yes", "ok", "okay", "sure", "yep", "yeah", "yup", "ya", "yeh", "ye"];
const NEGATIVE: &[&str] = &["n", "no", "nope", "nop", "naw", "na", "nah", "nay"];

/// Interpret a typed answer. Empty input takes the default; anything
/// unrecognised yields `None`.
pub fn parse_answer(input: &str, default: bool) -> Option<bool> {
    let answer = input.trim().to_lowercase();
    if answer.is_empty() {
        Some(default)
    } else if AFFIRMATIVE.contains(&answer.as_str()) {
        Some(true)
    } else if NEGATIVE.contains(&answer.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Blocking yes/no question on the terminal. Falls back to the default when
/// stdin is closed.
pub fn ask_yes_no(question: &str, default: bool) -> bool {
    let term = Term::stderr();
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        let _ = term.write_str(&format!("{} {} ", style("[?]").yellow().bold(), question));
        let _ = term.write_str(&format!("{} ", style(hint).dim()));
        let line = match term.read_line() {
            Ok(line) => line,
            Err(_) => return default,
        };
        match parse_answer(&line, default) {
            Some(answer) => return answer,
            None => {
                let _ = term.write_line(&format!("    {}", style("Please answer yes or no").red()));
            }
        }
    }
}
