//! Free-text step ingestion.
//!
//! Operators paste one `<step> - <notch>` pair per line:
//!
//! ```text
//! 1 - 93
//! 2 - 201
//! ```
//!
//! Blank lines are ignored and surrounding whitespace is tolerated. Any other
//! line rejects the whole input.

use crate::error::{NotchError, Result};
use crate::order::Step;
use regex::Regex;
use std::sync::OnceLock;

pub const EXPECTED_FORMAT: &str = "1 - 93";

static LINE_RE: OnceLock<Regex> = OnceLock::new();

fn line_re() -> &'static Regex {
    LINE_RE.get_or_init(|| Regex::new(r"^(\d+)\s*-\s*(\d+)$").unwrap())
}

/// Parse step text into records sorted ascending by step number.
///
/// Duplicate step numbers are kept in input order.
pub fn parse_steps(text: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        steps.push(parse_line(line)?);
    }
    sort_steps(&mut steps);
    Ok(steps)
}

fn parse_line(line: &str) -> Result<Step> {
    let caps = line_re().captures(line).ok_or_else(|| invalid_line(line))?;
    let step: u32 = caps[1].parse().map_err(|_| invalid_line(line))?;
    let notch: u32 = caps[2].parse().map_err(|_| invalid_line(line))?;
    if step == 0 {
        return Err(invalid_line(line));
    }
    Ok(Step { step, notch })
}

fn invalid_line(line: &str) -> NotchError {
    NotchError::Validation(format!(
        "invalid line: \"{line}\". Expected format: {EXPECTED_FORMAT}"
    ))
}

/// Stable sort by step number.
pub fn sort_steps(steps: &mut [Step]) {
    steps.sort_by_key(|s| s.step);
}

/// Render records back into the one-pair-per-line text form.
pub fn format_steps(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|s| format!("{} - {}\n", s.step, s.notch))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(steps: &[Step]) -> Vec<(u32, u32)> {
        steps.iter().map(|s| (s.step, s.notch)).collect()
    }

    #[test]
    fn parses_and_sorts() {
        let steps = parse_steps("2 - 10\n1 - 5\n").unwrap();
        assert_eq!(pairs(&steps), vec![(1, 5), (2, 10)]);
    }

    #[test]
    fn tolerates_whitespace_crlf_and_blank_lines() {
        let text = "\r\n  3-7  \r\n\n1 -   93\r\n\t2 - 201\t\n\n";
        let steps = parse_steps(text).unwrap();
        assert_eq!(pairs(&steps), vec![(1, 93), (2, 201), (3, 7)]);
    }

    #[test]
    fn one_record_per_non_blank_line() {
        let text = "5 - 1\n\n4 - 2\n3 - 3\n   \n2 - 4\n1 - 5";
        let non_blank = text.lines().filter(|l| !l.trim().is_empty()).count();
        assert_eq!(parse_steps(text).unwrap().len(), non_blank);
    }

    #[test]
    fn keeps_duplicates_in_input_order() {
        let steps = parse_steps("2 - 1\n1 - 9\n2 - 3").unwrap();
        assert_eq!(pairs(&steps), vec![(1, 9), (2, 1), (2, 3)]);
    }

    #[test]
    fn empty_text_yields_no_steps() {
        assert!(parse_steps("").unwrap().is_empty());
        assert!(parse_steps(" \n\t\n").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_lines_naming_them() {
        for bad in ["1 93", "a - 3", "1 - -3", "1 - 2 - 3", "1 -", "- 4", "1.5 - 2"] {
            let text = format!("1 - 5\n{bad}\n3 - 4");
            let err = parse_steps(&text).unwrap_err();
            let NotchError::Validation(msg) = err else {
                panic!("expected validation error for {bad:?}");
            };
            assert!(msg.contains(bad.trim()), "message {msg:?} should name {bad:?}");
            assert!(msg.contains(EXPECTED_FORMAT));
        }
    }

    #[test]
    fn rejects_step_zero_and_overflow() {
        assert!(parse_steps("0 - 5").is_err());
        assert!(parse_steps("1 - 99999999999").is_err());
    }

    #[test]
    fn format_round_trips_sorted_input() {
        let text = "1 - 93\n2 - 201\n";
        assert_eq!(format_steps(&parse_steps(text).unwrap()), text);
    }
}
