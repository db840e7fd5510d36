use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Elevator code as painted in buildings: block letter(s) followed by the
/// elevator number, e.g. `A2` or `B-12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorCode {
    pub block: String,
    pub number: String,
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)[-\s]?([0-9]+)$").expect("elevator code pattern is valid")
    })
}

pub fn parse_elevator_code(input: &str) -> Option<ElevatorCode> {
    let caps = code_pattern().captures(input.trim())?;
    Some(ElevatorCode {
        block: caps[1].to_ascii_uppercase(),
        number: caps[2].to_string(),
    })
}

impl ElevatorCode {
    pub fn new(block: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            number: number.into(),
        }
    }
}

impl fmt::Display for ElevatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.block, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_code() {
        assert_eq!(parse_elevator_code("A2"), Some(ElevatorCode::new("A", "2")));
        assert_eq!(parse_elevator_code(" c10 "), Some(ElevatorCode::new("C", "10")));
    }

    #[test]
    fn test_parse_with_separator() {
        assert_eq!(parse_elevator_code("b-12"), Some(ElevatorCode::new("B", "12")));
        assert_eq!(parse_elevator_code("AB 3"), Some(ElevatorCode::new("AB", "3")));
    }

    #[test]
    fn test_rejects_malformed_codes() {
        assert_eq!(parse_elevator_code(""), None);
        assert_eq!(parse_elevator_code("12"), None);
        assert_eq!(parse_elevator_code("A"), None);
        assert_eq!(parse_elevator_code("A2B"), None);
        assert_eq!(parse_elevator_code("A--2"), None);
    }

    #[test]
    fn test_display_round_trip() {
        let code = parse_elevator_code("d-07").unwrap();
        assert_eq!(code.to_string(), "D07");
    }
}
