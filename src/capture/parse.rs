use log::{debug, warn};

/// One parsed `(time, position)` telemetry pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub time_ms: f64,
    pub position: f64,
}

/// Per-line verdict. Skips carry the reason for diagnostics; none of them
/// ends a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineOutcome {
    Sample(Sample),
    Empty,
    MissingSeparator,
    BadNumber,
}

/// Best-effort parse of one `<time>,<position>` line.
///
/// Splits at the first comma and parses both halves as floats. Anything that
/// doesn't fit is data loss, not failure: the verdict says why and the caller
/// moves on to the next line.
pub fn parse_line(raw: &str) -> LineOutcome {
    let line = raw.trim();
    if line.is_empty() {
        return LineOutcome::Empty;
    }
    let Some((time_str, pos_str)) = line.split_once(',') else {
        debug!("line without separator: {line:?}");
        return LineOutcome::MissingSeparator;
    };
    match (time_str.trim().parse::<f64>(), pos_str.trim().parse::<f64>()) {
        (Ok(time_ms), Ok(position)) => LineOutcome::Sample(Sample { time_ms, position }),
        _ => {
            warn!("non-numeric telemetry line: {line:?}");
            LineOutcome::BadNumber
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_pair() {
        assert_eq!(
            parse_line("12.5,1000"),
            LineOutcome::Sample(Sample {
                time_ms: 12.5,
                position: 1000.0,
            })
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(
            parse_line("  3.5 , 42 \r\n"),
            LineOutcome::Sample(Sample {
                time_ms: 3.5,
                position: 42.0,
            })
        );
    }

    #[test]
    fn empty_line_is_a_skip() {
        assert_eq!(parse_line(""), LineOutcome::Empty);
        assert_eq!(parse_line("   \r"), LineOutcome::Empty);
    }

    #[test]
    fn line_without_comma_is_a_skip() {
        assert_eq!(parse_line("hello"), LineOutcome::MissingSeparator);
        assert_eq!(parse_line("12.5 1000"), LineOutcome::MissingSeparator);
    }

    #[test]
    fn non_numeric_fields_are_a_skip() {
        assert_eq!(parse_line("a,b"), LineOutcome::BadNumber);
        assert_eq!(parse_line("12.5,"), LineOutcome::BadNumber);
        assert_eq!(parse_line(",1000"), LineOutcome::BadNumber);
        // Extra commas end up in the second field and fail the float parse.
        assert_eq!(parse_line("1,2,3"), LineOutcome::BadNumber);
    }
}
