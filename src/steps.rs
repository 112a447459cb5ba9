/// The named analysis steps the backend walks through, in logical order,
/// each with the completion percentage the progress bar should reach when
/// that step is announced.
///
/// The percentages are hand-tuned rather than derived from the step count:
/// network-bound steps (threat databases, IP reputation) cost far more than
/// local ones, so they get wider slices of the bar.
pub const STEP_TABLE: &[(&str, u8)] = &[
    ("Validating URL", 5),
    ("Checking SSL Certificate", 15),
    ("Analyzing Domain Age", 30),
    ("Scanning for Suspicious Keywords", 40),
    ("Analyzing Redirect Chain", 50),
    ("Checking Threat Databases", 65),
    ("Checking IP Reputation", 80),
    ("Checking DNS Records", 90),
    ("Calculating Risk Score", 95),
    (TERMINAL_STEP, 100),
];

/// The final step name, also used as the label when progress is forced to
/// completion on settlement.
pub const TERMINAL_STEP: &str = "Scan Complete";

/// Target percentage for a named step, or `None` for names outside the
/// fixed vocabulary. Unknown steps must never move the bar.
pub fn target_percent(step: &str) -> Option<u8> {
    STEP_TABLE
        .iter()
        .find(|(name, _)| *name == step)
        .map(|&(_, pct)| pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_strictly_increasing() {
        for pair in STEP_TABLE.windows(2) {
            assert!(
                pair[0].1 < pair[1].1,
                "{} ({}) must come before {} ({})",
                pair[0].0,
                pair[0].1,
                pair[1].0,
                pair[1].1
            );
        }
    }

    #[test]
    fn table_spans_first_to_complete() {
        assert_eq!(STEP_TABLE.first().unwrap().0, "Validating URL");
        assert_eq!(STEP_TABLE.first().unwrap().1, 5);
        assert_eq!(STEP_TABLE.last().unwrap().0, TERMINAL_STEP);
        assert_eq!(STEP_TABLE.last().unwrap().1, 100);
        assert_eq!(STEP_TABLE.len(), 10);
    }

    #[test]
    fn known_steps_resolve() {
        assert_eq!(target_percent("Checking SSL Certificate"), Some(15));
        assert_eq!(target_percent("Checking DNS Records"), Some(90));
    }

    #[test]
    fn unknown_steps_resolve_to_none() {
        assert_eq!(target_percent("Unknown Step"), None);
        assert_eq!(target_percent(""), None);
        // Lookup is exact, not case-insensitive.
        assert_eq!(target_percent("validating url"), None);
    }
}
