//! `breathpace patterns`: lists the built-in breathing patterns.

use std::fmt::Write as _;

use crate::cli::args::{OutputFormat, PatternsArgs};
use crate::error::BreathpaceError;
use crate::patterns::{BreathPattern, list_patterns};

/// Print the pattern registry.
///
/// # Errors
///
/// Returns `BreathpaceError::Json` if JSON serialization fails.
pub fn run(args: &PatternsArgs) -> Result<(), BreathpaceError> {
    let patterns = list_patterns(args.tag.as_deref());
    tracing::debug!(count = patterns.len(), tag = ?args.tag, "listing patterns");

    match args.format {
        OutputFormat::Human => print!("{}", render_table(&patterns)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&patterns)?),
    }
    Ok(())
}

/// One line per pattern: name, label, timings, cycles, pace, description.
fn render_table(patterns: &[&BreathPattern]) -> String {
    let mut out = String::new();
    if patterns.is_empty() {
        out.push_str("no patterns match\n");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<10} {:<12} {:<12} {:>6} {:>6}  DESCRIPTION",
        "NAME", "LABEL", "TIMINGS", "CYCLES", "BPM"
    );
    for p in patterns {
        let t = p.timings;
        let timings = format!("{}-{}-{}-{}", t.inhale, t.hold, t.exhale, t.rest);
        let _ = writeln!(
            out,
            "{:<10} {:<12} {:<12} {:>6} {:>6.1}  {}",
            p.name,
            p.label,
            timings,
            p.recommended_cycles,
            p.breaths_per_minute(),
            p.description
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_pattern() {
        let patterns = list_patterns(None);
        let table = render_table(&patterns);
        assert_eq!(table.lines().count(), patterns.len() + 1);
        assert!(table.contains("4-7-8"));
        assert!(table.contains("4-7-8-4"));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(render_table(&[]), "no patterns match\n");
    }
}
