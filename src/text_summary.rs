//! Text summary builder for CLI output.
//!
//! Formats the final reel line for text mode and the JSON summary object.

use serde::Serialize;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Outcome of the line of reels once every wheel has stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payline {
    /// Every reel shows the same item.
    Jackpot(String),
    /// The most common item and how many reels show it.
    Match { item: String, count: usize },
    NoMatch,
}

impl Payline {
    pub fn describe(&self) -> String {
        match self {
            Payline::Jackpot(item) => format!("JACKPOT: all reels show {item}"),
            Payline::Match { item, count } => format!("{count} x {item}"),
            Payline::NoMatch => "No match".into(),
        }
    }
}

/// Evaluate the items under the payline, one per wheel.
pub fn evaluate_payline(shown: &[&str]) -> Payline {
    let mut best: Option<(&str, usize)> = None;
    for &item in shown {
        let count = shown.iter().filter(|&&s| s == item).count();
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((item, count));
        }
    }
    match best {
        Some((item, count)) if count == shown.len() && count > 1 => {
            Payline::Jackpot(item.to_string())
        }
        Some((item, count)) if count > 1 => Payline::Match {
            item: item.to_string(),
            count,
        },
        _ => Payline::NoMatch,
    }
}

/// Items shown by each wheel for the given final positions.
fn shown<'a>(items: &'a [String], finals: &[usize]) -> Vec<&'a str> {
    finals
        .iter()
        .map(|&p| items.get(p).map(String::as_str).unwrap_or("?"))
        .collect()
}

/// Build a text summary from the final position of every wheel.
pub(crate) fn build_text_summary(items: &[String], finals: &[usize]) -> TextSummary {
    let shown = shown(items, finals);
    let mut lines = Vec::with_capacity(shown.len() + 2);
    for (i, (item, pos)) in shown.iter().zip(finals).enumerate() {
        lines.push(format!("Reel {}: {item} (position {pos})", i + 1));
    }
    lines.push(format!("Line: {}", shown.join(" | ")));
    lines.push(format!("Result: {}", evaluate_payline(&shown).describe()));
    TextSummary { lines }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSummary {
    pub positions: Vec<usize>,
    pub items: Vec<String>,
    pub payline: Payline,
}

pub(crate) fn build_json_summary(items: &[String], finals: &[usize]) -> JsonSummary {
    let shown = shown(items, finals);
    JsonSummary {
        positions: finals.to_vec(),
        payline: evaluate_payline(&shown),
        items: shown.into_iter().map(String::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payline_outcomes() {
        assert_eq!(
            evaluate_payline(&["7", "7", "7"]),
            Payline::Jackpot("7".into())
        );
        assert_eq!(
            evaluate_payline(&["BAR", "7", "BAR"]),
            Payline::Match {
                item: "BAR".into(),
                count: 2
            }
        );
        assert_eq!(evaluate_payline(&["BAR", "7", "BELL"]), Payline::NoMatch);
        assert_eq!(evaluate_payline(&["7"]), Payline::NoMatch);
    }

    #[test]
    fn text_summary_lists_every_reel() {
        let items: Vec<String> = ["7", "BAR", "BELL"].map(String::from).to_vec();
        let summary = build_text_summary(&items, &[1, 1, 2]);
        assert_eq!(
            summary.lines,
            [
                "Reel 1: BAR (position 1)",
                "Reel 2: BAR (position 1)",
                "Reel 3: BELL (position 2)",
                "Line: BAR | BAR | BELL",
                "Result: 2 x BAR",
            ]
        );
    }

    #[test]
    fn json_summary_carries_items() {
        let items: Vec<String> = ["7", "BAR"].map(String::from).to_vec();
        let json = serde_json::to_value(build_json_summary(&items, &[0, 0])).unwrap();
        assert_eq!(json["items"], serde_json::json!(["7", "7"]));
        assert_eq!(json["payline"]["jackpot"], "7");
    }
}
