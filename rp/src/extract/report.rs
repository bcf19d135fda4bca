//! Heuristic extraction of plan structure from narrative text

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{KpiSet, KpiSnapshot, Plan, RecommendedAction};

/// Headings whose list items are treated as the action section
const ACTION_HEADINGS: [&str; 3] = ["recommended actions", "action plan", "next steps"];

/// Maximum KPI rows extracted from a table
const MAX_KPI_ROWS: usize = 25;

/// Maximum list items collected by the actions fallback
const MAX_FALLBACK_ACTIONS: usize = 10;

/// One row of an extracted KPI table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiRow {
    pub name: String,
    pub value: String,
    pub description: String,
}

/// Best-effort extraction result
///
/// Every field defaults to empty; a report that matches none of the rules
/// yields `ExtractedReport::default()`, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractedReport {
    /// First prose line of the report
    pub overview: Option<String>,
    /// Citation tags, deduplicated in first-appearance order
    pub evidence: Vec<String>,
    /// Action items found under an action heading (or the fallback scan)
    pub actions: Vec<String>,
    /// Rows of the first KPI table
    pub kpi_rows: Vec<KpiRow>,
    /// Sum of all literal currency amounts in the text
    pub cost_estimate: Option<f64>,
}

impl ExtractedReport {
    /// Assemble a display-only plan approximation
    pub fn into_plan_preview(self) -> Plan {
        let actions = self
            .actions
            .iter()
            .enumerate()
            .map(|(i, text)| RecommendedAction::new(format!("extracted-{}", i + 1), text.clone(), String::new()))
            .collect();

        Plan {
            id: "extracted".to_string(),
            summary: self.overview.unwrap_or_default(),
            kpis: KpiSnapshot {
                baseline: KpiSet::default(),
                projected: KpiSet {
                    cost_total: self.cost_estimate,
                    ..KpiSet::default()
                },
            },
            actions,
        }
    }
}

/// Extract an approximate plan shape from narrative report text
///
/// Pure and infallible: malformed input degrades field by field.
pub fn extract_report(text: &str) -> ExtractedReport {
    let report = ExtractedReport {
        overview: extract_overview(text),
        evidence: extract_evidence(text),
        actions: extract_actions(text),
        kpi_rows: extract_kpi_rows(text),
        cost_estimate: extract_cost_estimate(text),
    };
    debug!(
        has_overview = report.overview.is_some(),
        evidence = report.evidence.len(),
        actions = report.actions.len(),
        kpi_rows = report.kpi_rows.len(),
        "extract_report: done"
    );
    report
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("- ") || trimmed.starts_with("* ") || trimmed.starts_with("+ ") {
        return true;
    }
    // numbered items: "1. foo" / "2) bar"
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }
    let rest = &trimmed[digits.len()..];
    rest.starts_with(". ") || rest.starts_with(") ")
}

fn list_item_text(line: &str) -> String {
    let trimmed = line.trim_start();
    let stripped = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "));
    if let Some(rest) = stripped {
        return rest.trim().to_string();
    }
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    let rest = &trimmed[digits.len()..];
    rest.trim_start_matches(['.', ')']).trim().to_string()
}

fn heading_text(line: &str) -> String {
    line.trim_start()
        .trim_start_matches('#')
        .trim()
        .trim_end_matches(':')
        .to_lowercase()
}

/// First non-empty line that is neither a heading nor a list item
fn extract_overview(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !is_heading(line) && !is_list_item(line))
        .map(str::to_string)
}

/// `[Source: ...]` tags, brackets stripped, deduplicated in first-appearance order
fn extract_evidence(text: &str) -> Vec<String> {
    let Ok(re) = Regex::new(r"\[(Source:\s*[^\]]+)\]") else {
        return Vec::new();
    };
    let mut seen = Vec::new();
    for cap in re.captures_iter(text) {
        let tag = cap[1].trim().to_string();
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// List items under an action heading; section ends at the next heading
///
/// Falls back to the first 10 list items anywhere when no action section
/// exists.
fn extract_actions(text: &str) -> Vec<String> {
    let mut actions = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        if is_heading(line) {
            if in_section {
                break;
            }
            let heading = heading_text(line);
            in_section = ACTION_HEADINGS.iter().any(|h| heading == *h);
            continue;
        }
        if in_section && is_list_item(line) {
            let item = list_item_text(line);
            if !item.is_empty() {
                actions.push(item);
            }
        }
    }

    if !actions.is_empty() {
        return actions;
    }

    // No action section: first list items anywhere, in document order
    text.lines()
        .filter(|line| is_list_item(line))
        .map(list_item_text)
        .filter(|item| !item.is_empty())
        .take(MAX_FALLBACK_ACTIONS)
        .collect()
}

fn table_cells(line: &str) -> Vec<String> {
    line.trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(|c| c.trim().to_string())
        .collect()
}

fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells
            .iter()
            .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
}

/// Rows of the first pipe table whose header contains a "KPI" cell
fn extract_kpi_rows(text: &str) -> Vec<KpiRow> {
    let mut rows = Vec::new();
    let mut in_table = false;

    for line in text.lines() {
        let is_row = line.trim().contains('|') && !line.trim().is_empty();
        if !is_row {
            if in_table {
                break;
            }
            continue;
        }

        let cells = table_cells(line);
        if !in_table {
            if cells.iter().any(|c| c.eq_ignore_ascii_case("kpi")) {
                in_table = true;
            }
            continue;
        }

        if is_separator_row(&cells) {
            continue;
        }

        let mut non_empty = cells.into_iter().filter(|c| !c.is_empty());
        let Some(name) = non_empty.next() else { continue };
        let value = non_empty.next().unwrap_or_default();
        let description = non_empty.next().unwrap_or_default();
        rows.push(KpiRow { name, value, description });

        if rows.len() >= MAX_KPI_ROWS {
            break;
        }
    }

    rows
}

/// Sum of literal currency amounts anywhere in the text
///
/// Non-numeric matches are discarded silently.
fn extract_cost_estimate(text: &str) -> Option<f64> {
    let Ok(re) = Regex::new(r"[$€£]\s?([0-9][0-9,]*(?:\.[0-9]{1,2})?)") else {
        return None;
    };
    let mut total = 0.0;
    let mut found = false;
    for cap in re.captures_iter(text) {
        let cleaned = cap[1].replace(',', "");
        if let Ok(amount) = cleaned.parse::<f64>() {
            total += amount;
            found = true;
        }
    }
    found.then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
# Quarterly Supply Review

Service levels improved across all markets this quarter. [Source: OTIF dashboard]

Costs remain above target [Source: Cost ledger], driven by expedited freight
of $12,500.00 and storage overruns of $3,000 [Source: OTIF dashboard].

## Recommended Actions

- Rebalance inventory toward coastal DCs
- Renegotiate carrier contracts
- Cut expedited freight usage

## Appendix

| KPI | Value | Notes |
|-----|-------|-------|
| Service level | 0.95 | rolling 4-week |
| Cost total | $940,000 | projected |
";

    #[test]
    fn test_overview_skips_headings_and_lists() {
        let report = extract_report(REPORT);
        assert_eq!(
            report.overview.as_deref(),
            Some("Service levels improved across all markets this quarter. [Source: OTIF dashboard]")
        );
    }

    #[test]
    fn test_evidence_dedup_preserves_first_appearance_order() {
        let report = extract_report(REPORT);
        assert_eq!(report.evidence, vec!["Source: OTIF dashboard", "Source: Cost ledger"]);
    }

    #[test]
    fn test_actions_from_section() {
        let report = extract_report(REPORT);
        assert_eq!(
            report.actions,
            vec![
                "Rebalance inventory toward coastal DCs",
                "Renegotiate carrier contracts",
                "Cut expedited freight usage",
            ]
        );
    }

    #[test]
    fn test_actions_fallback_without_section() {
        let text = "Summary line.\n\n- item one\n- item two\n\n## Other\n- item three\n";
        let report = extract_report(text);
        assert_eq!(report.actions, vec!["item one", "item two", "item three"]);
    }

    #[test]
    fn test_actions_fallback_caps_at_ten() {
        let mut text = String::from("Intro.\n");
        for i in 0..15 {
            text.push_str(&format!("- item {}\n", i));
        }
        let report = extract_report(&text);
        assert_eq!(report.actions.len(), 10);
    }

    #[test]
    fn test_kpi_table_rows_skip_separator() {
        let report = extract_report(REPORT);
        assert_eq!(
            report.kpi_rows,
            vec![
                KpiRow {
                    name: "Service level".to_string(),
                    value: "0.95".to_string(),
                    description: "rolling 4-week".to_string(),
                },
                KpiRow {
                    name: "Cost total".to_string(),
                    value: "$940,000".to_string(),
                    description: "projected".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_kpi_table_requires_kpi_header() {
        let text = "| Name | Value |\n|------|-------|\n| a | 1 |\n";
        let report = extract_report(text);
        assert!(report.kpi_rows.is_empty());
    }

    #[test]
    fn test_kpi_rows_capped_at_25() {
        let mut text = String::from("| KPI | Value |\n|-----|-------|\n");
        for i in 0..30 {
            text.push_str(&format!("| k{} | {} |\n", i, i));
        }
        let report = extract_report(&text);
        assert_eq!(report.kpi_rows.len(), 25);
    }

    #[test]
    fn test_cost_estimate_sums_currency_literals() {
        let report = extract_report(REPORT);
        // $12,500.00 + $3,000 + $940,000 from the KPI table
        assert_eq!(report.cost_estimate, Some(955_500.0));
    }

    #[test]
    fn test_never_fails_on_degenerate_input() {
        assert_eq!(extract_report(""), ExtractedReport::default());

        let no_table = extract_report("just a sentence with no structure");
        assert_eq!(no_table.overview.as_deref(), Some("just a sentence with no structure"));
        assert!(no_table.kpi_rows.is_empty());
        assert!(no_table.evidence.is_empty());

        // mismatched column counts must not panic
        let malformed = "| KPI | Value |\n|---|\n| only-name |\n| a | b | c | d | e |\n";
        let report = extract_report(malformed);
        assert_eq!(report.kpi_rows.len(), 2);
        assert_eq!(report.kpi_rows[0].name, "only-name");
        assert_eq!(report.kpi_rows[0].value, "");
    }

    #[test]
    fn test_plan_preview_is_display_only_shape() {
        let plan = extract_report(REPORT).into_plan_preview();
        assert_eq!(plan.id, "extracted");
        assert_eq!(plan.actions.len(), 3);
        assert_eq!(plan.kpis.projected.cost_total, Some(955_500.0));
        assert!(plan.kpis.baseline.cost_total.is_none());
    }
}
