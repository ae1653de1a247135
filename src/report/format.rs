//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the normalizer and calculator stay free of presentation concerns
//! - output changes are localized

use crate::domain::{FeedingAssumptions, MarketEntry, NormalizedReport, ProfitResult};

/// Format the run summary (source, report date, normalization counts).
pub fn format_report_summary(report: &NormalizedReport, source: &str) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    out.push_str("=== vog - Feeder Cattle Value of Gain ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Report date: {}\n",
        report.report_date.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!(
        "Records: read={} | kept={} | unclassified={} | incomplete={} | older date={} | undated={}\n",
        stats.records_read,
        stats.entries_kept,
        stats.dropped_unclassified,
        stats.dropped_missing_fields,
        stats.dropped_older_date,
        stats.dropped_undated,
    ));
    out
}

/// Format bracket rows as a fixed-width table.
pub fn format_table(rows: &[&MarketEntry]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:<22} {:<12} {:>10} {:>12} {:>12}\n",
        "sex", "grade", "range", "avg lbs", "$/cwt", "$/head"
    ));
    out.push_str(&format!("{}\n", "-".repeat(83)));
    for e in rows {
        out.push_str(&format!(
            "{:<10} {:<22} {:<12} {:>10.0} {:>12.2} {:>12.2}\n",
            truncate(e.sex.display_name(), 10),
            truncate(&e.grade, 22),
            truncate(&e.weight_range, 12),
            e.avg_weight,
            e.avg_price,
            e.head_value(),
        ));
    }
    out
}

/// Format a profit result with the brackets and assumptions it came from.
pub fn format_profit(
    purchase: &MarketEntry,
    sale: &MarketEntry,
    assumptions: &FeedingAssumptions,
    result: &ProfitResult,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Purchase: {} {} {} @ {:.0} lbs, ${:.2}/cwt -> ${:.2}/head\n",
        purchase.sex, purchase.grade, purchase.weight_range, purchase.avg_weight, purchase.avg_price, result.purchase_value
    ));
    out.push_str(&format!(
        "Sale:     {} {} {} @ {:.0} lbs, ${:.2}/cwt -> ${:.2}/head\n",
        sale.sex, sale.grade, sale.weight_range, sale.avg_weight, sale.avg_price, result.sale_value
    ));
    out.push_str(&format!(
        "Assumptions: COG ${:.2}/lb | ADG {:.2} lbs/day\n",
        assumptions.cost_of_gain(),
        assumptions.target_adg()
    ));
    out.push('\n');
    out.push_str(&format!("Gain:           {:.0} lbs\n", result.gain));
    out.push_str(&format!("Value of gain:  ${:.2}/lb\n", result.value_of_gain));
    out.push_str(&format!("Return on gain: ${:.2}/lb\n", result.return_on_gain));
    out.push_str(&format!("Net profit:     {}/head\n", fmt_money(result.net_profit)));
    out.push_str(&format!("Days on feed:   {}\n", result.whole_days()));
    out
}

/// `$1,234.50` / `-$80.00`.
pub fn fmt_money(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    let cents = (v.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{frac:02}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NormalizeStats, Sex};

    fn entry(weight: f64, price: f64, range: &str) -> MarketEntry {
        MarketEntry {
            report_date: Some("03/07/2025".to_string()),
            sex: Sex::Steers,
            grade: "MEDIUM AND LARGE 1".to_string(),
            weight_range: range.to_string(),
            avg_weight: weight,
            avg_price: price,
        }
    }

    #[test]
    fn money_is_grouped_and_signed() {
        assert_eq!(fmt_money(62.5), "$62.50");
        assert_eq!(fmt_money(1234567.891), "$1,234,567.89");
        assert_eq!(fmt_money(-80.0), "-$80.00");
        assert_eq!(fmt_money(0.0), "$0.00");
    }

    #[test]
    fn summary_mentions_date_and_counts() {
        let report = NormalizedReport {
            entries: vec![entry(550.0, 300.0, "500-600")],
            report_date: Some("03/07/2025".to_string()),
            stats: NormalizeStats {
                records_read: 4,
                dropped_unclassified: 1,
                dropped_missing_fields: 1,
                dropped_older_date: 1,
                dropped_undated: 0,
                entries_kept: 1,
            },
        };
        let text = format_report_summary(&report, "report.json");
        assert!(text.contains("Report date: 03/07/2025"));
        assert!(text.contains("read=4 | kept=1"));
    }

    #[test]
    fn profit_block_shows_truncated_days() {
        let buy = entry(500.0, 180.0, "500-550");
        let sell = entry(750.0, 160.0, "700-800");
        let assumptions = FeedingAssumptions::new(0.95, 3.0).unwrap();
        let result = crate::profit::compute_profit(&buy, &sell, &assumptions).unwrap();

        let text = format_profit(&buy, &sell, &assumptions, &result);
        assert!(text.contains("Net profit:     $62.50/head"));
        assert!(text.contains("Days on feed:   83"));
    }

    #[test]
    fn table_has_header_and_rows() {
        let a = entry(550.0, 300.0, "500-600");
        let b = entry(650.0, 270.0, "600-700");
        let text = format_table(&[&a, &b]);
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("1650.00"));
    }
}
