use std::collections::BTreeMap;
use std::fmt::Write;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::transaction::TransactionTable;

use super::views::{BalancePoint, DateRange, TypeCounts, TypeTotals};

/// Everything the page shows, already derived.
pub struct PageModel<'a> {
    pub table: &'a TransactionTable,
    pub range: Option<DateRange>,
    pub filtered: &'a TransactionTable,
    pub counts: &'a BTreeMap<String, TypeCounts>,
    pub totals: &'a BTreeMap<String, TypeTotals>,
    pub account: Option<&'a str>,
    pub series: &'a [BalancePoint],
}

pub fn render_page(model: &PageModel<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Client transactions</title>\
         <style>body{font-family:sans-serif;margin:2em}table{border-collapse:collapse;margin-bottom:1.5em}\
         td,th{border:1px solid #ccc;padding:4px 8px}.bar{display:flex;height:14px;width:400px}\
         .deposit{background:green}.withdrawal{background:red}</style></head><body>",
    );
    html.push_str("<h1>Client transaction tracking</h1>");

    html.push_str("<h2>All transactions</h2>");
    push_rows(&mut html, model.table);

    html.push_str("<h2>Filtered transactions</h2>");
    push_filter_form(&mut html, model);
    push_rows(&mut html, model.filtered);

    html.push_str("<h2>Transactions per account</h2>");
    push_counts(&mut html, model.counts);

    html.push_str("<h2>Amounts per account</h2>");
    push_totals(&mut html, model.totals);

    html.push_str("<h2>Balance over time</h2>");
    if let Some(account) = model.account {
        let _ = write!(html, "<p>Account: <strong>{}</strong></p>", escape(account));
        push_series(&mut html, model.series);
    } else {
        html.push_str("<p>No account to show.</p>");
    }

    html.push_str("</body></html>");
    html
}

fn push_rows(html: &mut String, table: &TransactionTable) {
    if table.is_empty() {
        html.push_str("<p>No transactions.</p>");
        return;
    }

    html.push_str(
        "<table><tr><th>transaction_date</th><th>account</th><th>transaction_value</th>\
         <th>balance</th><th>transaction_type</th></tr>",
    );
    for row in table {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.canonical_date(),
            escape(&row.account),
            row.amount,
            row.balance,
            row.transaction_type
        );
    }
    html.push_str("</table>");
}

fn push_filter_form(html: &mut String, model: &PageModel<'_>) {
    let (start, end) = match model.range {
        Some(range) => (range.start.to_string(), range.end.to_string()),
        None => (String::new(), String::new()),
    };

    let _ = write!(
        html,
        "<form method=\"get\">Start <input type=\"date\" name=\"start\" value=\"{}\"> \
         End <input type=\"date\" name=\"end\" value=\"{}\"> Account <select name=\"account\">",
        start, end
    );
    for account in model.table.accounts() {
        let selected = if Some(account.as_str()) == model.account { " selected" } else { "" };
        let _ = write!(
            html,
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(&account),
            selected
        );
    }
    html.push_str("</select> <button type=\"submit\">Apply</button></form>");
}

fn push_counts(html: &mut String, counts: &BTreeMap<String, TypeCounts>) {
    html.push_str("<table><tr><th>account</th><th>deposit</th><th>withdrawal</th></tr>");
    for (account, c) in counts {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(account),
            c.deposit,
            c.withdrawal
        );
    }
    html.push_str("</table>");
}

fn push_totals(html: &mut String, totals: &BTreeMap<String, TypeTotals>) {
    let max = totals.values().map(TypeTotals::total).max().unwrap_or(Decimal::ZERO);

    html.push_str("<table><tr><th>account</th><th>deposit</th><th>withdrawal</th><th></th></tr>");
    for (account, t) in totals {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td><div class=\"bar\">\
             <div class=\"deposit\" style=\"width:{:.1}%\"></div>\
             <div class=\"withdrawal\" style=\"width:{:.1}%\"></div></div></td></tr>",
            escape(account),
            t.deposit,
            t.withdrawal,
            share(t.deposit, max),
            share(t.withdrawal, max)
        );
    }
    html.push_str("</table>");
}

fn push_series(html: &mut String, series: &[BalancePoint]) {
    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 200.0;

    let values: Vec<f64> = series.iter().map(|p| p.balance.to_f64().unwrap_or(0.0)).collect();
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let span = if max > min { max - min } else { 1.0 };
    let step = if values.len() > 1 { WIDTH / (values.len() - 1) as f64 } else { 0.0 };

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{:.1},{:.1}", i as f64 * step, HEIGHT - (v - min) / span * HEIGHT))
        .collect();

    let _ = write!(
        html,
        "<svg width=\"{}\" height=\"{}\" viewBox=\"-5 -5 {} {}\"><polyline fill=\"none\" stroke=\"steelblue\" \
         stroke-width=\"2\" points=\"{}\"/></svg>",
        WIDTH + 10.0,
        HEIGHT + 10.0,
        WIDTH + 10.0,
        HEIGHT + 10.0,
        points.join(" ")
    );

    html.push_str("<table><tr><th>row</th><th>balance</th></tr>");
    for point in series {
        let _ = write!(html, "<tr><td>{}</td><td>{}</td></tr>", point.index, point.balance);
    }
    html.push_str("</table>");
}

fn share(part: Decimal, max: Decimal) -> f64 {
    if max.is_zero() {
        return 0.0;
    }
    (part / max * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_share() {
        assert_eq!(share(Decimal::ONE, Decimal::ZERO), 0.0);
        assert_eq!(share(Decimal::new(25, 0), Decimal::new(100, 0)), 25.0);
    }

    #[test]
    fn test_empty_page_renders() {
        let table = TransactionTable::empty();
        let counts = BTreeMap::new();
        let totals = BTreeMap::new();
        let html = render_page(&PageModel {
            table: &table,
            range: None,
            filtered: &table,
            counts: &counts,
            totals: &totals,
            account: None,
            series: &[],
        });

        assert!(html.contains("No transactions."));
        assert!(html.contains("No account to show."));
    }
}
