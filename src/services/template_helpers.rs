//! Invoice helper functions available inside PDF templates.
//!
//! Registered on every `tera::Tera` instance used for rendering. All helpers
//! take named arguments and treat anything that is not a number (or a numeric
//! string) as 0, so a half-filled draft still renders.
//!
//! ```text
//! {% set sub = subtotal(items=items) %}
//! {{ currency(code=currency, amount=total(subtotal=sub, tax_percent=taxPercent,
//!                                          discount=discount, shipping=shipping)) }}
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use tera::{Tera, Value};

pub fn register(tera: &mut Tera) {
    tera.register_function("times", times);
    tera.register_function("subtotal", subtotal);
    tera.register_function("tax", tax);
    tera.register_function("total", total);
    tera.register_function("balance", balance);
    tera.register_function("currency", currency);
    tera.register_function("format_date", format_date);
}

/// Numeric view of a template value.
fn number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };

    if n.is_finite() { n } else { 0.0 }
}

fn arg(args: &HashMap<String, Value>, name: &str) -> f64 {
    number(args.get(name))
}

fn times(args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::from(arg(args, "a") * arg(args, "b")))
}

fn line_items_subtotal(items: Option<&Value>) -> f64 {
    let Some(Value::Array(items)) = items else {
        return 0.0;
    };

    items
        .iter()
        .map(|item| number(item.get("quantity")) * number(item.get("rate")))
        .sum()
}

fn subtotal(args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::from(line_items_subtotal(args.get("items"))))
}

fn tax(args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::from(arg(args, "subtotal") * arg(args, "percent") / 100.0))
}

fn total(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let subtotal = arg(args, "subtotal");
    let tax = subtotal * arg(args, "tax_percent") / 100.0;
    Ok(Value::from(
        subtotal + tax - arg(args, "discount") + arg(args, "shipping"),
    ))
}

fn balance(args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::from(arg(args, "total") - arg(args, "paid")))
}

fn currency(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let code = args.get("code").and_then(Value::as_str).unwrap_or_default();
    Ok(Value::from(format_money(code, arg(args, "amount"))))
}

fn format_date(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let iso = args.get("iso").and_then(Value::as_str).unwrap_or_default();
    Ok(Value::from(format_iso_date(iso)))
}

/// `$1,234.50`, or `CHF 1,234.50` for codes without a known symbol.
pub fn format_money(code: &str, amount: f64) -> String {
    let code = match code.trim() {
        "" => "USD".to_string(),
        code => code.to_ascii_uppercase(),
    };

    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    let digits = group_thousands(cents / 100);
    let fraction = cents % 100;

    match currency_symbol(&code) {
        Some(symbol) => format!("{sign}{symbol}{digits}.{fraction:02}"),
        None => format!("{sign}{code} {digits}.{fraction:02}"),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "INR" => Some("₹"),
        _ => None,
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// `2025-09-10` → `Sep 10, 2025`. Unparseable input is returned unchanged.
pub fn format_iso_date(iso: &str) -> String {
    let iso = iso.trim();
    if iso.is_empty() {
        return String::new();
    }

    let date = NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(iso).ok().map(|dt| dt.date_naive()));

    match date {
        Some(date) => date.format("%b %d, %Y").to_string(),
        None => iso.to_string(),
    }
}
