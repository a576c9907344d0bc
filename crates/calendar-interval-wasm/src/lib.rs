//! WASM bindings for calendar-interval.
//!
//! Exposes expression parsing, natural-language intervals and unit projection
//! to JavaScript via `wasm-bindgen`. Intervals cross the boundary as JSON
//! strings and instants as RFC 3339 strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p calendar-interval-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/calendar-interval-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/calendar_interval_wasm.wasm
//! ```

use calendar_interval::{DurationInterval, Precision, ResolveOptions, Span, SystemClock};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTO for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct IntervalDto {
    #[serde(default)]
    years: u32,
    #[serde(default)]
    months: u32,
    #[serde(default)]
    days: u32,
    #[serde(default)]
    hours: u32,
    #[serde(default)]
    minutes: u32,
    #[serde(default)]
    seconds: u32,
    #[serde(default)]
    microseconds: u32,
    #[serde(default)]
    inverted: bool,
    #[serde(default)]
    total_days: Option<u64>,
    /// Canonical expression; output only.
    #[serde(default, skip_deserializing)]
    expression: String,
}

impl From<&DurationInterval> for IntervalDto {
    fn from(i: &DurationInterval) -> Self {
        Self {
            years: i.years,
            months: i.months,
            days: i.days,
            hours: i.hours,
            minutes: i.minutes,
            seconds: i.seconds,
            microseconds: i.microseconds,
            inverted: i.inverted,
            total_days: i.total_days,
            expression: i.to_expression(),
        }
    }
}

impl From<IntervalDto> for DurationInterval {
    fn from(dto: IntervalDto) -> Self {
        DurationInterval {
            years: dto.years,
            months: dto.months,
            days: dto.days,
            hours: dto.hours,
            minutes: dto.minutes,
            seconds: dto.seconds,
            microseconds: dto.microseconds,
            inverted: dto.inverted,
            total_days: dto.total_days,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers: plain `Result<_, String>` so they can be tested off-wasm
// ---------------------------------------------------------------------------

fn interval_json(interval: &DurationInterval) -> Result<String, String> {
    serde_json::to_string(&IntervalDto::from(interval))
        .map_err(|e| format!("Serialization error: {}", e))
}

fn parse_expression_json(expression: &str) -> Result<String, String> {
    let interval = DurationInterval::from_expression(expression).map_err(|e| e.to_string())?;
    interval_json(&interval)
}

fn to_expression_str(interval_json: &str) -> Result<String, String> {
    let dto: IntervalDto = serde_json::from_str(interval_json)
        .map_err(|e| format!("Invalid interval JSON: {}", e))?;
    Ok(DurationInterval::from(dto).to_expression())
}

fn resolve_span(expression: &str, timezone: Option<&str>) -> Result<Span, String> {
    DurationInterval::from_expression(expression)
        .and_then(|interval| {
            interval.resolve_with(
                &SystemClock,
                timezone.unwrap_or("UTC"),
                &ResolveOptions::default(),
            )
        })
        .map_err(|e| e.to_string())
}

/// Project a resolved span onto a unit name.
fn project(span: &Span, unit: &str, precision: Precision) -> Result<f64, String> {
    Ok(match unit {
        "seconds" => span.in_seconds() as f64,
        "minutes" => span.in_minutes(precision),
        "hours" => span.in_hours(precision),
        "days" => span.in_days(precision),
        "weeks" => span.in_weeks(precision),
        "months" => span.in_average_months(precision),
        "months_from_now" => span.in_months_from_now() as f64,
        "years" => span.in_years(precision),
        other => return Err(format!("Unknown unit '{}'", other)),
    })
}

fn to_js(err: String) -> JsValue {
    JsValue::from_str(&err)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Parse a canonical duration expression (e.g., "P1Y2M3DT4H").
///
/// Returns a JSON object with the interval's components, `inverted`,
/// `total_days` and the canonical `expression`.
#[wasm_bindgen(js_name = "parseExpression")]
pub fn parse_expression(expression: &str) -> Result<String, JsValue> {
    parse_expression_json(expression).map_err(to_js)
}

/// Serialize an interval JSON object back to its canonical expression.
///
/// Missing component fields default to zero.
#[wasm_bindgen(js_name = "toExpression")]
pub fn to_expression(interval_json: &str) -> Result<String, JsValue> {
    to_expression_str(interval_json).map_err(to_js)
}

/// Build an interval from a phrase such as "3 days ago" or "next monday".
///
/// # Arguments
/// - `text` -- the phrase
/// - `timezone` -- IANA timezone for local dates (default "UTC")
#[wasm_bindgen(js_name = "fromNaturalLanguage")]
pub fn from_natural_language(text: &str, timezone: Option<String>) -> Result<String, JsValue> {
    let interval = DurationInterval::from_natural_language_with(
        text,
        timezone.as_deref().unwrap_or("UTC"),
        &ResolveOptions::default(),
        &SystemClock,
    )
    .map_err(|e| to_js(e.to_string()))?;
    interval_json(&interval).map_err(to_js)
}

/// Add an interval expression to a base instant and return RFC 3339.
///
/// # Arguments
/// - `expression` -- canonical duration expression
/// - `base` -- "now", an ISO 8601 datetime, or a phrase like "next monday"
/// - `timezone` -- IANA timezone (default "UTC")
#[wasm_bindgen(js_name = "projectFrom")]
pub fn project_from(
    expression: &str,
    base: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    DurationInterval::from_expression(expression)
        .and_then(|interval| interval.project_from(base, timezone.as_deref()))
        .map(|instant| instant.to_rfc3339())
        .map_err(|e| to_js(e.to_string()))
}

/// Express an interval, resolved from now, in one unit.
///
/// `unit` is one of `seconds`, `minutes`, `hours`, `days`, `weeks`,
/// `months` (average), `months_from_now` (calendar) or `years`. Values are
/// truncated toward zero unless `fractional` is true.
#[wasm_bindgen(js_name = "inUnit")]
pub fn in_unit(
    expression: &str,
    unit: &str,
    fractional: bool,
    timezone: Option<String>,
) -> Result<f64, JsValue> {
    let precision = if fractional {
        Precision::Fractional
    } else {
        Precision::Truncated
    };
    let span = resolve_span(expression, timezone.as_deref()).map_err(to_js)?;
    project(&span, unit, precision).map_err(to_js)
}
