//! Tooltip content templating
//!
//! Recognized placeholders:
//!
//! | Token       | Replaced with                                             |
//! |-------------|-----------------------------------------------------------|
//! | `%p` `%p.N` | series percentage, only with a precision (pie series)     |
//! | `%s`        | series label                                              |
//! | `%x` `%x.N` | x value: date, fixed-point, or tick formatter output      |
//! | `%y` `%y.N` | y value, resolved the same way as x                       |
//!
//! A token that cannot be resolved stays in the output as written.

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::rc::Rc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tooltip_shared::TooltipOptions;

use crate::host::ChartHost;
use crate::point::{AxisInfo, HitPoint};

/// Largest precision accepted by `%x.N`
pub const MAX_PRECISION: usize = 100;

/// Content callback: `(label, x, y, hit point, chart) -> template`
pub type ContentFn = Rc<dyn Fn(Option<&str>, f64, f64, &HitPoint, &dyn ChartHost) -> String>;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%s|%([pxy])(?:\.(\d+))?").expect("token pattern is valid"));

/// Content source for a tooltip, resolved at render time
#[derive(Clone)]
pub enum ContentTemplate {
    Text(String),
    Function(ContentFn),
}

impl ContentTemplate {
    pub fn function(
        f: impl Fn(Option<&str>, f64, f64, &HitPoint, &dyn ChartHost) -> String + 'static,
    ) -> Self {
        ContentTemplate::Function(Rc::new(f))
    }
}

impl From<&str> for ContentTemplate {
    fn from(template: &str) -> Self {
        ContentTemplate::Text(template.to_string())
    }
}

impl From<String> for ContentTemplate {
    fn from(template: String) -> Self {
        ContentTemplate::Text(template)
    }
}

impl fmt::Debug for ContentTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentTemplate::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ContentTemplate::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Render tooltip text for a hit point
pub fn format_content(
    template: &ContentTemplate,
    hit: &HitPoint,
    options: &TooltipOptions,
    host: &dyn ChartHost,
) -> String {
    let working: Cow<'_, str> = match template {
        ContentTemplate::Text(text) => Cow::Borrowed(text.as_str()),
        ContentTemplate::Function(f) => Cow::Owned(f(
            hit.series.label.as_deref(),
            hit.x(),
            hit.y(),
            hit,
            host,
        )),
    };

    substitute(&working, hit, options)
}

/// Replace every placeholder in one pass; inserted text is never re-scanned
pub fn substitute(template: &str, hit: &HitPoint, options: &TooltipOptions) -> String {
    TOKEN_PATTERN
        .replace_all(template, |caps: &Captures<'_>| {
            resolve_token(caps, hit, options).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn resolve_token(caps: &Captures<'_>, hit: &HitPoint, options: &TooltipOptions) -> Option<String> {
    let precision = caps.get(2).and_then(|digits| parse_precision(digits.as_str()));

    match caps.get(1).map(|m| m.as_str()) {
        // %s
        None => hit.series.label.clone(),
        Some("p") => {
            let percent = hit.series.percent?;
            precision.map(|digits| to_fixed(percent, digits))
        }
        Some("x") => resolve_axis_value(
            hit.x(),
            &hit.series.x_axis,
            options.x_date_format.as_deref(),
            precision,
        ),
        Some("y") => resolve_axis_value(
            hit.y(),
            &hit.series.y_axis,
            options.y_date_format.as_deref(),
            precision,
        ),
        Some(_) => None,
    }
}

fn resolve_axis_value(
    value: f64,
    axis: &AxisInfo,
    date_format: Option<&str>,
    precision: Option<usize>,
) -> Option<String> {
    if axis.is_time_mode() {
        if let Some(rendered) = date_format.and_then(|format| format_timestamp(value, format)) {
            return Some(rendered);
        }
    }

    if let Some(digits) = precision {
        return Some(to_fixed(value, digits));
    }

    axis.tick_formatter
        .as_ref()
        .map(|formatter| formatter(value, axis))
}

fn parse_precision(digits: &str) -> Option<usize> {
    digits
        .parse::<usize>()
        .ok()
        .filter(|precision| *precision <= MAX_PRECISION)
}

/// Fixed-point rendering with `digits` decimals. Values exactly halfway
/// between two results round away from zero, so `2.5` renders as `3`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    // Negative zero prints without a sign
    let value = if value == 0.0 { 0.0 } else { value };

    if is_exact_tie(value, digits) {
        // The next float away from zero is past the midpoint
        let nudged = f64::from_bits(value.to_bits() + 1);
        return format!("{nudged:.digits$}");
    }

    format!("{value:.digits$}")
}

/// Whether the exact decimal expansion of `value` ends in a 5 at position
/// `digits + 1`. A float `m * 2^-k` with odd `m` has exactly `k` fractional
/// decimal digits, the last of which is 5.
fn is_exact_tie(value: f64, digits: usize) -> bool {
    if !value.is_finite() || value == 0.0 {
        return false;
    }

    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };

    let exponent = exponent + i64::from(mantissa.trailing_zeros());
    exponent < 0 && exponent.unsigned_abs() as usize == digits + 1
}

/// Whether a strftime-style date format can be rendered
pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Render epoch milliseconds with a strftime-style format.
///
/// Dates are rendered in UTC rather than the viewer's local time zone, so
/// the same point shows the same text on every machine.
pub fn format_timestamp(millis: f64, format: &str) -> Option<String> {
    if !millis.is_finite() {
        return None;
    }

    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        log::debug!("Ignoring invalid date format: {format}");
        return None;
    }

    let timestamp = DateTime::<Utc>::from_timestamp_millis(millis.trunc() as i64)?;
    let mut rendered = String::new();
    write!(rendered, "{}", timestamp.format_with_items(items.iter())).ok()?;
    Some(rendered)
}
