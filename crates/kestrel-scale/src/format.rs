//! Tick label formatting compatible with d3's default `tickFormat` output.

use chrono::{DateTime, Utc};

use crate::time::{MS_PER_SECOND, TimeUnit};

/// Decimal places needed to tell apart values `step` apart (d3-format `precisionFixed`).
pub fn precision_fixed(step: f64) -> usize {
    let step = step.abs();
    if !step.is_finite() || step == 0.0 {
        return 0;
    }
    // Read the exponent from scientific notation; `log10` is off by one for values like 0.1.
    let exponent: i32 = format!("{step:e}")
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);
    (-exponent).max(0) as usize
}

/// Formats `value` as `",.{p}f"` where `p` is derived from the tick step.
pub fn format_number(value: f64, step: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let precision = precision_fixed(step);
    let mut fixed = format!("{value:.precision$}");
    // "-0.0" reads as noise on an axis.
    if fixed.starts_with('-') && fixed[1..].chars().all(|c| c == '0' || c == '.') {
        fixed.remove(0);
    }
    group_thousands(&fixed)
}

fn group_thousands(fixed: &str) -> String {
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::with_capacity(sign.len() + grouped.len() + 8);
    out.push_str(sign);
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// d3 multi-scale time format: the format of the coarsest unit boundary `ms` sits on.
pub fn format_time(ms: i64) -> String {
    let Some(dt) = DateTime::<Utc>::from_timestamp_millis(ms) else {
        return ms.to_string();
    };
    let pattern = if TimeUnit::Second.floor(ms) < ms {
        ".%3f"
    } else if TimeUnit::Minute.floor(ms) < ms {
        ":%S"
    } else if TimeUnit::Hour.floor(ms) < ms {
        "%I:%M"
    } else if TimeUnit::Day.floor(ms) < ms {
        "%I %p"
    } else if TimeUnit::Month.floor(ms) < ms {
        if TimeUnit::Week.floor(ms) < ms {
            "%a %d"
        } else {
            "%b %d"
        }
    } else if TimeUnit::Year.floor(ms) < ms {
        "%B"
    } else {
        "%Y"
    };
    format_datetime(&dt, pattern)
}

fn format_datetime(dt: &DateTime<Utc>, pattern: &str) -> String {
    if pattern == ".%3f" {
        let millis = dt.timestamp_millis().rem_euclid(MS_PER_SECOND);
        return format!(".{millis:03}");
    }
    dt.format(pattern).to_string()
}
