//! d3-array compatible tick generation (`ticks`, `tickIncrement`, `tickStep`).
//!
//! Increments are encoded the same way d3 does it: a negative increment `-n` means the
//! ticks are spaced `1 / n` apart. This keeps fractional ticks exact (`0.1` is produced as
//! `1 / 10`, not `1 * 0.1`).

/// Returns `(i1, i2, inc)` so that tick `i` (for `i1 <= i <= i2`) is `i * inc`, or `i / -inc`
/// when `inc` is negative.
pub fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    if !(count > 0.0) {
        return None;
    }

    let step = (stop - start) / count.max(0.0);
    if !step.is_finite() || step <= 0.0 {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    let (i1, i2, inc) = if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        let mut i1 = (start * inc).round() as i64;
        let mut i2 = (stop * inc).round() as i64;
        if (i1 as f64) / inc < start {
            i1 += 1;
        }
        if (i2 as f64) / inc > stop {
            i2 -= 1;
        }
        (i1, i2, -inc)
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (start / inc).round() as i64;
        let mut i2 = (stop / inc).round() as i64;
        if (i1 as f64) * inc < start {
            i1 += 1;
        }
        if (i2 as f64) * inc > stop {
            i2 -= 1;
        }
        (i1, i2, inc)
    };

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    if !inc.is_finite() || inc == 0.0 {
        return None;
    }
    Some((i1, i2, inc))
}

/// Evenly spaced, human-friendly values covering `[start, stop]`. Reversed inputs produce
/// reversed output.
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || !(count > 0.0) {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (a, b) = if reverse { (stop, start) } else { (start, stop) };
    let Some((i1, i2, inc)) = tick_spec(a, b, count) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }

    let value = |i: i64| {
        if inc < 0.0 {
            i as f64 / -inc
        } else {
            i as f64 * inc
        }
    };
    let n = (i2 - i1 + 1) as usize;
    let mut out = Vec::with_capacity(n);
    if reverse {
        for i in 0..n as i64 {
            out.push(value(i2 - i));
        }
    } else {
        for i in 0..n as i64 {
            out.push(value(i1 + i));
        }
    }
    out
}

/// The raw (possibly negative-encoded) increment. `None` when no finite step exists, for
/// example when `start == stop`.
pub fn tick_increment(start: f64, stop: f64, count: f64) -> Option<f64> {
    tick_spec(start, stop, count).map(|(_, _, inc)| inc)
}

/// The signed tick step as a plain number (`0.1`, `5`, `-20`, ...).
pub fn tick_step(start: f64, stop: f64, count: f64) -> f64 {
    let reverse = stop < start;
    let inc = if reverse {
        tick_increment(stop, start, count)
    } else {
        tick_increment(start, stop, count)
    };
    let Some(inc) = inc else {
        return 0.0;
    };
    let magnitude = if inc < 0.0 { 1.0 / -inc } else { inc };
    if reverse { -magnitude } else { magnitude }
}
