//! Sexagesimal coordinate parsing.
//!
//! Right ascension is published in hour angle (`"HH MM SS.ss"`), declination
//! in degrees (`"+DD MM SS.s"`). Components may be separated by whitespace or
//! colons; trailing components may be omitted.

use anyhow::{bail, Context, Result};

use crate::models::CoordinateValue;

const DEGREES_PER_HOUR: f64 = 15.0;

/// Sign and unsigned (major, minutes, seconds) components of a sexagesimal string.
struct Sexagesimal {
    negative: bool,
    major: f64,
    minutes: f64,
    seconds: f64,
}

impl Sexagesimal {
    fn magnitude(&self) -> f64 {
        self.major + self.minutes / 60.0 + self.seconds / 3600.0
    }

    fn signed(&self) -> f64 {
        if self.negative {
            -self.magnitude()
        } else {
            self.magnitude()
        }
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || c == ':')
        .filter(|t| !t.is_empty())
}

fn split_sexagesimal(text: &str) -> Result<Sexagesimal> {
    let parts: Vec<&str> = tokens(text).collect();
    if parts.is_empty() || parts.len() > 3 {
        bail!(
            "expected 1 to 3 sexagesimal components in '{}', found {}",
            text,
            parts.len()
        );
    }

    // The sign belongs to the whole value, so "-00 30 00" is negative.
    let first = parts[0];
    let negative = first.starts_with('-');
    let unsigned_first = first.trim_start_matches(['+', '-']);

    let major: f64 = unsigned_first
        .parse()
        .with_context(|| format!("invalid leading component '{}' in '{}'", first, text))?;
    let minutes: f64 = match parts.get(1) {
        Some(m) => m
            .parse()
            .with_context(|| format!("invalid minutes '{}' in '{}'", m, text))?,
        None => 0.0,
    };
    let seconds: f64 = match parts.get(2) {
        Some(s) => s
            .parse()
            .with_context(|| format!("invalid seconds '{}' in '{}'", s, text))?,
        None => 0.0,
    };

    if !major.is_finite() || !minutes.is_finite() || !seconds.is_finite() {
        bail!("non-finite component in '{}'", text);
    }
    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        bail!("minutes and seconds must be within [0, 60) in '{}'", text);
    }

    Ok(Sexagesimal {
        negative,
        major,
        minutes,
        seconds,
    })
}

/// Parse a right ascension in hour angle into decimal degrees.
pub fn parse_ra(text: &str) -> Result<qtty::Degrees> {
    let parsed = split_sexagesimal(text).context("Failed to parse right ascension")?;
    if parsed.negative {
        bail!("Right ascension cannot be negative: '{}'", text);
    }
    let hours = parsed.magnitude();
    if hours >= 24.0 {
        bail!("Right ascension must be below 24h: '{}'", text);
    }
    Ok(qtty::Degrees::new(hours * DEGREES_PER_HOUR))
}

/// Parse a declination in degrees into decimal degrees.
pub fn parse_dec(text: &str) -> Result<qtty::Degrees> {
    let parsed = split_sexagesimal(text).context("Failed to parse declination")?;
    let degrees = parsed.signed();
    if degrees.abs() > 90.0 {
        bail!("Declination must be within [-90, 90]: '{}'", text);
    }
    Ok(qtty::Degrees::new(degrees))
}

/// Leading signed integer degrees of a declination, used for the coarse
/// declination ceiling. `"-05 12 33"` gives -5, `"-00 30 00"` gives 0 and
/// decimal text such as `"-12.5"` gives -12.
pub fn leading_degrees(dec: &CoordinateValue) -> Option<i32> {
    let degrees = match dec {
        CoordinateValue::Degrees(deg) => *deg,
        CoordinateValue::Sexagesimal(text) => tokens(text).next()?.parse::<f64>().ok()?,
    };
    degrees.is_finite().then(|| degrees.trunc() as i32)
}
