//! Amount arithmetic.
//!
//! Parses the amounts people write in recipes ("2", "1 1/2", "½", "2-3",
//! "6 to 8") into numbers and renders numbers back into the same style.

/// Unicode vulgar fractions and their ASCII spelling.
const UNICODE_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

/// Fractions we are willing to print, as (numerator, denominator).
/// Eighths plus thirds; anything else snaps to the nearest of these.
const DISPLAY_FRACTIONS: &[(u32, u32)] = &[
    (0, 1),
    (1, 8),
    (1, 4),
    (1, 3),
    (3, 8),
    (1, 2),
    (5, 8),
    (2, 3),
    (3, 4),
    (7, 8),
    (1, 1),
];

/// Below this, fractions stop being meaningful and we print decimals.
const SMALLEST_FRACTION: f64 = 1.0 / 16.0;

/// Largest amount we parse. Anything bigger is a typo or junk, and leaving
/// it unparsed keeps scaling from producing nonsense.
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// How to render an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountStyle {
    /// "1 1/2", "3/4" - US customary and count units.
    Fraction,
    /// "1.5", "250" - metric units.
    Decimal,
}

/// Separator used between the two ends of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSep {
    Hyphen,
    To,
    Or,
}

impl RangeSep {
    fn as_str(&self) -> &'static str {
        match self {
            RangeSep::Hyphen => "-",
            RangeSep::To => " to ",
            RangeSep::Or => " or ",
        }
    }
}

/// A parsed amount: one value or a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity {
    Single(f64),
    Range { low: f64, high: f64, sep: RangeSep },
}

impl Quantity {
    /// Parse an amount string. Returns None for anything we can't do
    /// arithmetic on ("a pinch", "some").
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = normalize_fractions(text);
        let text = normalized.trim().replace('–', "-").replace(" - ", "-");

        for (needle, sep) in [(" to ", RangeSep::To), (" or ", RangeSep::Or)] {
            if let Some((low, high)) = text.split_once(needle) {
                return Some(Quantity::Range {
                    low: parse_amount(low)?,
                    high: parse_amount(high)?,
                    sep,
                });
            }
        }

        if let Some(idx) = find_range_hyphen(&text) {
            return Some(Quantity::Range {
                low: parse_amount(&text[..idx])?,
                high: parse_amount(&text[idx + 1..])?,
                sep: RangeSep::Hyphen,
            });
        }

        parse_amount(&text).map(Quantity::Single)
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Quantity::Single(v) => Quantity::Single(f(v)),
            Quantity::Range { low, high, sep } => Quantity::Range {
                low: f(low),
                high: f(high),
                sep,
            },
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// The largest value; used to pick a readable unit.
    pub fn max(&self) -> f64 {
        match *self {
            Quantity::Single(v) => v,
            Quantity::Range { low, high, .. } => low.max(high),
        }
    }

    pub fn format(&self, style: AmountStyle) -> String {
        match *self {
            Quantity::Single(v) => format_amount(v, style),
            Quantity::Range { low, high, sep } => format!(
                "{}{}{}",
                format_amount(low, style),
                sep.as_str(),
                format_amount(high, style)
            ),
        }
    }
}

/// Replace unicode fractions with ASCII ones: "1½" -> "1 1/2", "¾" -> "3/4".
pub fn normalize_fractions(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match UNICODE_FRACTIONS.iter().find(|(u, _)| *u == c) {
            Some((_, ascii)) => {
                if out.ends_with(|p: char| p.is_ascii_digit()) {
                    out.push(' ');
                }
                out.push_str(ascii);
            }
            None => out.push(c),
        }
    }
    out
}

/// Parse an amount string into a decimal value.
///
/// Handles:
/// - Integers: "8" → 8.0
/// - Decimals: "2.5" → 2.5
/// - Fractions: "1/2" → 0.5
/// - Mixed numbers: "1 1/2" or "1-1/2" → 1.5
/// - Unicode fractions: "1½" → 1.5
pub fn parse_amount(amount: &str) -> Option<f64> {
    parse_unbounded(amount).filter(|value| *value <= MAX_AMOUNT)
}

fn parse_unbounded(amount: &str) -> Option<f64> {
    let normalized = normalize_fractions(amount);
    let amount = normalized.trim();

    if amount.is_empty() {
        return None;
    }

    // Hyphenated mixed number: "1-1/2"
    if let Some((whole, frac)) = amount.split_once('-') {
        if frac.contains('/') && whole.chars().all(|c| c.is_ascii_digit()) && !whole.is_empty()
        {
            let whole: f64 = whole.parse().ok()?;
            return Some(whole + parse_fraction(frac)?);
        }
        return None;
    }

    // Mixed number: "1 1/2" or "2 3/4"
    let parts: Vec<&str> = amount.split_whitespace().collect();
    if parts.len() == 2 {
        let whole: f64 = parts[0].parse().ok()?;
        let frac = parse_fraction(parts[1])?;
        return Some(whole + frac);
    }
    if parts.len() > 2 {
        return None;
    }

    if amount.contains('/') {
        return parse_fraction(amount);
    }

    let value: f64 = amount.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Parse a fraction string like "1/2" or "3/4".
fn parse_fraction(s: &str) -> Option<f64> {
    let (num, denom) = s.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let denom: f64 = denom.trim().parse().ok()?;
    if denom == 0.0 || num < 0.0 || denom < 0.0 {
        return None;
    }
    Some(num / denom)
}

/// Find the index of a range hyphen (not a mixed-number hyphen like in "1-1/2").
fn find_range_hyphen(s: &str) -> Option<usize> {
    for (i, c) in s.char_indices() {
        if c != '-' || i == 0 {
            continue;
        }
        let before_part = &s[..i];
        let after_part = &s[i + 1..];
        let before = before_part.chars().last()?;
        let after = after_part.chars().next()?;
        if !(before.is_ascii_digit() && after.is_ascii_digit()) {
            continue;
        }
        // "1-1/2" is a mixed number; "1/2-3/4" and "6-8" are ranges
        let is_mixed = after_part.contains('/')
            && !before_part.contains('/')
            && !before_part.contains(' ');
        if !is_mixed {
            return Some(i);
        }
    }
    None
}

/// Render a value in the given style.
pub fn format_amount(value: f64, style: AmountStyle) -> String {
    if !value.is_finite() || value <= 0.0 {
        return "0".to_string();
    }
    match style {
        AmountStyle::Decimal => format_decimal(value),
        AmountStyle::Fraction => format_fraction(value),
    }
}

fn format_decimal(value: f64) -> String {
    if value >= 10.0 {
        return format!("{:.0}", value.round());
    }
    let places = if value >= 1.0 { 1 } else { 2 };
    let scale = 10f64.powi(places);
    // Round half away from zero before formatting
    let rounded = (value * scale).round() / scale;
    let text = format!("{:.*}", places as usize, rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn format_fraction(value: f64) -> String {
    // Fractions read oddly on big numbers, and the whole part must fit a u64
    if value < SMALLEST_FRACTION || value >= MAX_AMOUNT {
        return format_decimal(value);
    }

    let mut whole = value.trunc() as u64;
    let frac = value - value.trunc();

    let (mut num, mut den) = (0, 1);
    let mut best = f64::MAX;
    for &(n, d) in DISPLAY_FRACTIONS {
        let distance = (frac - n as f64 / d as f64).abs();
        if distance < best {
            best = distance;
            num = n;
            den = d;
        }
    }

    if num == den {
        whole += 1;
        num = 0;
    }

    match (whole, num) {
        (0, 0) => format_decimal(value),
        (w, 0) => w.to_string(),
        (0, n) => format!("{}/{}", n, den),
        (w, n) => format!("{} {}/{}", w, n, den),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_integer() {
        assert_eq!(parse_amount("8"), Some(8.0));
        assert_eq!(parse_amount(" 12 "), Some(12.0));
    }

    #[test]
    fn test_parse_amount_decimal() {
        assert_eq!(parse_amount("2.5"), Some(2.5));
        assert_eq!(parse_amount("0.25"), Some(0.25));
    }

    #[test]
    fn test_parse_amount_fraction() {
        assert_eq!(parse_amount("1/2"), Some(0.5));
        assert_eq!(parse_amount("3/4"), Some(0.75));
    }

    #[test]
    fn test_parse_amount_mixed_number() {
        assert_eq!(parse_amount("1 1/2"), Some(1.5));
        assert_eq!(parse_amount("2 3/4"), Some(2.75));
        assert_eq!(parse_amount("1-1/2"), Some(1.5));
    }

    #[test]
    fn test_parse_amount_unicode() {
        assert_eq!(parse_amount("½"), Some(0.5));
        assert_eq!(parse_amount("1½"), Some(1.5));
        assert_eq!(parse_amount("2 ¼"), Some(2.25));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("a pinch"), None);
        assert_eq!(parse_amount("1/0"), None);
        assert_eq!(parse_amount("-3"), None);
    }

    #[test]
    fn test_parse_amount_rejects_absurd_values() {
        assert_eq!(parse_amount("1000000000"), Some(1e9));
        assert_eq!(parse_amount("10000000000000000000000"), None);
        assert!(Quantity::parse("10000000000000000000000").is_none());
    }

    #[test]
    fn test_format_large_values_without_saturating() {
        assert_eq!(format_amount(1e11, AmountStyle::Fraction), "100000000000");
        assert_eq!(format_amount(2.5e13, AmountStyle::Decimal), "25000000000000");
    }

    #[test]
    fn test_normalize_fractions() {
        assert_eq!(normalize_fractions("1½ cups"), "1 1/2 cups");
        assert_eq!(normalize_fractions("¾ cup"), "3/4 cup");
    }

    #[test]
    fn test_quantity_single() {
        assert_eq!(Quantity::parse("1 1/2"), Some(Quantity::Single(1.5)));
    }

    #[test]
    fn test_quantity_ranges() {
        assert_eq!(
            Quantity::parse("6-8"),
            Some(Quantity::Range {
                low: 6.0,
                high: 8.0,
                sep: RangeSep::Hyphen
            })
        );
        assert_eq!(
            Quantity::parse("2 to 3"),
            Some(Quantity::Range {
                low: 2.0,
                high: 3.0,
                sep: RangeSep::To
            })
        );
        assert_eq!(
            Quantity::parse("1/2-3/4"),
            Some(Quantity::Range {
                low: 0.5,
                high: 0.75,
                sep: RangeSep::Hyphen
            })
        );
        assert_eq!(
            Quantity::parse("1 – 2"),
            Some(Quantity::Range {
                low: 1.0,
                high: 2.0,
                sep: RangeSep::Hyphen
            })
        );
    }

    #[test]
    fn test_quantity_mixed_hyphen_is_not_range() {
        assert_eq!(Quantity::parse("1-1/2"), Some(Quantity::Single(1.5)));
    }

    #[test]
    fn test_format_fraction() {
        assert_eq!(format_amount(2.0, AmountStyle::Fraction), "2");
        assert_eq!(format_amount(1.5, AmountStyle::Fraction), "1 1/2");
        assert_eq!(format_amount(0.75, AmountStyle::Fraction), "3/4");
        assert_eq!(format_amount(1.0 / 3.0, AmountStyle::Fraction), "1/3");
        assert_eq!(format_amount(0.66, AmountStyle::Fraction), "2/3");
        assert_eq!(format_amount(2.97, AmountStyle::Fraction), "3");
    }

    #[test]
    fn test_format_fraction_tiny_falls_back_to_decimal() {
        assert_eq!(format_amount(0.03, AmountStyle::Fraction), "0.03");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_amount(250.4, AmountStyle::Decimal), "250");
        assert_eq!(format_amount(12.5, AmountStyle::Decimal), "13");
        assert_eq!(format_amount(1.25, AmountStyle::Decimal), "1.3");
        assert_eq!(format_amount(2.0, AmountStyle::Decimal), "2");
        assert_eq!(format_amount(0.125, AmountStyle::Decimal), "0.13");
    }

    #[test]
    fn test_format_range() {
        let q = Quantity::parse("2-3").unwrap().scale(1.5);
        assert_eq!(q.format(AmountStyle::Fraction), "3-4 1/2");
    }
}
