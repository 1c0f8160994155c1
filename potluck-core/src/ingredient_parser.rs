//! Ingredient parsing module.
//!
//! Parses raw ingredient lines (e.g., "2 cups flour, sifted") into structured data.

use std::sync::LazyLock;

use regex::Regex;

use crate::quantity::normalize_fractions;
use crate::types::Ingredient;

/// A leading amount: fraction, decimal, or mixed number, optionally followed
/// by a second amount forming a range ("2-3", "2 to 3", "2 or 3").
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let number = r"\d+/\d+|\d+(?:\.\d+)?(?:[ -]\d+/\d+)?";
    Regex::new(&format!(
        r"^(?P<low>{n})(?:\s*(?P<sep>-|–|to|or)\s*(?P<high>{n}))?",
        n = number
    ))
    .expect("amount pattern is valid")
});

/// Common cooking units (lowercase for matching).
/// Sorted by length at runtime (longest first) to avoid partial matches
/// (e.g., "tablespoons" must match before "tb").
static UNITS_SORTED: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut units = UNITS_RAW.to_vec();
    units.sort_by(|a, b| b.len().cmp(&a.len()));
    units
});

const UNITS_RAW: &[&str] = &[
    // Volume - US
    "fluid ounces",
    "fluid ounce",
    "tablespoons",
    "tablespoon",
    "teaspoons",
    "teaspoon",
    "gallons",
    "gallon",
    "quarts",
    "quart",
    "pints",
    "pint",
    "cups",
    "cup",
    "tbsp",
    "tbs",
    "tsp",
    "fl oz",
    "fl. oz",
    "gal",
    "qt",
    "pt",
    "c",
    // Volume - Metric
    "milliliters",
    "milliliter",
    "millilitres",
    "millilitre",
    "liters",
    "liter",
    "litres",
    "litre",
    "ml",
    "l",
    // Weight - US
    "ounces",
    "ounce",
    "pounds",
    "pound",
    "lbs",
    "lb",
    "oz",
    // Weight - Metric
    "kilograms",
    "kilogram",
    "milligrams",
    "milligram",
    "grams",
    "gram",
    "kg",
    "mg",
    "g",
    // Count/Size
    "packages",
    "package",
    "handfuls",
    "handful",
    "bottles",
    "bunches",
    "pinches",
    "slices",
    "sprigs",
    "stalks",
    "pieces",
    "bottle",
    "cloves",
    "dashes",
    "heads",
    "sticks",
    "bunch",
    "clove",
    "piece",
    "pinch",
    "slice",
    "sprig",
    "stalk",
    "cans",
    "jars",
    "dash",
    "head",
    "stick",
    "can",
    "jar",
    "pkg",
    // Size descriptors that act like units
    "extra-large",
    "medium",
    "small",
    "large",
];

/// Common preparation notes
const PREP_NOTES: &[&str] = &[
    "at room temperature",
    "room temperature",
    "lightly beaten",
    "roughly chopped",
    "coarsely chopped",
    "finely chopped",
    "thinly sliced",
    "plus more for",
    "for garnish",
    "for serving",
    "quartered",
    "shredded",
    "crumbled",
    "softened",
    "optional",
    "to taste",
    "as needed",
    "chopped",
    "crushed",
    "divided",
    "drained",
    "toasted",
    "trimmed",
    "minced",
    "sliced",
    "grated",
    "melted",
    "cooked",
    "beaten",
    "thawed",
    "peeled",
    "rinsed",
    "packed",
    "sifted",
    "halved",
    "diced",
    "cubed",
];

const BULLETS: &[&str] = &["• ", "* ", "- ", "– "];

/// Parse a single ingredient line into structured data.
///
/// This does best-effort parsing - if we can't parse something meaningful,
/// we return the raw text as the item with no amount.
pub fn parse_ingredient(raw: &str) -> Ingredient {
    let mut line = raw.trim();
    for bullet in BULLETS {
        if let Some(rest) = line.strip_prefix(bullet) {
            line = rest.trim_start();
            break;
        }
    }
    if line.is_empty() {
        return Ingredient::default();
    }

    let mut remaining = normalize_fractions(line);

    // Parenthetical alternative measurements are dropped:
    // "1 stick (113g) butter" -> "1 stick butter"
    while let Some(start) = remaining.find('(') {
        let Some(len) = remaining[start..].find(')') else {
            break;
        };
        let inner = &remaining[start + 1..start + len];
        let (amount, after) = extract_amount(inner);
        if amount.is_none() || after.split_whitespace().count() > 1 {
            break;
        }
        let before = remaining[..start].trim_end();
        let after = remaining[start + len + 1..].trim_start();
        remaining = match (before.is_empty(), after.is_empty()) {
            (true, _) => after.to_string(),
            (_, true) => before.to_string(),
            _ => format!("{} {}", before, after),
        };
    }

    let (amount, after_amount) = extract_amount(&remaining);
    remaining = after_amount;

    let mut unit = None;
    if amount.is_some() {
        let (u, after_unit) = extract_unit(&remaining);
        unit = u;
        remaining = after_unit;
        if let Some(rest) = remaining.strip_prefix("of ") {
            remaining = rest.to_string();
        }
    }

    let mut note = None;
    if let Some(comma_idx) = remaining.rfind(',') {
        let potential_note = remaining[comma_idx + 1..].trim();
        if is_prep_note(potential_note) {
            note = Some(potential_note.to_string());
            remaining = remaining[..comma_idx].trim().to_string();
        }
    }

    let item = remaining.trim().to_string();
    if item.is_empty() && amount.is_none() {
        return Ingredient::new(line);
    }

    Ingredient {
        item,
        amount,
        unit,
        note,
    }
}

/// Extract an amount from the beginning of a string.
/// Returns (amount, remaining_string). Ranges are rewritten in a
/// canonical form ("2 - 3" -> "2-3").
fn extract_amount(s: &str) -> (Option<String>, String) {
    let s = s.trim();
    let Some(caps) = AMOUNT_RE.captures(s) else {
        return (None, s.to_string());
    };
    let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
    let rest = &s[whole..];

    // "2x" or "3rd" is not an amount
    if rest.starts_with(|c: char| c.is_alphanumeric()) && !starts_with_unit(rest) {
        return (None, s.to_string());
    }

    let low = &caps["low"];
    let amount = match (caps.name("sep"), caps.name("high")) {
        (Some(sep), Some(high)) => {
            let sep = match sep.as_str() {
                "to" => " to ",
                "or" => " or ",
                _ => "-",
            };
            format!("{}{}{}", low, sep, high.as_str())
        }
        _ => low.to_string(),
    };

    (Some(amount), rest.trim().to_string())
}

fn starts_with_unit(s: &str) -> bool {
    extract_unit(s).0.is_some()
}

/// Extract a unit from the beginning of a string.
/// Returns (unit, remaining_string).
fn extract_unit(s: &str) -> (Option<String>, String) {
    let s = s.trim();

    // Case matters for the one-letter spoon abbreviations
    for short in ["T", "t"] {
        if let Some(after) = s.strip_prefix(short) {
            if after.starts_with(' ') || after.starts_with('.') {
                let remaining = after.trim_start_matches('.').trim();
                return (Some(short.to_string()), remaining.to_string());
            }
        }
    }

    let s_lower = s.to_lowercase();
    for &unit in UNITS_SORTED.iter() {
        if !s_lower.starts_with(unit) {
            continue;
        }
        // Lowercasing can change byte lengths outside ASCII
        let (Some(written), Some(after)) = (s.get(..unit.len()), s.get(unit.len()..)) else {
            continue;
        };
        // Make sure it's a word boundary
        if after.is_empty()
            || after.starts_with(|c: char| c.is_whitespace() || c == '.' || c == ',')
        {
            let remaining = after.trim_start_matches('.').trim();
            return (Some(written.to_string()), remaining.to_string());
        }
    }

    (None, s.to_string())
}

/// Check if a string looks like a preparation note.
fn is_prep_note(s: &str) -> bool {
    let s_lower = s.to_lowercase();
    PREP_NOTES.iter().any(|note| s_lower.contains(note))
}

/// Parse multiple ingredient lines (separated by newlines).
pub fn parse_ingredients(blob: &str) -> Vec<Ingredient> {
    blob.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_ingredient)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_ingredient() {
        let result = parse_ingredient("2 cups flour");
        assert_eq!(result.item, "flour");
        assert_eq!(result.amount, Some("2".to_string()));
        assert_eq!(result.unit, Some("cups".to_string()));
    }

    #[test]
    fn test_ingredient_with_note() {
        let result = parse_ingredient("1 cup butter, softened");
        assert_eq!(result.item, "butter");
        assert_eq!(result.amount, Some("1".to_string()));
        assert_eq!(result.unit, Some("cup".to_string()));
        assert_eq!(result.note, Some("softened".to_string()));
    }

    #[test]
    fn test_ingredient_with_mixed_number() {
        let result = parse_ingredient("1 1/2 cups water");
        assert_eq!(result.item, "water");
        assert_eq!(result.amount, Some("1 1/2".to_string()));
    }

    #[test]
    fn test_unicode_fraction() {
        let result = parse_ingredient("1½ cups milk");
        assert_eq!(result.amount, Some("1 1/2".to_string()));
        assert_eq!(result.unit, Some("cups".to_string()));
        assert_eq!(result.item, "milk");
    }

    #[test]
    fn test_range() {
        let result = parse_ingredient("2 - 3 cloves garlic, minced");
        assert_eq!(result.amount, Some("2-3".to_string()));
        assert_eq!(result.unit, Some("cloves".to_string()));
        assert_eq!(result.item, "garlic");
        assert_eq!(result.note, Some("minced".to_string()));

        let result = parse_ingredient("2 to 3 tbsp olive oil");
        assert_eq!(result.amount, Some("2 to 3".to_string()));
        assert_eq!(result.unit, Some("tbsp".to_string()));
    }

    #[test]
    fn test_parenthetical_measurement_dropped() {
        let result = parse_ingredient("1 stick (113g) butter");
        assert_eq!(result.item, "butter");
        assert_eq!(result.amount, Some("1".to_string()));
        assert_eq!(result.unit, Some("stick".to_string()));
    }

    #[test]
    fn test_parenthetical_text_kept() {
        let result = parse_ingredient("1 can tomatoes (San Marzano if possible)");
        assert_eq!(result.item, "tomatoes (San Marzano if possible)");
    }

    #[test]
    fn test_no_amount() {
        let result = parse_ingredient("Salt to taste");
        assert_eq!(result.item, "Salt to taste");
        assert_eq!(result.amount, None);
        assert_eq!(result.unit, None);
    }

    #[test]
    fn test_no_unit() {
        let result = parse_ingredient("3 eggs");
        assert_eq!(result.item, "eggs");
        assert_eq!(result.amount, Some("3".to_string()));
        assert_eq!(result.unit, None);
    }

    #[test]
    fn test_attached_metric_unit() {
        let result = parse_ingredient("400g spaghetti");
        assert_eq!(result.amount, Some("400".to_string()));
        assert_eq!(result.unit, Some("g".to_string()));
        assert_eq!(result.item, "spaghetti");
    }

    #[test]
    fn test_capital_t_tablespoon() {
        let result = parse_ingredient("2 T sugar");
        assert_eq!(result.unit, Some("T".to_string()));
        assert_eq!(result.item, "sugar");
    }

    #[test]
    fn test_of_is_skipped() {
        let result = parse_ingredient("2 cups of chicken stock");
        assert_eq!(result.item, "chicken stock");
    }

    #[test]
    fn test_bullet_stripped() {
        let result = parse_ingredient("- 1 tsp vanilla extract");
        assert_eq!(result.amount, Some("1".to_string()));
        assert_eq!(result.unit, Some("tsp".to_string()));
        assert_eq!(result.item, "vanilla extract");
    }

    #[test]
    fn test_word_starting_like_unit() {
        let result = parse_ingredient("2 carrots");
        assert_eq!(result.unit, None);
        assert_eq!(result.item, "carrots");

        let result = parse_ingredient("2 tomatoes");
        assert_eq!(result.amount, Some("2".to_string()));
        assert_eq!(result.item, "tomatoes");
    }

    #[test]
    fn test_empty_ingredient() {
        let result = parse_ingredient("   ");
        assert_eq!(result.item, "");
        assert_eq!(result.amount, None);
    }

    #[test]
    fn test_parse_multiple_ingredients() {
        let blob = "2 cups flour\n\n1 cup sugar\n3 eggs";
        let results = parse_ingredients(blob);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].item, "flour");
        assert_eq!(results[1].item, "sugar");
        assert_eq!(results[2].item, "eggs");
    }
}
