//! Unit tables for converting between US customary and metric measures.
//!
//! Volumes are based in millilitres and weights in grams. Densities for
//! common solids are stored as grams per US cup (236.588 ml).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

pub const ML_PER_TSP: f64 = 4.92892;
pub const ML_PER_TBSP: f64 = 14.7868;
pub const ML_PER_FL_OZ: f64 = 29.5735;
pub const ML_PER_CUP: f64 = 236.588;
pub const ML_PER_PINT: f64 = 473.176;
pub const ML_PER_QUART: f64 = 946.353;
pub const ML_PER_GALLON: f64 = 3785.41;
pub const GRAMS_PER_OZ: f64 = 28.3495;
pub const GRAMS_PER_LB: f64 = 453.592;

/// Measurement system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum System {
    Us,
    Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Volume,
    Weight,
    /// Cloves, cans, pinches and anything else `Unit::parse` does not know.
    /// Kept as written and never converted.
    Count,
}

/// Kind of a unit as written in a recipe.
pub fn unit_kind(text: &str) -> UnitKind {
    Unit::parse(text).map_or(UnitKind::Count, |unit| unit.kind())
}

/// A convertible unit. Count units have no variant here; see
/// [`UnitKind::Count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Teaspoon,
    Tablespoon,
    FluidOunce,
    Cup,
    Pint,
    Quart,
    Gallon,
    Milliliter,
    Liter,
    Milligram,
    Gram,
    Kilogram,
    Ounce,
    Pound,
}

impl Unit {
    /// Recognise a unit as written in a recipe.
    ///
    /// Capital "T" is a tablespoon and lowercase "t" a teaspoon, so those
    /// two are matched before case folding.
    pub fn parse(text: &str) -> Option<Unit> {
        let text = text.trim();
        match text {
            "T" | "Tb" | "TB" => return Some(Unit::Tablespoon),
            "t" => return Some(Unit::Teaspoon),
            _ => {}
        }

        let lower = text.to_lowercase();
        let lower = lower.trim_end_matches('.');
        let unit = match lower {
            "tsp" | "tsps" | "ts" | "teaspoon" | "teaspoons" => Unit::Teaspoon,
            "tbsp" | "tbsps" | "tbs" | "tbl" | "tb" | "tablespoon" | "tablespoons" => {
                Unit::Tablespoon
            }
            "fl oz" | "fl. oz" | "floz" | "fluid ounce" | "fluid ounces" => Unit::FluidOunce,
            "c" | "cup" | "cups" => Unit::Cup,
            "pt" | "pint" | "pints" => Unit::Pint,
            "qt" | "quart" | "quarts" => Unit::Quart,
            "gal" | "gallon" | "gallons" => Unit::Gallon,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Unit::Milliliter
            }
            "l" | "liter" | "liters" | "litre" | "litres" => Unit::Liter,
            "mg" | "milligram" | "milligrams" => Unit::Milligram,
            "g" | "gr" | "gram" | "grams" | "gramme" | "grammes" => Unit::Gram,
            "kg" | "kilo" | "kilos" | "kilogram" | "kilograms" => Unit::Kilogram,
            "oz" | "ounce" | "ounces" => Unit::Ounce,
            "lb" | "lbs" | "pound" | "pounds" => Unit::Pound,
            _ => return None,
        };
        Some(unit)
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Teaspoon
            | Unit::Tablespoon
            | Unit::FluidOunce
            | Unit::Cup
            | Unit::Pint
            | Unit::Quart
            | Unit::Gallon
            | Unit::Milliliter
            | Unit::Liter => UnitKind::Volume,
            Unit::Milligram | Unit::Gram | Unit::Kilogram | Unit::Ounce | Unit::Pound => {
                UnitKind::Weight
            }
        }
    }

    pub fn system(&self) -> System {
        match self {
            Unit::Milliliter | Unit::Liter | Unit::Milligram | Unit::Gram | Unit::Kilogram => {
                System::Metric
            }
            _ => System::Us,
        }
    }

    /// Millilitres (volume) or grams (weight) per one of this unit.
    pub fn to_base(&self) -> f64 {
        match self {
            Unit::Teaspoon => ML_PER_TSP,
            Unit::Tablespoon => ML_PER_TBSP,
            Unit::FluidOunce => ML_PER_FL_OZ,
            Unit::Cup => ML_PER_CUP,
            Unit::Pint => ML_PER_PINT,
            Unit::Quart => ML_PER_QUART,
            Unit::Gallon => ML_PER_GALLON,
            Unit::Milliliter => 1.0,
            Unit::Liter => 1000.0,
            Unit::Milligram => 0.001,
            Unit::Gram => 1.0,
            Unit::Kilogram => 1000.0,
            Unit::Ounce => GRAMS_PER_OZ,
            Unit::Pound => GRAMS_PER_LB,
        }
    }

    /// Display label. Spelled-out units take a plural form.
    pub fn label(&self, plural: bool) -> &'static str {
        match (self, plural) {
            (Unit::Teaspoon, _) => "tsp",
            (Unit::Tablespoon, _) => "tbsp",
            (Unit::FluidOunce, _) => "fl oz",
            (Unit::Cup, false) => "cup",
            (Unit::Cup, true) => "cups",
            (Unit::Pint, false) => "pint",
            (Unit::Pint, true) => "pints",
            (Unit::Quart, false) => "quart",
            (Unit::Quart, true) => "quarts",
            (Unit::Gallon, false) => "gallon",
            (Unit::Gallon, true) => "gallons",
            (Unit::Milliliter, _) => "ml",
            (Unit::Liter, _) => "l",
            (Unit::Milligram, _) => "mg",
            (Unit::Gram, _) => "g",
            (Unit::Kilogram, _) => "kg",
            (Unit::Ounce, _) => "oz",
            (Unit::Pound, _) => "lb",
        }
    }
}

/// Readable US volume unit for an amount in millilitres.
pub fn best_us_volume(ml: f64) -> Unit {
    if ml < ML_PER_TBSP {
        Unit::Teaspoon
    } else if ml < ML_PER_CUP / 4.0 {
        Unit::Tablespoon
    } else if ml < ML_PER_QUART {
        Unit::Cup
    } else if ml < ML_PER_GALLON {
        Unit::Quart
    } else {
        Unit::Gallon
    }
}

/// Readable US weight unit for an amount in grams.
pub fn best_us_weight(grams: f64) -> Unit {
    if grams < GRAMS_PER_LB {
        Unit::Ounce
    } else {
        Unit::Pound
    }
}

pub fn best_metric_volume(ml: f64) -> Unit {
    if ml < 1000.0 {
        Unit::Milliliter
    } else {
        Unit::Liter
    }
}

pub fn best_metric_weight(grams: f64) -> Unit {
    if grams < 1000.0 {
        Unit::Gram
    } else {
        Unit::Kilogram
    }
}

/// Ingredient density data: canonical name -> grams per cup.
/// Curated from King Arthur Baking and USDA values.
static DENSITY_DATA: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Flours and starches
    m.insert("all-purpose flour", 125.0);
    m.insert("bread flour", 127.0);
    m.insert("cake flour", 114.0);
    m.insert("whole wheat flour", 120.0);
    m.insert("almond flour", 96.0);
    m.insert("coconut flour", 112.0);
    m.insert("cornstarch", 128.0);
    m.insert("cornmeal", 138.0);

    // Sugars
    m.insert("granulated sugar", 200.0);
    m.insert("brown sugar", 220.0);
    m.insert("powdered sugar", 120.0);

    // Dairy and fats
    m.insert("butter", 227.0);
    m.insert("cream cheese", 232.0);
    m.insert("sour cream", 242.0);
    m.insert("parmesan", 100.0);
    m.insert("shredded cheese", 113.0);
    m.insert("peanut butter", 258.0);

    // Grains, nuts, and the rest of the pantry
    m.insert("rolled oats", 80.0);
    m.insert("white rice", 185.0);
    m.insert("cocoa powder", 86.0);
    m.insert("chocolate chips", 170.0);
    m.insert("chopped nuts", 120.0);
    m.insert("raisins", 145.0);
    m.insert("breadcrumbs", 108.0);
    m.insert("table salt", 288.0);
    m.insert("kosher salt", 142.0);
    m.insert("baking soda", 220.0);
    m.insert("baking powder", 192.0);

    m
});

/// Aliases mapping common ingredient names to canonical names in DENSITY_DATA.
static INGREDIENT_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert("flour", "all-purpose flour");
    m.insert("ap flour", "all-purpose flour");
    m.insert("plain flour", "all-purpose flour");
    m.insert("sugar", "granulated sugar");
    m.insert("white sugar", "granulated sugar");
    m.insert("caster sugar", "granulated sugar");
    m.insert("light brown sugar", "brown sugar");
    m.insert("dark brown sugar", "brown sugar");
    m.insert("confectioners sugar", "powdered sugar");
    m.insert("icing sugar", "powdered sugar");
    m.insert("oats", "rolled oats");
    m.insert("old-fashioned oats", "rolled oats");
    m.insert("rice", "white rice");
    m.insert("cocoa", "cocoa powder");
    m.insert("parmesan cheese", "parmesan");
    m.insert("grated parmesan", "parmesan");
    m.insert("cheddar cheese", "shredded cheese");
    m.insert("mozzarella", "shredded cheese");
    m.insert("walnuts", "chopped nuts");
    m.insert("pecans", "chopped nuts");
    m.insert("panko", "breadcrumbs");
    m.insert("salt", "table salt");
    m.insert("corn starch", "cornstarch");
    m
});

/// Words that describe preparation rather than the ingredient itself.
const MODIFIERS_TO_STRIP: &[&str] = &[
    "unsalted",
    "salted",
    "softened",
    "melted",
    "cold",
    "packed",
    "lightly",
    "firmly",
    "sifted",
    "unsifted",
    "unbleached",
    "fresh",
    "finely",
    "coarsely",
    "freshly",
    "shredded",
    "grated",
    "chopped",
];

fn normalize_ingredient_name(s: &str) -> String {
    s.to_lowercase()
        .split_whitespace()
        .filter(|w| !MODIFIERS_TO_STRIP.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn lookup(name: &str) -> Option<f64> {
    if let Some(&d) = DENSITY_DATA.get(name) {
        return Some(d);
    }
    INGREDIENT_ALIASES
        .get(name)
        .and_then(|canonical| DENSITY_DATA.get(canonical))
        .copied()
}

/// Find the density (grams per cup) for an ingredient, if we know it.
///
/// Tries the name as written, with preparation words removed, without a
/// trailing plural "s", and finally the longest known name it ends with
/// ("king arthur bread flour" -> "bread flour").
pub fn find_density(item: &str) -> Option<f64> {
    let raw = item.trim().to_lowercase();
    if let Some(d) = lookup(&raw) {
        return Some(d);
    }

    let name = normalize_ingredient_name(&raw);
    if let Some(d) = lookup(&name) {
        return Some(d);
    }

    if let Some(singular) = name.strip_suffix('s') {
        if let Some(d) = lookup(singular) {
            return Some(d);
        }
    }

    let mut known: Vec<&str> = DENSITY_DATA
        .keys()
        .chain(INGREDIENT_ALIASES.keys())
        .copied()
        .collect();
    known.sort_by_key(|k| std::cmp::Reverse(k.len()));
    known
        .into_iter()
        .find(|k| name.ends_with(&format!(" {}", k)))
        .and_then(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(Unit::parse("cups"), Some(Unit::Cup));
        assert_eq!(Unit::parse("Tbsp."), Some(Unit::Tablespoon));
        assert_eq!(Unit::parse("T"), Some(Unit::Tablespoon));
        assert_eq!(Unit::parse("t"), Some(Unit::Teaspoon));
        assert_eq!(Unit::parse("fl oz"), Some(Unit::FluidOunce));
        assert_eq!(Unit::parse("lbs"), Some(Unit::Pound));
        assert_eq!(Unit::parse("Grams"), Some(Unit::Gram));
        assert_eq!(Unit::parse("clove"), None);
    }

    #[test]
    fn test_kind_and_system() {
        assert_eq!(Unit::Cup.kind(), UnitKind::Volume);
        assert_eq!(Unit::Ounce.kind(), UnitKind::Weight);
        assert_eq!(Unit::Liter.system(), System::Metric);
        assert_eq!(Unit::Tablespoon.system(), System::Us);
    }

    #[test]
    fn test_unit_kind_of_text() {
        assert_eq!(unit_kind("Tbsp"), UnitKind::Volume);
        assert_eq!(unit_kind("lbs"), UnitKind::Weight);
        assert_eq!(unit_kind("cloves"), UnitKind::Count);
        assert_eq!(unit_kind("can"), UnitKind::Count);
    }

    #[test]
    fn test_best_units() {
        assert_eq!(best_us_volume(5.0), Unit::Teaspoon);
        assert_eq!(best_us_volume(30.0), Unit::Tablespoon);
        assert_eq!(best_us_volume(250.0), Unit::Cup);
        assert_eq!(best_us_volume(2000.0), Unit::Quart);
        assert_eq!(best_us_volume(5000.0), Unit::Gallon);
        assert_eq!(best_us_weight(200.0), Unit::Ounce);
        assert_eq!(best_us_weight(900.0), Unit::Pound);
        assert_eq!(best_metric_volume(999.0), Unit::Milliliter);
        assert_eq!(best_metric_weight(1500.0), Unit::Kilogram);
    }

    #[test]
    fn test_find_density_direct_and_alias() {
        assert_eq!(find_density("all-purpose flour"), Some(125.0));
        assert_eq!(find_density("Sugar"), Some(200.0));
    }

    #[test]
    fn test_find_density_with_modifiers() {
        assert_eq!(find_density("softened unsalted butter"), Some(227.0));
        assert_eq!(find_density("packed light brown sugar"), Some(220.0));
    }

    #[test]
    fn test_find_density_suffix() {
        assert_eq!(find_density("king arthur bread flour"), Some(127.0));
    }

    #[test]
    fn test_find_density_unknown() {
        assert_eq!(find_density("unicorn tears"), None);
    }
}
