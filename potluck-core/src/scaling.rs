//! Ingredient scaling and unit conversion.
//!
//! Scaling multiplies amounts (ranges included) and re-renders them in the
//! style of their unit. Conversion moves an ingredient between US customary
//! and metric measures; volumes of solids with a known density become
//! weights, liquids stay volumes.

use thiserror::Error;

use crate::quantity::{AmountStyle, Quantity};
use crate::types::Ingredient;
use crate::units::{
    best_metric_volume, best_metric_weight, best_us_volume, best_us_weight, find_density, System,
    Unit, UnitKind, ML_PER_CUP,
};

/// Largest factor we accept; anything above is almost certainly a typo.
pub const MAX_FACTOR: f64 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("Scale factor must be greater than 0 and at most {max}, got {0}", max = MAX_FACTOR)]
    InvalidFactor(f64),

    #[error("Servings must be greater than 0")]
    InvalidServings,
}

/// Whether an ingredient is poured or weighed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matter {
    Liquid,
    Solid,
}

/// Words that make an ingredient a liquid.
const LIQUID_WORDS: &[&str] = &[
    "water",
    "milk",
    "buttermilk",
    "cream",
    "half-and-half",
    "broth",
    "stock",
    "juice",
    "oil",
    "vinegar",
    "wine",
    "beer",
    "cider",
    "sake",
    "mirin",
    "sauce",
    "syrup",
    "honey",
    "molasses",
    "extract",
    "liqueur",
    "rum",
    "brandy",
    "bourbon",
    "whiskey",
    "vodka",
    "coffee",
    "espresso",
    "tea",
    "kefir",
    "yogurt",
];

/// Phrases that look liquid but are measured like solids. Checked first.
const SOLID_PHRASES: &[&str] = &[
    "cream cheese",
    "ice cream",
    "sour cream",
    "cream of tartar",
    "peanut butter",
    "milk powder",
    "powdered milk",
    "milk chocolate",
    "oil-packed",
    "zest",
];

/// Classify an ingredient by name.
pub fn classify(item: &str) -> Matter {
    let lower = item.to_lowercase();

    if SOLID_PHRASES.iter().any(|p| lower.contains(p)) {
        return Matter::Solid;
    }

    let is_liquid = lower
        .split(|c: char| !(c.is_alphabetic() || c == '-'))
        .filter(|w| !w.is_empty())
        .any(|word| {
            LIQUID_WORDS
                .iter()
                .any(|l| word == *l || word.strip_suffix('s') == Some(*l))
        });

    if is_liquid {
        Matter::Liquid
    } else {
        Matter::Solid
    }
}

pub fn validate_factor(factor: f64) -> Result<f64, ScaleError> {
    if factor.is_finite() && factor > 0.0 && factor <= MAX_FACTOR {
        Ok(factor)
    } else {
        Err(ScaleError::InvalidFactor(factor))
    }
}

/// Factor needed to go from `servings` to `target_servings`.
pub fn factor_for_servings(servings: i32, target_servings: i32) -> Result<f64, ScaleError> {
    if servings <= 0 || target_servings <= 0 {
        return Err(ScaleError::InvalidServings);
    }
    validate_factor(target_servings as f64 / servings as f64)
}

fn style_for(unit: Option<Unit>) -> AmountStyle {
    match unit {
        Some(u) if u.system() == System::Metric => AmountStyle::Decimal,
        _ => AmountStyle::Fraction,
    }
}

/// Multiply an ingredient's amount. Ingredients without an amount we can do
/// arithmetic on ("a pinch of salt") come back unchanged.
pub fn scale_ingredient(ingredient: &Ingredient, factor: f64) -> Ingredient {
    let Some(quantity) = ingredient.amount.as_deref().and_then(Quantity::parse) else {
        return ingredient.clone();
    };
    let unit = ingredient.unit.as_deref().and_then(Unit::parse);
    let scaled = quantity.scale(factor);

    Ingredient {
        amount: Some(scaled.format(style_for(unit))),
        unit: match unit {
            Some(unit) => Some(unit.label(scaled.max() > 1.0).to_string()),
            // Count and unknown units
            None => ingredient.unit.clone(),
        },
        ..ingredient.clone()
    }
}

/// Convert an ingredient into the target measurement system.
///
/// Count units and unknown units are left alone. Amounts already in the
/// target system are re-expressed in the most readable unit of that system
/// (1500 g -> 1.5 kg).
pub fn convert_ingredient(ingredient: &Ingredient, target: System) -> Ingredient {
    let Some(unit) = ingredient.unit.as_deref().and_then(Unit::parse) else {
        return ingredient.clone();
    };
    let Some(quantity) = ingredient.amount.as_deref().and_then(Quantity::parse) else {
        return ingredient.clone();
    };

    // Millilitres or grams
    let base = quantity.map(|v| v * unit.to_base());

    let (new_unit, base) = match (unit.kind(), target) {
        (UnitKind::Weight, System::Metric) => (best_metric_weight(base.max()), base),
        (UnitKind::Weight, System::Us) => (best_us_weight(base.max()), base),
        (UnitKind::Volume, System::Us) => (best_us_volume(base.max()), base),
        (UnitKind::Count, _) => return ingredient.clone(),
        (UnitKind::Volume, System::Metric) => {
            let density = match (unit.system(), classify(&ingredient.item)) {
                (System::Us, Matter::Solid) => find_density(&ingredient.item),
                _ => None,
            };
            match density {
                Some(grams_per_cup) => {
                    let grams = base.map(|ml| ml / ML_PER_CUP * grams_per_cup);
                    (best_metric_weight(grams.max()), grams)
                }
                None => (best_metric_volume(base.max()), base),
            }
        }
    };

    let converted = base.map(|v| v / new_unit.to_base());
    let plural = converted.max() > 1.0;

    Ingredient {
        amount: Some(converted.format(style_for(Some(new_unit)))),
        unit: Some(new_unit.label(plural).to_string()),
        ..ingredient.clone()
    }
}

/// Options for scaling a whole ingredient list.
#[derive(Debug, Clone, Copy)]
pub struct ScaleOptions {
    pub factor: f64,
    /// Convert into this system after scaling; None keeps the original units.
    pub target: Option<System>,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            factor: 1.0,
            target: None,
        }
    }
}

/// Scale and optionally convert every ingredient of a recipe.
pub fn scale_recipe(
    ingredients: &[Ingredient],
    options: ScaleOptions,
) -> Result<Vec<Ingredient>, ScaleError> {
    let factor = validate_factor(options.factor)?;

    Ok(ingredients
        .iter()
        .map(|ingredient| {
            let scaled = if factor == 1.0 {
                ingredient.clone()
            } else {
                scale_ingredient(ingredient, factor)
            };
            match options.target {
                Some(target) => convert_ingredient(&scaled, target),
                None => scaled,
            }
        })
        .collect())
}
