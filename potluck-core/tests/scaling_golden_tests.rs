//! Golden file tests for the parse -> scale -> convert pipeline.
//!
//! Test cases are individual JSON files in `fixtures/scaling/`:
//! ```json
//! { "raw": "2 cups milk", "factor": 1.0, "system": "metric", "expected": "473 ml milk" }
//! ```
//! `system` is optional; without it the original units are kept.

use glob::glob;
use potluck_core::{parse_ingredient, scale_recipe, ScaleOptions, System};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct TestCase {
    raw: String,
    factor: f64,
    #[serde(default)]
    system: Option<System>,
    expected: String,
}

fn load_test_cases() -> Vec<(String, TestCase)> {
    let pattern = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/scaling/*.json");

    let mut cases = Vec::new();
    for entry in glob(&pattern.to_string_lossy()).expect("Failed to read glob pattern") {
        let path = entry.expect("Failed to read directory entry");
        let name = path.file_stem().unwrap().to_string_lossy().to_string();
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        let case: TestCase = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
        cases.push((name, case));
    }

    cases.sort_by(|a, b| a.0.cmp(&b.0));
    cases
}

fn run_pipeline(case: &TestCase) -> String {
    let ingredient = parse_ingredient(&case.raw);
    let options = ScaleOptions {
        factor: case.factor,
        target: case.system,
    };
    let scaled = scale_recipe(&[ingredient], options).expect("fixture factor is valid");
    scaled[0].display()
}

#[test]
fn test_scaling_golden_files() {
    let cases = load_test_cases();
    assert!(!cases.is_empty(), "No scaling fixtures found");

    let failures: Vec<String> = cases
        .iter()
        .filter_map(|(name, case)| {
            let actual = run_pipeline(case);
            (actual != case.expected).then(|| {
                format!(
                    "  {}: {:?}\n    expected: {:?}\n    actual:   {:?}",
                    name, case.raw, case.expected, actual
                )
            })
        })
        .collect();

    assert!(
        failures.is_empty(),
        "\n{} failures across {} tests:\n{}",
        failures.len(),
        cases.len(),
        failures.join("\n")
    );
}
