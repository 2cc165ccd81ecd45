//! Engine conformance suite.
//!
//! Each case is a fixture triplet under `tests/fixtures/`:
//! - `<name>.rules.json`    -- ruleset snapshots (JSON array)
//! - `<name>.listing.json`  -- base price, context, optional static
//!   assignment and per-listing overrides
//! - `<name>.expected.json` -- the full expected EvaluationResult
//!
//! The runner deserializes the rulesets, evaluates the listing, and
//! compares the serialized result against the expected JSON.

use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use appraise_eval::{appraise, EvaluationContext, ListingOverrides, Ruleset};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("invalid JSON in {}: {}", path.display(), e))
}

fn run_fixture(name: &str) {
    let dir = fixture_dir();
    let rules_json = load_json(&dir.join(format!("{}.rules.json", name)));
    let listing = load_json(&dir.join(format!("{}.listing.json", name)));
    let expected = load_json(&dir.join(format!("{}.expected.json", name)));

    let rulesets: Vec<Ruleset> = serde_json::from_value(rules_json)
        .unwrap_or_else(|e| panic!("invalid rulesets for {}: {}", name, e));

    let base_price: Decimal = serde_json::from_value(listing["base_price"].clone())
        .unwrap_or_else(|e| panic!("invalid base_price for {}: {}", name, e));
    let static_id: Option<u64> = listing
        .get("static_ruleset_id")
        .and_then(|v| v.as_u64());
    let overrides: ListingOverrides = match listing.get("overrides") {
        Some(v) => serde_json::from_value(v.clone())
            .unwrap_or_else(|e| panic!("invalid overrides for {}: {}", name, e)),
        None => ListingOverrides::none(),
    };
    let ctx = EvaluationContext::from_json(&listing["context"]);

    let result = appraise(&ctx, base_price, &rulesets, static_id, &overrides);
    let actual = result.to_json();

    assert_eq!(
        actual, expected,
        "breakdown mismatch for {}\n\nActual:\n{}\n\nExpected:\n{}",
        name,
        serde_json::to_string_pretty(&actual).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap()
    );
}

#[test]
fn ram_per_unit() {
    run_fixture("ram_per_unit");
}

#[test]
fn ddr5_multiplier() {
    run_fixture("ddr5_multiplier");
}

#[test]
fn static_assignment() {
    run_fixture("static_assignment");
}

#[test]
fn no_match() {
    run_fixture("no_match");
}
