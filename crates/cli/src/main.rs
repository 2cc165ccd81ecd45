//! `appraise` -- command-line frontend for the valuation rule engine.
//!
//! Wraps the engine's three surfaces: listing evaluation, formula
//! checking, and ruleset checking. File formats match what the
//! rule-authoring service exports; see the fixtures under
//! `crates/eval/tests/fixtures/` for examples.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use appraise_core::{validate_formula, FieldCatalog};
use appraise_eval::{appraise, authoring, EvaluationContext, ListingOverrides, Ruleset};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Appraise valuation rule engine.
#[derive(Parser)]
#[command(name = "appraise", version, about = "Appraise valuation rule engine")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a listing against ruleset snapshots
    Eval {
        /// Path to the ruleset snapshots (JSON array)
        rules: PathBuf,
        /// Path to the listing file (base_price, context, optional
        /// static_ruleset_id and overrides)
        listing: PathBuf,
    },

    /// Parse and validate a formula against a field catalog
    CheckFormula {
        /// The formula text
        formula: String,
        /// Path to the field catalog export (JSON array)
        #[arg(long)]
        fields: PathBuf,
        /// Optional sample context for a preview value
        #[arg(long)]
        sample: Option<PathBuf>,
    },

    /// Run save-time checks over every rule in a ruleset file
    CheckRules {
        /// Path to the ruleset snapshots (JSON array)
        rules: PathBuf,
        /// Path to the field catalog export (JSON array)
        #[arg(long)]
        fields: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Eval { rules, listing } => cmd_eval(&rules, &listing, cli.output),
        Commands::CheckFormula {
            formula,
            fields,
            sample,
        } => cmd_check_formula(&formula, &fields, sample.as_deref(), cli.output),
        Commands::CheckRules { rules, fields } => cmd_check_rules(&rules, &fields, cli.output),
    };
    process::exit(code);
}

fn load_json(path: &Path) -> Result<serde_json::Value, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))
}

fn load_rulesets(path: &Path) -> Result<Vec<Ruleset>, String> {
    let json = load_json(path)?;
    serde_json::from_value(json).map_err(|e| format!("invalid rulesets in {}: {}", path.display(), e))
}

fn load_catalog(path: &Path) -> Result<FieldCatalog, String> {
    let json = load_json(path)?;
    FieldCatalog::from_json(&json)
}

fn fail(message: &str) -> i32 {
    eprintln!("error: {}", message);
    2
}

fn cmd_eval(rules_path: &Path, listing_path: &Path, output: OutputFormat) -> i32 {
    let rulesets = match load_rulesets(rules_path) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let listing = match load_json(listing_path) {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };

    let base_price: Decimal = match serde_json::from_value(listing["base_price"].clone()) {
        Ok(p) => p,
        Err(e) => return fail(&format!("invalid base_price: {}", e)),
    };
    let static_id = listing.get("static_ruleset_id").and_then(|v| v.as_u64());
    let overrides: ListingOverrides = match listing.get("overrides") {
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(o) => o,
            Err(e) => return fail(&format!("invalid overrides: {}", e)),
        },
        None => ListingOverrides::none(),
    };
    let ctx = EvaluationContext::from_json(&listing["context"]);

    let result = appraise(&ctx, base_price, &rulesets, static_id, &overrides);

    match output {
        OutputFormat::Json => println!("{}", result.to_json()),
        OutputFormat::Text => {
            match &result.ruleset {
                Some(rs) => println!("ruleset: {} (id {})", rs.name, rs.id),
                None => println!("ruleset: none applicable"),
            }
            for m in &result.matched_rules {
                println!("  {:>10}  {} / {}", m.amount, m.group_name, m.rule_name);
            }
            for i in &result.inactive_rules {
                println!("  {:>10}  {} / {} (not matched)", "-", i.group_name, i.rule_name);
            }
            for w in &result.warnings {
                println!("warning: {}", w);
            }
            for e in &result.errors {
                println!("error: {}", e);
            }
            println!("base price:       {}", result.base_price);
            println!("total adjustment: {}", result.total_adjustment);
            println!("adjusted price:   {}", result.adjusted_price);
        }
    }
    0
}

fn cmd_check_formula(
    formula: &str,
    fields_path: &Path,
    sample_path: Option<&Path>,
    output: OutputFormat,
) -> i32 {
    let catalog = match load_catalog(fields_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let sample = match sample_path {
        Some(path) => match load_json(path) {
            Ok(v) => Some(EvaluationContext::from_json(&v)),
            Err(e) => return fail(&e),
        },
        None => None,
    };
    let check = validate_formula(
        formula,
        &catalog,
        sample.as_ref().map(|s| s as &dyn appraise_core::FieldResolver),
    );

    match output {
        OutputFormat::Json => match serde_json::to_string(&check) {
            Ok(json) => println!("{}", json),
            Err(e) => return fail(&format!("serialization failed: {}", e)),
        },
        OutputFormat::Text => {
            if check.valid {
                println!("valid; references: {}", check.referenced_fields.join(", "));
                if let Some(preview) = check.preview_value {
                    println!("preview value: {}", preview);
                }
            } else {
                for err in &check.errors {
                    match err.position {
                        Some(pos) => println!("error at offset {}: {}", pos, err.message),
                        None => println!("error: {}", err.message),
                    }
                }
            }
        }
    }
    if check.valid {
        0
    } else {
        1
    }
}

fn cmd_check_rules(rules_path: &Path, fields_path: &Path, output: OutputFormat) -> i32 {
    let rulesets = match load_rulesets(rules_path) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let catalog = match load_catalog(fields_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let mut all_clean = true;
    let mut report = Vec::new();
    for ruleset in &rulesets {
        let issues = authoring::check_ruleset(ruleset, &catalog);
        if !issues.is_empty() {
            all_clean = false;
        }
        report.push((ruleset, issues));
    }

    match output {
        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = report
                .iter()
                .map(|(rs, issues)| {
                    serde_json::json!({
                        "ruleset_id": rs.id,
                        "ruleset_name": rs.name,
                        "issues": issues,
                    })
                })
                .collect();
            match serde_json::to_string(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => return fail(&format!("serialization failed: {}", e)),
            }
        }
        OutputFormat::Text => {
            for (rs, issues) in &report {
                if issues.is_empty() {
                    println!("{}: ok", rs.name);
                } else {
                    println!("{}: {} issue(s)", rs.name, issues.len());
                    for issue in issues {
                        println!("  {}", issue);
                    }
                }
            }
        }
    }
    if all_clean {
        0
    } else {
        1
    }
}
