#![deny(warnings)]

//! Headless CLI for running forgemagerie analyses against the reference catalogs.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use fm_catalog::{ItemCatalog, ModifierCatalog};
use fm_core::{validate_request, Item, StatMap, StatWeightTable};
use fm_engine::{sample_outcomes, Analysis, ForgeEngine};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fm-cli",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")"),
    about = "Estimate the profitability of forging an item"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full analysis: capacity gate, rune selection, scenarios.
    Analyze(AnalyzeArgs),
    /// Only compare required and available capacity.
    Check(RequestArgs),
    /// List reference items, optionally filtered by name.
    Items {
        query: Option<String>,
        /// Only items of this family, e.g. Anneau.
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        items: Option<PathBuf>,
    },
    /// List runes, optionally for a single stat.
    Runes {
        #[arg(long)]
        stat: Option<String>,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Item name, looked up in the item catalog.
    #[arg(long)]
    item: String,
    /// Alternative item catalog (YAML or JSON list).
    #[arg(long)]
    items: Option<PathBuf>,
    /// Absolute target, repeatable; order sets priority, e.g. --target vitalite=130
    #[arg(long = "target", value_parser = parse_stat, required = true)]
    targets: Vec<(String, i64)>,
    /// Amount of an existing stat to sacrifice, e.g. --remove chance=10
    #[arg(long = "remove", value_parser = parse_stat)]
    removals: Vec<(String, i64)>,
    /// Alternative stat weight table (YAML).
    #[arg(long)]
    weights: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    #[command(flatten)]
    request: RequestArgs,
    /// Alternative rune catalog (YAML or JSON list).
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Print the analysis as JSON instead of the summary.
    #[arg(long)]
    json: bool,
    /// Number of simulated attempts to draw from the scenarios.
    #[arg(long, default_value_t = 0)]
    simulate: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn parse_stat(s: &str) -> Result<(String, i64), String> {
    let (stat, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected stat=value, got `{s}`"))?;
    let stat = stat.trim();
    if stat.is_empty() {
        return Err(format!("missing stat name in `{s}`"));
    }
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid value in `{s}`: {e}"))?;
    Ok((stat.to_string(), value))
}

fn load_items(path: Option<&PathBuf>) -> Result<ItemCatalog> {
    match path {
        Some(p) => {
            ItemCatalog::load(p).with_context(|| format!("loading items from {}", p.display()))
        }
        None => Ok(ItemCatalog::builtin()?),
    }
}

fn load_runes(path: Option<&PathBuf>) -> Result<ModifierCatalog> {
    match path {
        Some(p) => {
            ModifierCatalog::load(p).with_context(|| format!("loading runes from {}", p.display()))
        }
        None => Ok(ModifierCatalog::builtin()?),
    }
}

fn load_engine(path: Option<&PathBuf>) -> Result<ForgeEngine> {
    let weights = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading weights from {}", p.display()))?;
            StatWeightTable::from_yaml_str(&text)?
        }
        None => StatWeightTable::builtin()?,
    };
    Ok(ForgeEngine::new(weights))
}

/// Resolve and validate the request inputs.
fn prepare(args: &RequestArgs) -> Result<(Item, StatMap, StatMap)> {
    let items = load_items(args.items.as_ref())?;
    let item = items
        .find_by_name(&args.item)
        .cloned()
        .ok_or_else(|| anyhow!("no item named `{}`", args.item))?;
    let targets = StatMap::try_from_pairs(args.targets.iter().cloned())?;
    let removals = StatMap::try_from_pairs(args.removals.iter().cloned())?;
    validate_request(&item, &targets, &removals)?;
    Ok((item, targets, removals))
}

fn run_check(args: &RequestArgs) -> Result<()> {
    let engine = load_engine(args.weights.as_ref())?;
    let (item, targets, removals) = prepare(args)?;
    let required = engine.capacity_used(&item, &targets);
    let available = engine.capacity_available(&item, &removals);
    println!(
        "Capacity | {} | required: {} | available: {} | {}",
        item.name,
        required,
        available,
        if required <= available { "OK" } else { "INSUFFICIENT" }
    );
    Ok(())
}

fn print_summary(a: &Analysis<'_>) {
    println!(
        "Analysis OK | {} (lvl {}) | capacity: {}/{} | runes: {} | cost: {} | expected profit: {} | profitability: {}%",
        a.item().name,
        a.item().level,
        a.capacity_used(),
        a.capacity_available(),
        a.modifiers().len(),
        a.total_cost(),
        a.expected_profit().round_dp(0),
        a.profitability_percent().round_dp(1)
    );
    for (m, n) in a.modifier_counts() {
        println!(
            "  {:>4} x {:<20} {:<18} {}",
            n,
            m.name,
            m.target_stat,
            m.price * Decimal::from(n)
        );
    }
    for s in a.scenarios() {
        println!(
            "  {} | p={} | value: {}",
            s.kind.code(),
            s.probability,
            s.value.round_dp(0)
        );
    }
}

fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let engine = load_engine(args.request.weights.as_ref())?;
    let runes = load_runes(args.catalog.as_ref())?;
    let (item, targets, removals) = prepare(&args.request)?;
    info!(item = %item.name, targets = targets.len(), "analyzing");

    let analysis = engine.analyze(item, targets, runes.as_slice(), removals)?;
    let tally = (args.simulate > 0)
        .then(|| sample_outcomes(analysis.scenarios(), args.simulate, args.seed));

    if args.json {
        let doc = serde_json::json!({ "analysis": analysis, "simulation": tally });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }
    print_summary(&analysis);
    if let Some(t) = tally {
        let counts: Vec<String> = t
            .counts
            .iter()
            .map(|(k, n)| format!("{}: {}", k.code(), n))
            .collect();
        println!(
            "Simulation | runs: {} | {} | mean value: {}",
            t.runs,
            counts.join(" | "),
            t.mean_value.round_dp(0)
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(command = ?cli.command, "starting CLI");

    match &cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Check(args) => run_check(args),
        Command::Items {
            query,
            category,
            items,
        } => {
            let catalog = load_items(items.as_ref())?;
            let listed: Vec<&Item> = match (query, category) {
                (Some(q), Some(c)) => catalog
                    .search(q)
                    .into_iter()
                    .filter(|i| i.category.eq_ignore_ascii_case(c))
                    .collect(),
                (Some(q), None) => catalog.search(q),
                (None, Some(c)) => catalog.by_category(c).collect(),
                (None, None) => catalog.items().iter().collect(),
            };
            for item in listed {
                println!(
                    "{:>6} | {:<28} | {:<8} | lvl {:>3} | capacity {}",
                    item.id, item.name, item.category, item.level, item.capacity_total
                );
            }
            Ok(())
        }
        Command::Runes { stat, catalog } => {
            let runes = load_runes(catalog.as_ref())?;
            for m in runes.as_slice() {
                if stat.as_deref().is_some_and(|s| s != m.target_stat.as_str()) {
                    continue;
                }
                println!(
                    "{:>4} | {:<22} | {:<18} | weight {:>3} | value {:>2} | {}",
                    m.id, m.name, m.target_stat, m.unit_weight, m.unit_value, m.price
                );
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn stat_pairs_parse() {
        assert_eq!(parse_stat("vitalite=130"), Ok(("vitalite".to_string(), 130)));
        assert_eq!(parse_stat(" pa = 1 "), Ok(("pa".to_string(), 1)));
        assert!(parse_stat("vitalite").is_err());
        assert!(parse_stat("=3").is_err());
        assert!(parse_stat("force=lots").is_err());
    }

    #[test]
    fn targets_keep_command_line_order() {
        let cli = Cli::try_parse_from([
            "fm-cli", "analyze", "--item", "Gelano", "--target", "agilite=30", "--target",
            "vitalite=130", "--remove", "chance=5",
        ])
        .unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        let (item, targets, removals) = prepare(&args.request).unwrap();
        assert_eq!(item.id, 2010);
        let order: Vec<&str> = targets.stats().map(|s| s.as_str()).collect();
        assert_eq!(order, ["agilite", "vitalite"]);
        assert_eq!(removals.get("chance"), Some(5));
    }

    #[test]
    fn unknown_item_is_reported() {
        let cli = Cli::try_parse_from(["fm-cli", "check", "--item", "Nope", "--target", "pa=1"])
            .unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        let err = prepare(&args).unwrap_err();
        assert!(err.to_string().contains("no item named"));
    }

    #[test]
    fn repeated_stat_flags_are_rejected() {
        let cli = Cli::try_parse_from([
            "fm-cli", "check", "--item", "Gelano", "--target", "vitalite=130", "--target",
            "vitalite=140",
        ])
        .unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        let err = prepare(&args).unwrap_err();
        assert!(err.to_string().contains("given more than once"), "{err}");

        let cli = Cli::try_parse_from([
            "fm-cli", "check", "--item", "Gelano", "--target", "pa=1", "--remove", "chance=5",
            "--remove", "chance=10",
        ])
        .unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert!(prepare(&args).is_err());
    }

    #[test]
    fn gelano_analysis_end_to_end() {
        let engine = ForgeEngine::builtin().unwrap();
        let runes = ModifierCatalog::builtin().unwrap();
        let items = ItemCatalog::builtin().unwrap();
        let item = items.find_by_name("Gelano").cloned().unwrap();
        let targets: StatMap = [("vitalite", 140), ("agilite", 27)].into_iter().collect();
        let a = engine
            .analyze(item, targets, runes.as_slice(), StatMap::new())
            .unwrap();
        // 20 vitalite over max (weight 1) + 2 agilite over max (weight 10)
        assert_eq!(a.capacity_used(), 40);
        let spent: u64 = a.modifiers().iter().map(|m| m.unit_weight).sum();
        assert!(spent <= 40);
    }
}
