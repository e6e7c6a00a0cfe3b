use admit_rank::catalog::{CatalogColumns, CatalogHandle, CsvCatalogSource, ProgramCatalog, WeightNormalizer};
use admit_rank::config::{Config, Environment};
use admit_rank::scores::{JsonFileScoreStore, MemoryScoreStore, RawScore, ScoreInput, ScoreStore};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

const EXIT_SUCCESS: i32 = 0;
const EXIT_CATALOG: i32 = 2;
const EXIT_SCORES: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the programs these scores get you into
    Check {
        #[command(flatten)]
        scores: ScoreArgs,

        /// Only show programs whose name, campus or schedule contains this text
        #[arg(short, long)]
        query: Option<String>,

        /// Sort by score, highest first (default keeps catalog order)
        #[arg(long)]
        sorted: bool,

        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Score every program at one campus and schedule, ignoring cutoffs
    Simulate {
        #[command(flatten)]
        scores: ScoreArgs,

        #[arg(long)]
        campus: String,

        #[arg(long)]
        schedule: String,

        #[arg(short, long)]
        query: Option<String>,
    },
    /// Manage saved scores
    Scores {
        #[command(subcommand)]
        action: ScoresAction,
    },
    /// List campuses and schedules in the catalog
    Campuses,
}

#[derive(Subcommand, Debug)]
enum ScoresAction {
    /// Show a user's saved scores
    Show {
        #[arg(short, long)]
        user: String,
    },
    /// Save (or replace) a user's scores
    Set {
        #[arg(short, long)]
        user: String,

        /// Subscore as subject=value, e.g. mathematics=80 (repeat for all five)
        #[arg(short, long = "score", value_parser = parse_score_arg, required = true)]
        scores: Vec<(String, RawScore)>,
    },
    /// Delete a user's saved scores
    Delete {
        #[arg(short, long)]
        user: String,
    },
}

#[derive(clap::Args, Debug)]
struct ScoreArgs {
    /// Subscore as subject=value, e.g. mathematics=80 (repeat for all five)
    #[arg(short, long = "score", value_parser = parse_score_arg)]
    scores: Vec<(String, RawScore)>,

    /// Use the scores saved for this user
    #[arg(short, long, conflicts_with = "scores")]
    user: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "admit-rank")]
#[command(about = "Admission eligibility from ICFES subscores", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/admit-rank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Percentage weight table (CSV), overrides config
    #[arg(long, global = true, requires = "cutoffs")]
    weights: Option<PathBuf>,

    /// Cutoff table (CSV), overrides config
    #[arg(long, global = true, requires = "weights")]
    cutoffs: Option<PathBuf>,

    /// Program list with embedded weights (JSON), overrides config
    #[arg(long, global = true, conflicts_with_all = ["weights", "cutoffs"])]
    programs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn parse_score_arg(arg: &str) -> Result<(String, RawScore), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected subject=value, got '{}'", arg))?;
    let value = value.trim();
    let raw = if let Ok(n) = value.parse::<i64>() {
        RawScore::Integer(n)
    } else if let Ok(x) = value.parse::<f64>() {
        RawScore::Decimal(x)
    } else {
        RawScore::Text(value.to_string())
    };
    Ok((key.trim().to_string(), raw))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let start_time = Instant::now();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let config = match admit_rank::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = admit_rank::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if let Err(e) = admit_rank::telemetry::init(&config.log_level, cli.verbose) {
        eprintln!("Config error: {}", e);
        std::process::exit(EXIT_CONFIG);
    }

    let mut store = open_store(&config);

    let code = match cli.command {
        Commands::Scores { ref action } => run_scores(action, store.as_mut()),
        Commands::Campuses => {
            let catalog = load_catalog_or_exit(&cli, &config).await;
            for campus in catalog.campuses() {
                println!("{}", campus);
            }
            println!();
            for schedule in catalog.schedules() {
                println!("{}", schedule);
            }
            EXIT_SUCCESS
        }
        Commands::Check {
            ref scores,
            ref query,
            sorted,
            tsv,
        } => {
            let input = resolve_scores(scores, store.as_ref());
            let handle = CatalogHandle::new();
            handle.publish(load_catalog_or_exit(&cli, &config).await);

            let mut evaluation = match admit_rank::scoring::evaluate_snapshot(&input, &handle) {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("Catalog error: {}", e);
                    std::process::exit(EXIT_CATALOG);
                }
            };
            if sorted {
                admit_rank::scoring::sort_by_score(&mut evaluation.results);
            }

            let shown = admit_rank::scoring::filter_matching(
                &evaluation.results,
                query.as_deref().unwrap_or(""),
            );
            let use_colors = admit_rank::output::should_use_colors();

            if tsv {
                let output = admit_rank::output::format_tsv(&shown);
                if !output.is_empty() {
                    println!("{}", output);
                }
            } else {
                println!("{}", admit_rank::output::format_scores(&input, use_colors));
                println!();
                println!("{}", admit_rank::output::format_results_table(&shown, use_colors));
            }

            if cli.verbose {
                eprintln!();
                eprintln!("{}", admit_rank::output::format_report(&evaluation.report));
                eprintln!(
                    "Shown: {} of {} eligible in {:?}",
                    shown.len(),
                    evaluation.results.len(),
                    start_time.elapsed()
                );
            }
            EXIT_SUCCESS
        }
        Commands::Simulate {
            ref scores,
            ref campus,
            ref schedule,
            ref query,
        } => {
            let input = resolve_scores(scores, store.as_ref());
            let catalog = load_catalog_or_exit(&cli, &config).await;
            let scored = admit_rank::scoring::simulate(&input, &catalog, campus, schedule);
            let shown = admit_rank::scoring::filter_matching(&scored, query.as_deref().unwrap_or(""));

            let use_colors = admit_rank::output::should_use_colors();
            println!("{}", admit_rank::output::format_scores(&input, use_colors));
            println!();
            println!("{}", admit_rank::output::format_simulation_table(&shown, use_colors));

            if cli.verbose {
                eprintln!();
                eprintln!("Scored {} programs in {:?}", scored.len(), start_time.elapsed());
            }
            EXIT_SUCCESS
        }
    };

    std::process::exit(code);
}

fn open_store(config: &Config) -> Box<dyn ScoreStore> {
    match config.environment {
        Environment::Development => Box::new(MemoryScoreStore::new()),
        Environment::Production => {
            let path = config
                .scores
                .path
                .as_deref()
                .map(admit_rank::config::expand_home)
                .unwrap_or_else(admit_rank::scores::get_scores_path);
            Box::new(JsonFileScoreStore::new(path))
        }
    }
}

fn run_scores(action: &ScoresAction, store: &mut dyn ScoreStore) -> i32 {
    match action {
        ScoresAction::Show { user } => match store.get_user_scores(user) {
            Ok(Some(scores)) => {
                let use_colors = admit_rank::output::should_use_colors();
                println!("{}", admit_rank::output::format_scores(&scores, use_colors));
                EXIT_SUCCESS
            }
            Ok(None) => {
                eprintln!("No saved scores for '{}'", user);
                EXIT_SCORES
            }
            Err(e) => {
                eprintln!("Score store error: {:#}", e);
                EXIT_SCORES
            }
        },
        ScoresAction::Set { user, scores } => {
            let raw: BTreeMap<String, RawScore> = scores.iter().cloned().collect();
            let input = match admit_rank::scores::validate_scores(&raw) {
                Ok(input) => input,
                Err(e) => {
                    eprintln!("{}", e);
                    return EXIT_SCORES;
                }
            };
            match store.save_user_scores(user, input) {
                Ok(saved) => {
                    println!("Saved scores for '{}' (total {})", user, saved.total());
                    if !store.is_persistent() {
                        eprintln!("Note: environment is development; scores are kept for this run only and were not written to disk.");
                    }
                    EXIT_SUCCESS
                }
                Err(e) => {
                    eprintln!("Score store error: {:#}", e);
                    EXIT_SCORES
                }
            }
        }
        ScoresAction::Delete { user } => match store.delete_user_scores(user) {
            Ok(true) => {
                println!("Deleted scores for '{}'", user);
                EXIT_SUCCESS
            }
            Ok(false) => {
                eprintln!("No saved scores for '{}'", user);
                EXIT_SCORES
            }
            Err(e) => {
                eprintln!("Score store error: {:#}", e);
                EXIT_SCORES
            }
        },
    }
}

/// Scores from --score flags, or from the store for --user. Exits on failure.
fn resolve_scores(args: &ScoreArgs, store: &dyn ScoreStore) -> ScoreInput {
    if let Some(user) = &args.user {
        return match store.get_user_scores(user) {
            Ok(Some(scores)) => scores,
            Ok(None) => {
                eprintln!("No saved scores for '{}'. Save them with:", user);
                eprintln!("  admit-rank scores set --user {} --score mathematics=80 ...", user);
                std::process::exit(EXIT_SCORES);
            }
            Err(e) => {
                eprintln!("Score store error: {:#}", e);
                std::process::exit(EXIT_SCORES);
            }
        };
    }

    let raw: BTreeMap<String, RawScore> = args.scores.iter().cloned().collect();
    match admit_rank::scores::validate_scores(&raw) {
        Ok(scores) => scores,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Pass all five subscores, e.g.:");
            eprintln!("  --score criticalReading=70 --score mathematics=80 --score socialSciences=60 \\");
            eprintln!("  --score naturalSciences=65 --score english=55");
            std::process::exit(EXIT_SCORES);
        }
    }
}

async fn load_catalog_or_exit(cli: &Cli, config: &Config) -> ProgramCatalog {
    let columns: CatalogColumns = config.columns.clone();
    let normalizer = WeightNormalizer::new(columns.subjects.clone());

    let embedded = cli.programs.clone().or_else(|| config.catalog.embedded.clone());
    let tables = match (&cli.weights, &cli.cutoffs) {
        (Some(w), Some(c)) => Some((w.clone(), c.clone())),
        _ if cli.programs.is_some() => None,
        _ => config.catalog.weights.clone().zip(config.catalog.cutoffs.clone()),
    };

    let result = match (tables, embedded) {
        (Some((weights, cutoffs)), _) => {
            let source = CsvCatalogSource::new(
                admit_rank::config::expand_home(&weights),
                admit_rank::config::expand_home(&cutoffs),
                columns,
            );
            admit_rank::catalog::load_catalog(&source, &normalizer).await
        }
        (None, Some(path)) => {
            admit_rank::catalog::load_embedded_catalog(&admit_rank::config::expand_home(&path), &normalizer)
                .await
        }
        (None, None) => {
            eprintln!("No catalog configured.");
            eprintln!("Pass --weights and --cutoffs (or --programs), or add to ~/.config/admit-rank/config.yaml:");
            eprintln!("  catalog:");
            eprintln!("    weights: /path/to/ponderados.csv");
            eprintln!("    cutoffs: /path/to/puntajes.csv");
            std::process::exit(EXIT_CONFIG);
        }
    };

    match result {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Catalog error: {}", e);
            std::process::exit(EXIT_CATALOG);
        }
    }
}
