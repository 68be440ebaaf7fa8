//! GAMR CLI
//!
//! Command-line interface for GAMR risk scoring, evaluation roll-ups and
//! suggestion lookups.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use gamr_core::aggregate::try_aggregate_score;
use gamr_core::{
    priority_from_score, roll_up, AggregateResult, EvaluationTemplate, Priority, Response,
    RiskInput, WeightedValue,
};
use std::path::{Path, PathBuf};
use tracing::debug;

mod config;
mod validator;

use config::AppConfig;
use validator::ConfigValidator;

#[derive(Parser)]
#[command(name = "gamr")]
#[command(version)]
#[command(about = "Risk scoring and prioritization for GAMR assessments", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score a risk scenario and derive its priority
    Score {
        /// Probability rating
        #[arg(short, long, allow_negative_numbers = true)]
        probability: Option<i64>,

        /// Vulnerability rating
        #[arg(short = 'u', long, allow_negative_numbers = true)]
        vulnerability: Option<i64>,

        /// Impact rating
        #[arg(short, long, allow_negative_numbers = true)]
        impact: Option<i64>,

        /// Ratings as a JSON object instead of flags
        #[arg(long, conflicts_with_all = ["probability", "vulnerability", "impact"])]
        input: Option<String>,

        /// Tenant whose scoring profile to use
        #[arg(short, long)]
        tenant: Option<String>,
    },

    /// Map a numeric score to its priority tier
    Priority {
        /// Score to classify
        #[arg(allow_negative_numbers = true)]
        score: f64,
    },

    /// Compute a weighted mean from a JSON array of {value, weight}
    Aggregate {
        /// JSON file with the items
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Roll up evaluation responses to objective and overall scores
    Evaluate {
        /// Evaluation template (YAML)
        #[arg(short, long)]
        template: PathBuf,

        /// Responses (JSON array)
        #[arg(short, long)]
        responses: PathBuf,
    },

    /// Suggest risk ratings for an answer text
    Suggest {
        /// Answer text to match
        #[arg(long)]
        text: String,

        /// Tenant whose rules and profile to use
        #[arg(short, long)]
        tenant: Option<String>,

        /// Sector of the organization
        #[arg(short, long)]
        sector: Option<String>,
    },

    /// Validate configuration
    Validate {
        /// Configuration file to validate
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::resolve(cli.config.as_deref(), &default_config_path())
        .context("Failed to load configuration")?;

    let mut logging = gamr_observability::LoggingConfig::default()
        .with_level_name(&config.logging.level);
    if cli.verbose {
        logging.level = tracing::Level::DEBUG;
    }
    logging.json_format = config.logging.json_format || cli.format == OutputFormat::Json;
    gamr_observability::init_logging_with_config(logging);

    match cli.command {
        Commands::Score {
            probability,
            vulnerability,
            impact,
            input,
            tenant,
        } => {
            let input = match input {
                Some(json) => parse_input_json(&json)?,
                None => match (probability, vulnerability, impact) {
                    (Some(p), Some(v), Some(i)) => RiskInput::new(p, v, i),
                    _ => bail!(
                        "Provide --probability, --vulnerability and --impact, or --input as JSON"
                    ),
                },
            };
            cmd_score(&config, input, tenant, cli.format)
        }
        Commands::Priority { score } => cmd_priority(score, cli.format),
        Commands::Aggregate { file } => cmd_aggregate(&file, cli.format),
        Commands::Evaluate {
            template,
            responses,
        } => cmd_evaluate(&template, &responses, cli.format),
        Commands::Suggest {
            text,
            tenant,
            sector,
        } => cmd_suggest(&config, &text, tenant, sector, cli.format),
        Commands::Validate { config: cfg_path } => {
            cmd_validate(cfg_path.or(cli.config).unwrap_or_else(default_config_path))
        }
    }
}

fn default_config_path() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("com", "gamr", "gamr") {
        dirs.config_dir().join("config.yaml")
    } else {
        PathBuf::from("config/default.yaml")
    }
}

fn parse_input_json(json: &str) -> Result<RiskInput> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("--input is not valid JSON")?;
    Ok(RiskInput::from_json(&value)?)
}

fn priority_label(priority: Priority) -> ColoredString {
    let label = priority.as_str();
    match priority {
        Priority::Critical => label.red().bold(),
        Priority::High => label.red(),
        Priority::Medium => label.yellow(),
        Priority::Low => label.green(),
        Priority::VeryLow => label.dimmed(),
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.2}", s),
        None => "not computable".dimmed().to_string(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn cmd_score(
    config: &AppConfig,
    input: RiskInput,
    tenant: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let tenant = tenant.unwrap_or_else(|| config.default_tenant.clone());
    let scoring = config.load_scoring()?;
    let engine = scoring.engine_for(&tenant)?;
    let assessment = engine.assess(&input)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        let scales = engine.scales();
        println!("{}", "Risk Assessment".bold());
        println!("───────────────");
        println!("  Tenant: {}", tenant.cyan());
        println!(
            "  Ratings: probability {}/{}, vulnerability {}/{}, impact {}/{}",
            input.probability,
            scales.probability.max,
            input.vulnerability,
            scales.vulnerability.max,
            input.impact,
            scales.impact.max
        );
        println!("  Risk score: {}", assessment.risk_score);
        println!("  Normalized: {:.1}", assessment.normalized_score);
        println!("  Mode: {}", assessment.mode);
        println!("  Priority: {}", priority_label(assessment.priority));
    }

    Ok(())
}

fn cmd_priority(score: f64, format: OutputFormat) -> Result<()> {
    let priority = priority_from_score(score);

    if format == OutputFormat::Json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "score": score,
                "priority": priority,
            }))?
        );
    } else {
        println!("{} -> {}", score, priority_label(priority));
    }

    Ok(())
}

fn cmd_aggregate(file: &Path, format: OutputFormat) -> Result<()> {
    let items: Vec<WeightedValue> = read_json(file)?;
    let result = AggregateResult::from(try_aggregate_score(&items)?);
    debug!(items = items.len(), "Aggregated items");

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Items: {}", items.len());
        println!("Aggregate score: {}", format_score(result.aggregate_score));
    }

    Ok(())
}

fn cmd_evaluate(template_path: &Path, responses_path: &Path, format: OutputFormat) -> Result<()> {
    let contents = std::fs::read_to_string(template_path)
        .with_context(|| format!("Failed to read {}", template_path.display()))?;
    let template: EvaluationTemplate = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", template_path.display()))?;

    let responses: Vec<Response> = read_json(responses_path)?;
    let score = roll_up(&template, &responses)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&score)?);
        return Ok(());
    }

    let title = if template.name.is_empty() {
        "Evaluation".to_string()
    } else {
        format!("Evaluation: {}", template.name)
    };
    println!("{}", title.bold());
    println!("─────────────────────");
    for objective in &score.objectives {
        println!(
            "  {} (weight {}): {} [{}/{} answered, {} scorable]",
            objective.title.cyan(),
            objective.weight,
            format_score(objective.score),
            objective.answered,
            objective.total,
            objective.scorable
        );
    }
    println!();
    println!("  Overall: {}", format_score(score.overall));
    println!("  Completion: {:.0}%", score.completion * 100.0);

    Ok(())
}

fn cmd_suggest(
    config: &AppConfig,
    text: &str,
    tenant: Option<String>,
    sector: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let tenant = tenant.unwrap_or_else(|| config.default_tenant.clone());
    let sector = sector.unwrap_or_else(|| config.default_sector.clone());
    let scoring = config.load_scoring()?;
    let engine = scoring.engine_for(&tenant)?;
    let suggestions = scoring
        .knowledge_base
        .suggest(&tenant, &sector, text, &engine)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No suggestions for tenant {} in sector {}", tenant.cyan(), sector.cyan());
        return Ok(());
    }

    println!("{}", "Suggestions".bold());
    println!("───────────");
    for suggestion in &suggestions {
        println!(
            "  {} {} (score {}, matched: {})",
            priority_label(suggestion.assessment.priority),
            suggestion.scenario.bold(),
            suggestion.assessment.risk_score,
            suggestion.matched_keywords.join(", ")
        );
        println!(
            "      probability {}, vulnerability {}, impact {}",
            suggestion.suggested.probability,
            suggestion.suggested.vulnerability,
            suggestion.suggested.impact
        );
        if let Some(recommendation) = &suggestion.recommendation {
            println!("      {} {}", "→".green(), recommendation);
        }
    }

    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<()> {
    println!(
        "Validating configuration: {}",
        config_path.display().to_string().cyan()
    );

    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("{}: {:#}", "Configuration file error".red().bold(), e);
            std::process::exit(1);
        }
    };

    let validation_result = ConfigValidator::validate(&config);
    validation_result.print();

    println!();
    println!("{}", "Configuration Summary".bold());
    println!("─────────────────────");
    println!("  Default tenant: {}", config.default_tenant);
    println!("  Default sector: {}", config.default_sector);
    match config.scoring_config_path() {
        Some(path) => println!("  Scoring config: {}", path.display()),
        None => println!("  Scoring config: (built-in defaults)"),
    }
    println!("  Log level: {}", config.logging.level);

    if validation_result.has_errors() {
        println!();
        println!(
            "{}",
            "Configuration validation failed. Fix the errors above."
                .red()
                .bold()
        );
        std::process::exit(1);
    } else if validation_result.has_warnings() {
        println!();
        println!(
            "{}",
            "Configuration is valid with warnings.".yellow().bold()
        );
    } else {
        println!();
        println!("{}", "Configuration is valid.".green().bold());
    }

    Ok(())
}
