use std::io::Read;
use std::path::PathBuf;

use condense::cli::{Cli, Commands, ConfigAction};
use condense::compress::Detail;
use condense::config::EngineConfig;
use condense::error::{CondenseError, Result};
use condense::optimizer::{ContentHint, OptimizeOptions, Optimizer};
use condense::signature::SignatureGrouper;
use condense::summarize::{SummarizerSet, SummaryOptions};

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse_args();

    match cli.command {
        Commands::Optimize {
            input,
            hint,
            detail,
            json,
        } => cmd_optimize(cli.config, input, &hint, &detail, json),
        Commands::Group { input, json } => cmd_group(input, json),
        Commands::Summarize {
            input,
            detail,
            json,
        } => cmd_summarize(cli.config, input, &detail, json),
        Commands::Config { action } => cmd_config(cli.config, action),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("condense=info"));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_optimize(
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    hint: &str,
    detail: &str,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let optimizer = Optimizer::new(config)?;
    let content = read_input(input)?;

    let options = OptimizeOptions {
        hint: hint.parse::<ContentHint>()?,
        detail: detail.parse::<Detail>()?,
    };
    let outcome = optimizer.optimize(&content, &options)?;

    if json {
        println!("{}", to_json(&outcome)?);
    } else {
        println!("{}", outcome.output);
        tracing::info!(
            detected = %outcome.detected_type,
            method = %outcome.method,
            original = outcome.original_tokens,
            optimized = outcome.optimized_tokens,
            savings_percent = outcome.savings_percent as f64,
            "optimized"
        );
    }

    Ok(())
}

fn cmd_group(input: Option<PathBuf>, json: bool) -> Result<()> {
    let content = read_input(input)?;
    let grouper = SignatureGrouper::new();
    let grouped = grouper.group(&content);
    let stats = SignatureGrouper::stats(&grouped, &content);

    if json {
        let payload = serde_json::json!({ "groups": grouped.groups, "stats": stats });
        println!("{}", to_json(&payload)?);
    } else {
        println!("{}", SignatureGrouper::format_groups(&grouped));
        tracing::info!(
            unique = stats.unique_errors,
            duplicates = stats.total_duplicates,
            reduction_percent = stats.reduction_percent as f64,
            "grouped"
        );
    }

    Ok(())
}

fn cmd_summarize(
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    detail: &str,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let content = read_input(input)?;
    let summarizers = SummarizerSet::new(config.summary);

    let options = SummaryOptions {
        detail: detail.parse::<Detail>()?,
    };
    let summary = summarizers.summarize(&content, &options);

    if json {
        println!("{}", to_json(&summary)?);
    } else {
        println!("{}", summary.render());
    }

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            println!("{}", to_json(&config)?);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => EngineConfig::default_path()?,
            };
            EngineConfig::load(&path)?;
            println!("✓ Configuration is valid");
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => EngineConfig::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CondenseError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            EngineConfig::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<EngineConfig> {
    let path = match config_path {
        Some(path) => path,
        None => EngineConfig::default_path()?,
    };

    if !path.exists() {
        tracing::debug!(
            "Config file not found, using defaults. Run 'condense config init' to create one."
        );
        return Ok(EngineConfig::default());
    }

    EngineConfig::load(&path)
}

fn read_input(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(&path).map_err(|e| CondenseError::Io {
            source: e,
            context: format!("Failed to read input file: {:?}", path),
        }),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| CondenseError::Io {
                    source: e,
                    context: "Failed to read stdin".to_string(),
                })?;
            Ok(buffer)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| CondenseError::Json {
        source: e,
        context: "Failed to serialize output".to_string(),
    })
}
