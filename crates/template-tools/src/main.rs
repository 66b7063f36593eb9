//! Template tools - validate scaffolding template manifests and selections

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use template_validator::batch;
use template_validator::render::{self, OutputFormat, PresentationOptions};
use template_validator::version::compatibility_advisory;
use template_validator::{
    load_manifest, load_selection, RuntimeRequest, SelectionValue, ValidateOptions,
    ValidationMode, Validator, ValidatorConfig,
};
use tracing_subscriber::EnvFilter;

/// CLI version - compared against a manifest's `version`
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

const UPGRADE_COMMAND: &str = "cargo install template-tools --force";

#[derive(Parser, Debug)]
#[command(name = "template-tools")]
#[command(about = "CLI for validating scaffolding template manifests and selections")]
#[command(version)]
pub struct Args {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate one template manifest, optionally against a selection
    Validate(ValidateArgs),
    /// Validate every template manifest in a templates directory
    ValidateAll(ValidateAllArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: Format,

    /// Shorthand for --format json
    #[arg(long)]
    pub json: bool,

    /// Show "did you mean" suggestions for unknown identifiers
    #[arg(long)]
    pub suggestions: bool,

    /// Extra dimension names to accept (repeatable or comma-separated);
    /// added to those listed in TEMPLATE_EXTRA_DIMENSIONS
    #[arg(long = "dimension", value_delimiter = ',')]
    pub dimensions: Vec<String>,

    /// Validation mode
    #[arg(long, default_value = "strict")]
    pub mode: ValidationMode,
}

impl OutputArgs {
    fn presentation(&self) -> PresentationOptions {
        PresentationOptions {
            format: if self.json {
                OutputFormat::Json
            } else {
                self.format.into()
            },
            suggestions: self.suggestions,
        }
    }

    fn validator(&self) -> Validator {
        let config = ValidatorConfig::from_env().with_extra_dimensions(self.dimensions.iter().cloned());
        Validator::new(config)
    }
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Manifest file, or a template directory containing template.yaml
    pub manifest: PathBuf,

    /// Selection document (selection, deploymentTarget, enabledFeatures)
    #[arg(long)]
    pub selection: Option<PathBuf>,

    /// Dimension choice as dim=value or dim=a,b (repeatable)
    #[arg(short, long = "select", value_name = "DIM=VALUE")]
    pub select: Vec<String>,

    /// Deployment target for gate enforcement
    #[arg(short, long)]
    pub deployment: Option<String>,

    /// Enabled features (comma-separated)
    #[arg(short, long = "feature", value_delimiter = ',')]
    pub features: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct ValidateAllArgs {
    /// Templates directory (root index or tree of template.yaml files)
    #[arg(default_value = "templates")]
    pub template_dir: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Parse `dim=value` or `dim=a,b`
fn parse_choice(raw: &str) -> Result<(String, SelectionValue)> {
    let (dimension, value) = raw
        .split_once('=')
        .with_context(|| format!("Invalid selection '{}': expected DIM=VALUE", raw))?;
    let dimension = dimension.trim();
    if dimension.is_empty() {
        anyhow::bail!("Invalid selection '{}': dimension name is empty", raw);
    }
    let value = if value.contains(',') {
        SelectionValue::Multiple(
            value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        )
    } else {
        SelectionValue::Single(value.trim().to_string())
    };
    Ok((dimension.to_string(), value))
}

/// Combine the selection document with command-line choices (flags win)
fn runtime_request(args: &ValidateArgs) -> Result<Option<RuntimeRequest>> {
    let has_flags = !args.select.is_empty() || args.deployment.is_some() || !args.features.is_empty();
    if args.selection.is_none() && !has_flags {
        return Ok(None);
    }

    let RuntimeRequest {
        mut selection,
        deployment_target,
        enabled_features: mut features,
    } = match &args.selection {
        Some(path) => load_selection(path)
            .with_context(|| format!("Failed to load selection {}", path.display()))?,
        None => RuntimeRequest::default(),
    };

    for raw in &args.select {
        let (dimension, value) = parse_choice(raw)?;
        selection.values.insert(dimension, value);
    }

    for feature in &args.features {
        if !features.contains(feature) {
            features.push(feature.clone());
        }
    }

    let target = args.deployment.clone().unwrap_or(deployment_target);

    Ok(Some(RuntimeRequest::new(selection, &target, features)))
}

async fn print_advisory(path: &Path) {
    if let Ok(manifest) = load_manifest(path).await {
        if let Some(advisory) = compatibility_advisory(&manifest, CLI_VERSION, UPGRADE_COMMAND) {
            eprintln!("{} {}", "Warning:".yellow(), advisory);
        }
    }
}

async fn run_validate(args: ValidateArgs) -> Result<bool> {
    let presentation = args.output.presentation();
    let validator = args.output.validator();
    let options = ValidateOptions {
        runtime: runtime_request(&args)?,
        presentation,
    };

    let result = validator
        .validate_path(&args.manifest, args.output.mode, &options)
        .await;

    if presentation.format == OutputFormat::Text {
        print_advisory(&args.manifest).await;
    }

    let rendered = render::render(&result, &presentation)?;
    print!("{}", rendered);
    Ok(result.valid)
}

async fn run_validate_all(args: ValidateAllArgs) -> Result<bool> {
    if !args.template_dir.exists() {
        anyhow::bail!("Template directory not found: {}", args.template_dir.display());
    }

    let presentation = args.output.presentation();
    let paths = batch::discover_manifests(&args.template_dir);
    if paths.is_empty() {
        anyhow::bail!("No template.yaml found in {}", args.template_dir.display());
    }
    tracing::info!(count = paths.len(), "validating templates");

    let results = batch::validate_many(
        Arc::new(args.output.validator()),
        paths,
        args.output.mode,
        Arc::new(ValidateOptions {
            runtime: None,
            presentation,
        }),
    )
    .await;

    print!("{}", render::render_batch(&results, &presentation)?);
    Ok(results.iter().all(|(_, r)| r.valid))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let valid = match args.command {
        Command::Validate(validate_args) => run_validate(validate_args).await?,
        Command::ValidateAll(all_args) => run_validate_all(all_args).await?,
    };

    if !valid {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        let (dim, value) = parse_choice("database=postgres").unwrap();
        assert_eq!(dim, "database");
        assert_eq!(value, SelectionValue::Single("postgres".to_string()));

        let (_, value) = parse_choice("storage=s3, r2").unwrap();
        assert_eq!(
            value,
            SelectionValue::Multiple(vec!["s3".to_string(), "r2".to_string()])
        );

        assert!(parse_choice("database").is_err());
        assert!(parse_choice("=postgres").is_err());
    }

    #[test]
    fn test_no_runtime_without_selection_inputs() {
        let args = Args::parse_from(["template-tools", "validate", "templates/web"]);
        let Command::Validate(validate_args) = args.command else {
            panic!("expected validate");
        };
        assert!(runtime_request(&validate_args).unwrap().is_none());
    }

    #[test]
    fn test_flags_build_runtime_request() {
        let args = Args::parse_from([
            "template-tools",
            "validate",
            "templates/web",
            "-s",
            "database=d1",
            "--deployment",
            "cloudflare-workers",
            "--feature",
            "auth,payments",
        ]);
        let Command::Validate(validate_args) = args.command else {
            panic!("expected validate");
        };
        let request = runtime_request(&validate_args).unwrap().unwrap();
        assert_eq!(request.deployment_target, "cloudflare-workers");
        assert_eq!(request.enabled_features, vec!["auth", "payments"]);
        assert_eq!(request.selection.values_for("database"), vec!["d1"]);
    }
}
