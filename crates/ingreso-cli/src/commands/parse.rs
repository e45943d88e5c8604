//! Parse command - extract intake fields from a single recognized-text file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use ingreso_core::form::rules::format_rut;
use ingreso_core::form::{AdmissionFormParser, FormParser};
use ingreso_core::models::config::IngresoConfig;
use ingreso_core::{Field, ParseResult, RecognizedText};

use super::config::default_config_path;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (recognizer JSON or plain-text transcript)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Reference date for unlabelled dates, YYYY-MM-DD (default: today)
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// Keep RUT candidates whose check digit does not match
    #[arg(long)]
    no_rut_validation: bool,

    /// Show per-field confidence scores
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for written outputs.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let input = read_input(&args.input)?;
    if input.is_empty() {
        warn!("{} contains no recognized text", args.input.display());
    }

    let mut parser = build_parser(&config, args.reference_date);
    if args.no_rut_validation {
        parser = parser.with_rut_validation(false);
    }

    let result = parser.parse(&input);
    let output = format_result(&result, args.format, config.output.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        for (field, confidence) in result.confidence.iter() {
            let line = format!("{:<14} {:>5.1}%", field.as_str(), confidence * 100.0);
            if result.needs_review(field) {
                println!("{} {}", style("⚠").yellow(), line);
            } else {
                println!("{} {}", style("ℹ").blue(), line);
            }
        }
        println!(
            "{} Overall confidence: {:.1}%",
            style("ℹ").blue(),
            result.confidence.overall() * 100.0
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Load configuration from an explicit path, the default location, or defaults.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<IngresoConfig> {
    if let Some(path) = config_path {
        return Ok(IngresoConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        Ok(IngresoConfig::from_file(&default_path)?)
    } else {
        Ok(IngresoConfig::default())
    }
}

/// Build the parser from configuration, with an optional reference date override.
pub(crate) fn build_parser(
    config: &IngresoConfig,
    reference_date: Option<NaiveDate>,
) -> AdmissionFormParser {
    let parser = AdmissionFormParser::from_config(&config.extraction);
    match reference_date {
        Some(date) => parser.with_reference_date(date),
        None => parser,
    }
}

/// Read a recognizer JSON payload, or treat any other file as a plain transcript.
pub(crate) fn read_input(path: &Path) -> anyhow::Result<RecognizedText> {
    let content = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(RecognizedText::from_json(&content)?)
    } else {
        Ok(RecognizedText::from_text(content))
    }
}

pub(crate) fn format_result(
    result: &ParseResult,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ParseResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "name",
        "rut",
        "age",
        "prevision",
        "admission_date",
        "bed",
        "overall_confidence",
        "review",
        "missing_fields",
        "rut_canonical",
    ])?;

    let fields = &result.fields;
    wtr.write_record([
        fields.name.clone().unwrap_or_default(),
        fields.rut.clone().unwrap_or_default(),
        fields.age.map(|a| a.to_string()).unwrap_or_default(),
        fields.prevision.clone().unwrap_or_default(),
        fields.admission_date.clone().unwrap_or_default(),
        fields.bed.clone().unwrap_or_default(),
        format!("{:.2}", result.confidence.overall()),
        join_fields(result.warnings.iter().map(|w| w.field)),
        join_fields(result.missing_fields.iter().copied()),
        fields.rut.as_deref().map(format_rut).unwrap_or_default(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ParseResult) -> String {
    let mut output = String::new();

    output.push_str("Fields:\n");
    for field in Field::EXTRACTED {
        let value = result
            .fields
            .value(field)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!("  {:<14} {}\n", field.as_str(), value));
    }

    if !result.warnings.is_empty() {
        output.push_str("\nReview:\n");
        for warning in &result.warnings {
            output.push_str(&format!(
                "  {}: {} ({})\n",
                warning.field, warning.value, warning.message
            ));
        }
    }

    output.push_str(&format!(
        "\nManual entry: {}\n",
        join_fields(result.missing_fields.iter().copied())
    ));

    output
}

pub(crate) fn join_fields(fields: impl Iterator<Item = Field>) -> String {
    fields.map(|f| f.as_str()).collect::<Vec<_>>().join(";")
}
