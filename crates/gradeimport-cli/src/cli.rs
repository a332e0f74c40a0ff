//! Command line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use gradeimport_model::{DuplicatePolicy, ExamMergePolicy, ImportMode, ValidationConfig};

#[derive(Parser)]
#[command(
    name = "gradeimport",
    version,
    about = "Map, validate and import exam score sheets",
    long_about = "Map, validate and import exam score sheets.\n\n\
                  Column headers are matched to the exam schema through a fallback \
                  ladder that always yields a usable mapping. Imports run against an \
                  in-process store, which makes every command a safe preview."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow student names and ids in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Engine configuration JSON ({ "validation": ..., "import": ... }).
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Replace the built-in exam schema with a JSON field list.
    #[arg(long = "schema", value_name = "FILE", global = true)]
    pub schema: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the schema fields headers can map to.
    Fields,

    /// Resolve the column mapping of a CSV sheet.
    Resolve(SheetArgs),

    /// Resolve and validate a CSV sheet.
    Validate(ValidateArgs),

    /// Resolve, validate and import a CSV sheet.
    Import(ImportArgs),
}

#[derive(Args)]
pub struct SheetArgs {
    /// CSV file with a header row.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Suggested mapping JSON ({ "field_mappings": {...}, "confidence": 0.9 }).
    #[arg(long = "suggested-mapping", value_name = "FILE")]
    pub suggested_mapping: Option<PathBuf>,

    /// Confidence of the suggested mapping (overrides the file).
    #[arg(long = "suggestion-confidence", value_name = "0..1", requires = "suggested_mapping")]
    pub suggestion_confidence: Option<f64>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    /// Validation preset (replaces the configured validation options).
    #[arg(long = "preset", value_enum)]
    pub preset: Option<PresetArg>,

    /// Stop after this many errors (0 = unlimited).
    #[arg(long = "max-errors", value_name = "N")]
    pub max_errors: Option<usize>,

    /// Leave rows with errors out of the import.
    #[arg(long = "skip-invalid")]
    pub skip_invalid: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub validate: ValidateArgs,

    #[arg(long = "exam-title", value_name = "TITLE")]
    pub exam_title: String,

    #[arg(long = "exam-type", value_name = "TYPE", default_value = "regular")]
    pub exam_type: String,

    /// Exam date (YYYY-MM-DD).
    #[arg(long = "exam-date", value_name = "DATE")]
    pub exam_date: NaiveDate,

    #[arg(long = "subject")]
    pub subject: Option<String>,

    #[arg(long = "grade-level")]
    pub grade_level: Option<String>,

    /// Known students CSV (student_id, name, class_name) to match rows against.
    #[arg(long = "students", value_name = "FILE")]
    pub students: Option<PathBuf>,

    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Import the rows of each batch concurrently, N at a time.
    #[arg(long = "parallel", value_name = "N")]
    pub parallel: Option<usize>,

    #[arg(long = "duplicates", value_enum)]
    pub duplicates: Option<DuplicateArg>,

    /// How an incoming exam is merged into a stored one with the same key.
    #[arg(long = "exam-merge", value_enum)]
    pub exam_merge: Option<ExamMergeArg>,

    /// Force the import mode instead of detecting it.
    #[arg(long = "mode", value_enum)]
    pub mode: Option<ModeArg>,

    /// Skip rows of unknown students instead of creating them.
    #[arg(long = "no-create-students")]
    pub no_create_students: bool,

    /// Stop the import at the first failed row.
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    Default,
    Lenient,
    Strict,
}

impl PresetArg {
    pub fn config(self) -> ValidationConfig {
        match self {
            PresetArg::Default => ValidationConfig::default(),
            PresetArg::Lenient => ValidationConfig::lenient(),
            PresetArg::Strict => ValidationConfig::strict(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DuplicateArg {
    Skip,
    Update,
    Reject,
}

impl From<DuplicateArg> for DuplicatePolicy {
    fn from(arg: DuplicateArg) -> Self {
        match arg {
            DuplicateArg::Skip => DuplicatePolicy::Skip,
            DuplicateArg::Update => DuplicatePolicy::Update,
            DuplicateArg::Reject => DuplicatePolicy::Reject,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExamMergeArg {
    Reuse,
    PreferExisting,
    PreferIncoming,
}

impl From<ExamMergeArg> for ExamMergePolicy {
    fn from(arg: ExamMergeArg) -> Self {
        match arg {
            ExamMergeArg::Reuse => ExamMergePolicy::ReuseExisting,
            ExamMergeArg::PreferExisting => ExamMergePolicy::MergePreferExisting,
            ExamMergeArg::PreferIncoming => ExamMergePolicy::MergePreferIncoming,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Full,
    GradesOnly,
}

impl From<ModeArg> for ImportMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Full => ImportMode::Full,
            ModeArg::GradesOnly => ImportMode::GradesOnly,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
