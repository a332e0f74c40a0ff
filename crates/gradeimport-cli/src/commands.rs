use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::Table;
use gradeimport_cli::config::{load_engine_config, load_registry, load_suggestion};
use gradeimport_cli::ingest::read_sheet;
use gradeimport_cli::logging::redact_value;
use gradeimport_import::{ImportOrchestrator, InMemoryStore, ProgressSink};
use gradeimport_map::ResolutionEngine;
use gradeimport_model::{
    EngineConfig, ExamContext, ImportProgress, ImportResult, ResolutionResult, UploadedSheet,
};
use gradeimport_standards::SchemaRegistry;
use gradeimport_validate::RowValidator;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span, trace};

use crate::cli::{Cli, ImportArgs, SheetArgs, ValidateArgs};
use crate::summary::{apply_table_style, header_cell};
use crate::types::{Imported, Validated};

/// Registry and configuration shared by every command.
pub struct Session {
    pub registry: SchemaRegistry,
    pub config: EngineConfig,
}

impl Session {
    pub fn load(cli: &Cli) -> Result<Self> {
        let registry = load_registry(cli.schema.as_deref()).context("load schema")?;
        let config = load_engine_config(cli.config.as_deref()).context("load configuration")?;
        Ok(Self { registry, config })
    }
}

pub fn run_fields(session: &Session) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Name"),
        header_cell("Importance"),
        header_cell("Kind"),
        header_cell("Patterns"),
    ]);
    apply_table_style(&mut table);
    for field in session.registry.fields() {
        table.add_row(vec![
            field.key.clone(),
            field.display_name.clone(),
            field.importance.to_string(),
            format!("{:?}", field.kind).to_lowercase(),
            field.patterns.join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_resolve(session: &Session, args: &SheetArgs) -> Result<ResolutionResult> {
    let sheet = read_sheet(&args.file)
        .with_context(|| format!("read {}", args.file.display()))?;
    resolve(session, &sheet, args)
}

fn resolve(session: &Session, sheet: &UploadedSheet, args: &SheetArgs) -> Result<ResolutionResult> {
    let suggestion = args
        .suggested_mapping
        .as_deref()
        .map(|path| load_suggestion(path, args.suggestion_confidence))
        .transpose()
        .context("load suggested mapping")?;
    let engine = ResolutionEngine::new(session.registry.clone());
    let resolution = engine
        .resolve_sheet(sheet, suggestion.as_ref())
        .with_context(|| format!("resolve {}", args.file.display()))?;
    Ok(resolution)
}

pub fn run_validate(session: &Session, args: &ValidateArgs) -> Result<Validated> {
    let sheet = read_sheet(&args.sheet.file)
        .with_context(|| format!("read {}", args.sheet.file.display()))?;
    validate(session, &sheet, args)
}

fn validate(session: &Session, sheet: &UploadedSheet, args: &ValidateArgs) -> Result<Validated> {
    let resolution = resolve(session, sheet, &args.sheet)?;

    let mut config = args
        .preset
        .map_or_else(|| session.config.validation.clone(), |preset| preset.config());
    if let Some(max_errors) = args.max_errors {
        config = config.with_max_errors(max_errors);
    }
    if args.skip_invalid {
        config = config.with_skip_invalid_rows(true);
    }

    let validator = RowValidator::new(session.registry.clone(), config)
        .context("validation options")?
        .with_custom_kinds(resolution.custom_kinds.clone());
    let report = validator.validate(&sheet.rows, &resolution.mapping);
    Ok(Validated { resolution, report })
}

pub fn run_import(session: &Session, args: &ImportArgs) -> Result<Imported> {
    let file = &args.validate.sheet.file;
    let span = info_span!("import_file", file = %file.display());
    let _guard = span.enter();

    let sheet = read_sheet(file).with_context(|| format!("read {}", file.display()))?;
    let Validated { resolution, report } = validate(session, &sheet, &args.validate)?;

    let store = Arc::new(InMemoryStore::new());
    if let Some(path) = &args.students {
        let known = seed_students(&store, path)?;
        info!(known, "students loaded");
    }

    let mut config = session.config.import.clone();
    if let Some(batch_size) = args.batch_size {
        config = config.with_batch_size(batch_size);
    }
    if let Some(max_concurrency) = args.parallel {
        config = config.with_parallel(max_concurrency);
    }
    if let Some(policy) = args.duplicates {
        config = config.with_duplicate_policy(policy.into());
    }
    if let Some(policy) = args.exam_merge {
        config = config.with_exam_merge_policy(policy.into());
    }
    if let Some(mode) = args.mode {
        config = config.with_import_mode(mode.into());
    }
    if args.no_create_students {
        config = config.with_create_missing_students(false);
    }
    if args.strict {
        config = config.with_strict_mode(true);
    }

    let mut exam = ExamContext::new(&args.exam_title, &args.exam_type, args.exam_date);
    exam.subject.clone_from(&args.subject);
    exam.grade_level.clone_from(&args.grade_level);

    let records = report.importable_records();
    for record in &records {
        trace!(
            row = record.row_index,
            name = redact_value(&record.text("name").unwrap_or_default()),
            student_id = redact_value(&record.text("student_id").unwrap_or_default()),
            "queued row"
        );
    }

    let bar = if args.validate.sheet.json {
        ProgressBar::hidden()
    } else {
        progress_bar(records.len() as u64)
    };
    let sink = BarSink { bar };

    let orchestrator = ImportOrchestrator::new(store.clone(), store, config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    let result = runtime
        .block_on(orchestrator.run(&records, &exam, &sink))
        .context("import options")?;

    Ok(Imported {
        resolution,
        report,
        result,
    })
}

/// Register the students of a roster CSV; returns how many were read.
fn seed_students(store: &InMemoryStore, path: &Path) -> Result<usize> {
    let roster = read_sheet(path).with_context(|| format!("read {}", path.display()))?;
    let mut count = 0;
    for row in &roster.rows {
        let text = |key: &str| {
            row.get(key)
                .filter(|value| !value.is_blank())
                .map(gradeimport_model::CellValue::to_display_string)
        };
        let Some(name) = text("name") else {
            continue;
        };
        store.add_student(
            text("student_id").as_deref(),
            &name,
            text("class_name").as_deref(),
        );
        count += 1;
    }
    Ok(count)
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} rows ({msg})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// Mirrors import progress on a terminal progress bar.
struct BarSink {
    bar: ProgressBar,
}

impl ProgressSink for BarSink {
    fn on_progress(&self, progress: &ImportProgress) {
        self.bar.set_length(progress.total as u64);
        self.bar.set_position(progress.processed as u64);
        self.bar.set_message(format!(
            "batch {}/{}, {}",
            progress.current_batch, progress.total_batches, progress.status
        ));
    }

    fn on_complete(&self, _result: &ImportResult) {
        self.bar.finish_and_clear();
    }
}
