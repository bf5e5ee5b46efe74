use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pronounce_rs::alignment::report::{build_report, compute_case_report, CaseReport};
use pronounce_rs::{AssessmentConfig, Assessor, AssessorBuilder, LexiconPhonemizer};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[path = "assessment_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "assessment_report")]
#[command(about = "Score recognized phoneme transcriptions against reference phrases")]
struct Args {
    #[arg(
        long,
        env = "PRONOUNCE_REPORT_CASES",
        default_value = "test-data/assessments/cases.json"
    )]
    cases: PathBuf,
    #[arg(
        long,
        env = "PRONOUNCE_REPORT_LEXICON",
        default_value = "test-data/assessments/lexicon.json"
    )]
    lexicon: PathBuf,
    #[arg(long, env = "PRONOUNCE_REPORT_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "PRONOUNCE_REPORT_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "PRONOUNCE_REPORT_LIMIT")]
    limit: Option<usize>,
    #[arg(long, env = "PRONOUNCE_REPORT_OFFSET", default_value_t = 0)]
    offset: usize,
}

/// One fixture row. Extra keys (expectations used by the test harness) are ignored.
#[derive(Debug, Clone, Deserialize)]
struct Case {
    id: String,
    text: String,
    #[serde(default)]
    tokens: Vec<String>,
    #[serde(default)]
    language: Option<String>,
    detected: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let cases_path = resolve_path(&repo_root, &args.cases);
    let lexicon_path = resolve_path(&repo_root, &args.lexicon);
    require_path_exists(&cases_path, "Missing assessment cases file.")?;
    require_path_exists(&lexicon_path, "Missing lexicon file.")?;
    let out_path = resolve_out_path(&repo_root, args.out.as_ref());

    let config = match args.config.as_ref() {
        Some(path) => AssessmentConfig::load(&resolve_path(&repo_root, path))
            .map_err(|err| format!("Failed to load config: {err}"))?,
        None => AssessmentConfig::default(),
    };

    let mut cases = load_cases(&cases_path)?;
    if args.offset > 0 {
        cases = cases.into_iter().skip(args.offset).collect();
    }
    if let Some(limit) = args.limit {
        cases.truncate(limit);
    }
    if cases.is_empty() {
        return Err("No cases selected after applying offset/limit.".to_string());
    }

    let assessor = build_assessor(config, &lexicon_path)?;

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let started = Instant::now();
    let mut case_reports: Vec<CaseReport> = Vec::with_capacity(cases.len());
    for case in &cases {
        progress.set_message(case.id.clone());
        case_reports.push(assess_case(&assessor, case));
        progress.inc(1);
    }
    progress.finish_with_message("assessment pass complete");
    let elapsed = started.elapsed();

    let config = assessor.config();
    let report = build_report(
        Utc::now().to_rfc3339(),
        config.thresholds.clone(),
        config.similarity_weight,
        case_reports,
    );
    json_report_formatter::write_report(&out_path, &report)?;

    println!("{}", json_report_formatter::summary_line(&report));
    println!(
        "elapsed: {:.2}ms ({:.3}ms per case)",
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_secs_f64() * 1000.0 / report.meta.case_count as f64
    );
    println!("{}", out_path.display());
    Ok(())
}

fn assess_case(assessor: &Assessor, case: &Case) -> CaseReport {
    let language = case
        .language
        .as_deref()
        .unwrap_or(&assessor.config().default_language);
    let outcome = assessor.assess_transcription(&case.text, &case.tokens, &case.detected, language);
    if let Err(err) = &outcome {
        tracing::warn!(case = case.id.as_str(), error = %err, "case failed");
    }
    compute_case_report(&case.id, &case.text, language, outcome)
}

fn build_assessor(config: AssessmentConfig, lexicon_path: &Path) -> Result<Assessor, String> {
    let lexicon = LexiconPhonemizer::from_json_file(lexicon_path)
        .map_err(|err| format!("Failed to load lexicon: {err}"))?;
    tracing::info!(entries = lexicon.len(), "lexicon loaded");
    AssessorBuilder::new(config)
        .with_text_to_phonemes(Box::new(lexicon))
        .build()
        .map_err(|err| format!("Failed to build Assessor: {err}"))
}

fn load_cases(path: &Path) -> Result<Vec<Case>, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read cases '{}': {err}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse cases '{}': {err}", path.display()))
}

fn resolve_out_path(repo_root: &Path, out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return resolve_path(repo_root, path);
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    repo_root
        .join("target")
        .join("assessment_reports")
        .join(format!("assessment-report-{run_id}.json"))
}

fn resolve_path(repo_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}

fn require_path_exists(path: &Path, message: &str) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    Err(format!("{message} Missing path: {}", path.display()))
}
