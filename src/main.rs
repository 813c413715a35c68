use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use u_trackplan::{
    analyze_plan, analyze_xml, merge_plans, rewrite_dates, ArtifactKind, EngineConfig, PlanOptions,
    SkippedLine, XmlRequest,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ground-station track plan analysis CLI", long_about = None)]
struct Cli {
    /// Engine configuration (JSON); defaults apply to missing fields
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Print the report as JSON instead of the text summary
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a vendor XML schedule and generate a single-gateway plan
    Xml(XmlArgs),
    /// Analyze a plan file, optionally re-dating it first
    Plan(PlanArgs),
    /// Merge a single-gateway plan into an existing plan
    Merge(MergeArgs),
    /// Re-date a plan onto a new deploy date and time
    Rewrite(RewriteArgs),
}

#[derive(Parser, Debug)]
struct XmlArgs {
    /// Vendor XML schedule
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Gateway the schedule belongs to (e.g. GS_NORTH)
    #[arg(long)]
    gateway: String,

    /// Deploy date (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, value_parser = parse_date)]
    deploy_date: NaiveDate,

    /// Deploy time (HH:MM or HH:MM:SS)
    #[arg(long, value_parser = parse_time, default_value = "00:00:00")]
    deploy_time: NaiveTime,

    /// Generated plan path
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Plan file
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Re-date the plan onto this date before analysis
    #[arg(long, value_parser = parse_date, requires = "rewrite_time")]
    rewrite_date: Option<NaiveDate>,

    /// Deploy time written by the rewrite
    #[arg(long, value_parser = parse_time, requires = "rewrite_date")]
    rewrite_time: Option<NaiveTime>,

    /// Rewritten plan path (only with --rewrite-date)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Existing multi-gateway plan
    #[arg(value_hint = ValueHint::FilePath)]
    old: PathBuf,

    /// New single-gateway plan
    #[arg(value_hint = ValueHint::FilePath)]
    new: PathBuf,

    /// Merged plan path
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RewriteArgs {
    /// Plan file
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// New deploy date (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, value_parser = parse_date)]
    date: NaiveDate,

    /// New deploy time (HH:MM or HH:MM:SS)
    #[arg(long, value_parser = parse_time)]
    time: NaiveTime,

    /// Rewritten plan path
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .map_err(|_| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| format!("invalid time '{value}', expected HH:MM[:SS]"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Xml(args) => handle_xml(args, &config, cli.json),
        Command::Plan(args) => handle_plan(args, &config, cli.json),
        Command::Merge(args) => handle_merge(args, &config, cli.json),
        Command::Rewrite(args) => handle_rewrite(args, &config, cli.json),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = EngineConfig::from_json_str(&text)
        .with_context(|| format!("loading config {}", path.display()))?;
    info!(path = %path.display(), "loaded engine config");
    Ok(config)
}

fn read_input(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(decode_input(&bytes))
}

/// Invalid UTF-8 sequences become U+FFFD; the affected lines then fail
/// per-line parsing instead of rejecting the whole file.
fn decode_input(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn write_output(path: Option<PathBuf>, kind: ArtifactKind, content: &str) -> Result<PathBuf> {
    let path = path.unwrap_or_else(|| PathBuf::from(kind.file_name()));
    fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), bytes = content.len(), "wrote {kind}");
    Ok(path)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).context("writing JSON report")?;
    writeln!(handle)?;
    Ok(())
}

/// The library logs each skipped line; the text report only counts them.
fn report_skipped(skipped: &[SkippedLine], json: bool) {
    if !json && !skipped.is_empty() {
        println!("{} line(s) not used as tracks", skipped.len());
    }
}

fn handle_xml(args: XmlArgs, config: &EngineConfig, json: bool) -> Result<()> {
    let content = read_input(&args.input)?;
    let request = XmlRequest::new(args.gateway, args.deploy_date, args.deploy_time);
    let report = analyze_xml(&content, &request, config)
        .with_context(|| format!("analyzing {}", args.input.display()))?;

    write_output(args.output, ArtifactKind::GeneratedPlan, &report.plan_text)?;
    if json {
        print_json(&report)
    } else {
        println!("{}", report.summary);
        Ok(())
    }
}

fn handle_plan(args: PlanArgs, config: &EngineConfig, json: bool) -> Result<()> {
    let content = read_input(&args.input)?;
    let options = match (args.rewrite_date, args.rewrite_time) {
        (Some(date), Some(time)) => PlanOptions::default().with_rewrite(date, time),
        (None, None) => PlanOptions::default(),
        _ => return Err(anyhow!("--rewrite-date and --rewrite-time go together")),
    };
    let report = analyze_plan(&content, &options, config)
        .with_context(|| format!("analyzing {}", args.input.display()))?;
    report_skipped(&report.skipped, json);

    if let Some(rewritten) = &report.rewritten {
        write_output(args.output, ArtifactKind::RewrittenPlan, &rewritten.content)?;
    } else if args.output.is_some() {
        warn!("--output ignored without --rewrite-date");
    }
    if json {
        print_json(&report)
    } else {
        println!("{}", report.summary);
        Ok(())
    }
}

fn handle_merge(args: MergeArgs, config: &EngineConfig, json: bool) -> Result<()> {
    let old = read_input(&args.old)?;
    let new = read_input(&args.new)?;
    let outcome = merge_plans(&old, &new, config).context("merging plans")?;
    report_skipped(&outcome.skipped, json);

    let path = write_output(args.output, ArtifactKind::MergedPlan, &outcome.content)?;
    if json {
        print_json(&outcome)
    } else {
        let action = if outcome.replaced_existing { "replaced" } else { "added" };
        println!("Gateway {} {action}; merged plan written to {}", outcome.gateway, path.display());
        Ok(())
    }
}

fn handle_rewrite(args: RewriteArgs, config: &EngineConfig, json: bool) -> Result<()> {
    let content = read_input(&args.input)?;
    let outcome = rewrite_dates(&content, args.date, args.time, config)
        .with_context(|| format!("rewriting {}", args.input.display()))?;
    report_skipped(&outcome.skipped, json);

    let path = write_output(args.output, ArtifactKind::RewrittenPlan, &outcome.content)?;
    if json {
        print_json(&outcome)
    } else {
        println!(
            "Rewrote {} tracks (epoch {}); plan written to {}",
            outcome.rewritten,
            outcome.epoch_ms,
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_input_replaces_invalid_utf8() {
        let mut bytes = b"1\n20240315000000.000\nGS_A\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"S1 DAT RECUR 20240315100000.000 20240315103000.000\n");

        let text = decode_input(&bytes);
        assert!(text.contains('\u{FFFD}'));

        let report = analyze_plan(&text, &PlanOptions::default(), &EngineConfig::default()).unwrap();
        assert_eq!(report.tracks.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line_number, 4);
    }

    #[test]
    fn test_decode_input_keeps_valid_text() {
        assert_eq!(decode_input("GS_A\n".as_bytes()), "GS_A\n");
    }
}
