use admission_tracker::admission::{
    calculate_position_with, parse_admission_list_with_diagnostics, ChanceBand, CompetitionRules,
    PositionResult, SkippedRow,
};
use admission_tracker::config::AppConfig;
use admission_tracker::error::AppError;
use clap::Args;
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct PositionArgs {
    /// Tab-separated admission list; use `-` to read from stdin
    #[arg(long)]
    pub(crate) list: PathBuf,
    /// Unique code of the applicant to rank
    #[arg(long)]
    pub(crate) participant: String,
    /// Number of budget seats in the program
    #[arg(long)]
    pub(crate) seats: u32,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct PositionReport {
    pub(crate) participant_id: String,
    pub(crate) budget_seats: u32,
    pub(crate) entries_parsed: usize,
    pub(crate) skipped_rows: Vec<SkippedRow>,
    pub(crate) position: Option<PositionResult>,
    pub(crate) band: Option<ChanceBand>,
}

pub(crate) fn run_position(args: PositionArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = read_list(&args.list)?;
    let report = build_report(
        &config.competition.rules(),
        &raw,
        &args.participant,
        args.seats,
    );

    if args.json {
        let rendered = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
        println!("{rendered}");
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

fn read_list(path: &Path) -> Result<String, AppError> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

pub(crate) fn build_report(
    rules: &CompetitionRules,
    raw: &str,
    participant_id: &str,
    budget_seats: u32,
) -> PositionReport {
    let parsed = parse_admission_list_with_diagnostics(raw);
    let position = calculate_position_with(rules, &parsed.entries, participant_id, budget_seats);

    PositionReport {
        participant_id: participant_id.to_string(),
        budget_seats,
        entries_parsed: parsed.entries.len(),
        skipped_rows: parsed.skipped,
        band: position.map(|result| result.band()),
        position,
    }
}

pub(crate) fn render_report(report: &PositionReport) -> String {
    let mut out = format!(
        "Rows parsed: {} ({} skipped)\n",
        report.entries_parsed,
        report.skipped_rows.len()
    );

    match (&report.position, report.band) {
        (Some(result), Some(band)) => {
            out.push_str(&format!(
                "Participant {}: general position {} / priority position {} of {} with consent ({} competing)\n",
                report.participant_id,
                result.general_position,
                result.priority_position,
                result.participants_with_consent,
                result.total_participants,
            ));
            out.push_str(&format!(
                "Admission chance for {} budget seats: {}% ({})\n",
                report.budget_seats,
                result.admission_chance,
                band.label()
            ));
        }
        _ => out.push_str(&format!(
            "Participant {} is not competing in this list\n",
            report.participant_id
        )),
    }

    for skipped in &report.skipped_rows {
        out.push_str(&format!(
            "  skipped line {}: {}\n",
            skipped.line,
            skipped.reason.summary()
        ));
    }
    out
}
