use crate::infra::{parse_date, InMemoryTrackerRepository};
use admission_tracker::admission::{
    AdmissionTrackerService, ChanceBand, CompetitionRules, ImportOutcome, NewProgram,
    NewUniversity, COMPETING_STATUS, NO_CONSENT_MARKER,
};
use admission_tracker::error::AppError;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use std::sync::Arc;

const DEFAULT_PARTICIPANT: &str = "157-204-118 42";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Budget seats in the sample program
    #[arg(long, default_value_t = 4)]
    pub(crate) seats: u32,
    /// Participant to track through the sample lists
    #[arg(long, default_value = DEFAULT_PARTICIPANT)]
    pub(crate) participant: String,
    /// Date of the first import (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
}

struct SampleApplicant {
    id: &'static str,
    priority: u32,
    total: u32,
}

const APPLICANTS: [SampleApplicant; 8] = [
    SampleApplicant { id: "129-774-310 05", priority: 1, total: 297 },
    SampleApplicant { id: "140-218-903 61", priority: 2, total: 291 },
    SampleApplicant { id: "133-602-457 12", priority: 1, total: 286 },
    SampleApplicant { id: "118-390-245 77", priority: 3, total: 281 },
    SampleApplicant { id: DEFAULT_PARTICIPANT, priority: 1, total: 276 },
    SampleApplicant { id: "161-027-884 30", priority: 2, total: 270 },
    SampleApplicant { id: "152-443-119 08", priority: 1, total: 262 },
    SampleApplicant { id: "147-935-662 19", priority: 4, total: 255 },
];

/// Builds a pasted list; `consenting` decides who has filed the original.
fn sample_list(consenting: impl Fn(usize) -> bool) -> String {
    let mut lines = vec![
        "No\tPriority\tConsent\tTotal\tExam\tAchievements\tStatus\tParticipant\tSelection date"
            .to_string(),
    ];
    for (index, applicant) in APPLICANTS.iter().enumerate() {
        let consent = if consenting(index) { "Yes" } else { NO_CONSENT_MARKER };
        lines.push(format!(
            "{order}\t{priority}\t{consent}\t{total}\t{exam}\t5\t{COMPETING_STATUS}\t{id}\t",
            order = index + 1,
            priority = applicant.priority,
            total = applicant.total,
            exam = applicant.total - 5,
            id = applicant.id,
        ));
    }
    lines.join("\n")
}

fn at_noon(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(12, 0, 0)
        .unwrap_or_else(|| date.and_time(NaiveTime::default()))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seats,
        participant,
        start,
    } = args;
    let start = start.unwrap_or_else(|| Local::now().date_naive());

    let repository = Arc::new(InMemoryTrackerRepository::default());
    let service = AdmissionTrackerService::new(repository, CompetitionRules::default());

    let university = service.register_university(NewUniversity {
        name: "Northern State University".to_string(),
        url: Some("https://abit.example.edu".to_string()),
    })?;
    let program = service.register_program(NewProgram {
        university_id: university.id.clone(),
        name: "Computer Science".to_string(),
        budget_seats: seats,
        participant_id: participant.clone(),
    })?;

    println!("Admission tracker demo");
    println!(
        "Tracking {} at {} / {} ({} budget seats)",
        program.participant_id, university.name, program.name, program.budget_seats
    );

    // Day one: half of the applicants have filed consent.
    let first = service.import_list(
        &program.id,
        &sample_list(|index| index % 2 == 0),
        at_noon(start),
    )?;
    render_import(start, &first);

    // Day two: two higher-ranked applicants still have not.
    let second_day = start.succ_opt().unwrap_or(start);
    let second = service.import_list(
        &program.id,
        &sample_list(|index| index != 1 && index != 3),
        at_noon(second_day),
    )?;
    render_import(second_day, &second);

    println!("\nHistory for {}:", program.id);
    for snapshot in service.history(&program.id)? {
        println!(
            "  {}  general #{}  priority #{}  chance {}% ({})",
            snapshot.recorded_on,
            snapshot.result.general_position,
            snapshot.result.priority_position,
            snapshot.result.admission_chance,
            snapshot.band.label()
        );
    }
    match service.chance_change(&program.id)? {
        Some(change) => println!("Change vs last update: {change:+} pp"),
        None => println!("Change vs last update: n/a"),
    }

    let summary = service.portfolio_summary()?;
    println!(
        "\nPortfolio: {} program(s), {} tracked, average chance {:.1}%",
        summary.programs, summary.tracked, summary.average_chance
    );
    for band in ChanceBand::ordered() {
        println!("  {:<6} {}", band.label(), summary.count_for(band));
    }

    Ok(())
}

fn render_import(date: NaiveDate, outcome: &ImportOutcome) {
    println!(
        "\nImport {date}: {} rows parsed, {} skipped",
        outcome.entries_parsed,
        outcome.skipped.len()
    );
    match (outcome.position, outcome.band) {
        (Some(result), Some(band)) => println!(
            "  general #{} / priority #{} among {} with consent ({} competing), chance {}% ({})",
            result.general_position,
            result.priority_position,
            result.participants_with_consent,
            result.total_participants,
            result.admission_chance,
            band.label()
        ),
        _ => println!("  participant not found among competing applicants"),
    }
}
