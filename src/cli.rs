use crate::infra::build_matching_service;
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use talent_match::config::AppConfig;
use talent_match::error::AppError;
use talent_match::matching::{
    BrowseFilters, BrowseSort, CandidateId, JobId, LocationType, Match, RankedMatch,
};

#[derive(Parser, Debug)]
#[command(
    name = "Talent Match",
    about = "Score, rank, and browse candidate/job matches from the command line",
    version
)]
struct Cli {
    /// JSON seed file backing the skill, profile, and job providers
    #[arg(long, global = true)]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Recalculate and print the strict ranking for a job
    Rank(RankArgs),
    /// Print every active job scored for a candidate
    Browse(BrowseArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
struct RankArgs {
    /// Job to rank candidates for
    #[arg(long)]
    job: String,
}

#[derive(Args, Debug)]
struct BrowseArgs {
    /// Candidate whose job matches are listed
    #[arg(long)]
    candidate: String,
    /// Only list remote, hybrid, or onsite postings
    #[arg(long, value_parser = parse_location_type)]
    location_type: Option<LocationType>,
    /// Hide jobs the candidate does not fully qualify for
    #[arg(long)]
    qualified_only: bool,
    /// Hide jobs scoring below this value
    #[arg(long)]
    min_score: Option<f64>,
    /// Order by `score` (default) or `recent`
    #[arg(long, value_parser = parse_sort, default_value = "score")]
    sort: BrowseSort,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let seed = cli.seed;
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args, seed).await,
        Command::Rank(args) => run_rank(args, seed).await,
        Command::Browse(args) => run_browse(args, seed).await,
    }
}

fn parse_location_type(raw: &str) -> Result<LocationType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "remote" => Ok(LocationType::Remote),
        "hybrid" => Ok(LocationType::Hybrid),
        "onsite" | "on-site" => Ok(LocationType::Onsite),
        other => Err(format!(
            "unknown location type '{other}' (expected remote, hybrid, or onsite)"
        )),
    }
}

fn parse_sort(raw: &str) -> Result<BrowseSort, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "score" => Ok(BrowseSort::Score),
        "recent" => Ok(BrowseSort::Recent),
        other => Err(format!("unknown sort '{other}' (expected score or recent)")),
    }
}

async fn run_rank(args: RankArgs, seed: Option<PathBuf>) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_matching_service(&config.matching, seed.as_deref())?;
    let job_id = JobId::new(args.job);

    let outcome = service.calculate_job_matches(&job_id).await?;
    let matches = service.get_job_candidates(&job_id)?;

    println!("Ranking for {job_id}");
    println!(
        "  {} ranked, {} skipped, {} retained unranked",
        outcome.match_count, outcome.skipped_count, outcome.retained_count
    );
    for record in &matches {
        println!("{}", render_match(record));
    }
    Ok(())
}

async fn run_browse(args: BrowseArgs, seed: Option<PathBuf>) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_matching_service(&config.matching, seed.as_deref())?;
    let candidate_id = CandidateId::new(args.candidate);
    let filters = BrowseFilters {
        location_type: args.location_type,
        qualified_only: args.qualified_only,
        min_score: args.min_score,
        sort: args.sort,
    };

    let results = service
        .browse_jobs_for_candidate(&candidate_id, &filters)
        .await?;

    println!("Jobs for {candidate_id} ({} shown)", results.len());
    for entry in &results {
        println!("{}", render_browse_entry(entry));
    }
    Ok(())
}

fn render_match(record: &Match) -> String {
    let rank = record
        .rank
        .map_or_else(|| "-".to_string(), |rank| format!("#{rank}"));
    format!(
        "  {rank:>4} {:<12} score {:>6.2}  required {}/{}  status {}",
        record.candidate_id.as_str(),
        record.overall_score,
        record.score.required_skills_met,
        record.score.total_required_skills,
        record.status.label()
    )
}

fn render_browse_entry(entry: &RankedMatch) -> String {
    let missing: Vec<&str> = entry
        .score
        .skill_breakdown
        .missing_required()
        .map(|skill| skill.skill_name.as_str())
        .collect();
    let qualification = if entry.score.qualified {
        "qualified".to_string()
    } else {
        format!("missing {}", missing.join(", "))
    };
    format!(
        "  {:<14} {:<28} {:<7} score {:>6.2}  {qualification}",
        entry.score.job_id.as_str(),
        entry.job.title,
        entry.job.location_type.label(),
        entry.score.overall_score
    )
}
