//! CivicSense CLI - civic issue reporting and triage.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use civic_core::{Category, Config, Registry, Report, ReportId, Role, Status, Urgency};
use civic_dashboard::{
    analyze_report, assign_field_worker, category_distribution, clear_all, default_file_name, export_csv,
    export_csv_file, kpis, load_and_route, monthly_trends, seed_samples, status_distribution,
    update_status, ReportFilter,
};
use civic_intake::{MediaFile, ReportDraft, ReverseGeocoder};
use civic_storage::{JsonStorage, ReportStore, SessionStore};
use civic_triage::{build_hotspots_with, collect_groups, DuplicateDetector, RoutingEngine};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "civic")]
#[command(about = "Civic issue reporting, routing and duplicate detection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides the configuration)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new report
    Submit {
        /// Short title
        title: String,
        /// Full description
        description: String,
        /// Category key (roadInfrastructure, waterSanitation, ...)
        #[arg(long)]
        category: String,
        /// Latitude of the issue
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the issue
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Address; looked up from the coordinates when omitted
        #[arg(long)]
        address: Option<String>,
        /// Photo file (repeatable, at least one)
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
        /// Video file (repeatable)
        #[arg(long = "video")]
        videos: Vec<PathBuf>,
        /// Override the detected urgency
        #[arg(long)]
        urgency: Option<String>,
    },
    /// Show a report and its timeline
    Track {
        /// Report ID
        id: String,
    },
    /// Move a report to its next status
    Advance {
        /// Report ID
        id: String,
    },
    /// Rate a resolved report
    Rate {
        /// Report ID
        id: String,
        /// Stars, 1-5
        rating: u8,
        /// Optional feedback
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Log in with a mobile number
    Login {
        /// Ten-digit mobile number
        phone: String,
        /// Request the admin role
        #[arg(long)]
        admin: bool,
    },
    /// Log out
    Logout,
    /// Load reports and auto-route any without a department
    Dashboard {
        /// Do not create sample reports on first use
        #[arg(long)]
        no_samples: bool,
    },
    /// Set a report's status (forward only)
    Status {
        /// Report ID
        id: String,
        /// submitted, acknowledged, in-progress or resolved
        status: String,
    },
    /// Assign a field worker to a report
    Assign {
        /// Report ID
        id: String,
        /// Staff ID the worker reports to
        staff: String,
        /// Field worker ID
        worker: String,
    },
    /// Run urgency analysis on a report's photos and description
    Analyze {
        /// Report ID
        id: String,
    },
    /// List duplicate groups
    Duplicates,
    /// List location hotspots
    Hotspots,
    /// Show KPIs and distributions
    Stats,
    /// Search and filter reports
    Search {
        /// Text to find in title, id or address
        term: Option<String>,
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
        /// Filter by category key
        #[arg(long)]
        category: Option<String>,
    },
    /// Export reports as CSV
    Export {
        /// Output file (defaults to civic-reports-<date>.csv)
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,
        /// Write to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },
    /// Create the sample reports if none exist
    Seed,
    /// Delete every report
    Clear,
}

impl Commands {
    fn requires_admin(&self) -> bool {
        !matches!(
            self,
            Commands::Submit { .. }
                | Commands::Track { .. }
                | Commands::Advance { .. }
                | Commands::Rate { .. }
                | Commands::Login { .. }
                | Commands::Logout
        )
    }
}

async fn require_admin(sessions: &SessionStore<JsonStorage>) -> Result<()> {
    match civic_intake::current_session(sessions).await {
        Some(session) if session.is_admin() => Ok(()),
        Some(_) => bail!("This command needs an admin session"),
        None => bail!("Not logged in. Run `civic login <phone> --admin` first"),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let registry = config.registry()?;

    let storage = JsonStorage::new(&config.data_dir).await?;
    let mut reports = ReportStore::new(storage.clone());
    let mut sessions = SessionStore::new(storage);

    if cli.command.requires_admin() {
        require_admin(&sessions).await?;
    }
    let engine = RoutingEngine::new(&registry, &config.routing);
    let detector = DuplicateDetector::new(config.duplicates.clone());

    match cli.command {
        Commands::Submit { title, description, category, lat, lng, address, photos, videos, urgency } => {
            let mut draft = ReportDraft::new(title, description, Category::from(category))
                .with_location(lat, lng);
            for photo in &photos {
                draft = draft.with_photo(media_file(photo));
            }
            for video in &videos {
                draft = draft.with_video(media_file(video));
            }
            if let Some(urgency) = urgency {
                draft = draft.with_urgency(urgency.parse::<Urgency>()?);
            }
            draft.validate()?;
            draft.address = match address {
                Some(address) => address,
                None => ReverseGeocoder::new(config.geocoder.clone()).reverse(lat, lng).await,
            };

            let report = civic_intake::submit(&mut reports, draft, Utc::now()).await?;
            println!("Submitted report {}", report.id);
            println!("  Urgency: {}", report.urgency);
            println!("  Address: {}", report.address);
            println!("Track it with: civic track {}", report.id);
        }
        Commands::Track { id } => match civic_intake::track(&reports, &id).await {
            Some(report) => print_report(&report),
            None => println!("Report not found. Please check the ID and try again."),
        },
        Commands::Advance { id } => {
            let report = civic_intake::advance(&mut reports, &ReportId::from(id), Utc::now()).await?;
            println!("{} is now {}", report.id, report.status.label());
        }
        Commands::Rate { id, rating, feedback } => {
            let report = civic_intake::rate(&mut reports, &ReportId::from(id), rating, feedback).await?;
            println!("Thank you for your feedback! {} rated {}/5", report.id, rating);
        }
        Commands::Login { phone, admin } => {
            let requested = if admin { Role::Admin } else { Role::User };
            let session = civic_intake::login(&mut sessions, &phone, requested, &config.admin_phone, Utc::now()).await?;
            println!("Logged in as {} ({})", session.identifier, session.role);
        }
        Commands::Logout => {
            civic_intake::logout(&mut sessions).await?;
            println!("Logged out");
        }
        Commands::Dashboard { no_samples } => {
            if !no_samples {
                if let Some(seeded) = seed_samples(&mut reports, &engine, Local::now()).await? {
                    info!("Created {} sample reports", seeded.reports.len());
                }
            }
            let outcome = load_and_route(&mut reports, &engine, Local::now()).await?;
            for id in &outcome.unrouted {
                warn!("Could not route {}", id);
            }

            let k = kpis(&outcome.reports);
            println!(
                "Reports: {} total, {} pending, {} in progress, {} resolved ({} routed now)",
                k.total, k.pending, k.in_progress, k.resolved, outcome.routed
            );
            let annotated = detector.detect(&outcome.reports);
            for report in &annotated {
                print_row(report, &registry);
            }
        }
        Commands::Status { id, status } => {
            let status: Status = status.parse()?;
            let report = update_status(&mut reports, &ReportId::from(id), status, Utc::now()).await?;
            println!("{} is now {}", report.id, report.status.label());
        }
        Commands::Assign { id, staff, worker } => {
            let (report, next) =
                assign_field_worker(&mut reports, &registry, &ReportId::from(id), &staff, &worker, Utc::now()).await?;
            println!("{} assigned to {}", report.id, worker);
            if let Some(fw) = next.field_worker(&worker) {
                println!("  {} ({}) is now {:?}", fw.name, fw.location, fw.availability);
            }
        }
        Commands::Analyze { id } => {
            let report = analyze_report(&mut reports, &ReportId::from(id), &config.routing, Local::now()).await?;
            if let Some(analysis) = &report.urgency_analysis {
                println!("Detected urgency: {}", analysis.detected_urgency);
                println!("  Confidence: {:.0}%", analysis.confidence * 100.0);
                println!("  Reasoning: {}", analysis.reasoning);
                if let Some(photo) = &analysis.photo_analysis {
                    println!("  Visual assessment: {}", photo);
                }
            }
        }
        Commands::Duplicates => {
            let all = reports.load_all().await;
            let groups = collect_groups(&detector.detect(&all));
            if groups.is_empty() {
                println!("No duplicate reports detected.");
            }
            for group in groups {
                println!("{} ({} reports)", group.group_id, group.reports.len());
                println!("  Main: {} - {}", group.main_report.id, group.main_report.title);
                for dup in group.reports.iter().filter(|r| r.is_duplicate) {
                    println!("  Duplicate: {} - {} ({})", dup.id, dup.title, dup.submitted_at.format("%Y-%m-%d %H:%M"));
                }
            }
        }
        Commands::Hotspots => {
            let all = reports.load_all().await;
            let hotspots = build_hotspots_with(&detector, &all);
            if hotspots.is_empty() {
                println!("No hotspots detected.");
            }
            for hotspot in hotspots {
                println!(
                    "{} | {} | {} reports | {} | {} | {} duplicate groups",
                    hotspot.id,
                    hotspot.location,
                    hotspot.report_count,
                    hotspot.urgency_level,
                    hotspot.category.label(),
                    hotspot.duplicate_groups.len(),
                );
            }
        }
        Commands::Stats => {
            let all = reports.load_all().await;
            let k = kpis(&all);
            println!("Total: {}  Resolved: {}  In progress: {}  Pending: {}", k.total, k.resolved, k.in_progress, k.pending);

            println!("By category:");
            for c in category_distribution(&all) {
                println!(
                    "  {}: {} ({} pending, {} in progress, {} resolved)",
                    c.category.label(),
                    c.count,
                    c.pending,
                    c.in_progress,
                    c.resolved
                );
            }
            println!("By status:");
            for s in status_distribution(&all) {
                println!("  {}: {}", s.status.label(), s.count);
            }
            println!("By month:");
            for m in monthly_trends(&all) {
                println!("  {}: {} reports, {} resolved", m.month, m.reports, m.resolved);
            }
        }
        Commands::Search { term, status, category } => {
            let filter = ReportFilter {
                search: term,
                status: status.map(|s| s.parse::<Status>()).transpose()?,
                category: category.map(Category::from),
            };
            let all = reports.load_all().await;
            let hits = filter.apply(&all);
            println!("Reports ({})", hits.len());
            for report in &hits {
                print_row(report, &registry);
            }
        }
        Commands::Export { output, stdout } => {
            let all = reports.load_all().await;
            if all.is_empty() {
                bail!("No reports to export");
            }
            if stdout {
                export_csv(&all, std::io::stdout().lock())?;
            } else {
                let path = output.unwrap_or_else(|| PathBuf::from(default_file_name(Local::now().date_naive())));
                export_csv_file(&all, &path)?;
                println!("Exported {} reports to {}", all.len(), path.display());
            }
        }
        Commands::Seed => match seed_samples(&mut reports, &engine, Local::now()).await? {
            Some(outcome) => println!("Created {} sample reports", outcome.reports.len()),
            None => println!("Reports already exist; nothing to seed"),
        },
        Commands::Clear => {
            clear_all(&mut reports).await?;
            println!("All reports cleared");
        }
    }

    Ok(())
}

fn media_file(path: &Path) -> MediaFile {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    MediaFile::new(path.display().to_string(), name)
}

fn print_row(report: &Report, registry: &Registry) {
    let department = report
        .assigned_department
        .as_deref()
        .and_then(|id| registry.department(id))
        .map(|d| d.name.as_str())
        .unwrap_or("Unassigned");
    let duplicate = match (&report.original_report_id, report.duplicate_count) {
        (Some(main), _) => format!(" [duplicate of {}]", main),
        (None, Some(n)) => format!(" [{} similar]", n),
        _ => String::new(),
    };
    println!(
        "  {} | {:<12} | {:<8} | {} | {}{}",
        report.id,
        report.status.label(),
        report.urgency,
        department,
        report.title,
        duplicate,
    );
}

fn print_report(report: &Report) {
    println!("Report: {}", report.id);
    println!("  Title: {}", report.title);
    println!("  Category: {}", report.category.label());
    println!("  Urgency: {}", report.urgency);
    println!("  Status: {} - {}", report.status.label(), report.status.description());
    println!("  Address: {}", report.address);
    println!("  Submitted: {}", report.submitted_at.format("%Y-%m-%d %H:%M"));
    if let Some(rating) = report.rating {
        println!("  Rating: {}/5", rating);
    }
    println!("  Timeline:");
    for entry in &report.timeline {
        println!(
            "    {} {} - {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.status.label(),
            entry.description
        );
    }
}
