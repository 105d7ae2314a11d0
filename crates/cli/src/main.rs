//! RepoVitals CLI
//!
//! Analysis runner, record browser and web server.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use repovitals_analyzer::{
    run_pipeline, AnalysisRequest, AnalysisStore, AnalysisSummary, Finding, Orchestrator,
    PipelineConfig, PipelineError, RuleRegistry, Severity,
};
use repovitals_api::{create_router, AppState};
use repovitals_collector::{parse_repo_url, CollectorConfig, GithubCollector};
use repovitals_database::Database;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "rv")]
#[command(about = "RepoVitals - GitHub Repository Code Quality Analyzer")]
#[command(version)]
struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "repovitals.db")]
    database: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct PipelineArgs {
    /// Maximum number of files fetched per repository
    #[arg(long)]
    max_files: Option<usize>,

    /// Abort an analysis that runs longer than this
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl PipelineArgs {
    fn collector_config(&self) -> CollectorConfig {
        let mut config = CollectorConfig::default();
        if let Some(max_files) = self.max_files {
            config.limits.max_files = max_files;
        }
        config
    }

    /// Rules matched to the fetch limits of [`Self::collector_config`]
    fn rules(&self) -> RuleRegistry {
        RuleRegistry::for_limits(&self.collector_config().limits)
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            time_budget: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Address to bind to
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Analyze a repository and store the result
    Analyze {
        /// GitHub repository URL
        url: String,

        /// Service the analysis belongs to
        #[arg(short, long, default_value = "cli")]
        service: String,

        /// User recorded as the requester
        #[arg(short, long, default_value = "cli")]
        user: String,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Analyze a repository without storing anything
    Scan {
        /// GitHub repository URL
        url: String,

        /// Print the findings and summary as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// List stored analyses of a service
    List {
        /// Service id
        service: String,
    },

    /// Show a stored analysis
    Show {
        /// Analysis id
        id: String,
    },

    /// Delete a stored analysis
    Delete {
        /// Analysis id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_target(false).compact();
    match EnvFilter::try_from_default_env() {
        Ok(filter) => subscriber.with_env_filter(filter).init(),
        Err(_) => subscriber.with_max_level(level).init(),
    }

    match cli.command {
        Commands::Serve { bind, pipeline } => {
            let db = Database::connect(&cli.database).await?;
            serve(db, bind, &pipeline).await
        }
        Commands::Analyze {
            url,
            service,
            user,
            pipeline,
        } => {
            let db = Database::connect(&cli.database).await?;
            analyze(&db, url, service, user, &pipeline).await
        }
        Commands::Scan {
            url,
            json,
            pipeline,
        } => scan(&url, json, &pipeline).await,
        Commands::List { service } => list(&Database::connect(&cli.database).await?, &service).await,
        Commands::Show { id } => show(&Database::connect(&cli.database).await?, &id).await,
        Commands::Delete { id } => delete(&Database::connect(&cli.database).await?, &id).await,
    }
}

fn collector(pipeline: &PipelineArgs) -> Result<GithubCollector> {
    let config = pipeline.collector_config();

    if config.github_token.is_none() {
        warn!("GITHUB_TOKEN not set. API rate limits will be restricted.");
    }

    Ok(GithubCollector::new(config)?)
}

async fn serve(db: Database, bind: SocketAddr, pipeline: &PipelineArgs) -> Result<()> {
    let source = Arc::new(collector(pipeline)?);
    let state = Arc::new(
        AppState::new(db, source)
            .with_rules(pipeline.rules())
            .with_pipeline(pipeline.pipeline_config()),
    );
    let router = create_router(state);

    info!("Starting RepoVitals server on {}", bind);
    info!("API available at http://{}/api/v1", bind);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn analyze(
    db: &Database,
    url: String,
    service_id: String,
    user_id: String,
    pipeline: &PipelineArgs,
) -> Result<()> {
    let source = collector(pipeline)?;
    let rules = pipeline.rules();
    let orchestrator =
        Orchestrator::new(&source, db, &rules).with_config(pipeline.pipeline_config());

    println!("Analyzing {}...", url);
    let record = orchestrator
        .run_analysis(AnalysisRequest {
            repo_url: url,
            service_id,
            user_id,
        })
        .await?;

    println!("Analysis {} stored.\n", record.id);
    if let (Some(findings), Some(summary)) = (&record.findings, &record.summary) {
        print_report(findings, summary);
    }

    Ok(())
}

async fn scan(url: &str, json: bool, pipeline: &PipelineArgs) -> Result<()> {
    let repo = parse_repo_url(url)?;
    let source = collector(pipeline)?;
    let rules = pipeline.rules();

    let run = run_pipeline(&source, &rules, &repo);
    let report = match pipeline.pipeline_config().time_budget {
        Some(budget) => tokio::time::timeout(budget, run)
            .await
            .map_err(|_| PipelineError::Timeout(budget))??,
        None => run.await?,
    };

    if json {
        let output = serde_json::json!({
            "repository": repo.full_name(),
            "files_analyzed": report.files_analyzed,
            "summary": report.summary,
            "findings": report.findings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} ({} files analyzed)\n", repo.html_url(), report.files_analyzed);
        print_report(&report.findings, &report.summary);
    }

    Ok(())
}

async fn list(db: &Database, service_id: &str) -> Result<()> {
    let analyses = db.list_by_service(service_id).await?;

    println!(
        "{:<38} {:<30} {:<10} {:<6} {:<20}",
        "ID", "REPOSITORY", "STATUS", "SCORE", "CREATED"
    );
    println!("{}", "-".repeat(106));

    for analysis in &analyses {
        let score = analysis
            .summary
            .as_ref()
            .map(|s| s.health_score.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<38} {:<30} {:<10} {:<6} {:<20}",
            analysis.id,
            format!("{}/{}", analysis.repo_owner, analysis.repo_name),
            analysis.status.as_str(),
            score,
            analysis.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    if analyses.is_empty() {
        println!("No analyses yet. Run 'rv analyze <url> --service {}' first.", service_id);
    }

    Ok(())
}

async fn show(db: &Database, id: &str) -> Result<()> {
    let Some(analysis) = db.get_by_id(id).await? else {
        bail!("Analysis not found: {}", id);
    };

    println!("Analysis:   {}", analysis.id);
    println!("Repository: {}", analysis.repo_url);
    println!("Service:    {}", analysis.service_id);
    println!("Requested:  {}", analysis.user_id);
    println!("Status:     {}", analysis.status);
    println!("Created:    {}", analysis.created_at);
    if let Some(at) = analysis.analyzed_at {
        println!("Analyzed:   {}", at);
    }
    if let Some(ref message) = analysis.error_message {
        println!("Error:      {}", message);
    }
    println!();

    if let (Some(findings), Some(summary)) = (&analysis.findings, &analysis.summary) {
        print_report(findings, summary);
    }

    Ok(())
}

async fn delete(db: &Database, id: &str) -> Result<()> {
    db.delete(id).await?;
    println!("Deleted analysis {}", id);
    Ok(())
}

fn print_report(findings: &[Finding], summary: &AnalysisSummary) {
    println!(
        "Health Score: {} ({})",
        summary.health_score,
        summary.grade()
    );
    for (severity, count) in summary.by_severity.iter().rev() {
        println!("  {:<10} {}", severity.as_str(), count);
    }

    if findings.is_empty() {
        println!("\nNo findings.");
        return;
    }

    println!("\nFindings:");
    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by(|a, b| b.severity.cmp(&a.severity));

    for finding in ordered {
        let marker = match finding.severity {
            Severity::Critical => "!!",
            Severity::Warning => "! ",
            Severity::Info => "- ",
        };
        println!("{} [{}] {}", marker, finding.category, finding.title);
        if let Some(ref path) = finding.file_path {
            println!("     {}", path);
        }
        if !finding.description.is_empty() {
            println!("     {}", finding.description);
        }
        println!("     -> {}", finding.suggestion);
    }
}
