use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use talentsift::config::AppConfig;
use talentsift::error::{AppError, IntakeError};
use talentsift::screening::{
    screening_router, CandidateId, InMemoryJobCatalog, InMemoryResultStore, JobRequirements,
    KeywordOverlapOracle, ResumeDocument, ScreeningService,
};
use talentsift::telemetry;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "talentsift",
    about = "Run the resume screening service or screen a resume batch offline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Screen a CSV of resumes against an ad-hoc posting and print the ranking
    Screen(ScreenArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct ScreenArgs {
    /// CSV of resumes with columns candidate_id,candidate_name,text
    #[arg(long)]
    resumes: PathBuf,
    /// Title of the ad-hoc job posting
    #[arg(long)]
    title: String,
    /// Comma-separated required skills
    #[arg(long)]
    required: String,
    /// Comma-separated preferred skills
    #[arg(long, default_value = "")]
    preferred: String,
    /// Number of top candidates to print
    #[arg(long, default_value_t = 10)]
    top: usize,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Screen(args) => run_screen(args).await,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(InMemoryJobCatalog::new());
    if let Some(path) = &config.screening.postings_csv {
        let loaded = catalog.load_csv_path(path)?;
        info!(count = loaded, path = %path.display(), "job postings loaded");
    }

    let store = Arc::new(InMemoryResultStore::new());
    let oracle = Arc::new(KeywordOverlapOracle::new());
    let service = Arc::new(ScreeningService::new(
        store,
        oracle,
        catalog,
        &config.screening,
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(screening_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "resume screening service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let resumes = load_resumes(&args.resumes)?;

    let catalog = Arc::new(InMemoryJobCatalog::new());
    catalog.insert(JobRequirements {
        job_posting_id: "adhoc".to_string(),
        title: args.title.clone(),
        required_skills: split_list(&args.required),
        preferred_skills: split_list(&args.preferred),
    });

    let store = Arc::new(InMemoryResultStore::new());
    let oracle = Arc::new(KeywordOverlapOracle::new());
    let config = AppConfig::load()?.screening;
    let service = ScreeningService::new(store, oracle, catalog, &config);

    let job = service.submit_batch_and_wait("adhoc", "cli", resumes).await?;

    let ranked = service.results(
        &job.id,
        &Default::default(),
        &Default::default(),
        &talentsift::screening::PageRequest {
            page: 1,
            page_size: (args.top.clamp(1, 100)) as u32,
        },
    )?;

    println!("Screening '{}' ({} resumes)", args.title, job.total_resumes);
    println!(
        "Processed {} | skipped {} | status {}",
        job.processed_count,
        job.skipped_count,
        job.status.label()
    );

    println!("\nTop candidates");
    for (index, result) in ranked.items.iter().enumerate() {
        println!(
            "{:>3}. {:>3}% [{}] {} ({})",
            index + 1,
            result.match_percentage,
            result.category().label(),
            result.candidate_name,
            result.candidate_id.0
        );
        if !result.missing_skills.is_empty() {
            println!("      missing: {}", result.missing_skills.join(", "));
        }
    }

    let analytics = service.analytics(&job.id)?;
    println!(
        "\nDistribution: {} strong / {} moderate / {} weak (avg {:.1}%)",
        analytics.strong_matches,
        analytics.moderate_matches,
        analytics.weak_matches,
        analytics.average_match
    );

    Ok(())
}

fn load_resumes(path: &PathBuf) -> Result<Vec<ResumeDocument>, AppError> {
    let file = std::fs::File::open(path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = csv_reader
        .headers()
        .map_err(IntakeError::from)?
        .clone();
    let column = |name: &'static str| -> Result<usize, IntakeError> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(IntakeError::MissingColumn { column: name })
    };
    let id_col = column("candidate_id")?;
    let name_col = column("candidate_name")?;
    let text_col = column("text")?;

    let mut resumes = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(IntakeError::from)?;
        let id = record.get(id_col).unwrap_or_default();
        if id.is_empty() {
            continue;
        }
        resumes.push(ResumeDocument {
            candidate_id: CandidateId(id.to_string()),
            candidate_name: record.get(name_col).unwrap_or_default().to_string(),
            file_name: format!("{id}.txt"),
            text: record.get(text_col).unwrap_or_default().to_string(),
        });
    }

    Ok(resumes)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
