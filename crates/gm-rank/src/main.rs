use chrono::Utc;
use clap::Parser;
use dotenvy::dotenv;
use gm_common::JobPosting;
use gm_common::api::RankedJob;
use gm_common::db::{PgStore, create_pool_from_url_checked};
use gm_common::logging::init_tracing_subscriber;
use gm_common::matching::rank_jobs;
use gm_common::store::StoreError;
use tracing::{error, info, warn};

const APP_NAME: &str = "gm-rank";

#[derive(Debug, Parser)]
#[command(name = "gm-rank", about = "Rank candidate jobs for a worker and print them as JSON")]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    db_url: String,

    /// Worker (pro) user id to rank for
    #[arg(long)]
    worker_id: i64,

    /// Rank these jobs instead of upcoming open jobs (repeatable)
    #[arg(long = "job-id")]
    job_ids: Vec<i64>,

    /// How many upcoming open jobs to load when no job ids are given
    #[arg(long, default_value_t = 50)]
    limit: i64,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

async fn load_candidates(store: &PgStore, args: &Cli) -> Result<Vec<JobPosting>, StoreError> {
    if args.job_ids.is_empty() {
        return store.fetch_open_jobs(Utc::now(), args.limit).await;
    }

    let mut jobs = Vec::with_capacity(args.job_ids.len());
    for id in &args.job_ids {
        match store.fetch_job(*id).await? {
            Some(job) => jobs.push(job),
            None => warn!(job_id = id, "job not found; skipping"),
        }
    }
    Ok(jobs)
}

fn render(ranked: &[RankedJob], pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(ranked)
    } else {
        serde_json::to_string(ranked)
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing_subscriber(APP_NAME);

    let args = Cli::parse();
    let pool = create_pool_from_url_checked(&args.db_url).await?;
    let store = PgStore::new(pool);

    let jobs = load_candidates(&store, &args).await?;
    info!(worker_id = args.worker_id, candidates = jobs.len(), "loaded candidate jobs");

    let ranked = rank_jobs(&store, jobs, args.worker_id).await;
    println!("{}", render(&ranked, args.pretty)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(error = %err, "{APP_NAME} failed");
        eprintln!("{APP_NAME} failed: {err}");
        std::process::exit(1);
    }
}
