use crate::benchmark::config::BenchmarkConfig;
use crate::benchmark::data_generator::generate_users;
use crate::benchmark::report::{format_millis, RunReport};
use crate::databases::database::Database;
use crate::error::Result;
use tokio::time::Instant;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Connecting,
    Running,
    Closed,
}

fn enter(db: &dyn Database, state: RunState) {
    debug!(backend = db.name(), ?state, "run state");
}

/// One full cycle against `db`: connect, insert `record_count` generated
/// records one at a time, run the query, disconnect.
///
/// Never fails; errors end up in the report. Once connected, the backend is
/// disconnected on every exit path.
pub async fn run_backend(db: &mut dyn Database, config: &BenchmarkConfig) -> RunReport {
    let mut report = RunReport::new(db.name());

    enter(db, RunState::Connecting);
    if let Err(e) = db.connect().await {
        error!(backend = db.name(), "connect failed: {}", e);
        report.error = Some(e.to_string());
        enter(db, RunState::Closed);
        return report;
    }

    enter(db, RunState::Running);
    let outcome = run_phases(db, config, &mut report).await;

    if let Err(e) = db.disconnect().await {
        warn!(backend = db.name(), "disconnect failed: {}", e);
    }
    enter(db, RunState::Closed);

    if let Err(e) = outcome {
        error!(backend = db.name(), "benchmark run failed: {}", e);
        report.error = Some(e.to_string());
    }
    report
}

async fn run_phases(
    db: &dyn Database,
    config: &BenchmarkConfig,
    report: &mut RunReport,
) -> Result<()> {
    if config.clean_before_run {
        db.clean_database().await?;
    }

    let users = generate_users(config.record_count, db.variant(), &mut rand::thread_rng());
    report.records = users.len();

    let start_time = Instant::now();
    for user in &users {
        match db.insert_user(user).await {
            Ok(()) => report.inserted += 1,
            Err(e) if config.skip_failed_inserts => {
                warn!(backend = db.name(), "insert failed: {}", e);
                report.failed_inserts += 1;
            }
            Err(e) => return Err(e),
        }
    }
    let insert_time = start_time.elapsed();
    report.insert_time = Some(insert_time);
    println!("{} Insert: {}", db.name(), format_millis(insert_time));

    let query = config.query();
    let start_time = Instant::now();
    report.returned = db.query_users(&query).await?;
    let query_time = start_time.elapsed();
    report.query_time = Some(query_time);
    println!("{} Query: {}", db.name(), format_millis(query_time));

    Ok(())
}

/// Run every backend in order. A failing backend does not stop the suite.
pub async fn run_suite(
    databases: &mut [Box<dyn Database>],
    config: &BenchmarkConfig,
) -> Vec<RunReport> {
    println!(
        "Starting DB benchmarking with {} docs/rows",
        config.record_count
    );

    let mut reports = Vec::with_capacity(databases.len());
    for db in databases.iter_mut() {
        println!();
        println!("--- {} Benchmark ---", db.name());
        reports.push(run_backend(db.as_mut(), config).await);
    }
    reports
}
