use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::info;

use latency_benchmark::config::BenchmarkConfig;
use latency_benchmark::databases::database::Database;
use latency_benchmark::diana::DianaConfig;
use latency_benchmark::dianadb::DianaDB;
use latency_benchmark::harness::run_suite;
use latency_benchmark::memory::InMemory;
use latency_benchmark::metrics::HostInfo;
use latency_benchmark::mongodb::MongoDB;
use latency_benchmark::postgres::PostgreSQL;
use latency_benchmark::report::write_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Mongodb,
    Dianadb,
    Postgres,
    /// Process-local store, for dry runs.
    Memory,
}

/// Insert/query latency benchmark across document and relational databases
#[derive(Parser, Debug)]
#[command(name = "latency_benchmark")]
#[command(version, about)]
struct Args {
    /// Records inserted per backend
    #[arg(long, default_value_t = 10_000)]
    records: usize,

    /// Records skipped by the query
    #[arg(long, default_value_t = 100)]
    skip: u64,

    /// Records returned by the query
    #[arg(long, default_value_t = 10)]
    limit: u64,

    /// Name the query filters on
    #[arg(long, default_value = "Diana")]
    query_name: String,

    /// Drop existing benchmark data before inserting
    #[arg(long)]
    clean: bool,

    /// Log and count failed inserts instead of aborting the backend run
    #[arg(long)]
    skip_failed_inserts: bool,

    /// Backends to run, in order
    #[arg(long = "backend", value_enum, default_values_t = [Backend::Mongodb, Backend::Dianadb, Backend::Postgres])]
    backends: Vec<Backend>,

    #[arg(long, default_value = latency_benchmark::mongodb::DEFAULT_URI)]
    mongo_uri: String,

    #[arg(long, default_value = latency_benchmark::postgres::DEFAULT_URL)]
    postgres_url: String,

    #[arg(long, default_value = latency_benchmark::diana::config::DEFAULT_HOST)]
    diana_host: String,

    #[arg(long, default_value_t = latency_benchmark::diana::config::DEFAULT_PORT)]
    diana_port: u16,

    #[arg(long, default_value = "admin")]
    diana_user: String,

    #[arg(long, default_value = "admin")]
    diana_password: String,

    #[arg(long, default_value_t = latency_benchmark::diana::config::DEFAULT_POOL_SIZE)]
    diana_pool_size: usize,

    #[arg(long, default_value_t = 5000)]
    diana_connect_timeout_ms: u64,

    /// Also write results to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> BenchmarkConfig {
        BenchmarkConfig::default()
            .with_record_count(self.records)
            .with_page(self.skip, self.limit)
            .with_query_name(self.query_name.as_str())
            .with_clean_before_run(self.clean)
            .with_skip_failed_inserts(self.skip_failed_inserts)
    }

    fn diana_config(&self) -> DianaConfig {
        DianaConfig::new(self.diana_host.as_str(), self.diana_port)
            .with_credentials(self.diana_user.as_str(), self.diana_password.as_str())
            .with_pool_size(self.diana_pool_size)
            .with_connect_timeout(Duration::from_millis(self.diana_connect_timeout_ms))
    }

    fn databases(&self) -> Vec<Box<dyn Database>> {
        self.backends
            .iter()
            .map(|backend| -> Box<dyn Database> {
                match backend {
                    Backend::Mongodb => Box::new(MongoDB::with_uri(self.mongo_uri.as_str())),
                    Backend::Dianadb => Box::new(DianaDB::with_config(self.diana_config())),
                    Backend::Postgres => Box::new(PostgreSQL::with_url(self.postgres_url.as_str())),
                    Backend::Memory => Box::new(InMemory::new()),
                }
            })
            .collect()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("latency_benchmark=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = args.config();

    let host = HostInfo::collect();
    info!(
        os = %host.os,
        cpu = %host.cpu_brand,
        cpus = host.cpu_count,
        memory_mib = host.total_memory_mib(),
        "host"
    );

    let mut databases = args.databases();
    let reports = run_suite(&mut databases, &config).await;

    println!();
    for report in &reports {
        println!("{}", report.summary_line());
    }

    if let Some(path) = &args.csv {
        write_csv(path, &reports)?;
        info!(path = %path.display(), "results written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_reference_run() {
        let args = Args::parse_from(["latency_benchmark"]);
        assert_eq!(args.config(), BenchmarkConfig::default());
        assert_eq!(
            args.backends,
            vec![Backend::Mongodb, Backend::Dianadb, Backend::Postgres]
        );
        assert_eq!(args.diana_config(), DianaConfig::default());
        assert!(args.csv.is_none());
    }

    #[test]
    fn backends_run_in_given_order() {
        let args = Args::parse_from([
            "latency_benchmark",
            "--backend",
            "memory",
            "--backend",
            "postgres",
            "--records",
            "50",
        ]);
        let names: Vec<&str> = args.databases().iter().map(|db| db.name()).collect();
        assert_eq!(names, vec!["InMemory", "PostgreSQL"]);
        assert_eq!(args.config().record_count, 50);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
