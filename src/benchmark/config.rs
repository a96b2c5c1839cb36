/// Tuning parameters for a benchmark suite.
///
/// Defaults reproduce the fixed constants of the reference run: 10,000
/// records, skip 100, limit 10, filtering on the name `"Diana"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkConfig {
    pub record_count: usize,
    pub skip: u64,
    pub limit: u64,
    pub query_name: String,
    /// Drop the backend's collection/table before inserting.
    pub clean_before_run: bool,
    /// Log and count failed inserts instead of aborting the run.
    pub skip_failed_inserts: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            record_count: 10_000,
            skip: 100,
            limit: 10,
            query_name: "Diana".to_string(),
            clean_before_run: false,
            skip_failed_inserts: false,
        }
    }
}

impl BenchmarkConfig {
    pub fn with_record_count(mut self, count: usize) -> Self {
        self.record_count = count;
        self
    }

    pub fn with_page(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }

    pub fn with_query_name(mut self, name: impl Into<String>) -> Self {
        self.query_name = name.into();
        self
    }

    pub fn with_clean_before_run(mut self, clean: bool) -> Self {
        self.clean_before_run = clean;
        self
    }

    pub fn with_skip_failed_inserts(mut self, skip: bool) -> Self {
        self.skip_failed_inserts = skip;
        self
    }

    pub fn query(&self) -> UserQuery {
        UserQuery {
            name: self.query_name.clone(),
            skip: self.skip,
            limit: self.limit,
        }
    }
}

/// Equality filter on `name`, newest first, then one page of `limit` records
/// after skipping `skip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub name: String,
    pub skip: u64,
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.record_count, 10_000);
        assert_eq!(
            config.query(),
            UserQuery {
                name: "Diana".to_string(),
                skip: 100,
                limit: 10,
            }
        );
        assert!(!config.clean_before_run);
        assert!(!config.skip_failed_inserts);
    }

    #[test]
    fn builders_override_fields() {
        let config = BenchmarkConfig::default()
            .with_record_count(5)
            .with_page(1, 2)
            .with_query_name("Bob Lee");
        assert_eq!(config.record_count, 5);
        assert_eq!(config.query().skip, 1);
        assert_eq!(config.query().limit, 2);
        assert_eq!(config.query().name, "Bob Lee");
    }
}
