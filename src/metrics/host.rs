use sysinfo::{CpuExt, System, SystemExt};

/// The machine a benchmark ran on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub os: String,
    pub host_name: String,
    pub cpu_brand: String,
    pub cpu_count: usize,
    pub total_memory_bytes: u64,
}

impl HostInfo {
    pub fn collect() -> Self {
        let mut system = System::new();
        system.refresh_cpu();
        system.refresh_memory();

        let unknown = || "unknown".to_string();
        let os = match (system.name(), system.os_version()) {
            (Some(name), Some(version)) => format!("{} {}", name, version),
            (Some(name), None) => name,
            _ => unknown(),
        };

        HostInfo {
            os,
            host_name: system.host_name().unwrap_or_else(unknown),
            cpu_brand: system
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .unwrap_or_else(unknown),
            cpu_count: system.cpus().len(),
            total_memory_bytes: system.total_memory(),
        }
    }

    pub fn total_memory_mib(&self) -> u64 {
        self.total_memory_bytes / (1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_current_host() {
        let host = HostInfo::collect();
        assert!(!host.os.is_empty());
        assert_eq!(host.cpu_count == 0, host.cpu_brand == "unknown");
    }

    #[test]
    fn converts_memory_to_mib() {
        let host = HostInfo {
            os: "Linux".to_string(),
            host_name: "bench".to_string(),
            cpu_brand: "cpu".to_string(),
            cpu_count: 8,
            total_memory_bytes: 16 * 1024 * 1024 * 1024,
        };
        assert_eq!(host.total_memory_mib(), 16 * 1024);
    }
}
