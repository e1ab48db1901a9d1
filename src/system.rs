//! Host system information and process memory sampling.

use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::adapter::MemoryProbe;

/// Snapshot of the machine a run executed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu_model: String,
    pub cpu_cores: u32,
    pub mem_total_mb: u64,
    pub build_profile: String,
}

impl SystemInfo {
    /// Capture the current host's fingerprint.
    #[allow(clippy::cast_possible_truncation)]
    pub fn capture() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        system.refresh_memory();

        let cpu_model = system
            .cpus()
            .first()
            .map_or_else(|| "unknown".to_string(), |cpu| cpu.brand().to_string());
        let os = System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string());
        let build_profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        };

        Self {
            os,
            arch: std::env::consts::ARCH.to_string(),
            cpu_model,
            cpu_cores: system.cpus().len() as u32,
            mem_total_mb: system.total_memory() / 1024 / 1024,
            build_profile: build_profile.to_string(),
        }
    }
}

impl std::fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "OS:       {}", self.os)?;
        writeln!(f, "Arch:     {}", self.arch)?;
        writeln!(f, "CPU:      {} ({} cores)", self.cpu_model, self.cpu_cores)?;
        writeln!(f, "Memory:   {} MB", self.mem_total_mb)?;
        write!(f, "Profile:  {}", self.build_profile)
    }
}

/// Memory probe reading this process's resident set via `sysinfo`.
pub struct ProcessMemoryProbe {
    pid: sysinfo::Pid,
}

impl ProcessMemoryProbe {
    pub fn new() -> Self {
        Self {
            pid: sysinfo::Pid::from_u32(std::process::id()),
        }
    }
}

impl Default for ProcessMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for ProcessMemoryProbe {
    #[allow(clippy::cast_precision_loss)]
    fn sample_mb(&self) -> f64 {
        let mut system = System::new();
        system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[self.pid]), true);
        system
            .process(self.pid)
            .map_or(0.0, |process| process.memory() as f64 / 1_048_576.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_reports_plausible_host() {
        let info = SystemInfo::capture();
        assert!(!info.arch.is_empty());
        assert!(info.cpu_cores >= 1);
        assert!(info.mem_total_mb > 0);
    }

    #[test]
    fn process_probe_reads_own_memory() {
        let probe = ProcessMemoryProbe::new();
        assert!(probe.sample_mb() > 0.0);
    }
}
