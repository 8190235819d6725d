use chrono::Utc;
use srl_core::system::{LoadSampler, NoopLoadSampler, SystemSample};
use std::fs;
use tracing::warn;

const PROC_STAT: &str = "/proc/stat";
const PROC_MEMINFO: &str = "/proc/meminfo";
const PROC_SELF_STATUS: &str = "/proc/self/status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub idle: u64,
    pub total: u64,
}

/// Reads the aggregate `cpu` line of `/proc/stat`. Idle time includes iowait.
pub fn parse_cpu_times(stat: &str) -> Option<CpuTimes> {
    let line = stat.lines().find(|line| line.starts_with("cpu "))?;
    let fields = line
        .split_whitespace()
        .skip(1)
        .map(str::parse::<u64>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    if fields.len() < 4 {
        return None;
    }
    Some(CpuTimes {
        idle: fields[3] + fields.get(4).copied().unwrap_or(0),
        total: fields.iter().sum(),
    })
}

/// Share of the CPU time between two readings that was not spent idle, in percent. 0 when no
/// time elapsed.
pub fn cpu_usage(previous: CpuTimes, current: CpuTimes) -> f64 {
    if current.total <= previous.total {
        return 0.;
    }
    let total = (current.total - previous.total) as f64;
    let idle = current.idle.saturating_sub(previous.idle) as f64;
    (1. - idle / total) * 100.
}

/// Returns total and available memory in kB.
pub fn parse_meminfo(meminfo: &str) -> Option<(u64, u64)> {
    let field = |name: &str| {
        meminfo
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.trim_start_matches(':').split_whitespace().next())
            .and_then(|value| value.parse::<u64>().ok())
    };
    Some((field("MemTotal")?, field("MemAvailable")?))
}

/// Resident set size of the calling process in kB, from `/proc/self/status`.
pub fn parse_vm_rss(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse::<u64>().ok())
}

fn read_cpu_times() -> Option<CpuTimes> {
    parse_cpu_times(&fs::read_to_string(PROC_STAT).ok()?)
}

/// Samples load from procfs: host CPU and memory usage in percent, and the resident memory of
/// this process. CPU usage is measured against the previous reading, the first one being taken
/// when the sampler is created. Any read failure yields zeros: the figures only feed reporting.
#[derive(Debug)]
pub struct ProcLoadSampler {
    previous: Option<CpuTimes>,
    warned: bool,
}

impl Default for ProcLoadSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcLoadSampler {
    pub fn new() -> Self {
        Self {
            previous: read_cpu_times(),
            warned: false,
        }
    }

    fn cpu_percent(&mut self) -> Option<f64> {
        let current = read_cpu_times()?;
        Some(match self.previous.replace(current) {
            Some(previous) => cpu_usage(previous, current),
            None => 0.,
        })
    }

    fn memory_percent(&self) -> Option<f64> {
        let (total, available) = parse_meminfo(&fs::read_to_string(PROC_MEMINFO).ok()?)?;
        if total == 0 {
            return None;
        }
        Some(total.saturating_sub(available) as f64 / total as f64 * 100.)
    }

    fn process_memory_mb(&self) -> Option<f64> {
        let rss = parse_vm_rss(&fs::read_to_string(PROC_SELF_STATUS).ok()?)?;
        Some(rss as f64 / 1024.)
    }
}

impl LoadSampler for ProcLoadSampler {
    fn sample(&mut self) -> SystemSample {
        let cpu = self.cpu_percent();
        let memory_percent = self.memory_percent();
        let memory_mb = self.process_memory_mb();
        let complete = cpu.is_some() && memory_percent.is_some() && memory_mb.is_some();
        if !complete && !self.warned {
            warn!("process or host load is unavailable, reporting zeros");
            self.warned = true;
        }
        SystemSample {
            cpu_percent: cpu.unwrap_or(0.),
            memory_percent: memory_percent.unwrap_or(0.),
            memory_mb: memory_mb.unwrap_or(0.),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoadSamplerType {
    #[default]
    Proc,
    Noop,
}

impl LoadSamplerType {
    pub fn build(&self) -> SamplerKind {
        match self {
            Self::Proc => SamplerKind::Proc(ProcLoadSampler::new()),
            Self::Noop => SamplerKind::Noop(NoopLoadSampler),
        }
    }
}

pub enum SamplerKind {
    Proc(ProcLoadSampler),
    Noop(NoopLoadSampler),
}

impl LoadSampler for SamplerKind {
    fn sample(&mut self) -> SystemSample {
        match self {
            Self::Proc(sampler) => sampler.sample(),
            Self::Noop(sampler) => sampler.sample(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{CpuTimes, cpu_usage, parse_cpu_times, parse_meminfo, parse_vm_rss};

    #[test]
    fn parses_the_aggregate_cpu_line() {
        let stat = "cpu  10 0 5 80 5 0 0 0 0 0\ncpu0 5 0 2 40 3 0 0 0 0 0\nintr 1\n";
        assert_eq!(
            parse_cpu_times(stat),
            Some(CpuTimes {
                idle: 85,
                total: 100
            })
        );
        assert_eq!(parse_cpu_times("intr 1\n"), None);
        assert_eq!(parse_cpu_times("cpu  1 x 2 3\n"), None);
    }

    #[test]
    fn cpu_usage_is_the_busy_share_between_readings() {
        let previous = CpuTimes {
            idle: 85,
            total: 100,
        };
        let current = CpuTimes {
            idle: 115,
            total: 140,
        };
        assert_eq!(cpu_usage(previous, current), 25.);
        assert_eq!(cpu_usage(current, current), 0.);
    }

    #[test]
    fn parses_meminfo() {
        let meminfo = "MemTotal:       16384000 kB\nMemFree:         1000 kB\nMemAvailable:    8192000 kB\n";
        assert_eq!(parse_meminfo(meminfo), Some((16_384_000, 8_192_000)));
        assert_eq!(parse_meminfo("MemTotal: 10 kB\n"), None);
    }

    #[test]
    fn parses_the_resident_set_size() {
        let status = "Name:\tsrl\nVmPeak:\t  812344 kB\nVmHWM:\t   40960 kB\nVmRSS:\t   35840 kB\nRssAnon:\t   20480 kB\n";
        assert_eq!(parse_vm_rss(status), Some(35_840));
        assert_eq!(parse_vm_rss("Name:\tsrl\nRssAnon:\t 20480 kB\n"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn samples_the_memory_of_this_process() {
        use super::ProcLoadSampler;
        use srl_core::system::LoadSampler;
        use std::fs;

        let mut sampler = ProcLoadSampler::new();
        assert!(sampler.previous.is_some());
        let sample = sampler.sample();
        let host_total_mb = fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|meminfo| parse_meminfo(&meminfo))
            .map(|(total, _)| total as f64 / 1024.)
            .expect("meminfo is readable");
        assert!(sample.memory_mb > 0.);
        assert!(sample.memory_mb < host_total_mb);
        assert!((0. ..=100.).contains(&sample.cpu_percent));
    }
}
