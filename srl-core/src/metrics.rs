use crate::{
    agents::Agent, evaluation::EvaluationSummary, system::SystemSample, training::TrainingSeries,
    value_table::QTable,
};
use serde::{Deserialize, Serialize};

/// Arithmetic mean, 0 for an empty series.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of the last `window` values, or of the whole series if it is shorter.
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    let start = values.len().saturating_sub(window);
    mean(&values[start..])
}

pub(crate) fn success_rate(successes: &[bool]) -> f64 {
    if successes.is_empty() {
        return 0.;
    }
    successes.iter().filter(|s| **s).count() as f64 / successes.len() as f64
}

pub(crate) fn mean_steps(steps: &[usize]) -> f64 {
    if steps.is_empty() {
        return 0.;
    }
    steps.iter().sum::<usize>() as f64 / steps.len() as f64
}

/// `final_success_rate`, `final_avg_steps` and `final_avg_reward` cover the last
/// `FINAL_EPISODE_WINDOW` episodes only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub final_success_rate: f64,
    pub final_avg_steps: f64,
    pub final_avg_reward: f64,
    pub final_td_error: f64,
    pub total_training_time_secs: f64,
}

/// Descriptive statistics of a value table. Variance is the population variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueTableStats {
    pub mean: f64,
    pub std: f64,
    pub variance: f64,
    pub non_zero_count: usize,
}

impl ValueTableStats {
    pub fn of(table: &QTable) -> Self {
        let values = table.values();
        let mean = mean(values);
        let variance = if values.is_empty() {
            0.
        } else {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
        };
        Self {
            mean,
            std: variance.sqrt(),
            variance,
            non_zero_count: values.iter().filter(|v| **v != 0.).count(),
        }
    }
}

/// Host load over the sampled training episodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub avg_cpu: f64,
    pub peak_cpu: f64,
    pub avg_memory_mb: f64,
    pub peak_memory_mb: f64,
}

impl ResourceSummary {
    pub fn of(samples: &[SystemSample]) -> Self {
        let cpu: Vec<f64> = samples.iter().map(|s| s.cpu_percent).collect();
        let memory: Vec<f64> = samples.iter().map(|s| s.memory_mb).collect();
        Self {
            avg_cpu: mean(&cpu),
            peak_cpu: cpu.iter().copied().fold(0., f64::max),
            avg_memory_mb: mean(&memory),
            peak_memory_mb: memory.iter().copied().fold(0., f64::max),
        }
    }
}

/// Episode at which the per-episode TD error is taken as the reference for the trend.
pub const TD_TREND_REFERENCE_EPISODE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TdErrorTrend {
    Decreasing,
    Stable,
}

impl TdErrorTrend {
    /// Decreasing when the last episode's mean TD error is below the reference episode's.
    /// Runs too short to reach past the reference episode are stable.
    pub fn of(episode_td_errors: &[f64]) -> Self {
        match (
            episode_td_errors.get(TD_TREND_REFERENCE_EPISODE),
            episode_td_errors.last(),
        ) {
            (Some(reference), Some(last)) if last < reference => Self::Decreasing,
            _ => Self::Stable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningStability {
    pub final_q_variance: f64,
    pub q_table_mean: f64,
    pub q_table_std: f64,
    pub td_error_trend: TdErrorTrend,
    pub final_epsilon: f64,
}

/// How much the learned agent improves over the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImprovementMetrics {
    /// Percentage of steps saved against the baseline. 0 when the baseline took no steps.
    pub steps_reduction: f64,
    /// Difference of the success rates, in percentage points.
    pub success_rate_increase: f64,
    /// Baseline steps per agent step. 1 when the agent took no steps.
    pub efficiency_gain: f64,
}

impl ImprovementMetrics {
    pub fn compare(agent: &EvaluationSummary, baseline: &EvaluationSummary) -> Self {
        let steps_reduction = if baseline.avg_steps > 0. {
            (baseline.avg_steps - agent.avg_steps) / baseline.avg_steps * 100.
        } else {
            0.
        };
        let efficiency_gain = if agent.avg_steps > 0. {
            baseline.avg_steps / agent.avg_steps
        } else {
            1.
        };
        Self {
            steps_reduction,
            success_rate_increase: (agent.success_rate - baseline.success_rate) * 100.,
            efficiency_gain,
        }
    }
}

/// Everything a run produces, reduced to plain data for reporting layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub training: TrainingSummary,
    pub test: EvaluationSummary,
    pub baseline: EvaluationSummary,
    pub system_resources: ResourceSummary,
    pub learning_stability: LearningStability,
    pub value_table: ValueTableStats,
    pub improvement: ImprovementMetrics,
}

impl RunReport {
    /// Reduces the raw series of a finished run. Table statistics are taken over the agent's
    /// final table; an agent without one reports all zeros.
    pub fn aggregate<A: Agent>(
        series: &TrainingSeries,
        agent: &A,
        test: EvaluationSummary,
        baseline: EvaluationSummary,
    ) -> Self {
        let value_table = match agent.value_table() {
            Some(table) => ValueTableStats::of(table),
            None => ValueTableStats {
                mean: 0.,
                std: 0.,
                variance: 0.,
                non_zero_count: 0,
            },
        };
        let improvement = ImprovementMetrics::compare(&test, &baseline);
        Self {
            training: series.summary(),
            system_resources: ResourceSummary::of(&series.system_samples),
            learning_stability: LearningStability {
                final_q_variance: value_table.variance,
                q_table_mean: value_table.mean,
                q_table_std: value_table.std,
                td_error_trend: TdErrorTrend::of(&series.episode_td_errors()),
                final_epsilon: agent.exploration_rate().unwrap_or(0.),
            },
            value_table,
            improvement,
            test,
            baseline,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{
        ImprovementMetrics, ResourceSummary, TdErrorTrend, ValueTableStats, mean, trailing_mean,
    };
    use crate::{evaluation::EvaluationSummary, system::SystemSample, value_table::QTable};

    fn summary(avg_steps: f64, success_rate: f64) -> EvaluationSummary {
        EvaluationSummary {
            avg_steps,
            success_rate,
            ..EvaluationSummary::from_episodes(vec![], vec![], vec![])
        }
    }

    #[test]
    fn compare_guards_zero_baseline() {
        let improvement = ImprovementMetrics::compare(&summary(12., 1.), &summary(0., 0.));
        assert_eq!(improvement.steps_reduction, 0.);
        assert_eq!(improvement.efficiency_gain, 0.);
    }

    #[test]
    fn compare_guards_zero_agent() {
        let improvement = ImprovementMetrics::compare(&summary(0., 0.), &summary(150., 0.));
        assert_eq!(improvement.efficiency_gain, 1.);
        assert_eq!(improvement.steps_reduction, 100.);
    }

    #[test]
    fn compare_matches_the_ratio_definitions() {
        let improvement = ImprovementMetrics::compare(&summary(20., 0.75), &summary(200., 0.25));
        assert!((improvement.steps_reduction - 90.).abs() < 1e-12);
        assert!((improvement.efficiency_gain - 10.).abs() < 1e-12);
        assert_eq!(improvement.success_rate_increase, 50.);
    }

    #[test]
    fn success_rate_increase_is_negative_when_the_baseline_wins() {
        let improvement = ImprovementMetrics::compare(&summary(10., 0.25), &summary(10., 0.5));
        assert_eq!(improvement.success_rate_increase, -25.);
    }

    #[test]
    fn td_trend_compares_the_last_episode_with_the_reference() {
        let mut errors = vec![1.; 150];
        assert_eq!(TdErrorTrend::of(&errors), TdErrorTrend::Stable);
        errors[149] = 0.5;
        assert_eq!(TdErrorTrend::of(&errors), TdErrorTrend::Decreasing);
        errors[100] = 0.25;
        assert_eq!(TdErrorTrend::of(&errors), TdErrorTrend::Stable);
    }

    #[test]
    fn short_runs_have_a_stable_td_trend() {
        assert_eq!(TdErrorTrend::of(&[]), TdErrorTrend::Stable);
        let mut errors = vec![1.; 101];
        errors[100] = 0.;
        assert_eq!(TdErrorTrend::of(&errors), TdErrorTrend::Stable);
    }

    #[test]
    fn trailing_mean_falls_back_to_the_full_series() {
        let values = [1., 2., 3., 4.];
        assert_eq!(trailing_mean(&values, 2), 3.5);
        assert_eq!(trailing_mean(&values, 10), 2.5);
        assert_eq!(trailing_mean(&[], 10), 0.);
        assert_eq!(mean(&[]), 0.);
    }

    #[test]
    fn table_stats_use_population_variance() {
        let mut table = QTable::zeros(2, 2);
        table.set(0, 0, 2.);
        table.set(1, 1, -2.);
        let stats = ValueTableStats::of(&table);
        assert_eq!(stats.mean, 0.);
        assert_eq!(stats.variance, 2.);
        assert!((stats.std - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.non_zero_count, 2);
    }

    #[test]
    fn resource_summary_of_no_samples_is_zero() {
        let summary = ResourceSummary::of(&[]);
        assert_eq!(summary.avg_cpu, 0.);
        assert_eq!(summary.peak_memory_mb, 0.);

        let mut sample = SystemSample::zeroed();
        sample.cpu_percent = 40.;
        sample.memory_mb = 512.;
        let mut other = SystemSample::zeroed();
        other.cpu_percent = 20.;
        other.memory_mb = 256.;
        let summary = ResourceSummary::of(&[sample, other]);
        assert_eq!(summary.avg_cpu, 30.);
        assert_eq!(summary.peak_cpu, 40.);
        assert_eq!(summary.avg_memory_mb, 384.);
        assert_eq!(summary.peak_memory_mb, 512.);
    }
}
