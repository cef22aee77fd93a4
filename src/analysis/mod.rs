//! Aggregation of the price table
//!
//! Everything here is a pure function of a [`PriceTable`]. Missing cells are
//! excluded from every statistic and empty input yields empty results.

pub mod profiles;
pub mod stats;
pub mod summary;

pub use profiles::{
    CorrelationMatrix, HourProfile, MonthlyAverage, RollingPoint, Season, SeasonStats,
    SpreadPoint, WeekdayProfile,
};
pub use summary::{BucketStats, Granularity, OverallStats, ZoneSummary};

use crate::core::types::{Observation, PriceTable};

/// Knobs for [`Analysis::compute`]
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub granularity: Granularity,
    pub extremes: usize,
    pub rolling_window: usize,
    pub rolling_min_periods: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        use crate::core::constants::defaults;
        Self {
            granularity: Granularity::Monthly,
            extremes: defaults::EXTREMES,
            rolling_window: defaults::ROLLING_WINDOW_HOURS,
            rolling_min_periods: defaults::ROLLING_MIN_PERIODS,
        }
    }
}

/// All aggregates derived from one price table
#[derive(Debug, Clone)]
pub struct Analysis {
    pub overall: OverallStats,
    /// Ranked, one per zone column
    pub zone_summaries: Vec<ZoneSummary>,
    pub granularity: Granularity,
    pub bucket_stats: Vec<BucketStats>,
    pub monthly: Vec<MonthlyAverage>,
    pub rolling: Vec<RollingPoint>,
    pub spread: Vec<SpreadPoint>,
    pub hour_of_day: Vec<HourProfile>,
    pub day_of_week: Vec<WeekdayProfile>,
    pub seasonal: Vec<SeasonStats>,
    pub correlation: CorrelationMatrix,
    /// Requested size of the spike and dip lists
    pub extremes: usize,
    pub spikes: Vec<Observation>,
    pub dips: Vec<Observation>,
}

impl Analysis {
    pub fn compute(table: &PriceTable, options: &AnalysisOptions) -> Self {
        let (spikes, dips) = profiles::extremes(table, options.extremes);

        Self {
            overall: summary::overall_stats(table),
            zone_summaries: summary::summarize_zones(table),
            granularity: options.granularity,
            bucket_stats: summary::bucket_stats(table, options.granularity),
            monthly: profiles::monthly_averages(table),
            rolling: profiles::rolling_stats(
                table,
                options.rolling_window,
                options.rolling_min_periods,
            ),
            spread: profiles::interzonal_spread(table),
            hour_of_day: profiles::hour_of_day_profile(table),
            day_of_week: profiles::day_of_week_profile(table),
            seasonal: profiles::seasonal_summary(table),
            correlation: profiles::correlation_matrix(table),
            extremes: options.extremes,
            spikes,
            dips,
        }
    }

    /// Zones with data, highest mean first, at most `n`
    pub fn top_zones(&self, n: usize) -> Vec<&str> {
        self.zone_summaries
            .iter()
            .filter(|s| !s.is_empty())
            .take(n)
            .map(|s| s.zone.as_str())
            .collect()
    }

    /// Distinct years present in the monthly averages, ascending
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.monthly.iter().map(|m| m.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}
