//! Time-of-use, seasonal and cross-zone analytics feeding the advanced charts.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

use super::stats;
use crate::core::types::{Observation, PriceTable};

/// Weekday names in chart order
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Meteorological season of a delivery month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Winter,
        Season::Spring,
        Season::Summer,
        Season::Autumn,
    ];

    pub fn of_month(month: u32) -> Season {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

/// Mean price of one zone in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub zone: String,
    pub year: i32,
    pub month: u32,
    pub price: f64,
}

impl MonthlyAverage {
    /// `YYYY-MM`
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingPoint {
    pub timestamp: NaiveDateTime,
    pub average: Option<f64>,
    pub mean: Option<f64>,
    pub volatility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadPoint {
    pub timestamp: NaiveDateTime,
    /// Highest minus lowest zone price in the hour
    pub spread: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourProfile {
    pub hour: u32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayProfile {
    pub weekday: &'static str,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonStats {
    pub season: Season,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Square correlation matrix in zone column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub zones: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

/// Mean per (zone, year, month), sorted by zone, year and month
pub fn monthly_averages(table: &PriceTable) -> Vec<MonthlyAverage> {
    let mut groups: BTreeMap<(String, i32, u32), Vec<f64>> = BTreeMap::new();
    for obs in table.observations() {
        groups
            .entry((obs.zone, obs.timestamp.year(), obs.timestamp.month()))
            .or_default()
            .push(obs.price);
    }

    groups
        .into_iter()
        .filter_map(|((zone, year, month), values)| {
            stats::mean(&values).map(|price| MonthlyAverage {
                zone,
                year,
                month,
                price,
            })
        })
        .collect()
}

/// Mean across zones for every row
pub fn average_series(table: &PriceTable) -> Vec<(NaiveDateTime, Option<f64>)> {
    table
        .rows()
        .iter()
        .map(|row| {
            let present: Vec<f64> = row.present().collect();
            (row.timestamp, stats::mean(&present))
        })
        .collect()
}

/// Rolling mean and volatility of the cross-zone average.
///
/// The window spans `window` rows; a point is reported once at least
/// `min_periods` of them carry a value. Volatility needs two values.
pub fn rolling_stats(table: &PriceTable, window: usize, min_periods: usize) -> Vec<RollingPoint> {
    let series = average_series(table);
    let window = window.max(1);
    let min_periods = min_periods.max(1);

    let (mut sum, mut sum_sq, mut count) = (0.0_f64, 0.0_f64, 0_usize);
    let mut out = Vec::with_capacity(series.len());

    for (i, &(timestamp, average)) in series.iter().enumerate() {
        if let Some(v) = average {
            sum += v;
            sum_sq += v * v;
            count += 1;
        }
        if i >= window
            && let Some(old) = series[i - window].1
        {
            sum -= old;
            sum_sq -= old * old;
            count -= 1;
        }

        let (mean, volatility) = if count >= min_periods {
            let n = count as f64;
            let mean = sum / n;
            let vol = (count >= 2)
                .then(|| ((sum_sq - n * mean * mean) / (n - 1.0)).max(0.0).sqrt());
            (Some(mean), vol)
        } else {
            (None, None)
        };

        out.push(RollingPoint {
            timestamp,
            average,
            mean,
            volatility,
        });
    }
    out
}

/// Max minus min across zones for every row
pub fn interzonal_spread(table: &PriceTable) -> Vec<SpreadPoint> {
    table
        .rows()
        .iter()
        .map(|row| {
            let present: Vec<f64> = row.present().collect();
            let spread = match (stats::max(&present), stats::min(&present)) {
                (Some(hi), Some(lo)) => Some(hi - lo),
                _ => None,
            };
            SpreadPoint {
                timestamp: row.timestamp,
                spread,
            }
        })
        .collect()
}

/// Mean price per hour of day over all zones; hours without data are omitted
pub fn hour_of_day_profile(table: &PriceTable) -> Vec<HourProfile> {
    let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for obs in table.observations() {
        groups.entry(obs.timestamp.hour()).or_default().push(obs.price);
    }
    groups
        .into_iter()
        .filter_map(|(hour, values)| stats::mean(&values).map(|price| HourProfile { hour, price }))
        .collect()
}

/// Mean price per weekday over all zones, Monday first
pub fn day_of_week_profile(table: &PriceTable) -> Vec<WeekdayProfile> {
    let mut groups: [Vec<f64>; 7] = Default::default();
    for obs in table.observations() {
        groups[obs.timestamp.weekday().num_days_from_monday() as usize].push(obs.price);
    }
    WEEKDAYS
        .iter()
        .zip(groups.iter())
        .map(|(&weekday, values)| WeekdayProfile {
            weekday,
            price: stats::mean(values),
        })
        .collect()
}

/// Descriptive statistics per season, Winter first
pub fn seasonal_summary(table: &PriceTable) -> Vec<SeasonStats> {
    let mut groups: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for obs in table.observations() {
        groups
            .entry(Season::of_month(obs.timestamp.month()))
            .or_default()
            .push(obs.price);
    }

    Season::ALL
        .iter()
        .map(|&season| {
            let values = groups.get(&season).map(Vec::as_slice).unwrap_or(&[]);
            SeasonStats {
                season,
                mean: stats::mean(values),
                median: stats::median(values),
                std: stats::sample_std(values),
                min: stats::min(values),
                max: stats::max(values),
            }
        })
        .collect()
}

/// 7 x 24 matrix of mean prices for one zone (weekday rows, hour columns)
pub fn hour_dow_matrix(table: &PriceTable, zone_idx: usize) -> Vec<Vec<Option<f64>>> {
    let mut cells: Vec<Vec<Vec<f64>>> = vec![vec![Vec::new(); 24]; 7];
    for row in table.rows() {
        if let Some(price) = row.prices[zone_idx] {
            let dow = row.timestamp.weekday().num_days_from_monday() as usize;
            cells[dow][row.timestamp.hour() as usize].push(price);
        }
    }
    cells
        .iter()
        .map(|hours| hours.iter().map(|values| stats::mean(values)).collect())
        .collect()
}

/// Pairwise Pearson correlation over rows where both zones are present
pub fn correlation_matrix(table: &PriceTable) -> CorrelationMatrix {
    let n = table.zones().len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = table
                .rows()
                .iter()
                .filter_map(|row| Some((row.prices[i]?, row.prices[j]?)))
                .unzip();
            let r = if i == j && stats::pearson(&xs, &ys).is_some() {
                Some(1.0)
            } else {
                stats::pearson(&xs, &ys)
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        zones: table.zones().to_vec(),
        values,
    }
}

/// The `n` highest and `n` lowest observations
pub fn extremes(table: &PriceTable, n: usize) -> (Vec<Observation>, Vec<Observation>) {
    let mut all: Vec<Observation> = table.observations().collect();

    all.sort_by(|a, b| b.price.total_cmp(&a.price));
    let spikes: Vec<Observation> = all.iter().take(n).cloned().collect();

    all.sort_by(|a, b| a.price.total_cmp(&b.price));
    let dips: Vec<Observation> = all.into_iter().take(n).collect();

    (spikes, dips)
}

/// Calendar-month means of each given zone, months without data skipped
pub fn monthly_zone_means(table: &PriceTable, zone_indices: &[usize]) -> Vec<Vec<f64>> {
    zone_indices
        .iter()
        .map(|&idx| {
            let mut groups: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
            for row in table.rows() {
                if let Some(price) = row.prices[idx] {
                    groups
                        .entry((row.timestamp.year(), row.timestamp.month()))
                        .or_default()
                        .push(price);
                }
            }
            groups.values().filter_map(|v| stats::mean(v)).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PriceRow;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn table(rows: Vec<PriceRow>) -> PriceTable {
        PriceTable::new(vec!["A".into(), "B".into()], rows).unwrap()
    }

    #[test]
    fn test_season_of_month() {
        assert_eq!(Season::of_month(12), Season::Winter);
        assert_eq!(Season::of_month(1), Season::Winter);
        assert_eq!(Season::of_month(2), Season::Winter);
        assert_eq!(Season::of_month(3), Season::Spring);
        assert_eq!(Season::of_month(7), Season::Summer);
        assert_eq!(Season::of_month(11), Season::Autumn);
        assert_eq!(Season::Autumn.name(), "Autumn");
    }

    #[test]
    fn test_monthly_averages_sorted() {
        let t = table(vec![
            PriceRow::new(at(2024, 2, 1, 0), vec![Some(4.0), Some(1.0)]),
            PriceRow::new(at(2024, 1, 1, 0), vec![Some(2.0), None]),
            PriceRow::new(at(2024, 1, 2, 0), vec![Some(4.0), Some(3.0)]),
        ]);
        let monthly = monthly_averages(&t);

        let labels: Vec<_> = monthly
            .iter()
            .map(|m| format!("{} {}", m.zone, m.label()))
            .collect();
        assert_eq!(labels, vec!["A 2024-01", "A 2024-02", "B 2024-01", "B 2024-02"]);
        assert_eq!(monthly[0].price, 3.0);
        assert_eq!((monthly[0].year, monthly[0].month), (2024, 1));
    }

    #[test]
    fn test_average_and_spread_series() {
        let t = table(vec![
            PriceRow::new(at(2024, 1, 1, 0), vec![Some(10.0), Some(30.0)]),
            PriceRow::new(at(2024, 1, 1, 1), vec![None, None]),
            PriceRow::new(at(2024, 1, 1, 2), vec![Some(5.0), None]),
        ]);

        let avg = average_series(&t);
        assert_eq!(avg[0].1, Some(20.0));
        assert_eq!(avg[1].1, None);
        assert_eq!(avg[2].1, Some(5.0));

        let spread = interzonal_spread(&t);
        assert_eq!(spread[0].spread, Some(20.0));
        assert_eq!(spread[1].spread, None);
        assert_eq!(spread[2].spread, Some(0.0));
    }

    #[test]
    fn test_rolling_stats_respects_min_periods() {
        let rows = (0..6)
            .map(|h| PriceRow::new(at(2024, 1, 1, h), vec![Some(h as f64), None]))
            .collect();
        let rolling = rolling_stats(&table(rows), 3, 2);

        assert_eq!(rolling[0].mean, None);
        assert_eq!(rolling[1].mean, Some(0.5));
        assert_eq!(rolling[2].mean, Some(1.0));
        // window of 3 slides: values 3, 4, 5
        assert_eq!(rolling[5].mean, Some(4.0));
        let vol = rolling[5].volatility.unwrap();
        assert!((vol - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_stats_skips_missing_rows() {
        let t = table(vec![
            PriceRow::new(at(2024, 1, 1, 0), vec![Some(2.0), None]),
            PriceRow::new(at(2024, 1, 1, 1), vec![None, None]),
            PriceRow::new(at(2024, 1, 1, 2), vec![Some(4.0), None]),
        ]);
        let rolling = rolling_stats(&t, 3, 2);

        assert_eq!(rolling[1].mean, None);
        assert_eq!(rolling[1].average, None);
        assert_eq!(rolling[2].mean, Some(3.0));
    }

    #[test]
    fn test_hour_and_weekday_profiles() {
        // 2024-01-01 is a Monday
        let t = table(vec![
            PriceRow::new(at(2024, 1, 1, 5), vec![Some(10.0), Some(20.0)]),
            PriceRow::new(at(2024, 1, 2, 5), vec![Some(30.0), None]),
            PriceRow::new(at(2024, 1, 2, 6), vec![Some(50.0), None]),
        ]);

        let hod = hour_of_day_profile(&t);
        assert_eq!(hod, vec![
            HourProfile { hour: 5, price: 20.0 },
            HourProfile { hour: 6, price: 50.0 },
        ]);

        let dow = day_of_week_profile(&t);
        assert_eq!(dow.len(), 7);
        assert_eq!(dow[0].weekday, "Monday");
        assert_eq!(dow[0].price, Some(15.0));
        assert_eq!(dow[1].price, Some(40.0));
        assert_eq!(dow[6].price, None);
    }

    #[test]
    fn test_seasonal_summary_always_four_seasons() {
        let t = table(vec![
            PriceRow::new(at(2024, 1, 1, 0), vec![Some(10.0), Some(20.0)]),
            PriceRow::new(at(2024, 7, 1, 0), vec![Some(100.0), None]),
        ]);
        let seasonal = seasonal_summary(&t);

        assert_eq!(seasonal.len(), 4);
        assert_eq!(seasonal[0].season, Season::Winter);
        assert_eq!(seasonal[0].mean, Some(15.0));
        assert_eq!(seasonal[1].mean, None);
        assert_eq!(seasonal[2].max, Some(100.0));
        assert_eq!(seasonal[2].std, None);
    }

    #[test]
    fn test_hour_dow_matrix_shape() {
        let t = table(vec![
            PriceRow::new(at(2024, 1, 1, 3), vec![Some(10.0), None]),
            PriceRow::new(at(2024, 1, 8, 3), vec![Some(20.0), None]),
        ]);
        let matrix = hour_dow_matrix(&t, 0);

        assert_eq!(matrix.len(), 7);
        assert!(matrix.iter().all(|hours| hours.len() == 24));
        assert_eq!(matrix[0][3], Some(15.0));
        assert_eq!(matrix[0][4], None);
        assert!(hour_dow_matrix(&t, 1).iter().flatten().all(Option::is_none));
    }

    #[test]
    fn test_correlation_matrix() {
        let t = table(vec![
            PriceRow::new(at(2024, 1, 1, 0), vec![Some(1.0), Some(2.0)]),
            PriceRow::new(at(2024, 1, 1, 1), vec![Some(2.0), Some(4.0)]),
            PriceRow::new(at(2024, 1, 1, 2), vec![Some(3.0), None]),
            PriceRow::new(at(2024, 1, 1, 3), vec![Some(4.0), Some(8.0)]),
        ]);
        let corr = correlation_matrix(&t);

        assert_eq!(corr.zones, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(corr.values[0][0], Some(1.0));
        assert!((corr.values[0][1].unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(corr.values[0][1], corr.values[1][0]);
    }

    #[test]
    fn test_correlation_undefined_for_constant_zone() {
        let t = table(vec![
            PriceRow::new(at(2024, 1, 1, 0), vec![Some(1.0), Some(5.0)]),
            PriceRow::new(at(2024, 1, 1, 1), vec![Some(2.0), Some(5.0)]),
        ]);
        let corr = correlation_matrix(&t);
        assert_eq!(corr.values[0][1], None);
        assert_eq!(corr.values[1][1], None);
    }

    #[test]
    fn test_extremes() {
        let t = table(vec![
            PriceRow::new(at(2024, 1, 1, 0), vec![Some(10.0), Some(-3.0)]),
            PriceRow::new(at(2024, 1, 1, 1), vec![Some(99.0), None]),
            PriceRow::new(at(2024, 1, 1, 2), vec![Some(50.0), Some(0.0)]),
        ]);
        let (spikes, dips) = extremes(&t, 2);

        assert_eq!(spikes.iter().map(|o| o.price).collect::<Vec<_>>(), vec![99.0, 50.0]);
        assert_eq!(dips.iter().map(|o| o.price).collect::<Vec<_>>(), vec![-3.0, 0.0]);
        assert_eq!(dips[0].zone, "B");

        let (all_spikes, _) = extremes(&t, 100);
        assert_eq!(all_spikes.len(), 5);
    }

    #[test]
    fn test_monthly_zone_means() {
        let t = table(vec![
            PriceRow::new(at(2024, 1, 1, 0), vec![Some(10.0), None]),
            PriceRow::new(at(2024, 1, 2, 0), vec![Some(20.0), None]),
            PriceRow::new(at(2024, 2, 1, 0), vec![Some(40.0), Some(1.0)]),
        ]);
        let means = monthly_zone_means(&t, &[0, 1]);
        assert_eq!(means, vec![vec![15.0, 40.0], vec![1.0]]);
    }
}
