use std::collections::HashMap;

use chrono::Weekday;

use crate::analyzers::types::{
    AgentBreakdown, AggregateViews, CategoryBreakdown, HourCount, OverlapSummary, PairRanking,
    TimePeriodCount, WeekdayBreakdown,
};
use crate::analyzers::utility::{mean, median, sample_stddev};
use crate::overlap::{Category, OverlapRecord};
use crate::stats::InputSummary;

/// Number of agent pairs kept in the simultaneous-flag ranking.
pub const TOP_PAIRS: usize = 5;

const PEAK_HOURS: usize = 5;

const WEEKDAYS: [(Weekday, &str); 7] = [
    (Weekday::Mon, "Monday"),
    (Weekday::Tue, "Tuesday"),
    (Weekday::Wed, "Wednesday"),
    (Weekday::Thu, "Thursday"),
    (Weekday::Fri, "Friday"),
    (Weekday::Sat, "Saturday"),
    (Weekday::Sun, "Sunday"),
];

/// Computes every summary view over `records`.
///
/// Ranking ties are broken by record order, so pass records in a stable order
/// (the detector returns them sorted by source row).
pub fn aggregate(records: &[OverlapRecord]) -> AggregateViews {
    let both: Vec<&OverlapRecord> = records
        .iter()
        .filter(|r| r.category == Category::BothFlagged)
        .collect();

    let both_flagged_hourly = hourly_counts(both.iter().copied());

    AggregateViews {
        summary: summarize(records.iter()),
        categories: category_breakdown(records),
        hourly: hourly_counts(records.iter()),
        peak_hours: peak_hours(records, PEAK_HOURS),
        time_periods: time_periods(records),
        agents: agent_breakdown(records),
        weekdays: weekday_breakdown(records),
        both_flagged: summarize(both.iter().copied()),
        peak_both_flagged_hour: peak_hour(&both_flagged_hourly),
        both_flagged_hourly,
        top_pairs: top_pairs(records, TOP_PAIRS),
    }
}

pub fn summarize<'a>(records: impl Iterator<Item = &'a OverlapRecord>) -> OverlapSummary {
    let durations: Vec<i64> = records.map(|r| r.duration_secs).collect();
    let as_f64: Vec<f64> = durations.iter().map(|&d| d as f64).collect();

    OverlapSummary {
        count: durations.len(),
        total_duration_secs: durations.iter().sum(),
        mean_duration_secs: mean(&as_f64),
        max_duration_secs: durations.iter().copied().max().unwrap_or(0),
    }
}

/// One row per category, in [`Category::ALL`] order, including empty ones.
pub fn category_breakdown(records: &[OverlapRecord]) -> Vec<CategoryBreakdown> {
    Category::ALL
        .iter()
        .map(|&category| {
            let durations: Vec<f64> = records
                .iter()
                .filter(|r| r.category == category)
                .map(|r| r.duration_secs as f64)
                .collect();
            let avg = mean(&durations);

            CategoryBreakdown {
                category,
                count: durations.len(),
                percentage: InputSummary::pct(durations.len(), records.len()),
                mean_duration_secs: avg,
                median_duration_secs: median(&durations),
                stddev_duration_secs: sample_stddev(&durations, avg),
            }
        })
        .collect()
}

/// Counts for all 24 hours of the day, keyed by the window start hour.
pub fn hourly_counts<'a>(records: impl Iterator<Item = &'a OverlapRecord>) -> Vec<HourCount> {
    let mut counts = [0usize; 24];
    for r in records {
        counts[r.hour() as usize] += 1;
    }

    (0u32..)
        .zip(counts)
        .map(|(hour, count)| HourCount { hour, count })
        .collect()
}

/// The hour with the most overlaps, lowest hour on ties. `None` if all counts are zero.
pub fn peak_hour(hourly: &[HourCount]) -> Option<u32> {
    let mut best: Option<&HourCount> = None;
    for h in hourly.iter().filter(|h| h.count > 0) {
        if best.is_none_or(|b| h.count > b.count) {
            best = Some(h);
        }
    }
    best.map(|h| h.hour)
}

/// Up to `n` busiest hours, busiest first, lowest hour on ties. Empty hours are omitted.
pub fn peak_hours(records: &[OverlapRecord], n: usize) -> Vec<HourCount> {
    let mut hours: Vec<HourCount> = hourly_counts(records.iter())
        .into_iter()
        .filter(|h| h.count > 0)
        .collect();
    hours.sort_by(|a, b| b.count.cmp(&a.count));
    hours.truncate(n);
    hours
}

/// Counts in twelve two-hour periods: `00-01`, `02-03`, ..., `22-23`.
pub fn time_periods(records: &[OverlapRecord]) -> Vec<TimePeriodCount> {
    let mut counts = [0usize; 12];
    for r in records {
        counts[(r.hour() / 2) as usize] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| TimePeriodCount {
            period: format!("{:02}-{:02}", i * 2, i * 2 + 1),
            count,
        })
        .collect()
}

/// Per-agent involvement, largest total overlap time first, then by agent id.
pub fn agent_breakdown(records: &[OverlapRecord]) -> Vec<AgentBreakdown> {
    let mut by_agent: HashMap<&str, AgentBreakdown> = HashMap::new();

    for r in records {
        let sides = [
            (r.agent_a.as_str(), r.flagged_a, r.flagged_b),
            (r.agent_b.as_str(), r.flagged_b, r.flagged_a),
        ];

        for (agent, own_flag, other_flag) in sides {
            let entry = by_agent.entry(agent).or_insert_with(|| AgentBreakdown {
                agent: agent.to_string(),
                total_overlaps: 0,
                flagged_count: 0,
                counterpart_flagged_count: 0,
                total_duration_secs: 0,
                mean_duration_secs: 0.0,
            });

            entry.total_overlaps += 1;
            entry.total_duration_secs += r.duration_secs;
            if own_flag {
                entry.flagged_count += 1;
            } else if other_flag {
                entry.counterpart_flagged_count += 1;
            }
        }
    }

    let mut agents: Vec<AgentBreakdown> = by_agent
        .into_values()
        .map(|mut a| {
            a.mean_duration_secs = a.total_duration_secs as f64 / a.total_overlaps as f64;
            a
        })
        .collect();
    agents.sort_by(|a, b| {
        b.total_duration_secs
            .cmp(&a.total_duration_secs)
            .then_with(|| a.agent.cmp(&b.agent))
    });
    agents
}

/// Monday through Sunday, all seven days present.
pub fn weekday_breakdown(records: &[OverlapRecord]) -> Vec<WeekdayBreakdown> {
    WEEKDAYS
        .iter()
        .map(|&(weekday, name)| {
            let (count, total) = records
                .iter()
                .filter(|r| r.weekday() == weekday)
                .fold((0, 0), |(c, t), r| (c + 1, t + r.duration_secs));

            WeekdayBreakdown {
                day: name.to_string(),
                count,
                total_duration_secs: total,
            }
        })
        .collect()
}

/// The `n` agent pairs most often both flagged at once.
///
/// Pairs are unordered: `{A, B}` and `{B, A}` share one entry, reported in the
/// orientation first seen. Equal counts keep first-seen order.
pub fn top_pairs(records: &[OverlapRecord], n: usize) -> Vec<PairRanking> {
    let mut pairs: Vec<PairRanking> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for r in records.iter().filter(|r| r.category == Category::BothFlagged) {
        let key = if r.agent_a <= r.agent_b {
            (r.agent_a.as_str(), r.agent_b.as_str())
        } else {
            (r.agent_b.as_str(), r.agent_a.as_str())
        };

        let slot = *index.entry(key).or_insert_with(|| {
            pairs.push(PairRanking {
                agent_a: r.agent_a.clone(),
                agent_b: r.agent_b.clone(),
                incidents: 0,
                total_duration_secs: 0,
            });
            pairs.len() - 1
        });

        pairs[slot].incidents += 1;
        pairs[slot].total_duration_secs += r.duration_secs;
    }

    pairs.sort_by(|a, b| b.incidents.cmp(&a.incidents));
    pairs.truncate(n);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::classify;
    use chrono::{NaiveDate, TimeDelta};

    fn record(a: &str, b: &str, flags: (bool, bool), day: u32, hour: u32, secs: i64) -> OverlapRecord {
        // 2024-03-11 is a Monday
        let start = NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        OverlapRecord {
            agent_a: a.to_string(),
            agent_b: b.to_string(),
            row_a: 0,
            row_b: 1,
            window_start: start,
            window_end: start + TimeDelta::seconds(secs),
            duration_secs: secs,
            reason_a: if flags.0 { "Lunch" } else { "Break" }.to_string(),
            reason_b: if flags.1 { "Lunch" } else { "Break" }.to_string(),
            flagged_a: flags.0,
            flagged_b: flags.1,
            category: classify(flags.0, flags.1),
        }
    }

    fn sample() -> Vec<OverlapRecord> {
        vec![
            record("A", "B", (true, true), 11, 12, 600),
            record("A", "C", (true, false), 11, 12, 300),
            record("B", "C", (false, true), 12, 13, 120),
            record("B", "A", (true, true), 13, 13, 900),
            record("C", "D", (true, true), 17, 23, 60),
        ]
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let views = aggregate(&[]);

        assert_eq!(views.summary, OverlapSummary::default());
        assert_eq!(views.both_flagged, OverlapSummary::default());
        assert_eq!(views.categories.len(), 4);
        assert!(views.categories.iter().all(|c| c.count == 0 && c.percentage == 0.0));
        assert!(views.categories.iter().all(|c| c.mean_duration_secs == 0.0));
        assert_eq!(views.hourly.len(), 24);
        assert!(views.peak_hours.is_empty());
        assert_eq!(views.peak_both_flagged_hour, None);
        assert_eq!(views.weekdays.len(), 7);
        assert!(views.agents.is_empty());
        assert!(views.top_pairs.is_empty());
    }

    #[test]
    fn test_global_summary() {
        let s = summarize(sample().iter());
        assert_eq!(s.count, 5);
        assert_eq!(s.total_duration_secs, 1980);
        assert_eq!(s.mean_duration_secs, 396.0);
        assert_eq!(s.max_duration_secs, 900);
    }

    #[test]
    fn test_category_counts_sum_to_total() {
        let records = sample();
        let categories = category_breakdown(&records);

        let total: usize = categories.iter().map(|c| c.count).sum();
        assert_eq!(total, records.len());

        let both = &categories[0];
        assert_eq!(both.category, Category::BothFlagged);
        assert_eq!(both.count, 3);
        assert_eq!(both.percentage, 60.0);
        assert_eq!(both.median_duration_secs, 600.0);
        assert_eq!(categories[3].count, 0);
    }

    #[test]
    fn test_category_stddev_uses_sample_formula() {
        let records = vec![
            record("A", "B", (true, true), 11, 12, 60),
            record("A", "C", (true, true), 11, 12, 120),
            record("B", "C", (true, false), 11, 12, 300),
        ];
        let categories = category_breakdown(&records);

        assert_eq!(categories[0].stddev_duration_secs, 1800f64.sqrt());
        // a single member has no spread
        assert_eq!(categories[1].count, 1);
        assert_eq!(categories[1].stddev_duration_secs, 0.0);
    }

    #[test]
    fn test_hourly_and_peaks() {
        let views = aggregate(&sample());

        assert_eq!(views.hourly[12].count, 2);
        assert_eq!(views.hourly[13].count, 2);
        assert_eq!(views.hourly[23].count, 1);

        let peaks: Vec<_> = views.peak_hours.iter().map(|h| (h.hour, h.count)).collect();
        assert_eq!(peaks, vec![(12, 2), (13, 2), (23, 1)]);

        // both-flagged: hour 12 once, hour 13 once, hour 23 once -> lowest hour wins
        assert_eq!(views.peak_both_flagged_hour, Some(12));
        assert_eq!(views.both_flagged.count, 3);
        assert_eq!(views.both_flagged.total_duration_secs, 1560);
    }

    #[test]
    fn test_peak_hour_prefers_higher_count() {
        let records = vec![
            record("A", "B", (true, true), 11, 9, 60),
            record("A", "C", (true, true), 11, 14, 60),
            record("B", "C", (true, true), 11, 14, 60),
        ];
        assert_eq!(aggregate(&records).peak_both_flagged_hour, Some(14));
    }

    #[test]
    fn test_time_periods() {
        let periods = time_periods(&sample());
        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].period, "00-01");
        assert_eq!(periods[6].period, "12-13");
        assert_eq!(periods[6].count, 4);
        assert_eq!(periods[11].period, "22-23");
        assert_eq!(periods[11].count, 1);
    }

    #[test]
    fn test_agent_breakdown_reconstructs_counts() {
        let records = sample();
        let agents = agent_breakdown(&records);

        for a in &agents {
            let expected = records.iter().filter(|r| r.involves(&a.agent)).count();
            assert_eq!(a.total_overlaps, expected, "agent {}", a.agent);
        }

        let b = agents.iter().find(|a| a.agent == "B").unwrap();
        assert_eq!(b.total_overlaps, 3);
        assert_eq!(b.flagged_count, 2);
        assert_eq!(b.counterpart_flagged_count, 1);
        assert_eq!(b.total_duration_secs, 1620);
        assert_eq!(b.mean_duration_secs, 540.0);

        let c = agents.iter().find(|a| a.agent == "C").unwrap();
        assert_eq!(c.flagged_count, 2);
        assert_eq!(c.counterpart_flagged_count, 1);

        assert_eq!(agents[0].agent, "A");
        assert_eq!(agents[0].total_duration_secs, 1800);
    }

    #[test]
    fn test_agent_breakdown_neither_flagged() {
        let records = vec![record("A", "B", (false, false), 11, 10, 60)];
        let agents = agent_breakdown(&records);
        assert!(agents.iter().all(|a| a.flagged_count == 0 && a.counterpart_flagged_count == 0));
    }

    #[test]
    fn test_weekday_breakdown_order() {
        let days = weekday_breakdown(&sample());
        let names: Vec<_> = days.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(
            names,
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );
        assert_eq!((days[0].count, days[0].total_duration_secs), (2, 900));
        assert_eq!((days[1].count, days[1].total_duration_secs), (1, 120));
        assert_eq!((days[2].count, days[2].total_duration_secs), (1, 900));
        assert_eq!((days[6].count, days[6].total_duration_secs), (1, 60));
    }

    #[test]
    fn test_top_pairs_groups_unordered_pairs() {
        let pairs = top_pairs(&sample(), TOP_PAIRS);

        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].agent_a.as_str(), pairs[0].agent_b.as_str()), ("A", "B"));
        assert_eq!(pairs[0].incidents, 2);
        assert_eq!(pairs[0].total_duration_secs, 1500);
        assert_eq!((pairs[1].agent_a.as_str(), pairs[1].agent_b.as_str()), ("C", "D"));
    }

    #[test]
    fn test_top_pairs_ties_keep_first_seen_and_truncate() {
        let records: Vec<_> = ["B", "C", "D", "E", "F", "G"]
            .iter()
            .map(|other| record("A", other, (true, true), 11, 12, 60))
            .collect();
        let pairs = top_pairs(&records, TOP_PAIRS);

        let partners: Vec<_> = pairs.iter().map(|p| p.agent_b.as_str()).collect();
        assert_eq!(partners, vec!["B", "C", "D", "E", "F"]);
    }
}
