//! Cron approximation of a pool's cycle time
//!
//! Schedulers only understand six-field cron patterns
//! (`second minute hour day month weekday`), so a cycle time becomes a set
//! of patterns which, installed together, fire once per cycle:
//!
//! - cycles dividing a day evenly become daily patterns
//! - cycles dividing a week evenly become weekly patterns
//! - anything else becomes one pattern per run over a year. Such a schedule
//!   glitches around its anniversary, with either dead time or overlapping runs.

use std::fmt;

use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc};
use serde::{Serialize, Serializer};

const DAY: u64 = 24 * 60 * 60;
const WEEK: u64 = 7 * DAY;
const YEAR_DAYS: i64 = 365;

/// One six-field cron expression. `None` fields render as `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CronSchedule {
    pub second: u32,
    pub minute: u32,
    pub hour: u32,
    pub day: Option<u32>,
    pub month: Option<u32>,
    /// Sunday is 0
    pub weekday: Option<u32>,
}

impl CronSchedule {
    fn daily(at: DateTime<Utc>) -> Self {
        Self {
            second: at.second(),
            minute: at.minute(),
            hour: at.hour(),
            day: None,
            month: None,
            weekday: None,
        }
    }

    fn weekly(at: DateTime<Utc>) -> Self {
        Self {
            weekday: Some(at.weekday().num_days_from_sunday()),
            ..Self::daily(at)
        }
    }

    fn annual(at: DateTime<Utc>) -> Self {
        Self {
            day: Some(at.day()),
            month: Some(at.month()),
            ..Self::daily(at)
        }
    }
}

struct Field(Option<u32>);

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("*"),
        }
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.second,
            self.minute,
            self.hour,
            Field(self.day),
            Field(self.month),
            Field(self.weekday)
        )
    }
}

impl Serialize for CronSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Cron patterns firing every `cycle_time` seconds after `start`.
///
/// The first pattern is one interval after `start`, not `start` itself.
/// A zero cycle time yields nothing.
pub fn cycle_crons(start: DateTime<Utc>, cycle_time: u64) -> Vec<CronSchedule> {
    let Some(interval) = i64::try_from(cycle_time)
        .ok()
        .filter(|seconds| *seconds > 0)
        .and_then(TimeDelta::try_seconds)
    else {
        return Vec::new();
    };

    let (span_days, pattern): (i64, fn(DateTime<Utc>) -> CronSchedule) = if DAY % cycle_time == 0 {
        (1, CronSchedule::daily)
    } else if WEEK % cycle_time == 0 {
        (7, CronSchedule::weekly)
    } else {
        (YEAR_DAYS, CronSchedule::annual)
    };

    let mut crons = Vec::new();
    let Some(stop) = start.checked_add_signed(TimeDelta::days(span_days)) else {
        return crons;
    };
    let mut now = start;
    while now < stop {
        let Some(next) = now.checked_add_signed(interval) else {
            break;
        };
        now = next;
        crons.push(pattern(now));
    }
    crons
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn new_year() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn render(crons: &[CronSchedule]) -> Vec<String> {
        crons.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn hourly_cycle_is_daily_pattern() {
        let crons = cycle_crons(new_year(), 3600);
        assert_eq!(crons.len(), 24);

        let rendered = render(&crons);
        assert_eq!(rendered[0], "0 0 1 * * *");
        assert_eq!(rendered[22], "0 0 23 * * *");
        assert_eq!(rendered[23], "0 0 0 * * *");
        let unique: HashSet<&String> = rendered.iter().collect();
        assert_eq!(unique.len(), 24);
    }

    #[test]
    fn whole_day_cycle_is_single_pattern() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 6, 30, 15).unwrap();
        assert_eq!(render(&cycle_crons(start, DAY)), vec!["15 30 6 * * *"]);
    }

    #[test]
    fn two_day_cycle_falls_through_to_annual_pattern() {
        let crons = cycle_crons(new_year(), 2 * DAY);
        assert_eq!(crons.len(), 183);
        assert_eq!(crons[0].to_string(), "0 0 0 3 1 *");
    }

    #[test]
    fn weekly_divisor_uses_weekday() {
        // 84 hours divides a week but not a day.
        let crons = cycle_crons(new_year(), 84 * 3600);
        // 2024-01-01 is a Monday.
        assert_eq!(render(&crons), vec!["0 0 12 * * 4", "0 0 0 * * 1"]);
    }

    #[test]
    fn irregular_cycle_is_annual_pattern() {
        let crons = cycle_crons(new_year(), 5 * DAY);
        assert_eq!(crons.len(), 73);
        assert_eq!(crons[0].to_string(), "0 0 0 6 1 *");
        assert_eq!(crons[1].to_string(), "0 0 0 11 1 *");
    }

    #[test]
    fn zero_cycle_yields_nothing() {
        assert!(cycle_crons(new_year(), 0).is_empty());
    }

    #[test]
    fn serializes_as_expression() {
        let cron = CronSchedule::weekly(new_year());
        assert_eq!(serde_json::to_string(&cron).unwrap(), "\"0 0 0 * * 1\"");
    }
}
