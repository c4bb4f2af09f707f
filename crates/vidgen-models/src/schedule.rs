//! Recurring generation schedules.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::job::Provider;

/// Maximum accepted schedule prompt length.
pub const MAX_SCHEDULE_PROMPT_LENGTH: usize = 4000;

/// Unique identifier for a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub String);

impl ScheduleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScheduleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How often a schedule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(Frequency::Hourly),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

/// Compute the next run time: one frequency unit after `from`.
///
/// Monthly addition is calendar-aware (Jan 31 + 1 month clamps to the end
/// of February rather than overflowing).
pub fn next_run(frequency: Frequency, from: DateTime<Utc>) -> DateTime<Utc> {
    match frequency {
        Frequency::Hourly => from + Duration::hours(1),
        Frequency::Daily => from + Duration::days(1),
        Frequency::Weekly => from + Duration::weeks(1),
        Frequency::Monthly => from
            .checked_add_months(Months::new(1))
            .unwrap_or(from + Duration::days(30)),
    }
}

/// A recurring generation definition.
///
/// While enabled, `next_run_at` is always `next_run(frequency, last_run_at
/// or created_at)`. `total_runs` increments exactly once per successful
/// submission, never on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    pub prompt: String,
    pub provider: Provider,
    pub model: String,
    pub aspect_ratio: String,
    pub frequency: Frequency,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: DateTime<Utc>,
    pub total_runs: i64,
    /// Optional cap on total runs. When reached, the schedule is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_runs: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Create a new enabled schedule, first due one frequency unit from now.
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<String>,
        provider: Provider,
        model: impl Into<String>,
        aspect_ratio: impl Into<String>,
        frequency: Frequency,
        max_runs: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ScheduleId::new(),
            name: name.into(),
            prompt: prompt.into(),
            provider,
            model: model.into(),
            aspect_ratio: aspect_ratio.into(),
            frequency,
            enabled: true,
            last_run_at: None,
            next_run_at: next_run(frequency, now),
            total_runs: 0,
            max_runs,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the run cap has been reached.
    pub fn capped(&self) -> bool {
        self.max_runs.is_some_and(|max| self.total_runs >= max)
    }

    /// Record one successful submission at `now`: bump the counter, advance
    /// the run bookkeeping, and disable the schedule when the cap is reached.
    pub fn record_run(&mut self, now: DateTime<Utc>) {
        self.total_runs += 1;
        self.last_run_at = Some(now);
        self.next_run_at = next_run(self.frequency, now);
        self.updated_at = now;
        if self.capped() {
            self.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_next_run_arithmetic() {
        let from = t0();
        assert_eq!(next_run(Frequency::Hourly, from), from + Duration::hours(1));
        assert_eq!(next_run(Frequency::Daily, from), from + Duration::hours(24));
        assert_eq!(next_run(Frequency::Weekly, from), from + Duration::days(7));
    }

    #[test]
    fn test_monthly_clamps_at_month_end() {
        let jan31 = Utc.with_ymd_and_hms(2025, 1, 31, 8, 0, 0).unwrap();
        let next = next_run(Frequency::Monthly, jan31);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 2, 28, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_record_run_bookkeeping() {
        let mut schedule = Schedule::new(
            "daily fox",
            "a red fox in the snow",
            Provider::OpenAi,
            "sora-2",
            "16:9",
            Frequency::Daily,
            None,
        );
        let before = schedule.total_runs;
        let now = t0();

        schedule.record_run(now);

        assert_eq!(schedule.total_runs, before + 1);
        assert_eq!(schedule.last_run_at, Some(now));
        assert_eq!(schedule.next_run_at, next_run(Frequency::Daily, now));
        assert!(schedule.enabled);
    }

    #[test]
    fn test_reaching_cap_disables_schedule() {
        let mut schedule = Schedule::new(
            "limited",
            "prompt",
            Provider::WaveSpeed,
            "bytedance/seedance-v1-pro",
            "9:16",
            Frequency::Hourly,
            Some(2),
        );
        schedule.record_run(t0());
        assert!(schedule.enabled);
        assert!(!schedule.capped());

        schedule.record_run(t0() + Duration::hours(1));
        assert!(schedule.capped());
        assert!(!schedule.enabled);
    }

    #[test]
    fn test_frequency_round_trip() {
        for f in [
            Frequency::Hourly,
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::Monthly,
        ] {
            assert_eq!(f.as_str().parse::<Frequency>().unwrap(), f);
        }
        assert!("fortnightly".parse::<Frequency>().is_err());
    }
}
