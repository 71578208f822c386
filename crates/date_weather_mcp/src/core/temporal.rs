use std::str::FromStr;

use chrono::{
    DateTime, Datelike, LocalResult, Months, NaiveDate, NaiveDateTime, Offset, TimeDelta,
    TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::core::{
    error::{DateWeatherError, DateWeatherResult},
    models::{FullTimeInfo, Interval, IntervalBreakdown, TimeValue},
    utils::{self, DAY_FORMAT},
};

/// Calendar unit accepted by [`TemporalEngine::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl FromStr for TimeUnit {
    type Err = DateWeatherError;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit.trim().to_lowercase().as_str() {
            "year" | "years" => Ok(TimeUnit::Years),
            "month" | "months" => Ok(TimeUnit::Months),
            "day" | "days" => Ok(TimeUnit::Days),
            "hour" | "hours" => Ok(TimeUnit::Hours),
            "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "second" | "seconds" => Ok(TimeUnit::Seconds),
            _ => Err(DateWeatherError::UnsupportedUnit {
                unit: unit.to_string(),
            }),
        }
    }
}

/// Date and time computations relative to a fixed local timezone
#[derive(Debug, Clone)]
pub struct TemporalEngine {
    pub(crate) local_timezone: Tz,
}

impl TemporalEngine {
    /// Engine bound to the system's timezone, falling back to UTC
    pub fn new() -> Self {
        // Try to detect the system's local timezone
        let local_tz = match iana_time_zone::get_timezone() {
            Ok(tz_name) => match tz_name.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    tracing::warn!("Could not parse timezone '{}', defaulting to UTC", tz_name);
                    chrono_tz::UTC
                }
            },
            Err(_) => {
                tracing::warn!("Could not detect system timezone, defaulting to UTC");
                chrono_tz::UTC
            }
        };

        Self::with_timezone(local_tz)
    }

    pub fn with_timezone(local_timezone: Tz) -> Self {
        Self { local_timezone }
    }

    pub fn local_timezone(&self) -> Tz {
        self.local_timezone
    }

    pub(crate) fn parse_timezone(&self, timezone_name: &str) -> DateWeatherResult<Tz> {
        Tz::from_str(timezone_name.trim()).map_err(|_| DateWeatherError::InvalidTimezone {
            timezone: timezone_name.to_string(),
        })
    }

    pub fn now_local(&self) -> TimeValue {
        let now = Utc::now().with_timezone(&self.local_timezone);
        TimeValue::from_datetime(&now, self.local_timezone.name())
    }

    pub fn now_utc(&self) -> TimeValue {
        TimeValue::from_datetime(&Utc::now(), "UTC")
    }

    pub fn now_in_zone(&self, zone_id: &str) -> DateWeatherResult<TimeValue> {
        let timezone = self.parse_timezone(zone_id)?;
        let now = Utc::now().with_timezone(&timezone);

        Ok(TimeValue::from_datetime(&now, timezone.name()))
    }

    pub fn now_epoch_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn now_epoch_seconds(&self) -> i64 {
        Utc::now().timestamp()
    }

    /// Render an epoch timestamp in milliseconds as local time
    pub fn epoch_millis_to_time(&self, millis: i64) -> DateWeatherResult<TimeValue> {
        let utc = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            DateWeatherError::InvalidTimeFormat {
                input: millis.to_string(),
                reason: "timestamp is outside the supported date range".to_string(),
            }
        })?;
        let local = utc.with_timezone(&self.local_timezone);

        Ok(TimeValue::from_datetime(&local, self.local_timezone.name()))
    }

    /// Interpret `text` as local time and return its epoch timestamp in milliseconds
    pub fn time_to_epoch_millis(&self, text: &str) -> DateWeatherResult<i64> {
        let naive = utils::parse_datetime(text)?;
        Ok(self.resolve_local(&naive)?.timestamp_millis())
    }

    /// Signed interval `end - start`; both sides use the fixed pattern
    pub fn difference(&self, start: &str, end: &str) -> DateWeatherResult<Interval> {
        let start = utils::parse_datetime(start)?;
        let end = utils::parse_datetime(end)?;

        Ok(interval_between(&start, &end))
    }

    /// Shift `base` by `amount` units. Month and year steps clamp to the last
    /// valid day of the target month (Jan 31 + 1 month = Feb 28/29).
    pub fn add(&self, base: &str, amount: i32, unit: &str) -> DateWeatherResult<TimeValue> {
        let unit = TimeUnit::from_str(unit)?;
        let base_time = utils::parse_datetime(base)?;

        let shifted = match unit {
            TimeUnit::Years => shift_months(base_time, i64::from(amount) * 12),
            TimeUnit::Months => shift_months(base_time, i64::from(amount)),
            TimeUnit::Days => TimeDelta::try_days(i64::from(amount))
                .and_then(|delta| base_time.checked_add_signed(delta)),
            TimeUnit::Hours => TimeDelta::try_hours(i64::from(amount))
                .and_then(|delta| base_time.checked_add_signed(delta)),
            TimeUnit::Minutes => TimeDelta::try_minutes(i64::from(amount))
                .and_then(|delta| base_time.checked_add_signed(delta)),
            TimeUnit::Seconds => TimeDelta::try_seconds(i64::from(amount))
                .and_then(|delta| base_time.checked_add_signed(delta)),
        };

        let shifted = shifted.ok_or_else(|| DateWeatherError::InvalidTimeFormat {
            input: base.to_string(),
            reason: "result is outside the supported date range".to_string(),
        })?;

        Ok(TimeValue::floating(&shifted))
    }

    /// Re-render a fixed-pattern time with a caller supplied pattern
    pub fn format(&self, base: &str, pattern: &str) -> DateWeatherResult<String> {
        let base_time = utils::parse_datetime(base)?;
        utils::format_with_pattern(&base_time, pattern)
    }

    pub fn weekday_name(&self) -> String {
        self.local_now().format(DAY_FORMAT).to_string()
    }

    pub fn current_year(&self) -> i32 {
        self.local_now().year()
    }

    pub fn current_month(&self) -> u32 {
        self.local_now().month()
    }

    pub fn current_day(&self) -> u32 {
        self.local_now().day()
    }

    /// Gregorian rule: divisible by 4, except centuries not divisible by 400
    pub fn is_leap_year(&self, year: i32) -> bool {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }

    /// Every calendar query at once, derived from a single clock reading
    pub fn full_info(&self) -> FullTimeInfo {
        let now_utc = Utc::now();
        let local = now_utc.with_timezone(&self.local_timezone);

        FullTimeInfo {
            current_time: utils::format_datetime(&local.naive_local()),
            current_utc_time: utils::format_datetime(&now_utc.naive_utc()),
            timezone: self.local_timezone.name().to_string(),
            timestamp: now_utc.timestamp_millis(),
            timestamp_seconds: now_utc.timestamp(),
            day_of_week: local.format(DAY_FORMAT).to_string(),
            year: local.year(),
            month: local.month(),
            day: local.day(),
            is_leap_year: self.is_leap_year(local.year()),
        }
    }

    fn local_now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.local_timezone)
    }

    /// Attach the local timezone to a wall-clock value. Ambiguous times (DST
    /// fall-back) take the earlier instant; times inside a DST gap are moved
    /// forward by the length of the gap.
    fn resolve_local(&self, naive: &NaiveDateTime) -> DateWeatherResult<DateTime<Tz>> {
        match self.local_timezone.from_local_datetime(naive) {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(earliest, _) => Ok(earliest),
            LocalResult::None => {
                let out_of_range = || DateWeatherError::InvalidTimeFormat {
                    input: utils::format_datetime(naive),
                    reason: "time cannot be placed in the local timezone".to_string(),
                };

                let day_before = naive
                    .checked_sub_signed(TimeDelta::days(1))
                    .ok_or_else(out_of_range)?;
                let before_gap = self
                    .local_timezone
                    .offset_from_utc_datetime(&day_before)
                    .fix();
                let utc = naive
                    .checked_sub_signed(TimeDelta::seconds(i64::from(
                        before_gap.local_minus_utc(),
                    )))
                    .ok_or_else(out_of_range)?;
                Ok(self.local_timezone.from_utc_datetime(&utc))
            }
        }
    }
}

impl Default for TemporalEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Calendar date of the current instant in `timezone`
pub fn today_in(timezone: &Tz) -> NaiveDate {
    Utc::now().with_timezone(timezone).date_naive()
}

fn shift_months(base: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = u32::try_from(months.unsigned_abs()).ok()?;
    if months >= 0 {
        base.checked_add_months(Months::new(magnitude))
    } else {
        base.checked_sub_months(Months::new(magnitude))
    }
}

fn interval_between(start: &NaiveDateTime, end: &NaiveDateTime) -> Interval {
    let delta = *end - *start;

    let days = delta.num_days();
    let hours = delta.num_hours();
    let minutes = delta.num_minutes();
    let seconds = delta.num_seconds();

    let breakdown = IntervalBreakdown {
        days,
        hours: hours % 24,
        minutes: minutes % 60,
        seconds: seconds % 60,
    };

    Interval {
        days,
        hours,
        minutes,
        seconds,
        milliseconds: delta.num_milliseconds(),
        breakdown,
        detailed: utils::format_interval_summary(
            breakdown.days,
            breakdown.hours,
            breakdown.minutes,
            breakdown.seconds,
        ),
    }
}
