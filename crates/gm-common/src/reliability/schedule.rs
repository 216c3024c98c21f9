use chrono::{DateTime, Duration, NaiveTime, Utc};

pub const SWEEP_HOUR_ENV: &str = "GM_RELIABILITY_SWEEP_HOUR";
pub const SWEEP_MINUTE_ENV: &str = "GM_RELIABILITY_SWEEP_MINUTE";

/// Daily wall-clock time of the reliability sweep, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSchedule {
    pub hour: u32,
    pub minute: u32,
}

impl Default for SweepSchedule {
    fn default() -> Self {
        Self { hour: 2, minute: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid sweep time {hour:02}:{minute:02}")]
    OutOfRange { hour: u32, minute: u32 },
    #[error("{name} must be an integer, got {value:?}")]
    NotANumber { name: &'static str, value: String },
}

impl SweepSchedule {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::OutOfRange { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    /// Read `GM_RELIABILITY_SWEEP_HOUR` / `GM_RELIABILITY_SWEEP_MINUTE`,
    /// falling back to 02:00 for unset variables.
    pub fn from_env() -> Result<Self, ScheduleError> {
        let defaults = Self::default();
        let hour = read_env_u32(SWEEP_HOUR_ENV)?.unwrap_or(defaults.hour);
        let minute = read_env_u32(SWEEP_MINUTE_ENV)?.unwrap_or(defaults.minute);
        Self::new(hour, minute)
    }

    fn time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

fn read_env_u32(name: &'static str) -> Result<Option<u32>, ScheduleError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScheduleError::NotANumber { name, value }),
        _ => Ok(None),
    }
}

/// Next time the sweep should fire, strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, schedule: SweepSchedule) -> DateTime<Utc> {
    let today = now.date_naive().and_time(schedule.time()).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap()
    }

    #[test]
    fn later_today_when_not_yet_passed() {
        let next = next_run_after(at(1, 30, 0), SweepSchedule::default());
        assert_eq!(next, at(2, 0, 0));
    }

    #[test]
    fn tomorrow_once_passed_or_exactly_now() {
        let tomorrow = Utc.with_ymd_and_hms(2024, 6, 2, 2, 0, 0).unwrap();
        assert_eq!(next_run_after(at(2, 0, 0), SweepSchedule::default()), tomorrow);
        assert_eq!(next_run_after(at(23, 59, 59), SweepSchedule::default()), tomorrow);
    }

    #[test]
    fn always_in_the_next_24_hours() {
        let schedule = SweepSchedule::new(14, 45).unwrap();
        for hour in 0..24 {
            let now = at(hour, 17, 3);
            let next = next_run_after(now, schedule);
            assert!(next > now);
            assert!(next - now <= Duration::hours(24));
        }
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert!(SweepSchedule::new(24, 0).is_err());
        assert!(SweepSchedule::new(3, 60).is_err());
        assert!(SweepSchedule::new(23, 59).is_ok());
    }

    #[test]
    fn reads_schedule_from_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::remove_var(SWEEP_HOUR_ENV);
            std::env::remove_var(SWEEP_MINUTE_ENV);
        }
        assert_eq!(SweepSchedule::from_env().unwrap(), SweepSchedule::default());

        unsafe {
            std::env::set_var(SWEEP_HOUR_ENV, "4");
            std::env::set_var(SWEEP_MINUTE_ENV, " 30 ");
        }
        assert_eq!(SweepSchedule::from_env().unwrap(), SweepSchedule::new(4, 30).unwrap());

        unsafe { std::env::set_var(SWEEP_HOUR_ENV, "four") };
        assert!(matches!(
            SweepSchedule::from_env(),
            Err(ScheduleError::NotANumber { .. })
        ));

        unsafe {
            std::env::remove_var(SWEEP_HOUR_ENV);
            std::env::remove_var(SWEEP_MINUTE_ENV);
        }
    }
}
