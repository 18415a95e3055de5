use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now" for services. Calendar dates are taken in UTC.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl FixedClock {
    /// Noon UTC on the given `YYYY-MM-DD`.
    pub fn on(date: &str) -> Self {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        FixedClock(day.and_hms_opt(12, 0, 0).unwrap().and_utc())
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
