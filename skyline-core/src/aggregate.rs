//! Grouping of 3-hour forecast samples into calendar-day buckets.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};

use crate::model::{DailyForecast, RawSample};

/// Upper bound on distinct day buckets: today plus the next seven days.
pub const MAX_BUCKETS: usize = 8;

#[derive(Debug)]
struct DayBucket {
    offset: u8,
    date: NaiveDate,
    temperature_sum: f64,
    humidity_sum: f64,
    samples: usize,
    description: String,
    icon: String,
}

impl DayBucket {
    fn open(offset: u8, date: NaiveDate, sample: &RawSample) -> Self {
        Self {
            offset,
            date,
            temperature_sum: sample.temperature,
            humidity_sum: sample.humidity,
            samples: 1,
            description: sample.description.clone(),
            icon: sample.icon.clone(),
        }
    }

    fn add(&mut self, sample: &RawSample) {
        self.temperature_sum += sample.temperature;
        self.humidity_sum += sample.humidity;
        self.samples += 1;
    }

    fn finalize(self, divisor: f64) -> DailyForecast {
        DailyForecast {
            offset: self.offset,
            date: self.date,
            temperature: self.temperature_sum / divisor,
            humidity: self.humidity_sum / divisor,
            description: self.description,
            icon: self.icon,
        }
    }
}

/// Day offset of `date` relative to `today`, derived from the weekday
/// difference modulo 8 (Sunday = 0). Always in `0..=7`.
pub fn day_offset(date: NaiveDate, today: NaiveDate) -> u8 {
    let diff = i64::from(date.weekday().num_days_from_sunday())
        - i64::from(today.weekday().num_days_from_sunday());
    // (diff + 8) is in 2..=14, so the remainder always fits a u8.
    ((diff + 8).rem_euclid(MAX_BUCKETS as i64)) as u8
}

/// Aggregates raw samples into daily forecasts.
///
/// Sample times are interpreted in `today`'s time zone. Samples dated before
/// today are discarded. Buckets come back in the order they were first seen.
///
/// Every bucket's sums are divided by the number of buckets, not by the
/// bucket's own sample count; displayed values depend on that.
pub fn aggregate<Tz: TimeZone>(samples: &[RawSample], today: &DateTime<Tz>) -> Vec<DailyForecast> {
    let tz = today.timezone();
    let today = today.date_naive();

    let mut buckets: Vec<DayBucket> = Vec::with_capacity(MAX_BUCKETS);

    for sample in samples {
        let date = sample.timestamp.with_timezone(&tz).date_naive();
        if date < today {
            continue;
        }

        let offset = day_offset(date, today);
        let open = buckets.len();
        match buckets.iter_mut().find(|b| b.offset == offset) {
            Some(bucket) => bucket.add(sample),
            None if open < MAX_BUCKETS => {
                buckets.push(DayBucket::open(offset, date, sample));
            }
            None => {}
        }
    }

    if buckets.is_empty() {
        return Vec::new();
    }

    tracing::debug!(
        buckets = buckets.len(),
        samples = buckets.iter().map(|b| b.samples).sum::<usize>(),
        "aggregated forecast samples"
    );

    let divisor = buckets.len() as f64;
    buckets.into_iter().map(|b| b.finalize(divisor)).collect()
}
