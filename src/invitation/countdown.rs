//! Countdown to the wedding

use chrono::{DateTime, Utc};
use futures_util::stream::{self, Stream};
use serde::Serialize;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Time remaining until a target instant, never negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeLeft {
    pub fn between(now: DateTime<Utc>, target: DateTime<Utc>) -> Self {
        let remaining = (target - now).num_seconds();
        if remaining <= 0 {
            return Self::default();
        }
        let total = remaining as u64;
        Self {
            days: total / 86_400,
            hours: (total / 3_600) % 24,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        }
    }

    pub fn until(target: DateTime<Utc>) -> Self {
        Self::between(Utc::now(), target)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02} days {:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// A fresh `TimeLeft` every second, ending after the first zero value
pub fn ticking(target: DateTime<Utc>) -> impl Stream<Item = TimeLeft> {
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    stream::unfold((ticker, false), move |(mut ticker, finished)| async move {
        if finished {
            return None;
        }
        ticker.tick().await;
        let left = TimeLeft::until(target);
        Some((left, (ticker, left.is_zero())))
    })
}
