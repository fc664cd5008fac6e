//! Countdown timers
//!
//! Countdowns are driven entirely by server state: a running countdown
//! stores the absolute server timestamp it counts toward, so every client
//! renders the same remaining time regardless of when it connected. Local
//! clock skew is compensated through a one-shot offset fetched from the
//! server time endpoint.

use crate::shared::error::SyncError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collection name of countdown records
pub const COUNTDOWN_COLLECTION: &str = "core/countdown";

/// Local clock adjusted by the measured offset to the server clock
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerClock {
    /// Seconds the local clock runs ahead of the server clock
    offset_seconds: f64,
}

impl ServerClock {
    /// Create a clock with zero offset (local time == server time)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock with a known offset, for tests and replay
    pub fn with_offset(offset_seconds: f64) -> Self {
        Self { offset_seconds }
    }

    /// Measure the offset against the server time endpoint.
    ///
    /// The endpoint returns the server's unix timestamp as a bare JSON
    /// number in seconds.
    pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Self, SyncError> {
        let response = client.get(url).send().await?.error_for_status()?;
        let server_seconds: f64 = response.json().await?;
        Ok(Self {
            offset_seconds: local_now_seconds() - server_seconds,
        })
    }

    /// Current time on the server clock, in unix seconds
    pub fn server_now(&self) -> f64 {
        local_now_seconds() - self.offset_seconds
    }
}

fn local_now_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// One countdown record.
///
/// While running, `countdown_time` holds the absolute server timestamp the
/// countdown reaches zero at; while stopped, it holds the remaining seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    /// Countdown id
    pub id: i64,
    /// Whether the countdown is ticking
    #[serde(default)]
    pub running: bool,
    /// Target server timestamp while running, remaining seconds while stopped
    #[serde(default)]
    pub countdown_time: f64,
    /// Value `reset` restores, in seconds
    #[serde(default)]
    pub default_time: f64,
    /// All remaining fields, preserved opaquely
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Countdown {
    /// Deserialize a countdown from its stored representation
    pub fn from_value(value: &Value) -> Result<Self, SyncError> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Start ticking from the currently stored remaining seconds
    pub fn start(&mut self, clock: &ServerClock) {
        self.countdown_time = clock.server_now() + self.countdown_time;
        self.running = true;
    }

    /// Stop ticking, freezing the remaining whole seconds
    pub fn stop(&mut self, clock: &ServerClock) {
        self.countdown_time = (self.countdown_time - clock.server_now()).floor();
        self.running = false;
    }

    /// Stop and restore the default time
    pub fn reset(&mut self) {
        self.running = false;
        self.countdown_time = self.default_time;
    }

    /// Remaining seconds; negative once the countdown has run out
    pub fn remaining_seconds(&self, clock: &ServerClock) -> i64 {
        if self.running {
            (self.countdown_time - clock.server_now()).ceil() as i64
        } else {
            self.countdown_time as i64
        }
    }
}

/// Format a second count as `m:ss`, or `h:mm:ss` from one hour up.
///
/// Negative counts keep ticking with a leading minus.
pub fn format_seconds(total: i64) -> String {
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}{}:{:02}:{:02}", sign, hours, minutes, seconds)
    } else {
        format!("{}{}:{:02}", sign, minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn countdown(seconds: f64) -> Countdown {
        Countdown::from_value(&json!({
            "id": 1,
            "countdown_time": seconds,
            "default_time": 60.0
        }))
        .unwrap()
    }

    #[test]
    fn test_start_targets_server_time() {
        let clock = ServerClock::new();
        let mut countdown = countdown(30.0);

        countdown.start(&clock);
        assert!(countdown.running);
        let remaining = countdown.remaining_seconds(&clock);
        assert!((29..=30).contains(&remaining), "remaining was {}", remaining);
    }

    #[test]
    fn test_stop_freezes_remaining() {
        let clock = ServerClock::new();
        let mut countdown = countdown(30.0);
        countdown.start(&clock);

        countdown.stop(&clock);
        assert!(!countdown.running);
        assert!((29..=30).contains(&countdown.remaining_seconds(&clock)));

        // Frozen value no longer depends on the clock.
        let skewed = ServerClock::with_offset(1000.0);
        assert_eq!(
            countdown.remaining_seconds(&clock),
            countdown.remaining_seconds(&skewed)
        );
    }

    #[test]
    fn test_reset_restores_default() {
        let clock = ServerClock::new();
        let mut countdown = countdown(30.0);
        countdown.start(&clock);

        countdown.reset();
        assert!(!countdown.running);
        assert_eq!(countdown.remaining_seconds(&clock), 60);
    }

    #[test]
    fn test_clock_offset_cancels_out() {
        // A badly skewed local clock still renders the right remaining time,
        // since start and remaining both go through the same offset.
        let skewed = ServerClock::with_offset(3600.0);
        let mut countdown = countdown(30.0);
        countdown.start(&skewed);

        let remaining = countdown.remaining_seconds(&skewed);
        assert!((29..=30).contains(&remaining), "remaining was {}", remaining);
    }

    #[test]
    fn test_running_countdown_goes_negative() {
        let clock = ServerClock::new();
        let mut countdown = countdown(-5.0);
        countdown.start(&clock);
        assert!(countdown.remaining_seconds(&clock) <= -4);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0), "0:00");
        assert_eq!(format_seconds(59), "0:59");
        assert_eq!(format_seconds(60), "1:00");
        assert_eq!(format_seconds(600), "10:00");
        assert_eq!(format_seconds(3599), "59:59");
        assert_eq!(format_seconds(3600), "1:00:00");
        assert_eq!(format_seconds(3661), "1:01:01");
        assert_eq!(format_seconds(-61), "-1:01");
        assert_eq!(format_seconds(-3600), "-1:00:00");
    }
}
