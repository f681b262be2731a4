use crate::fields::Fields;
use std::time::{Duration, Instant};

/// Stopwatch that logs how long it ran, together with the log fields of
/// whatever it was timing.
///
/// ```
/// use sockfetch::{Fields, TimeIt};
///
/// let timer = TimeIt::start(Fields::new().with("url", "http://example.com"));
/// // ... do the work ...
/// timer.done();
/// ```
///
/// Dropping the guard has the same effect as calling `done`.
#[derive(Debug)]
pub struct TimeIt {
    started: Instant,
    fields: Fields,
    finished: bool,
}

impl TimeIt {
    pub fn start(fields: Fields) -> TimeIt {
        TimeIt {
            started: Instant::now(),
            fields,
            finished: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log the elapsed time and disarm the guard.
    pub fn done(mut self) -> Duration {
        self.finish()
    }

    fn finish(&mut self) -> Duration {
        let elapsed = self.elapsed();
        if !self.finished {
            self.finished = true;
            info!("finished duration={} {}", format_duration(elapsed), self.fields);
        }
        elapsed
    }
}

impl Drop for TimeIt {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Seconds with millisecond precision, eg. `1.250s`.
pub fn format_duration(d: Duration) -> String {
    format!("{:.3}s", d.as_secs() as f64 + f64::from(d.subsec_nanos()) / 1e9)
}
