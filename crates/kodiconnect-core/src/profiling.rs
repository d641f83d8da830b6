//! Call profiling built on tracing spans.
//!
//! While a [`ProfileSession`] is active on a thread, every span entered on
//! that thread counts as one call of the function named by the span. On
//! stop, the collected statistics are written as a tab-separated file into
//! the addon's `profiles` directory.
//!
//! ```rust,ignore
//! let session = start_profiling();
//! full_sync(&ctx)?; // #[tracing::instrument] functions are recorded
//! stop_profiling(session, "full_sync", &fs, &config.profiles_dir())?;
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::span::{Attributes, Id};
use tracing::subscriber::DefaultGuard;
use tracing::{Subscriber, info};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

use crate::error::Result;
use crate::fs::FileSystem;

/// Header row of the profile file.
pub const PROFILE_HEADER: &str = "NumbCalls\tTotalTime\tCumulativeTime\tFunctionName\tFileName";

/// Aggregated statistics for one function.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStats {
    /// Function (span) name.
    pub function: String,
    /// Source file of the span's callsite.
    pub file: String,
    /// Number of calls.
    pub calls: u64,
    /// Seconds spent in the function itself, excluding nested spans.
    pub total_time: f64,
    /// Seconds spent in the function including nested spans.
    pub cumulative_time: f64,
}

#[derive(Debug)]
struct Timing {
    entered: Option<Instant>,
    children: Duration,
}

#[derive(Debug, Clone, Default)]
struct StatsCollector {
    stats: Arc<Mutex<HashMap<(String, String), CallStats>>>,
}

impl StatsCollector {
    fn record(&self, function: &str, file: &str, own: Duration, cumulative: Duration) {
        let Ok(mut stats) = self.stats.lock() else {
            return;
        };
        let entry = stats
            .entry((function.to_string(), file.to_string()))
            .or_insert_with(|| CallStats {
                function: function.to_string(),
                file: file.to_string(),
                calls: 0,
                total_time: 0.0,
                cumulative_time: 0.0,
            });
        entry.calls += 1;
        entry.total_time += own.as_secs_f64();
        entry.cumulative_time += cumulative.as_secs_f64();
    }

    fn snapshot(&self) -> Vec<CallStats> {
        let mut stats: Vec<CallStats> = self
            .stats
            .lock()
            .map(|stats| stats.values().cloned().collect())
            .unwrap_or_default();
        stats.sort_by(|a, b| {
            b.cumulative_time
                .total_cmp(&a.cumulative_time)
                .then_with(|| a.function.cmp(&b.function))
        });
        stats
    }
}

impl<S> Layer<S> for StatsCollector
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(Timing {
                entered: None,
                children: Duration::ZERO,
            });
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id)
            && let Some(timing) = span.extensions_mut().get_mut::<Timing>()
        {
            timing.entered = Some(Instant::now());
            timing.children = Duration::ZERO;
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let (elapsed, children) = {
            let mut extensions = span.extensions_mut();
            let Some(timing) = extensions.get_mut::<Timing>() else {
                return;
            };
            let Some(entered) = timing.entered.take() else {
                return;
            };
            (entered.elapsed(), timing.children)
        };

        if let Some(parent) = span.parent()
            && let Some(timing) = parent.extensions_mut().get_mut::<Timing>()
        {
            timing.children += elapsed;
        }

        let metadata = span.metadata();
        self.record(
            metadata.name(),
            metadata.file().unwrap_or("~"),
            elapsed.saturating_sub(children),
            elapsed,
        );
    }
}

/// An active profiling session, bound to the thread that started it.
pub struct ProfileSession {
    collector: StatsCollector,
    guard: DefaultGuard,
}

impl ProfileSession {
    /// Statistics collected so far, most expensive first.
    #[must_use]
    pub fn stats(&self) -> Vec<CallStats> {
        self.collector.snapshot()
    }

    /// End the session and return the final statistics.
    #[must_use]
    pub fn finish(self) -> Vec<CallStats> {
        drop(self.guard);
        self.collector.snapshot()
    }
}

impl std::fmt::Debug for ProfileSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileSession").finish_non_exhaustive()
    }
}

/// Start recording spans on the current thread.
///
/// The session replaces the thread's default subscriber until it is
/// stopped, so regular log output from this thread is suppressed meanwhile.
#[must_use]
pub fn start_profiling() -> ProfileSession {
    let collector = StatsCollector::default();
    let subscriber = tracing_subscriber::registry().with(collector.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    ProfileSession { collector, guard }
}

/// Stop `session` and write its statistics to
/// `{profiles_dir}/{name}_profile_({timestamp}).tab`.
pub fn stop_profiling(
    session: ProfileSession,
    name: &str,
    fs: &dyn FileSystem,
    profiles_dir: &Path,
) -> Result<PathBuf> {
    let stats = session.finish();
    let timestamp = Local::now().format("%Y-%m-%d %H-%M-%S").to_string();
    write_profile(fs, profiles_dir, name, &timestamp, &stats)
}

/// Write `stats` to the profile file for `name` at `timestamp`.
pub fn write_profile(
    fs: &dyn FileSystem,
    profiles_dir: &Path,
    name: &str,
    timestamp: &str,
    stats: &[CallStats],
) -> Result<PathBuf> {
    if !fs.exists(profiles_dir) {
        fs.create_dir_all(profiles_dir)?;
    }

    let path = profiles_dir.join(format!("{name}_profile_({timestamp}).tab"));
    fs.write(&path, &render_profile(stats))?;

    info!("Wrote {} profile records to {}", stats.len(), path.display());
    Ok(path)
}

/// Tab-separated profile body with CRLF line endings.
#[must_use]
pub fn render_profile(stats: &[CallStats]) -> String {
    let mut out = format!("{PROFILE_HEADER}\r\n");
    for record in stats {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\r\n",
            record.calls,
            format_seconds(record.total_time),
            format_seconds(record.cumulative_time),
            record.function,
            record.file
        ));
    }
    out
}

/// Fixed-point with width 10 and four decimals; values that have no
/// fixed-point form (NaN, infinities) are written plainly.
#[must_use]
pub fn format_seconds(value: f64) -> String {
    if value.is_finite() {
        format!("{value:10.4}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn busy(ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }

    #[test]
    fn test_format_seconds_fixed_point() {
        assert_eq!(format_seconds(1.5), "    1.5000");
        assert_eq!(format_seconds(0.0), "    0.0000");
        assert_eq!(format_seconds(12345.678_91), "12345.6789");
    }

    #[test]
    fn test_format_seconds_fallback() {
        assert_eq!(format_seconds(f64::NAN), "NaN");
        assert_eq!(format_seconds(f64::INFINITY), "inf");
    }

    #[test]
    fn test_render_profile_layout() {
        let stats = vec![CallStats {
            function: "full_sync".to_string(),
            file: "src/librarysync.rs".to_string(),
            calls: 3,
            total_time: 0.25,
            cumulative_time: 2.0,
        }];

        let body = render_profile(&stats);
        assert_eq!(
            body,
            "NumbCalls\tTotalTime\tCumulativeTime\tFunctionName\tFileName\r\n\
             3\t    0.2500\t    2.0000\tfull_sync\tsrc/librarysync.rs\r\n"
        );
    }

    #[test]
    fn test_session_records_nested_spans() {
        let session = start_profiling();
        {
            let _outer = tracing::info_span!("outer").entered();
            busy(2);
            for _ in 0..2 {
                let _inner = tracing::info_span!("inner").entered();
                busy(5);
            }
        }
        let stats = session.finish();

        let outer = stats.iter().find(|s| s.function == "outer").unwrap();
        let inner = stats.iter().find(|s| s.function == "inner").unwrap();
        assert_eq!(outer.calls, 1);
        assert_eq!(inner.calls, 2);
        assert!(inner.cumulative_time >= 0.010);
        assert!(outer.cumulative_time >= inner.cumulative_time);
        assert!(outer.total_time < outer.cumulative_time);
        assert!(outer.file.ends_with("profiling.rs"));
        assert_eq!(stats[0].function, "outer");
    }

    #[test]
    fn test_stop_profiling_creates_directory_and_file() {
        let fs = MockFileSystem::new();
        let dir = Path::new("/addon_data/plugin/profiles");

        let session = start_profiling();
        {
            let _span = tracing::info_span!("lookup").entered();
        }
        let path = stop_profiling(session, "lookup", &fs, dir).unwrap();

        assert!(fs.is_dir(dir));
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("lookup_profile_("));
        assert!(file_name.ends_with(").tab"));

        let body = fs.contents(&path).unwrap();
        let lines: Vec<&str> = body.split("\r\n").collect();
        assert_eq!(lines[0], PROFILE_HEADER);
        assert!(lines[1].starts_with("1\t"));
        assert!(lines[1].contains("\tlookup\t"));
    }
}
