//! Category-filtered, rate-limited logging on top of the `log` facade.
//!
//! # Architecture
//!
//! - **LogConfig**: global configuration held in atomics; a global level plus
//!   optional per-category overrides
//! - **LogCategory**: which subsystem a message belongs to (Video, Audio, Input,
//!   Platform, Loop); also used as the `log` target
//! - **log()**: lazily formats the message, applies the per-category rate
//!   limit, and forwards to whatever logger the binary installed
//!
//! Per-frame failures (a refused audio lock, a missed present) repeat at the
//! frame rate. The sliding-window limiter caps each category at a fixed number
//! of messages per second and reports how many were dropped.
//!
//! # Usage
//!
//! ```rust
//! use framekit_core::logging::{log, LogCategory};
//! use log::Level;
//!
//! log(LogCategory::Audio, Level::Warn, || {
//!     format!("audio lock failed at offset {}", 4096)
//! });
//! ```

use log::{Level, LevelFilter};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

/// Default cap on messages per category per second
pub const DEFAULT_RATE_LIMIT: usize = 60;

/// Subsystem a log message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Framebuffer allocation and presentation
    Video,
    /// Ring filling, cursor queries, device setup
    Audio,
    /// Gamepads, keyboard edges, haptics
    Input,
    /// Window creation and OS events
    Platform,
    /// Frame loop state and statistics
    Loop,
}

impl LogCategory {
    pub const ALL: [LogCategory; 5] = [
        LogCategory::Video,
        LogCategory::Audio,
        LogCategory::Input,
        LogCategory::Platform,
        LogCategory::Loop,
    ];

    const COUNT: usize = Self::ALL.len();

    fn index(self) -> usize {
        self as usize
    }

    /// `log` target string for this category
    pub fn target(self) -> &'static str {
        match self {
            LogCategory::Video => "framekit::video",
            LogCategory::Audio => "framekit::audio",
            LogCategory::Input => "framekit::input",
            LogCategory::Platform => "framekit::platform",
            LogCategory::Loop => "framekit::loop",
        }
    }

    /// Parse a category name (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "video" => Some(LogCategory::Video),
            "audio" => Some(LogCategory::Audio),
            "input" => Some(LogCategory::Input),
            "platform" => Some(LogCategory::Platform),
            "loop" => Some(LogCategory::Loop),
            _ => None,
        }
    }
}

fn filter_to_u8(filter: LevelFilter) -> u8 {
    filter as usize as u8
}

fn filter_from_u8(val: u8) -> LevelFilter {
    match val {
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        5 => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

#[derive(Default)]
struct RateWindow {
    timestamps: VecDeque<Instant>,
    dropped: usize,
    last_drop_report: Option<Instant>,
}

/// Sliding one-second window per category
struct RateLimiter {
    max_per_second: AtomicUsize,
    window: Duration,
    state: Mutex<[RateWindow; LogCategory::COUNT]>,
}

impl RateLimiter {
    fn new(max_per_second: usize) -> Self {
        Self {
            max_per_second: AtomicUsize::new(max_per_second),
            window: Duration::from_secs(1),
            state: Mutex::new(Default::default()),
        }
    }

    /// Returns (allowed, dropped_count); dropped_count is Some(n) when a drop
    /// summary is due
    fn should_allow(&self, category: LogCategory) -> (bool, Option<usize>) {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let slot = &mut state[category.index()];

        while let Some(&front) = slot.timestamps.front() {
            if now.duration_since(front) > self.window {
                slot.timestamps.pop_front();
            } else {
                break;
            }
        }

        if slot.timestamps.len() < self.max_per_second.load(Ordering::Relaxed) {
            slot.timestamps.push_back(now);
            if slot.dropped > 0 {
                let dropped = std::mem::take(&mut slot.dropped);
                slot.last_drop_report = Some(now);
                return (true, Some(dropped));
            }
            return (true, None);
        }

        slot.dropped += 1;
        let report_due = slot
            .last_drop_report
            .map_or(true, |last| now.duration_since(last) >= self.window);
        if report_due {
            let dropped = std::mem::take(&mut slot.dropped);
            slot.last_drop_report = Some(now);
            (false, Some(dropped))
        } else {
            (false, None)
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    global_level: AtomicU8,
    /// Per-category overrides; `Off` means "use the global level"
    category_levels: [AtomicU8; LogCategory::COUNT],
    rate_limiter: RateLimiter,
}

impl LogConfig {
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(filter_to_u8(LevelFilter::Info)),
            category_levels: Default::default(),
            rate_limiter: RateLimiter::new(DEFAULT_RATE_LIMIT),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LevelFilter) {
        self.global_level.store(filter_to_u8(level), Ordering::Relaxed);
    }

    pub fn global_level(&self) -> LevelFilter {
        filter_from_u8(self.global_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LevelFilter) {
        self.category_levels[category.index()].store(filter_to_u8(level), Ordering::Relaxed);
    }

    pub fn level(&self, category: LogCategory) -> LevelFilter {
        filter_from_u8(self.category_levels[category.index()].load(Ordering::Relaxed))
    }

    /// Category override if one is set, otherwise the global level
    pub fn should_log(&self, category: LogCategory, level: Level) -> bool {
        let category_level = self.level(category);
        if category_level != LevelFilter::Off {
            level <= category_level
        } else {
            level <= self.global_level()
        }
    }

    /// Back to the defaults: global Info, no overrides
    pub fn reset(&self) {
        self.set_global_level(LevelFilter::Info);
        for category in LogCategory::ALL {
            self.set_level(category, LevelFilter::Off);
        }
    }

    pub fn set_rate_limit(&self, max_per_second: usize) {
        self.rate_limiter
            .max_per_second
            .store(max_per_second, Ordering::Relaxed);
    }

    pub fn rate_limit(&self) -> usize {
        self.rate_limiter.max_per_second.load(Ordering::Relaxed)
    }
}

/// Log a lazily-built message under `category`
///
/// The closure only runs when the category and level are enabled and the
/// category is under its rate limit.
pub fn log<F>(category: LogCategory, level: Level, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) || !log::log_enabled!(target: category.target(), level)
    {
        return;
    }

    let (allowed, dropped) = config.rate_limiter.should_allow(category);
    if let Some(count) = dropped.filter(|&n| n > 0) {
        log::log!(
            target: category.target(),
            Level::Warn,
            "rate limit exceeded, {} message(s) dropped in the last second",
            count
        );
    }

    if allowed {
        log::log!(target: category.target(), level, "{}", message_fn());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        for category in LogCategory::ALL {
            let name = category.target().trim_start_matches("framekit::");
            assert_eq!(LogCategory::from_name(name), Some(category));
        }
        assert_eq!(LogCategory::from_name("AUDIO"), Some(LogCategory::Audio));
        assert_eq!(LogCategory::from_name("ppu"), None);
    }

    #[test]
    fn test_filter_round_trip_through_u8() {
        for filter in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
            LevelFilter::Trace,
        ] {
            assert_eq!(filter_from_u8(filter_to_u8(filter)), filter);
        }
    }

    #[test]
    fn test_should_log_with_global_level() {
        let config = LogConfig::new();
        config.set_global_level(LevelFilter::Warn);

        assert!(config.should_log(LogCategory::Audio, Level::Error));
        assert!(config.should_log(LogCategory::Audio, Level::Warn));
        assert!(!config.should_log(LogCategory::Audio, Level::Info));
    }

    #[test]
    fn test_category_level_overrides_global() {
        let config = LogConfig::new();
        config.set_global_level(LevelFilter::Error);
        config.set_level(LogCategory::Audio, LevelFilter::Debug);

        assert!(config.should_log(LogCategory::Audio, Level::Debug));
        assert!(!config.should_log(LogCategory::Video, Level::Warn));
        assert!(config.should_log(LogCategory::Video, Level::Error));
    }

    #[test]
    fn test_reset() {
        let config = LogConfig::new();
        config.set_global_level(LevelFilter::Trace);
        config.set_level(LogCategory::Input, LevelFilter::Debug);

        config.reset();

        assert_eq!(config.global_level(), LevelFilter::Info);
        assert_eq!(config.level(LogCategory::Input), LevelFilter::Off);
    }

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let limiter = RateLimiter::new(60);
        for _ in 0..60 {
            let (allowed, _) = limiter.should_allow(LogCategory::Audio);
            assert!(allowed, "Should allow logs within the rate limit");
        }
        let (allowed, _) = limiter.should_allow(LogCategory::Audio);
        assert!(!allowed, "Should block logs exceeding the rate limit");
    }

    #[test]
    fn test_rate_limiter_per_category() {
        let limiter = RateLimiter::new(3);
        for _ in 0..3 {
            limiter.should_allow(LogCategory::Audio);
        }
        assert!(!limiter.should_allow(LogCategory::Audio).0);
        assert!(limiter.should_allow(LogCategory::Video).0, "Video has its own window");
    }

    #[test]
    fn test_rate_limiter_reports_dropped_count() {
        let limiter = RateLimiter::new(5);
        for _ in 0..5 {
            limiter.should_allow(LogCategory::Loop);
        }

        // The first drop reports immediately, the rest accumulate
        let (allowed, dropped) = limiter.should_allow(LogCategory::Loop);
        assert!(!allowed);
        assert_eq!(dropped, Some(1));
        for _ in 0..9 {
            let (allowed, dropped) = limiter.should_allow(LogCategory::Loop);
            assert!(!allowed);
            assert_eq!(dropped, None);
        }

        std::thread::sleep(Duration::from_millis(1100));

        let (allowed, dropped) = limiter.should_allow(LogCategory::Loop);
        assert!(allowed, "Should be allowed after the window slides");
        assert_eq!(dropped, Some(9));
    }

    #[test]
    fn test_rate_limit_setting() {
        let config = LogConfig::new();
        assert_eq!(config.rate_limit(), DEFAULT_RATE_LIMIT);
        config.set_rate_limit(5);
        assert_eq!(config.rate_limit(), 5);
    }
}
