/// A source of timestamps for the sequencers.
///
/// This abstraction allows you to plug in the system wall clock, a custom
/// monotonic timer, or a scripted time source in tests that simulates clock
/// regressions and millisecond boundaries deterministically.
///
/// The unit is **milliseconds** relative to whatever epoch the source
/// chooses. Every ID generated from a source carries that relative value.
///
/// Any `Fn() -> u64` closure is a time source:
///
/// ```
/// use seqflake::TimeSource;
///
/// let fixed = || 1234_u64;
/// assert_eq!(fixed.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<F> TimeSource for F
where
    F: Fn() -> u64,
{
    fn current_millis(&self) -> u64 {
        self()
    }
}
