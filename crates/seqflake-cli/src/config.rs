use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use core::time::Duration;
use seqflake::{
    Backoff, ClockPolicy, Hashids, MAX_MACHINE_ID, SequencerConfig, SystemClock,
    machine_id_from_env,
};

/// Runtime configuration for the `seqflake` binary.
///
/// Every option can be given on the command line or through the matching
/// `SEQFLAKE_*` environment variable. A `.env` file in the working directory
/// is loaded first.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "seqflake",
    version,
    about = "Generate and inspect Snowflake IDs"
)]
pub struct CliArgs {
    /// Machine ID stamped into generated IDs, in `0..1024`.
    ///
    /// When unset, it is derived from the host name (or the process ID).
    /// Ignored in `global` mode.
    ///
    /// Environment variable: `SEQFLAKE_MACHINE_ID`
    #[arg(long, env = "SEQFLAKE_MACHINE_ID", allow_negative_numbers = true)]
    pub machine_id: Option<i64>,

    /// Which sequencer issues the IDs.
    ///
    /// Environment variable: `SEQFLAKE_MODE`
    #[arg(long, env = "SEQFLAKE_MODE", value_enum, default_value_t = Mode::Default)]
    pub mode: Mode,

    /// How to wait for the clock while a millisecond is exhausted.
    ///
    /// Environment variable: `SEQFLAKE_BACKOFF`
    #[arg(long, env = "SEQFLAKE_BACKOFF", value_enum, default_value_t = BackoffKind::Yield)]
    pub backoff: BackoffKind,

    /// Sleep interval, in microseconds, for `--backoff sleep`.
    ///
    /// Environment variable: `SEQFLAKE_SLEEP_MICROS`
    #[arg(long, env = "SEQFLAKE_SLEEP_MICROS", default_value_t = 100)]
    pub sleep_micros: u64,

    /// Largest backwards clock jump, in milliseconds, that is waited out
    /// instead of failing.
    ///
    /// Environment variable: `SEQFLAKE_CLOCK_TOLERANCE_MS`
    #[arg(long, env = "SEQFLAKE_CLOCK_TOLERANCE_MS", default_value_t = ClockPolicy::DEFAULT_TOLERANCE_MS)]
    pub clock_tolerance_ms: u64,

    /// Upper bound on the number of IDs produced by one batch.
    ///
    /// Environment variable: `SEQFLAKE_MAX_BATCH_SIZE`
    #[arg(long, env = "SEQFLAKE_MAX_BATCH_SIZE", default_value_t = SequencerConfig::DEFAULT_MAX_BATCH_SIZE)]
    pub max_batch_size: usize,

    /// Custom epoch as UNIX milliseconds. Defaults to the Twitter epoch.
    ///
    /// Environment variable: `SEQFLAKE_EPOCH_MS`
    #[arg(long, env = "SEQFLAKE_EPOCH_MS", default_value_t = 1_288_834_974_657)]
    pub epoch_ms: u64,

    /// Salt for the `hashid` text form.
    ///
    /// Environment variable: `SEQFLAKE_HASHIDS_SALT`
    #[arg(long, env = "SEQFLAKE_HASHIDS_SALT", default_value = "", hide_env_values = true)]
    pub hashids_salt: String,

    /// Minimum length of the `hashid` text form.
    ///
    /// Environment variable: `SEQFLAKE_HASHIDS_MIN_LENGTH`
    #[arg(long, env = "SEQFLAKE_HASHIDS_MIN_LENGTH", default_value_t = 0)]
    pub hashids_min_length: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print freshly generated IDs, one per line, issued as one batch.
    Generate {
        /// Number of IDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Decimal)]
        format: OutputFormat,
    },
    /// Decode IDs into their fields.
    Parse {
        /// IDs to decode, decimal unless `--radix36` or `--hashid` is given.
        #[arg(required = true)]
        ids: Vec<String>,

        /// Read the IDs as radix-36 text instead of decimal.
        #[arg(long, conflicts_with = "hashid")]
        radix36: bool,

        /// Read the IDs as hashids made with `SEQFLAKE_HASHIDS_SALT`.
        #[arg(long)]
        hashid: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One fixed machine ID; waits once 4096 IDs are issued in a millisecond.
    Default,
    /// Rolls the machine ID field as extra sequence space.
    Global,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffKind {
    Spin,
    Yield,
    Sleep,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Decimal,
    Radix36,
    /// Salted short text, see `--hashids-salt`.
    Hashid,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub machine_id: u16,
    pub mode: Mode,
    pub sequencer: SequencerConfig,
    pub clock: SystemClock,
    pub hashids: Hashids,
    pub command: Command,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let machine_id = match args.machine_id {
            Some(id) => match u16::try_from(id) {
                Ok(id) if id < MAX_MACHINE_ID => id,
                _ => bail!(
                    "SEQFLAKE_MACHINE_ID ({id}) is out of range (must be below {MAX_MACHINE_ID})"
                ),
            },
            None => machine_id_from_env(),
        };

        if args.max_batch_size == 0 {
            bail!("SEQFLAKE_MAX_BATCH_SIZE must be greater than 0");
        }

        if let Command::Generate { count, .. } = &args.command {
            if *count == 0 {
                bail!("--count must be greater than 0");
            }
            if *count > args.max_batch_size {
                bail!(
                    "--count ({count}) exceeds SEQFLAKE_MAX_BATCH_SIZE ({})",
                    args.max_batch_size
                );
            }
        }

        let backoff = match args.backoff {
            BackoffKind::Spin => Backoff::Spin,
            BackoffKind::Yield => Backoff::Yield,
            BackoffKind::Sleep => Backoff::Sleep(Duration::from_micros(args.sleep_micros)),
        };

        let clock = SystemClock::with_epoch(Duration::from_millis(args.epoch_ms))
            .with_context(|| format!("SEQFLAKE_EPOCH_MS ({}) is in the future", args.epoch_ms))?;

        let sequencer = SequencerConfig::default()
            .with_backoff(backoff)
            .with_clock_policy(ClockPolicy::wait_up_to(args.clock_tolerance_ms))
            .with_max_batch_size(args.max_batch_size);

        let hashids = Hashids::with_min_length(&args.hashids_salt, args.hashids_min_length);

        Ok(Self {
            machine_id,
            mode: args.mode,
            sequencer,
            clock,
            hashids,
            command: args.command,
        })
    }
}
