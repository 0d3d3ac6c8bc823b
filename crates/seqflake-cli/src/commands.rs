use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use tracing::info;

use crate::config::{AppConfig, Command, Mode, OutputFormat};
use seqflake::{DefaultSequencer, GlobalSequencer, Hashids, Sequencer, SnowflakeId};

/// One decoded ID as printed by `--format json`.
#[derive(Serialize)]
struct IdRecord {
    id: SnowflakeId,
    radix36: String,
    timestamp: u64,
    unix_millis: u64,
    machine_id: u16,
    sequence: u16,
}

impl IdRecord {
    fn new(id: SnowflakeId, epoch_millis: u64) -> Self {
        Self {
            id,
            radix36: id.to_radix36(),
            timestamp: id.timestamp(),
            unix_millis: id.unix_millis(epoch_millis),
            machine_id: id.machine_id(),
            sequence: id.sequence(),
        }
    }
}

pub fn run(config: &AppConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Generate { count, format } => {
            let ids = match config.mode {
                Mode::Default => {
                    let sequencer = DefaultSequencer::with_config(
                        i64::from(config.machine_id),
                        config.clock,
                        config.sequencer,
                    );
                    generate(&sequencer, *count)?
                }
                Mode::Global => {
                    let sequencer = GlobalSequencer::with_config(config.clock, config.sequencer);
                    generate(&sequencer, *count)?
                }
            };
            info!(count = ids.len(), mode = ?config.mode, "generated ids");
            write_ids(&ids, *format, config, out)
        }
        Command::Parse {
            ids,
            radix36,
            hashid,
        } => {
            let form = match (*radix36, *hashid) {
                (_, true) => TextForm::Hashid(&config.hashids),
                (true, false) => TextForm::Radix36,
                (false, false) => TextForm::Decimal,
            };
            for raw in ids {
                let id = parse_id(raw, form)?;
                write_fields(id, config.clock.epoch_millis(), out)?;
            }
            Ok(())
        }
    }
}

fn generate<S>(sequencer: &S, count: usize) -> anyhow::Result<Vec<SnowflakeId>>
where
    S: Sequencer,
{
    let batch = sequencer
        .next_sequences(count)
        .context("failed to reserve id batch")?;
    let ids = batch
        .collect::<Result<Vec<_>, _>>()
        .context("failed to generate id")?;
    Ok(ids)
}

fn write_ids(
    ids: &[SnowflakeId],
    format: OutputFormat,
    config: &AppConfig,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let epoch_millis = config.clock.epoch_millis();
    for &id in ids {
        match format {
            OutputFormat::Decimal => writeln!(out, "{id}")?,
            OutputFormat::Radix36 => writeln!(out, "{}", id.to_radix36())?,
            OutputFormat::Hashid => writeln!(out, "{}", config.hashids.encode_id(id))?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &IdRecord::new(id, epoch_millis))?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum TextForm<'a> {
    Decimal,
    Radix36,
    Hashid(&'a Hashids),
}

fn parse_id(raw: &str, form: TextForm<'_>) -> anyhow::Result<SnowflakeId> {
    let raw = raw.trim();
    let id = match form {
        TextForm::Decimal => raw.parse::<SnowflakeId>().map_err(anyhow::Error::from),
        TextForm::Radix36 => SnowflakeId::from_radix36(raw).map_err(anyhow::Error::from),
        TextForm::Hashid(hashids) => hashids.decode_id(raw).map_err(anyhow::Error::from),
    };
    id.with_context(|| format!("invalid id {raw:?}"))
}

fn write_fields(id: SnowflakeId, epoch_millis: u64, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(
        out,
        "id={id} radix36={} timestamp={} unix_millis={} machine_id={} sequence={}",
        id.to_radix36(),
        id.timestamp(),
        id.unix_millis(epoch_millis),
        id.machine_id(),
        id.sequence(),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqflake::{SequencerConfig, SystemClock};

    const SALT: &str = "great korea";

    fn app(mode: Mode, command: Command) -> AppConfig {
        AppConfig {
            machine_id: 7,
            mode,
            sequencer: SequencerConfig::default(),
            clock: SystemClock::default(),
            hashids: Hashids::new(SALT),
            command,
        }
    }

    fn output(config: &AppConfig) -> String {
        let mut out = Vec::new();
        run(config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn generates_decimal_ids_in_order() {
        let config = app(
            Mode::Default,
            Command::Generate {
                count: 100,
                format: OutputFormat::Decimal,
            },
        );
        let out = output(&config);
        let ids: Vec<SnowflakeId> = out.lines().map(|l| l.parse().unwrap()).collect();

        assert_eq!(ids.len(), 100);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.iter().all(|id| id.machine_id() == 7));
    }

    #[test]
    fn generates_radix36_ids() {
        let config = app(
            Mode::Global,
            Command::Generate {
                count: 5,
                format: OutputFormat::Radix36,
            },
        );
        let out = output(&config);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.len() == seqflake::RADIX36_LEN));
        assert!(lines.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn generates_json_records() {
        let config = app(
            Mode::Default,
            Command::Generate {
                count: 2,
                format: OutputFormat::Json,
            },
        );
        let out = output(&config);

        for line in out.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            let id = SnowflakeId::from_raw(value["id"].as_u64().unwrap());
            assert_eq!(value["machine_id"], 7);
            assert_eq!(value["radix36"], id.to_radix36());
            assert_eq!(
                value["unix_millis"].as_u64().unwrap(),
                id.unix_millis(config.clock.epoch_millis())
            );
        }
    }

    #[test]
    fn generates_hashids() {
        let config = app(
            Mode::Default,
            Command::Generate {
                count: 3,
                format: OutputFormat::Hashid,
            },
        );
        let out = output(&config);
        let hashids = Hashids::new(SALT);
        let ids: Vec<SnowflakeId> = out
            .lines()
            .map(|l| hashids.decode_id(l).unwrap())
            .collect();

        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.iter().all(|id| id.machine_id() == 7));
        let first = out.lines().next().unwrap();
        assert!(Hashids::new("other salt").decode_id(first).is_err());
    }

    #[test]
    fn parses_all_text_forms() {
        let id = SnowflakeId::from_components(1_000, 7, 3);
        let config = app(
            Mode::Default,
            Command::Parse {
                ids: vec![id.to_string()],
                radix36: false,
                hashid: false,
            },
        );
        let decimal = output(&config);

        let config = app(
            Mode::Default,
            Command::Parse {
                ids: vec![id.to_radix36()],
                radix36: true,
                hashid: false,
            },
        );
        let radix36 = output(&config);

        let config = app(
            Mode::Default,
            Command::Parse {
                ids: vec![Hashids::new(SALT).encode_id(id)],
                radix36: false,
                hashid: true,
            },
        );
        let hashid = output(&config);

        assert_eq!(decimal, radix36);
        assert_eq!(decimal, hashid);
        assert!(decimal.contains("timestamp=1000 "));
        assert!(decimal.contains("unix_millis=1288834975657 "));
        assert!(decimal.contains("machine_id=7 "));
        assert!(decimal.trim_end().ends_with("sequence=3"));
    }

    #[test]
    fn parse_reports_invalid_input() {
        let config = app(
            Mode::Default,
            Command::Parse {
                ids: vec!["12x".to_string()],
                radix36: false,
                hashid: false,
            },
        );
        let err = run(&config, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("invalid id"));
    }
}
