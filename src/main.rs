//! aquamon-replay: push a captured serial stream through the monitor core.
//!
//! ```text
//!  stdin / capture file ──▶ LoopbackFeeder ──▶ MonitorService ──▶ log
//!                                               (session, decoder,
//!                                                control loop)
//! ```
//!
//! Usage: `aquamon-replay [--config monitor.json] [--prediction] [capture.txt]`
//!
//! Set `RUST_LOG=debug` to see dropped frames.
#![deny(unused_must_use)]

use std::fs::File;
use std::io::{self, Read};

use anyhow::{Context, Result, bail};
use log::info;

use aquamon::adapters::log_sink::{LogActuator, LogEventSink};
use aquamon::adapters::loopback::{LoopbackFeeder, LoopbackTransport};
use aquamon::app::service::MonitorService;
use aquamon::config::MonitorConfig;
use aquamon::link::channels::CHUNK_CAPACITY;
use aquamon::link::registry::DeviceDescriptor;
use aquamon::link::telegram::TelegramSchema;

const REPLAY_DEVICE: &str = "replay:0";

struct Args {
    config: Option<String>,
    prediction: bool,
    input: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        prediction: false,
        input: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                args.config = Some(it.next().context("--config needs a path")?);
            }
            "--prediction" => args.prediction = true,
            other if other.starts_with("--") => bail!("unknown option {other}"),
            other => args.input = Some(other.to_owned()),
        }
    }
    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<MonitorConfig> {
    let Some(path) = path else {
        return Ok(MonitorConfig::default());
    };
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    MonitorConfig::from_json(&json).with_context(|| format!("loading {path}"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let mut config = load_config(args.config.as_deref())?;
    if args.prediction {
        config.link.schema = TelegramSchema::Prediction;
    }

    let input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(File::open(path).with_context(|| format!("opening {path}"))?),
        None => Box::new(io::stdin()),
    };

    let transport = LoopbackTransport::new(vec![DeviceDescriptor::new(
        REPLAY_DEVICE,
        Some("Replay"),
    )]);
    let feeder = transport.feeder();
    let service = MonitorService::new(config, transport)?;

    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    futures_lite::future::block_on(executor.run(replay(service, feeder, input)))
}

async fn replay(
    mut service: MonitorService<LoopbackTransport>,
    feeder: LoopbackFeeder,
    mut input: Box<dyn Read>,
) -> Result<()> {
    let mut hw = LogActuator::new();
    let mut sink = LogEventSink::new();

    service.discover(&mut sink).await?;
    service.connect(REPLAY_DEVICE, &mut sink).await?;

    let mut buf = [0u8; CHUNK_CAPACITY];
    let mut telegrams = 0usize;
    loop {
        let n = input.read(&mut buf).context("reading capture")?;
        if n == 0 {
            break;
        }
        feeder.write(&buf[..n]);
        // One chunk per poll keeps the inbound queue from overrunning.
        telegrams += service.poll_link(&mut hw, &mut sink);
    }

    let snapshot = service.snapshot();
    service.disconnect(&mut sink).await?;

    info!(
        "Replay done: {} telegrams, {} dropped frames, {} alarms, final status: {}",
        telegrams,
        snapshot.dropped_frames,
        hw.alarms(),
        snapshot.status_line()
    );
    match service.prediction_request() {
        Ok(req) => info!("Prediction request: {}", req.to_json()),
        Err(e) => info!("Prediction form incomplete: {}", e),
    }
    Ok(())
}
