//! Change/print walkthrough
//!
//! Creates one actor with the `change` behavior and sends it a message.
//! `change` sends two copies of the message to itself, switches to `print`
//! and sends two more, so every word of the message is printed four times.

use actor_runtime::{Behavior, Event, LogErrorSink, Message, Runtime, RuntimeConfig, Value};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print runtime trace lines
    #[arg(long)]
    trace: bool,

    /// Dispatch worker threads (overrides the configuration)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Words sent to the actor
    #[arg(short, long, num_args = 1.., default_value = "foo")]
    message: Vec<String>,
}

fn print(event: &Event) {
    for word in event.message().strings() {
        println!("{}", word);
    }
}

fn change(event: &Event) {
    let me = event.self_ref();
    me.send(&me, event.message().clone());
    me.send(&me, event.message().clone());
    me.become_behavior(Behavior::named("print", print));
    me.send(&me, event.message().clone());
    me.send(&me, event.message().clone());
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = RuntimeConfig::load(args.config.as_deref())
        .context("Failed to load runtime configuration")?;
    if args.trace {
        config = config.with_trace(true);
    }
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    config.validate()?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting sketch");
    debug!(?config, "Runtime configuration");

    let workers = config.workers;
    let runtime = Runtime::builder()
        .config(config)
        .error_sink(LogErrorSink)
        .build();

    let actor = runtime.create(Behavior::named("change", change));
    let message: Message = args.message.into_iter().map(Value::from).collect();
    runtime.send(&actor, message);

    let steps = if workers > 1 {
        runtime
            .run_workers(workers)
            .context("Dispatch workers failed")?
    } else {
        let mut steps = 0;
        while runtime.has_events() {
            runtime.dispatch();
            steps += 1;
        }
        steps
    };

    let stats = runtime.stats();
    info!(
        steps,
        commits = stats.commits,
        aborts = stats.aborts,
        deferrals = stats.deferrals,
        "Queue drained"
    );
    if stats.aborts > 0 {
        warn!(aborts = stats.aborts, "Some handlings were rolled back");
    }

    match runtime.behavior_of(&actor) {
        Some(behavior) => info!(actor = %actor, behavior = ?behavior, "Final behavior"),
        None => warn!(actor = %actor, "Actor missing from runtime"),
    }

    Ok(())
}
