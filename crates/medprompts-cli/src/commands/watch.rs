use std::time::Duration;

use clap::Args;
use medprompts_core::Topic;

use super::{open_app, print_json, CliResult};

#[derive(Args)]
pub struct WatchArgs {
    /// Stop after this many polls (runs until interrupted otherwise)
    #[arg(long)]
    iterations: Option<u64>,
}

pub fn run(args: WatchArgs) -> CliResult {
    let mut app = open_app()?;
    let interval = Duration::from_secs(app.config().sync.poll_interval_secs.max(1));

    // Local ticks and writes from other processes both surface here.
    let subscriptions: Vec<_> = Topic::ALL
        .iter()
        .map(|topic| {
            app.subscribe(*topic, |t| {
                println!("{}", serde_json::json!({ "type": "changed", "topic": t }));
            })
        })
        .collect();
    tracing::debug!(?interval, "watching for changes");

    let mut polls = 0u64;
    loop {
        if let Some(event) = app.poll().event {
            print_json(&event)?;
        }

        polls += 1;
        if args.iterations.is_some_and(|max| polls >= max) {
            break;
        }
        std::thread::sleep(interval);
    }

    for sub in subscriptions {
        sub.unsubscribe();
    }
    Ok(())
}
