use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Parser;
use rewind_core::{History, HistoryConfig};

/// Interactive counter demonstrating bounded undo/redo history.
#[derive(Parser, Debug)]
#[command(name = "rewind", version, about)]
struct Cli {
    /// Maximum number of retained history entries.
    #[arg(long, default_value_t = 5)]
    capacity: usize,

    /// Starting value for the counter.
    #[arg(long, default_value_t = 0)]
    initial: i64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting rewind demo");

    let mut history = History::with_config(
        Some(cli.initial),
        HistoryConfig::new()
            .capacity(cli.capacity)
            .on_undo(|current: &i64, origin: &i64| println!("undo: {origin} -> {current}"))
            .on_redo(|current: &i64, origin: &i64| println!("redo: {origin} -> {current}")),
    );
    history.set_observer(|len: usize| tracing::debug!(len, "history changed"));

    println!("commands: inc, dec, set <n>, undo, redo, history, clear, clear!, quit");
    print_state(&history);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match line.trim() {
            "" => continue,
            "inc" => {
                history.update(|v| v.copied().unwrap_or(0) + 1);
            }
            "dec" => {
                history.update(|v| v.copied().unwrap_or(0) - 1);
            }
            "undo" => {
                if !history.undo() {
                    println!("nothing to undo");
                }
            }
            "redo" => {
                if !history.redo() {
                    println!("nothing to redo");
                }
            }
            "history" => {}
            "clear" => history.clear(false),
            "clear!" => history.clear(true),
            "quit" | "exit" => break,
            command => {
                if let Some(raw) = command.strip_prefix("set ") {
                    match raw.trim().parse::<i64>() {
                        Ok(value) => {
                            history.set(value);
                        }
                        Err(e) => println!("not a number: {e}"),
                    }
                } else {
                    println!("unknown command: {command}");
                }
            }
        }

        print_state(&history);
    }

    history.dispose();
    Ok(())
}

fn print_state(history: &History<i64>) {
    let entries: Vec<String> = history.iter().map(i64::to_string).collect();
    println!(
        "value: {}  history: [{}] ({}/{})",
        history
            .value()
            .map_or_else(|| String::from("-"), i64::to_string),
        entries.join(", "),
        history.len(),
        history.capacity(),
    );
}
