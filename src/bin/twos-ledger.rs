use std::{
    fs::File,
    io::{BufReader, stdin, stdout},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use twos_ledger::{
    bin_utils::{
        ScriptError, Service,
        config::Config,
        console::Console,
    },
    ledger::{ExecuteError, LedgerError, in_memory_ledger::InMemoryLedger},
    notify::{RecordingNotifier, TracingNotifier},
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    let hasher = Arc::new(config.hasher().context("Invalid password hashing settings")?);

    let Some(filename) = &config.script else {
        let alerts = RecordingNotifier::default();
        let mut ledger = InMemoryLedger::new(hasher, Box::new(alerts.clone()));
        let mut console = Console::new(&mut ledger, stdin().lock(), stdout(), &config.currency)
            .with_alerts(alerts);
        return console.run();
    };

    let file = File::open(filename)
        .with_context(|| format!("Failed to open `{}`", filename.display()))?;
    let service = Service {
        input: BufReader::new(file),
        output: &mut stdout(),
        ledger: InMemoryLedger::new(hasher, Box::new(TracingNotifier)),
        error_printer: Box::new(|line, err| {
            match err {
                ScriptError::Execute(ExecuteError::LedgerErr(LedgerError::Account(_))) => {
                    // refused operations are part of the script's outcome, not failures
                }
                err => eprintln!("Error at line {line}: {err}"),
            }
        }),
    };
    service.run()
}
