//! Cirrus CLI - command-line client for the Cirrus application platform

use std::process::ExitCode;
use std::sync::{mpsc, Arc};

use cirrus_cli::storage::ConfigStore;
use cirrus_cli::Dispatcher;

fn main() -> ExitCode {
    let (interrupt_tx, interrupt_rx) = mpsc::channel();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(());
    }) {
        eprintln!("Warning: could not install interrupt handler: {e}");
    }

    let store = Arc::new(ConfigStore::from_env());
    let mut dispatcher = Dispatcher::new("cirrus")
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_description("A command-line client for the Cirrus application platform");
    dispatcher.set_interrupts(interrupt_rx);
    cirrus_cli::ops::register_all(&mut dispatcher, store);

    let argv: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = dispatcher.run(&argv) {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
