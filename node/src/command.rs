// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use crate::{cli::Cli, submitter_config};
use clap::Parser;
use std::process::ExitCode;
use submitter_service::shutdown::{shutdown_channel, ShutdownTrigger};

fn init_logger() {
    use env_logger::{Builder, Env};
    let env = Env::new().default_filter_or("info");
    let _ = Builder::from_env(env).try_init();
}

/// Parse command line arguments, resolve the configuration and run the submitter until it is
/// asked to stop.
pub fn run() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    let config = match submitter_config::resolve(cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("💔 {}", e);
            return ExitCode::FAILURE
        },
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("💔 Unable to start the async runtime: {}", e);
            return ExitCode::FAILURE
        },
    };

    let result = runtime.block_on(async move {
        let (trigger, shutdown) = shutdown_channel();
        tokio::spawn(forward_shutdown_signal(trigger));
        submitter_service::start(config, shutdown).await
    });

    match result {
        Ok(()) => {
            log::info!("⛓️  validator-set-submitter stopped");
            ExitCode::SUCCESS
        },
        Err(e) => {
            log::error!("💔 validator-set-submitter failed: {:#}", e);
            ExitCode::FAILURE
        },
    }
}

async fn forward_shutdown_signal(trigger: ShutdownTrigger) {
    match shutdown_signal().await {
        Ok(signal) => {
            log::info!("Received {}, shutting down", signal);
            trigger.trigger();
        },
        Err(e) => log::error!("💔 Unable to listen for shutdown signals: {:?}", e),
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    })
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
