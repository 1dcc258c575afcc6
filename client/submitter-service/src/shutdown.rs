// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

//! Process wide cancellation, observed by the supervisor and by in-flight receipt waits.

use tokio::sync::watch;

pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownTrigger { sender }, ShutdownSignal { receiver })
}

#[derive(Debug)]
pub struct ShutdownTrigger {
    sender: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolves once shutdown has been requested. Never resolves if the trigger was dropped
    /// without firing.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        let sender_alive = receiver.wait_for(|triggered| *triggered).await.is_ok();
        if !sender_alive {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
#[path = "tests/test_shutdown.rs"]
mod test_shutdown;
