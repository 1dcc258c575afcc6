// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use std::time::Instant;

/// Logs how long the enclosing scope took when dropped.
pub struct SubmissionTimer {
    label: String,
    start: Instant,
}

impl SubmissionTimer {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), start: Instant::now() }
    }
}

impl Drop for SubmissionTimer {
    fn drop(&mut self) {
        log::info!("⏲️ {} took {:?}", self.label, self.start.elapsed());
    }
}
