// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

//! Validator set submitter CLI

mod cli;
mod command;
mod submitter_config;

fn main() -> std::process::ExitCode {
    command::run()
}
