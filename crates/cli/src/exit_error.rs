// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

use bt_wire::ErrorKind;

use crate::client::ClientError;

/// Request rejected by validation (bad task stream name, empty description)
pub const EXIT_VALIDATION: i32 = 2;
/// Task stream already in use, or workspace held
pub const EXIT_CONFLICT: i32 = 3;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<ClientError> for ExitError {
    fn from(e: ClientError) -> Self {
        Self::new(client_exit_code(&e), e.to_string())
    }
}

fn client_exit_code(e: &ClientError) -> i32 {
    match e {
        ClientError::Rejected { kind: ErrorKind::Invalid, .. } => EXIT_VALIDATION,
        ClientError::Rejected { kind: ErrorKind::Conflict, .. } => EXIT_CONFLICT,
        _ => 1,
    }
}

/// Exit code for an error returned from a command.
pub fn exit_code(e: &anyhow::Error) -> i32 {
    if let Some(exit) = e.downcast_ref::<ExitError>() {
        return exit.code;
    }
    if let Some(client) = e.downcast_ref::<ClientError>() {
        return client_exit_code(client);
    }
    1
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
