// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bt daemon library: configuration, startup recovery and the IPC listener
//! behind the `btd` binary.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod lifecycle;
pub mod listener;
pub mod logging;

pub use config::{ConfigError, OrphanPolicy, Settings};
pub use lifecycle::{Config, DaemonState, LifecycleError, StartupResult};
pub use listener::{ListenCtx, Listener};
