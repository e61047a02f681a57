//! CLI help output specs

use crate::prelude::*;

#[test]
fn bt_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn bt_job_help_shows_subcommands() {
    cli()
        .args(&["job", "--help"])
        .passes()
        .stdout_has("list")
        .stdout_has("show")
        .stdout_has("history")
        .stdout_has("cancel");
}

#[test]
fn bt_workspace_help_shows_subcommands() {
    cli()
        .args(&["workspace", "--help"])
        .passes()
        .stdout_has("list")
        .stdout_has("remove")
        .stdout_has("release");
}

#[test]
fn bt_daemon_help_shows_subcommands() {
    cli().args(&["daemon", "--help"]).passes().stdout_has("status").stdout_has("stop");
}

#[test]
fn bt_version_shows_package_version() {
    cli().args(&["--version"]).passes().stdout_has(env!("CARGO_PKG_VERSION"));
}
