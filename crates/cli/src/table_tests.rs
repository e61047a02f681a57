// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn render(table: &Table) -> String {
    let mut buf = Vec::new();
    table.render(&mut buf);
    String::from_utf8(buf).unwrap()
}

#[test]
#[serial]
fn columns_align_to_widest_cell() {
    std::env::set_var("NO_COLOR", "1");
    let mut table = Table::new(vec![
        Column::muted("ID"),
        Column::left("STREAM"),
        Column::status("STATUS"),
    ]);
    table.row(vec!["abc".into(), "feature/login".into(), "running".into()]);
    table.row(vec!["d".into(), "fix".into(), "completed".into()]);

    let out = render(&table);
    similar_asserts::assert_eq!(
        out,
        "ID   STREAM         STATUS\n\
         abc  feature/login  running\n\
         d    fix            completed\n"
    );
}

#[test]
#[serial]
fn long_cells_are_truncated() {
    std::env::set_var("NO_COLOR", "1");
    let mut table = Table::new(vec![Column::left("DESC").with_max(6), Column::left("X")]);
    table.row(vec!["refactor everything".into(), "1".into()]);
    let out = render(&table);
    assert!(out.contains("refac… "), "got {out:?}");
}

#[test]
#[serial]
fn colors_do_not_change_alignment() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");
    let mut table = Table::new(vec![Column::status("STATUS"), Column::left("N")]);
    table.row(vec!["held".into(), "1".into()]);
    table.row(vec!["available".into(), "2".into()]);
    let out = render(&table);
    // "held" padded to the width of "available"
    assert!(out.contains("held\x1b[0m       1"), "got {out:?}");
    std::env::remove_var("COLOR");
}
