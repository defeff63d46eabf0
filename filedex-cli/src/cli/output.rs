// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Report formatting for the shell's `ls` command

use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use filedex::Resource;

/// Render the collection as a table, one column per requested field.
pub fn render_table<R: Resource>(fields: &[&str], resources: &[&R]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let header: Vec<Cell> = fields
        .iter()
        .map(|field| Cell::new(field).fg(Color::Green))
        .collect();
    table.set_header(header);

    for resource in resources {
        let row: Vec<String> = fields
            .iter()
            .map(|field| {
                resource
                    .attribute(field)
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "<n/a>".to_string())
            })
            .collect();
        table.add_row(row);
    }

    table.to_string()
}
