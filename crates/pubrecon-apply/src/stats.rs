//! Applier outcome counters.

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use pubrecon_core::fmt_num;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionStats {
    pub success: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeepStats {
    pub success: usize,
    pub failed: usize,
    /// Links deleted because their publication was not in the keep set
    pub removed: usize,
}

/// Per-action counters for one apply run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    #[serde(rename = "ADD")]
    pub add: ActionStats,
    #[serde(rename = "DELETE")]
    pub delete: ActionStats,
    #[serde(rename = "KEEP")]
    pub keep: KeepStats,
    /// Report residents resolved to a database resident
    pub residents_resolved: usize,
    /// Report residents skipped because no database resident matched
    pub residents_skipped: usize,
}

impl Stats {
    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Action")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Success").fg(Color::Cyan),
                Cell::new("Failed").fg(Color::Cyan),
                Cell::new("Removed").fg(Color::Cyan),
            ]);

        table.add_row(vec![
            Cell::new("ADD"),
            Cell::new(fmt_num(self.add.success)),
            Cell::new(fmt_num(self.add.failed)),
            Cell::new("-"),
        ]);
        table.add_row(vec![
            Cell::new("DELETE"),
            Cell::new(fmt_num(self.delete.success)),
            Cell::new(fmt_num(self.delete.failed)),
            Cell::new("-"),
        ]);
        table.add_row(vec![
            Cell::new("KEEP"),
            Cell::new(fmt_num(self.keep.success)),
            Cell::new(fmt_num(self.keep.failed)),
            Cell::new(fmt_num(self.keep.removed)),
        ]);
        table.add_row(vec![
            Cell::new("Residents"),
            Cell::new(fmt_num(self.residents_resolved)),
            Cell::new(fmt_num(self.residents_skipped)).fg(if self.residents_skipped > 0 {
                Color::Yellow
            } else {
                Color::Reset
            }),
            Cell::new("-"),
        ]);

        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_action_keys() {
        let stats = Stats {
            add: ActionStats {
                success: 2,
                failed: 1,
            },
            keep: KeepStats {
                success: 1,
                failed: 0,
                removed: 3,
            },
            ..Stats::default()
        };
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value["ADD"]["success"], 2);
        assert_eq!(value["DELETE"]["failed"], 0);
        assert_eq!(value["KEEP"]["removed"], 3);
    }

    #[test]
    fn table_lists_every_action() {
        let out = Stats::default().format_table();
        for label in ["ADD", "DELETE", "KEEP", "Removed"] {
            assert!(out.contains(label), "{label} missing from\n{out}");
        }
    }
}
