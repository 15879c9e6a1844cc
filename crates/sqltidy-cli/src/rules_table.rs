//! The `--rules` listing.

use sqltidy_core::StyleEngine;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Render the engine's rule set as a table, in registration order.
pub fn format_rules_table(engine: &StyleEngine) -> String {
    let rows: Vec<RuleRow> = engine
        .rules()
        .map(|rule| RuleRow {
            code: rule.code().to_string(),
            name: rule.name().to_string(),
            description: rule.description().to_string(),
        })
        .collect();

    Table::new(rows).with(Style::sharp()).to_string()
}
