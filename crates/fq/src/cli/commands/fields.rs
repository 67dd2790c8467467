//! Implementation of `fq fields`.

use std::process::ExitCode;

use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use fq_config::{Field, format_origin};

use crate::cli::{context::CommandContext, output::dim};

/// Lists configured field codes with the record keys they search.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;
    if config.fields.is_empty() {
        println!("{}", dim("No fields defined."));
        return ExitCode::SUCCESS;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_header(vec!["Code", "Keys", "Description", "Defined in"]);

    for (code, field) in &config.fields {
        table.add_row(vec![
            code.clone(),
            keys_cell(field),
            field.description.clone().unwrap_or_default(),
            format_origin(field, Some(&ctx.cwd)),
        ]);
    }

    println!("{table}");
    ExitCode::SUCCESS
}

/// Renders the record keys of a field.
fn keys_cell(field: &Field) -> String {
    if field.keys.is_empty() {
        String::from("(disabled)")
    } else {
        field.keys.join(", ")
    }
}
