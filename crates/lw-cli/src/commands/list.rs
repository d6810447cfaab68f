use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use miette::Result;

pub fn run(book_path: &Path) -> Result<()> {
    let book = super::load_book(book_path)?;

    if book.rules.is_empty() {
        println!("  No rules in this lore book.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Tag", "Activation", "Prio", "Group", "Emits"]);

    for (index, rule) in book.rules.iter().enumerate() {
        let emits: Vec<&str> = [
            rule.personality.is_some().then_some("personality"),
            rule.scenario.is_some().then_some("scenario"),
            (!rule.triggers.is_empty()).then_some("tags"),
            (!rule.shifts.is_empty()).then_some("shifts"),
        ]
        .into_iter()
        .flatten()
        .collect();

        table.add_row(vec![
            index.to_string(),
            rule.tag.clone().unwrap_or_else(|| "-".into()),
            rule.activation.to_string(),
            rule.priority.to_string(),
            rule.group.clone().unwrap_or_else(|| "-".into()),
            if emits.is_empty() { "-".into() } else { emits.join("+") },
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} rules", book.rules.len());

    Ok(())
}
