use std::path::Path;

use colored::Colorize;
use miette::Result;

pub fn run(book_path: &Path) -> Result<()> {
    let book = super::load_book(book_path)?;

    println!(
        "  {} rules, {} entities, {} relationships",
        book.rules.len(),
        book.entities.len(),
        book.relationships.len(),
    );

    if book.diagnostics.is_empty() {
        println!("  {}", "Lore book compiled cleanly.".green());
    } else {
        for note in &book.diagnostics {
            println!("  {} {note}", "note:".yellow());
        }
        println!(
            "  {} note{}",
            book.diagnostics.len(),
            if book.diagnostics.len() == 1 { "" } else { "s" },
        );
    }

    Ok(())
}
