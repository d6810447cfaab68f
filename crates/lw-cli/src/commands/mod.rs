pub mod check;
pub mod list;
pub mod run;

use std::path::Path;

use lw_core::{CompiledBook, LoreBook};
use miette::{IntoDiagnostic, Result, WrapErr};

/// Read and compile a lore book from a JSON file.
fn load_book(path: &Path) -> Result<CompiledBook> {
    let text = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read lore book '{}'", path.display()))?;
    let book = LoreBook::from_json(&text)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot parse lore book '{}'", path.display()))?;
    Ok(book.compile())
}
