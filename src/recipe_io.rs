//! Recipe loading: detects which front-end a recipe file uses and parses
//! it with the matching one.

use std::path::Path;

use pacbuild_recipe::{parse_declarative_recipe, parse_shell_recipe, Recipe};

use crate::error::Result;

/// A declarative-recipe file has at least one bracketed section header;
/// a shell-recipe never does.
fn looks_declarative(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .any(|line| line.starts_with('[') && line.ends_with(']'))
}

/// Load and parse the recipe at `path`, returning both the parsed `Recipe`
/// and its original body text (needed verbatim for cache key derivation).
pub fn load(path: &Path) -> Result<(Recipe, String)> {
    let text = fs_err::read_to_string(path)?;
    let recipe = if looks_declarative(&text) {
        parse_declarative_recipe(&text)?
    } else {
        parse_shell_recipe(&text)?
    };
    Ok((recipe, text))
}
