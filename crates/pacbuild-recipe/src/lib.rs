//! Recipe model and dual front-end parser.
//!
//! Two text formats describe the same [`Recipe`]: a lenient PKGBUILD-shaped
//! "shell-recipe" ([`shell`]) and a stricter `[section]` "declarative-recipe"
//! ([`declarative`]), which can additionally be lowered ([`lower`]) into
//! shell-recipe text so the execution path only ever has to deal with one
//! shape of script.

pub mod declarative;
pub mod error;
pub mod lower;
pub mod model;
pub mod shell;
pub mod validate;

pub use error::{RecipeError, Result};
pub use model::{ConstrainedName, HookKind, Recipe, RecipeBuilder, Relation, SKIP};

/// Parse and validate a shell-recipe from its text content.
pub fn parse_shell_recipe(text: &str) -> Result<Recipe> {
    validate::validate(shell::parse(text))
}

/// Parse and validate a declarative-recipe from its text content.
pub fn parse_declarative_recipe(text: &str) -> Result<Recipe> {
    validate::validate(declarative::parse(text))
}

/// Lower a declarative-recipe's text into shell-recipe text, without
/// validating either side. Useful for feeding the uniform shell execution
/// path regardless of which front-end produced the recipe.
pub fn lower_declarative_to_shell(text: &str) -> String {
    lower::lower(&declarative::parse(text))
}
