//! Validation of a [`RecipeBuilder`] into a fully-checked [`Recipe`].

use crate::error::{RecipeError, Result};
use crate::model::{ConstrainedName, Recipe, RecipeBuilder, SKIP};

fn is_valid_checksum(value: &str) -> bool {
    if value == SKIP {
        return true;
    }
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

/// Validate a builder, producing a [`Recipe`] or the first validation error
/// encountered, checked in order: required fields, then checksum-count
/// agreement, then checksum shape.
pub fn validate(builder: RecipeBuilder) -> Result<Recipe> {
    let name = builder
        .name
        .filter(|s| !s.is_empty())
        .ok_or(RecipeError::MissingRequiredField("name"))?;
    let version = builder
        .version
        .filter(|s| !s.is_empty())
        .ok_or(RecipeError::MissingRequiredField("version"))?;
    let release = builder
        .release
        .filter(|s| !s.is_empty())
        .ok_or(RecipeError::MissingRequiredField("release"))?;
    if builder.architectures.is_empty() {
        return Err(RecipeError::MissingRequiredField("architectures"));
    }

    if !builder.checksums.is_empty() && builder.checksums.len() != builder.sources.len() {
        return Err(RecipeError::ChecksumCountMismatch {
            expected: builder.sources.len(),
            actual: builder.checksums.len(),
        });
    }

    for (source, checksum) in builder.sources.iter().zip(builder.checksums.iter()) {
        if !is_valid_checksum(checksum) {
            return Err(RecipeError::InvalidChecksum {
                source: source.clone(),
                value: checksum.clone(),
            });
        }
    }

    Ok(Recipe {
        name,
        version,
        release,
        description: builder.description,
        url: builder.url,
        architectures: builder.architectures,
        licenses: builder.licenses,
        runtime_dependencies: builder
            .runtime_dependencies
            .iter()
            .map(|s| ConstrainedName::parse(s))
            .collect(),
        build_dependencies: builder
            .build_dependencies
            .iter()
            .map(|s| ConstrainedName::parse(s))
            .collect(),
        sources: builder.sources,
        checksums: builder.checksums,
        hooks: builder.hooks,
        conflicts: builder
            .conflicts
            .iter()
            .map(|s| ConstrainedName::parse(s))
            .collect(),
        provides: builder.provides,
        replaces: builder.replaces,
        epoch: builder.epoch,
    })
}
