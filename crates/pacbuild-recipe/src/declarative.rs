//! The declarative-recipe front-end: `[section]` headers with `key = value`
//! lines, TOML-flavored but intentionally looser (bare comma-separated
//! lists are accepted alongside bracketed ones).

use crate::model::{HookKind, RecipeBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Package,
    Build,
    Dependencies,
    Unknown,
}

fn strip_quotes(raw: &str) -> String {
    let t = raw.trim();
    let bytes = t.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return t[1..t.len() - 1].to_string();
        }
    }
    t.to_string()
}

fn parse_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    inner
        .split(',')
        .map(strip_quotes)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse the text of a declarative-recipe file into a [`RecipeBuilder`].
pub fn parse(text: &str) -> RecipeBuilder {
    let mut builder = RecipeBuilder::default();
    let mut section = Section::Unknown;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(inner) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            section = match inner.trim() {
                "package" => Section::Package,
                "build" => Section::Build,
                "dependencies" => Section::Dependencies,
                _ => Section::Unknown,
            };
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        apply_key(&mut builder, section, key, value);
    }

    builder
}

fn apply_key(builder: &mut RecipeBuilder, section: Section, key: &str, value: &str) {
    match (section, key) {
        (Section::Package, "name") => builder.name = Some(strip_quotes(value)),
        (Section::Package, "version") => builder.version = Some(strip_quotes(value)),
        (Section::Package, "release") => builder.release = Some(strip_quotes(value)),
        (Section::Package, "description") => builder.description = Some(strip_quotes(value)),
        (Section::Package, "url") => builder.url = Some(strip_quotes(value)),
        (Section::Package, "license") => builder.licenses = parse_list(value),
        (Section::Package, "arch") => builder.architectures = parse_list(value),
        (Section::Package, "conflicts") => builder.conflicts = parse_list(value),
        (Section::Package, "provides") => builder.provides = parse_list(value),
        (Section::Package, "replaces") => builder.replaces = parse_list(value),
        (Section::Package, "epoch") => builder.epoch = strip_quotes(value).parse().ok(),

        (Section::Build, "type") => builder.build_type = Some(strip_quotes(value)),
        (Section::Build, "sources") => builder.sources = parse_list(value),
        (Section::Build, "checksums") => builder.checksums = parse_list(value),
        (Section::Build, "prepare_script") => {
            builder.hooks.insert(HookKind::Prepare, unescape_script(value));
        }
        (Section::Build, "build_script") => {
            builder.hooks.insert(HookKind::Build, unescape_script(value));
        }
        (Section::Build, "check_script") => {
            builder.hooks.insert(HookKind::Check, unescape_script(value));
        }
        (Section::Build, "package_script") => {
            builder.hooks.insert(HookKind::Package, unescape_script(value));
        }

        (Section::Dependencies, "runtime") => builder.runtime_dependencies = parse_list(value),
        (Section::Dependencies, "build") => builder.build_dependencies = parse_list(value),

        _ => {} // unrecognized key in a recognized section, or any key in an unknown section
    }
}

/// Declarative hook scripts are given as a single `key = value` line; `\n`
/// escape sequences stand in for line breaks since the grammar has no
/// native multi-line string syntax.
fn unescape_script(value: &str) -> String {
    strip_quotes(value).replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_and_scalars() {
        let text = r#"
            [package]
            name = "hello"
            version = 1.0.0
            release = 1
            arch = [x86_64, aarch64]

            [build]
            sources = hello.c
            checksums = SKIP
        "#;
        let b = parse(text);
        assert_eq!(b.name.as_deref(), Some("hello"));
        assert_eq!(b.version.as_deref(), Some("1.0.0"));
        assert_eq!(b.architectures, vec!["x86_64", "aarch64"]);
        assert_eq!(b.sources, vec!["hello.c"]);
        assert_eq!(b.checksums, vec!["SKIP"]);
    }

    #[test]
    fn bracketed_and_bare_lists_are_equivalent() {
        assert_eq!(parse_list("[a, b, c]"), vec!["a", "b", "c"]);
        assert_eq!(parse_list("a, b, c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn hook_scripts_are_recognized() {
        let text = "[build]\nbuild_script = \"gcc -o hello hello.c\"\n";
        let b = parse(text);
        assert_eq!(b.hooks.get(&HookKind::Build).unwrap(), "gcc -o hello hello.c");
    }
}
