//! The shell-recipe front-end: a lenient, line-oriented scanner over a
//! PKGBUILD-shaped text file.

use crate::model::{HookKind, RecipeBuilder};

const SCALAR_KEYS: &[&str] = &["name", "version", "release", "description", "url"];

const ARRAY_KEYS: &[&str] = &[
    "architectures",
    "licenses",
    "runtime_dependencies",
    "build_dependencies",
    "sources",
    "checksums",
    "conflicts",
    "provides",
    "replaces",
];

/// Strip one enclosing layer of matching single or double quotes, if present.
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

/// Parse a parenthesized array assignment starting on `lines[start]`, whose
/// trimmed text begins with `"{key}=("`. Returns the parsed items and the
/// index of the line *after* the one containing the closing `)`.
fn parse_array(lines: &[&str], start: usize, key: &str) -> (Vec<String>, usize) {
    let prefix = format!("{}=(", key);
    let first_line = lines[start].trim_start();
    let open_pos = first_line.find(&prefix).unwrap() + prefix.len();

    let mut buffer = String::new();
    let mut closed = false;
    let mut i = start;
    let mut rest = &first_line[open_pos..];
    loop {
        if let Some(close) = rest.find(')') {
            buffer.push_str(&rest[..close]);
            closed = true;
            i += 1;
            break;
        } else {
            buffer.push_str(rest);
            buffer.push(' ');
        }
        i += 1;
        if i >= lines.len() {
            break;
        }
        rest = lines[i];
    }
    let _ = closed;

    let items = buffer
        .split_whitespace()
        .map(strip_quotes)
        .filter(|s| !s.is_empty())
        .collect();

    (items, i)
}

/// Extract a hook body starting right after the declaration line at
/// `lines[start]` (which matches `"{name}()"`). Returns the body text and
/// the index of the line after the hook's closing brace.
fn extract_hook_body(lines: &[&str], start: usize) -> (String, usize) {
    let mut depth: i32 = 0;
    let mut body_lines = Vec::new();
    let mut i = start + 1;

    while i < lines.len() {
        let line = lines[i];
        let mut ends = false;
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth < 0 {
                        ends = true;
                    }
                }
                _ => {}
            }
        }
        if ends {
            i += 1;
            break;
        }
        body_lines.push(line);
        i += 1;
    }

    (body_lines.join("\n"), i)
}

/// Parse the text of a shell-recipe file into a [`RecipeBuilder`].
///
/// Unknown or malformed lines are silently ignored: this front-end is
/// intentionally lenient.
pub fn parse(text: &str) -> RecipeBuilder {
    let lines: Vec<&str> = text.lines().collect();
    let mut builder = RecipeBuilder::default();

    let mut i = 0;
    while i < lines.len() {
        let raw = lines[i];
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            i += 1;
            continue;
        }

        if let Some(hook) = HookKind::ALL
            .iter()
            .find(|h| trimmed.starts_with(&format!("{}()", h.as_str())))
        {
            let (body, next) = extract_hook_body(&lines, i);
            builder.hooks.insert(*hook, body);
            i = next;
            continue;
        }

        if let Some(key) = ARRAY_KEYS.iter().find(|k| trimmed.starts_with(&format!("{}=(", k))) {
            let (items, next) = parse_array(&lines, i, key);
            assign_array(&mut builder, key, items);
            i = next;
            continue;
        }

        if let Some(key) = SCALAR_KEYS.iter().find(|k| trimmed.starts_with(&format!("{}=", k))) {
            let value = strip_quotes(&trimmed[key.len() + 1..]);
            assign_scalar(&mut builder, key, value);
            i += 1;
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("epoch=") {
            builder.epoch = strip_quotes(rest).parse().ok();
            i += 1;
            continue;
        }

        // Unrecognized line: ignored (lenient front-end).
        i += 1;
    }

    builder
}

fn assign_scalar(builder: &mut RecipeBuilder, key: &str, value: String) {
    match key {
        "name" => builder.name = Some(value),
        "version" => builder.version = Some(value),
        "release" => builder.release = Some(value),
        "description" => builder.description = Some(value),
        "url" => builder.url = Some(value),
        _ => unreachable!("assign_scalar called with unknown key {key:?}"),
    }
}

fn assign_array(builder: &mut RecipeBuilder, key: &str, items: Vec<String>) {
    match key {
        "architectures" => builder.architectures = items,
        "licenses" => builder.licenses = items,
        "runtime_dependencies" => builder.runtime_dependencies = items,
        "build_dependencies" => builder.build_dependencies = items,
        "sources" => builder.sources = items,
        "checksums" => builder.checksums = items,
        "conflicts" => builder.conflicts = items,
        "provides" => builder.provides = items,
        "replaces" => builder.replaces = items,
        _ => unreachable!("assign_array called with unknown key {key:?}"),
    }
}
