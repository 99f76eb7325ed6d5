//! Lowering of a declarative-recipe [`RecipeBuilder`] into shell-recipe text,
//! so that the shell execution path has a single, uniform input regardless
//! of which front-end originally produced the recipe.

use crate::model::{HookKind, RecipeBuilder};

fn quote(item: &str) -> String {
    format!("'{}'", item)
}

fn scalar_line(key: &str, value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| format!("{}={}\n", key, quote(v)))
}

fn list_line(key: &str, items: &[String]) -> String {
    let body = items.iter().map(|i| quote(i)).collect::<Vec<_>>().join(" ");
    format!("{}=({})\n", key, body)
}

fn hook_block(name: &str, body: &str) -> String {
    format!("{}() {{\n{}\n}}\n", name, body)
}

/// Default hook bodies injected for a recognized `build.type` when the
/// recipe itself supplies no explicit `build`/`package` hook. Unknown
/// build types emit nothing extra: only the explicit hooks are lowered.
fn default_hooks_for(build_type: &str) -> Option<(&'static str, &'static str)> {
    match build_type {
        "native-toolchain" => Some((
            "cargo build --release",
            "install -Dm755 \"target/release/$name\" \"$package_directory/usr/bin/$name\"",
        )),
        "C" => Some((
            "make",
            "make DESTDIR=\"$package_directory\" install",
        )),
        "C++" => Some((
            "make",
            "make DESTDIR=\"$package_directory\" install",
        )),
        _ => None,
    }
}

/// Lower a parsed declarative builder into the text of an equivalent
/// shell-recipe.
pub fn lower(builder: &RecipeBuilder) -> String {
    let mut out = String::new();

    if let Some(line) = scalar_line("name", &builder.name) {
        out.push_str(&line);
    }
    if let Some(line) = scalar_line("version", &builder.version) {
        out.push_str(&line);
    }
    if let Some(line) = scalar_line("release", &builder.release) {
        out.push_str(&line);
    }
    if let Some(epoch) = builder.epoch {
        out.push_str(&format!("epoch={epoch}\n"));
    }
    if let Some(line) = scalar_line("description", &builder.description) {
        out.push_str(&line);
    }
    if let Some(line) = scalar_line("url", &builder.url) {
        out.push_str(&line);
    }

    out.push_str(&list_line("architectures", &builder.architectures));
    out.push_str(&list_line("licenses", &builder.licenses));
    out.push_str(&list_line("runtime_dependencies", &builder.runtime_dependencies));
    out.push_str(&list_line("build_dependencies", &builder.build_dependencies));
    out.push_str(&list_line("sources", &builder.sources));
    out.push_str(&list_line("checksums", &builder.checksums));
    out.push_str(&list_line("conflicts", &builder.conflicts));
    out.push_str(&list_line("provides", &builder.provides));
    out.push_str(&list_line("replaces", &builder.replaces));

    let mut have_build = builder.hooks.contains_key(&HookKind::Build);
    let mut have_package = builder.hooks.contains_key(&HookKind::Package);

    for hook in HookKind::ALL {
        if let Some(body) = builder.hooks.get(&hook) {
            out.push_str(&hook_block(hook.as_str(), body));
        }
    }

    if !have_build || !have_package {
        if let Some(build_type) = &builder.build_type {
            if let Some((build_body, package_body)) = default_hooks_for(build_type) {
                if !have_build {
                    out.push_str(&hook_block("build", build_body));
                    have_build = true;
                }
                if !have_package {
                    out.push_str(&hook_block("package", package_body));
                    have_package = true;
                }
            }
        }
    }
    let _ = (have_build, have_package);

    out
}
