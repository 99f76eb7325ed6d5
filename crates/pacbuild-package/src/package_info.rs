//! `package-info` sidecar: one `key = value` line per field.

use pacbuild_recipe::Recipe;

const DEFAULT_PACKAGER: &str = "pacbuild";

/// Render the `package-info` sidecar text for `recipe`, packaged for
/// `architecture` with a computed `size` (sum of byte sizes of all regular
/// files under the package directory, excluding sidecars).
pub fn render(recipe: &Recipe, architecture: &str, size: u64, builddate: i64) -> String {
    let mut out = String::new();
    out.push_str(&format!("name = {}\n", recipe.name));
    out.push_str(&format!("version = {}\n", recipe.version));
    out.push_str(&format!("release = {}\n", recipe.release));
    if let Some(epoch) = recipe.epoch {
        out.push_str(&format!("epoch = {epoch}\n"));
    }
    out.push_str(&format!("builddate = {builddate}\n"));
    out.push_str(&format!("packager = {DEFAULT_PACKAGER}\n"));
    out.push_str(&format!("size = {size}\n"));
    out.push_str(&format!("architecture = {architecture}\n"));

    if let Some(description) = &recipe.description {
        out.push_str(&format!("description = {description}\n"));
    }
    if let Some(url) = &recipe.url {
        out.push_str(&format!("url = {url}\n"));
    }

    for license in &recipe.licenses {
        out.push_str(&format!("license = {license}\n"));
    }
    for dependency in &recipe.runtime_dependencies {
        out.push_str(&format!("depend = {dependency}\n"));
    }
    for provided in &recipe.provides {
        out.push_str(&format!("provides = {provided}\n"));
    }
    for replaced in &recipe.replaces {
        out.push_str(&format!("replaces = {replaced}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacbuild_recipe::parse_shell_recipe;

    #[test]
    fn renders_required_fields_in_order_then_repeated_fields() {
        let text = r#"
name=hello
version=1.0.0
release=1
architectures=(x86_64)
licenses=(MIT Apache-2.0)
runtime_dependencies=(glibc>=2.30 zlib)
provides=(hello-cli)
replaces=(old-hello)
sources=(hello.c)
checksums=(SKIP)
build() { :; }
package() { :; }
"#;
        let recipe = parse_shell_recipe(text).unwrap();
        let info = render(&recipe, "x86_64", 4096, 1_700_000_000);

        let lines: Vec<&str> = info.lines().collect();
        assert_eq!(lines[0], "name = hello");
        assert_eq!(lines[1], "version = 1.0.0");
        assert_eq!(lines[2], "release = 1");
        assert_eq!(lines[3], "builddate = 1700000000");
        assert_eq!(lines[4], "packager = pacbuild");
        assert_eq!(lines[5], "size = 4096");
        assert_eq!(lines[6], "architecture = x86_64");
        assert_eq!(lines[7], "license = MIT");
        assert_eq!(lines[8], "license = Apache-2.0");
        assert_eq!(lines[9], "depend = glibc>=2.30");
        assert_eq!(lines[10], "depend = zlib");
        assert_eq!(lines[11], "provides = hello-cli");
        assert_eq!(lines[12], "replaces = old-hello");
    }

    #[test]
    fn omits_optional_fields_when_absent() {
        let text = r#"
name=hello
version=1.0.0
release=1
architectures=(x86_64)
sources=(hello.c)
checksums=(SKIP)
build() { :; }
package() { :; }
"#;
        let recipe = parse_shell_recipe(text).unwrap();
        let info = render(&recipe, "x86_64", 0, 0);
        assert!(!info.contains("description"));
        assert!(!info.contains("url ="));
        assert!(!info.contains("provides"));
        assert!(!info.contains("replaces"));
        assert!(!info.contains("epoch"));
    }

    #[test]
    fn epoch_renders_as_a_field_right_after_release_when_present() {
        let mut recipe = parse_shell_recipe(
            "name=hello\nversion=1.0.0\nrelease=1\narchitectures=(x86_64)\nsources=(hello.c)\nchecksums=(SKIP)\nbuild() { :; }\npackage() { :; }\n",
        )
        .unwrap();
        recipe.epoch = Some(2);
        let info = render(&recipe, "x86_64", 0, 0);

        let lines: Vec<&str> = info.lines().collect();
        assert_eq!(lines[2], "release = 1");
        assert_eq!(lines[3], "epoch = 2");
        assert_eq!(lines[4], "builddate = 0");
    }
}
