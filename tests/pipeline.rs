//! End-to-end pipeline scenarios: a happy-path cache miss and hit, a
//! checksum mismatch, and a fan-out with one failing target. These exercise
//! the real `sh` on `PATH` and the filesystem, so they avoid anything that
//! would need a network connection or an actual C toolchain, using
//! `touch`/`mkdir`/`case` in the hooks instead of `gcc` to stand in for
//! "do build work".

use std::sync::Arc;

use pacbuild::config::Configuration;
use pacbuild::error::PipelineError;
use pacbuild::fanout;
use pacbuild::pipeline::{Pipeline, RunMode};
use pacbuild::state::PipelineState;

fn hello_recipe_text(checksum: &str) -> String {
    format!(
        r#"
name=hello
version=1.0.0
release=1
architectures=(x86_64)
sources=(hello.c)
checksums=({checksum})
build() {{
    test -f "$source_directory/hello.c" || exit 9
    touch "$source_directory/built"
}}
package() {{
    install -Dm755 "$source_directory/built" "$package_directory/usr/bin/hello"
}}
"#
    )
}

fn configuration_for(cache_dir: &std::path::Path) -> Configuration {
    Configuration::default().with_cache_directory(cache_dir.to_path_buf())
}

#[tokio::test]
async fn s1_happy_path_cache_miss() {
    let cache_dir = tempfile::tempdir().unwrap();
    let start_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    std::fs::create_dir_all(start_dir.path().join("source")).unwrap();
    std::fs::write(start_dir.path().join("source/hello.c"), b"int main(void) { return 0; }\n").unwrap();

    let text = hello_recipe_text("SKIP");
    let recipe = pacbuild_recipe::parse_shell_recipe(&text).unwrap();
    let configuration = configuration_for(cache_dir.path());
    let pipeline = Pipeline::new(&configuration);

    let report = pipeline
        .run(&recipe, &text, start_dir.path(), output_dir.path(), RunMode::Package)
        .await
        .expect("pipeline should succeed");

    assert_eq!(report.state, PipelineState::Done);
    assert!(!report.check_hook_failed);
    let artifact_path = report.artifact_path.expect("package run always returns an artifact");
    assert_eq!(
        artifact_path.file_name().unwrap().to_str().unwrap(),
        "hello-1.0.0-1-x86_64.pkg.tar.zst"
    );

    let composer = pacbuild_package::ArchiveComposer;
    let members = composer.verify(&artifact_path).unwrap();
    assert!(members.iter().any(|m| m.ends_with("package-info")));
    assert!(members.iter().any(|m| m.ends_with("manifest")));
    assert!(members.iter().any(|m| m.contains("usr/bin/hello")));

    let cache = pacbuild_cache::BuildCache::open(cache_dir.path(), 5 * 1024 * 1024 * 1024).unwrap();
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn build_only_mode_caches_the_build_but_emits_no_archive() {
    let cache_dir = tempfile::tempdir().unwrap();
    let start_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    std::fs::create_dir_all(start_dir.path().join("source")).unwrap();
    std::fs::write(start_dir.path().join("source/hello.c"), b"int main(void) { return 0; }\n").unwrap();

    let text = hello_recipe_text("SKIP");
    let recipe = pacbuild_recipe::parse_shell_recipe(&text).unwrap();
    let configuration = configuration_for(cache_dir.path());
    let pipeline = Pipeline::new(&configuration);

    let report = pipeline
        .run(&recipe, &text, start_dir.path(), output_dir.path(), RunMode::BuildOnly)
        .await
        .expect("build-only run should succeed");

    assert_eq!(report.state, PipelineState::Done);
    assert!(report.artifact_path.is_none());
    assert!(std::fs::read_dir(output_dir.path()).unwrap().next().is_none());

    let cache = pacbuild_cache::BuildCache::open(cache_dir.path(), 5 * 1024 * 1024 * 1024).unwrap();
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn s2_checksum_mismatch_aborts_before_any_artifact() {
    let cache_dir = tempfile::tempdir().unwrap();
    let start_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    std::fs::create_dir_all(start_dir.path().join("source")).unwrap();
    std::fs::write(start_dir.path().join("source/hello.c"), b"int main(void) { return 0; }\n").unwrap();

    let text = hello_recipe_text(&"0".repeat(64));
    let recipe = pacbuild_recipe::parse_shell_recipe(&text).unwrap();
    let configuration = configuration_for(cache_dir.path());
    let pipeline = Pipeline::new(&configuration);

    let err = pipeline
        .run(&recipe, &text, start_dir.path(), output_dir.path(), RunMode::Package)
        .await
        .expect_err("checksum mismatch should abort the pipeline");

    assert!(matches!(err, PipelineError::ChecksumMismatch(ref s) if s == "hello.c"));
    assert!(std::fs::read_dir(output_dir.path()).unwrap().next().is_none());

    let cache = pacbuild_cache::BuildCache::open(cache_dir.path(), 5 * 1024 * 1024 * 1024).unwrap();
    assert_eq!(cache.len(), 0);
}

#[tokio::test]
async fn s3_rerun_with_identical_inputs_hits_the_cache() {
    let cache_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    let text = hello_recipe_text("SKIP");
    let recipe = pacbuild_recipe::parse_shell_recipe(&text).unwrap();
    let configuration = configuration_for(cache_dir.path());

    // First run: cache miss, local source file must already be on disk.
    let start_dir_1 = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(start_dir_1.path().join("source")).unwrap();
    std::fs::write(start_dir_1.path().join("source/hello.c"), b"int main(void) { return 0; }\n").unwrap();

    let pipeline = Pipeline::new(&configuration);
    let first = pipeline
        .run(&recipe, &text, start_dir_1.path(), output_dir.path(), RunMode::Package)
        .await
        .unwrap();
    assert_eq!(first.state, PipelineState::Done);

    // Second run: a fresh start directory with no `hello.c` of its own — the
    // only way the build hook's `test -f "$source_directory/hello.c"` can
    // succeed is if the cache hit path restores it from the stored archive.
    let start_dir_2 = tempfile::tempdir().unwrap();
    let second = pipeline
        .run(&recipe, &text, start_dir_2.path(), output_dir.path(), RunMode::Package)
        .await
        .expect("cache hit run should still succeed");

    assert_eq!(second.state, PipelineState::Done);
    assert!(!second.check_hook_failed);
}

#[tokio::test]
async fn s6_fan_out_partial_failure_reports_one_failure_among_three() {
    let cache_dir = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();

    // No sources: the `build` hook fails only for the target whose
    // `start_directory` contains "fail", exercising per-target divergence
    // through the variable environment rather than through the (shared)
    // recipe body.
    let text = r#"
name=hello
version=1.0.0
release=1
architectures=(x86_64)
build() {
    case "$start_directory" in
        *fail*) exit 3 ;;
    esac
}
package() {
    mkdir -p "$package_directory/usr"
    touch "$package_directory/usr/marker"
}
"#
    .to_string();
    let recipe = Arc::new(pacbuild_recipe::parse_shell_recipe(&text).unwrap());

    let configuration = configuration_for(cache_dir.path()).with_max_fan_out_concurrency(3);
    let targets = vec![
        fanout::Target {
            label: "target-a".to_string(),
            start_directory: root.path().join("target-a"),
            output_directory: root.path().join("out-a"),
        },
        fanout::Target {
            label: "target-fail".to_string(),
            start_directory: root.path().join("target-fail"),
            output_directory: root.path().join("out-fail"),
        },
        fanout::Target {
            label: "target-c".to_string(),
            start_directory: root.path().join("target-c"),
            output_directory: root.path().join("out-c"),
        },
    ];

    let report = fanout::run_fan_out(&configuration, recipe, Arc::new(text), targets).await;

    assert_eq!(report.targets.len(), 3);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failure_count(), 1);
    assert_ne!(report.exit_code(), 0);

    let failed = report
        .targets
        .iter()
        .find(|t| t.label == "target-fail")
        .expect("target-fail should have a report");
    assert!(!failed.success);
    assert!(failed.reason.as_deref().unwrap_or_default().contains("build hook failed"));

    for label in ["target-a", "target-c"] {
        let ok = report.targets.iter().find(|t| t.label == label).unwrap();
        assert!(ok.success, "{label} should have succeeded");
    }
}
