use std::fs;

use pacbuild_source::{fetch_all, Outcome};

#[tokio::test]
async fn local_file_already_present_is_a_no_op_and_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let contents = b"int main(void) { return 0; }\n";
    fs::write(dir.path().join("hello.c"), contents).unwrap();

    let checksum = pacbuild_source::digest::digest_bytes(contents);
    let records = fetch_all(
        &["hello.c".to_string()],
        &[checksum],
        dir.path(),
    )
    .await;

    assert_eq!(records.len(), 1);
    assert!(records[0].outcome.is_success());
    assert!(matches!(records[0].outcome, Outcome::Verified));
}

#[tokio::test]
async fn skip_checksum_bypasses_verification() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hello.c"), b"anything").unwrap();

    let records = fetch_all(
        &["hello.c".to_string()],
        &["SKIP".to_string()],
        dir.path(),
    )
    .await;

    assert!(matches!(records[0].outcome, Outcome::Skipped));
}

#[tokio::test]
async fn mismatched_checksum_fails_the_fetch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("hello.c"), b"actual contents").unwrap();

    let wrong_checksum = "0".repeat(64);
    let records = fetch_all(
        &["hello.c".to_string()],
        &[wrong_checksum],
        dir.path(),
    )
    .await;

    assert!(!records[0].outcome.is_success());
    assert!(matches!(records[0].outcome, Outcome::Failed(_)));
}

#[tokio::test]
async fn missing_local_file_fails_the_fetch() {
    let dir = tempfile::tempdir().unwrap();

    let records = fetch_all(
        &["nonexistent.c".to_string()],
        &["SKIP".to_string()],
        dir.path(),
    )
    .await;

    assert!(matches!(records[0].outcome, Outcome::Failed(_)));
}

#[tokio::test]
async fn multiple_sources_fetch_concurrently_and_preserve_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.c"), b"a").unwrap();
    fs::write(dir.path().join("b.c"), b"b").unwrap();
    fs::write(dir.path().join("c.c"), b"c").unwrap();

    let records = fetch_all(
        &["a.c".to_string(), "b.c".to_string(), "c.c".to_string()],
        &["SKIP".to_string(), "SKIP".to_string(), "SKIP".to_string()],
        dir.path(),
    )
    .await;

    assert_eq!(
        records.iter().map(|r| r.requested.as_str()).collect::<Vec<_>>(),
        vec!["a.c", "b.c", "c.c"]
    );
}
