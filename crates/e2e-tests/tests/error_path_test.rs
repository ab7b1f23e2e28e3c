//! Failure handling: every error aborts the run.

use std::fs;

use archiver_core::{compress_directory, ArchiveError};

use e2e_tests::TestHarness;

#[test]
fn test_output_inside_input_rejected() {
    let harness = TestHarness::new();
    harness.file("a.txt", "a");

    let result = compress_directory(
        &harness.input,
        &harness.input.join("backup"),
        &harness.settings,
    );
    assert!(matches!(result, Err(ArchiveError::OutputInsideInput { .. })));
}

#[test]
fn test_unreadable_text_content_is_fatal() {
    let harness = TestHarness::new();
    harness.dir("docs");
    fs::write(harness.input.join("docs/broken.txt"), [0xc3, 0x28, 0xff]).unwrap();

    let result = compress_directory(&harness.input, &harness.output, &harness.settings);
    assert!(matches!(result, Err(ArchiveError::Content { .. })));
}

#[test]
fn test_binary_without_text_extension_is_fine() {
    let harness = TestHarness::new();
    harness.dir("docs");
    fs::write(harness.input.join("docs/blob.bin"), [0xc3, 0x28, 0xff]).unwrap();

    let report = compress_directory(&harness.input, &harness.output, &harness.settings).unwrap();
    assert_eq!(report.stats.indexed, 1);
}

#[test]
fn test_leftover_output_rejected() {
    let harness = TestHarness::new();
    harness.file("docs/readme.md", "r");

    compress_directory(&harness.input, &harness.output, &harness.settings).unwrap();
    let result = compress_directory(&harness.input, &harness.output, &harness.settings);
    assert!(matches!(result, Err(ArchiveError::AlreadyExists(_))));
}

#[test]
fn test_existing_container_is_fatal() {
    let harness = TestHarness::new();
    harness.file("docs/readme.md", "r");
    fs::create_dir_all(&harness.output).unwrap();
    fs::write(harness.output.join("docs.zip"), "stale").unwrap();

    let result = compress_directory(&harness.input, &harness.output, &harness.settings);
    assert!(matches!(result, Err(ArchiveError::Container { .. })));
}
