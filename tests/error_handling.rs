use rawbench::cli::handle_failure;
use rawbench::{BenchError, IoOp};
use tempfile::tempdir;

#[test]
fn test_io_error_message_includes_offset_and_cause() {
    let err = BenchError::io(
        IoOp::Read,
        1_048_064,
        std::io::Error::from_raw_os_error(5),
    );
    let msg = err.to_string();
    assert!(msg.starts_with("read error at offset 1048064"));
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(err.exit_code(), 255);
}

#[test]
fn test_write_error_label() {
    let err = BenchError::short_transfer(IoOp::Write, 0, 1 << 30, 1 << 20);
    assert!(err.to_string().contains("could not write random data file"));
}

#[test]
fn test_top_level_cleanup_policy() {
    let temp_dir = tempdir().unwrap();
    let target = temp_dir.path().join("osrm.tst");

    std::fs::write(&target, b"data").unwrap();
    handle_failure(
        &BenchError::Precondition("data file already exists".into()),
        &target,
    );
    assert!(target.exists());

    handle_failure(
        &BenchError::io(IoOp::Seek, 512, std::io::Error::other("boom")),
        &target,
    );
    assert!(!target.exists());

    // Nothing to remove is not an error
    handle_failure(&BenchError::Config("bad".into()), &target);
}
