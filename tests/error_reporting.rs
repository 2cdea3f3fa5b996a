//! Error reporting setup for the wizard binary
//!
//! Run with: cargo test --test error_reporting

use datafx::Error;

#[test]
fn test_error_reporting_installs_once() {
    datafx::install_error_reporting().unwrap();

    let err = datafx::install_error_reporting().unwrap_err();
    assert!(matches!(err, Error::Terminal { .. }));
}
