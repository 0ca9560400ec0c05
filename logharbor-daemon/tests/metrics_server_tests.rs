//! Integration tests for the metrics endpoint.
//!
//! The recorder is process-global, so only one test may install it.

use logharbor_core::config::MetricsConfig;
use logharbor_daemon::metrics_server;
use serial_test::serial;

#[test]
#[serial]
fn test_install_metrics_recorder_fails_with_invalid_address() {
    // Given: An unparsable listen address
    let config = MetricsConfig {
        enabled: true,
        listen_addr: "999.999.999.999".to_owned(),
        port: 9107,
    };

    // When/Then: Installation fails before touching the global recorder
    assert!(metrics_server::install_metrics_recorder(&config).is_err());
}

#[test]
#[serial]
fn test_install_metrics_recorder_succeeds_with_valid_config() {
    // Given: A loopback address on a non-standard port
    let config = MetricsConfig {
        enabled: true,
        listen_addr: "127.0.0.1".to_owned(),
        port: 19107,
    };

    // When: Installing the recorder
    let result = metrics_server::install_metrics_recorder(&config);

    // Then: It succeeds
    assert!(result.is_ok(), "install failed: {:?}", result.err());
}
