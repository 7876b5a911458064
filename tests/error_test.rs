use hrun::error::SequenceAborted;
use hrun::{HrunError, Result, TransportError};

#[test]
fn test_invalid_url_display() {
    let err = HrunError::InvalidUrl {
        url: "{{base}}/users".to_string(),
        message: "relative URL without a base".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Invalid URL '{{base}}/users': relative URL without a base"
    );
}

#[test]
fn test_transport_error_display() {
    let err = TransportError::Connect("connection refused".to_string());
    assert_eq!(err.to_string(), "Connection failed: connection refused");

    let wrapped: HrunError = err.into();
    assert_eq!(wrapped.to_string(), "Connection failed: connection refused");
}

#[test]
fn test_sequence_aborted_keeps_source() {
    use std::error::Error;

    let aborted = SequenceAborted {
        index: 3,
        responses: Vec::new(),
        source: HrunError::RequestNotFound("login".to_string()),
    };
    assert_eq!(
        aborted.to_string(),
        "Request 3 aborted the run: Request with name 'login' not found"
    );
    assert!(aborted.source().is_some());
}

#[test]
fn test_error_conversion_from_anyhow() {
    let anyhow_err = anyhow::anyhow!("test anyhow error");
    let err: HrunError = anyhow_err.into();
    assert!(err.to_string().contains("test anyhow error"));
}

#[test]
fn test_missing_file_is_parse_error() {
    fn read_missing() -> Result<hrun::HttpFile> {
        Ok(hrun::parser::parse_file("/definitely/not/here.http")?)
    }

    let err = read_missing().unwrap_err();
    assert!(matches!(err, HrunError::ParseError(_)));
}
