use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CutlineError::type_mismatch("x")
            .to_string()
            .contains("type mismatch:")
    );
    assert!(
        CutlineError::invalid_time("x")
            .to_string()
            .contains("invalid time:")
    );
    assert!(
        CutlineError::processing("x")
            .to_string()
            .contains("processing error:")
    );
    assert!(
        CutlineError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn backpressure_is_distinguished_from_faults() {
    assert!(CutlineError::StackBusy.is_backpressure());
    assert!(CutlineError::ControllerBusy.is_backpressure());
    assert!(!CutlineError::CannotAddUnbounded.is_backpressure());
    assert!(!CutlineError::from(RenderError::BufferNotLocked).is_backpressure());
}

#[test]
fn mix_build_keeps_cause() {
    let err = CutlineError::mix_build(CutlineError::FailedToCreateChannel("audio".into()));
    let text = err.to_string();
    assert!(text.contains("failed to build track mix"));
    assert!(text.contains("audio"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CutlineError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
