use super::*;

#[test]
fn partial_json_uses_defaults() {
    let cfg = PipelineConfig::from_json_str(r#"{ "render_width": 720, "render_height": 1280 }"#)
        .unwrap();
    assert_eq!(cfg.backend, BackendKind::Cpu);
    assert_eq!(cfg.preview_size().unwrap(), RenderSize::new(720, 1280).unwrap());
    cfg.validate().unwrap();
}

#[test]
fn preview_size_can_differ_from_render_size() {
    let cfg = PipelineConfig::from_json_str(
        r#"{ "backend": "cpu", "preview": { "width": 360, "height": 640 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.render_size().unwrap(), RenderSize::new(1080, 1920).unwrap());
    assert_eq!(cfg.preview_size().unwrap().width, 360);
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(matches!(
        PipelineConfig::from_json_str(r#"{ "render_width": 0 }"#)
            .unwrap()
            .validate(),
        Err(CutlineError::Validation(_))
    ));
    assert!(PipelineConfig::from_json_str(r#"{ "backend": "metal" }"#).is_err());
    assert!(PipelineConfig::from_json_str(r#"{ "fps": 30 }"#).is_err());
    assert!(PipelineConfig::from_json_str(
        r#"{ "preview": { "width": 0, "height": 10 } }"#
    )
    .unwrap()
    .validate()
    .is_err());
}
