use super::*;

fn timing() -> SampleTiming {
    SampleTiming {
        duration: MediaTime::from_millis(33),
        presentation: MediaTime::from_secs(2),
        decode: Some(MediaTime::from_millis(1990)),
    }
}

#[test]
fn rewrap_copies_timing_and_swaps_storage() {
    let original = PixelBuffer::new(4, 2, PixelFormat::Bgra8).unwrap();
    let frame = SampleFrame::video(original.clone(), timing());
    let rendered = PixelBuffer::new(4, 2, PixelFormat::Bgra8).unwrap();

    let out = frame.rewrap(rendered.clone()).unwrap();
    assert_eq!(out.timing(), timing());
    assert!(out.image_buffer().unwrap().ptr_eq(&rendered));
    assert!(!out.same_as(&frame));
}

#[test]
fn rewrap_rejects_mismatched_layout() {
    let frame = SampleFrame::video(PixelBuffer::new(4, 2, PixelFormat::Bgra8).unwrap(), timing());
    let wrong = PixelBuffer::new(4, 2, PixelFormat::Rgba8).unwrap();
    assert!(matches!(frame.rewrap(wrong), Err(CutlineError::Validation(_))));
}

#[test]
fn audio_frames_have_no_image_plane() {
    let frame = SampleFrame::audio(SampleTiming::at(MediaTime::from_secs(1)));
    assert!(frame.image_buffer().is_none());
    assert!(frame.format().is_none());
    assert!(frame.same_as(&frame.clone()));
}
