use super::*;

#[test]
fn rotation_steps_wrap_in_both_directions() {
    let mut r = Rotation::Deg0;
    for _ in 0..4 {
        r = r.next_clockwise();
    }
    assert_eq!(r, Rotation::Deg0);
    assert_eq!(Rotation::Deg0.next_counter_clockwise(), Rotation::Deg270);
    assert_eq!(Rotation::Deg270.next_clockwise().degrees(), 0);
}

#[test]
fn rotated_frame_stays_in_positive_quadrant() {
    let size = Size::new(4.0, 2.0);
    let a = Rotation::Deg90.to_affine(size);
    let p = a * Point::new(4.0, 2.0);
    assert!(p.x.abs() < 1e-9 && (p.y - 4.0).abs() < 1e-9);
    let q = a * Point::new(0.0, 0.0);
    assert!((q.x - 2.0).abs() < 1e-9 && q.y.abs() < 1e-9);
}

#[test]
fn render_size_rejects_zero_and_swaps_for_landscape() {
    assert!(RenderSize::new(0, 10).is_err());
    let s = RenderSize::new(1080, 1920).unwrap();
    let l = s.oriented(Orientation::LandscapeLeft);
    assert_eq!((l.width, l.height), (1920, 1080));
    assert_eq!(s.oriented(Orientation::PortraitUpsideDown), s);
    assert_eq!(s.to_rect().width(), 1080.0);
}
