use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, image::Rgba(px))
}

#[test]
fn lock_guard_unlocks_on_drop() {
    let buf = PixelBuffer::new(2, 2, PixelFormat::Rgba8).unwrap();
    assert!(!buf.is_locked());
    {
        let a = buf.lock_base_address();
        let _b = a.buffer().lock_base_address();
        assert_eq!(buf.lock_count(), 2);
    }
    assert!(!buf.is_locked());
}

#[test]
fn write_requires_lock_and_matching_size() {
    let buf = PixelBuffer::new(2, 2, PixelFormat::Rgba8).unwrap();
    let img = solid(2, 2, [1, 2, 3, 4]);
    assert_eq!(buf.write_image(&img), Err(RenderError::BufferNotLocked));

    let _lock = buf.lock_base_address();
    assert!(matches!(
        buf.write_image(&solid(3, 2, [0; 4])),
        Err(RenderError::SizeMismatch { .. })
    ));
    buf.write_image(&img).unwrap();
    assert_eq!(buf.to_image().unwrap(), img);
}

#[test]
fn bgra_storage_round_trips_through_rgba_images() {
    let img = solid(1, 1, [10, 20, 30, 255]);
    let buf = PixelBuffer::from_image(&img, PixelFormat::Bgra8);
    assert_eq!(buf.to_image().unwrap().get_pixel(0, 0).0, [10, 20, 30, 255]);
}

#[test]
fn zero_sized_buffers_are_rejected() {
    assert!(PixelBuffer::new(0, 4, PixelFormat::Rgba8).is_err());
}
