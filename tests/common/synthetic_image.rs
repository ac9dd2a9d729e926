#![allow(dead_code)]

/// Dark disk of `radius` pixels centred on a white background.
pub fn dark_disk_u8(width: usize, height: usize, radius: f32) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");

    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let mut img = vec![255u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
            if dx * dx + dy * dy <= radius * radius {
                img[y * width + x] = 16;
            }
        }
    }
    img
}

/// Single dark vertical bar of `bar` columns through the middle.
pub fn vertical_bar_u8(width: usize, height: usize, bar: usize) -> Vec<u8> {
    assert!(bar > 0 && bar <= width, "bar must fit inside the image");

    let x0 = (width - bar) / 2;
    let mut img = vec![255u8; width * height];
    for y in 0..height {
        for x in x0..x0 + bar {
            img[y * width + x] = 0;
        }
    }
    img
}
