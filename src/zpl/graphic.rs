//! Grayscale to 1-bit conversion for `^GFA` graphic fields.

use image::GrayImage;

use crate::assets::fit_within;

/// Luma below this prints black.
pub const THRESHOLD: u8 = 128;

/// Largest `^GFA` box, in dots (width × height).
pub const MAX_GRAPHIC_DOTS: u64 = 16_000_000;

/// Packed 1-bit raster: rows of `bytes_per_row` bytes, MSB = leftmost dot.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub bytes_per_row: usize,
    pub data: Vec<u8>,
}

/// Fit `image` into `width × height` dots and threshold it. Callers keep the
/// box within [`MAX_GRAPHIC_DOTS`].
pub fn to_bitmap(image: &GrayImage, width: u32, height: u32) -> Bitmap {
    let fitted = fit_within(image, width.max(1), height.max(1));
    pack(&fitted)
}

/// Threshold and pack an image without scaling.
pub fn pack(image: &GrayImage) -> Bitmap {
    let (width, height) = image.dimensions();
    let bytes_per_row = (width as usize).div_ceil(8);
    let mut data = vec![0u8; bytes_per_row * height as usize];

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[0] < THRESHOLD {
            let byte_idx = y as usize * bytes_per_row + x as usize / 8;
            let bit_idx = 7 - (x % 8);
            data[byte_idx] |= 1 << bit_idx;
        }
    }

    Bitmap {
        width,
        height,
        bytes_per_row,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_pack_msb_first() {
        let mut img = GrayImage::from_pixel(10, 2, Luma([255]));
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(9, 1, Luma([0]));
        let bmp = pack(&img);
        assert_eq!(bmp.bytes_per_row, 2);
        assert_eq!(bmp.data, vec![0x80, 0x00, 0x00, 0x40]);
    }

    #[test]
    fn test_threshold() {
        let img = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 127 } else { 128 }]));
        assert_eq!(pack(&img).data, vec![0x80]);
    }

    #[test]
    fn test_to_bitmap_scales() {
        let img = GrayImage::from_pixel(100, 50, Luma([0]));
        let bmp = to_bitmap(&img, 40, 40);
        assert_eq!((bmp.width, bmp.height), (40, 20));
        assert_eq!(bmp.data.len(), 5 * 20);
        assert!(bmp.data.iter().all(|&b| b == 0xFF));
    }
}
