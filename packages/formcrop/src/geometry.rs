use crate::blueprint::BlueprintEntry;

/// A pixel rectangle after percentage conversion and clamping. Width or height
/// may be zero or negative when the box falls outside the image; such rects are
/// skipped by the caller rather than rejected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    /// True when there is nothing to crop.
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

/// Converts a percentage value to pixels, truncating toward zero.
fn percent_to_pixels(percent: f64, extent: i64) -> i64 {
    (percent / 100.0 * extent as f64) as i64
}

/// Maps a percentage box onto an image of the given size and clamps it so
/// that `x + w <= image_width` and `y + h <= image_height`.
pub fn to_pixel_rect(entry: &BlueprintEntry, image_width: u32, image_height: u32) -> PixelRect {
    let img_w = i64::from(image_width);
    let img_h = i64::from(image_height);

    let x = percent_to_pixels(entry.x, img_w).max(0);
    let y = percent_to_pixels(entry.y, img_h).max(0);
    let w = percent_to_pixels(entry.width, img_w).min(img_w - x);
    let h = percent_to_pixels(entry.height, img_h).min(img_h - y);

    PixelRect { x, y, w, h }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_conversion() {
        let entry = BlueprintEntry::new(10.0, 10.0, 20.0, 20.0);
        assert_eq!(to_pixel_rect(&entry, 100, 100), PixelRect::new(10, 10, 20, 20));
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        let entry = BlueprintEntry::new(12.99, 0.5, 25.0, 66.6);
        // 129.9, 1.0, 250, 133.2
        assert_eq!(to_pixel_rect(&entry, 1000, 200), PixelRect::new(129, 1, 250, 133));
    }

    #[test]
    fn test_clamps_to_right_and_bottom_edges() {
        let entry = BlueprintEntry::new(90.0, 80.0, 30.0, 50.0);
        let rect = to_pixel_rect(&entry, 200, 100);
        assert_eq!(rect, PixelRect::new(180, 80, 20, 20));
        assert!(!rect.is_empty());
    }

    #[test]
    fn test_negative_origin_clamped_to_zero() {
        let entry = BlueprintEntry::new(-5.0, -1.0, 10.0, 10.0);
        let rect = to_pixel_rect(&entry, 100, 100);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.w, 10);
    }

    #[test]
    fn test_box_outside_image_is_empty() {
        let entry = BlueprintEntry::new(110.0, 10.0, 5.0, 5.0);
        let rect = to_pixel_rect(&entry, 100, 100);
        assert!(rect.w <= 0);
        assert!(rect.is_empty());
    }

    #[test]
    fn test_zero_size_box_is_empty() {
        let entry = BlueprintEntry::new(10.0, 10.0, 0.4, 20.0);
        assert!(to_pixel_rect(&entry, 100, 100).is_empty());
    }

    #[test]
    fn test_rect_always_within_bounds() {
        let sizes = [(1u32, 1u32), (37, 91), (640, 480), (2480, 3508)];
        let steps = [0.0, 0.1, 12.5, 33.3, 50.0, 99.9, 100.0, 150.0];

        for &(img_w, img_h) in &sizes {
            for &x in &steps {
                for &y in &steps {
                    for &width in &steps {
                        for &height in &steps {
                            let entry = BlueprintEntry::new(x, y, width, height);
                            let rect = to_pixel_rect(&entry, img_w, img_h);
                            assert!(rect.x >= 0 && rect.y >= 0, "{rect:?}");
                            assert!(rect.x + rect.w <= i64::from(img_w), "{entry:?} -> {rect:?}");
                            assert!(rect.y + rect.h <= i64::from(img_h), "{entry:?} -> {rect:?}");
                        }
                    }
                }
            }
        }
    }
}
