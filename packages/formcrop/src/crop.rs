use image::DynamicImage;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::blueprint::BlueprintEntry;
use crate::geometry::to_pixel_rect;

/// How a template entry's field name is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameResolution {
    /// `name`, then `field`, then a `field_<n>` placeholder.
    #[default]
    Template,
    /// Like `Template`, but the first of `labels` is tried before the
    /// placeholder. Matches annotation exports that only carry labels.
    Labels,
}

/// Resolves the field name for `entry`. `produced` is the number of crops
/// already collected, which numbers the placeholder.
pub fn resolve_field_name(entry: &BlueprintEntry, resolution: NameResolution, produced: usize) -> String {
    let explicit = entry
        .name
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| entry.field.as_deref().filter(|s| !s.is_empty()));

    if let Some(name) = explicit {
        return name.to_string();
    }

    if resolution == NameResolution::Labels {
        if let Some(label) = entry.labels.first().filter(|s| !s.is_empty()) {
            return label.clone();
        }
    }

    format!("field_{produced}")
}

/// Crops every template entry out of `image`.
///
/// Crops come back in template order. Entries whose clamped rectangle is
/// empty are skipped. When two entries resolve to the same name the later
/// crop replaces the earlier one and keeps the first one's position.
pub fn extract_crops(
    image: &DynamicImage,
    template: &[BlueprintEntry],
    resolution: NameResolution,
) -> IndexMap<String, DynamicImage> {
    let (img_w, img_h) = (image.width(), image.height());
    let mut crops = IndexMap::new();

    for entry in template {
        let name = resolve_field_name(entry, resolution, crops.len());
        let rect = to_pixel_rect(entry, img_w, img_h);

        if rect.is_empty() {
            trace!(field = %name, ?rect, "skipping empty region");
            continue;
        }

        let crop = image.crop_imm(rect.x as u32, rect.y as u32, rect.w as u32, rect.h as u32);
        if crop.width() == 0 || crop.height() == 0 {
            trace!(field = %name, "skipping empty crop");
            continue;
        }

        if crops.insert(name.clone(), crop).is_some() {
            debug!(field = %name, "duplicate field name, keeping the later region");
        }
    }

    crops
}
