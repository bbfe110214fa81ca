//! Optional cleanup applied to a crop before recognition. Recognizers never
//! call this themselves.
use image::DynamicImage;
use imageproc::filter::median_filter;

/// Radius of the median window used by [`denoise`].
pub const DENOISE_RADIUS: u32 = 1;

/// Converts the crop to grayscale and removes speckle noise with a median
/// filter.
pub fn denoise(crop: &DynamicImage) -> DynamicImage {
    let gray = crop.to_luma8();
    DynamicImage::ImageLuma8(median_filter(&gray, DENOISE_RADIUS, DENOISE_RADIUS))
}
