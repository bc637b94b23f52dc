use image::{GrayImage, Luma, Rgb, RgbImage};

/// Colours assigned to classes 0, 1, 2, ...; reused cyclically.
pub const PALETTE: [Rgb<u8>; 6] = [
    Rgb([0, 0, 255]),   // Blue
    Rgb([0, 255, 0]),   // Green
    Rgb([255, 0, 0]),   // Red
    Rgb([255, 255, 0]), // Yellow
    Rgb([255, 0, 255]), // Magenta
    Rgb([0, 255, 255]), // Cyan
];

/// Class of `value` given ascending `thresholds`: the number of thresholds
/// strictly below it.
pub fn classify(value: f64, thresholds: &[f64]) -> usize {
    thresholds.iter().take_while(|&&t| value > t).count()
}

/// Image of per-pixel class indices.
pub fn label_image(gray_img: &GrayImage, thresholds: &[f64]) -> GrayImage {
    let mut labels = GrayImage::new(gray_img.width(), gray_img.height());
    for (x, y, pixel) in gray_img.enumerate_pixels() {
        let class = classify(pixel[0] as f64, thresholds).min(u8::MAX as usize);
        labels.put_pixel(x, y, Luma([class as u8]));
    }
    labels
}

/// Colour-coded segmentation, one palette entry per class.
pub fn colorize(gray_img: &GrayImage, thresholds: &[f64]) -> RgbImage {
    let mut segmented_img = RgbImage::new(gray_img.width(), gray_img.height());
    for (x, y, pixel) in gray_img.enumerate_pixels() {
        let class = classify(pixel[0] as f64, thresholds);
        segmented_img.put_pixel(x, y, PALETTE[class % PALETTE.len()]);
    }
    segmented_img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::minimum_variance_partitioning;
    use crate::histogram::Histogram;
    use crate::otsu::otsu_threshold;

    #[test]
    fn classify_counts_thresholds_below() {
        let t = [10.5, 100.0];
        assert_eq!(classify(3.0, &t), 0);
        assert_eq!(classify(10.5, &t), 0);
        assert_eq!(classify(11.0, &t), 1);
        assert_eq!(classify(250.0, &t), 2);
        assert_eq!(classify(5.0, &[]), 0);
    }

    #[test]
    fn label_and_colorize() {
        let img = GrayImage::from_raw(3, 1, vec![0, 128, 255]).unwrap();
        let t = [64.0, 200.0];
        let labels = label_image(&img, &t);
        assert_eq!(labels.as_raw(), &vec![0, 1, 2]);

        let rgb = colorize(&img, &t);
        assert_eq!(*rgb.get_pixel(0, 0), PALETTE[0]);
        assert_eq!(*rgb.get_pixel(2, 0), PALETTE[2]);
    }

    #[test]
    fn adjacent_gray_levels_land_in_different_classes() {
        let img = GrayImage::from_raw(2, 2, vec![10, 10, 11, 11]).unwrap();
        let hist = Histogram::from_gray_image(&img, false);

        let otsu = vec![otsu_threshold(&hist).unwrap()];
        assert_eq!(otsu, vec![10.5]);
        assert_eq!(label_image(&img, &otsu).as_raw(), &vec![0, 0, 1, 1]);

        let partition = minimum_variance_partitioning(&hist, 2).unwrap().thresholds();
        assert_eq!(partition, vec![10.5]);
        assert_eq!(label_image(&img, &partition).as_raw(), &vec![0, 0, 1, 1]);
    }
}
