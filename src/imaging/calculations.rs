//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate thumbnail dimensions for a maximum width.
///
/// Images already narrower than `max_width` keep their size. Wider images
/// are scaled down to exactly `max_width`, keeping the aspect ratio. Height
/// never rounds below 1 pixel.
///
/// # Examples
/// ```
/// # use treepress::imaging::calculations::fit_to_width;
/// assert_eq!(fit_to_width((1600, 1200), 400), (400, 300));
/// assert_eq!(fit_to_width((200, 100), 400), (200, 100));
/// ```
pub fn fit_to_width(source: (u32, u32), max_width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w <= max_width {
        return (src_w, src_h);
    }
    let h = (src_h as f64 * max_width as f64 / src_w as f64).round() as u32;
    (max_width, h.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_scaled_to_width() {
        assert_eq!(fit_to_width((1600, 1200), 400), (400, 300));
    }

    #[test]
    fn portrait_scaled_to_width() {
        assert_eq!(fit_to_width((1200, 1600), 300), (300, 400));
    }

    #[test]
    fn narrow_image_not_upscaled() {
        assert_eq!(fit_to_width((250, 900), 400), (250, 900));
    }

    #[test]
    fn exact_width_unchanged() {
        assert_eq!(fit_to_width((400, 123), 400), (400, 123));
    }

    #[test]
    fn very_wide_image_keeps_one_pixel_height() {
        assert_eq!(fit_to_width((10_000, 1), 100), (100, 1));
    }

    #[test]
    fn rounding_is_to_nearest() {
        // 333 * 100 / 1000 = 33.3
        assert_eq!(fit_to_width((1000, 333), 100), (100, 33));
        // 335 * 100 / 1000 = 33.5
        assert_eq!(fit_to_width((1000, 335), 100), (100, 34));
    }
}
