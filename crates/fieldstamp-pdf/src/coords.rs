//! Coordinate mapping between normalized field space and PDF point-space
//!
//! Field coordinates are percentages of the page's size with the origin at
//! the top-left. PDF point-space has its origin at the bottom-left, so the
//! Y axis flips: a field's top edge at `y` percent sits at
//! `height - y% * height` points, and the box's bottom edge one box-height
//! below that.

/// A page's MediaBox as origin plus size, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MediaBox {
    /// US Letter, the fallback when a page carries no MediaBox.
    pub fn letter() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 612.0,
            height: 792.0,
        }
    }
}

/// An axis-aligned box in point-space, anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl PointRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }
}

/// Map a field's normalized geometry onto a page.
pub fn field_rect(x_pct: f64, y_pct: f64, w_pct: f64, h_pct: f64, media: &MediaBox) -> PointRect {
    let width = w_pct / 100.0 * media.width;
    let height = h_pct / 100.0 * media.height;
    PointRect {
        left: media.x + x_pct / 100.0 * media.width,
        // y is measured from the page top; point-space from the bottom
        bottom: media.y + media.height - y_pct / 100.0 * media.height - height,
        width,
        height,
    }
}

/// Inverse of [`field_rect`]: recover normalized geometry from point-space.
pub fn rect_to_percent(rect: &PointRect, media: &MediaBox) -> (f64, f64, f64, f64) {
    let w_pct = rect.width / media.width * 100.0;
    let h_pct = rect.height / media.height * 100.0;
    let x_pct = (rect.left - media.x) / media.width * 100.0;
    let y_pct = (media.height - (rect.bottom - media.y) - rect.height) / media.height * 100.0;
    (x_pct, y_pct, w_pct, h_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_field_maps_to_expected_points() {
        // (x=10, y=10, w=20, h=5) on a 600x800 page: the top edge sits
        // 10% below the page top (720pt), the bottom one box below (680pt)
        let media = MediaBox {
            x: 0.0,
            y: 0.0,
            width: 600.0,
            height: 800.0,
        };
        let rect = field_rect(10.0, 10.0, 20.0, 5.0, &media);
        assert_eq!(rect.left, 60.0);
        assert_eq!(rect.top(), 720.0);
        assert_eq!(rect.bottom, 680.0);
        assert_eq!(rect.width, 120.0);
        assert_eq!(rect.height, 40.0);
    }

    #[test]
    fn top_left_field_touches_page_top() {
        let media = MediaBox::letter();
        let rect = field_rect(0.0, 0.0, 20.0, 5.0, &media);
        assert_eq!(rect.left, 0.0);
        assert_eq!(rect.top(), media.height);
    }

    #[test]
    fn full_page_field_covers_media_box() {
        let media = MediaBox {
            x: 10.0,
            y: 20.0,
            width: 500.0,
            height: 700.0,
        };
        let rect = field_rect(0.0, 0.0, 100.0, 100.0, &media);
        assert_eq!(rect.left, media.x);
        assert_eq!(rect.bottom, media.y);
        assert_eq!(rect.width, media.width);
        assert_eq!(rect.height, media.height);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimension() -> impl Strategy<Value = f64> {
        50.0f64..2000.0
    }

    fn media_box() -> impl Strategy<Value = MediaBox> {
        (0.0f64..100.0, 0.0f64..100.0, dimension(), dimension()).prop_map(|(x, y, width, height)| {
            MediaBox {
                x,
                y,
                width,
                height,
            }
        })
    }

    /// A field geometry that fits the page.
    fn geometry() -> impl Strategy<Value = (f64, f64, f64, f64)> {
        (0.0f64..80.0, 0.0f64..80.0, 1.0f64..20.0, 1.0f64..20.0)
    }

    proptest! {
        /// Property: percent -> points -> percent round trips.
        #[test]
        fn round_trip(media in media_box(), (x, y, w, h) in geometry()) {
            let rect = field_rect(x, y, w, h, &media);
            let (bx, by, bw, bh) = rect_to_percent(&rect, &media);

            let tolerance = 1e-9 * media.width.max(media.height);
            prop_assert!((bx - x).abs() < tolerance, "x: {} -> {}", x, bx);
            prop_assert!((by - y).abs() < tolerance, "y: {} -> {}", y, by);
            prop_assert!((bw - w).abs() < tolerance);
            prop_assert!((bh - h).abs() < tolerance);
        }

        /// Property: a field inside [0,100] stays inside the MediaBox.
        #[test]
        fn in_bounds_field_stays_on_page(media in media_box(), (x, y, w, h) in geometry()) {
            let rect = field_rect(x, y, w, h, &media);
            let eps = 1e-6 * media.width.max(media.height);
            prop_assert!(rect.left >= media.x - eps);
            prop_assert!(rect.bottom >= media.y - eps);
            prop_assert!(rect.right() <= media.x + media.width + eps);
            prop_assert!(rect.top() <= media.y + media.height + eps);
        }

        /// Property: moving a field down the page moves the rect down in
        /// point-space (smaller bottom coordinate).
        #[test]
        fn y_axis_flips(media in media_box(), x in 0.0f64..80.0, y in 0.0f64..40.0) {
            let upper = field_rect(x, y, 10.0, 5.0, &media);
            let lower = field_rect(x, y + 10.0, 10.0, 5.0, &media);
            prop_assert!(lower.bottom < upper.bottom);
            prop_assert!((upper.bottom - lower.bottom - 0.1 * media.height).abs() < 1e-6);
        }

        /// Property: the X axis maps linearly with no flip.
        #[test]
        fn x_axis_is_linear(media in media_box(), y in 0.0f64..80.0, x in 0.0f64..40.0) {
            let a = field_rect(x, y, 10.0, 5.0, &media);
            let b = field_rect(x * 2.0, y, 10.0, 5.0, &media);
            let from_origin_a = a.left - media.x;
            let from_origin_b = b.left - media.x;
            prop_assert!((from_origin_b - 2.0 * from_origin_a).abs() < 1e-6);
        }
    }
}
