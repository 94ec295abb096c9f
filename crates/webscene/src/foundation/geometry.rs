//! Window geometry
//!
//! Two representations are used: [`Bounds`] (origin plus size) is what callers
//! hand in, [`Rect`] (edges) is what a session stores while it waits for its
//! display surface to be realized.

use serde::{Serialize, Deserialize};

/// Origin plus size, in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Bounds {
    /// Create bounds from origin and size
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the bounds cover no area
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Edge rectangle, in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge (exclusive)
    pub right: i32,
    /// Bottom edge (exclusive)
    pub bottom: i32,
}

impl Rect {
    /// Create a rectangle from its edges
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Derive the edge rectangle from origin-and-size bounds
    pub const fn from_bounds(bounds: Bounds) -> Self {
        Self {
            left: bounds.x,
            top: bounds.y,
            right: bounds.x.saturating_add(bounds.width),
            bottom: bounds.y.saturating_add(bounds.height),
        }
    }

    /// Convert back to origin-and-size bounds
    pub const fn to_bounds(self) -> Bounds {
        Bounds {
            x: self.left,
            y: self.top,
            width: self.width(),
            height: self.height(),
        }
    }

    /// Width in pixels
    pub const fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    /// Height in pixels
    pub const fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Whether the rectangle covers no area
    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Apply the fields a popup request explicitly set
    ///
    /// Width and height are measured from the (possibly just updated) left and
    /// top edges. Fields the request left unset keep their current value.
    /// Edges clamp at the `i32` range, since content picks these values.
    pub fn apply_popup_features(&mut self, features: &PopupFeatures) {
        if let Some(x) = features.x {
            self.left = x;
        }
        if let Some(y) = features.y {
            self.top = y;
        }
        if let Some(width) = features.width {
            self.right = self.left.saturating_add(width);
        }
        if let Some(height) = features.height {
            self.bottom = self.top.saturating_add(height);
        }
    }
}

/// Geometry requested by content opening a popup (e.g. `window.open`)
///
/// Each field is independently optional; `None` means the content did not
/// ask for that value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopupFeatures {
    /// Requested left edge
    pub x: Option<i32>,
    /// Requested top edge
    pub y: Option<i32>,
    /// Requested width
    pub width: Option<i32>,
    /// Requested height
    pub height: Option<i32>,
}

impl PopupFeatures {
    /// Features with every field set
    pub const fn with_bounds(bounds: Bounds) -> Self {
        Self {
            x: Some(bounds.x),
            y: Some(bounds.y),
            width: Some(bounds.width),
            height: Some(bounds.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_bounds() {
        let rect = Rect::from_bounds(Bounds::new(10, 20, 300, 200));
        assert_eq!(rect, Rect::new(10, 20, 310, 220));
        assert_eq!(rect.width(), 300);
        assert_eq!(rect.height(), 200);
        assert_eq!(rect.to_bounds(), Bounds::new(10, 20, 300, 200));
    }

    #[test]
    fn test_popup_features_only_x() {
        let mut rect = Rect::default();
        rect.apply_popup_features(&PopupFeatures { x: Some(50), ..Default::default() });
        assert_eq!(rect, Rect::new(50, 0, 0, 0));
    }

    #[test]
    fn test_popup_features_all_set() {
        let mut rect = Rect::new(1, 2, 3, 4);
        rect.apply_popup_features(&PopupFeatures::with_bounds(Bounds::new(100, 50, 640, 480)));
        assert_eq!(rect, Rect::new(100, 50, 740, 530));
    }

    #[test]
    fn test_popup_width_uses_existing_left() {
        let mut rect = Rect::new(30, 40, 0, 0);
        rect.apply_popup_features(&PopupFeatures { width: Some(100), ..Default::default() });
        assert_eq!(rect, Rect::new(30, 40, 130, 0));
    }

    #[test]
    fn test_popup_features_clamp_at_i32_range() {
        let mut rect = Rect::default();
        rect.apply_popup_features(&PopupFeatures {
            x: Some(i32::MAX),
            width: Some(10),
            ..Default::default()
        });
        assert_eq!(rect, Rect::new(i32::MAX, 0, i32::MAX, 0));
        assert!(rect.is_empty());

        let mut rect = Rect::default();
        rect.apply_popup_features(&PopupFeatures {
            y: Some(i32::MIN),
            height: Some(-10),
            ..Default::default()
        });
        assert_eq!(rect.bottom, i32::MIN);
    }

    #[test]
    fn test_extreme_bounds_do_not_overflow() {
        let rect = Rect::from_bounds(Bounds::new(i32::MAX, i32::MIN, 100, -100));
        assert_eq!(rect, Rect::new(i32::MAX, i32::MIN, i32::MAX, i32::MIN));

        let wide = Rect::new(i32::MIN, 0, i32::MAX, 1);
        assert_eq!(wide.width(), i32::MAX);
        assert_eq!(Rect::new(i32::MAX, 0, i32::MIN, 1).width(), i32::MIN);
    }

    #[test]
    fn test_empty_checks() {
        assert!(Rect::default().is_empty());
        assert!(Bounds::new(0, 0, 0, 10).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
    }
}
