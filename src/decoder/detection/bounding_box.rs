use crate::models::Point;

/// Quadrilateral frame around the symbol's codeword area.
///
/// Either side may be unknown when created; its corners are then placed on
/// the image edge at the known side's rows. Derived extremes are truncated to
/// whole pixels and clamped to the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    image_width: usize,
    image_height: usize,
    top_left: Point,
    bottom_left: Point,
    top_right: Point,
    bottom_right: Point,
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
}

impl BoundingBox {
    /// Build a box from the corners that are known.
    ///
    /// A side must be all-or-nothing, and at least one side must be present.
    /// A side whose top lies below its bottom is rejected.
    pub fn create(
        image_width: usize,
        image_height: usize,
        top_left: Option<Point>,
        bottom_left: Option<Point>,
        top_right: Option<Point>,
        bottom_right: Option<Point>,
    ) -> Option<Self> {
        if image_width == 0 || image_height == 0 {
            return None;
        }
        let right_edge = (image_width - 1) as f32;
        let (top_left, bottom_left, top_right, bottom_right) =
            match (top_left, bottom_left, top_right, bottom_right) {
                (Some(tl), Some(bl), Some(tr), Some(br)) => (tl, bl, tr, br),
                (Some(tl), Some(bl), None, None) => (
                    tl,
                    bl,
                    Point::new(right_edge, tl.y),
                    Point::new(right_edge, bl.y),
                ),
                (None, None, Some(tr), Some(br)) => {
                    (Point::new(0.0, tr.y), Point::new(0.0, br.y), tr, br)
                }
                _ => return None,
            };
        if top_left.y > bottom_left.y || top_right.y > bottom_right.y {
            return None;
        }
        Some(Self::from_corners(
            image_width,
            image_height,
            top_left,
            bottom_left,
            top_right,
            bottom_right,
        ))
    }

    fn from_corners(
        image_width: usize,
        image_height: usize,
        top_left: Point,
        bottom_left: Point,
        top_right: Point,
        bottom_right: Point,
    ) -> Self {
        let clamp = |value: f32, limit: usize| (value.max(0.0) as usize).min(limit - 1);
        Self {
            image_width,
            image_height,
            top_left,
            bottom_left,
            top_right,
            bottom_right,
            min_x: clamp(top_left.x.min(bottom_left.x), image_width),
            max_x: clamp(top_right.x.max(bottom_right.x), image_width),
            min_y: clamp(top_left.y.min(top_right.y), image_height),
            max_y: clamp(bottom_left.y.max(bottom_right.y), image_height),
        }
    }

    /// Left corners of `left`, right corners of `right`; a missing box yields the other
    pub fn merge(left: Option<BoundingBox>, right: Option<BoundingBox>) -> Option<BoundingBox> {
        match (left, right) {
            (None, right) => right,
            (left, None) => left,
            (Some(left), Some(right)) => Some(Self::from_corners(
                left.image_width,
                left.image_height,
                left.top_left,
                left.bottom_left,
                right.top_right,
                right.bottom_right,
            )),
        }
    }

    /// Extend one side upward by `missing_start_rows` and downward by
    /// `missing_end_rows` pixels, clamped to the image.
    pub fn add_missing_rows(
        &self,
        missing_start_rows: usize,
        missing_end_rows: usize,
        is_left: bool,
    ) -> BoundingBox {
        let mut top_left = self.top_left;
        let mut bottom_left = self.bottom_left;
        let mut top_right = self.top_right;
        let mut bottom_right = self.bottom_right;

        if missing_start_rows > 0 {
            let top = if is_left { top_left } else { top_right };
            let new_min_y = (top.row() as i64 - missing_start_rows as i64).max(0);
            let new_top = Point::new(top.x, new_min_y as f32);
            if is_left {
                top_left = new_top;
            } else {
                top_right = new_top;
            }
        }

        if missing_end_rows > 0 {
            let bottom = if is_left { bottom_left } else { bottom_right };
            let new_max_y = (bottom.row() + missing_end_rows).min(self.image_height - 1);
            let new_bottom = Point::new(bottom.x, new_max_y as f32);
            if is_left {
                bottom_left = new_bottom;
            } else {
                bottom_right = new_bottom;
            }
        }

        Self::from_corners(
            self.image_width,
            self.image_height,
            top_left,
            bottom_left,
            top_right,
            bottom_right,
        )
    }

    pub fn min_x(&self) -> usize {
        self.min_x
    }

    pub fn max_x(&self) -> usize {
        self.max_x
    }

    pub fn min_y(&self) -> usize {
        self.min_y
    }

    pub fn max_y(&self) -> usize {
        self.max_y
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    pub fn bottom_left(&self) -> Point {
        self.bottom_left
    }

    pub fn top_right(&self) -> Point {
        self.top_right
    }

    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    pub fn image_width(&self) -> usize {
        self.image_width
    }

    pub fn image_height(&self) -> usize {
        self.image_height
    }

    /// Corners in top-left, bottom-left, top-right, bottom-right order
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.bottom_left,
            self.top_right,
            self.bottom_right,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> [Point; 4] {
        [
            Point::new(10.0, 5.0),
            Point::new(11.0, 40.0),
            Point::new(90.0, 6.0),
            Point::new(91.5, 41.0),
        ]
    }

    #[test]
    fn test_presence_combinations() {
        let [tl, bl, tr, br] = corners();
        let mut accepted = Vec::new();
        for mask in 0u8..16 {
            let pick = |bit: u8, p: Point| (mask & (1 << bit) != 0).then_some(p);
            let result = BoundingBox::create(
                100,
                50,
                pick(0, tl),
                pick(1, bl),
                pick(2, tr),
                pick(3, br),
            );
            if result.is_some() {
                accepted.push(mask);
            }
        }
        // left pair only, right pair only, all four
        assert_eq!(accepted, vec![0b0011, 0b1100, 0b1111]);
    }

    #[test]
    fn test_derived_extremes() {
        let [tl, bl, tr, br] = corners();
        let bbox = BoundingBox::create(100, 50, Some(tl), Some(bl), Some(tr), Some(br)).unwrap();
        assert_eq!(bbox.min_x(), 10);
        assert_eq!(bbox.max_x(), 91);
        assert_eq!(bbox.min_y(), 5);
        assert_eq!(bbox.max_y(), 41);
    }

    #[test]
    fn test_missing_side_is_projected_to_edge() {
        let [tl, bl, tr, br] = corners();
        let left = BoundingBox::create(100, 50, Some(tl), Some(bl), None, None).unwrap();
        assert_eq!(left.top_right(), Point::new(99.0, 5.0));
        assert_eq!(left.bottom_right(), Point::new(99.0, 40.0));
        assert_eq!(left.max_x(), 99);

        let right = BoundingBox::create(100, 50, None, None, Some(tr), Some(br)).unwrap();
        assert_eq!(right.top_left(), Point::new(0.0, 6.0));
        assert_eq!(right.bottom_left(), Point::new(0.0, 41.0));
        assert_eq!(right.min_x(), 0);
    }

    #[test]
    fn test_merge() {
        let [tl, bl, tr, br] = corners();
        let left = BoundingBox::create(100, 50, Some(tl), Some(bl), None, None);
        let right = BoundingBox::create(100, 50, None, None, Some(tr), Some(br));
        let merged = BoundingBox::merge(left, right).unwrap();
        assert_eq!(merged.corners(), [tl, bl, tr, br]);
        assert_eq!(BoundingBox::merge(None, right), right);
        assert_eq!(BoundingBox::merge(left, None), left);
        assert_eq!(BoundingBox::merge(None, None), None);
    }

    #[test]
    fn test_add_missing_rows_clamps() {
        let [tl, bl, tr, br] = corners();
        let bbox = BoundingBox::create(100, 50, Some(tl), Some(bl), Some(tr), Some(br)).unwrap();

        let grown = bbox.add_missing_rows(3, 4, true);
        assert_eq!(grown.top_left(), Point::new(10.0, 2.0));
        assert_eq!(grown.bottom_left(), Point::new(11.0, 44.0));
        assert_eq!(grown.top_right(), tr);
        assert_eq!(grown.min_y(), 2);
        assert_eq!(grown.max_y(), 44);

        let clamped = bbox.add_missing_rows(20, 20, false);
        assert_eq!(clamped.top_right().y, 0.0);
        assert_eq!(clamped.bottom_right().y, 49.0);
        assert_eq!(clamped.top_left(), tl);

        assert_eq!(bbox.add_missing_rows(0, 0, true), bbox);
    }

    #[test]
    fn test_inverted_side_is_rejected() {
        let [tl, bl, tr, br] = corners();
        assert_eq!(BoundingBox::create(100, 50, Some(bl), Some(tl), None, None), None);
        assert_eq!(BoundingBox::create(100, 50, None, None, Some(br), Some(tr)), None);
        assert_eq!(BoundingBox::create(100, 50, Some(tl), Some(bl), Some(br), Some(tr)), None);
        // a degenerate single-row side is still a box
        let flat = BoundingBox::create(100, 50, Some(tl), Some(tl), None, None).unwrap();
        assert_eq!((flat.min_y(), flat.max_y()), (5, 5));
    }

    #[test]
    fn test_extremes_clamped_to_image() {
        let far_below = Point::new(150.0, 1.0e9);
        let bbox = BoundingBox::create(
            100,
            50,
            Some(Point::new(10.0, 5.0)),
            Some(far_below),
            None,
            None,
        )
        .unwrap();
        assert_eq!(bbox.max_y(), 49);
        assert_eq!(bbox.max_x(), 99);

        let off_image = BoundingBox::create(
            100,
            50,
            None,
            None,
            Some(Point::new(500.0, 300.0)),
            Some(Point::new(500.0, 400.0)),
        )
        .unwrap();
        assert_eq!((off_image.min_y(), off_image.max_y()), (49, 49));
        assert_eq!(off_image.max_x(), 99);
    }
}
