//! Click-driven spatial depth queries.
//!
//! The query engine owns the selection state machine and answers point and
//! rectangle-average queries against the raw depth buffer of the current
//! frame. Selection coordinates are always stored in raw sensor space;
//! display space exists only for hit-testing clicks and drawing overlays.
//!
//! One engine serves both query modes; the mode is a value, not a separate
//! viewer.

use crate::compositor::{DecodedFrame, DepthBuffer};

/// A point in raw sensor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPoint {
    /// Column in the raw plane.
    pub x: u32,
    /// Row in the raw plane.
    pub y: u32,
}

/// A closed axis-aligned box in raw sensor coordinates.
///
/// Both bounds are inclusive; corners are min/max-sorted at construction so
/// the box is independent of click order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRect {
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl RawRect {
    /// Build the closed box spanned by two corners, in either order.
    pub fn from_corners(a: RawPoint, b: RawPoint) -> Self {
        Self {
            x_min: a.x.min(b.x),
            y_min: a.y.min(b.y),
            x_max: a.x.max(b.x),
            y_max: a.y.max(b.y),
        }
    }
}

/// Which half of the composite a display coordinate fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeHalf {
    /// Left half: the color image.
    Color,
    /// Right half: the depth visualization.
    Depth,
}

/// Statistics over the valid samples of a queried region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    /// Mean depth in millimeters over strictly positive samples.
    pub mean_mm: f64,
    /// Number of strictly positive samples contributing to the mean.
    pub samples: usize,
}

/// What to run when the user clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// One click reads the depth value under the pointer.
    Point,
    /// Two clicks select a rectangle and average its valid depth.
    RectangleAverage,
}

/// Selection lifecycle, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// No selection.
    Empty,
    /// One corner placed, waiting for the second.
    PointSelected,
    /// A rectangle is committed and persists until navigation or the next
    /// click.
    Committed,
}

/// Outcome of a click.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// First rectangle corner placed.
    CornerPlaced { raw: RawPoint },
    /// Point query result; the depth value is reported verbatim, including
    /// 0 for an invalid sample.
    PointMeasured {
        raw: RawPoint,
        half: CompositeHalf,
        depth_mm: u16,
    },
    /// Rectangle committed with a valid average.
    RegionCommitted { rect: RawRect, stats: RegionStats },
    /// The rectangle contained no strictly positive sample. This is a valid
    /// empty result, distinct from an average of 0.0; the selection resets.
    EmptyRegion { rect: RawRect },
    /// The click mapped outside the raw sensor bounds; the selection resets.
    Rejected { x: u32, y: u32 },
}

/// Map a display coordinate on the composite to raw sensor space.
///
/// A display x in `[0, display_width)` hits the color half; one in
/// `[display_width, 2*display_width)` hits the depth half and is shifted
/// back by `display_width` before scaling. Returns `None` when the mapped
/// coordinate lands outside the raw plane.
pub fn map_display_point(
    frame: &DecodedFrame,
    display_width: u32,
    x: u32,
    y: u32,
) -> Option<(RawPoint, CompositeHalf)> {
    let (half, local_x) = if x < display_width {
        (CompositeHalf::Color, x)
    } else {
        (CompositeHalf::Depth, x - display_width)
    };
    let raw_x = (f64::from(local_x) / frame.scale_x) as u32;
    let raw_y = (f64::from(y) / frame.scale_y) as u32;
    if raw_x >= frame.raw_width() || raw_y >= frame.raw_height() {
        return None;
    }
    Some((RawPoint { x: raw_x, y: raw_y }, half))
}

/// Average depth over the strictly positive samples inside a box.
///
/// Zero (invalid) samples are excluded from both the numerator and the
/// denominator. Returns `None` when no valid sample exists.
pub fn region_average(depth: &DepthBuffer, rect: &RawRect) -> Option<RegionStats> {
    let mut sum: u64 = 0;
    let mut samples: usize = 0;
    for y in rect.y_min..=rect.y_max.min(depth.height().saturating_sub(1)) {
        for x in rect.x_min..=rect.x_max.min(depth.width().saturating_sub(1)) {
            if let Some(d) = depth.get(x, y) {
                if d > 0 {
                    sum += u64::from(d);
                    samples += 1;
                }
            }
        }
    }
    if samples == 0 {
        return None;
    }
    Some(RegionStats {
        mean_mm: sum as f64 / samples as f64,
        samples,
    })
}

/// Stateful click-driven query engine.
pub struct QueryEngine {
    mode: QueryMode,
    pt1: Option<RawPoint>,
    pt2: Option<RawPoint>,
    last_stats: Option<RegionStats>,
}

impl QueryEngine {
    /// Create an engine in the given mode with an empty selection.
    pub fn new(mode: QueryMode) -> Self {
        Self {
            mode,
            pt1: None,
            pt2: None,
            last_stats: None,
        }
    }

    /// Current query mode.
    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    /// Switch modes, resetting any selection.
    pub fn set_mode(&mut self, mode: QueryMode) {
        self.mode = mode;
        self.reset();
    }

    /// Clear the selection. Every frame-navigation event ends up here.
    pub fn reset(&mut self) {
        self.pt1 = None;
        self.pt2 = None;
        self.last_stats = None;
    }

    /// Selection lifecycle state.
    pub fn state(&self) -> SelectionState {
        match (self.pt1, self.pt2) {
            (None, _) => SelectionState::Empty,
            (Some(_), None) => SelectionState::PointSelected,
            (Some(_), Some(_)) => SelectionState::Committed,
        }
    }

    /// The pending first corner, if one is placed.
    pub fn pending_corner(&self) -> Option<RawPoint> {
        match self.state() {
            SelectionState::PointSelected => self.pt1,
            _ => None,
        }
    }

    /// The committed rectangle and its statistics, if any.
    pub fn committed(&self) -> Option<(RawRect, RegionStats)> {
        match (self.pt1, self.pt2, self.last_stats) {
            (Some(a), Some(b), Some(stats)) => Some((RawRect::from_corners(a, b), stats)),
            _ => None,
        }
    }

    /// Handle a pointer click at a display coordinate on the composite.
    pub fn click(
        &mut self,
        frame: &DecodedFrame,
        display_width: u32,
        x: u32,
        y: u32,
    ) -> QueryResponse {
        let Some((raw, half)) = map_display_point(frame, display_width, x, y) else {
            self.reset();
            return QueryResponse::Rejected { x, y };
        };

        match self.mode {
            QueryMode::Point => {
                let Some(depth_mm) = frame.depth.get(raw.x, raw.y) else {
                    self.reset();
                    return QueryResponse::Rejected { x, y };
                };
                QueryResponse::PointMeasured { raw, half, depth_mm }
            }
            QueryMode::RectangleAverage => self.rectangle_click(frame, raw),
        }
    }

    /// Empty -> PointSelected -> Committed -> PointSelected(new).
    fn rectangle_click(&mut self, frame: &DecodedFrame, raw: RawPoint) -> QueryResponse {
        match (self.pt1, self.pt2) {
            // No selection, or a committed one: this click starts over.
            (None, _) | (Some(_), Some(_)) => {
                self.pt1 = Some(raw);
                self.pt2 = None;
                self.last_stats = None;
                QueryResponse::CornerPlaced { raw }
            }
            (Some(first), None) => {
                let rect = RawRect::from_corners(first, raw);
                match region_average(&frame.depth, &rect) {
                    Some(stats) => {
                        self.pt2 = Some(raw);
                        self.last_stats = Some(stats);
                        QueryResponse::RegionCommitted { rect, stats }
                    }
                    None => {
                        self.reset();
                        QueryResponse::EmptyRegion { rect }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::Compositor;
    use crate::config::ViewerConfig;
    use crate::source::{PixelFormat, RawFrame};

    /// 4x4 frame composited at 8x8 per half (scale 2.0).
    fn frame_with_depth(depth: Vec<u16>) -> DecodedFrame {
        let mut compositor = Compositor::new(&ViewerConfig::default().with_display_size(8, 8));
        compositor.compose(
            0,
            RawFrame {
                width: 4,
                height: 4,
                pixel_format: PixelFormat::Rgb8,
                color: vec![0; 48],
                depth,
            },
        )
    }

    fn checker_depth() -> Vec<u16> {
        // Row-major 4x4: two valid samples of 150 at (1,1) and (2,2).
        let mut depth = vec![0u16; 16];
        depth[4 * 1 + 1] = 150;
        depth[4 * 2 + 2] = 150;
        depth
    }

    #[test]
    fn test_map_color_half() {
        let frame = frame_with_depth(vec![100; 16]);
        let (raw, half) = map_display_point(&frame, 8, 5, 3).unwrap();
        assert_eq!(half, CompositeHalf::Color);
        assert_eq!(raw, RawPoint { x: 2, y: 1 });
    }

    #[test]
    fn test_map_depth_half_shifts_x() {
        let frame = frame_with_depth(vec![100; 16]);
        let (raw, half) = map_display_point(&frame, 8, 13, 3).unwrap();
        assert_eq!(half, CompositeHalf::Depth);
        assert_eq!(raw, RawPoint { x: 2, y: 1 });
    }

    #[test]
    fn test_map_out_of_bounds_rejected() {
        let frame = frame_with_depth(vec![100; 16]);
        // y beyond the composite maps past the raw plane.
        assert!(map_display_point(&frame, 8, 3, 40).is_none());
    }

    #[test]
    fn test_point_query_reports_verbatim() {
        let frame = frame_with_depth(checker_depth());
        let mut engine = QueryEngine::new(QueryMode::Point);
        // Display (2,2) maps to raw (1,1) where depth is 150.
        match engine.click(&frame, 8, 2, 2) {
            QueryResponse::PointMeasured { depth_mm, half, .. } => {
                assert_eq!(depth_mm, 150);
                assert_eq!(half, CompositeHalf::Color);
            }
            other => panic!("expected point measurement, got {:?}", other),
        }
        // An invalid sample reads as 0, still reported verbatim.
        match engine.click(&frame, 8, 0, 0) {
            QueryResponse::PointMeasured { depth_mm, .. } => assert_eq!(depth_mm, 0),
            other => panic!("expected point measurement, got {:?}", other),
        }
    }

    #[test]
    fn test_rectangle_average_over_valid_samples_only() {
        let frame = frame_with_depth(checker_depth());
        let mut engine = QueryEngine::new(QueryMode::RectangleAverage);
        // Raw corners (0,0) and (3,3): whole plane.
        engine.click(&frame, 8, 0, 0);
        match engine.click(&frame, 8, 7, 7) {
            QueryResponse::RegionCommitted { stats, .. } => {
                assert_eq!(stats.samples, 2);
                assert!((stats.mean_mm - 150.0).abs() < f64::EPSILON);
            }
            other => panic!("expected committed region, got {:?}", other),
        }
        assert_eq!(engine.state(), SelectionState::Committed);
    }

    #[test]
    fn test_rectangle_click_order_invariant() {
        let frame = frame_with_depth(checker_depth());

        let mut forward = QueryEngine::new(QueryMode::RectangleAverage);
        forward.click(&frame, 8, 0, 0);
        let a = forward.click(&frame, 8, 7, 7);

        let mut reverse = QueryEngine::new(QueryMode::RectangleAverage);
        reverse.click(&frame, 8, 7, 7);
        let b = reverse.click(&frame, 8, 0, 0);

        assert_eq!(a, b);
    }

    #[test]
    fn test_all_zero_rectangle_is_empty_not_zero() {
        let frame = frame_with_depth(vec![0; 16]);
        let mut engine = QueryEngine::new(QueryMode::RectangleAverage);
        engine.click(&frame, 8, 0, 0);
        match engine.click(&frame, 8, 7, 7) {
            QueryResponse::EmptyRegion { .. } => {}
            other => panic!("expected empty region, got {:?}", other),
        }
        assert_eq!(engine.state(), SelectionState::Empty);
    }

    #[test]
    fn test_click_after_commit_starts_new_selection() {
        let frame = frame_with_depth(checker_depth());
        let mut engine = QueryEngine::new(QueryMode::RectangleAverage);
        engine.click(&frame, 8, 0, 0);
        engine.click(&frame, 8, 7, 7);
        assert_eq!(engine.state(), SelectionState::Committed);

        match engine.click(&frame, 8, 4, 4) {
            QueryResponse::CornerPlaced { raw } => assert_eq!(raw, RawPoint { x: 2, y: 2 }),
            other => panic!("expected corner placement, got {:?}", other),
        }
        assert_eq!(engine.state(), SelectionState::PointSelected);
    }

    #[test]
    fn test_out_of_bounds_click_resets_selection() {
        let frame = frame_with_depth(checker_depth());
        let mut engine = QueryEngine::new(QueryMode::RectangleAverage);
        engine.click(&frame, 8, 0, 0);
        assert_eq!(engine.state(), SelectionState::PointSelected);

        match engine.click(&frame, 8, 3, 40) {
            QueryResponse::Rejected { x: 3, y: 40 } => {}
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(engine.state(), SelectionState::Empty);
    }

    #[test]
    fn test_single_cell_rectangle() {
        let frame = frame_with_depth(checker_depth());
        let mut engine = QueryEngine::new(QueryMode::RectangleAverage);
        // Both clicks on raw (1,1): a 1x1 closed box.
        engine.click(&frame, 8, 2, 2);
        match engine.click(&frame, 8, 2, 2) {
            QueryResponse::RegionCommitted { rect, stats } => {
                assert_eq!(rect, RawRect {
                    x_min: 1,
                    y_min: 1,
                    x_max: 1,
                    y_max: 1
                });
                assert_eq!(stats.samples, 1);
                assert!((stats.mean_mm - 150.0).abs() < f64::EPSILON);
            }
            other => panic!("expected committed region, got {:?}", other),
        }
    }

    #[test]
    fn test_mode_switch_resets_selection() {
        let frame = frame_with_depth(checker_depth());
        let mut engine = QueryEngine::new(QueryMode::RectangleAverage);
        engine.click(&frame, 8, 0, 0);
        engine.set_mode(QueryMode::Point);
        assert_eq!(engine.state(), SelectionState::Empty);
    }
}
