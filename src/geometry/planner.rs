//! Pure geometry planning for thumbnails.
//!
//! Maps an original size, a requested size and an optional subject rectangle
//! to a [`GeometryPlan`]. Nothing here touches pixels.
//!
//! Scale factors are `f64`; every derived pixel extent is truncated toward
//! zero, so the same request always yields the same output dimensions.

use super::types::{Point, Rect, Size};

/// Fraction of the subject's own extent kept as margin around it.
const SUBJECT_MARGIN_DIVISOR: f64 = 5.0;

/// What a request asks the planner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryRequest {
    /// Original image size (both axes > 0)
    pub original: Size,
    /// Requested size (0 on an axis = unconstrained)
    pub requested: Size,
    /// Region of interest in original coordinates
    pub subject: Option<Rect>,
}

impl GeometryRequest {
    pub fn new(original: Size, requested: Size) -> Self {
        Self {
            original,
            requested,
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: Option<Rect>) -> Self {
        self.subject = subject;
        self
    }

    /// The subject, or a zero-size point at the image center.
    pub fn subject_or_center(&self) -> Rect {
        self.subject.unwrap_or_else(|| {
            Rect::point(self.original.width / 2, self.original.height / 2)
        })
    }

    /// Whether the plan scales and then crops, the only case that uses a
    /// subject. Lets callers skip subject location otherwise.
    pub fn crops_after_scaling(&self) -> bool {
        let Size { width: ow, height: oh } = self.original;
        let Size { width: rw, height: rh } = self.requested;
        rw > 0 && rh > 0 && rw <= ow && rh <= oh
    }
}

/// Which branch of the case table produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// No size requested
    Identity,
    /// Original placed unscaled on a larger canvas
    Letterbox,
    /// Uniform downscale, no crop
    Scale,
    /// Uniform scale to cover the request, then crop
    ScaleAndCrop,
}

/// How to turn the original into the output.
///
/// Rendering resamples the original to `scaled`, then copies `crop` (in
/// scaled coordinates) onto a white `canvas` at `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryPlan {
    pub kind: PlanKind,
    pub canvas: Size,
    pub scaled: Size,
    pub scale: f64,
    pub crop: Rect,
    pub offset: Point,
}

impl GeometryPlan {
    fn placed(
        kind: PlanKind,
        canvas: Size,
        scaled: Size,
        scale: f64,
        origin: Point,
        offset: Point,
    ) -> Self {
        let max_x = scaled
            .width
            .min(origin.x + (canvas.width - offset.x.min(canvas.width)));
        let max_y = scaled
            .height
            .min(origin.y + (canvas.height - offset.y.min(canvas.height)));
        Self {
            kind,
            canvas,
            scaled,
            scale,
            crop: Rect::new(origin.x, origin.y, max_x.max(origin.x), max_y.max(origin.y)),
            offset,
        }
    }

    /// Whether the output is the scaled image as-is.
    pub fn is_plain_resample(&self) -> bool {
        self.canvas == self.scaled
            && self.offset == Point::default()
            && self.crop == Rect::from_origin(Point::default(), self.scaled)
    }
}

/// Plans the output geometry for a request.
pub fn plan(request: &GeometryRequest) -> GeometryPlan {
    let original = request.original;
    let Size { width: ow, height: oh } = original;
    let Size { width: rw, height: rh } = request.requested;

    match (rw, rh) {
        (0, 0) => GeometryPlan::placed(
            PlanKind::Identity,
            original,
            original,
            1.0,
            Point::default(),
            Point::default(),
        ),
        (rw, 0) if rw <= ow => {
            let scale = rw as f64 / ow as f64;
            let scaled = Size::new(rw, truncate(oh as f64 * scale));
            scale_only(scaled, scale)
        }
        (rw, 0) => letterbox(
            Size::new(rw, oh),
            original,
            Point::default(),
            Point::new((rw - ow) / 2, 0),
        ),
        (0, rh) if rh <= oh => {
            let scale = rh as f64 / oh as f64;
            let scaled = Size::new(truncate(ow as f64 * scale), rh);
            scale_only(scaled, scale)
        }
        (0, rh) => letterbox(
            Size::new(ow, rh),
            original,
            Point::default(),
            Point::new(0, (rh - oh) / 2),
        ),
        (rw, rh) if rw > ow && rh > oh => letterbox(
            Size::new(rw, rh),
            original,
            Point::default(),
            Point::new((rw - ow) / 2, (rh - oh) / 2),
        ),
        (rw, rh) if rw > ow => letterbox(
            Size::new(rw, rh),
            original,
            Point::new(0, (oh - rh) / 2),
            Point::new((rw - ow) / 2, 0),
        ),
        (rw, rh) if rh > oh => letterbox(
            Size::new(rw, rh),
            original,
            Point::new((ow - rw) / 2, 0),
            Point::new(0, (rh - oh) / 2),
        ),
        (rw, rh) => scale_and_crop(request, Size::new(rw, rh)),
    }
}

fn scale_only(scaled: Size, scale: f64) -> GeometryPlan {
    GeometryPlan::placed(
        PlanKind::Scale,
        scaled,
        scaled,
        scale,
        Point::default(),
        Point::default(),
    )
}

fn letterbox(canvas: Size, original: Size, origin: Point, offset: Point) -> GeometryPlan {
    GeometryPlan::placed(PlanKind::Letterbox, canvas, original, 1.0, origin, offset)
}

fn scale_and_crop(request: &GeometryRequest, target: Size) -> GeometryPlan {
    let Size { width: ow, height: oh } = request.original;
    let subject = request.subject_or_center();

    let original_aspect = ow as f64 / oh as f64;
    let target_aspect = target.width as f64 / target.height as f64;

    let (scaled, scale, origin) = if original_aspect < target_aspect {
        // Relatively taller: match width, crop height
        let scale = target.width as f64 / ow as f64;
        let scaled = Size::new(target.width, truncate(oh as f64 * scale));
        let y = crop_start(
            scaled.height,
            target.height,
            subject.min_y,
            subject.max_y,
            scale,
        );
        (scaled, scale, Point::new(0, y))
    } else {
        // Relatively wider: match height, crop width
        let scale = target.height as f64 / oh as f64;
        let scaled = Size::new(truncate(ow as f64 * scale), target.height);
        let x = crop_start(
            scaled.width,
            target.width,
            subject.min_x,
            subject.max_x,
            scale,
        );
        (scaled, scale, Point::new(x, 0))
    };

    GeometryPlan::placed(
        PlanKind::ScaleAndCrop,
        target,
        scaled,
        scale,
        origin,
        Point::default(),
    )
}

/// Start of the crop window along one axis of the scaled image.
///
/// Centered by default. The window is then moved so the subject span
/// `[lo, hi]` (original coordinates), widened by a fifth of its scaled extent
/// on each side and clamped to the image, is inside it; the leading edge wins
/// when both cannot fit.
fn crop_start(extent: u32, window: u32, lo: u32, hi: u32, scale: f64) -> u32 {
    let extent = i64::from(extent);
    let window = i64::from(window);
    let margin = (f64::from(hi.saturating_sub(lo)) * scale / SUBJECT_MARGIN_DIVISOR) as i64;

    let mut start = (extent - window) / 2;

    let far = ((f64::from(hi) * scale) as i64 + margin).min(extent);
    if far > start + window {
        start = far - window;
    }

    let near = ((f64::from(lo) * scale) as i64 - margin).max(0);
    if near < start {
        start = near;
    }

    start.max(0) as u32
}

/// Truncates toward zero, keeping at least one pixel.
fn truncate(value: f64) -> u32 {
    (value as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(ow: u32, oh: u32, rw: u32, rh: u32) -> GeometryRequest {
        GeometryRequest::new(Size::new(ow, oh), Size::new(rw, rh))
    }

    // =========================================================================
    // case table
    // =========================================================================

    #[test]
    fn identity_keeps_original() {
        let p = plan(&request(640, 480, 0, 0));
        assert_eq!(p.kind, PlanKind::Identity);
        assert_eq!(p.canvas, Size::new(640, 480));
        assert_eq!(p.scaled, Size::new(640, 480));
        assert_eq!(p.crop, Rect::new(0, 0, 640, 480));
        assert_eq!(p.offset, Point::default());
        assert_eq!(p.scale, 1.0);
        assert!(p.is_plain_resample());
    }

    #[test]
    fn scale_and_crop_by_height() {
        // 800x600 (1.333) into 400x400 (1.0): wider, so match height
        let p = plan(&request(800, 600, 400, 400));
        assert_eq!(p.kind, PlanKind::ScaleAndCrop);
        assert!((p.scale - 400.0 / 600.0).abs() < 1e-12);
        assert_eq!(p.scaled, Size::new(533, 400));
        assert_eq!(p.canvas, Size::new(400, 400));
        assert_eq!(p.crop, Rect::new(66, 0, 466, 400));
        assert_eq!(p.offset, Point::default());
    }

    #[test]
    fn scale_and_crop_by_width() {
        // 600x800 into 400x400: taller, so match width and crop height
        let p = plan(&request(600, 800, 400, 400));
        assert_eq!(p.scaled, Size::new(400, 533));
        assert_eq!(p.crop, Rect::new(0, 66, 400, 466));
    }

    #[test]
    fn scale_and_crop_same_aspect_has_no_slack() {
        let p = plan(&request(800, 600, 400, 300));
        assert_eq!(p.scaled, Size::new(400, 300));
        assert_eq!(p.crop, Rect::new(0, 0, 400, 300));
    }

    #[test]
    fn scale_only_width() {
        let p = plan(&request(800, 600, 200, 0));
        assert_eq!(p.kind, PlanKind::Scale);
        assert_eq!(p.canvas, Size::new(200, 150));
        assert_eq!(p.scaled, Size::new(200, 150));
        assert!(p.is_plain_resample());
    }

    #[test]
    fn scale_only_height_truncates() {
        // 1000x333 to height 100: width 1000 * (100/333) = 300.3 -> 300
        let p = plan(&request(1000, 333, 0, 100));
        assert_eq!(p.scaled, Size::new(300, 100));
    }

    #[test]
    fn scale_only_never_collapses_an_axis() {
        let p = plan(&request(1000, 1, 10, 0));
        assert_eq!(p.scaled, Size::new(10, 1));
    }

    #[test]
    fn scale_only_at_original_size() {
        let p = plan(&request(300, 200, 300, 0));
        assert_eq!(p.kind, PlanKind::Scale);
        assert_eq!(p.scaled, Size::new(300, 200));
    }

    #[test]
    fn letterbox_both_axes_centers_original() {
        let p = plan(&request(100, 50, 300, 150));
        assert_eq!(p.kind, PlanKind::Letterbox);
        assert_eq!(p.canvas, Size::new(300, 150));
        assert_eq!(p.scaled, Size::new(100, 50));
        assert_eq!(p.offset, Point::new(100, 50));
        assert_eq!(p.crop, Rect::new(0, 0, 100, 50));
    }

    #[test]
    fn letterbox_width_only_keeps_original_height() {
        let p = plan(&request(100, 50, 301, 0));
        assert_eq!(p.canvas, Size::new(301, 50));
        assert_eq!(p.offset, Point::new(100, 0));
        assert_eq!(p.crop, Rect::new(0, 0, 100, 50));
    }

    #[test]
    fn letterbox_height_only_keeps_original_width() {
        let p = plan(&request(100, 50, 0, 90));
        assert_eq!(p.canvas, Size::new(100, 90));
        assert_eq!(p.offset, Point::new(0, 20));
    }

    #[test]
    fn letterbox_width_center_crops_height() {
        // Too narrow, but taller than requested: pad width, crop height
        let p = plan(&request(100, 200, 300, 100));
        assert_eq!(p.kind, PlanKind::Letterbox);
        assert_eq!(p.canvas, Size::new(300, 100));
        assert_eq!(p.offset, Point::new(100, 0));
        assert_eq!(p.crop, Rect::new(0, 50, 100, 150));
    }

    #[test]
    fn letterbox_height_center_crops_width() {
        let p = plan(&request(200, 100, 100, 300));
        assert_eq!(p.canvas, Size::new(100, 300));
        assert_eq!(p.offset, Point::new(0, 100));
        assert_eq!(p.crop, Rect::new(50, 0, 150, 100));
    }

    #[test]
    fn letterbox_with_exact_height_does_not_crop() {
        let p = plan(&request(100, 200, 300, 200));
        assert_eq!(p.crop, Rect::new(0, 0, 100, 200));
    }

    // =========================================================================
    // subject placement
    // =========================================================================

    #[test]
    fn subject_inside_centered_window_does_not_shift() {
        let centered = plan(&request(800, 600, 400, 400));
        let biased = plan(&request(800, 600, 400, 400).with_subject(Some(Rect::new(350, 250, 450, 350))));
        assert_eq!(biased.crop, centered.crop);
    }

    #[test]
    fn zero_size_subject_matches_centered() {
        let centered = plan(&request(1024, 300, 200, 200));
        let point = plan(&request(1024, 300, 200, 200).with_subject(Some(Rect::point(512, 150))));
        assert_eq!(point.crop, centered.crop);
    }

    #[test]
    fn subject_near_right_edge_pulls_window_right() {
        let p = plan(&request(800, 600, 400, 400).with_subject(Some(Rect::new(700, 100, 790, 200))));
        // Expanded box runs past the image edge, so the window clamps to it
        assert_eq!(p.crop, Rect::new(133, 0, 533, 400));
    }

    #[test]
    fn subject_near_left_edge_pulls_window_left() {
        let p = plan(&request(800, 600, 400, 400).with_subject(Some(Rect::new(30, 100, 90, 200))));
        // 30 * 2/3 = 20, margin = 60 * 2/3 / 5 = 8, start = 12
        assert_eq!(p.crop.min_x, 12);
        assert_eq!(p.crop.width(), 400);
    }

    #[test]
    fn subject_near_bottom_pulls_window_down() {
        let p = plan(&request(600, 800, 400, 400).with_subject(Some(Rect::new(100, 700, 200, 760))));
        // far = 760 * 2/3 = 506 + margin 8 = 514 -> start 114
        assert_eq!(p.crop, Rect::new(0, 114, 400, 514));
    }

    #[test]
    fn subject_wider_than_window_keeps_leading_edge() {
        let p = plan(&request(800, 600, 400, 400).with_subject(Some(Rect::new(10, 0, 790, 600))));
        // Both edges cannot fit; the near edge wins and clamps at 0
        assert_eq!(p.crop.min_x, 0);
    }

    #[test]
    fn subject_ignored_outside_scale_and_crop() {
        let subject = Some(Rect::new(0, 0, 10, 10));
        let a = plan(&request(800, 600, 200, 0));
        let b = plan(&request(800, 600, 200, 0).with_subject(subject));
        assert_eq!(a, b);
    }

    #[test]
    fn crops_after_scaling_matches_plan_kind() {
        assert!(request(800, 600, 400, 400).crops_after_scaling());
        assert!(!request(800, 600, 400, 0).crops_after_scaling());
        assert!(!request(800, 600, 900, 400).crops_after_scaling());
        assert!(!request(800, 600, 0, 0).crops_after_scaling());
    }

    #[test]
    fn center_subject_default() {
        assert_eq!(request(801, 600, 0, 0).subject_or_center(), Rect::point(400, 300));
    }

    // =========================================================================
    // properties
    // =========================================================================

    fn subject_strategy(ow: u32, oh: u32) -> impl Strategy<Value = Option<Rect>> {
        prop::option::of((0..=ow, 0..=oh, 0..=ow, 0..=oh).prop_map(|(a, b, c, d)| Rect::new(a, b, c, d)))
    }

    fn request_strategy() -> impl Strategy<Value = GeometryRequest> {
        (1u32..3000, 1u32..3000, 0u32..4000, 0u32..4000).prop_flat_map(|(ow, oh, rw, rh)| {
            subject_strategy(ow, oh).prop_map(move |subject| {
                GeometryRequest::new(Size::new(ow, oh), Size::new(rw, rh)).with_subject(subject)
            })
        })
    }

    proptest! {
        #[test]
        fn prop_identity_for_unconstrained(ow in 1u32..5000, oh in 1u32..5000) {
            let p = plan(&request(ow, oh, 0, 0));
            prop_assert_eq!(p.canvas, Size::new(ow, oh));
            prop_assert!(p.is_plain_resample());
        }

        #[test]
        fn prop_canvas_honors_requested_axes(req in request_strategy()) {
            let p = plan(&req);
            if req.requested.width > 0 {
                prop_assert_eq!(p.canvas.width, req.requested.width);
            }
            if req.requested.height > 0 {
                prop_assert_eq!(p.canvas.height, req.requested.height);
            }
        }

        #[test]
        fn prop_crop_fits_scaled_and_canvas(req in request_strategy()) {
            let p = plan(&req);
            let bounds = Rect::from_origin(Point::default(), p.scaled);
            prop_assert!(bounds.contains(&p.crop), "{:?} outside {:?}", p.crop, bounds);

            let placed = Rect::from_origin(p.offset, p.crop.size());
            let canvas = Rect::from_origin(Point::default(), p.canvas);
            prop_assert!(canvas.contains(&placed), "{:?} outside {:?}", placed, canvas);
        }

        #[test]
        fn prop_plan_is_deterministic(req in request_strategy()) {
            prop_assert_eq!(plan(&req), plan(&req));
        }
    }
}
