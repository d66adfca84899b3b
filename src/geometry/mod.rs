//! Geometry Module
//!
//! Plans how a source image becomes a thumbnail: scale, crop window,
//! letterbox canvas and placement offset.

mod planner;
mod types;

pub use planner::{plan, GeometryPlan, GeometryRequest, PlanKind};
pub use types::{Point, Rect, Size};
