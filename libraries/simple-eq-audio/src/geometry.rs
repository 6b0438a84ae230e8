//! Display-space primitives shared by the analyzer and the response curve

/// A point in display coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned drawing area; `y` grows downward
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Ordered list of points forming an open path
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point with the smallest `y`, i.e. the visually highest one
    pub fn highest_point(&self) -> Option<Point> {
        self.points
            .iter()
            .copied()
            .min_by(|a, b| a.y.total_cmp(&b.y))
    }
}

/// Linear map of `value` from `[source_min, source_max]` to `[target_min, target_max]`
#[inline]
pub fn map_range(value: f64, source_min: f64, source_max: f64, target_min: f64, target_max: f64) -> f64 {
    target_min + (value - source_min) / (source_max - source_min) * (target_max - target_min)
}

/// Proportion `0..=1` to a frequency on a log axis
#[inline]
pub fn map_to_log10(proportion: f64, min: f64, max: f64) -> f64 {
    min * (max / min).powf(proportion)
}

/// Frequency to its proportion `0..=1` on a log axis
#[inline]
pub fn map_from_log10(value: f64, min: f64, max: f64) -> f64 {
    (value / min).log10() / (max / min).log10()
}
