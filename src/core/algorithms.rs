//! Raster algorithms used by the drawing helpers
//!
//! All of them work on plain points and leave bounds handling to callers.

use std::collections::{HashSet, VecDeque};

use super::geometry::{Point, Rect};

/// Every point on the line from `start` to `end`, both ends included
///
/// Points are produced lazily; the error terms are kept in `i64` so any pair
/// of `i32` endpoints is safe.
pub fn line(start: Point, end: Point) -> LinePoints {
    let (x0, y0) = (i64::from(start.x), i64::from(start.y));
    let (x1, y1) = (i64::from(end.x), i64::from(end.y));
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    LinePoints {
        x: x0,
        y: y0,
        end_x: x1,
        end_y: y1,
        dx,
        dy,
        sx: if x0 < x1 { 1 } else { -1 },
        sy: if y0 < y1 { 1 } else { -1 },
        err: dx + dy,
        done: false,
    }
}

/// Bresenham iterator returned by [`line`]
#[derive(Debug, Clone)]
pub struct LinePoints {
    x: i64,
    y: i64,
    end_x: i64,
    end_y: i64,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
    err: i64,
    done: bool,
}

impl Iterator for LinePoints {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        // Coordinates only move toward the end point, so they stay in i32 range
        let point = Point::new(self.x as i32, self.y as i32);
        if self.x == self.end_x && self.y == self.end_y {
            self.done = true;
            return Some(point);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let steps = (self.end_x - self.x).abs().max((self.end_y - self.y).abs());
        let remaining = usize::try_from(steps).ok().and_then(|n| n.checked_add(1));
        (remaining.unwrap_or(usize::MAX), remaining)
    }
}

impl std::iter::FusedIterator for LinePoints {}

/// Clip the segment from `start` to `end` to `area` (Liang-Barsky)
///
/// Endpoints already inside are returned unchanged; clipped ends are rounded
/// to the nearest cell inside the area. `None` when the segment misses.
pub fn clip_line(start: Point, end: Point, area: Rect) -> Option<(Point, Point)> {
    if area.is_empty() {
        return None;
    }
    if area.contains(start) && area.contains(end) {
        return Some((start, end));
    }
    let (x0, y0) = (f64::from(start.x), f64::from(start.y));
    let dx = f64::from(end.x) - x0;
    let dy = f64::from(end.y) - y0;
    let (left, top) = (f64::from(area.x), f64::from(area.y));
    let (right, bottom) = (f64::from(area.right()), f64::from(area.bottom()));

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, x0 - left), (dx, right - x0), (-dy, y0 - top), (dy, bottom - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let clamp = |x: f64, y: f64| {
        Point::new(
            (x.round() as i32).clamp(area.x, area.right()),
            (y.round() as i32).clamp(area.y, area.bottom()),
        )
    };
    let from = if t0 > 0.0 { clamp(x0 + t0 * dx, y0 + t0 * dy) } else { start };
    let to = if t1 < 1.0 { clamp(x0 + t1 * dx, y0 + t1 * dy) } else { end };
    Some((from, to))
}

/// Outline of the ellipse inscribed in `area`
///
/// Points may repeat where quadrants meet.
pub fn ellipse(area: Rect) -> Vec<Point> {
    let mut points = Vec::new();
    if area.is_empty() {
        return points;
    }
    let (mut x0, mut y0) = (i64::from(area.x), i64::from(area.y));
    let (mut x1, mut y1) = (i64::from(area.right()), i64::from(area.bottom()));
    let mut plot = |x: i64, y: i64| points.push(Point::new(x as i32, y as i32));

    let a = (x1 - x0).abs();
    let b = (y1 - y0).abs();
    let mut b1 = b & 1;
    let mut dx = 4 * (1 - a) * b * b;
    let mut dy = 4 * (b1 + 1) * a * a;
    let mut err = dx + dy + b1 * a * a;

    if x0 > x1 {
        x0 = x1;
        x1 += a;
    }
    if y0 > y1 {
        y0 = y1;
    }
    y0 += (b + 1) / 2;
    y1 = y0 - b1;
    let a8 = 8 * a * a;
    b1 = 8 * b * b;

    loop {
        plot(x1, y0);
        plot(x0, y0);
        plot(x0, y1);
        plot(x1, y1);
        let e2 = 2 * err;
        if e2 <= dy {
            y0 += 1;
            y1 -= 1;
            dy += a8;
            err += dy;
        }
        if e2 >= dx || 2 * err > dy {
            x0 += 1;
            x1 -= 1;
            dx += b1;
            err += dx;
        }
        if x0 > x1 {
            break;
        }
    }

    // Flat ellipses stop early; finish the tips
    while y0 - y1 < b {
        plot(x0 - 1, y0);
        plot(x1 + 1, y0);
        y0 += 1;
        plot(x0 - 1, y1);
        plot(x1 + 1, y1);
        y1 -= 1;
    }
    points
}

/// Four-way flood fill from `start`
///
/// `fillable` decides whether a point may be visited; `visit` is called once
/// per reached point. Returns the number of points visited.
pub fn flood_fill(start: Point, mut fillable: impl FnMut(Point) -> bool, mut visit: impl FnMut(Point)) -> usize {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start]);
    let mut visited = 0;
    while let Some(point) = queue.pop_front() {
        if !seen.insert(point) || !fillable(point) {
            continue;
        }
        visit(point);
        visited += 1;
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let next = Point::new(point.x + dx, point.y + dy);
            if !seen.contains(&next) {
                queue.push_back(next);
            }
        }
    }
    visited
}
