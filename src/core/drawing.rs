//! Line, box and circle drawing plus box-drawing glyph auto-tiling

use std::collections::HashSet;

use super::algorithms;
use super::cell::{Cell, Mirror};
use super::color::Color;
use super::editor::SurfaceEditor;
use super::geometry::{Point, Rect};
use super::surface::SurfaceError;

/// Slots of a connected-line style table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectedLineIndex {
    TopLeft = 0,
    Top,
    TopRight,
    Left,
    Middle,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
    TopMiddleToDown,
    BottomMiddleToTop,
    LeftMiddleToRight,
    RightMiddleToLeft,
}

impl ConnectedLineIndex {
    /// Entries in a complete style table
    pub const COUNT: usize = 13;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Single-line CP437 box drawing glyphs
pub const CONNECTED_LINE_THIN: [u32; ConnectedLineIndex::COUNT] =
    [218, 196, 191, 179, 197, 179, 192, 196, 217, 194, 193, 195, 180];

/// Double-line CP437 box drawing glyphs
pub const CONNECTED_LINE_THICK: [u32; ConnectedLineIndex::COUNT] =
    [201, 205, 187, 186, 206, 186, 200, 205, 188, 203, 202, 204, 185];

/// Shape drawing for every [`SurfaceEditor`]
pub trait Drawing: SurfaceEditor {
    /// Draw a line, setting the given channels on every in-bounds cell it
    /// crosses; returns those cells in order
    fn draw_line(
        &mut self,
        start: Point,
        end: Point,
        foreground: Option<Color>,
        background: Option<Color>,
        glyph: Option<u32>,
        mirror: Option<Mirror>,
    ) -> Vec<Point>;

    /// Draw a rectangle outline, optionally filling the interior
    ///
    /// `style` picks the edge and corner glyphs and must hold
    /// [`ConnectedLineIndex::COUNT`] entries. Without one every border cell
    /// uses the border glyph.
    fn draw_box(
        &mut self,
        area: Rect,
        border: &Cell,
        fill: Option<&Cell>,
        style: Option<&[u32]>,
    ) -> Result<(), SurfaceError>;

    /// Draw the ellipse inscribed in `area`, flood filling it with `inner`
    fn draw_circle(&mut self, area: Rect, outer: &Cell, inner: Option<&Cell>);

    /// Rewrite the line glyphs of `style` inside `area` to match their
    /// neighbours
    fn connect_lines_with(&mut self, style: &[u32], area: Rect) -> Result<(), SurfaceError>;

    /// Connect thin and thick lines across the whole surface
    fn connect_lines(&mut self);
}

impl<T: SurfaceEditor> Drawing for T {
    fn draw_line(
        &mut self,
        start: Point,
        end: Point,
        foreground: Option<Color>,
        background: Option<Color>,
        glyph: Option<u32>,
        mirror: Option<Mirror>,
    ) -> Vec<Point> {
        let Some((from, to)) = algorithms::clip_line(start, end, self.area()) else {
            return Vec::new();
        };
        let touched: Vec<Point> = algorithms::line(from, to)
            .filter(|p| self.is_valid_cell(p.x, p.y))
            .collect();
        for point in &touched {
            self.edit_cell(point.x, point.y, |cell| {
                if let Some(fg) = foreground {
                    cell.foreground = fg;
                }
                if let Some(bg) = background {
                    cell.background = bg;
                }
                if let Some(g) = glyph {
                    cell.glyph = g;
                }
                if let Some(m) = mirror {
                    cell.mirror = m;
                }
            });
        }
        touched
    }

    fn draw_box(
        &mut self,
        area: Rect,
        border: &Cell,
        fill: Option<&Cell>,
        style: Option<&[u32]>,
    ) -> Result<(), SurfaceError> {
        let style: Vec<u32> = match style {
            Some(style) if style.len() != ConnectedLineIndex::COUNT => {
                return Err(SurfaceError::InvalidLineStyle {
                    expected: ConnectedLineIndex::COUNT,
                    actual: style.len(),
                })
            },
            Some(style) => style.to_vec(),
            None => vec![border.glyph; ConnectedLineIndex::COUNT],
        };
        if area.is_empty() {
            return Ok(());
        }
        let glyph = |slot: ConnectedLineIndex| Some(style[slot.index()]);
        let (fg, bg, mirror) = (Some(border.foreground), Some(border.background), Some(border.mirror));
        let (left, top, right, bottom) = (area.x, area.y, area.right(), area.bottom());

        self.draw_line(Point::new(left, top), Point::new(right, top), fg, bg, glyph(ConnectedLineIndex::Top), mirror);
        self.draw_line(
            Point::new(left, bottom),
            Point::new(right, bottom),
            fg,
            bg,
            glyph(ConnectedLineIndex::Bottom),
            mirror,
        );
        self.draw_line(Point::new(left, top), Point::new(left, bottom), fg, bg, glyph(ConnectedLineIndex::Left), mirror);
        self.draw_line(
            Point::new(right, top),
            Point::new(right, bottom),
            fg,
            bg,
            glyph(ConnectedLineIndex::Right),
            mirror,
        );

        let corners = [
            (left, top, ConnectedLineIndex::TopLeft),
            (right, top, ConnectedLineIndex::TopRight),
            (left, bottom, ConnectedLineIndex::BottomLeft),
            (right, bottom, ConnectedLineIndex::BottomRight),
        ];
        for (x, y, slot) in corners {
            self.set_glyph(x, y, style[slot.index()]);
        }

        if let Some(fill) = fill {
            self.fill_area(
                area.inflate(-1, -1),
                Some(fill.foreground),
                Some(fill.background),
                Some(fill.glyph),
                Some(fill.mirror),
            );
        }
        Ok(())
    }

    fn draw_circle(&mut self, area: Rect, outer: &Cell, inner: Option<&Cell>) {
        let outline: HashSet<Point> = algorithms::ellipse(area)
            .into_iter()
            .filter(|p| self.is_valid_cell(p.x, p.y))
            .collect();
        for point in &outline {
            self.set_cell_appearance(point.x, point.y, outer);
        }

        let Some(inner) = inner else {
            return;
        };
        let mut interior = Vec::new();
        algorithms::flood_fill(
            area.center(),
            |p| area.contains(p) && self.is_valid_cell(p.x, p.y) && !outline.contains(&p),
            |p| interior.push(p),
        );
        for point in interior {
            self.set_cell_appearance(point.x, point.y, inner);
        }
    }

    fn connect_lines_with(&mut self, style: &[u32], area: Rect) -> Result<(), SurfaceError> {
        if style.len() != ConnectedLineIndex::COUNT {
            return Err(SurfaceError::InvalidLineStyle {
                expected: ConnectedLineIndex::COUNT,
                actual: style.len(),
            });
        }
        let area = area.intersect(&self.area());
        let is_line = |surface: &Self, x: i32, y: i32| surface.get_glyph(x, y).is_some_and(|g| style.contains(&g));

        let mut updates = Vec::new();
        for point in area.points() {
            if !is_line(self, point.x, point.y) {
                continue;
            }
            let neighbours = Neighbours {
                top: is_line(self, point.x, point.y - 1),
                bottom: is_line(self, point.x, point.y + 1),
                left: is_line(self, point.x - 1, point.y),
                right: is_line(self, point.x + 1, point.y),
            };
            if let Some(slot) = neighbours.slot() {
                updates.push((point, style[slot.index()]));
            }
        }
        for (point, glyph) in updates {
            if self.get_glyph(point.x, point.y) != Some(glyph) {
                self.set_glyph(point.x, point.y, glyph);
            }
        }
        Ok(())
    }

    fn connect_lines(&mut self) {
        let area = self.area();
        for style in [&CONNECTED_LINE_THIN, &CONNECTED_LINE_THICK] {
            // Built-in tables always have the full length
            let _ = self.connect_lines_with(style, area);
        }
    }
}

/// Which of a line cell's four neighbours are line cells of the same style
#[derive(Debug, Clone, Copy)]
struct Neighbours {
    top: bool,
    bottom: bool,
    left: bool,
    right: bool,
}

impl Neighbours {
    fn slot(self) -> Option<ConnectedLineIndex> {
        use ConnectedLineIndex::*;
        let Neighbours { top, bottom, left, right } = self;
        let slot = match (top, bottom, left, right) {
            (true, true, true, true) => Middle,
            (false, true, true, true) => TopMiddleToDown,
            (true, false, true, true) => BottomMiddleToTop,
            (true, true, false, true) => LeftMiddleToRight,
            (true, true, true, false) => RightMiddleToLeft,
            (false, true, false, true) => TopLeft,
            (false, true, true, false) => TopRight,
            (true, false, false, true) => BottomLeft,
            (true, false, true, false) => BottomRight,
            (_, _, false, false) if top || bottom => Left,
            (false, false, _, _) if left || right => Top,
            _ => return None,
        };
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::surface::CellSurface;

    fn rows(surface: &CellSurface) -> Vec<Vec<u32>> {
        (0..surface.height() as i32)
            .map(|y| (0..surface.width() as i32).filter_map(|x| surface.get_glyph(x, y)).collect())
            .collect()
    }

    #[test]
    fn test_draw_line_returns_in_bounds_cells() {
        let mut surface = CellSurface::new(5, 5);
        let touched = surface.draw_line(Point::new(-2, 0), Point::new(2, 0), Some(Color::RED), None, Some(42), None);
        assert_eq!(touched, vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)]);
        assert_eq!(surface.get_glyph(2, 0), Some(42));
        assert_eq!(surface.get_foreground(1, 0), Some(Color::RED));
        assert_eq!(surface.get_glyph(3, 0), Some(0));
    }

    #[test]
    fn test_draw_line_clips_extreme_coordinates() {
        let mut surface = CellSurface::new(5, 3);
        let touched = surface.draw_line(Point::new(i32::MIN, 1), Point::new(i32::MAX, 1), None, None, Some(196), None);
        assert_eq!(touched, (0..5).map(|x| Point::new(x, 1)).collect::<Vec<_>>());
        assert_eq!(rows(&surface)[1], vec![196; 5]);

        let missed = surface.draw_line(Point::new(-100, -50), Point::new(-1, -90), None, None, Some(1), None);
        assert!(missed.is_empty());
        assert!(rows(&surface)[0].iter().all(|g| *g == 0));
    }

    #[test]
    fn test_draw_box_with_style() {
        let mut surface = CellSurface::new(8, 8);
        let border = Cell::new(Color::YELLOW, Color::BLACK, 0);
        surface
            .draw_box(Rect::new(1, 1, 6, 6), &border, None, Some(&CONNECTED_LINE_THIN))
            .unwrap();
        assert_eq!(surface.get_glyph(1, 1), Some(218));
        assert_eq!(surface.get_glyph(6, 1), Some(191));
        assert_eq!(surface.get_glyph(1, 6), Some(192));
        assert_eq!(surface.get_glyph(6, 6), Some(217));
        for i in 2..6 {
            assert_eq!(surface.get_glyph(i, 1), Some(196));
            assert_eq!(surface.get_glyph(i, 6), Some(196));
            assert_eq!(surface.get_glyph(1, i), Some(179));
            assert_eq!(surface.get_glyph(6, i), Some(179));
        }
        for point in Rect::new(2, 2, 4, 4).points() {
            assert_eq!(surface.get_glyph(point.x, point.y), Some(0));
        }
        assert_eq!(surface.get_foreground(1, 3), Some(Color::YELLOW));
    }

    #[test]
    fn test_draw_box_fill_and_default_style() {
        let mut surface = CellSurface::new(4, 4);
        let border = Cell::new(Color::WHITE, Color::BLACK, '#' as u32);
        let fill = Cell::new(Color::WHITE, Color::BLUE, '.' as u32);
        surface.draw_box(surface.area(), &border, Some(&fill), None).unwrap();
        let hash = '#' as u32;
        let dot = '.' as u32;
        assert_eq!(
            rows(&surface),
            vec![
                vec![hash; 4],
                vec![hash, dot, dot, hash],
                vec![hash, dot, dot, hash],
                vec![hash; 4],
            ]
        );
        assert_eq!(surface.get_background(1, 1), Some(Color::BLUE));
    }

    #[test]
    fn test_draw_box_rejects_short_style() {
        let mut surface = CellSurface::new(4, 4);
        let result = surface.draw_box(surface.area(), &Cell::default(), None, Some(&[1, 2, 3]));
        assert_eq!(
            result,
            Err(SurfaceError::InvalidLineStyle {
                expected: 13,
                actual: 3
            })
        );
    }

    #[test]
    fn test_draw_circle_fills_inside_only() {
        let mut surface = CellSurface::new(9, 9);
        let outer = Cell::new(Color::WHITE, Color::BLACK, 'o' as u32);
        let inner = Cell::new(Color::WHITE, Color::BLACK, '.' as u32);
        surface.draw_circle(Rect::new(0, 0, 9, 9), &outer, Some(&inner));
        assert_eq!(surface.get_glyph(4, 4), Some('.' as u32));
        assert_eq!(surface.get_glyph(0, 4), Some('o' as u32));
        assert_eq!(surface.get_glyph(4, 0), Some('o' as u32));
        assert_eq!(surface.get_glyph(0, 0), Some(0));
        assert_eq!(surface.get_glyph(8, 8), Some(0));
    }

    #[test]
    fn test_connect_lines_cross_and_tees() {
        let mut surface = CellSurface::new(5, 5);
        let line = Cell::new(Color::WHITE, Color::BLACK, 196);
        surface.draw_box(surface.area(), &line, None, None).unwrap();
        surface.draw_line(Point::new(2, 0), Point::new(2, 4), None, None, Some(179), None);
        surface.draw_line(Point::new(0, 2), Point::new(4, 2), None, None, Some(196), None);
        surface.connect_lines();
        assert_eq!(surface.get_glyph(0, 0), Some(218));
        assert_eq!(surface.get_glyph(4, 4), Some(217));
        assert_eq!(surface.get_glyph(2, 2), Some(197));
        assert_eq!(surface.get_glyph(2, 0), Some(194));
        assert_eq!(surface.get_glyph(2, 4), Some(193));
        assert_eq!(surface.get_glyph(0, 2), Some(195));
        assert_eq!(surface.get_glyph(4, 2), Some(180));
        assert_eq!(surface.get_glyph(1, 0), Some(196));
        assert_eq!(surface.get_glyph(0, 1), Some(179));
    }

    #[test]
    fn test_connect_lines_keeps_styles_apart() {
        let mut surface = CellSurface::new(3, 1);
        surface.set_glyph(0, 0, 196);
        surface.set_glyph(1, 0, 205);
        surface.set_glyph(2, 0, 205);
        surface.connect_lines();
        assert_eq!(surface.get_glyph(0, 0), Some(196));
        assert_eq!(surface.get_glyph(1, 0), Some(205));
    }
}
