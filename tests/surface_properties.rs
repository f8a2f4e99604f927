//! Property-based tests for surface editing, cursor wrapping and markup.
//!
//! 1. Set/get agree inside the bounds; outside they change nothing.
//! 2. Shifting up then down restores the rows that never left the surface.
//! 3. Wrapped shifts round-trip the whole grid.
//! 4. Shift counters add amounts, not calls.
//! 5. Fill sets every requested channel and drops decorators.
//! 6. Resize with clear resets the overlap.
//! 7. Markup without commands parses to itself in default colors.
//! 8. Word wrap never splits a word that fits on a line.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use sadconsole::core::{Cell, CellDecorator, CellSurface, Color, Cursor, Mirror, SurfaceEditor};
use sadconsole::parser::StringParser;

// ── Helpers ─────────────────────────────────────────────────────────────

fn garbage_surface(width: usize, height: usize, seed: u64) -> CellSurface {
    let mut surface = CellSurface::new(width, height);
    surface.fill_with_random_garbage(&mut StdRng::seed_from_u64(seed));
    surface
}

fn appearance(cell: &Cell) -> (u32, Color, Color, Mirror) {
    (cell.glyph, cell.foreground, cell.background, cell.mirror)
}

fn row(surface: &CellSurface, y: usize) -> Vec<(u32, Color, Color, Mirror)> {
    let width = surface.width();
    surface.cells()[y * width..(y + 1) * width]
        .iter()
        .map(appearance)
        .collect()
}

fn color_strategy() -> impl Strategy<Value = Color> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::rgb(r, g, b))
}

fn size_strategy() -> impl Strategy<Value = (usize, usize)> {
    (1usize..=24, 1usize..=16)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Set/get
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn set_then_get_glyph((width, height) in size_strategy(), x in -30i32..30, y in -30i32..30, glyph in 0u32..1024) {
        let mut surface = CellSurface::new(width, height);
        let before = surface.clone();
        surface.set_glyph(x, y, glyph);

        if surface.is_valid_cell(x, y) {
            prop_assert_eq!(surface.get_glyph(x, y), Some(glyph));
        } else {
            prop_assert_eq!(surface.get_glyph(x, y), None);
            prop_assert_eq!(surface.cells(), before.cells());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Shift up then down without wrap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn shift_up_down_restores_inner_rows((width, height) in size_strategy(), seed in any::<u64>(), amount in 1usize..16) {
        prop_assume!(amount < height);
        let original = garbage_surface(width, height, seed);
        let mut surface = original.clone();
        surface.shift_up(amount as i32, false);
        surface.shift_down(amount as i32, false);

        for y in amount..height {
            prop_assert_eq!(row(&surface, y), row(&original, y), "row {} changed", y);
        }
        let blank = (0, surface.default_foreground(), surface.default_background(), Mirror::None);
        for y in 0..amount {
            prop_assert!(row(&surface, y).iter().all(|cell| *cell == blank), "row {} not cleared", y);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Wrapped shifts round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wrapped_shifts_round_trip((width, height) in size_strategy(), seed in any::<u64>(), amount in -40i32..40) {
        let original = garbage_surface(width, height, seed);
        let mut surface = original.clone();

        surface.shift_up(amount, true);
        surface.shift_down(amount, true);
        surface.shift_left(amount, true);
        surface.shift_right(amount, true);

        let restored: Vec<_> = surface.cells().iter().map(appearance).collect();
        let expected: Vec<_> = original.cells().iter().map(appearance).collect();
        prop_assert_eq!(restored, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Shift counters
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn shift_counter_adds_amounts(a in 0i32..10, b in 0i32..10, wrap in any::<bool>()) {
        let mut surface = CellSurface::new(8, 6);
        surface.shift_up(a, wrap);
        surface.shift_up(b, wrap);
        prop_assert_eq!(surface.times_shifted_up(), (a + b) as usize);
        prop_assert_eq!(surface.times_shifted_down(), 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Fill
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fill_sets_channels_and_drops_decorators(
        (width, height) in size_strategy(),
        fg in color_strategy(),
        bg in color_strategy(),
        glyph in 0u32..256,
    ) {
        let mut surface = CellSurface::new(width, height);
        surface.add_decorators(0, 0, &[CellDecorator::new(Color::RED, '_' as u32, Mirror::None)]);
        surface.fill(Some(fg), Some(bg), Some(glyph), None);

        for cell in surface.cells() {
            prop_assert_eq!(cell.foreground, fg);
            prop_assert_eq!(cell.background, bg);
            prop_assert_eq!(cell.glyph, glyph);
            prop_assert!(cell.decorators.is_empty());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Resize with clear
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resize_clear_resets_overlap(
        (width, height) in size_strategy(),
        (new_width, new_height) in size_strategy(),
        seed in any::<u64>(),
    ) {
        let mut surface = garbage_surface(width, height, seed);
        surface.resize(new_width, new_height, true);

        prop_assert_eq!(surface.cells().len(), new_width * new_height);
        for y in 0..new_height.min(height) as i32 {
            for x in 0..new_width.min(width) as i32 {
                prop_assert_eq!(surface.get_glyph(x, y), Some(0));
                prop_assert_eq!(surface.get_foreground(x, y), Some(surface.default_foreground()));
                prop_assert_eq!(surface.get_background(x, y), Some(surface.default_background()));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Plain markup
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn plain_text_parses_to_itself(text in "[a-zA-Z0-9 .,!?:]{0,64}") {
        let parsed = StringParser::new().parse(&text);

        prop_assert_eq!(parsed.text(), text);
        for glyph in parsed.iter() {
            prop_assert_eq!(glyph.foreground, Color::WHITE);
            prop_assert_eq!(glyph.background, Color::TRANSPARENT);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Word wrap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn word_wrap_keeps_fitting_words_whole(
        width in 4usize..20,
        words in prop::collection::vec("[a-z]{1,20}", 1..12),
    ) {
        let words: Vec<String> = words.into_iter().map(|w| w.chars().take(width).collect()).collect();
        let mut surface = CellSurface::new(width, words.len() + 1);
        let mut cursor = Cursor::for_surface(&surface);
        cursor.print(&mut surface, &words.join(" "));

        let mut printed = Vec::new();
        for y in 0..surface.height() as i32 {
            let line: String = (0..width as i32)
                .map(|x| match surface.get_glyph(x, y) {
                    Some(0) | None => ' ',
                    Some(g) => char::from_u32(g).unwrap_or('?'),
                })
                .collect();
            printed.extend(line.split_whitespace().map(str::to_string));
        }
        prop_assert_eq!(printed, words);
        prop_assert_eq!(surface.times_shifted_up(), 0);
    }
}
