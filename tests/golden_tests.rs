//! Golden tests for markup printing and the text cursor
//!
//! Each test prints a string (plain or with inline `[c:...]` commands) onto a
//! surface through a cursor and compares the resulting snapshot against the
//! expected text and cell colors.

use sadconsole::core::{
    CellSurface, Color, ColoredGlyph, Cursor, Mirror, Point, Snapshot, SurfaceEditor,
};
use sadconsole::parser::{BuildContext, CommandKind, CommandStacks, CommandStatus, ParseCommand, StringParser};

/// Print `input` with a fresh cursor and return the surface, cursor and snapshot
fn run_golden_test(input: &str, cols: usize, rows: usize, markup: bool) -> (CellSurface, Cursor, Snapshot) {
    let mut surface = CellSurface::with_colors(cols, rows, Color::WHITE, Color::BLACK);
    let mut cursor = Cursor::for_surface(&surface);
    cursor.use_string_parser = markup;
    cursor.print(&mut surface, input);
    let snapshot = Snapshot::from_surface(&surface, Some(&cursor));
    (surface, cursor, snapshot)
}

fn foregrounds(surface: &CellSurface, row: i32, count: i32) -> Vec<Color> {
    (0..count).filter_map(|x| surface.get_foreground(x, row)).collect()
}

// ============================================================================
// Plain printing
// ============================================================================

#[test]
fn test_simple_text() {
    let (_, cursor, snapshot) = run_golden_test("Hello, World!", 20, 3, false);

    assert_eq!(snapshot.to_text(), "Hello, World!\n");
    assert_eq!(cursor.position(), Point::new(13, 0));
}

#[test]
fn test_paragraph_word_wrap() {
    let (_, cursor, snapshot) = run_golden_test("The quick brown fox jumps over the lazy dog", 12, 5, false);

    assert_eq!(snapshot.to_text(), "The quick\nbrown fox\njumps over\nthe lazy dog\n");
    // "dog" fills the row exactly, so the cursor sits at the start of the next one
    assert_eq!(cursor.position(), Point::new(0, 4));
}

#[test]
fn test_log_scrolls_up() {
    let mut surface = CellSurface::new(10, 3);
    let mut cursor = Cursor::for_surface(&surface);
    cursor.use_linux_line_endings = true;
    cursor.print(&mut surface, "one\ntwo\nthree\nfour");

    let snapshot = Snapshot::from_surface(&surface, Some(&cursor));
    assert_eq!(snapshot.to_text(), "two\nthree\nfour\n");
    assert_eq!(snapshot.times_shifted_up, 1);
    assert_eq!(cursor.position(), Point::new(4, 2));
}

#[test]
fn test_line_feed_keeps_column() {
    let (_, cursor, snapshot) = run_golden_test("ab\ncd", 6, 3, false);

    assert_eq!(snapshot.to_text(), "ab\n  cd\n");
    assert_eq!(cursor.position(), Point::new(4, 1));
}

#[test]
fn test_markup_off_prints_brackets() {
    let (_, _, snapshot) = run_golden_test("[c:r f:red]x", 20, 1, false);

    assert_eq!(snapshot.to_text(), "[c:r f:red]x\n");
}

// ============================================================================
// Markup commands
// ============================================================================

#[test]
fn test_recolor_then_undo() {
    let (surface, _, snapshot) = run_golden_test("[c:r f:red]AB[c:u]CD", 10, 1, true);

    assert_eq!(snapshot.to_text(), "ABCD\n");
    assert_eq!(
        foregrounds(&surface, 0, 4),
        vec![Color::RED, Color::RED, Color::WHITE, Color::WHITE]
    );
}

#[test]
fn test_nested_recolor_undo_order() {
    let (surface, _, _) = run_golden_test("[c:r f:red]a[c:r f:blue]b[c:u]c[c:u]d", 10, 1, true);

    assert_eq!(
        foregrounds(&surface, 0, 4),
        vec![Color::RED, Color::BLUE, Color::RED, Color::WHITE]
    );
}

#[test]
fn test_background_recolor() {
    let (surface, _, _) = run_golden_test("[c:r b:yellow]ab[c:u]c", 10, 1, true);

    assert_eq!(surface.get_background(0, 0), Some(Color::YELLOW));
    assert_eq!(surface.get_background(1, 0), Some(Color::YELLOW));
    assert_eq!(surface.get_background(2, 0), Some(Color::BLACK));
    assert_eq!(surface.get_foreground(0, 0), Some(Color::WHITE));
}

#[test]
fn test_escaped_bracket_prints_literally() {
    let (surface, _, snapshot) = run_golden_test("`[c:r f:red]x", 20, 1, true);

    assert_eq!(snapshot.to_text(), "[c:r f:red]x\n");
    assert_eq!(surface.get_foreground(11, 0), Some(Color::WHITE));
}

#[test]
fn test_unknown_command_is_consumed() {
    let (_, cursor, snapshot) = run_golden_test("a[c:sparkle 3]b", 10, 1, true);

    assert_eq!(snapshot.to_text(), "ab\n");
    assert_eq!(cursor.position(), Point::new(2, 0));
}

#[test]
fn test_gradient_ramp() {
    let (surface, _, snapshot) = run_golden_test("[c:g f:black:white:5]abcde", 10, 1, true);

    assert_eq!(snapshot.to_text(), "abcde\n");
    let colors = foregrounds(&surface, 0, 5);
    assert_eq!(colors[0], Color::BLACK);
    assert_eq!(colors[4], Color::WHITE);
    for pair in colors.windows(2) {
        assert!(pair[0].r < pair[1].r, "gradient should brighten: {:?}", colors);
    }
}

#[test]
fn test_mirror_command() {
    let (surface, _, _) = run_golden_test("[c:m h]ab[c:u]c", 10, 1, true);

    assert_eq!(surface.get_mirror(0, 0), Some(Mirror::Horizontal));
    assert_eq!(surface.get_mirror(1, 0), Some(Mirror::Horizontal));
    assert_eq!(surface.get_mirror(2, 0), Some(Mirror::None));
}

#[test]
fn test_blink_attaches_effects() {
    let (surface, _, snapshot) = run_golden_test("[c:b]ab[c:u]c", 10, 1, true);

    assert_eq!(snapshot.to_text(), "abc\n");
    assert_eq!(snapshot.effects, 2);
    assert!(surface.get_effect(0, 0).is_some());
    assert!(surface.get_effect(2, 0).is_none());
}

#[test]
fn test_set_glyph_with_count() {
    let (_, _, snapshot) = run_golden_test("[c:sg *:2]abcd", 10, 1, true);

    assert_eq!(snapshot.to_text(), "**cd\n");
}

#[test]
fn test_markup_wraps_by_visible_text() {
    // Commands take no room, so "red" still fits on the first row
    let (surface, _, snapshot) = run_golden_test("abc [c:r f:red]red[c:u] blue", 8, 2, true);

    assert_eq!(snapshot.to_text(), "abc red\nblue\n");
    assert_eq!(surface.get_foreground(4, 0), Some(Color::RED));
    assert_eq!(surface.get_foreground(0, 1), Some(Color::WHITE));
}

// ============================================================================
// Custom commands
// ============================================================================

/// `[c:retext word]` replaces the next glyphs with the characters of `word`
#[derive(Debug)]
struct Retext {
    text: Vec<char>,
    next: usize,
}

impl ParseCommand for Retext {
    fn kind(&self) -> CommandKind {
        CommandKind::Glyph
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &BuildContext<'_>) -> CommandStatus {
        if let Some(ch) = self.text.get(self.next) {
            glyph.set_character(*ch);
            self.next += 1;
        }
        if self.next >= self.text.len() {
            CommandStatus::Finished
        } else {
            CommandStatus::Active
        }
    }
}

fn retext_parser() -> StringParser {
    StringParser::with_custom_processor(
        |command: &str, parameters: &str, _existing: &[ColoredGlyph], _stacks: &mut CommandStacks| {
            (command == "retext" && !parameters.is_empty()).then(|| {
                Box::new(Retext {
                    text: parameters.chars().collect(),
                    next: 0,
                }) as Box<dyn ParseCommand>
            })
        },
    )
}

#[test]
fn test_retext_custom_command() {
    let parser = retext_parser();
    let mut surface = CellSurface::new(20, 1);
    let mut cursor = Cursor::for_surface(&surface);
    cursor.use_string_parser = true;
    cursor.print_with_parser(&mut surface, &parser, "Hi [c:retext XYZ]there");

    let snapshot = Snapshot::from_surface(&surface, Some(&cursor));
    assert_eq!(snapshot.to_text(), "Hi XYZre\n");
}

#[test]
fn test_retext_combines_with_recolor() {
    let parsed = retext_parser().parse("[c:r f:red][c:retext ok]abc");

    assert_eq!(parsed.text(), "okc");
    assert!(parsed.iter().all(|glyph| glyph.foreground == Color::RED));
}

#[test]
fn test_custom_processor_leaves_builtins_alone() {
    let parsed = retext_parser().parse("[c:retext]a[c:r f:blue]b");

    assert_eq!(parsed.text(), "ab");
    assert_eq!(parsed[1].foreground, Color::BLUE);
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_snapshot_json_matches_surface() {
    let (_, _, snapshot) = run_golden_test("[c:r f:red]Hi", 4, 2, true);
    let json = snapshot.to_json().unwrap();
    let restored = Snapshot::from_json(&json).unwrap();

    assert!(snapshot.content_equals(&restored));
    assert_eq!(restored.grid[0][0].glyph, 'H' as u32);
    assert_eq!(restored.cursor.map(|c| (c.col, c.row)), Some((2, 0)));
}
