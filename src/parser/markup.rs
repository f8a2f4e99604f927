//! Markup to [`ColoredString`] conversion
//!
//! Commands look like `[c:<name> <parameters>]`. A backtick directly before
//! `[` prints the bracket literally. Commands that are not recognized, or
//! whose parameters don't parse, are consumed and dropped.

use std::fmt;
use std::rc::Rc;

use crate::core::{Cell, Color, ColoredGlyph, ColoredString};

use super::commands::{
    BlinkCommand, BuildContext, ClearEffect, Gradient, MirrorCommand, ParseCommand, Recolor, SetGlyph, Undo,
};
use super::stacks::CommandStacks;
use super::MarkupError;

/// Hook for host-defined markup commands, consulted before the built-ins
///
/// Return `None` to let the built-ins (or the drop rule) handle the command.
pub trait CustomCommandProcessor {
    fn process(
        &self,
        command: &str,
        parameters: &str,
        existing: &[ColoredGlyph],
        stacks: &mut CommandStacks,
    ) -> Option<Box<dyn ParseCommand>>;
}

impl<F> CustomCommandProcessor for F
where
    F: Fn(&str, &str, &[ColoredGlyph], &mut CommandStacks) -> Option<Box<dyn ParseCommand>>,
{
    fn process(
        &self,
        command: &str,
        parameters: &str,
        existing: &[ColoredGlyph],
        stacks: &mut CommandStacks,
    ) -> Option<Box<dyn ParseCommand>> {
        self(command, parameters, existing, stacks)
    }
}

/// Inputs to a single parse
pub struct ParseContext<'a> {
    /// Existing cells the glyphs start from, one per emitted glyph
    pub seed: &'a [Cell],
    /// Appearance for glyphs beyond the seed
    pub template: Option<&'a Cell>,
    pub default_foreground: Color,
    pub default_background: Color,
    /// Initial commands
    pub stacks: CommandStacks,
}

impl Default for ParseContext<'_> {
    fn default() -> Self {
        Self {
            seed: &[],
            template: None,
            default_foreground: Color::WHITE,
            default_background: Color::TRANSPARENT,
            stacks: CommandStacks::new(),
        }
    }
}

/// The markup parser
///
/// Clones share the custom processor.
#[derive(Clone, Default)]
pub struct StringParser {
    custom: Option<Rc<dyn CustomCommandProcessor>>,
}

impl fmt::Debug for StringParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringParser")
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl StringParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom_processor(processor: impl CustomCommandProcessor + 'static) -> Self {
        Self {
            custom: Some(Rc::new(processor)),
        }
    }

    pub fn set_custom_processor(&mut self, processor: Option<Box<dyn CustomCommandProcessor>>) {
        self.custom = processor.map(Rc::from);
    }

    /// Parse with white-on-transparent defaults
    pub fn parse(&self, text: &str) -> ColoredString {
        self.parse_with(text, ParseContext::default())
    }

    pub fn parse_with(&self, text: &str, context: ParseContext<'_>) -> ColoredString {
        let ParseContext {
            seed,
            template,
            default_foreground,
            default_background,
            mut stacks,
        } = context;
        let chars: Vec<char> = text.chars().collect();
        let mut glyphs: Vec<ColoredGlyph> = Vec::with_capacity(chars.len());

        let mut i = 0;
        while i < chars.len() {
            let mut ch = chars[i];
            if ch == '`' && chars.get(i + 1) == Some(&'[') {
                ch = '[';
                i += 1;
            } else if ch == '[' {
                if let Some((body, end)) = command_body(&chars, i) {
                    self.apply_command(&body, &glyphs, &mut stacks);
                    i = end + 1;
                    continue;
                }
            }

            let mut glyph = match seed.get(glyphs.len()).or(template) {
                Some(cell) => {
                    let mut cell = cell.clone();
                    cell.state = None;
                    ColoredGlyph::from_cell(cell)
                },
                None => ColoredGlyph::from_cell(Cell::new(default_foreground, default_background, 0)),
            };
            glyph.set_character(ch);
            let context = BuildContext {
                existing: &glyphs,
                default_foreground,
                default_background,
            };
            stacks.build_all(&mut glyph, &context);
            glyphs.push(glyph);
            i += 1;
        }

        let mut result = ColoredString::from_glyphs(glyphs);
        result.ignore_effect = !stacks.turn_on_effects;
        result
    }

    fn apply_command(&self, body: &str, existing: &[ColoredGlyph], stacks: &mut CommandStacks) {
        let (name, parameters) = match body.split_once(' ') {
            Some((name, parameters)) => (name.to_ascii_lowercase(), parameters),
            None => (body.to_ascii_lowercase(), ""),
        };

        if let Some(custom) = &self.custom {
            if let Some(command) = custom.process(&name, parameters, existing, stacks) {
                stacks.push(command);
                return;
            }
        }

        let built: Result<Option<Box<dyn ParseCommand>>, MarkupError> = match name.as_str() {
            "r" | "recolor" => Recolor::parse(parameters).map(boxed),
            "m" | "mirror" => MirrorCommand::parse(parameters).map(boxed),
            "g" | "grad" => Gradient::parse(parameters).map(boxed),
            "b" | "blink" => BlinkCommand::parse(parameters).map(boxed),
            "sg" => SetGlyph::parse(parameters).map(boxed),
            "ceffect" => ClearEffect::parse(parameters).map(boxed),
            "u" | "undo" => Undo::parse(parameters).map(|undo| {
                stacks.undo(undo.times, undo.kind);
                None
            }),
            _ => {
                tracing::debug!(command = %name, "dropping unrecognized markup command");
                Ok(None)
            },
        };
        match built {
            Ok(Some(command)) => {
                stacks.push(command);
            },
            Ok(None) => {},
            Err(error) => tracing::debug!(command = %name, %error, "dropping invalid markup command"),
        }
    }
}

fn boxed<C: ParseCommand + 'static>(command: C) -> Option<Box<dyn ParseCommand>> {
    Some(Box::new(command))
}

/// The text between `[c:` and `]` for a command starting at `start`, plus
/// the index of the closing bracket
fn command_body(chars: &[char], start: usize) -> Option<(String, usize)> {
    if chars.get(start + 1) != Some(&'c') || chars.get(start + 2) != Some(&':') {
        return None;
    }
    let body_start = start + 3;
    let end = body_start + chars.get(body_start..)?.iter().position(|c| *c == ']')?;
    Some((chars[body_start..end].iter().collect(), end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CellEffect, Mirror};

    #[test]
    fn test_plain_text_keeps_defaults() {
        let parsed = StringParser::new().parse("hello world");
        assert_eq!(parsed.text(), "hello world");
        assert!(parsed
            .iter()
            .all(|g| g.foreground == Color::WHITE && g.background == Color::TRANSPARENT));
        assert!(parsed.ignore_effect);
    }

    #[test]
    fn test_recolor_then_undo() {
        let parsed = StringParser::new().parse("[c:r f:red]AB[c:u]CD");
        assert_eq!(parsed.text(), "ABCD");
        assert_eq!(parsed[0].foreground, Color::RED);
        assert_eq!(parsed[1].foreground, Color::RED);
        assert_eq!(parsed[2].foreground, Color::WHITE);
        assert_eq!(parsed[3].foreground, Color::WHITE);
    }

    #[test]
    fn test_counted_recolor_expires() {
        let parsed = StringParser::new().parse("[c:r b:blue:1]xy");
        assert_eq!(parsed[0].background, Color::BLUE);
        assert_eq!(parsed[1].background, Color::TRANSPARENT);
    }

    #[test]
    fn test_escaped_bracket_is_literal() {
        let parsed = StringParser::new().parse("a`[c:r f:red]b");
        assert_eq!(parsed.text(), "a[c:r f:red]b");
        assert!(parsed.iter().all(|g| g.foreground == Color::WHITE));
    }

    #[test]
    fn test_unknown_command_is_dropped() {
        let parsed = StringParser::new().parse("x[c:sparkle 3]y");
        assert_eq!(parsed.text(), "xy");
    }

    #[test]
    fn test_invalid_parameters_are_dropped() {
        let parsed = StringParser::new().parse("x[c:r f:notacolor]y");
        assert_eq!(parsed.text(), "xy");
        assert_eq!(parsed[1].foreground, Color::WHITE);
    }

    #[test]
    fn test_unterminated_command_is_text() {
        let parsed = StringParser::new().parse("[c:r f:red");
        assert_eq!(parsed.text(), "[c:r f:red");
    }

    #[test]
    fn test_plain_brackets_are_text() {
        let parsed = StringParser::new().parse("[x]");
        assert_eq!(parsed.text(), "[x]");
    }

    #[test]
    fn test_mirror_and_blink() {
        let parsed = StringParser::new().parse("[c:m h:1][c:b 1]ab");
        assert_eq!(parsed[0].mirror, Mirror::Horizontal);
        assert_eq!(parsed[1].mirror, Mirror::None);
        assert!(matches!(parsed[0].effect, Some(CellEffect::Blink(_))));
        assert!(parsed[1].effect.is_none());
        assert!(!parsed.ignore_effect);
    }

    #[test]
    fn test_huge_gradient_length_is_sampled_lazily() {
        let parsed = StringParser::new().parse("[c:g f:red:blue:18446744073709551615]ab");
        assert_eq!(parsed.text(), "ab");
        assert_eq!(parsed[0].foreground, Color::RED);
        assert_eq!(parsed[1].foreground, Color::RED);

        let parsed = StringParser::new().parse("[c:g b:red:blue:3]abcd");
        assert_eq!(parsed[0].background, Color::RED);
        assert_eq!(parsed[2].background, Color::BLUE);
        assert_eq!(parsed[3].background, Color::TRANSPARENT);
    }

    #[test]
    fn test_seed_and_default_color() {
        let seed = vec![Cell::new(Color::GREEN, Color::BLACK, 0); 3];
        let context = ParseContext {
            seed: &seed,
            default_foreground: Color::YELLOW,
            ..ParseContext::default()
        };
        let parsed = StringParser::new().parse_with("a[c:r f:default]b", context);
        assert_eq!(parsed[0].foreground, Color::GREEN);
        assert_eq!(parsed[0].background, Color::BLACK);
        assert_eq!(parsed[1].foreground, Color::YELLOW);
    }

    #[test]
    fn test_custom_processor_runs_first() {
        let parser = StringParser::with_custom_processor(
            |command: &str, _params: &str, _existing: &[ColoredGlyph], _stacks: &mut CommandStacks| {
                (command == "r").then(|| {
                    Box::new(SetGlyph::parse("*").expect("valid glyph")) as Box<dyn ParseCommand>
                })
            },
        );
        let parsed = parser.parse("[c:r f:red]ab");
        assert_eq!(parsed.text(), "**");
        assert_eq!(parsed[0].foreground, Color::WHITE);
    }
}
