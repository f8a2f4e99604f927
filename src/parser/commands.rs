//! Built-in markup commands
//!
//! Each command is constructed from the parameter text that follows its
//! name (`[c:r f:red:3]` hands `f:red:3` to [`Recolor::parse`]) and is then
//! asked to build every following glyph until it finishes or is undone.

use std::fmt;

use crate::core::{Blink, CellEffect, Color, ColorGradient, ColoredGlyph, Mirror};

use super::MarkupError;

/// Which glyph channel a command drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Foreground,
    Background,
    Glyph,
    Mirror,
    Effect,
}

impl CommandKind {
    /// Order in which the channels are built for each glyph
    pub const ALL: [CommandKind; 5] = [
        CommandKind::Foreground,
        CommandKind::Background,
        CommandKind::Glyph,
        CommandKind::Mirror,
        CommandKind::Effect,
    ];
}

/// Result of building one glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Active,
    /// The command is spent and should be removed from its stack
    Finished,
}

/// Read-only parse state handed to commands
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Glyphs emitted so far
    pub existing: &'a [ColoredGlyph],
    pub default_foreground: Color,
    pub default_background: Color,
}

/// A markup command applied to glyphs as they are emitted
pub trait ParseCommand: fmt::Debug {
    fn kind(&self) -> CommandKind;

    /// Modify `glyph`; return [`CommandStatus::Finished`] once spent
    fn build(&mut self, glyph: &mut ColoredGlyph, context: &BuildContext<'_>) -> CommandStatus;
}

/// Optional glyph budget for a command; `None` lasts until undone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counter(Option<u32>);

impl Counter {
    pub fn unlimited() -> Self {
        Counter(None)
    }

    fn parse(text: &str, command: &'static str) -> Result<Self, MarkupError> {
        if text.trim().is_empty() {
            return Ok(Counter(None));
        }
        match text.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(Counter(Some(n))),
            _ => Err(MarkupError::InvalidParameters {
                command,
                parameters: text.to_string(),
            }),
        }
    }

    /// Consume one glyph
    pub fn tick(&mut self) -> CommandStatus {
        match &mut self.0 {
            Some(n) => {
                *n = n.saturating_sub(1);
                if *n == 0 {
                    CommandStatus::Finished
                } else {
                    CommandStatus::Active
                }
            },
            None => CommandStatus::Active,
        }
    }
}

fn invalid(command: &'static str, parameters: &str) -> MarkupError {
    MarkupError::InvalidParameters {
        command,
        parameters: parameters.to_string(),
    }
}

/// A color written in markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    /// The surface's default for the channel
    Default,
    /// Leave the glyph's current color alone
    Original,
    /// A concrete color; `keep[i]` keeps component i (r, g, b, a) of the original
    Value { color: Color, keep: [bool; 4] },
}

impl ColorSpec {
    /// Accepts a color name, `default`, `original`, or `R,G,B[,A]` where any
    /// component may be `x` to keep the glyph's own value
    pub fn parse(text: &str) -> Result<Self, MarkupError> {
        let lowered = text.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "default" => return Ok(ColorSpec::Default),
            "original" => return Ok(ColorSpec::Original),
            _ => {},
        }
        if lowered.contains(',') {
            let parts: Vec<&str> = lowered.split(',').map(str::trim).collect();
            if parts.len() != 3 && parts.len() != 4 {
                return Err(MarkupError::InvalidColor(text.to_string()));
            }
            let mut components = [0u8, 0, 0, 255];
            let mut keep = [false; 4];
            for (i, part) in parts.iter().enumerate() {
                if *part == "x" {
                    keep[i] = true;
                } else {
                    components[i] = part
                        .parse()
                        .map_err(|_| MarkupError::InvalidColor(text.to_string()))?;
                }
            }
            return Ok(ColorSpec::Value {
                color: Color::from_array(components),
                keep,
            });
        }
        Color::from_name(&lowered)
            .map(|color| ColorSpec::Value {
                color,
                keep: [false; 4],
            })
            .ok_or_else(|| MarkupError::InvalidColor(text.to_string()))
    }

    pub fn resolve(&self, original: Color, default: Color) -> Color {
        match *self {
            ColorSpec::Default => default,
            ColorSpec::Original => original,
            ColorSpec::Value { color, keep } => {
                let (new, old) = (color.to_array(), original.to_array());
                let mut out = [0u8; 4];
                for i in 0..4 {
                    out[i] = if keep[i] { old[i] } else { new[i] };
                }
                Color::from_array(out)
            },
        }
    }
}

fn channel(text: &str, command: &'static str, parameters: &str) -> Result<CommandKind, MarkupError> {
    match text {
        "f" => Ok(CommandKind::Foreground),
        "b" => Ok(CommandKind::Background),
        _ => Err(invalid(command, parameters)),
    }
}

/// `[c:r f|b:color[:count]]`
#[derive(Debug, Clone)]
pub struct Recolor {
    kind: CommandKind,
    color: ColorSpec,
    counter: Counter,
}

impl Recolor {
    pub fn parse(parameters: &str) -> Result<Self, MarkupError> {
        let parts: Vec<&str> = parameters.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid("recolor", parameters));
        }
        Ok(Self {
            kind: channel(parts[0].trim(), "recolor", parameters)?,
            color: ColorSpec::parse(parts[1])?,
            counter: match parts.get(2) {
                Some(count) => Counter::parse(count, "recolor")?,
                None => Counter::unlimited(),
            },
        })
    }

    /// A persistent recolor of one channel
    pub fn forced(kind: CommandKind, color: Color) -> Self {
        Self {
            kind,
            color: ColorSpec::Value {
                color,
                keep: [false; 4],
            },
            counter: Counter::unlimited(),
        }
    }
}

impl ParseCommand for Recolor {
    fn kind(&self) -> CommandKind {
        self.kind
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, context: &BuildContext<'_>) -> CommandStatus {
        match self.kind {
            CommandKind::Background => {
                glyph.background = self.color.resolve(glyph.background, context.default_background);
            },
            _ => {
                glyph.foreground = self.color.resolve(glyph.foreground, context.default_foreground);
            },
        }
        self.counter.tick()
    }
}

/// `[c:m 0|1|2|3|none|h|v|both[:count]]`
#[derive(Debug, Clone)]
pub struct MirrorCommand {
    mirror: Mirror,
    counter: Counter,
}

impl MirrorCommand {
    pub fn parse(parameters: &str) -> Result<Self, MarkupError> {
        let mut parts = parameters.split(':');
        let value = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let mirror = match value.as_str() {
            "none" | "n" => Some(Mirror::None),
            "h" | "horizontal" => Some(Mirror::Horizontal),
            "v" | "vertical" => Some(Mirror::Vertical),
            "both" => Some(Mirror::Both),
            number => number.parse::<u32>().ok().and_then(Mirror::from_index),
        }
        .ok_or_else(|| invalid("mirror", parameters))?;
        let counter = match parts.next() {
            Some(count) => Counter::parse(count, "mirror")?,
            None => Counter::unlimited(),
        };
        if parts.next().is_some() {
            return Err(invalid("mirror", parameters));
        }
        Ok(Self { mirror, counter })
    }

    pub fn forced(mirror: Mirror) -> Self {
        Self {
            mirror,
            counter: Counter::unlimited(),
        }
    }
}

impl ParseCommand for MirrorCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Mirror
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &BuildContext<'_>) -> CommandStatus {
        glyph.mirror = self.mirror;
        self.counter.tick()
    }
}

/// `[c:g f|b:color:color[:color...]:length]`
#[derive(Debug, Clone)]
pub struct Gradient {
    kind: CommandKind,
    ramp: ColorGradient,
    length: usize,
    position: usize,
}

impl Gradient {
    pub fn parse(parameters: &str) -> Result<Self, MarkupError> {
        let parts: Vec<&str> = parameters.split(':').collect();
        if parts.len() < 4 {
            return Err(invalid("gradient", parameters));
        }
        let kind = channel(parts[0].trim(), "gradient", parameters)?;
        let length: usize = parts[parts.len() - 1]
            .trim()
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| invalid("gradient", parameters))?;
        let stops = parts[1..parts.len() - 1]
            .iter()
            .map(|text| match ColorSpec::parse(text)? {
                ColorSpec::Value { color, .. } => Ok(color),
                _ => Err(MarkupError::InvalidColor(text.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kind,
            ramp: ColorGradient::new(stops),
            length,
            position: 0,
        })
    }
}

impl ParseCommand for Gradient {
    fn kind(&self) -> CommandKind {
        self.kind
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &BuildContext<'_>) -> CommandStatus {
        if self.position < self.length {
            let color = self.ramp.sample_at(self.position, self.length);
            match self.kind {
                CommandKind::Background => glyph.background = color,
                _ => glyph.foreground = color,
            }
        }
        self.position += 1;
        if self.position >= self.length {
            CommandStatus::Finished
        } else {
            CommandStatus::Active
        }
    }
}

/// Default blink period in seconds
pub const DEFAULT_BLINK_PERIOD: f64 = 0.35;

/// `[c:b [count][:period[:duty]]]`
#[derive(Debug, Clone)]
pub struct BlinkCommand {
    effect: CellEffect,
    counter: Counter,
}

impl BlinkCommand {
    pub fn parse(parameters: &str) -> Result<Self, MarkupError> {
        let parts: Vec<&str> = parameters.split(':').collect();
        if parts.len() > 3 {
            return Err(invalid("blink", parameters));
        }
        let counter = Counter::parse(parts[0], "blink")?;
        let number = |text: &str| {
            text.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| invalid("blink", parameters))
        };
        let period = match parts.get(1) {
            Some(text) if !text.trim().is_empty() => number(text)?,
            _ => DEFAULT_BLINK_PERIOD,
        };
        let mut blink = Blink::new(period);
        if let Some(text) = parts.get(2) {
            blink = blink.with_duty(number(text)?);
        }
        Ok(Self {
            effect: CellEffect::Blink(blink),
            counter,
        })
    }
}

impl ParseCommand for BlinkCommand {
    fn kind(&self) -> CommandKind {
        CommandKind::Effect
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &BuildContext<'_>) -> CommandStatus {
        glyph.effect = Some(self.effect.clone());
        self.counter.tick()
    }
}

/// `[c:ceffect [count]]`
#[derive(Debug, Clone)]
pub struct ClearEffect {
    counter: Counter,
}

impl ClearEffect {
    pub fn parse(parameters: &str) -> Result<Self, MarkupError> {
        Ok(Self {
            counter: Counter::parse(parameters, "ceffect")?,
        })
    }
}

impl ParseCommand for ClearEffect {
    fn kind(&self) -> CommandKind {
        CommandKind::Effect
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &BuildContext<'_>) -> CommandStatus {
        glyph.effect = None;
        self.counter.tick()
    }
}

/// `[c:sg glyph[:count]]`, glyph being a number or a single character
#[derive(Debug, Clone)]
pub struct SetGlyph {
    glyph: u32,
    counter: Counter,
}

impl SetGlyph {
    pub fn parse(parameters: &str) -> Result<Self, MarkupError> {
        let (glyph_text, count_text) = match parameters.rsplit_once(':') {
            // "::2" sets ':' twice, so split on the last colon only
            Some((glyph, count)) if !glyph.is_empty() => (glyph, Some(count)),
            _ => (parameters, None),
        };
        let glyph = match glyph_text.parse::<u32>() {
            Ok(index) => index,
            Err(_) => {
                let mut chars = glyph_text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c as u32,
                    _ => return Err(invalid("sg", parameters)),
                }
            },
        };
        let counter = match count_text {
            Some(count) => Counter::parse(count, "sg")?,
            None => Counter::unlimited(),
        };
        Ok(Self { glyph, counter })
    }
}

impl ParseCommand for SetGlyph {
    fn kind(&self) -> CommandKind {
        CommandKind::Glyph
    }

    fn build(&mut self, glyph: &mut ColoredGlyph, _context: &BuildContext<'_>) -> CommandStatus {
        glyph.glyph = self.glyph;
        self.counter.tick()
    }
}

/// `[c:u [times][:f|b|g|m|e|a]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    pub times: usize,
    /// `None` pops across all channels in push order
    pub kind: Option<CommandKind>,
}

impl Undo {
    pub fn parse(parameters: &str) -> Result<Self, MarkupError> {
        let mut parts = parameters.split(':');
        let times = match parts.next().map(str::trim) {
            None | Some("") => 1,
            Some(text) => text.parse().map_err(|_| invalid("undo", parameters))?,
        };
        let kind = match parts.next().map(str::trim) {
            None | Some("a") | Some("") => None,
            Some("f") => Some(CommandKind::Foreground),
            Some("b") => Some(CommandKind::Background),
            Some("g") => Some(CommandKind::Glyph),
            Some("m") => Some(CommandKind::Mirror),
            Some("e") => Some(CommandKind::Effect),
            Some(_) => return Err(invalid("undo", parameters)),
        };
        Ok(Self { times, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> BuildContext<'static> {
        BuildContext {
            existing: &[],
            default_foreground: Color::WHITE,
            default_background: Color::BLACK,
        }
    }

    #[test]
    fn test_color_spec_forms() {
        assert_eq!(
            ColorSpec::parse("red").unwrap().resolve(Color::BLUE, Color::WHITE),
            Color::RED
        );
        assert_eq!(
            ColorSpec::parse("10,20,30").unwrap().resolve(Color::BLUE, Color::WHITE),
            Color::rgb(10, 20, 30)
        );
        assert_eq!(
            ColorSpec::parse("x,20,x,128").unwrap().resolve(Color::rgb(1, 2, 3), Color::WHITE),
            Color::rgba(1, 20, 3, 128)
        );
        assert_eq!(
            ColorSpec::parse("Default").unwrap().resolve(Color::BLUE, Color::WHITE),
            Color::WHITE
        );
        assert!(ColorSpec::parse("300,0,0").is_err());
        assert!(ColorSpec::parse("nope").is_err());
    }

    #[test]
    fn test_recolor_counter() {
        let mut cmd = Recolor::parse("b:blue:2").unwrap();
        let mut glyph = ColoredGlyph::default();
        assert_eq!(cmd.build(&mut glyph, &context()), CommandStatus::Active);
        assert_eq!(glyph.background, Color::BLUE);
        assert_eq!(cmd.build(&mut glyph, &context()), CommandStatus::Finished);
    }

    #[test]
    fn test_recolor_rejects_bad_channel() {
        assert!(Recolor::parse("z:red").is_err());
        assert!(Recolor::parse("f").is_err());
        assert!(Recolor::parse("f:red:0").is_err());
    }

    #[test]
    fn test_gradient_spans_length() {
        let mut cmd = Gradient::parse("f:black:white:3").unwrap();
        let mut colors = Vec::new();
        let mut status = CommandStatus::Active;
        while status == CommandStatus::Active {
            let mut glyph = ColoredGlyph::default();
            status = cmd.build(&mut glyph, &context());
            colors.push(glyph.foreground);
        }
        assert_eq!(colors, vec![Color::BLACK, Color::rgb(128, 128, 128), Color::WHITE]);
    }

    #[test]
    fn test_mirror_parse() {
        assert!(MirrorCommand::parse("h").is_ok());
        assert!(MirrorCommand::parse("3:2").is_ok());
        assert!(MirrorCommand::parse("7").is_err());
    }

    #[test]
    fn test_set_glyph_parse() {
        let mut glyph = ColoredGlyph::default();
        SetGlyph::parse("65").unwrap().build(&mut glyph, &context());
        assert_eq!(glyph.glyph, 65);
        SetGlyph::parse("#:2").unwrap().build(&mut glyph, &context());
        assert_eq!(glyph.glyph, '#' as u32);
        SetGlyph::parse("::1").unwrap().build(&mut glyph, &context());
        assert_eq!(glyph.glyph, ':' as u32);
        assert!(SetGlyph::parse("").is_err());
    }

    #[test]
    fn test_blink_defaults() {
        let mut cmd = BlinkCommand::parse("").unwrap();
        let mut glyph = ColoredGlyph::default();
        assert_eq!(cmd.build(&mut glyph, &context()), CommandStatus::Active);
        assert_eq!(
            glyph.effect,
            Some(CellEffect::Blink(Blink::new(DEFAULT_BLINK_PERIOD)))
        );
    }

    #[test]
    fn test_undo_parse() {
        assert_eq!(
            Undo::parse("").unwrap(),
            Undo {
                times: 1,
                kind: None
            }
        );
        assert_eq!(
            Undo::parse("2:b").unwrap(),
            Undo {
                times: 2,
                kind: Some(CommandKind::Background)
            }
        );
        assert!(Undo::parse("1:q").is_err());
    }
}
