//! Time-driven cell effects
//!
//! Effects advance by an externally supplied elapsed time (seconds) and are
//! re-applied to the cell they decorate on each update. A cell's appearance
//! is saved when an effect is attached and restored when it is removed, so
//! effects always compute from the original appearance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::color::Color;

/// Show/hide the glyph on a fixed period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blink {
    /// Length of one visible+hidden cycle in seconds
    pub period: f64,
    /// Fraction of each cycle the glyph is shown
    pub duty: f64,
    /// Number of cycles before finishing; `None` blinks forever
    pub blink_count: Option<u32>,
    pub remove_on_finished: bool,
    #[serde(default)]
    elapsed: f64,
    #[serde(default)]
    cycles: u32,
    #[serde(default)]
    finished: bool,
}

impl Blink {
    pub fn new(period: f64) -> Self {
        Self {
            period,
            duty: 0.5,
            blink_count: None,
            remove_on_finished: false,
            elapsed: 0.0,
            cycles: 0,
            finished: false,
        }
    }

    pub fn with_duty(mut self, duty: f64) -> Self {
        self.duty = duty.clamp(0.0, 1.0);
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.blink_count = Some(count);
        self
    }

    /// Whether the glyph is in the shown half of the cycle
    pub fn is_showing(&self) -> bool {
        self.finished || self.period <= 0.0 || self.elapsed < self.period * self.duty
    }

    fn update(&mut self, elapsed: f64) {
        if self.finished || self.period <= 0.0 {
            return;
        }
        self.elapsed += elapsed;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            self.cycles += 1;
            if matches!(self.blink_count, Some(n) if self.cycles >= n) {
                self.finished = true;
                self.elapsed = 0.0;
                break;
            }
        }
    }
}

/// Fade foreground and/or background towards target colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fade {
    pub target_foreground: Option<Color>,
    pub target_background: Option<Color>,
    /// Seconds to reach the targets
    pub duration: f64,
    pub remove_on_finished: bool,
    #[serde(default)]
    elapsed: f64,
}

impl Fade {
    pub fn new(duration: f64) -> Self {
        Self {
            target_foreground: None,
            target_background: None,
            duration,
            remove_on_finished: false,
            elapsed: 0.0,
        }
    }

    pub fn foreground(mut self, color: Color) -> Self {
        self.target_foreground = Some(color);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.target_background = Some(color);
        self
    }

    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0) as f32
        }
    }
}

/// An effect attached to a cell or colored glyph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellEffect {
    Blink(Blink),
    Fade(Fade),
}

impl CellEffect {
    /// Advance the effect clock
    pub fn update(&mut self, elapsed: f64) {
        match self {
            CellEffect::Blink(blink) => blink.update(elapsed),
            CellEffect::Fade(fade) => {
                if fade.elapsed < fade.duration {
                    fade.elapsed = (fade.elapsed + elapsed).min(fade.duration);
                }
            },
        }
    }

    /// Apply the current effect frame to a cell; returns whether it changed
    ///
    /// The cell's saved state, when present, is the base appearance.
    pub fn apply(&self, cell: &mut Cell) -> bool {
        let before = (cell.foreground, cell.background, cell.is_visible);
        match self {
            CellEffect::Blink(blink) => {
                let base = cell.state.as_ref().map_or(true, |s| s.is_visible);
                cell.is_visible = base && blink.is_showing();
            },
            CellEffect::Fade(fade) => {
                let (fg, bg) = cell
                    .state
                    .as_ref()
                    .map_or((cell.foreground, cell.background), |s| (s.foreground, s.background));
                let t = fade.progress();
                if let Some(target) = fade.target_foreground {
                    cell.foreground = fg.lerp(target, t);
                }
                if let Some(target) = fade.target_background {
                    cell.background = bg.lerp(target, t);
                }
            },
        }
        before != (cell.foreground, cell.background, cell.is_visible)
    }

    pub fn is_finished(&self) -> bool {
        match self {
            CellEffect::Blink(blink) => blink.finished,
            CellEffect::Fade(fade) => fade.elapsed >= fade.duration,
        }
    }

    pub fn remove_on_finished(&self) -> bool {
        match self {
            CellEffect::Blink(blink) => blink.remove_on_finished,
            CellEffect::Fade(fade) => fade.remove_on_finished,
        }
    }

    /// Rewind to the first frame
    pub fn restart(&mut self) {
        match self {
            CellEffect::Blink(blink) => {
                blink.elapsed = 0.0;
                blink.cycles = 0;
                blink.finished = false;
            },
            CellEffect::Fade(fade) => fade.elapsed = 0.0,
        }
    }
}

/// Effects attached to the cells of one surface, keyed by cell index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectSet {
    effects: BTreeMap<usize, CellEffect>,
}

impl EffectSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CellEffect> {
        self.effects.get(&index)
    }

    /// Attach, replace or (with `None`) detach the effect of one cell
    pub fn set(&mut self, index: usize, effect: Option<CellEffect>, cells: &mut [Cell]) {
        let Some(cell) = cells.get_mut(index) else {
            return;
        };
        if self.effects.remove(&index).is_some() {
            cell.restore_state();
        }
        if let Some(effect) = effect {
            cell.save_state();
            effect.apply(cell);
            self.effects.insert(index, effect);
        }
    }

    /// Detach every effect, restoring the affected cells
    pub fn clear(&mut self, cells: &mut [Cell]) {
        for index in std::mem::take(&mut self.effects).into_keys() {
            if let Some(cell) = cells.get_mut(index) {
                cell.restore_state();
            }
        }
    }

    /// Re-key effects after the cells moved; unmapped effects are dropped
    pub fn remap(&mut self, mut map: impl FnMut(usize) -> Option<usize>) {
        self.effects = std::mem::take(&mut self.effects)
            .into_iter()
            .filter_map(|(index, effect)| map(index).map(|to| (to, effect)))
            .collect();
    }

    /// Advance every effect and re-apply it; returns whether any cell changed
    pub fn update(&mut self, elapsed: f64, cells: &mut [Cell]) -> bool {
        let mut changed = false;
        let mut finished = Vec::new();
        for (&index, effect) in self.effects.iter_mut() {
            let Some(cell) = cells.get_mut(index) else {
                continue;
            };
            effect.update(elapsed);
            changed |= effect.apply(cell);
            if effect.is_finished() && effect.remove_on_finished() {
                finished.push(index);
            }
        }
        for index in finished {
            self.effects.remove(&index);
            if let Some(cell) = cells.get_mut(index) {
                let before = cell.clone();
                cell.restore_state();
                changed |= before != *cell;
            }
        }
        changed
    }
}
