//! Engine context
//!
//! Owns everything a running program shares: the configuration, the scene
//! with its root console, the font registry, the random number generator,
//! the markup parser and the focus stack.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::{ConfigError, EngineConfig};
use crate::core::Cursor;
use crate::parser::StringParser;
use crate::scene::{Console, Font, FontError, FrameContext, ObjectId, Renderer, Scene, SceneError, ScreenObject};

/// Errors starting or driving the engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("font error: {0}")]
    Font(#[from] FontError),
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

/// The running engine
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    scene: Scene,
    root: ObjectId,
    fonts: HashMap<String, Font>,
    default_font: Font,
    rng: StdRng,
    parser: StringParser,
    focus: Vec<ObjectId>,
    frames: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let font = match &config.font_path {
            Some(path) => Font::load(path)?,
            None => Font::ibm_8x16(),
        };
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let parser = StringParser::new();
        let mut scene = Scene::new();
        let console = configured_console(&config, &font, &parser, config.width, config.height);
        let root = scene.insert(ScreenObject::with_console(console).named("root"));
        tracing::debug!(width = config.width, height = config.height, font = %font.name, "engine started");

        Ok(Self {
            fonts: HashMap::from([(font.name.clone(), font.clone())]),
            default_font: font,
            scene,
            root,
            rng,
            parser,
            focus: vec![root],
            frames: 0,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn root_console(&self) -> Option<&Console> {
        self.scene.console(self.root)
    }

    pub fn root_console_mut(&mut self) -> Option<&mut Console> {
        self.scene.console_mut(self.root)
    }

    /// A console in the configured colors, font and cursor behaviour
    pub fn create_console(&self, width: usize, height: usize) -> Console {
        configured_console(&self.config, &self.default_font, &self.parser, width, height)
    }

    /// Create a console and attach it under `parent`
    pub fn add_console(&mut self, parent: ObjectId, width: usize, height: usize) -> Result<ObjectId, EngineError> {
        let console = self.create_console(width, height);
        let id = self.scene.insert(ScreenObject::with_console(console));
        if let Err(error) = self.scene.add_child(parent, id) {
            let _ = self.scene.remove(id);
            return Err(error.into());
        }
        Ok(id)
    }

    /// Register a font under its name, replacing any font of that name
    pub fn register_font(&mut self, font: Font) {
        tracing::debug!(name = %font.name, "registered font");
        self.fonts.insert(font.name.clone(), font);
    }

    pub fn font(&self, name: &str) -> Option<&Font> {
        self.fonts.get(name)
    }

    pub fn default_font(&self) -> &Font {
        &self.default_font
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn parser(&self) -> &StringParser {
        &self.parser
    }

    /// Replace the markup parser, e.g. with one carrying custom commands
    ///
    /// Every console in the scene prints through it from now on, as do
    /// consoles created later.
    pub fn set_parser(&mut self, parser: StringParser) {
        for console in self.scene.consoles_mut() {
            console.surface_mut().set_print_parser(parser.clone());
        }
        self.parser = parser;
    }

    /// The object receiving input; removed objects are skipped
    pub fn focused(&self) -> Option<ObjectId> {
        self.focus.iter().rev().copied().find(|id| self.scene.contains(*id))
    }

    /// Replace the focused object
    pub fn set_focus(&mut self, id: ObjectId) {
        self.focus.pop();
        self.focus.push(id);
    }

    /// Focus `id`, remembering the previous focus
    pub fn push_focus(&mut self, id: ObjectId) {
        self.focus.push(id);
    }

    /// Return focus to the previously focused object
    pub fn pop_focus(&mut self) -> Option<ObjectId> {
        self.focus.pop()
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame: update then draw the scene from the root
    pub fn tick(&mut self, elapsed: f64, renderer: &mut dyn Renderer) {
        let mut context = FrameContext {
            elapsed,
            rng: &mut self.rng,
            parser: &self.parser,
        };
        self.scene.update(self.root, &mut context);
        self.scene.draw(self.root, &mut context, renderer);
        self.frames += 1;
    }
}

fn configured_console(
    config: &EngineConfig,
    font: &Font,
    parser: &StringParser,
    width: usize,
    height: usize,
) -> Console {
    let mut console = Console::with_colors(
        width,
        height,
        config.foreground_color(),
        config.background_color(),
        font.clone(),
    );
    console.set_font_size(config.font_size);
    console.surface_mut().use_print_processor = config.use_print_processor;
    console.surface_mut().set_print_parser(parser.clone());
    let settings = &config.cursor;
    let cursor: &mut Cursor = &mut console.cursor;
    cursor.is_visible = settings.visible;
    cursor.disable_word_break = settings.disable_word_break;
    cursor.use_linux_line_endings = settings.use_linux_line_endings;
    cursor.use_string_parser = settings.use_string_parser;
    cursor.auto_shift_rows_up = settings.auto_shift_rows_up;
    console
}
