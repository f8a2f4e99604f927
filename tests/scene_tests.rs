//! Scene graph tests
//!
//! These tests drive whole frames through the scene: components editing the
//! tree mid-traversal, pause/visibility gating, and the dirty-flag render
//! protocol between consoles and renderers.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use sadconsole::app::{Engine, EngineConfig};
use sadconsole::core::{Blink, CellEffect, Point, SurfaceEditor};
use sadconsole::parser::StringParser;
use sadconsole::scene::{
    Component, Console, Font, FrameContext, ObjectId, RenderTarget, Renderer, Scene, ScreenObject, TextRenderer,
};

type Log = Rc<RefCell<Vec<String>>>;

/// Records the name of its object on every update and draw
struct Trace {
    log: Log,
}

impl Component for Trace {
    fn update(&mut self, scene: &mut Scene, id: ObjectId, _context: &mut FrameContext<'_>) {
        if let Some(object) = scene.get(id) {
            self.log.borrow_mut().push(format!("update {}", object.name));
        }
    }

    fn draw(&mut self, scene: &mut Scene, id: ObjectId, _context: &mut FrameContext<'_>) {
        if let Some(object) = scene.get(id) {
            self.log.borrow_mut().push(format!("draw {}", object.name));
        }
    }
}

/// Removes another object the first time it updates
struct RemoveOnUpdate {
    target: Option<ObjectId>,
}

impl Component for RemoveOnUpdate {
    fn update(&mut self, scene: &mut Scene, _id: ObjectId, _context: &mut FrameContext<'_>) {
        if let Some(target) = self.target.take() {
            scene.remove(target).unwrap();
        }
    }
}

/// Adds a traced object under `parent` the first time it updates
struct SpawnOnUpdate {
    parent: ObjectId,
    log: Log,
    done: bool,
}

impl Component for SpawnOnUpdate {
    fn update(&mut self, scene: &mut Scene, _id: ObjectId, _context: &mut FrameContext<'_>) {
        if self.done {
            return;
        }
        self.done = true;
        let mut object = ScreenObject::new().named("spawned");
        object.add_component(Trace { log: self.log.clone() });
        let id = scene.insert(object);
        scene.add_child(self.parent, id).unwrap();
    }
}

/// Renderer that records what each console hands it
#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<(Point, Point, bool, usize)>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, target: &mut RenderTarget<'_>) {
        self.frames.push((
            target.position(),
            target.pixel_position(),
            target.is_dirty(),
            target.cells().count(),
        ));
        target.mark_clean();
    }
}

fn traced(name: &str, log: &Log) -> ScreenObject {
    let mut object = ScreenObject::new().named(name);
    object.add_component(Trace { log: log.clone() });
    object
}

fn run_frame(scene: &mut Scene, root: ObjectId, renderer: &mut dyn Renderer) {
    run_frame_after(scene, root, renderer, 0.016);
}

fn run_frame_after(scene: &mut Scene, root: ObjectId, renderer: &mut dyn Renderer, elapsed: f64) {
    let mut rng = StdRng::seed_from_u64(0);
    let parser = StringParser::new();
    let mut context = FrameContext {
        elapsed,
        rng: &mut rng,
        parser: &parser,
    };
    scene.update(root, &mut context);
    scene.draw(root, &mut context, renderer);
}

#[test]
fn test_traversal_is_depth_first() {
    let log = Log::default();
    let mut scene = Scene::new();
    let root = scene.insert(traced("root", &log));
    let a = scene.insert(traced("a", &log));
    let a1 = scene.insert(traced("a1", &log));
    let b = scene.insert(traced("b", &log));
    scene.add_child(root, a).unwrap();
    scene.add_child(a, a1).unwrap();
    scene.add_child(root, b).unwrap();

    run_frame(&mut scene, root, &mut TextRenderer::new());

    assert_eq!(
        *log.borrow(),
        vec![
            "update root",
            "update a",
            "update a1",
            "update b",
            "draw root",
            "draw a",
            "draw a1",
            "draw b"
        ]
    );
}

#[test]
fn test_child_removing_sibling_during_update() {
    let log = Log::default();
    let mut scene = Scene::new();
    let root = scene.insert(traced("root", &log));
    let a = scene.insert(traced("a", &log));
    let b = scene.insert(traced("b", &log));
    let c = scene.insert(traced("c", &log));
    scene.add_child(root, a).unwrap();
    scene.add_child(root, b).unwrap();
    scene.add_child(root, c).unwrap();
    scene
        .get_mut(a)
        .unwrap()
        .add_component(RemoveOnUpdate { target: Some(b) });

    run_frame(&mut scene, root, &mut TextRenderer::new());

    assert!(!scene.contains(b));
    assert_eq!(scene.children(root), &[a, c]);
    assert_eq!(
        *log.borrow(),
        vec!["update root", "update a", "update c", "draw root", "draw a", "draw c"]
    );
}

#[test]
fn test_object_added_mid_frame_runs_next_frame() {
    let log = Log::default();
    let mut scene = Scene::new();
    let root = scene.insert(traced("root", &log));
    let a = scene.insert(traced("a", &log));
    scene.add_child(root, a).unwrap();
    scene.get_mut(a).unwrap().add_component(SpawnOnUpdate {
        parent: root,
        log: log.clone(),
        done: false,
    });

    let mut renderer = TextRenderer::new();
    let mut rng = StdRng::seed_from_u64(0);
    let parser = StringParser::new();
    let mut context = FrameContext {
        elapsed: 0.0,
        rng: &mut rng,
        parser: &parser,
    };
    scene.update(root, &mut context);
    assert_eq!(*log.borrow(), vec!["update root", "update a"]);
    assert_eq!(scene.children(root).len(), 2);

    log.borrow_mut().clear();
    scene.update(root, &mut context);
    scene.draw(root, &mut context, &mut renderer);
    assert_eq!(
        *log.borrow(),
        vec!["update root", "update a", "update spawned", "draw root", "draw a", "draw spawned"]
    );
    assert_eq!(scene.get(a).unwrap().component_count(), 2);
}

#[test]
fn test_paused_and_hidden_gate_subtrees() {
    let log = Log::default();
    let mut scene = Scene::new();
    let root = scene.insert(traced("root", &log));
    let paused = scene.insert(traced("paused", &log));
    let paused_child = scene.insert(traced("paused_child", &log));
    let hidden = scene.insert(traced("hidden", &log));
    let hidden_child = scene.insert(traced("hidden_child", &log));
    scene.add_child(root, paused).unwrap();
    scene.add_child(paused, paused_child).unwrap();
    scene.add_child(root, hidden).unwrap();
    scene.add_child(hidden, hidden_child).unwrap();
    scene.get_mut(paused).unwrap().is_paused = true;
    scene.get_mut(hidden).unwrap().is_visible = false;

    run_frame(&mut scene, root, &mut TextRenderer::new());

    assert_eq!(
        *log.borrow(),
        vec![
            "update root",
            "update hidden",
            "update hidden_child",
            "draw root",
            "draw paused",
            "draw paused_child"
        ]
    );
}

#[test]
fn test_consoles_draw_at_calculated_position() {
    let font = Font::ibm_8x16();
    let mut scene = Scene::new();
    let root = scene.insert(ScreenObject::with_console(Console::new(4, 2, font.clone())).at(Point::new(10, 10)));
    let child = scene.insert(ScreenObject::with_console(Console::new(2, 2, font)).at(Point::new(2, 3)));
    scene.add_child(root, child).unwrap();

    let mut renderer = RecordingRenderer::default();
    run_frame(&mut scene, root, &mut renderer);

    assert_eq!(
        renderer.frames,
        vec![
            (Point::new(10, 10), Point::new(80, 160), true, 8),
            (Point::new(12, 13), Point::new(96, 208), true, 4),
        ]
    );

    // Moving the parent moves the child without touching it
    scene.set_position(root, Point::new(0, 0)).unwrap();
    renderer.frames.clear();
    run_frame(&mut scene, root, &mut renderer);
    assert_eq!(renderer.frames[1].0, Point::new(2, 3));
    assert!(!renderer.frames[1].2, "nothing changed, so the surface stays clean");
}

#[test]
fn test_renderer_repaints_only_dirty_surfaces() {
    let mut scene = Scene::new();
    let root = scene.insert(ScreenObject::with_console(Console::new(3, 1, Font::ibm_8x16())));
    let mut renderer = TextRenderer::new();

    run_frame(&mut scene, root, &mut renderer);
    run_frame(&mut scene, root, &mut renderer);
    assert_eq!(renderer.repaints(), 1);

    scene.console_mut(root).unwrap().surface_mut().set_glyph(1, 0, 'x' as u32);
    run_frame(&mut scene, root, &mut renderer);
    assert_eq!(renderer.repaints(), 2);
    assert_eq!(renderer.output(), " x ");
}

#[test]
fn test_cell_effects_dirty_the_surface() {
    let mut scene = Scene::new();
    let root = scene.insert(ScreenObject::with_console(Console::new(2, 1, Font::ibm_8x16())));
    let mut renderer = TextRenderer::new();
    {
        let surface = scene.console_mut(root).unwrap().surface_mut();
        surface.print(0, 0, "ab");
        surface.set_effect(0, 0, Some(CellEffect::Blink(Blink::new(0.1))));
    }
    run_frame_after(&mut scene, root, &mut renderer, 0.0);
    run_frame_after(&mut scene, root, &mut renderer, 0.0);
    assert_eq!(renderer.repaints(), 1);
    assert_eq!(renderer.output(), "ab");

    // Past half the period the blinking glyph hides
    run_frame_after(&mut scene, root, &mut renderer, 0.06);
    assert_eq!(renderer.repaints(), 2);
    assert_eq!(renderer.output(), " b");
}

#[test]
fn test_engine_tick_with_child_console() {
    let mut engine = Engine::new(EngineConfig {
        width: 6,
        height: 2,
        random_seed: Some(3),
        ..EngineConfig::default()
    })
    .unwrap();
    let root = engine.root();
    let child = engine.add_console(root, 3, 1).unwrap();
    engine.scene_mut().set_position(child, Point::new(1, 1)).unwrap();
    engine
        .scene_mut()
        .console_mut(child)
        .unwrap()
        .cursor_writer()
        .print("[c:r f:red]hey");

    let mut renderer = RecordingRenderer::default();
    engine.tick(0.0, &mut renderer);

    assert_eq!(renderer.frames.len(), 2);
    assert_eq!(renderer.frames[1].0, Point::new(1, 1));
    let console = engine.scene().console(child).unwrap();
    assert_eq!(console.surface().get_glyph(0, 0), Some('h' as u32));
    assert_eq!(console.surface().get_foreground(2, 0), Some(sadconsole::core::Color::RED));
}
