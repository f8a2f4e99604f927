//! Screen objects and the scene arena
//!
//! Objects live in a [`Scene`] and refer to each other by [`ObjectId`]. Only
//! the scene's structural methods change parent/child links, so a child's
//! parent and the parent's child list always agree, and every structural or
//! position change recomputes `calculated_position` for the whole subtree.

use std::fmt;

use rand::RngCore;

use crate::core::Point;
use crate::parser::StringParser;

use super::console::Console;
use super::renderer::Renderer;
use super::SceneError;

/// Handle to an object in a [`Scene`]
///
/// Handles of removed objects never match a later object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

/// Per-frame state handed down the update and draw recursion
pub struct FrameContext<'a> {
    /// Seconds since the previous frame
    pub elapsed: f64,
    pub rng: &'a mut dyn RngCore,
    pub parser: &'a StringParser,
}

impl fmt::Debug for FrameContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameContext")
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

/// Behaviour attached to a screen object
///
/// Components run before the object's console and children, in the order
/// they were added. While a component runs it is detached from its object,
/// so it may freely edit the scene.
pub trait Component {
    fn update(&mut self, _scene: &mut Scene, _id: ObjectId, _context: &mut FrameContext<'_>) {}

    fn draw(&mut self, _scene: &mut Scene, _id: ObjectId, _context: &mut FrameContext<'_>) {}
}

/// A node of the scene graph
#[derive(Default)]
pub struct ScreenObject {
    position: Point,
    calculated_position: Point,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    pub name: String,
    /// Skipped by `draw` (with its children) when false
    pub is_visible: bool,
    /// Skipped by `update` (with its children) when true
    pub is_paused: bool,
    pub console: Option<Console>,
    components: Vec<Box<dyn Component>>,
}

impl fmt::Debug for ScreenObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenObject")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("calculated_position", &self.calculated_position)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("is_visible", &self.is_visible)
            .field("is_paused", &self.is_paused)
            .field("console", &self.console.is_some())
            .field("components", &self.components.len())
            .finish()
    }
}

impl ScreenObject {
    pub fn new() -> Self {
        Self {
            is_visible: true,
            ..Self::default()
        }
    }

    pub fn with_console(console: Console) -> Self {
        Self {
            console: Some(console),
            ..Self::new()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Starting position, for objects not yet in a scene
    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self.calculated_position = position;
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Own position plus every ancestor's
    pub fn calculated_position(&self) -> Point {
        self.calculated_position
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    pub fn add_component(&mut self, component: impl Component + 'static) {
        self.components.push(Box::new(component));
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    object: Option<ScreenObject>,
}

/// Arena owning every screen object
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a parentless object
    pub fn insert(&mut self, mut object: ScreenObject) -> ObjectId {
        object.parent = None;
        object.children.clear();
        object.calculated_position = object.position;
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                ObjectId {
                    index,
                    generation: slot.generation,
                }
            },
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    object: Some(object),
                });
                ObjectId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            },
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ObjectId) -> Option<&ScreenObject> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut ScreenObject> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_mut())
    }

    fn object(&self, id: ObjectId) -> Result<&ScreenObject, SceneError> {
        self.get(id).ok_or(SceneError::UnknownObject(id))
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut ScreenObject, SceneError> {
        self.get_mut(id).ok_or(SceneError::UnknownObject(id))
    }

    pub fn console(&self, id: ObjectId) -> Option<&Console> {
        self.get(id).and_then(|object| object.console.as_ref())
    }

    pub fn console_mut(&mut self, id: ObjectId) -> Option<&mut Console> {
        self.get_mut(id).and_then(|object| object.console.as_mut())
    }

    /// Every console in the arena, attached or not
    pub fn consoles_mut(&mut self) -> impl Iterator<Item = &mut Console> + '_ {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.object.as_mut())
            .filter_map(|object| object.console.as_mut())
    }

    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.get(id).and_then(|object| object.parent)
    }

    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.get(id).map_or(&[], |object| object.children.as_slice())
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Append `child` to `parent`, detaching it from any previous parent
    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) -> Result<(), SceneError> {
        let index = self.object(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Insert `child` at `index` (clamped) among `parent`'s children
    pub fn insert_child(&mut self, parent: ObjectId, index: usize, child: ObjectId) -> Result<(), SceneError> {
        self.object(parent)?;
        self.object(child)?;
        if self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }
        self.detach(child)?;
        let children = &mut self.object_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.object_mut(child)?.parent = Some(parent);
        tracing::trace!(?parent, ?child, index, "attached screen object");
        self.recompute_positions(child);
        Ok(())
    }

    /// Remove `child` from `parent`; false when it wasn't a child of it
    pub fn remove_child(&mut self, parent: ObjectId, child: ObjectId) -> Result<bool, SceneError> {
        self.object(child)?;
        let children = &mut self.object_mut(parent)?.children;
        let Some(position) = children.iter().position(|c| *c == child) else {
            return Ok(false);
        };
        children.remove(position);
        self.object_mut(child)?.parent = None;
        self.recompute_positions(child);
        Ok(true)
    }

    /// Make `id` parentless; a no-op for objects without a parent
    pub fn detach(&mut self, id: ObjectId) -> Result<(), SceneError> {
        match self.object(id)?.parent {
            Some(parent) => self.remove_child(parent, id).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Remove an object and its whole subtree from the scene
    pub fn remove(&mut self, id: ObjectId) -> Result<ScreenObject, SceneError> {
        self.detach(id)?;
        let mut object = self.take(id)?;
        let mut pending = std::mem::take(&mut object.children);
        while let Some(descendant) = pending.pop() {
            if let Ok(removed) = self.take(descendant) {
                pending.extend(removed.children);
            }
        }
        object.calculated_position = object.position;
        Ok(object)
    }

    fn take(&mut self, id: ObjectId) -> Result<ScreenObject, SceneError> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .ok_or(SceneError::UnknownObject(id))?;
        let object = slot.object.take().ok_or(SceneError::UnknownObject(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Ok(object)
    }

    pub fn position(&self, id: ObjectId) -> Option<Point> {
        self.get(id).map(|object| object.position)
    }

    pub fn calculated_position(&self, id: ObjectId) -> Option<Point> {
        self.get(id).map(|object| object.calculated_position)
    }

    /// Move an object relative to its parent
    pub fn set_position(&mut self, id: ObjectId, position: Point) -> Result<(), SceneError> {
        let object = self.object_mut(id)?;
        if object.position != position {
            object.position = position;
            self.recompute_positions(id);
        }
        Ok(())
    }

    fn recompute_positions(&mut self, id: ObjectId) {
        let mut pending = vec![id];
        while let Some(node) = pending.pop() {
            let base = self
                .parent(node)
                .and_then(|parent| self.calculated_position(parent))
                .unwrap_or(Point::ZERO);
            if let Some(object) = self.get_mut(node) {
                object.calculated_position = base + object.position;
                pending.extend(object.children.iter().copied());
            }
        }
    }

    /// Update `id` and its subtree unless paused
    ///
    /// Children are iterated over a copy of the child list, so the
    /// structure may change while the update runs.
    pub fn update(&mut self, id: ObjectId, context: &mut FrameContext<'_>) {
        let Some(object) = self.get(id) else {
            return;
        };
        if object.is_paused {
            return;
        }
        self.run_components(id, context, |component, scene, id, context| {
            component.update(scene, id, context)
        });
        if let Some(console) = self.console_mut(id) {
            console.update(context.elapsed);
        }
        for child in self.children(id).to_vec() {
            self.update(child, context);
        }
    }

    /// Draw `id` and its subtree unless hidden
    pub fn draw(&mut self, id: ObjectId, context: &mut FrameContext<'_>, renderer: &mut dyn Renderer) {
        let Some(object) = self.get(id) else {
            return;
        };
        if !object.is_visible {
            return;
        }
        self.run_components(id, context, |component, scene, id, context| {
            component.draw(scene, id, context)
        });
        if let Some(object) = self.get_mut(id) {
            let position = object.calculated_position;
            if let Some(console) = object.console.as_mut() {
                console.draw(position, renderer);
            }
        }
        for child in self.children(id).to_vec() {
            self.draw(child, context, renderer);
        }
    }

    fn run_components(
        &mut self,
        id: ObjectId,
        context: &mut FrameContext<'_>,
        mut run: impl FnMut(&mut dyn Component, &mut Scene, ObjectId, &mut FrameContext<'_>),
    ) {
        let Some(object) = self.get_mut(id) else {
            return;
        };
        if object.components.is_empty() {
            return;
        }
        let mut components = std::mem::take(&mut object.components);
        for component in components.iter_mut() {
            run(component.as_mut(), self, id, context);
        }
        // The object may have been removed, or gained components meanwhile
        if let Some(object) = self.get_mut(id) {
            components.append(&mut object.components);
            object.components = components;
        }
    }
}
