//! Shared map context handed to every tool handler.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::map::{FogSurface, MapImage, MapState, MapStateTarget, PointerPosition};
use crate::transform::{MapTransform, Viewport};

/// Whether map panning may claim the current drag.
///
/// A tool that needs the drag gesture for itself calls [`DragLock::deny`] on
/// pointer-down and [`DragLock::allow`] on pointer-up. The dispatcher resets the
/// lock whenever a tool is deactivated.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct DragLock {
    allowed: bool,
}

impl Default for DragLock {
    fn default() -> Self {
        Self { allowed: true }
    }
}

impl DragLock {
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn allow(&mut self) {
        self.allowed = true;
    }

    pub fn deny(&mut self) {
        self.allowed = false;
    }

    /// Allow panning again. Returns true if the lock had been left denied.
    pub fn reset(&mut self) -> bool {
        let leaked = !self.allowed;
        self.allowed = true;
        leaked
    }
}

/// Modifier keys tools may switch behavior on
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierState {
    pub alt: bool,
}

/// Live view of the map view's shared state for one handler call.
///
/// Map placement is read-only here; move the map with [`MapToolContext::set_map_state`],
/// which starts an animation rather than writing the value.
pub struct MapToolContext<'a> {
    pub map_image: &'a MapImage,
    pub fog: &'a mut FogSurface,
    pub viewport: &'a Viewport,
    pub drag_lock: &'a mut DragLock,
    pub is_alt_pressed: bool,
    map_state: &'a mut MapState,
    pointer_position: Vec3,
}

impl<'a> MapToolContext<'a> {
    pub fn new(
        map_image: &'a MapImage,
        fog: &'a mut FogSurface,
        map_state: &'a mut MapState,
        viewport: &'a Viewport,
        drag_lock: &'a mut DragLock,
        is_alt_pressed: bool,
        pointer_position: Vec3,
    ) -> Self {
        Self {
            map_image,
            fog,
            viewport,
            drag_lock,
            is_alt_pressed,
            map_state,
            pointer_position,
        }
    }

    pub fn map_state(&self) -> &MapState {
        self.map_state
    }

    /// Animate the map toward a new placement. The current placement is unchanged
    /// until the animation advances.
    pub fn set_map_state(&mut self, target: impl Into<MapStateTarget>) {
        self.map_state.set_target(target.into());
    }

    /// Transforms for the map as it is on screen right now
    pub fn transform(&self) -> MapTransform {
        MapTransform::new(
            *self.viewport,
            self.map_state.placement(),
            self.map_image.size_f32(),
        )
    }

    /// Smoothed pointer position in scene space
    pub fn pointer_position(&self) -> Vec3 {
        self.pointer_position
    }

    pub fn is_drag_allowed(&self) -> bool {
        self.drag_lock.is_allowed()
    }
}

/// Read-only view of the same state, handed to render slots
pub struct MapToolView<'a> {
    pub map_image: &'a MapImage,
    pub fog: &'a FogSurface,
    pub viewport: &'a Viewport,
    pub drag_lock: &'a DragLock,
    pub is_alt_pressed: bool,
    map_state: &'a MapState,
    pointer_position: Vec3,
}

impl<'a> MapToolView<'a> {
    pub fn new(
        map_image: &'a MapImage,
        fog: &'a FogSurface,
        map_state: &'a MapState,
        viewport: &'a Viewport,
        drag_lock: &'a DragLock,
        is_alt_pressed: bool,
        pointer_position: Vec3,
    ) -> Self {
        Self {
            map_image,
            fog,
            viewport,
            drag_lock,
            is_alt_pressed,
            map_state,
            pointer_position,
        }
    }

    pub fn map_state(&self) -> &MapState {
        self.map_state
    }

    pub fn transform(&self) -> MapTransform {
        MapTransform::new(
            *self.viewport,
            self.map_state.placement(),
            self.map_image.size_f32(),
        )
    }

    pub fn pointer_position(&self) -> Vec3 {
        self.pointer_position
    }

    pub fn is_drag_allowed(&self) -> bool {
        self.drag_lock.is_allowed()
    }
}

impl MapToolContext<'_> {
    /// Borrow this context read-only
    pub fn view(&self) -> MapToolView<'_> {
        MapToolView::new(
            self.map_image,
            &*self.fog,
            &*self.map_state,
            self.viewport,
            &*self.drag_lock,
            self.is_alt_pressed,
            self.pointer_position,
        )
    }
}

/// Host resources a [`MapToolContext`] is built from.
///
/// Handlers write through a context built with change detection bypassed; the
/// resources they actually modified are marked changed afterwards.
#[derive(SystemParam)]
pub struct MapToolParams<'w> {
    map_image: Res<'w, MapImage>,
    fog: ResMut<'w, FogSurface>,
    map_state: ResMut<'w, MapState>,
    viewport: Res<'w, Viewport>,
    drag_lock: ResMut<'w, DragLock>,
    modifiers: Res<'w, ModifierState>,
    pointer: Res<'w, PointerPosition>,
}

impl MapToolParams<'_> {
    /// Run `f` with a mutable context
    pub fn with_context<R>(&mut self, f: impl FnOnce(&mut MapToolContext<'_>) -> R) -> R {
        let target = self.map_state.target();
        let drag_allowed = self.drag_lock.is_allowed();
        let fog_dirty = self.fog.is_dirty();

        let result = {
            let mut ctx = MapToolContext::new(
                &self.map_image,
                self.fog.bypass_change_detection(),
                self.map_state.bypass_change_detection(),
                &self.viewport,
                self.drag_lock.bypass_change_detection(),
                self.modifiers.alt,
                self.pointer.current(),
            );
            f(&mut ctx)
        };

        if self.map_state.target() != target {
            self.map_state.set_changed();
        }
        if self.drag_lock.is_allowed() != drag_allowed {
            self.drag_lock.set_changed();
        }
        if self.fog.is_dirty() && !fog_dirty {
            self.fog.set_changed();
        }
        result
    }
}

/// Read-only host resources a [`MapToolView`] is built from
#[derive(SystemParam)]
pub struct MapToolViewParams<'w> {
    map_image: Res<'w, MapImage>,
    fog: Res<'w, FogSurface>,
    map_state: Res<'w, MapState>,
    viewport: Res<'w, Viewport>,
    drag_lock: Res<'w, DragLock>,
    modifiers: Res<'w, ModifierState>,
    pointer: Res<'w, PointerPosition>,
}

impl MapToolViewParams<'_> {
    pub fn view(&self) -> MapToolView<'_> {
        MapToolView::new(
            &self.map_image,
            &self.fog,
            &self.map_state,
            &self.viewport,
            &self.drag_lock,
            self.modifiers.alt,
            self.pointer.current(),
        )
    }
}
