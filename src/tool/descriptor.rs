//! Declarative description of a map tool.
//!
//! A tool is a [`ToolDescriptor`] record: an id, a factory for its local state,
//! an optional render slot and any subset of input handlers. The dispatcher calls
//! whichever handlers are present and skips the rest.
//!
//! `L` is the tool's local state, created fresh on every activation and dropped on
//! deactivation. It is scratch storage outside change detection; mutating it never
//! causes a redraw by itself.
//!
//! `C` is the tool's context state, configuration injected from outside (brush
//! size, units). It lives in [`ToolContextStates`](super::ToolContextStates) and
//! outlives activations.

use std::any::{Any, type_name};
use std::ops::{Deref, DerefMut};

use bevy::prelude::*;

use super::context::{MapToolContext, MapToolView};
use super::dispatcher::DispatchOutcome;
use super::events::{DragEvent, DragResponse, PointerEvent, ToolInput};
use super::overlay::ToolOverlay;

pub type PointerHandler<L, C> =
    fn(&PointerEvent, &mut MapToolContext<'_>, &mut LocalState<L>, &C);

pub type DragHandler<L, C> =
    fn(&DragEvent, &mut MapToolContext<'_>, &mut LocalState<L>, &C) -> DragResponse;

pub type RenderFn<L, C> = fn(&C, &LocalState<L>, &MapToolView<'_>) -> Option<ToolOverlay>;

/// A tool's per-activation state with get/set access
#[derive(Debug, Default)]
pub struct LocalState<L> {
    value: L,
}

impl<L> LocalState<L> {
    pub fn new(value: L) -> Self {
        Self { value }
    }

    pub fn get(&self) -> &L {
        &self.value
    }

    pub fn get_mut(&mut self) -> &mut L {
        &mut self.value
    }

    pub fn set(&mut self, value: L) {
        self.value = value;
    }

    pub fn update(&mut self, f: impl FnOnce(&mut L)) {
        f(&mut self.value);
    }

    /// Put a new value in and hand back the old one
    pub fn replace(&mut self, value: L) -> L {
        std::mem::replace(&mut self.value, value)
    }

    pub fn into_inner(self) -> L {
        self.value
    }
}

impl<L> Deref for LocalState<L> {
    type Target = L;

    fn deref(&self) -> &L {
        &self.value
    }
}

impl<L> DerefMut for LocalState<L> {
    fn deref_mut(&mut self) -> &mut L {
        &mut self.value
    }
}

pub struct ToolDescriptor<L, C> {
    pub id: &'static str,
    /// Name shown in tool pickers
    pub label: &'static str,
    /// Key that selects this tool in the map view
    pub shortcut: Option<KeyCode>,
    pub create_local_state: fn() -> L,
    pub render: Option<RenderFn<L, C>>,
    pub on_pointer_down: Option<PointerHandler<L, C>>,
    pub on_pointer_up: Option<PointerHandler<L, C>>,
    pub on_pointer_move: Option<PointerHandler<L, C>>,
    pub on_drag: Option<DragHandler<L, C>>,
    pub on_click: Option<PointerHandler<L, C>>,
}

impl<L, C> ToolDescriptor<L, C> {
    pub fn new(id: &'static str, create_local_state: fn() -> L) -> Self {
        Self {
            id,
            label: id,
            shortcut: None,
            create_local_state,
            render: None,
            on_pointer_down: None,
            on_pointer_up: None,
            on_pointer_move: None,
            on_drag: None,
            on_click: None,
        }
    }

    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn with_shortcut(mut self, key: KeyCode) -> Self {
        self.shortcut = Some(key);
        self
    }

    pub fn with_render(mut self, render: RenderFn<L, C>) -> Self {
        self.render = Some(render);
        self
    }

    pub fn on_pointer_down(mut self, handler: PointerHandler<L, C>) -> Self {
        self.on_pointer_down = Some(handler);
        self
    }

    pub fn on_pointer_up(mut self, handler: PointerHandler<L, C>) -> Self {
        self.on_pointer_up = Some(handler);
        self
    }

    pub fn on_pointer_move(mut self, handler: PointerHandler<L, C>) -> Self {
        self.on_pointer_move = Some(handler);
        self
    }

    pub fn on_drag(mut self, handler: DragHandler<L, C>) -> Self {
        self.on_drag = Some(handler);
        self
    }

    pub fn on_click(mut self, handler: PointerHandler<L, C>) -> Self {
        self.on_click = Some(handler);
        self
    }
}

pub(crate) type ErasedState = Box<dyn Any + Send + Sync>;

/// Object-safe face of a descriptor, so tools with different `L`/`C` share one registry
pub(crate) trait ErasedTool: Send + Sync {
    fn id(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn shortcut(&self) -> Option<KeyCode>;
    fn create_local_state(&self) -> ErasedState;
    fn default_context_state(&self) -> ErasedState;
    fn context_type_name(&self) -> &'static str;
    fn dispatch(
        &self,
        input: &ToolInput,
        ctx: &mut MapToolContext<'_>,
        local: &mut (dyn Any + Send + Sync),
        context: Option<&(dyn Any + Send + Sync)>,
    ) -> DispatchOutcome;
    fn render(
        &self,
        ctx: &MapToolView<'_>,
        local: &(dyn Any + Send + Sync),
        context: Option<&(dyn Any + Send + Sync)>,
    ) -> Option<ToolOverlay>;
}

fn with_context<C: Default + 'static, R>(
    id: &'static str,
    context: Option<&(dyn Any + Send + Sync)>,
    f: impl FnOnce(&C) -> R,
) -> R {
    match context.and_then(|c| c.downcast_ref::<C>()) {
        Some(context_state) => f(context_state),
        None => {
            debug!("No context state for tool `{}`, using default", id);
            f(&C::default())
        }
    }
}

fn call_pointer<L, C: Default + 'static>(
    id: &'static str,
    handler: Option<PointerHandler<L, C>>,
    event: &PointerEvent,
    ctx: &mut MapToolContext<'_>,
    local: &mut LocalState<L>,
    context: Option<&(dyn Any + Send + Sync)>,
) -> DispatchOutcome {
    let Some(handler) = handler else {
        return DispatchOutcome::Ignored;
    };
    with_context(id, context, |c: &C| handler(event, ctx, local, c));
    DispatchOutcome::Delivered
}

impl<L, C> ErasedTool for ToolDescriptor<L, C>
where
    L: Send + Sync + 'static,
    C: Default + Send + Sync + 'static,
{
    fn id(&self) -> &'static str {
        self.id
    }

    fn label(&self) -> &'static str {
        self.label
    }

    fn shortcut(&self) -> Option<KeyCode> {
        self.shortcut
    }

    fn create_local_state(&self) -> ErasedState {
        Box::new(LocalState::new((self.create_local_state)()))
    }

    fn default_context_state(&self) -> ErasedState {
        Box::new(C::default())
    }

    fn context_type_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn dispatch(
        &self,
        input: &ToolInput,
        ctx: &mut MapToolContext<'_>,
        local: &mut (dyn Any + Send + Sync),
        context: Option<&(dyn Any + Send + Sync)>,
    ) -> DispatchOutcome {
        let Some(local) = local.downcast_mut::<LocalState<L>>() else {
            error!("Local state of tool `{}` has the wrong type", self.id);
            return DispatchOutcome::Ignored;
        };

        let id = self.id;
        match input {
            ToolInput::PointerDown(event) => {
                call_pointer(id, self.on_pointer_down, event, ctx, local, context)
            }
            ToolInput::PointerUp(event) => {
                call_pointer(id, self.on_pointer_up, event, ctx, local, context)
            }
            ToolInput::PointerMove(event) => {
                call_pointer(id, self.on_pointer_move, event, ctx, local, context)
            }
            ToolInput::Click(event) => call_pointer(id, self.on_click, event, ctx, local, context),
            ToolInput::Drag(event) => match self.on_drag {
                Some(handler) => DispatchOutcome::Drag(with_context(id, context, |c: &C| {
                    handler(event, ctx, local, c)
                })),
                None => DispatchOutcome::Ignored,
            },
        }
    }

    fn render(
        &self,
        ctx: &MapToolView<'_>,
        local: &(dyn Any + Send + Sync),
        context: Option<&(dyn Any + Send + Sync)>,
    ) -> Option<ToolOverlay> {
        let render = self.render?;
        let local = local.downcast_ref::<LocalState<L>>()?;
        with_context(self.id, context, |c: &C| render(c, local, ctx))
    }
}
