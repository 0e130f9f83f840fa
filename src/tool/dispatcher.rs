//! Tool registry and the active-tool state machine.
//!
//! Each registered tool is either inactive or active, and at most one is active.
//! Selecting a tool creates its local state, then drops the previous tool's local
//! state; nothing else is torn down. Input goes only to the active tool.
//!
//! Handler panics are caught per call. The faulting tool stays selected and the
//! drag lock is released so the map can still be panned. A tool that keeps
//! faulting is swapped for the fallback tool.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use bevy::prelude::*;

use crate::constants::DEFAULT_MAX_CONSECUTIVE_FAULTS;

use super::context::{DragLock, MapToolContext, MapToolView};
use super::context_state::ToolContextStates;
use super::descriptor::{ErasedState, ErasedTool, ToolDescriptor};
use super::error::ToolError;
use super::events::{DragResponse, ToolInput};
use super::overlay::ToolOverlay;

/// What happened to one input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No tool is selected
    NoActiveTool,
    /// The active tool has no handler for this event
    Ignored,
    Delivered,
    /// Drag handler ran and answered
    Drag(DragResponse),
    /// The handler panicked
    Faulted,
}

impl DispatchOutcome {
    /// Whether the host should skip its own handling of a drag sample
    pub fn drag_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Drag(DragResponse::Handled))
    }
}

/// Record of a change of active tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolTransition {
    pub from: Option<&'static str>,
    pub to: Option<&'static str>,
    /// The drag lock was still denied and had to be reset
    pub drag_lock_leaked: bool,
}

/// Registry entry as seen by tool pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub shortcut: Option<KeyCode>,
}

struct ActiveTool {
    index: usize,
    local: ErasedState,
    consecutive_faults: u32,
}

#[derive(Resource)]
pub struct ToolDispatcher {
    tools: Vec<Box<dyn ErasedTool>>,
    active: Option<ActiveTool>,
    fallback: Option<String>,
    max_consecutive_faults: u32,
    last_fault: Option<ToolError>,
    generation: u64,
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self {
            tools: Vec::new(),
            active: None,
            fallback: None,
            max_consecutive_faults: DEFAULT_MAX_CONSECUTIVE_FAULTS,
            last_fault: None,
            generation: 0,
        }
    }
}

impl ToolDispatcher {
    /// Add a tool to the registry and give it its default context state
    pub fn register<L, C>(
        &mut self,
        descriptor: ToolDescriptor<L, C>,
        context_states: &mut ToolContextStates,
    ) -> Result<(), ToolError>
    where
        L: Send + Sync + 'static,
        C: Default + Send + Sync + 'static,
    {
        if self.index_of(descriptor.id).is_some() {
            return Err(ToolError::DuplicateId(descriptor.id));
        }

        let tool: Box<dyn ErasedTool> = Box::new(descriptor);
        if !context_states.contains(tool.id()) {
            context_states.insert_default(
                tool.id(),
                tool.default_context_state(),
                tool.context_type_name(),
            );
        }
        debug!("Registered map tool `{}`", tool.id());
        self.tools.push(tool);
        Ok(())
    }

    /// Tool to fall back to when the active one keeps faulting
    pub fn set_fallback(&mut self, id: impl Into<String>) {
        self.fallback = Some(id.into());
    }

    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    pub fn set_max_consecutive_faults(&mut self, max: u32) {
        self.max_consecutive_faults = max.max(1);
    }

    /// Registered tools in registration order
    pub fn tools(&self) -> impl Iterator<Item = ToolInfo> + '_ {
        self.tools.iter().map(|tool| ToolInfo {
            id: tool.id(),
            label: tool.label(),
            shortcut: tool.shortcut(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn active_id(&self) -> Option<&'static str> {
        self.active
            .as_ref()
            .map(|active| self.tools[active.index].id())
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_id() == Some(id)
    }

    /// Counter bumped every time the active tool changes
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Most recent handler fault, if any
    pub fn last_fault(&self) -> Option<&ToolError> {
        self.last_fault.as_ref()
    }

    /// Read the active tool's local state, if it is an `L`
    pub fn active_local_state<L: 'static>(&self) -> Option<&L> {
        self.active
            .as_ref()?
            .local
            .downcast_ref::<super::LocalState<L>>()
            .map(|state| state.get())
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.tools.iter().position(|tool| tool.id() == id)
    }

    /// Make `id` the active tool. Selecting the active tool again does nothing.
    pub fn select(
        &mut self,
        id: &str,
        drag_lock: &mut DragLock,
    ) -> Result<Option<ToolTransition>, ToolError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| ToolError::UnknownTool(id.to_string()))?;
        if self.active.as_ref().map(|active| active.index) == Some(index) {
            return Ok(None);
        }

        let local = self.tools[index].create_local_state();
        let from = self.active_id();
        // The previous local state is dropped here, after the new one exists
        self.active = Some(ActiveTool {
            index,
            local,
            consecutive_faults: 0,
        });
        self.generation += 1;

        let to = self.tools[index].id();
        let transition = ToolTransition {
            from,
            to: Some(to),
            drag_lock_leaked: drag_lock.reset(),
        };
        self.log_transition(&transition);
        Ok(Some(transition))
    }

    /// Deactivate the current tool, e.g. when the map view goes away
    pub fn deactivate(&mut self, drag_lock: &mut DragLock) -> Option<ToolTransition> {
        let from = self.active_id()?;
        self.active = None;
        self.generation += 1;

        let transition = ToolTransition {
            from: Some(from),
            to: None,
            drag_lock_leaked: drag_lock.reset(),
        };
        self.log_transition(&transition);
        Some(transition)
    }

    fn log_transition(&self, transition: &ToolTransition) {
        if transition.drag_lock_leaked {
            warn!(
                "Tool `{}` left map panning locked; unlocking",
                transition.from.unwrap_or("<none>")
            );
        }
        info!(
            "Active map tool: {} -> {}",
            transition.from.unwrap_or("<none>"),
            transition.to.unwrap_or("<none>")
        );
    }

    /// Deliver one input event to the active tool
    pub fn dispatch(
        &mut self,
        input: &ToolInput,
        ctx: &mut MapToolContext<'_>,
        context_states: &ToolContextStates,
    ) -> DispatchOutcome {
        let Some(active) = self.active.as_mut() else {
            return DispatchOutcome::NoActiveTool;
        };
        let tool = &self.tools[active.index];
        let id = tool.id();

        let result = catch_unwind(AssertUnwindSafe(|| {
            tool.dispatch(
                input,
                ctx,
                active.local.as_mut(),
                context_states.get_erased(id),
            )
        }));

        match result {
            Ok(outcome) => {
                active.consecutive_faults = 0;
                outcome
            }
            Err(payload) => {
                active.consecutive_faults += 1;
                let faults = active.consecutive_faults;

                let fault = ToolError::HandlerPanicked {
                    id,
                    handler: input.handler_name(),
                    message: panic_message(payload.as_ref()),
                };
                error!("{}", fault);
                self.last_fault = Some(fault);

                // A handler that died mid-gesture cannot restore the lock itself
                ctx.drag_lock.allow();

                if faults >= self.max_consecutive_faults {
                    self.fall_back(id, ctx.drag_lock);
                }
                DispatchOutcome::Faulted
            }
        }
    }

    fn fall_back(&mut self, faulting: &'static str, drag_lock: &mut DragLock) {
        let Some(fallback) = self.fallback.clone() else {
            return;
        };
        if fallback == faulting {
            return;
        }

        warn!(
            "Tool `{}` keeps failing, switching to `{}`",
            faulting, fallback
        );
        if let Err(e) = self.select(&fallback, drag_lock) {
            error!("Could not switch to fallback tool: {}", e);
        }
    }

    /// Overlay of the active tool for this frame
    pub fn render(
        &self,
        ctx: &MapToolView<'_>,
        context_states: &ToolContextStates,
    ) -> Option<ToolOverlay> {
        let active = self.active.as_ref()?;
        let tool = &self.tools[active.index];

        match catch_unwind(AssertUnwindSafe(|| {
            tool.render(ctx, active.local.as_ref(), context_states.get_erased(tool.id()))
        })) {
            Ok(overlay) => overlay,
            Err(payload) => {
                error!(
                    "Tool `{}` panicked while rendering: {}",
                    tool.id(),
                    panic_message(payload.as_ref())
                );
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
