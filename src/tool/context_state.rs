use std::any::{Any, type_name};
use std::collections::HashMap;

use bevy::prelude::*;

use super::descriptor::ErasedState;
use super::error::ToolError;

/// Context state per tool id, supplied by whoever configures the tool.
///
/// Values are stored erased; only the tool that declared the type reads them back.
/// This resource is observed normally, so systems can react when a tool's
/// configuration changes.
#[derive(Resource, Default)]
pub struct ToolContextStates {
    values: HashMap<&'static str, ErasedState>,
    type_names: HashMap<&'static str, &'static str>,
}

impl ToolContextStates {
    pub(crate) fn insert_default(
        &mut self,
        id: &'static str,
        value: ErasedState,
        type_name: &'static str,
    ) {
        self.values.insert(id, value);
        self.type_names.insert(id, type_name);
    }

    /// Replace the context state of a registered tool
    pub fn set<C: Send + Sync + 'static>(&mut self, id: &str, value: C) -> Result<(), ToolError> {
        let slot = self
            .values
            .get_mut(id)
            .ok_or_else(|| ToolError::UnknownTool(id.to_string()))?;
        if !slot.is::<C>() {
            return Err(self.mismatch(id));
        }
        *slot = Box::new(value);
        Ok(())
    }

    /// Edit the context state of a registered tool in place
    pub fn update<C: Send + Sync + 'static>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut C),
    ) -> Result<(), ToolError> {
        let expected = self.expected_type_name(id);
        let slot = self
            .values
            .get_mut(id)
            .ok_or_else(|| ToolError::UnknownTool(id.to_string()))?;
        let value = slot
            .downcast_mut::<C>()
            .ok_or_else(|| ToolError::ContextTypeMismatch {
                id: id.to_string(),
                expected,
            })?;
        f(value);
        Ok(())
    }

    pub fn get<C: 'static>(&self, id: &str) -> Option<&C> {
        self.values.get(id)?.downcast_ref::<C>()
    }

    pub(crate) fn get_erased(&self, id: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.values.get(id).map(|value| value.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    fn expected_type_name(&self, id: &str) -> &'static str {
        self.type_names
            .get(id)
            .copied()
            .unwrap_or_else(type_name::<()>)
    }

    fn mismatch(&self, id: &str) -> ToolError {
        ToolError::ContextTypeMismatch {
            id: id.to_string(),
            expected: self.expected_type_name(id),
        }
    }
}
