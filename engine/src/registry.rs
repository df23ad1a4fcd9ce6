//! Caller-owned stack of default options.
//!
//! The bottom frame holds the long-lived defaults; `set_options` edits the top
//! frame and `push`/`pop` layer whole frames on top of it. The
//! [`OptionsScope`] guard instead overrides individual keys in place and puts
//! back only those keys when dropped, so unrelated `set_options` edits made
//! while it is alive survive it.

use std::ops::{Deref, DerefMut};

use crate::{
    config::{DimRole, OptionKey, OptionOverrides, OptionValue, Options},
    differencing::{self, FieldKind},
    errors::Result,
    field::Field,
    ops,
};

#[derive(Debug, Clone)]
pub struct OptionsRegistry {
    stack: Vec<Options>,
}

impl Default for OptionsRegistry {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl OptionsRegistry {
    pub fn new(base: Options) -> Self {
        Self { stack: vec![base] }
    }

    /// Options currently in effect.
    pub fn current(&self) -> &Options {
        // The base frame is never popped.
        &self.stack[self.stack.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn get_option(&self, key: OptionKey) -> OptionValue {
        self.current().get(key)
    }

    fn top_mut(&mut self) -> &mut Options {
        let top = self.stack.len() - 1;
        &mut self.stack[top]
    }

    /// Apply `overrides` to the top frame in place.
    pub fn set_options(&mut self, overrides: &OptionOverrides) -> Result<()> {
        let next = self.current().merged(overrides)?;
        *self.top_mut() = next;
        tracing::debug!(target: "spherediff", depth = self.depth(), ?overrides, "options updated");
        Ok(())
    }

    /// Push a frame holding the current options plus `overrides`.
    ///
    /// Returns the depth to hand back to [`OptionsRegistry::restore`]. The
    /// stack is unchanged if the overrides are invalid.
    pub fn push(&mut self, overrides: &OptionOverrides) -> Result<usize> {
        let depth = self.depth();
        let next = self.current().merged(overrides)?;
        self.stack.push(next);
        Ok(depth)
    }

    /// Drop the top frame and return it. The base frame stays.
    pub fn pop(&mut self) -> Option<Options> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Drop every frame above `depth`.
    pub fn restore(&mut self, depth: usize) {
        self.stack.truncate(depth.max(1));
    }

    /// Apply `overrides` until the returned guard is dropped.
    ///
    /// On drop the overridden keys get their previous values back and any
    /// frame pushed inside the scope is discarded. The registry is unchanged
    /// if the overrides are invalid.
    pub fn scope(&mut self, overrides: &OptionOverrides) -> Result<OptionsScope<'_>> {
        let saved = self.current().snapshot(overrides);
        let depth = self.depth();
        self.set_options(overrides)?;
        Ok(OptionsScope {
            registry: self,
            depth,
            saved,
        })
    }

    /// Run `f` with `overrides` applied; prior options come back whatever `f` returns.
    pub fn scoped<T, F>(&mut self, overrides: &OptionOverrides, f: F) -> Result<T>
    where
        F: FnOnce(&mut OptionsRegistry) -> Result<T>,
    {
        let mut scope = self.scope(overrides)?;
        f(&mut *scope)
    }

    /// Current options with per-call overrides layered on top.
    pub fn resolve(&self, call: &OptionOverrides) -> Result<Options> {
        if call.is_empty() {
            return Ok(self.current().clone());
        }
        self.current().merged(call)
    }

    pub fn d_dlon(&self, field: &Field, call: &OptionOverrides) -> Result<Field> {
        differencing::d_dlon(field, &self.resolve(call)?)
    }

    pub fn d_dlat(&self, field: &Field, kind: FieldKind, call: &OptionOverrides) -> Result<Field> {
        differencing::d_dlat(field, kind, &self.resolve(call)?)
    }

    pub fn derivative(
        &self,
        field: &Field,
        role: DimRole,
        kind: FieldKind,
        call: &OptionOverrides,
    ) -> Result<Field> {
        differencing::derivative(field, role, kind, &self.resolve(call)?)
    }

    pub fn gradient(&self, field: &Field, call: &OptionOverrides) -> Result<(Field, Field)> {
        ops::gradient(field, &self.resolve(call)?)
    }

    pub fn divergence(&self, u: &Field, v: &Field, call: &OptionOverrides) -> Result<Field> {
        ops::divergence(u, v, &self.resolve(call)?)
    }
}

/// Guard putting back the keys it overrode, also during unwinding.
pub struct OptionsScope<'a> {
    registry: &'a mut OptionsRegistry,
    depth: usize,
    saved: OptionOverrides,
}

impl Deref for OptionsScope<'_> {
    type Target = OptionsRegistry;

    fn deref(&self) -> &OptionsRegistry {
        self.registry
    }
}

impl DerefMut for OptionsScope<'_> {
    fn deref_mut(&mut self) -> &mut OptionsRegistry {
        self.registry
    }
}

impl Drop for OptionsScope<'_> {
    fn drop(&mut self) {
        self.registry.restore(self.depth);
        self.registry.top_mut().apply(&self.saved);
        tracing::debug!(target: "spherediff", depth = self.depth, saved = ?self.saved, "scope restored");
    }
}
