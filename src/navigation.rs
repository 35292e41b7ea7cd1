//! Navigation State Machine
//!
//! Tracks the current mode, environment and selected item, plus a stack
//! of drill-down views. The action list is derived from the registry on
//! every call and never cached, so registry edits show up immediately.
//!
//! Mode, environment and item movement all clamp at both ends of their
//! orders; nothing wraps around.

use crate::error::{Error, Result};
use crate::models::{Action, Environment, Mode};
use crate::registry::CommandRegistry;

/// Drill-down view on top of the main action grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Full output of one execution record
    Detail(String),
}

/// Navigation state: `(mode, environment, item_index)` plus a view stack
#[derive(Debug, Clone)]
pub struct NavigationState {
    environments: Vec<Environment>,
    mode_index: usize,
    env_index: usize,
    item_index: usize,
    views: Vec<View>,
}

impl NavigationState {
    /// Start at the first mode and first environment
    pub fn new(environments: Vec<Environment>) -> Self {
        let environments = if environments.is_empty() {
            vec![Environment::local()]
        } else {
            environments
        };
        Self {
            environments,
            mode_index: 0,
            env_index: 0,
            item_index: 0,
            views: Vec::new(),
        }
    }

    /// Navigation over the registry's environments
    pub fn for_registry(registry: &CommandRegistry) -> Self {
        Self::new(registry.environments().to_vec())
    }

    pub fn mode(&self) -> Mode {
        Mode::ALL[self.mode_index]
    }

    pub fn environment(&self) -> &Environment {
        &self.environments[self.env_index]
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// Stored item index; may exceed the current list until clamped
    pub fn item_index(&self) -> usize {
        self.item_index
    }

    // === Mode / environment ===

    pub fn next_mode(&mut self) {
        self.mode_index = (self.mode_index + 1).min(Mode::ALL.len() - 1);
    }

    pub fn prev_mode(&mut self) {
        self.mode_index = self.mode_index.saturating_sub(1);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode_index = mode.index();
    }

    pub fn next_environment(&mut self) {
        self.env_index = (self.env_index + 1).min(self.environments.len().saturating_sub(1));
    }

    pub fn prev_environment(&mut self) {
        self.env_index = self.env_index.saturating_sub(1);
    }

    /// Jump to a named environment
    pub fn set_environment(&mut self, name: &str) -> Result<()> {
        let index = self
            .environments
            .iter()
            .position(|e| e.name() == name)
            .ok_or_else(|| Error::UnknownEnvironment {
                environment: name.to_string(),
            })?;
        self.env_index = index;
        Ok(())
    }

    // === Items ===

    /// Move selection up; no-op at the top
    pub fn move_up(&mut self, list_len: usize) {
        self.clamp_to(list_len);
        self.item_index = self.item_index.saturating_sub(1);
    }

    /// Move selection down; no-op at the bottom
    pub fn move_down(&mut self, list_len: usize) {
        self.clamp_to(list_len);
        if self.item_index + 1 < list_len {
            self.item_index += 1;
        }
    }

    /// Set the raw index; it is clamped when the list is next derived
    pub fn set_item_index(&mut self, index: usize) {
        self.item_index = index;
    }

    /// Clamp the stored index into `[0, list_len - 1]` and return it
    pub fn clamp_to(&mut self, list_len: usize) -> usize {
        if list_len == 0 {
            self.item_index = 0;
        } else if self.item_index >= list_len {
            self.item_index = list_len - 1;
        }
        self.item_index
    }

    /// Derived action list for the current pair; never empty
    pub fn current_actions(&self, registry: &CommandRegistry) -> Vec<Action> {
        let actions = registry.actions_for(self.mode(), self.environment());
        if actions.is_empty() {
            vec![Action::help()]
        } else {
            actions
        }
    }

    /// Clamp against the derived list and return the highlighted action
    pub fn selected_action(&mut self, registry: &CommandRegistry) -> Action {
        let mut actions = self.current_actions(registry);
        let index = self.clamp_to(actions.len());
        actions.swap_remove(index)
    }

    // === Views ===

    pub fn push_view(&mut self, view: View) {
        self.views.push(view);
    }

    /// Pop one drill-down level; false if already at the top
    pub fn pop_view(&mut self) -> bool {
        self.views.pop().is_some()
    }

    pub fn current_view(&self) -> Option<&View> {
        self.views.last()
    }

    /// Back to the initial mode, environment and item
    pub fn reset(&mut self) {
        self.mode_index = 0;
        self.env_index = 0;
        self.item_index = 0;
        self.views.clear();
    }
}
