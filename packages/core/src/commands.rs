//! # Command bus
//!
//! Named actions, registered by id. Key bindings, menus and plugins all go
//! through [`CommandRegistry::execute`], which brackets every run with
//! `command-executing` / `command-executed` events so other features can
//! react to actions without knowing who triggered them.

use crate::errors::{GridError, GridResult};
use crate::events::GridEvent;
use datagrid_state::{EventEmitter, ObservableMap};
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde_json::Value;
use std::collections::HashSet;
use std::future::Future;
use std::rc::Rc;
use tracing::{debug, info};

pub type CommandHandler = Rc<dyn Fn(Option<Value>) -> LocalBoxFuture<'static, GridResult<()>>>;

#[derive(Clone)]
pub struct Command {
    pub id: String,
    /// Owner tag, used by [`CommandRegistry::unregister_all`]
    pub source: String,
    pub kind: Option<String>,
    pub label: Option<String>,
    handler: CommandHandler,
}

impl Command {
    pub fn new<F, Fut>(id: impl Into<String>, source: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Option<Value>) -> Fut + 'static,
        Fut: Future<Output = GridResult<()>> + 'static,
    {
        Self {
            id: id.into(),
            source: source.into(),
            kind: None,
            label: None,
            handler: Rc::new(move |payload| handler(payload).boxed_local()),
        }
    }

    /// Command with a synchronous handler
    pub fn sync(
        id: impl Into<String>,
        source: impl Into<String>,
        handler: impl Fn(Option<Value>) -> GridResult<()> + 'static,
    ) -> Self {
        Self::new(id, source, move |payload| future::ready(handler(payload)))
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .finish()
    }
}

#[derive(Clone)]
pub struct CommandRegistry {
    commands: ObservableMap<String, Rc<Command>>,
    events: EventEmitter<GridEvent>,
}

impl CommandRegistry {
    pub fn new(events: EventEmitter<GridEvent>) -> Self {
        Self {
            commands: ObservableMap::new(),
            events,
        }
    }

    /// Register a set of commands. Nothing is registered if any id is taken.
    pub fn register(&self, commands: Vec<Command>) -> GridResult<()> {
        let mut seen = HashSet::new();
        for command in &commands {
            if self.commands.contains_key(&command.id) || !seen.insert(command.id.as_str()) {
                return Err(GridError::DuplicateCommand(command.id.clone()));
            }
        }

        let count = commands.len();
        for command in commands {
            self.commands.add_item(command.id.clone(), Rc::new(command))?;
        }
        info!(commands = count, "Registered commands");
        Ok(())
    }

    pub fn unregister(&self, id: &str) -> GridResult<()> {
        self.commands
            .remove_item(&id.to_string())
            .map_err(|_| GridError::CommandNotFound(id.to_string()))?;
        debug!(command = id, "Unregistered command");
        Ok(())
    }

    /// Remove every command registered under `source`
    pub fn unregister_all(&self, source: &str) -> usize {
        let owned: Vec<String> = self
            .commands
            .entries()
            .into_iter()
            .filter(|(_, command)| command.source == source)
            .map(|(id, _)| id)
            .collect();

        for id in &owned {
            // Listed above, so the key is present
            let _ = self.commands.remove_item(id);
        }
        if !owned.is_empty() {
            info!(source, commands = owned.len(), "Unregistered commands");
        }
        owned.len()
    }

    pub fn get(&self, id: &str) -> Option<Rc<Command>> {
        self.commands.get(&id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.contains_key(&id.to_string())
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> Vec<String> {
        self.commands.keys()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Run a command, bracketed by lifecycle events
    pub async fn execute(&self, id: &str, payload: Option<Value>) -> GridResult<bool> {
        let command = self
            .get(id)
            .ok_or_else(|| GridError::CommandNotFound(id.to_string()))?;

        self.events.emit(&GridEvent::CommandExecuting { id: id.to_string() });
        debug!(command = id, "Executing command");
        (command.handler)(payload).await?;
        self.events.emit(&GridEvent::CommandExecuted { id: id.to_string() });
        Ok(true)
    }

    pub fn events(&self) -> &EventEmitter<GridEvent> {
        &self.events
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.ids())
            .finish()
    }
}
