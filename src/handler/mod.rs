//! Handler Module
//!
//! Maps command names to the behaviour they trigger on the backing service.
//!
//! The registry is built once at startup and is read-only afterwards; the
//! server shares it between sessions behind an `Arc`.

pub mod builtins;

use std::collections::HashMap;
use std::fmt;

use crate::error::{LineCmdError, Result};
use crate::store::BackingService;

/// Name of the introspection command
pub const HELP_COMMAND: &str = "help";

/// Header line of the `help` response
pub const HELP_HEADER: &str = "Available Commands:\n";

/// Handler signature: backing service plus argument tokens in, response out
pub type Handler = Box<dyn Fn(&dyn BackingService, &[String]) -> String + Send + Sync>;

/// Immutable command name → handler mapping
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding the built-in commands plus `help`
    pub fn with_builtins() -> Self {
        let handlers = builtins::BUILTINS
            .iter()
            .map(|&(name, handler)| (name.to_string(), Box::new(handler) as Handler))
            .collect();
        Self::assemble(handlers, true)
    }

    fn assemble(mut handlers: HashMap<String, Handler>, help: bool) -> Self {
        if help {
            let mut names: Vec<String> = handlers.keys().cloned().collect();
            names.push(HELP_COMMAND.to_string());
            names.sort();
            let listing = help_text(&names);

            let help: Handler = Box::new(move |_: &dyn BackingService, _: &[String]| listing.clone());
            handlers.insert(HELP_COMMAND.to_string(), help);
        }
        Self { handlers }
    }

    /// Look up a handler by (normalized) command name
    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered command names, sorted
    pub fn names(&self) -> Vec<&str> {
        sorted_names(self.handlers.keys())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

/// Builder for HandlerRegistry
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: Vec<(String, Handler)>,
    help: bool,
}

impl RegistryBuilder {
    /// Register `handler` under `name` (stored lower-cased)
    pub fn register<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&dyn BackingService, &[String]) -> String + Send + Sync + 'static,
    {
        self.handlers.push((name.to_lowercase(), Box::new(handler)));
        self
    }

    /// Also register `help`, listing every command of the built registry
    pub fn with_help(mut self) -> Self {
        self.help = true;
        self
    }

    /// Fails with `DuplicateCommand` if a name was registered twice
    pub fn build(self) -> Result<HandlerRegistry> {
        let mut handlers = HashMap::with_capacity(self.handlers.len() + 1);

        for (name, handler) in self.handlers {
            if handlers.contains_key(&name) {
                return Err(LineCmdError::DuplicateCommand(name));
            }
            handlers.insert(name, handler);
        }

        if self.help && handlers.contains_key(HELP_COMMAND) {
            return Err(LineCmdError::DuplicateCommand(HELP_COMMAND.to_string()));
        }

        Ok(HandlerRegistry::assemble(handlers, self.help))
    }
}

/// `Available Commands:` followed by one tab-indented name per line
pub fn help_text<S: AsRef<str>>(names: &[S]) -> String {
    let mut text = String::from(HELP_HEADER);
    for name in names {
        text.push('\t');
        text.push_str(name.as_ref());
        text.push('\n');
    }
    text
}

fn sorted_names<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut names: Vec<&str> = keys.map(String::as_str).collect();
    names.sort_unstable();
    names
}
