//! The command registry: a name-keyed table of validated descriptors, built
//! once at startup and read-only afterwards.

use crate::category::Category;
use crate::descriptor::{CommandBuilder, CommandDescriptor, DefinitionError};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Most commands a bot may register.
pub const MAX_COMMANDS: usize = 100;

/// Errors raised while loading commands.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A command with this name was already loaded.
    #[error("Command '{name}' already exists")]
    Duplicate {
        /// The duplicated name.
        name: String,
    },

    /// More enabled commands than the platform allows.
    #[error("Cannot register more than {limit} commands")]
    CapacityExceeded {
        /// The limit.
        limit: usize,
    },

    /// The definition failed validation.
    #[error(transparent)]
    InvalidDefinition(#[from] DefinitionError),
}

/// Summary of a [`CommandRegistry::load_all`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Commands now routable.
    pub loaded: Vec<String>,
    /// Commands skipped because they are disabled.
    pub disabled: Vec<String>,
    /// Definitions rejected, with the reason.
    pub rejected: Vec<(String, RegistryError)>,
}

impl LoadReport {
    /// Whether any definition was rejected.
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Table of enabled commands keyed by name.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandDescriptor>,
    seen: HashSet<String>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor.
    ///
    /// Disabled descriptors are accepted but not routable; their names still
    /// count towards duplicate detection. Returns whether the command is routable.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<bool, RegistryError> {
        let name = descriptor.name().to_string();
        if self.seen.contains(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        if descriptor.is_enabled() && self.commands.len() >= MAX_COMMANDS {
            return Err(RegistryError::CapacityExceeded {
                limit: MAX_COMMANDS,
            });
        }

        self.seen.insert(name.clone());
        if !descriptor.is_enabled() {
            debug!("Skipping disabled command '{}'", name);
            return Ok(false);
        }
        self.commands.insert(name, descriptor);
        Ok(true)
    }

    /// Builds and registers every definition.
    ///
    /// Invalid or duplicate definitions are logged and skipped; exceeding
    /// [`MAX_COMMANDS`] aborts the load.
    pub fn load_all(
        &mut self,
        builders: impl IntoIterator<Item = CommandBuilder>,
    ) -> Result<LoadReport, RegistryError> {
        let mut report = LoadReport::default();

        for builder in builders {
            let name = builder.name().to_string();
            let result = builder
                .build()
                .map_err(RegistryError::from)
                .and_then(|descriptor| self.register(descriptor));

            match result {
                Ok(true) => {
                    debug!("Loaded command '{}'", name);
                    report.loaded.push(name);
                }
                Ok(false) => report.disabled.push(name),
                Err(err @ RegistryError::CapacityExceeded { .. }) => {
                    error!("Failed to load command '{}': {}", name, err);
                    return Err(err);
                }
                Err(err) => {
                    warn!("Failed to load command '{}': {}", name, err);
                    report.rejected.push((name, err));
                }
            }
        }

        info!(
            "Loaded {} commands ({} disabled, {} rejected)",
            report.loaded.len(),
            report.disabled.len(),
            report.rejected.len()
        );
        Ok(report)
    }

    /// Looks up an enabled command by name.
    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    /// Number of enabled commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is enabled.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Enabled commands in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.values()
    }

    /// Enabled commands of a category, sorted by name.
    pub fn in_category(&self, category: Category) -> Vec<&CommandDescriptor> {
        let mut commands: Vec<&CommandDescriptor> = self
            .commands
            .values()
            .filter(|descriptor| descriptor.category() == category)
            .collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{CommandError, Context};
    use crate::CommandBehavior;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl CommandBehavior for Noop {
        async fn run(&self, _ctx: Context<'_>) -> Result<(), CommandError> {
            Ok(())
        }
    }

    fn command(name: &str, category: Category) -> CommandBuilder {
        CommandBuilder::new(name)
            .description("A command")
            .category(category)
            .enabled(true)
            .behavior(Noop)
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CommandRegistry::new();
        assert!(registry
            .register(command("ping", Category::Utility).build().unwrap())
            .unwrap());
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("ping").is_some());
        assert!(registry.lookup("pong").is_none());
    }

    #[test]
    fn test_duplicate_rejected_and_first_kept() {
        let mut registry = CommandRegistry::new();
        registry
            .register(command("ping", Category::Utility).build().unwrap())
            .unwrap();
        let err = registry
            .register(command("ping", Category::Admin).build().unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::Duplicate {
                name: "ping".to_string()
            }
        );
        assert_eq!(
            registry.lookup("ping").map(CommandDescriptor::category),
            Some(Category::Utility)
        );
    }

    #[test]
    fn test_disabled_names_still_reserved() {
        let mut registry = CommandRegistry::new();
        let disabled = command("ban", Category::Admin).enabled(false).build().unwrap();
        assert!(!registry.register(disabled).unwrap());
        assert!(registry.lookup("ban").is_none());

        let err = registry
            .register(command("ban", Category::Admin).build().unwrap())
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { .. }));
    }

    #[test]
    fn test_in_category_is_sorted() {
        let mut registry = CommandRegistry::new();
        registry
            .load_all(vec![
                command("zeta", Category::Utility),
                command("alpha", Category::Utility),
                command("kick", Category::Admin),
            ])
            .unwrap();
        let names: Vec<&str> = registry
            .in_category(Category::Utility)
            .iter()
            .map(|d| d.name())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(registry.in_category(Category::None).is_empty());
    }

    #[test]
    fn test_load_all_reports_rejections() {
        let mut registry = CommandRegistry::new();
        let report = registry
            .load_all(vec![
                command("ping", Category::Utility),
                command("Bad Name", Category::Utility),
                command("ping", Category::Utility),
                command("ban", Category::Admin).enabled(false),
            ])
            .unwrap();
        assert_eq!(report.loaded, vec!["ping"]);
        assert_eq!(report.disabled, vec!["ban"]);
        assert_eq!(report.rejected.len(), 2);
        assert!(report.has_rejections());
        assert_eq!(registry.len(), 1);
    }
}
