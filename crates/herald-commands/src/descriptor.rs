//! Command definitions: the unvalidated [`CommandBuilder`] and the validated,
//! immutable [`CommandDescriptor`] it produces.

use crate::category::Category;
use crate::framework::{CommandError, Context};
use crate::invocation::{EmbedView, Invocation};
use crate::permissions::{self, PermissionInfo};
use async_trait::async_trait;
use herald_common::format_duration;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Longest name the platform accepts for commands and options.
pub const MAX_NAME_LENGTH: usize = 32;

/// Longest description the platform accepts for commands and options.
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

/// The work a command performs once every guard has passed.
#[async_trait]
pub trait CommandBehavior: Send + Sync {
    /// Runs the command. The interaction has already been deferred.
    async fn run(&self, ctx: Context<'_>) -> Result<(), CommandError>;
}

/// Stand-in behaviour for disabled commands defined without one.
struct Unimplemented;

#[async_trait]
impl CommandBehavior for Unimplemented {
    async fn run(&self, ctx: Context<'_>) -> Result<(), CommandError> {
        Err(format!(
            "command '{}' has no behaviour",
            ctx.invocation.command_name()
        )
        .into())
    }
}

/// Predicate run against an invocation before the command executes.
pub type Predicate = Arc<dyn Fn(&dyn Invocation) -> bool + Send + Sync>;

/// A pre-execution check and the message shown when it fails.
#[derive(Clone)]
pub struct Validation {
    predicate: Predicate,
    message: String,
}

impl Validation {
    /// Creates a validation from a predicate and its failure message.
    pub fn new<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&dyn Invocation) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            message: message.into(),
        }
    }

    /// Returns whether the invocation passes.
    pub fn check(&self, invocation: &dyn Invocation) -> bool {
        (self.predicate)(invocation)
    }

    /// Message shown when the check fails.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Type of a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    /// A sub-command.
    SubCommand,
    /// A group of sub-commands.
    SubCommandGroup,
    /// Free text.
    String,
    /// Whole number.
    Integer,
    /// True or false.
    Boolean,
    /// A user.
    User,
    /// A channel.
    Channel,
    /// A role.
    Role,
    /// A user or role.
    Mentionable,
    /// Floating point number.
    Number,
    /// An uploaded file.
    Attachment,
}

/// Argument schema entry; the dispatcher treats these as opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
    /// Option name.
    pub name: String,
    /// Option description.
    pub description: String,
    /// Option type.
    pub kind: OptionKind,
    /// Whether the option must be supplied.
    pub required: bool,
    /// Nested options of a sub-command or group.
    pub options: Vec<CommandOption>,
}

impl CommandOption {
    /// Creates an optional option.
    pub fn new(kind: OptionKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            options: Vec::new(),
        }
    }

    /// Marks the option as required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Adds a nested option.
    #[must_use]
    pub fn sub_option(mut self, option: Self) -> Self {
        self.options.push(option);
        self
    }

    /// Whether this option is a sub-command.
    pub fn is_sub_command(&self) -> bool {
        self.kind == OptionKind::SubCommand
    }
}

/// Why a command definition was rejected at load time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// `name` is empty, not lowercase, contains whitespace or is too long.
    #[error("Command name must be a lowercase string without spaces of at most 32 characters (got '{name}')")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// `description` is empty or too long.
    #[error("Command '{command}': description must be 1-100 characters")]
    InvalidDescription {
        /// Command being defined.
        command: String,
    },

    /// A permission identifier is not in the catalog.
    #[error("Command '{command}': invalid {field} entry: {permission}")]
    UnknownPermission {
        /// Command being defined.
        command: String,
        /// `user_permissions` or `bot_permissions`.
        field: &'static str,
        /// The unknown identifier.
        permission: String,
    },

    /// A validation has an empty failure message.
    #[error("Command '{command}': validation #{index} must have a non-empty message")]
    InvalidValidation {
        /// Command being defined.
        command: String,
        /// Position in `validations`.
        index: usize,
    },

    /// An option has an invalid name or description.
    #[error("Command '{command}': option '{option}' {reason}")]
    InvalidOption {
        /// Command being defined.
        command: String,
        /// The offending option name.
        option: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The command is enabled but has no behaviour.
    #[error("Command '{command}' is enabled but has no behaviour")]
    MissingBehavior {
        /// Command being defined.
        command: String,
    },
}

impl DefinitionError {
    /// Name of the offending field.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "name",
            Self::InvalidDescription { .. } => "description",
            Self::UnknownPermission { field, .. } => *field,
            Self::InvalidValidation { .. } => "validations",
            Self::InvalidOption { .. } => "options",
            Self::MissingBehavior { .. } => "behavior",
        }
    }
}

/// Unvalidated command definition.
#[must_use]
pub struct CommandBuilder {
    name: String,
    description: String,
    category: Category,
    cooldown: Duration,
    bot_permissions: Vec<String>,
    user_permissions: Vec<String>,
    validations: Vec<Validation>,
    enabled: bool,
    ephemeral: bool,
    options: Vec<CommandOption>,
    behavior: Option<Arc<dyn CommandBehavior>>,
}

impl CommandBuilder {
    /// Starts a definition. Commands are disabled until [`enabled`](Self::enabled) is set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: Category::None,
            cooldown: Duration::ZERO,
            bot_permissions: Vec::new(),
            user_permissions: Vec::new(),
            validations: Vec::new(),
            enabled: false,
            ephemeral: false,
            options: Vec::new(),
            behavior: None,
        }
    }

    /// Name of the command being defined.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the per-user cooldown in seconds.
    pub fn cooldown(mut self, seconds: u64) -> Self {
        self.cooldown = Duration::from_secs(seconds);
        self
    }

    /// Permissions the bot needs in the channel.
    pub fn bot_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bot_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Permissions the invoking member needs.
    pub fn user_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a pre-execution validation.
    pub fn validation(mut self, validation: Validation) -> Self {
        self.validations.push(validation);
        self
    }

    /// Whether the command is registered and routable.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether responses are only visible to the invoker.
    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Appends an option to the argument schema.
    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Sets the behaviour run after the guard chain.
    pub fn behavior(mut self, behavior: impl CommandBehavior + 'static) -> Self {
        self.behavior = Some(Arc::new(behavior));
        self
    }

    /// Validates the definition and produces an immutable descriptor.
    pub fn build(self) -> Result<CommandDescriptor, DefinitionError> {
        if !is_valid_name(&self.name) {
            return Err(DefinitionError::InvalidName { name: self.name });
        }
        if !is_valid_description(&self.description) {
            return Err(DefinitionError::InvalidDescription { command: self.name });
        }

        let user_permissions =
            resolve_permissions(&self.name, "user_permissions", &self.user_permissions)?;
        let bot_permissions =
            resolve_permissions(&self.name, "bot_permissions", &self.bot_permissions)?;

        if let Some(index) = self
            .validations
            .iter()
            .position(|v| v.message().trim().is_empty())
        {
            return Err(DefinitionError::InvalidValidation {
                command: self.name,
                index,
            });
        }

        validate_options(&self.name, &self.options)?;

        let behavior: Arc<dyn CommandBehavior> = match (self.behavior, self.enabled) {
            (Some(behavior), _) => behavior,
            (None, true) => return Err(DefinitionError::MissingBehavior { command: self.name }),
            (None, false) => Arc::new(Unimplemented),
        };

        Ok(CommandDescriptor {
            name: self.name,
            description: self.description,
            category: self.category,
            cooldown: self.cooldown,
            bot_permissions,
            user_permissions,
            validations: self.validations,
            enabled: self.enabled,
            ephemeral: self.ephemeral,
            options: self.options,
            behavior,
        })
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= MAX_NAME_LENGTH
        && name == name.to_lowercase()
        && !name.chars().any(char::is_whitespace)
}

fn is_valid_description(description: &str) -> bool {
    !description.trim().is_empty() && description.chars().count() <= MAX_DESCRIPTION_LENGTH
}

fn resolve_permissions(
    command: &str,
    field: &'static str,
    ids: &[String],
) -> Result<Vec<&'static PermissionInfo>, DefinitionError> {
    ids.iter()
        .map(|id| {
            permissions::lookup(id).ok_or_else(|| DefinitionError::UnknownPermission {
                command: command.to_string(),
                field,
                permission: id.clone(),
            })
        })
        .collect()
}

fn validate_options(command: &str, options: &[CommandOption]) -> Result<(), DefinitionError> {
    for option in options {
        let reason = if !is_valid_name(&option.name) {
            Some("must have a lowercase name without spaces")
        } else if !is_valid_description(&option.description) {
            Some("must have a 1-100 character description")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(DefinitionError::InvalidOption {
                command: command.to_string(),
                option: option.name.clone(),
                reason: reason.to_string(),
            });
        }
        validate_options(command, &option.options)?;
    }
    Ok(())
}

/// A validated, immutable command definition.
pub struct CommandDescriptor {
    name: String,
    description: String,
    category: Category,
    cooldown: Duration,
    bot_permissions: Vec<&'static PermissionInfo>,
    user_permissions: Vec<&'static PermissionInfo>,
    validations: Vec<Validation>,
    enabled: bool,
    ephemeral: bool,
    options: Vec<CommandOption>,
    behavior: Arc<dyn CommandBehavior>,
}

impl CommandDescriptor {
    /// Starts a new definition.
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name)
    }

    /// Unique lowercase name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Category.
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Per-user cooldown window; zero when the command has none.
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Permissions the bot needs.
    pub fn bot_permissions(&self) -> &[&'static PermissionInfo] {
        &self.bot_permissions
    }

    /// Permissions the invoking member needs.
    pub fn user_permissions(&self) -> &[&'static PermissionInfo] {
        &self.user_permissions
    }

    /// Pre-execution validations, in order.
    pub fn validations(&self) -> &[Validation] {
        &self.validations
    }

    /// Whether the command is routable.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether responses are only visible to the invoker.
    pub const fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Argument schema.
    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    /// Behaviour run after the guard chain.
    pub fn behavior(&self) -> &dyn CommandBehavior {
        self.behavior.as_ref()
    }

    /// Names of the command's sub-commands.
    pub fn sub_command_names(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|option| option.is_sub_command())
            .map(|option| option.name.as_str())
            .collect()
    }

    /// Usage page shown by `/help <command>`.
    pub fn usage(&self, color: u32) -> EmbedView {
        let sub_commands: Vec<&CommandOption> = self
            .options
            .iter()
            .filter(|option| option.is_sub_command())
            .collect();

        let mut description = if sub_commands.is_empty() {
            format!("`/{}`\n\n**Help:** {}", self.name, self.description)
        } else {
            sub_commands
                .iter()
                .map(|sub| format!("`/{} {}`\n❯ {}\n\n", self.name, sub.name, sub.description))
                .collect()
        };

        if !self.cooldown.is_zero() {
            description.push_str(&format!(
                "\n**Cooldown:** {}",
                format_duration(self.cooldown)
            ));
        }

        EmbedView::new(description, color)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("cooldown", &self.cooldown)
            .field("enabled", &self.enabled)
            .field("ephemeral", &self.ephemeral)
            .finish_non_exhaustive()
    }
}
