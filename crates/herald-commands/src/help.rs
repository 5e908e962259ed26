//! The interactive help menu: a category selector with paged command lists.
//!
//! A menu moves from `AwaitingCategory` to `ShowingPage` once the user picks
//! a category, and ends when it has been idle for [`IDLE_TIMEOUT`], when it
//! has lived for [`MAX_LIFETIME`], or when its message can no longer be
//! edited. Only one menu may be open per (guild, user).

use crate::category::Category;
use crate::descriptor::CommandDescriptor;
use crate::framework::{CommandError, Context};
use crate::invocation::{Button, ComponentEvent, ComponentRow, EmbedView, Reply, SelectOption};
use crate::registry::CommandRegistry;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::StreamExt;
use poise::serenity_prelude::{GuildId, UserId};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Commands listed per page.
pub const COMMANDS_PER_PAGE: usize = 5;

/// A menu with no component use for this long is closed.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// A menu is closed this long after it opened, regardless of activity.
pub const MAX_LIFETIME: Duration = Duration::from_secs(5 * 60);

/// Custom id of the category selector.
pub const MENU_ID: &str = "help-menu";

/// Custom id of the previous-page button.
pub const PREVIOUS_ID: &str = "previousBtn";

/// Custom id of the next-page button.
pub const NEXT_ID: &str = "nextBtn";

/// Reply when the user already has a menu open.
pub const ALREADY_OPEN_MESSAGE: &str = "You are already viewing the help menu.";

/// Reply when `/help <command>` names no loaded command.
pub const NO_MATCH_MESSAGE: &str = "No matching command found";

/// Page body for a category without commands.
pub const EMPTY_CATEGORY_TEXT: &str = "No commands in this category";

const LANDING_TEXT: &str = "**About Me:**\n\
    Hello, I am Herald.\n\
    Pick a category below to browse its commands, or run `/help <command>` \
    for details on a single command.";

/// Session table key.
pub type SessionKey = (GuildId, UserId);

/// Open help menus, keyed by (guild, user).
#[derive(Debug, Default)]
pub struct HelpSessions {
    active: DashMap<SessionKey, Instant>,
}

impl HelpSessions {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `key`, or returns `None` if one is already open.
    ///
    /// The session stays open until the returned guard is dropped.
    pub fn try_open(&self, key: SessionKey) -> Option<SessionGuard<'_>> {
        match self.active.entry(key) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                vacant.insert(Instant::now());
                Some(SessionGuard {
                    sessions: self,
                    key,
                })
            }
        }
    }

    /// Whether a session is open for `key`.
    pub fn is_active(&self, key: &SessionKey) -> bool {
        self.active.contains_key(key)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no session is open.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Keeps a help session open; closes it on drop.
#[derive(Debug)]
pub struct SessionGuard<'a> {
    sessions: &'a HelpSessions,
    key: SessionKey,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.sessions.active.remove(&self.key);
    }
}

/// Where a menu is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuState {
    /// Showing the landing embed; no category chosen yet.
    AwaitingCategory,
    /// Showing one page of a category.
    ShowingPage {
        /// Chosen category.
        category: Category,
        /// Rendered pages; never empty.
        pages: Vec<EmbedView>,
        /// Index into `pages`.
        page: usize,
    },
}

/// State of one open help menu.
#[derive(Debug, Clone)]
pub struct HelpMenu {
    state: MenuState,
    color: u32,
    opened_at: Instant,
    last_activity: Instant,
}

impl HelpMenu {
    /// A fresh menu awaiting a category.
    pub fn new(color: u32) -> Self {
        let now = Instant::now();
        Self {
            state: MenuState::AwaitingCategory,
            color,
            opened_at: now,
            last_activity: now,
        }
    }

    /// Current state.
    pub const fn state(&self) -> &MenuState {
        &self.state
    }

    /// Shows the first page of `category`.
    pub fn select_category(&mut self, category: Category, registry: &CommandRegistry) {
        self.state = MenuState::ShowingPage {
            category,
            pages: category_pages(registry, category, self.color),
            page: 0,
        };
    }

    /// Moves one page forward. Returns whether the page changed.
    pub fn next_page(&mut self) -> bool {
        match &mut self.state {
            MenuState::ShowingPage { pages, page, .. } if *page + 1 < pages.len() => {
                *page += 1;
                true
            }
            _ => false,
        }
    }

    /// Moves one page back. Returns whether the page changed.
    pub fn previous_page(&mut self) -> bool {
        match &mut self.state {
            MenuState::ShowingPage { page, .. } if *page > 0 => {
                *page -= 1;
                true
            }
            _ => false,
        }
    }

    /// Applies a component event. Returns whether the view changed.
    pub fn apply(&mut self, event: &ComponentEvent, registry: &CommandRegistry) -> bool {
        match event.custom_id.as_str() {
            MENU_ID => {
                let Some(category) = event
                    .values
                    .first()
                    .and_then(|value| value.parse::<Category>().ok())
                else {
                    debug!("Ignoring unknown help category {:?}", event.values);
                    return false;
                };
                self.select_category(category, registry);
                true
            }
            PREVIOUS_ID => self.previous_page(),
            NEXT_ID => self.next_page(),
            other => {
                debug!("Ignoring unknown help component '{}'", other);
                false
            }
        }
    }

    /// Restarts the idle timer.
    pub fn record_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Instant at which the menu closes unless there is further activity.
    pub fn deadline(&self) -> Instant {
        (self.last_activity + IDLE_TIMEOUT).min(self.opened_at + MAX_LIFETIME)
    }

    /// Whether the menu should be closed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline()
    }

    /// Number of pages in the chosen category; zero before a choice.
    pub fn page_count(&self) -> usize {
        match &self.state {
            MenuState::AwaitingCategory => 0,
            MenuState::ShowingPage { pages, .. } => pages.len(),
        }
    }

    /// Zero-based index of the page shown, if any.
    pub const fn current_page(&self) -> Option<usize> {
        match &self.state {
            MenuState::AwaitingCategory => None,
            MenuState::ShowingPage { page, .. } => Some(*page),
        }
    }

    /// The message as it should currently look.
    pub fn view(&self) -> Reply {
        let embed = match &self.state {
            MenuState::AwaitingCategory => EmbedView::new(LANDING_TEXT, self.color),
            MenuState::ShowingPage { pages, page, .. } => pages[*page].clone(),
        };
        Reply::embed(embed).with_components(vec![
            category_selector(),
            navigation_buttons(self.page_count() <= 1),
        ])
    }
}

fn category_selector() -> ComponentRow {
    ComponentRow::Select {
        custom_id: MENU_ID.to_string(),
        placeholder: "Choose the command category".to_string(),
        options: Category::LISTED
            .iter()
            .map(|category| SelectOption {
                label: category.display_name().to_string(),
                value: category.key().to_string(),
                description: format!("View commands in {} category", category.display_name()),
                emoji: Some(category.emoji().to_string()),
            })
            .collect(),
    }
}

fn navigation_buttons(disabled: bool) -> ComponentRow {
    ComponentRow::Buttons(vec![
        Button {
            custom_id: PREVIOUS_ID.to_string(),
            emoji: "⬅️".to_string(),
            disabled,
        },
        Button {
            custom_id: NEXT_ID.to_string(),
            emoji: "➡️".to_string(),
            disabled,
        },
    ])
}

/// Splits `items` into consecutive pages of at most `per_page` entries.
pub fn paginate<T: Clone>(items: &[T], per_page: usize) -> Vec<Vec<T>> {
    items
        .chunks(per_page.max(1))
        .map(<[T]>::to_vec)
        .collect()
}

/// One command's entry on a category page.
pub fn format_command_entry(descriptor: &CommandDescriptor) -> String {
    let mut entry = format!(
        "`/{}`\n ❯ **Description**: {}\n",
        descriptor.name(),
        descriptor.description()
    );
    let sub_commands = descriptor.sub_command_names();
    if !sub_commands.is_empty() {
        entry.push_str(&format!(
            " ❯ **SubCommands [{}]**: {}\n",
            sub_commands.len(),
            sub_commands.join(", ")
        ));
    }
    entry
}

/// Renders every page of a category. Always returns at least one page.
pub fn category_pages(registry: &CommandRegistry, category: Category, color: u32) -> Vec<EmbedView> {
    let author = format!("{} Commands", category.key());
    let entries: Vec<String> = registry
        .in_category(category)
        .into_iter()
        .map(format_command_entry)
        .collect();

    if entries.is_empty() {
        return vec![EmbedView::new(EMPTY_CATEGORY_TEXT, color).author(author)];
    }

    let pages = paginate(&entries, COMMANDS_PER_PAGE);
    let total = pages.len();
    pages
        .into_iter()
        .enumerate()
        .map(|(index, lines)| {
            EmbedView::new(lines.join("\n"), color)
                .author(author.clone())
                .footer(format!("page {} of {}", index + 1, total))
        })
        .collect()
}

/// Opens a help menu for the invoking user and drives it until it closes.
pub async fn run_menu(ctx: Context<'_>) -> Result<(), CommandError> {
    let invocation = ctx.invocation;
    let guild = invocation
        .guild_id()
        .ok_or("help menu requires a guild")?;
    let user = invocation.user_id();

    let Some(_session) = ctx.data.help_sessions.try_open((guild, user)) else {
        invocation.follow_up(Reply::text(ALREADY_OPEN_MESSAGE)).await?;
        return Ok(());
    };

    let mut menu = HelpMenu::new(ctx.embed_color());
    let message = invocation.follow_up(menu.view()).await?;
    let mut events = invocation.component_stream(message);

    while !menu.is_expired() {
        let Ok(Some(event)) = tokio::time::timeout_at(menu.deadline(), events.next()).await else {
            break;
        };

        menu.record_activity();
        if menu.apply(&event, &ctx.data.registry) {
            if let Err(e) = invocation.edit_message(message, menu.view()).await {
                debug!(user = %user, "Help menu message is gone, closing: {}", e);
                break;
            }
        }
    }

    drop(events);
    if let Err(e) = invocation.clear_components(message).await {
        debug!(user = %user, "Failed to strip help menu components: {}", e);
    }
    debug!(user = %user, guild = %guild, "Help menu closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{CommandBehavior, CommandBuilder, CommandOption, OptionKind};
    use async_trait::async_trait;
    use proptest::prelude::*;

    struct Noop;

    #[async_trait]
    impl CommandBehavior for Noop {
        async fn run(&self, _ctx: Context<'_>) -> Result<(), CommandError> {
            Ok(())
        }
    }

    fn registry_with(utility: usize) -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        let builders = (0..utility).map(|i| {
            CommandBuilder::new(format!("cmd{i:02}"))
                .description("Test command")
                .category(Category::Utility)
                .enabled(true)
                .behavior(Noop)
        });
        registry.load_all(builders).unwrap();
        registry
    }

    #[test]
    fn test_sessions_are_exclusive_per_key() {
        let sessions = HelpSessions::new();
        let key = (GuildId::new(1), UserId::new(2));
        let guard = sessions.try_open(key).unwrap();
        assert!(sessions.try_open(key).is_none());
        assert!(sessions
            .try_open((GuildId::new(1), UserId::new(3)))
            .is_some());
        assert!(sessions.is_active(&key));

        drop(guard);
        assert!(!sessions.is_active(&key));
        assert!(sessions.try_open(key).is_some());
    }

    #[test]
    fn test_entry_lists_sub_commands() {
        let descriptor = CommandBuilder::new("tag")
            .description("Manage tags")
            .option(CommandOption::new(OptionKind::SubCommand, "add", "Add a tag"))
            .option(CommandOption::new(OptionKind::SubCommand, "remove", "Remove a tag"))
            .build()
            .unwrap();
        assert_eq!(
            format_command_entry(&descriptor),
            "`/tag`\n ❯ **Description**: Manage tags\n ❯ **SubCommands [2]**: add, remove\n"
        );
    }

    #[test]
    fn test_empty_category_has_single_page() {
        let pages = category_pages(&registry_with(3), Category::Admin, 0);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].description, EMPTY_CATEGORY_TEXT);
        assert_eq!(pages[0].author.as_deref(), Some("ADMIN Commands"));
    }

    #[test]
    fn test_pages_have_footers() {
        let pages = category_pages(&registry_with(7), Category::Utility, 0);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].footer.as_deref(), Some("page 1 of 2"));
        assert_eq!(pages[1].footer.as_deref(), Some("page 2 of 2"));
        assert!(pages[1].description.starts_with("`/cmd05`"));
    }

    #[test]
    fn test_buttons_follow_page_count() {
        let registry = registry_with(6);
        let mut menu = HelpMenu::new(0);
        assert_eq!(menu.view().components[1], navigation_buttons(true));

        menu.select_category(Category::Utility, &registry);
        assert_eq!(menu.view().components[1], navigation_buttons(false));

        menu.select_category(Category::Admin, &registry);
        assert_eq!(menu.view().components[1], navigation_buttons(true));
    }

    #[test]
    fn test_navigation_clamps() {
        let registry = registry_with(12);
        let mut menu = HelpMenu::new(0);
        assert!(!menu.next_page());

        assert!(menu.apply(&ComponentEvent::select(MENU_ID, "utility"), &registry));
        assert_eq!(menu.page_count(), 3);
        assert!(!menu.previous_page());
        assert!(menu.next_page());
        assert!(menu.next_page());
        assert!(!menu.next_page());
        assert_eq!(menu.current_page(), Some(2));
        assert!(menu.apply(&ComponentEvent::button(PREVIOUS_ID), &registry));
        assert_eq!(menu.current_page(), Some(1));

        assert!(!menu.apply(&ComponentEvent::select(MENU_ID, "nope"), &registry));
        assert!(!menu.apply(&ComponentEvent::button("other"), &registry));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_tracks_idle_and_lifetime() {
        let mut menu = HelpMenu::new(0);
        let opened = Instant::now();
        assert_eq!(menu.deadline(), opened + IDLE_TIMEOUT);

        for _ in 0..20 {
            tokio::time::advance(Duration::from_secs(20)).await;
            menu.record_activity();
        }
        assert_eq!(menu.deadline(), opened + MAX_LIFETIME);
        assert!(menu.is_expired());
    }

    proptest! {
        #[test]
        fn prop_paginate_preserves_items(len in 0usize..60, per_page in 1usize..10) {
            let items: Vec<usize> = (0..len).collect();
            let pages = paginate(&items, per_page);

            prop_assert_eq!(pages.len(), len.div_ceil(per_page));
            prop_assert!(pages.iter().all(|page| !page.is_empty() && page.len() <= per_page));
            let flattened: Vec<usize> = pages.into_iter().flatten().collect();
            prop_assert_eq!(flattened, items);
        }
    }
}
