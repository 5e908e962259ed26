//! Integration tests for herald-commands.
//!
//! These drive the dispatcher, built-in commands and help menu end to end
//! through `MockInvocation`.

use async_trait::async_trait;
use herald_commands::commands::manifest;
use herald_commands::dispatcher::{
    self, ADMIN_ONLY_MESSAGE, FAILURE_MESSAGE, GUILD_ONLY_MESSAGE, UNKNOWN_COMMAND_MESSAGE,
};
use herald_commands::help::{self, ALREADY_OPEN_MESSAGE, IDLE_TIMEOUT, MAX_LIFETIME};
use herald_commands::testing::{MockInvocation, Recorded};
use herald_commands::{
    Category, CommandBehavior, CommandBuilder, CommandError, CommandRegistry, ComponentEvent,
    ComponentRow, Context, Data, Decline, DispatchOutcome, RegistryError, Validation,
    MAX_COMMANDS,
};
use herald_common::test_utils::discord_fixtures::{TEST_ADMIN_ID, TEST_USER_ID};
use herald_common::test_utils::init_test_logging;
use herald_config::Config;
use poise::serenity_prelude::{Permissions, UserId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_test::assert_ok;

struct Counting(Arc<AtomicUsize>);

#[async_trait]
impl CommandBehavior for Counting {
    async fn run(&self, ctx: Context<'_>) -> Result<(), CommandError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        ctx.invocation
            .follow_up(herald_commands::Reply::text("done"))
            .await?;
        Ok(())
    }
}

struct Failing;

#[async_trait]
impl CommandBehavior for Failing {
    async fn run(&self, _ctx: Context<'_>) -> Result<(), CommandError> {
        Err("database unavailable".into())
    }
}

struct Panicking;

#[async_trait]
impl CommandBehavior for Panicking {
    async fn run(&self, _ctx: Context<'_>) -> Result<(), CommandError> {
        let pending: Vec<u32> = Vec::new();
        Err(format!("unreachable: {}", pending[3]).into())
    }
}

fn test_config() -> Arc<Config> {
    let mut config = Config::default();
    config.discord.token = "test_token".to_string();
    config.discord.admin_ids = vec![TEST_ADMIN_ID];
    Arc::new(config)
}

fn data_with(builders: Vec<CommandBuilder>) -> Data {
    init_test_logging();
    let mut registry = CommandRegistry::new();
    assert_ok!(registry.load_all(builders));
    Data::new(test_config(), registry)
}

fn ban_command(runs: &Arc<AtomicUsize>) -> CommandBuilder {
    CommandBuilder::new("ban")
        .description("Bans a member")
        .category(Category::Utility)
        .cooldown(5)
        .user_permissions(["BAN_MEMBERS"])
        .enabled(true)
        .behavior(Counting(Arc::clone(runs)))
}

fn filler(count: usize) -> Vec<CommandBuilder> {
    (0..count)
        .map(|i| {
            CommandBuilder::new(format!("util{i:02}"))
                .description("Filler command")
                .category(Category::Utility)
                .enabled(true)
                .behavior(Counting(Arc::default()))
        })
        .collect()
}

#[tokio::test]
async fn test_interactions_outside_guilds_are_refused() {
    let data = data_with(manifest());
    let invocation = MockInvocation::new("ping", TEST_USER_ID).without_guild();

    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::NotInGuild
    );
    assert_eq!(invocation.last_text().as_deref(), Some(GUILD_ONLY_MESSAGE));
}

#[tokio::test]
async fn test_disabled_commands_are_not_routable() {
    let runs = Arc::new(AtomicUsize::new(0));
    let data = data_with(vec![ban_command(&runs).enabled(false)]);
    let invocation = MockInvocation::new("ban", TEST_USER_ID);

    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::UnknownCommand
    );
    assert_eq!(
        invocation.last_text().as_deref(),
        Some(UNKNOWN_COMMAND_MESSAGE)
    );
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_capacity_is_enforced() {
    let mut registry = CommandRegistry::new();
    let err = registry.load_all(filler(MAX_COMMANDS + 1)).unwrap_err();
    assert_eq!(
        err,
        RegistryError::CapacityExceeded {
            limit: MAX_COMMANDS
        }
    );
    assert_eq!(registry.len(), MAX_COMMANDS);
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_scenario() {
    let runs = Arc::new(AtomicUsize::new(0));
    let data = data_with(vec![ban_command(&runs)]);
    let granted = Some(Permissions::BAN_MEMBERS);

    let first = MockInvocation::new("ban", TEST_USER_ID).member_permissions(granted);
    assert_eq!(
        dispatcher::handle(&first, &data).await,
        DispatchOutcome::Completed
    );

    let second = MockInvocation::new("ban", TEST_USER_ID).member_permissions(granted);
    assert_eq!(
        dispatcher::handle(&second, &data).await,
        DispatchOutcome::Declined(Decline::Cooldown(Duration::from_secs(5)))
    );
    assert_eq!(
        second.last_text().as_deref(),
        Some("You are on cooldown. You can again use the command in `5 seconds`")
    );
    assert!(matches!(&second.recorded()[0], Recorded::Reply(reply) if reply.ephemeral));

    // another user is unaffected
    let other = MockInvocation::new("ban", TEST_ADMIN_ID).member_permissions(granted);
    assert_eq!(
        dispatcher::handle(&other, &data).await,
        DispatchOutcome::Completed
    );

    tokio::time::advance(Duration::from_secs(5)).await;
    let third = MockInvocation::new("ban", TEST_USER_ID).member_permissions(granted);
    assert_eq!(
        dispatcher::handle(&third, &data).await,
        DispatchOutcome::Completed
    );
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_missing_user_permission_is_named() {
    let runs = Arc::new(AtomicUsize::new(0));
    let data = data_with(vec![ban_command(&runs)]);
    let invocation = MockInvocation::new("ban", TEST_USER_ID)
        .member_permissions(Some(Permissions::KICK_MEMBERS));

    let outcome = dispatcher::handle(&invocation, &data).await;
    assert!(matches!(
        outcome,
        DispatchOutcome::Declined(Decline::MissingUserPermissions(_))
    ));
    assert_eq!(
        invocation.last_text().as_deref(),
        Some("You need `Ban members` permission for this command")
    );
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert!(data.cooldowns.is_empty(), "declines must not charge the cooldown");
}

#[tokio::test]
async fn test_validations_run_before_permission_checks() {
    let runs = Arc::new(AtomicUsize::new(0));
    let data = data_with(vec![ban_command(&runs)
        .validation(Validation::new(|_| false, "Bans are paused"))]);
    let invocation = MockInvocation::new("ban", TEST_USER_ID).member_permissions(None);

    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::Declined(Decline::Validation("Bans are paused".to_string()))
    );
    assert_eq!(invocation.last_text().as_deref(), Some("Bans are paused"));
}

#[tokio::test]
async fn test_admin_commands_require_admin() {
    let data = data_with(manifest());

    let user = MockInvocation::new("status", TEST_USER_ID);
    assert_eq!(
        dispatcher::handle(&user, &data).await,
        DispatchOutcome::Declined(Decline::AdminOnly)
    );
    assert_eq!(
        user.last_text().as_deref(),
        Some("This command is only accessible to bot admins")
    );

    let admin = MockInvocation::new("status", TEST_ADMIN_ID);
    assert_eq!(
        dispatcher::handle(&admin, &data).await,
        DispatchOutcome::Completed
    );
    assert_eq!(admin.recorded()[0], Recorded::Defer { ephemeral: true });
    let status = &admin.responses()[0];
    assert!(status.ephemeral);
    assert!(status.embeds[0].description.contains("**Commands loaded:** 3"));
}

#[tokio::test(start_paused = true)]
async fn test_admin_gate_wins_over_permissions_and_cooldown() {
    let runs = Arc::new(AtomicUsize::new(0));
    let data = data_with(vec![CommandBuilder::new("purge")
        .description("Deletes recent messages")
        .category(Category::Admin)
        .cooldown(10)
        .user_permissions(["MANAGE_MESSAGES"])
        .enabled(true)
        .behavior(Counting(Arc::clone(&runs)))]);
    data.cooldowns.record("purge", UserId::new(TEST_USER_ID));

    let invocation = MockInvocation::new("purge", TEST_USER_ID)
        .member_permissions(None)
        .bot_permissions(None);
    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::Declined(Decline::AdminOnly)
    );
    assert_eq!(invocation.last_text().as_deref(), Some(ADMIN_ONLY_MESSAGE));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_ping_twice_within_a_second_hits_cooldown() {
    let data = data_with(manifest());

    let first = MockInvocation::new("ping", TEST_USER_ID);
    assert_eq!(
        dispatcher::handle(&first, &data).await,
        DispatchOutcome::Completed
    );

    tokio::time::advance(Duration::from_millis(300)).await;
    let second = MockInvocation::new("ping", TEST_USER_ID);
    assert_eq!(
        dispatcher::handle(&second, &data).await,
        DispatchOutcome::Declined(Decline::Cooldown(Duration::from_millis(4_700)))
    );
    assert_eq!(
        second.last_text().as_deref(),
        Some("You are on cooldown. You can again use the command in `5 seconds`")
    );
    let decline = &second.responses()[0];
    assert!(decline.ephemeral);
    assert_eq!(decline.embeds[0].color, 0x00F7_E919);
}

#[tokio::test]
async fn test_bot_permissions_are_checked() {
    let data = data_with(manifest());
    let invocation = MockInvocation::new("help", TEST_USER_ID)
        .bot_permissions(Some(Permissions::SEND_MESSAGES));

    dispatcher::handle(&invocation, &data).await;
    assert_eq!(
        invocation.last_text().as_deref(),
        Some("I need `Embed links` permission for this command")
    );
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_reported_and_still_charge_cooldown() {
    let data = data_with(vec![CommandBuilder::new("report")
        .description("Generates a report")
        .category(Category::Utility)
        .cooldown(30)
        .enabled(true)
        .behavior(Failing)]);
    let invocation = MockInvocation::new("report", TEST_USER_ID);

    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::Failed
    );
    assert_eq!(
        invocation.recorded()[0],
        Recorded::Defer { ephemeral: false }
    );
    assert_eq!(invocation.last_text().as_deref(), Some(FAILURE_MESSAGE));
    assert_eq!(invocation.responses()[0].embeds[0].color, 0x00D6_1A3C);

    let retry = MockInvocation::new("report", TEST_USER_ID);
    assert!(matches!(
        dispatcher::handle(&retry, &data).await,
        DispatchOutcome::Declined(Decline::Cooldown(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_panicking_behavior_is_answered_and_charged() {
    let data = data_with(vec![CommandBuilder::new("crash")
        .description("Indexes past the end of an empty list")
        .category(Category::Utility)
        .cooldown(10)
        .enabled(true)
        .behavior(Panicking)]);
    let invocation = MockInvocation::new("crash", TEST_USER_ID);

    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::Failed
    );
    assert_eq!(
        invocation.recorded()[0],
        Recorded::Defer { ephemeral: false }
    );
    assert_eq!(invocation.last_text().as_deref(), Some(FAILURE_MESSAGE));
    assert_eq!(data.cooldowns.len(), 1);

    let retry = MockInvocation::new("crash", TEST_USER_ID);
    assert!(matches!(
        dispatcher::handle(&retry, &data).await,
        DispatchOutcome::Declined(Decline::Cooldown(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_failed_acknowledgement_is_answered_and_charged() {
    let runs = Arc::new(AtomicUsize::new(0));
    let data = data_with(vec![ban_command(&runs)]);
    let invocation = MockInvocation::new("ban", TEST_USER_ID)
        .member_permissions(Some(Permissions::BAN_MEMBERS))
        .failing_defer();

    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::Failed
    );
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert_eq!(invocation.last_text().as_deref(), Some(FAILURE_MESSAGE));
    assert_eq!(data.cooldowns.len(), 1);
}

#[tokio::test]
async fn test_ping_edits_its_placeholder() {
    let data = data_with(manifest());
    let invocation = MockInvocation::new("ping", TEST_USER_ID);

    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::Completed
    );
    let responses = invocation.responses();
    assert_eq!(responses[0].content.as_deref(), Some("Pinging..."));
    assert!(responses[1]
        .content
        .as_deref()
        .is_some_and(|text| text.starts_with("🏓 Pong!")));
}

#[tokio::test]
async fn test_help_usage_page() {
    let data = data_with(manifest());

    let known = MockInvocation::new("help", TEST_USER_ID).option("command", "ping");
    dispatcher::handle(&known, &data).await;
    let usage = &known.responses()[0].embeds[0];
    assert_eq!(
        usage.description,
        "`/ping`\n\n**Help:** Shows the bot's response latency\n**Cooldown:** 5 seconds"
    );

    let unknown = MockInvocation::new("help", TEST_USER_ID).option("command", "nope");
    dispatcher::handle(&unknown, &data).await;
    assert_eq!(
        unknown.last_text().as_deref(),
        Some("No matching command found")
    );
}

fn footers(invocation: &MockInvocation) -> Vec<Option<String>> {
    invocation
        .recorded()
        .into_iter()
        .filter_map(|entry| match entry {
            Recorded::Edit(_, reply) => Some(reply.embeds[0].footer.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_help_menu_paginates_and_clamps() {
    let mut builders = manifest();
    builders.extend(filler(10));
    let data = data_with(builders);
    assert_eq!(data.registry.in_category(Category::Utility).len(), 12);

    let step = Duration::from_secs(1);
    let invocation = MockInvocation::new("help", TEST_USER_ID)
        .component(step, ComponentEvent::select(help::MENU_ID, "UTILITY"))
        .component(step, ComponentEvent::button(help::NEXT_ID))
        .component(step, ComponentEvent::button(help::NEXT_ID))
        .component(step, ComponentEvent::button(help::NEXT_ID))
        .component(step, ComponentEvent::button(help::PREVIOUS_ID));

    let started = Instant::now();
    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::Completed
    );

    // the clamped third "next" produces no edit
    assert_eq!(
        footers(&invocation),
        vec![
            Some("page 1 of 3".to_string()),
            Some("page 2 of 3".to_string()),
            Some("page 3 of 3".to_string()),
            Some("page 2 of 3".to_string()),
        ]
    );

    let first_page = &invocation.responses()[1];
    assert_eq!(first_page.embeds[0].author.as_deref(), Some("UTILITY Commands"));
    assert_eq!(first_page.embeds[0].description.matches("`/").count(), 5);
    match &first_page.components[1] {
        ComponentRow::Buttons(buttons) => assert!(buttons.iter().all(|b| !b.disabled)),
        other => panic!("expected buttons, got {other:?}"),
    }

    assert!(matches!(
        invocation.recorded().last(),
        Some(Recorded::ClearComponents(_))
    ));
    assert_eq!(started.elapsed(), Duration::from_secs(5) + IDLE_TIMEOUT);
    assert!(data.help_sessions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_help_menu_keeps_clicks_made_during_an_edit() {
    let mut builders = manifest();
    builders.extend(filler(10));
    let data = data_with(builders);

    // the button press lands while the category edit is still in flight
    let invocation = MockInvocation::new("help", TEST_USER_ID)
        .slow_edits(Duration::from_secs(2))
        .component(
            Duration::from_secs(1),
            ComponentEvent::select(help::MENU_ID, "UTILITY"),
        )
        .component(Duration::from_secs(1), ComponentEvent::button(help::NEXT_ID));

    let started = Instant::now();
    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::Completed
    );
    assert_eq!(
        footers(&invocation),
        vec![
            Some("page 1 of 3".to_string()),
            Some("page 2 of 3".to_string()),
        ]
    );
    assert_eq!(started.elapsed(), Duration::from_secs(3) + IDLE_TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn test_empty_category_page() {
    let mut registry = CommandRegistry::new();
    assert_ok!(registry.load_all(vec![help_only()]));
    let data = Data::new(test_config(), registry);

    let invocation = MockInvocation::new("help", TEST_USER_ID).component(
        Duration::from_secs(2),
        ComponentEvent::select(help::MENU_ID, "ADMIN"),
    );
    dispatcher::handle(&invocation, &data).await;

    let page = &invocation.responses()[1];
    assert_eq!(page.embeds[0].description, help::EMPTY_CATEGORY_TEXT);
    match &page.components[1] {
        ComponentRow::Buttons(buttons) => assert!(buttons.iter().all(|b| b.disabled)),
        other => panic!("expected buttons, got {other:?}"),
    }
}

fn help_only() -> CommandBuilder {
    manifest()
        .into_iter()
        .find(|builder| builder.name() == "help")
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_second_help_session_is_declined() {
    let data = data_with(manifest());
    let first = MockInvocation::new("help", TEST_USER_ID);
    let second = MockInvocation::new("help", TEST_USER_ID);
    let elsewhere = MockInvocation::new("help", TEST_USER_ID).in_guild(42);

    let (a, b, c) = tokio::join!(
        dispatcher::handle(&first, &data),
        dispatcher::handle(&second, &data),
        dispatcher::handle(&elsewhere, &data),
    );
    assert_eq!(a, DispatchOutcome::Completed);
    assert_eq!(b, DispatchOutcome::Completed);
    assert_eq!(c, DispatchOutcome::Completed);

    assert_eq!(second.last_text().as_deref(), Some(ALREADY_OPEN_MESSAGE));
    assert!(first.responses().iter().all(|reply| reply.content.is_none()));
    assert!(elsewhere.responses().iter().all(|reply| reply.content.is_none()));
    assert!(data.help_sessions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_help_menu_lifetime_is_capped() {
    let data = data_with(manifest());
    let mut invocation = MockInvocation::new("help", TEST_USER_ID);
    for _ in 0..13 {
        invocation = invocation.component(
            Duration::from_secs(25),
            ComponentEvent::button(help::NEXT_ID),
        );
    }

    let started = Instant::now();
    dispatcher::handle(&invocation, &data).await;
    assert_eq!(started.elapsed(), MAX_LIFETIME);
    assert!(matches!(
        invocation.recorded().last(),
        Some(Recorded::ClearComponents(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_help_menu_closes_when_message_is_gone() {
    let data = data_with(manifest());
    let invocation = MockInvocation::new("help", TEST_USER_ID)
        .failing_edits()
        .component(
            Duration::from_secs(3),
            ComponentEvent::select(help::MENU_ID, "UTILITY"),
        );

    let started = Instant::now();
    assert_eq!(
        dispatcher::handle(&invocation, &data).await,
        DispatchOutcome::Completed
    );
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert!(data.help_sessions.is_empty());
}
