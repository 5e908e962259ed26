//! Catalog of Discord permission identifiers and their human-readable labels.

use poise::serenity_prelude::Permissions;

/// One catalog entry: identifier used in command definitions, display label and bit flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionInfo {
    /// Identifier used in command definitions, e.g. `EMBED_LINKS`.
    pub id: &'static str,
    /// Label shown to users, e.g. `Embed links`.
    pub label: &'static str,
    /// The permission bit.
    pub flag: Permissions,
}

const fn entry(id: &'static str, label: &'static str, flag: Permissions) -> PermissionInfo {
    PermissionInfo { id, label, flag }
}

/// Every permission identifier a command may require.
pub static PERMISSION_CATALOG: &[PermissionInfo] = &[
    entry("CREATE_INSTANT_INVITE", "Create instant invite", Permissions::CREATE_INSTANT_INVITE),
    entry("KICK_MEMBERS", "Kick members", Permissions::KICK_MEMBERS),
    entry("BAN_MEMBERS", "Ban members", Permissions::BAN_MEMBERS),
    entry("ADMINISTRATOR", "Administrator", Permissions::ADMINISTRATOR),
    entry("MANAGE_CHANNELS", "Manage channels", Permissions::MANAGE_CHANNELS),
    entry("MANAGE_GUILD", "Manage server", Permissions::MANAGE_GUILD),
    entry("ADD_REACTIONS", "Add Reactions", Permissions::ADD_REACTIONS),
    entry("VIEW_AUDIT_LOG", "View audit log", Permissions::VIEW_AUDIT_LOG),
    entry("PRIORITY_SPEAKER", "Priority speaker", Permissions::PRIORITY_SPEAKER),
    entry("STREAM", "Video", Permissions::STREAM),
    entry("VIEW_CHANNEL", "View channel", Permissions::VIEW_CHANNEL),
    entry("SEND_MESSAGES", "Send messages", Permissions::SEND_MESSAGES),
    entry("SEND_TTS_MESSAGES", "Send TTS messages", Permissions::SEND_TTS_MESSAGES),
    entry("MANAGE_MESSAGES", "Manage messages", Permissions::MANAGE_MESSAGES),
    entry("EMBED_LINKS", "Embed links", Permissions::EMBED_LINKS),
    entry("ATTACH_FILES", "Attach files", Permissions::ATTACH_FILES),
    entry("READ_MESSAGE_HISTORY", "Read message history", Permissions::READ_MESSAGE_HISTORY),
    entry("MENTION_EVERYONE", "Mention everyone", Permissions::MENTION_EVERYONE),
    entry("USE_EXTERNAL_EMOJIS", "Use external emojis", Permissions::USE_EXTERNAL_EMOJIS),
    entry("VIEW_GUILD_INSIGHTS", "View server insights", Permissions::VIEW_GUILD_INSIGHTS),
    entry("CONNECT", "Connect", Permissions::CONNECT),
    entry("SPEAK", "Speak", Permissions::SPEAK),
    entry("MUTE_MEMBERS", "Mute members", Permissions::MUTE_MEMBERS),
    entry("DEAFEN_MEMBERS", "Deafen members", Permissions::DEAFEN_MEMBERS),
    entry("MOVE_MEMBERS", "Move members", Permissions::MOVE_MEMBERS),
    entry("USE_VAD", "Use voice activity", Permissions::USE_VAD),
    entry("CHANGE_NICKNAME", "Change nickname", Permissions::CHANGE_NICKNAME),
    entry("MANAGE_NICKNAMES", "Manage nicknames", Permissions::MANAGE_NICKNAMES),
    entry("MANAGE_ROLES", "Manage roles", Permissions::MANAGE_ROLES),
    entry("MANAGE_WEBHOOKS", "Manage webhooks", Permissions::MANAGE_WEBHOOKS),
    entry(
        "MANAGE_EMOJIS_AND_STICKERS",
        "Manage emojis and stickers",
        Permissions::MANAGE_GUILD_EXPRESSIONS,
    ),
    entry(
        "USE_APPLICATION_COMMANDS",
        "Use Application Commands",
        Permissions::USE_APPLICATION_COMMANDS,
    ),
    entry("REQUEST_TO_SPEAK", "Request to Speak", Permissions::REQUEST_TO_SPEAK),
    entry("MANAGE_EVENTS", "Manage Events", Permissions::MANAGE_EVENTS),
    entry("MANAGE_THREADS", "Manage Threads", Permissions::MANAGE_THREADS),
    entry("USE_PUBLIC_THREADS", "Use Public Threads", Permissions::CREATE_PUBLIC_THREADS),
    entry("USE_PRIVATE_THREADS", "Use Private Threads", Permissions::CREATE_PRIVATE_THREADS),
    entry("USE_EXTERNAL_STICKERS", "Use External Stickers", Permissions::USE_EXTERNAL_STICKERS),
    entry(
        "SEND_MESSAGES_IN_THREADS",
        "Send Messages In Threads",
        Permissions::SEND_MESSAGES_IN_THREADS,
    ),
    entry(
        "START_EMBEDDED_ACTIVITIES",
        "Start Embedded Activities",
        Permissions::USE_EMBEDDED_ACTIVITIES,
    ),
    entry("MODERATE_MEMBERS", "Moderate Members", Permissions::MODERATE_MEMBERS),
];

/// Looks up a catalog entry by identifier.
pub fn lookup(id: &str) -> Option<&'static PermissionInfo> {
    PERMISSION_CATALOG.iter().find(|info| info.id == id)
}

/// Returns whether the identifier exists in the catalog.
pub fn is_known(id: &str) -> bool {
    lookup(id).is_some()
}

/// Human-readable label for an identifier.
pub fn label(id: &str) -> Option<&'static str> {
    lookup(id).map(|info| info.label)
}

/// Entries from `required` that `granted` does not cover.
///
/// `ADMINISTRATOR` implies every other permission.
pub fn missing(
    required: &[&'static PermissionInfo],
    granted: Permissions,
) -> Vec<&'static PermissionInfo> {
    if granted.contains(Permissions::ADMINISTRATOR) {
        return Vec::new();
    }
    required
        .iter()
        .copied()
        .filter(|info| !granted.contains(info.flag))
        .collect()
}

/// Formats entries for a decline message: `` `Kick members`, `Ban members` permissions``.
pub fn describe(entries: &[&PermissionInfo]) -> String {
    let noun = if entries.len() > 1 {
        "permissions"
    } else {
        "permission"
    };
    let labels: Vec<String> = entries
        .iter()
        .map(|info| format!("`{}`", info.label))
        .collect();
    format!("{} {noun}", labels.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<&str> = PERMISSION_CATALOG.iter().map(|info| info.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PERMISSION_CATALOG.len());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(label("EMBED_LINKS"), Some("Embed links"));
        assert_eq!(label("MANAGE_GUILD"), Some("Manage server"));
        assert!(is_known("BAN_MEMBERS"));
        assert!(!is_known("ban_members"));
        assert!(!is_known("FLY"));
    }

    #[test]
    fn test_missing_reports_only_absent_flags() {
        let required = [lookup("KICK_MEMBERS").unwrap(), lookup("BAN_MEMBERS").unwrap()];
        let missing = missing(&required, Permissions::KICK_MEMBERS);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].id, "BAN_MEMBERS");
    }

    #[test]
    fn test_administrator_covers_everything() {
        let required = [lookup("BAN_MEMBERS").unwrap()];
        assert!(missing(&required, Permissions::ADMINISTRATOR).is_empty());
    }

    #[test]
    fn test_describe() {
        let one = [lookup("EMBED_LINKS").unwrap()];
        assert_eq!(describe(&one), "`Embed links` permission");

        let two = [lookup("KICK_MEMBERS").unwrap(), lookup("BAN_MEMBERS").unwrap()];
        assert_eq!(describe(&two), "`Kick members`, `Ban members` permissions");
    }
}
