//! Who is calling, and what they may do.

use super::Gateway;
use courier_core::{config::DiscordConfig, message::IncomingMessage};
use tracing::warn;

/// Caller permissions resolved once per command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caller {
    /// Listed in `discord.owners`.
    pub is_owner: bool,
    /// Holds a role with the ADMINISTRATOR permission.
    pub is_admin: bool,
    /// Holds one of `discord.staff_roles`.
    pub has_staff_role: bool,
}

impl Caller {
    /// Resolve permissions from config and the sender's roles.
    pub fn resolve(config: &DiscordConfig, incoming: &IncomingMessage, is_admin: bool) -> Self {
        Self {
            is_owner: config.owners.iter().any(|o| o == &incoming.sender_id),
            is_admin,
            has_staff_role: incoming
                .sender_roles
                .iter()
                .any(|r| config.staff_roles.contains(r)),
        }
    }

    /// Allowed to track orders and toggle the shop status.
    pub fn can_manage(&self) -> bool {
        self.is_owner || self.is_admin || self.has_staff_role
    }
}

impl Gateway {
    /// Look up the caller's permissions. A failed admin lookup counts as "not admin".
    pub(super) async fn resolve_caller(&self, incoming: &IncomingMessage) -> Caller {
        let is_admin = match incoming.guild_id.as_deref() {
            Some(guild_id) => self
                .channel
                .is_administrator(guild_id, &incoming.sender_roles)
                .await
                .unwrap_or_else(|e| {
                    warn!("admin lookup for {} failed: {e}", incoming.sender_id);
                    false
                }),
            None => false,
        };
        Caller::resolve(&self.config.discord, incoming, is_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incoming(sender_id: &str, roles: &[&str]) -> IncomingMessage {
        IncomingMessage {
            id: uuid::Uuid::new_v4(),
            channel: "discord".into(),
            sender_id: sender_id.into(),
            sender_name: None,
            text: "!help".into(),
            timestamp: chrono::Utc::now(),
            reply_target: Some("c1".into()),
            guild_id: Some("g1".into()),
            sender_roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn config() -> DiscordConfig {
        DiscordConfig {
            owners: vec!["owner-1".into()],
            staff_roles: vec!["staff".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_owner_can_manage() {
        let caller = Caller::resolve(&config(), &incoming("owner-1", &[]), false);
        assert!(caller.is_owner);
        assert!(caller.can_manage());
    }

    #[test]
    fn test_staff_role_can_manage() {
        let caller = Caller::resolve(&config(), &incoming("u2", &["member", "staff"]), false);
        assert!(!caller.is_owner);
        assert!(caller.has_staff_role);
        assert!(caller.can_manage());
    }

    #[test]
    fn test_admin_can_manage() {
        let caller = Caller::resolve(&config(), &incoming("u3", &[]), true);
        assert!(caller.can_manage());
        assert!(!caller.is_owner);
    }

    #[test]
    fn test_nobody_cannot_manage() {
        let caller = Caller::resolve(&config(), &incoming("u4", &["member"]), false);
        assert!(!caller.can_manage());
    }
}
