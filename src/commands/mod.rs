//! Bot commands: order tracking, shop status, payment info.

mod info;
mod order;
mod status;


use crate::gateway::Caller;
use courier_core::{
    config::Config,
    error::CourierError,
    message::IncomingMessage,
    traits::{Channel, NotificationSink},
};
use courier_memory::PaymentStore;
use courier_tracker::{ActiveSessions, StatusProvider};
use std::sync::Arc;
use tracing::warn;

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub channel: &'a dyn Channel,
    pub sink: Arc<dyn NotificationSink>,
    pub provider: Arc<dyn StatusProvider>,
    pub sessions: &'a ActiveSessions,
    pub store: &'a PaymentStore,
    pub config: &'a Config,
    pub caller: &'a Caller,
    pub incoming: &'a IncomingMessage,
    /// Everything after the command word. Trailing whitespace is kept.
    pub args: &'a str,
}

/// Known bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Order,
    Status,
    Info,
    Help,
}

impl Command {
    /// Parse a command from message text. Returns the command and its arguments,
    /// or `None` if the text is not a known command.
    pub fn parse<'t>(text: &'t str, prefix: &str) -> Option<(Self, &'t str)> {
        let body = text.trim_start().strip_prefix(prefix)?;
        let word_end = body.find(char::is_whitespace).unwrap_or(body.len());
        let (word, args) = body.split_at(word_end);
        let cmd = match word.to_lowercase().as_str() {
            "order" | "track" => Self::Order,
            "status" => Self::Status,
            "info" => Self::Info,
            "help" => Self::Help,
            _ => return None,
        };
        Some((cmd, args.trim_start()))
    }
}

/// Handle a command and return the reply, if any.
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) -> Option<String> {
    let result = match cmd {
        Command::Order => order::handle_order(ctx).await,
        Command::Status => status::handle_status(ctx).await,
        Command::Info => info::handle_info(ctx).await,
        Command::Help => Ok(Some(help_text(&ctx.config.discord.command_prefix))),
    };

    match result {
        Ok(reply) => reply,
        Err(e) => {
            warn!(
                "command {cmd:?} from {} failed: {e}",
                ctx.incoming.sender_id
            );
            Some(render_error(&e, &ctx.config.discord.command_prefix))
        }
    }
}

/// Turn a command error into a user-facing reply.
fn render_error(err: &CourierError, prefix: &str) -> String {
    match err {
        CourierError::Unauthorized(msg) => format!("⛔ {msg}"),
        CourierError::InvalidInput(msg) => format!("❌ {msg}"),
        CourierError::NotFound(_) => {
            format!("❌ No payment methods saved. Use `{prefix}info edit` to add them.")
        }
        CourierError::AlreadyTracking(_) => {
            format!("⚠️ An order is already being tracked in this channel. Use `{prefix}order stop` first.")
        }
        CourierError::ChannelNotFound(_) => "❌ The shop status channel could not be found.".into(),
        CourierError::RenameFailed(msg) => format!("❌ Could not rename the shop channel: {msg}"),
        other => format!("❌ Something went wrong: {other}"),
    }
}

fn help_text(prefix: &str) -> String {
    format!(
        "**Courier commands**\n\
         `{prefix}order <link or id> [ping]` track an order in this channel\n\
         `{prefix}order stop` stop tracking in this channel\n\
         `{prefix}status <open|closed>` set the shop status\n\
         `{prefix}info edit <text>` save your payment methods\n\
         `{prefix}info send` show your payment methods\n\
         `{prefix}help` this message"
    )
}
