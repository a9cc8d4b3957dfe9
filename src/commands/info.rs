use super::CommandContext;
use courier_core::error::CourierError;
use courier_memory::decorate;

/// `info edit <text>` and `info send`. Owner only.
pub(super) async fn handle_info(ctx: &CommandContext<'_>) -> Result<Option<String>, CourierError> {
    if !ctx.caller.is_owner {
        return Err(CourierError::Unauthorized(
            "Only the bot owner can use this command.".into(),
        ));
    }

    let prefix = &ctx.config.discord.command_prefix;
    let action_end = ctx
        .args
        .find(char::is_whitespace)
        .unwrap_or(ctx.args.len());
    let (action, rest) = ctx.args.split_at(action_end);
    let owner = &ctx.incoming.sender_id;

    match action.to_lowercase().as_str() {
        "edit" => {
            let text = payment_text(rest);
            if text.trim().is_empty() {
                return Err(CourierError::InvalidInput(format!(
                    "Usage: `{prefix}info edit <payment methods>`"
                )));
            }
            ctx.store.edit(owner, text).await?;
            Ok(Some("💾 Payment methods saved.".to_string()))
        }
        "send" => {
            let text = ctx.store.send(owner).await?;
            Ok(Some(format!(
                "💳 Your payment methods:\n```\n{}\n```",
                decorate(&text)
            )))
        }
        _ => Err(CourierError::InvalidInput(format!(
            "Invalid action. Use `{prefix}info edit <text>` or `{prefix}info send`."
        ))),
    }
}

/// Drop the separator after `edit`: spaces or tabs, then at most one line break.
/// Everything else is the payment text as typed.
fn payment_text(rest: &str) -> &str {
    let rest = rest.trim_start_matches([' ', '\t']);
    rest.strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest)
}
