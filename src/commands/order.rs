use super::CommandContext;
use courier_core::{config::PingDefault, error::CourierError};
use courier_tracker::{extract_order_id, SessionOutcome, TrackingSession};
use std::time::Duration;
use tracing::{info, warn};

/// `order <link-or-id> [ping-target]` and `order stop`.
pub(super) async fn handle_order(ctx: &CommandContext<'_>) -> Result<Option<String>, CourierError> {
    if !ctx.caller.can_manage() {
        return Err(CourierError::Unauthorized(
            "You are not allowed to track orders.".into(),
        ));
    }

    let channel_id = ctx
        .incoming
        .reply_target
        .clone()
        .ok_or_else(|| CourierError::Channel("message has no channel".into()))?;
    let prefix = &ctx.config.discord.command_prefix;

    let mut args = ctx.args.split_whitespace();
    let Some(first) = args.next() else {
        return Err(CourierError::InvalidInput(format!(
            "Usage: `{prefix}order <link or id> [ping]`"
        )));
    };

    if first.eq_ignore_ascii_case("stop") {
        let reply = if ctx.sessions.cancel(&channel_id) {
            "🛑 Stopped tracking in this channel."
        } else {
            "No order is being tracked in this channel."
        };
        return Ok(Some(reply.to_string()));
    }

    let order = extract_order_id(first).ok_or_else(|| {
        CourierError::InvalidInput("No order id found in that link.".into())
    })?;

    let target = match args.next() {
        Some(explicit) => explicit.to_string(),
        None => match ctx.config.tracker.default_ping {
            PingDefault::Everyone => "@everyone".to_string(),
            PingDefault::Requester => ctx.incoming.sender_mention(),
        },
    };

    let session = TrackingSession::new(
        Some(order.clone()),
        channel_id.clone(),
        target,
        ctx.provider.clone(),
        ctx.sink.clone(),
    )
    .with_mode(ctx.config.tracker.destination)
    .with_interval(Duration::from_secs(ctx.config.tracker.poll_interval_secs));

    let log_order = order.clone();
    let _session = ctx.sessions.spawn(&channel_id, async move {
        match session.run().await {
            SessionOutcome::Completed => info!("tracker: session for {log_order} finished"),
            SessionOutcome::Failed(e) => warn!("tracker: session for {log_order} failed: {e}"),
            SessionOutcome::Rejected(e) => warn!("tracker: session for {log_order} rejected: {e}"),
        }
    })?;

    info!(
        "order {order} tracking requested by {} in {channel_id}",
        ctx.incoming.sender_id
    );
    // The session announces itself.
    Ok(None)
}
