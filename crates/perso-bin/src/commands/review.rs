//! Review decisions.

use anyhow::{bail, Result};
use perso_store::{PersonRecord, Status};
use tracing::{info, warn};

use crate::app::App;
use crate::notify::{review_notice, Decision};
use crate::output::{self, OutputFormat};

fn owned_record(app: &App, owner_id: &str, id: &str) -> Result<PersonRecord> {
    match app
        .store
        .find_by_owner(owner_id)?
        .into_iter()
        .find(|r| r.uuid == id)
    {
        Some(record) => Ok(record),
        None => bail!("no record {} for owner {}", id, owner_id),
    }
}

async fn send_notice(app: &App, notice: &str) {
    if let Err(e) = app.notifier.notify(notice).await {
        warn!(error = %e, "Failed to send review notice");
    }
}

/// Approve a pending request.
pub async fn review_approve(
    app: &App,
    owner_id: &str,
    id: &str,
    reviewer: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let record = owned_record(app, owner_id, id)?;
    if !app.store.set_status(owner_id, id, Status::Angenommen)? {
        bail!("record {} vanished during review", id);
    }
    info!(owner_id, id, reviewer, "Request approved");

    let notice = review_notice(Decision::Approved, record.kind(), reviewer, owner_id, id);
    send_notice(app, &notice).await;

    output::print_success(&format!("Approved: {}", id), format);
    Ok(())
}

/// Deny a request for `reason`. The record is marked denied and then
/// removed, freeing the owner's slot.
pub async fn review_deny(
    app: &App,
    owner_id: &str,
    id: &str,
    reviewer: Option<&str>,
    reason: &str,
    format: OutputFormat,
) -> Result<()> {
    let reason = reason.trim();
    if reason.is_empty() {
        bail!("a reason is required to deny a request");
    }
    let record = owned_record(app, owner_id, id)?;
    if !app.store.set_status(owner_id, id, Status::Abgelehnt)? {
        bail!("record {} vanished during review", id);
    }
    info!(owner_id, id, reviewer, reason, "Request denied");

    let decision = Decision::Denied { reason };
    let notice = review_notice(decision, record.kind(), reviewer, owner_id, id);
    send_notice(app, &notice).await;

    app.store.delete_record(owner_id, id)?;
    output::print_success(&format!("Denied and removed: {}", id), format);
    Ok(())
}
