//! Cooldown lock commands.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use chrono::DateTime;

use crate::app::App;
use crate::output::{self, OutputFormat};

const SECS_PER_DAY: u64 = 86_400;

/// Ban `owner_id` from submitting for `days` days.
pub fn locks_set(app: &App, owner_id: &str, days: u64, format: OutputFormat) -> Result<()> {
    if days == 0 {
        bail!("lock duration must be at least one day");
    }
    let out_of_range = || format!("a lock of {} days is out of range", days);

    let secs = days.checked_mul(SECS_PER_DAY).with_context(out_of_range)?;
    let until = SystemTime::now()
        .checked_add(Duration::from_secs(secs))
        .with_context(out_of_range)?;
    let since_epoch = until.duration_since(UNIX_EPOCH)?;
    let shown = i64::try_from(since_epoch.as_secs())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, since_epoch.subsec_nanos()))
        .with_context(out_of_range)?;

    app.locks.lock_until(owner_id, until)?;
    output::print_success(
        &format!(
            "{} locked until {}",
            owner_id,
            shown.format(perso_store::TIME_FORMAT)
        ),
        format,
    );
    Ok(())
}

/// Lift a lock.
pub fn locks_clear(app: &App, owner_id: &str, format: OutputFormat) -> Result<()> {
    if app.locks.unlock(owner_id)? {
        output::print_success(&format!("{} unlocked", owner_id), format);
    } else {
        output::print_success(&format!("{} was not locked", owner_id), format);
    }
    Ok(())
}
