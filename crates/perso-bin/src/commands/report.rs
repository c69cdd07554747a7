//! Bug reports.

use anyhow::{bail, Context, Result};

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Forward a bug report from `user`.
pub async fn report(app: &App, user: &str, message: &str, format: OutputFormat) -> Result<()> {
    if message.trim().is_empty() {
        bail!("bug report message is empty");
    }
    app.notifier
        .bug_report(user, message)
        .await
        .context("failed to send bug report")?;
    output::print_success("Bug report sent", format);
    Ok(())
}
