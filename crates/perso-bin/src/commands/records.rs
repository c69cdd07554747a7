//! Record management commands.

use std::collections::HashMap;
use std::time::SystemTime;

use anyhow::{bail, Result};
use perso_store::{
    ensure_capacity, DocumentKind, FormSchema, PersonRecord, KEY_BIRTH_DATE, KEY_BIRTH_PLACE,
    KEY_FULL_NAME, KEY_GENDER, KEY_HEIGHT,
};
use tracing::{info, warn};

use crate::app::App;
use crate::notify::{review_notice, Decision};
use crate::output::{self, OutputFormat};

/// Form values for `records submit`.
#[derive(Debug, Clone, Default)]
pub struct SubmitArgs {
    pub name: String,
    pub birth_date: String,
    pub birth_place: String,
    pub height: String,
    pub gender: String,
    pub forged: bool,
}

impl SubmitArgs {
    fn values(&self) -> HashMap<String, String> {
        [
            (KEY_FULL_NAME, &self.name),
            (KEY_BIRTH_DATE, &self.birth_date),
            (KEY_BIRTH_PLACE, &self.birth_place),
            (KEY_HEIGHT, &self.height),
            (KEY_GENDER, &self.gender),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }
}

/// File a new pending request for `owner_id`.
pub async fn records_submit(
    app: &App,
    owner_id: &str,
    args: &SubmitArgs,
    format: OutputFormat,
) -> Result<String> {
    if let Some(days) = app.locks.remaining_days(owner_id, SystemTime::now()) {
        bail!("owner {} is locked for another {} day(s)", owner_id, days);
    }
    ensure_capacity(app.store.as_ref(), owner_id)?;

    let kind = if args.forged {
        DocumentKind::Forged
    } else {
        DocumentKind::Official
    };
    let form = match FormSchema::document(kind).validate(&args.values()) {
        Ok(form) => form,
        Err(errors) => {
            let problems: Vec<String> = errors.iter().map(ToString::to_string).collect();
            bail!("invalid form: {}", problems.join("; "));
        }
    };

    let id = app.store.add_record(owner_id, form.into_record(kind))?;
    info!(owner_id, id = %id, kind = %kind, "Request submitted");

    let notice = review_notice(Decision::Submitted, kind, None, owner_id, &id);
    if let Err(e) = app.notifier.notify(&notice).await {
        warn!(error = %e, "Failed to send submission notice");
    }

    output::print_success(&format!("Request submitted: {}", id), format);
    Ok(id)
}

/// List an owner's records.
pub fn records_list(app: &App, owner_id: &str, format: OutputFormat) -> Result<()> {
    let records = app.store.find_by_owner(owner_id)?;

    match format {
        OutputFormat::Json => output::print_json(&records)?,
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No records for {}", owner_id);
                return Ok(());
            }
            println!("{:<36} {:<3} {:<12} {:<17} {}", "UUID", "Typ", "Status", "Erstellt", "Name");
            output::print_divider();
            for record in &records {
                println!(
                    "{:<36} {:<3} {:<12} {:<17} {}",
                    record.uuid,
                    record.kind(),
                    record.status,
                    record.time,
                    record.vollstaendiger_name
                );
            }
        }
    }
    Ok(())
}

/// Show one record by uuid.
pub fn records_show(app: &App, id: &str, format: OutputFormat) -> Result<()> {
    let Some(record) = app.store.find_by_id(id)? else {
        bail!("record not found: {}", id);
    };

    match format {
        OutputFormat::Json => output::print_json(&record)?,
        OutputFormat::Text => print_record(&record),
    }
    Ok(())
}

fn print_record(record: &PersonRecord) {
    output::print_row("UUID", &record.uuid);
    output::print_row("Nick", &record.nick);
    output::print_row("Vorname & Nachname", &record.vollstaendiger_name);
    output::print_row("Geburtsdatum", &record.geburtsdatum);
    output::print_row("Geburtsort / Nationalität", &record.geburtsort_nationalitaet);
    output::print_row("Größe", &record.groesse);
    output::print_row("Geschlecht", &record.geschlecht);
    output::print_row("Status", record.status.as_str());
    output::print_row("Typ", record.kind().code());
    output::print_row("Erstellt am", &record.time);
}

/// Delete one of an owner's records.
pub fn records_delete(app: &App, owner_id: &str, id: &str, format: OutputFormat) -> Result<()> {
    if !app.store.delete_record(owner_id, id)? {
        bail!("no record {} for owner {}", id, owner_id);
    }
    info!(owner_id, id, "Record deleted");
    output::print_success(&format!("Record deleted: {}", id), format);
    Ok(())
}

/// Print how many records an owner has.
pub fn records_count(app: &App, owner_id: &str, format: OutputFormat) -> Result<usize> {
    let count = app.store.count_by_owner(owner_id)?;
    match format {
        OutputFormat::Text => println!("{}", count),
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "owner_id": owner_id,
            "count": count,
        }))?,
    }
    Ok(count)
}
