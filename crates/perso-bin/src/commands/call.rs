//! Raw backend calls.

use anyhow::{bail, Result};
use perso_channel::RemoteReply;
use serde_json::Value;
use tracing::debug;

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Parse CLI arguments as JSON values; anything that is not valid JSON is
/// sent as a string.
pub(crate) fn parse_args(raw: &[String]) -> Vec<Value> {
    raw.iter()
        .map(|arg| serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.clone())))
        .collect()
}

/// Call `module.function(args...)` on the backend and print the reply.
pub async fn call(
    app: &App,
    module: &str,
    function: &str,
    args: &[String],
    format: OutputFormat,
) -> Result<()> {
    let client = app.channel()?;
    let arguments = parse_args(args);
    debug!(module, function, args = arguments.len(), "Calling backend");

    let reply = client.call(module, function, arguments).await?;

    match RemoteReply::from_value(reply) {
        RemoteReply::Ok(value) => match (format, &value) {
            (OutputFormat::Text, Value::String(s)) => println!("{}", s),
            _ => output::print_json(&value)?,
        },
        RemoteReply::Failed { message, body } => {
            if format == OutputFormat::Json {
                output::print_json(&body)?;
            }
            bail!("{}.{} failed on the backend: {}", module, function, message);
        }
    }

    Ok(())
}
