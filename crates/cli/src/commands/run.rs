use clap::Args;
use serde_json::Value;
use tracing::debug;
use twilink_component::{ComponentRegistry, Ports};

use super::print_ports;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Component name, e.g. `twilio_send_sms`.
    pub component: String,
    /// Input port value (key=value). Booleans, null, objects and arrays are
    /// parsed as JSON; everything else, numbers included, is kept as text.
    #[arg(long = "input", short = 'i', value_parser = parse_key_val)]
    pub inputs: Vec<(String, Value)>,
    /// All inputs as a JSON object (string or @file path). `--input`
    /// values override its members.
    #[arg(long = "inputs")]
    pub inputs_json: Option<String>,
}

fn parse_key_val(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_owned(), parse_value(raw)))
}

/// Numbers stay as the exact text typed; integer ports still accept them.
fn parse_value(raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(Value::Number(_)) | Err(_) => Value::String(raw.to_owned()),
        Ok(value) => value,
    }
}

fn read_inputs_json(arg: &str) -> anyhow::Result<Ports> {
    let value: Value = if let Some(path) = arg.strip_prefix('@') {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        serde_json::from_str(arg)?
    };
    match value {
        Value::Object(map) => Ok(Ports::from_json_object(map)),
        other => anyhow::bail!("--inputs must be a JSON object, got {other}"),
    }
}

pub(crate) fn collect_inputs(args: &RunArgs) -> anyhow::Result<Ports> {
    let mut ports = match &args.inputs_json {
        Some(arg) => read_inputs_json(arg)?,
        None => Ports::new(),
    };
    for (key, value) in &args.inputs {
        ports.insert(key.clone(), value.clone());
    }
    Ok(ports)
}

pub async fn run(
    registry: &ComponentRegistry,
    args: &RunArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let inputs = collect_inputs(args)?;
    debug!(component = %args.component, inputs = inputs.len(), "running component");

    let outputs = registry.run(&args.component, &inputs).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outputs)?);
        }
        OutputFormat::Text => {
            println!("{}:", args.component);
            print_ports(&outputs, "  ");
        }
    }
    Ok(())
}
