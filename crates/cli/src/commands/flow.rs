use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde_json::json;
use tracing::info;
use twilink_component::{ComponentRegistry, Flow};

use super::print_ports;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct FlowArgs {
    /// Flow definition (YAML or JSON).
    pub file: PathBuf,
    /// Validate the flow without running it.
    #[arg(long)]
    pub check: bool,
}

pub(crate) fn load_flow(path: &Path) -> anyhow::Result<Flow> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read flow file {}", path.display()))?;
    serde_yaml_ng::from_str(&content)
        .with_context(|| format!("failed to parse flow file {}", path.display()))
}

pub async fn run(
    registry: &ComponentRegistry,
    args: &FlowArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let flow = load_flow(&args.file)?;

    if args.check {
        flow.validate(registry)?;
        info!(steps = flow.steps.len(), "flow is valid");
        match format {
            OutputFormat::Json => {
                println!("{}", json!({ "valid": true, "steps": flow.steps.len() }));
            }
            OutputFormat::Text => println!("flow OK ({} steps)", flow.steps.len()),
        }
        return Ok(());
    }

    let report = flow.run(registry).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if let Some(name) = &flow.name {
                println!("flow {name}:");
            }
            for step in &report.steps {
                println!("[{}] {}", step.id, step.component);
                print_ports(&step.outputs, "  ");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("twilink-{}-{name}", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_yaml_and_json_flows() {
        let yaml = write_temp(
            "flow.yaml",
            "steps:\n  - id: say\n    component: twiml_say\n    inputs:\n      text: hi\n",
        );
        let json = write_temp(
            "flow.json",
            r#"{"steps":[{"id":"say","component":"twiml_say","inputs":{"text":"hi"}}]}"#,
        );
        assert_eq!(load_flow(&yaml).unwrap().steps.len(), 1);
        assert_eq!(load_flow(&json).unwrap().steps[0].component, "twiml_say");
        std::fs::remove_file(yaml).unwrap();
        std::fs::remove_file(json).unwrap();
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_flow(Path::new("/nonexistent/flow.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/flow.yaml"));
    }

    #[tokio::test]
    async fn runs_an_offline_flow() {
        let path = write_temp(
            "offline.yaml",
            r"
steps:
  - id: menu
    component: twiml_gather
    inputs:
      prompt: Press 1
      num_digits: 1
",
        );
        let mut registry = ComponentRegistry::new();
        twilink_twilio::register_all(&mut registry, Arc::new(HashMap::<String, String>::new()));

        let args = FlowArgs {
            file: path.clone(),
            check: false,
        };
        run(&registry, &args, &OutputFormat::Json).await.unwrap();
        std::fs::remove_file(path).unwrap();
    }
}
