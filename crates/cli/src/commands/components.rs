use clap::Args;
use twilink_component::{ComponentRegistry, PortSpec};

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ComponentsArgs {
    /// Show only this component.
    pub name: Option<String>,
}

pub fn run(
    registry: &ComponentRegistry,
    args: &ComponentsArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let specs: Vec<_> = registry
        .specs()
        .into_iter()
        .filter(|s| args.name.as_deref().is_none_or(|n| n == s.name))
        .collect();
    if let Some(name) = &args.name
        && specs.is_empty()
    {
        anyhow::bail!("unknown component '{name}'");
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&specs)?);
        }
        OutputFormat::Text => {
            for spec in specs {
                println!("{}: {}", spec.name, spec.description);
                print_port_list("inputs", spec.inputs);
                print_port_list("outputs", spec.outputs);
            }
        }
    }
    Ok(())
}

fn print_port_list(label: &str, ports: &[PortSpec]) {
    if ports.is_empty() {
        return;
    }
    println!("  {label}:");
    for port in ports {
        let marker = if port.required { "*" } else { " " };
        println!("    {marker} {:<16} {}", port.name, port.description);
    }
}
