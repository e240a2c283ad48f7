pub mod components;
pub mod flow;
pub mod run;

use serde_json::Value;
use twilink_component::Ports;

/// Print output ports as indented `name: value` lines.
pub(crate) fn print_ports(ports: &Ports, indent: &str) {
    if ports.is_empty() {
        println!("{indent}(no outputs)");
    }
    for (name, value) in ports.iter() {
        println!("{indent}{name}: {}", display_value(&value.to_json()));
    }
}

/// Strings print bare; everything else as compact JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
