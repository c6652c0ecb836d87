//! Plain-text tables for namespaces and resources

use bridge_core::types::{Namespace, Resource};

const HEADERS: [&str; 5] = ["NAME", "TYPE", "ARN", "VALUE", "ID"];

/// Render resources as an aligned table with a header row
pub fn render_resources(resources: &[&Resource]) -> String {
    let rows: Vec<[String; 5]> = resources
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.resource_type.clone(),
                r.arn.clone(),
                r.value.clone(),
                r.id.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// One namespace per line, the selected one marked with `*`
pub fn render_namespaces(namespaces: &[Namespace], current: Option<&Namespace>) -> String {
    namespaces
        .iter()
        .map(|ns| {
            let marker = if Some(ns) == current { '*' } else { ' ' };
            format!("{} {}", marker, ns)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every field of one resource, one per line
pub fn render_resource(resource: &Resource) -> String {
    format!(
        "name:  {}\ntype:  {}\narn:   {}\nvalue: {}\nid:    {}",
        resource.name, resource.resource_type, resource.arn, resource.value, resource.id
    )
}
