use anyhow::{Context, Result};
use forge_core::project::{default_constraints, get_default_templates, join_stacks};

pub fn templates(json: bool) -> Result<()> {
    let templates = get_default_templates();
    if json {
        let body = serde_json::to_string_pretty(&templates).context("Failed to encode templates")?;
        println!("{body}");
        return Ok(());
    }

    for template in &templates {
        println!("{} [{}]", template.name, template.icon);
        println!("    {}", template.description);
        if let Some(stacks) = &template.config.selected_stacks {
            println!("    stack: {}", join_stacks(stacks));
        }
        if let Some(tone) = template.config.tone {
            println!("    tone:  {tone}");
        }
    }
    Ok(())
}

pub fn constraints(json: bool) -> Result<()> {
    let catalog = default_constraints();
    if json {
        let body = serde_json::to_string_pretty(&catalog).context("Failed to encode constraints")?;
        println!("{body}");
        return Ok(());
    }

    for constraint in &catalog {
        let mark = if constraint.active { "x" } else { " " };
        println!(
            "[{mark}] {:<18} {} ({})",
            constraint.id, constraint.label, constraint.category
        );
        println!("    {}", constraint.description);
    }
    Ok(())
}
