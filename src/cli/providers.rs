// src/cli/providers.rs — List configured adapters

use crate::infra::config::Config;
use crate::provider::credential_present;

fn credential_label(env: Option<&str>) -> String {
    match env {
        None => "keyless".into(),
        Some(var) if credential_present(Some(var)) => format!("{var} (set)"),
        Some(var) => format!("{var} (missing)"),
    }
}

pub fn show_providers(config: &Config) -> anyhow::Result<()> {
    let default_timeout = config.cascade.default_timeout_ms;

    println!("Chat providers (in cascade order):");
    for (i, p) in config.chat_providers().iter().enumerate() {
        println!(
            "  {}. {:<16} {:<28} {:>6}ms  {}",
            i + 1,
            p.name,
            p.model,
            p.timeout_ms.unwrap_or(default_timeout),
            credential_label(p.credential_env.as_deref())
        );
    }
    println!("  -> local-fallback (demo responder)");
    println!();

    println!("Image providers:");
    for (i, p) in config.image_providers().iter().enumerate() {
        println!(
            "  {}. {:<16} {:>6}ms  {}",
            i + 1,
            p.name,
            p.timeout_ms.unwrap_or(default_timeout),
            credential_label(p.credential_env.as_deref())
        );
    }
    println!("  -> local-fallback (SVG placeholder)");
    Ok(())
}
