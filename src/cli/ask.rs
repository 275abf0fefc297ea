// src/cli/ask.rs — One-shot question from the terminal

use crate::infra::config::Config;
use crate::provider::cascade::ResolveOptions;
use crate::provider::{registry, router};
use crate::provider::ChatRequest;

pub async fn run_ask(
    config: &Config,
    message: &str,
    provider: Option<String>,
    strict: bool,
) -> anyhow::Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("Message cannot be empty");
    }

    let client = registry::http_client();
    let resolver = registry::build_resolver(config, &client)?;

    let system = if config.cascade.system_prompt.trim().is_empty() {
        router::classify(message).system_prompt().to_string()
    } else {
        config.cascade.system_prompt.clone()
    };
    let request = ChatRequest::new(message.trim()).with_system(system);
    let options = ResolveOptions {
        pinned: provider,
        strict,
        preferred: None,
    };

    let resolution = resolver.resolve(&request, &options).await;

    println!("{}", resolution.text);
    eprintln!();
    eprintln!("  [{} / {}]", resolution.provider, resolution.model);
    for attempt in &resolution.attempts {
        let outcome = match attempt.error_kind {
            None => "ok".to_string(),
            Some(kind) => kind.to_string(),
        };
        eprintln!(
            "    {:<18} {:<20} {}ms",
            attempt.provider, outcome, attempt.elapsed_ms
        );
    }
    Ok(())
}
