// src/provider/image.rs — Image generation cascade
//
// Same rules as the chat cascade: adapters are tried one at a time, each
// under its own timeout, and an inline SVG placeholder answers when every
// adapter fails.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::cascade::LOCAL_FALLBACK;
use crate::infra::errors::ProviderError;

/// One external image endpoint. Returns a URL the client can load.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &str;

    fn credential_env(&self) -> Option<&str> {
        None
    }

    fn timeout(&self) -> Duration;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct ImageResolution {
    pub image_url: String,
    pub provider: String,
}

impl ImageResolution {
    pub fn is_fallback(&self) -> bool {
        self.provider == LOCAL_FALLBACK
    }
}

pub struct ImageCascade {
    providers: Vec<Arc<dyn ImageProvider>>,
}

impl ImageCascade {
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Arc<dyn ImageProvider>] {
        &self.providers
    }

    /// Never fails; the placeholder is the last resort.
    pub async fn resolve(&self, prompt: &str) -> ImageResolution {
        for provider in &self.providers {
            let started = Instant::now();
            let timeout = provider.timeout();
            let outcome = match tokio::time::timeout(timeout, provider.generate(prompt)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::network(
                    provider.name(),
                    format!("timed out after {}ms", timeout.as_millis()),
                )),
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(url) if !url.trim().is_empty() => {
                    tracing::info!(provider = provider.name(), elapsed_ms, "Image generated");
                    return ImageResolution {
                        image_url: url,
                        provider: provider.name().to_string(),
                    };
                }
                Ok(_) => tracing::warn!(
                    provider = provider.name(),
                    elapsed_ms,
                    "Image provider returned an empty URL"
                ),
                Err(e) => tracing::warn!(
                    provider = provider.name(),
                    error_kind = %e.kind,
                    elapsed_ms,
                    "Image provider failed: {}",
                    e.message
                ),
            }
        }

        ImageResolution {
            image_url: placeholder_svg(prompt),
            provider: LOCAL_FALLBACK.to_string(),
        }
    }
}

/// `data:image/svg+xml;base64,...` showing the prompt.
pub fn placeholder_svg(prompt: &str) -> String {
    let caption = escape_xml(crate::util::truncate_str(prompt, 80));
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="512" height="512" viewBox="0 0 512 512"><rect width="512" height="512" fill="#1f2937"/><text x="256" y="236" font-family="sans-serif" font-size="22" fill="#f9fafb" text-anchor="middle">BOOOMERANGS</text><text x="256" y="276" font-family="sans-serif" font-size="16" fill="#d1d5db" text-anchor="middle">{caption}</text></svg>"##
    );
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::errors::ErrorKind;

    struct StubImage {
        name: &'static str,
        delay: Duration,
        reply: Result<&'static str, ErrorKind>,
    }

    #[async_trait]
    impl ImageProvider for StubImage {
        fn name(&self) -> &str {
            self.name
        }
        fn timeout(&self) -> Duration {
            Duration::from_millis(100)
        }
        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            tokio::time::sleep(self.delay).await;
            self.reply
                .map(str::to_string)
                .map_err(|kind| ProviderError::new(self.name, kind, "stub"))
        }
    }

    fn decode(data_url: &str) -> String {
        let b64 = data_url
            .strip_prefix("data:image/svg+xml;base64,")
            .unwrap();
        String::from_utf8(STANDARD.decode(b64).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let cascade = ImageCascade::new(vec![
            Arc::new(StubImage {
                name: "slow",
                delay: Duration::from_millis(300),
                reply: Ok("https://slow/img.png"),
            }),
            Arc::new(StubImage {
                name: "fast",
                delay: Duration::ZERO,
                reply: Ok("https://fast/img.png"),
            }),
        ]);
        let res = cascade.resolve("a cat").await;
        assert_eq!(res.provider, "fast");
        assert_eq!(res.image_url, "https://fast/img.png");
    }

    #[tokio::test]
    async fn test_all_fail_gives_placeholder() {
        let cascade = ImageCascade::new(vec![Arc::new(StubImage {
            name: "broken",
            delay: Duration::ZERO,
            reply: Err(ErrorKind::MissingCredential),
        })]);
        let res = cascade.resolve("a <red> cat").await;
        assert!(res.is_fallback());
        let svg = decode(&res.image_url);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("a &lt;red&gt; cat"));
    }

    #[test]
    fn test_placeholder_truncates_long_prompt() {
        let svg = decode(&placeholder_svg(&"x".repeat(500)));
        assert!(!svg.contains(&"x".repeat(200)));
    }
}
