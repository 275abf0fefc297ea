// src/demo/mod.rs — Canned replies used when every provider fails
//
// Pure and synchronous: no I/O, never panics, O(number of templates).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use std::sync::Mutex;

use crate::infra::config::DemoConfig;
use crate::infra::errors::BoomError;

pub const GREETINGS: &[&str] = &[
    "Привет! Я ассистент BOOOMERANGS. Чем могу помочь?",
    "Здравствуйте! BOOOMERANGS на связи. Задайте свой вопрос.",
    "Привет! Сейчас я работаю в демонстрационном режиме, но с радостью отвечу.",
];

const SMALL_TALK: &[&str] = &[
    "У меня всё отлично! А как ваши дела?",
    "Всё работает как часы. Чем займёмся?",
];

const IMAGES: &[&str] = &[
    "Если вы хотите создать изображение, перейдите на вкладку \"Генератор Изображений\" в верхней части страницы.",
];

const PRODUCT: &[&str] = &[
    "BOOOMERANGS - это мультимодальный AI-сервис для общения и создания изображений без API-ключей.",
];

const CAPABILITIES: &[&str] = &[
    "Мои возможности: текстовый чат с контекстом разговора, генерация изображений, \
     сохранение истории чатов и автоматическое переключение между AI провайдерами.",
];

const API_KEYS: &[&str] = &[
    "Для работы с платными AI нужны API ключи (например PERPLEXITY_API_KEY или HUGGINGFACE_API_KEY). \
     Без ключей BOOOMERANGS использует бесплатные провайдеры и демо режим.",
];

/// Returned when no template matches.
pub const GENERIC_RESPONSE: &str = "Спасибо за ваш вопрос! Сейчас все AI провайдеры недоступны, \
     поэтому BOOOMERANGS отвечает в демонстрационном режиме. Попробуйте ещё раз чуть позже.";

/// A pattern tested against the lower-cased message, and the replies it offers.
#[derive(Debug, Clone)]
pub struct DemoTemplate {
    pattern: Regex,
    responses: Vec<String>,
}

impl DemoTemplate {
    pub fn new(pattern: &str, responses: Vec<String>) -> Result<Self, BoomError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| BoomError::Config(format!("invalid demo pattern '{pattern}': {e}")))?;
        if responses.is_empty() {
            return Err(BoomError::Config(format!(
                "demo pattern '{pattern}' has no responses"
            )));
        }
        Ok(Self { pattern, responses })
    }

    fn builtin(pattern: &str, responses: &[&str]) -> Option<Self> {
        let pattern = Regex::new(pattern).ok()?;
        Some(Self {
            pattern,
            responses: responses.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn is_match(&self, lowered: &str) -> bool {
        self.pattern.is_match(lowered)
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }
}

/// Built-in templates, in match order.
pub fn default_templates() -> Vec<DemoTemplate> {
    [
        (r"привет|здравств|\bhello\b|\bhi\b", GREETINGS),
        (r"как дела|как ты|how are you", SMALL_TALK),
        (r"изображени|картинк|\bimage|\bpicture", IMAGES),
        (r"booomerangs", PRODUCT),
        (r"возможност|что умеешь|capabilit", CAPABILITIES),
        (r"\bapi\b|ключ|провайдер|\bkeys?\b", API_KEYS),
    ]
    .into_iter()
    .filter_map(|(pattern, responses)| DemoTemplate::builtin(pattern, responses))
    .collect()
}

pub struct DemoResponder {
    templates: Vec<DemoTemplate>,
    rng: Mutex<StdRng>,
}

impl DemoResponder {
    pub fn new(templates: Vec<DemoTemplate>) -> Self {
        Self {
            templates,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Same seed, same sequence of choices.
    pub fn with_seed(templates: Vec<DemoTemplate>, seed: u64) -> Self {
        Self {
            templates,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Built-in templates followed by configured ones.
    pub fn from_config(config: &DemoConfig) -> Result<Self, BoomError> {
        let mut templates = default_templates();
        for entry in &config.templates {
            templates.push(DemoTemplate::new(&entry.pattern, entry.responses.clone())?);
        }
        Ok(match config.seed {
            Some(seed) => Self::with_seed(templates, seed),
            None => Self::new(templates),
        })
    }

    pub fn templates(&self) -> &[DemoTemplate] {
        &self.templates
    }

    pub fn respond(&self, message: &str) -> String {
        let lowered = message.to_lowercase();
        let Some(template) = self.templates.iter().find(|t| t.is_match(&lowered)) else {
            return GENERIC_RESPONSE.to_string();
        };

        let idx = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..template.responses.len()),
            Err(_) => 0,
        };
        template.responses[idx].clone()
    }
}

impl Default for DemoResponder {
    fn default() -> Self {
        Self::new(default_templates())
    }
}
