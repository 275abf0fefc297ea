// src/provider/router.rs — Message topic classification for system prompts

use serde::Serialize;

/// Topic of a chat message, detected by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Technical,
    Creative,
    Analytical,
    Factual,
    Current,
    Mathematical,
    Business,
    Translation,
    Multimodal,
    General,
}

/// Lower-case substrings per category. Earlier rows win ties.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Technical,
        &[
            "код", "программирование", "javascript", "python", "java", "c++", "c#", "coding",
            "programming", "code", "алгоритм", "algorithm", "функция", "function", "api",
            "сервер", "server", "backend", "frontend", "фронтенд", "бэкенд", "database",
            "база данных", "sql", "nosql", "mongodb", "json", "html", "css", "git", "github",
            "docker", "kubernetes", "devops", "react", "angular", "vue", "node", "npm", "yarn",
            "webpack", "babel", "typescript", "rust", "golang",
        ],
    ),
    (
        Category::Creative,
        &[
            "творчество", "креатив", "придумай", "сочини", "напиши", "создай", "генерация",
            "стих", "поэма", "рассказ", "история", "сказка", "роман", "новелла", "песня",
            "creative", "poem", "story", "tale", "fiction", "writing", "screenplay", "script",
            "слоган", "лозунг", "реклама", "маркетинг", "рифма", "метафора", "аллегория",
        ],
    ),
    (
        Category::Analytical,
        &[
            "анализ", "объясни", "почему", "сравни", "логика", "философия", "размышление",
            "докажи", "опровергни", "дилемма", "аргумент", "точка зрения", "критика",
            "analyze", "explain", "compare", "contrast", "philosophy", "ethics", "morality",
            "pros and cons", "advantages", "disadvantages", "thesis", "hypothesis",
            "научный метод", "research", "study", "investigation", "exploration",
        ],
    ),
    (
        Category::Factual,
        &[
            "факт", "информация", "статистика", "данные", "история", "событие", "дата", "кто",
            "что", "где", "когда", "fact", "information", "statistics", "data", "history",
            "event", "date", "who", "what", "where", "when", "how many", "how much",
            "определение", "definition", "термин", "term", "concept", "понятие",
        ],
    ),
    (
        Category::Current,
        &[
            "новости", "актуальный", "последний", "текущий", "событие", "сегодня", "вчера",
            "новость", "news", "recent", "current", "latest", "today", "yesterday", "update",
            "тренд", "trend", "breaking", "headline", "заголовок", "месяц", "неделя", "год",
        ],
    ),
    (
        Category::Mathematical,
        &[
            "математика", "вычисления", "расчет", "формула", "уравнение", "интеграл",
            "производная", "тригонометрия", "геометрия", "алгебра", "math", "calculation",
            "compute", "formula", "equation", "integral", "derivative", "trigonometry",
            "geometry", "algebra", "statistics", "calculus", "probability", "theorem",
        ],
    ),
    (
        Category::Business,
        &[
            "бизнес", "экономика", "финансы", "маркетинг", "стартап", "инвестиции", "продажи",
            "business", "economy", "finance", "marketing", "startup", "investment", "sales",
            "management", "strategy", "market", "customer", "client", "product", "service",
            "revenue", "profit", "loss", "bankruptcy", "accounting", "tax", "taxation",
        ],
    ),
    (
        Category::Translation,
        &[
            "перевод", "переведи", "перевести", "язык", "translation", "translate", "language",
            "с русского на", "с английского на", "from english to", "from russian to",
            "грамматика", "grammar", "spelling", "правописание", "синоним", "synonym",
            "антоним", "antonym", "идиома", "idiom", "фразеологизм", "phraseology",
        ],
    ),
    (
        Category::Multimodal,
        &[
            "изображение", "картинка", "фото", "фотография", "скриншот", "image", "picture",
            "photo", "screenshot", "опиши", "describe", "что изображено", "what is shown",
            "что на картинке", "what's in the picture", "проанализируй изображение",
        ],
    ),
];

/// Pick the category with the most keyword hits; `General` when none match.
pub fn classify(message: &str) -> Category {
    let lower = message.to_lowercase();
    let mut best = (Category::General, 0usize);
    for (category, keywords) in CATEGORY_KEYWORDS {
        let hits = keywords.iter().filter(|k| lower.contains(*k)).count();
        if hits > best.1 {
            best = (*category, hits);
        }
    }
    best.0
}

impl Category {
    /// System prompt used when neither the request nor the config sets one.
    pub fn system_prompt(self) -> &'static str {
        match self {
            Category::Technical => "Вы опытный программист. Давайте точные и подробные технические объяснения с примерами кода, где это уместно.",
            Category::Creative => "Вы творческий ассистент. Создавайте оригинальные, интересные и увлекательные тексты.",
            Category::Analytical => "Вы аналитический ассистент с критическим мышлением. Предоставляйте глубокий анализ, рассматривайте вопросы с разных сторон.",
            Category::Factual => "Вы информационный ассистент. Предоставляйте точные, проверенные факты, ссылайтесь на источники, где это возможно.",
            Category::Current => "Вы информационный ассистент с доступом к текущим данным. Предоставляйте актуальную информацию, где это возможно.",
            Category::Mathematical => "Вы математический эксперт. Предоставляйте точные формулы, шаги решения и объяснения математических концепций.",
            Category::Business => "Вы бизнес-консультант. Давайте практичные и реалистичные советы по бизнесу, маркетингу и финансам.",
            Category::Translation => "Вы профессиональный переводчик. Обеспечивайте точный и естественный перевод, сохраняя стиль и нюансы оригинала.",
            Category::Multimodal => "Вы визуальный аналитик. Детально описывайте содержимое изображений и отвечайте на вопросы о них.",
            Category::General => "Вы полезный ассистент. Отвечайте точно и по существу.",
        }
    }
}
