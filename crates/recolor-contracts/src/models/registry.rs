use indexmap::IndexMap;
use serde::Serialize;

/// A chat-completion model known to return image output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    pub name: String,
    pub provider: String,
    pub capabilities: Vec<String>,
}

impl ModelSpec {
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|item| item == capability)
    }
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }

    pub fn by_capability(&self, capability: &str) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| model.supports(capability))
            .cloned()
            .collect()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

// First entry is the default image model.
fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    let mut insert = |name: &str, provider: &str, capabilities: &[&str]| {
        map.insert(
            name.to_string(),
            ModelSpec {
                name: name.to_string(),
                provider: provider.to_string(),
                capabilities: capabilities
                    .iter()
                    .map(|item| (*item).to_string())
                    .collect(),
            },
        );
    };

    insert(
        crate::config::DEFAULT_MODEL,
        "google",
        &["image", "text", "vision"],
    );
    insert(
        "google/gemini-2.5-flash-image",
        "google",
        &["image", "text", "vision"],
    );
    insert(
        "google/gemini-3-pro-image-preview",
        "google",
        &["image", "text", "vision"],
    );
    insert("openai/gpt-5-image", "openai", &["image", "text", "vision"]);
    insert(
        "openai/gpt-5-image-mini",
        "openai",
        &["image", "text", "vision"],
    );
    insert("openai/gpt-4o-mini", "openai", &["text", "vision"]);

    map
}
