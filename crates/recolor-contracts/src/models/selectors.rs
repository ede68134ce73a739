use super::registry::ModelRegistry;

pub const IMAGE_CAPABILITY: &str = "image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    /// Identifier sent on the wire, verbatim.
    pub model: String,
    pub known: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    pub registry: ModelRegistry,
}

impl ModelSelector {
    pub fn new(registry: Option<ModelRegistry>) -> Self {
        Self {
            registry: registry.unwrap_or_default(),
        }
    }

    /// Resolves the model for an image request.
    ///
    /// An unknown but non-blank id is passed through untouched; the backend
    /// is the authority on what it serves.
    pub fn select(&self, requested: Option<&str>) -> Result<ModelSelection, String> {
        if let Some(requested_value) = requested
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            let known = self
                .registry
                .get(requested_value)
                .map(|model| model.supports(IMAGE_CAPABILITY))
                .unwrap_or(false);
            let note = (!known).then(|| {
                format!(
                    "Model '{requested_value}' is not in the known image model list; sending as-is."
                )
            });
            return Ok(ModelSelection {
                model: requested_value.to_string(),
                known,
                note,
            });
        }

        let candidates = self.registry.by_capability(IMAGE_CAPABILITY);
        let Some(model) = candidates.first() else {
            return Err(format!(
                "No models available for capability '{IMAGE_CAPABILITY}'."
            ));
        };
        Ok(ModelSelection {
            model: model.name.clone(),
            known: true,
            note: Some("No model specified; using default.".to_string()),
        })
    }
}
