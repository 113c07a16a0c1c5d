use serde::Deserialize;

use crate::prompt::AssistContext;

#[derive(Debug, Default, Deserialize)]
pub struct AssistRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub context: Option<AssistContext>,
    #[serde(default)]
    pub brand: Option<String>,
}

/// Per-deployment knobs the handler needs besides the index and the model.
#[derive(Debug, Clone)]
pub struct AssistSettings {
    pub max_snippets: usize,
    pub default_brand: String,
    pub support_url: String,
    pub local_fallback: bool,
}
