//! Prompt assembly: the system instruction, the retrieval block appended to the user's question,
//! and the plain answer returned when no model is configured.

use serde::Deserialize;

use crate::data_models::Snippet;

/// Where the user currently is in the troubleshooting UI.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistContext {
    pub path: Vec<String>,
    pub steps: Vec<String>,
    pub crumbs: Vec<String>,
}

pub fn system_prompt(brand: &str) -> String {
    format!(
        "You are an on-call {brand} POS support assistant.\n\
         Be concise, decisive, and safe. Use numbered steps.\n\
         Prefer exact, verified settings from the KB.\n\
         If matching a known flow, cite it in **bold**.\n\
         Ask for missing info only if it blocks next action.\n\
         If hardware might be faulty, suggest swapping with a known-good device and collecting serial/firmware.\n\
         If escalation is required, list screenshots/logs and include the support URL."
    )
}

/// Renders breadcrumbs, flow path, current steps and KB snippets as blank-line separated
/// sections. Empty sections are left out; the support URL is always last.
pub fn render_rag_block(context: &AssistContext, snippets: &[Snippet], support_url: &str) -> String {
    let mut sections: Vec<String> = Vec::new();
    if !context.crumbs.is_empty() {
        sections.push(format!("Breadcrumbs: {}", context.crumbs.join(" > ")));
    }
    if !context.path.is_empty() {
        sections.push(format!("Flow Path: {}", context.path.join(" > ")));
    }
    if !context.steps.is_empty() {
        sections.push(format!("Current Steps:\n- {}", context.steps.join("\n- ")));
    }
    if !snippets.is_empty() {
        sections.push("KB Snippets:".to_string());
        for s in snippets {
            sections.push(format!("• [{}] {}\n  URL: {}", s.title, s.excerpt, s.url));
        }
    }
    sections.push(format!("Support URL: {support_url}"));
    sections.join("\n\n")
}

pub fn user_message(question: &str, rag_block: &str) -> String {
    format!("Question: {question}\n\n{rag_block}")
}

/// Answer built only from the retrieved snippets, for deployments without a model key.
pub fn local_fallback(question: &str, rag_block: &str, snippets: &[Snippet]) -> String {
    let mut lines = vec![
        "Local fallback (no external model).".to_string(),
        format!("Question: {question}"),
        rag_block.to_string(),
        "\nNext steps:".to_string(),
    ];
    for (i, s) in snippets.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, s.excerpt.trim()));
        lines.push(format!("   ↳ {}", s.url));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(n: usize) -> Snippet {
        Snippet {
            url: format!("https://kb.example.com/a{n}"),
            title: format!("Article {n}"),
            excerpt: format!("excerpt {n}"),
        }
    }

    #[test]
    fn test_rag_block_only_support_url() {
        let block = render_rag_block(&AssistContext::default(), &[], "https://support");
        assert_eq!(block, "Support URL: https://support");
    }

    #[test]
    fn test_rag_block_full() {
        let context = AssistContext {
            path: vec!["root".into(), "printers".into()],
            steps: vec!["Power cycle".into(), "Check cable".into()],
            crumbs: vec!["Home".into(), "Printers".into()],
        };
        let block = render_rag_block(&context, &[snippet(1)], "https://support");
        assert_eq!(
            block,
            "Breadcrumbs: Home > Printers\n\n\
             Flow Path: root > printers\n\n\
             Current Steps:\n- Power cycle\n- Check cable\n\n\
             KB Snippets:\n\n\
             • [Article 1] excerpt 1\n  URL: https://kb.example.com/a1\n\n\
             Support URL: https://support"
        );
    }

    #[test]
    fn test_system_prompt_mentions_brand() {
        let prompt = system_prompt("AcmePOS");
        assert!(prompt.starts_with("You are an on-call AcmePOS POS support assistant."));
        assert!(prompt.contains("numbered steps"));
    }

    #[test]
    fn test_user_message() {
        assert_eq!(user_message("why?", "block"), "Question: why?\n\nblock");
    }

    #[test]
    fn test_local_fallback_lists_snippets() {
        let answer = local_fallback("printer offline", "block", &[snippet(1), snippet(2)]);
        assert!(answer.starts_with("Local fallback (no external model).\nQuestion: printer offline\nblock"));
        assert!(answer.contains("1. excerpt 1\n   ↳ https://kb.example.com/a1"));
        assert!(answer.contains("2. excerpt 2\n   ↳ https://kb.example.com/a2"));
    }
}
