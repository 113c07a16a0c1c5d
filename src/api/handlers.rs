use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;
use std::time::Instant;

use crate::error::AssistError;
use crate::prompt;

use super::AppState;
use super::models::AssistRequest;

pub async fn assist_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AssistRequest>, JsonRejection>,
) -> Result<String, AssistError> {
    let start = Instant::now();

    let Json(request) = payload.map_err(|e| {
        log::debug!("rejected body: {e}");
        AssistError::BadRequest("Missing question".to_string())
    })?;

    let question = request
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AssistError::BadRequest("Missing question".to_string()))?;
    let brand = request
        .brand
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .unwrap_or(&state.settings.default_brand);
    let context = request.context.unwrap_or_default();

    let index = state.knowledge_base.snapshot().await;
    let snippets =
        state
            .query_engine
            .select_top_k(question, &index.documents, state.settings.max_snippets);

    let rag_block = prompt::render_rag_block(&context, &snippets, &state.settings.support_url);
    let system = prompt::system_prompt(brand);
    let user = prompt::user_message(question, &rag_block);

    let answer = match state.model.complete(&system, &user).await {
        Err(AssistError::MissingCredential(key)) if state.settings.local_fallback => {
            log::warn!("{key} not set, answering from the kb only");
            prompt::local_fallback(question, &rag_block, &snippets)
        }
        other => other?,
    };

    log::info!(
        "answered with {} snippets from {} documents in {}ms",
        snippets.len(),
        index.documents.len(),
        start.elapsed().as_millis()
    );
    Ok(answer)
}
