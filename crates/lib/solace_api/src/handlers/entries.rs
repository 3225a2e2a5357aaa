//! Entry page handlers.

use askama::Template;
use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use serde::Deserialize;
use solace_core::completion::support_prompt;
use tracing::{debug, info};

use crate::AppState;
use crate::error::AppResult;
use crate::views::IndexPage;

/// Form body for `POST /`. Missing fields, or a body that is not a usable
/// form at all, are treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitEntry {
    pub addiction_type: Option<String>,
    pub description: Option<String>,
}

/// `GET /` — render every stored entry, newest first.
pub async fn index_handler(State(state): State<AppState>) -> AppResult<Html<String>> {
    let entries = state.store.list_all_ordered().await?;
    debug!(count = entries.len(), "rendering entries");
    Ok(Html(IndexPage::new(entries).render()?))
}

/// `POST /` — ask for a supportive reply, store the exchange, redirect to `/`.
pub async fn submit_handler(
    State(state): State<AppState>,
    form: Result<Form<SubmitEntry>, FormRejection>,
) -> AppResult<impl IntoResponse> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!(%rejection, "unreadable form body, storing empty fields");
            SubmitEntry::default()
        }
    };
    let addiction_type = form.addiction_type.unwrap_or_default();
    let description = form.description.unwrap_or_default();

    let prompt = support_prompt(&addiction_type, &description);
    let response = state.completion.get_response(&prompt).await;

    let entry = state
        .store
        .append(&addiction_type, &description, &response)
        .await?;
    info!(id = entry.id, "entry stored");

    Ok((StatusCode::FOUND, [(header::LOCATION, "/")]))
}
