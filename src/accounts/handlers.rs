use askama::Template;
use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use super::dto::{EditQuery, UserEditForm};
use super::services::{apply_update, load_account, EditContext, UpdateOutcome};
use crate::{
    auth::AuthReseller,
    error::PageError,
    events::PanelEvent,
    flash::{self, PageMessage},
    state::AppState,
    views::{AccountFormView, UserEditTemplate},
};

/// Where a reseller lands after saving a customer.
pub const CUSTOMER_LIST_PATH: &str = "/users.php";

pub fn edit_routes() -> Router<AppState> {
    Router::new().route("/user_edit.php", get(edit_page).post(save_page))
}

#[instrument(skip(state, reseller, session), fields(reseller_id = reseller.id))]
pub async fn edit_page(
    State(state): State<AppState>,
    reseller: AuthReseller,
    session: Session,
    uri: Uri,
) -> Result<Response, PageError> {
    state.events.notify(PanelEvent::ResellerScriptStart);
    let admin_id = EditQuery::admin_id_in(&uri).ok_or(PageError::BadRequest)?;
    let account = load_account(&state, admin_id, reseller.id).await?;

    let pending = flash::take_messages(&session).await;
    render_page(&state, admin_id, AccountFormView::from_account(&account), pending)
}

#[instrument(skip(state, reseller, session, form), fields(reseller_id = reseller.id))]
pub async fn save_page(
    State(state): State<AppState>,
    reseller: AuthReseller,
    session: Session,
    uri: Uri,
    form: Result<Form<UserEditForm>, FormRejection>,
) -> Result<Response, PageError> {
    state.events.notify(PanelEvent::ResellerScriptStart);
    let admin_id = EditQuery::admin_id_in(&uri).ok_or(PageError::BadRequest)?;
    let account = load_account(&state, admin_id, reseller.id).await?;
    let Form(form) = form.map_err(|e| {
        warn!(error = %e, "unreadable edit form");
        PageError::BadRequest
    })?;

    if !form.wants_save() {
        let pending = flash::take_messages(&session).await;
        return render_page(&state, admin_id, AccountFormView::from_account(&account), pending);
    }

    let ctx = EditContext { reseller, admin_id };
    match apply_update(&state, &ctx, &account, &form).await? {
        UpdateOutcome::Success(messages) => {
            flash::push_messages(&session, &messages).await?;
            info!(admin_id, "customer updated; redirecting");
            // The page ends here; no ResellerScriptEnd on a redirect.
            Ok((
                StatusCode::FOUND,
                [(header::LOCATION, HeaderValue::from_static(CUSTOMER_LIST_PATH))],
            )
                .into_response())
        }
        UpdateOutcome::ValidationError(messages) => render_page(
            &state,
            admin_id,
            AccountFormView::from_submission(&account, &form),
            messages,
        ),
        UpdateOutcome::AuthorizationError => Err(PageError::BadRequest),
    }
}

fn render_page(
    state: &AppState,
    edit_id: i64,
    form: AccountFormView,
    messages: Vec<PageMessage>,
) -> Result<Response, PageError> {
    let page = UserEditTemplate {
        edit_id,
        form,
        messages,
    }
    .render()?;
    state.events.notify(PanelEvent::ResellerScriptEnd);
    Ok(Html(page).into_response())
}
