use crate::errors::AppError;
use crate::models::{CalcSummary, IndexQuery, Notice, Record, RecordsQuery, SessionInput, Settings, SettingsForm};
use crate::records::DeleteOutcome;
use crate::session::{
    self, UiMode, NOTHING_TO_DELETE, RECORD_DELETED, RECORD_SAVED, SETTINGS_SAVED,
};
use crate::state::AppState;
use crate::ui::{render_index, render_settings, IndexView};
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

pub const PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub mode: UiMode,
    pub summary: Option<CalcSummary>,
    pub notice: Option<Notice>,
}

/// Renders the current mode. `?user=` picks the selected user only until a
/// form has been submitted; after that the submitted draft decides.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    let mut session = state.session.lock().await;
    let settings = state.settings.lock().await.clone();
    let notice = session.take_notice();

    if session.mode == UiMode::SettingsEdit {
        return Ok(Html(render_settings(&settings, notice.as_ref())));
    }

    let draft = match &session.draft {
        Some(draft) => normalize(draft.clone(), &settings),
        None => fresh_draft(&settings, query.user.as_deref()),
    };
    let preview = state.records.preview(Some(draft.user.as_str()), PREVIEW_LIMIT).await?;
    let now = Local::now().format("%H:%M:%S").to_string();

    Ok(Html(render_index(&IndexView {
        settings: &settings,
        draft: &draft,
        summary: session.staged.as_ref(),
        notice: notice.as_ref(),
        preview: &preview,
        now: &now,
    })))
}

pub async fn calculate(State(state): State<AppState>, Form(input): Form<SessionInput>) -> Redirect {
    let mut session = state.session.lock().await;
    let settings = state.settings.lock().await;

    match session::calculate(&input, &settings) {
        Ok(summary) => {
            info!(
                big = %summary.big_rate,
                reg = %summary.reg_rate,
                combined = %summary.combined_rate,
                diff = summary.coin_diff,
                "calculation staged"
            );
            session.staged = Some(summary);
        }
        Err(notice) => {
            warn!("calculation refused: {}", notice.message);
            session.notice = Some(notice);
        }
    }
    session.draft = Some(input);

    Redirect::to("/")
}

pub async fn record(
    State(state): State<AppState>,
    Form(input): Form<SessionInput>,
) -> Result<Redirect, AppError> {
    let mut session = state.session.lock().await;

    match session::build_record(&input, session.staged.as_ref()) {
        Ok(record) => {
            state.records.append(record).await?;
            session.staged = None;
            session.notice = Some(Notice::success(RECORD_SAVED));
        }
        Err(notice) => {
            warn!("record refused: {}", notice.message);
            session.notice = Some(notice);
        }
    }
    session.draft = Some(input);

    Ok(Redirect::to("/"))
}

pub async fn delete_latest(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let mut session = state.session.lock().await;

    session.notice = Some(match state.records.delete_latest().await? {
        DeleteOutcome::Deleted(_) => Notice::success(RECORD_DELETED),
        DeleteOutcome::Empty => {
            warn!("delete requested on empty record table");
            Notice::warning(NOTHING_TO_DELETE)
        }
    });

    Ok(Redirect::to("/"))
}

pub async fn open_settings(State(state): State<AppState>) -> Redirect {
    let mut session = state.session.lock().await;
    session.mode = session.mode.open_settings();
    Redirect::to("/")
}

pub async fn close_settings(State(state): State<AppState>) -> Redirect {
    let mut session = state.session.lock().await;
    session.mode = session.mode.close_settings();
    Redirect::to("/")
}

pub async fn save_settings(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect, AppError> {
    let mut session = state.session.lock().await;
    if session.mode != UiMode::SettingsEdit {
        return Err(AppError::bad_request("settings editor is not open"));
    }

    match session::parse_settings_form(&form) {
        Ok(updated) => {
            state.settings_store.save(&updated).await?;
            info!(
                users = updated.users.len(),
                machines = updated.machines.len(),
                shops = updated.shops.len(),
                "settings saved"
            );
            *state.settings.lock().await = updated;
            session.notice = Some(Notice::success(SETTINGS_SAVED));
        }
        Err(notice) => {
            warn!("settings edit refused: {}", notice.message);
            session.notice = Some(notice);
        }
    }

    Ok(Redirect::to("/"))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.settings.lock().await.clone())
}

pub async fn get_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<Vec<Record>>, AppError> {
    let limit = query.limit.unwrap_or(PREVIEW_LIMIT);
    let rows = state.records.preview(query.user.as_deref(), limit).await?;
    Ok(Json(rows))
}

pub async fn get_summary(State(state): State<AppState>) -> Json<Option<CalcSummary>> {
    Json(state.session.lock().await.staged.clone())
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(SessionView {
        mode: session.mode,
        summary: session.staged.clone(),
        notice: session.notice.clone(),
    })
}

fn fresh_draft(settings: &Settings, user: Option<&str>) -> SessionInput {
    normalize(
        SessionInput {
            user: user.unwrap_or_default().to_string(),
            ..SessionInput::default()
        },
        settings,
    )
}

/// Replaces selections that no longer exist in the settings and fills a
/// missing date with today.
fn normalize(mut draft: SessionInput, settings: &Settings) -> SessionInput {
    draft.user = settings.pick_user(&draft.user).to_string();
    draft.machine = settings.pick_machine(&draft.machine).to_string();
    draft.shop = settings.pick_shop(&draft.shop).to_string();
    if draft.date.trim().is_empty() {
        draft.date = today_string();
    }
    draft
}

fn today_string() -> String {
    Local::now().date_naive().to_string()
}
