use crate::infra::{deserialize_optional_date, today, AppState, SharedStore};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use eu_admit::applications::{
    Application, ApplicationId, ApplicationStatus, DashboardSummary, NewTask, Task, TaskId,
    TaskUpdate,
};
use eu_admit::catalog::{University, UniversityId};
use eu_admit::error::AppError;
use eu_admit::matching::{
    score_and_rank, FilterState, Page, RankOptions, SortKey, TuitionWindow,
};
use eu_admit::profile::{Preferences, Profile, ProfileUpdate};
use eu_admit::store::AppStore;
use eu_admit::wizard::{Wizard, WizardDraft};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;

pub(crate) fn api_router(store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/universities", get(list_universities))
        .route("/api/v1/universities/search", post(search_universities))
        .route("/api/v1/universities/:university_id", get(university_detail))
        .route("/api/v1/recommendations", get(recommendation_strip))
        .route(
            "/api/v1/recommendations/wizard",
            post(wizard_recommendations),
        )
        .route("/api/v1/profile", get(get_profile).put(save_profile))
        .route(
            "/api/v1/applications",
            get(list_applications).post(create_application),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            put(set_application_status),
        )
        .route("/api/v1/applications/:application_id/tasks", post(add_task))
        .route(
            "/api/v1/applications/:application_id/tasks/:task_id",
            patch(update_task).delete(remove_task),
        )
        .route(
            "/api/v1/applications/:application_id/tasks/:task_id/toggle",
            post(toggle_task),
        )
        .route("/api/v1/dashboard", get(dashboard))
        .route(
            "/api/v1/compare",
            get(get_compare).post(toggle_compare).delete(clear_compare),
        )
        .route(
            "/api/v1/wizard",
            get(get_wizard).put(save_wizard).delete(discard_wizard),
        )
        .route("/api/v1/wizard/next", post(wizard_next))
        .route("/api/v1/wizard/back", post(wizard_back))
        .route("/api/v1/wizard/confirm", post(confirm_wizard))
        .with_state(store)
}

pub(crate) async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Query-string form of a search. List filters are comma separated.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    pub(crate) q: String,
    pub(crate) page: Option<usize>,
    pub(crate) sort: Option<String>,
    pub(crate) countries: Option<String>,
    pub(crate) fields: Option<String>,
    pub(crate) languages: Option<String>,
    pub(crate) tuition_min: Option<u32>,
    pub(crate) tuition_max: Option<u32>,
}

impl SearchQuery {
    fn filter(&self, store: &AppStore) -> Result<FilterState, AppError> {
        let mut filter = FilterState::for_catalog(store.catalog());
        if let Some(raw) = &self.sort {
            filter.sort = SortKey::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown sort key `{raw}`")))?;
        }
        filter.countries = comma_list(self.countries.as_deref());
        filter.fields = comma_list(self.fields.as_deref());
        filter.languages = comma_list(self.languages.as_deref());
        filter.tuition = TuitionWindow::new(
            self.tuition_min.unwrap_or(filter.tuition.min),
            self.tuition_max.unwrap_or(filter.tuition.max),
        );
        Ok(filter)
    }
}

fn comma_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchRequest {
    #[serde(default)]
    pub(crate) term: String,
    #[serde(default)]
    pub(crate) filter: Option<FilterState>,
    #[serde(default)]
    pub(crate) page: Option<usize>,
}

fn search_response(store: &AppStore, term: &str, filter: &FilterState, page: usize) -> Value {
    let results = store.search(term, filter);
    let page = Page::slice(&results, page, store.limits().page_size);
    json!({
        "term": term,
        "filter": filter,
        "results": page,
        "facets": store.catalog().facets(),
    })
}

pub(crate) async fn list_universities(
    State(store): State<SharedStore>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, AppError> {
    let store = store.read().await;
    let filter = query.filter(&store)?;
    Ok(Json(search_response(
        &store,
        &query.q,
        &filter,
        query.page.unwrap_or(1),
    )))
}

pub(crate) async fn search_universities(
    State(store): State<SharedStore>,
    Json(request): Json<SearchRequest>,
) -> Json<Value> {
    let store = store.read().await;
    let filter = request
        .filter
        .unwrap_or_else(|| FilterState::for_catalog(store.catalog()));
    Json(search_response(
        &store,
        &request.term,
        &filter,
        request.page.unwrap_or(1),
    ))
}

pub(crate) async fn university_detail(
    State(store): State<SharedStore>,
    Path(university_id): Path<String>,
) -> Result<Json<University>, AppError> {
    let store = store.read().await;
    store
        .catalog()
        .get(&UniversityId::new(university_id.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("university `{university_id}`")))
}

pub(crate) async fn recommendation_strip(State(store): State<SharedStore>) -> Json<Value> {
    let store = store.read().await;
    let results = store.recommendations();
    Json(json!({
        "cold_start": !store.profile().completed_onboarding,
        "results": results,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WizardRecommendationRequest {
    #[serde(default)]
    pub(crate) preferences: Preferences,
    #[serde(default)]
    pub(crate) shortlist: Vec<UniversityId>,
}

pub(crate) async fn wizard_recommendations(
    State(store): State<SharedStore>,
    Json(request): Json<WizardRecommendationRequest>,
) -> Json<Value> {
    let store = store.read().await;
    let options =
        RankOptions::wizard(&request.shortlist).with_limit(store.limits().wizard_limit);
    let results = score_and_rank(
        store.catalog().universities(),
        &request.preferences,
        &options,
    );
    Json(json!({ "results": results }))
}

pub(crate) async fn get_profile(State(store): State<SharedStore>) -> Json<Profile> {
    Json(store.read().await.profile().clone())
}

pub(crate) async fn save_profile(
    State(store): State<SharedStore>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, AppError> {
    let mut store = store.write().await;
    let profile = store.save_profile(update)?.clone();
    Ok(Json(profile))
}

pub(crate) async fn list_applications(State(store): State<SharedStore>) -> Json<Vec<Application>> {
    Json(store.read().await.applications().to_vec())
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateApplicationRequest {
    pub(crate) university_id: UniversityId,
}

pub(crate) async fn create_application(
    State(store): State<SharedStore>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let mut store = store.write().await;
    let application = store.add_application_draft(&request.university_id)?.clone();
    Ok((StatusCode::CREATED, Json(application)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    pub(crate) status: ApplicationStatus,
}

pub(crate) async fn set_application_status(
    State(store): State<SharedStore>,
    Path(application_id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Application>, AppError> {
    let mut store = store.write().await;
    let application = store
        .set_status(&ApplicationId(application_id), request.status)?
        .clone();
    Ok(Json(application))
}

pub(crate) async fn add_task(
    State(store): State<SharedStore>,
    Path(application_id): Path<String>,
    Json(task): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let mut store = store.write().await;
    let task = store.add_task(&ApplicationId(application_id), task)?.clone();
    Ok((StatusCode::CREATED, Json(task)))
}

pub(crate) async fn update_task(
    State(store): State<SharedStore>,
    Path((application_id, task_id)): Path<(String, String)>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Task>, AppError> {
    let mut store = store.write().await;
    let task = store
        .update_task(&ApplicationId(application_id), &TaskId(task_id), update)?
        .clone();
    Ok(Json(task))
}

pub(crate) async fn toggle_task(
    State(store): State<SharedStore>,
    Path((application_id, task_id)): Path<(String, String)>,
) -> Result<Json<Task>, AppError> {
    let mut store = store.write().await;
    let task = store
        .toggle_task(&ApplicationId(application_id), &TaskId(task_id))?
        .clone();
    Ok(Json(task))
}

pub(crate) async fn remove_task(
    State(store): State<SharedStore>,
    Path((application_id, task_id)): Path<(String, String)>,
) -> Result<Json<Task>, AppError> {
    let mut store = store.write().await;
    let task = store.remove_task(&ApplicationId(application_id), &TaskId(task_id))?;
    Ok(Json(task))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn dashboard(
    State(store): State<SharedStore>,
    Query(query): Query<DashboardQuery>,
) -> Json<DashboardSummary> {
    let today = query.today.unwrap_or_else(today);
    Json(store.read().await.dashboard(today))
}

fn compare_payload(store: &AppStore) -> Value {
    json!({
        "ids": store.compare_ids(),
        "limit": store.limits().compare_limit,
        "universities": store.compared(),
    })
}

pub(crate) async fn get_compare(State(store): State<SharedStore>) -> Json<Value> {
    Json(compare_payload(&*store.read().await))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareRequest {
    pub(crate) university_id: UniversityId,
    #[serde(default = "selected_by_default")]
    pub(crate) selected: bool,
}

fn selected_by_default() -> bool {
    true
}

pub(crate) async fn toggle_compare(
    State(store): State<SharedStore>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<Value>, AppError> {
    let mut store = store.write().await;
    let selected = store.toggle_compare(&request.university_id, request.selected)?;
    let mut payload = compare_payload(&store);
    payload["selected"] = Value::Bool(selected);
    Ok(Json(payload))
}

pub(crate) async fn clear_compare(State(store): State<SharedStore>) -> StatusCode {
    store.write().await.clear_compare();
    StatusCode::NO_CONTENT
}

fn wizard_payload(wizard: &Wizard, store: &AppStore) -> Value {
    json!({
        "step": wizard.step(),
        "progress": wizard.progress_percent(),
        "draft": wizard.draft(),
        "recommendations": wizard.recommendations(store.catalog()),
    })
}

pub(crate) async fn get_wizard(State(store): State<SharedStore>) -> Json<Value> {
    let store = store.read().await;
    let wizard = Wizard::resume(&store);
    Json(wizard_payload(&wizard, &store))
}

pub(crate) async fn save_wizard(
    State(store): State<SharedStore>,
    Json(draft): Json<WizardDraft>,
) -> Result<Json<Value>, AppError> {
    let store = store.write().await;
    let wizard = Wizard::from_draft(draft).with_limit(store.limits().wizard_limit);
    wizard.save(&store)?;
    Ok(Json(wizard_payload(&wizard, &store)))
}

// Draft writers hold the write lock so a resume-modify-save cycle is never interleaved.
pub(crate) async fn discard_wizard(
    State(store): State<SharedStore>,
) -> Result<StatusCode, AppError> {
    store.write().await.clear_wizard_draft()?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn wizard_next(
    State(store): State<SharedStore>,
) -> Result<Json<Value>, AppError> {
    let store = store.write().await;
    let mut wizard = Wizard::resume(&store);
    wizard.next()?;
    wizard.save(&store)?;
    Ok(Json(wizard_payload(&wizard, &store)))
}

pub(crate) async fn wizard_back(
    State(store): State<SharedStore>,
) -> Result<Json<Value>, AppError> {
    let store = store.write().await;
    let mut wizard = Wizard::resume(&store);
    wizard.back();
    wizard.save(&store)?;
    Ok(Json(wizard_payload(&wizard, &store)))
}

pub(crate) async fn confirm_wizard(
    State(store): State<SharedStore>,
) -> Result<Json<Value>, AppError> {
    let mut store = store.write().await;
    let wizard = Wizard::resume(&store);
    let created = wizard.confirm(&mut store)?;
    Ok(Json(json!({
        "applications": created,
        "profile": store.profile(),
    })))
}
