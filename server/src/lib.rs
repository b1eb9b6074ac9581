use anyhow::Result;
use axum::{extract::{Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use study_search::catalog::load_materials;
use study_search::{keyword_search, needs_suggestions, MaterialId, MaterialRecord, SearchConfig, SearchEngine, SearchError};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_page")]
    pub page: usize,
    pub min_score: Option<f32>,
}
fn default_page() -> usize { 1 }

#[derive(Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_hits: usize,
    pub page: usize,
    pub page_size: usize,
    pub num_pages: usize,
    /// Ranked search was unavailable and a plain keyword match was used instead.
    pub degraded: bool,
    pub results: Vec<SearchHit>,
    pub suggestions: Vec<String>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub id: MaterialId,
    pub title: String,
    pub subject: String,
    pub material_type: String,
    pub tags: Vec<String>,
    pub score: f32,
    pub matched_terms: Vec<String>,
    pub snippet: String,
}

#[derive(Serialize)]
pub struct RebuildResponse {
    pub documents: usize,
    pub features: usize,
    pub saved: bool,
}

pub struct Settings {
    /// Catalog file or directory; reloaded on every admin rebuild.
    pub catalog_path: PathBuf,
    pub config: SearchConfig,
    pub admin_token: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub catalog: Arc<RwLock<Arc<Vec<MaterialRecord>>>>,
    pub catalog_path: PathBuf,
    pub config: Arc<SearchConfig>,
    pub admin_token: Option<String>,
}

impl AppState {
    fn materials(&self) -> Arc<Vec<MaterialRecord>> { self.catalog.read().clone() }
}

/// Load the catalog, restore the persisted index if possible (otherwise build and save
/// it), and assemble the router.
pub fn build_app(settings: Settings) -> Result<Router> {
    let materials = load_materials(&settings.catalog_path)?;
    let engine = SearchEngine::with_config(settings.config.vectorizer.clone());
    match engine.load_index(&settings.config.index_path) {
        Ok(()) => {}
        Err(e) => {
            tracing::info!(reason = %e, "no usable saved index, building from catalog");
            if engine.rebuild(&materials) {
                if let Err(e) = engine.save_index(&settings.config.index_path) {
                    tracing::warn!(error = %e, path = %settings.config.index_path.display(), "could not persist startup index");
                }
            }
        }
    }
    let state = AppState {
        engine: Arc::new(engine),
        catalog: Arc::new(RwLock::new(Arc::new(materials))),
        catalog_path: settings.catalog_path,
        config: Arc::new(settings.config),
        admin_token: settings.admin_token,
    };
    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/suggest", get(suggest_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let page_size = state.config.page_size.max(1);
    let mut response = SearchResponse {
        query: params.q.clone(),
        total_hits: 0,
        page: 1,
        page_size,
        num_pages: 0,
        degraded: false,
        results: vec![],
        suggestions: vec![],
    };
    if params.q.trim().is_empty() {
        return Json(response);
    }

    let materials = state.materials();
    let mut opts = state.config.search_options();
    if let Some(min_score) = params.min_score {
        opts.min_score = min_score;
    }
    let ranked: Vec<(MaterialId, f32, Vec<String>)> = match state.engine.try_search(&params.q, &materials, opts) {
        Ok(results) => results
            .into_iter()
            .map(|r| (r.material_id, r.score, r.matched_terms.into_iter().collect()))
            .collect(),
        Err(SearchError::EmptyCorpus) => vec![],
        Err(e) => {
            tracing::error!(error = %e, query = %params.q, "ranked search unavailable, using keyword match");
            response.degraded = true;
            keyword_search(&params.q, &materials).into_iter().map(|id| (id, 0.0, vec![])).collect()
        }
    };

    response.total_hits = ranked.len();
    response.num_pages = ranked.len().div_ceil(page_size);
    response.page = params.page.clamp(1, response.num_pages.max(1));
    let by_id: HashMap<MaterialId, &MaterialRecord> = materials.iter().map(|m| (m.id, m)).collect();
    response.results = ranked
        .into_iter()
        .skip((response.page - 1) * page_size)
        .take(page_size)
        .filter_map(|(id, score, matched_terms)| {
            let m = by_id.get(&id)?;
            Some(SearchHit {
                id,
                title: m.title.clone(),
                subject: m.subject_name.clone(),
                material_type: m.material_type_label.clone(),
                tags: m.tag_list().map(str::to_string).collect(),
                score,
                snippet: highlight_terms(&m.description, &matched_terms),
                matched_terms,
            })
        })
        .collect();
    if needs_suggestions(response.total_hits) {
        response.suggestions = state.engine.suggest(&params.q, &materials, state.config.max_suggestions);
    }
    Json(response)
}

pub async fn suggest_handler(State(state): State<AppState>, Query(params): Query<SuggestParams>) -> Json<Vec<String>> {
    let materials = state.materials();
    Json(state.engine.suggest(&params.q, &materials, state.config.max_suggestions))
}

async fn rebuild_handler(State(state): State<AppState>, headers: axum::http::HeaderMap) -> Result<Json<RebuildResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let worker = state.clone();
    let outcome = tokio::task::spawn_blocking(move || rebuild(&worker))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    outcome.map(Json)
}

fn rebuild(state: &AppState) -> Result<RebuildResponse, (StatusCode, String)> {
    let materials = load_materials(&state.catalog_path)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    let stats = state
        .engine
        .build_index(&materials)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    *state.catalog.write() = Arc::new(materials);
    let saved = state.engine.save_index(&state.config.index_path).is_ok();
    Ok(RebuildResponse { documents: stats.documents, features: stats.features, saved })
}

/// Wrap every occurrence of the given terms in `<em>` tags, case-insensitively.
fn highlight_terms(text: &str, terms: &[String]) -> String {
    let mut s = text.to_string();
    for t in terms {
        if t.trim().is_empty() { continue; }
        let Ok(pat) = regex::RegexBuilder::new(&regex::escape(t)).case_insensitive(true).build() else { continue };
        s = pat.replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string();
    }
    s
}

fn authorize(state: &AppState, headers: &axum::http::HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
