use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use ir_core::persist::{load_index, IndexPaths, IndexSnapshot};
use ir_core::{BooleanOp, IrError, OptimizedQueryProcessor, QueryProcessor};
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const SNIPPET_BEFORE: usize = 100;
const SNIPPET_AFTER: usize = 200;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_op")]
    pub op: String,
    #[serde(default)]
    pub optimized: bool,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_op() -> String { "and".into() }
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub op: BooleanOp,
    pub optimized: bool,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: u32,
    /// Accumulated term frequency of the merged postings.
    pub score: u32,
    pub name: String,
    pub snippet: Option<String>,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc_id: u32,
    pub name: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct StatsParams {
    #[serde(default = "default_top")]
    pub top: usize,
}
fn default_top() -> usize { 10 }

#[derive(Serialize)]
pub struct StatsResponse {
    pub num_terms: usize,
    pub num_docs: usize,
    pub stemming: bool,
    pub stop_words: usize,
    pub top_terms: Vec<TermStats>,
}

#[derive(Serialize)]
pub struct TermStats {
    pub term: String,
    pub df: u32,
    pub cf: u64,
}

/// The loaded index is swapped as a whole on reload; queries hold the read
/// lock for the duration of one evaluation.
#[derive(Clone)]
pub struct AppState {
    pub index_root: PathBuf,
    pub index: Arc<RwLock<IndexSnapshot>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn load(index_dir: impl Into<PathBuf>, admin_token: Option<String>) -> Result<Self> {
        let index_root = index_dir.into();
        let (snapshot, meta) = load_index(&IndexPaths::new(&index_root))?;
        tracing::info!(
            root = %index_root.display(),
            num_docs = meta.num_docs,
            num_terms = meta.num_terms,
            "index loaded"
        );
        Ok(Self { index_root, index: Arc::new(RwLock::new(snapshot)), admin_token })
    }
}

pub fn build_app(index_dir: String) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let state = AppState::load(index_dir, admin_token)?;

    Ok(router(state).layer(cors_layer(std::env::var("CORS_ALLOW_ORIGIN").ok().as_deref())))
}

/// Comma-separated origins restrict CORS; unset or unparsable values allow any.
fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allow_origin
        .into_iter()
        .flat_map(|val| val.split(','))
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/index/reload", post(reload_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let op: BooleanOp = params
        .op
        .parse()
        .map_err(|e: IrError| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let query = ir_core::Query::parse(op, &params.q);

    let index = state.index.read();
    let result = if params.optimized {
        OptimizedQueryProcessor::optimized(&index.dictionary, &index.analyzer).process(&query)
    } else {
        QueryProcessor::new(&index.dictionary, &index.analyzer).process(&query)
    };

    let k = params.k.clamp(1, 100);
    let highlighter = highlighter(&query.terms);
    let results = result
        .iter()
        .take(k)
        .filter_map(|p| {
            let doc = index.documents.get(p.doc_id)?;
            Some(SearchHit {
                doc_id: p.doc_id,
                score: p.frequency,
                name: doc.name().to_owned(),
                snippet: snippet(doc.content(), highlighter.as_ref()),
            })
        })
        .collect();

    Ok(Json(SearchResponse {
        query: params.q,
        op,
        optimized: params.optimized,
        took_s: start.elapsed().as_secs_f64(),
        total_hits: result.len(),
        results,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<u32>,
) -> Result<Json<DocResponse>, (StatusCode, String)> {
    let index = state.index.read();
    match index.documents.get(doc_id) {
        Some(doc) => Ok(Json(DocResponse { doc_id, name: doc.name().to_owned(), content: doc.content().to_owned() })),
        None => Err((StatusCode::NOT_FOUND, format!("document {doc_id} not found"))),
    }
}

pub async fn stats_handler(State(state): State<AppState>, Query(params): Query<StatsParams>) -> Json<StatsResponse> {
    let index = state.index.read();
    let top_terms = index
        .dictionary
        .most_frequent(params.top)
        .into_iter()
        .map(|t| TermStats { term: t.text().to_owned(), df: t.document_frequency(), cf: t.collection_frequency() })
        .collect();
    Json(StatsResponse {
        num_terms: index.dictionary.len(),
        num_docs: index.documents.len(),
        stemming: index.analyzer.stemming(),
        stop_words: index.analyzer.stop_words().map_or(0, |s| s.len()),
        top_terms,
    })
}

/// Re-read the index from disk and swap it in.
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let (snapshot, meta) = load_index(&IndexPaths::new(&state.index_root)).map_err(|e| {
        tracing::error!(error = %e, "index reload failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    *state.index.write() = snapshot;
    tracing::info!(num_docs = meta.num_docs, num_terms = meta.num_terms, "index reloaded");
    Ok(Json(serde_json::json!({ "num_docs": meta.num_docs, "num_terms": meta.num_terms, "created_at": meta.created_at })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
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

fn highlighter(terms: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = terms.iter().filter(|t| !t.trim().is_empty()).map(|t| regex::escape(t)).collect();
    if alternatives.is_empty() {
        return None;
    }
    RegexBuilder::new(&alternatives.join("|")).case_insensitive(true).build().ok()
}

/// Window of text around the first query-word match, with matches wrapped
/// in `<em>`. Without a match the start of the document is used.
fn snippet(text: &str, highlighter: Option<&Regex>) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let first = highlighter.and_then(|re| re.find(text)).map(|m| m.start());
    let (mut start, mut end) = match first {
        Some(idx) => (idx.saturating_sub(SNIPPET_BEFORE), (idx + SNIPPET_AFTER).min(text.len())),
        None => (0, SNIPPET_AFTER.min(text.len())),
    };
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    while !text.is_char_boundary(end) {
        end += 1;
    }
    let window = &text[start..end];
    Some(match highlighter {
        Some(re) => re.replace_all(window, "<em>$0</em>").into_owned(),
        None => window.to_owned(),
    })
}
