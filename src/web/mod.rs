// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI for the SentiSense dashboard

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post},
    Form, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::classifier::{classify, Sentiment, Verdict};
use crate::config::AppConfig;
use crate::dataset::ReferenceDataset;
use crate::ledger::{summarize, FeedbackRecord, Ledger, Summary};
use crate::SentiError;

/// Shared application state
pub struct AppState {
    pub ledger: Ledger,
    pub dataset: ReferenceDataset,
    pub config: AppConfig,
    pub rng: Mutex<StdRng>,
}

impl AppState {
    pub fn new(config: AppConfig, ledger: Ledger, dataset: ReferenceDataset) -> Self {
        Self {
            ledger,
            dataset,
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    fn classify(&self, text: &str) -> crate::Result<Verdict> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| SentiError::Config("RNG lock poisoned".to_string()))?;
        Ok(classify(text, &mut *rng))
    }
}

impl IntoResponse for SentiError {
    fn into_response(self) -> Response {
        let status = match &self {
            SentiError::NotFound(_) => StatusCode::NOT_FOUND,
            SentiError::EmptyFeedback | SentiError::InvalidRating(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(index_page))
        .route("/submit", post(submit_form))
        .route("/delete/:index", post(delete_form))
        .route("/settings", get(settings_page))
        // API endpoints
        .route("/api/feedback", get(api_list_feedback).post(api_submit_feedback))
        .route("/api/feedback/:index", delete(api_delete_feedback))
        .route("/api/summary", get(api_get_summary))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Flash banners ===

enum Notice {
    Success(String),
    Warning(String),
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Notice::Success(text.into())
    }

    fn warning(text: impl Into<String>) -> Self {
        Notice::Warning(text.into())
    }
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> Html<String> {
    dashboard(&state, None, None)
}

#[derive(Deserialize)]
struct SubmitForm {
    feedback: String,
    rating: i64,
}

async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SubmitForm>,
) -> Html<String> {
    if form.feedback.trim().is_empty() {
        return dashboard(
            &state,
            Some(Notice::warning("Please enter feedback text before analyzing.")),
            None,
        );
    }
    if !(1..=5).contains(&form.rating) {
        return dashboard(
            &state,
            Some(Notice::warning("Rating must be between 1 and 5.")),
            None,
        );
    }

    let verdict = match state.classify(&form.feedback) {
        Ok(verdict) => verdict,
        Err(e) => return dashboard(&state, Some(Notice::warning(e.to_string())), None),
    };

    let record = FeedbackRecord::new(form.feedback, &verdict, form.rating);
    match state.ledger.append(&record) {
        Ok(()) => dashboard(
            &state,
            Some(Notice::success("Feedback saved successfully!")),
            Some(&verdict),
        ),
        Err(e) => dashboard(
            &state,
            Some(Notice::warning(format!("Failed to save feedback: {}", e))),
            None,
        ),
    }
}

async fn delete_form(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Html<String> {
    match state.ledger.delete_at(index) {
        Ok(_) => dashboard(&state, Some(Notice::success("Feedback deleted successfully!")), None),
        Err(SentiError::NotFound(_)) => dashboard(
            &state,
            Some(Notice::warning("That feedback entry no longer exists.")),
            None,
        ),
        Err(e) => dashboard(
            &state,
            Some(Notice::warning(format!("Failed to delete feedback: {}", e))),
            None,
        ),
    }
}

async fn settings_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_settings(&state.config, &state.dataset))
}

/// Re-read the ledger and render the dashboard page
fn dashboard(state: &AppState, notice: Option<Notice>, result: Option<&Verdict>) -> Html<String> {
    let rows = state.ledger.list_newest_first().unwrap_or_default();
    let records: Vec<FeedbackRecord> = rows.iter().map(|(_, r)| r.clone()).collect();
    let summary = summarize(&records);
    Html(render_dashboard(&rows, &summary, notice, result))
}

// === API Handlers ===

#[derive(Serialize)]
struct FeedbackEntry {
    index: usize,
    timestamp: String,
    feedback: String,
    sentiment: Sentiment,
    positive_pct: f64,
    negative_pct: f64,
    neutral_pct: f64,
    rating: i64,
}

impl FeedbackEntry {
    fn from_record(index: usize, record: FeedbackRecord) -> Self {
        Self {
            index,
            timestamp: record.timestamp,
            feedback: record.feedback,
            sentiment: record.sentiment,
            positive_pct: record.positive_pct,
            negative_pct: record.negative_pct,
            neutral_pct: record.neutral_pct,
            rating: record.rating,
        }
    }
}

async fn api_list_feedback(
    State(state): State<Arc<AppState>>,
) -> crate::Result<Json<Vec<FeedbackEntry>>> {
    let entries = state
        .ledger
        .list_all()?
        .into_iter()
        .map(|(index, record)| FeedbackEntry::from_record(index, record))
        .collect();
    Ok(Json(entries))
}

#[derive(Deserialize)]
struct SubmitRequest {
    feedback: String,
    rating: i64,
}

#[derive(Serialize)]
struct SubmitResponse {
    sentiment: Sentiment,
    emoji: String,
    positive_pct: f64,
    negative_pct: f64,
    neutral_pct: f64,
    timestamp: String,
}

async fn api_submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> crate::Result<(StatusCode, Json<SubmitResponse>)> {
    if request.feedback.trim().is_empty() {
        return Err(SentiError::EmptyFeedback);
    }
    if !(1..=5).contains(&request.rating) {
        return Err(SentiError::InvalidRating(request.rating));
    }

    let verdict = state.classify(&request.feedback)?;
    let record = FeedbackRecord::new(request.feedback, &verdict, request.rating);
    state.ledger.append(&record)?;

    let response = SubmitResponse {
        sentiment: verdict.sentiment,
        emoji: verdict.emoji().to_string(),
        positive_pct: verdict.positive_pct,
        negative_pct: verdict.negative_pct,
        neutral_pct: verdict.neutral_pct,
        timestamp: record.timestamp,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

async fn api_delete_feedback(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> crate::Result<StatusCode> {
    state.ledger.delete_at(index)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn api_get_summary(State(state): State<Arc<AppState>>) -> Json<Summary> {
    let records = state.ledger.read_all().unwrap_or_default();
    Json(summarize(&records))
}

// === Template Rendering ===

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn base_template(title: &str, content: &str) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - SentiSense</title>
    <style>
        :root {{
            --bg-primary: #1a1a2e;
            --bg-secondary: #16213e;
            --bg-card: #0f3460;
            --text-primary: #e8e8e8;
            --text-secondary: #a0a0a0;
            --accent: #e94560;
            --accent-hover: #ff6b6b;
            --positive: #00d9a5;
            --negative: #ff6b6b;
            --neutral: #f0c75e;
            --border: #2a2a4a;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }}
        .container {{ max-width: 1100px; margin: 0 auto; padding: 20px; }}
        nav {{
            background: var(--bg-secondary);
            padding: 15px 20px;
            display: flex;
            align-items: center;
            gap: 30px;
            border-bottom: 1px solid var(--border);
        }}
        nav .logo {{
            font-size: 1.5em;
            font-weight: bold;
            color: var(--accent);
            text-decoration: none;
        }}
        nav a {{
            color: var(--text-secondary);
            text-decoration: none;
            transition: color 0.2s;
        }}
        nav a:hover {{ color: var(--text-primary); }}
        .card {{
            background: var(--bg-card);
            border-radius: 12px;
            padding: 20px;
            margin-bottom: 20px;
        }}
        .card h2 {{
            margin-bottom: 15px;
            color: var(--accent);
        }}
        .tagline {{ color: var(--text-secondary); }}
        .banner {{
            border-radius: 8px;
            padding: 12px 16px;
            margin-bottom: 20px;
        }}
        .banner.success {{ background: rgba(0,217,165,0.15); color: var(--positive); }}
        .banner.warning {{ background: rgba(255,107,107,0.15); color: var(--negative); }}
        .banner.info {{ background: rgba(240,199,94,0.15); color: var(--neutral); }}
        textarea {{
            width: 100%;
            min-height: 120px;
            background: var(--bg-secondary);
            color: var(--text-primary);
            border: 1px solid var(--border);
            border-radius: 8px;
            padding: 10px;
            font: inherit;
            resize: vertical;
        }}
        .rating-row {{
            display: flex;
            align-items: center;
            gap: 15px;
            margin: 15px 0;
            color: var(--text-secondary);
        }}
        button {{
            background: var(--accent);
            color: white;
            border: none;
            border-radius: 8px;
            padding: 10px 18px;
            font: inherit;
            cursor: pointer;
        }}
        button:hover {{ background: var(--accent-hover); }}
        button.secondary {{ background: var(--bg-secondary); border: 1px solid var(--border); }}
        .stats-grid {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
            gap: 20px;
            margin-bottom: 30px;
        }}
        .stat-card {{
            background: var(--bg-card);
            border-radius: 12px;
            padding: 20px;
            text-align: center;
        }}
        .stat-card .number {{
            font-size: 2.2em;
            font-weight: bold;
            color: var(--accent);
        }}
        .stat-card.positive .number {{ color: var(--positive); }}
        .stat-card.negative .number {{ color: var(--negative); }}
        .stat-card.neutral .number {{ color: var(--neutral); }}
        .stat-card .label {{
            color: var(--text-secondary);
            font-size: 0.9em;
        }}
        .result-card {{
            display: flex;
            align-items: center;
            gap: 18px;
        }}
        .result-emoji {{ font-size: 56px; line-height: 1; }}
        details.entry {{
            background: var(--bg-card);
            border-radius: 8px;
            padding: 12px 16px;
            margin-bottom: 10px;
        }}
        details.entry summary {{ cursor: pointer; }}
        details.entry .body {{ margin-top: 10px; white-space: pre-wrap; }}
        details.entry .pcts {{ color: var(--text-secondary); margin: 8px 0; }}
        table {{
            width: 100%;
            border-collapse: collapse;
        }}
        th, td {{
            padding: 12px;
            text-align: left;
            border-bottom: 1px solid var(--border);
        }}
        th {{ color: var(--text-secondary); font-weight: 500; }}
    </style>
</head>
<body>
    <nav>
        <a href="/" class="logo">&#128172; SentiSense</a>
        <a href="/">Dashboard</a>
        <a href="/settings">Settings</a>
    </nav>
    <main class="container">
        {}
    </main>
</body>
</html>"#, title, content)
}

fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(text) => format!(
            r#"<div class="banner success">&#9989; {}</div>"#,
            escape_html(text)
        ),
        Notice::Warning(text) => format!(
            r#"<div class="banner warning">&#9888;&#65039; {}</div>"#,
            escape_html(text)
        ),
    }
}

fn render_result_card(verdict: &Verdict) -> String {
    format!(r#"
        <div class="card result-card">
            <div class="result-emoji">{}</div>
            <div>
                <h3>Result: <b>{}</b></h3>
                <p><b>Probabilities</b></p>
                <p>Positive: {:.1}%</p>
                <p>Negative: {:.1}%</p>
                <p>Neutral: {:.1}%</p>
            </div>
        </div>
    "#,
        verdict.emoji(),
        verdict.sentiment,
        verdict.positive_pct,
        verdict.negative_pct,
        verdict.neutral_pct,
    )
}

fn render_form() -> String {
    let radios: String = (1..=5)
        .map(|value| {
            let checked = if value == 1 { " checked" } else { "" };
            format!(
                r#"<label><input type="radio" name="rating" value="{}"{}/> {}</label>"#,
                value, checked, value
            )
        })
        .collect();

    format!(r#"
        <div class="card">
            <h2>&#9997;&#65039; Enter your feedback</h2>
            <form method="post" action="/submit">
                <textarea name="feedback" placeholder="Type your feedback here... (e.g. 'I absolutely loved this product!')"></textarea>
                <div class="rating-row">&#11088; Rate your experience: {}</div>
                <button type="submit">&#128269; Analyze &amp; Save</button>
                <button type="reset" class="secondary">&#129529; Clear Input</button>
            </form>
        </div>
    "#, radios)
}

fn render_summary(summary: &Summary) -> String {
    if summary.total == 0 {
        return r#"<div class="banner info">No feedback yet. Submit a review to see summary.</div>"#
            .to_string();
    }

    let average = summary
        .average_rating
        .map(|avg| format!("{:.2} / 5 &#11088;", avg))
        .unwrap_or_else(|| "no feedback".to_string());

    format!(r#"
        <div class="stats-grid">
            <div class="stat-card">
                <div class="number">{}</div>
                <div class="label">Total Feedbacks</div>
            </div>
            <div class="stat-card positive">
                <div class="number">{}</div>
                <div class="label">Positive</div>
            </div>
            <div class="stat-card negative">
                <div class="number">{}</div>
                <div class="label">Negative</div>
            </div>
            <div class="stat-card neutral">
                <div class="number">{}</div>
                <div class="label">Neutral</div>
            </div>
            <div class="stat-card">
                <div class="number">{}</div>
                <div class="label">Average Rating</div>
            </div>
        </div>
    "#, summary.total, summary.positive, summary.negative, summary.neutral, average)
}

fn render_history(rows: &[(usize, FeedbackRecord)]) -> String {
    if rows.is_empty() {
        return "<p>No feedback saved yet.</p>".to_string();
    }

    rows.iter()
        .map(|(index, record)| {
            format!(r#"
                <details class="entry">
                    <summary>&#128336; {} — {} ({}&#11088;)</summary>
                    <div class="body">{}</div>
                    <div class="pcts">Positive: {:.1}% | Negative: {:.1}% | Neutral: {:.1}%</div>
                    <form method="post" action="/delete/{}">
                        <button type="submit">&#10060; Delete</button>
                    </form>
                </details>
            "#,
                escape_html(&record.timestamp),
                record.sentiment,
                record.rating,
                escape_html(&record.feedback),
                record.positive_pct,
                record.negative_pct,
                record.neutral_pct,
                index,
            )
        })
        .collect()
}

fn render_dashboard(
    rows: &[(usize, FeedbackRecord)],
    summary: &Summary,
    notice: Option<Notice>,
    result: Option<&Verdict>,
) -> String {
    let notice_html = notice.as_ref().map(|n| render_notice(n)).unwrap_or_default();
    let result_html = result.map(render_result_card).unwrap_or_default();

    let content = format!(r#"
        <div class="card" style="text-align:center;">
            <h1>&#128172; SentiSense</h1>
            <div class="tagline">Analyze feedback &bull; Save rating &bull; View summary</div>
        </div>
        {}
        {}
        {}
        <h2>&#127942; Feedback Summary</h2>
        {}
        <h2>&#128220; Feedback History (Latest first)</h2>
        {}
    "#,
        notice_html,
        result_html,
        render_form(),
        render_summary(summary),
        render_history(rows),
    );

    base_template("Dashboard", &content)
}

fn render_settings(config: &AppConfig, dataset: &ReferenceDataset) -> String {
    let dataset_row = match &dataset.path {
        Some(path) => format!("{} ({} rows)", path.display(), dataset.rows),
        None => format!("{} (not found)", config.dataset.path),
    };

    let content = format!(r#"
        <h1>Settings</h1>
        <div class="card">
            <h2>Storage</h2>
            <table>
                <tr><td>Feedback store</td><td>{}</td></tr>
                <tr><td>Reference dataset</td><td>{}</td></tr>
            </table>
        </div>
        <div class="card">
            <h2>Web UI</h2>
            <table>
                <tr><td>Host</td><td>{}</td></tr>
                <tr><td>Port</td><td>{}</td></tr>
            </table>
        </div>
    "#,
        escape_html(&config.store.path),
        escape_html(&dataset_row),
        escape_html(&config.web.host),
        config.web.port,
    );

    base_template("Settings", &content)
}

/// Start the web server with config, ledger and dataset
pub async fn start_server(
    config: AppConfig,
    ledger: Ledger,
    dataset: ReferenceDataset,
) -> crate::Result<()> {
    let state = Arc::new(AppState::new(config.clone(), ledger, dataset));

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Dashboard available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| SentiError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
