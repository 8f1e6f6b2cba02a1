use crate::dispatch;
use crate::error::PredictError;
use crate::features::{self, InputBounds};
use crate::format::{format_ratios, format_result};
use crate::model::Artifacts;
use crate::types::{DerivedRatios, ModelChoice, Prediction, RawInputs, FEATURE_NAMES};
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub artifacts: Arc<Artifacts>,
    pub bounds: InputBounds,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page).post(form_submit))
        .route("/api/predict", post(api_predict))
        .route("/healthz", get(healthz))
        .with_state(state)
}

// ---------- JSON API ----------

#[derive(Deserialize, Debug)]
pub struct ApiRequest {
    #[serde(flatten)]
    pub inputs: RawInputs,
    #[serde(default)]
    pub model: ModelChoice,
}

#[derive(Serialize, Debug)]
pub struct ApiResponse {
    pub model: ModelChoice,
    pub h_d: f64,
    pub d_d50: f64,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
    pub display: Vec<String>,
}

impl From<Prediction> for ApiResponse {
    fn from(p: Prediction) -> Self {
        Self {
            model: p.choice,
            h_d: p.ratios.h_d,
            d_d50: p.ratios.d_d50,
            value: p.result.value(),
            uncertainty: p.result.uncertainty(),
            display: format_result(p.choice, &p.result).lines(),
        }
    }
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(e: PredictError) -> ApiError {
    let status = if e.is_input_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({ "error": e.to_string() })))
}

async fn api_predict(
    State(state): State<AppState>,
    Json(req): Json<ApiRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let p = dispatch::run(&req.inputs, req.model, &state.bounds, &state.artifacts).map_err(|e| {
        tracing::warn!("prediction failed: {}", e);
        api_error(e)
    })?;
    Ok(Json(p.into()))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "features": FEATURE_NAMES }))
}

// ---------- HTML form ----------

/// (form key, label, feature name)
const FIELDS: [(&str, &str, &str); 5] = [
    ("u", "Flow Velocity U (m/s)", "U"),
    ("h", "Flow Depth H (m)", "H"),
    ("d", "Pier Diameter D (m)", "D"),
    ("fr", "Froude Number Fr", "Fr"),
    ("d50", "Median Grain Size d50 (m)", "d50"),
];

/// Submitted values kept as text so they can be echoed back unchanged.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct FormInput {
    pub u: String,
    pub h: String,
    pub d: String,
    pub fr: String,
    pub d50: String,
    pub model: String,
}

impl FormInput {
    fn from_raw(raw: &RawInputs, choice: ModelChoice) -> Self {
        Self {
            u: raw.u.to_string(),
            h: raw.h.to_string(),
            d: raw.d.to_string(),
            fr: raw.fr.to_string(),
            d50: raw.d50.to_string(),
            model: choice.as_str().to_string(),
        }
    }

    fn get(&self, key: &str) -> &str {
        match key {
            "u" => self.u.as_str(),
            "h" => self.h.as_str(),
            "d" => self.d.as_str(),
            "fr" => self.fr.as_str(),
            "d50" => self.d50.as_str(),
            _ => "",
        }
    }

    fn parse(&self) -> Result<(RawInputs, ModelChoice), String> {
        let num = |key: &str, label: &str| -> Result<f64, String> {
            self.get(key)
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("{} must be a number", label))
        };
        let raw = RawInputs {
            u: num("u", "U")?,
            h: num("h", "H")?,
            d: num("d", "D")?,
            fr: num("fr", "Fr")?,
            d50: num("d50", "d50")?,
        };
        let choice = if self.model.is_empty() {
            ModelChoice::default()
        } else {
            self.model.parse::<ModelChoice>().map_err(|e| e.to_string())?
        };
        Ok((raw, choice))
    }
}

enum Outcome {
    Success(Prediction),
    Failure(String),
}

async fn form_page(State(state): State<AppState>) -> Html<String> {
    let raw = RawInputs::default();
    let ratios = ratios_for(&raw, &state.bounds);
    Html(render_page(
        &FormInput::from_raw(&raw, ModelChoice::default()),
        &state.bounds,
        ratios,
        None,
    ))
}

async fn form_submit(State(state): State<AppState>, Form(input): Form<FormInput>) -> Html<String> {
    let (ratios, outcome) = match input.parse() {
        Err(msg) => (None, Outcome::Failure(msg)),
        Ok((raw, choice)) => {
            let ratios = ratios_for(&raw, &state.bounds);
            match dispatch::run(&raw, choice, &state.bounds, &state.artifacts) {
                Ok(p) => (Some(p.ratios), Outcome::Success(p)),
                Err(e) => {
                    tracing::warn!("prediction failed: {}", e);
                    (ratios, Outcome::Failure(e.to_string()))
                }
            }
        }
    };
    Html(render_page(&input, &state.bounds, ratios, Some(outcome)))
}

fn ratios_for(raw: &RawInputs, bounds: &InputBounds) -> Option<DerivedRatios> {
    bounds.validate(raw).ok()?;
    features::derive(raw.h, raw.d, raw.d50).ok()
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_page(
    input: &FormInput,
    bounds: &InputBounds,
    ratios: Option<DerivedRatios>,
    outcome: Option<Outcome>,
) -> String {
    let selected = input.model.parse::<ModelChoice>().unwrap_or_default();
    let mut html = String::from(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <title>Scour Depth Predictor</title></head><body>\n\
         <h1>Ice Covered Scour Depth</h1>\n\
         <p>Machine Learning based prediction using RF and GPR</p>\n\
         <form method=\"post\" action=\"/\">\n",
    );

    html.push_str("<label for=\"model\">Select Prediction Model</label>\n<select id=\"model\" name=\"model\">\n");
    for m in ModelChoice::ALL {
        let sel = if m == selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            m.as_str(),
            sel,
            m.label()
        ));
    }
    html.push_str("</select>\n<h2>Input Parameters</h2>\n");

    for (key, label, feature) in FIELDS {
        let min = bounds.min_for(feature).unwrap_or(0.0);
        html.push_str(&format!(
            "<p><label for=\"{key}\">{label}</label>\n\
             <input type=\"number\" id=\"{key}\" name=\"{key}\" min=\"{min}\" step=\"any\" value=\"{value}\" required></p>\n",
            key = key,
            label = label,
            min = min,
            value = escape(input.get(key)),
        ));
    }

    if let Some(r) = ratios {
        for line in format_ratios(&r) {
            html.push_str(&format!("<p class=\"ratio\">{}</p>\n", line));
        }
    }

    html.push_str("<button type=\"submit\">Predict Scour Depth</button>\n</form>\n");

    match outcome {
        Some(Outcome::Success(p)) => {
            let d = format_result(p.choice, &p.result);
            html.push_str(&format!("<div class=\"success\">{}</div>\n", escape(&d.headline)));
            if let Some(u) = d.uncertainty {
                html.push_str(&format!("<div class=\"info\">{}</div>\n", escape(&u)));
            }
        }
        Some(Outcome::Failure(msg)) => {
            html.push_str(&format!(
                "<div class=\"error\">Prediction failed: {}</div>\n",
                escape(&msg)
            ));
        }
        None => {}
    }

    html.push_str("</body></html>\n");
    html
}
