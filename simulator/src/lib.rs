use axum::{
    body::Bytes,
    extract::State as AxumState,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use rosistrat_execution::{
    analytics::NumberFrequency, analyze_streaks, batch::StrategyAverage, compare,
    number_frequency, summarize, MultiSimTracker, RunSummary, StreakAnalysis,
};
use rosistrat_types::{LineConfig, SimulationConfig, SimulationRun, StrategyId};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod config;
pub mod export;
pub mod history;

use config::ValidatedConfig;
use history::{History, SavedSimulation};

/// Why a request could not be served.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error(transparent)]
    Simulation(#[from] rosistrat_types::Error),
    #[error("sequence length {requested} exceeds the limit of {limit}")]
    TooLong { requested: usize, limit: usize },
    #[error("not found")]
    NotFound,
    #[error("simulation task failed")]
    Internal,
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Malformed(_) | Self::Simulation(_) | Self::TooLong { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Catalogue entry for one strategy.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInfo {
    pub id: StrategyId,
    pub name: &'static str,
    pub description: &'static str,
    pub accepts_lines: bool,
    pub default_lines: Vec<LineConfig>,
}

impl From<StrategyId> for StrategyInfo {
    fn from(id: StrategyId) -> Self {
        Self {
            id,
            name: id.name(),
            description: id.description(),
            accepts_lines: id.accepts_lines(),
            default_lines: id.default_lines(),
        }
    }
}

/// Everything the host reports about one simulation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub history_id: String,
    pub run: SimulationRun,
    pub summary: RunSummary,
    pub streaks: StreakAnalysis,
    pub frequencies: Vec<NumberFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_average: Option<StrategyAverage>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub strategy: StrategyId,
    pub summary: RunSummary,
}

/// All six strategies over one shared sequence.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub seed: u64,
    pub sequence_length: usize,
    pub streaks: StreakAnalysis,
    pub results: Vec<StrategyResult>,
}

/// Request-independent state of the host.
pub struct Simulator {
    defaults: SimulationConfig,
    max_sequence_length: usize,
    history: RwLock<History>,
    multi: RwLock<MultiSimTracker>,
}

impl Simulator {
    pub fn new(defaults: SimulationConfig, max_sequence_length: usize, history: History) -> Self {
        Self {
            defaults,
            max_sequence_length,
            history: RwLock::new(history),
            multi: RwLock::new(MultiSimTracker::default()),
        }
    }

    pub fn from_config(config: &ValidatedConfig) -> std::io::Result<Self> {
        let history = match &config.history_path {
            Some(path) => History::open(path, config.history_limit)?,
            None => History::in_memory(config.history_limit),
        };
        Ok(Self::new(
            config.defaults.clone(),
            config.max_sequence_length,
            history,
        ))
    }

    pub fn defaults(&self) -> &SimulationConfig {
        &self.defaults
    }

    /// Overlays a JSON request body on the host defaults and validates it.
    ///
    /// An empty body runs the defaults unchanged.
    pub fn resolve(&self, body: &[u8]) -> Result<SimulationConfig, ApiError> {
        let mut merged = serde_json::to_value(&self.defaults)?;
        let mut overrides_lines = false;
        if !body.iter().all(u8::is_ascii_whitespace) {
            let request: Value = serde_json::from_slice(body)?;
            if !request.is_object() {
                return Err(ApiError::Malformed("expected a JSON object".to_string()));
            }
            overrides_lines = request.get("lines").is_some();
            merge(&mut merged, request);
        }

        let mut config: SimulationConfig = serde_json::from_value(merged)?;
        if !overrides_lines {
            // Default lines must not leak into a strategy with a fixed line
            config = config.for_strategy(config.strategy);
        }
        if config.sequence_length > self.max_sequence_length {
            return Err(ApiError::TooLong {
                requested: config.sequence_length,
                limit: self.max_sequence_length,
            });
        }
        config.validate()?;
        Ok(config)
    }

    /// Runs one simulation and records it in history and the multi-run tracker.
    pub fn simulate(&self, config: &SimulationConfig) -> Result<SimulationReport, ApiError> {
        let run = rosistrat_execution::simulate(config)?;
        let summary = summarize(&run);
        let numbers = run.numbers();
        let streaks = analyze_streaks(&numbers);
        let frequencies = number_frequency(&numbers);

        let saved = SavedSimulation::from_run(&run);
        let history_id = saved.id.clone();
        self.save(saved);
        let multi_average = self.record_multi(&run);
        info!(
            strategy = %run.strategy,
            spins = run.len(),
            final_earnings = summary.final_earnings,
            "simulation complete"
        );

        Ok(SimulationReport {
            history_id,
            run,
            summary,
            streaks,
            frequencies,
            multi_average,
        })
    }

    pub fn compare(&self, config: &SimulationConfig) -> Result<ComparisonReport, ApiError> {
        let comparison = compare(config)?;
        let results = comparison
            .runs
            .iter()
            .map(|run| StrategyResult {
                strategy: run.strategy,
                summary: summarize(run),
            })
            .collect();
        info!(seed = comparison.seed, "comparison complete");
        Ok(ComparisonReport {
            seed: comparison.seed,
            sequence_length: comparison.sequence.len(),
            streaks: analyze_streaks(&comparison.sequence),
            results,
        })
    }

    fn save(&self, saved: SavedSimulation) {
        let mut history = match self.history.write() {
            Ok(history) => history,
            Err(e) => {
                tracing::error!("Failed to acquire write lock in save: {}", e);
                return;
            }
        };
        history.push(saved);
    }

    fn record_multi(&self, run: &SimulationRun) -> Option<StrategyAverage> {
        let mut multi = match self.multi.write() {
            Ok(multi) => multi,
            Err(e) => {
                tracing::error!("Failed to acquire write lock in record_multi: {}", e);
                return None;
            }
        };
        multi.record_run(run);
        Some(StrategyAverage {
            strategy: run.strategy,
            runs: multi.results(run.strategy).len(),
            average_earnings: multi.average(run.strategy),
        })
    }

    pub fn history(&self) -> Vec<SavedSimulation> {
        match self.history.read() {
            Ok(history) => history.list(),
            Err(e) => {
                tracing::error!("Failed to acquire read lock in history: {}", e);
                Vec::new()
            }
        }
    }

    pub fn saved(&self, id: &str) -> Option<SavedSimulation> {
        match self.history.read() {
            Ok(history) => history.get(id).cloned(),
            Err(e) => {
                tracing::error!("Failed to acquire read lock in saved: {}", e);
                None
            }
        }
    }

    pub fn clear_history(&self) {
        match self.history.write() {
            Ok(mut history) => history.clear(),
            Err(e) => tracing::error!("Failed to acquire write lock in clear_history: {}", e),
        }
    }

    pub fn multi_averages(&self) -> Vec<StrategyAverage> {
        match self.multi.read() {
            Ok(multi) => multi.averages(),
            Err(e) => {
                tracing::error!("Failed to acquire read lock in multi_averages: {}", e);
                Vec::new()
            }
        }
    }

    /// Forgets recorded results for one strategy, or all when `None`.
    pub fn reset_multi(&self, strategy: Option<StrategyId>) {
        let mut multi = match self.multi.write() {
            Ok(multi) => multi,
            Err(e) => {
                tracing::error!("Failed to acquire write lock in reset_multi: {}", e);
                return;
            }
        };
        match strategy {
            Some(strategy) => multi.reset(strategy),
            None => multi.reset_all(),
        }
    }
}

fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}

pub struct Api {
    simulator: Arc<Simulator>,
}

impl Api {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        // Configure CORS
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        Router::new()
            .route("/strategies", get(strategies))
            .route("/simulate", post(simulate))
            .route("/simulate/csv", post(simulate_csv))
            .route("/compare", post(compare_strategies))
            .route("/history", get(history).delete(clear_history))
            .route("/history/:id", get(saved))
            .route("/multi", get(multi).delete(reset_multi))
            .route("/multi/:strategy", delete(reset_multi_strategy))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.simulator.clone())
    }
}

/// Runs `task` off the async runtime.
async fn blocking<T, F>(simulator: Arc<Simulator>, task: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Simulator) -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || task(&simulator))
        .await
        .map_err(|e| {
            tracing::error!("Simulation task panicked: {}", e);
            ApiError::Internal
        })?
}

async fn strategies() -> impl IntoResponse {
    let catalogue: Vec<StrategyInfo> = StrategyId::ALL.into_iter().map(Into::into).collect();
    Json(catalogue)
}

async fn simulate(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    body: Bytes,
) -> Result<Json<SimulationReport>, ApiError> {
    let config = simulator.resolve(&body)?;
    let report = blocking(simulator, move |simulator| simulator.simulate(&config)).await?;
    Ok(Json(report))
}

async fn simulate_csv(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let config = simulator.resolve(&body)?;
    let csv = blocking(simulator, move |simulator| {
        simulator
            .simulate(&config)
            .map(|report| export::to_csv(&report.run))
    })
    .await?;
    Ok(([(header::CONTENT_TYPE, "text/csv")], csv))
}

async fn compare_strategies(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    body: Bytes,
) -> Result<Json<ComparisonReport>, ApiError> {
    let config = simulator.resolve(&body)?;
    let report = blocking(simulator, move |simulator| simulator.compare(&config)).await?;
    Ok(Json(report))
}

async fn history(AxumState(simulator): AxumState<Arc<Simulator>>) -> impl IntoResponse {
    Json(simulator.history())
}

async fn saved(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Result<Json<SavedSimulation>, ApiError> {
    simulator.saved(&id).map(Json).ok_or(ApiError::NotFound)
}

async fn clear_history(AxumState(simulator): AxumState<Arc<Simulator>>) -> impl IntoResponse {
    simulator.clear_history();
    StatusCode::OK
}

async fn multi(AxumState(simulator): AxumState<Arc<Simulator>>) -> impl IntoResponse {
    Json(simulator.multi_averages())
}

async fn reset_multi(AxumState(simulator): AxumState<Arc<Simulator>>) -> impl IntoResponse {
    simulator.reset_multi(None);
    StatusCode::OK
}

async fn reset_multi_strategy(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    axum::extract::Path(strategy): axum::extract::Path<String>,
) -> Result<StatusCode, ApiError> {
    let strategy: StrategyId = strategy.parse()?;
    simulator.reset_multi(Some(strategy));
    Ok(StatusCode::OK)
}
