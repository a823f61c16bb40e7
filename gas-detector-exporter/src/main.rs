// Gas Detector Exporter - Prometheus exporter for the detector pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Gas Detector Exporter
//!
//! Replays raw samples through a gas detector and exposes its state as
//! Prometheus metrics, with a small HTTP control surface.
//!
//! ## Usage
//!
//! ```bash
//! # Replay a CSV dataset ten times faster than real time
//! gas-detector-exporter --csv samples.csv --speed 10.0
//!
//! # Synthetic gas leak, threshold callback above 2000 counts
//! gas-detector-exporter --scenario gas-leak --threshold-option '>' --threshold-min 2000
//!
//! # Device configuration from a JSON file, on a custom port
//! gas-detector-exporter --config device.json --port 9090
//! ```

mod metrics;
mod replay;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use gas_detector::{DeviceConfig, Threshold, ThresholdOption, DEVICE_IDENTIFIER};
use gas_detector_testdata::DetectorScenario;
use replay::{
    DatasetInfo, ReplayConfig, ReplayEngine, ReplayError, ReplaySource, ReplayState, SharedDevice,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Gas detector Prometheus exporter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "9100")]
    port: u16,

    /// CSV file to replay (needs a `raw` column)
    #[arg(short, long, conflicts_with = "scenario")]
    csv: Option<PathBuf>,

    /// Synthetic scenario to replay when no CSV is given
    #[arg(long, default_value = "gas-leak")]
    scenario: DetectorScenario,

    /// Number of synthetic samples
    #[arg(long, default_value = "6000")]
    samples: usize,

    /// Seed for synthetic samples
    #[arg(long)]
    seed: Option<u64>,

    /// Tick interval in milliseconds at speed 1.0
    #[arg(long, default_value = "10")]
    tick_interval_ms: u64,

    /// Replay speed multiplier (1.0 = real-time)
    #[arg(short, long, default_value = "1.0")]
    speed: f64,

    /// Stop at the end of the dataset instead of looping
    #[arg(long)]
    no_loop: bool,

    /// JSON file with the device start-up configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Moving-average window length (1-100)
    #[arg(long)]
    moving_average: Option<u8>,

    /// Value callback period in ticks (0 = on change)
    #[arg(long)]
    callback_period: Option<u32>,

    /// Debounce period in ticks
    #[arg(long)]
    debounce_period: Option<u32>,

    /// Threshold option: x, i, o, < or >
    #[arg(long, value_parser = parse_threshold_option)]
    threshold_option: Option<ThresholdOption>,

    /// Threshold lower bound
    #[arg(long, allow_hyphen_values = true)]
    threshold_min: Option<i32>,

    /// Threshold upper bound
    #[arg(long, allow_hyphen_values = true)]
    threshold_max: Option<i32>,

    /// Detector type written at start-up
    #[arg(long)]
    detector_type: Option<u8>,

    /// Start with the heater off
    #[arg(long)]
    heater_off: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Exporter start-up errors.
#[derive(Debug, Error)]
enum ExporterError {
    #[error("Cannot read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

fn parse_threshold_option(s: &str) -> Result<ThresholdOption, String> {
    match s {
        "x" => Ok(ThresholdOption::Off),
        "i" => Ok(ThresholdOption::Inside),
        "o" => Ok(ThresholdOption::Outside),
        "<" => Ok(ThresholdOption::Smaller),
        ">" => Ok(ThresholdOption::Greater),
        _ => Err(format!("invalid threshold option '{}' (expected x, i, o, < or >)", s)),
    }
}

/// Device configuration: JSON file first, command-line flags on top.
fn device_config(args: &Args) -> Result<DeviceConfig, ExporterError> {
    let mut config = match &args.config {
        Some(path) => {
            let text =
                std::fs::read_to_string(path).map_err(|source| ExporterError::ConfigRead {
                    path: path.clone(),
                    source,
                })?;
            serde_json::from_str(&text).map_err(|source| ExporterError::ConfigParse {
                path: path.clone(),
                source,
            })?
        }
        None => DeviceConfig::default(),
    };

    if let Some(length) = args.moving_average {
        config = config.with_moving_average(length);
    }
    if let Some(ticks) = args.callback_period {
        config = config.with_callback_period(ticks);
    }
    if let Some(ticks) = args.debounce_period {
        config = config.with_debounce_period(ticks);
    }
    let Threshold { option, min, max } = config.threshold;
    config = config.with_threshold(
        args.threshold_option.unwrap_or(option),
        args.threshold_min.unwrap_or(min),
        args.threshold_max.unwrap_or(max),
    );
    if let Some(detector_type) = args.detector_type {
        config = config.with_detector_type(detector_type);
    }
    if args.heater_off {
        config = config.with_heater(false);
    }

    Ok(config)
}

fn replay_source(args: &Args) -> ReplaySource {
    match &args.csv {
        Some(path) => ReplaySource::Csv(path.clone()),
        None => ReplaySource::Scenario {
            scenario: args.scenario,
            num_samples: args.samples,
            seed: args.seed,
        },
    }
}

/// Application state shared across handlers.
struct AppState {
    device: SharedDevice,
    replay_state: Arc<ReplayState>,
    replay_config: ReplayConfig,
    dataset_info: DatasetInfo,
    start_time: std::time::Instant,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Gas Detector Exporter v{}", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ExporterError> {
    let config = device_config(&args)?;
    let replay_config = ReplayConfig {
        speed: args.speed,
        loop_replay: !args.no_loop,
        tick_interval_ms: args.tick_interval_ms,
    };

    let engine = ReplayEngine::new(replay_config, &replay_source(&args), config)?;
    let state = Arc::new(AppState {
        device: engine.device(),
        replay_state: engine.state(),
        replay_config: engine.config().clone(),
        dataset_info: engine.dataset_info().clone(),
        start_time: std::time::Instant::now(),
    });

    tokio::spawn(async move {
        engine.run().await;
    });

    let app = router(Arc::clone(&state));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting server on http://{}", addr);
    info!("Metrics endpoint: http://{}/metrics", addr);

    let listener = TcpListener::bind(addr).await?;
    let replay_state = Arc::clone(&state.replay_state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
            replay_state.stop();
        })
        .await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/status", get(status_handler))
        .route("/invoke", post(invoke_handler))
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .with_state(state)
}

/// Root handler - shows a simple HTML page.
async fn root_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Gas Detector Exporter</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
        h1 { color: #2c3e50; }
        a { color: #3498db; text-decoration: none; }
        .endpoints { background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0; }
        .endpoint { margin: 10px 0; }
        code { background: #e9ecef; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Gas Detector Exporter</h1>
    <p>Replays raw ADC samples through the detector pipeline.</p>

    <div class="endpoints">
        <h2>Endpoints</h2>
        <div class="endpoint"><a href="/metrics">/metrics</a> - Prometheus metrics</div>
        <div class="endpoint"><a href="/health">/health</a> - Health check</div>
        <div class="endpoint"><a href="/ready">/ready</a> - Readiness check</div>
        <div class="endpoint"><a href="/status">/status</a> - Device and replay status (JSON)</div>
        <div class="endpoint"><code>POST /invoke</code> - Device request <code>{"function_id": 1, "payload": []}</code></div>
        <div class="endpoint"><code>POST /pause</code>, <code>POST /resume</code> - Replay control</div>
    </div>

    <h2>Metrics</h2>
    <ul>
        <li><code>gas_detector_value</code> - Conditioned value</li>
        <li><code>gas_detector_events_total</code> - Callback events by kind</li>
        <li><code>gas_detector_ticks_total</code>, <code>gas_detector_skipped_ticks_total</code> - Measurement cycles</li>
        <li><code>gas_detector_sensor_availability</code> - Share of ticks with a sample</li>
        <li><code>gas_detector_moving_average_length</code>, <code>gas_detector_debounce_period_ticks</code> - Configuration</li>
        <li><code>gas_detector_exporter_replay_*</code> - Replay progress</li>
    </ul>
</body>
</html>"#,
    )
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness check handler.
async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.replay_state.is_running() {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Replay stopped")
    }
}

/// Device snapshot.
#[derive(Debug, Serialize)]
struct DeviceStatus {
    identifier: u16,
    value: i32,
    moving_average: u8,
    callback_period: u32,
    debounce_period: u32,
    threshold: Threshold,
    detector_type: u8,
    heater_on: bool,
    ticks: u64,
    skipped_ticks: u64,
    value_events: u64,
    threshold_events: u64,
    channel_failures: u64,
}

/// Replay status information.
#[derive(Debug, Serialize)]
struct ReplayStatus {
    running: bool,
    paused: bool,
    position: usize,
    total_samples: usize,
    progress_percent: f64,
    speed: f64,
    loop_replay: bool,
    dataset: DatasetInfo,
}

/// Status information response.
#[derive(Debug, Serialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    device: DeviceStatus,
    replay: ReplayStatus,
}

/// Status handler - returns JSON status information.
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let device = {
        let device = state.device.lock().await;
        let counters = device.metrics();
        DeviceStatus {
            identifier: DEVICE_IDENTIFIER,
            value: device.value(),
            moving_average: device.moving_average(),
            callback_period: device.callback_period(),
            debounce_period: device.debounce_period(),
            threshold: device.threshold(),
            detector_type: device.detector_type(),
            heater_on: device.is_heater_on(),
            ticks: counters.ticks,
            skipped_ticks: counters.skipped_ticks,
            value_events: counters.value_events,
            threshold_events: counters.threshold_events,
            channel_failures: counters.channel_failures,
        }
    };

    let replay_state = &state.replay_state;
    let replay = ReplayStatus {
        running: replay_state.is_running(),
        paused: replay_state.is_paused(),
        position: replay_state.position(),
        total_samples: replay_state.total_samples(),
        progress_percent: replay_state.progress_percent(),
        speed: state.replay_config.speed,
        loop_replay: state.replay_config.loop_replay,
        dataset: state.dataset_info.clone(),
    };

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        device,
        replay,
    })
}

/// Device request, as carried by the transport.
#[derive(Debug, Deserialize)]
struct InvokeRequest {
    function_id: u8,
    #[serde(default)]
    payload: Vec<u8>,
}

/// Device reply.
#[derive(Debug, Serialize, PartialEq)]
struct InvokeResponse {
    error_code: u8,
    error: String,
    payload: Vec<u8>,
}

/// Invoke handler - routes a request through the device dispatcher.
async fn invoke_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InvokeRequest>,
) -> Json<InvokeResponse> {
    let mut device = state.device.lock().await;
    let reply = device.invoke(request.function_id, &request.payload);
    metrics::update_config_metrics(&*device);

    info!(
        "invoke fid {} ({} bytes) -> {}",
        request.function_id,
        request.payload.len(),
        reply.error_code
    );

    Json(InvokeResponse {
        error_code: reply.error_code as u8,
        error: reply.error_code.to_string(),
        payload: reply.payload,
    })
}

/// Pause the replay.
async fn pause_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.replay_state.set_paused(true);
    (StatusCode::OK, "Paused")
}

/// Resume the replay.
async fn resume_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.replay_state.set_paused(false);
    (StatusCode::OK, "Resumed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gas_detector::FunctionId;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> Args {
        let argv = std::iter::once("gas-detector-exporter").chain(args.iter().copied());
        Args::try_parse_from(argv).unwrap()
    }

    fn test_state() -> Arc<AppState> {
        let source = ReplaySource::Scenario {
            scenario: DetectorScenario::CleanAir,
            num_samples: 100,
            seed: Some(1),
        };
        let engine = ReplayEngine::new(
            ReplayConfig::default(),
            &source,
            DeviceConfig::default().with_moving_average(10),
        )
        .unwrap();

        Arc::new(AppState {
            device: engine.device(),
            replay_state: engine.state(),
            replay_config: engine.config().clone(),
            dataset_info: engine.dataset_info().clone(),
            start_time: std::time::Instant::now(),
        })
    }

    async fn invoke(
        state: &Arc<AppState>,
        function_id: FunctionId,
        payload: Vec<u8>,
    ) -> InvokeResponse {
        let request = InvokeRequest {
            function_id: function_id as u8,
            payload,
        };
        invoke_handler(State(Arc::clone(state)), Json(request)).await.0
    }

    #[test]
    fn test_parse_threshold_option() {
        assert_eq!(parse_threshold_option(">"), Ok(ThresholdOption::Greater));
        assert_eq!(parse_threshold_option("x"), Ok(ThresholdOption::Off));
        assert!(parse_threshold_option("greater").is_err());
    }

    #[test]
    fn test_default_args() {
        let args = parse(&[]);
        assert_eq!(args.port, 9100);
        assert_eq!(args.scenario, DetectorScenario::GasLeak);
        assert_eq!(device_config(&args).unwrap(), DeviceConfig::default());
        assert!(matches!(
            replay_source(&args),
            ReplaySource::Scenario { num_samples: 6000, .. }
        ));
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"moving_average": 20, "callback_period": 5, "heater": true}}"#
        )
        .unwrap();
        file.flush().unwrap();
        let path = file.path().to_str().unwrap();

        let args = parse(&[
            "--config",
            path,
            "--callback-period",
            "50",
            "--threshold-option",
            "o",
            "--threshold-min",
            "-10",
            "--threshold-max",
            "10",
            "--heater-off",
        ]);
        let config = device_config(&args).unwrap();

        assert_eq!(config.moving_average, 20);
        assert_eq!(config.callback_period, 50);
        assert_eq!(
            config.threshold,
            Threshold::new(ThresholdOption::Outside, -10, 10)
        );
        assert!(!config.heater);
    }

    #[test]
    fn test_threshold_bounds_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"threshold": {{"option": "Inside", "min": 100, "max": 900}}}}"#
        )
        .unwrap();
        file.flush().unwrap();
        let path = file.path().to_str().unwrap();

        let args = parse(&["--config", path, "--threshold-min", "-50"]);
        assert_eq!(
            device_config(&args).unwrap().threshold,
            Threshold::new(ThresholdOption::Inside, -50, 900)
        );

        let args = parse(&["--threshold-max", "700"]);
        assert_eq!(
            device_config(&args).unwrap().threshold,
            Threshold::new(ThresholdOption::Off, 0, 700)
        );
    }

    #[test]
    fn test_config_errors() {
        let args = parse(&["--config", "/nonexistent/device.json"]);
        assert!(matches!(
            device_config(&args),
            Err(ExporterError::ConfigRead { .. })
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        file.flush().unwrap();
        let args = parse(&["--config", file.path().to_str().unwrap()]);
        assert!(matches!(
            device_config(&args),
            Err(ExporterError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_csv_source() {
        let args = parse(&["--csv", "samples.csv"]);
        assert_eq!(
            replay_source(&args),
            ReplaySource::Csv(PathBuf::from("samples.csv"))
        );
    }

    #[tokio::test]
    async fn test_invoke_roundtrip() {
        let state = test_state();

        let set = invoke(&state, FunctionId::SetMovingAverage, vec![42]).await;
        assert_eq!(set.error_code, 0);
        assert!(set.payload.is_empty());

        let get = invoke(&state, FunctionId::GetMovingAverage, Vec::new()).await;
        assert_eq!(get.payload, vec![42]);
        assert_eq!(state.device.lock().await.moving_average(), 42);
    }

    #[tokio::test]
    async fn test_invoke_errors() {
        let state = test_state();

        let unknown = invoke_handler(
            State(Arc::clone(&state)),
            Json(InvokeRequest {
                function_id: 200,
                payload: Vec::new(),
            }),
        )
        .await
        .0;
        assert_eq!(unknown.error_code, 2);
        assert_eq!(unknown.error, "NOT_SUPPORTED");

        let short = invoke(&state, FunctionId::SetDebouncePeriod, vec![1, 2]).await;
        assert_eq!(short.error_code, 1);
    }

    #[tokio::test]
    async fn test_status_snapshot() {
        let state = test_state();
        let status = status_handler(State(Arc::clone(&state))).await.0;

        assert_eq!(status.device.identifier, 252);
        assert_eq!(status.device.moving_average, 10);
        assert!(status.device.heater_on);
        assert_eq!(status.replay.total_samples, 100);
        assert_eq!(status.replay.dataset.source, "scenario:clean-air");
        assert!(!status.replay.running);
    }

    #[tokio::test]
    async fn test_pause_resume() {
        let state = test_state();

        pause_handler(State(Arc::clone(&state))).await;
        assert!(state.replay_state.is_paused());
        resume_handler(State(Arc::clone(&state))).await;
        assert!(!state.replay_state.is_paused());
    }
}
