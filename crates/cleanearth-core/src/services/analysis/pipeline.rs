use crate::bridge::CommandSender;
use crate::models::analysis_types::{analysis_timestamp, AnalysisResult, MODEL_LOADING_ERROR};
use crate::models::shell_types::ShellCommand;
use crate::services::analysis::engine::{simulate_detection, DetectionRng};
use crate::services::readiness::ModelReadiness;
use log::{debug, error, warn};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Busy,
}

/// Runs simulated analyses and pushes every result to the foreground.
///
/// Requests are neither queued nor serialized: each accepted request gets its
/// own delayed task and pushes exactly one result when that delay elapses.
#[derive(Clone)]
pub struct AnalysisService {
    readiness: ModelReadiness,
    delay: Duration,
    rng: Arc<Mutex<Box<dyn DetectionRng>>>,
    commands: CommandSender,
    in_flight: Arc<AtomicUsize>,
    next_request: Arc<AtomicU64>,
}

impl AnalysisService {
    pub fn new(
        readiness: ModelReadiness,
        delay: Duration,
        rng: Box<dyn DetectionRng>,
        commands: CommandSender,
    ) -> Self {
        Self {
            readiness,
            delay,
            rng: Arc::new(Mutex::new(rng)),
            commands,
            in_flight: Arc::new(AtomicUsize::new(0)),
            next_request: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> EngineState {
        if self.in_flight.load(Ordering::Acquire) == 0 {
            EngineState::Idle
        } else {
            EngineState::Busy
        }
    }

    /// Must be called inside a tokio runtime.
    pub fn request(&self, image_data: &str) -> u64 {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            "Analysis request {} received ({})",
            request_id,
            describe_payload(image_data)
        );

        if !self.readiness.is_ready() {
            warn!("Analysis request {} rejected: model still loading", request_id);
            self.push(AnalysisResult::failure(MODEL_LOADING_ERROR).with_request_id(request_id));
            return request_id;
        }

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let service = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(service.delay).await;
            let result = service.analyze().with_request_id(request_id);
            debug!(
                "Analysis request {} finished (error: {}, has_garbage: {})",
                request_id,
                result.is_error(),
                result.has_garbage()
            );
            service.push(result);
            service.in_flight.fetch_sub(1, Ordering::AcqRel);
        });

        request_id
    }

    fn analyze(&self) -> AnalysisResult {
        let attempt = catch_unwind(AssertUnwindSafe(|| {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            simulate_detection(rng.as_mut(), analysis_timestamp())
        }));

        match attempt {
            Ok(detection) => AnalysisResult::Completed(detection),
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!("Simulated analysis faulted: {}", reason);
                AnalysisResult::failure(format!("Analysis failed: {}", reason))
            }
        }
    }

    fn push(&self, result: AnalysisResult) {
        if self.commands.send(ShellCommand::DeliverResult(result)).is_err() {
            warn!("Foreground dispatcher is gone, dropping analysis result");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown fault".to_string()
    }
}

// Payloads are usually data URLs; only their size is of interest for logs,
// so it is derived from the encoded length without decoding.
fn describe_payload(image_data: &str) -> String {
    match image_data.split_once(";base64,") {
        Some((_, encoded)) => {
            let encoded = encoded.trim();
            let padding = encoded.bytes().rev().take_while(|b| *b == b'=').count().min(2);
            let bytes = base64::decoded_len_estimate(encoded.len()).saturating_sub(padding);
            format!("{} decoded bytes", bytes)
        }
        None => format!("{} raw chars", image_data.len()),
    }
}
