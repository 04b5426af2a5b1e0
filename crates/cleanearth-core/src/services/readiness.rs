use crate::error::AppError;
use crate::models::analysis_types::ModelStatus;
use log::{info, warn};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Process-wide readiness flag of the simulated model. Starts out loading,
/// flips to ready once and stays there.
#[derive(Clone, Default, Debug)]
pub struct ModelReadiness {
    ready: Arc<AtomicBool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WarmUpOutcome {
    Loaded,
    Fallback(String),
}

impl ModelReadiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn status(&self) -> ModelStatus {
        if self.is_ready() {
            ModelStatus::Ready
        } else {
            ModelStatus::Loading
        }
    }

    /// Returns true only for the call that performed the transition.
    pub fn mark_ready(&self) -> bool {
        !self.ready.swap(true, Ordering::AcqRel)
    }

    /// Marks the model ready after `load` whatever its outcome, panics included.
    pub async fn warm_up<F>(&self, delay: Duration, load: F) -> WarmUpOutcome
    where
        F: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            load.await
        });

        let outcome = match task.await {
            Ok(Ok(())) => WarmUpOutcome::Loaded,
            Ok(Err(e)) => WarmUpOutcome::Fallback(e.message),
            Err(e) => WarmUpOutcome::Fallback(format!("Warm-up task failed: {}", e)),
        };

        self.mark_ready();
        match &outcome {
            WarmUpOutcome::Loaded => info!("Simulated model ready after {:?}", delay),
            WarmUpOutcome::Fallback(reason) => {
                warn!("Simulated model warm-up faulted ({}), marking ready anyway", reason)
            }
        }
        outcome
    }
}
