use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const MODEL_LOADING_ERROR: &str = "AI model still loading";
pub const CLEAN_AREA_MESSAGE: &str = "No garbage detected - area looks clean!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarbageType {
    Plastic,
    Paper,
    Glass,
    Metal,
    Organic,
}

impl GarbageType {
    pub const ALL: [GarbageType; 5] = [
        GarbageType::Plastic,
        GarbageType::Paper,
        GarbageType::Glass,
        GarbageType::Metal,
        GarbageType::Organic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GarbageType::Plastic => "plastic",
            GarbageType::Paper => "paper",
            GarbageType::Glass => "glass",
            GarbageType::Metal => "metal",
            GarbageType::Organic => "organic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPriority {
    None,
    Low,
    Medium,
    High,
}

impl CleanupPriority {
    /// Priorities a detection can be assigned. `None` is reserved for clean areas.
    pub const ACTIONABLE: [CleanupPriority; 3] = [
        CleanupPriority::Low,
        CleanupPriority::Medium,
        CleanupPriority::High,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModelStatus {
    Ready,
    Loading,
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::Ready => "READY",
            ModelStatus::Loading => "LOADING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub has_garbage: bool,
    pub confidence: f64,
    pub garbage_types: Vec<GarbageType>,
    pub cleanup_priority: CleanupPriority,
    pub analysis_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
}

impl Detection {
    pub fn sample(analysis_time: String) -> Self {
        Self {
            has_garbage: true,
            confidence: 0.92,
            garbage_types: vec![GarbageType::Plastic, GarbageType::Paper],
            cleanup_priority: CleanupPriority::High,
            analysis_time,
            message: None,
            request_id: None,
        }
    }
}

/// Error-shaped result. Only constructible through [`AnalysisFailure::new`],
/// which pins `has_garbage` to false and `confidence` to 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub error: String,
    has_garbage: bool,
    confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
}

impl AnalysisFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            has_garbage: false,
            confidence: 0.0,
            request_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Failed(AnalysisFailure),
    Completed(Detection),
}

impl AnalysisResult {
    pub fn failure(error: impl Into<String>) -> Self {
        AnalysisResult::Failed(AnalysisFailure::new(error))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisResult::Failed(_))
    }

    pub fn has_garbage(&self) -> bool {
        match self {
            AnalysisResult::Failed(_) => false,
            AnalysisResult::Completed(d) => d.has_garbage,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            AnalysisResult::Failed(_) => 0.0,
            AnalysisResult::Completed(d) => d.confidence,
        }
    }

    pub fn request_id(&self) -> Option<u64> {
        match self {
            AnalysisResult::Failed(f) => f.request_id,
            AnalysisResult::Completed(d) => d.request_id,
        }
    }

    pub fn with_request_id(mut self, id: u64) -> Self {
        match &mut self {
            AnalysisResult::Failed(f) => f.request_id = Some(id),
            AnalysisResult::Completed(d) => d.request_id = Some(id),
        }
        self
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|e| AppError {
            message: format!("Failed to encode analysis result: {}", e),
        })
    }
}

pub fn analysis_timestamp() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}
