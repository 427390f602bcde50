//! Crop endpoints: saved soil locations, soil records, recommendations.

use serde::{Deserialize, Serialize};

use agrilink_core::SoilRecordId;

use super::{ApiClient, Auth, CacheTag};
use crate::error::ApiError;
use crate::wizard::SoilDataDraft;

const SOIL_DATA_PATH: &str = "/api/crops/soil-data/";
const RECOMMEND_PATH: &str = "/api/crops/recommend/";

/// A soil record previously saved by the user.
///
/// Selecting one in the wizard pre-fills the draft with these fields.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SavedLocation {
    /// Record ID on the backend.
    pub id: SoilRecordId,
    /// Human-readable location name.
    pub location_name: String,
    /// Nitrogen content (kg/ha).
    pub nitrogen: f64,
    /// Phosphorus content (kg/ha).
    pub phosphorus: f64,
    /// Potassium content (kg/ha).
    pub potassium: f64,
    /// Soil pH.
    pub ph_level: f64,
    /// Annual rainfall (mm).
    pub rainfall: f64,
    /// Average temperature (°C).
    pub temperature: f64,
    /// Relative humidity (%), when recorded.
    #[serde(default)]
    pub humidity: Option<f64>,
    /// Latitude, when recorded.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude, when recorded.
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Crop recommendation computed by the backend from a soil record.
#[derive(Debug, Clone, Deserialize)]
pub struct CropRecommendation {
    /// The recommended crop.
    pub crop: String,
    /// Model confidence in `[0, 1]`, when reported.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Alternative crops, best first.
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl ApiClient {
    /// List the user's saved soil locations (cached).
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when no session is established.
    pub async fn saved_locations(&self) -> Result<Vec<SavedLocation>, ApiError> {
        self.get_cached(SOIL_DATA_PATH, &[CacheTag::SoilRecords], Auth::Required)
            .await
    }

    /// Persist a wizard submission as a soil record.
    ///
    /// # Errors
    ///
    /// Validation failures arrive as field errors in the typed error body.
    pub async fn create_soil_record(
        &self,
        draft: &SoilDataDraft,
    ) -> Result<SavedLocation, ApiError> {
        self.post(SOIL_DATA_PATH, draft, &[CacheTag::SoilRecords], Auth::Required)
            .await
    }

    /// Request a crop recommendation for a soil data payload.
    ///
    /// This is the wizard's terminal submission. It does not invalidate any
    /// cached reads; recommendations are derived, not stored.
    ///
    /// # Errors
    ///
    /// Surfaces the server's error payload verbatim on failure.
    pub async fn crop_recommendation(
        &self,
        draft: &SoilDataDraft,
    ) -> Result<CropRecommendation, ApiError> {
        self.post(RECOMMEND_PATH, draft, &[], Auth::Required).await
    }
}
