//! The three-step soil-data wizard.
//!
//! A linear flow: choose a data source, edit the values, confirm and
//! submit. The machine refuses edges the flow does not define, and the
//! confirm step is unreachable with an empty draft, so a submission always
//! carries validated data.
//!
//! ```text
//! ChooseSource(0) ── select_saved / enter_new ──▶ EditData(1)
//! ChooseSource(0) ── continue_with_selected ────▶ Confirm(2)
//! EditData(1)     ── confirm_edits ─────────────▶ Confirm(2)
//! EditData(1)     ── back ──────────────────────▶ ChooseSource(0)
//! Confirm(2)      ── back ──────────────────────▶ EditData(1)
//! Confirm(2)      ── reset ─────────────────────▶ ChooseSource(0)
//! Confirm(2)      ── take_submission ───────────▶ (terminal)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use agrilink_core::SoilRecordId;

use crate::api::crops::SavedLocation;

/// The draft soil payload the wizard edits.
///
/// Owned by the wizard: created at entry, mutated at each step, and either
/// discarded on reset or promoted to a submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SoilDataDraft {
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
    /// Relative humidity (%), optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Latitude, optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude, optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Backend record ID when the draft came from a saved location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<SoilRecordId>,
}

impl SoilDataDraft {
    /// Whether the draft still holds only default values.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self == &Self::default()
    }

    /// Validate agronomic bounds on every field.
    ///
    /// # Errors
    ///
    /// Returns one [`SoilDataError`] per violated field.
    pub fn validate(&self) -> Result<(), Vec<SoilDataError>> {
        fn check(
            errors: &mut Vec<SoilDataError>,
            field: &'static str,
            value: f64,
            min: f64,
            max: f64,
        ) {
            if !value.is_finite() || value < min || value > max {
                errors.push(SoilDataError {
                    field,
                    message: format!("must be between {min} and {max}"),
                });
            }
        }

        let mut errors = Vec::new();
        if self.location_name.trim().is_empty() {
            errors.push(SoilDataError {
                field: "location_name",
                message: "must not be empty".to_string(),
            });
        }
        check(&mut errors, "nitrogen", self.nitrogen, 0.0, 500.0);
        check(&mut errors, "phosphorus", self.phosphorus, 0.0, 500.0);
        check(&mut errors, "potassium", self.potassium, 0.0, 500.0);
        check(&mut errors, "ph_level", self.ph_level, 0.0, 14.0);
        check(&mut errors, "rainfall", self.rainfall, 0.0, 12_000.0);
        check(&mut errors, "temperature", self.temperature, -20.0, 60.0);
        if let Some(humidity) = self.humidity {
            check(&mut errors, "humidity", humidity, 0.0, 100.0);
        }
        if let Some(latitude) = self.latitude {
            check(&mut errors, "latitude", latitude, -90.0, 90.0);
        }
        if let Some(longitude) = self.longitude {
            check(&mut errors, "longitude", longitude, -180.0, 180.0);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl From<&SavedLocation> for SoilDataDraft {
    fn from(location: &SavedLocation) -> Self {
        Self {
            location_name: location.location_name.clone(),
            nitrogen: location.nitrogen,
            phosphorus: location.phosphorus,
            potassium: location.potassium,
            ph_level: location.ph_level,
            rainfall: location.rainfall,
            temperature: location.temperature,
            humidity: location.humidity,
            latitude: location.latitude,
            longitude: location.longitude,
            id: Some(location.id),
        }
    }
}

/// A per-field validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoilDataError {
    /// Field that failed.
    pub field: &'static str,
    /// What was wrong with it.
    pub message: String,
}

impl std::fmt::Display for SoilDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Steps of the wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    ChooseSource,
    EditData,
    Confirm,
}

impl WizardStep {
    /// Zero-based step index for progress display.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::ChooseSource => 0,
            Self::EditData => 1,
            Self::Confirm => 2,
        }
    }
}

/// Errors from driving the wizard.
#[derive(Debug, Error)]
pub enum WizardError {
    /// The requested action has no edge from the current step.
    #[error("{action} is not available at the {step:?} step")]
    InvalidTransition {
        /// Action that was attempted.
        action: &'static str,
        /// Step the wizard was at.
        step: WizardStep,
    },

    /// The draft failed validation.
    #[error("soil data validation failed: {}", format_errors(.0))]
    Validation(Vec<SoilDataError>),
}

fn format_errors(errors: &[SoilDataError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The wizard state machine. Initial state is always `ChooseSource`.
#[derive(Debug, Clone, Default)]
pub struct SoilWizard {
    step: WizardStep,
    draft: SoilDataDraft,
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::ChooseSource
    }
}

impl SoilWizard {
    /// Start a fresh wizard at `ChooseSource` with a blank draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current step.
    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    /// Read access to the draft at any step.
    #[must_use]
    pub const fn draft(&self) -> &SoilDataDraft {
        &self.draft
    }

    /// Mutable access to the draft, only while editing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside the `EditData` step.
    pub fn draft_mut(&mut self) -> Result<&mut SoilDataDraft, WizardError> {
        match self.step {
            WizardStep::EditData => Ok(&mut self.draft),
            step => Err(WizardError::InvalidTransition {
                action: "edit draft",
                step,
            }),
        }
    }

    /// Pre-fill the draft from a saved location and move to `EditData`.
    ///
    /// # Errors
    ///
    /// Only available from `ChooseSource`.
    pub fn select_saved(&mut self, location: &SavedLocation) -> Result<(), WizardError> {
        self.expect_step(WizardStep::ChooseSource, "select saved location")?;
        self.draft = SoilDataDraft::from(location);
        self.step = WizardStep::EditData;
        tracing::debug!(location = %location.location_name, "wizard: saved location selected");
        Ok(())
    }

    /// Clear the draft for manual entry and move to `EditData`.
    ///
    /// # Errors
    ///
    /// Only available from `ChooseSource`.
    pub fn enter_new(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::ChooseSource, "enter new data")?;
        self.draft = SoilDataDraft::default();
        self.step = WizardStep::EditData;
        Ok(())
    }

    /// Accept a saved location as-is, skipping the edit step.
    ///
    /// The one edge that moves more than one step; it lands on `Confirm`
    /// with a draft that is non-blank by construction.
    ///
    /// # Errors
    ///
    /// Only available from `ChooseSource`; the location must still validate.
    pub fn continue_with_selected(&mut self, location: &SavedLocation) -> Result<(), WizardError> {
        self.expect_step(WizardStep::ChooseSource, "continue with selected")?;
        let draft = SoilDataDraft::from(location);
        draft.validate().map_err(WizardError::Validation)?;
        self.draft = draft;
        self.step = WizardStep::Confirm;
        Ok(())
    }

    /// Validate the edited draft and move to `Confirm`.
    ///
    /// # Errors
    ///
    /// Only available from `EditData`; a blank or out-of-bounds draft stays
    /// at `EditData` with the validation errors.
    pub fn confirm_edits(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::EditData, "confirm edits")?;
        self.draft.validate().map_err(WizardError::Validation)?;
        self.step = WizardStep::Confirm;
        Ok(())
    }

    /// Step back one step (`EditData` → `ChooseSource`, `Confirm` →
    /// `EditData`). The draft is kept.
    ///
    /// # Errors
    ///
    /// Not available from `ChooseSource`.
    pub fn back(&mut self) -> Result<(), WizardError> {
        self.step = match self.step {
            WizardStep::ChooseSource => {
                return Err(WizardError::InvalidTransition {
                    action: "back",
                    step: WizardStep::ChooseSource,
                });
            }
            WizardStep::EditData => WizardStep::ChooseSource,
            WizardStep::Confirm => WizardStep::EditData,
        };
        Ok(())
    }

    /// Abandon the confirmation: clear the draft and return to
    /// `ChooseSource`.
    ///
    /// # Errors
    ///
    /// Only available from `Confirm`.
    pub fn reset(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Confirm, "reset")?;
        self.draft = SoilDataDraft::default();
        self.step = WizardStep::ChooseSource;
        Ok(())
    }

    /// Terminal transition: consume the wizard and yield the validated
    /// payload for submission.
    ///
    /// # Errors
    ///
    /// Only available from `Confirm`.
    pub fn take_submission(self) -> Result<SoilDataDraft, WizardError> {
        match self.step {
            WizardStep::Confirm => Ok(self.draft),
            step => Err(WizardError::InvalidTransition {
                action: "submit",
                step,
            }),
        }
    }

    fn expect_step(&self, expected: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                action,
                step: self.step,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn saved_location() -> SavedLocation {
        SavedLocation {
            id: SoilRecordId::new(3),
            location_name: "North field".to_string(),
            nitrogen: 90.0,
            phosphorus: 42.0,
            potassium: 43.0,
            ph_level: 6.5,
            rainfall: 820.0,
            temperature: 26.0,
            humidity: Some(65.0),
            latitude: None,
            longitude: None,
        }
    }

    fn valid_draft() -> SoilDataDraft {
        SoilDataDraft::from(&saved_location())
    }

    #[test]
    fn test_initial_state() {
        let wizard = SoilWizard::new();
        assert_eq!(wizard.step(), WizardStep::ChooseSource);
        assert!(wizard.draft().is_blank());
    }

    #[test]
    fn test_select_saved_prefills_and_advances() {
        let mut wizard = SoilWizard::new();
        wizard.select_saved(&saved_location()).unwrap();

        assert_eq!(wizard.step(), WizardStep::EditData);
        assert_eq!(wizard.draft(), &valid_draft());
        assert_eq!(wizard.draft().id, Some(SoilRecordId::new(3)));
    }

    #[test]
    fn test_enter_new_clears_draft() {
        let mut wizard = SoilWizard::new();
        wizard.select_saved(&saved_location()).unwrap();
        wizard.back().unwrap();
        wizard.enter_new().unwrap();

        assert_eq!(wizard.step(), WizardStep::EditData);
        assert!(wizard.draft().is_blank());
    }

    #[test]
    fn test_continue_with_selected_skips_to_confirm() {
        let mut wizard = SoilWizard::new();
        wizard.continue_with_selected(&saved_location()).unwrap();
        assert_eq!(wizard.step(), WizardStep::Confirm);
        assert!(!wizard.draft().is_blank());
    }

    #[test]
    fn test_confirm_requires_valid_draft() {
        let mut wizard = SoilWizard::new();
        wizard.enter_new().unwrap();

        // Blank draft: location_name empty fails validation.
        let err = wizard.confirm_edits().unwrap_err();
        assert!(matches!(err, WizardError::Validation(_)));
        assert_eq!(wizard.step(), WizardStep::EditData);

        *wizard.draft_mut().unwrap() = valid_draft();
        wizard.confirm_edits().unwrap();
        assert_eq!(wizard.step(), WizardStep::Confirm);
    }

    #[test]
    fn test_confirm_unreachable_from_choose_source_via_edits() {
        let mut wizard = SoilWizard::new();
        assert!(matches!(
            wizard.confirm_edits(),
            Err(WizardError::InvalidTransition { .. })
        ));
        assert!(wizard.clone().take_submission().is_err());
        assert_eq!(wizard.step(), WizardStep::ChooseSource);
    }

    #[test]
    fn test_validation_bounds() {
        let mut draft = valid_draft();
        draft.ph_level = 15.0;
        draft.temperature = -40.0;
        let errors = draft.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["ph_level", "temperature"]);
    }

    #[test]
    fn test_validation_collects_name_and_bound_errors_together() {
        let mut draft = valid_draft();
        draft.location_name = "   ".to_string();
        draft.ph_level = 15.0;
        let errors = draft.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["location_name", "ph_level"]);
    }

    #[test]
    fn test_validation_rejects_non_finite() {
        let mut draft = valid_draft();
        draft.rainfall = f64::NAN;
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_back_edges() {
        let mut wizard = SoilWizard::new();
        assert!(wizard.back().is_err());

        wizard.select_saved(&saved_location()).unwrap();
        wizard.confirm_edits().unwrap();
        wizard.back().unwrap();
        assert_eq!(wizard.step(), WizardStep::EditData);
        // Draft survives stepping back.
        assert_eq!(wizard.draft(), &valid_draft());
        wizard.back().unwrap();
        assert_eq!(wizard.step(), WizardStep::ChooseSource);
    }

    #[test]
    fn test_reset_only_from_confirm() {
        let mut wizard = SoilWizard::new();
        assert!(wizard.reset().is_err());

        wizard.continue_with_selected(&saved_location()).unwrap();
        wizard.reset().unwrap();
        assert_eq!(wizard.step(), WizardStep::ChooseSource);
        assert!(wizard.draft().is_blank());
    }

    #[test]
    fn test_take_submission_is_terminal_and_validated() {
        let mut wizard = SoilWizard::new();
        wizard.select_saved(&saved_location()).unwrap();
        wizard.confirm_edits().unwrap();

        let submission = wizard.take_submission().unwrap();
        assert_eq!(submission, valid_draft());
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn test_draft_mut_only_while_editing() {
        let mut wizard = SoilWizard::new();
        assert!(wizard.draft_mut().is_err());
        wizard.enter_new().unwrap();
        assert!(wizard.draft_mut().is_ok());
    }

    #[test]
    fn test_draft_serializes_without_empty_optionals() {
        let draft = valid_draft();
        let value = serde_json::to_value(&draft).unwrap();
        assert!(value.get("latitude").is_none());
        assert!(value.get("humidity").is_some());
    }
}
