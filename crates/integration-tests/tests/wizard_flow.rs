//! Soil-data wizard flows, from a saved location payload to the submission
//! draft.

use agrilink_client::api::crops::SavedLocation;
use agrilink_client::wizard::{SoilWizard, WizardError, WizardStep};

fn saved_location() -> SavedLocation {
    serde_json::from_value(serde_json::json!({
        "id": 11,
        "location_name": "River plot",
        "nitrogen": 85.0,
        "phosphorus": 40.0,
        "potassium": 45.0,
        "ph_level": 6.8,
        "rainfall": 950.0,
        "temperature": 27.5,
        "humidity": 78.0,
    }))
    .expect("saved location fixture should deserialize")
}

#[test]
fn test_saved_location_edit_and_submit() {
    let mut wizard = SoilWizard::new();
    wizard.select_saved(&saved_location()).expect("from start");
    assert_eq!(wizard.step(), WizardStep::EditData);

    // Tweak one measurement before confirming.
    wizard.draft_mut().expect("editing").ph_level = 7.0;
    wizard.confirm_edits().expect("valid draft");
    assert_eq!(wizard.step(), WizardStep::Confirm);

    let draft = wizard.take_submission().expect("confirmed");
    assert_eq!(draft.location_name, "River plot");
    assert_eq!(draft.ph_level, 7.0);
    // The record ID rides along so the backend can link the submission.
    assert!(draft.id.is_some());
}

#[test]
fn test_fast_path_skips_editing() {
    let mut wizard = SoilWizard::new();
    wizard
        .continue_with_selected(&saved_location())
        .expect("saved data is already valid");
    assert_eq!(wizard.step(), WizardStep::Confirm);

    let draft = wizard.take_submission().expect("confirmed");
    assert_eq!(draft.nitrogen, 85.0);
}

#[test]
fn test_manual_entry_blocked_until_valid() {
    let mut wizard = SoilWizard::new();
    wizard.enter_new().expect("from start");

    // A blank draft cannot be confirmed.
    let err = wizard.confirm_edits().unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));
    assert_eq!(wizard.step(), WizardStep::EditData);

    {
        let draft = wizard.draft_mut().expect("editing");
        draft.location_name = "Backyard trial".to_string();
        draft.nitrogen = 60.0;
        draft.phosphorus = 30.0;
        draft.potassium = 35.0;
        draft.ph_level = 6.2;
        draft.rainfall = 700.0;
        draft.temperature = 24.0;
    }
    wizard.confirm_edits().expect("now valid");
    assert_eq!(wizard.step(), WizardStep::Confirm);
}

#[test]
fn test_back_keeps_the_draft() {
    let mut wizard = SoilWizard::new();
    wizard.select_saved(&saved_location()).expect("from start");
    wizard.confirm_edits().expect("valid draft");

    wizard.back().expect("from confirm");
    assert_eq!(wizard.step(), WizardStep::EditData);
    assert_eq!(wizard.draft().location_name, "River plot");

    wizard.back().expect("from edit");
    assert_eq!(wizard.step(), WizardStep::ChooseSource);
    assert!(wizard.back().is_err());
}

#[test]
fn test_reset_abandons_the_confirmation() {
    let mut wizard = SoilWizard::new();
    wizard
        .continue_with_selected(&saved_location())
        .expect("valid location");

    wizard.reset().expect("from confirm");
    assert_eq!(wizard.step(), WizardStep::ChooseSource);
    assert!(wizard.draft().is_blank());
}

#[test]
fn test_submission_requires_confirmation() {
    let mut wizard = SoilWizard::new();
    wizard.enter_new().expect("from start");

    let err = wizard.take_submission().unwrap_err();
    assert!(matches!(
        err,
        WizardError::InvalidTransition {
            step: WizardStep::EditData,
            ..
        }
    ));
}

#[test]
fn test_out_of_range_location_fails_the_fast_path() {
    let mut location = saved_location();
    location.ph_level = 22.0;

    let mut wizard = SoilWizard::new();
    let err = wizard.continue_with_selected(&location).unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));
    assert_eq!(wizard.step(), WizardStep::ChooseSource);
}
