//! Soil record and crop recommendation commands.

use clap::Args;
use tracing::{error, info};

use agrilink_client::wizard::{SoilDataDraft, SoilWizard};

/// Soil measurements shared by `soil submit` and `soil recommend`.
#[derive(Debug, Args)]
pub struct SoilArgs {
    /// Location name for the record
    #[arg(long)]
    pub location: String,

    /// Nitrogen content (kg/ha)
    #[arg(short = 'n', long)]
    pub nitrogen: f64,

    /// Phosphorus content (kg/ha)
    #[arg(long)]
    pub phosphorus: f64,

    /// Potassium content (kg/ha)
    #[arg(short = 'k', long)]
    pub potassium: f64,

    /// Soil pH
    #[arg(long)]
    pub ph: f64,

    /// Annual rainfall (mm)
    #[arg(long)]
    pub rainfall: f64,

    /// Average temperature (°C)
    #[arg(long)]
    pub temperature: f64,

    /// Relative humidity (%)
    #[arg(long)]
    pub humidity: Option<f64>,
}

impl SoilArgs {
    fn into_draft(self) -> SoilDataDraft {
        SoilDataDraft {
            location_name: self.location,
            nitrogen: self.nitrogen,
            phosphorus: self.phosphorus,
            potassium: self.potassium,
            ph_level: self.ph,
            rainfall: self.rainfall,
            temperature: self.temperature,
            humidity: self.humidity,
            ..SoilDataDraft::default()
        }
    }
}

/// Run the arguments through the wizard's validated path and hand back the
/// submission-ready draft.
fn validated_draft(args: SoilArgs) -> Result<SoilDataDraft, Box<dyn std::error::Error>> {
    let draft = args.into_draft();

    let mut wizard = SoilWizard::new();
    wizard.enter_new()?;
    *wizard.draft_mut()? = draft;
    if let Err(e) = wizard.confirm_edits() {
        error!("Soil data rejected: {e}");
        return Err(e.into());
    }
    Ok(wizard.take_submission()?)
}

/// List the user's saved soil locations.
///
/// # Errors
///
/// Returns an error if the request fails or the session is invalid.
pub async fn locations() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = super::client()?;
    let saved = client.saved_locations().await?;

    info!("{} saved locations", saved.len());
    for record in &saved {
        info!(
            "  #{} {} - N {} / P {} / K {}, pH {}",
            record.id,
            record.location_name,
            record.nitrogen,
            record.phosphorus,
            record.potassium,
            record.ph_level,
        );
    }
    Ok(())
}

/// Validate and save a soil record.
///
/// # Errors
///
/// Returns an error on out-of-range measurements or a rejected submission.
pub async fn submit(args: SoilArgs) -> Result<(), Box<dyn std::error::Error>> {
    let draft = validated_draft(args)?;

    let (_, client) = super::client()?;
    let record = client.create_soil_record(&draft).await?;
    info!("Saved soil record #{} ({})", record.id, record.location_name);
    Ok(())
}

/// Validate soil data and request a crop recommendation.
///
/// # Errors
///
/// Returns an error on out-of-range measurements or a failed request.
pub async fn recommend(args: SoilArgs) -> Result<(), Box<dyn std::error::Error>> {
    let draft = validated_draft(args)?;

    let (_, client) = super::client()?;
    let recommendation = client.crop_recommendation(&draft).await?;

    match recommendation.confidence {
        Some(confidence) => info!(
            "Recommended crop: {} ({:.0}% confidence)",
            recommendation.crop,
            confidence * 100.0
        ),
        None => info!("Recommended crop: {}", recommendation.crop),
    }
    if !recommendation.alternatives.is_empty() {
        info!("Alternatives: {}", recommendation.alternatives.join(", "));
    }
    Ok(())
}
