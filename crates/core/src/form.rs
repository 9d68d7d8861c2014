//! Create/edit form validation gate.
//!
//! Every create or update passes through [`validate`] before a request is
//! issued. Company and position must be non-blank after trimming. Every
//! other field is optional; a blank value becomes `None` so the payload
//! never carries empty-string noise.

use chrono::NaiveDate;
use validator::{Validate, ValidationError};

use crate::application::{Application, ApplicationPayload};
use crate::error::CoreError;
use crate::status::JobType;

pub const FIELD_COMPANY_NAME: &str = "company_name";
pub const FIELD_POSITION_TITLE: &str = "position_title";

/// Fields that must be non-blank, in display order.
pub const REQUIRED_FIELDS: &[&str] = &[FIELD_COMPANY_NAME, FIELD_POSITION_TITLE];

/// Date format accepted by the applied-date input.
pub const APPLIED_DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw form values exactly as typed; blank means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ApplicationForm {
    #[validate(custom(function = "not_blank"))]
    pub company_name: String,
    #[validate(custom(function = "not_blank"))]
    pub position_title: String,
    pub location: String,
    pub job_type: String,
    pub source: String,
    pub applied_date: String,
    pub notes: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl ApplicationForm {
    pub fn new(company_name: impl Into<String>, position_title: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            position_title: position_title.into(),
            ..Default::default()
        }
    }

    /// Prefill an edit form from a loaded application.
    pub fn from_application(app: &Application) -> Self {
        Self {
            company_name: app.company_name.clone(),
            position_title: app.position_title.clone(),
            location: app.location.clone().unwrap_or_default(),
            job_type: app
                .job_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            source: app.source.clone().unwrap_or_default(),
            applied_date: app
                .applied_date
                .map(|d| d.format(APPLIED_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            notes: app.notes.clone().unwrap_or_default(),
        }
    }
}

/// Check required fields and normalize the form into a request payload.
///
/// Fails with [`CoreError::MissingFields`] listing the blank required
/// fields, or [`CoreError::Validation`] for an unparseable job type or
/// date.
pub fn validate(form: &ApplicationForm) -> Result<ApplicationPayload, CoreError> {
    if let Err(errors) = form.validate() {
        let field_errors = errors.field_errors();
        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| field_errors.contains_key(**field))
            .map(|field| field.to_string())
            .collect();
        return Err(CoreError::MissingFields(missing));
    }

    let job_type = blank_to_none(&form.job_type)
        .map(|raw| raw.parse::<JobType>())
        .transpose()?;

    let applied_date = blank_to_none(&form.applied_date)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, APPLIED_DATE_FORMAT).map_err(|_| {
                CoreError::Validation(format!(
                    "Invalid applied date '{raw}', expected YYYY-MM-DD"
                ))
            })
        })
        .transpose()?;

    Ok(ApplicationPayload {
        company_name: form.company_name.trim().to_string(),
        position_title: form.position_title.trim().to_string(),
        location: blank_to_none(&form.location),
        job_type,
        source: blank_to_none(&form.source),
        applied_date,
        notes: blank_to_none(&form.notes),
    })
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
