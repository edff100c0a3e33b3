//! Service policies: input validation, timestamps, deadlines and retries.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{ArtPostDraft, ArtPostFields, ReviewDraft, ReviewFields};
use crate::error::DomainError;

/// How missing required input is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Missing or blank required fields are rejected.
    #[default]
    Strict,
    /// Missing fields silently default to empty strings.
    Permissive,
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(format!("unknown validation mode `{other}`")),
        }
    }
}

impl ValidationPolicy {
    /// Turn raw post input into a draft. Poster name and title are required.
    pub fn art_post(&self, fields: ArtPostFields) -> Result<ArtPostDraft, DomainError> {
        let mut missing = Vec::new();
        let poster_name = self.required("posterName", fields.poster_name, &mut missing);
        let title = self.required("title", fields.title, &mut missing);
        reject_missing(missing)?;

        Ok(ArtPostDraft {
            poster_name,
            image_ref: fields.image_ref.unwrap_or_default(),
            title,
            art_type: fields.art_type.unwrap_or_default(),
            description: fields.description.unwrap_or_default(),
            subjects: fields.subjects.unwrap_or_default().into_list(),
            like_count: fields.like_count,
        })
    }

    /// Turn raw review input into a draft. Reviewer name and text are required.
    pub fn review(&self, fields: ReviewFields) -> Result<ReviewDraft, DomainError> {
        let mut missing = Vec::new();
        let reviewer_name = self.required("reviewerName", fields.reviewer_name, &mut missing);
        let text = self.required("text", fields.text, &mut missing);
        reject_missing(missing)?;

        Ok(ReviewDraft {
            reviewer_name,
            text,
            liked_post: fields.liked_post,
        })
    }

    fn required(
        &self,
        field: &'static str,
        value: Option<String>,
        missing: &mut Vec<&'static str>,
    ) -> String {
        match (self, value) {
            (_, Some(v)) if !v.trim().is_empty() => v,
            (ValidationPolicy::Permissive, v) => v.unwrap_or_default(),
            (ValidationPolicy::Strict, _) => {
                missing.push(field);
                String::new()
            }
        }
    }
}

fn reject_missing(missing: Vec<&'static str>) -> Result<(), DomainError> {
    if missing.is_empty() {
        return Ok(());
    }
    Err(DomainError::Validation(format!(
        "missing required field(s): {}",
        missing.join(", ")
    )))
}

/// Knobs shared by the art post and review services.
#[derive(Debug, Clone)]
pub struct ServicePolicy {
    pub validation: ValidationPolicy,
    /// Re-stamp `post_date` whenever a post is edited.
    pub restamp_on_edit: bool,
    /// Deadline for every storage-backed operation.
    pub operation_timeout: Duration,
    /// Retries after a conflicting review write before giving up; the
    /// first attempt is not counted.
    pub max_write_retries: u32,
    /// Default cap for "other posts" listings.
    pub others_limit: usize,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self {
            validation: ValidationPolicy::Strict,
            restamp_on_edit: true,
            operation_timeout: Duration::from_secs(5),
            max_write_retries: 3,
            others_limit: 12,
        }
    }
}

/// Run `fut` under `timeout`, failing with `DomainError::Timeout` when it
/// does not finish in time.
pub(crate) async fn with_deadline<T, F>(timeout: Duration, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| DomainError::Timeout(timeout))?
}
