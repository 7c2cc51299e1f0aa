//! Writing generated values into the live form.

use tracing::{info, warn};

use crate::error::Result;
use crate::fields::{is_placeholder, CollectedField, ControlType};
use crate::generator::GeneratedValues;
use crate::session::WebSession;
use crate::similarity::best_match;

/// What happened to one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// Text typed into an input or textarea.
    Filled { value: String },
    /// Option chosen in a select; `score` is 0 for the first-option fallback.
    Selected { option: String, score: f64 },
    /// A select with nothing usable to choose.
    Unchanged,
    /// No generated value for this label.
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    pub fields: Vec<(String, FieldOutcome)>,
}

impl FillReport {
    pub fn outcome(&self, label: &str) -> Option<&FieldOutcome> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, outcome)| outcome)
    }

    /// Fields that received a value.
    pub fn applied(&self) -> usize {
        self.fields
            .iter()
            .filter(|(_, o)| matches!(o, FieldOutcome::Filled { .. } | FieldOutcome::Selected { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FieldOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FieldOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&FieldOutcome) -> bool) -> usize {
        self.fields.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Apply `values` to every collected field. A failing field is recorded and
/// the rest are still filled.
pub async fn fill_form<S: WebSession>(
    session: &S,
    fields: &[CollectedField<S::Element>],
    values: &GeneratedValues,
) -> FillReport {
    let mut report = FillReport::default();

    for field in fields {
        let label = field.label();
        let outcome = match values.get(label) {
            None => {
                info!(label = %label, "no value generated for field");
                FieldOutcome::Skipped
            }
            Some(value) => match fill_field(session, field, value).await {
                Ok(outcome) => {
                    info!(label = %label, value = %value, outcome = ?outcome, "filled field");
                    outcome
                }
                Err(e) => {
                    warn!(label = %label, error = %e, "error filling field");
                    FieldOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            },
        };
        report.fields.push((label.to_string(), outcome));
    }

    report
}

async fn fill_field<S: WebSession>(
    session: &S,
    field: &CollectedField<S::Element>,
    value: &str,
) -> Result<FieldOutcome> {
    match field.descriptor.control_type {
        ControlType::TextInput | ControlType::TextArea => {
            session.clear(&field.control).await?;
            session.type_text(&field.control, value).await?;
            Ok(FieldOutcome::Filled {
                value: value.to_string(),
            })
        }
        ControlType::Select => choose_option(session, &field.control, value).await,
    }
}

/// Pick the option closest to `value`; fall back to the first real option
/// when nothing matches and the select offers a choice at all.
async fn choose_option<S: WebSession>(
    session: &S,
    select: &S::Element,
    value: &str,
) -> Result<FieldOutcome> {
    let option_elements = session.children(select, "option").await?;
    let total = option_elements.len();

    let mut candidates = Vec::with_capacity(total);
    for option in option_elements {
        let text = session.read_text(&option).await?.trim().to_string();
        if !text.is_empty() && !is_placeholder(&text) {
            candidates.push((option, text));
        }
    }

    let texts: Vec<&str> = candidates.iter().map(|(_, text)| text.as_str()).collect();
    let (index, score) = match best_match(value, &texts) {
        Some(best) => best,
        None if total > 1 && !candidates.is_empty() => (0, 0.0),
        None => return Ok(FieldOutcome::Unchanged),
    };

    let (option, text) = &candidates[index];
    session.choose(option).await?;
    Ok(FieldOutcome::Selected {
        option: text.clone(),
        score,
    })
}
