//! Discovering the fillable fields of a registration form.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::session::WebSession;

/// Marker registration forms put in the label of mandatory fields.
const REQUIRED_MARKER: char = '*';

const NESTED_CONTROL_SELECTOR: &str = "input, textarea, select";

/// Input `type`s that take free text.
const TEXT_INPUT_TYPES: &[&str] = &[
    "", "text", "email", "tel", "url", "number", "search", "date", "datetime-local", "time",
];

/// The kinds of control the filler knows how to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControlType {
    #[serde(rename = "input")]
    TextInput,
    #[serde(rename = "textarea")]
    TextArea,
    #[serde(rename = "select")]
    Select,
}

impl ControlType {
    /// Map a tag name and input `type` to a control type, if supported.
    pub fn classify(tag: &str, input_type: Option<&str>) -> Option<Self> {
        match tag {
            "textarea" => Some(ControlType::TextArea),
            "select" => Some(ControlType::Select),
            "input" => {
                let input_type = input_type.unwrap_or("").trim().to_ascii_lowercase();
                TEXT_INPUT_TYPES
                    .contains(&input_type.as_str())
                    .then_some(ControlType::TextInput)
            }
            _ => None,
        }
    }
}

/// Normalized metadata about one labeled form control.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Visible label text; also the key the model answers under.
    pub label_text: String,
    pub control_type: ControlType,
    pub control_name: String,
    pub required: bool,
    /// Choices of a select, placeholders removed. Empty for text controls.
    pub options: Vec<String>,
}

/// A descriptor together with the live control it describes.
pub struct CollectedField<E> {
    pub descriptor: FieldDescriptor,
    pub control: E,
}

impl<E> CollectedField<E> {
    pub fn label(&self) -> &str {
        &self.descriptor.label_text
    }
}

/// Option texts such as "Select one..." or "Choose a track".
pub fn is_placeholder(option_text: &str) -> bool {
    option_text.contains("Select") || option_text.contains("Choose")
}

/// Collect every label in `form` that resolves to a supported control, in
/// document order. Labels that cannot be resolved are logged and left out.
pub async fn collect_fields<S: WebSession>(
    session: &S,
    form: &S::Element,
) -> Vec<CollectedField<S::Element>> {
    let labels = match session.children(form, "label").await {
        Ok(labels) => labels,
        Err(e) => {
            info!(error = %e, "could not enumerate form labels");
            return Vec::new();
        }
    };

    let mut fields = Vec::with_capacity(labels.len());
    for label in &labels {
        match describe_label(session, form, label).await {
            Ok(Some(field)) => {
                debug!(label = %field.descriptor.label_text, kind = ?field.descriptor.control_type, "collected field");
                fields.push(field);
            }
            Ok(None) => {}
            Err(e) => info!(error = %e, "skipping label"),
        }
    }

    info!(labels = labels.len(), fields = fields.len(), "collected form fields");
    fields
}

async fn describe_label<S: WebSession>(
    session: &S,
    form: &S::Element,
    label: &S::Element,
) -> Result<Option<CollectedField<S::Element>>> {
    let label_text = session.read_text(label).await?.trim().to_string();
    let label_for = session
        .read_attribute(label, "for")
        .await?
        .filter(|v| !v.trim().is_empty());

    let control = match label_for.as_deref() {
        Some(id) => session
            .children(form, &id_selector(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ElementNotFound(format!("no control with id {id:?}")))?,
        None => match session
            .children(label, NESTED_CONTROL_SELECTOR)
            .await?
            .into_iter()
            .next()
        {
            Some(control) => control,
            None => {
                debug!(label = %label_text, "label has no associated control");
                return Ok(None);
            }
        },
    };

    let tag = session.tag_name(&control).await?;
    let input_type = session.read_attribute(&control, "type").await?;
    let Some(control_type) = ControlType::classify(&tag, input_type.as_deref()) else {
        debug!(label = %label_text, tag = %tag, input_type = ?input_type, "unsupported control");
        return Ok(None);
    };

    let control_name = match session.read_attribute(&control, "name").await? {
        Some(name) if !name.is_empty() => name,
        _ => match label_for {
            Some(id) => id,
            None => session
                .read_attribute(&control, "id")
                .await?
                .unwrap_or_default(),
        },
    };

    let required = label_text.contains(REQUIRED_MARKER)
        || session.read_attribute(&control, "required").await?.is_some()
        || session
            .read_attribute(&control, "aria-required")
            .await?
            .is_some_and(|v| v == "true");

    let options = if control_type == ControlType::Select {
        select_options(session, &control).await?
    } else {
        Vec::new()
    };

    Ok(Some(CollectedField {
        descriptor: FieldDescriptor {
            label_text,
            control_type,
            control_name,
            required,
            options,
        },
        control,
    }))
}

/// Visible, non-placeholder option texts of a select.
pub(crate) async fn select_options<S: WebSession>(
    session: &S,
    select: &S::Element,
) -> Result<Vec<String>> {
    let mut options = Vec::new();
    for option in session.children(select, "option").await? {
        let text = session.read_text(&option).await?.trim().to_string();
        if !text.is_empty() && !is_placeholder(&text) {
            options.push(text);
        }
    }
    Ok(options)
}

/// Attribute selector matching an element id verbatim. Generated ids often
/// start with digits or contain colons, which `#id` cannot express.
fn id_selector(id: &str) -> String {
    let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[id=\"{escaped}\"]")
}
