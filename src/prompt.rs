//! Prompt text for the single batched completion request.

use std::fmt::Write as _;

use serde::Serialize;

use crate::context::EventContext;
use crate::fields::{ControlType, FieldDescriptor};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates form data in valid JSON format. \
Your responses must be valid JSON objects that can be parsed by a standard JSON parser.";

const REQUIREMENTS: &str = r#"Requirements:
1. Generate appropriate values for each field based on its type and name
2. For select fields, choose one of the provided options
3. For required fields (marked with "required": true), ensure a value is provided
4. Make sure values are realistic and contextually appropriate
5. For text inputs that ask for names, generate realistic full names
6. For email fields, generate appropriate email addresses
7. For text areas, generate coherent paragraphs of appropriate length
8. For date fields, select appropriate dates considering the event information
9. Use information from the additional context whenever it answers a field

Respond with ONLY a JSON object. Use each field's "fieldName" exactly as written as the key and the generated value as a string.
Example format:
{
  "Name *": "John Smith",
  "Email *": "john.smith@example.com",
  "Why are you interested in attending this event?": "As a technology professional, I'm excited to learn about the latest developments and network with peers."
}
"#;

/// The machine-readable view of a field shown to the model.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldSpec<'a> {
    field_name: &'a str,
    field_type: ControlType,
    required: bool,
    #[serde(skip_serializing_if = "no_options")]
    options: &'a [String],
}

fn no_options(options: &&[String]) -> bool {
    options.is_empty()
}

impl<'a> From<&'a FieldDescriptor> for FieldSpec<'a> {
    fn from(field: &'a FieldDescriptor) -> Self {
        let options: &[String] = if field.control_type == ControlType::Select {
            &field.options
        } else {
            &[]
        };
        Self {
            field_name: &field.label_text,
            field_type: field.control_type,
            required: field.required,
            options,
        }
    }
}

/// Build the user prompt. Identical inputs give byte-identical output.
pub fn build_prompt(
    fields: &[FieldDescriptor],
    context: &EventContext,
    additional_context: &str,
) -> String {
    let specs: Vec<FieldSpec<'_>> = fields.iter().map(FieldSpec::from).collect();
    // Serializing plain strings and bools cannot fail.
    let fields_json = serde_json::to_string_pretty(&specs).unwrap_or_else(|_| "[]".to_string());

    let mut prompt = String::new();
    prompt.push_str("Please generate realistic form data for an event registration form.\n\n");
    prompt.push_str("EVENT INFORMATION:\n");
    prompt.push_str(&describe_event(context, additional_context));
    prompt.push_str("\nFORM FIELDS:\n");
    prompt.push_str(&fields_json);
    prompt.push_str("\n\n");
    prompt.push_str(REQUIREMENTS);
    prompt
}

fn describe_event(context: &EventContext, additional_context: &str) -> String {
    let mut out = String::new();
    let lines = [
        ("Event Title", &context.title),
        ("Event Description", &context.description),
        ("Event Date/Time", &context.date_time),
        ("Event Location", &context.location),
    ];
    for (name, value) in lines {
        if !value.is_empty() {
            let _ = writeln!(out, "{name}: {value}");
        }
    }
    let additional_context = additional_context.trim();
    if !additional_context.is_empty() {
        let _ = writeln!(out, "\nAdditional Context: {additional_context}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor {
                label_text: "Name *".into(),
                control_type: ControlType::TextInput,
                control_name: "name".into(),
                required: true,
                options: vec![],
            },
            FieldDescriptor {
                label_text: "Role".into(),
                control_type: ControlType::Select,
                control_name: "role".into(),
                required: false,
                options: vec!["Engineer".into(), "Manager".into()],
            },
        ]
    }

    fn context() -> EventContext {
        EventContext {
            title: "Rust Meetup".into(),
            date_time: "Friday 7pm".into(),
            ..EventContext::default()
        }
    }

    #[test]
    fn includes_only_present_context_lines() {
        let prompt = build_prompt(&fields(), &context(), "");
        assert!(prompt.contains("Event Title: Rust Meetup\n"));
        assert!(prompt.contains("Event Date/Time: Friday 7pm\n"));
        assert!(!prompt.contains("Event Description:"));
        assert!(!prompt.contains("Event Location:"));
        assert!(!prompt.contains("Additional Context:"));
    }

    #[test]
    fn lists_fields_as_json() {
        let prompt = build_prompt(&fields(), &context(), "Name: Jane Doe");
        assert!(prompt.contains("\"fieldName\": \"Name *\""));
        assert!(prompt.contains("\"fieldType\": \"input\""));
        assert!(prompt.contains("\"fieldType\": \"select\""));
        assert!(prompt.contains("\"required\": true"));
        assert!(prompt.contains("\"Manager\""));
        assert!(prompt.contains("Additional Context: Name: Jane Doe"));
        // text inputs carry no options key
        assert_eq!(prompt.matches("\"options\"").count(), 1);
    }

    #[test]
    fn explains_output_shape() {
        let prompt = build_prompt(&fields(), &context(), "");
        assert!(prompt.contains("Respond with ONLY a JSON object"));
        assert!(prompt.contains("\"Email *\": \"john.smith@example.com\""));
    }

    #[test]
    fn output_is_deterministic() {
        let a = build_prompt(&fields(), &context(), "ctx");
        let b = build_prompt(&fields(), &context(), "ctx");
        assert_eq!(a, b);
    }
}
