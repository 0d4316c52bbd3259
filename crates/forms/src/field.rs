// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Field descriptors and the field-factory functions that build them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::mapper::Mapper;

/// The kind of control a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Single line text input.
    Text,
    /// Hidden input.
    Hidden,
    /// Submit button.
    Button,
    /// Static text.
    Paragraph,
    /// Day/month/year inputs.
    Date,
    /// One-of-many choice.
    Radio,
    /// Many-of-many choice.
    Checkbox,
}

impl FieldKind {
    /// Returns true if fields of this kind carry a submitted value.
    #[must_use]
    pub const fn holds_value(&self) -> bool {
        !matches!(self, Self::Button | Self::Paragraph)
    }
}

/// HTML input type for text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Free text.
    #[default]
    Text,
    /// Numeric text.
    Number,
    /// Masked text.
    Password,
    /// Email address.
    Email,
    /// Multi-line text.
    Textarea,
}

/// One option of a radio or checkbox field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Submitted value.
    pub value: Value,
    /// Label shown to the user.
    pub label: String,
    /// Optional hint below the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Choice {
    /// Creates a choice.
    #[must_use]
    pub fn new(value: impl Into<Value>, label: &str) -> Self {
        Self {
            value: value.into(),
            label: label.to_string(),
            hint: None,
        }
    }

    /// Adds a hint.
    #[must_use]
    pub fn with_hint(mut self, hint: &str) -> Self {
        self.hint = Some(hint.to_string());
        self
    }
}

/// Presentation and mapping options for a field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Label text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Render the label as the page heading.
    #[serde(default)]
    pub label_is_heading: bool,
    /// Hint text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Value mapper.
    #[serde(default)]
    pub mapper: Mapper,
    /// Input type for text fields.
    #[serde(default)]
    pub input_type: InputType,
    /// Choices for radio and checkbox fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Error messages keyed by validation error kind, e.g. `any.required`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub error_messages: BTreeMap<String, String>,
    /// Text shown after the input, e.g. units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl FieldOptions {
    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Renders the label as the page heading.
    #[must_use]
    pub const fn heading(mut self) -> Self {
        self.label_is_heading = true;
        self
    }

    /// Sets the hint.
    #[must_use]
    pub fn hint(mut self, hint: &str) -> Self {
        self.hint = Some(hint.to_string());
        self
    }

    /// Sets the mapper.
    #[must_use]
    pub const fn mapper(mut self, mapper: Mapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Sets the input type.
    #[must_use]
    pub const fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Sets the suffix.
    #[must_use]
    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = Some(suffix.to_string());
        self
    }

    /// Adds an error message for a validation error kind.
    #[must_use]
    pub fn error(mut self, kind: &str, message: &str) -> Self {
        self.error_messages
            .insert(kind.to_string(), message.to_string());
        self
    }

    /// Uses one message for every listed error kind.
    #[must_use]
    pub fn errors(mut self, kinds: &[&str], message: &str) -> Self {
        for kind in kinds {
            self.error_messages
                .insert((*kind).to_string(), message.to_string());
        }
        self
    }
}

/// A validation error attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field the error belongs to.
    pub name: String,
    /// Message shown to the user.
    pub message: String,
    /// Validation error kind, e.g. `number.min`.
    pub kind: String,
}

impl FieldError {
    /// Anchor used by the error summary to link to the field.
    #[must_use]
    pub fn href(&self) -> String {
        format!("#{}", self.name)
    }
}

/// A form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name; `None` for buttons and paragraphs.
    pub name: Option<String>,
    /// Control kind.
    pub kind: FieldKind,
    /// Options.
    pub options: FieldOptions,
    /// Typed value.
    #[serde(default)]
    pub value: Option<Value>,
    /// Errors from the last validation.
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

impl Field {
    /// Creates a field.
    #[must_use]
    pub fn new(name: Option<&str>, kind: FieldKind, options: FieldOptions) -> Self {
        Self {
            name: name.map(str::to_string),
            kind,
            options,
            value: None,
            errors: Vec::new(),
        }
    }

    /// Name of a field that carries a value.
    #[must_use]
    pub fn value_name(&self) -> Option<&str> {
        if self.kind.holds_value() {
            self.name.as_deref()
        } else {
            None
        }
    }

    /// The value converted for display by the field's mapper.
    #[must_use]
    pub fn display_value(&self) -> Option<Value> {
        self.value
            .as_ref()
            .and_then(|value| self.options.mapper.export(value))
    }

    /// Sets the initial value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Field-factory functions.
pub mod fields {
    use super::{Choice, Field, FieldKind, FieldOptions};
    use crate::mapper::Mapper;
    use serde_json::Value;

    /// A text input.
    #[must_use]
    pub fn text(name: &str, options: FieldOptions) -> Field {
        Field::new(Some(name), FieldKind::Text, options)
    }

    /// A hidden input with a fixed value.
    #[must_use]
    pub fn hidden(name: &str, value: impl Into<Value>) -> Field {
        Field::new(Some(name), FieldKind::Hidden, FieldOptions::default()).with_value(value)
    }

    /// A submit button.
    #[must_use]
    pub fn button(label: &str) -> Field {
        Field::new(None, FieldKind::Button, FieldOptions::default().label(label))
    }

    /// A paragraph of static text.
    #[must_use]
    pub fn paragraph(text: &str) -> Field {
        Field::new(None, FieldKind::Paragraph, FieldOptions::default().label(text))
    }

    /// Day, month and year inputs combined by the date mapper.
    #[must_use]
    pub fn date(name: &str, options: FieldOptions) -> Field {
        Field::new(Some(name), FieldKind::Date, options.mapper(Mapper::Date))
    }

    /// A radio group.
    #[must_use]
    pub fn radio(name: &str, choices: Vec<Choice>, mut options: FieldOptions) -> Field {
        options.choices = choices;
        Field::new(Some(name), FieldKind::Radio, options)
    }

    /// A checkbox group, always submitted as an array.
    #[must_use]
    pub fn checkbox(name: &str, choices: Vec<Choice>, mut options: FieldOptions) -> Field {
        options.choices = choices;
        Field::new(Some(name), FieldKind::Checkbox, options.mapper(Mapper::Array))
    }
}
