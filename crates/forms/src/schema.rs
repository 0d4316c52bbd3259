// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Validation adapter.
//!
//! Every validator is driven through the same contract: it borrows the typed
//! value bag and returns the converted values plus an optional list of error
//! items, each naming the field it belongs to. A malformed schema is an
//! `Err(SchemaError)` and is never reported as a user-facing error.
//!
//! `ObjectSchema` compiles its field rules into a JSON Schema document and
//! evaluates it with `jsonschema`. Each library error is mapped back to the
//! field named by the first segment of its instance path. Date bounds and
//! references to other fields cannot be expressed in JSON Schema, so they
//! run afterwards on fields that passed, followed by any cross-field checks.

use jsonschema::error::ValidationErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use time::Date;
use water_abstraction_domain::{format_iso_date, parse_iso_date};

use crate::Payload;
use crate::error::SchemaError;
use crate::mapper::number_value;

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorItem {
    /// Path of the failing value, e.g. `readings.2`.
    pub property: String,
    /// Default message.
    pub message: String,
    /// Name of the field the failure is attributed to.
    pub name: String,
    /// The constraint argument, e.g. the minimum.
    pub argument: Option<Value>,
    /// Error kind, e.g. `number.min`.
    pub kind: String,
}

impl ValidationErrorItem {
    /// Creates an item whose property is the field name.
    #[must_use]
    pub fn new(name: &str, kind: &str, message: String, argument: Option<Value>) -> Self {
        Self {
            property: name.to_string(),
            message,
            name: name.to_string(),
            argument,
            kind: kind.to_string(),
        }
    }

    /// Creates an `any.custom` item for a cross-field check.
    #[must_use]
    pub fn custom(name: &str, message: &str) -> Self {
        Self::new(name, "any.custom", message.to_string(), None)
    }
}

/// Structured failure details.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationErrorDetails {
    /// Individual failures in schema order.
    pub errors: Vec<ValidationErrorItem>,
}

/// Result of running a validator.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// `None` exactly when validation passed.
    pub error: Option<ValidationErrorDetails>,
    /// The validated data, with conversions applied.
    pub value: Payload,
}

impl Validation {
    /// A passing validation.
    #[must_use]
    pub const fn passed(value: Payload) -> Self {
        Self { error: None, value }
    }

    /// Builds a validation from collected items.
    #[must_use]
    pub fn from_errors(value: Payload, errors: Vec<ValidationErrorItem>) -> Self {
        let error: Option<ValidationErrorDetails> = if errors.is_empty() {
            None
        } else {
            Some(ValidationErrorDetails { errors })
        };
        Self { error, value }
    }

    /// Returns true if validation passed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Options applied to a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Stop at the first failing field.
    pub abort_early: bool,
    /// Keep keys the schema does not describe instead of rejecting them.
    pub allow_unknown: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            abort_early: false,
            allow_unknown: true,
        }
    }
}

/// Uniform validator contract.
pub trait Validator {
    /// Validates `data` without modifying it.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the validator itself is misconfigured.
    fn validate(
        &self,
        data: &Payload,
        options: &ValidationOptions,
    ) -> Result<Validation, SchemaError>;
}

impl<F> Validator for F
where
    F: Fn(&Payload) -> Result<Validation, SchemaError>,
{
    fn validate(
        &self,
        data: &Payload,
        _options: &ValidationOptions,
    ) -> Result<Validation, SchemaError> {
        self(data)
    }
}

/// Validates `data` against `schema` with default options.
///
/// # Errors
///
/// Returns `SchemaError` if the schema is misconfigured.
pub fn validate<V: Validator + ?Sized>(data: &Payload, schema: &V) -> Result<Validation, SchemaError> {
    schema.validate(data, &ValidationOptions::default())
}

/// Value type a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleType {
    Any,
    String,
    Number,
    Boolean,
    Date,
    Array,
}

impl RuleType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Array => "array",
        }
    }
}

/// A declarative rule for one field.
///
/// `min`/`max` bound the value for numbers, the length for strings and the
/// item count for arrays. Date bounds and `min_ref` apply to top-level fields
/// only.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    rule_type: RuleType,
    required: bool,
    allow_null: bool,
    allow_empty: bool,
    integer: bool,
    min: Option<f64>,
    max: Option<f64>,
    min_date: Option<Date>,
    max_date: Option<Date>,
    min_ref: Option<String>,
    valid: Vec<Value>,
    items: Option<Box<Rule>>,
}

impl Rule {
    const fn of(rule_type: RuleType) -> Self {
        Self {
            rule_type,
            required: false,
            allow_null: false,
            allow_empty: false,
            integer: false,
            min: None,
            max: None,
            min_date: None,
            max_date: None,
            min_ref: None,
            valid: Vec::new(),
            items: None,
        }
    }

    /// Accepts any value.
    #[must_use]
    pub const fn any() -> Self {
        Self::of(RuleType::Any)
    }

    /// A trimmed string.
    #[must_use]
    pub const fn string() -> Self {
        Self::of(RuleType::String)
    }

    /// A number; numeric strings are converted.
    #[must_use]
    pub const fn number() -> Self {
        Self::of(RuleType::Number)
    }

    /// A boolean; `"true"`/`"false"` are converted.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::of(RuleType::Boolean)
    }

    /// An ISO `YYYY-MM-DD` date.
    #[must_use]
    pub const fn date() -> Self {
        Self::of(RuleType::Date)
    }

    /// An array.
    #[must_use]
    pub const fn array() -> Self {
        Self::of(RuleType::Array)
    }

    /// The value must be present.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// `null` is accepted.
    #[must_use]
    pub const fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// The empty string is accepted.
    #[must_use]
    pub const fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Numbers must be whole.
    #[must_use]
    pub const fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Earliest permitted date.
    #[must_use]
    pub const fn min_date(mut self, date: Date) -> Self {
        self.min_date = Some(date);
        self
    }

    /// Latest permitted date.
    #[must_use]
    pub const fn max_date(mut self, date: Date) -> Self {
        self.max_date = Some(date);
        self
    }

    /// The number must be at least the value of another field.
    #[must_use]
    pub fn min_ref(mut self, field: &str) -> Self {
        self.min_ref = Some(field.to_string());
        self
    }

    /// The value must be one of `values`.
    #[must_use]
    pub fn valid<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.valid = values.into_iter().map(Into::into).collect();
        self
    }

    /// Rule applied to each array item.
    #[must_use]
    pub fn items(mut self, rule: Self) -> Self {
        self.items = Some(Box::new(rule));
        self
    }

    fn check_configuration(
        &self,
        field: &str,
        known: &HashSet<&str>,
        is_item: bool,
    ) -> Result<(), SchemaError> {
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            return Err(SchemaError::ConflictingBounds {
                field: field.to_string(),
            });
        }
        if let (Some(min), Some(max)) = (self.min_date, self.max_date)
            && min > max
        {
            return Err(SchemaError::ConflictingBounds {
                field: field.to_string(),
            });
        }
        let inapplicable = |constraint: &'static str, rule_type: &'static str| {
            SchemaError::InapplicableConstraint {
                field: field.to_string(),
                constraint,
                rule_type,
            }
        };
        let rule_type: &'static str = self.rule_type.as_str();
        if self.integer && self.rule_type != RuleType::Number {
            return Err(inapplicable("integer", rule_type));
        }
        if self.min_date.is_some() || self.max_date.is_some() {
            if self.rule_type != RuleType::Date {
                return Err(inapplicable("min_date/max_date", rule_type));
            }
            if is_item {
                return Err(inapplicable("min_date/max_date", "array item"));
            }
        }
        if self.items.is_some() && self.rule_type != RuleType::Array {
            return Err(inapplicable("items", rule_type));
        }
        if let Some(reference) = &self.min_ref {
            if self.rule_type != RuleType::Number {
                return Err(inapplicable("min_ref", rule_type));
            }
            if is_item {
                return Err(inapplicable("min_ref", "array item"));
            }
            if !known.contains(reference.as_str()) {
                return Err(SchemaError::UnknownReference {
                    field: field.to_string(),
                    reference: reference.clone(),
                });
            }
        }
        if let Some(items) = &self.items {
            items.check_configuration(field, known, true)?;
        }
        Ok(())
    }

    /// The JSON Schema fragment for this rule.
    fn to_json_schema(&self) -> Value {
        let mut schema: Map<String, Value> = Map::new();

        let mut types: Vec<Value> = match self.rule_type {
            RuleType::Any => Vec::new(),
            RuleType::String | RuleType::Date => vec![json!("string")],
            RuleType::Number if self.integer => vec![json!("integer")],
            RuleType::Number => vec![json!("number")],
            RuleType::Boolean => vec![json!("boolean")],
            RuleType::Array => vec![json!("array")],
        };
        if !types.is_empty() {
            if self.allow_null {
                types.push(json!("null"));
            }
            let type_value: Value = if types.len() == 1 {
                types.remove(0)
            } else {
                Value::Array(types)
            };
            schema.insert(String::from("type"), type_value);
        }

        match self.rule_type {
            RuleType::String => {
                let floor: f64 = if self.allow_empty { 0.0 } else { 1.0 };
                let min_length: f64 = self.min.map_or(floor, |min| min.max(floor));
                if min_length > 0.0 {
                    schema.insert(String::from("minLength"), count_limit(min_length));
                }
                if let Some(max) = self.max {
                    schema.insert(String::from("maxLength"), count_limit(max));
                }
            }
            RuleType::Number => {
                if let Some(min) = self.min.and_then(number_value) {
                    schema.insert(String::from("minimum"), min);
                }
                if let Some(max) = self.max.and_then(number_value) {
                    schema.insert(String::from("maximum"), max);
                }
            }
            RuleType::Date => {
                schema.insert(String::from("format"), json!("date"));
            }
            RuleType::Array => {
                if let Some(min) = self.min {
                    schema.insert(String::from("minItems"), count_limit(min));
                }
                if let Some(max) = self.max {
                    schema.insert(String::from("maxItems"), count_limit(max));
                }
                if let Some(items) = &self.items {
                    schema.insert(String::from("items"), items.to_json_schema());
                }
            }
            RuleType::Any | RuleType::Boolean => {}
        }

        if !self.valid.is_empty() {
            let mut options: Vec<Value> = self.valid.clone();
            if self.allow_null {
                options.push(Value::Null);
            }
            schema.insert(String::from("enum"), Value::Array(options));
        }

        Value::Object(schema)
    }

    /// Applies the conversions the schema expects: trimmed strings,
    /// numeric strings as numbers and `"true"`/`"false"` as booleans.
    fn convert(&self, value: &Value) -> Value {
        match (self.rule_type, value) {
            (RuleType::String | RuleType::Date, Value::String(s)) => {
                Value::String(s.trim().to_string())
            }
            (RuleType::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .and_then(number_value)
                .unwrap_or_else(|| value.clone()),
            (RuleType::Boolean, Value::String(s)) if s == "true" => Value::Bool(true),
            (RuleType::Boolean, Value::String(s)) if s == "false" => Value::Bool(false),
            (RuleType::Array, Value::Array(items)) => match &self.items {
                Some(rule) => Value::Array(items.iter().map(|item| rule.convert(item)).collect()),
                None => value.clone(),
            },
            _ => value.clone(),
        }
    }

    const fn base_kind(&self) -> &'static str {
        match self.rule_type {
            RuleType::Any => "any.base",
            RuleType::String => "string.base",
            RuleType::Number => "number.base",
            RuleType::Boolean => "boolean.base",
            RuleType::Date => "date.base",
            RuleType::Array => "array.base",
        }
    }

    fn base_message(&self, property: &str) -> String {
        match self.rule_type {
            RuleType::Any => format!("\"{property}\" is invalid"),
            RuleType::String => format!("\"{property}\" must be a string"),
            RuleType::Number => format!("\"{property}\" must be a number"),
            RuleType::Boolean => format!("\"{property}\" must be a boolean"),
            RuleType::Date => format!("\"{property}\" must be a valid date"),
            RuleType::Array => format!("\"{property}\" must be an array"),
        }
    }

    /// Maps one library error on a value governed by this rule to an item.
    fn describe(
        &self,
        kind: &ValidationErrorKind,
        instance: &Value,
        name: &str,
        property: &str,
    ) -> ValidationErrorItem {
        let bound = |limit: Option<f64>| limit.and_then(number_value);
        let (kind, message, argument): (&str, String, Option<Value>) = match kind {
            ValidationErrorKind::Type { .. } if instance.is_null() && self.required => (
                "any.required",
                format!("\"{property}\" is required"),
                None,
            ),
            ValidationErrorKind::Type { .. } if self.integer && instance.is_number() => (
                "number.integer",
                format!("\"{property}\" must be an integer"),
                None,
            ),
            ValidationErrorKind::Minimum { .. } => (
                "number.min",
                format!("\"{property}\" must be greater than or equal to {}", show(self.min)),
                bound(self.min),
            ),
            ValidationErrorKind::Maximum { .. } => (
                "number.max",
                format!("\"{property}\" must be less than or equal to {}", show(self.max)),
                bound(self.max),
            ),
            ValidationErrorKind::MinLength { .. }
                if instance.as_str().is_some_and(str::is_empty) =>
            {
                (
                    "string.empty",
                    format!("\"{property}\" is not allowed to be empty"),
                    None,
                )
            }
            ValidationErrorKind::MinLength { .. } => (
                "string.min",
                format!(
                    "\"{property}\" length must be at least {} characters long",
                    show(self.min)
                ),
                bound(self.min),
            ),
            ValidationErrorKind::MaxLength { .. } => (
                "string.max",
                format!(
                    "\"{property}\" length must be less than or equal to {} characters long",
                    show(self.max)
                ),
                bound(self.max),
            ),
            ValidationErrorKind::MinItems { .. } => (
                "array.min",
                format!("\"{property}\" must contain at least {} items", show(self.min)),
                bound(self.min),
            ),
            ValidationErrorKind::MaxItems { .. } => (
                "array.max",
                format!(
                    "\"{property}\" must contain less than or equal to {} items",
                    show(self.max)
                ),
                bound(self.max),
            ),
            ValidationErrorKind::Enum { .. } => {
                let allowed: Vec<String> = self.valid.iter().map(display_value).collect();
                (
                    "any.only",
                    format!("\"{property}\" must be one of [{}]", allowed.join(", ")),
                    Some(Value::Array(self.valid.clone())),
                )
            }
            _ => (self.base_kind(), self.base_message(property), None),
        };
        item(name, property, kind, message, argument)
    }

    /// Checks the constraints JSON Schema cannot express.
    fn check_bounds(&self, name: &str, value: &Value, data: &Payload) -> Option<ValidationErrorItem> {
        if self.rule_type == RuleType::Date {
            let raw: &str = value.as_str()?;
            let Ok(date) = parse_iso_date(raw) else {
                return Some(item(
                    name,
                    name,
                    self.base_kind(),
                    self.base_message(name),
                    None,
                ));
            };
            if let Some(min) = self.min_date
                && date < min
            {
                return Some(item(
                    name,
                    name,
                    "date.min",
                    format!(
                        "\"{name}\" must be greater than or equal to \"{}\"",
                        format_iso_date(min)
                    ),
                    Some(Value::String(format_iso_date(min))),
                ));
            }
            if let Some(max) = self.max_date
                && date > max
            {
                return Some(item(
                    name,
                    name,
                    "date.max",
                    format!(
                        "\"{name}\" must be less than or equal to \"{}\"",
                        format_iso_date(max)
                    ),
                    Some(Value::String(format_iso_date(max))),
                ));
            }
            return None;
        }

        let reference: &str = self.min_ref.as_deref()?;
        let number: f64 = value.as_f64()?;
        let limit: f64 = data.get(reference).and_then(as_number)?;
        (number < limit).then(|| {
            item(
                name,
                name,
                "number.min",
                format!("\"{name}\" must be greater than or equal to ref:{reference}"),
                number_value(limit),
            )
        })
    }
}

fn item(
    name: &str,
    property: &str,
    kind: &str,
    message: String,
    argument: Option<Value>,
) -> ValidationErrorItem {
    ValidationErrorItem {
        property: property.to_string(),
        message,
        name: name.to_string(),
        argument,
        kind: kind.to_string(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_limit(n: f64) -> Value {
    json!(n.max(0.0).ceil() as u64)
}

fn show(limit: Option<f64>) -> String {
    limit.and_then(number_value).map_or_else(String::new, |v| v.to_string())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Orders kinds so a missing or mistyped value is reported before the
/// constraints that only make sense for a well-typed one.
fn severity(kind: &str) -> u8 {
    match kind {
        "any.required" => 0,
        "number.integer" | "object.unknown" => 1,
        _ if kind.ends_with(".base") => 1,
        "string.empty" => 2,
        _ => 3,
    }
}

/// Splits a JSON pointer such as `/readings/2` into its unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Cross-field check run after every field rule has passed.
pub type Check = Box<dyn Fn(&Payload) -> Vec<ValidationErrorItem> + Send + Sync>;

/// A declarative object schema: per-field rules plus cross-field checks.
#[derive(Default)]
pub struct ObjectSchema {
    rules: Vec<(String, Rule)>,
    checks: Vec<Check>,
    options: Option<ValidationOptions>,
}

impl std::fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("rules", &self.rules)
            .field("checks", &self.checks.len())
            .field("options", &self.options)
            .finish()
    }
}

impl ObjectSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field rule.
    #[must_use]
    pub fn field(mut self, name: &str, rule: Rule) -> Self {
        self.rules.push((name.to_string(), rule));
        self
    }

    /// Adds a cross-field check.
    #[must_use]
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Payload) -> Vec<ValidationErrorItem> + Send + Sync + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }

    /// Fixes the options for this schema, overriding those passed to `validate`.
    #[must_use]
    pub const fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// The JSON Schema document the field rules compile to.
    #[must_use]
    pub fn to_json_schema(&self, options: &ValidationOptions) -> Value {
        let properties: Map<String, Value> = self
            .rules
            .iter()
            .map(|(name, rule)| (name.clone(), rule.to_json_schema()))
            .collect();
        let required: Vec<Value> = self
            .rules
            .iter()
            .filter(|(_, rule)| rule.required)
            .map(|(name, _)| Value::String(name.clone()))
            .collect();

        let mut schema: Value = json!({
            "type": "object",
            "properties": properties,
            "required": required,
        });
        if !options.allow_unknown
            && let Some(object) = schema.as_object_mut()
        {
            object.insert(String::from("additionalProperties"), Value::Bool(false));
        }
        schema
    }

    fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|(rule_name, _)| rule_name == name)
            .map(|(_, rule)| rule)
    }

    /// Position used to report errors in declaration order.
    fn position(&self, name: &str) -> usize {
        self.rules
            .iter()
            .position(|(rule_name, _)| rule_name == name)
            .unwrap_or(self.rules.len())
    }

    fn convert(&self, data: &Payload, options: &ValidationOptions) -> Payload {
        data.iter()
            .filter_map(|(key, raw)| match self.rule(key) {
                Some(rule) => Some((key.clone(), rule.convert(raw))),
                None if options.allow_unknown => Some((key.clone(), raw.clone())),
                None => None,
            })
            .collect()
    }

    /// Maps one `jsonschema` error to the items it reports.
    fn describe(&self, error: &jsonschema::ValidationError<'_>) -> Vec<ValidationErrorItem> {
        match &error.kind {
            ValidationErrorKind::Required { property } => {
                let name: String = display_value(property);
                vec![item(
                    &name,
                    &name,
                    "any.required",
                    format!("\"{name}\" is required"),
                    None,
                )]
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
                .iter()
                .map(|key| {
                    item(
                        key,
                        key,
                        "object.unknown",
                        format!("\"{key}\" is not allowed"),
                        None,
                    )
                })
                .collect(),
            kind => {
                let segments: Vec<String> = pointer_segments(&error.instance_path.to_string());
                let Some(name) = segments.first() else {
                    return Vec::new();
                };
                let Some(field_rule) = self.rule(name) else {
                    return Vec::new();
                };
                let rule: &Rule = if segments.len() > 1 {
                    field_rule.items.as_deref().unwrap_or(field_rule)
                } else {
                    field_rule
                };
                vec![rule.describe(kind, &error.instance, name, &segments.join("."))]
            }
        }
    }
}

impl Validator for ObjectSchema {
    fn validate(
        &self,
        data: &Payload,
        options: &ValidationOptions,
    ) -> Result<Validation, SchemaError> {
        let options: ValidationOptions = self.options.unwrap_or(*options);
        let known: HashSet<&str> = self.rules.iter().map(|(name, _)| name.as_str()).collect();
        for (name, rule) in &self.rules {
            rule.check_configuration(name, &known, false)?;
        }

        let document: Value = self.to_json_schema(&options);
        let validator: jsonschema::Validator = jsonschema::options()
            .should_validate_formats(true)
            .build(&document)
            .map_err(|e| SchemaError::Compile(e.to_string()))?;

        let value: Payload = self.convert(data, &options);
        let instance: Value = Value::Object(data_with_unknown(&value, data, &options));

        // One failure per value: the most fundamental constraint it breaks.
        let mut errors: Vec<ValidationErrorItem> = Vec::new();
        for error in validator.iter_errors(&instance) {
            for failure in self.describe(&error) {
                match errors.iter().position(|e| e.property == failure.property) {
                    Some(index) if severity(&failure.kind) < severity(&errors[index].kind) => {
                        errors[index] = failure;
                    }
                    Some(_) => {}
                    None => errors.push(failure),
                }
            }
        }

        for (name, rule) in &self.rules {
            if errors.iter().any(|e| e.name == *name) {
                continue;
            }
            let Some(field_value) = value.get(name) else {
                continue;
            };
            if let Some(failure) = rule.check_bounds(name, field_value, &value) {
                errors.push(failure);
            }
        }

        errors.sort_by_key(|failure| self.position(&failure.name));
        if options.abort_early {
            errors.truncate(1);
        }

        if errors.is_empty() {
            for check in &self.checks {
                errors.extend(check(&value));
                if options.abort_early && !errors.is_empty() {
                    errors.truncate(1);
                    break;
                }
            }
        }

        Ok(Validation::from_errors(value, errors))
    }
}

/// The instance to evaluate: converted values, plus unknown keys so a closed
/// schema can reject them.
fn data_with_unknown(value: &Payload, data: &Payload, options: &ValidationOptions) -> Payload {
    if options.allow_unknown {
        return value.clone();
    }
    let mut instance: Payload = value.clone();
    for (key, raw) in data {
        instance.entry(key.clone()).or_insert_with(|| raw.clone());
    }
    instance
}
