//! Validation gate for submitted form payloads.
//!
//! Schemas are static tables of field rules. [`validate`] checks a payload
//! against a schema and reports every violated field at once; the `parse_*`
//! functions run the gate and then build the typed domain values, so no
//! mutation can start from a payload that failed validation.

use std::fmt;

use serde::Serialize;
use serde_json::json;

use super::{Error, ListingDraft, Price, Rating, Registration, ReviewDraft};

/// Loosely typed form submission: ordered `(name, value)` pairs.
///
/// Repeated names (for example `deleteImages[]`) keep every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    /// Empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one field value.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value submitted under `name`, in submission order.
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for FormPayload
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Constraint applied to one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    /// Present and not blank.
    Required,
    /// Parses as a finite number.
    Number,
    /// Parses as a whole number.
    Integer,
    /// Numeric value is at least the bound.
    Min(f64),
    /// Numeric value is at most the bound.
    Max(f64),
    /// Looks like `local@domain.tld`.
    Email,
}

/// Rules declared for a single form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Form field name as submitted.
    pub name: &'static str,
    /// Label used in violation messages.
    pub label: &'static str,
    /// Rules checked in order; the first failure is reported.
    pub rules: &'static [FieldRule],
}

/// Declarative description of a form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schema {
    pub fields: &'static [FieldSpec],
}

/// Listing create/update form.
pub const LISTING_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "campground[title]",
            label: "title",
            rules: &[FieldRule::Required],
        },
        FieldSpec {
            name: "campground[price]",
            label: "price",
            rules: &[FieldRule::Required, FieldRule::Number, FieldRule::Min(0.0)],
        },
        FieldSpec {
            name: "campground[location]",
            label: "location",
            rules: &[FieldRule::Required],
        },
        FieldSpec {
            name: "campground[description]",
            label: "description",
            rules: &[FieldRule::Required],
        },
    ],
};

/// Review form.
pub const REVIEW_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "review[rating]",
            label: "rating",
            rules: &[
                FieldRule::Required,
                FieldRule::Integer,
                FieldRule::Min(1.0),
                FieldRule::Max(5.0),
            ],
        },
        FieldSpec {
            name: "review[body]",
            label: "body",
            rules: &[FieldRule::Required],
        },
    ],
};

/// Registration form.
pub const REGISTRATION_SCHEMA: Schema = Schema {
    fields: &[
        FieldSpec {
            name: "email",
            label: "email",
            rules: &[FieldRule::Required, FieldRule::Email],
        },
        FieldSpec {
            name: "username",
            label: "username",
            rules: &[FieldRule::Required],
        },
        FieldSpec {
            name: "password",
            label: "password",
            rules: &[FieldRule::Required],
        },
    ],
};

/// Field name carrying filenames to delete on listing update.
pub const DELETE_IMAGES_FIELD: &str = "deleteImages[]";

/// Why a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    Missing,
    NotANumber,
    NotAnInteger,
    BelowMin { min: f64 },
    AboveMax { max: f64 },
    NotAnEmail,
}

/// One violated field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match self.kind {
            ViolationKind::Missing => write!(f, "\"{field}\" is required"),
            ViolationKind::NotANumber => write!(f, "\"{field}\" must be a number"),
            ViolationKind::NotAnInteger => write!(f, "\"{field}\" must be an integer"),
            ViolationKind::BelowMin { min } => {
                write!(f, "\"{field}\" must be greater than or equal to {min}")
            }
            ViolationKind::AboveMax { max } => {
                write!(f, "\"{field}\" must be less than or equal to {max}")
            }
            ViolationKind::NotAnEmail => write!(f, "\"{field}\" must be a valid email"),
        }
    }
}

/// Every violation found in one payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    /// Violations in schema order.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            violation.fmt(f)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::invalid_request(errors.to_string()).with_details(json!({ "fields": errors }))
    }
}

fn check_rule(rule: FieldRule, raw: &str) -> Option<ViolationKind> {
    let value = raw.trim();
    match rule {
        FieldRule::Required => value.is_empty().then_some(ViolationKind::Missing),
        FieldRule::Number => parse_number(value)
            .is_none()
            .then_some(ViolationKind::NotANumber),
        FieldRule::Integer => value
            .parse::<i64>()
            .is_err()
            .then_some(ViolationKind::NotAnInteger),
        FieldRule::Min(min) => parse_number(value)
            .filter(|number| *number < min)
            .map(|_| ViolationKind::BelowMin { min }),
        FieldRule::Max(max) => parse_number(value)
            .filter(|number| *number > max)
            .map(|_| ViolationKind::AboveMax { max }),
        FieldRule::Email => super::Email::new(value)
            .is_err()
            .then_some(ViolationKind::NotAnEmail),
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Check `payload` against `schema`, collecting every violated field.
///
/// Absent fields only violate [`FieldRule::Required`]; the remaining rules
/// are skipped for them. Per field, only the first failing rule is reported.
///
/// # Examples
/// ```
/// use campgrounds::domain::{validate, FormPayload, REVIEW_SCHEMA};
///
/// let payload: FormPayload = [("review[rating]", "7"), ("review[body]", "")]
///     .into_iter()
///     .collect();
/// let errors = validate(&REVIEW_SCHEMA, &payload).expect_err("two violations");
/// assert_eq!(errors.violations().len(), 2);
/// ```
pub fn validate(schema: &Schema, payload: &FormPayload) -> Result<(), ValidationErrors> {
    let violations: Vec<FieldViolation> = schema
        .fields
        .iter()
        .filter_map(|field| {
            let raw = payload.get(field.name).unwrap_or_default();
            let absent = raw.trim().is_empty();
            field
                .rules
                .iter()
                .filter(|rule| !absent || matches!(rule, FieldRule::Required))
                .find_map(|rule| check_rule(*rule, raw))
                .map(|kind| FieldViolation {
                    field: field.label,
                    kind,
                })
        })
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(violations))
    }
}

fn required<'a>(payload: &'a FormPayload, name: &str) -> Result<&'a str, Error> {
    payload
        .get(name)
        .ok_or_else(|| Error::invalid_request(format!("\"{name}\" is required")))
}

/// Validated listing form: editable fields plus images marked for deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingForm {
    pub draft: ListingDraft,
    pub delete_images: Vec<String>,
}

/// Run [`LISTING_SCHEMA`] and build a [`ListingForm`].
pub fn parse_listing(payload: &FormPayload) -> Result<ListingForm, Error> {
    validate(&LISTING_SCHEMA, payload)?;
    let price = required(payload, "campground[price]")?
        .trim()
        .parse::<f64>()
        .map_err(|err| Error::invalid_request(format!("\"price\" must be a number: {err}")))?;
    let price = Price::new(price).map_err(|err| Error::invalid_request(err.to_string()))?;
    let draft = ListingDraft::new(
        required(payload, "campground[title]")?,
        required(payload, "campground[location]")?,
        price,
        required(payload, "campground[description]")?,
    )
    .map_err(|err| Error::invalid_request(err.to_string()))?;
    let delete_images = payload
        .all(DELETE_IMAGES_FIELD)
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect();
    Ok(ListingForm {
        draft,
        delete_images,
    })
}

/// Run [`REVIEW_SCHEMA`] and build a [`ReviewDraft`].
pub fn parse_review(payload: &FormPayload) -> Result<ReviewDraft, Error> {
    validate(&REVIEW_SCHEMA, payload)?;
    let stars = required(payload, "review[rating]")?
        .trim()
        .parse::<i64>()
        .map_err(|err| Error::invalid_request(format!("\"rating\" must be an integer: {err}")))?;
    let rating = Rating::new(stars).map_err(|err| Error::invalid_request(err.to_string()))?;
    ReviewDraft::new(required(payload, "review[body]")?, rating)
        .map_err(|err| Error::invalid_request(err.to_string()))
}

/// Run [`REGISTRATION_SCHEMA`] and build a [`Registration`].
pub fn parse_registration(payload: &FormPayload) -> Result<Registration, Error> {
    validate(&REGISTRATION_SCHEMA, payload)?;
    Registration::try_from_parts(
        required(payload, "email")?,
        required(payload, "username")?,
        required(payload, "password")?,
    )
    .map_err(|err| Error::invalid_request(err.to_string()))
}
