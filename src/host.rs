use std::fmt::{Display, Formatter};

use crate::classes::ClassTarget;
use crate::value::FieldValue;

/// Kind of element a control node represents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlKind {
    Input,
    Select,
    TextArea,
}

/// Declared type of an input control. Only the types the validation pipeline
/// cares about are distinguished; everything else is `Other`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputType {
    Text,
    Email,
    Tel,
    Button,
    Submit,
    Reset,
    Other,
}

impl InputType {
    /// Button-like controls carry no user data and are never tracked.
    pub fn is_button_like(self) -> bool {
        matches!(self, Self::Button | Self::Submit | Self::Reset)
    }
}

/// Result of the platform's native constraint validation for one field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConstraintReport {
    pub valid: bool,
    /// A required control has no value.
    pub value_missing: bool,
    /// Any violation other than a missing value.
    pub other_violation: bool,
    pub message: String,
}

impl ConstraintReport {
    pub fn passing() -> Self {
        Self {
            valid: true,
            value_missing: false,
            other_violation: false,
            message: String::new(),
        }
    }

    pub fn missing_value(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            value_missing: true,
            other_violation: false,
            message: message.into(),
        }
    }

    pub fn violation(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            value_missing: false,
            other_violation: true,
            message: message.into(),
        }
    }
}

/// Failure of a best-effort host operation. The tracker logs and swallows
/// these; they never abort a validation pass.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostError(pub String);

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "host operation failed: {}", self.0)
    }
}

impl std::error::Error for HostError {}

/// One form control, reached through the host.
pub trait FieldNode: ClassTarget {
    /// `None` when the node is not a form control at all.
    fn control(&self) -> Option<ControlKind>;
    fn name(&self) -> Option<String>;
    fn input_type(&self) -> InputType;
    fn is_disabled(&self) -> bool;
    fn attribute(&self, name: &str) -> Option<String>;
    fn value(&self) -> FieldValue;
    /// Native constraint check; `None` when the platform lacks the capability.
    fn constraints(&self) -> Option<ConstraintReport>;
    /// Inject a custom validity message, or clear it with an empty string.
    fn set_custom_validity(&self, message: &str) -> Result<(), HostError>;

    /// Annotation lookup accepting both the bare and the `data-` prefixed
    /// spelling of a marker attribute.
    fn annotation(&self, name: &str) -> Option<String> {
        self.attribute(name)
            .or_else(|| self.attribute(&format!("data-{name}")))
    }
}

/// The form element and its live controls, in document order.
pub trait FormNode: ClassTarget {
    type Field: FieldNode;

    fn name(&self) -> Option<String>;
    fn controls(&self) -> Vec<Self::Field>;
    /// Suppress the platform's own validation UI for this form.
    fn disable_native_validation(&self);
}

/// The host application: form lookup plus the observable-tree refresh hook.
pub trait Host {
    type Form: FormNode;

    fn form(&self, name: &str) -> Option<Self::Form>;
    /// Ask the host's reactive layer to re-render views derived from tracker
    /// state.
    fn request_refresh(&self);
}

/// The control under `form` owning `name`. With duplicate names the later
/// control wins, matching the registry's last-write-wins discovery.
pub fn control_named<F: FormNode>(form: &F, name: &str) -> Option<F::Field> {
    form.controls()
        .into_iter()
        .rev()
        .find(|control| control.name().as_deref() == Some(name))
}
