pub use crate::checksum::Checksum;
pub use crate::classes::{ClassTarget, StatusFlags};
pub use crate::enhance::{DEFAULT_AVATAR_SIZE, PhoneParser, gravatar_url};
pub use crate::host::{
    ConstraintReport, ControlKind, FieldNode, FormNode, Host, HostError, InputType, control_named,
};
pub use crate::rules::{RuleOutcome, RuleRegistry};
pub use crate::schedule::{DebounceMode, Scheduler};
pub use crate::tracker::{
    ErrorRetention, FormOutcome, FormTracker, TrackerError, TrackerOptions, TrackerResult,
    UnknownRulePolicy,
};
pub use crate::value::FieldValue;
