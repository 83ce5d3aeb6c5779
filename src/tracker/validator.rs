use std::sync::LazyLock;
use std::sync::atomic::Ordering;

use log::warn;
use regex::Regex;

use crate::checksum::Checksum;
use crate::classes;
use crate::host::{FieldNode, Host, InputType, control_named};
use crate::rules::RuleOutcome;

use super::state::{FieldRecord, PhoneCheck, read, write};
use super::{FormTracker, Task, UnknownRulePolicy};

/// Names a registered rule to run after the built-in checks; accepted bare
/// or with a `data-` prefix.
pub(crate) const CALLBACK_MARKER: &str = "validation-callback";
/// Per-field default country for the phone rule; 2 letters, `US` when absent.
pub(crate) const COUNTRY_MARKER: &str = "validation-country";
const DEFAULT_COUNTRY: &str = "US";

pub(crate) const EMAIL_MESSAGE: &str = "Please enter a complete email address.";
pub(crate) const PHONE_MESSAGE: &str = "Please enter a valid phone number.";
pub(crate) const GENERIC_MESSAGE: &str = "This input is not valid.";

// Local part as quoted string or dot-atom, domain as dotted labels or a
// bracketed IPv4 literal.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern must compile")
});

impl<H: Host> FormTracker<H> {
    /// Run the per-field pipeline and return the field's final validity.
    ///
    /// A locked field, an unknown form, or a vanished control returns false
    /// without changes; validation failure itself is data (the return value,
    /// the error map and the classes), never an error.
    pub fn validate_field(&self, form_name: &str, field_name: &str, touch: bool) -> bool {
        let Some(form) = self.host.form(form_name) else {
            return false;
        };
        let Some(field) = control_named(&form, field_name) else {
            return false;
        };

        let value = field.value();
        let checksum = Checksum::of(&value);

        // Lock and bookkeeping under one guard: latch touched, recompute
        // changed against the fixed original checksum.
        let touched = {
            let mut state = write(&self.state);
            let Some(record) = state.forms.get_mut(form_name) else {
                return false;
            };
            if !record.fields.contains_key(field_name) {
                // Event-ordering race against the host's rendering: the
                // control exists but discovery has not seen it yet.
                warn!(
                    "field '{field_name}' in form '{form_name}' validated before discovery; \
                     creating its record"
                );
                record.order.push(field_name.to_string());
                record.field_count += 1;
                record
                    .fields
                    .insert(field_name.to_string(), FieldRecord::new(field_name, checksum));
            }
            let Some(field_record) = record.fields.get_mut(field_name) else {
                return false;
            };
            if field_record.lock {
                return false;
            }
            field_record.lock = true;
            if touch {
                field_record.touched = true;
            }
            field_record.changed = checksum != field_record.original_value;
            field_record.touched
        };

        // Best-effort reset of any previously injected message.
        let _ = field.set_custom_validity("");

        let mut valid = true;
        let mut message = String::new();

        match field.constraints() {
            // Capability absent: treated as valid.
            None => {}
            Some(report) => {
                if !report.valid {
                    if report.value_missing && !report.other_violation && !touched {
                        // Required-but-empty before first touch is suppressed.
                        let _ = field.set_custom_validity("");
                    } else {
                        valid = false;
                        message = report.message;
                    }
                }
            }
        }

        if valid && !value.is_empty() && field.input_type() == InputType::Email {
            if !EMAIL_PATTERN.is_match(&value.canonical()) {
                valid = false;
                message = EMAIL_MESSAGE.to_string();
                let _ = field.set_custom_validity(EMAIL_MESSAGE);
            }
        }

        if valid && !value.is_empty() && field.input_type() == InputType::Tel {
            match &self.phone {
                None => self.warn_missing_phone_parser(),
                Some(parser) => {
                    let raw = value.canonical();
                    let country = field
                        .annotation(COUNTRY_MARKER)
                        .filter(|code| code.len() == 2)
                        .map(|code| code.to_ascii_uppercase())
                        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

                    let cached = read(&self.state)
                        .forms
                        .get(form_name)
                        .and_then(|record| record.fields.get(field_name))
                        .and_then(|field_record| field_record.phone_cache.clone());
                    let ok = match cached {
                        Some(check) if check.raw == raw => check.ok,
                        _ => {
                            let ok = parser.is_valid(&raw, &country);
                            if let Some(field_record) = write(&self.state)
                                .forms
                                .get_mut(form_name)
                                .and_then(|record| record.fields.get_mut(field_name))
                            {
                                field_record.phone_cache = Some(PhoneCheck {
                                    raw: raw.clone(),
                                    ok,
                                });
                            }
                            ok
                        }
                    };
                    if !ok {
                        valid = false;
                        message = PHONE_MESSAGE.to_string();
                        let _ = field.set_custom_validity(PHONE_MESSAGE);
                    }
                }
            }
        }

        if valid {
            if let Some(rule_name) = field.annotation(CALLBACK_MARKER) {
                match self.rules.lookup(&rule_name) {
                    Some(rule) => {
                        if let RuleOutcome::Fail(custom) = rule(&value) {
                            valid = false;
                            message = custom
                                .filter(|text| !text.is_empty())
                                .unwrap_or_else(|| GENERIC_MESSAGE.to_string());
                            let _ = field.set_custom_validity(&message);
                        }
                    }
                    None => match self.options.unknown_rule {
                        UnknownRulePolicy::Fail => {
                            warn!(
                                "validation rule '{rule_name}' referenced by field \
                                 '{field_name}' is not registered"
                            );
                            valid = false;
                            message = GENERIC_MESSAGE.to_string();
                            let _ = field.set_custom_validity(GENERIC_MESSAGE);
                        }
                        UnknownRulePolicy::Skip => {}
                    },
                }
            }
        }

        // Write the outcome back and release the lock; classes reconcile
        // outside the guard.
        let (flags, applied, form_locked, aggregate) = {
            let mut state = write(&self.state);
            let Some(record) = state.forms.get_mut(form_name) else {
                return valid;
            };
            if valid {
                record.errors.remove(field_name);
            } else {
                let stored = if message.is_empty() {
                    GENERIC_MESSAGE.to_string()
                } else {
                    message
                };
                record.errors.insert(field_name.to_string(), stored);
            }
            let form_locked = record.lock;
            let aggregate = record.aggregate_flags();
            let Some(field_record) = record.fields.get_mut(field_name) else {
                return valid;
            };
            if field_record.valid != valid {
                field_record.valid = valid;
            }
            let flags = field_record.flags();
            let applied = field_record.applied;
            field_record.applied = Some(flags);
            field_record.lock = false;
            (flags, applied, form_locked, aggregate)
        };

        classes::reconcile(&field, applied, flags);

        // A field whose triple disagrees with the cached aggregate means the
        // form needs a deferred recomputation, unless a whole-form pass is
        // already responsible for it.
        if !form_locked && flags != aggregate {
            self.scheduler.defer(Task::ReconcileForm {
                form: form_name.to_string(),
            });
        }

        valid
    }

    fn warn_missing_phone_parser(&self) {
        if !self.phone_warned.swap(true, Ordering::Relaxed) {
            warn!("tel field validated without a phone parser capability; skipping phone checks");
        }
    }
}
