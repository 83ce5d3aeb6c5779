use std::collections::BTreeMap;

use log::warn;

use crate::classes::{self, StatusFlags};
use crate::host::{FieldNode, Host, control_named};

use super::state::{FormRecord, read, write};
use super::{FormTracker, Task, TrackerError, TrackerResult};

/// Outcome of a forced whole-form validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FormOutcome {
    Valid,
    Invalid(BTreeMap<String, String>),
}

impl<H: Host> FormTracker<H> {
    /// Full error map; empty when everything passes.
    pub fn errors(&self, form: &str) -> TrackerResult<BTreeMap<String, String>> {
        self.with_form(form, |record| record.errors.clone())
    }

    /// Message stored under `key`, which may be a field name or an injected
    /// arbitrary key.
    pub fn error_for(&self, form: &str, key: &str) -> TrackerResult<Option<String>> {
        self.with_form(form, |record| record.errors.get(key).cloned())
    }

    /// Error entries whose key matches no currently tracked field.
    pub fn other_errors(&self, form: &str) -> TrackerResult<BTreeMap<String, String>> {
        self.with_form(form, |record| {
            record
                .errors
                .iter()
                .filter(|(key, _)| !record.fields.contains_key(*key))
                .map(|(key, message)| (key.clone(), message.clone()))
                .collect()
        })
    }

    /// Cached touched status of the form, or of one field.
    pub fn touched(&self, form: &str, field: Option<&str>) -> TrackerResult<bool> {
        self.read_flags(form, field).map(|flags| flags.touched)
    }

    /// Cached changed status of the form, or of one field.
    pub fn changed(&self, form: &str, field: Option<&str>) -> TrackerResult<bool> {
        self.read_flags(form, field).map(|flags| flags.changed)
    }

    /// Cached validity of the form, or of one field.
    pub fn valid(&self, form: &str, field: Option<&str>) -> TrackerResult<bool> {
        self.read_flags(form, field).map(|flags| flags.valid)
    }

    /// The cached aggregate triple.
    pub fn status(&self, form: &str) -> TrackerResult<StatusFlags> {
        self.with_form(form, FormRecord::aggregate_flags)
    }

    /// Force a touched whole-form pass and report the outcome from the error
    /// map. A concurrently locked form drops the pass (idempotent skip) and
    /// the current map is reported as-is.
    pub fn force_validate(&self, form: &str) -> TrackerResult<FormOutcome> {
        if !self.is_tracked(form) {
            return Err(self.unknown_form(form));
        }
        self.validate_form(form, true);
        let errors = self.errors(form)?;
        Ok(if errors.is_empty() {
            FormOutcome::Valid
        } else {
            FormOutcome::Invalid(errors)
        })
    }

    /// Merge caller-supplied errors into the form's map. Empty messages are
    /// skipped. Keys naming a live field also force that field invalid with
    /// the message, reflected immediately in its classes and constraint
    /// state.
    pub fn set_form_errors(
        &self,
        form: &str,
        entries: BTreeMap<String, String>,
    ) -> TrackerResult<()> {
        let forced = {
            let mut state = write(&self.state);
            let Some(record) = state.forms.get_mut(form) else {
                return Err(self.unknown_form(form));
            };
            let mut forced: Vec<(String, String, Option<StatusFlags>, StatusFlags)> = Vec::new();
            for (key, message) in entries {
                if message.is_empty() {
                    continue;
                }
                if let Some(field_record) = record.fields.get_mut(&key) {
                    field_record.valid = false;
                    let flags = field_record.flags();
                    let applied = field_record.applied;
                    field_record.applied = Some(flags);
                    forced.push((key.clone(), message.clone(), applied, flags));
                }
                record.errors.insert(key, message);
            }
            forced
        };

        if let Some(form_node) = self.host.form(form) {
            for (name, message, applied, flags) in &forced {
                if let Some(control) = control_named(&form_node, name) {
                    let _ = control.set_custom_validity(message);
                    classes::reconcile(&control, *applied, *flags);
                }
            }
        }

        self.scheduler.defer(Task::ReconcileForm {
            form: form.to_string(),
        });
        self.host.request_refresh();
        Ok(())
    }

    /// Drop every error and restore every field to valid, clearing injected
    /// constraint messages and class state. Touched and changed survive; only
    /// record re-creation resets them.
    pub fn clear_form_errors(&self, form: &str) -> TrackerResult<()> {
        let resets = {
            let mut state = write(&self.state);
            let Some(record) = state.forms.get_mut(form) else {
                return Err(self.unknown_form(form));
            };
            record.errors.clear();
            record
                .fields
                .values_mut()
                .map(|field_record| {
                    field_record.valid = true;
                    let flags = field_record.flags();
                    let applied = field_record.applied;
                    field_record.applied = Some(flags);
                    (field_record.name.clone(), applied, flags)
                })
                .collect::<Vec<_>>()
        };

        if let Some(form_node) = self.host.form(form) {
            for (name, applied, flags) in &resets {
                if let Some(control) = control_named(&form_node, name) {
                    let _ = control.set_custom_validity("");
                    classes::reconcile(&control, *applied, *flags);
                }
            }
        }

        self.scheduler.defer(Task::ReconcileForm {
            form: form.to_string(),
        });
        self.host.request_refresh();
        Ok(())
    }

    fn read_flags(&self, form: &str, field: Option<&str>) -> TrackerResult<StatusFlags> {
        let state = read(&self.state);
        let Some(record) = state.forms.get(form) else {
            return Err(self.unknown_form(form));
        };
        match field {
            None => Ok(record.aggregate_flags()),
            Some(name) => match record.fields.get(name) {
                Some(field_record) => Ok(field_record.flags()),
                None => {
                    warn!("field '{name}' queried in form '{form}' but is not tracked");
                    Err(TrackerError::UnknownField {
                        form: form.to_string(),
                        field: name.to_string(),
                    })
                }
            },
        }
    }

    fn with_form<R>(&self, form: &str, reader: impl FnOnce(&FormRecord) -> R) -> TrackerResult<R> {
        let state = read(&self.state);
        match state.forms.get(form) {
            Some(record) => Ok(reader(record)),
            None => Err(self.unknown_form(form)),
        }
    }

    fn is_tracked(&self, form: &str) -> bool {
        read(&self.state).forms.contains_key(form)
    }

    fn unknown_form(&self, form: &str) -> TrackerError {
        warn!("form '{form}' is not tracked");
        TrackerError::UnknownForm(form.to_string())
    }
}
