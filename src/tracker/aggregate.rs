use std::collections::BTreeSet;

use crate::classes::{self, StatusFlags};
use crate::host::Host;

use super::state::{read, write};
use super::{ErrorRetention, FormTracker, Task};

impl<H: Host> FormTracker<H> {
    /// Whole-form pass: clear the error map per the retention policy,
    /// rediscover, then validate every field in discovery order. Returns
    /// true when the pass ran; a missing or locked form is a no-op. Callers
    /// learn the outcome from the error map, not the return value.
    pub fn validate_form(&self, form_name: &str, touch: bool) -> bool {
        {
            let mut state = write(&self.state);
            let Some(record) = state.forms.get_mut(form_name) else {
                return false;
            };
            if record.lock {
                return false;
            }
            record.lock = true;
            match self.options.retained_errors {
                ErrorRetention::Discard => record.errors.clear(),
                ErrorRetention::PreserveOther => {
                    let live: BTreeSet<String> = record.fields.keys().cloned().collect();
                    record.errors.retain(|key, _| !live.contains(key));
                }
            }
        }

        self.discover(form_name);
        let names = read(&self.state)
            .forms
            .get(form_name)
            .map(|record| record.order.clone())
            .unwrap_or_default();
        for name in names {
            self.validate_field(form_name, &name, touch);
        }

        if let Some(record) = write(&self.state).forms.get_mut(form_name) {
            record.lock = false;
        }
        self.scheduler.defer(Task::ReconcileForm {
            form: form_name.to_string(),
        });
        true
    }

    /// Recompute the cached aggregate triple from the error map and the field
    /// records, reconcile the form's classes where the triple moved, and ask
    /// the host to refresh derived views.
    pub fn update_form_classes(&self, form_name: &str) {
        let (applied, flags) = {
            let mut state = write(&self.state);
            let Some(record) = state.forms.get_mut(form_name) else {
                return;
            };

            let mut valid = record.errors.is_empty();
            let mut changed = false;
            let mut touched = false;
            for field in record.fields.values() {
                if valid && !field.valid {
                    valid = false;
                }
                if !changed && field.changed {
                    changed = true;
                }
                if !touched && field.touched {
                    touched = true;
                }
                if changed && touched && !valid {
                    // Nothing left to learn from the remaining fields.
                    break;
                }
            }

            if record.valid != valid {
                record.valid = valid;
            }
            if record.changed != changed {
                record.changed = changed;
            }
            if record.touched != touched {
                record.touched = touched;
            }

            let flags = StatusFlags {
                valid,
                touched,
                changed,
            };
            let applied = record.applied;
            record.applied = Some(flags);
            (applied, flags)
        };

        if let Some(form) = self.host.form(form_name) {
            classes::reconcile(&form, applied, flags);
        }
        self.host.request_refresh();
    }
}
