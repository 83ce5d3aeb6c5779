use std::collections::BTreeSet;

use crate::checksum::Checksum;
use crate::host::{FieldNode, FormNode, Host};

use super::state::{FieldRecord, write};
use super::FormTracker;

/// Opt-out marker; accepted bare or with a `data-` prefix.
pub(crate) const IGNORE_MARKER: &str = "validation-ignore";

/// True when a control should be tracked: a real input/select/textarea with a
/// non-empty name, enabled, not button-like, and not opted out.
fn is_eligible(control: &impl FieldNode) -> bool {
    control.control().is_some()
        && !control.is_disabled()
        && !control.input_type().is_button_like()
        && control.annotation(IGNORE_MARKER).is_none()
        && control.name().is_some_and(|name| !name.is_empty())
}

impl<H: Host> FormTracker<H> {
    /// Bring field records in line with the controls currently live under the
    /// form, in document order. Returns true when membership changed (a field
    /// was added or removed).
    ///
    /// On a membership shrink the errors of the removed fields are pruned,
    /// unless the form is mid-validation; injected entries that never matched
    /// a field always survive.
    pub(crate) fn discover(&self, form_name: &str) -> bool {
        let Some(form) = self.host.form(form_name) else {
            // The element is gone; its record goes with it.
            write(&self.state).forms.remove(form_name);
            return false;
        };

        // Values are read before taking the state guard; duplicate names are
        // last-write-wins, keeping the later control.
        let mut discovered: Vec<(String, Checksum)> = Vec::new();
        let mut seen = BTreeSet::new();
        for control in form.controls().into_iter().rev() {
            if !is_eligible(&control) {
                continue;
            }
            let Some(name) = control.name() else {
                continue;
            };
            if seen.insert(name.clone()) {
                discovered.push((name, Checksum::of(&control.value())));
            }
        }
        discovered.reverse();

        let mut state = write(&self.state);
        let Some(record) = state.forms.get_mut(form_name) else {
            return false;
        };

        let mut membership_changed = false;
        for (name, checksum) in &discovered {
            if !record.fields.contains_key(name) {
                record
                    .fields
                    .insert(name.clone(), FieldRecord::new(name.clone(), *checksum));
                record.order.push(name.clone());
                membership_changed = true;
            }
        }

        let live: BTreeSet<&String> = discovered.iter().map(|(name, _)| name).collect();
        let removed: Vec<String> = record
            .fields
            .keys()
            .filter(|name| !live.contains(name))
            .cloned()
            .collect();
        for name in &removed {
            record.fields.remove(name);
            record.order.retain(|existing| existing != name);
            membership_changed = true;
        }

        let count = record.fields.len();
        if count < record.field_count && !record.lock {
            for name in &removed {
                record.errors.remove(name);
            }
        }
        record.field_count = count;

        membership_changed
    }
}
