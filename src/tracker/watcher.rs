use crate::host::Host;
use crate::schedule::DebounceMode;

use super::state::read;
use super::{FormTracker, Task};

impl<H: Host> FormTracker<H> {
    /// Host event intake: a structural mutation occurred under the form.
    /// Bursts coalesce into one trailing re-discovery pass.
    pub fn note_mutation(&self, form_name: &str) {
        self.scheduler.debounce(
            format!("mutation:{form_name}"),
            self.options.mutation_window,
            DebounceMode::Trailing,
            Task::Discover {
                form: form_name.to_string(),
            },
        );
    }

    /// Debounced discovery tick. A form mid-validation is skipped rather than
    /// queued; the next mutation notice re-triggers the scan.
    pub(crate) fn run_discovery(&self, form_name: &str) {
        let locked = read(&self.state)
            .forms
            .get(form_name)
            .is_some_and(|record| record.lock);
        if locked {
            return;
        }
        if self.discover(form_name) {
            self.scheduler.defer(Task::ReconcileForm {
                form: form_name.to_string(),
            });
        }
    }
}
