mod aggregate;
mod api;
mod registry;
mod state;
mod validator;
mod watcher;


use std::fmt::{Display, Formatter};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::enhance::PhoneParser;
use crate::host::{FormNode, Host};
use crate::rules::RuleRegistry;
use crate::schedule::{DebounceMode, Scheduler};
use state::{FormRecord, TrackerState, write};

pub use api::FormOutcome;

/// What happens to the error map at the start of a whole-form pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorRetention {
    /// Clear everything, including caller-injected entries.
    Discard,
    /// Keep entries whose key matches no live field.
    PreserveOther,
}

/// How a `validation-callback` annotation naming no registered rule is
/// handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnknownRulePolicy {
    /// Fail the field with the generic invalid-input message.
    Fail,
    /// Leave validity untouched.
    Skip,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TrackerOptions {
    /// Coalescing window for structural-mutation notices.
    pub mutation_window: Duration,
    /// Coalescing window for text-input events.
    pub input_window: Duration,
    pub retained_errors: ErrorRetention,
    pub unknown_rule: UnknownRulePolicy,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            mutation_window: Duration::from_millis(50),
            input_window: Duration::from_millis(100),
            retained_errors: ErrorRetention::Discard,
            unknown_rule: UnknownRulePolicy::Fail,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TrackerError {
    /// No activated form carries this name.
    UnknownForm(String),
    /// The activation target is missing, unnamed, or not a form element.
    NotAForm(String),
    /// The form is tracked but the field is not.
    UnknownField { form: String, field: String },
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerError::UnknownForm(name) => write!(f, "form '{name}' is not tracked"),
            TrackerError::NotAForm(name) => {
                write!(f, "'{name}' is not a named, activatable form")
            }
            TrackerError::UnknownField { form, field } => {
                write!(f, "field '{field}' is not tracked in form '{form}'")
            }
        }
    }
}

impl std::error::Error for TrackerError {}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Work items drained from the tracker's queue.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Task {
    Discover { form: String },
    ValidateField { form: String, field: String, touch: bool },
    ValidateForm { form: String, touch: bool },
    ReconcileForm { form: String },
}

/// Form-state tracker for one host application instance. All state is owned
/// here; nothing ambient survives the tracker.
pub struct FormTracker<H: Host> {
    host: H,
    options: TrackerOptions,
    rules: RuleRegistry,
    phone: Option<Arc<dyn PhoneParser>>,
    phone_warned: AtomicBool,
    state: Arc<RwLock<TrackerState>>,
    scheduler: Scheduler<Task>,
}

impl<H: Host> FormTracker<H> {
    pub fn new(host: H) -> Self {
        Self::with_options(host, TrackerOptions::default())
    }

    pub fn with_options(host: H, options: TrackerOptions) -> Self {
        Self {
            host,
            options,
            rules: RuleRegistry::new(),
            phone: None,
            phone_warned: AtomicBool::new(false),
            state: Arc::new(RwLock::new(TrackerState::default())),
            scheduler: Scheduler::new(),
        }
    }

    /// Install the optional phone-parsing capability.
    pub fn phone_parser(mut self, parser: impl PhoneParser + 'static) -> Self {
        self.phone = Some(Arc::new(parser));
        self
    }

    /// Named rules consulted by the `validation-callback` annotation.
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Begin tracking the named form: suppress the platform's validation UI,
    /// create the form record, and queue the initial discovery followed by an
    /// untouched whole-form pass.
    pub fn activate(&self, form_name: &str) -> TrackerResult<()> {
        let Some(form) = self.host.form(form_name) else {
            return Err(TrackerError::NotAForm(form_name.to_string()));
        };
        if form_name.is_empty() || form.name().as_deref() != Some(form_name) {
            return Err(TrackerError::NotAForm(form_name.to_string()));
        }

        form.disable_native_validation();
        write(&self.state)
            .forms
            .insert(form_name.to_string(), FormRecord::new());

        self.scheduler.defer(Task::Discover {
            form: form_name.to_string(),
        });
        self.scheduler.defer(Task::ValidateForm {
            form: form_name.to_string(),
            touch: false,
        });
        Ok(())
    }

    /// Stop tracking the named form and drop its records.
    pub fn deactivate(&self, form_name: &str) {
        write(&self.state).forms.remove(form_name);
    }

    /// Host event intake: text typed into a field. Validation is debounced
    /// per field so bursts coalesce into one trailing pass.
    pub fn input(&self, form: &str, field: &str) {
        self.scheduler.debounce(
            format!("input:{form}:{field}"),
            self.options.input_window,
            DebounceMode::Trailing,
            Task::ValidateField {
                form: form.to_string(),
                field: field.to_string(),
                touch: false,
            },
        );
    }

    /// Host event intake: a committed value change; validated on the next
    /// drain.
    pub fn change(&self, form: &str, field: &str) {
        self.scheduler.defer(Task::ValidateField {
            form: form.to_string(),
            field: field.to_string(),
            touch: false,
        });
    }

    /// Host event intake: focus left a field. Runs a touch-forcing validation
    /// immediately and returns the field's validity.
    pub fn blur(&self, form: &str, field: &str) -> bool {
        self.validate_field(form, field, true)
    }

    /// Run every queued task that is ready now, including tasks queued in
    /// turn, until the queue has no immediately runnable work.
    pub fn tick(&self) {
        loop {
            let ready = self.scheduler.take_ready();
            if ready.is_empty() {
                break;
            }
            for task in ready {
                self.run(task);
            }
        }
    }

    /// Drive the queue until no deferred or debounced work remains, awaiting
    /// pending debounce windows in between drains.
    pub async fn settle(&self) {
        loop {
            self.tick();
            if !self.scheduler.wait_next().await {
                break;
            }
        }
    }

    fn run(&self, task: Task) {
        match task {
            Task::Discover { form } => self.run_discovery(&form),
            Task::ValidateField { form, field, touch } => {
                self.validate_field(&form, &field, touch);
            }
            Task::ValidateForm { form, touch } => {
                self.validate_form(&form, touch);
            }
            Task::ReconcileForm { form } => self.update_form_classes(&form),
        }
    }
}
