/// Status triple reflected onto an element as CSS classes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusFlags {
    pub valid: bool,
    pub touched: bool,
    pub changed: bool,
}

impl StatusFlags {
    /// Flags of a freshly tracked field: valid until proven otherwise,
    /// untouched and unchanged.
    pub fn fresh() -> Self {
        Self {
            valid: true,
            touched: false,
            changed: false,
        }
    }
}

/// Anything the tracker can toggle classes on.
pub trait ClassTarget {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
}

struct ClassPair {
    on: [&'static str; 2],
    off: [&'static str; 2],
}

// Both naming conventions are emitted together; exactly one side of each
// pair is present after a reconcile.
const VALID: ClassPair = ClassPair {
    on: ["is-valid", "is:valid"],
    off: ["is-invalid", "is:invalid"],
};
const TOUCHED: ClassPair = ClassPair {
    on: ["is-touched", "is:touched"],
    off: ["is-untouched", "is:untouched"],
};
const CHANGED: ClassPair = ClassPair {
    on: ["is-changed", "is:changed"],
    off: ["is-unchanged", "is:unchanged"],
};

/// Move `target` from the previously applied flags to `desired`, emitting
/// only the class operations that differ. `None` for `applied` means nothing
/// has been written yet and every pair is applied.
pub fn reconcile(target: &impl ClassTarget, applied: Option<StatusFlags>, desired: StatusFlags) {
    apply_pair(target, &VALID, applied.map(|flags| flags.valid), desired.valid);
    apply_pair(
        target,
        &TOUCHED,
        applied.map(|flags| flags.touched),
        desired.touched,
    );
    apply_pair(
        target,
        &CHANGED,
        applied.map(|flags| flags.changed),
        desired.changed,
    );
}

fn apply_pair(target: &impl ClassTarget, pair: &ClassPair, applied: Option<bool>, desired: bool) {
    if applied == Some(desired) {
        return;
    }
    let (add, remove) = if desired {
        (pair.on, pair.off)
    } else {
        (pair.off, pair.on)
    };
    for class in remove {
        target.remove_class(class);
    }
    for class in add {
        target.add_class(class);
    }
}
