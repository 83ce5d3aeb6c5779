use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::checksum::Checksum;
use crate::classes::StatusFlags;

/// Result of the last phone-rule parse, cached so an unchanged raw value is
/// not parsed again.
#[derive(Clone, Debug)]
pub(crate) struct PhoneCheck {
    pub raw: String,
    pub ok: bool,
}

/// Tracking record for one named field. Lives exactly as long as its control
/// is eligible and mounted.
#[derive(Clone, Debug)]
pub(crate) struct FieldRecord {
    pub name: String,
    /// Checksum of the value observed at discovery; fixed for the record's
    /// lifetime.
    pub original_value: Checksum,
    pub changed: bool,
    /// Latched by blur or forced touch; reset only by record re-creation.
    pub touched: bool,
    pub valid: bool,
    /// Reentrancy guard while the field pipeline runs.
    pub lock: bool,
    /// Class flags last written to the control, the reconciliation diff base.
    pub applied: Option<StatusFlags>,
    pub phone_cache: Option<PhoneCheck>,
}

impl FieldRecord {
    pub fn new(name: impl Into<String>, original_value: Checksum) -> Self {
        Self {
            name: name.into(),
            original_value,
            changed: false,
            touched: false,
            valid: true,
            lock: false,
            applied: None,
            phone_cache: None,
        }
    }

    pub fn flags(&self) -> StatusFlags {
        StatusFlags {
            valid: self.valid,
            touched: self.touched,
            changed: self.changed,
        }
    }
}

/// Tracking record for one activated form, keyed by form name in the
/// tracker's state map.
#[derive(Clone, Debug)]
pub(crate) struct FormRecord {
    pub fields: BTreeMap<String, FieldRecord>,
    /// Field names in discovery (document) order; validation passes walk
    /// this, not the map.
    pub order: Vec<String>,
    /// Field-name-or-arbitrary-key to human-readable message.
    pub errors: BTreeMap<String, String>,
    pub changed: bool,
    pub touched: bool,
    pub valid: bool,
    /// Last-known eligible count, for membership-shrink detection.
    pub field_count: usize,
    /// Reentrancy guard for whole-form passes.
    pub lock: bool,
    pub applied: Option<StatusFlags>,
}

impl FormRecord {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
            order: Vec::new(),
            errors: BTreeMap::new(),
            changed: false,
            touched: false,
            valid: true,
            field_count: 0,
            lock: false,
            applied: None,
        }
    }

    /// The cached aggregate triple.
    pub fn aggregate_flags(&self) -> StatusFlags {
        StatusFlags {
            valid: self.valid,
            touched: self.touched,
            changed: self.changed,
        }
    }
}

#[derive(Default)]
pub(crate) struct TrackerState {
    pub forms: BTreeMap<String, FormRecord>,
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
