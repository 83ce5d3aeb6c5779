use crate::value::FieldValue;

/// Cheap content hash of a field value, used only for change detection.
/// Collisions trade exactness for never storing the original value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Checksum(pub u64);

impl Checksum {
    pub fn of(value: &FieldValue) -> Self {
        Self(fnv1a64(value.canonical().as_bytes()))
    }
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x00000100000001b3;

    let mut hash = OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
