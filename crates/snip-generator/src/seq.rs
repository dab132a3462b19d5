use crate::base57;
use crate::Generator;
use snip_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// Separator between the instance and counter segments. Not a base57 symbol.
pub const SEPARATOR: char = '-';

/// A globally unique short code generator using a per-instance counter.
///
/// Codes look like `<base57(instance_id)>-<base57(counter)>`. The counter
/// starts at 0 and every call takes the post-increment value, so the first
/// code of instance 0 is `"2-3"`.
///
/// Codes are unique across the fleet as long as every running instance has
/// its own `instance_id`. The counter lives only in memory: restarting an
/// instance under an identifier that already issued codes will reissue
/// them, and the store's uniqueness constraint is the only thing that
/// catches it. Wraparound after `u64::MAX` calls is likewise not handled.
///
/// Deliberately not `Clone`: two copies of one counter would hand out the
/// same codes. Share it behind an `Arc` instead.
#[derive(Debug)]
pub struct SeqGenerator {
    instance_id: u64,
    instance_segment: String,
    counter: AtomicU64,
}

impl SeqGenerator {
    /// Creates a generator for the given instance identifier.
    pub fn new(instance_id: u64) -> Self {
        Self {
            instance_id,
            instance_segment: base57::encode(instance_id),
            counter: AtomicU64::new(0),
        }
    }

    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }
}

impl Generator for SeqGenerator {
    fn next_code(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let code = format!(
            "{}{}{}",
            self.instance_segment,
            SEPARATOR,
            base57::encode(count)
        );
        ShortCode::new_unchecked(code)
    }
}
