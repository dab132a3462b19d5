pub mod base57;
pub mod seq;

pub use base57::{decode, encode, CodecError};
pub use seq::SeqGenerator;

use snip_core::ShortCode;
use std::sync::Arc;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// They cannot fail: a generator that could run out of codes must make
/// that an accepted limit rather than an error path.
pub trait Generator: Send + Sync + 'static {
    /// Generates a globally unique short code.
    fn next_code(&self) -> ShortCode;
}

impl<G: Generator + ?Sized> Generator for Arc<G> {
    fn next_code(&self) -> ShortCode {
        (**self).next_code()
    }
}
