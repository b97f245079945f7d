//! Time-based effects that can be applied to any sample stream.

mod echo;

pub use echo::Echo;
