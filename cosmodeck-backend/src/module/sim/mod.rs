///! Deterministic helpers and simulated data
///!
///! Clock and randomness are capabilities passed in by the caller, so every
///! generator here is reproducible under test.

mod clock;
mod random;

pub mod astronomy;
pub mod launch_game;
pub mod passes;
pub mod projection;

pub use clock::{Clock, ManualClock, SystemClock};
pub use random::{FastRandom, RandomSource, SequenceRandom};
