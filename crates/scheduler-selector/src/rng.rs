//! Per-task PRNG (§4.5 "Randomness", §9 "PRNG choice").
//!
//! A globally-locked `rand::thread_rng()` call on every selection would
//! serialize an otherwise lock-free hot path. Each OS thread gets its own
//! `SmallRng`, seeded once from a cryptographic source at first use,
//! mirroring the teacher corpus's `SmallRng::from_rng(&mut thread_rng())`
//! idiom for per-connection/per-task balancers.

use std::cell::RefCell;

use rand::{rngs::SmallRng, thread_rng, SeedableRng};

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(
        SmallRng::from_rng(&mut thread_rng()).expect("SmallRng must be seedable from the OS RNG")
    );
}

/// Run `f` against this thread's PRNG.
pub fn with_thread_rng<T>(f: impl FnOnce(&mut SmallRng) -> T) -> T {
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}
