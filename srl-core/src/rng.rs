// Agents own their generator so independent runs never share random state. The thread local
// generator only supplies seeds when the caller did not pin one, and starts from OS entropy so
// that unpinned runs differ from one process or thread to the next.

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::cell::RefCell;

thread_local! {
    pub static RNG: RefCell<StdRng> = RefCell::new(StdRng::from_os_rng());
}

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| RNG.with_borrow_mut(|rng| rng.random()));
    StdRng::seed_from_u64(seed)
}
