//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host (x86_64) with no
//! modem, cloud or sensor hardware required.

mod mocks;
mod scheduler_tests;
mod settings_tests;
