//! Security test suite for path confinement.

mod path_escape;
