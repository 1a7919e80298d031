//! Unit tests exercising the public API piece by piece.

mod builders_test;
mod clock_test;
mod config_test;
mod error_test;
mod index_test;
