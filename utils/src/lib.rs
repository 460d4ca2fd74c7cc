//! Seeded generators of type descriptions and values for the test-suites of
//! `zk-provable`.

mod generator;

pub use generator::ValueGenerator;
