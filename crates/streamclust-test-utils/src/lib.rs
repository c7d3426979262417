//! Deterministic point fixtures for streamclust tests.
//!
//! Every generator takes an explicit seed, so fixtures are identical across
//! runs and machines.

pub mod points;

pub use points::{
    generate_blob_stream, generate_uniform_stream, point_at, scenario_a_points,
    stream_from_coords,
};
