//! Trains a small feed-forward classifier by treating its flattened weights
//! as particle positions.

pub mod dataset;
pub mod network;
pub mod objective;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::{dataset::*, network::*, objective::*};
}
