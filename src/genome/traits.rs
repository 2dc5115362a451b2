//! Genome abstraction
//!
//! The coordination core treats the problem representation as opaque: any
//! type that can be cloned, moved between island threads and serialized for
//! run artifacts qualifies.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait bound for problem representations carried by individuals
pub trait Genome: Clone + Debug + Send + Serialize + DeserializeOwned + 'static {}

impl<T> Genome for T where T: Clone + Debug + Send + Serialize + DeserializeOwned + 'static {}
