//! Error types for the kernel.
//!
//! Propagation itself never fails. These errors come from configuring
//! components and from misusing the instance host.

use thiserror::Error;

use crate::bitarray::MismatchedBitsizes;

/// Error raised while building a component's attribute set.
#[derive(Debug, Error)]
pub enum AttrError {
    /// A numeric attribute outside its allowed range.
    #[error("attribute `{key}` is {value}, expected {min}..={max}")]
    OutOfRange {
        /// Attribute name.
        key: &'static str,
        /// The rejected value.
        value: i64,
        /// Smallest allowed value.
        min: i64,
        /// Largest allowed value.
        max: i64,
    },

    /// An attribute whose text could not be parsed.
    #[error("attribute `{key}` has invalid value {value:?}")]
    InvalidValue {
        /// Attribute name.
        key: &'static str,
        /// The text as given.
        value: String,
    },

    /// Malformed JSON attribute set.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error raised by [`Circuit`] when asked about something it does not hold.
///
/// [`Circuit`]: crate::circuit::Circuit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The instance key is not (or no longer) in the circuit.
    #[error("no such component instance")]
    MissingInstance,

    /// The port index is past the end of the component's port list.
    #[error("port {index} out of range (component has {count} ports)")]
    PortOutOfRange {
        /// The requested port.
        index: usize,
        /// Number of ports the component has.
        count: usize,
    },

    /// The port is driven by the component, so it cannot be set from outside.
    #[error("port {index} is an output")]
    NotAnInput {
        /// The requested port.
        index: usize,
    },

    /// A port value had the wrong width.
    #[error(transparent)]
    MismatchedBitsizes(#[from] MismatchedBitsizes),

    /// The operation only applies to another kind of component.
    #[error("component is not {expected}")]
    WrongComponent {
        /// The kind of component the operation needs.
        expected: &'static str,
    },
}

/// Result of configuring attributes.
pub type Result<T, E = AttrError> = std::result::Result<T, E>;
