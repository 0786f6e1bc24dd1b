//! Digital logic components.
//!
//! This module defines the components the kernel can propagate and the
//! traits and structures needed to describe and run them.
//!
//! ## This module notably consists of:
//! - **[`Component`]**: An interface for all components, defining methods for port configuration, initialization, and execution.
//! - **[`PortType`] and [`PortProperties`]**: Descriptions of a component's pins.
//! - **[`PortUpdate`]**: An update to an output port produced by a propagation.
//! - **Components**: [`Oscilloscope`] (stateful, clocked) and [`Ttl74283`] (combinational).
use crate::bitarray::BitArray;
use crate::circuit::state::InnerFunctionState;

use enum_dispatch::enum_dispatch;
pub use arithmetic::*;
pub use io::*;
pub use ttl::*;

mod arithmetic;
mod io;
mod ttl;

/// The direction of a port.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Debug)]
pub enum PortType {
    /// A port which accepts incoming signals.
    Input,
    /// A port which the component drives.
    Output,
}
impl PortType {
    /// Checks if the port type accepts input signals.
    pub fn accepts_input(self) -> bool {
        matches!(self, PortType::Input)
    }

    /// Checks if the port type provides outgoing signals.
    pub fn accepts_output(self) -> bool {
        matches!(self, PortType::Output)
    }
}

/// The properties of a port.
///
/// These are fixed for a given set of component attributes and
/// regenerated whenever the attributes change.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
pub struct PortProperties {
    /// Type of the port.
    pub ty: PortType,
    /// Size of the data the port works with in bits.
    pub bitsize: u8,
    /// Position of the pin relative to the component's origin.
    pub offset: (i32, i32),
    /// Text shown when hovering the pin.
    pub tooltip: Option<&'static str>,
}
impl PortProperties {
    /// A 1-bit input at `offset`.
    pub fn input(offset: (i32, i32)) -> Self {
        Self { ty: PortType::Input, bitsize: 1, offset, tooltip: None }
    }
    /// A 1-bit output at `offset`.
    pub fn output(offset: (i32, i32)) -> Self {
        Self { ty: PortType::Output, bitsize: 1, offset, tooltip: None }
    }
    /// Attaches a tooltip.
    pub fn with_tooltip(self, tooltip: &'static str) -> Self {
        Self { tooltip: Some(tooltip), ..self }
    }
}

/// An update to a port's value during simulation.
///
/// This should only be used to update an [`Output`] port.
///
/// [`Output`]: PortType::Output
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PortUpdate {
    /// Index of the port being updated.
    pub index: usize,
    /// The new value to be assigned to the port at the given index.
    pub value: BitArray
}

/// The interface defining how a component operates.
#[enum_dispatch]
pub trait Component {
    /// Returns the properties of all ports of the component.
    ///
    /// The result only changes when the component's attributes change.
    fn ports(&self) -> Vec<PortProperties>;

    /// Initializes the port state of the component.
    ///
    /// If not specified, by default, the initial port state is set to all floating.
    fn initialize_port_state(&self, _state: &mut [BitArray]) {}

    /// Creates the internal state of the component.
    ///
    /// This is called the first time the component is run.
    /// Stateless components return `None`.
    fn initialize_inner_state(&self) -> Option<InnerFunctionState> {
        None
    }

    /// Brings existing internal state in line with the component's current attributes.
    ///
    /// This is called after the attributes change.
    fn reconcile_inner_state(&self, _state: &mut InnerFunctionState) {}

    /// "Runs" the component's function on its current inputs,
    /// returning updates to its output ports.
    ///
    /// This function is called whenever any of the component's inputs may have changed.
    /// In debug builds, it panics if the port fields of [`RunContext`] do not match
    /// the port properties specified by [`Component::ports`].
    #[must_use]
    fn run(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        self.validate_ports(ctx.old_ports);
        self.validate_ports(ctx.new_ports);
        self.run_inner(ctx)
    }

    /// Inner run function. This is wrapped by [`Component::run`] to ensure input validation.
    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate>;

    /// Validates inputs to ensure all ports match port bitsize.
    fn validate_ports(&self, ports: &[BitArray]) {
        // Only run in debug mode
        if cfg!(debug_assertions) {
            let port_props = self.ports();
            debug_assert_eq!(ports.len(), port_props.len(), "Expected correct number of ports");
            for (i, (bit_vec, port)) in ports.iter().zip(port_props).enumerate() {
                debug_assert_eq!(
                    bit_vec.len(),
                    port.bitsize,
                    "Port {i} has incorrect bit width"
                );
            }
        }
    }
}

/// An enum that represents all supported components.
#[enum_dispatch(Component)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[allow(missing_docs)]
pub enum ComponentFn {
    // Arithmetic
    Ttl74283,
    // I/O
    Oscilloscope,
}
impl ComponentFn {
    /// Human readable name of the component kind.
    pub fn name(&self) -> &'static str {
        match self {
            ComponentFn::Ttl74283(_) => "74283",
            ComponentFn::Oscilloscope(_) => "Digital Oscilloscope",
        }
    }
}

/// The triggering conditions for components based on a signal change.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sensitivity {
    /// Triggered on any change in a signal (rising or falling edge).
    Anyedge,
    /// Triggered on rising edge of a signal (low to high clock transition).
    Posedge,
    /// Triggered on falling edge of a signal (high to low clock transition).
    Negedge,
    /// Does not update in response to a signal update.
    DontCare
}
impl Sensitivity {
    /// Checks whether the change between the old and new value
    /// would create a trigger based on this sensitivity.
    ///
    /// ```
    /// use circuitsim_kernel::bitarray::bitarr;
    /// use circuitsim_kernel::func::Sensitivity;
    ///
    /// let lo = bitarr![0];
    /// let hi = bitarr![1];
    /// assert!(Sensitivity::Posedge.activated(lo, hi));
    /// assert!(Sensitivity::Negedge.activated(hi, lo));
    /// ```
    pub fn activated(self, old: BitArray, new: BitArray) -> bool {
        assert_eq!(old.len(), new.len(), "Bit length should be the same");
        match self {
            Sensitivity::Anyedge  => old != new,
            Sensitivity::Posedge  => old.all_low() && new.all_high(),
            Sensitivity::Negedge  => old.all_high() && new.all_low(),
            Sensitivity::DontCare => false,
        }
    }
}

/// All properties available when running a component.
pub struct RunContext<'a> {
    /// The value of the ports as of the previous run.
    pub old_ports: &'a [BitArray],
    /// The current value of the ports.
    pub new_ports: &'a [BitArray],
    /// The inner state of the component.
    pub inner_state: Option<&'a mut InnerFunctionState>
}

/// Test helper which initializes all of the ports a component should have,
/// setting them all to floating.
#[cfg(test)]
fn floating_ports(properties: &[PortProperties]) -> Vec<BitArray> {
    properties.iter()
        .map(|p| BitArray::unknown(p.bitsize))
        .collect()
}
