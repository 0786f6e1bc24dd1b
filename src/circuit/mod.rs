//! A host for component instances.
//!
//! [`Circuit`] owns every instance's component function and its [`FunctionState`]
//! (port values plus private state). It does no wiring and no scheduling:
//! whoever drives the simulation decides when an instance's inputs change
//! and when it is propagated.

pub mod state;

use log::{debug, trace};
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::attrs::OscilloscopeAttrs;
use crate::bitarray::{BitArray, BitState};
use crate::circuit::state::FunctionState;
use crate::error::HostError;
use crate::func::{ComponentFn, Oscilloscope, PortProperties, PortUpdate};
use crate::history::SignalHistory;

new_key_type! {
    /// Key type for component instances in a [`Circuit`].
    pub struct InstanceKey;
}

/// A collection of component instances and their state.
#[derive(Default, Debug)]
pub struct Circuit {
    functions: SlotMap<InstanceKey, ComponentFn>,
    states: SecondaryMap<InstanceKey, FunctionState>,
}
impl Circuit {
    /// Creates an empty [`Circuit`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a component instance.
    pub fn add_component<F: Into<ComponentFn>>(&mut self, f: F) -> InstanceKey {
        let func = f.into();
        let key = self.functions.insert(func);
        self.states.insert(key, FunctionState::new(&func));
        debug!("added {} instance {key:?}", func.name());
        key
    }

    /// Removes a component instance, dropping its state.
    pub fn remove_component(&mut self, key: InstanceKey) -> Option<ComponentFn> {
        self.states.remove(key);
        self.functions.remove(key)
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.functions.len()
    }
    /// Whether there are no instances.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Gets the component function of an instance.
    pub fn component(&self, key: InstanceKey) -> Option<&ComponentFn> {
        self.functions.get(key)
    }
    /// Gets the state of an instance.
    pub fn state(&self, key: InstanceKey) -> Option<&FunctionState> {
        self.states.get(key)
    }
    /// Gets the sample history of an oscilloscope instance,
    /// if it has been propagated at least once.
    pub fn history(&self, key: InstanceKey) -> Option<&SignalHistory> {
        self.state(key)?.history()
    }

    /// Gets the port properties of an instance.
    pub fn ports(&self, key: InstanceKey) -> Result<&[PortProperties], HostError> {
        Ok(self.state_of(key)?.port_props())
    }

    fn state_of(&self, key: InstanceKey) -> Result<&FunctionState, HostError> {
        self.states.get(key).ok_or(HostError::MissingInstance)
    }
    fn entry_mut(&mut self, key: InstanceKey) -> Result<(&ComponentFn, &mut FunctionState), HostError> {
        let func = self.functions.get(key).ok_or(HostError::MissingInstance)?;
        let state = self.states.get_mut(key).ok_or(HostError::MissingInstance)?;
        Ok((func, state))
    }

    /// Gets the value of a port.
    pub fn get_port(&self, key: InstanceKey, index: usize) -> Result<BitArray, HostError> {
        let state = self.state_of(key)?;
        match state.ports().get(index) {
            Some(&value) => Ok(value),
            None => Err(HostError::PortOutOfRange { index, count: state.ports().len() }),
        }
    }
    /// Gets the first signal of a port.
    pub fn get_signal(&self, key: InstanceKey, index: usize) -> Result<BitState, HostError> {
        Ok(self.get_port(key, index)?.index(0))
    }

    /// Sets the value of an input port.
    ///
    /// This does **not** propagate; call [`Circuit::propagate`] afterwards.
    pub fn set_port(&mut self, key: InstanceKey, index: usize, value: BitArray) -> Result<(), HostError> {
        let (_, state) = self.entry_mut(key)?;
        let count = state.port_props().len();
        let props = state.port_props().get(index)
            .ok_or(HostError::PortOutOfRange { index, count })?;
        if !props.ty.accepts_input() {
            return Err(HostError::NotAnInput { index });
        }
        state.set_port(index, value)?;
        Ok(())
    }
    /// Sets a 1-bit input port.
    pub fn set_signal(&mut self, key: InstanceKey, index: usize, st: BitState) -> Result<(), HostError> {
        self.set_port(key, index, BitArray::from(st))
    }

    /// Runs an instance over its current port values.
    ///
    /// Returns the output ports that changed value.
    pub fn propagate(&mut self, key: InstanceKey) -> Result<Vec<PortUpdate>, HostError> {
        let (func, state) = self.entry_mut(key)?;
        let changed = state.run(func);
        trace!("propagated {key:?}: {} output(s) changed", changed.len());
        Ok(changed)
    }

    /// Replaces the attributes of an oscilloscope instance.
    ///
    /// The port list is regenerated and the sample history is resized
    /// in place, keeping the most recent samples.
    pub fn set_attrs(&mut self, key: InstanceKey, attrs: OscilloscopeAttrs) -> Result<(), HostError> {
        let func = self.functions.get_mut(key).ok_or(HostError::MissingInstance)?;
        let ComponentFn::Oscilloscope(osc) = func else {
            return Err(HostError::WrongComponent { expected: "an oscilloscope" });
        };
        let new_osc = Oscilloscope::new(attrs);
        if *osc == new_osc {
            return Ok(());
        }
        *osc = new_osc;
        debug!("reconciling {key:?} to {} inputs x {} samples", new_osc.attrs().inputs, new_osc.attrs().depth());

        let (func, state) = self.entry_mut(key)?;
        state.reconcile(func);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::attrs::OscilloscopeAttrs;
    use crate::bitarray::{BitArray, BitState};
    use crate::circuit::Circuit;
    use crate::error::HostError;
    use crate::func::{Oscilloscope, Ttl74283};

    #[test]
    fn missing_instance() {
        let mut circuit = Circuit::new();
        let key = circuit.add_component(Ttl74283::new());
        assert_eq!(circuit.len(), 1);
        assert!(circuit.remove_component(key).is_some());
        assert!(circuit.is_empty());

        assert_eq!(circuit.propagate(key), Err(HostError::MissingInstance));
        assert_eq!(circuit.get_port(key, 0), Err(HostError::MissingInstance));
        assert!(circuit.state(key).is_none());
    }

    #[test]
    fn set_port_checks() {
        let mut circuit = Circuit::new();
        let key = circuit.add_component(Ttl74283::new());

        assert_eq!(
            circuit.set_signal(key, 14, BitState::High),
            Err(HostError::PortOutOfRange { index: 14, count: 14 })
        );
        assert_eq!(
            circuit.set_signal(key, Ttl74283::COUT, BitState::High),
            Err(HostError::NotAnInput { index: Ttl74283::COUT })
        );
        assert!(matches!(
            circuit.set_port(key, Ttl74283::CIN, BitArray::unknown(2)),
            Err(HostError::MismatchedBitsizes(_))
        ));
        assert!(circuit.set_signal(key, Ttl74283::CIN, BitState::High).is_ok());
        assert_eq!(circuit.get_signal(key, Ttl74283::CIN), Ok(BitState::High));
    }

    #[test]
    fn set_attrs_wrong_component() {
        let mut circuit = Circuit::new();
        let key = circuit.add_component(Ttl74283::new());
        assert!(matches!(
            circuit.set_attrs(key, OscilloscopeAttrs::default()),
            Err(HostError::WrongComponent { .. })
        ));
    }

    #[test]
    fn set_attrs_keeps_port_values() {
        let mut circuit = Circuit::new();
        let attrs = OscilloscopeAttrs::default();
        let key = circuit.add_component(Oscilloscope::new(attrs));
        circuit.set_signal(key, 2, BitState::High).unwrap();

        // same port list: values survive
        circuit.set_attrs(key, OscilloscopeAttrs { show_clock: false, ..attrs }).unwrap();
        assert_eq!(circuit.get_signal(key, 2), Ok(BitState::High));
        circuit.set_attrs(key, OscilloscopeAttrs { show_clock: false, trace_length: 20, ..attrs }).unwrap();
        assert_eq!(circuit.get_signal(key, 2), Ok(BitState::High));

        // port list changes: every port is back to floating
        circuit.set_attrs(key, OscilloscopeAttrs { inputs: 3, ..attrs }).unwrap();
        assert_eq!(circuit.get_signal(key, 2), Ok(BitState::Unknown));
    }

    #[test]
    fn set_attrs_regenerates_ports() {
        let mut circuit = Circuit::new();
        let key = circuit.add_component(Oscilloscope::new(OscilloscopeAttrs::default()));
        assert_eq!(circuit.ports(key).unwrap().len(), 5);

        circuit.set_attrs(key, OscilloscopeAttrs { inputs: 7, ..Default::default() }).unwrap();
        assert_eq!(circuit.ports(key).unwrap().len(), 10);
        // no history until the first propagation
        assert!(circuit.history(key).is_none());

        circuit.propagate(key).unwrap();
        let history = circuit.history(key).unwrap();
        assert_eq!((history.channel_count(), history.depth()), (8, 30));
    }
}
