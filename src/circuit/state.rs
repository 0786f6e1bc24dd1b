//! Module which contains the per-instance state of components.
//!
//! - [`FunctionState`]: The port values and private state of one component instance
//! - [`InnerFunctionState`]: The private state of a stateful component

use log::debug;

use crate::bitarray::{BitArray, MismatchedBitsizes};
use crate::func::{Component, ComponentFn, PortProperties, PortUpdate, RunContext};
use crate::history::SignalHistory;

/// Private state a component keeps between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnerFunctionState {
    /// Sample history of an [`Oscilloscope`].
    ///
    /// [`Oscilloscope`]: crate::func::Oscilloscope
    Oscilloscope(SignalHistory),
}

/// The state of one component instance.
#[derive(Debug)]
pub struct FunctionState {
    pub(crate) ports: Vec<BitArray>,
    old_ports: Vec<BitArray>,
    port_props: Vec<PortProperties>,
    inner: Option<InnerFunctionState>,
}
impl FunctionState {
    /// Creates a new initial function state for the specified `func`.
    ///
    /// Private state is not created until the first run.
    pub fn new(func: &ComponentFn) -> Self {
        let port_props = func.ports();
        let ports = Self::initial_ports(func, &port_props);
        Self {
            old_ports: ports.clone(),
            ports,
            port_props,
            inner: None,
        }
    }

    fn initial_ports(func: &ComponentFn, props: &[PortProperties]) -> Vec<BitArray> {
        let mut ports: Vec<_> = props.iter()
            .map(|p| BitArray::unknown(p.bitsize))
            .collect();
        func.initialize_port_state(&mut ports);
        ports
    }

    /// Gets the bit value of a port.
    pub fn get_port(&self, index: usize) -> BitArray {
        self.ports[index]
    }
    /// Sets the bit value of a port.
    ///
    /// This raises an error if the bitsize of the new value
    /// doesn't match the bitsize of the current.
    ///
    /// This does **not** run the component.
    pub fn set_port(&mut self, index: usize, new_val: BitArray) -> Result<(), MismatchedBitsizes> {
        self.ports[index].replace(new_val)
    }
    /// All port values, in port order.
    pub fn ports(&self) -> &[BitArray] {
        &self.ports
    }
    /// Properties of the ports, as of the last reconciliation.
    pub fn port_props(&self) -> &[PortProperties] {
        &self.port_props
    }

    /// The component's private state, if it has been created.
    pub fn inner(&self) -> Option<&InnerFunctionState> {
        self.inner.as_ref()
    }
    /// The sample history, if this is an oscilloscope that has run at least once.
    pub fn history(&self) -> Option<&SignalHistory> {
        match &self.inner {
            Some(InnerFunctionState::Oscilloscope(h)) => Some(h),
            None => None,
        }
    }

    /// Runs `func` over the current port values and applies its output updates.
    ///
    /// Private state is created here on the first run.
    /// Returns the updates which changed a port.
    pub(crate) fn run(&mut self, func: &ComponentFn) -> Vec<PortUpdate> {
        if self.inner.is_none() {
            self.inner = func.initialize_inner_state();
            if self.inner.is_some() {
                debug!("created private state for {}", func.name());
            }
        }

        let updates = func.run(RunContext {
            old_ports: &self.old_ports,
            new_ports: &self.ports,
            inner_state: self.inner.as_mut(),
        });

        let mut changed = Vec::with_capacity(updates.len());
        for update in updates {
            debug_assert!(self.port_props[update.index].ty.accepts_output(), "Input port cannot be updated");
            debug_assert_eq!(self.port_props[update.index].bitsize, update.value.len(), "Expected value to have matching bitsize");
            if self.ports[update.index] != update.value {
                self.ports[update.index] = update.value;
                changed.push(update);
            }
        }
        self.old_ports.clone_from(&self.ports);
        changed
    }

    /// Brings this state in line with `func` after its attributes changed.
    ///
    /// If the port list changed, every port returns to its initial value,
    /// since a port index may now refer to a different pin.
    /// Private state is resized in place rather than recreated.
    pub(crate) fn reconcile(&mut self, func: &ComponentFn) {
        let port_props = func.ports();
        if port_props != self.port_props {
            self.ports = Self::initial_ports(func, &port_props);
            self.old_ports.clone_from(&self.ports);
            self.port_props = port_props;
        }
        if let Some(inner) = &mut self.inner {
            func.reconcile_inner_state(inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::attrs::OscilloscopeAttrs;
    use crate::bitarray::{BitArray, BitState};
    use crate::func::{ComponentFn, Oscilloscope, Ttl74283};

    use super::FunctionState;

    #[test]
    fn state_created_on_first_run() {
        let func = ComponentFn::from(Oscilloscope::new(OscilloscopeAttrs::default()));
        let mut state = FunctionState::new(&func);
        assert!(state.inner().is_none());

        let _ = state.run(&func);
        let history = state.history().expect("history after first run");
        assert_eq!((history.channel_count(), history.depth()), (3, 30));
    }

    #[test]
    fn stateless_has_no_inner() {
        let func = ComponentFn::from(Ttl74283::new());
        let mut state = FunctionState::new(&func);
        let _ = state.run(&func);
        assert!(state.inner().is_none());
    }

    #[test]
    fn run_reports_changed_outputs_only() {
        let func = ComponentFn::from(Ttl74283::new());
        let mut state = FunctionState::new(&func);

        // all inputs floating: 0 + 0 + 0, outputs already low
        assert!(state.run(&func).is_empty());

        state.set_port(Ttl74283::A[0], BitArray::from(BitState::High)).unwrap();
        let changed = state.run(&func);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].index, Ttl74283::SUM[0]);
        assert_eq!(state.get_port(Ttl74283::SUM[0]), BitArray::from(BitState::High));
    }

    #[test]
    fn reconcile_resizes_history_in_place() {
        let func = ComponentFn::from(Oscilloscope::new(OscilloscopeAttrs { trace_length: 4, ..Default::default() }));
        let mut state = FunctionState::new(&func);
        for clock in [BitState::Low, BitState::High] {
            state.set_port(0, BitArray::from(clock)).unwrap();
            let _ = state.run(&func);
        }
        assert_eq!(state.history().unwrap().channel(0), [false, false, false, false, false, false, false, true]);

        let func = ComponentFn::from(Oscilloscope::new(OscilloscopeAttrs { inputs: 3, trace_length: 5, ..Default::default() }));
        state.reconcile(&func);
        assert_eq!(state.ports().len(), 6);
        assert!(state.ports().iter().all(|&p| p == BitArray::unknown(1)));

        let history = state.history().unwrap();
        assert_eq!((history.channel_count(), history.depth()), (4, 10));
        assert!(history.newest(0));
        assert_eq!(history.last_clock(), BitState::High);
    }
}
