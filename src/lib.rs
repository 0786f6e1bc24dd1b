#![warn(missing_docs)]
//! Component kernel for a digital logic simulator.
//!
//! Each component decides, whenever its inputs may have changed, what its
//! outputs and private state become. [`circuit::Circuit`] hosts component
//! instances; the surrounding simulator decides when to propagate them.

pub mod attrs;
pub mod bitarray;
pub mod circuit;
pub mod error;
pub mod func;
pub mod history;

#[cfg(test)]
mod tests {
    use crate::attrs::OscilloscopeAttrs;
    use crate::bitarray::{BitArray, BitState};
    use crate::circuit::{Circuit, InstanceKey};
    use crate::func::{Oscilloscope, Ttl74283};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn set_nibble(circuit: &mut Circuit, key: InstanceKey, ports: [usize; 4], value: u8) {
        for (i, port) in ports.into_iter().enumerate() {
            let st = BitState::from((value >> i) & 1 != 0);
            circuit.set_signal(key, port, st).unwrap();
        }
    }

    fn read_sum(circuit: &Circuit, key: InstanceKey) -> u8 {
        Ttl74283::SUM.into_iter()
            .chain([Ttl74283::COUT])
            .enumerate()
            .map(|(i, port)| circuit.get_signal(key, port).unwrap().to_bit() << i)
            .sum()
    }

    #[test]
    fn adder() {
        init_logger();
        let mut circuit = Circuit::new();
        let adder = circuit.add_component(Ttl74283::new());

        set_nibble(&mut circuit, adder, Ttl74283::A, 9);
        set_nibble(&mut circuit, adder, Ttl74283::B, 6);
        circuit.set_signal(adder, Ttl74283::CIN, BitState::High).unwrap();
        circuit.propagate(adder).unwrap();
        assert_eq!(read_sum(&circuit, adder), 16);

        // the adder is re-evaluated on every propagation, not on edges
        circuit.set_signal(adder, Ttl74283::CIN, BitState::Low).unwrap();
        circuit.propagate(adder).unwrap();
        assert_eq!(read_sum(&circuit, adder), 15);

        set_nibble(&mut circuit, adder, Ttl74283::B, 15);
        circuit.propagate(adder).unwrap();
        assert_eq!(read_sum(&circuit, adder), 24);
    }

    #[test]
    fn adder_floating_inputs() {
        init_logger();
        let mut circuit = Circuit::new();
        let adder = circuit.add_component(Ttl74283::new());

        set_nibble(&mut circuit, adder, Ttl74283::A, 3);
        circuit.set_signal(adder, Ttl74283::B[0], BitState::Error).unwrap();
        circuit.propagate(adder).unwrap();
        assert_eq!(read_sum(&circuit, adder), 3);
        for port in Ttl74283::SUM {
            assert!(circuit.get_signal(adder, port).unwrap().is_defined());
        }
    }

    #[test]
    fn oscilloscope_trace() {
        init_logger();
        let mut circuit = Circuit::new();
        let attrs = OscilloscopeAttrs { inputs: 1, trace_length: 4, ..Default::default() };
        let scope = circuit.add_component(Oscilloscope::new(attrs));
        let data = 1;

        // toggle the clock, feeding the data input a pattern on each half period
        let pattern = [true, true, false, true, false, false];
        circuit.set_signal(scope, Oscilloscope::CLOCK, BitState::Low).unwrap();
        circuit.propagate(scope).unwrap();
        for (i, &bit) in pattern.iter().enumerate() {
            let clock = BitState::from(i % 2 == 0);
            circuit.set_signal(scope, data, BitState::from(bit)).unwrap();
            circuit.set_signal(scope, Oscilloscope::CLOCK, clock).unwrap();
            circuit.propagate(scope).unwrap();
        }

        let history = circuit.history(scope).unwrap();
        assert_eq!(history.channel(1), [false, false, true, true, false, true, false, false]);
        assert_eq!(history.channel(0), [false, false, true, false, true, false, true, false]);

        let osc = match circuit.component(scope).unwrap() {
            crate::func::ComponentFn::Oscilloscope(osc) => *osc,
            other => panic!("expected an oscilloscope, got {other:?}"),
        };
        assert_eq!(osc.edge_markers(history), [2, 4, 6]);
    }

    #[test]
    fn oscilloscope_clear_and_resize() {
        init_logger();
        let mut circuit = Circuit::new();
        let attrs = OscilloscopeAttrs { inputs: 2, trace_length: 4, ..Default::default() };
        let scope = circuit.add_component(Oscilloscope::new(attrs));

        for clock in [BitState::Low, BitState::High] {
            circuit.set_signal(scope, 2, BitState::High).unwrap();
            circuit.set_signal(scope, Oscilloscope::CLOCK, clock).unwrap();
            circuit.propagate(scope).unwrap();
        }
        assert!(circuit.history(scope).unwrap().newest(2));

        // growing keeps the samples, newest still last
        circuit.set_attrs(scope, OscilloscopeAttrs { trace_length: 6, ..attrs }).unwrap();
        let history = circuit.history(scope).unwrap();
        assert_eq!(history.depth(), 12);
        assert!(history.newest(2));
        assert_eq!(history.channel(2).iter().filter(|&&s| s).count(), 1);

        // clear is the last port
        let clear = circuit.ports(scope).unwrap().len() - 1;
        assert_eq!(circuit.get_port(scope, clear).unwrap(), BitArray::unknown(1));
        circuit.set_signal(scope, clear, BitState::High).unwrap();
        circuit.propagate(scope).unwrap();
        let history = circuit.history(scope).unwrap();
        assert!(history.channels().all(|c| c.iter().all(|&s| !s)));
    }
}
