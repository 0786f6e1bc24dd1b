use crate::bitarray::{BitArray, BitState};
use crate::func::{Component, PortProperties, PortUpdate, RunContext, TtlPinout};

/// A 74283 4-bit binary full adder with fast carry.
///
/// Ports follow the chip's physical pinout, so operand and sum bits are
/// interleaved rather than in ascending order (see [`Ttl74283::PINOUT`]).
///
/// Any input which is not logic high counts as 0,
/// so the outputs are always fully defined.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct Ttl74283;
impl Ttl74283 {
    /// Pinout of the 16-pin package.
    pub const PINOUT: TtlPinout = TtlPinout {
        pin_count: 16,
        output_pins: &[1, 4, 9, 10, 13],
        names: &["Σ2", "B2", "A2", "Σ1", "A1", "B1", "CIN", "C4", "Σ4", "B4", "A4", "Σ3", "A3", "B3"],
    };

    /// Ports of operand A, least significant bit first.
    pub const A: [usize; 4] = [4, 2, 12, 10];
    /// Ports of operand B, least significant bit first.
    pub const B: [usize; 4] = [5, 1, 13, 9];
    /// Port of the carry in.
    pub const CIN: usize = 6;
    /// Ports of the sum, least significant bit first.
    pub const SUM: [usize; 4] = [3, 0, 11, 8];
    /// Port of the carry out.
    pub const COUT: usize = 7;

    /// Creates a new 74283.
    pub fn new() -> Self {
        Self
    }

    /// Adds two 4-bit operands and a carry through a ripple of full adders.
    ///
    /// Returns the four sum bits (least significant first) and the carry out.
    ///
    /// ```
    /// use circuitsim_kernel::func::Ttl74283;
    ///
    /// // 9 + 6 + 1 = 16
    /// let (sum, cout) = Ttl74283::ripple_add([true, false, false, true], [false, true, true, false], true);
    /// assert_eq!(sum, [false; 4]);
    /// assert!(cout);
    /// ```
    pub fn ripple_add(a: [bool; 4], b: [bool; 4], cin: bool) -> ([bool; 4], bool) {
        let mut carry = cin;
        let sum = std::array::from_fn(|i| {
            let half = a[i] ^ b[i];
            let s = half ^ carry;
            carry = (a[i] & b[i]) | (half & carry);
            s
        });
        (sum, carry)
    }
}
impl Component for Ttl74283 {
    fn ports(&self) -> Vec<PortProperties> {
        Self::PINOUT.ports()
    }

    fn initialize_port_state(&self, state: &mut [BitArray]) {
        for &index in Self::SUM.iter().chain([&Self::COUT]) {
            state[index] = BitArray::from(BitState::Low);
        }
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        let bit = |index: usize| ctx.new_ports[index].index(0).is_high();

        let a = Self::A.map(bit);
        let b = Self::B.map(bit);
        let (sum, cout) = Self::ripple_add(a, b, bit(Self::CIN));

        std::iter::zip(Self::SUM, sum)
            .chain([(Self::COUT, cout)])
            .map(|(index, s)| PortUpdate { index, value: BitArray::from(BitState::from(s)) })
            .collect()
    }
}
