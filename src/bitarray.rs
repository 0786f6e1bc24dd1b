//! Four-valued logic signals and fixed-width sequences of them.
//!
//! - [`BitState`]: a single signal (`0`, `1`, floating or conflicting)
//! - [`BitArray`]: up to 64 signals, index 0 being the least significant bit

use thiserror::Error;

/// The state of a single signal line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitState {
    /// Logical false.
    Low = 0b00,
    /// Logical true.
    High = 0b01,
    /// Floating, undriven line.
    #[default]
    Unknown = 0b10,
    /// Conflicting drivers.
    Error = 0b11,
}
impl BitState {
    pub(crate) fn split(self) -> (bool /* data */, bool /* spec */) {
        ((self as u8) & 0b01 != 0, (self as u8) & 0b10 != 0)
    }
    pub(crate) fn join(data: bool, spec: bool) -> Self {
        match (spec, data) {
            (false, false) => BitState::Low,
            (false, true)  => BitState::High,
            (true, false)  => BitState::Unknown,
            (true, true)   => BitState::Error,
        }
    }

    /// Whether this signal is logical true.
    pub fn is_high(self) -> bool {
        self == BitState::High
    }
    /// Whether this signal is logical false.
    pub fn is_low(self) -> bool {
        self == BitState::Low
    }
    /// Whether this signal is a defined logic level (neither floating nor conflicting).
    pub fn is_defined(self) -> bool {
        matches!(self, BitState::Low | BitState::High)
    }

    /// Converts this signal to a single bit for arithmetic.
    ///
    /// Only [`BitState::High`] is 1. Floating and conflicting lines
    /// count as 0, they never fail.
    ///
    /// ```
    /// use circuitsim_kernel::bitarray::BitState;
    ///
    /// assert_eq!(BitState::High.to_bit(), 1);
    /// assert_eq!(BitState::Unknown.to_bit(), 0);
    /// ```
    pub fn to_bit(self) -> u8 {
        u8::from(self.is_high())
    }
}
impl std::fmt::Display for BitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        match self {
            BitState::Low     => f.write_char('0'),
            BitState::High    => f.write_char('1'),
            BitState::Unknown => f.write_char('Z'),
            BitState::Error   => f.write_char('X'),
        }
    }
}

/// Error raised when a signal which is not `0` or `1` is converted to a two-valued type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("signal is not two-valued ({0})")]
pub struct NotTwoValuedErr(BitState);
impl NotTwoValuedErr {
    /// Whether the offending signal was floating.
    pub fn is_unknown(&self) -> bool { self.0 == BitState::Unknown }
    /// Whether the offending signal was a conflict.
    pub fn is_error(&self) -> bool { self.0 == BitState::Error }
    /// The offending signal.
    pub fn bit_state(&self) -> BitState { self.0 }
}

/// Error raised when a value of one width replaces a value of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("mismatched bitsizes: expected {expected}, got {actual}")]
pub struct MismatchedBitsizes {
    /// Width of the value being replaced.
    pub expected: u8,
    /// Width of the replacement.
    pub actual: u8,
}

impl From<bool> for BitState {
    fn from(value: bool) -> Self {
        match value {
            true => Self::High,
            false => Self::Low,
        }
    }
}

/// A sequence of up to 64 signals.
#[derive(Default, Clone, Copy)]
pub struct BitArray {
    data: u64,
    spec: u64,
    len: u8
}
impl BitArray {
    /// Narrowest width a port may have.
    pub const MIN_BITSIZE: u8 = 1;
    /// Widest width a port may have.
    pub const MAX_BITSIZE: u8 = u64::BITS as u8;

    /// Creates an empty (zero-width) array.
    pub fn new() -> Self {
        Default::default()
    }
    /// Creates an array of `len` copies of `st`.
    pub fn repeat(st: BitState, len: u8) -> Self {
        let (data, spec) = st.split();
        Self {
            data: if data { u64::MAX } else { 0 },
            spec: if spec { u64::MAX } else { 0 },
            len: len.clamp(BitArray::MIN_BITSIZE, BitArray::MAX_BITSIZE)
        }
    }
    /// Creates an array of `len` floating signals.
    pub fn unknown(len: u8) -> Self {
        Self::repeat(BitState::Unknown, len)
    }
    /// Creates a fully defined array from the low `len` bits of `bits`.
    ///
    /// ```
    /// use circuitsim_kernel::bitarray::{BitArray, BitState};
    ///
    /// let arr = BitArray::from_bits(0b110, 3);
    /// assert_eq!(arr.index(0), BitState::Low);
    /// assert_eq!(arr.index(2), BitState::High);
    /// ```
    pub fn from_bits(bits: u64, len: u8) -> Self {
        let len = len.clamp(BitArray::MIN_BITSIZE, BitArray::MAX_BITSIZE);
        Self { data: bits, spec: 0, len }.normalized()
    }

    /// Number of signals in this array.
    pub const fn len(self) -> u8 {
        self.len
    }
    /// Whether this array holds no signals.
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    const fn norm_mask(self) -> u64 {
        match self.len {
            len @ 0..64 => (1 << len) - 1,
            _ => u64::MAX
        }
    }
    fn normalize(self) -> (u64, u64) {
        let mask = self.norm_mask();
        (self.data & mask, self.spec & mask)
    }
    fn normalized(self) -> Self {
        let (data, spec) = self.normalize();
        Self { data, spec, len: self.len }
    }

    const fn is_0(self) -> u64 {
        !self.data & !self.spec & self.norm_mask()
    }
    const fn is_1(self) -> u64 {
        self.data & !self.spec & self.norm_mask()
    }
    pub(crate) fn all_low(self) -> bool {
        self.is_0() == self.norm_mask()
    }
    pub(crate) fn all_high(self) -> bool {
        self.is_1() == self.norm_mask()
    }

    fn get_raw(self, i: u8) -> BitState {
        let data = (self.data >> i) & 1 != 0;
        let spec = (self.spec >> i) & 1 != 0;
        BitState::join(data, spec)
    }
    /// Gets the signal at index `i`, if in bounds.
    pub fn get(self, i: u8) -> Option<BitState> {
        (i < self.len()).then(|| self.get_raw(i))
    }

    fn set_raw(&mut self, i: u8, st: BitState) {
        let (data, spec) = st.split();
        self.data &= !(1 << i);
        self.data |= u64::from(data) << i;
        self.spec &= !(1 << i);
        self.spec |= u64::from(spec) << i;
    }
    fn set(&mut self, i: u8, st: BitState) {
        if i < self.len() {
            self.set_raw(i, st);
        }
    }
    /// Returns a copy of this array with the signal at index `i` replaced.
    ///
    /// Out of bounds indices leave the array unchanged.
    pub fn with(mut self, i: u8, st: BitState) -> Self {
        self.set(i, st);
        self
    }

    /// Gets the signal at index `i`.
    ///
    /// Panics if `i` is out of bounds.
    pub fn index(self, i: u8) -> BitState {
        self.get(i).expect("index to be in bounds")
    }

    /// Replaces this array with `new`, failing if their widths differ.
    pub fn replace(&mut self, new: BitArray) -> Result<(), MismatchedBitsizes> {
        match self.len() == new.len() {
            true => {
                *self = new;
                Ok(())
            },
            false => Err(MismatchedBitsizes { expected: self.len(), actual: new.len() })
        }
    }

    /// Reads this array as an unsigned integer, treating every signal
    /// other than [`BitState::High`] as 0.
    ///
    /// Unlike `u64::try_from`, this never fails.
    pub fn to_bits_lossy(self) -> u64 {
        self.is_1()
    }
}
impl From<BitState> for BitArray {
    fn from(st: BitState) -> Self {
        Self::repeat(st, 1)
    }
}
impl FromIterator<BitState> for BitArray {
    fn from_iter<I: IntoIterator<Item = BitState>>(iter: I) -> Self {
        iter.into_iter()
            .zip(0..BitArray::MAX_BITSIZE)
            .fold(BitArray::new(), |mut arr, (st, i)| {
                arr.set_raw(i, st);
                arr.len += 1;
                arr
            })
    }
}
impl TryFrom<BitArray> for u64 {
    type Error = NotTwoValuedErr;

    fn try_from(value: BitArray) -> Result<Self, Self::Error> {
        let (data, spec) = value.normalize();
        match spec == 0 {
            true => Ok(data),
            false => {
                let any_error = data & spec != 0;
                let err_st = match any_error {
                    true => BitState::Error,
                    false => BitState::Unknown,
                };

                Err(NotTwoValuedErr(err_st))
            }
        }
    }
}

/// Iterator over the signals of a [`BitArray`], least significant first.
pub struct BitArrayIntoIter(BitArray);
impl Iterator for BitArrayIntoIter {
    type Item = BitState;

    fn next(&mut self) -> Option<Self::Item> {
        (!self.0.is_empty()).then(|| {
            let raw = self.0.get_raw(0);
            self.0.data >>= 1;
            self.0.spec >>= 1;
            self.0.len -= 1;
            raw
        })
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}
impl DoubleEndedIterator for BitArrayIntoIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        (!self.0.is_empty()).then(|| {
            let raw = self.0.get_raw(self.0.len() - 1);
            self.0.len -= 1;
            raw
        })
    }
}
impl ExactSizeIterator for BitArrayIntoIter {
    fn len(&self) -> usize {
        usize::from(self.0.len())
    }
}
impl IntoIterator for BitArray {
    type Item = <Self::IntoIter as Iterator>::Item;
    type IntoIter = BitArrayIntoIter;

    fn into_iter(self) -> Self::IntoIter {
        BitArrayIntoIter(self)
    }
}

impl PartialEq for BitArray {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.normalize() == other.normalize()
    }
}
impl Eq for BitArray {}
impl std::hash::Hash for BitArray {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        self.normalize().hash(state);
    }
}
impl std::fmt::Debug for BitArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(*self)
            .finish()
    }
}
impl std::fmt::Display for BitArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in self.into_iter().rev() {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

/// Builds a [`BitArray`] from signal literals.
///
/// `0` and `1` are logic levels, `Z` is floating and `X` is a conflict.
/// Either list the signals (least significant first) or give one signal and a width.
///
/// ```
/// use circuitsim_kernel::bitarr;
///
/// assert_eq!(bitarr![1, 0, 1].to_bits_lossy(), 0b101);
/// assert_eq!(bitarr![Z; 4].len(), 4);
/// ```
#[macro_export]
macro_rules! bitarr {
    (@bit 0) => { $crate::bitarray::BitState::Low };
    (@bit 1) => { $crate::bitarray::BitState::High };
    (@bit Z) => { $crate::bitarray::BitState::Unknown };
    (@bit X) => { $crate::bitarray::BitState::Error };
    ($b:tt; $n:expr) => {
        $crate::bitarray::BitArray::repeat($crate::bitarr!(@bit $b), $n)
    };
    ($($b:tt),+ $(,)?) => {
        <$crate::bitarray::BitArray as ::std::iter::FromIterator<_>>::from_iter([$($crate::bitarr!(@bit $b)),+])
    };
}
pub use crate::bitarr;

#[cfg(test)]
mod test {
    use super::{BitArray, BitState};

    #[test]
    fn display() {
        let ba = BitArray::from_iter([
            BitState::Low,
            BitState::Unknown,
            BitState::High,
            BitState::Error,
            BitState::High,
            BitState::Low,
            BitState::Error,
            BitState::Unknown,
        ]);

        assert_eq!(format!("{ba}"), "ZX01X1Z0");
    }

    #[test]
    fn to_bit_is_best_effort() {
        assert_eq!(BitState::High.to_bit(), 1);
        assert_eq!(BitState::Low.to_bit(), 0);
        assert_eq!(BitState::Unknown.to_bit(), 0);
        assert_eq!(BitState::Error.to_bit(), 0);
    }

    #[test]
    fn predicates() {
        assert!(BitState::High.is_high() && BitState::High.is_defined());
        assert!(BitState::Low.is_low() && BitState::Low.is_defined());
        assert!(!BitState::Unknown.is_defined());
        assert!(!BitState::Error.is_defined());
        assert!(!BitState::Error.is_high() && !BitState::Error.is_low());
        assert_eq!(BitState::default(), BitState::Unknown);
    }

    #[test]
    fn from_bits() {
        let arr = BitArray::from_bits(0b1001, 4);
        let states: Vec<_> = arr.into_iter().collect();
        assert_eq!(states, [BitState::High, BitState::Low, BitState::Low, BitState::High]);

        // bits above the width are dropped
        assert_eq!(BitArray::from_bits(0b1_0000, 4), bitarr![0; 4]);
    }

    #[test]
    fn from_bits_keeps_requested_width() {
        for width in [1, 4, 13, 64] {
            let arr = BitArray::from_bits(u64::MAX, width);
            assert_eq!(arr.len(), width);
            assert!(arr.all_high());
        }
        let arr = BitArray::from_bits(9, 5);
        assert_eq!(arr.len(), 5);
        assert_eq!(u64::try_from(arr), Ok(9));
    }

    #[test]
    fn strict_and_lossy_conversion() {
        let arr = bitarr![1, Z, 1, X];
        assert_eq!(arr.to_bits_lossy(), 0b0101);

        let err = u64::try_from(arr).unwrap_err();
        assert!(err.is_error());

        let err = u64::try_from(bitarr![1, Z]).unwrap_err();
        assert!(err.is_unknown());

        assert_eq!(u64::try_from(bitarr![0, 1, 1]).unwrap(), 0b110);
    }

    #[test]
    fn replace_checks_width() {
        let mut arr = bitarr![0; 4];
        assert!(arr.replace(bitarr![1; 4]).is_ok());
        assert_eq!(arr, bitarr![1; 4]);

        let err = arr.replace(bitarr![1; 2]).unwrap_err();
        assert_eq!((err.expected, err.actual), (4, 2));
        assert_eq!(arr, bitarr![1; 4]);
    }

    #[test]
    fn with_and_get() {
        let arr = bitarr![0; 3].with(1, BitState::Error).with(7, BitState::High);
        assert_eq!(arr.get(1), Some(BitState::Error));
        assert_eq!(arr.get(3), None);
        assert_eq!(format!("{arr}"), "0X0");
    }
}
