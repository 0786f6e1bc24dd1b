use crate::func::{PortProperties, PortType};

/// Distance between neighbouring pins of a DIP package.
pub const PIN_PITCH: i32 = 20;
/// Distance between the two rows of pins.
pub const PACKAGE_HEIGHT: i32 = 60;

/// The pinout of a dual in-line TTL chip.
///
/// Pins are numbered from 1 counter-clockwise, as on a datasheet:
/// pins `1..=n/2` run left to right along the bottom edge and
/// pins `n/2+1..=n` run right to left along the top edge.
/// Ground (pin `n/2`) and supply (pin `n`) are not modelled as ports,
/// so a chip with `n` pins has `n - 2` ports.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct TtlPinout {
    /// Total number of physical pins, including ground and supply.
    pub pin_count: u8,
    /// Physical pin numbers of the outputs.
    pub output_pins: &'static [u8],
    /// Name of each port, in port order.
    pub names: &'static [&'static str],
}
impl TtlPinout {
    /// Number of signal ports (every pin except ground and supply).
    pub fn port_count(&self) -> usize {
        usize::from(self.pin_count) - 2
    }

    fn gnd_pin(&self) -> u8 {
        self.pin_count / 2
    }

    /// Physical pin number of a port, or `None` if the chip has no such port.
    ///
    /// ```
    /// use circuitsim_kernel::func::Ttl74283;
    ///
    /// let pinout = Ttl74283::PINOUT;
    /// assert_eq!(pinout.pin_of(6), Some(7));
    /// assert_eq!(pinout.pin_of(7), Some(9));
    /// assert_eq!(pinout.pin_of(14), None);
    /// ```
    pub fn pin_of(&self, port: usize) -> Option<u8> {
        if port >= self.port_count() {
            return None;
        }
        let port = u8::try_from(port).ok()?;
        match port + 1 < self.gnd_pin() {
            true => Some(port + 1),
            false => Some(port + 2),
        }
    }
    /// Port index of a physical pin, or `None` for ground, supply and missing pins.
    pub fn port_of(&self, pin: u8) -> Option<usize> {
        match pin {
            0 => None,
            p if p == self.gnd_pin() || p >= self.pin_count => None,
            p if p < self.gnd_pin() => Some(usize::from(p - 1)),
            p => Some(usize::from(p - 2)),
        }
    }

    /// Port properties, with directions from `output_pins` and tooltips from `names`.
    pub fn ports(&self) -> Vec<PortProperties> {
        let half = i32::from(self.pin_count / 2);
        (0..self.port_count())
            .filter_map(|port| Some((port, self.pin_of(port)?)))
            .map(|(port, pin)| {
                let ty = match self.output_pins.contains(&pin) {
                    true => PortType::Output,
                    false => PortType::Input,
                };
                let p = i32::from(pin);
                let offset = match p <= half {
                    true => (PIN_PITCH * (p - 1), 0),
                    false => (PIN_PITCH * (2 * half - p), -PACKAGE_HEIGHT),
                };
                PortProperties {
                    ty,
                    bitsize: 1,
                    offset,
                    tooltip: self.names.get(port).copied(),
                }
            })
            .collect()
    }
}
