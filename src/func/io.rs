use log::{trace, warn};

use crate::attrs::OscilloscopeAttrs;
use crate::bitarray::{BitArray, BitState};
use crate::circuit::state::InnerFunctionState;
use crate::func::{Component, PortProperties, PortUpdate, RunContext};
use crate::history::SignalHistory;

/// Width of the frame around the trace area.
pub const BORDER: i32 = 10;
/// Vertical distance between data input pins (and trace rows).
pub const ROW_PITCH: i32 = 30;
/// Horizontal space taken by one sample.
pub const SAMPLE_WIDTH: i32 = 10;

/// Layout bounds of a component, relative to its origin.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Bounds {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

/// What an oscilloscope did with its history during one run.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Transition {
    /// Capture was disabled or the clock was undefined; nothing was sampled.
    Idle,
    /// The clock changed: every channel shifted in a new sample.
    EdgeCapture,
    /// The clock held: the newest sample of every data channel was refreshed.
    LevelUpdate,
    /// The clear input was high: the history was wiped.
    Cleared,
}

/// A digital oscilloscope.
///
/// On every clock change, it records the level of the clock and of each
/// data input into a [`SignalHistory`], keeping the last
/// `2 * trace_length` samples of each.
///
/// Ports:
/// - `0`: clock
/// - `1..=inputs`: data
/// - `inputs + 1`: enable (capture is disabled only while this is low)
/// - `inputs + 2`: clear (wipes the history while high)
///
/// It has no outputs.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct Oscilloscope {
    attrs: OscilloscopeAttrs
}
impl Oscilloscope {
    /// Port of the clock input.
    pub const CLOCK: usize = 0;

    /// Creates a new oscilloscope, clamping its attributes into range.
    pub fn new(attrs: OscilloscopeAttrs) -> Self {
        Self { attrs: attrs.clamped() }
    }

    /// The attributes of this oscilloscope.
    pub fn attrs(&self) -> &OscilloscopeAttrs {
        &self.attrs
    }
    /// Port of the enable input.
    pub fn enable_port(&self) -> usize {
        usize::from(self.attrs.inputs) + 1
    }
    /// Port of the clear input.
    pub fn clear_port(&self) -> usize {
        usize::from(self.attrs.inputs) + 2
    }

    /// Layout bounds. These grow with the trace length and the number of displayed rows.
    pub fn bounds(&self) -> Bounds {
        let clock_row = i32::from(self.attrs.show_clock);
        let rows = i32::from(self.attrs.inputs) + clock_row;
        Bounds {
            x: 0,
            y: -BORDER - ROW_PITCH * clock_row,
            width: i32::from(self.attrs.trace_length) * 2 * SAMPLE_WIDTH + 2 * BORDER + 15,
            height: rows * ROW_PITCH + 3 * BORDER,
        }
    }

    /// Updates `history` from the current port values.
    ///
    /// In order of priority:
    /// 1. clear high: the history is wiped and the clock level is not recorded.
    /// 2. enable low, or the current or previous clock undefined: nothing is sampled.
    /// 3. clock changed: every channel shifts in its current level.
    /// 4. clock unchanged: the newest sample of each data channel is overwritten,
    ///    so levels which settle after the edge still show up in the last sample.
    ///
    /// In every case but the first, the clock level is recorded for the next run.
    /// Undefined data levels are sampled as low.
    pub fn sample(&self, ports: &[BitArray], history: &mut SignalHistory) -> Transition {
        history.resize(self.attrs.channel_count(), self.attrs.depth());

        let level = |index: usize| ports[index].index(0);
        let clock = level(Self::CLOCK);

        if level(self.clear_port()).is_high() {
            history.clear();
            return Transition::Cleared;
        }

        let last_clock = history.replace_last_clock(clock);
        if last_clock == BitState::Unknown || clock == BitState::Unknown || level(self.enable_port()).is_low() {
            Transition::Idle
        } else if clock != last_clock {
            for channel in 0..history.channel_count() {
                history.shift_in(channel, level(channel).is_high());
            }
            Transition::EdgeCapture
        } else {
            for channel in 1..history.channel_count() {
                history.overwrite_newest(channel, level(channel).is_high());
            }
            Transition::LevelUpdate
        }
    }

    /// Channels shown as trace rows, as `(channel, samples)`.
    ///
    /// The clock channel is only included if `show_clock` is set.
    pub fn displayed_rows<'h>(&self, history: &'h SignalHistory) -> impl Iterator<Item = (usize, &'h [bool])> {
        let skip = usize::from(!self.attrs.show_clock);
        history.channels().enumerate().skip(skip)
    }

    /// Slots at which a marker line is drawn: the clock channel changes
    /// between the previous slot and this one in the direction selected by
    /// the trigger mode.
    pub fn edge_markers(&self, history: &SignalHistory) -> Vec<usize> {
        let sensitivity = self.attrs.trigger_mode.sensitivity();
        let level = |b: bool| BitArray::from(BitState::from(b));
        history.channel(Self::CLOCK)
            .windows(2)
            .enumerate()
            .filter(|(_, w)| sensitivity.activated(level(w[0]), level(w[1])))
            .map(|(j, _)| j + 1)
            .collect()
    }
}
impl From<OscilloscopeAttrs> for Oscilloscope {
    fn from(attrs: OscilloscopeAttrs) -> Self {
        Self::new(attrs)
    }
}
impl Component for Oscilloscope {
    fn ports(&self) -> Vec<PortProperties> {
        let inputs = i32::from(self.attrs.inputs);
        let control_y = ROW_PITCH * inputs + 2 * BORDER;

        let mut ports: Vec<_> = (0..=inputs)
            .map(|i| PortProperties::input((0, ROW_PITCH * i)))
            .collect();
        ports[Self::CLOCK] = ports[Self::CLOCK].with_tooltip("Clock");
        ports.push(PortProperties::input((20, control_y)).with_tooltip("Enable (active high)"));
        ports.push(PortProperties::input((30, control_y)).with_tooltip("Clear diagram"));
        ports
    }

    fn initialize_inner_state(&self) -> Option<InnerFunctionState> {
        Some(InnerFunctionState::Oscilloscope(SignalHistory::new(self.attrs.channel_count(), self.attrs.depth())))
    }

    fn reconcile_inner_state(&self, state: &mut InnerFunctionState) {
        let InnerFunctionState::Oscilloscope(history) = state;
        history.resize(self.attrs.channel_count(), self.attrs.depth());
    }

    fn run_inner(&self, ctx: RunContext<'_>) -> Vec<PortUpdate> {
        match ctx.inner_state {
            Some(InnerFunctionState::Oscilloscope(history)) => {
                let transition = self.sample(ctx.new_ports, history);
                trace!("oscilloscope: {transition:?} (clock {})", history.last_clock());
            },
            None => warn!("oscilloscope run without a history, ignoring"),
        }
        vec![]
    }
}
