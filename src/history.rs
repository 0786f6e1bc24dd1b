//! Sampled signal history kept by trace-recording components.

use crate::bitarray::BitState;

/// A resizable window of past samples for a number of channels.
///
/// Each channel holds `depth` boolean samples. Slot 0 is the oldest sample
/// and slot `depth - 1` the newest.
///
/// This also remembers the last clock level seen,
/// so that the next evaluation can tell whether an edge occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalHistory {
    channels: usize,
    depth: usize,
    samples: Vec<bool>,
    last_clock: BitState,
}
impl SignalHistory {
    /// Creates a history of `channels` channels each holding `depth` samples,
    /// all initially false.
    ///
    /// Both dimensions are clamped to at least 1.
    pub fn new(channels: usize, depth: usize) -> Self {
        let channels = channels.max(1);
        let depth = depth.max(1);
        Self {
            channels,
            depth,
            samples: vec![false; channels * depth],
            last_clock: BitState::Unknown,
        }
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels
    }
    /// Number of samples retained per channel.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// All samples of a channel, oldest first.
    ///
    /// Panics if `channel` is out of bounds.
    pub fn channel(&self, channel: usize) -> &[bool] {
        assert!(channel < self.channels, "channel {channel} out of bounds");
        let start = channel * self.depth;
        &self.samples[start..start + self.depth]
    }
    fn channel_mut(&mut self, channel: usize) -> &mut [bool] {
        assert!(channel < self.channels, "channel {channel} out of bounds");
        let start = channel * self.depth;
        &mut self.samples[start..start + self.depth]
    }
    /// Iterates over all channels in order.
    pub fn channels(&self) -> impl Iterator<Item = &[bool]> {
        self.samples.chunks_exact(self.depth)
    }

    /// Gets one sample, if in bounds.
    pub fn get(&self, channel: usize, slot: usize) -> Option<bool> {
        (channel < self.channels && slot < self.depth)
            .then(|| self.samples[channel * self.depth + slot])
    }
    /// Sets one sample.
    ///
    /// Panics if out of bounds.
    pub fn set(&mut self, channel: usize, slot: usize, value: bool) {
        assert!(slot < self.depth, "slot {slot} out of bounds");
        self.channel_mut(channel)[slot] = value;
    }
    /// The newest sample of a channel.
    pub fn newest(&self, channel: usize) -> bool {
        self.channel(channel)[self.depth - 1]
    }

    /// Drops the oldest sample of the channel and appends `value` as the newest.
    pub fn shift_in(&mut self, channel: usize, value: bool) {
        let row = self.channel_mut(channel);
        row.copy_within(1.., 0);
        if let Some(last) = row.last_mut() {
            *last = value;
        }
    }
    /// Replaces the newest sample of the channel without shifting.
    pub fn overwrite_newest(&mut self, channel: usize, value: bool) {
        if let Some(last) = self.channel_mut(channel).last_mut() {
            *last = value;
        }
    }
    /// Resets every sample to false.
    ///
    /// The last clock level is kept.
    pub fn clear(&mut self) {
        self.samples.fill(false);
    }

    /// The clock level seen on the previous evaluation.
    pub fn last_clock(&self) -> BitState {
        self.last_clock
    }
    /// Stores the current clock level, returning the previous one.
    pub fn replace_last_clock(&mut self, clock: BitState) -> BitState {
        std::mem::replace(&mut self.last_clock, clock)
    }

    /// Resizes in place to `channels` x `depth`.
    ///
    /// Channels keep their index. Within a channel, samples stay aligned to the
    /// newest slot: growing adds false samples at the oldest end,
    /// shrinking drops the oldest samples. New channels are all false.
    /// Both dimensions are clamped to at least 1.
    ///
    /// ```
    /// use circuitsim_kernel::history::SignalHistory;
    ///
    /// let mut history = SignalHistory::new(1, 4);
    /// history.shift_in(0, true);
    /// history.resize(1, 6);
    /// assert_eq!(history.channel(0), [false, false, false, false, false, true]);
    /// ```
    pub fn resize(&mut self, channels: usize, depth: usize) {
        let channels = channels.max(1);
        let depth = depth.max(1);
        if (channels, depth) == (self.channels, self.depth) {
            return;
        }

        let kept = depth.min(self.depth);
        let mut samples = vec![false; channels * depth];
        for (ch, old) in self.channels().take(channels).enumerate() {
            let dst = &mut samples[ch * depth..(ch + 1) * depth];
            dst[depth - kept..].copy_from_slice(&old[old.len() - kept..]);
        }

        self.channels = channels;
        self.depth = depth;
        self.samples = samples;
    }

    /// Slots of a channel whose sample differs from the one before it.
    ///
    /// A renderer draws a vertical line at each of these slots.
    pub fn transitions(&self, channel: usize) -> Vec<usize> {
        self.channel(channel)
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] != w[1])
            .map(|(j, _)| j + 1)
            .collect()
    }
}
