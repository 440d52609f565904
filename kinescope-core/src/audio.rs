// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `audio` module provides the structures for decoded PCM audio.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// `Channels` is a bit mask of all channels contained in a signal.
    #[derive(Default)]
    pub struct Channels: u32 {
        /// Front-left (left) or the Mono channel.
        const FRONT_LEFT  = 0x0000_0001;
        /// Front-right (right) channel.
        const FRONT_RIGHT = 0x0000_0002;
    }
}

impl Channels {
    /// Gets the number of channels.
    pub fn count(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Gets a channel mask for the given number of channels in default order.
    pub fn from_count(count: usize) -> Option<Channels> {
        match count {
            1 => Some(Channels::FRONT_LEFT),
            2 => Some(Channels::FRONT_LEFT | Channels::FRONT_RIGHT),
            _ => None,
        }
    }
}

impl fmt::Display for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#032b}", self.bits)
    }
}

/// `SignalSpec` describes the characteristics of a PCM signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SignalSpec {
    /// The signal sampling rate in hertz (Hz).
    pub rate: u32,
    /// The channel assignments of the signal.
    pub channels: Channels,
}

impl SignalSpec {
    pub fn new(rate: u32, channels: Channels) -> Self {
        SignalSpec { rate, channels }
    }
}

/// An `AudioBlock` is one windowed span of decoded samples, stored in planar order with one
/// `Vec<f32>` per channel. All channels of a block have the same length.
#[derive(Clone, Debug, Default)]
pub struct AudioBlock {
    /// Per-channel sample planes.
    pub channels: Vec<Vec<f32>>,
}

impl AudioBlock {
    /// The number of samples per channel.
    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }
}

/// `DecodedAudio` is the PCM produced by decoding one packet: an ordered list of blocks.
///
/// A packet may contain any number of coded blocks, including zero.
#[derive(Clone, Debug)]
pub struct DecodedAudio {
    /// The signal specification.
    pub spec: SignalSpec,
    /// The decoded blocks, in coded order.
    pub blocks: Vec<AudioBlock>,
}

impl DecodedAudio {
    pub fn new(spec: SignalSpec) -> Self {
        DecodedAudio { spec, blocks: Vec::new() }
    }

    /// The total number of samples per channel across all blocks.
    pub fn frames(&self) -> usize {
        self.blocks.iter().map(AudioBlock::frames).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_channel_counts() {
        assert_eq!(Channels::from_count(1).unwrap().count(), 1);
        assert_eq!(Channels::from_count(2).unwrap().count(), 2);
        assert!(Channels::from_count(3).is_none());
        assert!(Channels::from_count(0).is_none());
    }

    #[test]
    fn verify_frame_counts() {
        let spec = SignalSpec::new(44100, Channels::from_count(2).unwrap());

        let mut decoded = DecodedAudio::new(spec);
        assert_eq!(decoded.frames(), 0);

        decoded.blocks.push(AudioBlock { channels: vec![vec![0.0; 1920], vec![0.0; 1920]] });
        decoded.blocks.push(AudioBlock { channels: vec![vec![0.0; 1920], vec![0.0; 1920]] });
        assert_eq!(decoded.frames(), 3840);
    }
}
