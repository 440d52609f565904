// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bink audio decoder.
//!
//! Bink audio codes windowed blocks of band-quantized transform coefficients. The DCT variant
//! carries each channel as its own coefficient stream; the RDFT variant interleaves all channels
//! into a single stream at a multiplied sample rate. Consecutive blocks are blended over a
//! 1/16th-block overlap window.

use kinescope_core::audio::{AudioBlock, DecodedAudio, SignalSpec};
use kinescope_core::codecs::{
    AudioCodecParameters, AudioDecoder, CODEC_TYPE_BINK_AUDIO_DCT, CODEC_TYPE_BINK_AUDIO_RDFT,
};
use kinescope_core::dsp::dct::DctIii;
use kinescope_core::dsp::rdft::Rdft;
use kinescope_core::errors::{unsupported_error, Result};
use kinescope_core::formats::Packet;
use kinescope_core::io::BitReaderRtl;

use log::trace;

/// Critical band edge frequencies in Hz.
const CRITICAL_FREQS: [u32; 25] = [
    100, 200, 300, 400, 510, 630, 770, 920, 1080, 1270, 1480, 1720, 2000, 2320, 2700, 3150,
    3700, 4400, 5300, 6400, 7700, 9500, 12000, 15500, 24500,
];

/// Run lengths of the coefficient scan, in coefficients.
const RLE_LENGTHS: [u32; 16] = [16, 24, 32, 40, 48, 64, 72, 80, 88, 96, 104, 112, 120, 128, 256, 512];

/// The number of quantizer steps.
const NUM_QUANTS: usize = 96;

/// The fewest bits a sub-block can occupy: two 29-bit floats.
const MIN_BLOCK_BITS: usize = 58;

enum Transform {
    Dct(DctIii),
    Rdft(Rdft),
}

/// Bink audio decoder for one track.
pub struct BinkAudioDecoder {
    params: AudioCodecParameters,
    spec: SignalSpec,
    use_dct: bool,
    frame_len: usize,
    overlap_len: usize,
    block_size: usize,
    /// Coefficient streams carried in the bit stream. The RDFT variant folds all channels into
    /// one interleaved stream.
    internal_channels: usize,
    /// Output channels per internal stream.
    stride: usize,
    root: f32,
    quant_table: [f32; NUM_QUANTS],
    num_bands: usize,
    bands: Vec<usize>,
    transform: Transform,
    coeffs: Vec<Vec<f32>>,
    overlap: Vec<Vec<f32>>,
    first: bool,
}

impl AudioDecoder for BinkAudioDecoder {
    fn try_new(params: &AudioCodecParameters) -> Result<Self> {
        let use_dct = match params.codec {
            CODEC_TYPE_BINK_AUDIO_DCT => true,
            CODEC_TYPE_BINK_AUDIO_RDFT => false,
            _ => return unsupported_error("bink: invalid codec type"),
        };

        let channels = params.channels.count();

        if channels < 1 || channels > 2 {
            return unsupported_error("bink: unsupported channel count");
        }

        if params.sample_rate == 0 {
            return unsupported_error("bink: invalid sample rate");
        }

        let mut sample_rate = params.sample_rate as usize;

        let mut frame_len_bits: u32 = if sample_rate < 22050 {
            9
        }
        else if sample_rate < 44100 {
            10
        }
        else {
            11
        };

        // The RDFT variant interleaves all channels into one stream running at a multiplied
        // rate.
        let internal_channels = if use_dct {
            channels
        }
        else {
            sample_rate *= channels;
            frame_len_bits += (usize::BITS - 1 - channels.leading_zeros()) & 3;
            1
        };

        let frame_len = 1usize << frame_len_bits;
        let overlap_len = frame_len / 16;
        let block_size = (frame_len - overlap_len) * internal_channels;

        let root = if use_dct {
            frame_len as f32 / ((frame_len as f32).sqrt() * 32768.0)
        }
        else {
            2.0 / ((frame_len as f32).sqrt() * 32768.0)
        };

        let mut quant_table = [0f32; NUM_QUANTS];
        for (i, quant) in quant_table.iter_mut().enumerate() {
            // The constant is 0.066399999 / log10(e).
            *quant = (i as f32 * 0.152_891_65).exp() * root;
        }

        let sample_rate_half = (sample_rate + 1) / 2;

        let mut num_bands = 1;
        while num_bands < CRITICAL_FREQS.len() {
            if sample_rate_half as u32 <= CRITICAL_FREQS[num_bands - 1] {
                break;
            }
            num_bands += 1;
        }

        let mut bands = Vec::with_capacity(num_bands + 1);
        bands.push(2);
        for i in 1..num_bands {
            bands.push((CRITICAL_FREQS[i - 1] as usize * frame_len / sample_rate_half) & !1);
        }
        bands.push(frame_len);

        let transform = if use_dct {
            Transform::Dct(DctIii::new(frame_len))
        }
        else {
            Transform::Rdft(Rdft::new(frame_len))
        };

        trace!(
            "bink audio: {} Hz, {} ch, frame_len={}, bands={}, dct={}",
            params.sample_rate, channels, frame_len, num_bands, use_dct,
        );

        Ok(BinkAudioDecoder {
            params: params.clone(),
            spec: SignalSpec::new(params.sample_rate, params.channels),
            use_dct,
            frame_len,
            overlap_len,
            block_size,
            internal_channels,
            stride: (channels + internal_channels - 1) / internal_channels,
            root,
            quant_table,
            num_bands,
            bands,
            transform,
            coeffs: vec![vec![0f32; frame_len]; internal_channels],
            overlap: vec![vec![0f32; overlap_len]; internal_channels],
            first: true,
        })
    }

    fn decode(&mut self, packet: &Packet) -> Result<DecodedAudio> {
        let mut reader = BitReaderRtl::new(packet.buf());
        let mut decoded = DecodedAudio::new(self.spec);

        while reader.bits_left() >= MIN_BLOCK_BITS {
            self.decode_block(&mut reader)?;
            decoded.blocks.push(self.emit_block());
            reader.align_32();
        }

        Ok(decoded)
    }

    fn codec_params(&self) -> &AudioCodecParameters {
        &self.params
    }

    fn reset(&mut self) {
        for window in self.overlap.iter_mut() {
            window.fill(0.0);
        }
        self.first = true;
    }
}

impl BinkAudioDecoder {
    /// Decodes one sub-block of coefficients for every internal channel, applies the inverse
    /// transform, and blends the overlap window.
    fn decode_block(&mut self, reader: &mut BitReaderRtl<'_>) -> Result<()> {
        if self.use_dct {
            reader.skip_bits(2);
        }

        for ch in 0..self.internal_channels {
            let coeffs = &mut self.coeffs[ch];

            // The first two coefficients are coded as 29-bit floats.
            coeffs[0] = read_float29(reader) * self.root;
            coeffs[1] = read_float29(reader) * self.root;

            // Per-band quantizer indices.
            let mut quants = [0f32; 25];
            for quant in quants[..self.num_bands].iter_mut() {
                let idx = (reader.read_bits(8) as usize).min(NUM_QUANTS - 1);
                *quant = self.quant_table[idx];
            }

            let mut k = 0;
            let mut q = quants[0];

            // Coefficients are coded in runs of a shared bit width.
            let mut i = 2;
            while i < self.frame_len {
                let mut j = if reader.read_bit() {
                    i + RLE_LENGTHS[reader.read_bits(4) as usize] as usize
                }
                else {
                    i + 8
                };

                j = j.min(self.frame_len);

                let width = reader.read_bits(4);

                if width == 0 {
                    coeffs[i..j].fill(0.0);
                    i = j;

                    while self.bands[k] < i {
                        q = quants[k];
                        k += 1;
                    }
                }
                else {
                    while i < j {
                        if self.bands[k] == i {
                            q = quants[k];
                            k += 1;
                        }

                        let c = reader.read_bits(width);

                        if c != 0 {
                            coeffs[i] = if reader.read_bit() {
                                -q * c as f32
                            }
                            else {
                                q * c as f32
                            };
                        }
                        else {
                            coeffs[i] = 0.0;
                        }

                        i += 1;
                    }
                }
            }

            match &mut self.transform {
                Transform::Dct(dct) => {
                    dct.dct_iii_inplace(coeffs);

                    let scale = 4.0 * self.root;
                    for sample in coeffs.iter_mut() {
                        *sample *= scale;
                    }
                }
                Transform::Rdft(rdft) => rdft.irdft_inplace(coeffs),
            }
        }

        // Blend the tail of the previous sub-block over the head of this one.
        let count = (self.overlap_len * self.internal_channels) as f32;

        for ch in 0..self.internal_channels {
            let coeffs = &mut self.coeffs[ch];

            if !self.first {
                let mut j = ch;

                for i in 0..self.overlap_len {
                    coeffs[i] = (self.overlap[ch][i] * (count - j as f32)
                        + coeffs[i] * j as f32)
                        / count;
                    j += self.internal_channels;
                }
            }

            self.overlap[ch].copy_from_slice(&coeffs[self.frame_len - self.overlap_len..]);
        }

        self.first = false;

        Ok(())
    }

    /// Splits the decoded sub-block into per-channel output planes.
    fn emit_block(&self) -> AudioBlock {
        let mut channels = Vec::new();

        if self.stride > 1 {
            // One interleaved internal stream carries all output channels.
            let samples = &self.coeffs[0][..self.block_size];

            for ch in 0..self.stride {
                channels
                    .push(samples.iter().skip(ch).step_by(self.stride).copied().collect());
            }
        }
        else {
            let len = self.block_size / self.internal_channels;

            for coeffs in self.coeffs.iter() {
                channels.push(coeffs[..len].to_vec());
            }
        }

        AudioBlock { channels }
    }
}

/// Reads a 29-bit float: a 5-bit exponent, a 23-bit mantissa, and a trailing sign bit.
fn read_float29(reader: &mut BitReaderRtl<'_>) -> f32 {
    let power = reader.read_bits(5) as i32;
    let mantissa = reader.read_bits(23) as f32;

    let value = mantissa * ((power - 23) as f32).exp2();

    if reader.read_bit() {
        -value
    }
    else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinescope_core::audio::Channels;
    use kinescope_core::codecs::AudioCodecParameters;

    /// A least-significant-bit-first writer for building test streams.
    struct BitWriter {
        bits: Vec<bool>,
    }

    impl BitWriter {
        fn new() -> BitWriter {
            BitWriter { bits: Vec::new() }
        }

        fn put(&mut self, value: u32, len: u32) {
            for i in 0..len {
                self.bits.push(value & (1 << i) != 0);
            }
        }

        fn align_32(&mut self) {
            while self.bits.len() % 32 != 0 {
                self.bits.push(false);
            }
        }

        fn finish(&self) -> Vec<u8> {
            let mut buf = vec![0u8; (self.bits.len() + 7) / 8];
            for (i, &bit) in self.bits.iter().enumerate() {
                if bit {
                    buf[i / 8] |= 1 << (i % 8);
                }
            }
            buf
        }
    }

    fn dct_params(sample_rate: u32, channels: usize) -> AudioCodecParameters {
        AudioCodecParameters::new(
            CODEC_TYPE_BINK_AUDIO_DCT,
            sample_rate,
            Channels::from_count(channels).unwrap(),
        )
    }

    fn rdft_params(sample_rate: u32, channels: usize) -> AudioCodecParameters {
        AudioCodecParameters::new(
            CODEC_TYPE_BINK_AUDIO_RDFT,
            sample_rate,
            Channels::from_count(channels).unwrap(),
        )
    }

    #[test]
    fn verify_frame_lengths() {
        let dec = BinkAudioDecoder::try_new(&dct_params(11025, 1)).unwrap();
        assert_eq!(dec.frame_len, 512);
        assert_eq!(dec.overlap_len, 32);

        let dec = BinkAudioDecoder::try_new(&dct_params(22050, 1)).unwrap();
        assert_eq!(dec.frame_len, 1024);

        let dec = BinkAudioDecoder::try_new(&dct_params(44100, 2)).unwrap();
        assert_eq!(dec.frame_len, 2048);
        assert_eq!(dec.overlap_len, 128);
        assert_eq!(dec.internal_channels, 2);
        assert_eq!(dec.block_size, 2 * (2048 - 128));
        assert_eq!(dec.stride, 1);

        // The interleaved variant folds stereo into one stream at twice the rate.
        let dec = BinkAudioDecoder::try_new(&rdft_params(22050, 2)).unwrap();
        assert_eq!(dec.frame_len, 2048);
        assert_eq!(dec.internal_channels, 1);
        assert_eq!(dec.stride, 2);
        assert_eq!(dec.block_size, 2048 - 128);
    }

    #[test]
    fn verify_band_layout() {
        let dec = BinkAudioDecoder::try_new(&dct_params(44100, 1)).unwrap();

        assert_eq!(dec.bands[0], 2);
        assert_eq!(*dec.bands.last().unwrap(), dec.frame_len);
        assert_eq!(dec.bands.len(), dec.num_bands + 1);

        // Interior band edges are even and non-decreasing.
        for pair in dec.bands.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        for &edge in &dec.bands[1..dec.num_bands] {
            assert_eq!(edge & 1, 0);
        }
    }

    #[test]
    fn verify_float29() {
        let mut writer = BitWriter::new();

        // 3 * 2^(23 - 23), positive.
        writer.put(23, 5);
        writer.put(3, 23);
        writer.put(0, 1);

        // 1 * 2^(24 - 23), negative.
        writer.put(24, 5);
        writer.put(1, 23);
        writer.put(1, 1);

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        assert_eq!(read_float29(&mut reader), 3.0);
        assert_eq!(read_float29(&mut reader), -2.0);
    }

    /// Builds one sub-block whose coefficient runs are all zero width.
    fn put_silent_block(writer: &mut BitWriter, dec: &BinkAudioDecoder) {
        if dec.use_dct {
            writer.put(0, 2);
        }

        for _ in 0..dec.internal_channels {
            // Two 29-bit floats.
            writer.put(0, 29);
            writer.put(0, 29);

            // Band quantizers.
            for _ in 0..dec.num_bands {
                writer.put(0, 8);
            }

            // Zero-width runs of eight coefficients each.
            let mut i = 2;
            while i < dec.frame_len {
                writer.put(0, 1); // short run
                writer.put(0, 4); // width 0
                i += 8;
            }
        }

        writer.align_32();
    }

    #[test]
    fn verify_silent_block_shape() {
        let params = dct_params(44100, 2);
        let mut dec = BinkAudioDecoder::try_new(&params).unwrap();

        let mut writer = BitWriter::new();
        put_silent_block(&mut writer, &dec);
        put_silent_block(&mut writer, &dec);

        let packet = Packet::new_from_boxed_slice(1, 0, 0, writer.finish().into_boxed_slice());

        let decoded = dec.decode(&packet).unwrap();

        // Two blocks, each (frame_len - overlap_len) samples per channel.
        assert_eq!(decoded.blocks.len(), 2);

        for block in &decoded.blocks {
            assert_eq!(block.channels.len(), 2);
            for plane in &block.channels {
                assert_eq!(plane.len(), 2048 - 128);
                assert!(plane.iter().all(|s| s.abs() < 1e-6));
            }
        }
    }

    #[test]
    fn verify_interleaved_stereo_split() {
        let params = rdft_params(22050, 2);
        let mut dec = BinkAudioDecoder::try_new(&params).unwrap();

        let mut writer = BitWriter::new();
        put_silent_block(&mut writer, &dec);

        let packet = Packet::new_from_boxed_slice(1, 0, 0, writer.finish().into_boxed_slice());

        let decoded = dec.decode(&packet).unwrap();

        assert_eq!(decoded.blocks.len(), 1);
        assert_eq!(decoded.blocks[0].channels.len(), 2);

        // Each output channel holds half the interleaved block.
        for plane in &decoded.blocks[0].channels {
            assert_eq!(plane.len(), (2048 - 128) / 2);
        }
    }

    #[test]
    fn verify_reset_restores_first_block_state() {
        let params = dct_params(11025, 1);
        let mut dec = BinkAudioDecoder::try_new(&params).unwrap();

        let mut writer = BitWriter::new();
        put_silent_block(&mut writer, &dec);
        let packet = Packet::new_from_boxed_slice(1, 0, 0, writer.finish().into_boxed_slice());

        let a = dec.decode(&packet).unwrap();
        assert!(!dec.first);

        dec.reset();
        assert!(dec.first);

        let b = dec.decode(&packet).unwrap();

        // Bit-exact replay after reset.
        for (x, y) in a.blocks[0].channels[0].iter().zip(&b.blocks[0].channels[0]) {
            assert_eq!(x, y);
        }
    }
}
