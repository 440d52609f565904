// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The nine per-plane parameter streams ("bundles") of the Bink video decoder.
//!
//! Each block row of a plane prepends one batch of values per bundle, decoded ahead of the block
//! handlers that consume them. A batch may cover more than one row; a bundle only reads a new
//! batch once its buffered values have been consumed.

use kinescope_core::errors::{decode_error, Result};
use kinescope_core::io::BitReaderRtl;

use super::tables::BINK_RLELENS;
use super::trees::{read_tree, Tree};

pub const BINK_SRC_BLOCK_TYPES: usize = 0;
pub const BINK_SRC_SUB_BLOCK_TYPES: usize = 1;
pub const BINK_SRC_COLORS: usize = 2;
pub const BINK_SRC_PATTERN: usize = 3;
pub const BINK_SRC_X_OFF: usize = 4;
pub const BINK_SRC_Y_OFF: usize = 5;
pub const BINK_SRC_INTRA_DC: usize = 6;
pub const BINK_SRC_INTER_DC: usize = 7;
pub const BINK_SRC_RUN: usize = 8;

pub const BINK_NB_SRC: usize = 9;

/// Number of bits of the leading absolute value of a DC stream.
const DC_START_BITS: u32 = 11;

/// One parameter stream. `data[..cur_dec]` holds decoded values, `cur_ptr` the consumption
/// position. A batch read is only permitted while `cur_dec == cur_ptr`; a decoded batch that
/// runs ahead of consumption defers further reads.
struct Bundle {
    tree: Tree,
    /// Bit width of a batch length.
    len: u32,
    data: Box<[i16]>,
    cur_dec: usize,
    cur_ptr: usize,
    /// A zero-length batch ends the stream for the remainder of the plane.
    done: bool,
}

impl Bundle {
    fn new(capacity: usize) -> Bundle {
        Bundle {
            tree: Tree::default(),
            len: 0,
            data: vec![0i16; capacity].into_boxed_slice(),
            cur_dec: 0,
            cur_ptr: 0,
            done: false,
        }
    }

    /// Reads the length of the next batch, or 0 if no new batch should be decoded.
    fn read_len(&mut self, reader: &mut BitReaderRtl<'_>) -> usize {
        if self.done || self.cur_dec > self.cur_ptr {
            return 0;
        }

        let count = reader.read_bits(self.len) as usize;

        if count == 0 {
            self.done = true;
        }

        count
    }

    /// Reserves space for a batch of `count` values.
    fn reserve(&self, count: usize) -> Result<usize> {
        if self.cur_dec + count > self.data.len() {
            return decode_error("bink: too many values in bundle");
        }
        Ok(self.cur_dec + count)
    }

    fn push(&mut self, value: i16) {
        self.data[self.cur_dec] = value;
        self.cur_dec += 1;
    }

    fn fill(&mut self, value: i16, count: usize) {
        self.data[self.cur_dec..self.cur_dec + count].fill(value);
        self.cur_dec += count;
    }
}

/// The bundle set of a video decoder, including the auxiliary high-nibble colour trees.
pub struct Bundles {
    bundles: [Bundle; BINK_NB_SRC],
    /// The sixteen high-nibble colour trees, selected by the previous high nibble.
    col_high: [Tree; 16],
    /// The previous colour high nibble.
    col_lastval: usize,
    /// Remap colour values as centred signed magnitudes.
    color_remap: bool,
}

impl Bundles {
    /// Allocates bundle storage for a plane of `blocks_w` x `blocks_h` 8x8 blocks.
    ///
    /// `color_remap` selects the symmetric colour remapping of early container revisions.
    pub fn new(blocks_w: usize, blocks_h: usize, color_remap: bool) -> Bundles {
        let blocks = blocks_w * blocks_h;

        // Structural upper bounds on the values a plane can consume per stream.
        let capacity = |per_block: usize| blocks * per_block + 64;

        Bundles {
            bundles: [
                Bundle::new(capacity(1)),
                Bundle::new(capacity(1)),
                Bundle::new(capacity(64)),
                Bundle::new(capacity(8)),
                Bundle::new(capacity(1)),
                Bundle::new(capacity(1)),
                Bundle::new(capacity(1)),
                Bundle::new(capacity(1)),
                Bundle::new(capacity(48)),
            ],
            col_high: [Tree::default(); 16],
            col_lastval: 0,
            color_remap,
        }
    }

    /// Computes the batch-length bit widths for a plane of the given pixel width and block width.
    pub fn init_lengths(&mut self, width: usize, bw: usize) {
        let bits = |estimate: usize| (usize::BITS - estimate.leading_zeros()) as u32;

        let block_estimate = bits((width + 7) / 8 + 511);

        self.bundles[BINK_SRC_BLOCK_TYPES].len = block_estimate;
        self.bundles[BINK_SRC_SUB_BLOCK_TYPES].len = bits(((width + 7) / 8 + 1) / 2 + 511);
        self.bundles[BINK_SRC_COLORS].len = bits(bw * 64 + 511);
        self.bundles[BINK_SRC_PATTERN].len = bits(bw * 8 + 511);
        self.bundles[BINK_SRC_X_OFF].len = block_estimate;
        self.bundles[BINK_SRC_Y_OFF].len = block_estimate;
        self.bundles[BINK_SRC_INTRA_DC].len = block_estimate;
        self.bundles[BINK_SRC_INTER_DC].len = block_estimate;
        self.bundles[BINK_SRC_RUN].len = bits(bw * 48 + 511);
    }

    /// Reads the tree descriptors of all bundles at the start of a plane and rewinds the value
    /// arenas.
    pub fn read_bundles(&mut self, reader: &mut BitReaderRtl<'_>) {
        for i in 0..BINK_NB_SRC {
            if i == BINK_SRC_COLORS {
                for tree in self.col_high.iter_mut() {
                    read_tree(reader, tree);
                }
                self.col_lastval = 0;
            }

            if i != BINK_SRC_INTRA_DC && i != BINK_SRC_INTER_DC {
                read_tree(reader, &mut self.bundles[i].tree);
            }

            self.bundles[i].cur_dec = 0;
            self.bundles[i].cur_ptr = 0;
            self.bundles[i].done = false;
        }
    }

    /// Decodes one batch per bundle ahead of a block row.
    pub fn read_row(&mut self, reader: &mut BitReaderRtl<'_>) -> Result<()> {
        self.read_block_types(reader, BINK_SRC_BLOCK_TYPES)?;
        self.read_block_types(reader, BINK_SRC_SUB_BLOCK_TYPES)?;
        self.read_colors(reader)?;
        self.read_patterns(reader)?;
        self.read_motion_values(reader, BINK_SRC_X_OFF)?;
        self.read_motion_values(reader, BINK_SRC_Y_OFF)?;
        self.read_dcs(reader, BINK_SRC_INTRA_DC, false)?;
        self.read_dcs(reader, BINK_SRC_INTER_DC, true)?;
        self.read_runs(reader)?;
        Ok(())
    }

    /// Consumes the next value of a bundle.
    #[inline(always)]
    pub fn get_value(&mut self, source: usize) -> i32 {
        let bundle = &mut self.bundles[source];

        // A malformed stream may starve a bundle; reads past the decoded region are zero.
        let value = bundle.data.get(bundle.cur_ptr).copied().unwrap_or(0);
        bundle.cur_ptr += 1;

        i32::from(value)
    }

    /// Consumes 64 colour values as an 8x8 raster block.
    pub fn get_colors_block(&mut self, out: &mut [u8; 64]) {
        let bundle = &mut self.bundles[BINK_SRC_COLORS];

        for (dst, src) in
            out.iter_mut().zip(bundle.data.iter().skip(bundle.cur_ptr).take(64))
        {
            *dst = *src as u8;
        }
        bundle.cur_ptr += 64;
    }

    fn read_block_types(&mut self, reader: &mut BitReaderRtl<'_>, source: usize) -> Result<()> {
        let bundle = &mut self.bundles[source];

        let count = bundle.read_len(reader);
        if count == 0 {
            return Ok(());
        }

        let dec_end = bundle.reserve(count)?;

        if reader.read_bit() {
            let v = reader.read_bits(4) as i16;
            bundle.fill(v, count);
        }
        else {
            let mut last = 0i16;

            while bundle.cur_dec < dec_end {
                let v = bundle.tree.get(reader);

                if v < 12 {
                    last = i16::from(v);
                    bundle.push(last);
                }
                else {
                    let run = usize::from(BINK_RLELENS[usize::from(v) - 12]);

                    if dec_end - bundle.cur_dec < run {
                        return decode_error("bink: run exceeds coded row");
                    }

                    bundle.fill(last, run);
                }
            }
        }

        Ok(())
    }

    fn read_colors(&mut self, reader: &mut BitReaderRtl<'_>) -> Result<()> {
        let count = self.bundles[BINK_SRC_COLORS].read_len(reader);
        if count == 0 {
            return Ok(());
        }

        let dec_end = self.bundles[BINK_SRC_COLORS].reserve(count)?;

        if reader.read_bit() {
            let v = self.read_color(reader);
            self.bundles[BINK_SRC_COLORS].fill(v, count);
        }
        else {
            while self.bundles[BINK_SRC_COLORS].cur_dec < dec_end {
                let v = self.read_color(reader);
                self.bundles[BINK_SRC_COLORS].push(v);
            }
        }

        Ok(())
    }

    fn read_color(&mut self, reader: &mut BitReaderRtl<'_>) -> i16 {
        self.col_lastval = usize::from(self.col_high[self.col_lastval].get(reader));

        let low = self.bundles[BINK_SRC_COLORS].tree.get(reader);
        let v = ((self.col_lastval as u32) << 4) | u32::from(low);

        if self.color_remap {
            let v = if v > 127 { 256 - v } else { v + 128 };
            v as i16
        }
        else {
            v as i16
        }
    }

    fn read_patterns(&mut self, reader: &mut BitReaderRtl<'_>) -> Result<()> {
        let bundle = &mut self.bundles[BINK_SRC_PATTERN];

        let count = bundle.read_len(reader);
        if count == 0 {
            return Ok(());
        }

        let dec_end = bundle.reserve(count)?;

        while bundle.cur_dec < dec_end {
            let low = bundle.tree.get(reader);
            let high = bundle.tree.get(reader);
            bundle.push(i16::from(low) | (i16::from(high) << 4));
        }

        Ok(())
    }

    fn read_motion_values(&mut self, reader: &mut BitReaderRtl<'_>, source: usize) -> Result<()> {
        let bundle = &mut self.bundles[source];

        let count = bundle.read_len(reader);
        if count == 0 {
            return Ok(());
        }

        let dec_end = bundle.reserve(count)?;

        if reader.read_bit() {
            let mut v = reader.read_bits(4) as i32;
            if v != 0 {
                v = reader.apply_sign(v);
            }
            bundle.fill(v as i16, count);
        }
        else {
            while bundle.cur_dec < dec_end {
                let mut v = i32::from(bundle.tree.get(reader));
                if v != 0 {
                    v = reader.apply_sign(v);
                }
                bundle.push(v as i16);
            }
        }

        Ok(())
    }

    fn read_dcs(&mut self, reader: &mut BitReaderRtl<'_>, source: usize, has_sign: bool) -> Result<()> {
        let bundle = &mut self.bundles[source];

        let count = bundle.read_len(reader);
        if count == 0 {
            return Ok(());
        }

        let dec_end = bundle.reserve(count)?;

        let start_bits = if has_sign { DC_START_BITS - 1 } else { DC_START_BITS };

        let mut v = reader.read_bits(start_bits) as i32;
        if v != 0 && has_sign {
            v = reader.apply_sign(v);
        }

        bundle.push(v as i16);

        // Remaining values are coded as groups of up-to 8 deltas of a shared bit width.
        while bundle.cur_dec < dec_end {
            let group = (dec_end - bundle.cur_dec).min(8);
            let bsize = reader.read_bits(4);

            if bsize != 0 {
                for _ in 0..group {
                    let mut delta = reader.read_bits(bsize) as i32;
                    if delta != 0 {
                        delta = reader.apply_sign(delta);
                    }

                    v += delta;

                    if v < i32::from(i16::MIN) || v > i32::from(i16::MAX) {
                        return decode_error("bink: dc value out of range");
                    }

                    bundle.push(v as i16);
                }
            }
            else {
                bundle.fill(v as i16, group);
            }
        }

        Ok(())
    }

    fn read_runs(&mut self, reader: &mut BitReaderRtl<'_>) -> Result<()> {
        let bundle = &mut self.bundles[BINK_SRC_RUN];

        let count = bundle.read_len(reader);
        if count == 0 {
            return Ok(());
        }

        let dec_end = bundle.reserve(count)?;

        if reader.read_bit() {
            let v = reader.read_bits(4) as i16;
            bundle.fill(v, count);
        }
        else {
            while bundle.cur_dec < dec_end {
                bundle.push(i16::from(bundle.tree.get(reader)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinescope_core::io::BitReaderRtl;

    /// A least-significant-bit-first writer for building test streams.
    pub struct BitWriter {
        bits: Vec<bool>,
    }

    impl BitWriter {
        pub fn new() -> BitWriter {
            BitWriter { bits: Vec::new() }
        }

        pub fn put(&mut self, value: u32, len: u32) {
            for i in 0..len {
                self.bits.push(value & (1 << i) != 0);
            }
        }

        pub fn finish(&self) -> Vec<u8> {
            let mut buf = vec![0u8; (self.bits.len() + 7) / 8];
            for (i, &bit) in self.bits.iter().enumerate() {
                if bit {
                    buf[i / 8] |= 1 << (i % 8);
                }
            }
            buf
        }
    }

    fn make_bundles() -> Bundles {
        let mut bundles = Bundles::new(4, 4, false);
        bundles.init_lengths(32, 4);
        bundles
    }

    /// Identity trees for all bundles, without consuming bits.
    fn identity_trees(bundles: &mut Bundles) {
        for i in 0..BINK_NB_SRC {
            bundles.bundles[i].cur_dec = 0;
            bundles.bundles[i].cur_ptr = 0;
            bundles.bundles[i].done = false;
        }
    }

    #[test]
    fn verify_block_types_fill_mode() {
        let mut bundles = make_bundles();
        identity_trees(&mut bundles);

        let len = bundles.bundles[BINK_SRC_BLOCK_TYPES].len;

        let mut writer = BitWriter::new();
        writer.put(5, len); // batch of five
        writer.put(1, 1); // fill mode
        writer.put(3, 4); // value

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        bundles.read_block_types(&mut reader, BINK_SRC_BLOCK_TYPES).unwrap();

        for _ in 0..5 {
            assert_eq!(bundles.get_value(BINK_SRC_BLOCK_TYPES), 3);
        }
    }

    #[test]
    fn verify_block_types_run_expansion() {
        let mut bundles = make_bundles();
        identity_trees(&mut bundles);

        let len = bundles.bundles[BINK_SRC_BLOCK_TYPES].len;

        let mut writer = BitWriter::new();
        writer.put(6, len); // batch of six
        writer.put(0, 1); // per-symbol mode
        writer.put(2, 4); // literal 2, remembered
        writer.put(12, 4); // repeat the previous value four times
        writer.put(7, 4); // literal 7

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        bundles.read_block_types(&mut reader, BINK_SRC_BLOCK_TYPES).unwrap();

        let values: Vec<i32> =
            (0..6).map(|_| bundles.get_value(BINK_SRC_BLOCK_TYPES)).collect();
        assert_eq!(values, [2, 2, 2, 2, 2, 7]);
    }

    #[test]
    fn verify_batch_deferral() {
        // A batch larger than one row defers the next read until it is consumed.
        let mut bundles = make_bundles();
        identity_trees(&mut bundles);

        let len = bundles.bundles[BINK_SRC_BLOCK_TYPES].len;

        let mut writer = BitWriter::new();
        writer.put(8, len);
        writer.put(1, 1);
        writer.put(1, 4);

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        bundles.read_block_types(&mut reader, BINK_SRC_BLOCK_TYPES).unwrap();
        let after_first = reader.pos();

        // Consume half the batch; the next row read must not touch the reader.
        for _ in 0..4 {
            bundles.get_value(BINK_SRC_BLOCK_TYPES);
        }

        bundles.read_block_types(&mut reader, BINK_SRC_BLOCK_TYPES).unwrap();
        assert_eq!(reader.pos(), after_first);

        // Fully consumed; a new batch read is permitted again.
        for _ in 0..4 {
            bundles.get_value(BINK_SRC_BLOCK_TYPES);
        }

        bundles.read_block_types(&mut reader, BINK_SRC_BLOCK_TYPES).unwrap();
        assert!(reader.pos() > after_first);
    }

    #[test]
    fn verify_zero_batch_ends_stream() {
        let mut bundles = make_bundles();
        identity_trees(&mut bundles);

        let len = bundles.bundles[BINK_SRC_RUN].len;

        let mut writer = BitWriter::new();
        writer.put(0, len);
        writer.put(0xffff, 16);

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        bundles.read_runs(&mut reader).unwrap();
        assert_eq!(reader.pos() as u32, len);

        // Once ended, later rows read nothing.
        bundles.read_runs(&mut reader).unwrap();
        assert_eq!(reader.pos() as u32, len);
    }

    #[test]
    fn verify_motion_values_signed() {
        let mut bundles = make_bundles();
        identity_trees(&mut bundles);

        let len = bundles.bundles[BINK_SRC_X_OFF].len;

        let mut writer = BitWriter::new();
        writer.put(2, len);
        writer.put(1, 1); // fill mode
        writer.put(6, 4); // magnitude
        writer.put(1, 1); // negative

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        bundles.read_motion_values(&mut reader, BINK_SRC_X_OFF).unwrap();

        assert_eq!(bundles.get_value(BINK_SRC_X_OFF), -6);
        assert_eq!(bundles.get_value(BINK_SRC_X_OFF), -6);
    }

    #[test]
    fn verify_dcs_delta_groups() {
        let mut bundles = make_bundles();
        identity_trees(&mut bundles);

        let len = bundles.bundles[BINK_SRC_INTRA_DC].len;

        let mut writer = BitWriter::new();
        writer.put(3, len);
        writer.put(100, 11); // start value
        writer.put(3, 4); // group delta width
        writer.put(5, 3); // +5
        writer.put(0, 1);
        writer.put(2, 3); // -2
        writer.put(1, 1);

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        bundles.read_dcs(&mut reader, BINK_SRC_INTRA_DC, false).unwrap();

        assert_eq!(bundles.get_value(BINK_SRC_INTRA_DC), 100);
        assert_eq!(bundles.get_value(BINK_SRC_INTRA_DC), 105);
        assert_eq!(bundles.get_value(BINK_SRC_INTRA_DC), 103);
    }

    #[test]
    fn verify_colors_remap() {
        // Revision 'd' containers remap colour bytes as centred signed magnitudes.
        let mut bundles = Bundles::new(4, 4, true);
        bundles.init_lengths(32, 4);
        identity_trees(&mut bundles);

        let len = bundles.bundles[BINK_SRC_COLORS].len;

        let mut writer = BitWriter::new();
        writer.put(1, len);
        writer.put(1, 1); // fill mode
        writer.put(9, 4); // high nibble, via the identity high tree
        writer.put(2, 4); // low nibble
        // 0x92 = 146 > 127, remaps to 256 - 146 = 110.

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        bundles.read_colors(&mut reader).unwrap();
        assert_eq!(bundles.get_value(BINK_SRC_COLORS), 110);

        // The high nibble becomes the context of the next colour.
        assert_eq!(bundles.col_lastval, 9);
    }
}
