// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Prefix-code tables and the per-plane tree state of the Bink video decoder.

use kinescope_core::io::BitReaderRtl;

use lazy_static::lazy_static;

use super::tables::BINK_TREE_LENS;

/// A direct lookup table for one of the sixteen fixed 16-symbol prefix codes.
///
/// A lookup with `max_len` peeked bits yields the decoded symbol and its code length in a single
/// step.
pub struct Codebook {
    /// The longest code length in the table, in bits.
    max_len: u32,
    /// `(symbol, length)` for every `max_len`-bit word.
    lut: Vec<(u8, u8)>,
}

impl Codebook {
    /// Decode one symbol from the bit stream.
    #[inline(always)]
    pub fn decode(&self, reader: &mut BitReaderRtl<'_>) -> u8 {
        let (symbol, len) = self.lut[reader.peek_bits(self.max_len) as usize];
        reader.skip_bits(u32::from(len));
        symbol
    }
}

/// Builds the lookup table of one code table from its sorted code lengths.
///
/// Code words are assigned canonically in the read domain: the symbols of each length group take
/// the numerically smallest available words in ascending order, so the all-4-bit table 0 decodes
/// a peeked word to itself.
fn build_codebook(lens: &[u8; 16]) -> Codebook {
    let max_len = u32::from(lens[15]);

    // Canonical code assignment over the sorted lengths.
    let mut msb_codes = [0u32; 16];
    let mut code = 0u32;

    for i in 0..16 {
        msb_codes[i] = code;
        code += 1;
        if i < 15 {
            code <<= lens[i + 1] - lens[i];
        }
    }

    // Reverse each code into the least-significant-bit-first read domain, then hand the words of
    // each length group to its symbols in ascending numeric order.
    let mut read_codes = [0u32; 16];

    let mut i = 0;
    while i < 16 {
        let len = lens[i];

        let mut j = i;
        while j < 16 && lens[j] == len {
            j += 1;
        }

        let mut group: Vec<u32> =
            (i..j).map(|k| msb_codes[k].reverse_bits() >> (32 - u32::from(len))).collect();
        group.sort_unstable();

        read_codes[i..j].copy_from_slice(&group);
        i = j;
    }

    // Populate the direct lookup table. Every word with a code as its low bits maps to that
    // code's symbol.
    let mut lut = vec![(0u8, 0u8); 1 << max_len];

    for sym in 0..16 {
        let len = u32::from(lens[sym]);
        let code = read_codes[sym];

        let mut fill = 0u32;
        while fill < (1 << (max_len - len)) {
            lut[(code | (fill << len)) as usize] = (sym as u8, len as u8);
            fill += 1;
        }
    }

    debug_assert!(lut.iter().all(|&(_, len)| len > 0));

    Codebook { max_len, lut }
}

lazy_static! {
    /// The sixteen fixed prefix-code tables.
    pub static ref BINK_TREES: Vec<Codebook> =
        BINK_TREE_LENS.iter().map(build_codebook).collect();
}

/// A `Tree` binds one of the sixteen fixed code tables to a shuffled symbol map.
#[derive(Copy, Clone)]
pub struct Tree {
    /// Index of the fixed code table.
    pub vlc_num: usize,
    /// Maps decoded symbols to final values.
    pub syms: [u8; 16],
}

impl Default for Tree {
    fn default() -> Tree {
        Tree { vlc_num: 0, syms: IDENTITY }
    }
}

const IDENTITY: [u8; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

impl Tree {
    /// Decode one value from the bit stream.
    #[inline(always)]
    pub fn get(&self, reader: &mut BitReaderRtl<'_>) -> u8 {
        self.syms[BINK_TREES[self.vlc_num].decode(reader) as usize]
    }
}

/// Reads the code table selector and symbol shuffle of one tree.
pub fn read_tree(reader: &mut BitReaderRtl<'_>, tree: &mut Tree) {
    tree.vlc_num = reader.read_bits(4) as usize;

    if tree.vlc_num == 0 {
        tree.syms = IDENTITY;
        return;
    }

    if reader.read_bit() {
        // Order mode: an explicit prefix of symbols, the remainder appended in ascending order.
        let len = reader.read_bits(3) as usize;

        let mut present = [false; 16];

        for i in 0..=len {
            let sym = reader.read_bits(4) as u8;
            tree.syms[i] = sym;
            present[sym as usize] = true;
        }

        let mut idx = len + 1;

        for sym in 0..16u8 {
            if idx >= 16 {
                break;
            }
            if !present[sym as usize] {
                tree.syms[idx] = sym;
                idx += 1;
            }
        }
    }
    else {
        // Shuffle mode: merge passes over power-of-two blocks.
        let depth = reader.read_bits(2);

        let mut tmp1 = IDENTITY;
        let mut tmp2 = [0u8; 16];

        for level in 0..=depth {
            let size = 1 << level;

            let mut t = 0;
            while t < 16 {
                merge(reader, &mut tmp2[t..t + 2 * size], &tmp1[t..t + 2 * size], size);
                t += 2 * size;
            }

            std::mem::swap(&mut tmp1, &mut tmp2);
        }

        tree.syms = tmp1;
    }
}

/// Merges two adjacent runs of `size` values, choosing the source of each output value with one
/// bit until either run is exhausted.
fn merge(reader: &mut BitReaderRtl<'_>, dst: &mut [u8], src: &[u8], size: usize) {
    let mut i = 0;
    let mut j = size;
    let mut out = 0;

    while i < size && j < 2 * size {
        if !reader.read_bit() {
            dst[out] = src[i];
            i += 1;
        }
        else {
            dst[out] = src[j];
            j += 1;
        }
        out += 1;
    }

    while i < size {
        dst[out] = src[i];
        i += 1;
        out += 1;
    }

    while j < 2 * size {
        dst[out] = src[j];
        j += 1;
        out += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinescope_core::io::BitReaderRtl;

    #[test]
    fn verify_codebooks_are_exhaustive() {
        for (i, codebook) in BINK_TREES.iter().enumerate() {
            assert_eq!(codebook.lut.len(), 1 << codebook.max_len, "table {}", i);

            // Every word decodes to some symbol with a non-zero length.
            let mut seen = [false; 16];

            for &(sym, len) in &codebook.lut {
                assert!(len > 0, "table {}", i);
                assert_eq!(u32::from(BINK_TREE_LENS[i][sym as usize]), u32::from(len));
                seen[sym as usize] = true;
            }

            assert!(seen.iter().all(|&s| s), "table {} misses symbols", i);
        }
    }

    #[test]
    fn verify_flat_table_is_identity() {
        // Table 0 is the flat 4-bit code; a decoded symbol equals the peeked word.
        for value in 0..16u8 {
            let buf = [value, 0];
            let mut reader = BitReaderRtl::new(&buf);

            assert_eq!(BINK_TREES[0].decode(&mut reader), value);
            assert_eq!(reader.pos(), 4);
        }
    }

    #[test]
    fn verify_decode_is_deterministic() {
        for num in 0..16 {
            let buf = [0x5a, 0xc3, 0x99, 0x0f];

            let mut r1 = BitReaderRtl::new(&buf);
            let mut r2 = BitReaderRtl::new(&buf);

            for _ in 0..3 {
                assert_eq!(BINK_TREES[num].decode(&mut r1), BINK_TREES[num].decode(&mut r2));
                assert_eq!(r1.pos(), r2.pos());
            }
        }
    }

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

    #[test]
    fn verify_read_tree_identity() {
        let mut writer = BitWriter::new();
        writer.put(0, 4);

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        let mut tree = Tree::default();
        read_tree(&mut reader, &mut tree);

        assert_eq!(tree.vlc_num, 0);
        assert_eq!(tree.syms, IDENTITY);
    }

    #[test]
    fn verify_read_tree_order_mode() {
        let mut writer = BitWriter::new();
        writer.put(3, 4); // table 3
        writer.put(1, 1); // order mode
        writer.put(2, 3); // three explicit symbols
        writer.put(9, 4);
        writer.put(0, 4);
        writer.put(15, 4);

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        let mut tree = Tree::default();
        read_tree(&mut reader, &mut tree);

        assert_eq!(tree.vlc_num, 3);
        assert_eq!(tree.syms, [9, 0, 15, 1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 12, 13, 14]);
    }

    #[test]
    fn verify_read_tree_shuffle_mode() {
        // A single merge pass over pairs, always draining the second block first.
        let mut writer = BitWriter::new();
        writer.put(5, 4); // table 5
        writer.put(0, 1); // shuffle mode
        writer.put(0, 2); // one pass
        for _ in 0..8 {
            writer.put(1, 1); // take from block B; block A then drains without bits
        }

        let buf = writer.finish();
        let mut reader = BitReaderRtl::new(&buf);

        let mut tree = Tree::default();
        read_tree(&mut reader, &mut tree);

        assert_eq!(tree.vlc_num, 5);
        assert_eq!(tree.syms, [1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13, 12, 15, 14]);
    }
}
