// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bink video decoder.

mod bundles;
mod idct;
mod tables;
mod trees;

use kinescope_core::codecs::{VideoCodecParameters, VideoDecoder, CODEC_TYPE_BINK_VIDEO};
use kinescope_core::errors::{decode_error, limit_error, unsupported_error, Result};
use kinescope_core::formats::Packet;
use kinescope_core::io::BitReaderRtl;
use kinescope_core::video::{Plane, VideoFrame};

use log::trace;

use bundles::{
    Bundles, BINK_SRC_BLOCK_TYPES, BINK_SRC_COLORS, BINK_SRC_INTER_DC, BINK_SRC_INTRA_DC,
    BINK_SRC_PATTERN, BINK_SRC_RUN, BINK_SRC_SUB_BLOCK_TYPES, BINK_SRC_X_OFF, BINK_SRC_Y_OFF,
};
use tables::{BINK_INTER_QUANT, BINK_INTRA_QUANT, BINK_PATTERNS, BINK_SCAN};

const SKIP_BLOCK: i32 = 0;
const SCALED_BLOCK: i32 = 1;
const MOTION_BLOCK: i32 = 2;
const RUN_BLOCK: i32 = 3;
const RESIDUE_BLOCK: i32 = 4;
const INTRA_BLOCK: i32 = 5;
const FILL_BLOCK: i32 = 6;
const INTER_BLOCK: i32 = 7;
const PATTERN_BLOCK: i32 = 8;
const RAW_BLOCK: i32 = 9;

/// Upper bound on a coded dimension.
const MAX_DIMENSION: u32 = 8192;

/// Geometry of one internally padded plane. Planes are padded to a whole number of 16x16
/// macroblocks so that doubled blocks never write out of bounds; the frame is cropped on output.
#[derive(Copy, Clone, Default)]
struct PlaneLayout {
    /// Coded width and height in pixels.
    width: usize,
    height: usize,
    /// Padded line size in bytes.
    stride: usize,
    /// Padded height in rows.
    rows: usize,
}

impl PlaneLayout {
    fn new(width: usize, height: usize) -> PlaneLayout {
        let blocks_w = (width + 7) / 8;
        let blocks_h = (height + 7) / 8;

        PlaneLayout {
            width,
            height,
            stride: 8 * (blocks_w + (blocks_w & 1)),
            rows: 8 * (blocks_h + (blocks_h & 1)),
        }
    }

    fn len(&self) -> usize {
        self.stride * self.rows
    }
}

/// Bink video decoder.
pub struct BinkVideoDecoder {
    params: VideoCodecParameters,
    width: u32,
    height: u32,
    sub_version: u8,
    has_alpha: bool,
    swap_planes: bool,
    grayscale: bool,
    /// Plane geometry, in Y, U, V, A order.
    layout: [PlaneLayout; 4],
    /// The frame being decoded.
    cur: [Vec<u8>; 4],
    /// The previously decoded frame.
    prev: [Vec<u8>; 4],
    bundles: Bundles,
    frame_num: u64,
}

impl BinkVideoDecoder {
    /// Decode one packet, overwriting `frame` in place. The frame is reallocated if its geometry
    /// does not match the stream.
    pub fn decode_into(&mut self, packet: &Packet, frame: &mut VideoFrame) -> Result<()> {
        let mut reader = BitReaderRtl::new(packet.buf());

        // A new frame starts as a copy of the previous frame, making skipped blocks and
        // self-referencing copies no-ops.
        for plane in 0..4 {
            self.cur[plane].copy_from_slice(&self.prev[plane]);
        }

        if self.has_alpha {
            if self.sub_version > b'd' {
                reader.skip_bits(32);
            }
            self.decode_plane(&mut reader, 3, false)?;
        }

        if self.sub_version > b'd' {
            reader.skip_bits(32);
        }

        for plane in 0..3 {
            let plane_idx = if plane == 0 || !self.swap_planes { plane } else { plane ^ 3 };

            self.decode_plane(&mut reader, plane_idx, plane != 0)?;

            if reader.bits_left() == 0 {
                break;
            }
        }

        std::mem::swap(&mut self.cur, &mut self.prev);

        self.frame_num += 1;
        trace!("bink: decoded video frame {}", self.frame_num);

        self.emit(frame);
        Ok(())
    }

    fn decode_plane(
        &mut self,
        reader: &mut BitReaderRtl<'_>,
        plane_idx: usize,
        is_chroma: bool,
    ) -> Result<()> {
        let layout = self.layout[plane_idx];
        let stride = layout.stride;

        let (bw, bh) = if is_chroma {
            ((self.width as usize + 15) / 16, (self.height as usize + 15) / 16)
        }
        else {
            ((self.width as usize + 7) / 8, (self.height as usize + 7) / 8)
        };

        self.bundles.init_lengths(layout.width.max(8), bw);
        self.bundles.read_bundles(reader);

        let bundles = &mut self.bundles;
        let cur = &mut self.cur[plane_idx];
        let prev = &self.prev[plane_idx];

        for by in 0..bh {
            bundles.read_row(reader)?;

            let mut dst = 8 * by * stride;
            let mut bx = 0;

            while bx < bw {
                let blk = bundles.get_value(BINK_SRC_BLOCK_TYPES);

                // A doubled block on an odd row is the lower half of the block decoded on the
                // row above; it occupies the slot without being coded again.
                if by & 1 == 1 && blk == SCALED_BLOCK {
                    bx += 2;
                    dst += 16;
                    continue;
                }

                match blk {
                    SKIP_BLOCK => (),
                    SCALED_BLOCK => {
                        decode_scaled_block(bundles, reader, cur, dst, stride)?;
                        bx += 1;
                        dst += 8;
                    }
                    MOTION_BLOCK => {
                        let xoff = bundles.get_value(BINK_SRC_X_OFF);
                        let yoff = bundles.get_value(BINK_SRC_Y_OFF);
                        copy_block(cur, prev, dst, stride, xoff, yoff)?;
                    }
                    RUN_BLOCK => {
                        decode_run_block(bundles, reader, cur, dst, stride)?;
                    }
                    RESIDUE_BLOCK => {
                        let xoff = bundles.get_value(BINK_SRC_X_OFF);
                        let yoff = bundles.get_value(BINK_SRC_Y_OFF);
                        copy_block(cur, prev, dst, stride, xoff, yoff)?;

                        let masks_count = reader.read_bits(7) as i32;

                        let mut block = [0i16; 64];
                        read_residue(reader, &mut block, masks_count);

                        for row in 0..8 {
                            for col in 0..8 {
                                let p = dst + row * stride + col;
                                cur[p] = (i32::from(cur[p]) + i32::from(block[8 * row + col]))
                                    as u8;
                            }
                        }
                    }
                    INTRA_BLOCK => {
                        let mut block = [0i32; 64];
                        block[0] = bundles.get_value(BINK_SRC_INTRA_DC);
                        read_dct_coeffs(reader, &mut block, &BINK_INTRA_QUANT)?;
                        idct::idct_put(cur, dst, stride, &block);
                    }
                    FILL_BLOCK => {
                        let v = bundles.get_value(BINK_SRC_COLORS) as u8;
                        for row in 0..8 {
                            cur[dst + row * stride..dst + row * stride + 8].fill(v);
                        }
                    }
                    INTER_BLOCK => {
                        let xoff = bundles.get_value(BINK_SRC_X_OFF);
                        let yoff = bundles.get_value(BINK_SRC_Y_OFF);
                        copy_block(cur, prev, dst, stride, xoff, yoff)?;

                        let mut block = [0i32; 64];
                        block[0] = bundles.get_value(BINK_SRC_INTER_DC);
                        read_dct_coeffs(reader, &mut block, &BINK_INTER_QUANT)?;
                        idct::idct_add(cur, dst, stride, &block);
                    }
                    PATTERN_BLOCK => {
                        let col0 = bundles.get_value(BINK_SRC_COLORS) as u8;
                        let col1 = bundles.get_value(BINK_SRC_COLORS) as u8;

                        for row in 0..8 {
                            let mut v = bundles.get_value(BINK_SRC_PATTERN);
                            for col in 0..8 {
                                cur[dst + row * stride + col] =
                                    if v & 1 != 0 { col1 } else { col0 };
                                v >>= 1;
                            }
                        }
                    }
                    RAW_BLOCK => {
                        let mut block = [0u8; 64];
                        bundles.get_colors_block(&mut block);

                        for row in 0..8 {
                            cur[dst + row * stride..dst + row * stride + 8]
                                .copy_from_slice(&block[8 * row..8 * row + 8]);
                        }
                    }
                    _ => return decode_error("bink: unknown block type"),
                }

                bx += 1;
                dst += 8;
            }
        }

        // The next plane's data starts at a 32-bit boundary.
        reader.align_32();

        Ok(())
    }

    /// Copies the cropped planes of the just-decoded frame into the output frame.
    fn emit(&self, frame: &mut VideoFrame) {
        if frame.width() != self.width
            || frame.height() != self.height
            || frame.has_alpha() != self.has_alpha
        {
            *frame = VideoFrame::new(self.width, self.height, self.has_alpha);
        }

        let planes = [
            (Plane::Y, 0),
            (Plane::U, 1),
            (Plane::V, 2),
            (Plane::A, 3),
        ];

        for &(out_plane, idx) in planes.iter() {
            if out_plane == Plane::A && !self.has_alpha {
                continue;
            }

            let layout = self.layout[idx];
            let src = &self.prev[idx];
            let line = frame.line_size(out_plane);
            let dst = frame.plane_mut(out_plane);

            for row in 0..layout.height {
                dst[row * line..row * line + layout.width]
                    .copy_from_slice(&src[row * layout.stride..row * layout.stride + layout.width]);
            }
        }
    }

    /// Fills the reference planes with their initial values.
    fn init_planes(&mut self) {
        for plane in 0..4 {
            // Mid-level chroma keeps grayscale output neutral before the first coded frame.
            let fill = if self.grayscale && (plane == 1 || plane == 2) { 0x80 } else { 0 };

            self.cur[plane].fill(fill);
            self.prev[plane].fill(fill);
        }
    }
}

impl VideoDecoder for BinkVideoDecoder {
    fn try_new(params: &VideoCodecParameters) -> Result<Self> {
        if params.codec != CODEC_TYPE_BINK_VIDEO {
            return unsupported_error("bink: invalid codec type");
        }

        if params.width == 0 || params.height == 0 {
            return decode_error("bink: invalid dimensions");
        }

        if params.width > MAX_DIMENSION || params.height > MAX_DIMENSION {
            return limit_error("bink: coded dimensions too large");
        }

        // The container revision and video flags ride in the extra data.
        let extra = match params.extra_data.as_deref() {
            Some(extra) if extra.len() >= 5 => extra,
            _ => return decode_error("bink: missing codec extra data"),
        };

        let sub_version = extra[0];
        let flags = u32::from_le_bytes([extra[1], extra[2], extra[3], extra[4]]);

        let has_alpha = flags & (1 << 20) != 0;
        let grayscale = flags & (1 << 17) != 0;

        let width = params.width as usize;
        let height = params.height as usize;

        let luma = PlaneLayout::new(width, height);
        let chroma = PlaneLayout::new((width + 1) / 2, (height + 1) / 2);

        let layout = [luma, chroma, chroma, luma];

        let alpha_len = if has_alpha { luma.len() } else { 0 };

        let cur = [
            vec![0u8; luma.len()],
            vec![0u8; chroma.len()],
            vec![0u8; chroma.len()],
            vec![0u8; alpha_len],
        ];
        let prev = [
            vec![0u8; luma.len()],
            vec![0u8; chroma.len()],
            vec![0u8; chroma.len()],
            vec![0u8; alpha_len],
        ];

        let blocks_w = (width + 7) / 8;
        let blocks_h = (height + 7) / 8;

        let mut decoder = BinkVideoDecoder {
            params: params.clone(),
            width: params.width,
            height: params.height,
            sub_version,
            has_alpha,
            swap_planes: sub_version > b'c',
            grayscale,
            layout,
            cur,
            prev,
            bundles: Bundles::new(blocks_w, blocks_h, sub_version < b'e'),
            frame_num: 0,
        };

        decoder.init_planes();

        Ok(decoder)
    }

    fn decode(&mut self, packet: &Packet) -> Result<VideoFrame> {
        let mut frame = VideoFrame::new(self.width, self.height, self.has_alpha);
        self.decode_into(packet, &mut frame)?;
        Ok(frame)
    }

    fn codec_params(&self) -> &VideoCodecParameters {
        &self.params
    }

    fn reset(&mut self) {
        self.init_planes();
        self.frame_num = 0;
    }
}

/// Copies an 8x8 block from the reference plane at a motion offset.
fn copy_block(
    cur: &mut [u8],
    prev: &[u8],
    dst: usize,
    stride: usize,
    xoff: i32,
    yoff: i32,
) -> Result<()> {
    let src = dst as isize + xoff as isize + yoff as isize * stride as isize;

    if src < 0 || src as usize + 7 * stride + 8 > prev.len() {
        return decode_error("bink: copy region out of bounds");
    }

    let src = src as usize;

    // The current frame starts as a copy of the reference; a zero-offset copy is settled.
    if src == dst {
        return Ok(());
    }

    for row in 0..8 {
        let (s, d) = (src + row * stride, dst + row * stride);
        cur[d..d + 8].copy_from_slice(&prev[s..s + 8]);
    }

    Ok(())
}

/// Decodes a run-coded block: a zig-zag path painted with runs of colour values.
fn decode_run_block(
    bundles: &mut Bundles,
    reader: &mut BitReaderRtl<'_>,
    cur: &mut [u8],
    dst: usize,
    stride: usize,
) -> Result<()> {
    let scan = &BINK_PATTERNS[reader.read_bits(4) as usize];

    let mut pos = 0usize;
    let mut total = 0usize;

    while total < 63 {
        let run = bundles.get_value(BINK_SRC_RUN) as usize + 1;

        total += run;
        if total > 64 {
            return decode_error("bink: run exceeds block");
        }

        if reader.read_bit() {
            let v = bundles.get_value(BINK_SRC_COLORS) as u8;
            for _ in 0..run {
                let cell = scan[pos] as usize;
                cur[dst + (cell >> 3) * stride + (cell & 7)] = v;
                pos += 1;
            }
        }
        else {
            for _ in 0..run {
                let v = bundles.get_value(BINK_SRC_COLORS) as u8;
                let cell = scan[pos] as usize;
                cur[dst + (cell >> 3) * stride + (cell & 7)] = v;
                pos += 1;
            }
        }
    }

    if total == 63 {
        let v = bundles.get_value(BINK_SRC_COLORS) as u8;
        let cell = scan[63] as usize;
        cur[dst + (cell >> 3) * stride + (cell & 7)] = v;
    }

    Ok(())
}

/// Decodes one 16x16 doubled macroblock: an 8x8 sub-block scaled 2x with nearest-neighbour
/// sampling.
fn decode_scaled_block(
    bundles: &mut Bundles,
    reader: &mut BitReaderRtl<'_>,
    cur: &mut [u8],
    dst: usize,
    stride: usize,
) -> Result<()> {
    let blk = bundles.get_value(BINK_SRC_SUB_BLOCK_TYPES);

    let mut ublock = [0u8; 64];

    match blk {
        RUN_BLOCK => {
            decode_run_block(bundles, reader, &mut ublock, 0, 8)?;
        }
        INTRA_BLOCK => {
            let mut block = [0i32; 64];
            block[0] = bundles.get_value(BINK_SRC_INTRA_DC);
            read_dct_coeffs(reader, &mut block, &BINK_INTRA_QUANT)?;
            idct::idct_put(&mut ublock, 0, 8, &block);
        }
        FILL_BLOCK => {
            let v = bundles.get_value(BINK_SRC_COLORS) as u8;
            for row in 0..16 {
                cur[dst + row * stride..dst + row * stride + 16].fill(v);
            }
            return Ok(());
        }
        PATTERN_BLOCK => {
            let col0 = bundles.get_value(BINK_SRC_COLORS) as u8;
            let col1 = bundles.get_value(BINK_SRC_COLORS) as u8;

            for row in 0..8 {
                let mut v = bundles.get_value(BINK_SRC_PATTERN);
                for col in 0..8 {
                    ublock[8 * row + col] = if v & 1 != 0 { col1 } else { col0 };
                    v >>= 1;
                }
            }
        }
        RAW_BLOCK => {
            bundles.get_colors_block(&mut ublock);
        }
        _ => return decode_error("bink: incorrect 16x16 block type"),
    }

    // Scale the 8x8 sub-block to 16x16.
    for row in 0..8 {
        for col in 0..8 {
            let v = ublock[8 * row + col];
            let p = dst + 2 * row * stride + 2 * col;

            cur[p] = v;
            cur[p + 1] = v;
            cur[p + stride] = v;
            cur[p + stride + 1] = v;
        }
    }

    Ok(())
}

/// Decodes the AC coefficients of a transform block with the bit-plane scan, then dequantizes.
///
/// The scan state is a work list of coefficient groups: mode 0 splits the top of a 16-coefficient
/// tree, mode 1 defers its three sibling groups, mode 2 visits a four-coefficient group, and mode
/// 3 is a single pending coefficient. One bit per visited entry per amplitude level selects
/// whether the entry becomes significant at that level.
fn read_dct_coeffs(
    reader: &mut BitReaderRtl<'_>,
    block: &mut [i32; 64],
    quant: &[[i32; 64]; 16],
) -> Result<()> {
    let mut coef_list = [0i32; 128];
    let mut mode_list = [0u8; 128];

    let mut list_start = 64;
    let mut list_end = 64;

    coef_list[list_end] = 4;
    mode_list[list_end] = 0;
    list_end += 1;
    coef_list[list_end] = 24;
    mode_list[list_end] = 0;
    list_end += 1;
    coef_list[list_end] = 44;
    mode_list[list_end] = 0;
    list_end += 1;
    coef_list[list_end] = 1;
    mode_list[list_end] = 3;
    list_end += 1;
    coef_list[list_end] = 2;
    mode_list[list_end] = 3;
    list_end += 1;
    coef_list[list_end] = 3;
    mode_list[list_end] = 3;
    list_end += 1;

    let mut coef_idx = [0usize; 64];
    let mut coef_count = 0usize;

    let mut bits = reader.read_bits(4) as i32 - 1;

    while bits >= 0 {
        let mut list_pos = list_start;

        while list_pos < list_end {
            if (mode_list[list_pos] == 0 && coef_list[list_pos] == 0) || !reader.read_bit() {
                list_pos += 1;
                continue;
            }

            let mut ccoef = coef_list[list_pos] as usize;
            let mode = mode_list[list_pos];

            match mode {
                0 | 2 => {
                    if mode == 0 {
                        // Split: this entry becomes the pending tail of its group.
                        coef_list[list_pos] = ccoef as i32 + 4;
                        mode_list[list_pos] = 1;
                    }
                    else {
                        coef_list[list_pos] = 0;
                        mode_list[list_pos] = 0;
                        list_pos += 1;
                    }

                    for _ in 0..4 {
                        if reader.read_bit() {
                            // Defer the coefficient to the next amplitude level.
                            list_start -= 1;
                            coef_list[list_start] = ccoef as i32;
                            mode_list[list_start] = 3;
                        }
                        else {
                            let t = if bits == 0 {
                                1 - 2 * (reader.read_bit() as i32)
                            }
                            else {
                                let v =
                                    (reader.read_bits(bits as u32) | (1 << bits)) as i32;
                                reader.apply_sign(v)
                            };

                            block[BINK_SCAN[ccoef] as usize] = t;

                            coef_idx[coef_count] = ccoef;
                            coef_count += 1;
                        }
                        ccoef += 1;
                    }
                }
                1 => {
                    mode_list[list_pos] = 2;

                    for _ in 0..3 {
                        ccoef += 4;
                        coef_list[list_end] = ccoef as i32;
                        mode_list[list_end] = 2;
                        list_end += 1;
                    }
                }
                3 => {
                    let t = if bits == 0 {
                        1 - 2 * (reader.read_bit() as i32)
                    }
                    else {
                        let v = (reader.read_bits(bits as u32) | (1 << bits)) as i32;
                        reader.apply_sign(v)
                    };

                    block[BINK_SCAN[ccoef] as usize] = t;

                    coef_idx[coef_count] = ccoef;
                    coef_count += 1;

                    coef_list[list_pos] = 0;
                    mode_list[list_pos] = 0;
                    list_pos += 1;
                }
                _ => unreachable!(),
            }
        }

        bits -= 1;
    }

    let quant_idx = reader.read_bits(4) as usize;
    let matrix = &quant[quant_idx];

    block[0] = ((i64::from(block[0]) * i64::from(matrix[0])) >> 11) as i32;

    for &idx in &coef_idx[..coef_count] {
        let pos = BINK_SCAN[idx] as usize;
        block[pos] = ((i64::from(block[pos]) * i64::from(matrix[idx])) >> 11) as i32;
    }

    Ok(())
}

/// Decodes a residue block: small corrections added onto a motion-compensated reference,
/// scanned one bit-plane at a time from the most significant amplitude bit down.
fn read_residue(reader: &mut BitReaderRtl<'_>, block: &mut [i16; 64], mut masks_count: i32) {
    let mut coef_list = [0i32; 128];
    let mut mode_list = [0u8; 128];

    let mut list_start = 64;
    let mut list_end = 64;

    coef_list[list_end] = 4;
    mode_list[list_end] = 0;
    list_end += 1;
    coef_list[list_end] = 24;
    mode_list[list_end] = 0;
    list_end += 1;
    coef_list[list_end] = 44;
    mode_list[list_end] = 0;
    list_end += 1;
    coef_list[list_end] = 0;
    mode_list[list_end] = 2;
    list_end += 1;

    let mut nz_coeff = [0usize; 64];
    let mut nz_count = 0usize;

    let mut mask = 1i32 << reader.read_bits(3);

    while mask != 0 {
        // Refine the coefficients that are already significant.
        for &pos in &nz_coeff[..nz_count] {
            if !reader.read_bit() {
                continue;
            }

            if block[pos] < 0 {
                block[pos] -= mask as i16;
            }
            else {
                block[pos] += mask as i16;
            }

            if masks_count == 0 {
                return;
            }
            masks_count -= 1;
        }

        let mut list_pos = list_start;

        while list_pos < list_end {
            if (mode_list[list_pos] == 0 && coef_list[list_pos] == 0) || !reader.read_bit() {
                list_pos += 1;
                continue;
            }

            let mut ccoef = coef_list[list_pos] as usize;
            let mode = mode_list[list_pos];

            match mode {
                0 | 2 => {
                    if mode == 0 {
                        coef_list[list_pos] = ccoef as i32 + 4;
                        mode_list[list_pos] = 1;
                    }
                    else {
                        coef_list[list_pos] = 0;
                        mode_list[list_pos] = 0;
                        list_pos += 1;
                    }

                    for _ in 0..4 {
                        if reader.read_bit() {
                            list_start -= 1;
                            coef_list[list_start] = ccoef as i32;
                            mode_list[list_start] = 3;
                        }
                        else {
                            if masks_count == 0 {
                                return;
                            }
                            masks_count -= 1;

                            let pos = BINK_SCAN[ccoef] as usize;
                            nz_coeff[nz_count] = pos;
                            nz_count += 1;

                            block[pos] = reader.apply_sign(mask) as i16;
                        }
                        ccoef += 1;
                    }
                }
                1 => {
                    mode_list[list_pos] = 2;

                    for _ in 0..3 {
                        ccoef += 4;
                        coef_list[list_end] = ccoef as i32;
                        mode_list[list_end] = 2;
                        list_end += 1;
                    }
                }
                3 => {
                    let pos = BINK_SCAN[ccoef] as usize;
                    nz_coeff[nz_count] = pos;
                    nz_count += 1;

                    block[pos] = reader.apply_sign(mask) as i16;

                    coef_list[list_pos] = 0;
                    mode_list[list_pos] = 0;
                    list_pos += 1;

                    if masks_count == 0 {
                        return;
                    }
                    masks_count -= 1;
                }
                _ => unreachable!(),
            }
        }

        mask >>= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_plane_layout_padding() {
        let layout = PlaneLayout::new(640, 352);
        assert_eq!(layout.stride, 640);
        assert_eq!(layout.rows, 352);

        // Odd block counts pad to a whole macroblock.
        let layout = PlaneLayout::new(24, 24);
        assert_eq!(layout.stride, 32);
        assert_eq!(layout.rows, 32);

        let layout = PlaneLayout::new(17, 9);
        assert_eq!(layout.stride, 32);
        assert_eq!(layout.rows, 16);
    }

    #[test]
    fn verify_copy_block_bounds() {
        let mut cur = vec![0u8; 64 * 64];
        let prev = vec![7u8; 64 * 64];

        // In-bounds copy.
        copy_block(&mut cur, &prev, 0, 64, 8, 1).unwrap();
        assert_eq!(cur[0], 7);
        assert_eq!(cur[7 * 64 + 7], 7);

        // Negative overflow.
        assert!(copy_block(&mut cur, &prev, 0, 64, -1, 0).is_err());

        // Positive overflow.
        let dst = 64 * 56 + 56;
        assert!(copy_block(&mut cur, &prev, dst, 64, 8, 1).is_err());
    }

    #[test]
    fn verify_copy_block_self_reference() {
        let mut cur = vec![0u8; 64 * 64];
        let prev = vec![9u8; 64 * 64];

        // A zero-offset copy leaves the pre-initialized pixels alone.
        copy_block(&mut cur, &prev, 128, 64, 0, 0).unwrap();
        assert!(cur.iter().all(|&p| p == 0));
    }
}
