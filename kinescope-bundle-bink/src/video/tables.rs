// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static tables for the Bink video decoder.

use std::f64::consts::{PI, SQRT_2};

use lazy_static::lazy_static;

/// Run lengths for the repeat symbols 12 through 15 of a value stream.
pub const BINK_RLELENS: [u8; 4] = [4, 8, 12, 32];

/// Coefficient scan order. `BINK_SCAN[i]` is the raster position, `row * 8 + col`, of scan
/// index `i`. Coefficients are scanned in 2x2 clusters.
#[rustfmt::skip]
pub const BINK_SCAN: [u8; 64] = [
    0x00, 0x01, 0x08, 0x09, 0x02, 0x03, 0x0a, 0x0b,
    0x10, 0x11, 0x18, 0x19, 0x12, 0x13, 0x1a, 0x1b,
    0x04, 0x05, 0x0c, 0x0d, 0x06, 0x07, 0x0e, 0x0f,
    0x14, 0x15, 0x1c, 0x1d, 0x16, 0x17, 0x1e, 0x1f,
    0x20, 0x21, 0x28, 0x29, 0x22, 0x23, 0x2a, 0x2b,
    0x30, 0x31, 0x38, 0x39, 0x32, 0x33, 0x3a, 0x3b,
    0x24, 0x25, 0x2c, 0x2d, 0x26, 0x27, 0x2e, 0x2f,
    0x34, 0x35, 0x3c, 0x3d, 0x36, 0x37, 0x3e, 0x3f,
];

/// Code lengths of the sixteen fixed prefix-code tables. Each table codes the symbols 0 through
/// 15; the sixteenth length of a table is also the table's maximum code length.
#[rustfmt::skip]
pub const BINK_TREE_LENS: [[u8; 16]; 16] = [
    [ 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4 ],
    [ 1, 4, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5 ],
    [ 1, 2, 5, 5, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6 ],
    [ 1, 2, 3, 5, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7 ],
    [ 1, 2, 4, 4, 5, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8, 8 ],
    [ 2, 2, 3, 4, 4, 5, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6 ],
    [ 2, 3, 3, 3, 4, 4, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6 ],
    [ 3, 3, 3, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5, 6, 6 ],
    [ 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5 ],
    [ 3, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5 ],
    [ 3, 3, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5 ],
    [ 2, 4, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5, 5, 5 ],
    [ 2, 3, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5 ],
    [ 1, 3, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6, 6, 6 ],
    [ 1, 2, 4, 5, 5, 6, 6, 6, 6, 6, 7, 7, 7, 7, 7, 7 ],
    [ 2, 2, 3, 3, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6, 6, 6 ],
];

/// The sixteen zig-zag fill paths of a run-coded block. Each path visits every cell of an 8x8
/// block once; a value encodes a cell as `row * 8 + col`.
#[rustfmt::skip]
pub const BINK_PATTERNS: [[u8; 64]; 16] = [
    // Column serpentine.
    [
        0x00, 0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38,
        0x39, 0x31, 0x29, 0x21, 0x19, 0x11, 0x09, 0x01,
        0x02, 0x0a, 0x12, 0x1a, 0x22, 0x2a, 0x32, 0x3a,
        0x3b, 0x33, 0x2b, 0x23, 0x1b, 0x13, 0x0b, 0x03,
        0x04, 0x0c, 0x14, 0x1c, 0x24, 0x2c, 0x34, 0x3c,
        0x3d, 0x35, 0x2d, 0x25, 0x1d, 0x15, 0x0d, 0x05,
        0x06, 0x0e, 0x16, 0x1e, 0x26, 0x2e, 0x36, 0x3e,
        0x3f, 0x37, 0x2f, 0x27, 0x1f, 0x17, 0x0f, 0x07,
    ],
    // Row serpentine.
    [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        0x0f, 0x0e, 0x0d, 0x0c, 0x0b, 0x0a, 0x09, 0x08,
        0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17,
        0x1f, 0x1e, 0x1d, 0x1c, 0x1b, 0x1a, 0x19, 0x18,
        0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27,
        0x2f, 0x2e, 0x2d, 0x2c, 0x2b, 0x2a, 0x29, 0x28,
        0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37,
        0x3f, 0x3e, 0x3d, 0x3c, 0x3b, 0x3a, 0x39, 0x38,
    ],
    // Diagonal zig-zag.
    [
        0x00, 0x01, 0x08, 0x10, 0x09, 0x02, 0x03, 0x0a,
        0x11, 0x18, 0x20, 0x19, 0x12, 0x0b, 0x04, 0x05,
        0x0c, 0x13, 0x1a, 0x21, 0x28, 0x30, 0x29, 0x22,
        0x1b, 0x14, 0x0d, 0x06, 0x07, 0x0e, 0x15, 0x1c,
        0x23, 0x2a, 0x31, 0x38, 0x39, 0x32, 0x2b, 0x24,
        0x1d, 0x16, 0x0f, 0x17, 0x1e, 0x25, 0x2c, 0x33,
        0x3a, 0x3b, 0x34, 0x2d, 0x26, 0x1f, 0x27, 0x2e,
        0x35, 0x3c, 0x3d, 0x36, 0x2f, 0x37, 0x3e, 0x3f,
    ],
    // Even rows, then odd rows.
    [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17,
        0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27,
        0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37,
        0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
        0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f,
        0x28, 0x29, 0x2a, 0x2b, 0x2c, 0x2d, 0x2e, 0x2f,
        0x38, 0x39, 0x3a, 0x3b, 0x3c, 0x3d, 0x3e, 0x3f,
    ],
    // 2x2 clusters, as the coefficient scan.
    [
        0x00, 0x01, 0x08, 0x09, 0x02, 0x03, 0x0a, 0x0b,
        0x10, 0x11, 0x18, 0x19, 0x12, 0x13, 0x1a, 0x1b,
        0x04, 0x05, 0x0c, 0x0d, 0x06, 0x07, 0x0e, 0x0f,
        0x14, 0x15, 0x1c, 0x1d, 0x16, 0x17, 0x1e, 0x1f,
        0x20, 0x21, 0x28, 0x29, 0x22, 0x23, 0x2a, 0x2b,
        0x30, 0x31, 0x38, 0x39, 0x32, 0x33, 0x3a, 0x3b,
        0x24, 0x25, 0x2c, 0x2d, 0x26, 0x27, 0x2e, 0x2f,
        0x34, 0x35, 0x3c, 0x3d, 0x36, 0x37, 0x3e, 0x3f,
    ],
    // 4x4 quadrants in raster order.
    [
        0x00, 0x01, 0x02, 0x03, 0x08, 0x09, 0x0a, 0x0b,
        0x10, 0x11, 0x12, 0x13, 0x18, 0x19, 0x1a, 0x1b,
        0x04, 0x05, 0x06, 0x07, 0x0c, 0x0d, 0x0e, 0x0f,
        0x14, 0x15, 0x16, 0x17, 0x1c, 0x1d, 0x1e, 0x1f,
        0x20, 0x21, 0x22, 0x23, 0x28, 0x29, 0x2a, 0x2b,
        0x30, 0x31, 0x32, 0x33, 0x38, 0x39, 0x3a, 0x3b,
        0x24, 0x25, 0x26, 0x27, 0x2c, 0x2d, 0x2e, 0x2f,
        0x34, 0x35, 0x36, 0x37, 0x3c, 0x3d, 0x3e, 0x3f,
    ],
    // Clockwise spiral, inward.
    [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        0x0f, 0x17, 0x1f, 0x27, 0x2f, 0x37, 0x3f, 0x3e,
        0x3d, 0x3c, 0x3b, 0x3a, 0x39, 0x38, 0x30, 0x28,
        0x20, 0x18, 0x10, 0x08, 0x09, 0x0a, 0x0b, 0x0c,
        0x0d, 0x0e, 0x16, 0x1e, 0x26, 0x2e, 0x36, 0x35,
        0x34, 0x33, 0x32, 0x31, 0x29, 0x21, 0x19, 0x11,
        0x12, 0x13, 0x14, 0x15, 0x1d, 0x25, 0x2d, 0x2c,
        0x2b, 0x2a, 0x22, 0x1a, 0x1b, 0x1c, 0x24, 0x23,
    ],
    // Counter-clockwise spiral, outward.
    [
        0x23, 0x24, 0x1c, 0x1b, 0x1a, 0x22, 0x2a, 0x2b,
        0x2c, 0x2d, 0x25, 0x1d, 0x15, 0x14, 0x13, 0x12,
        0x11, 0x19, 0x21, 0x29, 0x31, 0x32, 0x33, 0x34,
        0x35, 0x36, 0x2e, 0x26, 0x1e, 0x16, 0x0e, 0x0d,
        0x0c, 0x0b, 0x0a, 0x09, 0x08, 0x10, 0x18, 0x20,
        0x28, 0x30, 0x38, 0x39, 0x3a, 0x3b, 0x3c, 0x3d,
        0x3e, 0x3f, 0x37, 0x2f, 0x27, 0x1f, 0x17, 0x0f,
        0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x00,
    ],
    // Row serpentine from the bottom.
    [
        0x38, 0x39, 0x3a, 0x3b, 0x3c, 0x3d, 0x3e, 0x3f,
        0x37, 0x36, 0x35, 0x34, 0x33, 0x32, 0x31, 0x30,
        0x28, 0x29, 0x2a, 0x2b, 0x2c, 0x2d, 0x2e, 0x2f,
        0x27, 0x26, 0x25, 0x24, 0x23, 0x22, 0x21, 0x20,
        0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f,
        0x17, 0x16, 0x15, 0x14, 0x13, 0x12, 0x11, 0x10,
        0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
        0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x00,
    ],
    // Column serpentine from the right.
    [
        0x07, 0x0f, 0x17, 0x1f, 0x27, 0x2f, 0x37, 0x3f,
        0x3e, 0x36, 0x2e, 0x26, 0x1e, 0x16, 0x0e, 0x06,
        0x05, 0x0d, 0x15, 0x1d, 0x25, 0x2d, 0x35, 0x3d,
        0x3c, 0x34, 0x2c, 0x24, 0x1c, 0x14, 0x0c, 0x04,
        0x03, 0x0b, 0x13, 0x1b, 0x23, 0x2b, 0x33, 0x3b,
        0x3a, 0x32, 0x2a, 0x22, 0x1a, 0x12, 0x0a, 0x02,
        0x01, 0x09, 0x11, 0x19, 0x21, 0x29, 0x31, 0x39,
        0x38, 0x30, 0x28, 0x20, 0x18, 0x10, 0x08, 0x00,
    ],
    // Anti-diagonal zig-zag.
    [
        0x00, 0x08, 0x01, 0x02, 0x09, 0x10, 0x18, 0x11,
        0x0a, 0x03, 0x04, 0x0b, 0x12, 0x19, 0x20, 0x28,
        0x21, 0x1a, 0x13, 0x0c, 0x05, 0x06, 0x0d, 0x14,
        0x1b, 0x22, 0x29, 0x30, 0x38, 0x31, 0x2a, 0x23,
        0x1c, 0x15, 0x0e, 0x07, 0x0f, 0x16, 0x1d, 0x24,
        0x2b, 0x32, 0x39, 0x3a, 0x33, 0x2c, 0x25, 0x1e,
        0x17, 0x1f, 0x26, 0x2d, 0x34, 0x3b, 0x3c, 0x35,
        0x2e, 0x27, 0x2f, 0x36, 0x3d, 0x3e, 0x37, 0x3f,
    ],
    // 4x4 quadrants in column order.
    [
        0x00, 0x08, 0x10, 0x18, 0x01, 0x09, 0x11, 0x19,
        0x02, 0x0a, 0x12, 0x1a, 0x03, 0x0b, 0x13, 0x1b,
        0x04, 0x0c, 0x14, 0x1c, 0x05, 0x0d, 0x15, 0x1d,
        0x06, 0x0e, 0x16, 0x1e, 0x07, 0x0f, 0x17, 0x1f,
        0x20, 0x28, 0x30, 0x38, 0x21, 0x29, 0x31, 0x39,
        0x22, 0x2a, 0x32, 0x3a, 0x23, 0x2b, 0x33, 0x3b,
        0x24, 0x2c, 0x34, 0x3c, 0x25, 0x2d, 0x35, 0x3d,
        0x26, 0x2e, 0x36, 0x3e, 0x27, 0x2f, 0x37, 0x3f,
    ],
    // Even columns, then odd columns.
    [
        0x00, 0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38,
        0x02, 0x0a, 0x12, 0x1a, 0x22, 0x2a, 0x32, 0x3a,
        0x04, 0x0c, 0x14, 0x1c, 0x24, 0x2c, 0x34, 0x3c,
        0x06, 0x0e, 0x16, 0x1e, 0x26, 0x2e, 0x36, 0x3e,
        0x01, 0x09, 0x11, 0x19, 0x21, 0x29, 0x31, 0x39,
        0x03, 0x0b, 0x13, 0x1b, 0x23, 0x2b, 0x33, 0x3b,
        0x05, 0x0d, 0x15, 0x1d, 0x25, 0x2d, 0x35, 0x3d,
        0x07, 0x0f, 0x17, 0x1f, 0x27, 0x2f, 0x37, 0x3f,
    ],
    // Column raster.
    [
        0x00, 0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38,
        0x01, 0x09, 0x11, 0x19, 0x21, 0x29, 0x31, 0x39,
        0x02, 0x0a, 0x12, 0x1a, 0x22, 0x2a, 0x32, 0x3a,
        0x03, 0x0b, 0x13, 0x1b, 0x23, 0x2b, 0x33, 0x3b,
        0x04, 0x0c, 0x14, 0x1c, 0x24, 0x2c, 0x34, 0x3c,
        0x05, 0x0d, 0x15, 0x1d, 0x25, 0x2d, 0x35, 0x3d,
        0x06, 0x0e, 0x16, 0x1e, 0x26, 0x2e, 0x36, 0x3e,
        0x07, 0x0f, 0x17, 0x1f, 0x27, 0x2f, 0x37, 0x3f,
    ],
    // Reverse raster.
    [
        0x3f, 0x3e, 0x3d, 0x3c, 0x3b, 0x3a, 0x39, 0x38,
        0x37, 0x36, 0x35, 0x34, 0x33, 0x32, 0x31, 0x30,
        0x2f, 0x2e, 0x2d, 0x2c, 0x2b, 0x2a, 0x29, 0x28,
        0x27, 0x26, 0x25, 0x24, 0x23, 0x22, 0x21, 0x20,
        0x1f, 0x1e, 0x1d, 0x1c, 0x1b, 0x1a, 0x19, 0x18,
        0x17, 0x16, 0x15, 0x14, 0x13, 0x12, 0x11, 0x10,
        0x0f, 0x0e, 0x0d, 0x0c, 0x0b, 0x0a, 0x09, 0x08,
        0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x00,
    ],
    // Raster.
    [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
        0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17,
        0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f,
        0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27,
        0x28, 0x29, 0x2a, 0x2b, 0x2c, 0x2d, 0x2e, 0x2f,
        0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37,
        0x38, 0x39, 0x3a, 0x3b, 0x3c, 0x3d, 0x3e, 0x3f,
    ],
];

/// Base intra quantizer matrix, in raster order, before the transform scale factors are folded
/// in. A value of 16 is unity.
#[rustfmt::skip]
const BINK_INTRA_BASE: [u8; 64] = [
    16,  11,  10,  16,  24,  40,  51,  61,
    12,  12,  14,  19,  26,  58,  60,  55,
    14,  13,  16,  24,  40,  57,  69,  56,
    14,  17,  22,  29,  51,  87,  80,  62,
    18,  22,  37,  56,  68, 109, 103,  77,
    24,  35,  55,  64,  81, 104, 113,  92,
    49,  64,  78,  87, 103, 121, 120, 101,
    72,  92,  95,  98, 112, 100, 103,  99,
];

/// Base inter quantizer matrix, in raster order.
#[rustfmt::skip]
const BINK_INTER_BASE: [u8; 64] = [
    16, 17, 18, 19, 20, 21, 22, 23,
    17, 18, 19, 20, 21, 22, 23, 24,
    18, 19, 20, 21, 22, 23, 24, 25,
    19, 20, 21, 22, 23, 24, 25, 26,
    20, 21, 22, 23, 24, 25, 26, 27,
    21, 22, 23, 24, 25, 26, 27, 28,
    22, 23, 24, 25, 26, 27, 28, 29,
    23, 24, 25, 26, 27, 28, 29, 30,
];

/// Builds one set of sixteen quantizer matrices in scan order.
///
/// The integer transform carries no per-coefficient scaling, so the matrices fold in the scale
/// factors of the scaled transform. Matrices are 11-bit fixed point; the sixteen quality levels
/// step geometrically by a factor of sqrt(2).
fn build_quant_matrices(base: &[u8; 64]) -> Box<[[i32; 64]; 16]> {
    let mut scale = [0f64; 8];

    for (k, s) in scale.iter_mut().enumerate() {
        *s = if k == 0 { 1.0 } else { SQRT_2 * (k as f64 * PI / 16.0).cos() };
    }

    let mut matrices = Box::new([[0i32; 64]; 16]);

    for (level, matrix) in matrices.iter_mut().enumerate() {
        let quality = 2f64.powf(level as f64 / 2.0);

        for (i, q) in matrix.iter_mut().enumerate() {
            let pos = BINK_SCAN[i] as usize;
            let (row, col) = (pos >> 3, pos & 7);

            let value = f64::from(base[pos]) / 16.0 * scale[row] * scale[col] * quality;

            *q = (value * f64::from(1 << 11)).round() as i32;
        }
    }

    matrices
}

lazy_static! {
    /// Intra quantizer matrices, sixteen quality levels, in scan order.
    pub static ref BINK_INTRA_QUANT: Box<[[i32; 64]; 16]> = build_quant_matrices(&BINK_INTRA_BASE);

    /// Inter quantizer matrices, sixteen quality levels, in scan order.
    pub static ref BINK_INTER_QUANT: Box<[[i32; 64]; 16]> = build_quant_matrices(&BINK_INTER_BASE);
}
