// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `dct` module implements the inverse Discrete Cosine Transform (DCT-III).
//!
//! The algorithm in this module is not general purpose and is specialized for use in audio
//! decoding, therefore some constraints may apply.

use std::f64;

/// Inverse Discrete Cosine Transform (DCT-III).
///
/// Implements the inverse transform using the decimation-in-frequency recursion described in
/// \[1\], with the first coefficient at full weight.
///
/// \[1\] B.G. Lee, "A new algorithm to compute the discrete cosine transform", IEEE Transactions
///       on Acoustics, Speech, and Signal Processing, vol. 32, no. 6, pp. 1243-1245, 1984.
///
/// <https://ieeexplore.ieee.org/document/1164443>
pub struct DctIii {
    /// One reciprocal-cosine table per recursion level. Level `l` covers a transform of
    /// `n >> l` points.
    tables: Vec<Vec<f32>>,
    temp: Vec<f32>,
}

impl DctIii {
    /// Instantiate a N-point inverse DCT.
    ///
    /// The value of `n` must be a power-of-2 between 2 and 8192, inclusive.
    pub fn new(n: usize) -> DctIii {
        assert!(n.is_power_of_two(), "n must be a power-of-two");
        assert!(n >= 2 && n <= 8192, "n must be between 2 and 8192");

        let mut tables = Vec::new();

        let mut size = n;

        while size >= 2 {
            let freq = f64::consts::PI / size as f64;

            let table = (0..size >> 1)
                .map(|i| (0.5 / ((i as f64 + 0.5) * freq).cos()) as f32)
                .collect();

            tables.push(table);
            size >>= 1;
        }

        DctIii { tables, temp: vec![0.0; n] }
    }

    /// Get the size of the transform.
    pub fn size(&self) -> usize {
        self.temp.len()
    }

    /// Performs the N-point inverse Discrete Cosine Transform in-place.
    ///
    /// The number of samples in `data`, N, must equal the value `DctIii` was instantiated with.
    /// Failing to meet this requirement will throw an assertion.
    pub fn dct_iii_inplace(&mut self, data: &mut [f32]) {
        assert_eq!(data.len(), self.temp.len());

        let mut temp = std::mem::take(&mut self.temp);
        dct_iii_step(data, &mut temp, &self.tables, 0);
        self.temp = temp;
    }
}

fn dct_iii_step(data: &mut [f32], temp: &mut [f32], tables: &[Vec<f32>], level: usize) {
    let n = data.len();

    if n < 2 {
        return;
    }

    let half = n >> 1;

    // Split into an even-index half and an adjacent-sum odd half.
    temp[0] = data[0];
    temp[half] = data[1];

    for i in 1..half {
        temp[i] = data[2 * i];
        temp[i + half] = data[2 * i - 1] + data[2 * i + 1];
    }

    {
        let (t_lo, t_hi) = temp.split_at_mut(half);
        let (d_lo, d_hi) = data.split_at_mut(half);

        // The halves of the work buffer become the data buffers of the sub-transforms, and
        // vice-versa.
        dct_iii_step(t_lo, d_lo, tables, level + 1);
        dct_iii_step(t_hi, d_hi, tables, level + 1);
    }

    // Butterfly the two half-size transforms back into the output.
    let table = &tables[level];

    for i in 0..half {
        let x = temp[i];
        let y = temp[i + half] * table[i];

        data[i] = x + y;
        data[n - 1 - i] = x - y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    /// Compute the inverse DCT analytically, with the first coefficient at full weight.
    fn dct_iii_analytical(x: &[f32], y: &mut [f32]) {
        let n = x.len();

        let w = f64::consts::PI / (2 * n) as f64;

        for (i, y) in y.iter_mut().enumerate() {
            let mut sum = f64::from(x[0]);

            for (k, &x) in x.iter().enumerate().skip(1) {
                sum += f64::from(x) * (w * (k as f64) * ((2 * i + 1) as f64)).cos();
            }

            *y = sum as f32;
        }
    }

    #[test]
    fn verify_dct_iii_short() {
        #[rustfmt::skip]
        const TEST_VECTOR: [f32; 16] = [
            0.1710, 0.1705, 0.3476, 0.1866, 0.4784, 0.6525, 0.2690, 0.9996,
            0.1864, 0.7277, 0.1163, 0.6620, 0.0911, 0.3225, 0.1126, 0.5344,
        ];

        let mut actual = TEST_VECTOR;
        let mut expected = [0f32; 16];

        dct_iii_analytical(&TEST_VECTOR, &mut expected);
        DctIii::new(16).dct_iii_inplace(&mut actual);

        for (a, e) in actual.iter().zip(&expected) {
            assert!((a - e).abs() < 1e-4, "{} != {}", a, e);
        }
    }

    #[test]
    fn verify_dct_iii_long() {
        let mut rng = SmallRng::seed_from_u64(0x9e37_79b9);

        let input = (0..512).map(|_| rng.gen_range(-1.0..1.0)).collect::<Vec<f32>>();

        let mut actual = input.clone();
        let mut expected = vec![0f32; 512];

        dct_iii_analytical(&input, &mut expected);
        DctIii::new(512).dct_iii_inplace(&mut actual);

        for (a, e) in actual.iter().zip(&expected) {
            assert!((a - e).abs() < 1e-3, "{} != {}", a, e);
        }
    }
}
