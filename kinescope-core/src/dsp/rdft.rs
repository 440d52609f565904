// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `rdft` module implements the inverse real Discrete Fourier Transform (IRDFT).
//!
//! The inverse transform of N real samples is computed with a complex FFT of N/2 points
//! preceded by a spectral pre-shuffle.

use std::f64;

use super::complex::Complex;
use super::fft::Fft;

/// The inverse real Discrete Fourier Transform (IRDFT).
///
/// The input is a packed half-spectrum of N/2 + 1 bins in N floats: `data[0]` is the real DC
/// bin, `data[1]` the real Nyquist bin, and `data[2k]`/`data[2k + 1]` the real and imaginary
/// parts of bin k for `k = 1..N/2 - 1`. The output is N interleaved real samples, unscaled.
pub struct Rdft {
    fft: Fft,
    tw_cos: Box<[f32]>,
    tw_sin: Box<[f32]>,
}

impl Rdft {
    /// Instantiate an N-point IRDFT.
    ///
    /// The value of `n` must be a power-of-2 of at least 128.
    pub fn new(n: usize) -> Rdft {
        assert!(n.is_power_of_two(), "n must be a power-of-two");
        assert!(n >= 128, "minimum of 128-point rdft");

        let theta = 2.0 * f64::consts::PI / n as f64;

        let tw_cos = (0..n / 4).map(|i| (theta * i as f64).cos() as f32).collect();
        let tw_sin = (0..n / 4).map(|i| (theta * i as f64).sin() as f32).collect();

        Rdft { fft: Fft::new(n / 2), tw_cos, tw_sin }
    }

    /// Get the size of the transform.
    pub fn size(&self) -> usize {
        2 * self.fft.size()
    }

    /// Performs the N-point inverse real DFT in-place.
    ///
    /// The number of values in `data`, N, must equal the value `Rdft` was instantiated with.
    /// Failing to meet this requirement will throw an assertion.
    pub fn irdft_inplace(&self, data: &mut [f32]) {
        let n = data.len();
        assert_eq!(n, self.size());

        // Unpack the DC and Nyquist bins.
        let d0 = data[0];
        let d1 = data[1];

        data[0] = 0.5 * (d0 + d1);
        data[1] = 0.5 * (d0 - d1);

        // Fold the conjugate-symmetric half-spectrum into the spectrum of a half-size complex
        // transform.
        for i in 1..n / 4 {
            let i1 = 2 * i;
            let i2 = n - i1;

            let (a, b) = (data[i1], data[i2]);
            let (c, d) = (data[i1 + 1], data[i2 + 1]);

            let even_re = 0.5 * (a + b);
            let odd_im = 0.5 * (a - b);
            let even_im = 0.5 * (c - d);
            let odd_re = -0.5 * (c + d);

            let cos = self.tw_cos[i];
            let sin = self.tw_sin[i];

            data[i1] = even_re + (odd_re * cos) - (odd_im * sin);
            data[i1 + 1] = even_im + (odd_im * cos) + (odd_re * sin);
            data[i2] = even_re - (odd_re * cos) + (odd_im * sin);
            data[i2 + 1] = -even_im + (odd_im * cos) + (odd_re * sin);
        }

        // Unnormalized inverse transform of the reinterpreted complex array. Even and odd output
        // samples fall out interleaved.
        let z: &mut [Complex] = bytemuck::cast_slice_mut(data);

        self.fft.ifft_inplace(z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    /// Compute the inverse real DFT analytically from the packed half-spectrum. The output
    /// carries the same N/2 scale as the transform under test.
    fn irdft_naive(x: &[f32], y: &mut [f32]) {
        let n = x.len();

        let theta = 2.0 * f64::consts::PI / n as f64;

        for (t, y) in y.iter_mut().enumerate() {
            // DC and Nyquist bins.
            let mut sum = 0.5 * f64::from(x[0]);
            sum += 0.5 * f64::from(x[1]) * (theta * ((n / 2) * t) as f64).cos();

            for k in 1..n / 2 {
                let re = f64::from(x[2 * k]);
                let im = f64::from(x[2 * k + 1]);
                let angle = theta * (k * t) as f64;

                // The packed format stores the centre bin conjugated.
                if k == n / 4 {
                    sum += re * angle.cos() + im * angle.sin();
                }
                else {
                    sum += re * angle.cos() - im * angle.sin();
                }
            }

            *y = sum as f32;
        }
    }

    #[test]
    fn verify_irdft() {
        // A pseudo-random half-spectrum.
        let mut rng = SmallRng::seed_from_u64(0x85eb_ca6b);

        let input = (0..512).map(|_| rng.gen_range(-1.0..1.0)).collect::<Vec<f32>>();

        let mut expected = vec![0f32; 512];
        irdft_naive(&input, &mut expected);

        let mut actual = input;
        Rdft::new(512).irdft_inplace(&mut actual);

        for (a, e) in actual.iter().zip(&expected) {
            assert!((a - e).abs() < 1e-2, "{} != {}", a, e);
        }
    }
}
