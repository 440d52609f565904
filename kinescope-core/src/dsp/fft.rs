// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `fft` module implements the Fast Fourier Transform (FFT).
//!
//! The complex FFT in this module supports a size up-to 4096. The FFT is implemented using the
//! radix-2 Cooley-Tukey algorithm.

use std::f64;

use lazy_static::lazy_static;

use super::complex::Complex;

macro_rules! fft_twiddle_table {
    ($bi:expr, $name:ident) => {
        lazy_static! {
            static ref $name: [Complex; (1 << $bi) >> 1] = {
                const N: usize = 1 << $bi;

                let mut table = [Complex::default(); N >> 1];

                let theta = 2.0 * f64::consts::PI / N as f64;

                for (k, t) in table.iter_mut().enumerate() {
                    let angle = theta * k as f64;
                    *t = Complex::new(angle.cos() as f32, -angle.sin() as f32);
                }

                table
            };
        }
    };
}

fft_twiddle_table!(6, FFT_TWIDDLE_TABLE_64);
fft_twiddle_table!(7, FFT_TWIDDLE_TABLE_128);
fft_twiddle_table!(8, FFT_TWIDDLE_TABLE_256);
fft_twiddle_table!(9, FFT_TWIDDLE_TABLE_512);
fft_twiddle_table!(10, FFT_TWIDDLE_TABLE_1024);
fft_twiddle_table!(11, FFT_TWIDDLE_TABLE_2048);
fft_twiddle_table!(12, FFT_TWIDDLE_TABLE_4096);

/// Get the twiddle factors for a FFT of size `n`.
fn fft_twiddle_factors(n: usize) -> &'static [Complex] {
    match n {
        64 => FFT_TWIDDLE_TABLE_64.as_ref(),
        128 => FFT_TWIDDLE_TABLE_128.as_ref(),
        256 => FFT_TWIDDLE_TABLE_256.as_ref(),
        512 => FFT_TWIDDLE_TABLE_512.as_ref(),
        1024 => FFT_TWIDDLE_TABLE_1024.as_ref(),
        2048 => FFT_TWIDDLE_TABLE_2048.as_ref(),
        4096 => FFT_TWIDDLE_TABLE_4096.as_ref(),
        _ => panic!("fft size not supported"),
    }
}

/// The complex Fast Fourier Transform (FFT).
pub struct Fft {
    perm: Box<[u16]>,
}

impl Fft {
    /// The minimum FFT size.
    pub const MIN_SIZE: usize = 64;
    /// The maximum FFT size.
    pub const MAX_SIZE: usize = 4096;

    pub fn new(n: usize) -> Self {
        // The FFT size must be a power of two within the supported table range.
        assert!(n.is_power_of_two());
        assert!(n >= Fft::MIN_SIZE && n <= Fft::MAX_SIZE);

        // Calculate the bit reversal table.
        let n = n as u16;
        let shift = n.leading_zeros() + 1;
        let perm = (0..n).map(|i| i.reverse_bits() >> shift).collect();

        Self { perm }
    }

    /// Get the size of the FFT.
    pub fn size(&self) -> usize {
        self.perm.len()
    }

    /// Calculate the forward FFT in-place.
    pub fn fft_inplace(&self, x: &mut [Complex]) {
        self.permute(x);
        Self::transform(x, false);
    }

    /// Calculate the inverse FFT in-place.
    ///
    /// The result is not normalized; each output value is `n` times larger than the true inverse
    /// DFT value.
    pub fn ifft_inplace(&self, x: &mut [Complex]) {
        self.permute(x);
        Self::transform(x, true);
    }

    /// Bit reversal using the pre-computed permutation table.
    fn permute(&self, x: &mut [Complex]) {
        assert_eq!(x.len(), self.perm.len());

        for (i, &j) in self.perm.iter().enumerate() {
            let j = usize::from(j);

            if i < j {
                x.swap(i, j);
            }
        }
    }

    fn transform(x: &mut [Complex], inverse: bool) {
        let n = x.len();

        let twiddle = fft_twiddle_factors(n);

        let mut size = 2;

        while size <= n {
            let half = size >> 1;
            let step = n / size;

            for base in (0..n).step_by(size) {
                for k in 0..half {
                    let mut w = twiddle[k * step];

                    if inverse {
                        w.im = -w.im;
                    }

                    let even = x[base + k];
                    let odd = x[base + half + k];

                    let t = w * odd;

                    x[base + k] = even + t;
                    x[base + half + k] = even - t;
                }
            }

            size <<= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    /// Compute a naive DFT.
    fn dft_naive(x: &[Complex], y: &mut [Complex]) {
        assert_eq!(x.len(), y.len());

        let n = x.len() as u64;

        let theta = 2.0 * f64::consts::PI / (x.len() as f64);

        for (i, y) in y.iter_mut().enumerate() {
            let mut re = 0f64;
            let mut im = 0f64;

            for (j, &x) in x.iter().enumerate() {
                let xre = f64::from(x.re);
                let xim = f64::from(x.im);

                let ij = ((i as u64) * (j as u64)) & (n - 1);

                let wre = (theta * ij as f64).cos();
                let wim = -(theta * ij as f64).sin();

                re += (xre * wre) - (xim * wim);
                im += (xre * wim) + (xim * wre);
            }

            *y = Complex { re: re as f32, im: im as f32 };
        }
    }

    fn check_fft(input: &[Complex]) {
        let mut expected = vec![Complex::default(); input.len()];
        dft_naive(input, &mut expected);

        let mut actual = input.to_vec();
        Fft::new(input.len()).fft_inplace(&mut actual);

        for (a, e) in actual.iter().zip(&expected) {
            assert!((a.re - e.re).abs() < 1e-2, "{} != {}", a.re, e.re);
            assert!((a.im - e.im).abs() < 1e-2, "{} != {}", a.im, e.im);
        }
    }

    #[test]
    fn verify_fft() {
        let mut rng = SmallRng::seed_from_u64(0x2545_f491);

        for &n in &[64usize, 256, 1024] {
            let input = (0..n)
                .map(|_| Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
                .collect::<Vec<Complex>>();

            check_fft(&input);
        }
    }

    #[test]
    fn verify_fft_impulse() {
        // The FFT of a unit impulse is flat.
        let mut x = vec![Complex::default(); 256];
        x[0] = Complex::new(1.0, 0.0);

        Fft::new(256).fft_inplace(&mut x);

        for v in &x {
            assert!((v.re - 1.0).abs() < 1e-5);
            assert!(v.im.abs() < 1e-5);
        }
    }

    #[test]
    fn verify_ifft_round_trip() {
        // An unnormalized inverse of the forward transform recovers the input scaled by n.
        let mut rng = SmallRng::seed_from_u64(0xc2b2_ae35);

        let input = (0..256)
            .map(|_| Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect::<Vec<Complex>>();

        let fft = Fft::new(256);

        let mut x = input.clone();
        fft.fft_inplace(&mut x);
        fft.ifft_inplace(&mut x);

        for (a, e) in x.iter().zip(&input) {
            assert!((a.re / 256.0 - e.re).abs() < 1e-3, "{} != {}", a.re / 256.0, e.re);
            assert!((a.im / 256.0 - e.im).abs() < 1e-3, "{} != {}", a.im / 256.0, e.im);
        }
    }
}
