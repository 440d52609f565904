// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `complex` module implements a 32-bit floating point complex number.

use std::ops::{Add, Mul, Sub};

use bytemuck::{Pod, Zeroable};

/// A complex number.
///
/// The memory layout is two consecutive `f32`s, real part first, so a slice of interleaved
/// real/imaginary samples may be cast to a slice of `Complex` values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Complex {
    /// The real component.
    pub re: f32,
    /// The imaginary component.
    pub im: f32,
}

impl Complex {
    /// Create a new complex number.
    pub fn new(re: f32, im: f32) -> Self {
        Complex { re, im }
    }

    /// Create a complex number with a value of `0 + j0`.
    pub fn zero() -> Self {
        Complex { re: 0.0, im: 0.0 }
    }

    /// Scale the complex number.
    #[inline(always)]
    pub fn scale(&self, scale: f32) -> Complex {
        Complex { re: self.re * scale, im: self.im * scale }
    }
}

impl Add for Complex {
    type Output = Complex;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Complex { re: self.re + rhs.re, im: self.im + rhs.im }
    }
}

impl Sub for Complex {
    type Output = Complex;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Complex { re: self.re - rhs.re, im: self.im - rhs.im }
    }
}

impl Mul for Complex {
    type Output = Complex;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Complex {
            re: (self.re * rhs.re) - (self.im * rhs.im),
            im: (self.re * rhs.im) + (self.im * rhs.re),
        }
    }
}
