// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARM64 (AArch64) Architecture Implementation

pub mod interrupts;

pub use interrupts::Arm64;
