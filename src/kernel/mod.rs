// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Core Kernel Module
//!
//! Interrupt handling and the byte-stream library used by the boot console.

// Architecture module
pub mod arch;

// Device drivers
pub mod dev;

pub mod exception;
pub mod interrupt;
pub mod lib;
