// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Architecture-specific [`Platform`](crate::platform::Platform) backends

#[cfg(target_arch = "aarch64")]
pub mod arm64;
