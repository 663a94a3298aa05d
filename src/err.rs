// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Firmware Error Codes
//!
//! Status codes and the error type returned by the fallible operations of
//! this crate. Status codes are negative so they can be handed back across a
//! C-style boundary unchanged.

/// Status code type
pub type Status = i32;

/// Success status code
pub const RX_OK: Status = 0;

/// Timeout error
pub const RX_ERR_TIMED_OUT: Status = -5;

/// Invalid arguments error
pub const RX_ERR_INVALID_ARGS: Status = -10;

/// Operation would block
pub const RX_ERR_SHOULD_WAIT: Status = -22;

/// Internal error
pub const RX_ERR_INTERNAL: Status = -114;

/// Permission denied error
pub const RX_ERR_PERMISSION_DENIED: Status = -13;

/// Result type for operations that can fail
pub type Result<T = ()> = core::result::Result<T, Error>;

/// Common error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An argument was outside the accepted range
    InvalidArgs,
    /// The operation cannot make progress without waiting
    WouldBlock,
    /// A bounded wait ran out
    TimedOut,
    /// A hardware-reported value was outside the configured range
    OutOfRange,
    /// The hardware reported an id from a reserved range
    Internal,
}

impl Error {
    /// Convert error to status code
    pub fn to_status(self) -> Status {
        match self {
            Error::InvalidArgs => RX_ERR_INVALID_ARGS,
            Error::WouldBlock => RX_ERR_SHOULD_WAIT,
            Error::TimedOut => RX_ERR_TIMED_OUT,
            Error::OutOfRange => RX_ERR_PERMISSION_DENIED,
            Error::Internal => RX_ERR_INTERNAL,
        }
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        err.to_status()
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::InvalidArgs => "invalid arguments",
            Error::WouldBlock => "operation would block",
            Error::TimedOut => "timed out",
            Error::OutOfRange => "value out of range",
            Error::Internal => "internal error",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_negative() {
        for err in [
            Error::InvalidArgs,
            Error::WouldBlock,
            Error::TimedOut,
            Error::OutOfRange,
            Error::Internal,
        ] {
            assert!(err.to_status() < RX_OK);
        }
    }

    #[test]
    fn test_every_status_is_distinct() {
        let statuses = [
            Error::InvalidArgs,
            Error::WouldBlock,
            Error::TimedOut,
            Error::OutOfRange,
            Error::Internal,
        ]
        .map(Error::to_status);
        for (i, a) in statuses.iter().enumerate() {
            assert!(statuses[i + 1..].iter().all(|b| b != a));
        }
    }

    #[test]
    fn test_out_of_range_maps_to_permission_denied() {
        let status: Status = Error::OutOfRange.into();
        assert_eq!(status, RX_ERR_PERMISSION_DENIED);
    }
}
