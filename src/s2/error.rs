// Copyright 2023 Google Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt;

/// S2Error represents errors that can occur in S2 operations
#[derive(Debug, Clone, PartialEq)]
pub enum S2Error {
    /// Invalid loop (e.g., self-intersection)
    InvalidLoop(String),
    /// Invalid argument provided to a function
    InvalidArgument(String),
    /// Generic error with message
    Other(String),
}

impl fmt::Display for S2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            S2Error::InvalidLoop(msg) => write!(f, "Invalid loop: {}", msg),
            S2Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            S2Error::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for S2Error {}

/// Result type for S2 operations
pub type S2Result<T> = Result<T, S2Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = S2Error::InvalidLoop("Edges 0 and 2 cross".to_string());
        assert_eq!(err.to_string(), "Invalid loop: Edges 0 and 2 cross");
        let err = S2Error::InvalidArgument("bad boundary condition 7".to_string());
        assert_eq!(err.to_string(), "Invalid argument: bad boundary condition 7");
        assert_eq!(S2Error::Other("oops".to_string()).to_string(), "oops");
    }
}
