// Copyright 2025 John Brosnihan
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
//! Linear velocity damping

use super::{ForceField, ForceStats};
use crate::body::Body;
use crate::error::{check_non_negative, Result};

/// Linear drag: `a -= v * factor`
///
/// The damping acts on acceleration directly and is independent of mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    factor: f64,
}

impl Drag {
    /// Create a drag field
    ///
    /// # Panics
    ///
    /// Panics if `factor` is negative or not finite.
    pub fn new(factor: f64) -> Self {
        assert!(
            factor >= 0.0 && factor.is_finite(),
            "Drag factor must be non-negative and finite"
        );
        Drag { factor }
    }

    /// Create a drag field, rejecting an invalid factor
    pub fn try_new(factor: f64) -> Result<Self> {
        check_non_negative("drag", factor)?;
        Ok(Drag { factor })
    }

    /// Damping factor
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl ForceField for Drag {
    fn name(&self) -> &str {
        "drag"
    }

    fn accumulate(&mut self, bodies: &mut [Body]) -> Result<ForceStats> {
        if self.factor == 0.0 {
            return Ok(ForceStats::default());
        }
        for body in bodies {
            body.acceleration -= body.velocity * self.factor;
        }
        Ok(ForceStats::default())
    }
}
