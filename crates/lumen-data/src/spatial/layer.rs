// Copyright 2025 eraflo
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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Identifies a spatial layer. Valid layers are `0..=63`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(u8);

impl LayerId {
    /// The layer every object belongs to.
    pub const ALL: LayerId = LayerId(0);
    /// Number of distinct layers a [`LayerMask`] can hold.
    pub const COUNT: u8 = 64;

    /// Creates a layer id, or `None` if `index` is out of range.
    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT {
            Some(LayerId(index))
        } else {
            None
        }
    }

    /// The numeric index of the layer.
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of layers stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(u64);

impl LayerMask {
    /// A mask with no layers.
    pub const EMPTY: LayerMask = LayerMask(0);

    /// Builds a mask containing the given layers.
    pub fn from_layers(layers: &[LayerId]) -> Self {
        layers.iter().fold(Self::EMPTY, |mask, &layer| mask.with(layer))
    }

    /// Returns a copy with `layer` added.
    pub const fn with(self, layer: LayerId) -> Self {
        LayerMask(self.0 | (1u64 << layer.0))
    }

    /// Returns a copy with `layer` removed.
    pub const fn without(self, layer: LayerId) -> Self {
        LayerMask(self.0 & !(1u64 << layer.0))
    }

    /// Whether `layer` is in the mask.
    pub const fn contains(self, layer: LayerId) -> bool {
        self.0 & (1u64 << layer.0) != 0
    }

    /// Whether the mask has no layers.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the layers in ascending order.
    pub fn iter(self) -> impl Iterator<Item = LayerId> {
        (0..LayerId::COUNT)
            .filter(move |&i| self.0 & (1u64 << i) != 0)
            .map(LayerId)
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}

impl From<LayerId> for LayerMask {
    fn from(layer: LayerId) -> Self {
        LayerMask::EMPTY.with(layer)
    }
}
