//! Obstruction layers and masks

use serde::{Deserialize, Serialize};

/// A layer identifier for world geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    /// Default layer
    pub const DEFAULT: Self = Self(0);
    /// Player layer
    pub const PLAYER: Self = Self(1);
    /// Enemy layer
    pub const ENEMIES: Self = Self(2);
    /// Static environment layer (walls, pillars)
    pub const ENVIRONMENT: Self = Self(5);
    /// Movable props
    pub const PROPS: Self = Self(7);

    /// Create a custom layer
    pub const fn custom(id: u32) -> Self {
        Self(id)
    }

    /// Look up a built-in layer by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::DEFAULT),
            "player" => Some(Self::PLAYER),
            "enemies" => Some(Self::ENEMIES),
            "environment" => Some(Self::ENVIRONMENT),
            "props" => Some(Self::PROPS),
            _ => None,
        }
    }

    /// Get the layer as a bitmask
    pub fn as_mask(&self) -> u32 {
        1 << (self.0 & 31)
    }
}

impl Default for CollisionLayer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Set of layers a query is blocked by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer
    pub const ALL: Self = Self(u32::MAX);
    /// No layer
    pub const NONE: Self = Self(0);

    /// Mask made of the given layers
    pub fn from_layers(layers: &[CollisionLayer]) -> Self {
        Self(layers.iter().fold(0u32, |acc, l| acc | l.as_mask()))
    }

    /// Mask usually used for line of sight: level geometry and props
    pub fn obstruction() -> Self {
        Self::from_layers(&[
            CollisionLayer::DEFAULT,
            CollisionLayer::ENVIRONMENT,
            CollisionLayer::PROPS,
        ])
    }

    /// Add a layer
    pub fn with(mut self, layer: CollisionLayer) -> Self {
        self.0 |= layer.as_mask();
        self
    }

    /// Remove a layer
    pub fn without(mut self, layer: CollisionLayer) -> Self {
        self.0 &= !layer.as_mask();
        self
    }

    pub fn contains(&self, layer: CollisionLayer) -> bool {
        self.0 & layer.as_mask() != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::obstruction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask() {
        assert_eq!(CollisionLayer::DEFAULT.as_mask(), 1);
        assert_eq!(CollisionLayer::PLAYER.as_mask(), 2);
        assert_eq!(CollisionLayer::ENEMIES.as_mask(), 4);
    }

    #[test]
    fn test_mask_membership() {
        let mask = LayerMask::obstruction();
        assert!(mask.contains(CollisionLayer::ENVIRONMENT));
        assert!(!mask.contains(CollisionLayer::PLAYER));

        let mask = mask.with(CollisionLayer::PLAYER).without(CollisionLayer::PROPS);
        assert!(mask.contains(CollisionLayer::PLAYER));
        assert!(!mask.contains(CollisionLayer::PROPS));
        assert!(!LayerMask::NONE.contains(CollisionLayer::DEFAULT));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(CollisionLayer::from_name("environment"), Some(CollisionLayer::ENVIRONMENT));
        assert_eq!(CollisionLayer::from_name("water"), None);
    }
}
