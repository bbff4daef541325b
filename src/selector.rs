//! Shape selection.
//!
//! A [`ShapeSequence`] is a fixed cyclic list of [`Shape`]s with a cursor.
//! The only way to move the cursor is [`ShapeSequence::advance`], which the
//! viewer calls once per click.

use crate::cloud::CloudKind;
use crate::error::ConfigError;

/// Position in the click sequence.
///
/// The three explosion slots all target the same cloud; they exist so the
/// sequence can pass through an explosion between every pair of shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Tree,
    Explosion1,
    Heart,
    Explosion2,
    Galaxy,
    Explosion3,
}

impl Shape {
    /// Tree, burst, heart, burst, galaxy, burst.
    pub const SEQUENCE: [Shape; 6] = [
        Shape::Tree,
        Shape::Explosion1,
        Shape::Heart,
        Shape::Explosion2,
        Shape::Galaxy,
        Shape::Explosion3,
    ];

    /// The point cloud this shape morphs toward.
    pub fn cloud(self) -> CloudKind {
        match self {
            Shape::Tree => CloudKind::Tree,
            Shape::Heart => CloudKind::Heart,
            Shape::Galaxy => CloudKind::Galaxy,
            Shape::Explosion1 | Shape::Explosion2 | Shape::Explosion3 => CloudKind::Explosion,
        }
    }

    /// Prompt shown while this shape is active.
    pub fn instruction(self) -> &'static str {
        match self {
            Shape::Tree => "Click to Ignite",
            Shape::Explosion1 | Shape::Explosion2 | Shape::Explosion3 => "Reforming...",
            Shape::Heart => "Click to Disperse",
            Shape::Galaxy => "Click to Reset",
        }
    }
}

/// Cyclic shape sequence with a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeSequence {
    shapes: Vec<Shape>,
    cursor: usize,
}

impl ShapeSequence {
    /// Create a sequence starting at its first entry.
    pub fn new(shapes: Vec<Shape>) -> Result<Self, ConfigError> {
        if shapes.is_empty() {
            return Err(ConfigError::EmptySequence);
        }
        Ok(Self { shapes, cursor: 0 })
    }

    /// Shape under the cursor.
    pub fn current(&self) -> Shape {
        self.shapes[self.cursor]
    }

    /// Move the cursor to the next entry, wrapping at the end.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.shapes.len();
    }

    /// Cursor position.
    pub fn index(&self) -> usize {
        self.cursor
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Always false; an empty sequence cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// All entries in order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }
}

impl Default for ShapeSequence {
    fn default() -> Self {
        Self {
            shapes: Shape::SEQUENCE.to_vec(),
            cursor: 0,
        }
    }
}
