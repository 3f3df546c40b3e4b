use crate::Position;
use std::cell::Cell;
use std::rc::Rc;

/// Supplies the current source position for diagnostics.
///
/// The escape reader holds one of these so that its errors can point at
/// the location the tokenizer is currently looking at, without depending
/// on any concrete tokenizer type.
pub trait PositionReporter {
    /// Returns the position to cite in a diagnostic raised right now.
    fn current_position(&self) -> Position;
}

impl<F> PositionReporter for F
where
    F: Fn() -> Position,
{
    fn current_position(&self) -> Position {
        self()
    }
}

impl PositionReporter for Position {
    fn current_position(&self) -> Position {
        *self
    }
}

/// A position cell shared between a tokenizer and the reader it consumes.
///
/// Clones observe the same position. The tokenizer advances it as it
/// consumes characters; the reader only reads it.
#[derive(Debug, Clone, Default)]
pub struct SharedPosition {
    inner: Rc<Cell<Position>>,
}

impl SharedPosition {
    /// Creates a shared position at the start of the input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current position.
    pub fn get(&self) -> Position {
        self.inner.get()
    }

    /// Replaces the current position.
    pub fn set(&self, position: Position) {
        self.inner.set(position);
    }

    /// Moves the shared position past `ch`.
    pub fn advance(&self, ch: char) {
        let mut position = self.inner.get();
        position.advance(ch);
        self.inner.set(position);
    }

    /// Moves the shared position back to the start of the input.
    pub fn reset(&self) {
        self.inner.set(Position::new());
    }
}

impl PositionReporter for SharedPosition {
    fn current_position(&self) -> Position {
        self.get()
    }
}
