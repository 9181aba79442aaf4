//! History cursor - a position in a frozen message log
//!
//! The log and character roster are captured once when History mode is
//! entered; later snapshots never move or resize it.

use std::sync::Arc;

use thiserror::Error;

use pixeltales_domain::{CharacterState, Message, SceneSnapshot};

/// One step through the message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    Previous,
    Next,
}

impl NavigationDirection {
    pub fn delta(self) -> isize {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}

impl TryFrom<i8> for NavigationDirection {
    type Error = i8;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Previous),
            1 => Ok(Self::Next),
            other => Err(other),
        }
    }
}

/// A rejected navigation step. Expected during normal use, not a fault.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no messages to navigate")]
    Empty,

    #[error("cannot move {direction:?} from message {index} of {len}")]
    OutOfBounds {
        direction: NavigationDirection,
        index: usize,
        len: usize,
    },
}

/// A past message prepared for static display.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalView {
    pub index: usize,
    pub total: usize,
    pub message: Message,
    /// Speaker as of the moment History mode was entered
    pub character: Option<CharacterState>,
}

impl HistoricalView {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

#[derive(Debug, Clone)]
pub struct HistoryCursor {
    log: Arc<SceneSnapshot>,
    index: Option<usize>,
}

impl HistoryCursor {
    /// Cursor on the most recent message of `frozen`, or on nothing if the
    /// log is empty.
    pub fn at_tail(frozen: Arc<SceneSnapshot>) -> Self {
        let index = frozen.last_message_index();
        Self { log: frozen, index }
    }

    /// Move one message back or forward. Out-of-range moves leave the
    /// cursor where it is. No wraparound.
    pub fn navigate(&mut self, direction: NavigationDirection) -> Result<usize, NavigationError> {
        let Some(index) = self.index else {
            return Err(NavigationError::Empty);
        };

        let len = self.len();
        match index.checked_add_signed(direction.delta()) {
            Some(next) if next < len => {
                self.index = Some(next);
                Ok(next)
            }
            _ => Err(NavigationError::OutOfBounds {
                direction,
                index,
                len,
            }),
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.log.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.messages.is_empty()
    }

    /// The message under the cursor.
    pub fn current(&self) -> Option<HistoricalView> {
        let index = self.index?;
        let message = self.log.messages.get(index)?;
        Some(HistoricalView {
            index,
            total: self.len(),
            message: message.clone(),
            character: self.log.character(message.character.as_str()).cloned(),
        })
    }

    pub fn reset_to_tail(&mut self) {
        self.index = self.log.last_message_index();
    }

    pub fn frozen(&self) -> &Arc<SceneSnapshot> {
        &self.log
    }
}
