//! Selection forms as request/response messages.
//!
//! Showing a form hands control back to the host. The answer comes in as a
//! separate event, so a test can play the host's part by building a
//! [`FormResponse`] directly.

use serde::{Serialize, Deserialize};

/// A form shown to a participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRequest {
    /// Correlates the eventual response with this request.
    pub form_id: u32,
    /// Form title
    pub title: String,
    /// Body text above the buttons
    pub body: String,
    /// Buttons in display order
    pub buttons: Vec<String>,
}

/// The host's answer to a [`FormRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResponse {
    /// Participant picked the button at this index.
    Selected {
        /// Form being answered
        form_id: u32,
        /// Button index
        index: usize,
    },
    /// Form was closed without a choice.
    Canceled {
        /// Form being answered
        form_id: u32,
    },
}

impl FormResponse {
    /// Id of the form this answers.
    pub fn form_id(&self) -> u32 {
        match self {
            Self::Selected { form_id, .. } | Self::Canceled { form_id } => *form_id,
        }
    }

    /// Selected index, if any.
    pub fn selection(&self) -> Option<usize> {
        match self {
            Self::Selected { index, .. } => Some(*index),
            Self::Canceled { .. } => None,
        }
    }
}
