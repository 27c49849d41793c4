//! User-facing collaborators: confirmation prompts and transient notifications.

use std::collections::VecDeque;
use std::sync::Mutex;

/// A question the store needs answered before a destructive or bulk change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation<'a> {
    /// First step of deleting a collection
    DeleteCollection { name: &'a str },
    /// Second step, only asked when the collection still holds items
    DeleteNonEmptyCollection { name: &'a str, item_count: usize },
    RemoveItem { title: &'a str, collection: &'a str },
    Import { count: usize },
}

impl Confirmation<'_> {
    /// Text shown to the user
    pub fn message(&self) -> String {
        match self {
            Confirmation::DeleteCollection { name } => {
                format!("Delete collection \"{}\"?", name)
            }
            Confirmation::DeleteNonEmptyCollection { name, item_count } => format!(
                "\"{}\" contains {} item{}. Delete it anyway?",
                name,
                item_count,
                if *item_count == 1 { "" } else { "s" }
            ),
            Confirmation::RemoveItem { title, collection } => {
                format!("Remove \"{}\" from \"{}\"?", title, collection)
            }
            Confirmation::Import { count } => format!(
                "Import {} new collection{}?",
                count,
                if *count == 1 { "" } else { "s" }
            ),
        }
    }
}

/// The presentation layer as seen from the store
pub trait Interaction: Send + Sync {
    /// Ask the user; `false` aborts the operation
    fn confirm(&self, prompt: &Confirmation<'_>) -> bool;

    /// Show a short-lived notification
    fn notify(&self, message: &str);
}

/// Confirms everything and logs notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Interaction for AutoConfirm {
    fn confirm(&self, prompt: &Confirmation<'_>) -> bool {
        tracing::debug!("Auto-confirming: {}", prompt.message());
        true
    }

    fn notify(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Scripted answers and a log of everything asked and shown.
///
/// Answers are consumed in order; once exhausted, `default_answer` is used.
#[derive(Debug)]
pub struct RecordingInteraction {
    answers: Mutex<VecDeque<bool>>,
    default_answer: bool,
    prompts: Mutex<Vec<String>>,
    notifications: Mutex<Vec<String>>,
}

impl RecordingInteraction {
    pub fn new(default_answer: bool) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            default_answer,
            prompts: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn with_answers(answers: impl IntoIterator<Item = bool>, default_answer: bool) -> Self {
        let recorder = Self::new(default_answer);
        if let Ok(mut queue) = recorder.answers.lock() {
            queue.extend(answers);
        }
        recorder
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

impl Interaction for RecordingInteraction {
    fn confirm(&self, prompt: &Confirmation<'_>) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.message());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(self.default_answer)
    }

    fn notify(&self, message: &str) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(message.to_string());
        }
    }
}

impl<T: Interaction + ?Sized> Interaction for std::sync::Arc<T> {
    fn confirm(&self, prompt: &Confirmation<'_>) -> bool {
        (**self).confirm(prompt)
    }

    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_messages() {
        assert_eq!(
            Confirmation::DeleteNonEmptyCollection {
                name: "Work",
                item_count: 1
            }
            .message(),
            "\"Work\" contains 1 item. Delete it anyway?"
        );
        assert_eq!(
            Confirmation::Import { count: 3 }.message(),
            "Import 3 new collections?"
        );
    }

    #[test]
    fn test_recording_answers_in_order() {
        let recorder = RecordingInteraction::with_answers([true, false], true);
        let prompt = Confirmation::Import { count: 1 };
        assert!(recorder.confirm(&prompt));
        assert!(!recorder.confirm(&prompt));
        assert!(recorder.confirm(&prompt));
        assert_eq!(recorder.prompts().len(), 3);
    }
}
