//! Per-user ephemeral session state and its process-wide registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use tokio::sync::Mutex;

use crate::core::quiz::{Mode, Quiz};
use crate::core::store::UserId;

/// One displayed choice with its presentation annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOption {
    pub text: String,
    pub marked_wrong: bool,
}

/// The live quiz of a session: the round itself plus the shuffled display
/// order and the wrong-marks accumulated over retries.
///
/// Carried on the session value, never as shared mutable state, so one
/// user's marks can not clobber another's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveQuiz {
    pub quiz: Quiz,
    options: Vec<QuizOption>,
}

impl ActiveQuiz {
    /// Fixes the display order for the round by shuffling target and
    /// distractors together once.
    pub fn deal(quiz: Quiz) -> Self {
        let mut options: Vec<QuizOption> = std::iter::once(quiz.target_text.clone())
            .chain(quiz.distractor_texts.iter().cloned())
            .map(|text| QuizOption {
                text,
                marked_wrong: false,
            })
            .collect();
        options.shuffle(&mut rand::rng());
        Self { quiz, options }
    }

    /// Marks the displayed option matching `text` as answered wrong.
    /// Returns false when no option matches.
    pub fn mark_wrong(&mut self, text: &str) -> bool {
        match self.options.iter_mut().find(|option| option.text == text) {
            Some(option) => {
                option.marked_wrong = true;
                true
            }
            None => false,
        }
    }

    /// Choice texts in display order, wrong attempts flagged.
    pub fn display_choices(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|option| {
                if option.marked_wrong {
                    format!("{}❌", option.text)
                } else {
                    option.text.clone()
                }
            })
            .collect()
    }
}

/// Mode and current quiz for one user. Lives for process uptime only.
#[derive(Debug, Default)]
pub struct SessionState {
    pub mode: Option<Mode>,
    pub active: Option<ActiveQuiz>,
}

/// Keyed store of session states with per-user serialization.
///
/// Each user's state sits behind its own async mutex, held for the whole
/// event; the outer map lock is never held across an await, so independent
/// users proceed fully in parallel.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<UserId, Arc<Mutex<SessionState>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session handle for `user_id`, creating it on first
    /// contact.
    pub fn session(&self, user_id: UserId) -> Arc<Mutex<SessionState>> {
        if let Some(session) = self.sessions.read().get(&user_id) {
            return Arc::clone(session);
        }
        let mut sessions = self.sessions.write();
        Arc::clone(sessions.entry(user_id).or_default())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quiz() -> Quiz {
        Quiz {
            target_word_id: 1,
            target_text: "cat".to_string(),
            target_translation: "кот".to_string(),
            distractor_texts: vec!["dog".to_string(), "bird".to_string(), "fish".to_string()],
            mode: Mode::New,
        }
    }

    #[test]
    fn deal_keeps_all_four_options() {
        let active = ActiveQuiz::deal(sample_quiz());
        let mut choices = active.display_choices();
        choices.sort();
        assert_eq!(choices, ["bird", "cat", "dog", "fish"]);
    }

    #[test]
    fn wrong_marks_accumulate_and_survive_re_render() {
        let mut active = ActiveQuiz::deal(sample_quiz());
        assert!(active.mark_wrong("dog"));
        assert!(active.mark_wrong("fish"));
        assert!(!active.mark_wrong("elephant"));

        let choices = active.display_choices();
        assert!(choices.contains(&"dog❌".to_string()));
        assert!(choices.contains(&"fish❌".to_string()));
        assert!(choices.contains(&"cat".to_string()));
    }

    #[test]
    fn registry_hands_out_one_session_per_user() {
        let registry = SessionRegistry::new();
        let first = registry.session(7);
        let second = registry.session(7);
        let other = registry.session(8);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(registry.len(), 2);
    }
}
