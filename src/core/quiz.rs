//! Word-selection engine: builds one quiz round from the stores.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::QuizError;
use crate::core::store::{DeckStore, UserId, WordId, WordStore};

/// Options shown per round: one target plus three distractors.
pub const QUIZ_OPTIONS: usize = 4;

/// Saved mode stays locked until the deck holds this many words.
pub const MIN_SAVED_DECK: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    New,
    Saved,
}

/// One round's target word plus its distractor texts.
///
/// Display order is not part of the quiz; the session shuffles the options
/// once when the round is dealt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub target_word_id: WordId,
    pub target_text: String,
    pub target_translation: String,
    pub distractor_texts: Vec<String>,
    pub mode: Mode,
}

/// Builds the next quiz for `mode`, enforcing the deck-size gate.
///
/// `CatalogueTooSmall` and `DeckTooSmall` are policy refusals the caller
/// turns into a mode re-selection prompt; they are never retried here.
pub async fn next_quiz<W, D>(
    words: &W,
    decks: &D,
    mode: Mode,
    user_id: UserId,
) -> Result<Quiz, QuizError>
where
    W: WordStore,
    D: DeckStore,
{
    let ids = match mode {
        Mode::New => {
            let available = words.count().await?;
            if available < QUIZ_OPTIONS {
                return Err(QuizError::CatalogueTooSmall { available });
            }
            words.sample(QUIZ_OPTIONS).await?
        }
        Mode::Saved => {
            let size = decks.size(user_id).await?;
            if size < MIN_SAVED_DECK {
                return Err(QuizError::DeckTooSmall {
                    needed: MIN_SAVED_DECK - size,
                });
            }
            decks.sample_from_deck(user_id, QUIZ_OPTIONS).await?
        }
    };

    let rows = words.lookup(&ids).await?;
    if rows.len() < QUIZ_OPTIONS {
        // A sampled id vanished between sample and lookup.
        return Err(QuizError::CatalogueTooSmall {
            available: rows.len(),
        });
    }

    // The target is an explicit random pick among the sampled rows, never
    // whatever row the store happened to return first.
    let target_index = rand::rng().random_range(0..rows.len());
    let target = &rows[target_index];
    let distractor_texts = rows
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != target_index)
        .map(|(_, row)| row.source_text.clone())
        .collect();

    Ok(Quiz {
        target_word_id: target.id,
        target_text: target.source_text.clone(),
        target_translation: target.target_text.clone(),
        distractor_texts,
        mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::memory::{MemDeckStore, MemWordStore};

    fn four_word_catalogue() -> MemWordStore {
        MemWordStore::with_words(&[
            (1, "cat", "кот"),
            (2, "dog", "собака"),
            (3, "bird", "птица"),
            (4, "fish", "рыба"),
        ])
    }

    #[tokio::test]
    async fn new_mode_target_is_not_among_distractors() {
        let words = MemWordStore::with_words(&[
            (1, "cat", "кот"),
            (2, "dog", "собака"),
            (3, "bird", "птица"),
            (4, "fish", "рыба"),
            (7, "house", "дом"),
            (9, "water", "вода"),
        ]);
        let decks = MemDeckStore::default();

        for _ in 0..50 {
            let quiz = next_quiz(&words, &decks, Mode::New, 1).await.unwrap();
            assert_eq!(quiz.distractor_texts.len(), QUIZ_OPTIONS - 1);
            assert!(!quiz.distractor_texts.contains(&quiz.target_text));

            let mut options = quiz.distractor_texts.clone();
            options.push(quiz.target_text.clone());
            options.sort();
            options.dedup();
            assert_eq!(options.len(), QUIZ_OPTIONS);
        }
    }

    #[tokio::test]
    async fn four_word_catalogue_never_invents_a_fifth_option() {
        let words = four_word_catalogue();
        let decks = MemDeckStore::default();
        let known = ["cat", "dog", "bird", "fish"];

        for _ in 0..20 {
            let quiz = next_quiz(&words, &decks, Mode::New, 1).await.unwrap();
            assert!(known.contains(&quiz.target_text.as_str()));
            for distractor in &quiz.distractor_texts {
                assert!(known.contains(&distractor.as_str()));
            }
            // All four catalogue words are on the card.
            let mut options = quiz.distractor_texts.clone();
            options.push(quiz.target_text.clone());
            options.sort();
            assert_eq!(options, ["bird", "cat", "dog", "fish"]);
        }
    }

    #[tokio::test]
    async fn new_mode_requires_four_words() {
        let words = MemWordStore::with_words(&[(1, "cat", "кот"), (2, "dog", "собака")]);
        let decks = MemDeckStore::default();

        let err = next_quiz(&words, &decks, Mode::New, 1).await.unwrap_err();
        assert!(matches!(err, QuizError::CatalogueTooSmall { available: 2 }));
    }

    #[tokio::test]
    async fn saved_mode_reports_exact_shortfall() {
        let words = big_catalogue(20);
        let decks = MemDeckStore::with_deck(5, &(1..=9).collect::<Vec<_>>());

        let err = next_quiz(&words, &decks, Mode::Saved, 5).await.unwrap_err();
        assert!(matches!(err, QuizError::DeckTooSmall { needed: 1 }));

        // One more saved word unlocks the mode.
        decks.add(5, 10).await.unwrap();
        let quiz = next_quiz(&words, &decks, Mode::Saved, 5).await.unwrap();
        assert_eq!(quiz.mode, Mode::Saved);
    }

    #[tokio::test]
    async fn saved_mode_samples_only_from_the_deck() {
        let words = big_catalogue(40);
        let deck_ids: Vec<_> = (11..=22).collect();
        let decks = MemDeckStore::with_deck(9, &deck_ids);

        for _ in 0..30 {
            let quiz = next_quiz(&words, &decks, Mode::Saved, 9).await.unwrap();
            assert!(deck_ids.contains(&quiz.target_word_id));
            for distractor in &quiz.distractor_texts {
                let id: i32 = distractor
                    .strip_prefix("word")
                    .and_then(|raw| raw.parse().ok())
                    .unwrap();
                assert!(deck_ids.contains(&id));
            }
        }
    }

    #[tokio::test]
    async fn sampling_exactly_four_from_four_terminates_with_all_four() {
        let words = four_word_catalogue();
        let decks = MemDeckStore::default();

        let quiz = next_quiz(&words, &decks, Mode::New, 1).await.unwrap();
        let mut options = quiz.distractor_texts.clone();
        options.push(quiz.target_text);
        assert_eq!(options.len(), 4);
    }

    fn big_catalogue(size: i32) -> MemWordStore {
        let entries: Vec<(i32, String, String)> = (1..=size)
            .map(|id| (id, format!("word{id}"), format!("слово{id}")))
            .collect();
        let borrowed: Vec<(i32, &str, &str)> = entries
            .iter()
            .map(|(id, source, target)| (*id, source.as_str(), target.as_str()))
            .collect();
        MemWordStore::with_words(&borrowed)
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn run<F: std::future::Future>(future: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("test runtime")
                .block_on(future)
        }

        proptest! {
            #[test]
            fn quiz_options_always_pairwise_distinct(word_count in 4i32..40) {
                let words = big_catalogue(word_count);
                let decks = MemDeckStore::default();
                let quiz = run(next_quiz(&words, &decks, Mode::New, 1)).unwrap();

                let mut options = quiz.distractor_texts.clone();
                options.push(quiz.target_text.clone());
                options.sort();
                options.dedup();
                prop_assert_eq!(options.len(), QUIZ_OPTIONS);
                prop_assert!(!quiz.distractor_texts.contains(&quiz.target_text));
            }

            #[test]
            fn deck_gate_reports_exact_shortfall(deck_size in 0usize..MIN_SAVED_DECK) {
                let words = big_catalogue(30);
                let deck_ids: Vec<i32> = (1..=deck_size as i32).collect();
                let decks = MemDeckStore::with_deck(3, &deck_ids);

                let err = run(next_quiz(&words, &decks, Mode::Saved, 3)).unwrap_err();
                match err {
                    QuizError::DeckTooSmall { needed } => {
                        prop_assert_eq!(needed, MIN_SAVED_DECK - deck_size);
                    }
                    other => prop_assert!(false, "unexpected error: {other}"),
                }
            }
        }
    }
}
