//! Session state machine: mode selection, card dealing, answer evaluation,
//! deck edits. One inbound event in, one rendering instruction out.

use tokio::sync::MutexGuard;

use crate::core::error::{EventError, QuizError, StoreError};
use crate::core::event::{ButtonAction, EventKind, InboundEvent, OutboundRender};
use crate::core::quiz::{self, Mode, MIN_SAVED_DECK};
use crate::core::session::{ActiveQuiz, SessionRegistry, SessionState};
use crate::core::store::{DeckStore, IdentityStore, UserId, WordStore};

const LABEL_LEARN_NEW: &str = "Учить новые слова";
const LABEL_LEARN_SAVED: &str = "Учить сохраненные слова";

const CHOOSE_MODE: &str = "Выберите режим обучения:";
const ANSWER_CORRECT: &str = "Отлично!❤";
const ANSWER_WRONG: &str = "Допущена ошибка!";
const WORD_ADDED: &str = "Слово добавлено к изучению ➕";
const WORD_REMOVED: &str = "Слово убрано из изучения🔙";
const CATALOGUE_TOO_SMALL: &str = "В каталоге пока слишком мало слов для тренировки.";
const SAMPLING_FAILED: &str = "Не получилось подобрать слова, попробуйте ещё раз.";

pub struct SessionController<W, D, I> {
    words: W,
    decks: D,
    identities: I,
    sessions: SessionRegistry,
}

impl<W, D, I> SessionController<W, D, I>
where
    W: WordStore,
    D: DeckStore,
    I: IdentityStore,
{
    pub fn new(words: W, decks: D, identities: I) -> Self {
        Self {
            words,
            decks,
            identities,
            sessions: SessionRegistry::new(),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Handles one inbound event under the user's session lock. Duplicate
    /// deliveries for the same user serialize here; independent users run
    /// in parallel.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<OutboundRender, EventError> {
        let session = self.sessions.session(event.user_id);
        let mut session = session.lock().await;

        match event.kind {
            EventKind::Command => self.on_command(&mut session, &event).await,
            EventKind::Button => match ButtonAction::parse(&event.payload) {
                Some(action) => self.on_button(&mut session, event.user_id, action).await,
                None => Err(EventError::UnhandledEvent),
            },
            EventKind::Text => self.on_answer(&mut session, &event.payload),
        }
    }

    /// `/start` and `/cards`: greet unknown users, then either deal the next
    /// card of the established mode or ask for a mode.
    async fn on_command(
        &self,
        session: &mut MutexGuard<'_, SessionState>,
        event: &InboundEvent,
    ) -> Result<OutboundRender, EventError> {
        if !matches!(event.payload.as_str(), "start" | "cards") {
            return Err(EventError::UnhandledEvent);
        }

        let greeting = self.greet_first_contact(event).await?;
        let render = match session.mode {
            Some(mode) => self.deal(session, event.user_id, mode).await?,
            None => mode_select_render(),
        };

        Ok(match greeting {
            Some(greeting) => OutboundRender {
                text: format!("{greeting}\n\n{}", render.text),
                ..render
            },
            None => render,
        })
    }

    async fn on_button(
        &self,
        session: &mut MutexGuard<'_, SessionState>,
        user_id: UserId,
        action: ButtonAction,
    ) -> Result<OutboundRender, EventError> {
        match action {
            ButtonAction::LearnNew => self.deal(session, user_id, Mode::New).await,
            ButtonAction::LearnSaved => self.deal(session, user_id, Mode::Saved).await,
            ButtonAction::NextCard => match session.mode {
                Some(mode) => self.deal(session, user_id, mode).await,
                None => Ok(mode_select_render()),
            },
            ButtonAction::BackToMode => {
                session.mode = None;
                session.active = None;
                Ok(mode_select_render())
            }
            ButtonAction::AddWord => self.save_target(session, user_id).await,
            ButtonAction::DeleteWord => self.unsave_target(session, user_id).await,
        }
    }

    /// Runs the quiz engine for `mode` and moves the session into
    /// AWAITING_ANSWER on success. Policy refusals fall back to mode
    /// selection; a store outage leaves the session exactly as it was.
    async fn deal(
        &self,
        session: &mut MutexGuard<'_, SessionState>,
        user_id: UserId,
        mode: Mode,
    ) -> Result<OutboundRender, EventError> {
        match quiz::next_quiz(&self.words, &self.decks, mode, user_id).await {
            Ok(quiz) => {
                let active = ActiveQuiz::deal(quiz);
                let render = card_render(&active);
                session.mode = Some(mode);
                session.active = Some(active);
                Ok(render)
            }
            Err(QuizError::DeckTooSmall { needed }) => {
                session.mode = None;
                session.active = None;
                Ok(deck_too_small_render(needed))
            }
            Err(QuizError::CatalogueTooSmall { available }) => {
                tracing::warn!(available, "catalogue too small for a quiz");
                session.mode = None;
                session.active = None;
                Ok(retry_render(CATALOGUE_TOO_SMALL))
            }
            Err(QuizError::Store(StoreError::Unavailable(err))) => {
                Err(EventError::Store(StoreError::Unavailable(err)))
            }
            Err(QuizError::Store(err)) => {
                tracing::warn!(error = %err, "quiz sampling failed");
                session.mode = None;
                session.active = None;
                Ok(retry_render(SAMPLING_FAILED))
            }
        }
    }

    /// Free-text answer against the live quiz. A wrong answer marks the
    /// matching option and keeps the round open for retries.
    fn on_answer(
        &self,
        session: &mut MutexGuard<'_, SessionState>,
        text: &str,
    ) -> Result<OutboundRender, EventError> {
        let Some(active) = session.active.as_mut() else {
            return Err(EventError::UnhandledEvent);
        };

        let answer = text.trim();
        if answer == active.quiz.target_text {
            let text = format!(
                "{ANSWER_CORRECT}\n{} -> {}",
                active.quiz.target_text, active.quiz.target_translation
            );
            Ok(OutboundRender {
                text,
                choices: active.display_choices(),
                card_actions: true,
            })
        } else {
            active.mark_wrong(answer);
            let text = format!(
                "{ANSWER_WRONG}\nПопробуй ещё раз вспомнить слово 🇷🇺{}",
                active.quiz.target_translation
            );
            Ok(OutboundRender {
                text,
                choices: active.display_choices(),
                card_actions: true,
            })
        }
    }

    async fn save_target(
        &self,
        session: &mut MutexGuard<'_, SessionState>,
        user_id: UserId,
    ) -> Result<OutboundRender, EventError> {
        let active = session.active.as_ref().ok_or(EventError::NoActiveQuiz)?;
        let word_id = active.quiz.target_word_id;

        match self.decks.add(user_id, word_id).await {
            Ok(()) => {}
            Err(StoreError::DuplicateEntry { .. }) => {
                tracing::debug!(user_id, word_id, "word already in deck");
            }
            Err(err) => return Err(EventError::Store(err)),
        }

        Ok(deck_edit_render(WORD_ADDED, active))
    }

    async fn unsave_target(
        &self,
        session: &mut MutexGuard<'_, SessionState>,
        user_id: UserId,
    ) -> Result<OutboundRender, EventError> {
        let active = session.active.as_ref().ok_or(EventError::NoActiveQuiz)?;
        let word_id = active.quiz.target_word_id;

        self.decks.remove(user_id, word_id).await?;
        Ok(deck_edit_render(WORD_REMOVED, active))
    }

    /// Registers the account on first contact and returns the greeting line.
    async fn greet_first_contact(
        &self,
        event: &InboundEvent,
    ) -> Result<Option<String>, EventError> {
        if self.identities.is_known(event.user_id).await? {
            return Ok(None);
        }
        let name = event.display_name.as_deref().unwrap_or("друг");
        self.identities.register(event.user_id, name).await?;
        tracing::info!(user_id = event.user_id, "new user registered");
        Ok(Some(format!("Hello, {name}, let's study English...?")))
    }
}

fn mode_select_render() -> OutboundRender {
    OutboundRender {
        text: CHOOSE_MODE.to_string(),
        choices: vec![LABEL_LEARN_NEW.to_string(), LABEL_LEARN_SAVED.to_string()],
        card_actions: false,
    }
}

fn card_render(active: &ActiveQuiz) -> OutboundRender {
    OutboundRender {
        text: format!(
            "Выбери перевод слова:\n🇷🇺 {}",
            active.quiz.target_translation
        ),
        choices: active.display_choices(),
        card_actions: true,
    }
}

fn deck_edit_render(confirmation: &str, active: &ActiveQuiz) -> OutboundRender {
    OutboundRender {
        text: format!(
            "{confirmation}\nВыбери перевод слова:\n🇷🇺 {}",
            active.quiz.target_translation
        ),
        choices: active.display_choices(),
        card_actions: true,
    }
}

fn deck_too_small_render(needed: usize) -> OutboundRender {
    let size = MIN_SAVED_DECK - needed;
    let mut render = mode_select_render();
    render.text = format!(
        "У вас мало сохраненных слов = {size}, для выбранного режима, \
         добавьте к изучению не меньше {needed} слов.\n\n{CHOOSE_MODE}"
    );
    render
}

fn retry_render(reason: &str) -> OutboundRender {
    let mut render = mode_select_render();
    render.text = format!("{reason}\n\n{CHOOSE_MODE}");
    render
}
