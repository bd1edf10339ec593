//! Questionnaire sessions — one flow machine per user, held server-side.
//!
//! Each session sits behind its own `std::sync::Mutex`, never held across an
//! await. Flow-mutating requests take the lock with `try_lock`; a request that
//! finds it taken is ignored rather than queued.
//!
//! A session also keeps the suggestion panel for the current question; it is
//! rebuilt from the stored draft whenever the flow settles on a question.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::portfolio::pipeline::{generate_portfolio, GenerationOutcome};
use crate::questionnaire::autocomplete::{filter_suggestions, EnterAction, SuggestionPanel};
use crate::questionnaire::catalog::{Answers, Catalog};
use crate::questionnaire::flow::{FlowMachine, Stage, Step};
use crate::share::{save_share, ShareStore};

/// Sessions untouched for this long are evicted by the sweeper.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

pub type SessionHandle = Arc<Mutex<FlowSession>>;

/// What a request did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Advanced,
    Completed,
    Stayed,
    Ignored,
    Generated,
    AlreadyGenerated,
    /// Suggestion panel changed; the flow did not move.
    Updated,
}

/// Input and dropdown events for the current question's suggestion panel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PanelEvent {
    Focus,
    Dismiss,
    Type { value: String },
    HighlightNext,
    HighlightPrevious,
    Hover { index: usize },
    Pick { index: usize },
    /// Picks the highlighted suggestion, or submits the input as the answer.
    Enter,
}

/// Flow-mutating requests.
#[derive(Debug, Clone)]
pub enum FlowAction {
    Continue(String),
    Skip,
    Revisit(String),
    Panel(PanelEvent),
}

enum GenerationSlot {
    Idle,
    InFlight,
    Done(GenerationOutcome),
}

pub struct FlowSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_touched: Instant,
    machine: FlowMachine,
    panel: Option<SuggestionPanel>,
    generation: GenerationSlot,
    share_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub id: &'static str,
    pub text: &'static str,
    pub placeholder: &'static str,
    pub suggestions: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PanelView {
    pub input: String,
    pub shown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<usize>,
    pub suggestions: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub stage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    pub draft: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel: Option<PanelView>,
    pub answers: Answers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_id: Option<String>,
}

enum GenerationStart {
    Ready(Answers),
    InFlight,
    Finished,
    NotReady,
}

impl FlowSession {
    fn new(catalog: Arc<Catalog>) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_touched: Instant::now(),
            machine: FlowMachine::new(catalog),
            panel: None,
            generation: GenerationSlot::Idle,
            share_id: None,
        };
        session.reset_panel();
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    /// Applies one action and settles the transition it started.
    pub fn apply(&mut self, action: &FlowAction) -> Result<Outcome, AppError> {
        self.touch();
        let step = match action {
            FlowAction::Continue(answer) => self.machine.continue_with(answer),
            FlowAction::Skip => self.machine.skip(),
            FlowAction::Revisit(id) => self.machine.revisit(id),
            FlowAction::Panel(event) => return self.apply_panel(event),
        };
        self.settle(step)
    }

    fn settle(&mut self, step: Step) -> Result<Outcome, AppError> {
        let outcome = match step {
            Step::Moving { .. } => {
                self.machine.complete_transition();
                Outcome::Advanced
            }
            Step::Completed => Outcome::Completed,
            Step::Stayed => Outcome::Stayed,
            Step::Ignored => return Ok(Outcome::Ignored),
            Step::Rejected => {
                return Err(AppError::UnprocessableEntity(
                    "Answer does not satisfy this question".to_string(),
                ))
            }
        };
        self.reset_panel();
        Ok(outcome)
    }

    fn apply_panel(&mut self, event: &PanelEvent) -> Result<Outcome, AppError> {
        let Some(panel) = self.panel.as_mut() else {
            return Ok(Outcome::Ignored);
        };
        match event {
            PanelEvent::Focus => panel.focus(),
            PanelEvent::Dismiss => panel.dismiss(),
            PanelEvent::Type { value } => panel.type_input(value),
            PanelEvent::HighlightNext => panel.highlight_next(),
            PanelEvent::HighlightPrevious => panel.highlight_previous(),
            PanelEvent::Hover { index } => panel.hover(*index),
            PanelEvent::Pick { index } => {
                panel.pick(*index);
            }
            PanelEvent::Enter => {
                if let EnterAction::Submit(answer) = panel.press_enter() {
                    let step = self.machine.continue_with(&answer);
                    return self.settle(step);
                }
            }
        }
        Ok(Outcome::Updated)
    }

    fn reset_panel(&mut self) {
        let panel = self
            .machine
            .current_question()
            .map(|(_, q)| SuggestionPanel::new(*q, self.machine.draft()));
        self.panel = panel;
    }

    /// Suggestions for the current question, empty once the questions are done.
    pub fn suggestions(&self, input: &str) -> Vec<&'static str> {
        self.machine
            .current_question()
            .map(|(_, q)| filter_suggestions(q, input))
            .unwrap_or_default()
    }

    pub fn view(&self, outcome: Option<Outcome>) -> SessionView {
        let total = self.machine.catalog().len();
        let question = self.machine.current_question().map(|(index, q)| QuestionView {
            index,
            total,
            id: q.id,
            text: q.text,
            placeholder: q.placeholder,
            suggestions: filter_suggestions(q, ""),
        });
        let stage = match self.machine.stage() {
            Stage::Asking(_) => "asking",
            Stage::Generating => "generating",
            Stage::Preview => "preview",
        };
        let generation = match &self.generation {
            GenerationSlot::Done(outcome) => Some(outcome.clone()),
            _ => None,
        };

        SessionView {
            session_id: self.id,
            created_at: self.created_at,
            stage,
            outcome,
            question,
            draft: self.machine.draft().to_string(),
            panel: self.panel.as_ref().map(|panel| PanelView {
                input: panel.input().to_string(),
                shown: panel.is_shown(),
                highlighted: panel.highlighted(),
                suggestions: panel.visible_suggestions(),
            }),
            answers: self.machine.answers().clone(),
            generation,
            share_id: self.share_id.clone(),
        }
    }

    fn begin_generation(&mut self) -> GenerationStart {
        self.touch();
        let stage = self.machine.stage();
        match self.generation {
            GenerationSlot::InFlight => GenerationStart::InFlight,
            GenerationSlot::Done(_) => GenerationStart::Finished,
            GenerationSlot::Idle if stage == Stage::Generating => {
                self.generation = GenerationSlot::InFlight;
                GenerationStart::Ready(self.machine.answers().clone())
            }
            GenerationSlot::Idle => GenerationStart::NotReady,
        }
    }

    fn complete_generation(&mut self, outcome: GenerationOutcome, share_id: Option<String>) {
        self.touch();
        self.generation = GenerationSlot::Done(outcome);
        self.share_id = share_id;
        self.machine.finish_generation();
    }

    fn abandon_generation(&mut self) {
        if matches!(self.generation, GenerationSlot::InFlight) {
            self.generation = GenerationSlot::Idle;
        }
    }
}

/// Locks a session, recovering the guard if a previous holder panicked.
pub fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, FlowSession> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Applies `action` unless another request currently holds the session.
pub fn apply_action(handle: &SessionHandle, action: &FlowAction) -> Result<SessionView, AppError> {
    match handle.try_lock() {
        Ok(mut session) => {
            let outcome = session.apply(action)?;
            Ok(session.view(Some(outcome)))
        }
        Err(TryLockError::Poisoned(poisoned)) => {
            let mut session = poisoned.into_inner();
            let outcome = session.apply(action)?;
            Ok(session.view(Some(outcome)))
        }
        Err(TryLockError::WouldBlock) => Ok(lock_session(handle).view(Some(Outcome::Ignored))),
    }
}

/// Runs the generation pipeline at most once per session.
///
/// The model call runs in its own task so a dropped request cannot strand the
/// session in `InFlight`. A successful result is saved for sharing; a failed
/// save only leaves `share_id` empty.
pub async fn generate_for_session(
    handle: SessionHandle,
    generator: Arc<dyn TextGenerator>,
    shares: Arc<dyn ShareStore>,
) -> Result<SessionView, AppError> {
    let answers = {
        let mut session = lock_session(&handle);
        match session.begin_generation() {
            GenerationStart::Ready(answers) => answers,
            GenerationStart::InFlight => return Ok(session.view(Some(Outcome::Ignored))),
            GenerationStart::Finished => {
                return Ok(session.view(Some(Outcome::AlreadyGenerated)))
            }
            GenerationStart::NotReady => {
                return Err(AppError::UnprocessableEntity(
                    "Questionnaire is not complete".to_string(),
                ))
            }
        }
    };

    let task_handle = handle.clone();
    let task = tokio::spawn(async move {
        let outcome = generate_portfolio(generator.as_ref(), &answers).await;
        let share_id = if outcome.is_ok() {
            match save_share(shares.as_ref(), &outcome.data).await {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Failed to save share, preview will have no link: {e}");
                    None
                }
            }
        } else {
            None
        };
        let mut session = lock_session(&task_handle);
        session.complete_generation(outcome, share_id);
        session.view(Some(Outcome::Generated))
    });

    match task.await {
        Ok(view) => Ok(view),
        Err(e) => {
            lock_session(&handle).abandon_generation();
            Err(AppError::Internal(anyhow::anyhow!("Generation task failed: {e}")))
        }
    }
}

/// All live sessions, keyed by id.
#[derive(Clone)]
pub struct SessionRegistry {
    catalog: Arc<Catalog>,
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_idle_ttl(catalog, SESSION_IDLE_TTL)
    }

    pub fn with_idle_ttl(catalog: Arc<Catalog>, idle_ttl: Duration) -> Self {
        Self {
            catalog,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub fn create(&self) -> SessionHandle {
        let session = FlowSession::new(self.catalog.clone());
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handle.clone());
        info!("Created questionnaire session {id}");
        handle
    }

    pub fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Drops sessions idle for longer than the TTL. Returns how many were evicted.
    pub fn sweep_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, handle| {
            let session = lock_session(handle);
            now.duration_since(session.last_touched) <= self.idle_ttl
        });
        before - sessions.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
