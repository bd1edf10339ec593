//! Question-flow state machine.
//!
//! Tracks the cursor into the catalog and the collected answers. A move between
//! questions is two-phase: `continue_with`/`skip`/`revisit` record a pending
//! target, `complete_transition` applies it. Every flow-mutating call made while
//! a target is pending is dropped and reported as `Step::Ignored`.

use std::sync::Arc;

use crate::questionnaire::catalog::{Answers, Catalog, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Asking(usize),
    Generating,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition to another question is pending.
    Moving { to: usize },
    /// The last question was completed; the flow is now generating.
    Completed,
    /// The answer was stored but the cursor stays put (unknown or self branch target).
    Stayed,
    /// The answer failed validation; nothing changed.
    Rejected,
    /// Dropped because a transition is pending or the flow is past the questions.
    Ignored,
}

pub struct FlowMachine {
    catalog: Arc<Catalog>,
    answers: Answers,
    stage: Stage,
    pending: Option<usize>,
}

impl FlowMachine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            answers: Answers::new(),
            stage: Stage::Asking(0),
            pending: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The question currently asked, if the flow is still collecting answers.
    pub fn current_question(&self) -> Option<(usize, &Question)> {
        match self.stage {
            Stage::Asking(index) => self.catalog.get(index).map(|q| (index, q)),
            _ => None,
        }
    }

    /// The previously stored answer for the current question, used to pre-fill input.
    pub fn draft(&self) -> &str {
        self.current_question()
            .and_then(|(_, q)| self.answers.get(q.id))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Submits an answer for the current question.
    pub fn continue_with(&mut self, answer: &str) -> Step {
        let Some((index, question)) = self.accepting_question() else {
            return Step::Ignored;
        };
        let trimmed = answer.trim();
        if !question.accepts(trimmed) {
            return Step::Rejected;
        }
        self.record_and_route(index, question, trimmed.to_string())
    }

    /// Stores an empty answer for the current question, bypassing validation.
    pub fn skip(&mut self) -> Step {
        let Some((index, question)) = self.accepting_question() else {
            return Step::Ignored;
        };
        self.record_and_route(index, question, String::new())
    }

    /// Jumps to a question by id without answering the current one.
    pub fn revisit(&mut self, question_id: &str) -> Step {
        let Some((index, _)) = self.accepting_question() else {
            return Step::Ignored;
        };
        match self.catalog.find_index_by_id(question_id) {
            Some(target) if target != index => self.begin_transition(target),
            _ => Step::Stayed,
        }
    }

    /// Applies the pending move, if any. Returns whether the cursor changed.
    pub fn complete_transition(&mut self) -> bool {
        match self.pending.take() {
            Some(target) => {
                self.stage = Stage::Asking(target);
                true
            }
            None => false,
        }
    }

    /// Marks generation as finished. Only valid from `Generating`.
    pub fn finish_generation(&mut self) -> bool {
        if self.stage == Stage::Generating {
            self.stage = Stage::Preview;
            true
        } else {
            false
        }
    }

    fn accepting_question(&self) -> Option<(usize, Question)> {
        if self.pending.is_some() {
            return None;
        }
        self.current_question().map(|(i, q)| (i, *q))
    }

    fn record_and_route(&mut self, index: usize, question: Question, value: String) -> Step {
        self.answers.insert(question.id.to_string(), value);
        let value = self.answers.get(question.id).map(String::as_str).unwrap_or("");

        let branch_target = question.branch.and_then(|branch| branch(value, &self.answers));
        if let Some(next_id) = branch_target {
            return match self.catalog.find_index_by_id(next_id) {
                Some(target) if target != index => self.begin_transition(target),
                _ => Step::Stayed,
            };
        }

        if index + 1 >= self.catalog.len() {
            self.stage = Stage::Generating;
            Step::Completed
        } else {
            self.begin_transition(index + 1)
        }
    }

    fn begin_transition(&mut self, target: usize) -> Step {
        self.pending = Some(target);
        Step::Moving { to: target }
    }
}
