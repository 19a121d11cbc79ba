//! Intent dispatcher - the bounded tool-call loop
//!
//! One dispatcher owns one session's history and processes one turn at a
//! time: send history plus the tool manifest to the model, execute any
//! requested tool calls sequentially, fold results back into history, and
//! repeat until the model answers or the per-turn call ceiling is hit.
//!
//! Tool failures are recoverable: they become failed results the model can
//! react to. Only two things fail a turn - the model transport, and the
//! call ceiling. Neither ends the session.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::chat::ChatSession;
use super::persistence;
use super::types::{SessionConfig, SessionId, SessionInput, SessionOutput, TurnFailure};
use crate::error::Error;
use crate::executor::ToolExecutor;
use crate::provider::{ModelClient, ModelTurn, ToolCallRequest};
use crate::tools::ToolDefinition;

/// Phase of the turn currently being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingModel,
    ExecutingTools,
    Done,
    Failed,
}

/// Terminal result of one turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Done { answer: String },
    Failed { reason: TurnFailure, message: String },
}

/// The per-session dispatcher
pub struct Dispatcher {
    session_id: SessionId,
    model: Arc<dyn ModelClient>,
    executor: ToolExecutor,
    /// Tool manifest sent to the model every request; built once from the
    /// registry since the registry never changes after startup
    manifest: Vec<ToolDefinition>,
    session: ChatSession,
    max_tool_calls: usize,
    phase: TurnPhase,
    output_tx: mpsc::Sender<(SessionId, SessionOutput)>,
    save_session: bool,
}

impl Dispatcher {
    pub fn new(
        session_id: impl Into<SessionId>,
        config: SessionConfig,
        output_tx: mpsc::Sender<(SessionId, SessionOutput)>,
    ) -> Self {
        let session = match &config.system_prompt {
            Some(prompt) => ChatSession::with_system_prompt(prompt.as_str(), config.limits.max_history),
            None => ChatSession::new(config.limits.max_history),
        };

        Self {
            session_id: session_id.into(),
            model: config.model,
            executor: ToolExecutor::new(config.registry.clone()),
            manifest: config.registry.list(),
            session,
            max_tool_calls: config.limits.max_tool_calls,
            phase: TurnPhase::Done,
            output_tx,
            save_session: config.save_session,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Run the dispatcher until the input channel closes.
    ///
    /// Inputs are consumed serially, so a message arriving mid-turn waits in
    /// the channel; turns never interleave within a session.
    pub async fn run(mut self, mut input_rx: mpsc::Receiver<SessionInput>) {
        info!(session = %self.session_id, "dispatcher started");

        while let Some(input) = input_rx.recv().await {
            match input {
                SessionInput::UserMessage { content } => {
                    self.handle_user_message(content).await;
                }
                SessionInput::Reset => {
                    self.session.clear();
                    self.emit(SessionOutput::HistoryCleared).await;
                    info!(session = %self.session_id, "history cleared");
                }
            }
            self.emit(SessionOutput::idle()).await;
        }

        if self.save_session {
            if let Err(e) = persistence::save_session(&self.session_id, &self.session) {
                error!(session = %self.session_id, error = %e, "failed to save session");
            }
        }

        info!(session = %self.session_id, "dispatcher ended");
    }

    /// Process one user message through to a terminal outcome
    pub async fn handle_user_message(&mut self, content: String) -> TurnOutcome {
        let msg_id = uuid::Uuid::new_v4().to_string();
        self.emit(SessionOutput::user_message(msg_id.as_str(), content.as_str()))
            .await;
        self.session.add_user_message(content.as_str());

        let outcome = self.run_turn().await;

        match &outcome {
            TurnOutcome::Done { .. } => {
                info!(session = %self.session_id, "turn complete");
            }
            TurnOutcome::Failed { reason, message } => {
                warn!(session = %self.session_id, ?reason, %message, "turn failed");
            }
        }
        outcome
    }

    /// The bounded loop itself
    async fn run_turn(&mut self) -> TurnOutcome {
        let mut executed: usize = 0;
        self.phase = TurnPhase::AwaitingModel;

        loop {
            self.emit(SessionOutput::thinking()).await;

            let model_turn = match self.model.send(self.session.messages(), &self.manifest).await {
                Ok(turn) => turn,
                Err(e) => return self.fail_model_unavailable(e).await,
            };

            match model_turn {
                ModelTurn::Answer(text) => {
                    return self.finish_turn(text).await;
                }
                ModelTurn::ToolCalls { content, calls } if calls.is_empty() => {
                    // A tool-call turn with no calls has nowhere to go;
                    // treat any text as the answer rather than spinning
                    return self.finish_turn(content.unwrap_or_default()).await;
                }
                ModelTurn::ToolCalls { content, calls } => {
                    self.phase = TurnPhase::ExecutingTools;
                    self.session
                        .add_assistant_message(content.unwrap_or_default(), calls.clone());

                    for call in &calls {
                        if executed >= self.max_tool_calls {
                            return self.fail_call_limit().await;
                        }
                        self.execute_call(call).await;
                        executed += 1;
                    }

                    self.phase = TurnPhase::AwaitingModel;
                }
            }
        }
    }

    /// Execute one requested call and fold the result into history.
    ///
    /// Calls within a model turn run sequentially in the order received;
    /// their ordering carries no dependency contract.
    async fn execute_call(&mut self, call: &ToolCallRequest) {
        self.emit(SessionOutput::tool_start(
            call.call_id.as_str(),
            call.name.as_str(),
            call.arguments.clone(),
        ))
        .await;

        let result = self.executor.execute(call).await;
        let content = result.to_message_content();

        self.session.add_tool_result(&call.call_id, content.as_str());
        self.emit(SessionOutput::tool_done(
            call.call_id.as_str(),
            call.name.as_str(),
            result.success,
            content,
        ))
        .await;
    }

    async fn finish_turn(&mut self, answer: String) -> TurnOutcome {
        let msg_id = uuid::Uuid::new_v4().to_string();
        self.session.add_assistant_message(answer.as_str(), vec![]);
        self.emit(SessionOutput::assistant_message(msg_id.as_str(), answer.as_str()))
            .await;
        self.phase = TurnPhase::Done;
        TurnOutcome::Done { answer }
    }

    async fn fail_model_unavailable(&mut self, e: Error) -> TurnOutcome {
        let message = format!("The language model is unavailable: {}", e);
        // The failure is recorded in history so the next turn has context
        self.session.add_assistant_message(message.as_str(), vec![]);
        self.emit(SessionOutput::turn_failed(TurnFailure::ModelUnavailable, message.as_str()))
            .await;
        self.phase = TurnPhase::Failed;
        TurnOutcome::Failed {
            reason: TurnFailure::ModelUnavailable,
            message,
        }
    }

    async fn fail_call_limit(&mut self) -> TurnOutcome {
        let message = format!(
            "Stopped after {} tool calls in a single turn; remaining requested calls were not executed.",
            self.max_tool_calls
        );
        self.session.add_assistant_message(message.as_str(), vec![]);
        self.emit(SessionOutput::turn_failed(TurnFailure::CallLimitExceeded, message.as_str()))
            .await;
        self.phase = TurnPhase::Failed;
        TurnOutcome::Failed {
            reason: TurnFailure::CallLimitExceeded,
            message,
        }
    }

    async fn emit(&self, output: SessionOutput) {
        if let Err(e) = self.output_tx.send((self.session_id.clone(), output)).await {
            error!(session = %self.session_id, "failed to emit output: {}", e);
        }
    }
}
