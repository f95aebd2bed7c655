//! services/companion/src/chat/turn_task.rs
//!
//! This module contains the asynchronous "worker" function that drives one
//! conversational turn: it gathers the material for a plan, builds the plan
//! and walks its steps.

use crate::chat::picker::RandomPicker;
use crate::chat::state::{advance, Shared, TurnId, TurnState};
use dish_companion_core::intent::is_nearby_request;
use dish_companion_core::{
    canned_reply, DishDescription, DishRecognitionService, ReplyPicker, Sender, TurnPlan,
    TurnTiming,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where a turn's reply comes from.
#[derive(Clone)]
pub enum Responder {
    /// Ask the dish backend.
    Backend(Arc<dyn DishRecognitionService>),
    /// Answer from the local reply table.
    Offline(Arc<dyn ReplyPicker>),
}

impl Responder {
    pub fn backend(service: Arc<dyn DishRecognitionService>) -> Self {
        Responder::Backend(service)
    }

    /// Offline replies with a random fallback choice.
    pub fn offline() -> Self {
        Responder::Offline(Arc::new(RandomPicker))
    }
}

/// Everything one turn task owns.
pub(crate) struct TurnContext {
    pub id: TurnId,
    pub input: DishDescription,
    pub shared: Arc<Shared>,
    pub token: CancellationToken,
    pub state: Arc<watch::Sender<TurnState>>,
    pub responder: Responder,
    pub timing: TurnTiming,
    pub location: Option<String>,
}

/// The main asynchronous task for one turn. The user's message has already
/// been appended and the typing indicator shown when this starts.
///
/// Returns the state the turn ended in: `Completed`, or `Superseded` if a
/// newer turn (or leaving the conversation) cut it short.
pub(crate) async fn turn_process(turn: TurnContext) -> TurnState {
    if !advance(&turn.state, TurnState::Planning) {
        return TurnState::Superseded;
    }

    // Dropping the plan future also drops any backend call still in flight.
    let plan = tokio::select! {
        _ = turn.token.cancelled() => None,
        plan = build_plan(&turn) => Some(plan),
    };
    match plan {
        Some(plan) if !turn.token.is_cancelled() => emit(&turn, plan).await,
        _ => {
            info!("{} superseded while planning.", turn.id);
            TurnState::Superseded
        }
    }
}

async fn build_plan(turn: &TurnContext) -> TurnPlan {
    let input = turn.input.as_str();

    if is_nearby_request(input) {
        debug!("{} asks for nearby places.", turn.id);
        return TurnPlan::nearby();
    }

    match &turn.responder {
        Responder::Offline(picker) => TurnPlan::canned(canned_reply(input, picker.as_ref()), &turn.timing),
        Responder::Backend(service) => {
            match service.recognize_dish(&turn.input, turn.location.as_deref()).await {
                Ok(result) => TurnPlan::for_recognition(input, &result, &turn.timing).unwrap_or_else(|e| {
                    warn!("{} could not build a plan from the result: {}", turn.id, e);
                    TurnPlan::display_trouble()
                }),
                Err(failure) => {
                    warn!(
                        "{} dish recognition failed: {} ({:?})",
                        turn.id, failure, failure.detail
                    );
                    TurnPlan::for_failure(input, &failure)
                }
            }
        }
    }
}

async fn emit(turn: &TurnContext, plan: TurnPlan) -> TurnState {
    let steps = plan.into_steps();
    let mut typing = true;

    for (index, step) in steps.iter().enumerate() {
        if !advance(&turn.state, TurnState::Emitting(index)) {
            return TurnState::Superseded;
        }

        if step.emits_typing_before && !typing {
            let shown = turn
                .shared
                .if_active(turn.id, |_, sink| sink.set_typing_indicator(true))
                .await;
            if shown.is_none() {
                return TurnState::Superseded;
            }
            typing = true;
        }

        if !step.delay.is_zero() {
            tokio::select! {
                _ = turn.token.cancelled() => {
                    info!("{} superseded before step {}.", turn.id, index);
                    return TurnState::Superseded;
                }
                _ = tokio::time::sleep(step.delay) => {}
            }
        }

        let keep_typing = steps
            .get(index + 1)
            .is_some_and(|next| next.emits_typing_before);
        let clear_typing = typing && !keep_typing;
        let draft = step.draft.clone();

        let appended = turn
            .shared
            .if_active(turn.id, |ledger, sink| {
                sink.append_message(ledger.stamp(draft, Sender::Agent));
                if clear_typing {
                    sink.set_typing_indicator(false);
                }
            })
            .await;
        if appended.is_none() {
            info!("{} superseded before appending step {}.", turn.id, index);
            return TurnState::Superseded;
        }
        if clear_typing {
            typing = false;
        }
    }

    let state = &turn.state;
    let completed = turn
        .shared
        .if_active(turn.id, |ledger, sink| {
            if typing {
                sink.set_typing_indicator(false);
            }
            ledger.active = None;
            advance(state, TurnState::Completed);
        })
        .await;

    match completed {
        Some(()) => {
            info!("{} completed with {} message(s).", turn.id, steps.len());
            TurnState::Completed
        }
        None => TurnState::Superseded,
    }
}
