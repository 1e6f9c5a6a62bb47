//! Per-session swipe flow: fetch a candidate, take one gesture, submit it,
//! celebrate a match, fetch the next one.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

use crate::client::{ApiClient, ClientError, Session};
use crate::constants::{DRAG_OFFSET_THRESHOLD, DRAG_VELOCITY_THRESHOLD, MATCH_CELEBRATION_MS, SWIPE_ADVANCE_DELAY_MS};
use crate::models::{Name, SwipeAction, SwipeDirection};

#[derive(Debug, Clone, PartialEq)]
pub enum SwipeState {
    Loading,
    Showing(Name),
    Submitting(Name),
    Celebrating(Name),
    Exhausted,
}

impl SwipeState {
    pub fn label(&self) -> &'static str {
        match self {
            SwipeState::Loading => "loading",
            SwipeState::Showing(_) => "showing",
            SwipeState::Submitting(_) => "submitting",
            SwipeState::Celebrating(_) => "celebrating",
            SwipeState::Exhausted => "exhausted",
        }
    }

    pub fn name(&self) -> Option<&Name> {
        match self {
            SwipeState::Showing(name) | SwipeState::Submitting(name) | SwipeState::Celebrating(name) => Some(name),
            SwipeState::Loading | SwipeState::Exhausted => None,
        }
    }
}

/// A finished drag or a button press on the card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Drag { offset_x: f64, velocity_x: f64 },
    Button(SwipeDirection),
}

impl Gesture {
    /// The direction this gesture counts as, or `None` when the card snaps back.
    pub fn direction(&self) -> Option<SwipeDirection> {
        match *self {
            Gesture::Button(direction) => Some(direction),
            Gesture::Drag { offset_x, velocity_x } => {
                if offset_x > DRAG_OFFSET_THRESHOLD || velocity_x > DRAG_VELOCITY_THRESHOLD {
                    Some(SwipeDirection::Right)
                } else if offset_x < -DRAG_OFFSET_THRESHOLD || velocity_x < -DRAG_VELOCITY_THRESHOLD {
                    Some(SwipeDirection::Left)
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub celebration: Duration,
    pub advance: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            celebration: Duration::from_millis(MATCH_CELEBRATION_MS),
            advance: Duration::from_millis(SWIPE_ADVANCE_DELAY_MS),
        }
    }
}

impl Pacing {
    pub fn immediate() -> Self {
        Self {
            celebration: Duration::ZERO,
            advance: Duration::ZERO,
        }
    }
}

/// What a failed swipe submission does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvancePolicy {
    /// Log the failure and move on to the next candidate.
    #[default]
    Skip,
    /// Resubmit transient failures up to `max_attempts` in total, then skip.
    Retry { max_attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDecision {
    Retry,
    Advance,
}

impl AdvancePolicy {
    pub fn decide(&self, error: &ClientError, attempt: u32) -> FailureDecision {
        match self {
            AdvancePolicy::Retry { max_attempts } if error.is_transient() && attempt < *max_attempts => {
                FailureDecision::Retry
            }
            _ => FailureDecision::Advance,
        }
    }
}

#[derive(Error, Debug)]
pub enum SwipeError {
    #[error("Not accepting swipes while {0}")]
    NotAccepting(&'static str),

    #[error("Failed to load next name: {0}")]
    Fetch(#[source] ClientError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SwipeOutcome {
    /// Below both thresholds, nothing was sent.
    Ignored,
    Recorded { direction: SwipeDirection, is_match: bool },
    /// Submission failed and the policy moved on.
    Skipped { error: String },
}

pub struct SwipeMachine {
    client: Arc<dyn ApiClient>,
    session: Session,
    pacing: Pacing,
    policy: AdvancePolicy,
    state: watch::Sender<SwipeState>,
    swipe_count: u64,
}

impl SwipeMachine {
    pub fn new(client: Arc<dyn ApiClient>, session: Session) -> Self {
        let (state, _) = watch::channel(SwipeState::Loading);
        Self {
            client,
            session,
            pacing: Pacing::default(),
            policy: AdvancePolicy::default(),
            state,
            swipe_count: 0,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_policy(mut self, policy: AdvancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SwipeState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SwipeState {
        self.state.borrow().clone()
    }

    /// Names reviewed in this session, failed submissions included.
    pub fn swipe_count(&self) -> u64 {
        self.swipe_count
    }

    pub async fn start(&mut self) -> Result<SwipeState, SwipeError> {
        self.refresh().await
    }

    /// Fetch the next unseen candidate. On failure the machine stays in
    /// `Loading`.
    pub async fn refresh(&mut self) -> Result<SwipeState, SwipeError> {
        self.publish(SwipeState::Loading);

        let next = self
            .client
            .get_next_name(&self.session, self.session.user_id())
            .await
            .map_err(SwipeError::Fetch)?;

        let state = match next {
            Some(name) => SwipeState::Showing(name),
            None => {
                tracing::info!("{} has reviewed every name", self.session.user.username);
                SwipeState::Exhausted
            }
        };
        self.publish(state.clone());
        Ok(state)
    }

    pub async fn swipe(&mut self, gesture: Gesture) -> Result<SwipeOutcome, SwipeError> {
        let name = match self.state() {
            SwipeState::Showing(name) => name,
            other => return Err(SwipeError::NotAccepting(other.label())),
        };

        let Some(direction) = gesture.direction() else {
            return Ok(SwipeOutcome::Ignored);
        };

        self.swipe_count += 1;
        self.publish(SwipeState::Submitting(name.clone()));

        let outcome = self.submit(&name, direction).await;
        self.refresh().await?;
        Ok(outcome)
    }

    async fn submit(&self, name: &Name, direction: SwipeDirection) -> SwipeOutcome {
        let mut attempt = 0;
        let mut may_have_landed = false;
        loop {
            attempt += 1;
            let action = SwipeAction {
                name_id: name.id,
                user_id: self.session.user_id(),
                action: direction.decision(),
                timestamp: Utc::now(),
            };

            match self.client.swipe_name(&self.session, &action).await {
                Ok(result) if result.is_match => {
                    tracing::info!("Match on {}", result.name.name);
                    return self.finish(direction, Some(result.name)).await;
                }
                Ok(_) => return self.finish(direction, None).await,
                // An earlier attempt was committed but its response was lost
                Err(ClientError::Conflict(_)) if may_have_landed => {
                    tracing::info!("Swipe on {} was already recorded", name.name);
                    let matched = self.recorded_match(name).await;
                    return self.finish(direction, matched).await;
                }
                Err(e) => match self.policy.decide(&e, attempt) {
                    FailureDecision::Retry => {
                        tracing::debug!("Retrying swipe on {} (attempt {}): {}", name.name, attempt, e);
                        may_have_landed = true;
                    }
                    FailureDecision::Advance => {
                        tracing::warn!("Failed to process swipe on {}: {}", name.name, e);
                        return SwipeOutcome::Skipped { error: e.to_string() };
                    }
                },
            }
        }
    }

    /// Celebrate when `matched` is set, then wait before the next fetch.
    async fn finish(&self, direction: SwipeDirection, matched: Option<Name>) -> SwipeOutcome {
        let is_match = matched.is_some();
        match matched {
            Some(name) => {
                self.publish(SwipeState::Celebrating(name));
                tokio::time::sleep(self.pacing.celebration).await;
            }
            None => tokio::time::sleep(self.pacing.advance).await,
        }
        SwipeOutcome::Recorded { direction, is_match }
    }

    /// Whether the backend holds a match on `name` for this user.
    async fn recorded_match(&self, name: &Name) -> Option<Name> {
        match self.client.get_matches(&self.session, self.session.user_id()).await {
            Ok(matches) => matches.iter().any(|m| m.name_id == name.id).then(|| name.clone()),
            Err(e) => {
                tracing::warn!("Could not check matches for {}: {}", name.name, e);
                None
            }
        }
    }

    fn publish(&self, state: SwipeState) {
        self.state.send_replace(state);
    }
}
