use serde::Serialize;
use uuid::Uuid;

use crate::{
	CancellationToken, Error, ImageInput, MatchEngine, MatchOutcome, RefineOutcome, Result,
};
use vismatch_domain::{CandidateItem, DetectedAttributes, ExclusionSet};

/// Where a recognition attempt stands.
///
/// `NoMatches`, `Exhausted`, and `Selected` are terminal: only [`RecognitionSession::reset`]
/// (a new capture) leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
	Idle,
	Detecting,
	AwaitingSelection,
	NoMatches,
	Exhausted,
	Selected,
}

/// State of one recognition attempt, owned by the caller.
#[derive(Debug, Clone)]
pub struct RecognitionSession {
	id: Uuid,
	state: SessionState,
	attrs: Option<DetectedAttributes>,
	exclude: ExclusionSet,
	shown: Vec<CandidateItem>,
	selected: Option<CandidateItem>,
}
impl RecognitionSession {
	pub fn new() -> Self {
		Self {
			id: Uuid::new_v4(),
			state: SessionState::Idle,
			attrs: None,
			exclude: ExclusionSet::new(),
			shown: Vec::new(),
			selected: None,
		}
	}

	pub fn id(&self) -> Uuid {
		self.id
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	pub fn attributes(&self) -> Option<&DetectedAttributes> {
		self.attrs.as_ref()
	}

	pub fn exclusion(&self) -> &ExclusionSet {
		&self.exclude
	}

	/// Candidates of the most recent ranked result.
	pub fn shown(&self) -> &[CandidateItem] {
		&self.shown
	}

	pub fn selected(&self) -> Option<&CandidateItem> {
		self.selected.as_ref()
	}

	/// Starts over for a new capture.
	pub fn reset(&mut self) {
		*self = Self::new();

		tracing::info!(session_id = %self.id, "Recognition session reset.");
	}

	pub fn select(&mut self, id: i64) -> Result<&CandidateItem> {
		self.expect_state(&[SessionState::AwaitingSelection], "select a candidate")?;

		let Some(candidate) = self.shown.iter().find(|item| item.id == id).cloned() else {
			return Err(Error::NotFound { message: format!("Candidate {id} is not shown.") });
		};

		self.transition(SessionState::Selected);

		Ok(&*self.selected.insert(candidate))
	}

	fn expect_state(&self, allowed: &[SessionState], action: &str) -> Result<()> {
		if allowed.contains(&self.state) {
			return Ok(());
		}

		Err(Error::InvalidState {
			message: format!("Cannot {action} while the session is {:?}.", self.state),
		})
	}

	fn transition(&mut self, next: SessionState) {
		tracing::info!(session_id = %self.id, from = ?self.state, to = ?next, "Session state changed.");

		self.state = next;
	}
}
impl Default for RecognitionSession {
	fn default() -> Self {
		Self::new()
	}
}

impl MatchEngine {
	/// Extracts attributes from the photo and runs the initial pass.
	///
	/// A failed extraction returns the session to `Idle`.
	pub async fn recognize(
		&self,
		session: &mut RecognitionSession,
		image: &ImageInput,
		cancel: &CancellationToken,
	) -> Result<MatchOutcome> {
		session.expect_state(&[SessionState::Idle], "start a recognition")?;
		session.transition(SessionState::Detecting);

		let extracted = tokio::select! {
			biased;

			_ = cancel.cancelled() => Err(Error::Cancelled),
			extracted = self.providers.extractor.extract(image) => extracted.map_err(Error::from),
		};
		let attrs = match extracted {
			Ok(attrs) => attrs,
			Err(err) => {
				tracing::warn!(session_id = %session.id, error = %err, "Attribute extraction failed.");
				session.transition(SessionState::Idle);

				return Err(err);
			},
		};

		self.start(session, attrs, cancel).await
	}

	/// Runs the initial pass for attributes that are already known.
	///
	/// Nothing is committed to the exclusion set here; the shown candidates are committed by the
	/// next [`MatchEngine::search_more`].
	pub async fn start(
		&self,
		session: &mut RecognitionSession,
		attrs: DetectedAttributes,
		cancel: &CancellationToken,
	) -> Result<MatchOutcome> {
		session.expect_state(&[SessionState::Idle, SessionState::Detecting], "start matching")?;

		let attrs = attrs.normalized();
		let outcome = match self.find_matches_with_cancel(&attrs, &session.exclude, cancel).await {
			Ok(outcome) => outcome,
			Err(err) => {
				session.transition(SessionState::Idle);

				return Err(err);
			},
		};

		session.attrs = Some(attrs);

		match &outcome {
			MatchOutcome::Matches(ranked) => {
				session.shown = ranked.candidates();
				session.transition(SessionState::AwaitingSelection);
			},
			MatchOutcome::NoMatches => {
				session.shown.clear();
				session.transition(SessionState::NoMatches);
			},
		}

		Ok(outcome)
	}

	/// Finds candidates that were not shown before.
	///
	/// On cancellation the session keeps waiting for a selection and the exclusion set keeps the
	/// ids committed before the search started.
	pub async fn search_more(
		&self,
		session: &mut RecognitionSession,
		cancel: &CancellationToken,
	) -> Result<RefineOutcome> {
		session.expect_state(&[SessionState::AwaitingSelection], "search for more matches")?;

		let Some(attrs) = session.attrs.clone() else {
			return Err(Error::InvalidState {
				message: "Session has no detected attributes.".to_string(),
			});
		};
		let previous = std::mem::take(&mut session.shown);
		let result =
			self.refine_with_cancel(&attrs, &previous, &mut session.exclude, cancel).await;
		let outcome = match result {
			Ok(outcome) => outcome,
			Err(err) => {
				session.shown = previous;

				return Err(err);
			},
		};

		match &outcome {
			RefineOutcome::Matches(ranked) => {
				session.shown = ranked.candidates();
				session.transition(SessionState::AwaitingSelection);
			},
			RefineOutcome::Exhausted => session.transition(SessionState::Exhausted),
		}

		Ok(outcome)
	}
}
