use serde::{Deserialize, Serialize};

use crate::domain::Id;

/// One choice in a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    /// Unique within the poll.
    pub id: Id,
    /// The choice as shown to voters.
    pub text: String,
    /// Number of actors currently holding this choice.
    pub votes: u32,
    /// The actors currently holding this choice.
    #[serde(default)]
    pub voters: Vec<String>,
}

impl PollOption {
    pub(crate) fn new(text: String) -> Self {
        Self {
            id: Id::generate(),
            text,
            votes: 0,
            voters: Vec::new(),
        }
    }

    /// Whether the actor currently holds this choice.
    #[must_use]
    pub fn has_voter(&self, actor: &str) -> bool {
        self.voters.iter().any(|v| v == actor)
    }
}

/// What happened when an actor voted on a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollVote {
    /// The actor had not voted on this poll before.
    Cast,
    /// The actor's previous choice was retracted in favour of this one.
    Changed,
    /// The actor already held this choice; nothing changed.
    Unchanged,
}

/// Records `actor`'s vote for `option` in `options`.
///
/// At most one active vote per actor is kept: any previous choice is
/// retracted before the new one is recorded. Returns `None` if no option has
/// the given id, in which case `options` is untouched.
pub(crate) fn cast(options: &mut [PollOption], option: &Id, actor: &str) -> Option<PollVote> {
    let target = options.iter().position(|o| &o.id == option)?;

    if options[target].has_voter(actor) {
        return Some(PollVote::Unchanged);
    }

    let mut retracted = false;
    for held in options.iter_mut().filter(|o| o.has_voter(actor)) {
        held.voters.retain(|v| v != actor);
        held.votes = held.votes.saturating_sub(1);
        retracted = true;
    }

    let chosen = &mut options[target];
    chosen.voters.push(actor.to_string());
    chosen.votes = chosen.votes.saturating_add(1);

    Some(if retracted {
        PollVote::Changed
    } else {
        PollVote::Cast
    })
}
