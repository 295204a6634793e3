//! Tally service: per-option vote aggregation.

use condovote_common::{AppError, AppResult};
use condovote_db::entities::vote;
use condovote_db::repositories::{PollRepository, VoteRepository};
use serde::Serialize;

/// Aggregated result for one option.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    /// Option label as created.
    pub label: String,
    /// Number of votes for this option.
    pub count: u64,
    /// Share of the valid total, rounded to one decimal. 0.0 when no
    /// votes were cast.
    pub percentage: f64,
}

/// Aggregated results for a poll.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyResult {
    /// Per-option counts, in the poll's option creation order. Never
    /// reordered by count, so refreshes are comparable.
    pub per_option: Vec<OptionTally>,
    /// Valid votes counted into the percentages.
    pub total: u64,
    /// Votes referencing an option index outside the current bounds
    /// (legacy data). Excluded from `total` but surfaced for auditing.
    pub out_of_range: u64,
}

/// One row of the voter roll for a non-anonymous poll.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    /// Voting identity.
    pub unit_id: String,
    /// Voter display name.
    pub voter_name: Option<String>,
    /// Chosen option index.
    pub option_index: i32,
    /// Chosen option label.
    pub option_label: String,
}

/// Service computing poll results.
#[derive(Clone)]
pub struct TallyService {
    poll_repo: PollRepository,
    vote_repo: VoteRepository,
}

impl TallyService {
    /// Create a new tally service.
    #[must_use]
    pub const fn new(poll_repo: PollRepository, vote_repo: VoteRepository) -> Self {
        Self {
            poll_repo,
            vote_repo,
        }
    }

    /// Aggregate a poll's votes into per-option counts and percentages.
    ///
    /// Read-only. Absence of votes is a zero tally, not an error.
    pub async fn tally(&self, poll_id: &str) -> AppResult<TallyResult> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;
        let labels = poll.option_labels()?;
        let votes = self.vote_repo.find_by_poll(poll_id).await?;

        Ok(compute_tally(&labels, &votes))
    }

    /// The voter roll for a non-anonymous poll, in recording order.
    pub async fn ballots(&self, poll_id: &str) -> AppResult<Vec<Ballot>> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        if poll.is_anonymous {
            return Err(AppError::Forbidden(
                "Ballots are not available for anonymous polls".into(),
            ));
        }

        let labels = poll.option_labels()?;
        let votes = self.vote_repo.find_by_poll(poll_id).await?;

        Ok(votes
            .into_iter()
            .map(|vote| {
                let option_label = usize::try_from(vote.option_index)
                    .ok()
                    .and_then(|i| labels.get(i).cloned())
                    .unwrap_or_else(|| format!("#{}", vote.option_index));
                Ballot {
                    unit_id: vote.unit_id,
                    voter_name: vote.voter_name,
                    option_index: vote.option_index,
                    option_label,
                }
            })
            .collect())
    }
}

/// Count votes per option and derive percentages over the valid total.
fn compute_tally(labels: &[String], votes: &[vote::Model]) -> TallyResult {
    let mut counts = vec![0u64; labels.len()];
    let mut out_of_range = 0u64;

    for vote in votes {
        match usize::try_from(vote.option_index) {
            Ok(index) if index < counts.len() => counts[index] += 1,
            _ => out_of_range += 1,
        }
    }

    let total: u64 = counts.iter().sum();

    let per_option = labels
        .iter()
        .zip(&counts)
        .map(|(label, &count)| OptionTally {
            label: label.clone(),
            count,
            percentage: if total == 0 {
                0.0
            } else {
                round_one_decimal(count as f64 / total as f64 * 100.0)
            },
        })
        .collect();

    TallyResult {
        per_option,
        total,
        out_of_range,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
