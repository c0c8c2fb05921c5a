use site_types::{Guess, SubmissionStatus};

/// Whether `user_id` already has a guess in `guesses`.
pub fn has_guess_from(guesses: &[Guess], user_id: &str) -> bool {
    guesses.iter().any(|guess| guess.user == user_id)
}

/// Derives the submission status for `user_id` from the round's guess list.
///
/// The list scan is the only source of this status, so the result is only as
/// fresh as the list it was computed from.
pub fn derive_status(guesses: &[Guess], user_id: &str) -> SubmissionStatus {
    if has_guess_from(guesses, user_id) {
        SubmissionStatus::Submitted
    } else {
        SubmissionStatus::Open
    }
}
