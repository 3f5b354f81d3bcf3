//! Typing metrics.
//!
//! Pure functions from submitted input and the canonical race text to a
//! player's metrics. Elapsed time is always measured from the shared race
//! start, never from a player's first keystroke, so a late start lowers CPM
//! instead of inflating it.

use std::time::Duration;

use super::entity::PlayerProgress;

/// Characters of `input` that match `text` at the same position.
pub fn count_correct_chars(input: &str, text: &str) -> usize {
    input
        .chars()
        .zip(text.chars())
        .filter(|(typed, expected)| typed == expected)
        .count()
}

/// Correct characters per minute, 0 before any time has elapsed.
pub fn calculate_cpm(correct_chars: usize, elapsed: Duration) -> u32 {
    if elapsed.is_zero() {
        return 0;
    }
    let minutes = elapsed.as_secs_f64() / 60.0;
    (correct_chars as f64 / minutes).round() as u32
}

/// Accuracy percentage, 100 while nothing has been typed.
pub fn calculate_accuracy(correct_chars: usize, total_chars: usize) -> u32 {
    if total_chars == 0 {
        return 100;
    }
    (correct_chars as f64 / total_chars as f64 * 100.0).round() as u32
}

/// Share of the text typed, clamped to `0.0..=100.0`.
pub fn calculate_progress(total_chars: usize, text_len: usize) -> f64 {
    if text_len == 0 {
        return 0.0;
    }
    (total_chars as f64 / text_len as f64 * 100.0).min(100.0)
}

/// Apply one typing update.
///
/// `finished` flips to true only on an exact match of the whole text; once
/// set it stays set. `position` and `finish_timestamp` are carried over
/// untouched, they are assigned by the race.
pub fn update(
    current: &PlayerProgress,
    input: &str,
    text: &str,
    error_count: u32,
    elapsed: Duration,
) -> PlayerProgress {
    let correct_chars = count_correct_chars(input, text);
    let total_chars_typed = input.chars().count();
    let progress = calculate_progress(total_chars_typed, text.chars().count());
    let completed = progress >= 100.0 && input == text;

    PlayerProgress {
        correct_chars,
        total_chars_typed,
        cpm: calculate_cpm(correct_chars, elapsed),
        accuracy: calculate_accuracy(correct_chars, total_chars_typed),
        progress,
        error_count,
        finished: current.finished || completed,
        finish_timestamp: current.finish_timestamp,
        position: current.position,
    }
}

/// Recompute CPM against the current elapsed time.
///
/// Returns the new value when it differs from the stored one.
pub fn refresh_cpm(progress: &mut PlayerProgress, elapsed: Duration) -> Option<u32> {
    let cpm = calculate_cpm(progress.correct_chars, elapsed);
    if cpm == progress.cpm {
        return None;
    }
    progress.cpm = cpm;
    Some(cpm)
}
