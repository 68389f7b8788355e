use log::debug;

use crate::transcription::Segment;

// @module: Consecutive duplicate filtering

/// Drop segments whose trimmed text repeats the previous surviving segment
///
/// Only immediate repeats are removed: a phrase that comes back after any
/// other text is kept. Comparison is exact and case-sensitive on trimmed
/// text, and the previous text starts out empty, so leading blank segments
/// are dropped too. Survivors carry their trimmed text.
pub fn dedup_consecutive(segments: Vec<Segment>) -> Vec<Segment> {
    let total = segments.len();
    let mut previous = String::new();
    let mut kept = Vec::with_capacity(total);

    for mut segment in segments {
        let text = segment.text.trim();
        if text == previous {
            continue;
        }
        previous = text.to_string();
        segment.text = previous.clone();
        kept.push(segment);
    }

    if kept.len() < total {
        debug!("Removed {} consecutive duplicate segments", total - kept.len());
    }

    kept
}
