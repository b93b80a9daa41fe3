// src/services/compactor.rs

//! URL pattern compaction.
//!
//! Turns landing-page URLs into as few `^(a|b|...)$` patterns as possible
//! while keeping the paths folded into each pattern under a character budget.
//! Malformed URLs are skipped with a warning rather than failing the batch.

use crate::utils::landing_path;

/// Default character budget for the paths of one pattern.
pub const DEFAULT_MAX_LENGTH: usize = 450;

const FRONT_REGEX: &str = "^(";
const BACK_REGEX: &str = ")$";

/// Split URLs into ordered groups of paths whose summed length fits `max_length`.
///
/// A path longer than `max_length` on its own ends up alone in its group.
/// Returns an empty list if every URL was malformed.
pub fn split_into_groups<S: AsRef<str>>(urls: &[S], max_length: usize) -> Vec<Vec<String>> {
    let mut groups = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_length = 0;

    for url in urls {
        let path = match landing_path(url.as_ref()) {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Skipping URL: {}", e);
                continue;
            }
        };

        let length = path.chars().count();
        if !current.is_empty() && current_length + length > max_length {
            groups.push(std::mem::take(&mut current));
            current_length = 0;
        }

        current_length += length;
        current.push(path);
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// Compile each group into a single anchored alternation pattern.
pub fn compile_regex_groups(groups: &[Vec<String>]) -> Vec<String> {
    groups
        .iter()
        .map(|group| {
            let joined = group
                .iter()
                .map(|path| regex::escape(path))
                .collect::<Vec<_>>()
                .join("|");
            format!("{FRONT_REGEX}{joined}{BACK_REGEX}")
        })
        .collect()
}

/// Split and compile in one step.
pub fn compact<S: AsRef<str>>(urls: &[S], max_length: usize) -> Vec<String> {
    compile_regex_groups(&split_into_groups(urls, max_length))
}
