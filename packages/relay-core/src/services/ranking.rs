//! Relevance ranking of search results.
//!
//! The search API's own order is a reasonable prior, but it often puts live
//! versions, covers or remixes above the studio track a person asked for by
//! voice. The ranker rescores candidates against the request with additive
//! heuristic bonuses on top of popularity, then sorts stably so equal scores
//! keep the upstream order.

use serde::Serialize;

use crate::sonos::uri::TrackReference;
use crate::sonos::TrackMetadata;

const TRACK_EXACT_BONUS: f64 = 100.0;
const TRACK_CONTAINS_BONUS: f64 = 50.0;
const ARTIST_EXACT_BONUS: f64 = 100.0;
const ARTIST_CONTAINS_BONUS: f64 = 50.0;
const QUERY_IN_ARTIST_TRACK_BONUS: f64 = 30.0;
const QUERY_IN_NAME_BONUS: f64 = 40.0;
const WORD_MATCH_BONUS: f64 = 25.0;
const COMPACT_EXACT_BONUS: f64 = 80.0;
const COMPACT_CONTAINS_BONUS: f64 = 50.0;
const COMPACT_ARTIST_TRACK_BONUS: f64 = 40.0;

/// Query tokens of this length or shorter do not count toward word overlap.
const MIN_TOKEN_LEN: usize = 2;

/// A track returned by the search provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCandidate {
    pub name: String,
    /// Primary artist.
    pub artist: String,
    /// All credited artists, primary first.
    pub artists: Vec<String>,
    /// Upstream popularity, 0-100.
    pub popularity: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
    pub reference: TrackReference,
    /// Relevance score; zero until [`rank`] runs.
    pub score: f64,
}

impl SearchCandidate {
    /// Display metadata for loading this candidate on the speaker.
    #[must_use]
    pub fn to_metadata(&self) -> TrackMetadata {
        TrackMetadata {
            title: Some(self.name.clone()),
            artist: Some(self.artist.clone()),
            album: self.album.clone(),
            album_art_uri: self.artwork.clone(),
            track_uri: Some(self.reference.to_string()),
        }
    }
}

/// Trimmed, lower-cased filter; `None` when empty.
fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

fn compact(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

fn words_overlap(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Scores one candidate against the normalized query and filters.
fn score(
    candidate: &SearchCandidate,
    query: Option<&str>,
    artist: Option<&str>,
    track: Option<&str>,
) -> f64 {
    let name = candidate.name.to_lowercase();
    let primary = candidate.artist.to_lowercase();
    let mut total = f64::from(candidate.popularity);

    if let Some(track) = track {
        if name == track {
            total += TRACK_EXACT_BONUS;
        } else if name.contains(track) {
            total += TRACK_CONTAINS_BONUS;
        }
    }

    if let Some(artist) = artist {
        let names: Vec<String> = candidate.artists.iter().map(|a| a.to_lowercase()).collect();
        if names.iter().any(|a| a == artist) {
            total += ARTIST_EXACT_BONUS;
        } else if names.iter().any(|a| a.contains(artist)) {
            total += ARTIST_CONTAINS_BONUS;
        }
    }

    if let Some(query) = query {
        let artist_track = format!("{primary} {name}");

        if artist_track.contains(query) {
            total += QUERY_IN_ARTIST_TRACK_BONUS;
        }
        if name.contains(query) {
            total += QUERY_IN_NAME_BONUS;
        }

        let name_words: Vec<&str> = name.split_whitespace().collect();
        let artist_track_words: Vec<&str> = artist_track.split_whitespace().collect();
        let matches: f64 = query
            .split_whitespace()
            .filter(|token| token.chars().count() > MIN_TOKEN_LEN)
            .map(|token| {
                if name_words.iter().any(|w| words_overlap(w, token)) {
                    1.0
                } else if artist_track_words.iter().any(|w| words_overlap(w, token)) {
                    0.5
                } else {
                    0.0
                }
            })
            .sum();
        total += matches * WORD_MATCH_BONUS;

        let compact_query = compact(query);
        let compact_name = compact(&name);
        if compact_name == compact_query {
            total += COMPACT_EXACT_BONUS;
        } else if compact_name.contains(&compact_query) {
            total += COMPACT_CONTAINS_BONUS;
        }

        if compact(&format!("{primary}{name}")).contains(&compact_query) {
            total += COMPACT_ARTIST_TRACK_BONUS;
        }
    }

    total
}

/// Scores `candidates` and orders them best first.
///
/// Empty or whitespace-only inputs contribute no bonus. The sort is stable:
/// candidates with equal scores keep their input order.
#[must_use]
pub fn rank(
    candidates: Vec<SearchCandidate>,
    query: Option<&str>,
    artist: Option<&str>,
    track: Option<&str>,
) -> Vec<SearchCandidate> {
    let query = normalize(query);
    let artist = normalize(artist);
    let track = normalize(track);

    let mut scored: Vec<SearchCandidate> = candidates
        .into_iter()
        .map(|mut c| {
            c.score = score(&c, query.as_deref(), artist.as_deref(), track.as_deref());
            c
        })
        .collect();

    // `sort_by` is stable; reversed comparison gives descending order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, artist: &str, popularity: u8, id: &str) -> SearchCandidate {
        SearchCandidate {
            name: name.into(),
            artist: artist.into(),
            artists: vec![artist.into()],
            popularity,
            album: None,
            artwork: None,
            reference: TrackReference::from_id(id).unwrap(),
            score: 0.0,
        }
    }

    #[test]
    fn exact_track_match_beats_live_version() {
        let ranked = rank(
            vec![
                candidate("Starlight", "Muse", 70, "a1"),
                candidate("Starlight - Live", "Muse", 40, "a2"),
            ],
            None,
            None,
            Some("Starlight"),
        );

        assert_eq!(ranked[0].name, "Starlight");
        assert!(ranked[0].score >= 170.0);
        assert_eq!(ranked[1].score, 90.0);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn filter_is_trimmed_and_case_insensitive() {
        let ranked = rank(
            vec![candidate("Starlight", "Muse", 10, "a1")],
            None,
            Some("  MUSE "),
            Some("starlight"),
        );
        assert_eq!(ranked[0].score, 210.0);
    }

    #[test]
    fn artist_bonus_checks_every_credited_artist() {
        let mut feature = candidate("Collab", "Main", 0, "a1");
        feature.artists.push("Guest Star".into());

        let exact = rank(vec![feature.clone()], None, Some("guest star"), None);
        assert_eq!(exact[0].score, 100.0);

        let partial = rank(vec![feature], None, Some("guest"), None);
        assert_eq!(partial[0].score, 50.0);
    }

    #[test]
    fn free_text_query_accumulates_bonuses() {
        // "starlight": in "muse starlight" (+30), in name (+40), one word
        // match (+25), compact exact (+80), compact in artist+track (+40).
        let ranked = rank(
            vec![candidate("Starlight", "Muse", 0, "a1")],
            Some("starlight"),
            None,
            None,
        );
        assert_eq!(ranked[0].score, 215.0);
    }

    #[test]
    fn artist_word_counts_half_a_match() {
        // "muse" only appears in the artist: +30 for artist-track contains,
        // 0.5 * 25 overlap, +40 compact artist-track.
        let ranked = rank(
            vec![candidate("Uprising", "Muse", 0, "a1")],
            Some("muse"),
            None,
            None,
        );
        assert_eq!(ranked[0].score, 30.0 + 12.5 + 40.0);
    }

    #[test]
    fn short_tokens_do_not_count_toward_overlap() {
        let ranked = rank(
            vec![candidate("Up", "Nobody", 0, "a1")],
            Some("xx up"),
            None,
            None,
        );
        assert_eq!(ranked[0].score, 0.0);
    }

    #[test]
    fn spacing_differences_still_match() {
        let ranked = rank(
            vec![candidate("Star Light", "Someone", 0, "a1")],
            Some("starlight"),
            None,
            None,
        );
        // compact exact (+80), compact in artist+track (+40), and "starlight"
        // contains the name word "star" (+25).
        assert_eq!(ranked[0].score, 80.0 + 40.0 + 25.0);
    }

    #[test]
    fn ties_keep_input_order() {
        let input = vec![
            candidate("Alpha", "X", 50, "a1"),
            candidate("Beta", "Y", 50, "a2"),
            candidate("Gamma", "Z", 50, "a3"),
        ];
        let ranked = rank(input, None, None, None);
        let names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn ranking_is_deterministic() {
        let input = vec![
            candidate("Hysteria", "Muse", 60, "a1"),
            candidate("Hysteria - Live", "Muse", 60, "a2"),
            candidate("Time Is Running Out", "Muse", 65, "a3"),
        ];
        let first = rank(input.clone(), Some("muse hysteria"), None, None);
        let second = rank(input, Some("muse hysteria"), None, None);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_ranks_to_empty() {
        assert!(rank(Vec::new(), Some("anything"), None, None).is_empty());
    }

    #[test]
    fn metadata_carries_reference() {
        let c = candidate("Starlight", "Muse", 70, "a1");
        let meta = c.to_metadata();
        assert_eq!(meta.track_uri.as_deref(), Some("spotify:track:a1"));
        assert_eq!(meta.title.as_deref(), Some("Starlight"));
    }
}
