//! Shared constants for end-to-end tests
//!
//! When fixture data changes (model replies, video metadata, etc.),
//! update only this file.

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for a spawned server to answer its home route
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness probes
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Timeout applied to every test client request
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Fake model backend
// ============================================================================

/// Model name the online test server is configured with
pub const TEST_MODEL: &str = "gemini-test";

/// API key the online test server sends to the fake backend
pub const TEST_API_KEY: &str = "test-api-key";

/// A well-formed analysis, as the model would return it
pub const ANALYSIS_REPLY: &str = r#"{
  "title": "Bohemian Rhapsody",
  "genre": "Progressive Rock",
  "tempo": 120,
  "key": "A#",
  "mode": "Major",
  "chordProgression": ["Bb", "Gm", "Cm", "F"],
  "timbre": [
    {"name": "Piano", "value": 0.9},
    {"name": "Vocals", "value": 0.95},
    {"name": "Electric Guitar", "value": 0.7}
  ],
  "energy": 0.6,
  "mood": "Dramatic, Operatic"
}"#;

/// Same analysis wrapped in a markdown code fence, with out-of-range values
pub const FENCED_OUT_OF_RANGE_REPLY: &str = "```json\n{\"title\": \"Loud Song\", \"genre\": \"Metal\", \"tempo\": 180, \"key\": \"E\", \"mode\": \"Minor\", \"chordProgression\": [\"Em\", \"C\"], \"timbre\": [{\"name\": \"Drums\", \"value\": 1.4}, {\"name\": \"Bass\", \"value\": -0.2}], \"energy\": 1.3, \"mood\": \"Aggressive\"}\n```";

/// Model output that is not valid JSON
pub const MALFORMED_REPLY: &str = "Sorry, I can't analyze that song.";

/// Model output missing the required `mood` field
pub const INCOMPLETE_REPLY: &str = r#"{"title": "X", "genre": "Y", "tempo": 100, "key": "C", "mode": "Major", "chordProgression": [], "timbre": [], "energy": 0.5}"#;

/// Prompt text returned by the fake backend
pub const PROMPT_REPLY: &str = "  [ Instrumental ], progressive rock, piano, vocals, dramatic, 132 BPM  \n";

// ============================================================================
// Fake oEmbed backend
// ============================================================================

/// Video id of the link used by enrichment tests
pub const VIDEO_ID: &str = "fJ9rUzIMcZQ";

/// Link whose metadata the fake oEmbed server knows about
pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=fJ9rUzIMcZQ";

/// Title the fake oEmbed server reports
pub const VIDEO_TITLE: &str = "Queen - Bohemian Rhapsody (Official Video Remastered)";

/// Author the fake oEmbed server reports
pub const VIDEO_AUTHOR: &str = "Queen Official";
