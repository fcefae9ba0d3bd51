/// Canonical key space, indexed by semitone above C.
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Position of `key` in [`PITCH_CLASSES`]. Matching is exact, so flats and
/// lower-case names are unknown.
pub fn pitch_class_index(key: &str) -> Option<usize> {
    PITCH_CLASSES.iter().position(|k| *k == key)
}

/// Shifts a known key by `semitones`, wrapping around the octave.
/// Returns `None` for keys outside the canonical space.
pub fn shift_key(key: &str, semitones: i32) -> Option<&'static str> {
    let index = pitch_class_index(key)? as i32;
    let shifted = (index + semitones).rem_euclid(PITCH_CLASSES.len() as i32);
    Some(PITCH_CLASSES[shifted as usize])
}
