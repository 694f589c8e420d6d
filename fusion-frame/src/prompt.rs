use rand::{seq::SliceRandom, Rng};

/// Subjects known to come out well in black and white.
pub const PROMPTS: &[&str] = &[
    "abstract geometric pattern",
    "minimalist line art",
    "monochrome ink sketch",
    "high contrast black and white illustration",
    "dithered portrait",
    "zen circle on white background",
];

pub const STYLE_SUFFIX: &str = ", black and white, high contrast, no color";

/// Pick a random subject and append the style qualifiers.
///
/// Falls back to [`PROMPTS`] when `subjects` is empty.
pub fn prompt<S: AsRef<str>>(subjects: &[S], rng: &mut impl Rng) -> String {
    let subject = match subjects.choose(rng) {
        Some(subject) => subject.as_ref(),
        None => PROMPTS.choose(rng).copied().unwrap_or(PROMPTS[0]),
    };
    format!("{}{}", subject, STYLE_SUFFIX)
}
