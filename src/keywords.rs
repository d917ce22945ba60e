use rand::Rng;

/// Topic keywords for the initial search, one per sustainable development goal.
pub const TOPIC_KEYWORDS: [&str; 17] = [
    "poverty",
    "hunger",
    "health",
    "education",
    "gender equality",
    "clean water",
    "clean energy",
    "decent work",
    "innovation",
    "inequality",
    "sustainable cities",
    "responsible consumption",
    "climate change",
    "ocean",
    "biodiversity",
    "peace",
    "partnership",
];

/// Picked instead of a topic one time in eighteen.
pub const ALTERNATE_KEYWORD: &str = "TEDx";

/// Pick the keyword for the panel's first search: each topic with
/// probability 1/18, the alternate keyword with probability 1/18.
pub fn pick_initial_keyword<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    let slot = rng.gen_range(0..=TOPIC_KEYWORDS.len());
    TOPIC_KEYWORDS.get(slot).copied().unwrap_or(ALTERNATE_KEYWORD)
}
