/// Plain-text convention agreed with the backend: an AI reply containing this
/// exact literal carries a navigation affordance to the roadmap stage. Kept as
/// a compatibility shim until the backend tags messages structurally.
pub const ROADMAP_SENTINEL: &str = "[View Your Roadmap]";

pub const ROADMAP_AFFORDANCE_LABEL: &str = "View Your Roadmap";

/// Returns the text preceding the sentinel when present, `None` otherwise.
/// Callers only scan AI-sender messages; a user message containing the
/// literal renders verbatim.
pub fn split_roadmap_link(text: &str) -> Option<&str> {
    text.split_once(ROADMAP_SENTINEL).map(|(before, _)| before)
}

pub fn contains_roadmap_link(text: &str) -> bool {
    text.contains(ROADMAP_SENTINEL)
}
