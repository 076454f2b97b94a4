use serde::Deserialize;

/// Roadmap payload returned by `GET /roadmap/{session_id}/`. The generator
/// is an LLM, so every field beyond the title is optional and unknown keys
/// are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RoadmapResponse {
    pub roadmap: RoadmapData,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RoadmapData {
    #[serde(default)]
    pub career_options: Vec<CareerOption>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CareerOption {
    // Older roadmaps use the prose key "Occupation Title".
    #[serde(alias = "Occupation Title")]
    pub title: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub growth: Option<String>,
    #[serde(default)]
    pub courses: Vec<CourseLink>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CourseLink {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// View state for the roadmap stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoadmapView {
    Loading,
    Failed(String),
    Ready(RoadmapData),
}

impl Default for RoadmapView {
    fn default() -> Self {
        Self::Loading
    }
}
