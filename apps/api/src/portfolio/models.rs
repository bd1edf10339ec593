use serde::{Deserialize, Serialize};

/// Portfolio copy ready for display. Always sanitized before leaving the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub name: String,
    pub headline: String,
    pub bio: String,
    pub sections: Vec<Section>,
    pub call_to_action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub items: Vec<String>,
}

/// Model output as parsed, before sanitization. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGeneration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub sections: Option<Vec<RawSection>>,
    #[serde(default)]
    pub call_to_action: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSection {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<String>>,
}

impl From<Generation> for RawGeneration {
    fn from(generation: Generation) -> Self {
        Self {
            name: Some(generation.name),
            headline: Some(generation.headline),
            bio: Some(generation.bio),
            sections: Some(
                generation
                    .sections
                    .into_iter()
                    .map(|s| RawSection {
                        title: Some(s.title),
                        items: Some(s.items),
                    })
                    .collect(),
            ),
            call_to_action: Some(generation.call_to_action),
        }
    }
}
