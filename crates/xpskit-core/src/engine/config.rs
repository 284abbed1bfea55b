/// Tags never fitted, whatever the peak-model table says. Auger lines have no
/// applicable peak models.
pub const DEFAULT_EXCLUDED_TAGS: &[&str] = &["CuLMM"];

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub excluded_tags: Vec<String>,
    pub skip_fitting: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfigBuilder::new().build()
    }
}

impl AnalysisConfig {
    /// Whether `tag` is on the exclusion list, ignoring case and whitespace.
    pub fn is_excluded(&self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        self.excluded_tags
            .iter()
            .any(|excluded| normalize_tag(excluded) == tag)
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    excluded_tags: Option<Vec<String>>,
    skip_fitting: Option<bool>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn excluded_tags(mut self, tags: Vec<String>) -> Self {
        self.excluded_tags = Some(tags);
        self
    }
    pub fn skip_fitting(mut self, skip: bool) -> Self {
        self.skip_fitting = Some(skip);
        self
    }

    pub fn build(self) -> AnalysisConfig {
        AnalysisConfig {
            excluded_tags: self.excluded_tags.unwrap_or_else(|| {
                DEFAULT_EXCLUDED_TAGS
                    .iter()
                    .map(|tag| tag.to_string())
                    .collect()
            }),
            skip_fitting: self.skip_fitting.unwrap_or(false),
        }
    }
}
