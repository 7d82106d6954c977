//! Prompt Builder System
//!
//! Deterministic prompt construction for upgrade-risk analysis.
//!
//! The numbered section headings in [`SECTION_LABELS`] are a contract with
//! whoever reads the analysis back: they must appear byte-for-byte and in
//! this order in every rendered prompt.

/// Analysis sections the provider is asked to produce, in order
pub const SECTION_LABELS: [&str; 7] = [
    "## 1. Executive Summary",
    "## 2. Version Change Classification",
    "## 3. Key Improvements",
    "## 4. Security Assessment",
    "## 5. Compatibility & Migration Risk",
    "## 6. Recommended Timeline",
    "## 7. Action Checklist",
];

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Ordered key-value context
    Context(Vec<(String, String)>),
    /// Output section the model must fill in
    Output { label: String, guidance: String },
    /// Custom section
    Custom(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add a context item, keeping insertion order
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let item = (key.to_string(), value.to_string());
        match self.sections.iter_mut().find_map(|s| match s {
            PromptSection::Context(items) => Some(items),
            _ => None,
        }) {
            Some(items) => items.push(item),
            None => self.sections.push(PromptSection::Context(vec![item])),
        }
        self
    }

    /// Add an output section with guidance for its content
    pub fn output(mut self, label: &str, guidance: &str) -> Self {
        self.sections.push(PromptSection::Output {
            label: label.to_string(),
            guidance: guidance.to_string(),
        });
        self
    }

    /// Add custom section
    pub fn custom(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Custom(content.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();
        let mut output_started = false;

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n\n",
                        expertise, task
                    ));
                }
                PromptSection::Context(items) => {
                    prompt.push_str("# Package\n\n");
                    for (key, value) in items {
                        prompt.push_str(&format!("- **{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Output { label, guidance } => {
                    if !output_started {
                        prompt.push_str(
                            "# Required Format\n\nAnswer in Markdown using exactly these headings, in this order:\n\n",
                        );
                        output_started = true;
                    }
                    prompt.push_str(&label);
                    prompt.push('\n');
                    prompt.push_str(&guidance);
                    prompt.push_str("\n\n");
                }
                PromptSection::Custom(content) => {
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

/// Render the upgrade-risk analysis request for one package
pub fn build_prompt(name: &str, id: &str, current_version: &str, available_version: &str) -> String {
    let guidance = [
        "Two or three sentences: what changes and whether upgrading is advisable.",
        "Classify the jump as MAJOR, MINOR or PATCH and say how you decided.",
        "Notable features, fixes and performance changes between the two versions.",
        "Security fixes or advisories (CVE identifiers where known) resolved or introduced.",
        "Breaking changes, removed features, configuration or data migrations, and an overall risk level: LOW, MEDIUM or HIGH.",
        "When to upgrade: immediately, within a week, next maintenance window, or wait.",
        "A short checklist of steps to take before and after upgrading.",
    ];

    let mut builder = PromptBuilder::new()
        .role(
            "software release analyst",
            "assessing the risk of upgrading installed desktop software",
        )
        .context_item("Name", name)
        .context_item("Package ID", id)
        .context_item("Installed version", current_version)
        .context_item("Available version", available_version);

    for (label, text) in SECTION_LABELS.iter().zip(guidance) {
        builder = builder.output(label, text);
    }

    builder
        .custom("Base the analysis on the published release notes for the versions above. If information is unavailable, say so instead of guessing.")
        .build()
}
