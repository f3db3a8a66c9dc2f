//! Prompt templates for Tubecast.
//!
//! Prompts can be customized by placing a `blog.toml` file in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub blog: BlogPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for blog generation and the two fixed markdown templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogPrompts {
    pub system: String,
    pub user: String,
    /// Returned when the transcript is empty. Must keep the phrase "Content unavailable".
    pub unavailable: String,
    /// Used by the offline extraction fallback.
    pub local_fallback: String,
}

impl Default for BlogPrompts {
    fn default() -> Self {
        Self {
            system: "You are a professional content creator and blog writer.".to_string(),

            user: r#"===== Video content to process =====
Video title: {{title}}
Channel: {{channel}}

Video content / captions:
{{transcript}}
===== End of video content =====

Write a blog post based on the video content above, following this style guide.

GOALS
- Deliver the most valuable, relevant knowledge to the listener ("you") in the least time.
- Balance depth with clarity. Avoid both shallow skimming and jargon overload.
- Stay neutral and faithful to the source. Add nothing that is not in the material.
- Keep it lively: a little humor and a few "aha" moments.
- Address the listener directly as "you".

VOICES
Alternate between two voices without ever naming them:
- An enthusiastic guide who sparks interest with metaphors, stories and humor.
- A calm analyst who adds background, connects ideas and presents disagreements neutrally.

CONTENT RULES
- Every claim, fact or figure must come from the video content.
- If the material is silent on something, do not speculate.
- When the source contradicts itself, present both sides without judging.
- Prefer the points most useful to the listener.

STYLE
Conversational and clear, light humor at the opening, transitions and ending, well structured,
objective when stating facts.

LENGTH
About six minutes when read aloud. Cut anything redundant.

OUTPUT STRUCTURE
1. Opening: welcome the listener and say what the topic is and why it matters.
2. Core content: the main points first, then background and deeper reading, then surprising facts.
3. Why it matters to you: practical uses in life, work or study.
4. Short recap of the key points.
5. Close with a question that invites reflection.

CONSTRAINTS
- Never mention a system prompt or that you are an AI.
- Accuracy, neutrality and length take priority over humor.
- Format the post as markdown.
- Write the post in this language: {{language}}."#
                .to_string(),

            unavailable: r#"# {{title}}

## Content unavailable

Sorry, no captions or transcript could be retrieved for this video. Possible reasons:
- The video has no captions
- The video language is not supported by automatic transcription
- A network problem occurred

Please try another video or retry later.
"#
            .to_string(),

            local_fallback: r#"# {{title}}

## Overview
A summary of a video from **{{channel}}**.

## Preview
{{preview}}...

## Original captions
<details>
<summary>Show full captions</summary>

{{transcript}}

</details>

---
*Tip: configure an AI provider API key for a proper AI-written summary.*
"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir.filter(|d| !d.trim().is_empty()) {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let blog_path = custom_path.join("blog.toml");
            if blog_path.exists() {
                let content = std::fs::read_to_string(&blog_path)?;
                prompts.blog = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Load prompts using the prompt section of the settings, falling back to
    /// the built-in templates if the custom file is unreadable.
    pub fn from_settings(settings: &super::PromptSettings) -> Self {
        match Self::load(Some(&settings.custom_dir), Some(&settings.variables)) {
            Ok(prompts) => prompts,
            Err(e) => {
                tracing::warn!(dir = %settings.custom_dir, error = %e, "Failed to load custom prompts, using defaults");
                Prompts {
                    variables: settings.variables.clone(),
                    ..Prompts::default()
                }
            }
        }
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in a single pass, so values are inserted
    /// verbatim even when they contain `{{name}}` text. Unknown placeholders
    /// are left as they are.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER_RE
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
