//! Front matter and final document assembly.

use serde::Serialize;

use super::error::PipelineError;

/// YAML header written at the top of every imported document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontMatter {
    pub title: String,
    pub description: String,
    pub date: String,
    pub categories: Vec<String>,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub redirect_from: Vec<String>,
}

/// `---`, the YAML header, `---`, a blank line, the body and a trailing newline.
pub fn assemble(front_matter: &FrontMatter, body: &str) -> Result<String, PipelineError> {
    let yaml = serde_yaml::to_string(front_matter)?;
    Ok(format!("---\n{yaml}---\n\n{body}\n"))
}
