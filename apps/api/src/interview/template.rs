//! Interview template: ordered sections of base questions for one role.
//!
//! Templates are TOML documents:
//!
//! ```toml
//! role = "AI Engineer"
//!
//! [[sections]]
//! name = "Machine Learning Fundamentals"
//! questions = ["Explain the bias-variance tradeoff."]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse template: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Template role is empty")]
    EmptyRole,

    #[error("Template has no sections")]
    NoSections,

    #[error("Section '{0}' has no questions")]
    EmptySection(String),

    #[error("Section '{section}' question #{index} is blank")]
    BlankQuestion { section: String, index: usize },
}

/// One named group of base questions. The name doubles as the scoring dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub name: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub role: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A base question with the section it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseQuestion {
    pub section: String,
    pub text: String,
}

impl Template {
    /// Reads and validates a template file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates a template. Unnamed sections become "Section N".
    pub fn from_toml_str(raw: &str) -> Result<Self, TemplateError> {
        let mut template: Template = toml::from_str(raw)?;
        for (idx, section) in template.sections.iter_mut().enumerate() {
            if section.name.trim().is_empty() {
                section.name = format!("Section {}", idx + 1);
            }
        }
        template.validate()?;
        Ok(template)
    }

    /// Rejects templates an interview cannot run against.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.role.trim().is_empty() {
            return Err(TemplateError::EmptyRole);
        }
        if self.sections.is_empty() {
            return Err(TemplateError::NoSections);
        }
        for section in &self.sections {
            if section.questions.is_empty() {
                return Err(TemplateError::EmptySection(section.name.clone()));
            }
            if let Some(index) = section.questions.iter().position(|q| q.trim().is_empty()) {
                return Err(TemplateError::BlankQuestion {
                    section: section.name.clone(),
                    index: index + 1,
                });
            }
        }
        Ok(())
    }

    pub fn total_questions(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// All base questions in template order.
    pub fn base_questions(&self) -> Vec<BaseQuestion> {
        self.sections
            .iter()
            .flat_map(|section| {
                section.questions.iter().map(move |q| BaseQuestion {
                    section: section.name.clone(),
                    text: q.clone(),
                })
            })
            .collect()
    }
}
