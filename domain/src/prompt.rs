use std::collections::HashMap;

use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub template: &'static str,
    pub placeholders: &'static [&'static str],
    pub default_values: &'static [(&'static str, &'static str)],
}

impl PromptTemplate {
    /// Substitutes `{key}` placeholders, caller values taking precedence over defaults.
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut merged: HashMap<&str, &str> = self.default_values.iter().copied().collect();
        for (key, value) in values {
            merged.insert(key.as_str(), value.as_str());
        }

        merged
            .into_iter()
            .fold(self.template.to_string(), |text, (key, value)| {
                text.replace(&format!("{{{key}}}"), value)
            })
    }
}

pub const PROMPT_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "product-integration",
        name: "Product Integration",
        description: "Integrate your product into the reference ad style",
        template: "Create a new advertisement that follows the style, layout, and aesthetic of the reference ad, but replace the main product with my product. Maintain the overall look and feel, color scheme, and typography style of the reference ad. Make sure my product is the focal point of the new ad.",
        placeholders: &[],
        default_values: &[],
    },
    PromptTemplate {
        id: "style-transfer",
        name: "Style Transfer",
        description: "Transfer the visual style to your product",
        template: "Create a new advertisement featuring my product using the visual style, color palette, and design elements of the reference ad. Adapt the composition to best showcase my product while maintaining the artistic direction of the reference.",
        placeholders: &[],
        default_values: &[],
    },
    PromptTemplate {
        id: "brand-adaptation",
        name: "Brand Adaptation",
        description: "Adapt your brand message in this style",
        template: "Create a new advertisement for my product that uses the design language and layout approach of the reference ad, but update it to reflect my product's unique features. Include the tagline: \"{tagline}\" in a way that integrates well with the design.",
        placeholders: &["tagline"],
        default_values: &[("tagline", "Experience the difference")],
    },
    PromptTemplate {
        id: "seasonal-theme",
        name: "Seasonal Theme",
        description: "Create a seasonal variation in this style",
        template: "Create a {season}-themed advertisement for my product, inspired by the design style of the reference ad. Incorporate seasonal elements and colors while maintaining the visual language of the reference.",
        placeholders: &["season"],
        default_values: &[("season", "summer")],
    },
    PromptTemplate {
        id: "custom",
        name: "Custom Instructions",
        description: "Write your own specific instructions",
        template: "{customInstructions}",
        placeholders: &["customInstructions"],
        default_values: &[(
            "customInstructions",
            "Create a new advertisement that features my product, inspired by the reference ad.",
        )],
    },
];

pub fn find_template(id: &str) -> Option<&'static PromptTemplate> {
    PROMPT_TEMPLATES.iter().find(|template| template.id == id)
}

pub fn format_prompt(
    template_id: &str,
    values: &HashMap<String, String>,
) -> Result<String, DomainError> {
    find_template(template_id)
        .map(|template| template.render(values))
        .ok_or_else(|| DomainError::UnknownPromptTemplate(template_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_placeholders() {
        let prompt = format_prompt("seasonal-theme", &HashMap::new()).unwrap();
        assert!(prompt.starts_with("Create a summer-themed advertisement"));
    }

    #[test]
    fn caller_values_override_defaults() {
        let values = HashMap::from([("tagline".to_string(), "Just do it".to_string())]);
        let prompt = format_prompt("brand-adaptation", &values).unwrap();
        assert!(prompt.contains("\"Just do it\""));
        assert!(!prompt.contains("Experience the difference"));
    }

    #[test]
    fn custom_template_is_the_instructions() {
        let values = HashMap::from([(
            "customInstructions".to_string(),
            "Neon cyberpunk poster".to_string(),
        )]);
        assert_eq!(
            format_prompt("custom", &values).unwrap(),
            "Neon cyberpunk poster"
        );
    }

    #[test]
    fn unknown_template_is_an_error() {
        assert!(matches!(
            format_prompt("nope", &HashMap::new()),
            Err(DomainError::UnknownPromptTemplate(id)) if id == "nope"
        ));
    }

    #[test]
    fn every_placeholder_has_a_default() {
        for template in PROMPT_TEMPLATES {
            for placeholder in template.placeholders {
                assert!(
                    template
                        .default_values
                        .iter()
                        .any(|(key, _)| key == placeholder),
                    "{} lacks a default for {}",
                    template.id,
                    placeholder
                );
            }
        }
    }
}
