//! Endpoint registry — route path to tool definition mapping.
//!
//! A pure mapping fixed at startup. Lookup misses return `None` (the
//! dispatcher turns them into a 404 listing the valid paths); they never
//! reach the upstream gateway. Exactly one tool resolves per registered
//! route path — duplicate registration is a constructor error.

use std::collections::BTreeMap;

use crate::gateway::GenerationParams;
use crate::types::{Error, Result};

/// One AI text tool: route path, display name, prompt template, generation
/// parameters. Immutable after registration.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub route_path: &'static str,
    pub display_name: &'static str,
    pub prompt_template: &'static str,
    pub params: GenerationParams,
}

/// Static mapping from route path to tool definition.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    // BTreeMap keeps route_paths() deterministic for 404 bodies.
    tools: BTreeMap<&'static str, ToolDefinition>,
}

impl EndpointRegistry {
    /// Empty registry, for tests that register their own tools.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in tool set.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for tool in builtin_tools() {
            // Built-in paths are distinct by construction.
            if let Err(e) = registry.register(tool) {
                tracing::error!("builtin registry invariant violated: {e}");
            }
        }
        registry
    }

    /// Register a tool. Fails if the route path is already taken.
    pub fn register(&mut self, tool: ToolDefinition) -> Result<()> {
        if self.tools.contains_key(tool.route_path) {
            return Err(Error::internal(format!(
                "duplicate route path: {}",
                tool.route_path
            )));
        }
        self.tools.insert(tool.route_path, tool);
        Ok(())
    }

    /// Resolve a route path to its tool definition.
    pub fn resolve(&self, path: &str) -> Option<&ToolDefinition> {
        self.tools.get(path)
    }

    /// All registered route paths, sorted.
    pub fn route_paths(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn builtin_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            route_path: "/ai/seo-write",
            display_name: "AI SEO Writer",
            prompt_template: "You are a professional SEO content writer. Write a comprehensive, \
                SEO-optimized article that ranks well in search engines: compelling title and \
                introduction, proper H2/H3 headings, bullet points for readability, keywords \
                integrated naturally without stuffing, a conversational human tone, and \
                actionable insights throughout. Write a complete, well-structured article \
                about the following topic:",
            params: GenerationParams::default(),
        },
        ToolDefinition {
            route_path: "/ai/humanize",
            display_name: "AI Humanizer",
            prompt_template: "You are an expert at transforming AI-generated text to sound \
                human-written. Rewrite the given text with natural contractions, conversational \
                phrasing, varied sentence lengths, active voice, and slight natural \
                imperfections, removing robotic or overly formal language while preserving the \
                meaning. Rewrite the following text:",
            params: GenerationParams::default(),
        },
        ToolDefinition {
            route_path: "/ai/detect",
            display_name: "AI Detector",
            prompt_template: "You are an AI detection specialist. Analyze the given text for \
                AI-generated patterns: repetitive phrasing, unnatural transitions, overly \
                perfect grammar, generic statements, missing personal perspective. Respond in \
                this exact format:\n\nAI Probability: [X]%\n\n[2-3 sentence explanation of the \
                indicators that influenced the assessment]\n\nAnalyze this text:",
            params: GenerationParams::default(),
        },
        ToolDefinition {
            route_path: "/ai/paraphrase",
            display_name: "Paraphrasing Tool",
            prompt_template: "You are a professional text rewriter. Completely rewrite the \
                given text while preserving its meaning: change sentence structure and \
                vocabulary, use synonyms and alternative expressions, vary sentence lengths, \
                and keep the result natural and engaging. Rewrite the following text:",
            params: GenerationParams::default(),
        },
        ToolDefinition {
            route_path: "/ai/grammar",
            display_name: "Grammar Checker",
            prompt_template: "You are a professional editor. Fix all grammar, spelling, \
                punctuation, and style errors in the given text while keeping its original \
                voice and tone. Return ONLY the corrected text without explanations, comments, \
                or markup. Fix all errors in this text:",
            params: GenerationParams::default(),
        },
        ToolDefinition {
            route_path: "/ai/improve",
            display_name: "Text Improver",
            prompt_template: "You are a professional writing coach. Enhance the given text for \
                clarity, fluency, and impact while preserving the core message: improve flow \
                and transitions, strengthen word choice, add polish, and keep the original \
                voice. Enhance and improve the following text:",
            params: GenerationParams::default(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registers_all_six_tools() {
        let registry = EndpointRegistry::builtin();
        assert_eq!(registry.len(), 6);
        for path in [
            "/ai/seo-write",
            "/ai/humanize",
            "/ai/detect",
            "/ai/paraphrase",
            "/ai/grammar",
            "/ai/improve",
        ] {
            assert!(registry.resolve(path).is_some(), "missing {path}");
        }
    }

    #[test]
    fn unknown_path_does_not_resolve() {
        let registry = EndpointRegistry::builtin();
        assert!(registry.resolve("/ai/translate").is_none());
        assert!(registry.resolve("/health").is_none());
    }

    #[test]
    fn duplicate_route_path_is_rejected() {
        let mut registry = EndpointRegistry::new();
        let tool = ToolDefinition {
            route_path: "/ai/echo",
            display_name: "Echo",
            prompt_template: "Echo:",
            params: GenerationParams::default(),
        };
        registry.register(tool.clone()).unwrap();
        assert!(registry.register(tool).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn route_paths_are_sorted_and_stable() {
        let registry = EndpointRegistry::builtin();
        let paths = registry.route_paths();
        let mut sorted = paths.clone();
        sorted.sort_unstable();
        assert_eq!(paths, sorted);
    }
}
