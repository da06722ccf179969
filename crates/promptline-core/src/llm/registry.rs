//! Provider registry for runtime provider lookup.
//!
//! A kind-indexed map of boxed LLM providers. Built once at startup from
//! whichever providers have credentials configured; read-only afterwards.
//! Looking up an unregistered kind is how "provider not configured"
//! surfaces at first use instead of at startup.

use std::collections::HashMap;

use promptline_types::llm::ProviderKind;

use super::box_provider::BoxLlmProvider;

/// Registry of available LLM providers, indexed by [`ProviderKind`].
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, BoxLlmProvider>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider under the given kind.
    ///
    /// If a provider of this kind already exists, it is replaced.
    pub fn register(&mut self, kind: ProviderKind, provider: BoxLlmProvider) {
        self.providers.insert(kind, provider);
    }

    /// Look up a provider by kind.
    pub fn get(&self, kind: ProviderKind) -> Option<&BoxLlmProvider> {
        self.providers.get(&kind)
    }

    /// Registered provider kinds, in declaration order of [`ProviderKind::ALL`].
    pub fn kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|k| self.providers.contains_key(k))
            .collect()
    }

    /// Whether no provider is registered at all.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
