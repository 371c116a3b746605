use super::{MetadataProvider, ProviderHandle};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Providers keyed by name, resolved once at startup.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, ProviderHandle>,
}
impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own [`name()`](MetadataProvider::name).
    /// A later registration with the same name replaces the earlier one.
    pub fn register<P: MetadataProvider + 'static>(&mut self, provider: P) -> &mut Self {
        self.register_handle(Arc::new(provider))
    }

    pub fn register_handle(&mut self, provider: ProviderHandle) -> &mut Self {
        let name = provider.name().to_string();
        if self.providers.insert(name.clone(), provider).is_some() {
            tracing::warn!(provider = %name, "Replacing previously registered metadata provider");
        }
        self
    }

    pub fn with<P: MetadataProvider + 'static>(mut self, provider: P) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ProviderHandle> {
        self.providers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.providers.keys()).finish()
    }
}
