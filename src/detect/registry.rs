use crate::error::{BenchError, Result};
use crate::options::DetectorOptions;

use super::backend::BackendProvider;
use super::backends::StubProvider;
#[cfg(feature = "backend-tract")]
use super::backends::TractProvider;

/// Ordered set of backend providers.
///
/// The first registered provider that accepts a model path wins, so
/// specific providers (URL schemes) must be registered before catch-all
/// ones.
pub struct BackendRegistry {
    providers: Vec<Box<dyn BackendProvider>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Registry with every backend compiled into this build.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(StubProvider);
        #[cfg(feature = "backend-tract")]
        registry.register(TractProvider);
        registry
    }

    pub fn register<P: BackendProvider + 'static>(&mut self, provider: P) {
        self.providers.push(Box::new(provider));
    }

    /// List registered providers in resolution order.
    pub fn list(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Select the provider for a model path and delegate.
    pub fn resolve(&self, options: &DetectorOptions) -> Result<&dyn BackendProvider> {
        let base = &options.base_options;
        let provider = self
            .providers
            .iter()
            .find(|p| p.accepts(&base.model_asset_path))
            .ok_or_else(|| {
                BenchError::Config(format!(
                    "no registered backend accepts model {}",
                    base.model_asset_path.display()
                ))
            })?;
        if !provider.supports(base.delegate) {
            return Err(BenchError::UnsupportedDelegate {
                backend: provider.name(),
                delegate: base.delegate,
            });
        }
        Ok(provider.as_ref())
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
