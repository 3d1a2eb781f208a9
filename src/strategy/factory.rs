//! Strategy registry.

use super::{
    AiGenerator, MoveGenerator, RandomGenerator, RuleBasedGenerator, StrategyError, StrategyKind,
};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

/// Looks up move generators by strategy id.
///
/// The registry is fixed at construction; there is no runtime registration.
#[derive(Debug, Clone)]
pub struct MoveGeneratorFactory {
    generators: BTreeMap<StrategyKind, Arc<dyn MoveGenerator>>,
}

fn build(kind: StrategyKind) -> Arc<dyn MoveGenerator> {
    match kind {
        StrategyKind::Random => Arc::new(RandomGenerator::new()),
        StrategyKind::RuleBased => Arc::new(RuleBasedGenerator::new()),
        StrategyKind::Ai => Arc::new(AiGenerator::new()),
    }
}

impl MoveGeneratorFactory {
    /// Registers every known strategy.
    #[instrument]
    pub fn with_defaults() -> Self {
        Self::with_strategies(StrategyKind::iter())
    }

    /// Registers only the given strategies.
    #[instrument(skip(kinds))]
    pub fn with_strategies(kinds: impl IntoIterator<Item = StrategyKind>) -> Self {
        let generators: BTreeMap<_, _> =
            kinds.into_iter().map(|kind| (kind, build(kind))).collect();
        info!(strategies = ?generators.keys().collect::<Vec<_>>(), "Strategy registry built");
        Self { generators }
    }

    /// Registers caller-supplied generators, keyed by their own kind.
    pub fn from_generators(generators: impl IntoIterator<Item = Arc<dyn MoveGenerator>>) -> Self {
        Self {
            generators: generators.into_iter().map(|g| (g.kind(), g)).collect(),
        }
    }

    /// Returns the generator registered for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::UnsupportedStrategy`] if `kind` is not registered.
    #[instrument(skip(self))]
    pub fn create_generator(
        &self,
        kind: StrategyKind,
    ) -> Result<Arc<dyn MoveGenerator>, StrategyError> {
        match self.generators.get(&kind) {
            Some(generator) => {
                debug!(%kind, "Generator found");
                Ok(Arc::clone(generator))
            }
            None => {
                warn!(%kind, "Strategy not registered");
                Err(StrategyError::UnsupportedStrategy(kind.to_string()))
            }
        }
    }

    /// Like [`MoveGeneratorFactory::create_generator`] but parses a string id.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::UnsupportedStrategy`] for unknown or
    /// unregistered ids.
    pub fn create_generator_by_id(
        &self,
        id: &str,
    ) -> Result<Arc<dyn MoveGenerator>, StrategyError> {
        let kind = StrategyKind::from_str(id)
            .map_err(|_| StrategyError::UnsupportedStrategy(id.to_string()))?;
        self.create_generator(kind)
    }

    /// Registered strategy ids.
    pub fn supported_strategies(&self) -> BTreeSet<StrategyKind> {
        self.generators.keys().copied().collect()
    }

    /// Returns true if `kind` is registered.
    pub fn supports(&self, kind: StrategyKind) -> bool {
        self.generators.contains_key(&kind)
    }
}

impl Default for MoveGeneratorFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}
