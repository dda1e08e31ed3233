//! Voice factory registry
//!
//! Maps each [`VoiceKind`] to the factory that builds it. Adding a kind means
//! registering a factory; the session engine does not change.

use std::collections::HashMap;
use std::rc::Rc;

use super::headless::HeadlessVoice;
use super::{VoiceKind, VoiceNode};
use crate::clock::Clock;
use crate::error::{Result, SessionError};
use crate::preset::VoiceParams;

/// Builds voices of one kind from resolved parameters
pub trait VoiceFactory {
    fn kind(&self) -> VoiceKind;

    /// Create one voice; `params.kind()` always equals `self.kind()`
    fn create(&self, params: &VoiceParams) -> Result<Box<dyn VoiceNode>>;
}

/// Convenience factory backed by a closure
pub struct FnVoiceFactory<F>
where
    F: Fn(&VoiceParams) -> Result<Box<dyn VoiceNode>>,
{
    kind: VoiceKind,
    create_fn: F,
}

impl<F> FnVoiceFactory<F>
where
    F: Fn(&VoiceParams) -> Result<Box<dyn VoiceNode>>,
{
    pub fn new(kind: VoiceKind, create_fn: F) -> Self {
        Self { kind, create_fn }
    }
}

impl<F> VoiceFactory for FnVoiceFactory<F>
where
    F: Fn(&VoiceParams) -> Result<Box<dyn VoiceNode>>,
{
    fn kind(&self) -> VoiceKind {
        self.kind
    }

    fn create(&self, params: &VoiceParams) -> Result<Box<dyn VoiceNode>> {
        (self.create_fn)(params)
    }
}

/// Registry of available voice factories
#[derive(Default)]
pub struct VoiceRegistry {
    factories: HashMap<VoiceKind, Box<dyn VoiceFactory>>,
}

impl VoiceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with headless voices for every kind, driven by `clock`
    pub fn headless(clock: Rc<dyn Clock>) -> Self {
        let mut registry = Self::new();
        for kind in VoiceKind::ALL {
            let clock = Rc::clone(&clock);
            registry.register_fn(kind, move |params| {
                Ok(Box::new(HeadlessVoice::new(params.clone(), Rc::clone(&clock)))
                    as Box<dyn VoiceNode>)
            });
        }
        registry
    }

    /// Register a factory, replacing any previous one for the same kind
    pub fn register(&mut self, factory: Box<dyn VoiceFactory>) {
        self.factories.insert(factory.kind(), factory);
    }

    /// Register a closure as the factory for `kind`
    pub fn register_fn<F>(&mut self, kind: VoiceKind, create_fn: F)
    where
        F: Fn(&VoiceParams) -> Result<Box<dyn VoiceNode>> + 'static,
    {
        self.register(Box::new(FnVoiceFactory::new(kind, create_fn)));
    }

    /// Remove the factory for `kind`
    pub fn unregister(&mut self, kind: VoiceKind) -> Option<Box<dyn VoiceFactory>> {
        self.factories.remove(&kind)
    }

    /// Get the factory for a kind
    pub fn get(&self, kind: VoiceKind) -> Option<&dyn VoiceFactory> {
        self.factories.get(&kind).map(|f| f.as_ref())
    }

    /// Check if a kind is registered
    pub fn has_kind(&self, kind: VoiceKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// List registered kinds in declaration order
    pub fn kinds(&self) -> Vec<VoiceKind> {
        let mut kinds: Vec<_> = self.factories.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Build a voice with the factory registered for `params.kind()`
    pub fn create(&self, params: &VoiceParams) -> Result<Box<dyn VoiceNode>> {
        let kind = params.kind();
        let factory = self.get(kind).ok_or_else(|| SessionError::UnknownVoiceType {
            voice_type: kind.to_string(),
        })?;
        let node = factory.create(params)?;
        if node.kind() != kind {
            return Err(SessionError::VoiceFailure {
                reason: format!("{} factory built a {} voice", kind, node.kind()),
            });
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn headless_registry() -> VoiceRegistry {
        VoiceRegistry::headless(Rc::new(ManualClock::new()))
    }

    #[test]
    fn test_headless_registers_every_kind() {
        let registry = headless_registry();
        assert_eq!(registry.kinds(), VoiceKind::ALL.to_vec());
    }

    #[test]
    fn test_create_matches_kind() {
        let registry = headless_registry();
        let params = VoiceParams::defaults(VoiceKind::NoiseGenerator);
        let node = registry.create(&params).unwrap();
        assert_eq!(node.kind(), VoiceKind::NoiseGenerator);
    }

    #[test]
    fn test_missing_factory_is_unknown_type() {
        let mut registry = headless_registry();
        assert!(registry.unregister(VoiceKind::Tone).is_some());
        assert!(!registry.has_kind(VoiceKind::Tone));

        let err = registry
            .create(&VoiceParams::defaults(VoiceKind::Tone))
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "UNKNOWN_VOICE_TYPE");
    }

    #[test]
    fn test_mismatched_factory_rejected() {
        let clock: Rc<dyn Clock> = Rc::new(ManualClock::new());
        let mut registry = VoiceRegistry::new();
        registry.register_fn(VoiceKind::Tone, move |_| {
            let params = VoiceParams::defaults(VoiceKind::NoiseGenerator);
            Ok(Box::new(HeadlessVoice::new(params, Rc::clone(&clock))) as Box<dyn VoiceNode>)
        });

        let err = registry
            .create(&VoiceParams::defaults(VoiceKind::Tone))
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "VOICE_FAILURE");
    }
}
