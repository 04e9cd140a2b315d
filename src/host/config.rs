//! Config - host handle to an engine configuration object.

use std::rc::{Rc, Weak};

use tracing::debug;

use crate::engine::{ConfigId, NativeConfig};
use crate::error::{BridgeError, Result};
use crate::types::{Errata, ExperimentalFeature};

use super::context::{ContextInner, HostContext};

/// Engine configuration shared by the nodes created with it.
///
/// Nodes take their initial style from the config when created and consult
/// its point scale factor on every layout pass. Errata are recorded for the
/// host to read back; Taffy has no legacy modes to switch. Freeing a config
/// that nodes still use puts them on the default config.
#[derive(Clone)]
pub struct Config {
    id: ConfigId,
    context: Weak<ContextInner>,
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Weak::ptr_eq(&self.context, &other.context)
    }
}

impl Eq for Config {}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config").field("id", &self.id).finish()
    }
}

impl Config {
    pub fn create(context: &HostContext) -> Result<Config> {
        let id = context.inner().engine_mut()?.new_config();
        debug!(config = ?id, context = context.id(), "created config");
        Ok(Config {
            id,
            context: Rc::downgrade(context.inner()),
        })
    }

    /// Freeing twice is an invariant violation.
    pub fn free(&self) -> Result<()> {
        self.context()?.engine_mut()?.free_config(self.id)?;
        debug!(config = ?self.id, "freed config");
        Ok(())
    }

    pub(crate) fn id(&self) -> ConfigId {
        self.id
    }

    pub(crate) fn belongs_to(&self, context: &Rc<ContextInner>) -> bool {
        std::ptr::eq(self.context.as_ptr(), Rc::as_ptr(context))
    }

    fn context(&self) -> Result<Rc<ContextInner>> {
        self.context.upgrade().ok_or(BridgeError::ContextDropped)
    }

    fn update(&self, update: impl FnOnce(&mut NativeConfig)) -> Result<()> {
        let context = self.context()?;
        let mut engine = context.engine_mut()?;
        update(engine.config_mut(self.id)?);
        Ok(())
    }

    fn read<T>(&self, read: impl FnOnce(&NativeConfig) -> T) -> Result<T> {
        let context = self.context()?;
        let engine = context.engine()?;
        Ok(read(engine.config(self.id)?))
    }

    pub fn set_errata(&self, errata: impl Into<Errata>) -> Result<()> {
        let errata = errata.into();
        self.update(|config| config.errata = errata)
    }

    pub fn get_errata(&self) -> Result<Errata> {
        self.read(|config| config.errata)
    }

    pub fn set_experimental_feature_enabled(&self, feature: ExperimentalFeature, enabled: bool) -> Result<()> {
        self.update(|config| config.set_experimental_feature_enabled(feature, enabled))
    }

    pub fn is_experimental_feature_enabled(&self, feature: ExperimentalFeature) -> Result<bool> {
        self.read(|config| config.is_experimental_feature_enabled(feature))
    }

    /// Pixels per point. 0 disables rounding of computed layouts.
    pub fn set_point_scale_factor(&self, pixels_in_point: f32) -> Result<()> {
        self.update(|config| config.set_point_scale_factor(pixels_in_point))
    }

    pub fn get_point_scale_factor(&self) -> Result<f32> {
        self.read(|config| config.point_scale_factor)
    }

    /// Affects nodes created after the call.
    pub fn set_use_web_defaults(&self, use_web_defaults: bool) -> Result<()> {
        self.update(|config| config.use_web_defaults = use_web_defaults)
    }

    pub fn use_web_defaults(&self) -> Result<bool> {
        self.read(|config| config.use_web_defaults)
    }
}
