//! # datafx-featuretoggle - Feature Toggles
//!
//! Plugs feature flags into the flow's resource injector:
//!
//! - [`FeatureToggle`] injects the feature's `Property<bool>` into a field
//! - [`HideByFeature`] binds a node's visibility to a feature
//! - [`DisabledByFeature`] disables a node while a feature is off
//!
//! ```ignore
//! let features = Rc::new(FeatureHandler::new());
//! let flow = datafx_featuretoggle::install_with(Flow::new::<SettingsController>(), features.clone());
//! features.disable("EXPORT");
//! ```

pub mod handler;
pub mod injection;

use std::rc::Rc;

use datafx_flow::Flow;
use tracing::debug;

pub use handler::FeatureHandler;
pub use injection::{
    DisableByFeatureConsumer, DisabledByFeature, FeatureToggle, FeatureToggleProvider,
    HideByFeature, HideByFeatureConsumer,
};

/// Register the feature handlers on `flow`, adding a [`FeatureHandler`] to
/// its context unless one is already there
pub fn install(flow: Flow) -> Flow {
    let handler = flow
        .registered_object::<FeatureHandler>()
        .unwrap_or_else(|| Rc::new(FeatureHandler::new()));
    install_with(flow, handler)
}

/// Register the feature handlers on `flow`, sharing `features` with the caller
pub fn install_with(mut flow: Flow, features: Rc<FeatureHandler>) -> Flow {
    debug!("Installing feature toggles on flow starting at {}", flow.start_type());
    flow.context_mut().register_shared(features);
    flow.with_provider(FeatureToggleProvider)
        .with_consumer(HideByFeatureConsumer)
        .with_consumer(DisableByFeatureConsumer)
}
