//! Feature annotations and their injection handlers

use std::any::Any;
use std::rc::Rc;

use datafx_core::prelude::*;
use datafx_flow::injection::{
    field_node, AnnotatedTypeProvider, Annotation, AnnotationType, AnnotationValue,
    ResourceConsumer, ViewContext,
};

use crate::FeatureHandler;

/// Inject the `Property<bool>` of a feature into a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureToggle(pub String);

impl FeatureToggle {
    pub fn new(feature: impl Into<String>) -> Self {
        Self(feature.into())
    }
}

impl Annotation for FeatureToggle {}

/// Show the annotated node only while the feature is enabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HideByFeature(pub String);

impl HideByFeature {
    pub fn new(feature: impl Into<String>) -> Self {
        Self(feature.into())
    }
}

impl Annotation for HideByFeature {}

/// Disable the annotated node while the feature is disabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisabledByFeature(pub String);

impl DisabledByFeature {
    pub fn new(feature: impl Into<String>) -> Self {
        Self(feature.into())
    }
}

impl Annotation for DisabledByFeature {}

fn feature_handler(view: &ViewContext<'_>, feature: &str) -> Result<Rc<FeatureHandler>> {
    view.flow_context.get::<FeatureHandler>().ok_or_else(|| {
        Error::injection(
            view.controller_type.name(),
            feature,
            "no FeatureHandler registered in the flow context",
        )
    })
}

#[derive(Debug)]
pub struct FeatureToggleProvider;

impl AnnotatedTypeProvider for FeatureToggleProvider {
    fn annotation_type(&self) -> AnnotationType {
        AnnotationType::of::<FeatureToggle>()
    }

    fn provide(&self, annotation: &AnnotationValue, view: &ViewContext<'_>) -> Result<Box<dyn Any>> {
        let FeatureToggle(feature) = annotation.expect::<FeatureToggle>()?;
        let handler = feature_handler(view, feature)?;
        Ok(Box::new(handler.feature_property(feature)))
    }
}

#[derive(Debug)]
pub struct HideByFeatureConsumer;

impl ResourceConsumer for HideByFeatureConsumer {
    fn annotation_type(&self) -> AnnotationType {
        AnnotationType::of::<HideByFeature>()
    }

    fn consume(
        &self,
        annotation: &AnnotationValue,
        value: &dyn Any,
        view: &ViewContext<'_>,
    ) -> Result<()> {
        let HideByFeature(feature) = annotation.expect::<HideByFeature>()?;
        let handler = feature_handler(view, feature)?;
        match field_node(value) {
            Some(node) => handler.hide_by_feature(&node, feature),
            None => warn!(
                "HideByFeature({}) on {} has no node to bind",
                feature, view.controller_type
            ),
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct DisableByFeatureConsumer;

impl ResourceConsumer for DisableByFeatureConsumer {
    fn annotation_type(&self) -> AnnotationType {
        AnnotationType::of::<DisabledByFeature>()
    }

    fn consume(
        &self,
        annotation: &AnnotationValue,
        value: &dyn Any,
        view: &ViewContext<'_>,
    ) -> Result<()> {
        let DisabledByFeature(feature) = annotation.expect::<DisabledByFeature>()?;
        let handler = feature_handler(view, feature)?;
        match field_node(value) {
            Some(node) => handler.disable_by_feature(&node, feature),
            None => warn!(
                "DisabledByFeature({}) on {} has no node to bind",
                feature, view.controller_type
            ),
        }
        Ok(())
    }
}
