//! Injection handlers registered on every flow

use std::any::Any;

use datafx_core::prelude::*;
use datafx_core::NodeAction;

use super::{
    field_node, AnnotatedTypeProvider, Annotation, AnnotationType, AnnotationValue,
    ResourceConsumer, ViewContext,
};
use crate::handler::FlowActionHandle;

/// Fire the action `id` when the annotated node is activated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTrigger {
    pub id: String,
}

impl ActionTrigger {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Annotation for ActionTrigger {}

/// Navigate back when the annotated node is activated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackTrigger;

impl Annotation for BackTrigger {}

/// Inject the flow's [`FlowActionHandle`] into an `Option<FlowActionHandle>` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionHandler;

impl Annotation for ActionHandler {}

#[derive(Debug)]
pub struct ActionTriggerConsumer;

impl ResourceConsumer for ActionTriggerConsumer {
    fn annotation_type(&self) -> AnnotationType {
        AnnotationType::of::<ActionTrigger>()
    }

    fn consume(
        &self,
        annotation: &AnnotationValue,
        value: &dyn Any,
        view: &ViewContext<'_>,
    ) -> Result<()> {
        let trigger = annotation.expect::<ActionTrigger>()?;
        match field_node(value) {
            Some(node) => node.set_action(Some(NodeAction::Action(trigger.id.clone()))),
            None => warn!(
                "Action trigger '{}' on {} has no node to attach to",
                trigger.id, view.controller_type
            ),
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct BackTriggerConsumer;

impl ResourceConsumer for BackTriggerConsumer {
    fn annotation_type(&self) -> AnnotationType {
        AnnotationType::of::<BackTrigger>()
    }

    fn consume(&self, _: &AnnotationValue, value: &dyn Any, view: &ViewContext<'_>) -> Result<()> {
        match field_node(value) {
            Some(node) => node.set_action(Some(NodeAction::Back)),
            None => warn!(
                "Back trigger on {} has no node to attach to",
                view.controller_type
            ),
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ActionHandlerProvider;

impl AnnotatedTypeProvider for ActionHandlerProvider {
    fn annotation_type(&self) -> AnnotationType {
        AnnotationType::of::<ActionHandler>()
    }

    fn provide(&self, _: &AnnotationValue, view: &ViewContext<'_>) -> Result<Box<dyn Any>> {
        let handle = view
            .flow_context
            .get::<FlowActionHandle>()
            .ok_or(Error::NotStarted)?;
        Ok(Box::new(Some(FlowActionHandle::clone(&handle))))
    }
}
