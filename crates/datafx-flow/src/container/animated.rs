use std::rc::Rc;
use std::time::{Duration, Instant};

use datafx_core::prelude::*;
use datafx_core::{Effect, Node, NodeRef};

use super::ViewContainer;
use crate::view::FlowView;

pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(320);

/// Transition played when the view changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionKind {
    /// Old view fades out over the new one
    #[default]
    Fade,
    /// Old view grows while fading out
    ZoomIn,
    /// Old view shrinks while fading out
    ZoomOut,
    /// New view slides in from the right
    SwipeLeft,
    /// New view slides in from the left
    SwipeRight,
    /// New view slides in from the bottom
    SwipeUp,
    /// New view slides in from the top
    SwipeDown,
}

impl TransitionKind {
    /// Effects of the (outgoing, incoming) nodes at eased progress `t` in `0.0..=1.0`.
    /// Translations are fractions of the container size.
    pub fn effects(&self, t: f32) -> (Effect, Effect) {
        let lerp = |from: f32, to: f32| from + (to - from) * t;
        let none = Effect::NONE;
        match self {
            TransitionKind::Fade => (
                Effect {
                    opacity: lerp(1.0, 0.0),
                    ..none
                },
                none,
            ),
            TransitionKind::ZoomIn => (
                Effect {
                    opacity: lerp(1.0, 0.0),
                    scale: lerp(1.0, 4.0),
                    ..none
                },
                none,
            ),
            TransitionKind::ZoomOut => (
                Effect {
                    opacity: lerp(1.0, 0.0),
                    scale: lerp(1.0, 0.0),
                    ..none
                },
                none,
            ),
            TransitionKind::SwipeLeft => (
                Effect {
                    translate_x: -1.0,
                    ..none
                },
                Effect {
                    translate_x: lerp(1.0, 0.0),
                    ..none
                },
            ),
            TransitionKind::SwipeRight => (
                Effect {
                    translate_x: 1.0,
                    ..none
                },
                Effect {
                    translate_x: lerp(-1.0, 0.0),
                    ..none
                },
            ),
            TransitionKind::SwipeUp => (
                Effect {
                    translate_y: -1.0,
                    ..none
                },
                Effect {
                    translate_y: lerp(1.0, 0.0),
                    ..none
                },
            ),
            TransitionKind::SwipeDown => (
                Effect {
                    translate_y: 1.0,
                    ..none
                },
                Effect {
                    translate_y: lerp(-1.0, 0.0),
                    ..none
                },
            ),
        }
    }
}

/// Ease-in-out curve
fn ease_both(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug)]
struct Transition {
    outgoing: NodeRef,
    incoming: NodeRef,
    started: Instant,
    remove_old: bool,
}

/// Stack container that animates view changes
///
/// The outgoing node stays on top of the new one until the transition ends
/// and ignores input meanwhile. Transitions advance through
/// [`ViewContainer::tick`].
#[derive(Debug)]
pub struct AnimatedContainer {
    root: NodeRef,
    kind: TransitionKind,
    duration: Duration,
    transition: Option<Transition>,
}

impl Default for AnimatedContainer {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION_DURATION, TransitionKind::Fade)
    }
}

impl AnimatedContainer {
    pub fn new(duration: Duration, kind: TransitionKind) -> Self {
        Self {
            root: Node::stack(),
            kind,
            duration,
            transition: None,
        }
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn apply(&self, transition: &Transition, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(transition.started);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f32() / self.duration.as_secs_f32()
        };
        let (outgoing, incoming) = self.kind.effects(ease_both(progress));
        transition.outgoing.set_effect(outgoing);
        transition.incoming.set_effect(incoming);
        progress >= 1.0
    }

    /// Jump a running transition to its end state
    fn finish(&mut self) {
        let Some(transition) = self.transition.take() else {
            return;
        };
        let outgoing = &transition.outgoing;
        outgoing.set_effect(Effect::NONE);
        outgoing.set_mouse_transparent(false);
        outgoing.visible().set(false);
        if transition.remove_old {
            self.root.remove_child(outgoing);
        }
        transition.incoming.set_effect(Effect::NONE);
        trace!("Transition finished");
    }
}

impl ViewContainer for AnimatedContainer {
    fn root(&self) -> NodeRef {
        Rc::clone(&self.root)
    }

    fn switch_view(&mut self, view: &FlowView, remove_old: bool) -> Result<()> {
        self.finish();
        let incoming = view.root()?;

        let outgoing = self
            .root
            .children()
            .into_iter()
            .find(|c| c.visible().get() && !Rc::ptr_eq(c, &incoming));

        for child in self.root.children() {
            child.visible().set(Rc::ptr_eq(&child, &incoming));
        }
        self.root.remove_child(&incoming);
        self.root.add_child(Rc::clone(&incoming));

        let Some(outgoing) = outgoing else {
            return Ok(());
        };
        if self.duration.is_zero() {
            if remove_old {
                self.root.remove_child(&outgoing);
            }
            return Ok(());
        }

        // The old view is drawn on top of the new one while it animates away
        outgoing.visible().set(true);
        outgoing.set_mouse_transparent(true);
        self.root.remove_child(&outgoing);
        self.root.add_child(Rc::clone(&outgoing));

        let transition = Transition {
            outgoing,
            incoming,
            started: Instant::now(),
            remove_old,
        };
        self.apply(&transition, transition.started);
        self.transition = Some(transition);
        Ok(())
    }

    fn tick(&mut self, now: Instant) -> bool {
        let done = match &self.transition {
            Some(transition) => self.apply(transition, now),
            None => return false,
        };
        if done {
            self.finish();
        }
        !done
    }

    fn is_animating(&self) -> bool {
        self.transition.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_both_endpoints() {
        assert_eq!(ease_both(0.0), 0.0);
        assert_eq!(ease_both(1.0), 1.0);
        assert_eq!(ease_both(0.5), 0.5);
        assert_eq!(ease_both(2.0), 1.0);
    }

    #[test]
    fn test_fade_effects() {
        let (out, inc) = TransitionKind::Fade.effects(0.0);
        assert_eq!(out.opacity, 1.0);
        assert_eq!(inc, Effect::NONE);

        let (out, _) = TransitionKind::Fade.effects(1.0);
        assert_eq!(out.opacity, 0.0);
    }

    #[test]
    fn test_swipe_left_moves_incoming_from_the_right() {
        let (out, inc) = TransitionKind::SwipeLeft.effects(0.0);
        assert_eq!(inc.translate_x, 1.0);
        assert_eq!(out.translate_x, -1.0);
        let (_, inc) = TransitionKind::SwipeLeft.effects(1.0);
        assert_eq!(inc.translate_x, 0.0);
    }

    #[test]
    fn test_zoom_in_scales_outgoing_up() {
        let (out, _) = TransitionKind::ZoomIn.effects(1.0);
        assert_eq!(out.scale, 4.0);
        assert_eq!(out.opacity, 0.0);
    }

    #[test]
    fn test_default_container_settings() {
        let container = AnimatedContainer::default();
        assert_eq!(container.duration(), Duration::from_millis(320));
        assert_eq!(container.kind(), TransitionKind::Fade);
        assert!(!container.is_animating());
    }
}
