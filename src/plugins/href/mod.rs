//! Hyperlinks.
//!
//! ```text
//!   Click on Href
//!     "#anchor"              -> move first SceneCamera to the anchor, Fragment request
//!     url, no animation      -> Open request now
//!     url, target "w#anim"   -> SceneEvent::Href on the link, wait for AnimationEnd on #anim
//!                               -> Open request, wait dropped
//! ```
//!
//! Navigation itself belongs to the embedding application; this plugin only writes
//! `NavigationRequest` messages.

use bevy::prelude::*;

use crate::common::error::{BehaviorError, BehaviorResult};
use crate::plugins::scene::{
    self, report, BehaviorFault, LoadContext, SceneCamera, SceneEvent, SceneEventKind, SceneQuery, SceneSet,
};

/// Link URL (`href` attribute).
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Href(pub String);

/// Raw `target` attribute: `window[#animationId]`.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTarget(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkWindow {
    #[default]
    Current,
    Blank,
}

impl LinkTarget {
    /// Split into the window and the optional exit animation id.
    pub fn parse(&self) -> (LinkWindow, Option<&str>) {
        let (window, animation) = match self.0.split_once('#') {
            Some((w, a)) => (w, Some(a).filter(|a| !a.is_empty())),
            None => (self.0.as_str(), None),
        };
        let window = match window.trim() {
            "_blank" => LinkWindow::Blank,
            _ => LinkWindow::Current,
        };
        (window, animation)
    }
}

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum NavigationRequest {
    /// Same-page anchor, e.g. `#intro`.
    Fragment(String),
    Open { url: String, window: LinkWindow },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNavigation {
    pub link: Entity,
    pub animation: Entity,
    pub url: String,
    pub window: LinkWindow,
}

/// Links waiting for their exit animation to end.
#[derive(Resource, Debug, Default)]
pub struct PendingNavigations(pub Vec<PendingNavigation>);

pub fn plugin(app: &mut App) {
    scene::register_attribute(app, "href", apply_href);
    scene::register_attribute(app, "target", apply_link_target);

    app.add_message::<NavigationRequest>()
        .init_resource::<PendingNavigations>();

    app.add_systems(
        Update,
        (cancel_removed_links, follow_links)
            .chain()
            .in_set(SceneSet::React),
    );
}

fn apply_href(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    entity.insert(Href(value.trim().to_owned()));
    Ok(())
}

fn apply_link_target(entity: &mut EntityCommands, _: &mut LoadContext, value: &str) -> BehaviorResult<()> {
    entity.insert(LinkTarget(value.trim().to_owned()));
    Ok(())
}

pub fn cancel_removed_links(mut removed: RemovedComponents<Href>, mut pending: ResMut<PendingNavigations>) {
    for link in removed.read() {
        pending.0.retain(|p| p.link != link);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn follow_links(
    mut events: ParamSet<(MessageReader<SceneEvent>, MessageWriter<SceneEvent>)>,
    mut navigation: MessageWriter<NavigationRequest>,
    mut faults: MessageWriter<BehaviorFault>,
    mut pending: ResMut<PendingNavigations>,
    scene: SceneQuery,
    q_links: Query<(&Href, Option<&LinkTarget>)>,
    q_globals: Query<&GlobalTransform>,
    mut q_cameras: Query<(Entity, &mut Transform), With<SceneCamera>>,
) {
    let mut clicked = Vec::new();
    let mut ended = Vec::new();
    for ev in events.p0().read() {
        match ev.kind {
            SceneEventKind::Click if q_links.contains(ev.target) => clicked.push(ev.target),
            SceneEventKind::AnimationEnd => ended.push(ev.target),
            _ => {}
        }
    }

    // Waits registered before this frame's clicks.
    for animation in ended {
        pending.0.retain(|p| {
            if p.animation != animation {
                return true;
            }
            navigation.write(NavigationRequest::Open { url: p.url.clone(), window: p.window });
            false
        });
    }

    for link in clicked {
        let Ok((href, target)) = q_links.get(link) else {
            continue;
        };
        let url = href.0.as_str();
        info!("{link}: link to {url}");

        if let Some(id) = url.strip_prefix('#') {
            let Some(anchor) = scene.by_id(id).and_then(|a| q_globals.get(a).ok()) else {
                report(&mut faults, Some(link), BehaviorError::MissingAnchor(id.to_owned()));
                continue;
            };
            let Some(mut camera_tf) = q_cameras
                .iter_mut()
                .min_by_key(|(e, _)| *e)
                .map(|(_, tf)| tf)
            else {
                report(&mut faults, Some(link), BehaviorError::MissingCamera);
                continue;
            };
            camera_tf.translation = anchor.translation();
            navigation.write(NavigationRequest::Fragment(url.to_owned()));
            continue;
        }

        let (window, animation) = target.map(LinkTarget::parse).unwrap_or_default();
        let open = NavigationRequest::Open { url: url.to_owned(), window };

        let Some(animation_id) = animation else {
            navigation.write(open);
            continue;
        };
        let Some(animation) = scene.by_id(animation_id) else {
            report(&mut faults, Some(link), BehaviorError::MissingAnimation(animation_id.to_owned()));
            navigation.write(open);
            continue;
        };

        events.p1().write(SceneEvent::new(link, SceneEventKind::Href));
        pending.0.push(PendingNavigation {
            link,
            animation,
            url: url.to_owned(),
            window,
        });
    }
}
