use super::{socket_cache::SocketPositionCache, surface::SurfaceRegistry};
use crate::{
    config::CollisionSettings,
    debug::DebugShapes,
    scene::{CollisionScene, SphereTrace},
    types::{ActorId, HitEvent, TraceHit},
};

/// Sweep every tracked socket from its cached position to its current one and collect the
/// hits that should be reported, in trace order.
///
/// Each reported actor is recorded on its surface so it is not reported again during the
/// same activation window. Surfaces whose element is gone and sockets without a cached start
/// position are skipped. A socket that has not moved is still traced: anything overlapping
/// it is reported.
pub fn sweep_surfaces(
    surfaces: &mut SurfaceRegistry,
    cache: &SocketPositionCache,
    settings: &CollisionSettings,
    owner: Option<ActorId>,
    scene: &impl CollisionScene,
    debug_shapes: &mut DebugShapes,
) -> Vec<HitEvent> {
    let categories = settings.category_mask();
    let mut reported = Vec::new();

    // The owner and the configured actors never block the trace; already-hit actors of the
    // current surface are appended per socket.
    let mut ignored_actors: Vec<ActorId> = owner.into_iter().collect();
    ignored_actors.extend(settings.ignored_actors.iter().copied());
    let always_ignored = ignored_actors.len();

    for surface in surfaces.iter_mut() {
        let element = surface.element;
        if !scene.element_is_valid(element) {
            log::trace!("skipping invalid element {element:?} while sweeping");
            continue;
        }

        for index in 0..surface.sockets().len() {
            let socket = &surface.sockets()[index];
            let Some(start) = cache.location(element, socket) else {
                continue;
            };
            let Some(end) = scene.socket_location(element, socket) else {
                continue;
            };

            ignored_actors.truncate(always_ignored);
            ignored_actors.extend(surface.hit_actors().iter().copied());

            let hits = scene.sphere_trace(&SphereTrace {
                start,
                end,
                radius: settings.trace_radius,
                categories,
                precise: settings.trace_precise,
                ignored_actors: &ignored_actors,
            });

            for hit in hits {
                if surface.has_hit(hit.actor)
                    || is_ignored_class(settings, scene, &hit)
                    || settings.is_ignored_profile(&hit.profile_name)
                {
                    continue;
                }

                surface.record_hit(hit.actor);
                log::trace!(
                    "element {:?} socket {} hit actor {:?} at {:?}",
                    element,
                    surface.sockets()[index],
                    hit.actor,
                    hit.location
                );
                if settings.debug {
                    debug_shapes.hit(hit.location, settings.trace_radius);
                }
                reported.push(HitEvent { hit, element });
            }

            if settings.debug {
                debug_shapes.trace(start, end, settings.trace_radius);
            }
        }
    }

    reported
}

/// True if the hit actor's class is, or derives from, any ignored class.
fn is_ignored_class(
    settings: &CollisionSettings,
    scene: &impl CollisionScene,
    hit: &TraceHit,
) -> bool {
    if settings.ignored_classes.is_empty() {
        return false;
    }
    let Some(class) = scene.actor_class(hit.actor) else {
        return false;
    };
    settings
        .ignored_classes
        .iter()
        .any(|&ignored| scene.is_class_child_of(class, ignored))
}
