#![forbid(unsafe_code)]

//! Portal target resolution.
//!
//! | `portal` | container | Target |
//! |----------|-----------|--------|
//! | `false` | any | `None` (render in place) |
//! | `true` | none | document body |
//! | `true` | attached element / matching selector | that element |
//! | `true` | detached element / unmatched selector | document body, warned |

use drawer_core::{ElementId, Environment};

use super::config::PortalContainer;

/// Resolve where drawer content is mounted. `None` means in place.
pub fn resolve_portal_target(
    portal: bool,
    container: Option<&PortalContainer>,
    env: &dyn Environment,
) -> Option<ElementId> {
    if !portal {
        return None;
    }
    let resolved = match container {
        None => return Some(env.body()),
        Some(PortalContainer::Element(element)) => {
            Some(*element).filter(|&element| env.is_attached(element))
        }
        Some(PortalContainer::Selector(selector)) => env.query_selector(selector),
    };
    match resolved {
        Some(element) => Some(element),
        None => {
            tracing::warn!(
                container = ?container,
                "Portal container not found, falling back to document body"
            );
            Some(env.body())
        }
    }
}
