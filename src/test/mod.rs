mod hosts;

pub use hosts::*;

use crate::{
    bridge::{Capability, MemberQuery},
    proxy::HostFeature,
};

// A feature over "Host.Core.Thing" with one present and one absent capability. The absent
// one is required when `MISSING_REQUIRED` is set.
pub struct ThingFeature<const MISSING_REQUIRED: bool>;

impl<const MISSING_REQUIRED: bool> HostFeature for ThingFeature<MISSING_REQUIRED> {
    const NAME: &'static str = "thing";

    fn capabilities() -> Vec<Capability> {
        let draw = MemberQuery::method("Host.Core", "Host.Core.Thing", "Draw")
            .as_static()
            .signature(signature!["Host.Core.Sprite", "Host.Core.Rect", "Host.Core.Color"]);
        let vanish = MemberQuery::method("Host.Core", "Host.Core.Thing", "Vanish").as_static();

        vec![
            Capability::required("thing.draw", draw),
            if MISSING_REQUIRED {
                Capability::required("thing.vanish", vanish)
            } else {
                Capability::optional("thing.vanish", vanish)
            },
        ]
    }
}
