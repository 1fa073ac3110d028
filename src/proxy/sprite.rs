//! Sprite drawing through the editor's sprite utility.

use std::sync::Arc;

use crate::{
    bridge::{BridgeContext, Capability, MemberQuery},
    host::{HostRef, StructValue, Value},
    proxy::{HostFeature, HostProxy},
    Result,
};

const ASSEMBLY: &str = "Host.Editor";
const TYPE_NAME: &str = "Host.Editor.SpriteUtility";

const DRAW_SPRITE: &str = "sprite.draw_sprite";
const DRAW_TEXTURE: &str = "sprite.draw_texture";

/// A screen rectangle, passed by value as `Host.Core.Rect`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<Rect> for Value {
    fn from(rect: Rect) -> Self {
        Value::Struct(StructValue::new(
            "Host.Core.Rect",
            vec![
                ("x".into(), Value::F32(rect.x)),
                ("y".into(), Value::F32(rect.y)),
                ("width".into(), Value::F32(rect.width)),
                ("height".into(), Value::F32(rect.height)),
            ],
        ))
    }
}

/// An RGBA color, passed by value as `Host.Core.Color`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque white, the neutral tint
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Creates a color
    #[must_use]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }
}

impl From<Color> for Value {
    fn from(color: Color) -> Self {
        Value::Struct(StructValue::new(
            "Host.Core.Color",
            vec![
                ("r".into(), Value::F32(color.r)),
                ("g".into(), Value::F32(color.g)),
                ("b".into(), Value::F32(color.b)),
                ("a".into(), Value::F32(color.a)),
            ],
        ))
    }
}

/// The static drawing surface of `Host.Editor.SpriteUtility`.
///
/// `Draw(Sprite, Rect, Color)` is public and always present. The texture overload is internal
/// and only exists in some host versions; check [`SpriteDrawer::supports_texture`] before
/// calling [`SpriteDrawer::draw_texture`].
#[derive(Debug, Clone)]
pub struct SpriteDrawer {
    proxy: HostProxy,
}

impl HostFeature for SpriteDrawer {
    const NAME: &'static str = "sprite drawer";

    fn capabilities() -> Vec<Capability> {
        vec![
            Capability::required(
                DRAW_SPRITE,
                MemberQuery::method(ASSEMBLY, TYPE_NAME, "Draw")
                    .as_static()
                    .signature(signature!["Host.Core.Sprite", "Host.Core.Rect", "Host.Core.Color"]),
            ),
            Capability::optional(
                DRAW_TEXTURE,
                MemberQuery::method(ASSEMBLY, TYPE_NAME, "Draw")
                    .as_static()
                    .non_public()
                    .signature(signature![
                        "Host.Core.Texture",
                        "Host.Core.Rect",
                        "Host.Core.Color"
                    ]),
            ),
        ]
    }
}

impl SpriteDrawer {
    /// Installs the feature and binds the static surface.
    ///
    /// # Errors
    ///
    /// Returns the resolution error of the utility type, or of the sprite overload under eager
    /// validation.
    pub fn new(ctx: &Arc<BridgeContext>) -> Result<Self> {
        ctx.install::<SpriteDrawer>()?;
        let owner = ctx.resolve_type(ASSEMBLY, TYPE_NAME)?;
        Ok(SpriteDrawer {
            proxy: HostProxy::static_only(ctx, &owner),
        })
    }

    /// Draws a sprite into `rect`, tinted by `color`.
    ///
    /// # Errors
    ///
    /// Returns the marshaling or invocation error.
    pub fn draw_sprite(&self, sprite: HostRef, rect: Rect, color: Color) -> Result<()> {
        self.proxy.call_capability(
            DRAW_SPRITE,
            &[Value::Object(sprite), rect.into(), color.into()],
        )?;
        Ok(())
    }

    /// Draws a raw texture into `rect`, tinted by `color`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MemberNotFound`] on hosts without the texture overload.
    pub fn draw_texture(&self, texture: HostRef, rect: Rect, color: Color) -> Result<()> {
        self.proxy.call_capability(
            DRAW_TEXTURE,
            &[Value::Object(texture), rect.into(), color.into()],
        )?;
        Ok(())
    }

    /// Capability query for [`SpriteDrawer::draw_texture`]
    #[must_use]
    pub fn supports_texture(&self) -> bool {
        self.proxy
            .context()
            .is_available(DRAW_TEXTURE)
            .unwrap_or(false)
    }
}
