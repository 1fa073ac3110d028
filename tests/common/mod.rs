//! Shared fixtures for the integration tests.
//!
//! Builds an in-memory host that looks like a small game engine: a core module with drawable
//! assets and a property manager, an editor module with sprite drawing and list controls, and a
//! UI module with attribute converters.

#![allow(dead_code)]

use std::{result::Result as StdResult, sync::Arc};

use hostbridge::{
    host::memory::{CallContext, ModuleBuilder},
    prelude::*,
};

/// Value written by `Host.Core.Thing.TryParse` into its `out` parameter on success
pub const PARSED: i32 = 42;

const SPRITE_UTILITY: &str = "Host.Editor.SpriteUtility";
const PROPERTY_MANAGER: &str = "Host.Core.DrivenPropertyManager";

/// The engine host in its newest version
pub fn engine() -> Arc<InMemoryHost> {
    Arc::new(build(true))
}

/// The engine host before texture drawing, `TryRegisterProperty` and `TryGetConverterType`
pub fn legacy_engine() -> Arc<InMemoryHost> {
    Arc::new(build(false))
}

/// A fresh context over `host`
pub fn connect(host: &Arc<InMemoryHost>, config: BridgeConfig) -> Arc<BridgeContext> {
    Arc::new(BridgeContext::new(host.clone(), config))
}

/// Number of sprites and textures drawn so far
pub fn draw_count(host: &InMemoryHost) -> i32 {
    host.static_value(SPRITE_UTILITY, "s_DrawCount")
        .and_then(|v| v.as_i32())
        .unwrap_or(0)
}

/// Registered driven properties, as "driver:target:path"
pub fn driven(host: &InMemoryHost) -> Vec<String> {
    match host.static_value(PROPERTY_MANAGER, "s_Driven") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn build(modern: bool) -> InMemoryHost {
    HostBuilder::new()
        .module("Host.Core", |m| core(m, modern))
        .module("Host.Editor", |m| editor(m, modern))
        .module("Host.UIElements", |m| ui(m, modern))
        .build()
}

fn core(m: &mut ModuleBuilder, modern: bool) {
    m.class("Host.Core.Sprite", |_| {});
    m.class("Host.Core.Texture", |_| {});
    m.class("Host.Core.Component", |_| {});
    m.class("Host.Core.Animator", |t| {
        t.extends("Host.Core.Component");
    });
    m.value_type("Host.Core.Rect", |_| {});
    m.value_type("Host.Core.Color", |_| {});

    m.class("Host.Core.Thing", |t| {
        t.method("Draw")
            .as_static()
            .param("sprite", "Host.Core.Sprite")
            .param("rect", "Host.Core.Rect")
            .param("color", "Host.Core.Color")
            .returns("System.String")
            .body(|_, _| Ok(Value::from("sprite")));
        t.method("Draw")
            .as_static()
            .non_public()
            .param("texture", "Host.Core.Texture")
            .param("rect", "Host.Core.Rect")
            .param("color", "Host.Core.Color")
            .returns("System.String")
            .body(|_, _| Ok(Value::from("texture")));
        t.method("TryParse")
            .as_static()
            .param("text", "System.String")
            .param_out("result", "System.Int32")
            .returns("System.Boolean")
            .body(|_, args| {
                args[1] = Value::I32(PARSED);
                Ok(Value::Bool(true))
            });
        t.method("Swap")
            .as_static()
            .param_ref("a", "System.Int32")
            .param_ref("b", "System.Int32")
            .body(|_, args| {
                args.swap(0, 1);
                Ok(Value::Void)
            });
        t.method("Echo")
            .as_static()
            .generic(1)
            .param("value", TypeSig::generic(0))
            .returns(TypeSig::generic(0))
            .body(|_, args| Ok(args[0].clone()));
        t.method("Crash").as_static().body(|_, _| {
            Err(HostError::new("System.NullReferenceException", "crashed"))
        });
        t.field("m_Health", "System.Int32")
            .non_public()
            .initial(Value::I32(100));
        t.method("Heal")
            .param("amount", "System.Int32")
            .returns("System.Int32")
            .body(|ctx, args| {
                let this = ctx.this()?;
                let health = ctx.host.field(this, "m_Health").and_then(|v| v.as_i32()).unwrap_or(0);
                let healed = health + args[0].as_i32().unwrap_or(0);
                ctx.host.set_field(this, "m_Health", Value::I32(healed))?;
                Ok(Value::I32(healed))
            });
        t.constructor();
    });

    m.class(PROPERTY_MANAGER, |t| {
        t.field("s_Driven", TypeSig::array("System.String"))
            .as_static()
            .non_public()
            .initial(Value::Array(Vec::new()));
        let names: &[&str] = if modern {
            &["RegisterProperty", "UnregisterProperty", "TryRegisterProperty"]
        } else {
            &["RegisterProperty", "UnregisterProperty"]
        };
        for &name in names {
            let method = t
                .method(name)
                .as_static()
                .param("driver", "System.Object")
                .param("target", "System.Object")
                .param("propertyPath", "System.String");
            match name {
                "RegisterProperty" => method.body(|ctx, args| {
                    let entry = entry(ctx, args)?;
                    edit_driven(ctx, |items| {
                        if !items.contains(&entry) {
                            items.push(entry);
                        }
                        Value::Void
                    })
                }),
                "UnregisterProperty" => method.body(|ctx, args| {
                    let entry = entry(ctx, args)?;
                    edit_driven(ctx, |items| {
                        items.retain(|item| *item != entry);
                        Value::Void
                    })
                }),
                _ => method.returns("System.Boolean").body(|ctx, args| {
                    let entry = entry(ctx, args)?;
                    edit_driven(ctx, |items| {
                        let fresh = !items.contains(&entry);
                        if fresh {
                            items.push(entry);
                        }
                        Value::Bool(fresh)
                    })
                }),
            };
        }
        t.method("UnregisterProperties")
            .as_static()
            .param("driver", "System.Object")
            .body(|ctx, args| {
                let prefix = format!("{}:", name_of(ctx, &args[0])?);
                edit_driven(ctx, |items| {
                    items.retain(|item| !item.starts_with(&prefix));
                    Value::Void
                })
            });
    });
}

fn entry(ctx: &CallContext<'_>, args: &[Value]) -> StdResult<String, HostError> {
    Ok(format!(
        "{}:{}:{}",
        name_of(ctx, &args[0])?,
        name_of(ctx, &args[1])?,
        args[2].as_str().unwrap_or_default()
    ))
}

fn name_of(ctx: &CallContext<'_>, value: &Value) -> StdResult<String, HostError> {
    value
        .as_object()
        .filter(|obj| ctx.host.is_alive(*obj))
        .map(|obj| ctx.host.display(obj))
        .ok_or_else(|| HostError::null_reference("object expected"))
}

fn edit_driven(
    ctx: &CallContext<'_>,
    edit: impl FnOnce(&mut Vec<String>) -> Value,
) -> StdResult<Value, HostError> {
    let mut items = driven(ctx.host);
    let result = edit(&mut items);
    ctx.host.set_static_value(
        PROPERTY_MANAGER,
        "s_Driven",
        Value::Array(items.into_iter().map(Value::from).collect()),
    )?;
    Ok(result)
}

fn editor(m: &mut ModuleBuilder, modern: bool) {
    m.class(SPRITE_UTILITY, |t| {
        t.field("s_DrawCount", "System.Int32")
            .as_static()
            .non_public()
            .initial(Value::I32(0));
        t.method("Draw")
            .as_static()
            .param("sprite", "Host.Core.Sprite")
            .param("rect", "Host.Core.Rect")
            .param("color", "Host.Core.Color")
            .body(|ctx, _| count_draw(ctx));
        if modern {
            t.method("Draw")
                .as_static()
                .non_public()
                .param("texture", "Host.Core.Texture")
                .param("rect", "Host.Core.Rect")
                .param("color", "Host.Core.Color")
                .body(|ctx, _| count_draw(ctx));
        }
    });

    m.class("Host.Editor.ReorderableList", |t| {
        t.field("m_Elements", TypeSig::array("System.Object"))
            .non_public()
            .initial(Value::Array(Vec::new()));
        t.field("m_Draggable", "System.Boolean").non_public();
        t.property("index", "System.Int32").initial(Value::I32(-1));
        t.property("count", "System.Int32").getter(|ctx| {
            let len = items(ctx)?.len();
            Ok(Value::I32(i32::try_from(len).unwrap_or(i32::MAX)))
        });
        t.constructor()
            .param("elements", TypeSig::array("System.Object"))
            .param("draggable", "System.Boolean")
            .body(|ctx, args| {
                let this = ctx.this()?;
                ctx.host.set_field(this, "m_Elements", args[0].clone())?;
                ctx.host.set_field(this, "m_Draggable", args[1].clone())?;
                Ok(Value::Void)
            });
        t.method("Select")
            .param("index", "System.Int32")
            .body(|ctx, args| {
                if item(ctx, &args[0])?.is_none() {
                    return Err(HostError::new(
                        "System.ArgumentOutOfRangeException",
                        "index",
                    ));
                }
                ctx.host.set_field(ctx.this()?, "index", args[0].clone())?;
                Ok(Value::Void)
            });
        t.method("TryGetElement")
            .param("index", "System.Int32")
            .param_out("element", "System.Object")
            .returns("System.Boolean")
            .body(|ctx, args| {
                let found = item(ctx, &args[0])?;
                let hit = found.is_some();
                if let Some(value) = found {
                    args[1] = value;
                }
                Ok(Value::Bool(hit))
            });
        t.method("GetElement")
            .generic(1)
            .param("index", "System.Int32")
            .returns(TypeSig::generic(0))
            .body(|ctx, args| {
                item(ctx, &args[0])?.ok_or_else(|| {
                    HostError::new("System.ArgumentOutOfRangeException", "index")
                })
            });
    });
}

fn count_draw(ctx: &CallContext<'_>) -> StdResult<Value, HostError> {
    let count = draw_count(ctx.host) + 1;
    ctx.host
        .set_static_value(SPRITE_UTILITY, "s_DrawCount", Value::I32(count))?;
    Ok(Value::Void)
}

fn items(ctx: &CallContext<'_>) -> StdResult<Vec<Value>, HostError> {
    match ctx.host.field(ctx.this()?, "m_Elements") {
        Some(Value::Array(items)) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

fn item(ctx: &CallContext<'_>, index: &Value) -> StdResult<Option<Value>, HostError> {
    let items = items(ctx)?;
    Ok(index
        .as_i32()
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| items.get(i).cloned()))
}

fn ui(m: &mut ModuleBuilder, modern: bool) {
    m.class("Host.UIElements.LongConverter", |t| {
        t.method("FromString")
            .param("text", "System.String")
            .returns("System.Object")
            .body(|_, args| {
                let text = args[0].as_str().unwrap_or_default();
                text.parse::<i64>()
                    .map(Value::I64)
                    .map_err(|_| HostError::new("System.FormatException", text.to_string()))
            });
        t.method("ToString")
            .param("value", "System.Object")
            .returns("System.String")
            .body(|_, args| {
                args[0]
                    .as_i64()
                    .map(|n| Value::from(n.to_string()))
                    .ok_or_else(|| HostError::argument("expected an Int64"))
            });
    });

    m.class("Host.UIElements.AttributeConverters", |t| {
        t.method("TryGetConverter")
            .as_static()
            .generic(1)
            .param_out("converter", "System.Object")
            .returns("System.Boolean")
            .body(|ctx, args| {
                let name = ctx.type_args.first().map(|ty| ty.fullname.clone());
                converter_for(ctx, name.as_deref(), &mut args[0])
            });
        t.method("TryGetConverter")
            .as_static()
            .param("type", "System.Type")
            .param_out("converter", "System.Object")
            .returns("System.Boolean")
            .body(|ctx, args| {
                let name = args[0].as_type().map(|ty| ty.fullname.clone());
                converter_for(ctx, name.as_deref(), &mut args[1])
            });
        if modern {
            t.method("TryGetConverterType")
                .as_static()
                .param("type", "System.Type")
                .param_out("converterType", "System.Type")
                .returns("System.Boolean")
                .body(|ctx, args| {
                    let found = args[0]
                        .as_type()
                        .filter(|ty| ty.fullname == "System.Int64")
                        .and_then(|_| ctx.host.type_named("Host.UIElements.LongConverter"));
                    let hit = found.is_some();
                    if let Some(ty) = found {
                        args[1] = Value::Type(ty);
                    }
                    Ok(Value::Bool(hit))
                });
        }
    });
}

fn converter_for(
    ctx: &CallContext<'_>,
    value_type: Option<&str>,
    slot: &mut Value,
) -> StdResult<Value, HostError> {
    if value_type != Some("System.Int64") {
        return Ok(Value::Bool(false));
    }
    *slot = Value::Object(ctx.host.allocate("Host.UIElements.LongConverter")?);
    Ok(Value::Bool(true))
}
