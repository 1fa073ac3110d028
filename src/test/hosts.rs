use crate::host::{
    memory::{CallContext, HostBuilder, InMemoryHost, MemberBuilder, ModuleBuilder},
    signature::TypeSig,
    Host, HostError, Value,
};

/// Static log of everything `Host.Editor.SpriteUtility` drew
pub const DRAW_LOG: &str = "s_Drawn";

const SPRITE_UTILITY: &str = "Host.Editor.SpriteUtility";
const PROPERTY_MANAGER: &str = "Host.Core.DrivenPropertyManager";
const REGISTRATIONS: &str = "s_Registrations";

// Host with the "Host.Core" module only
pub fn core_host() -> InMemoryHost {
    HostBuilder::new()
        .module("Host.Core", |m| core_module(m, false, false))
        .build()
}

// Host carrying every feature module in its newest version
pub fn feature_host() -> InMemoryHost {
    features(true)
}

// Host of an older version: no texture drawing, no TryRegisterProperty, no TryGetConverterType
pub fn legacy_feature_host() -> InMemoryHost {
    features(false)
}

// Current driven-property registrations, as "driver -> target.path"
pub fn registrations(host: &InMemoryHost) -> Vec<String> {
    match host.static_value(PROPERTY_MANAGER, REGISTRATIONS) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn features(modern: bool) -> InMemoryHost {
    HostBuilder::new()
        .module("Host.Core", |m| core_module(m, true, modern))
        .module("Host.Editor", |m| editor_module(m, modern))
        .module("Host.UIElements", |m| ui_module(m, modern))
        .build()
}

fn core_module(m: &mut ModuleBuilder, with_manager: bool, modern: bool) {
    m.class("Host.Core.Sprite", |_| {});
    m.class("Host.Core.Texture", |_| {});
    m.value_type("Host.Core.Rect", |_| {});
    m.value_type("Host.Core.Color", |_| {});

    m.class("Host.Core.Thing", |t| {
        t.method("Draw")
            .as_static()
            .param("sprite", "Host.Core.Sprite")
            .param("rect", "Host.Core.Rect")
            .param("color", "Host.Core.Color");
        t.method("Draw")
            .as_static()
            .non_public()
            .param("texture", "Host.Core.Texture")
            .param("rect", "Host.Core.Rect")
            .param("color", "Host.Core.Color");
        t.method("TryParse")
            .as_static()
            .param("text", "System.String")
            .param_out("result", "System.Int32")
            .returns("System.Boolean")
            .body(|_, args| {
                let parsed = args[0].as_str().and_then(|s| s.trim().parse::<i32>().ok());
                match parsed {
                    Some(n) => {
                        args[1] = Value::I32(n);
                        Ok(Value::Bool(true))
                    }
                    None => Ok(Value::Bool(false)),
                }
            });
        t.method("Increment")
            .as_static()
            .param_ref("value", "System.Int32")
            .body(|_, args| {
                let n = args[0].as_i32().unwrap_or(0);
                args[0] = Value::I32(n + 1);
                Ok(Value::Void)
            });
        t.method("Fail").as_static().body(|_, _| {
            Err(HostError::new(
                "System.InvalidOperationException",
                "always fails",
            ))
        });
        t.method("Identity")
            .as_static()
            .generic(1)
            .param("value", TypeSig::generic(0))
            .returns(TypeSig::generic(0))
            .body(|_, args| Ok(args[0].clone()));
        t.property("Name", "System.String");
        t.constructor();
    });

    if with_manager {
        m.class(PROPERTY_MANAGER, |t| {
            t.field(REGISTRATIONS, TypeSig::array("System.String"))
                .as_static()
                .non_public()
                .initial(Value::Array(Vec::new()));
            registration(t.method("RegisterProperty"), |entries, entry| {
                if !entries.contains(&entry) {
                    entries.push(entry);
                }
                Value::Void
            });
            registration(t.method("UnregisterProperty"), |entries, entry| {
                entries.retain(|e| *e != entry);
                Value::Void
            });
            if modern {
                registration(t.method("TryRegisterProperty"), |entries, entry| {
                    if entries.contains(&entry) {
                        return Value::Bool(false);
                    }
                    entries.push(entry);
                    Value::Bool(true)
                })
                .returns("System.Boolean");
            }
            t.method("UnregisterProperties")
                .as_static()
                .param("driver", "System.Object")
                .body(|ctx, args| {
                    let prefix = format!("{} -> ", display(ctx, &args[0])?);
                    update_registrations(ctx, |entries| {
                        entries.retain(|e| !e.starts_with(&prefix));
                        Value::Void
                    })
                });
        });
    }
}

fn registration<'a>(
    method: &'a mut MemberBuilder,
    apply: fn(&mut Vec<String>, String) -> Value,
) -> &'a mut MemberBuilder {
    method
        .as_static()
        .param("driver", "System.Object")
        .param("target", "System.Object")
        .param("propertyPath", "System.String")
        .body(move |ctx, args| {
            let path = args[2].as_str().unwrap_or_default().to_string();
            let entry = format!("{} -> {}.{path}", display(ctx, &args[0])?, display(ctx, &args[1])?);
            update_registrations(ctx, |entries| apply(entries, entry))
        })
}

fn update_registrations(
    ctx: &CallContext<'_>,
    apply: impl FnOnce(&mut Vec<String>) -> Value,
) -> Result<Value, HostError> {
    let mut entries = registrations(ctx.host);
    let result = apply(&mut entries);
    let stored = entries.into_iter().map(Value::from).collect();
    ctx.host
        .set_static_value(PROPERTY_MANAGER, REGISTRATIONS, Value::Array(stored))?;
    Ok(result)
}

fn display(ctx: &CallContext<'_>, value: &Value) -> Result<String, HostError> {
    value
        .as_object()
        .map(|obj| ctx.host.display(obj))
        .ok_or_else(|| HostError::new("System.ArgumentNullException", "Value cannot be null."))
}

fn editor_module(m: &mut ModuleBuilder, modern: bool) {
    m.class(SPRITE_UTILITY, |t| {
        t.field(DRAW_LOG, TypeSig::array("System.String"))
            .as_static()
            .non_public()
            .initial(Value::Array(Vec::new()));
        t.method("Draw")
            .as_static()
            .param("sprite", "Host.Core.Sprite")
            .param("rect", "Host.Core.Rect")
            .param("color", "Host.Core.Color")
            .body(|ctx, args| log_draw(ctx, "sprite", &args[0]));
        if modern {
            t.method("Draw")
                .as_static()
                .non_public()
                .param("texture", "Host.Core.Texture")
                .param("rect", "Host.Core.Rect")
                .param("color", "Host.Core.Color")
                .body(|ctx, args| log_draw(ctx, "texture", &args[0]));
        }
    });

    m.class("Host.Editor.ReorderableList", |t| {
        t.field("m_Elements", TypeSig::array("System.Object"))
            .non_public()
            .initial(Value::Array(Vec::new()));
        t.field("m_Draggable", "System.Boolean").non_public();
        t.property("index", "System.Int32").initial(Value::I32(-1));
        t.property("count", "System.Int32").getter(|ctx| {
            let len = elements(ctx)?.len();
            i32::try_from(len)
                .map(Value::I32)
                .map_err(|_| HostError::new("System.OverflowException", "too many elements"))
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
                element(ctx, &args[0])?.ok_or_else(|| out_of_range(&args[0]))?;
                ctx.host.set_field(ctx.this()?, "index", args[0].clone())?;
                Ok(Value::Void)
            });
        t.method("TryGetElement")
            .param("index", "System.Int32")
            .param_out("element", "System.Object")
            .returns("System.Boolean")
            .body(|ctx, args| match element(ctx, &args[0])? {
                Some(found) => {
                    args[1] = found;
                    Ok(Value::Bool(true))
                }
                None => Ok(Value::Bool(false)),
            });
        t.method("GetElement")
            .generic(1)
            .param("index", "System.Int32")
            .returns(TypeSig::generic(0))
            .body(|ctx, args| {
                let value = element(ctx, &args[0])?.ok_or_else(|| out_of_range(&args[0]))?;
                let target = ctx
                    .type_args
                    .first()
                    .ok_or_else(|| HostError::argument("GetElement needs a type argument"))?;
                let fits = match &value {
                    Value::Object(obj) => ctx
                        .host
                        .type_of(*obj)
                        .is_some_and(|ty| ctx.host.is_assignable(&ty, &target.fullname)),
                    other => {
                        target.fullname == "System.Object"
                            || other.primitive().is_some_and(|p| p.fullname() == target.fullname)
                    }
                };
                if fits {
                    Ok(value)
                } else {
                    Err(HostError::new(
                        "System.InvalidCastException",
                        format!("Element is not a {}", target.fullname),
                    ))
                }
            });
    });
}

fn log_draw(ctx: &CallContext<'_>, kind: &str, image: &Value) -> Result<Value, HostError> {
    let name = display(ctx, image)?;
    let mut drawn = match ctx.host.static_value(SPRITE_UTILITY, DRAW_LOG) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    drawn.push(Value::from(format!("{kind} {name}")));
    ctx.host
        .set_static_value(SPRITE_UTILITY, DRAW_LOG, Value::Array(drawn))?;
    Ok(Value::Void)
}

fn elements(ctx: &CallContext<'_>) -> Result<Vec<Value>, HostError> {
    match ctx.host.field(ctx.this()?, "m_Elements") {
        Some(Value::Array(items)) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

fn element(ctx: &CallContext<'_>, index: &Value) -> Result<Option<Value>, HostError> {
    let items = elements(ctx)?;
    Ok(index
        .as_i32()
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| items.get(i).cloned()))
}

fn out_of_range(index: &Value) -> HostError {
    HostError::new(
        "System.ArgumentOutOfRangeException",
        format!("Index {index} is out of range"),
    )
}

fn ui_module(m: &mut ModuleBuilder, modern: bool) {
    m.class("Host.UIElements.IntConverter", |t| {
        t.method("FromString")
            .param("text", "System.String")
            .returns("System.Object")
            .body(|_, args| {
                let text = args[0].as_str().unwrap_or_default();
                text.parse::<i32>().map(Value::I32).map_err(|_| {
                    HostError::new("System.FormatException", format!("'{text}' is not an integer"))
                })
            });
        t.method("ToString")
            .param("value", "System.Object")
            .returns("System.String")
            .body(|_, args| {
                args[0]
                    .as_i32()
                    .map(|n| Value::from(n.to_string()))
                    .ok_or_else(|| HostError::argument("Expected an integer"))
            });
        t.constructor();
    });

    m.class("Host.UIElements.BoolConverter", |t| {
        t.method("FromString")
            .param("text", "System.String")
            .returns("System.Object")
            .body(|_, args| match args[0].as_str() {
                Some("true") => Ok(Value::Bool(true)),
                Some("false") => Ok(Value::Bool(false)),
                other => Err(HostError::new(
                    "System.FormatException",
                    format!("'{}' is not a boolean", other.unwrap_or_default()),
                )),
            });
        t.method("ToString")
            .param("value", "System.Object")
            .returns("System.String")
            .body(|_, args| {
                args[0]
                    .as_bool()
                    .map(|b| Value::from(b.to_string()))
                    .ok_or_else(|| HostError::argument("Expected a boolean"))
            });
        t.constructor();
    });

    m.class("Host.UIElements.AttributeConverters", |t| {
        t.method("TryGetConverter")
            .as_static()
            .generic(1)
            .param_out("converter", "System.Object")
            .returns("System.Boolean")
            .body(|ctx, args| {
                let value_type = ctx.type_args.first().map(|ty| ty.fullname.as_str());
                lookup_converter(ctx, value_type, &mut args[0])
            });
        t.method("TryGetConverter")
            .as_static()
            .param("type", "System.Type")
            .param_out("converter", "System.Object")
            .returns("System.Boolean")
            .body(|ctx, args| {
                let value_type = args[0].as_type().map(|ty| ty.fullname.clone());
                lookup_converter(ctx, value_type.as_deref(), &mut args[1])
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
                        .and_then(|ty| converter_type(&ty.fullname))
                        .and_then(|name| ctx.host.type_named(name));
                    match found {
                        Some(ty) => {
                            args[1] = Value::Type(ty);
                            Ok(Value::Bool(true))
                        }
                        None => Ok(Value::Bool(false)),
                    }
                });
        }
    });
}

fn converter_type(value_type: &str) -> Option<&'static str> {
    match value_type {
        "System.Int32" => Some("Host.UIElements.IntConverter"),
        "System.Boolean" => Some("Host.UIElements.BoolConverter"),
        _ => None,
    }
}

fn lookup_converter(
    ctx: &CallContext<'_>,
    value_type: Option<&str>,
    slot: &mut Value,
) -> Result<Value, HostError> {
    match value_type.and_then(converter_type) {
        Some(name) => {
            *slot = Value::Object(ctx.host.allocate(name)?);
            Ok(Value::Bool(true))
        }
        None => Ok(Value::Bool(false)),
    }
}
