//! End-to-end scenarios over the typed features.
//!
//! These tests drive sprite drawing, property driving, list controls and attribute converters
//! against both the current and the legacy engine host, in both execution modes.

mod common;

use common::{connect, draw_count, driven, engine, legacy_engine};
use hostbridge::{prelude::*, Result};

fn object(host: &InMemoryHost, type_name: &str, label: &str) -> Result<HostRef> {
    host.allocate_with_label(type_name, label)
        .map_err(|e| Error::Error(e.to_string()))
}

/// Drawing through the public and the non-public overload.
#[test]
fn test_sprite_drawing() -> Result<()> {
    let host = engine();
    let ctx = connect(&host, BridgeConfig::runtime());
    let drawer = SpriteDrawer::new(&ctx)?;

    let sprite = object(&host, "Host.Core.Sprite", "hero")?;
    let texture = object(&host, "Host.Core.Texture", "atlas")?;
    let rect = Rect::new(0.0, 0.0, 32.0, 32.0);

    drawer.draw_sprite(sprite, rect, Color::WHITE)?;
    assert!(drawer.supports_texture());
    drawer.draw_texture(texture, rect, Color::new(1.0, 0.0, 0.0, 1.0))?;
    assert_eq!(draw_count(&host), 2);

    assert!(matches!(
        drawer.draw_sprite(texture, rect, Color::WHITE),
        Err(Error::TypeMismatch { .. })
    ));
    assert_eq!(draw_count(&host), 2);
    Ok(())
}

/// An older host lacks texture drawing; the feature still installs and reports it.
#[test]
fn test_legacy_host_degrades_gracefully() -> Result<()> {
    let host = legacy_engine();
    let ctx = connect(&host, BridgeConfig::runtime());

    let drawer = SpriteDrawer::new(&ctx)?;
    let driver = PropertyDriver::new(&ctx)?;
    let converters = ConverterRegistry::new(&ctx)?;

    assert!(!drawer.supports_texture());
    assert!(!driver.supports_try_register());

    let texture = object(&host, "Host.Core.Texture", "atlas")?;
    let err = drawer
        .draw_texture(texture, Rect::default(), Color::WHITE)
        .unwrap_err();
    assert!(err.is_absence());

    let long = ctx.resolve_type(CORE_LIBRARY, "System.Int64")?;
    assert!(converters.try_get_converter_type(&long).is_err());
    assert!(converters.try_get_converter::<i64>()?.is_some());

    let report = ctx.validate()?;
    let unavailable: Vec<_> = report.unavailable.iter().map(|(id, _)| *id).collect();
    assert_eq!(
        unavailable,
        vec!["converter.try_get_type", "driver.try_register", "sprite.draw_texture"]
    );
    assert!(!report.is_complete());
    Ok(())
}

/// Installing a feature against a host without its module fails eagerly, or on first use.
#[test]
fn test_validation_modes() {
    let host = std::sync::Arc::new(HostBuilder::new().build());

    let eager = connect(&host, BridgeConfig::runtime());
    assert!(matches!(
        SpriteDrawer::new(&eager),
        Err(Error::AssemblyNotFound(_))
    ));

    let lazy = connect(&host, BridgeConfig::lazy());
    lazy.install::<SpriteDrawer>()
        .expect("lazy install resolves nothing");
    assert!(matches!(lazy.validate(), Err(Error::AssemblyNotFound(_))));
    assert!(matches!(
        lazy.capability("sprite.unknown"),
        Err(Error::UnknownCapability(_))
    ));
}

/// Driven properties apply immediately at runtime.
#[test]
fn test_property_driving_immediate() -> Result<()> {
    let host = engine();
    let ctx = connect(&host, BridgeConfig::runtime());
    let driver = PropertyDriver::new(&ctx)?;

    let animator = object(&host, "Host.Core.Animator", "animator")?;
    let panel = object(&host, "Host.Core.Component", "panel")?;

    assert_eq!(
        driver.register(animator, panel, "m_Alpha")?,
        Applied::Now(Value::Void)
    );
    driver.register(animator, panel, "m_Scale")?;
    assert_eq!(
        driven(&host),
        vec!["animator:panel:m_Alpha", "animator:panel:m_Scale"]
    );

    assert_eq!(
        driver.try_register(animator, panel, "m_Alpha")?.value(),
        Some(&Value::Bool(false))
    );
    driver.unregister(animator, panel, "m_Alpha")?;
    assert_eq!(driven(&host), vec!["animator:panel:m_Scale"]);

    driver.unregister_all(animator)?;
    assert!(driven(&host).is_empty());
    Ok(())
}

/// In the editor, mutations wait for the next tick and run in order.
#[test]
fn test_property_driving_deferred() -> Result<()> {
    let host = engine();
    let ctx = connect(&host, BridgeConfig::editor());
    let driver = PropertyDriver::new(&ctx)?;

    let animator = object(&host, "Host.Core.Animator", "animator")?;
    let panel = object(&host, "Host.Core.Component", "panel")?;

    assert_eq!(driver.register(animator, panel, "m_Alpha")?, Applied::Queued);
    assert_eq!(driver.try_register(animator, panel, "m_Alpha")?, Applied::Queued);
    assert_eq!(ctx.pending(), 2);
    assert!(driven(&host).is_empty());

    let outcomes = ctx.tick()?;
    assert_eq!(ctx.pending(), 0);
    let labels: Vec<_> = outcomes.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["register m_Alpha", "try register m_Alpha"]);
    assert_eq!(outcomes[0].result, Ok(Value::Void));
    assert_eq!(outcomes[1].result, Ok(Value::Bool(false)));
    assert_eq!(driven(&host), vec!["animator:panel:m_Alpha"]);

    assert!(ctx.tick()?.is_empty());
    Ok(())
}

/// A failing deferred operation is reported without stopping the rest of the tick.
#[test]
fn test_tick_reports_each_outcome() -> Result<()> {
    let host = engine();
    let ctx = connect(&host, BridgeConfig::editor());
    let driver = PropertyDriver::new(&ctx)?;

    let animator = object(&host, "Host.Core.Animator", "animator")?;
    let panel = object(&host, "Host.Core.Component", "panel")?;

    driver.register(animator, panel, "m_Alpha")?;
    assert!(host.release(panel));
    driver.register(animator, animator, "m_Speed")?;

    let outcomes = ctx.tick()?;
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].result.is_err());
    assert_eq!(outcomes[1].result, Ok(Value::Void));
    assert_eq!(driven(&host), vec!["animator:animator:m_Speed"]);
    Ok(())
}

/// The list control: construction, state, by-reference lookup and generic element access.
#[test]
fn test_reorderable_list() -> Result<()> {
    let host = engine();
    let ctx = connect(&host, BridgeConfig::runtime());

    let sprite = object(&host, "Host.Core.Sprite", "hero")?;
    let list = ListWrapper::create(&ctx, vec![Value::Object(sprite), Value::I64(7)], true)?;
    assert_eq!(list.count()?, 2);
    assert!(list.draggable()?);

    list.select(1)?;
    assert_eq!(list.index()?, 1);
    assert!(matches!(list.select(9), Err(Error::Invocation { .. })));

    assert_eq!(list.try_get_element(0)?, Some(Value::Object(sprite)));
    assert_eq!(list.try_get_element(5)?, None);

    let sprite_type = ctx.resolve_type("Host.Core", "Host.Core.Sprite")?;
    let long = ctx.resolve_type(CORE_LIBRARY, "System.Int64")?;
    assert_eq!(list.element_as(0, &sprite_type)?, Value::Object(sprite));
    assert_eq!(list.element_as(1, &long)?, Value::I64(7));
    assert_eq!(ctx.stats().generics.entries, 2);

    let same = ListWrapper::wrap(&ctx, list.proxy().target().expect("instance proxy"))?;
    assert_eq!(same, list);
    Ok(())
}

/// Converters round trip values of their domain, and missing ones fall back to a default.
#[test]
fn test_converter_round_trip_and_fallback() -> Result<()> {
    let host = engine();
    let ctx = connect(&host, BridgeConfig::runtime());
    let converters = ConverterRegistry::new(&ctx)?;

    let converter = converters
        .try_get_converter::<i64>()?
        .expect("Int64 has a converter");
    for text in ["0", "-17", "9000000000"] {
        let value = converter.from_string(text)?;
        assert_eq!(converter.to_string(&value)?, text);
    }
    assert!(matches!(
        converter.from_string("seven"),
        Err(Error::Invocation { .. })
    ));

    assert!(converters.try_get_converter::<bool>()?.is_none());
    let boolean = ctx.resolve_type(CORE_LIBRARY, "System.Boolean")?;
    assert_eq!(
        converters.convert_or_default(&boolean, "true", Value::Bool(false))?,
        Value::Bool(false)
    );

    let long = ctx.resolve_type(CORE_LIBRARY, "System.Int64")?;
    assert_eq!(
        converters.convert_or_default(&long, "12", Value::I64(0))?,
        Value::I64(12)
    );
    let converter_type = converters
        .try_get_converter_type(&long)?
        .expect("Int64 has a converter type");
    assert_eq!(converter_type.fullname(), "Host.UIElements.LongConverter");
    assert!(converter_type.ptr_eq(converter.converter_type()));
    Ok(())
}
