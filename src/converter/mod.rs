//! Access to the host's attribute converter registry.
//!
//! The host keeps one string converter per value type in `Host.UIElements.AttributeConverters`.
//! The bridge never builds converters itself: it asks the registry, wraps whatever object comes
//! back and calls `FromString`/`ToString` on its runtime type.
//!
//! A missing converter is a normal outcome. Every lookup returns `Option`, and
//! [`ConverterRegistry::convert_or_default`] is the usual fallback.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use hostbridge::prelude::*;
//!
//! let host = HostBuilder::new()
//!     .module("Host.UIElements", |m| {
//!         m.class("Host.UIElements.AttributeConverters", |t| {
//!             t.method("TryGetConverter")
//!                 .as_static()
//!                 .generic(1)
//!                 .param_out("converter", "System.Object")
//!                 .returns("System.Boolean")
//!                 .body(|_, _| Ok(Value::Bool(false)));
//!             t.method("TryGetConverter")
//!                 .as_static()
//!                 .param("type", "System.Type")
//!                 .param_out("converter", "System.Object")
//!                 .returns("System.Boolean")
//!                 .body(|_, _| Ok(Value::Bool(false)));
//!         });
//!     })
//!     .build();
//! let ctx = Arc::new(BridgeContext::new(Arc::new(host), BridgeConfig::default()));
//!
//! let registry = ConverterRegistry::new(&ctx)?;
//! assert!(registry.try_get_converter::<i32>()?.is_none());
//!
//! let int = ctx.resolve_type("System.Private.CoreLib", "System.Int32")?;
//! assert_eq!(registry.convert_or_default(&int, "12", Value::I32(0))?, Value::I32(0));
//! # Ok::<(), hostbridge::Error>(())
//! ```

use std::{fmt, sync::Arc};

use crate::{
    bridge::{BridgeContext, CacheSlot, Capability, MemberHandle, MemberQuery, TypeHandle},
    host::{signature::TypeSig, HostRef, MemberKind, Value, Visibility, CORE_LIBRARY},
    proxy::{expect, out_value, HostFeature, HostProxy},
    Error, Result,
};

const ASSEMBLY: &str = "Host.UIElements";
const TYPE_NAME: &str = "Host.UIElements.AttributeConverters";

const BY_GENERIC: &str = "converter.try_get_generic";
const BY_TYPE: &str = "converter.try_get";
const CONVERTER_TYPE: &str = "converter.try_get_type";

/// A Rust type with a known host counterpart
pub trait HostTyped {
    /// Module declaring the host type
    const ASSEMBLY: &'static str = CORE_LIBRARY;
    /// Fully qualified name of the host type
    const FULLNAME: &'static str;
}

impl HostTyped for bool {
    const FULLNAME: &'static str = "System.Boolean";
}

impl HostTyped for i32 {
    const FULLNAME: &'static str = "System.Int32";
}

impl HostTyped for i64 {
    const FULLNAME: &'static str = "System.Int64";
}

impl HostTyped for f32 {
    const FULLNAME: &'static str = "System.Single";
}

impl HostTyped for f64 {
    const FULLNAME: &'static str = "System.Double";
}

impl HostTyped for String {
    const FULLNAME: &'static str = "System.String";
}

/// The static surface of `Host.UIElements.AttributeConverters`
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    proxy: HostProxy,
}

impl HostFeature for ConverterRegistry {
    const NAME: &'static str = "attribute converters";

    fn capabilities() -> Vec<Capability> {
        let method = |name: &str| MemberQuery::method(ASSEMBLY, TYPE_NAME, name).as_static();
        vec![
            Capability::required(
                BY_GENERIC,
                method("TryGetConverter").signature(signature![TypeSig::by_ref("System.Object")]),
            ),
            Capability::required(
                BY_TYPE,
                method("TryGetConverter").signature(signature![
                    "System.Type",
                    TypeSig::by_ref("System.Object")
                ]),
            ),
            Capability::optional(
                CONVERTER_TYPE,
                method("TryGetConverterType").signature(signature![
                    "System.Type",
                    TypeSig::by_ref("System.Type")
                ]),
            ),
        ]
    }
}

impl ConverterRegistry {
    /// Installs the feature and binds the registry.
    ///
    /// # Errors
    ///
    /// Returns the resolution error of the registry type, or of a required lookup under eager
    /// validation.
    pub fn new(ctx: &Arc<BridgeContext>) -> Result<Self> {
        ctx.install::<ConverterRegistry>()?;
        let owner = ctx.resolve_type(ASSEMBLY, TYPE_NAME)?;
        Ok(ConverterRegistry {
            proxy: HostProxy::static_only(ctx, &owner),
        })
    }

    /// The converter for `T`, through the generic lookup.
    ///
    /// # Errors
    ///
    /// Returns the resolution or invocation error; an absent converter is `Ok(None)`.
    pub fn try_get_converter<T: HostTyped>(&self) -> Result<Option<Converter>> {
        let ty = self.proxy.context().resolve_type(T::ASSEMBLY, T::FULLNAME)?;
        self.try_get_converter_for(&ty)
    }

    /// The converter for `ty`, through the generic lookup closed over `ty`.
    ///
    /// # Errors
    ///
    /// Returns the resolution or invocation error; an absent converter is `Ok(None)`.
    pub fn try_get_converter_for(&self, ty: &TypeHandle) -> Result<Option<Converter>> {
        let ctx = self.proxy.context();
        let open = ctx.capability(BY_GENERIC)?;
        let closed = ctx.close_generic(&open, std::slice::from_ref(ty))?;
        let result = self.proxy.call(&closed, &[])?;
        self.adopt(&closed, out_value(&closed, result)?)
    }

    /// The converter for `ty`, through the lookup taking a `System.Type`.
    ///
    /// # Errors
    ///
    /// Returns the resolution or invocation error; an absent converter is `Ok(None)`.
    pub fn try_get_converter_by_type(&self, ty: &TypeHandle) -> Result<Option<Converter>> {
        let member = self.proxy.context().capability(BY_TYPE)?;
        let result = self
            .proxy
            .call(&member, &[Value::Type(ty.descriptor().clone())])?;
        self.adopt(&member, out_value(&member, result)?)
    }

    /// The type of the converter registered for `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] on hosts without `TryGetConverterType`.
    pub fn try_get_converter_type(&self, ty: &TypeHandle) -> Result<Option<TypeHandle>> {
        let ctx = self.proxy.context();
        let member = ctx.capability(CONVERTER_TYPE)?;
        let result = self
            .proxy
            .call(&member, &[Value::Type(ty.descriptor().clone())])?;
        match out_value(&member, result)? {
            Some(value) => {
                let descriptor = expect(&member, value, |v| v.as_type().cloned(), "System.Type")?;
                ctx.adopt_type(descriptor).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Converts `text` with the converter of `ty`, or returns `default` when there is none.
    ///
    /// # Errors
    ///
    /// Returns the lookup error, or the converter's own error for text it rejects.
    pub fn convert_or_default(&self, ty: &TypeHandle, text: &str, default: Value) -> Result<Value> {
        match self.try_get_converter_by_type(ty)? {
            Some(converter) => converter.from_string(text),
            None => Ok(default),
        }
    }

    fn adopt(&self, member: &MemberHandle, found: Option<Value>) -> Result<Option<Converter>> {
        let Some(value) = found else {
            return Ok(None);
        };
        let obj = expect(member, value, Value::as_object, "a converter object")?;
        Converter::wrap(self.proxy.context(), obj).map(Some)
    }
}

/// A converter object handed out by the registry
pub struct Converter {
    proxy: HostProxy,
    from_string: CacheSlot<MemberHandle>,
    to_string: CacheSlot<MemberHandle>,
}

impl Converter {
    fn wrap(ctx: &Arc<BridgeContext>, obj: HostRef) -> Result<Self> {
        let ty = ctx.type_of(obj)?.ok_or_else(|| Error::TypeMismatch {
            member: TYPE_NAME.to_string(),
            expected: "a converter object".to_string(),
            found: format!("released object {obj}"),
        })?;
        Ok(Converter {
            proxy: HostProxy::wrap(ctx, &ty, obj)?,
            from_string: CacheSlot::new(),
            to_string: CacheSlot::new(),
        })
    }

    /// The converter's runtime type
    #[must_use]
    pub fn converter_type(&self) -> &TypeHandle {
        self.proxy.owner()
    }

    fn method<'a>(
        &self,
        slot: &'a CacheSlot<MemberHandle>,
        name: &str,
        param: &str,
    ) -> Result<&'a MemberHandle> {
        slot.get_or_try_init(|| {
            self.proxy.context().resolve_member(
                self.proxy.owner(),
                name,
                MemberKind::Method,
                Visibility::PUBLIC,
                false,
                Some(&signature![param]),
            )
        })
    }

    /// Parses `text` into a host value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invocation`] if the converter rejects the text.
    pub fn from_string(&self, text: &str) -> Result<Value> {
        let member = self.method(&self.from_string, "FromString", "System.String")?;
        Ok(self.proxy.call(member, &[Value::from(text)])?.value)
    }

    /// Formats a host value as text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invocation`] if the converter rejects the value.
    pub fn to_string(&self, value: &Value) -> Result<String> {
        let member = self.method(&self.to_string, "ToString", "System.Object")?;
        let text = self.proxy.call(member, std::slice::from_ref(value))?.value;
        expect(member, text, |v| v.as_str().map(str::to_string), "System.String")
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("type", self.proxy.owner())
            .field("target", &self.proxy.target())
            .field("from_string", &self.from_string)
            .field("to_string", &self.to_string)
            .finish()
    }
}
