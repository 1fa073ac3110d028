//! Fluent construction of in-memory host modules.
//!
//! # Examples
//!
//! ```rust
//! use hostbridge::host::{memory::HostBuilder, Value};
//!
//! let host = HostBuilder::new()
//!     .module("Host.Core", |m| {
//!         m.class("Host.Core.Counter", |t| {
//!             t.field("value", "System.Int32").initial(Value::I32(0));
//!             t.method("Increment").body(|ctx, _| {
//!                 let host = ctx.host;
//!                 let obj = ctx.this()?;
//!                 let next = host.field(obj, "value").and_then(|v| v.as_i32()).unwrap_or(0) + 1;
//!                 host.set_field(obj, "value", Value::I32(next))?;
//!                 Ok(Value::I32(next))
//!             }).returns("System.Int32");
//!             t.constructor();
//!         });
//!     })
//!     .build();
//!
//! let counter = host.allocate("Host.Core.Counter")?;
//! assert_eq!(host.field(counter, "value"), Some(Value::I32(0)));
//! # Ok::<(), hostbridge::host::HostError>(())
//! ```

use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::host::{
    memory::{CallContext, InMemoryHost, MethodBody},
    signature::TypeSig,
    CorePrimitive, HostError, MemberKind, ParamDescriptor, ParamMode, Value, Visibility,
    CORE_LIBRARY,
};

/// Builds an [`InMemoryHost`]
pub struct HostBuilder {
    modules: Vec<ModuleBuilder>,
}

impl HostBuilder {
    /// A builder whose host already carries the core library (`System.Object`, `System.Int32`, ...)
    #[must_use]
    pub fn new() -> Self {
        HostBuilder {
            modules: vec![ModuleBuilder::core_library()],
        }
    }

    /// A builder for a host without any module
    #[must_use]
    pub fn without_core_library() -> Self {
        HostBuilder {
            modules: Vec::new(),
        }
    }

    /// Adds a module
    #[must_use]
    pub fn module(mut self, name: &str, define: impl FnOnce(&mut ModuleBuilder)) -> Self {
        let mut module = ModuleBuilder::new(name);
        define(&mut module);
        self.modules.push(module);
        self
    }

    /// Creates the host with every module loaded, in declaration order
    #[must_use]
    pub fn build(self) -> InMemoryHost {
        let host = InMemoryHost::empty();
        for module in self.modules {
            host.install(module);
        }
        host
    }
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The types of one module
pub struct ModuleBuilder {
    pub(crate) name: String,
    pub(crate) types: Vec<TypeBuilder>,
}

impl ModuleBuilder {
    pub(crate) fn new(name: &str) -> Self {
        ModuleBuilder {
            name: name.to_string(),
            types: Vec::new(),
        }
    }

    fn core_library() -> Self {
        let mut module = ModuleBuilder::new(CORE_LIBRARY);
        for primitive in CorePrimitive::iter() {
            let mut ty = TypeBuilder::new(primitive.fullname());
            ty.base = primitive.base().map(|base| base.fullname().to_string());
            ty.value_type = primitive.is_value_type();
            module.types.push(ty);
        }
        module
    }

    /// Declares a reference type deriving from `System.Object` unless [`TypeBuilder::extends`]
    /// says otherwise
    pub fn class(&mut self, fullname: &str, define: impl FnOnce(&mut TypeBuilder)) -> &mut Self {
        let mut ty = TypeBuilder::new(fullname);
        ty.base = Some(CorePrimitive::Object.fullname().to_string());
        define(&mut ty);
        self.types.push(ty);
        self
    }

    /// Declares a value type deriving from `System.ValueType`
    pub fn value_type(
        &mut self,
        fullname: &str,
        define: impl FnOnce(&mut TypeBuilder),
    ) -> &mut Self {
        let mut ty = TypeBuilder::new(fullname);
        ty.base = Some(CorePrimitive::ValueType.fullname().to_string());
        ty.value_type = true;
        define(&mut ty);
        self.types.push(ty);
        self
    }
}

/// One type and its members
pub struct TypeBuilder {
    pub(crate) fullname: String,
    pub(crate) base: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) value_type: bool,
    pub(crate) members: Vec<MemberBuilder>,
}

impl TypeBuilder {
    fn new(fullname: &str) -> Self {
        TypeBuilder {
            fullname: fullname.to_string(),
            base: None,
            interfaces: Vec::new(),
            value_type: false,
            members: Vec::new(),
        }
    }

    /// Sets the base type by full name
    pub fn extends(&mut self, base: &str) -> &mut Self {
        self.base = Some(base.to_string());
        self
    }

    /// Adds an implemented interface by full name
    pub fn implements(&mut self, interface: &str) -> &mut Self {
        self.interfaces.push(interface.to_string());
        self
    }

    /// Adds a public instance field
    pub fn field(&mut self, name: &str, ty: impl Into<TypeSig>) -> &mut MemberBuilder {
        self.push(MemberBuilder::new(name, MemberKind::Field).typed(ty.into()))
    }

    /// Adds a public instance property; without accessors it is backed by automatic storage
    pub fn property(&mut self, name: &str, ty: impl Into<TypeSig>) -> &mut MemberBuilder {
        self.push(MemberBuilder::new(name, MemberKind::Property).typed(ty.into()))
    }

    /// Adds a public instance method returning `System.Void`
    pub fn method(&mut self, name: &str) -> &mut MemberBuilder {
        self.push(
            MemberBuilder::new(name, MemberKind::Method)
                .typed(CorePrimitive::Void.fullname().into()),
        )
    }

    /// Adds a public constructor
    pub fn constructor(&mut self) -> &mut MemberBuilder {
        self.push(MemberBuilder::new(".ctor", MemberKind::Constructor))
    }

    fn push(&mut self, member: MemberBuilder) -> &mut MemberBuilder {
        let index = self.members.len();
        self.members.push(member);
        &mut self.members[index]
    }
}

/// One member of a type
pub struct MemberBuilder {
    pub(crate) name: String,
    pub(crate) kind: MemberKind,
    pub(crate) is_static: bool,
    pub(crate) visibility: Visibility,
    pub(crate) params: Vec<ParamDescriptor>,
    pub(crate) value_type: Option<TypeSig>,
    pub(crate) generic_params: u16,
    pub(crate) body: Option<MethodBody>,
    pub(crate) getter: Option<MethodBody>,
    pub(crate) setter: Option<MethodBody>,
    pub(crate) initial: Option<Value>,
}

impl MemberBuilder {
    fn new(name: &str, kind: MemberKind) -> Self {
        MemberBuilder {
            name: name.to_string(),
            kind,
            is_static: false,
            visibility: Visibility::PUBLIC,
            params: Vec::new(),
            value_type: None,
            generic_params: 0,
            body: None,
            getter: None,
            setter: None,
            initial: None,
        }
    }

    fn typed(mut self, ty: TypeSig) -> Self {
        self.value_type = Some(ty);
        self
    }

    fn wrap<F>(body: F) -> MethodBody
    where
        F: Fn(&CallContext<'_>, &mut [Value]) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        Arc::new(body)
    }

    /// Marks the member public (the default)
    pub fn public(&mut self) -> &mut Self {
        self.visibility = Visibility::PUBLIC;
        self
    }

    /// Marks the member private
    pub fn non_public(&mut self) -> &mut Self {
        self.visibility = Visibility::NON_PUBLIC;
        self
    }

    /// Marks the member static
    pub fn as_static(&mut self) -> &mut Self {
        self.is_static = true;
        self
    }

    /// Appends a by-value parameter
    pub fn param(&mut self, name: &str, ty: impl Into<TypeSig>) -> &mut Self {
        self.params.push(ParamDescriptor {
            name: name.to_string(),
            ty: ty.into(),
            mode: ParamMode::In,
        });
        self
    }

    /// Appends a `ref` parameter of the given referent type
    pub fn param_ref(&mut self, name: &str, ty: impl Into<TypeSig>) -> &mut Self {
        self.params.push(ParamDescriptor {
            name: name.to_string(),
            ty: TypeSig::by_ref(ty),
            mode: ParamMode::Ref,
        });
        self
    }

    /// Appends an `out` parameter of the given referent type
    pub fn param_out(&mut self, name: &str, ty: impl Into<TypeSig>) -> &mut Self {
        self.params.push(ParamDescriptor {
            name: name.to_string(),
            ty: TypeSig::by_ref(ty),
            mode: ParamMode::Out,
        });
        self
    }

    /// Sets the return type (methods) or value type (fields, properties)
    pub fn returns(&mut self, ty: impl Into<TypeSig>) -> &mut Self {
        self.value_type = Some(ty.into());
        self
    }

    /// Declares `arity` generic method parameters, referenced as `!!0`, `!!1`, ...
    pub fn generic(&mut self, arity: u16) -> &mut Self {
        self.generic_params = arity;
        self
    }

    /// Sets the code of a method or constructor
    pub fn body<F>(&mut self, body: F) -> &mut Self
    where
        F: Fn(&CallContext<'_>, &mut [Value]) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        self.body = Some(Self::wrap(body));
        self
    }

    /// Sets the getter of a property
    pub fn getter<F>(&mut self, getter: F) -> &mut Self
    where
        F: Fn(&CallContext<'_>) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        self.getter = Some(Self::wrap(move |ctx, _| getter(ctx)));
        self
    }

    /// Sets the setter of a property
    pub fn setter<F>(&mut self, setter: F) -> &mut Self
    where
        F: Fn(&CallContext<'_>, Value) -> Result<(), HostError> + Send + Sync + 'static,
    {
        self.setter = Some(Self::wrap(move |ctx, args| {
            let value = args.first().cloned().unwrap_or(Value::Null);
            setter(ctx, value).map(|()| Value::Void)
        }));
        self
    }

    /// Sets the initial value of a field or auto-property
    pub fn initial(&mut self, value: Value) -> &mut Self {
        self.initial = Some(value);
        self
    }
}
