//! A complete host runtime that lives entirely in memory.
//!
//! [`InMemoryHost`] implements [`Host`] over types and members declared through
//! [`HostBuilder`]. Method bodies are Rust closures, objects live on a small heap, and every
//! operation of the adapter boundary is counted, which makes it the reference adapter for tests
//! and for embedding the bridge without a native runtime.
//!
//! # Architecture
//!
//! - Modules, types and member definitions are append-only. Modules can be loaded after
//!   construction through [`InMemoryHost::load_module`], which is how a host that loads
//!   assemblies late is modelled.
//! - Closed generic methods are created on demand by [`Host::close_generic_method`] and get a
//!   fresh member id on every call; the host itself does not cache them.
//! - Fields and auto-properties without accessors are backed by per-object storage (instance)
//!   or per-type storage (static).
//!
//! # Examples
//!
//! ```rust
//! use hostbridge::host::{memory::HostBuilder, Host, Value};
//!
//! let host = HostBuilder::new()
//!     .module("Host.Core", |m| {
//!         m.class("Host.Core.Thing", |t| {
//!             t.property("Name", "System.String").initial(Value::from("thing"));
//!             t.constructor();
//!         });
//!     })
//!     .build();
//!
//! let thing = host.allocate_with_label("Host.Core.Thing", "first")?;
//! assert_eq!(host.display(thing), "first");
//! assert_eq!(host.field(thing, "Name"), Some(Value::from("thing")));
//! assert_eq!(host.stats().invocations, 0);
//! # Ok::<(), hostbridge::host::HostError>(())
//! ```

mod builder;
mod heap;

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
};

use dashmap::DashMap;

pub use builder::{HostBuilder, MemberBuilder, ModuleBuilder, TypeBuilder};

use crate::host::{
    signature::TypeSig, CorePrimitive, Host, HostError, HostMemberId, HostModuleId, HostRef,
    HostTypeId, MemberDescriptor, MemberFilter, MemberKind, ModuleDescriptor, ParamDescriptor,
    TypeDescriptor, Value,
};
use heap::ObjectHeap;

/// The code of a method, constructor or property accessor.
///
/// Receives the call context and one slot per declared parameter. Writes to by-reference slots
/// are visible to the caller after the call.
pub type MethodBody =
    Arc<dyn Fn(&CallContext<'_>, &mut [Value]) -> Result<Value, HostError> + Send + Sync>;

/// Closed generic method ids start here, above every definition id
const CLOSED_MEMBER_BASE: u64 = 1 << 40;

/// What a running method body can see
pub struct CallContext<'a> {
    /// The host executing the call
    pub host: &'a InMemoryHost,
    /// The instance, `None` for static members
    pub target: Option<HostRef>,
    /// The member being executed
    pub member: &'a MemberDescriptor,
    /// Type arguments of a closed generic method, empty otherwise
    pub type_args: &'a [TypeDescriptor],
}

impl CallContext<'_> {
    /// The instance the member runs on.
    ///
    /// # Errors
    ///
    /// Returns a `System.NullReferenceException` for static calls.
    pub fn this(&self) -> Result<HostRef, HostError> {
        self.target.ok_or_else(|| {
            HostError::null_reference(format!("'{}' requires an instance", self.member.name))
        })
    }
}

/// Snapshot of the adapter call counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostStats {
    /// Calls to [`Host::loaded_modules`]
    pub module_scans: usize,
    /// Calls to [`Host::find_type`]
    pub type_lookups: usize,
    /// Calls to [`Host::enumerate_members`]
    pub member_enumerations: usize,
    /// Calls to [`Host::close_generic_method`]
    pub generic_closings: usize,
    /// Calls to [`Host::invoke_member`]
    pub invocations: usize,
}

#[derive(Default)]
struct Counters {
    module_scans: AtomicUsize,
    type_lookups: AtomicUsize,
    member_enumerations: AtomicUsize,
    generic_closings: AtomicUsize,
    invocations: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> HostStats {
        HostStats {
            module_scans: self.module_scans.load(Ordering::Relaxed),
            type_lookups: self.type_lookups.load(Ordering::Relaxed),
            member_enumerations: self.member_enumerations.load(Ordering::Relaxed),
            generic_closings: self.generic_closings.load(Ordering::Relaxed),
            invocations: self.invocations.load(Ordering::Relaxed),
        }
    }
}

struct TypeDef {
    descriptor: TypeDescriptor,
    base: Option<String>,
    interfaces: Vec<String>,
    value_type: bool,
}

struct MemberDef {
    descriptor: MemberDescriptor,
    body: Option<MethodBody>,
    getter: Option<MethodBody>,
    setter: Option<MethodBody>,
    initial: Option<Value>,
}

struct ClosedMember {
    descriptor: MemberDescriptor,
    open: HostMemberId,
}

/// A host runtime held entirely in memory
pub struct InMemoryHost {
    modules: boxcar::Vec<ModuleDescriptor>,
    types: boxcar::Vec<TypeDef>,
    members: boxcar::Vec<MemberDef>,
    closed: DashMap<HostMemberId, ClosedMember>,
    next_closed: AtomicU64,
    statics: DashMap<(HostTypeId, String), Value>,
    heap: ObjectHeap,
    loading: Mutex<()>,
    counters: Counters,
}

impl InMemoryHost {
    pub(crate) fn empty() -> Self {
        InMemoryHost {
            modules: boxcar::Vec::new(),
            types: boxcar::Vec::new(),
            members: boxcar::Vec::new(),
            closed: DashMap::new(),
            next_closed: AtomicU64::new(CLOSED_MEMBER_BASE),
            statics: DashMap::new(),
            heap: ObjectHeap::new(),
            loading: Mutex::new(()),
            counters: Counters::default(),
        }
    }

    /// Loads an additional module into a running host
    pub fn load_module(&self, name: &str, define: impl FnOnce(&mut ModuleBuilder)) {
        let mut module = ModuleBuilder::new(name);
        define(&mut module);
        self.install(module);
    }

    pub(crate) fn install(&self, module: ModuleBuilder) {
        // Ids are definition indices, so a load must not interleave with another one
        let _guard = self.loading.lock().unwrap_or_else(PoisonError::into_inner);

        let module_id = HostModuleId(self.modules.count() as u64);
        self.modules.push(ModuleDescriptor {
            id: module_id,
            name: module.name,
        });

        for ty in module.types {
            let type_id = HostTypeId(self.types.count() as u64);
            self.types.push(TypeDef {
                descriptor: TypeDescriptor {
                    id: type_id,
                    module: module_id,
                    fullname: ty.fullname,
                },
                base: ty.base,
                interfaces: ty.interfaces,
                value_type: ty.value_type,
            });

            for member in ty.members {
                let descriptor = MemberDescriptor {
                    id: HostMemberId(self.members.count() as u64),
                    declaring_type: type_id,
                    name: member.name,
                    kind: member.kind,
                    is_static: member.is_static,
                    visibility: member.visibility,
                    params: member.params,
                    value_type: member.value_type,
                    generic_params: member.generic_params,
                    type_args: Vec::new(),
                };
                if descriptor.is_static && !descriptor.kind.is_callable() {
                    let value = member
                        .initial
                        .clone()
                        .unwrap_or_else(|| default_value(descriptor.value_type.as_ref()));
                    self.statics
                        .insert((type_id, descriptor.name.clone()), value);
                }
                self.members.push(MemberDef {
                    descriptor,
                    body: member.body,
                    getter: member.getter,
                    setter: member.setter,
                    initial: member.initial,
                });
            }
        }
    }

    /// Returns a snapshot of the adapter call counters
    #[must_use]
    pub fn stats(&self) -> HostStats {
        self.counters.snapshot()
    }

    /// Finds a type by full name in any loaded module, without counting a lookup
    #[must_use]
    pub fn type_named(&self, fullname: &str) -> Option<TypeDescriptor> {
        self.type_def_named(fullname).map(|def| def.descriptor.clone())
    }

    fn type_def_named(&self, fullname: &str) -> Option<&TypeDef> {
        self.types
            .iter()
            .map(|(_, def)| def)
            .find(|def| def.descriptor.fullname == fullname)
    }

    fn type_def(&self, id: HostTypeId) -> Option<&TypeDef> {
        usize::try_from(id.0).ok().and_then(|i| self.types.get(i))
    }

    fn member_def(&self, id: HostMemberId) -> Option<&MemberDef> {
        usize::try_from(id.0).ok().and_then(|i| self.members.get(i))
    }

    /// Allocates an object without running a constructor; fields start at their initial values.
    ///
    /// # Errors
    ///
    /// Returns a `System.TypeLoadException` if no loaded module declares the type.
    pub fn allocate(&self, type_name: &str) -> Result<HostRef, HostError> {
        self.allocate_object(type_name, None)
    }

    /// Allocates an object whose host display text is `label`.
    ///
    /// # Errors
    ///
    /// Returns a `System.TypeLoadException` if no loaded module declares the type.
    pub fn allocate_with_label(&self, type_name: &str, label: &str) -> Result<HostRef, HostError> {
        self.allocate_object(type_name, Some(label.to_string()))
    }

    fn allocate_object(&self, type_name: &str, label: Option<String>) -> Result<HostRef, HostError> {
        let def = self.type_def_named(type_name).ok_or_else(|| {
            HostError::new(
                "System.TypeLoadException",
                format!("Could not load type '{type_name}'"),
            )
        })?;
        Ok(self.allocate_instance(def, label))
    }

    fn allocate_instance(&self, def: &TypeDef, label: Option<String>) -> HostRef {
        let fields = self.instance_storage(def);
        self.heap.allocate(def.descriptor.id, label, fields)
    }

    /// Initial storage of every instance field and auto-property along the base chain
    fn instance_storage(&self, def: &TypeDef) -> Vec<(String, Value)> {
        let mut fields = Vec::new();
        let mut current = Some(def);
        let mut depth = 0;
        while let Some(ty) = current {
            for (_, member) in self.members.iter() {
                let descriptor = &member.descriptor;
                if descriptor.declaring_type != ty.descriptor.id
                    || descriptor.is_static
                    || descriptor.kind.is_callable()
                    || fields.iter().any(|(name, _)| *name == descriptor.name)
                {
                    continue;
                }
                let value = member
                    .initial
                    .clone()
                    .unwrap_or_else(|| default_value(descriptor.value_type.as_ref()));
                fields.push((descriptor.name.clone(), value));
            }

            depth += 1;
            if depth > self.types.count() {
                break;
            }
            current = ty.base.as_deref().and_then(|base| self.type_def_named(base));
        }
        fields
    }

    /// Removes an object from the heap; returns `false` if it was already gone
    pub fn release(&self, obj: HostRef) -> bool {
        self.heap.release(obj)
    }

    /// Returns `true` while the object exists
    #[must_use]
    pub fn is_alive(&self, obj: HostRef) -> bool {
        self.heap.is_alive(obj)
    }

    /// Number of live objects
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.heap.len()
    }

    /// Reads the stored value of an instance field or auto-property
    #[must_use]
    pub fn field(&self, obj: HostRef, name: &str) -> Option<Value> {
        self.heap.field(obj, name)
    }

    /// Writes the stored value of an instance field or auto-property.
    ///
    /// # Errors
    ///
    /// Returns a `System.NullReferenceException` if the object no longer exists.
    pub fn set_field(&self, obj: HostRef, name: &str, value: Value) -> Result<(), HostError> {
        if self.heap.set_field(obj, name, value) {
            Ok(())
        } else {
            Err(dead_object(obj))
        }
    }

    /// Reads the stored value of a static field or auto-property
    #[must_use]
    pub fn static_value(&self, type_name: &str, name: &str) -> Option<Value> {
        let ty = self.type_def_named(type_name)?;
        let value = self
            .statics
            .get(&(ty.descriptor.id, name.to_string()))
            .map(|v| v.value().clone());
        value
    }

    /// Writes the stored value of a static field or auto-property.
    ///
    /// # Errors
    ///
    /// Returns a `System.TypeLoadException` if no loaded module declares the type.
    pub fn set_static_value(&self, type_name: &str, name: &str, value: Value) -> Result<(), HostError> {
        let ty = self.type_def_named(type_name).ok_or_else(|| {
            HostError::new(
                "System.TypeLoadException",
                format!("Could not load type '{type_name}'"),
            )
        })?;
        self.statics.insert((ty.descriptor.id, name.to_string()), value);
        Ok(())
    }

    fn read_storage(&self, member: &MemberDescriptor, target: Option<HostRef>) -> Result<Value, HostError> {
        match target {
            None => Ok(self
                .statics
                .get(&(member.declaring_type, member.name.clone()))
                .map_or(Value::Null, |v| v.value().clone())),
            Some(obj) => {
                if !self.heap.is_alive(obj) {
                    return Err(dead_object(obj));
                }
                Ok(self
                    .heap
                    .field(obj, &member.name)
                    .unwrap_or_else(|| default_value(member.value_type.as_ref())))
            }
        }
    }

    fn write_storage(
        &self,
        member: &MemberDescriptor,
        target: Option<HostRef>,
        value: Value,
    ) -> Result<Value, HostError> {
        match target {
            None => {
                self.statics
                    .insert((member.declaring_type, member.name.clone()), value);
            }
            Some(obj) => self.set_field(obj, &member.name, value)?,
        }
        Ok(Value::Void)
    }

    fn type_args_of(&self, member: &MemberDescriptor) -> Vec<TypeDescriptor> {
        member
            .type_args
            .iter()
            .filter_map(|id| self.type_def(*id).map(|def| def.descriptor.clone()))
            .collect()
    }

    /// Resolves a member id to its definition and, for closed generics, the closed descriptor
    fn lookup(&self, id: HostMemberId) -> Option<(&MemberDef, Option<MemberDescriptor>)> {
        if id.0 >= CLOSED_MEMBER_BASE {
            let (open, descriptor) = {
                let closed = self.closed.get(&id)?;
                (closed.open, closed.descriptor.clone())
            };
            return self.member_def(open).map(|def| (def, Some(descriptor)));
        }
        self.member_def(id).map(|def| (def, None))
    }

    fn run(
        &self,
        body: &MethodBody,
        member: &MemberDescriptor,
        target: Option<HostRef>,
        args: &mut [Value],
    ) -> Result<Value, HostError> {
        let type_args = self.type_args_of(member);
        let ctx = CallContext {
            host: self,
            target,
            member,
            type_args: &type_args,
        };
        body(&ctx, args)
    }
}

/// The zero value of a primitive value type, `null` for everything else
fn default_value(ty: Option<&TypeSig>) -> Value {
    match ty.and_then(TypeSig::name).and_then(CorePrimitive::from_fullname) {
        Some(CorePrimitive::Boolean) => Value::Bool(false),
        Some(CorePrimitive::Int32) => Value::I32(0),
        Some(CorePrimitive::Int64) => Value::I64(0),
        Some(CorePrimitive::Single) => Value::F32(0.0),
        Some(CorePrimitive::Double) => Value::F64(0.0),
        _ => Value::Null,
    }
}

fn dead_object(obj: HostRef) -> HostError {
    HostError::null_reference(format!("Object {obj} no longer exists"))
}

impl Host for InMemoryHost {
    fn loaded_modules(&self) -> Vec<ModuleDescriptor> {
        Counters::bump(&self.counters.module_scans);
        self.modules.iter().map(|(_, m)| m.clone()).collect()
    }

    fn find_type(&self, module: &ModuleDescriptor, qualified_name: &str) -> Option<TypeDescriptor> {
        Counters::bump(&self.counters.type_lookups);
        self.types
            .iter()
            .map(|(_, def)| &def.descriptor)
            .find(|ty| ty.module == module.id && ty.fullname == qualified_name)
            .cloned()
    }

    fn enumerate_members(
        &self,
        ty: &TypeDescriptor,
        filter: &MemberFilter<'_>,
    ) -> Vec<MemberDescriptor> {
        Counters::bump(&self.counters.member_enumerations);
        self.members
            .iter()
            .map(|(_, def)| &def.descriptor)
            .filter(|member| member.declaring_type == ty.id && filter.admits(member))
            .cloned()
            .collect()
    }

    fn invoke_member(
        &self,
        member: &MemberDescriptor,
        target: Option<HostRef>,
        args: &mut [Value],
    ) -> Result<Value, HostError> {
        Counters::bump(&self.counters.invocations);

        let (def, closed) = self
            .lookup(member.id)
            .ok_or_else(|| HostError::missing_member(format!("Unknown member '{}'", member.name)))?;
        let descriptor = closed.as_ref().unwrap_or(&def.descriptor);

        if descriptor.generic_params > 0 {
            return Err(HostError::new(
                "System.InvalidOperationException",
                format!(
                    "Late bound operations cannot be performed on '{}' because it contains generic parameters",
                    descriptor.name
                ),
            ));
        }

        if descriptor.kind == MemberKind::Constructor {
            let ty = self.type_def(descriptor.declaring_type).ok_or_else(|| {
                HostError::missing_member(format!("Unknown type of '{}'", descriptor.name))
            })?;
            let obj = self.allocate_instance(ty, None);
            if let Some(body) = &def.body {
                self.run(body, descriptor, Some(obj), args)?;
            }
            return Ok(Value::Object(obj));
        }

        let target = if descriptor.is_static {
            None
        } else {
            match target {
                Some(obj) if self.heap.is_alive(obj) => Some(obj),
                Some(obj) => return Err(dead_object(obj)),
                None => {
                    return Err(HostError::null_reference(format!(
                        "Non-static member '{}' requires a target",
                        descriptor.name
                    )))
                }
            }
        };

        match descriptor.kind {
            MemberKind::Method => match &def.body {
                Some(body) => self.run(body, descriptor, target, args),
                None => Ok(Value::Void),
            },
            MemberKind::Field | MemberKind::Property => {
                let accessor = if args.is_empty() { &def.getter } else { &def.setter };
                match (accessor, args.len()) {
                    (Some(body), _) => self.run(body, descriptor, target, args),
                    (None, 0) if descriptor.kind == MemberKind::Property && def.setter.is_some() => {
                        Err(HostError::argument(format!(
                            "Property '{}' has no getter",
                            descriptor.name
                        )))
                    }
                    (None, 0) => self.read_storage(descriptor, target),
                    (None, 1) if descriptor.kind == MemberKind::Property && def.getter.is_some() => {
                        Err(HostError::argument(format!(
                            "Property '{}' has no setter",
                            descriptor.name
                        )))
                    }
                    (None, 1) => {
                        let value = std::mem::take(&mut args[0]);
                        self.write_storage(descriptor, target, value)
                    }
                    (None, n) => Err(HostError::new(
                        "System.Reflection.TargetParameterCountException",
                        format!("'{}' takes at most one argument, {n} given", descriptor.name),
                    )),
                }
            }
            MemberKind::Constructor => Ok(Value::Void),
        }
    }

    fn close_generic_method(
        &self,
        open: &MemberDescriptor,
        type_args: &[TypeDescriptor],
    ) -> Result<MemberDescriptor, HostError> {
        Counters::bump(&self.counters.generic_closings);

        let def = self
            .member_def(open.id)
            .filter(|def| def.descriptor.generic_params > 0)
            .ok_or_else(|| {
                HostError::new(
                    "System.InvalidOperationException",
                    format!("'{}' is not a generic method definition", open.name),
                )
            })?;
        let definition = &def.descriptor;
        if usize::from(definition.generic_params) != type_args.len() {
            return Err(HostError::argument(format!(
                "'{}' takes {} type arguments, {} given",
                definition.name,
                definition.generic_params,
                type_args.len()
            )));
        }

        let names: Vec<String> = type_args.iter().map(|t| t.fullname.clone()).collect();
        let id = HostMemberId(self.next_closed.fetch_add(1, Ordering::Relaxed));
        let descriptor = MemberDescriptor {
            id,
            params: definition
                .params
                .iter()
                .map(|p| ParamDescriptor {
                    ty: p.ty.substitute(&names),
                    ..p.clone()
                })
                .collect(),
            value_type: definition.value_type.as_ref().map(|ty| ty.substitute(&names)),
            generic_params: 0,
            type_args: type_args.iter().map(|t| t.id).collect(),
            ..definition.clone()
        };

        self.closed.insert(
            id,
            ClosedMember {
                descriptor: descriptor.clone(),
                open: definition.id,
            },
        );
        Ok(descriptor)
    }

    fn type_of(&self, obj: HostRef) -> Option<TypeDescriptor> {
        self.heap
            .type_id(obj)
            .and_then(|id| self.type_def(id))
            .map(|def| def.descriptor.clone())
    }

    fn is_assignable(&self, from: &TypeDescriptor, to: &str) -> bool {
        if to == CorePrimitive::Object.fullname() {
            return true;
        }

        let mut current = self.type_def(from.id);
        let mut depth = 0;
        while let Some(ty) = current {
            if ty.descriptor.fullname == to || ty.interfaces.iter().any(|i| i == to) {
                return true;
            }
            depth += 1;
            if depth > self.types.count() {
                return false;
            }
            current = ty.base.as_deref().and_then(|base| self.type_def_named(base));
        }
        false
    }

    fn display(&self, obj: HostRef) -> String {
        if let Some(label) = self.heap.label(obj) {
            return label;
        }
        match self.type_of(obj) {
            Some(ty) => format!("{}{obj}", ty.fullname),
            None => obj.to_string(),
        }
    }
}

impl InMemoryHost {
    /// Returns `true` if the type is a value type (derives from `System.ValueType`)
    #[must_use]
    pub fn is_value_type(&self, fullname: &str) -> bool {
        self.type_def_named(fullname).is_some_and(|def| def.value_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ParamMode, Visibility};

    fn sample() -> InMemoryHost {
        HostBuilder::new()
            .module("Host.Core", |m| {
                m.class("Host.Core.Base", |t| {
                    t.field("id", "System.Int32").initial(Value::I32(5));
                });
                m.class("Host.Core.Thing", |t| {
                    t.extends("Host.Core.Base").implements("Host.Core.IThing");
                    t.field("counter", "System.Int32").as_static();
                    t.property("Name", "System.String");
                    t.method("TryParse")
                        .as_static()
                        .param("text", "System.String")
                        .param_out("result", "System.Int32")
                        .returns("System.Boolean")
                        .body(|_, args| {
                            let parsed = args[0].as_str().and_then(|s| s.parse::<i32>().ok());
                            match parsed {
                                Some(n) => {
                                    args[1] = Value::I32(n);
                                    Ok(Value::Bool(true))
                                }
                                None => Ok(Value::Bool(false)),
                            }
                        });
                    t.method("Identity")
                        .as_static()
                        .generic(1)
                        .param("value", TypeSig::generic(0))
                        .returns(TypeSig::generic(0))
                        .body(|ctx, args| {
                            assert_eq!(ctx.type_args.len(), 1);
                            Ok(args[0].clone())
                        });
                    t.constructor().body(|ctx, _| {
                        ctx.host.set_field(ctx.this()?, "Name", Value::from("built"))?;
                        Ok(Value::Void)
                    });
                });
            })
            .build()
    }

    fn find(
        host: &InMemoryHost,
        ty: &TypeDescriptor,
        name: &str,
        kind: MemberKind,
        is_static: bool,
    ) -> MemberDescriptor {
        let filter = MemberFilter {
            name,
            kind,
            visibility: Visibility::BOTH,
            is_static,
        };
        host.enumerate_members(ty, &filter).remove(0)
    }

    #[test]
    fn core_library_is_loaded() {
        let host = sample();
        let modules = host.loaded_modules();
        assert_eq!(modules[0].name, crate::host::CORE_LIBRARY);
        assert_eq!(modules[1].name, "Host.Core");
        assert!(host.find_type(&modules[0], "System.Int32").is_some());
        assert!(host.find_type(&modules[1], "System.Int32").is_none());
        assert!(host.is_value_type("System.Int32"));
        assert!(!host.is_value_type("Host.Core.Thing"));

        let stats = host.stats();
        assert_eq!(stats.module_scans, 1);
        assert_eq!(stats.type_lookups, 2);
    }

    #[test]
    fn out_parameter_written_back() {
        let host = sample();
        let thing = host.type_named("Host.Core.Thing").unwrap();
        let try_parse = find(&host, &thing, "TryParse", MemberKind::Method, true);
        assert_eq!(try_parse.params[1].mode, ParamMode::Out);

        let mut args = [Value::from("42"), Value::Null];
        let result = host.invoke_member(&try_parse, None, &mut args).unwrap();
        assert_eq!(result, Value::Bool(true));
        assert_eq!(args[1], Value::I32(42));
    }

    #[test]
    fn constructor_initializes_inherited_fields() {
        let host = sample();
        let thing = host.type_named("Host.Core.Thing").unwrap();
        let ctor = find(&host, &thing, ".ctor", MemberKind::Constructor, false);

        let obj = host
            .invoke_member(&ctor, None, &mut [])
            .unwrap()
            .as_object()
            .unwrap();
        assert_eq!(host.field(obj, "id"), Some(Value::I32(5)));
        assert_eq!(host.field(obj, "Name"), Some(Value::from("built")));
        assert_eq!(host.type_of(obj), Some(thing));
    }

    #[test]
    fn static_storage_defaults() {
        let host = sample();
        assert_eq!(host.static_value("Host.Core.Thing", "counter"), Some(Value::I32(0)));

        let thing = host.type_named("Host.Core.Thing").unwrap();
        let counter = find(&host, &thing, "counter", MemberKind::Field, true);
        host.invoke_member(&counter, None, &mut [Value::I32(3)]).unwrap();
        assert_eq!(host.invoke_member(&counter, None, &mut []).unwrap(), Value::I32(3));
    }

    #[test]
    fn instance_member_requires_live_target() {
        let host = sample();
        let thing = host.type_named("Host.Core.Thing").unwrap();
        let name = find(&host, &thing, "Name", MemberKind::Property, false);

        let err = host.invoke_member(&name, None, &mut []).unwrap_err();
        assert_eq!(err.exception, "System.NullReferenceException");

        let obj = host.allocate("Host.Core.Thing").unwrap();
        assert!(host.release(obj));
        assert!(host.invoke_member(&name, Some(obj), &mut []).is_err());
    }

    #[test]
    fn generic_closing_substitutes_and_is_not_cached() {
        let host = sample();
        let thing = host.type_named("Host.Core.Thing").unwrap();
        let open = find(&host, &thing, "Identity", MemberKind::Method, true);
        let int32 = host.type_named("System.Int32").unwrap();

        assert!(host.invoke_member(&open, None, &mut [Value::I32(1)]).is_err());

        let a = host.close_generic_method(&open, &[int32.clone()]).unwrap();
        let b = host.close_generic_method(&open, &[int32.clone()]).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.params[0].ty, TypeSig::named("System.Int32"));
        assert_eq!(a.type_args, vec![int32.id]);
        assert_eq!(host.invoke_member(&a, None, &mut [Value::I32(9)]).unwrap(), Value::I32(9));

        assert!(host.close_generic_method(&open, &[]).is_err());
        assert!(host.close_generic_method(&a, &[int32]).is_err());
        assert_eq!(host.stats().generic_closings, 4);
    }

    #[test]
    fn assignability_walks_bases_and_interfaces() {
        let host = sample();
        let thing = host.type_named("Host.Core.Thing").unwrap();
        assert!(host.is_assignable(&thing, "Host.Core.Thing"));
        assert!(host.is_assignable(&thing, "Host.Core.Base"));
        assert!(host.is_assignable(&thing, "Host.Core.IThing"));
        assert!(host.is_assignable(&thing, "System.Object"));
        assert!(!host.is_assignable(&thing, "Host.Core.Other"));
    }

    #[test]
    fn late_module_load() {
        let host = sample();
        assert!(host.type_named("Host.Late.Widget").is_none());
        host.load_module("Host.Late", |m| {
            m.class("Host.Late.Widget", |_| {});
        });
        let modules = host.loaded_modules();
        assert_eq!(modules.len(), 3);
        assert!(host.find_type(&modules[2], "Host.Late.Widget").is_some());
    }

    #[test]
    fn display_uses_label_or_type() {
        let host = sample();
        let labelled = host.allocate_with_label("Host.Core.Thing", "hero").unwrap();
        let plain = host.allocate("Host.Core.Thing").unwrap();
        assert_eq!(host.display(labelled), "hero");
        assert_eq!(host.display(plain), format!("Host.Core.Thing{plain}"));
        assert!(!host.equals(labelled, plain));
        assert_eq!(host.object_count(), 2);
    }
}
