//! Packing arguments into host calls and unpacking by-reference results.
//!
//! The host calling convention is one untyped slot per declared parameter. The marshaler checks
//! the target and every input against the member's declaration, pre-allocates the slots of `out`
//! parameters, performs the call and reads every by-reference slot back, in parameter order.
//!
//! # Argument Shapes
//!
//! | Member | Accepted `args` |
//! |--------|-----------------|
//! | Field, property | `[]` to read, `[value]` to write |
//! | Method, constructor | one value per parameter, or one value per non-`out` parameter |
//!
//! When a value is given for an `out` parameter it is ignored and the slot starts as `null`.

use crate::{
    bridge::member::MemberHandle,
    host::{signature::TypeSig, CorePrimitive, Host, HostRef, MemberKind, ParamMode, Value},
    Error, Result,
};

/// The outcome of one host call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvokeResult {
    /// Return value; [`Value::Void`] for void methods and writes
    pub value: Value,
    /// Final values of every `ref` and `out` parameter, in parameter order
    pub outputs: Vec<Value>,
}

impl InvokeResult {
    /// The n-th by-reference output
    #[must_use]
    pub fn output(&self, index: usize) -> Option<&Value> {
        self.outputs.get(index)
    }
}

/// Performs checked invocations against one host
pub struct ArgumentMarshaler<'a> {
    host: &'a dyn Host,
}

impl<'a> ArgumentMarshaler<'a> {
    /// Creates a marshaler calling into `host`
    pub fn new(host: &'a dyn Host) -> Self {
        ArgumentMarshaler { host }
    }

    /// Invokes `handle` on `target` with `args`.
    ///
    /// # Errors
    ///
    /// - [`Error::GenericArity`] for an open generic method
    /// - [`Error::TypeMismatch`] for a missing, superfluous or incompatible target, or an
    ///   argument not assignable to its parameter
    /// - [`Error::ArgumentCount`] for an unsupported number of arguments
    /// - [`Error::Invocation`] if the host raised, with the host exception as source
    pub fn invoke(
        &self,
        handle: &MemberHandle,
        target: Option<HostRef>,
        args: &[Value],
    ) -> Result<InvokeResult> {
        if handle.is_generic_definition() {
            return Err(Error::GenericArity {
                method: handle.display_name(),
                expected: usize::from(handle.generic_arity()),
                found: 0,
            });
        }

        self.check_target(handle, target)?;

        let mut slots = match handle.kind() {
            MemberKind::Field | MemberKind::Property => self.accessor_slots(handle, args)?,
            MemberKind::Method | MemberKind::Constructor => self.call_slots(handle, args)?,
        };

        let value = self
            .host
            .invoke_member(handle.descriptor(), target, &mut slots)
            .map_err(|source| Error::Invocation {
                member: handle.display_name(),
                source,
            })?;

        let outputs = handle
            .params()
            .iter()
            .zip(slots)
            .filter(|(param, _)| param.mode.is_by_ref())
            .map(|(_, slot)| slot)
            .collect();

        Ok(InvokeResult { value, outputs })
    }

    fn check_target(&self, handle: &MemberHandle, target: Option<HostRef>) -> Result<()> {
        let owner = handle.owner();
        let takes_target = !handle.is_static() && handle.kind() != MemberKind::Constructor;

        match (takes_target, target) {
            (false, None) => Ok(()),
            (false, Some(obj)) => Err(Error::TypeMismatch {
                member: handle.display_name(),
                expected: "no target".to_string(),
                found: self.describe(obj),
            }),
            (true, None) => Err(Error::TypeMismatch {
                member: handle.display_name(),
                expected: owner.fullname().to_string(),
                found: "null".to_string(),
            }),
            (true, Some(obj)) => match self.host.type_of(obj) {
                Some(actual) if self.host.is_assignable(&actual, owner.fullname()) => Ok(()),
                Some(actual) => Err(Error::TypeMismatch {
                    member: handle.display_name(),
                    expected: owner.fullname().to_string(),
                    found: actual.fullname,
                }),
                None => Err(Error::TypeMismatch {
                    member: handle.display_name(),
                    expected: owner.fullname().to_string(),
                    found: format!("released object {obj}"),
                }),
            },
        }
    }

    fn accessor_slots(&self, handle: &MemberHandle, args: &[Value]) -> Result<Vec<Value>> {
        match args {
            [] => Ok(Vec::new()),
            [value] => {
                if let Some(ty) = handle.value_type() {
                    self.check_assignable(handle, value, ty)?;
                }
                Ok(vec![value.clone()])
            }
            _ => Err(Error::ArgumentCount {
                member: handle.display_name(),
                expected: "0 or 1".to_string(),
                found: args.len(),
            }),
        }
    }

    fn call_slots(&self, handle: &MemberHandle, args: &[Value]) -> Result<Vec<Value>> {
        let params = handle.params();
        let inputs = params.iter().filter(|p| p.mode != ParamMode::Out).count();

        let slots: Vec<Value> = if args.len() == params.len() {
            params
                .iter()
                .zip(args)
                .map(|(param, arg)| match param.mode {
                    ParamMode::Out => Value::Null,
                    ParamMode::In | ParamMode::Ref => arg.clone(),
                })
                .collect()
        } else if args.len() == inputs {
            let mut given = args.iter();
            params
                .iter()
                .map(|param| match param.mode {
                    ParamMode::Out => Value::Null,
                    ParamMode::In | ParamMode::Ref => given.next().cloned().unwrap_or(Value::Null),
                })
                .collect()
        } else {
            let expected = if inputs == params.len() {
                params.len().to_string()
            } else {
                format!("{inputs} or {}", params.len())
            };
            return Err(Error::ArgumentCount {
                member: handle.display_name(),
                expected,
                found: args.len(),
            });
        };

        for (param, slot) in params.iter().zip(&slots) {
            if param.mode != ParamMode::Out {
                self.check_assignable(handle, slot, param.ty.referent())?;
            }
        }
        Ok(slots)
    }

    fn check_assignable(&self, handle: &MemberHandle, value: &Value, ty: &TypeSig) -> Result<()> {
        if is_assignable(self.host, value, ty) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                member: handle.display_name(),
                expected: ty.to_string(),
                found: match value {
                    Value::Object(obj) => self.describe(*obj),
                    other => other.type_label(),
                },
            })
        }
    }

    fn describe(&self, obj: HostRef) -> String {
        self.host
            .type_of(obj)
            .map_or_else(|| format!("released object {obj}"), |ty| ty.fullname)
    }
}

/// Returns `true` if `value` may be passed where `ty` is declared.
///
/// `System.Object` accepts everything, `null` is accepted by every type that is not a primitive
/// value type, objects defer to [`Host::is_assignable`], structs need the exact type name and
/// arrays are checked element by element. Primitives are never widened.
pub fn is_assignable(host: &dyn Host, value: &Value, ty: &TypeSig) -> bool {
    match ty {
        TypeSig::MethodParam(_) => true,
        TypeSig::ByRef(inner) => is_assignable(host, value, inner),
        TypeSig::Array(element) => match value {
            Value::Null => true,
            Value::Array(items) => items.iter().all(|item| is_assignable(host, item, element)),
            _ => false,
        },
        TypeSig::Named(name) => {
            if name == CorePrimitive::Object.fullname() {
                return !value.is_void();
            }
            match value {
                Value::Void => false,
                Value::Null => !CorePrimitive::from_fullname(name)
                    .is_some_and(CorePrimitive::is_value_type),
                Value::Object(obj) => host
                    .type_of(*obj)
                    .is_some_and(|actual| host.is_assignable(&actual, name)),
                Value::Struct(s) => s.type_name == *name,
                Value::Array(_) => false,
                primitive => primitive
                    .primitive()
                    .is_some_and(|p| p.fullname() == name),
            }
        }
    }
}
