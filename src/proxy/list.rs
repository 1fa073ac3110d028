//! The host's reorderable list control.

use std::sync::Arc;

use crate::{
    bridge::{BridgeContext, Capability, MemberHandle, MemberQuery, TypeHandle},
    host::{signature::TypeSig, HostRef, Value},
    proxy::{expect, out_value, HostFeature, HostProxy},
    Result,
};

const ASSEMBLY: &str = "Host.Editor";
const TYPE_NAME: &str = "Host.Editor.ReorderableList";

const CTOR: &str = "list.ctor";
const INDEX: &str = "list.index";
const COUNT: &str = "list.count";
const DRAGGABLE: &str = "list.draggable";
const SELECT: &str = "list.select";
const TRY_GET_ELEMENT: &str = "list.try_get_element";
const GET_ELEMENT: &str = "list.get_element";

/// An instance of `Host.Editor.ReorderableList`.
///
/// The draggable flag is a non-public field and element access by type goes through the
/// open generic `GetElement<T>`, closed on demand for each requested type.
#[derive(Debug, Clone, PartialEq)]
pub struct ListWrapper {
    proxy: HostProxy,
}

impl HostFeature for ListWrapper {
    const NAME: &'static str = "reorderable list";

    fn capabilities() -> Vec<Capability> {
        vec![
            Capability::required(
                CTOR,
                MemberQuery::constructor(ASSEMBLY, TYPE_NAME)
                    .signature(signature![TypeSig::array("System.Object"), "System.Boolean"]),
            ),
            Capability::required(INDEX, MemberQuery::property(ASSEMBLY, TYPE_NAME, "index")),
            Capability::required(COUNT, MemberQuery::property(ASSEMBLY, TYPE_NAME, "count")),
            Capability::required(
                DRAGGABLE,
                MemberQuery::field(ASSEMBLY, TYPE_NAME, "m_Draggable").non_public(),
            ),
            Capability::required(
                SELECT,
                MemberQuery::method(ASSEMBLY, TYPE_NAME, "Select")
                    .signature(signature!["System.Int32"]),
            ),
            Capability::required(
                TRY_GET_ELEMENT,
                MemberQuery::method(ASSEMBLY, TYPE_NAME, "TryGetElement").signature(signature![
                    "System.Int32",
                    TypeSig::by_ref("System.Object")
                ]),
            ),
            Capability::required(
                GET_ELEMENT,
                MemberQuery::method(ASSEMBLY, TYPE_NAME, "GetElement")
                    .signature(signature!["System.Int32"]),
            ),
        ]
    }
}

impl ListWrapper {
    /// Constructs a new list in the host.
    ///
    /// # Errors
    ///
    /// Returns the resolution or invocation error of the constructor.
    pub fn create(ctx: &Arc<BridgeContext>, elements: Vec<Value>, draggable: bool) -> Result<Self> {
        ctx.install::<ListWrapper>()?;
        let ctor = ctx.capability(CTOR)?;
        let proxy = HostProxy::create(ctx, &ctor, &[Value::Array(elements), draggable.into()])?;
        Ok(ListWrapper { proxy })
    }

    /// Adopts a list the host already owns.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TypeMismatch`] if `obj` is not a live reorderable list.
    pub fn wrap(ctx: &Arc<BridgeContext>, obj: HostRef) -> Result<Self> {
        ctx.install::<ListWrapper>()?;
        let owner = ctx.resolve_type(ASSEMBLY, TYPE_NAME)?;
        Ok(ListWrapper {
            proxy: HostProxy::wrap(ctx, &owner, obj)?,
        })
    }

    /// The underlying proxy
    #[must_use]
    pub fn proxy(&self) -> &HostProxy {
        &self.proxy
    }

    fn read(&self, id: &str) -> Result<(MemberHandle, Value)> {
        let member = self.proxy.context().capability(id)?;
        let value = self.proxy.get(&member)?;
        Ok((member, value))
    }

    /// The selected index, `-1` when nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns the resolution or invocation error.
    pub fn index(&self) -> Result<i32> {
        let (member, value) = self.read(INDEX)?;
        expect(&member, value, Value::as_i32, "System.Int32")
    }

    /// Sets the selected index without validation.
    ///
    /// # Errors
    ///
    /// Returns the resolution or invocation error.
    pub fn set_index(&self, index: i32) -> Result<()> {
        let member = self.proxy.context().capability(INDEX)?;
        self.proxy.set(&member, index.into())
    }

    /// Number of elements.
    ///
    /// # Errors
    ///
    /// Returns the resolution or invocation error.
    pub fn count(&self) -> Result<i32> {
        let (member, value) = self.read(COUNT)?;
        expect(&member, value, Value::as_i32, "System.Int32")
    }

    /// Whether elements can be reordered by dragging.
    ///
    /// # Errors
    ///
    /// Returns the resolution or invocation error.
    pub fn draggable(&self) -> Result<bool> {
        let (member, value) = self.read(DRAGGABLE)?;
        expect(&member, value, Value::as_bool, "System.Boolean")
    }

    /// Enables or disables dragging.
    ///
    /// # Errors
    ///
    /// Returns the resolution or invocation error.
    pub fn set_draggable(&self, draggable: bool) -> Result<()> {
        let member = self.proxy.context().capability(DRAGGABLE)?;
        self.proxy.set(&member, draggable.into())
    }

    /// Selects one element.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Invocation`] if the host rejects the index.
    pub fn select(&self, index: i32) -> Result<()> {
        self.proxy.call_capability(SELECT, &[index.into()])?;
        Ok(())
    }

    /// The element at `index`, `None` when the index is out of range.
    ///
    /// # Errors
    ///
    /// Returns the resolution or invocation error.
    pub fn try_get_element(&self, index: i32) -> Result<Option<Value>> {
        let member = self.proxy.context().capability(TRY_GET_ELEMENT)?;
        let result = self.proxy.call(&member, &[index.into()])?;
        out_value(&member, result)
    }

    /// The element at `index`, read through `GetElement<T>` closed over `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Invocation`] if the element is not a `ty`.
    pub fn element_as(&self, index: i32, ty: &TypeHandle) -> Result<Value> {
        let ctx = self.proxy.context();
        let open = ctx.capability(GET_ELEMENT)?;
        let closed = ctx.close_generic(&open, std::slice::from_ref(ty))?;
        Ok(self.proxy.call(&closed, &[index.into()])?.value)
    }
}
