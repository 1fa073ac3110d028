//! Driven-property registration.
//!
//! A driven property is a serialized property whose value is controlled by another object
//! (the driver). The host keeps the registrations in `Host.Core.DrivenPropertyManager`; every
//! change is a host mutation and therefore goes through the context's execution mode.

use std::sync::Arc;

use crate::{
    bridge::{Applied, BridgeContext, Capability, MemberQuery},
    host::{HostRef, Value},
    proxy::{HostFeature, HostProxy},
    Result,
};

const ASSEMBLY: &str = "Host.Core";
const TYPE_NAME: &str = "Host.Core.DrivenPropertyManager";

const REGISTER: &str = "driver.register";
const UNREGISTER: &str = "driver.unregister";
const UNREGISTER_ALL: &str = "driver.unregister_all";
const TRY_REGISTER: &str = "driver.try_register";

/// The static surface of `Host.Core.DrivenPropertyManager`
#[derive(Debug, Clone)]
pub struct PropertyDriver {
    proxy: HostProxy,
}

impl HostFeature for PropertyDriver {
    const NAME: &'static str = "property driver";

    fn capabilities() -> Vec<Capability> {
        let registration = || signature!["System.Object", "System.Object", "System.String"];
        let method = |name: &str| MemberQuery::method(ASSEMBLY, TYPE_NAME, name).as_static();
        vec![
            Capability::required(REGISTER, method("RegisterProperty").signature(registration())),
            Capability::required(
                UNREGISTER,
                method("UnregisterProperty").signature(registration()),
            ),
            Capability::required(
                UNREGISTER_ALL,
                method("UnregisterProperties").signature(signature!["System.Object"]),
            ),
            Capability::optional(
                TRY_REGISTER,
                method("TryRegisterProperty").signature(registration()),
            ),
        ]
    }
}

impl PropertyDriver {
    /// Installs the feature and binds the static surface.
    ///
    /// # Errors
    ///
    /// Returns the resolution error of the manager type, or of a required member under eager
    /// validation.
    pub fn new(ctx: &Arc<BridgeContext>) -> Result<Self> {
        ctx.install::<PropertyDriver>()?;
        let owner = ctx.resolve_type(ASSEMBLY, TYPE_NAME)?;
        Ok(PropertyDriver {
            proxy: HostProxy::static_only(ctx, &owner),
        })
    }

    /// Lets `driver` control the property at `path` of `target`.
    ///
    /// # Errors
    ///
    /// Returns the resolution error, or the invocation error in immediate mode.
    pub fn register(&self, driver: HostRef, target: HostRef, path: &str) -> Result<Applied> {
        self.submit(REGISTER, format!("register {path}"), driver, target, path)
    }

    /// Releases the property at `path` of `target` from `driver`.
    ///
    /// # Errors
    ///
    /// Returns the resolution error, or the invocation error in immediate mode.
    pub fn unregister(&self, driver: HostRef, target: HostRef, path: &str) -> Result<Applied> {
        self.submit(UNREGISTER, format!("unregister {path}"), driver, target, path)
    }

    /// Releases every property driven by `driver`.
    ///
    /// # Errors
    ///
    /// Returns the resolution error, or the invocation error in immediate mode.
    pub fn unregister_all(&self, driver: HostRef) -> Result<Applied> {
        let ctx = self.proxy.context();
        let member = ctx.capability(UNREGISTER_ALL)?;
        let label = format!("unregister all of {}", ctx.host().display(driver));
        ctx.apply(
            label,
            Box::new(move |ctx| Ok(ctx.invoke(&member, None, &[Value::Object(driver)])?.value)),
        )
    }

    /// Registers unless the property is already driven.
    ///
    /// Hosts without `TryRegisterProperty` get a plain registration that reports `true`.
    ///
    /// # Errors
    ///
    /// Returns the resolution error, or the invocation error in immediate mode.
    pub fn try_register(&self, driver: HostRef, target: HostRef, path: &str) -> Result<Applied> {
        let label = format!("try register {path}");
        if self.proxy.context().is_available(TRY_REGISTER)? {
            return self.submit(TRY_REGISTER, label, driver, target, path);
        }

        let member = self.proxy.context().capability(REGISTER)?;
        let args = registration_args(driver, target, path);
        self.proxy.context().apply(
            label,
            Box::new(move |ctx| {
                ctx.invoke(&member, None, &args)?;
                Ok(Value::Bool(true))
            }),
        )
    }

    /// Capability query for [`PropertyDriver::try_register`]'s native form
    #[must_use]
    pub fn supports_try_register(&self) -> bool {
        self.proxy
            .context()
            .is_available(TRY_REGISTER)
            .unwrap_or(false)
    }

    fn submit(
        &self,
        id: &str,
        label: String,
        driver: HostRef,
        target: HostRef,
        path: &str,
    ) -> Result<Applied> {
        // Absence fails the call itself, never the tick
        let member = self.proxy.context().capability(id)?;
        let args = registration_args(driver, target, path);
        self.proxy.context().apply(
            label,
            Box::new(move |ctx| Ok(ctx.invoke(&member, None, &args)?.value)),
        )
    }
}

fn registration_args(driver: HostRef, target: HostRef, path: &str) -> Vec<Value> {
    vec![
        Value::Object(driver),
        Value::Object(target),
        Value::from(path),
    ]
}
