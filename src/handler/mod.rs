//! # Handler Module
//!
//! Handler targets and their parameter declarations.
//!
//! A route resolves to a [`Controller`] and a method name. Controllers declare
//! each method's parameters as a list of [`ParamSpec`] (name, [`ParamKind`],
//! optional default); the router binds request values against that list and
//! passes the result to [`Controller::call`] as [`Args`].
//!
//! Controllers are found through a route's [`Target`]: a live instance, an id
//! resolved by the injected [`ServiceRegistry`], or a no-argument constructor.

mod controller;
mod params;
mod registry;

pub use controller::{Callable, Controller, ControllerCtor, HandlerResult, Resource, Target};
pub use params::{Arg, Args, FromValue, ParamKind, ParamSpec};
pub use registry::{Registry, ServiceRegistry};
