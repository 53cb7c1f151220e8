#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the endpoint host.
//!
//! * [`courier_error`] turns an enum into a `thiserror` error with `.context(...)` support.
//! * [`Endpoint`] declares which capability contracts an endpoint type satisfies.
//!
//! Generated code refers to `::courier_kernel`, so [`Endpoint`] is meant for crates that
//! depend on `courier-kernel` directly.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to `Result<T, Error>` and to `Result<T, Source>` for every wrapped source error.
/// * **Standard Conversions**: Implements `From<Source>` for variants with a `source` field
///   (or a field marked `#[source]`/`#[from]`), enabling `?` on upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant is present.
///
/// # Requirements
///
/// 1. Applied to an **enum** with named-field variants only.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Variants wrapping a source error must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use courier_derive::courier_error;
/// use std::borrow::Cow;
///
/// #[courier_error]
/// pub enum SettingsError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io {
///         #[source]
///         source: std::io::Error,
///         context: Option<Cow<'static, str>>,
///     },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<String, SettingsError> {
///     std::fs::read_to_string("host.toml").context("Reading host settings")
/// }
/// ```
#[proc_macro_attribute]
pub fn courier_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Derives `courier_kernel::capability::ConfigureThisEndpoint` from a declared contract list.
///
/// The type must implement `Default` (used as the constructor) and every listed contract
/// trait; an unlisted trait implementation is not detected. Generic contracts take the
/// selected type as their argument.
///
/// # Example
///
/// ```rust,ignore
/// use courier_derive::Endpoint;
/// use courier_kernel::capability::contracts::*;
///
/// #[derive(Default, Endpoint)]
/// #[endpoint(EndpointName, ToUseXmlSerialization, ContainerTypeToUse<LightContainer>)]
/// struct OrdersEndpoint;
///
/// impl EndpointName for OrdersEndpoint {
///     fn endpoint_name(&self) -> String {
///         "OrdersEndpoint".to_owned()
///     }
/// }
/// impl ToUseXmlSerialization for OrdersEndpoint {}
/// impl ContainerTypeToUse<LightContainer> for OrdersEndpoint {}
/// ```
#[proc_macro_derive(Endpoint, attributes(endpoint))]
pub fn derive_endpoint(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::endpoint::expand(input).into()
}
