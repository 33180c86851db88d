//! Typed wrappers over a module's known exports.
//!
//! [`script_exports!`](crate::script_exports!) declares a wrapper type whose
//! methods forward to [`ComponentScriptProxy::invoke`] and
//! [`ComponentScriptProxy::invoke_void`] under the export's name.
//!
//! ```
//! use component_scripts::{component, script_exports};
//!
//! pub struct Map;
//! component!(Map);
//!
//! script_exports! {
//!     /// Exports of `Map.ext.js`.
//!     pub struct MapExports for Map {
//!         #[name = "setZoom"]
//!         fn set_zoom(level: u8);
//!         fn center() -> (f64, f64);
//!     }
//! }
//! ```
//!
//! [`ComponentScriptProxy::invoke`]: crate::ComponentScriptProxy::invoke
//! [`ComponentScriptProxy::invoke_void`]: crate::ComponentScriptProxy::invoke_void

/// Declare a typed wrapper over a component script's exports.
///
/// Methods without a return type discard the script's result. The member
/// name defaults to the method identifier; `#[name = "..."]` overrides it.
#[macro_export]
macro_rules! script_exports {
    (@member $method:ident) => { stringify!($method) };
    (@member $method:ident $name:literal) => { $name };

    (@ret) => { () };
    (@ret $ret:ty) => { $ret };

    (@call $proxy:expr, $member:expr, $args:expr) => {
        $proxy.invoke_void($member, $args).await
    };
    (@call $proxy:expr, $member:expr, $args:expr, $ret:ty) => {
        $proxy.invoke::<$ret>($member, $args).await
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $wrapper:ident for $component:ty {
            $(
                $(#[name = $name:literal])?
                fn $method:ident ( $( $arg:ident : $arg_ty:ty ),* $(,)? ) $( -> $ret:ty )? ;
            )*
        }
    ) => {
        $(#[$meta])*
        $vis struct $wrapper<'a> {
            proxy: &'a $crate::ComponentScriptProxy<$component>,
        }

        impl<'a> $wrapper<'a> {
            pub fn new(proxy: &'a $crate::ComponentScriptProxy<$component>) -> Self {
                Self { proxy }
            }

            $(
                #[allow(clippy::unused_unit)]
                pub async fn $method(&self, $( $arg: $arg_ty ),*)
                    -> $crate::Result<$crate::script_exports!(@ret $($ret)?)>
                {
                    let args: ::std::vec::Vec<$crate::__private::serde_json::Value> = vec![
                        $( $crate::__private::serde_json::to_value(&$arg)? ),*
                    ];
                    let member = $crate::script_exports!(@member $method $($name)?);
                    $crate::script_exports!(@call self.proxy, member, &args $(, $ret)?)
                }
            )*
        }
    };
}
