use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, ImplItem, ImplItemFn, ItemImpl, Stmt, Variant,
    Visibility,
};

/// Turns an error enum into a `pki-sig` error that can cross the FFI boundary.
///
/// This macro automatically:
/// 1. Adds `#[derive(Debug, thiserror::Error, uniffi::Error)]` and `#[uniffi(flat_error)]`
/// 2. Adds a `Generic { message: String }` variant if not already present
/// 3. Implements `From<anyhow::Error>` for the error type, keeping the cause chain
/// 4. Provides `from_anyhow_result` helpers
///
/// # Usage
///
/// ```rust,ignore
/// #[pki_error]
/// pub enum CodecError {
///     #[error("bad tag: {tag}")]
///     BadTag { tag: u8 },
/// }
/// ```
#[proc_macro_attribute]
pub fn pki_error(_args: TokenStream, input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(&input, "pki_error can only be applied to enums")
            .to_compile_error()
            .into();
    };

    let enum_name = &input.ident;
    let visibility = &input.vis;
    let generics = &input.generics;

    // The derives are re-added below, so existing ones would conflict.
    let attrs: Vec<_> = input
        .attrs
        .iter()
        .filter(|attr| !attr.path().is_ident("derive") && !attr.path().is_ident("uniffi"))
        .collect();

    let mut variants = data_enum.variants.clone();
    if !has_generic_variant(&variants) {
        let generic_variant: Variant = syn::parse_quote! {
            /// A generic error that wraps an `anyhow` error.
            #[error("Generic error: {message}")]
            Generic {
                /// The message of the wrapped error, including its causes.
                message: String
            }
        };
        variants.push(generic_variant);
    }

    quote! {
        use anyhow::Context;

        #[derive(Debug, thiserror::Error, uniffi::Error)]
        #[uniffi(flat_error)]
        #(#attrs)*
        #visibility enum #enum_name #generics {
            #variants
        }

        impl #generics From<anyhow::Error> for #enum_name #generics {
            fn from(err: anyhow::Error) -> Self {
                let mut message = err.to_string();
                let chain: Vec<String> = err.chain().skip(1).map(|e| e.to_string()).collect();
                if !chain.is_empty() {
                    message.push_str(" (caused by: ");
                    message.push_str(&chain.join(" -> "));
                    message.push(')');
                }
                Self::Generic { message }
            }
        }

        impl #generics #enum_name #generics {
            /// Converts an `anyhow::Result` into a result with this error type.
            pub fn from_anyhow_result<T>(result: anyhow::Result<T>) -> Result<T, Self> {
                result.map_err(Self::from)
            }

            /// Converts an `anyhow::Result` into a result with this error type, prefixing the message.
            pub fn from_anyhow_result_with_prefix<T>(
                result: anyhow::Result<T>,
                prefix: &str,
            ) -> Result<T, Self> {
                result.map_err(|err| match Self::from(err) {
                    Self::Generic { message } => Self::Generic {
                        message: format!("{}: {}", prefix, message),
                    },
                    other => other,
                })
            }
        }
    }
    .into()
}

fn has_generic_variant(
    variants: &syn::punctuated::Punctuated<Variant, syn::token::Comma>,
) -> bool {
    variants.iter().any(|variant| variant.ident == "Generic")
}

/// Wraps `uniffi::export` and opens a logging context in every public method.
///
/// Each `pub fn` in the impl block starts with
/// `let _pki_logger_ctx = crate::logger::LogContext::new("TypeName");`
/// so that the crate's logging macros prefix their output with `[TypeName]`.
/// Private methods are left untouched.
///
/// # Usage
///
/// ```rust,ignore
/// #[pki_export]
/// impl EcdsaSignature {
///     pub fn to_der(&self) -> Vec<u8> {
///         debug!("encoding"); // logged as "[EcdsaSignature] encoding"
///         ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn pki_export(args: TokenStream, input: TokenStream) -> TokenStream {
    let input_impl = parse_macro_input!(input as ItemImpl);
    let type_name = impl_type_name(&input_impl);

    let items = input_impl
        .items
        .iter()
        .map(|item| match item {
            ImplItem::Fn(method) if matches!(method.vis, Visibility::Public(_)) => {
                let mut method = method.clone();
                inject_logging_context(&mut method, &type_name);
                ImplItem::Fn(method)
            }
            other => other.clone(),
        })
        .collect();

    let new_impl = ItemImpl {
        items,
        ..input_impl
    };
    let args = proc_macro2::TokenStream::from(args);

    quote! {
        #[uniffi::export(#args)]
        #new_impl
    }
    .into()
}

/// Name of the type an impl block is for, used as the logging context.
fn impl_type_name(input_impl: &ItemImpl) -> String {
    match &*input_impl.self_ty {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map_or_else(|| "Unknown".to_string(), |segment| segment.ident.to_string()),
        _ => "Unknown".to_string(),
    }
}

fn inject_logging_context(method: &mut ImplItemFn, type_name: &str) {
    let context_stmt: Stmt = syn::parse_quote! {
        let _pki_logger_ctx = crate::logger::LogContext::new(#type_name);
    };
    method.block.stmts.insert(0, context_stmt);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impl_type_name_uses_last_path_segment() {
        let impl_block: ItemImpl = syn::parse_quote! {
            impl crate::signature::EcdsaSignature {
                pub fn to_der(&self) -> Vec<u8> {
                    Vec::new()
                }
            }
        };

        assert_eq!(impl_type_name(&impl_block), "EcdsaSignature");
    }

    #[test]
    fn test_impl_type_name_unknown_for_non_path_types() {
        let impl_block: ItemImpl = syn::parse_quote! {
            impl [u8; 64] {
                pub fn len(&self) -> usize {
                    64
                }
            }
        };

        assert_eq!(impl_type_name(&impl_block), "Unknown");
    }

    #[test]
    fn test_inject_logging_context_prepends_statement() {
        let mut method: ImplItemFn = syn::parse_quote! {
            pub fn to_raw(&self) -> Vec<u8> {
                self.raw.to_vec()
            }
        };

        inject_logging_context(&mut method, "EcdsaSignature");

        assert_eq!(method.block.stmts.len(), 2);
        let first = &method.block.stmts[0];
        let rendered = quote!(#first).to_string();
        assert!(rendered.contains("_pki_logger_ctx"));
        assert!(rendered.contains("\"EcdsaSignature\""));
    }

    #[test]
    fn test_generic_variant_detection() {
        let with_generic: syn::ItemEnum = syn::parse_quote! {
            enum E {
                InvalidArgument,
                Generic { message: String },
            }
        };
        let without_generic: syn::ItemEnum = syn::parse_quote! {
            enum E {
                InvalidArgument,
                MalformedEncoding { reason: String },
            }
        };

        assert!(has_generic_variant(&with_generic.variants));
        assert!(!has_generic_variant(&without_generic.variants));
    }
}
