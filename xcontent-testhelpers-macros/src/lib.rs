//! `#[xcontent_testhelpers::test]`: a `#[test]` that installs tracing first.

use unsynn::*;

// Attributes, visibility, `fn`, name, parameters and return type: every
// token before the body.
unsynn! {
    struct Signature {
        tokens: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct TestFn {
        signature: Signature,
        body: BraceGroup,
    }
}

impl TestFn {
    fn expand(self) -> TokenStream {
        let mut signature = TokenStream::new();
        self.signature.tokens.to_tokens(&mut signature);
        let is_async = signature
            .clone()
            .into_iter()
            .any(|tt| matches!(tt, TokenTree::Ident(ref ident) if ident == "async"));
        if is_async {
            return compile_error("#[xcontent_testhelpers::test] does not support async tests");
        }
        let body = self.body.0.stream();
        quote::quote! {
            #[::core::prelude::rust_2024::test]
            #signature {
                ::xcontent_testhelpers::setup();

                #body
            }
        }
    }
}

fn compile_error(message: &str) -> TokenStream {
    quote::quote! { ::core::compile_error!(#message); }
}

/// Runs `xcontent_testhelpers::setup()` before the test body.
///
/// ```ignore
/// #[xcontent_testhelpers::test]
/// fn writes_root() {
///     // tracing output from the crate under test is visible here
/// }
/// ```
#[proc_macro_attribute]
pub fn test(
    _attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut iter = item.to_token_iter();
    let expanded = match iter.parse::<TestFn>() {
        Ok(test_fn) => test_fn.expand(),
        Err(err) => compile_error(&format!(
            "#[xcontent_testhelpers::test] expects a function: {err:?}"
        )),
    };
    expanded.into()
}
