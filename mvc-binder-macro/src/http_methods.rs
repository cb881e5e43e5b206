use proc_macro::TokenStream;
use quote::quote_spanned;
use syn::{parse_macro_input, ImplItemFn};

/// Verb attributes are consumed by `#[controller]`; reaching this expansion
/// means the method sits outside a controller impl block
pub fn http_method_attribute(verb: &str, _attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ImplItemFn);
    let message = format!(
        "#[{}] only takes effect inside an impl block marked #[controller]",
        verb
    );
    let span = input.sig.ident.span();

    TokenStream::from(quote_spanned! {span=>
        ::core::compile_error!(#message);
        #input
    })
}
