use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, punctuated::Punctuated, Attribute,
    Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Token, Visibility,
};

/// Verb attribute names and the matching `Verb` variants
const VERBS: &[(&str, &str)] = &[
    ("get", "Get"),
    ("post", "Post"),
    ("put", "Put"),
    ("delete", "Delete"),
    ("patch", "Patch"),
    ("head", "Head"),
    ("options", "Options"),
    ("trace", "Trace"),
    ("any", "Any"),
];

const HOOKS: &[&str] = &["before_activation", "after_activation"];

struct ControllerArgs {
    fields: Vec<Ident>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut fields = Vec::new();
        while !input.is_empty() {
            let name: Ident = input.parse()?;
            if name == "fields" {
                let content;
                syn::parenthesized!(content in input);
                let list = Punctuated::<Ident, Token![,]>::parse_terminated(&content)?;
                fields.extend(list);
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    "unknown controller option, expected `fields(..)`",
                ));
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(ControllerArgs { fields })
    }
}

/// A method routed by an explicit verb attribute
struct ExplicitRoute {
    variant: Ident,
    path: String,
    fn_name: Ident,
}

pub fn controller_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let input = parse_macro_input!(item as ItemImpl);
    match generate_controller_impl(args, input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn generate_controller_impl(args: ControllerArgs, mut input: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[controller] goes on an inherent impl block",
        ));
    }

    let mut conventional: Vec<Ident> = Vec::new();
    let mut explicit: Vec<ExplicitRoute> = Vec::new();
    let mut hooks: Vec<ImplItemFn> = Vec::new();
    let mut kept: Vec<ImplItem> = Vec::new();

    for item in std::mem::take(&mut input.items) {
        let mut method = match item {
            ImplItem::Fn(method) => method,
            other => {
                kept.push(other);
                continue;
            }
        };
        let name = method.sig.ident.to_string();

        if HOOKS.contains(&name.as_str()) {
            method.vis = Visibility::Inherited;
            hooks.push(method);
            continue;
        }

        let mut verb_attr = None;
        let mut attrs = Vec::with_capacity(method.attrs.len());
        for attr in method.attrs.drain(..) {
            match verb_of(&attr) {
                Some(variant) => {
                    if verb_attr.is_some() {
                        return Err(syn::Error::new_spanned(
                            &attr,
                            "a handler takes at most one verb attribute",
                        ));
                    }
                    verb_attr = Some((variant, route_path(&attr)?));
                }
                None => attrs.push(attr),
            }
        }
        method.attrs = attrs;

        let has_receiver = method.sig.receiver().is_some();
        match verb_attr {
            Some((variant, path)) => {
                if !has_receiver {
                    return Err(syn::Error::new_spanned(
                        &method.sig,
                        "a handler must take `&self` or `self`",
                    ));
                }
                explicit.push(ExplicitRoute {
                    variant,
                    path,
                    fn_name: method.sig.ident.clone(),
                });
            }
            None => {
                if is_conventional(&method) {
                    conventional.push(method.sig.ident.clone());
                }
            }
        }
        kept.push(ImplItem::Fn(method));
    }
    input.items = kept;

    let field_registrations = args.fields.iter().map(|field| {
        let name = field.to_string();
        quote! { descriptor.field(#name, |controller| &mut controller.#field); }
    });

    let method_registrations = conventional.iter().map(|fn_name| {
        let name = fn_name.to_string();
        quote! { descriptor.method(#name, Self::#fn_name); }
    });

    let handle_registrations = explicit.iter().map(|route| {
        let ExplicitRoute {
            variant,
            path,
            fn_name,
        } = route;
        let name = fn_name.to_string();
        quote! {
            descriptor.handle(::mvc_binder::Verb::#variant, #path, #name, Self::#fn_name);
        }
    });

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::mvc_binder::Controller for #self_ty #where_clause {
            #[allow(unused_variables)]
            fn describe(descriptor: &mut ::mvc_binder::Descriptor<Self>) {
                #(#field_registrations)*
                #(#method_registrations)*
                #(#handle_registrations)*
            }

            #(#hooks)*
        }
    })
}

fn verb_of(attr: &Attribute) -> Option<Ident> {
    let ident = attr.path().get_ident()?;
    VERBS
        .iter()
        .find(|(name, _)| ident == name)
        .map(|(_, variant)| format_ident!("{}", variant))
}

/// `#[get("/path")]` yields the literal; a bare `#[get]` routes the root
fn route_path(attr: &Attribute) -> syn::Result<String> {
    match &attr.meta {
        syn::Meta::Path(_) => Ok("/".to_string()),
        _ => Ok(attr.parse_args::<LitStr>()?.value()),
    }
}

/// Public, non-generic methods with a receiver whose first word is a verb
fn is_conventional(method: &ImplItemFn) -> bool {
    if !matches!(method.vis, Visibility::Public(_)) || method.sig.receiver().is_none() {
        return false;
    }
    if method.sig.generics.type_params().next().is_some() {
        return false;
    }
    let name = method.sig.ident.to_string();
    let first = name.split('_').next().unwrap_or_default();
    VERBS.iter().any(|(verb, _)| *verb == first)
}
