use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{DeriveInput, GenericArgument, PathArguments, Token, Type};

/// Contract name, declaration method, and whether the contract takes a type argument.
const CONTRACTS: &[(&str, &str, bool)] = &[
    ("EndpointName", "endpoint_name", false),
    ("TypesToScan", "types_to_scan", false),
    ("AssembliesToScan", "assemblies_to_scan", false),
    ("ProbeDirectory", "probe_directory", false),
    ("StartupAction", "startup_action", false),
    ("ContainerTypeToUse", "container_type", true),
    ("ContainerInstanceToUse", "container_instance", false),
    ("ToRun", "to_run", true),
    ("ToUseXmlSerialization", "xml_serialization", false),
    ("XmlSerializationNamespace", "xml_namespace", false),
    ("MyOwnSerialization", "my_own_serialization", false),
    ("MyOwnSagaPersistence", "my_own_saga_persistence", false),
    ("WantCustomInitialization", "custom_initialization", false),
    ("MyOwnLoggingConfiguration", "my_own_logging", false),
    ("LoggingLevel", "logging_level", false),
    ("MessageHandlerOrdering", "handler_ordering", false),
    ("ToUseNHibernateSubscriptionStorage", "nhibernate_subscription_storage", false),
];

pub fn expand(input: DeriveInput) -> TokenStream {
    let declarations = match collect_declarations(&input) {
        Ok(tokens) => tokens,
        Err(err) => return err.to_compile_error(),
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        #[automatically_derived]
        impl #impl_generics ::courier_kernel::capability::ConfigureThisEndpoint for #name #ty_generics #where_clause {
            fn create() -> Self {
                <Self as ::core::default::Default>::default()
            }

            #[allow(unused_variables)]
            fn declare(capabilities: &mut ::courier_kernel::capability::Capabilities<Self>) {
                #(#declarations)*
            }
        }
    }
}

fn collect_declarations(input: &DeriveInput) -> syn::Result<Vec<TokenStream>> {
    let mut declarations = Vec::new();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("endpoint")) {
        let listed = attr.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?;
        for ty in &listed {
            declarations.push(declaration(ty)?);
        }
    }
    Ok(declarations)
}

fn declaration(ty: &Type) -> syn::Result<TokenStream> {
    let Type::Path(path) = ty else {
        return Err(syn::Error::new_spanned(ty, "expected a capability contract name"));
    };
    let Some(segment) = path.path.segments.last() else {
        return Err(syn::Error::new_spanned(ty, "expected a capability contract name"));
    };

    let contract = segment.ident.to_string();
    let Some((_, method, generic)) = CONTRACTS.iter().find(|(name, ..)| *name == contract) else {
        return Err(syn::Error::new_spanned(
            &segment.ident,
            format!("unknown capability contract `{contract}`"),
        ));
    };
    let method = format_ident!("{}", method, span = segment.ident.span());

    let argument = match &segment.arguments {
        PathArguments::None => None,
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match &args.args[0] {
            GenericArgument::Type(arg) => Some(arg),
            other => {
                return Err(syn::Error::new_spanned(other, "expected a type argument"));
            },
        },
        other => return Err(syn::Error::new_spanned(other, "expected exactly one type argument")),
    };

    match (generic, argument) {
        (true, Some(arg)) => Ok(quote_spanned! { ty.span()=> capabilities.#method::<#arg>(); }),
        (false, None) => Ok(quote_spanned! { ty.span()=> capabilities.#method(); }),
        (true, None) => Err(syn::Error::new_spanned(
            ty,
            format!("`{contract}` needs a type argument, e.g. `{contract}<T>`"),
        )),
        (false, Some(arg)) => {
            Err(syn::Error::new_spanned(arg, format!("`{contract}` takes no type argument")))
        },
    }
}
