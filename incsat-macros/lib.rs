//! Internal macros for incsat

extern crate proc_macro;
extern crate proc_macro2;

use quote::quote;

/// Default implementation of [HeapSpace](../incsat_common/memory/trait.HeapSpace.html).
/// Use by adding `#[derive(HeapSpace)]` to your struct.
///
/// The heap space of a struct is the sum over its fields, so every field
/// must implement `HeapSpace`. Both named and tuple fields are supported.
#[proc_macro_derive(HeapSpace)]
pub fn heap_space(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast: syn::DeriveInput = syn::parse(input).unwrap();
    let type_name = ast.ident;
    let (impl_generics, type_generics, where_clause) = ast.generics.split_for_impl();
    let block = match ast.data {
        syn::Data::Struct(ref data_struct) => data_struct
            .fields
            .iter()
            .enumerate()
            .map(|(position, field)| match field.ident {
                Some(ref field_name) => quote!(self.#field_name.heap_space()),
                None => {
                    let index = syn::Index::from(position);
                    quote!(self.#index.heap_space())
                }
            })
            .fold(quote!(0), |a, b| quote!(#a + #b)),
        syn::Data::Enum(ref _data_enum) => panic!("not implemented for enums"),
        syn::Data::Union(ref _data_union) => panic!("not implemented for unions"),
    };
    let implementation = quote!(
        impl #impl_generics
        HeapSpace for #type_name #type_generics #where_clause {
            fn heap_space(&self) -> usize {
                #block
            }
        }
    );
    implementation.into()
}
