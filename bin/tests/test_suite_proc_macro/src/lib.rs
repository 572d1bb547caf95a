use quote::{format_ident, quote};
use syn::{parse_macro_input, LitStr};

/// Generates one `#[test]` per `.lox` file found below the given directory,
/// relative to the `tests/` directory of the crate. Each test hands the file's
/// contents to a `lox_expect` function that must be in scope.
#[proc_macro]
pub fn generate_tests(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let dir = parse_macro_input!(input as LitStr).value();
    let root_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join(&dir);

    let mut paths = walkdir::WalkDir::new(&root_dir)
        .into_iter()
        .flatten()
        .map(|entry| entry.into_path())
        .filter(|path| path.extension() == Some("lox".as_ref()))
        .collect::<Vec<_>>();
    paths.sort();

    let tests = paths.iter().map(|path| {
        let test_file_path = path.to_string_lossy();
        let relative_test_path = path.strip_prefix(&root_dir).unwrap().with_extension("");
        let name = relative_test_path
            .to_string_lossy()
            .replace(|c: char| !c.is_ascii_alphanumeric(), "_");
        let test_ident = format_ident!("{}_{}", dir, name);
        quote! {
            #[test]
            fn #test_ident() {
                lox_expect(std::fs::read_to_string(#test_file_path).unwrap().as_str());
            }
        }
    });

    quote! {
        #[ctor::ctor]
        fn init() {
            let _ = env_logger::builder().is_test(true).try_init();
        }

        #(#tests)*
    }
    .into()
}
