use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Time a function when the `perf_stats` feature is enabled.
///
/// The function body is wrapped with a drop guard that logs the elapsed time
/// through `tracing::info!` once the function returns. Without the feature the
/// attribute expands to the untouched function.
///
/// # Features
/// - Auto-detects a `kind: FunctionKind` parameter and includes it in the log line
/// - Logs only when the duration exceeds the threshold (default 1ms)
///
/// # Example
/// ```ignore
/// #[profile]
/// pub fn run_sweep(kind: FunctionKind, config: &ReportConfig) -> AccuracyReport {
///     // ... work ...
/// }
/// ```
///
/// # Optional Parameters
/// ```ignore
/// #[profile(0)]  // Custom threshold in milliseconds
/// fn generate() -> LookupTables { ... }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().trim().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    // Look for `kind: FunctionKind` so sweeps over different functions log separately
    let has_kind_param = sig.inputs.iter().any(|arg| {
        if let FnArg::Typed(pat_type) = arg {
            if let Pat::Ident(pat_ident) = &*pat_type.pat {
                if pat_ident.ident == "kind" {
                    let ty = &pat_type.ty;
                    let type_str = quote!(#ty).to_string();
                    return type_str.contains("FunctionKind");
                }
            }
        }
        false
    });

    let label = if has_kind_param {
        quote! { format!("{}({:?})", #fn_name_str, kind) }
    } else {
        quote! { String::from(#fn_name_str) }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct ProfileGuard {
                    label: String,
                    start: std::time::Instant,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_millis() >= #threshold_ms {
                            ::tracing::info!("[PERF] {}: {:?}", self.label, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    label: #label,
                    start: std::time::Instant::now(),
                }
            };

            #block
        }
    };

    output.into()
}
