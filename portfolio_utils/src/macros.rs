/// Panic unless `$expr` matches `$pat` (and the optional guard holds).
///
/// The value is printed with [`Debug`] on failure.
#[macro_export]
macro_rules! assert_matches {
    ($expr:expr, $pat:pat $(if $guard:expr)? $(,)?) => {
        match $expr {
            $pat $(if $guard)? => {}
            ref value => ::core::panic!(
                "{:?} does not match `{}`",
                value,
                ::core::stringify!($pat $(if $guard)?),
            ),
        }
    };
}
