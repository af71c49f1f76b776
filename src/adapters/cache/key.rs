//! Cache keys built from argument tuples.
//!
//! In untyped mode arguments that compare equal as numbers share a key:
//! `3_i64`, `3.0_f64` and `true`/`1` collapse to the same part. Typed mode
//! tags every part with its Rust type name so they stay distinct.

use std::any::type_name;
use std::path::{Path, PathBuf};

/// One normalized argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Unit,
    Int(i128),
    /// Raw bits of a non-integral float
    Float(u64),
    Str(String),
    Typed(&'static str, Box<KeyPart>),
}

/// Hashable key for one call's arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<KeyPart>);

impl CacheKey {
    pub fn from_args(args: &[&dyn CacheArg], typed: bool) -> Self {
        let parts = args
            .iter()
            .map(|arg| {
                let part = arg.key_part();
                if typed {
                    KeyPart::Typed(arg.type_tag(), Box::new(part))
                } else {
                    part
                }
            })
            .collect();
        Self(parts)
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

/// A single value usable as a cached-function argument
pub trait CacheArg {
    fn key_part(&self) -> KeyPart;

    fn type_tag(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// An argument tuple usable as a cache key
pub trait CacheArgs {
    fn cache_key(&self, typed: bool) -> CacheKey;
}

#[allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
fn float_part(value: f64) -> KeyPart {
    // i128 covers every integral f64 below 2^127
    if value.is_finite() && value.trunc() == value && value.abs() < 1.0e38 {
        KeyPart::Int(value as i128)
    } else {
        KeyPart::Float(value.to_bits())
    }
}

macro_rules! impl_int_arg {
    ($($t:ty),*) => {
        $(
            impl CacheArg for $t {
                fn key_part(&self) -> KeyPart {
                    KeyPart::Int(i128::from(*self))
                }
            }
        )*
    };
}

impl_int_arg!(i8, i16, i32, i64, u8, u16, u32, u64);

impl CacheArg for usize {
    fn key_part(&self) -> KeyPart {
        KeyPart::Int(*self as i128)
    }
}

impl CacheArg for isize {
    fn key_part(&self) -> KeyPart {
        KeyPart::Int(*self as i128)
    }
}

impl CacheArg for bool {
    fn key_part(&self) -> KeyPart {
        KeyPart::Int(i128::from(*self))
    }
}

impl CacheArg for f64 {
    fn key_part(&self) -> KeyPart {
        float_part(*self)
    }
}

impl CacheArg for f32 {
    fn key_part(&self) -> KeyPart {
        float_part(f64::from(*self))
    }
}

// Owned and borrowed forms share a tag so typed keys do not depend on
// ownership.
const TEXT_TAG: &str = "str";
const PATH_TAG: &str = "path";

impl CacheArg for str {
    fn key_part(&self) -> KeyPart {
        KeyPart::Str(self.to_string())
    }

    fn type_tag(&self) -> &'static str {
        TEXT_TAG
    }
}

impl CacheArg for String {
    fn key_part(&self) -> KeyPart {
        KeyPart::Str(self.clone())
    }

    fn type_tag(&self) -> &'static str {
        TEXT_TAG
    }
}

impl CacheArg for Path {
    fn key_part(&self) -> KeyPart {
        KeyPart::Str(self.to_string_lossy().into_owned())
    }

    fn type_tag(&self) -> &'static str {
        PATH_TAG
    }
}

impl CacheArg for PathBuf {
    fn key_part(&self) -> KeyPart {
        self.as_path().key_part()
    }

    fn type_tag(&self) -> &'static str {
        PATH_TAG
    }
}

impl CacheArg for () {
    fn key_part(&self) -> KeyPart {
        KeyPart::Unit
    }
}

impl<T: CacheArg> CacheArg for Option<T> {
    fn key_part(&self) -> KeyPart {
        self.as_ref().map_or(KeyPart::Unit, CacheArg::key_part)
    }
}

impl<T: CacheArg + ?Sized> CacheArg for &T {
    fn key_part(&self) -> KeyPart {
        (**self).key_part()
    }

    fn type_tag(&self) -> &'static str {
        (**self).type_tag()
    }
}

impl CacheArgs for () {
    fn cache_key(&self, typed: bool) -> CacheKey {
        CacheKey::from_args(&[], typed)
    }
}

macro_rules! impl_cache_args {
    ($($name:ident),+) => {
        impl<$($name: CacheArg),+> CacheArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn cache_key(&self, typed: bool) -> CacheKey {
                let ($($name,)+) = self;
                CacheKey::from_args(&[$($name as &dyn CacheArg),+], typed)
            }
        }
    };
}

impl_cache_args!(A);
impl_cache_args!(A, B);
impl_cache_args!(A, B, C);
impl_cache_args!(A, B, C, D);
impl_cache_args!(A, B, C, D, E);
impl_cache_args!(A, B, C, D, E, F);
