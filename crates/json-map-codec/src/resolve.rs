//! Static codec selection for built-in types.

use serde_json::Value;

use crate::adapters::OptionCodec;
use crate::codec::TypeCodec;
use crate::primitives::{
    BoolAsStringCodec, BoolCodec, FloatCodec, IntCodec, StringCodec, ValueCodec,
};

/// Types with a general-purpose codec.
pub trait DefaultCodec: Sized {
    type Codec: TypeCodec<Self> + Default;
}

/// Types usable as map keys, with the codec used for them in key position.
///
/// Keys normally use their [`DefaultCodec`]. Booleans are the exception:
/// they are coded as `"true"`/`"false"` strings so that a boolean key is
/// always a valid object member name and reads back from one.
pub trait MapKey: Sized {
    type KeyCodec: TypeCodec<Self> + Default;
}

impl DefaultCodec for String {
    type Codec = StringCodec;
}

impl DefaultCodec for bool {
    type Codec = BoolCodec;
}

impl DefaultCodec for f32 {
    type Codec = FloatCodec;
}

impl DefaultCodec for f64 {
    type Codec = FloatCodec;
}

impl DefaultCodec for Value {
    type Codec = ValueCodec;
}

impl<T: DefaultCodec> DefaultCodec for Option<T> {
    type Codec = OptionCodec<T::Codec>;
}

impl MapKey for String {
    type KeyCodec = StringCodec;
}

impl MapKey for bool {
    type KeyCodec = BoolAsStringCodec;
}

macro_rules! integer_codecs {
    ($($ty:ty),*) => {$(
        impl DefaultCodec for $ty {
            type Codec = IntCodec;
        }

        impl MapKey for $ty {
            type KeyCodec = IntCodec;
        }
    )*};
}

integer_codecs!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
