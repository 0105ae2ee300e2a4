/// Implements [`Schematic`](crate::Schematic) for a struct from an ordered
/// field list, generating the typed accessors each descriptor needs.
///
/// Each entry is `field_name: kind`, where the kind is one of `char`,
/// `short`, `int`, `long`, `float`, `double`, `bool`, `string`, `json`,
/// `nested(Type)`, `list(Type)`, or `array(kind, len)` with a scalar or
/// `string` element kind. The JSON key defaults to the field name; append
/// `as "key"` to rename it. Fields not listed are left alone by both
/// engines.
///
/// The struct must implement `Default`, which supplies the value every
/// decode starts from.
///
/// # Examples
///
/// ```rust
/// use structon::{schema, NodeList};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Project {
///     id: i32,
///     name: Option<String>,
/// }
///
/// schema! {
///     Project {
///         id: int,
///         name: string,
///     }
/// }
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Hub {
///     id: i32,
///     user: Option<String>,
///     project: Option<Box<Project>>,
///     stars: NodeList<i64>,
/// }
///
/// schema! {
///     Hub {
///         id: int,
///         user: string,
///         project: nested(Project) as "proj",
///         stars: list(i64),
///     }
/// }
///
/// let hub = structon::from_str::<Hub>(
///     r#"{"id": 1, "user": "ada", "proj": {"id": 2, "name": "core"}}"#,
/// )
/// .unwrap()
/// .unwrap();
/// assert_eq!(hub.project.as_ref().unwrap().name.as_deref(), Some("core"));
/// ```
#[macro_export]
macro_rules! schema {
    ($ty:ident { $( $field:ident : $kind:ident $(( $($param:tt)* ))? $(as $key:literal)? ),+ $(,)? }) => {
        impl $crate::Schematic for $ty {
            fn schema() -> &'static $crate::Schema {
                static SCHEMA: ::std::sync::OnceLock<$crate::Schema> = ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::Schema::of::<$ty>(::core::stringify!($ty))
                        $( .field($crate::schema!(@field $ty, $field,
                            ($crate::schema!(@key $field $(, $key)?)),
                            $kind $(( $($param)* ))?)) )+
                        .finish()
                })
            }
        }
    };

    (@key $field:ident) => {
        ::core::stringify!($field)
    };
    (@key $field:ident, $key:literal) => {
        $key
    };

    (@field $ty:ident, $field:ident, ($key:expr), char) => {
        $crate::Field::char::<$ty>($key, |v| v.$field, |v, x| v.$field = x)
    };
    (@field $ty:ident, $field:ident, ($key:expr), short) => {
        $crate::Field::short::<$ty>($key, |v| v.$field, |v, x| v.$field = x)
    };
    (@field $ty:ident, $field:ident, ($key:expr), int) => {
        $crate::Field::int::<$ty>($key, |v| v.$field, |v, x| v.$field = x)
    };
    (@field $ty:ident, $field:ident, ($key:expr), long) => {
        $crate::Field::long::<$ty>($key, |v| v.$field, |v, x| v.$field = x)
    };
    (@field $ty:ident, $field:ident, ($key:expr), float) => {
        $crate::Field::float::<$ty>($key, |v| v.$field, |v, x| v.$field = x)
    };
    (@field $ty:ident, $field:ident, ($key:expr), double) => {
        $crate::Field::double::<$ty>($key, |v| v.$field, |v, x| v.$field = x)
    };
    (@field $ty:ident, $field:ident, ($key:expr), bool) => {
        $crate::Field::boolean::<$ty>($key, |v| v.$field, |v, x| v.$field = x)
    };
    (@field $ty:ident, $field:ident, ($key:expr), string) => {
        $crate::Field::string::<$ty>($key, |v| v.$field.as_deref(), |v, x| v.$field = x)
    };
    (@field $ty:ident, $field:ident, ($key:expr), json) => {
        $crate::Field::json::<$ty>($key, |v| v.$field.as_deref(), |v, x| v.$field = x)
    };
    (@field $ty:ident, $field:ident, ($key:expr), nested($sub:ty)) => {
        $crate::Field::nested::<$ty, $sub>(
            $key,
            |v| v.$field.as_deref(),
            |v, x| v.$field = x,
            |v| v.$field.take(),
        )
    };
    (@field $ty:ident, $field:ident, ($key:expr), list($sub:ty)) => {
        $crate::Field::list::<$ty, $sub>($key, |v| &v.$field, |v| &mut v.$field)
    };
    (@field $ty:ident, $field:ident, ($key:expr), array(char, $len:literal)) => {
        $crate::Field::char_array::<$ty, $len>($key, |v| &v.$field, |v| &mut v.$field)
    };
    (@field $ty:ident, $field:ident, ($key:expr), array(short, $len:literal)) => {
        $crate::Field::short_array::<$ty, $len>($key, |v| &v.$field, |v| &mut v.$field)
    };
    (@field $ty:ident, $field:ident, ($key:expr), array(int, $len:literal)) => {
        $crate::Field::int_array::<$ty, $len>($key, |v| &v.$field, |v| &mut v.$field)
    };
    (@field $ty:ident, $field:ident, ($key:expr), array(long, $len:literal)) => {
        $crate::Field::long_array::<$ty, $len>($key, |v| &v.$field, |v| &mut v.$field)
    };
    (@field $ty:ident, $field:ident, ($key:expr), array(float, $len:literal)) => {
        $crate::Field::float_array::<$ty, $len>($key, |v| &v.$field, |v| &mut v.$field)
    };
    (@field $ty:ident, $field:ident, ($key:expr), array(double, $len:literal)) => {
        $crate::Field::double_array::<$ty, $len>($key, |v| &v.$field, |v| &mut v.$field)
    };
    (@field $ty:ident, $field:ident, ($key:expr), array(string, $len:literal)) => {
        $crate::Field::string_array::<$ty, $len>($key, |v| &v.$field, |v| &mut v.$field)
    };
}
