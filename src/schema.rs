//! The field descriptor model.
//!
//! A [`Schema`] is an ordered list of [`Field`] descriptors plus a
//! constructor for the aggregate the fields live in. It is the runtime
//! description the decode and encode engines interpret: each descriptor
//! carries the JSON key, the field kind, and a pair of typed accessors that
//! read or write the field through `dyn Any`, replacing any notion of byte
//! offsets with real field access.
//!
//! Schemas are almost always produced by the [`schema!`](crate::schema!)
//! macro, which generates the accessors from the struct's own field names
//! and implements [`Schematic`] so the engines can find the schema from the
//! type. Hand-building through [`Schema::of`] and the [`Field`] constructors
//! is possible and goes through the same consistency validation.
//!
//! ## Field kinds
//!
//! | kind      | Rust field type               | JSON form              |
//! |-----------|-------------------------------|------------------------|
//! | `char`    | `i8`                          | number                 |
//! | `short`   | `i16`                         | number                 |
//! | `int`     | `i32`                         | number                 |
//! | `long`    | `i64`                         | number                 |
//! | `float`   | `f32`                         | number                 |
//! | `double`  | `f64`                         | number                 |
//! | `bool`    | `bool`                        | true / false           |
//! | `string`  | `Option<String>`              | string, omitted if `None` |
//! | `json`    | `Option<String>`              | any value, kept as raw text |
//! | `nested`  | `Option<Box<C>>`              | object, omitted if `None` |
//! | `list`    | `NodeList<C>`                 | array, omitted if empty |
//! | `array`   | `[prim; N]` / `[Option<String>; N]` | array of fixed length |

use crate::list::NodeList;
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::OnceLock;

pub(crate) type Getter<V> = Box<dyn Fn(&dyn Any) -> V + Send + Sync>;
pub(crate) type Setter<V> = Box<dyn Fn(&mut dyn Any, V) + Send + Sync>;
pub(crate) type StrGetter = Box<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a str> + Send + Sync>;
pub(crate) type AnyGetter = Box<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync>;
pub(crate) type AnyTaker = Box<dyn Fn(&mut dyn Any) -> Option<Box<dyn Any>> + Send + Sync>;
pub(crate) type ListVisitor =
    Box<dyn for<'a> Fn(&'a dyn Any, &mut dyn FnMut(Option<&dyn Any>)) + Send + Sync>;
pub(crate) type Predicate = Box<dyn Fn(&dyn Any) -> bool + Send + Sync>;
pub(crate) type IdxGetter<V> = Box<dyn Fn(&dyn Any, usize) -> V + Send + Sync>;
pub(crate) type IdxSetter<V> = Box<dyn Fn(&mut dyn Any, usize, V) + Send + Sync>;
pub(crate) type IdxStrGetter =
    Box<dyn for<'a> Fn(&'a dyn Any, usize) -> Option<&'a str> + Send + Sync>;

/// Lazy reference to another aggregate's schema, so self-referential types
/// resolve without recursing during construction.
pub(crate) type SchemaRef = fn() -> &'static Schema;

/// Binds an aggregate type to its schema.
///
/// Implemented by the [`schema!`](crate::schema!) macro for user structs, and
/// by this crate for the scalar types (`i8` through `f64`, `bool`, `String`)
/// so they can be used directly as [`NodeList`] element types.
pub trait Schematic: Any + Default {
    /// The schema describing this type's JSON mapping.
    fn schema() -> &'static Schema;
}

fn cast<T: Any>(value: &dyn Any) -> &T {
    match value.downcast_ref::<T>() {
        Some(value) => value,
        None => panic!("value does not match the schema it is being accessed through"),
    }
}

fn cast_mut<T: Any>(value: &mut dyn Any) -> &mut T {
    match value.downcast_mut::<T>() {
        Some(value) => value,
        None => panic!("value does not match the schema it is being accessed through"),
    }
}

fn cast_box<T: Any>(value: Box<dyn Any>) -> Box<T> {
    match value.downcast::<T>() {
        Ok(value) => value,
        Err(_) => panic!("value does not match the schema it is being accessed through"),
    }
}

fn boxed_default<T: Any + Default>() -> Box<dyn Any> {
    Box::new(T::default())
}

/// One aggregate type's ordered JSON mapping.
pub struct Schema {
    name: &'static str,
    value_type: TypeId,
    pub(crate) new_boxed: fn() -> Box<dyn Any>,
    pub(crate) fields: Vec<Field>,
    index: IndexMap<&'static str, usize>,
    /// A single unkeyed field: the schema maps the JSON node itself rather
    /// than an object's keyed children.
    pub(crate) transparent: bool,
}

impl Schema {
    /// Starts a schema for `T`, which must supply the default (zeroed) value
    /// new aggregates are materialized from.
    #[must_use]
    pub fn of<T: Any + Default>(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            schema: Schema {
                name,
                value_type: TypeId::of::<T>(),
                new_boxed: boxed_default::<T>,
                fields: Vec::new(),
                index: IndexMap::new(),
                transparent: false,
            },
        }
    }

    /// The aggregate's name, as given to [`Schema::of`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of field descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema describes no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field descriptor by JSON key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.index.get(key).map(|&i| &self.fields[i])
    }

    /// The JSON keys in descriptor order, which is also encoded key order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter_map(Field::key)
    }

    /// Takes the nested aggregate stored under `key` out of `value`, leaving
    /// `None` behind, so the subtree can outlive its parent.
    ///
    /// Returns `None` when the key is unknown, names a non-nested field, the
    /// slot is empty, or `C` is not the field's element type.
    pub fn detach<C: Schematic>(&self, value: &mut dyn Any, key: &str) -> Option<Box<C>> {
        match &self.field(key)?.kind {
            FieldKind::Nested { take, .. } => take(value).and_then(|sub| sub.downcast::<C>().ok()),
            _ => None,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Accumulates field descriptors for a [`Schema`] and validates the result.
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Adds the next field descriptor. Order here is the order keys appear
    /// in encoded output.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.schema.fields.push(field);
        self
    }

    /// Validates the descriptor list and produces the schema.
    ///
    /// # Panics
    ///
    /// Panics on an inconsistent descriptor list: a field built for a
    /// different value type than the schema's, a duplicate JSON key, or an
    /// unkeyed field that is not the schema's only field. These are
    /// construction bugs, not runtime conditions.
    #[must_use]
    pub fn finish(mut self) -> Schema {
        let mut unkeyed = 0usize;
        for (position, field) in self.schema.fields.iter().enumerate() {
            if field.owner != self.schema.value_type {
                panic!(
                    "schema `{}`: field `{}` was built for a different value type",
                    self.schema.name,
                    field.label()
                );
            }
            match field.key {
                Some(key) => {
                    if self.schema.index.insert(key, position).is_some() {
                        panic!("schema `{}`: duplicate key `{}`", self.schema.name, key);
                    }
                }
                None => unkeyed += 1,
            }
        }
        if unkeyed > 0 && self.schema.fields.len() != 1 {
            panic!(
                "schema `{}`: a self-describing field must be the only field",
                self.schema.name
            );
        }
        self.schema.transparent = unkeyed == 1;
        self.schema
    }
}

/// One field descriptor: a JSON key plus the kind-specific accessors.
pub struct Field {
    pub(crate) key: Option<&'static str>,
    owner: TypeId,
    pub(crate) kind: FieldKind,
}

impl Field {
    /// The JSON key, or `None` for a self-describing descriptor.
    #[must_use]
    pub fn key(&self) -> Option<&'static str> {
        self.key
    }

    pub(crate) fn label(&self) -> &'static str {
        self.key.unwrap_or("<value>")
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("kind", &self.kind.name())
            .finish()
    }
}

pub(crate) enum FieldKind {
    Char { get: Getter<i8>, set: Setter<i8> },
    Short { get: Getter<i16>, set: Setter<i16> },
    Int { get: Getter<i32>, set: Setter<i32> },
    Long { get: Getter<i64>, set: Setter<i64> },
    Float { get: Getter<f32>, set: Setter<f32> },
    Double { get: Getter<f64>, set: Setter<f64> },
    Bool { get: Getter<bool>, set: Setter<bool> },
    String { get: StrGetter, set: Setter<Option<String>> },
    Json { get: StrGetter, set: Setter<Option<String>> },
    Nested {
        schema: SchemaRef,
        get: AnyGetter,
        set: Setter<Option<Box<dyn Any>>>,
        take: AnyTaker,
    },
    List {
        schema: SchemaRef,
        append: Setter<Option<Box<dyn Any>>>,
        visit: ListVisitor,
        is_empty: Predicate,
    },
    Array(ArrayAccess),
}

impl FieldKind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            FieldKind::Char { .. } => "char",
            FieldKind::Short { .. } => "short",
            FieldKind::Int { .. } => "int",
            FieldKind::Long { .. } => "long",
            FieldKind::Float { .. } => "float",
            FieldKind::Double { .. } => "double",
            FieldKind::Bool { .. } => "bool",
            FieldKind::String { .. } => "string",
            FieldKind::Json { .. } => "json",
            FieldKind::Nested { .. } => "nested",
            FieldKind::List { .. } => "list",
            FieldKind::Array(_) => "array",
        }
    }
}

/// Per-element accessors for a fixed-size array field. Integer and floating
/// elements travel widened (`i64` / `f64`) and narrow at the accessor edge;
/// the stride is the element type's own, not a pointer's.
pub(crate) enum ArrayAccess {
    Integer {
        len: usize,
        get: IdxGetter<i64>,
        set: IdxSetter<i64>,
    },
    Floating {
        len: usize,
        get: IdxGetter<f64>,
        set: IdxSetter<f64>,
    },
    String {
        len: usize,
        get: IdxStrGetter,
        set: IdxSetter<Option<String>>,
    },
}

macro_rules! scalar_field_ctor {
    ($(#[$doc:meta])* $fn_name:ident, $variant:ident, $prim:ty) => {
        $(#[$doc])*
        #[must_use]
        pub fn $fn_name<T: Any>(
            key: &'static str,
            get: fn(&T) -> $prim,
            set: fn(&mut T, $prim),
        ) -> Field {
            Field {
                key: Some(key),
                owner: TypeId::of::<T>(),
                kind: FieldKind::$variant {
                    get: Box::new(move |value| get(cast::<T>(value))),
                    set: Box::new(move |value, x| set(cast_mut::<T>(value), x)),
                },
            }
        }
    };
}

macro_rules! integer_array_ctor {
    ($(#[$doc:meta])* $fn_name:ident, $prim:ty) => {
        $(#[$doc])*
        #[must_use]
        pub fn $fn_name<T: Any, const N: usize>(
            key: &'static str,
            get: fn(&T) -> &[$prim; N],
            get_mut: fn(&mut T) -> &mut [$prim; N],
        ) -> Field {
            Field {
                key: Some(key),
                owner: TypeId::of::<T>(),
                kind: FieldKind::Array(ArrayAccess::Integer {
                    len: N,
                    get: Box::new(move |value, i| get(cast::<T>(value))[i] as i64),
                    set: Box::new(move |value, i, x| get_mut(cast_mut::<T>(value))[i] = x as $prim),
                }),
            }
        }
    };
}

macro_rules! floating_array_ctor {
    ($(#[$doc:meta])* $fn_name:ident, $prim:ty) => {
        $(#[$doc])*
        #[must_use]
        pub fn $fn_name<T: Any, const N: usize>(
            key: &'static str,
            get: fn(&T) -> &[$prim; N],
            get_mut: fn(&mut T) -> &mut [$prim; N],
        ) -> Field {
            Field {
                key: Some(key),
                owner: TypeId::of::<T>(),
                kind: FieldKind::Array(ArrayAccess::Floating {
                    len: N,
                    get: Box::new(move |value, i| f64::from(get(cast::<T>(value))[i])),
                    set: Box::new(move |value, i, x| get_mut(cast_mut::<T>(value))[i] = x as $prim),
                }),
            }
        }
    };
}

impl Field {
    scalar_field_ctor!(
        /// Descriptor for an `i8` field.
        char, Char, i8
    );
    scalar_field_ctor!(
        /// Descriptor for an `i16` field.
        short, Short, i16
    );
    scalar_field_ctor!(
        /// Descriptor for an `i32` field.
        int, Int, i32
    );
    scalar_field_ctor!(
        /// Descriptor for an `i64` field.
        long, Long, i64
    );
    scalar_field_ctor!(
        /// Descriptor for an `f32` field.
        float, Float, f32
    );
    scalar_field_ctor!(
        /// Descriptor for an `f64` field.
        double, Double, f64
    );
    scalar_field_ctor!(
        /// Descriptor for a `bool` field.
        boolean, Bool, bool
    );

    /// Descriptor for an `Option<String>` field. Absent or wrong-typed JSON
    /// decodes to `None`; a `None` value is omitted from encoded output.
    #[must_use]
    pub fn string<T: Any>(
        key: &'static str,
        get: fn(&T) -> Option<&str>,
        set: fn(&mut T, Option<String>),
    ) -> Field {
        Field {
            key: Some(key),
            owner: TypeId::of::<T>(),
            kind: FieldKind::String {
                get: Box::new(move |value| get(cast::<T>(value))),
                set: Box::new(move |value, x| set(cast_mut::<T>(value), x)),
            },
        }
    }

    /// Descriptor for an `Option<String>` field holding raw JSON text.
    ///
    /// Decoding re-renders the keyed subtree to compact text verbatim so its
    /// typed decoding can be deferred; encoding parses the stored text back
    /// into a tree before attaching it.
    #[must_use]
    pub fn json<T: Any>(
        key: &'static str,
        get: fn(&T) -> Option<&str>,
        set: fn(&mut T, Option<String>),
    ) -> Field {
        Field {
            key: Some(key),
            owner: TypeId::of::<T>(),
            kind: FieldKind::Json {
                get: Box::new(move |value| get(cast::<T>(value))),
                set: Box::new(move |value, x| set(cast_mut::<T>(value), x)),
            },
        }
    }

    /// Descriptor for an `Option<Box<C>>` field holding a nested aggregate.
    #[must_use]
    pub fn nested<T: Any, C: Schematic>(
        key: &'static str,
        get: fn(&T) -> Option<&C>,
        set: fn(&mut T, Option<Box<C>>),
        take: fn(&mut T) -> Option<Box<C>>,
    ) -> Field {
        Field {
            key: Some(key),
            owner: TypeId::of::<T>(),
            kind: FieldKind::Nested {
                schema: C::schema,
                get: Box::new(move |value| get(cast::<T>(value)).map(|sub| sub as &dyn Any)),
                set: Box::new(move |value, sub: Option<Box<dyn Any>>| {
                    set(cast_mut::<T>(value), sub.map(cast_box::<C>))
                }),
                take: Box::new(move |value| {
                    take(cast_mut::<T>(value)).map(|sub| sub as Box<dyn Any>)
                }),
            },
        }
    }

    /// Descriptor for a [`NodeList<C>`] field.
    #[must_use]
    pub fn list<T: Any, C: Schematic>(
        key: &'static str,
        get: fn(&T) -> &NodeList<C>,
        get_mut: fn(&mut T) -> &mut NodeList<C>,
    ) -> Field {
        Field {
            key: Some(key),
            owner: TypeId::of::<T>(),
            kind: FieldKind::List {
                schema: C::schema,
                append: Box::new(move |value, payload: Option<Box<dyn Any>>| {
                    get_mut(cast_mut::<T>(value)).append(payload.map(cast_box::<C>));
                }),
                visit: Box::new(move |value, f| {
                    for payload in get(cast::<T>(value)).iter() {
                        f(payload.map(|element| element as &dyn Any));
                    }
                }),
                is_empty: Box::new(move |value| get(cast::<T>(value)).is_empty()),
            },
        }
    }

    integer_array_ctor!(
        /// Descriptor for an `[i8; N]` field.
        char_array, i8
    );
    integer_array_ctor!(
        /// Descriptor for an `[i16; N]` field.
        short_array, i16
    );
    integer_array_ctor!(
        /// Descriptor for an `[i32; N]` field.
        int_array, i32
    );
    integer_array_ctor!(
        /// Descriptor for an `[i64; N]` field.
        long_array, i64
    );
    floating_array_ctor!(
        /// Descriptor for an `[f32; N]` field.
        float_array, f32
    );
    floating_array_ctor!(
        /// Descriptor for an `[f64; N]` field.
        double_array, f64
    );

    /// Descriptor for an `[Option<String>; N]` field. Elements past the JSON
    /// array's length stay `None`; a `None` element encodes as JSON null to
    /// keep indices aligned.
    #[must_use]
    pub fn string_array<T: Any, const N: usize>(
        key: &'static str,
        get: fn(&T) -> &[Option<String>; N],
        get_mut: fn(&mut T) -> &mut [Option<String>; N],
    ) -> Field {
        Field {
            key: Some(key),
            owner: TypeId::of::<T>(),
            kind: FieldKind::Array(ArrayAccess::String {
                len: N,
                get: Box::new(move |value, i| get(cast::<T>(value))[i].as_deref()),
                set: Box::new(move |value, i, x| get_mut(cast_mut::<T>(value))[i] = x),
            }),
        }
    }
}

// Scalar types double as list elements: each gets a transparent schema whose
// single unkeyed descriptor reads and writes the value itself, so
// `NodeList<i32>` or `NodeList<String>` fields go through the same engine
// path as lists of aggregates.
macro_rules! scalar_schema {
    ($prim:ty, $name:literal, $variant:ident) => {
        impl Schematic for $prim {
            fn schema() -> &'static Schema {
                static SCHEMA: OnceLock<Schema> = OnceLock::new();
                SCHEMA.get_or_init(|| {
                    Schema::of::<$prim>($name)
                        .field(Field {
                            key: None,
                            owner: TypeId::of::<$prim>(),
                            kind: FieldKind::$variant {
                                get: Box::new(|value| *cast::<$prim>(value)),
                                set: Box::new(|value, x| *cast_mut::<$prim>(value) = x),
                            },
                        })
                        .finish()
                })
            }
        }
    };
}

scalar_schema!(i8, "i8", Char);
scalar_schema!(i16, "i16", Short);
scalar_schema!(i32, "i32", Int);
scalar_schema!(i64, "i64", Long);
scalar_schema!(f32, "f32", Float);
scalar_schema!(f64, "f64", Double);
scalar_schema!(bool, "bool", Bool);

impl Schematic for String {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::of::<String>("String")
                .field(Field {
                    key: None,
                    owner: TypeId::of::<String>(),
                    kind: FieldKind::String {
                        get: Box::new(|value| Some(cast::<String>(value).as_str())),
                        set: Box::new(|value, x| *cast_mut::<String>(value) = x.unwrap_or_default()),
                    },
                })
                .finish()
        })
    }
}
