//! Shared schema and builders for the engine integration tests.
//!
//! The message family covers every field kind: explicit-presence scalars,
//! implicit-presence scalars, nested messages, all three repeated kinds, maps
//! with scalar and message values, a oneof and extensions.

#![allow(dead_code)]

use protomerge_model::{
    DescriptorPool, ExtensionDef, FieldDef, FieldValue, MapKeyType, Message, MessageDef,
    OneofCase, ScalarType, Syntax, ValueKind,
};
use std::sync::OnceLock;

pub const EXT_MORE: u32 = 103;
pub const EXT_TEXT: u32 = 104;
pub const EXT_NUMBER: u32 = 105;
pub const EXT_GREETINGS: u32 = 106;

pub const RED: i32 = 2;

pub const GO_TEST_REPEATED: [&str; 9] = [
    "f_bool_repeated",
    "f_int32_repeated",
    "f_int64_repeated",
    "f_uint32_repeated",
    "f_uint64_repeated",
    "f_float_repeated",
    "f_double_repeated",
    "f_string_repeated",
    "f_bytes_repeated",
];

fn schema() -> DescriptorPool {
    use ScalarType::*;

    DescriptorPool::builder()
        .add_message(
            MessageDef::new(
                "MyMessage",
                Syntax::Proto2,
                vec![
                    FieldDef::scalar("count", 1, Int32),
                    FieldDef::scalar("name", 2, String),
                    FieldDef::scalar("quote", 3, String),
                    FieldDef::repeated_scalar("pet", 4, String),
                    FieldDef::message("inner", 5, "InnerMessage"),
                    FieldDef::repeated_message("others", 6, "OtherMessage"),
                    FieldDef::scalar("bikeshed", 7, Enum),
                    FieldDef::message("somegroup", 8, "MyMessage.SomeGroup"),
                    FieldDef::repeated_bytes("rep_bytes", 10),
                    FieldDef::scalar("bigfloat", 11, Double),
                    FieldDef::repeated_message("rep_inner", 12, "InnerMessage"),
                ],
            )
            .with_extension_range(100, 536_870_911),
        )
        .add_message(MessageDef::new(
            "MyMessage.SomeGroup",
            Syntax::Proto2,
            vec![FieldDef::scalar("group_field", 9, Int32)],
        ))
        .add_message(MessageDef::new(
            "InnerMessage",
            Syntax::Proto2,
            vec![
                FieldDef::scalar("host", 1, String),
                FieldDef::scalar("port", 2, Int32),
                FieldDef::scalar("connected", 3, Bool),
            ],
        ))
        .add_message(
            MessageDef::new(
                "OtherMessage",
                Syntax::Proto2,
                vec![
                    FieldDef::scalar("key", 1, Int64),
                    FieldDef::bytes("value", 2),
                    FieldDef::scalar("weight", 3, Float),
                    FieldDef::message("inner", 4, "InnerMessage"),
                ],
            )
            .with_extension_range(100, 536_870_911),
        )
        .add_message(MessageDef::new(
            "Ext",
            Syntax::Proto2,
            vec![FieldDef::scalar("data", 1, String)],
        ))
        .add_message(MessageDef::new(
            "MessageWithMap",
            Syntax::Proto2,
            vec![
                FieldDef::map("name_mapping", 1, MapKeyType::Int32, ValueKind::Scalar(String)),
                FieldDef::map(
                    "msg_mapping",
                    2,
                    MapKeyType::Int64,
                    ValueKind::Message("FloatingPoint".into()),
                ),
                FieldDef::map("byte_mapping", 3, MapKeyType::Bool, ValueKind::Bytes),
                FieldDef::map("str_to_str", 4, MapKeyType::String, ValueKind::Scalar(String)),
            ],
        ))
        .add_message(MessageDef::new(
            "FloatingPoint",
            Syntax::Proto2,
            vec![
                FieldDef::scalar("f", 1, Double),
                FieldDef::scalar("exact", 2, Bool),
            ],
        ))
        .add_message(MessageDef::new(
            "proto3.Message",
            Syntax::Proto3,
            vec![
                FieldDef::scalar("name", 1, String),
                FieldDef::scalar("hilarity", 2, Enum),
                FieldDef::scalar("height_in_cm", 3, Uint32),
                FieldDef::bytes("data", 4),
                FieldDef::repeated_scalar("key", 5, Uint64),
                FieldDef::message("nested", 6, "proto3.Nested"),
                FieldDef::scalar("result_count", 7, Int64),
                FieldDef::scalar("true_scotsman", 8, Bool),
                FieldDef::scalar("score", 9, Float),
                FieldDef::map(
                    "terrain",
                    10,
                    MapKeyType::String,
                    ValueKind::Message("proto3.Nested".into()),
                ),
            ],
        ))
        .add_message(MessageDef::new(
            "proto3.Nested",
            Syntax::Proto3,
            vec![
                FieldDef::scalar("bunny", 1, String),
                FieldDef::scalar("cute", 2, Bool),
            ],
        ))
        .add_message(MessageDef::new(
            "Communique",
            Syntax::Proto2,
            vec![
                FieldDef::scalar("make_me_cry", 1, Bool),
                FieldDef::oneof(
                    "union",
                    vec![
                        OneofCase::new("number", 5, ValueKind::Scalar(Int32)),
                        OneofCase::new("name", 6, ValueKind::Scalar(String)),
                        OneofCase::new("data", 7, ValueKind::Bytes),
                        OneofCase::new("temp_c", 8, ValueKind::Scalar(Double)),
                        OneofCase::new("col", 9, ValueKind::Scalar(Enum)),
                        OneofCase::new("msg", 10, ValueKind::Message("Strings".into())),
                    ],
                ),
            ],
        ))
        .add_message(MessageDef::new(
            "Strings",
            Syntax::Proto2,
            vec![
                FieldDef::scalar("string_field", 1, String),
                FieldDef::bytes("bytes_field", 2),
            ],
        ))
        .add_message(MessageDef::new(
            "GoTest",
            Syntax::Proto2,
            vec![
                FieldDef::repeated_scalar("f_bool_repeated", 1, Bool),
                FieldDef::repeated_scalar("f_int32_repeated", 2, Int32),
                FieldDef::repeated_scalar("f_int64_repeated", 3, Int64),
                FieldDef::repeated_scalar("f_uint32_repeated", 4, Uint32),
                FieldDef::repeated_scalar("f_uint64_repeated", 5, Uint64),
                FieldDef::repeated_scalar("f_float_repeated", 6, Float),
                FieldDef::repeated_scalar("f_double_repeated", 7, Double),
                FieldDef::repeated_scalar("f_string_repeated", 8, String),
                FieldDef::repeated_bytes("f_bytes_repeated", 9),
            ],
        ))
        .add_extension(ExtensionDef::new(
            "MyMessage",
            FieldDef::message("more", EXT_MORE, "Ext"),
        ))
        .add_extension(ExtensionDef::new(
            "MyMessage",
            FieldDef::scalar("text", EXT_TEXT, String),
        ))
        .add_extension(ExtensionDef::new(
            "MyMessage",
            FieldDef::scalar("number", EXT_NUMBER, Int32),
        ))
        .add_extension(ExtensionDef::new(
            "MyMessage",
            FieldDef::repeated_scalar("greetings", EXT_GREETINGS, String),
        ))
        .build()
        .expect("test schema is valid")
}

/// The shared test pool, built once.
pub fn pool() -> &'static DescriptorPool {
    static POOL: OnceLock<DescriptorPool> = OnceLock::new();
    POOL.get_or_init(schema)
}

/// An empty message of a test type.
pub fn msg(type_name: &str) -> Message {
    pool().new_message(type_name).expect("type is registered")
}

/// Chainable setters for building fixtures.
pub trait Build: Sized {
    fn with(self, field: &str, value: impl Into<FieldValue>) -> Self;
    fn with_ext(self, number: u32, value: impl Into<FieldValue>) -> Self;
}

impl Build for Message {
    fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.set(field, value).expect("fixture value fits its field");
        self
    }

    fn with_ext(mut self, number: u32, value: impl Into<FieldValue>) -> Self {
        self.set_extension(number, value)
            .expect("fixture extension is registered");
        self
    }
}

pub fn inner(host: &str, port: i32, connected: bool) -> Message {
    msg("InnerMessage")
        .with("host", host)
        .with("port", port)
        .with("connected", connected)
}

/// The message family's kitchen-sink fixture: every kind of field plus an
/// extension holding a nested message.
pub fn clone_test_message() -> Message {
    msg("MyMessage")
        .with("count", 42)
        .with("name", "Dave")
        .with("pet", FieldValue::list(["bunny", "kitty", "horsey"]))
        .with("inner", inner("niles", 9099, true))
        .with(
            "others",
            FieldValue::list([msg("OtherMessage").with("value", b"some bytes")]),
        )
        .with("somegroup", msg("MyMessage.SomeGroup").with("group_field", 6))
        .with("rep_bytes", FieldValue::list([b"sham".to_vec(), b"wow".to_vec()]))
        .with_ext(EXT_MORE, msg("Ext").with("data", "extension"))
}

/// Installs a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
