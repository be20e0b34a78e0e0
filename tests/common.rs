use protowire::{
    avec::{
        BindError, Error, FieldDescriptor, FieldError, Message, Oneof, Slot, Variant,
        decode_slice, oneof_group,
        schema::{Annotation, AnnotationError, Entry, Schema, SchemaError},
    },
    sans::{
        scalar::Scalar,
        tag::FieldNumber,
        types::{LogicalType, WireType},
    },
};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum Corpus {
    #[default]
    Universal,
    Web,
    Images,
    Unrecognised(i32),
}

impl Slot for Corpus {
    fn put_scalar(&mut self, value: Scalar) -> Result<(), BindError> {
        let Scalar::I32(v) = value else {
            return Err(BindError::UnsupportedScalarType {
                found: value.kind(),
                into: "Corpus",
            });
        };

        *self = match v {
            0 => Self::Universal,
            1 => Self::Web,
            2 => Self::Images,
            v => Self::Unrecognised(v),
        };

        Ok(())
    }
}

#[derive(Debug, PartialEq)]
enum Shape {
    Radius(f64),
    Label(String),
}

impl Oneof for Shape {
    fn variants() -> Vec<Variant<Self>> {
        vec![
            Variant::new(
                "Radius",
                "4,1,double,oneof",
                || Shape::Radius(0.0),
                |o| match o {
                    Shape::Radius(v) => Some(v as &mut dyn Slot),
                    _ => None,
                },
            ),
            Variant::new(
                "Label",
                "5,2,string,oneof",
                || Shape::Label(String::new()),
                |o| match o {
                    Shape::Label(v) => Some(v as &mut dyn Slot),
                    _ => None,
                },
            ),
        ]
    }
}

#[derive(Debug, Default)]
struct Query {
    text: String,
    corpus: Corpus,
    corpora: Vec<Corpus>,
    shape: Option<Shape>,
}

impl Message for Query {
    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            FieldDescriptor::field("text", "1,2,string", |m| &mut m.text),
            FieldDescriptor::field("corpus", "2,0,enum", |m| &mut m.corpus),
            FieldDescriptor::field("corpora", "3,2,enum,repeated,packed", |m| &mut m.corpora),
            FieldDescriptor::oneof("shape", oneof_group::<Self, Shape>(|m| &mut m.shape)),
        ]
    }
}

#[test]
fn decode_hand_written() {
    let buf = [
        0x0A, 0x03, b'c', b'a', b't', //
        0x10, 0x02, //
        0x1A, 0x03, 0x00, 0x01, 0x07, //
        0x2A, 0x02, b'o', b'k',
    ];
    let o = Query::from_slice(&buf).unwrap();

    assert_eq!(o.text, "cat");
    assert_eq!(o.corpus, Corpus::Images);
    assert_eq!(
        o.corpora,
        [Corpus::Universal, Corpus::Web, Corpus::Unrecognised(7)]
    );
    assert_eq!(o.shape, Some(Shape::Label("ok".into())));
}

#[test]
fn decode_hand_written_oneof() {
    let mut buf = vec![0x2A, 0x02, b'o', b'k', 0x21];
    buf.extend(2.5f64.to_le_bytes());

    let mut o = Query::default();
    decode_slice(&buf, &mut o).unwrap();

    assert_eq!(o.shape, Some(Shape::Radius(2.5)));
}

#[test]
fn schema_tables() {
    let schema = Schema::<Query>::extract().unwrap();

    let names = schema.fields().map(|f| f.name).collect::<Vec<_>>();
    assert_eq!(names, ["text", "corpus", "corpora"]);

    let variants = schema
        .oneofs()
        .map(|v| (v.group, v.variant, v.annotation.ty))
        .collect::<Vec<_>>();
    assert_eq!(
        variants,
        [
            ("shape", "Radius", LogicalType::Double),
            ("shape", "Label", LogicalType::String)
        ]
    );

    let number = |n| FieldNumber::new(n).unwrap();
    assert!(matches!(schema.lookup(number(2)), Some(Entry::Field(f)) if f.name == "corpus"));
    assert!(matches!(schema.lookup(number(5)), Some(Entry::Oneof(v)) if v.variant == "Label"));
    assert!(schema.lookup(number(6)).is_none());
}

#[derive(Debug, Default)]
struct Mismatched {
    text: String,
}

impl Message for Mismatched {
    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![FieldDescriptor::field("text", "1,0,int32", |m| &mut m.text)]
    }
}

#[test]
fn reject_unsupported_storage() {
    let err = Mismatched::from_slice(&[0x08, 0x01]).unwrap_err();

    assert!(matches!(
        err,
        Error::Field {
            source: FieldError::Bind(BindError::UnsupportedScalarType { found: "i32", .. }),
            ..
        }
    ));
}

#[derive(Debug, Default)]
struct Duplicate {
    a: i32,
    b: i64,
}

impl Message for Duplicate {
    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            FieldDescriptor::field("a", "7,0,int32", |m| &mut m.a),
            FieldDescriptor::field("b", "7,0,int64", |m| &mut m.b),
        ]
    }
}

#[test]
fn reject_duplicate_field_number() {
    let err = Duplicate::from_slice(&[]).unwrap_err();

    let Error::Schema(SchemaError::DuplicateFieldNumber {
        number,
        first,
        second,
    }) = err
    else {
        panic!("expected a schema error");
    };

    assert_eq!(number.get(), 7);
    assert_eq!((first, second), ("a", "b"));
}

#[derive(Debug, Default)]
struct Overlapping {
    radius: f64,
    shape: Option<Shape>,
}

impl Message for Overlapping {
    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            FieldDescriptor::field("radius", "4,1,double", |m| &mut m.radius),
            FieldDescriptor::oneof("shape", oneof_group::<Self, Shape>(|m| &mut m.shape)),
        ]
    }
}

#[test]
fn reject_duplicate_oneof_number() {
    assert!(matches!(
        Schema::<Overlapping>::extract(),
        Err(SchemaError::DuplicateFieldNumber {
            first: "radius",
            second: "Radius",
            ..
        })
    ));
}

#[derive(Debug, PartialEq)]
enum Unmarked {
    Id(u64),
}

impl Oneof for Unmarked {
    fn variants() -> Vec<Variant<Self>> {
        vec![Variant::new(
            "Id",
            "1,0,uint64",
            || Unmarked::Id(0),
            |o| match o {
                Unmarked::Id(v) => Some(v as &mut dyn Slot),
            },
        )]
    }
}

#[derive(Debug, Default)]
struct WithUnmarked {
    choice: Option<Unmarked>,
}

impl Message for WithUnmarked {
    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![FieldDescriptor::oneof(
            "choice",
            oneof_group::<Self, Unmarked>(|m| &mut m.choice),
        )]
    }
}

#[test]
fn reject_missing_oneof_modifier() {
    assert!(matches!(
        Schema::<WithUnmarked>::extract(),
        Err(SchemaError::MissingOneofModifier { variant: "Id" })
    ));
}

#[derive(Debug, PartialEq)]
enum Hollow {
    Empty,
}

impl Oneof for Hollow {
    fn variants() -> Vec<Variant<Self>> {
        vec![Variant::new("Empty", "1,0,bool,oneof", || Hollow::Empty, |_| None)]
    }
}

#[derive(Debug, Default)]
struct WithHollow {
    choice: Option<Hollow>,
}

impl Message for WithHollow {
    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![FieldDescriptor::oneof(
            "choice",
            oneof_group::<Self, Hollow>(|m| &mut m.choice),
        )]
    }
}

#[test]
fn reject_variant_without_field() {
    assert!(matches!(
        WithHollow::from_slice(&[0x08, 0x01]),
        Err(Error::Schema(SchemaError::VariantShape { variant: "Empty" }))
    ));
}

#[derive(Debug, Default)]
struct OutOfRange {
    a: i32,
}

impl Message for OutOfRange {
    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![FieldDescriptor::field("a", "536870912,0,int32", |m| &mut m.a)]
    }
}

#[test]
fn reject_invalid_annotation() {
    let err = OutOfRange::from_slice(&[]).unwrap_err();

    assert!(matches!(
        err,
        Error::Schema(SchemaError::Annotation {
            field: "a",
            source: AnnotationError::InvalidFieldNumber(536_870_912),
        })
    ));
}

fn parse(s: &str) -> Result<Annotation, AnnotationError> {
    s.parse()
}

#[test]
fn annotation_fields() {
    let annotation = parse("12, 2, sint64, repeated, packed").unwrap();

    assert_eq!(annotation.number.get(), 12);
    assert_eq!(annotation.wire_type, WireType::LengthDelimited);
    assert_eq!(annotation.ty, LogicalType::Sint64);
    assert!(annotation.modifiers.repeated());
    assert!(annotation.modifiers.packed());
    assert!(!annotation.modifiers.oneof());

    // A packed field may also declare its element's wire type.
    let annotation = parse("3,5,float,repeated,packed").unwrap();
    assert!(annotation.accepts(WireType::Fixed32));
    assert!(annotation.accepts(WireType::LengthDelimited));
    assert!(!annotation.accepts(WireType::Varint));

    assert_eq!(parse("1,2,message").unwrap().ty, LogicalType::Embed);
    assert_eq!(parse("536870911,0,bool,optional").unwrap().number.get(), 536_870_911);
}

#[test]
fn annotation_accepts_unpacked_elements() {
    let annotation = parse("4,0,int32,repeated").unwrap();
    assert!(annotation.accepts(WireType::Varint));
    assert!(annotation.accepts(WireType::LengthDelimited));

    let annotation = parse("4,0,int32").unwrap();
    assert!(annotation.accepts(WireType::Varint));
    assert!(!annotation.accepts(WireType::LengthDelimited));

    let annotation = parse("4,2,string,repeated").unwrap();
    assert!(annotation.accepts(WireType::LengthDelimited));
    assert!(!annotation.accepts(WireType::Varint));
}

#[test]
fn annotation_errors() {
    use AnnotationError::*;

    let cases = [
        ("1,0", Malformed("1,0".into())),
        ("one,0,int32", Malformed("one,0,int32".into())),
        ("1,x,int32", Malformed("1,x,int32".into())),
        ("0,0,int32", InvalidFieldNumber(0)),
        ("536870912,0,int32", InvalidFieldNumber(536_870_912)),
        ("1,3,int32", InvalidWireType(3)),
        ("1,8,int32", InvalidWireType(8)),
        ("1,0,int8", UnknownLogicalType("int8".into())),
        ("1,0,int32,required", UnknownModifier("required".into())),
        ("1,2,int32,packed", PackedWithoutRepeated),
        ("1,2,string,repeated,oneof", OneofWithRepeated),
        ("1,2,string,repeated,packed", NotPackable(LogicalType::String)),
        (
            "1,0,string",
            WireTypeMismatch {
                declared: WireType::Varint,
                ty: LogicalType::String,
            },
        ),
        (
            "1,5,double,repeated,packed",
            WireTypeMismatch {
                declared: WireType::Fixed32,
                ty: LogicalType::Double,
            },
        ),
        (
            "1,2,int32",
            WireTypeMismatch {
                declared: WireType::LengthDelimited,
                ty: LogicalType::Int32,
            },
        ),
    ];

    for (annotation, expected) in cases {
        assert_eq!(parse(annotation), Err(expected), "{annotation}");
    }
}
