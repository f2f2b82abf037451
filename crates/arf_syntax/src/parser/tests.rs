#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on correctness of specific syntactic forms and on the parser's error recovery behavior
/// (one error per independent problem, no cascades).
mod tests {
    use super::*;
    use crate::lexer;
    use arf_core::lang::primitives::PrimitiveId;

    fn parse_str(source: &str) -> SourceFile {
        let tokens = lexer::lex(source).expect("source should lex cleanly");
        match parse(&tokens) {
            Ok(file) => file,
            Err(errors) => panic!("unexpected parse errors: {:#?}", errors),
        }
    }

    fn parse_errors(source: &str) -> (SourceFile, Vec<CompileError>) {
        let (tokens, lex_errors) = lexer::tokenize(source);
        assert!(lex_errors.is_empty(), "unexpected lex errors: {:?}", lex_errors);
        parse_file(&tokens)
    }

    fn plain(field: &Field) -> &PlainField {
        match field {
            Field::Plain(f) => f,
            Field::Union(u) => panic!("expected plain field, got union `{}`", u.name.node),
        }
    }

    // ========================================================================
    // Header
    // ========================================================================

    #[test]
    fn test_package_and_imports() {
        let file = parse_str("package acme.billing;\nimport \"common\";\nimport 'sub/types.arf' as types;\n");
        assert_eq!(file.package_name(), "acme.billing");
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].path.node, "common");
        assert!(file.imports[0].alias.is_none());
        assert_eq!(file.imports[1].path.node, "sub/types.arf");
        assert_eq!(file.imports[1].alias.as_ref().map(|a| a.node.as_str()), Some("types"));
    }

    #[test]
    fn test_missing_package_is_root_package() {
        let file = parse_str("struct S {}");
        assert!(file.package.is_none());
        assert_eq!(file.package_name(), "");
    }

    #[test]
    fn test_package_component_must_be_snake_case() {
        let (file, errors) = parse_errors("package acme.BadName;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("`BadName` must be snake_case"), "{}", errors[0].message);
        assert_eq!(file.package_name(), "acme.BadName");
    }

    #[test]
    fn test_explicit_alias_must_be_snake_case() {
        let (_, errors) = parse_errors("import \"common\" as Common;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("import alias `Common`"));
    }

    #[test]
    fn test_import_after_declaration_is_rejected() {
        let (file, errors) = parse_errors("struct S {}\nimport \"late\";\nstruct T {}");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("imports must appear before"));
        assert_eq!(errors[0].span.start, Position::new(2, 1));
        assert!(file.imports.is_empty());
        assert_eq!(file.structs.len(), 2);
    }

    // ========================================================================
    // Structs
    // ========================================================================

    #[test]
    fn test_parse_struct_fields() {
        let file = parse_str(
            r#"
struct Order {
  id uint64 = 1;
  tags array<string> = 2;
  prices map<string, float64> = 3;
  note optional<string> = 0x10;
  customer common.Customer;
}
"#,
        );
        assert_eq!(file.structs.len(), 1);
        let order = &file.structs[0];
        assert_eq!(order.name.node, "Order");
        assert_eq!(order.fields.len(), 5);

        let names: Vec<_> = order.fields.iter().map(|f| f.name().node.as_str()).collect();
        assert_eq!(names, ["id", "tags", "prices", "note", "customer"]);

        let id = plain(&order.fields[0]);
        assert_eq!(id.ty.node, Type::Primitive(PrimitiveId::Uint64));
        assert_eq!(id.index.as_ref().map(|i| i.node), Some(1));

        assert_eq!(plain(&order.fields[1]).ty.node.to_string(), "array<string>");
        assert_eq!(plain(&order.fields[2]).ty.node.to_string(), "map<string, float64>");
        assert_eq!(plain(&order.fields[3]).index.as_ref().map(|i| i.node), Some(16));

        let customer = plain(&order.fields[4]);
        assert!(customer.index.is_none());
        assert!(matches!(&customer.ty.node, Type::Qualified(r) if r.dotted() == "common.Customer"));
    }

    #[test]
    fn test_type_refs_get_distinct_ids() {
        let file = parse_str("struct S { a Foo = 1; b map<Key, bar.Baz> = 2; }");
        assert_eq!(file.type_ref_count, 3);

        let a = plain(&file.structs[0].fields[0]);
        assert_eq!(a.ty.node.type_ref().map(|r| r.id), Some(TypeRefId(0)));

        let Type::Map(key, value) = &plain(&file.structs[0].fields[1]).ty.node else {
            panic!("expected map");
        };
        assert_eq!(key.node.type_ref().map(|r| r.id), Some(TypeRefId(1)));
        assert_eq!(value.node.type_ref().map(|r| r.id), Some(TypeRefId(2)));
    }

    #[test]
    fn test_nested_declarations() {
        let file = parse_str(
            r#"
struct Outer {
  struct Inner { v int32 = 1; }
  enum Kind { A = 0; B = 1; }
  inner Inner = 1;
  kind Kind = 2;
}
"#,
        );
        assert_eq!(file.structs.len(), 2);
        assert_eq!(file.enums.len(), 1);
        assert_eq!(file.items, vec![Item::Struct(StructId(0))]);

        let outer = &file.structs[0];
        assert_eq!(outer.structs, vec![StructId(1)]);
        assert_eq!(outer.enums, vec![EnumId(0)]);
        assert_eq!(outer.fields.len(), 2);

        assert_eq!(file.structs[1].parent, Some(StructId(0)));
        assert_eq!(file.enums[0].parent, Some(StructId(0)));
        assert_eq!(file.struct_path(StructId(1)), "Outer.Inner");
        assert_eq!(file.enum_path(EnumId(0)), "Outer.Kind");
    }

    #[test]
    fn test_union_field() {
        let file = parse_str("struct S { union choice { a string = 1; b S = 2; } c int32 = 3; }");
        let Field::Union(choice) = &file.structs[0].fields[0] else {
            panic!("expected union");
        };
        assert_eq!(choice.name.node, "choice");
        assert_eq!(choice.members.len(), 2);
        assert_eq!(file.structs[0].fields[0].plain_fields().len(), 2);
        assert_eq!(file.structs[0].fields[1].name().node, "c");
    }

    #[test]
    fn test_union_member_cannot_be_optional_or_array() {
        let (file, errors) = parse_errors("struct S { union u { a optional<string> = 1; b array<int32> = 2; } }");
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.message.contains("cannot be optional or repeated")));
        assert_eq!(file.structs[0].fields[0].plain_fields().len(), 2);
    }

    #[test]
    fn test_reserved_field_name_is_reported_and_kept() {
        let (file, errors) = parse_errors("struct S { string string = 1; map int32 = 2; }");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("`string` is a reserved word"));
        assert!(errors[1].message.contains("`map` is a reserved word"));
        assert_eq!(file.structs[0].fields.len(), 2);
    }

    #[test]
    fn test_non_numeric_index_is_parse_error() {
        let (file, errors) = parse_errors("struct S { a string = abc; b string = 2; }");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("expected numeric field index"), "{}", errors[0].message);
        assert_eq!(file.structs[0].fields.len(), 1);
    }

    #[test]
    fn test_index_out_of_i32_range() {
        let (file, errors) = parse_errors("struct S { a string = 4294967296; }");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("does not fit in a 32-bit signed integer"));
        assert_eq!(file.structs[0].fields.len(), 1);
    }

    // ========================================================================
    // Enums
    // ========================================================================

    #[test]
    fn test_parse_enum() {
        let file = parse_str("enum Status { UNKNOWN = 0; ACTIVE = 1; ALIAS = 1; }");
        assert_eq!(file.items, vec![Item::Enum(EnumId(0))]);
        let status = &file.enums[0];
        let options: Vec<_> = status.options.iter().map(|o| (o.name.node.as_str(), o.value.node)).collect();
        assert_eq!(options, [("UNKNOWN", 0), ("ACTIVE", 1), ("ALIAS", 1)]);
    }

    #[test]
    fn test_struct_inside_enum_is_discarded() {
        let (file, errors) = parse_errors("enum E { A = 0; struct X { a int32 = 1; } B = 1; }");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("`struct` declarations are not allowed inside enum `E`"));
        assert!(file.structs.is_empty());
        assert_eq!(file.enums[0].options.len(), 2);
    }

    // ========================================================================
    // Services
    // ========================================================================

    #[test]
    fn test_parse_service_methods() {
        let file = parse_str(
            r#"
service Billing {
  Charge(req ChargeRequest) -> ChargeReply;
  watch(stream Event) -> (summary Summary, stream Event);
  Ping();
  Lookup(common.Key) -> common.Value;
}
"#,
        );
        let service = &file.services[0];
        assert_eq!(service.name.node, "Billing");
        assert_eq!(service.methods.len(), 4);

        let charge = &service.methods[0];
        assert_eq!(charge.inputs[0].name.as_ref().map(|n| n.node.as_str()), Some("req"));
        assert_eq!(charge.outputs.len(), 1);
        assert!(charge.outputs[0].name.is_none());

        let watch = &service.methods[1];
        assert!(watch.inputs[0].is_streaming());
        assert!(watch.inputs[0].name.is_none());
        assert_eq!(watch.outputs.len(), 2);
        assert_eq!(watch.outputs[0].name.as_ref().map(|n| n.node.as_str()), Some("summary"));
        assert!(watch.outputs[1].is_streaming());
        assert_eq!(watch.outputs[1].ty.node.to_string(), "stream Event");

        assert!(service.methods[2].inputs.is_empty());
        assert!(service.methods[2].outputs.is_empty());

        let lookup = &service.methods[3];
        assert!(lookup.inputs[0].name.is_none());
        assert_eq!(lookup.inputs[0].ty.node.to_string(), "common.Key");
    }

    #[test]
    fn test_reopened_service_merges_blocks() {
        let file = parse_str("struct S {}\nservice X { A(S); }\nstruct T {}\nservice X { B(S); }\n");
        assert_eq!(file.services.len(), 1);
        let service = &file.services[0];
        assert_eq!(service.blocks.len(), 2);
        let names: Vec<_> = service.methods.iter().map(|m| m.name.node.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(
            file.items,
            vec![Item::Struct(StructId(0)), Item::Service(ServiceId(0)), Item::Struct(StructId(1))]
        );
    }

    #[test]
    fn test_service_inside_struct_is_discarded() {
        let (file, errors) = parse_errors("struct S {\n  service X { Get(a S) -> S; }\n  id uint32 = 1;\n}\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("`service` declarations are not allowed inside struct `S`"));
        assert_eq!(errors[0].span.start, Position::new(2, 3));
        assert!(file.services.is_empty());
        assert_eq!(file.structs[0].fields.len(), 1);
    }

    #[test]
    fn test_stream_outside_method_is_error() {
        let (_, errors) = parse_errors("struct S { a stream S = 1; }");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("`stream` can only prefix"));
    }

    // ========================================================================
    // Annotations and documentation
    // ========================================================================

    #[test]
    fn test_annotations_and_docs() {
        let file = parse_str(
            r#"# Ping request.
# Second line.
@deprecated("use Ping2", 2)
@optional
struct Ping {
  # identifier
  id uint64 = 1; # trailing

  # detached

  next uint64 = 2;
}
"#,
        );
        let ping = &file.structs[0];
        assert_eq!(ping.docs, ["Ping request.", "Second line."]);
        assert_eq!(ping.annotations.len(), 2);
        assert_eq!(ping.annotations[0].name.node, "deprecated");
        let args: Vec<_> = ping.annotations[0].args.iter().map(|a| a.node.clone()).collect();
        assert_eq!(args, [Literal::String("use Ping2".into()), Literal::Int(2)]);
        assert_eq!(ping.annotations[1].name.node, "optional");

        let id = plain(&ping.fields[0]);
        assert_eq!(id.docs, ["identifier"]);
        assert!(plain(&ping.fields[1]).docs.is_empty());
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    #[test]
    fn test_recovers_one_error_per_bad_member() {
        let source = "struct S {\n  a string = ;\n  b = 2;\n  c uint32 = 3;\n}\nstruct T { d int32 = 1; }\n";
        let (file, errors) = parse_errors(source);
        assert_eq!(errors.len(), 2, "{:#?}", errors);
        assert_eq!(errors[0].span.start.line, 2);
        assert_eq!(errors[1].span.start.line, 3);
        assert_eq!(file.structs.len(), 2);
        assert_eq!(file.structs[0].fields.len(), 1);
        assert_eq!(file.structs[0].fields[0].name().node, "c");
    }

    #[test]
    fn test_missing_closing_brace() {
        let (file, errors) = parse_errors("struct S { a string = 1;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("expected `}` to close struct, found end of file"));
        assert_eq!(file.structs[0].fields.len(), 1);
    }

    #[test]
    fn test_garbage_at_top_level() {
        let (file, errors) = parse_errors("oops;\nstruct S {}");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("expected `struct`, `enum` or `service`, found identifier `oops`"));
        assert_eq!(file.structs.len(), 1);
    }

    #[test]
    fn test_recovery_diagnostics_snapshot() {
        let source = "struct S {\n  a string = ;\n  service X {}\n}\nenum E {}\nfoo";
        let (_, errors) = parse_errors(source);
        let rendered = errors
            .iter()
            .map(|e| format!("{}: {}", e.span.start, e.message))
            .collect::<Vec<_>>()
            .join("\n");
        insta::assert_snapshot!(rendered, @r"
        2:14: expected numeric field index, found `;`
        3:3: `service` declarations are not allowed inside struct `S`
        6:1: expected `struct`, `enum` or `service`, found identifier `foo`
        ");
    }

    #[test]
    fn test_parser_accepts_tokens_without_eof() {
        let mut tokens = lexer::lex("struct S {}").unwrap();
        tokens.pop();
        let file = parse(&tokens).unwrap();
        assert_eq!(file.structs.len(), 1);
    }
}
