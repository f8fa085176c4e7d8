//! End-to-end compiles against a small registry

use canvas_components::parser::{ParseError, Token};
use canvas_components::{
    CompileError, ComponentDefinition, ComponentRegistry, Compiler, TranspileError, compile,
    payload,
};
use rstest::{fixture, rstest};

#[fixture]
fn registry() -> ComponentRegistry {
    ComponentRegistry::builder()
        .component(
            ComponentDefinition::new("greet", ["who"], "Hello ${who}!")
                .with_usage("![greet][World]!"),
        )
        .component(
            ComponentDefinition::new("shout", ["who"], "<b>${eval:who.toUpperCase()}</b>")
                .with_usage("![shout][hey]!")
                .with_style("b{font-weight:900}"),
        )
        .component(
            ComponentDefinition::new(
                "callout",
                ["title", "body"],
                r#"<div class="callout"><h4>${title}</h4>${body}</div>"#,
            )
            .with_usage("![callout][Title][Body]!")
            .with_style(".callout{border:1px solid}"),
        )
        .build()
}

#[rstest]
#[case::greet("![greet][World]!", "Hello World!")]
#[case::nested("![greet][![greet][World]!]!", "Hello Hello World!!")]
#[case::case_insensitive_name("![GrEeT][you]!", "Hello you!")]
#[case::lone_bracket("5 ] things", "5 ] things")]
#[case::lone_bang("wow! [not markup]", "wow! [not markup]")]
#[case::stray_terminator("done]!", "done]!")]
#[case::eval("![shout][world]!", "<b>WORLD</b>")]
#[case::surrounding_text("a ![greet][b]! c", "a Hello b! c")]
fn test_html(registry: ComponentRegistry, #[case] input: &str, #[case] html: &str) {
    assert_eq!(compile(input, &registry).unwrap().html, html);
}

#[rstest]
#[case("")]
#[case("plain text")]
#[case("unicode ✓ déjà vu")]
#[case("brackets [like] this! and ] that")]
fn test_text_without_markup_is_identity(registry: ComponentRegistry, #[case] input: &str) {
    let document = compile(input, &registry).unwrap();
    assert_eq!(document.html, input);
    assert_eq!(document.css, "");
}

#[rstest]
fn test_css_is_included_once_in_first_use_order(registry: ComponentRegistry) {
    let document = compile(
        "![callout][![shout][a]!][![shout][b]! ![callout][x][y]!]!",
        &registry,
    )
    .unwrap();
    assert_eq!(document.css, ".callout{border:1px solid}b{font-weight:900}");
    assert_eq!(
        document.render(),
        format!("<style>{}</style>{}", document.css, document.html)
    );
}

#[rstest]
fn test_arity_mismatch(registry: ComponentRegistry) {
    let err = compile("![greet][A][B]!", &registry).unwrap_err();
    let CompileError::Transpile(TranspileError::ArityMismatch {
        name,
        expected,
        found,
        usage,
    }) = &err
    else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!((name.as_str(), *expected, *found), ("greet", 1, 2));
    assert_eq!(usage, "![greet][World]!");
    assert!(err.to_string().contains("![greet][World]!"));
}

#[rstest]
#[case::unknown("x ![missing][a]! y", CompileError::Parse(ParseError::UnknownComponent("missing".into())))]
#[case::invalid_name("![two words][a]!", CompileError::Parse(ParseError::InvalidName("two words".into())))]
#[case::bad_separator(
    "![greet![greet][a]!]!",
    CompileError::Parse(ParseError::UnexpectedToken { component: "greet".into(), found: Token::BeginComponent })
)]
fn test_parse_errors(registry: ComponentRegistry, #[case] input: &str, #[case] expected: CompileError) {
    assert_eq!(compile(input, &registry).unwrap_err(), expected);
}

#[rstest]
fn test_unterminated_invocation(registry: ComponentRegistry) {
    assert!(matches!(
        compile("![greet][World", &registry),
        Err(CompileError::Parse(ParseError::UnexpectedEnd { .. }))
    ));
}

#[rstest]
fn test_payload_rewrite(registry: ComponentRegistry) {
    let compiler = Compiler::new(&registry);
    let rewritten = payload::rewrite(r#"{"message":"![shout][hi]!"}"#, &compiler)
        .unwrap()
        .unwrap();
    assert_eq!(
        rewritten,
        r#"{"message":"<style>b{font-weight:900}</style><b>HI</b>"}"#
    );
}

#[rstest]
fn test_registry_from_json_compiles() {
    let registry = ComponentRegistry::from_json(
        r#"{"Tag": {"usage": "![tag][x]!", "arguments": [["label", "the label"]], "html": "<i>${label}</i>", "style": "i{}"}}"#,
    )
    .unwrap();
    let document = compile("![TAG][new]!", &registry).unwrap();
    assert_eq!(document.render(), "<style>i{}</style><i>new</i>");
}
