//! Parser smoke tests: the supported grammar round-trips into the
//! expected statement shapes without diagnostics.

use bumpalo::Bump;
use tycheck_ast::node::{Statement, TypeNode};
use tycheck_core::intern::StringInterner;
use tycheck_parser::Parser;

fn parse_statements(source: &str) -> (usize, Vec<String>) {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let mut parser = Parser::new(&arena, &interner, "test.ts", source);
    let file = parser.parse_source_file();
    let diagnostics = parser
        .take_diagnostics()
        .into_iter()
        .map(|d| d.message_text)
        .collect();
    (file.statements.len(), diagnostics)
}

fn assert_parses(source: &str) {
    let (_, diagnostics) = parse_statements(source);
    assert!(diagnostics.is_empty(), "parse errors: {:?}", diagnostics);
}

#[test]
fn parses_declarations() {
    assert_parses(
        r#"
        const x: number = 1;
        let y = "two";
        var z;
        function f(a: string, b?: number, ...rest: boolean[]): void {}
        class C<T> extends Base implements I {
            x: number = 0;
            private secret?: string;
            static count: number = 0;
            constructor(value: T) {}
            method(a: T): T { return a; }
            [key: string]: number;
        }
        interface I<T extends string = string> {
            a: T;
            b?: number;
            m(x: T): void;
            (call: number): string;
            new (ctor: number): I<string>;
            [key: string]: any;
        }
        type Alias<T> = T | null;
        enum E { A, B = 2, C = "c" }
        const enum CE { X = 1 }
        namespace NS { export const v: number = 1; }
        "#,
    );
}

#[test]
fn parses_imports_and_exports() {
    assert_parses(
        r#"
        import "side-effect";
        import def from "a";
        import * as ns from "b";
        import { one, two as renamed } from "c";
        import type { OnlyType } from "d";
        export const value = 1;
        export { value as out };
        export * from "e";
        export type { OnlyType };
        "#,
    );
}

#[test]
fn parses_expressions() {
    assert_parses(
        r#"
        const a = 1 + 2 * 3 ** 2 - 4 / 5 % 6;
        const b = a > 1 && a < 10 || !a;
        const c = a === 1 ? "one" : "other";
        const d = obj?.prop?.["key"]?.();
        const e = fn(1, "two", ...rest);
        const f = new Thing(1);
        const g = x => x + 1;
        const h = (x: number, y = 2): number => x + y;
        const i = function named(p: string) { return p; };
        const j = [1, 2, ...others];
        const k = { a: 1, "b": 2, 3: "x", shorthand, ...spread };
        const l = `head ${a} middle ${b} tail`;
        const m = value as string;
        const n = value satisfies number;
        const o = maybe!;
        const p = typeof a;
        const q = await promise;
        const r = generic<string>(1);
        "#,
    );
}

#[test]
fn parses_type_positions() {
    assert_parses(
        r#"
        type Prims = string | number | boolean | bigint | symbol | object | void | undefined | null | never | any | unknown;
        type Fn = (a: string, b?: number) => void;
        type Ctor = new (x: number) => Fn;
        type Arr = string[][];
        type Tup = [string, number?, ...boolean[]];
        type Named = [first: string, rest?: number];
        type Lit = "a" | 1 | -1 | true | false | 1n;
        type Obj = { a: string; readonly b?: number; m(): void; [k: string]: any };
        type Keys = keyof Obj;
        type Access = Obj["a"];
        type Cond<T> = T extends string ? "s" : "other";
        type Inferred<T> = T extends (infer U)[] ? U : never;
        type Mapped<T> = { [K in keyof T]?: T[K] };
        type MappedRo<T> = { readonly [K in keyof T]: T[K] };
        type Template = `prefix ${string} suffix`;
        type Query = typeof globalName;
        type Qualified = NS.Inner.Deep;
        type Paren = (string | number)[];
        "#,
    );
}

#[test]
fn parses_statements() {
    assert_parses(
        r#"
        if (a) { b(); } else if (c) { d(); } else { e(); }
        while (x < 10) { x++; }
        for (let i = 0; i < 10; i++) { work(i); }
        for (const item of items) { use(item); }
        for (const key in record) { use(key); }
        switch (tag) {
            case 1: first(); break;
            case 2: second(); break;
            default: fallback();
        }
        try { risky(); } catch (err) { recover(err); } finally { cleanup(); }
        throw new Error("boom");
        "#,
    );
}

#[test]
fn nested_generics_close_with_shift_tokens() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let mut parser = Parser::new(&arena, &interner, "test.ts", "type Deep = Box<Box<Box<number>>>;");
    let file = parser.parse_source_file();
    let diagnostics = parser.take_diagnostics();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.iter().map(|d| &d.message_text).collect::<Vec<_>>());
    let Statement::TypeAlias(alias) = file.statements[0] else {
        panic!("expected a type alias");
    };
    assert!(matches!(alias.type_node, TypeNode::TypeReference(_)));
}

#[test]
fn arrow_ambiguity_resolves_against_parenthesized_expressions() {
    // `(b)` in a conditional branch is not an arrow parameter list.
    assert_parses("const x = cond ? (value) : other;");
    assert_parses("const y = (a: number): number => a;");
}

#[test]
fn statement_recovery_continues_after_errors() {
    let (count, diagnostics) = parse_statements("const x = ; const y = 2;");
    assert!(!diagnostics.is_empty());
    assert_eq!(count, 2);
}
