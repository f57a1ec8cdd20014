//! Checker integration tests.
//!
//! Each test runs the full parse -> bind -> check pipeline and asserts on
//! the diagnostic messages.

use bumpalo::Bump;
use tycheck_ast::types::SourceFileId;
use tycheck_binder::Binder;
use tycheck_checker::{CancellationToken, CheckAborted, Checker};
use tycheck_core::intern::StringInterner;
use tycheck_parser::Parser;
use tycheck_tsoptions::CompilerOptions;

fn strict_options() -> CompilerOptions {
    CompilerOptions {
        strict: Some(true),
        ..Default::default()
    }
}

/// Run the pipeline over one source file with the given options and
/// return every diagnostic message.
fn check_with_options(source: &str, options: CompilerOptions) -> Vec<String> {
    check_program_with_options(&[("test.ts", source)], options)
}

fn check_source(source: &str) -> Vec<String> {
    check_with_options(source, strict_options())
}

fn check_program(files: &[(&str, &str)]) -> Vec<String> {
    check_program_with_options(files, strict_options())
}

fn check_program_with_options(files: &[(&str, &str)], options: CompilerOptions) -> Vec<String> {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let mut parsed = Vec::new();
    let mut messages: Vec<String> = Vec::new();
    for (file_name, source) in files {
        let mut parser = Parser::new(&arena, &interner, file_name, source);
        let file = parser.parse_source_file();
        messages.extend(parser.take_diagnostics().into_iter().map(|d| d.message_text));
        parsed.push(file);
    }
    let mut binder = Binder::new(&interner);
    for (i, file) in parsed.iter().enumerate() {
        binder.bind_source_file(file, SourceFileId(i as u32));
    }
    let mut checker = Checker::new(binder, options);
    for (i, file) in parsed.iter().enumerate() {
        checker.register_module(&file.module_name, SourceFileId(i as u32));
    }
    for (i, file) in parsed.iter().enumerate() {
        let _ = checker.check_source_file(file, SourceFileId(i as u32));
    }
    messages.extend(
        checker
            .take_diagnostics()
            .into_diagnostics()
            .into_iter()
            .map(|d| d.message_text),
    );
    messages
}

fn assert_clean(source: &str) {
    let diags = check_source(source);
    assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
}

fn assert_has(source: &str, fragment: &str) {
    let diags = check_source(source);
    assert!(
        diags.iter().any(|d| d.contains(fragment)),
        "expected a diagnostic containing {:?}, got: {:?}",
        fragment,
        diags
    );
}

// ============================================================================
// Assignability basics
// ============================================================================

#[test]
fn literal_initializers_satisfy_primitive_annotations() {
    assert_clean(
        r#"
        const a: number = 42;
        const b: string = "hello";
        const c: boolean = true;
        "#,
    );
}

#[test]
fn number_is_not_assignable_to_string() {
    assert_has("const x: string = 42;", "not assignable");
}

#[test]
fn string_is_not_assignable_to_number() {
    assert_has(r#"const x: number = "hello";"#, "not assignable");
}

#[test]
fn any_is_assignable_in_both_directions() {
    assert_clean(
        r#"
        const x: any = 42;
        const s: string = x;
        const n: number = x;
        "#,
    );
}

#[test]
fn null_rejects_under_strict_null_checks() {
    assert_has("const x: string = null;", "not assignable");
}

#[test]
fn null_is_permitted_without_strict_null_checks() {
    let diags = check_with_options("const x: string = null;", CompilerOptions::default());
    assert!(diags.is_empty(), "{:?}", diags);
}

#[test]
fn const_keeps_literal_types_and_let_widens() {
    assert_clean(
        r#"
        const one = 1;
        const narrowed: 1 = one;
        let counter = 1;
        counter = 2;
        "#,
    );
}

// ============================================================================
// Unions and aliases
// ============================================================================

#[test]
fn union_accepts_each_constituent() {
    assert_clean(
        r#"
        type StringOrNumber = string | number;
        const a: StringOrNumber = "hi";
        const b: StringOrNumber = 42;
        "#,
    );
}

#[test]
fn union_rejects_unrelated_values() {
    assert_has(
        r#"
        type StringOrNumber = string | number;
        const a: StringOrNumber = true;
        "#,
        "not assignable",
    );
}

#[test]
fn aliases_flatten_across_named_layers() {
    // `U` must behave as the flat three-way union, not a nested one.
    assert_clean(
        r#"
        type T = string | number;
        type U = T | boolean;
        const a: U = "s";
        const b: U = 1;
        const c: U = false;
        "#,
    );
}

#[test]
fn chained_aliases_resolve() {
    assert_clean(
        r#"
        type A = string;
        type B = A;
        const x: B = "hello";
        "#,
    );
}

#[test]
fn alias_misuse_still_reports() {
    assert_has(
        r#"
        type Name = string;
        const x: Name = 42;
        "#,
        "not assignable",
    );
}

#[test]
fn string_literal_union_narrows_allowed_values() {
    assert_clean(
        r#"
        type Direction = "north" | "south";
        const d: Direction = "north";
        "#,
    );
    assert_has(
        r#"
        type Direction = "north" | "south";
        const d: Direction = "east";
        "#,
        "not assignable",
    );
}

// ============================================================================
// Interfaces
// ============================================================================

#[test]
fn interface_object_literal_round_trip() {
    assert_clean(
        r#"
        interface Point { x: number; y: number; }
        const p: Point = { x: 1, y: 2 };
        const n: number = p.x;
        "#,
    );
}

#[test]
fn missing_required_property_reports_property_focused_error() {
    assert_has(
        r#"
        interface Point { x: number; y: number; }
        const p: Point = { x: 1 };
        "#,
        "is missing in type",
    );
}

#[test]
fn excess_property_in_object_literal_reports() {
    assert_has(
        "const x: { a: number } = { a: 1, b: 2 };",
        "may only specify known properties",
    );
}

#[test]
fn spread_keeps_optional_properties_optional() {
    // A later optional spread property unions with the earlier type and
    // stays optional when the earlier property was optional: the spread
    // may or may not supply the key at runtime.
    assert_clean(
        r#"
        function combine(a: { x?: number }, b: { x?: string }) {
            const merged = { ...a, ...b };
            const loose: { x?: number | string } = merged;
        }
        "#,
    );
    assert_has(
        r#"
        function combine(a: { x?: number }, b: { x?: string }) {
            const merged = { ...a, ...b };
            const required: { x: number | string } = merged;
        }
        "#,
        "not assignable",
    );
}

#[test]
fn spread_required_properties_override_earlier_ones() {
    assert_clean(
        r#"
        function overlay(base: { x: number }, patch: { x: number }) {
            const merged = { ...base, ...patch };
            const required: { x: number } = merged;
        }
        "#,
    );
}

#[test]
fn interface_declaration_merging_combines_members() {
    // Two declarations of one generic interface merge into one symbol
    // with both members sharing a single type parameter.
    assert_clean(
        r#"
        interface Box<T> { x: T; }
        interface Box<T> { y: T; }
        const b: Box<number> = { x: 1, y: 2 };
        const x: number = b.x;
        const y: number = b.y;
        "#,
    );
}

#[test]
fn merged_interface_members_check_against_the_same_parameter() {
    assert_has(
        r#"
        interface Box<T> { x: T; }
        interface Box<T> { y: T; }
        const b: Box<number> = { x: 1, y: "two" };
        "#,
        "not assignable",
    );
}

#[test]
fn interface_extends_inherits_members() {
    assert_clean(
        r#"
        interface Animal { name: string; }
        interface Dog extends Animal { breed: string; }
        const d: Dog = { name: "rex", breed: "lab" };
        const n: string = d.name;
        "#,
    );
}

#[test]
fn optional_properties_may_be_omitted() {
    assert_clean(
        r#"
        interface Config { host: string; port?: number; }
        const c: Config = { host: "localhost" };
        "#,
    );
}

#[test]
fn index_signature_covers_arbitrary_keys() {
    assert_clean(
        r#"
        interface Counts { [key: string]: number; }
        const c: Counts = { a: 1, b: 2 };
        const n: number = c.anything;
        "#,
    );
}

#[test]
fn readonly_property_rejects_writes() {
    assert_has(
        r#"
        interface Frozen { readonly x: number; }
        function thaw(f: Frozen) { f.x = 1; }
        "#,
        "read-only",
    );
}

// ============================================================================
// Functions and calls
// ============================================================================

#[test]
fn typed_function_round_trip() {
    assert_clean(
        r#"
        function add(a: number, b: number): number {
            return a + b;
        }
        const r: number = add(1, 2);
        "#,
    );
}

#[test]
fn too_few_arguments_reports_expected_count() {
    assert_has(
        r#"
        function add(a: number, b: number): number { return a + b; }
        add(1);
        "#,
        "Expected 2 arguments, but got 1",
    );
}

#[test]
fn too_many_arguments_reports_expected_count() {
    assert_has(
        r#"
        function add(a: number, b: number): number { return a + b; }
        add(1, 2, 3);
        "#,
        "Expected 2 arguments, but got 3",
    );
}

#[test]
fn wrong_argument_type_reports_argument_message() {
    assert_has(
        r#"
        function square(x: number): number { return x * x; }
        square("four");
        "#,
        "Argument of type",
    );
}

#[test]
fn optional_parameters_relax_arity() {
    assert_clean(
        r#"
        function greet(name: string, greeting?: string): string { return name; }
        greet("a");
        greet("a", "b");
        "#,
    );
}

#[test]
fn rest_parameters_accept_any_surplus() {
    assert_clean(
        r#"
        function sum(first: number, ...rest: number[]): number { return first; }
        sum(1);
        sum(1, 2, 3, 4);
        "#,
    );
}

#[test]
fn missing_return_value_reports() {
    assert_has(
        r#"
        function f(): number { const x = 1; }
        "#,
        "must return a value",
    );
}

#[test]
fn calling_a_non_function_reports() {
    assert_has(
        r#"
        const notFn = 42;
        notFn();
        "#,
        "not callable",
    );
}

// ============================================================================
// Overloads
// ============================================================================

#[test]
fn overloads_pick_by_argument_type() {
    assert_clean(
        r#"
        function format(value: string): string;
        function format(value: number): string;
        function format(value: any): string { return "" + value; }
        const a: string = format("x");
        const b: string = format(1);
        "#,
    );
}

#[test]
fn failed_overload_with_correct_arity_reports_argument_error() {
    // Both candidates have correct arity and fail on the argument type,
    // so the diagnostic must point at the argument, not at arity.
    let diags = check_source(
        r#"
        function f(a: string): void;
        function f(a: number): void;
        function f(a: any): void {}
        f(true);
        "#,
    );
    assert!(
        diags.iter().any(|d| d.contains("Argument of type")),
        "expected an argument-focused diagnostic, got {:?}",
        diags
    );
    assert!(
        !diags.iter().any(|d| d.contains("Expected") && d.contains("arguments")),
        "must not report an arity failure: {:?}",
        diags
    );
}

#[test]
fn call_arity_between_overloads_reports_undershoot_and_overshoot() {
    assert_has(
        r#"
        function pick(a: number): void;
        function pick(a: number, b: number, c: number): void;
        function pick(a: number, b?: number, c?: number): void {}
        pick(1, 2);
        "#,
        "No overload expects 2 arguments",
    );
}

#[test]
fn specialized_overloads_win_over_general_ones() {
    assert_clean(
        r#"
        function tag(value: "on"): number;
        function tag(value: string): string;
        function tag(value: any): any { return value; }
        const n: number = tag("on");
        const s: string = tag("off");
        "#,
    );
}

// ============================================================================
// Generics
// ============================================================================

#[test]
fn generic_identity_infers_from_arguments() {
    assert_clean(
        r#"
        function identity<T>(x: T): T { return x; }
        const n: number = identity(42);
        const s: string = identity("hi");
        "#,
    );
}

#[test]
fn explicit_type_arguments_apply() {
    assert_clean(
        r#"
        function identity<T>(x: T): T { return x; }
        const n: number = identity<number>(42);
        "#,
    );
}

#[test]
fn explicit_type_argument_mismatch_reports() {
    assert_has(
        r#"
        function identity<T>(x: T): T { return x; }
        identity<string>(42);
        "#,
        "Argument of type",
    );
}

#[test]
fn type_argument_constraint_violations_report() {
    assert_has(
        r#"
        interface Named { name: string; }
        function label<T extends Named>(x: T): string { return x.name; }
        label<number>(1);
        "#,
        "does not satisfy the constraint",
    );
}

#[test]
fn generic_interface_instantiates_members() {
    assert_clean(
        r#"
        interface Wrapper<T> { value: T; }
        const w: Wrapper<string> = { value: "x" };
        const v: string = w.value;
        "#,
    );
}

#[test]
fn generic_type_requires_arguments() {
    assert_has(
        r#"
        interface Wrapper<T> { value: T; }
        const w: Wrapper = { value: 1 };
        "#,
        "requires 1 type argument",
    );
}

#[test]
fn type_parameter_defaults_fill_in() {
    assert_clean(
        r#"
        interface Wrapper<T = string> { value: T; }
        const w: Wrapper = { value: "x" };
        "#,
    );
}

#[test]
fn recursive_generic_alias_terminates_and_unwraps() {
    // Self-reference through a generic alias is representable without
    // eager expansion; unwrapping one level lands on the same shape.
    assert_clean(
        r#"
        type Linked<T> = T & { next: Linked<T> };
        function tail(l: Linked<string>): string {
            return l.next.next;
        }
        "#,
    );
}

#[test]
fn generic_function_body_checks_against_its_own_parameters() {
    assert_clean(
        r#"
        function first<T>(items: T[], fallback: T): T {
            return fallback;
        }
        const n: number = first([1, 2], 3);
        "#,
    );
}

#[test]
fn lambda_arguments_get_contextual_parameter_types() {
    assert_clean(
        r#"
        function apply(value: number, f: (x: number) => number): number {
            return f(value);
        }
        const r: number = apply(2, x => x * 2);
        "#,
    );
}

#[test]
fn generic_result_reinfers_from_context_sensitive_arguments() {
    assert_clean(
        r#"
        function mapValue<T, U>(value: T, f: (x: T) => U): U {
            return f(value);
        }
        const n: number = mapValue("abc", s => s.length);
        "#,
    );
}

#[test]
fn contextual_lambda_assignment() {
    assert_clean(
        r#"
        const double: (x: number) => number = x => x * 2;
        "#,
    );
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn class_instantiation_and_member_access() {
    assert_clean(
        r#"
        class Point {
            x: number = 0;
            y: number = 0;
            sum(): number { return this.x + this.y; }
        }
        const p = new Point();
        const n: number = p.x;
        const s: number = p.sum();
        "#,
    );
}

#[test]
fn constructor_parameters_check_arguments() {
    assert_has(
        r#"
        class Greeter {
            message: string;
            constructor(message: string) { this.message = message; }
        }
        const g = new Greeter(42);
        "#,
        "Argument of type",
    );
}

#[test]
fn class_inheritance_exposes_base_members() {
    assert_clean(
        r#"
        class Animal { name: string = ""; }
        class Dog extends Animal { breed: string = ""; }
        const d = new Dog();
        const n: string = d.name;
        "#,
    );
}

#[test]
fn class_must_implement_its_interfaces() {
    assert_has(
        r#"
        interface Shape { area(): number; }
        class Circle implements Shape { }
        "#,
        "incorrectly implements",
    );
}

#[test]
fn private_members_are_inaccessible_outside_the_class() {
    assert_has(
        r#"
        class Secret { private code: number = 1; }
        const s = new Secret();
        const c = s.code;
        "#,
        "is private and only accessible",
    );
}

#[test]
fn generic_class_members_flow_through_instantiation() {
    assert_clean(
        r#"
        class Container<T> {
            value: T;
            constructor(value: T) { this.value = value; }
        }
        "#,
    );
}

#[test]
fn static_members_live_on_the_constructor_side() {
    assert_clean(
        r#"
        class Registry {
            static count: number = 0;
        }
        const n: number = Registry.count;
        "#,
    );
}

// ============================================================================
// Enums
// ============================================================================

#[test]
fn enum_members_are_assignable_to_the_enum() {
    assert_clean(
        r#"
        enum Direction { Up, Down }
        const d: Direction = Direction.Up;
        const n: number = Direction.Down;
        "#,
    );
}

#[test]
fn string_enum_members_widen_to_string() {
    assert_clean(
        r#"
        enum Color { Red = "RED", Green = "GREEN" }
        const c: string = Color.Red;
        "#,
    );
}

#[test]
fn enum_values_auto_increment() {
    assert_clean(
        r#"
        enum Level { Low = 1, Medium, High }
        const h: number = Level.High;
        const l: Level = Level.Medium;
        "#,
    );
}

#[test]
fn enums_refuse_to_merge_with_classes() {
    assert_has(
        r#"
        enum E { A }
        class E { }
        "#,
        "can only merge",
    );
}

// ============================================================================
// Arrays and tuples
// ============================================================================

#[test]
fn array_literal_infers_reduced_element_union() {
    assert_clean(
        r#"
        const xs = [1, "two", 3];
        const x: string | number = xs[0];
        "#,
    );
}

#[test]
fn array_annotation_round_trip() {
    assert_clean(
        r#"
        const xs: number[] = [1, 2, 3];
        const first: number = xs[0];
        const len: number = xs.length;
        "#,
    );
}

#[test]
fn array_methods_are_available() {
    assert_clean(
        r#"
        const xs: number[] = [1, 2, 3];
        xs.push(4);
        const joined: string = xs.join(",");
        const sliced: number[] = xs.slice(0, 2);
        "#,
    );
}

#[test]
fn array_map_reinfers_its_result_type() {
    assert_clean(
        r#"
        const xs: number[] = [1, 2, 3];
        const doubled: number[] = xs.map(x => x * 2);
        "#,
    );
}

#[test]
fn tuple_annotation_checks_positions() {
    assert_clean(r#"const pair: [string, number] = ["a", 1];"#);
    assert_has(
        r#"const pair: [string, number] = [1, "a"];"#,
        "not assignable",
    );
}

#[test]
fn tuple_length_mismatch_reports() {
    assert_has(
        r#"const single: [string] = ["a", 1];"#,
        "not assignable",
    );
}

#[test]
fn optional_tuple_elements_relax_length() {
    assert_clean(r#"const t: [string, number?] = ["a"];"#);
}

#[test]
fn tuple_out_of_bounds_index_reports() {
    assert_has(
        r#"
        const pair: [string, number] = ["a", 1];
        const x = pair[5];
        "#,
        "has no element at index",
    );
}

#[test]
fn for_of_iterates_element_types() {
    assert_clean(
        r#"
        const xs: number[] = [1, 2, 3];
        for (const x of xs) {
            const n: number = x;
        }
        "#,
    );
}

#[test]
fn iterating_a_non_array_reports() {
    assert_has(
        r#"
        const n = 42;
        for (const x of n) { }
        "#,
        "is not an array type",
    );
}

// ============================================================================
// keyof, indexed access, mapped and conditional types
// ============================================================================

#[test]
fn keyof_produces_the_key_union() {
    assert_clean(
        r#"
        interface Person { name: string; age: number; }
        type Keys = keyof Person;
        const k: Keys = "name";
        "#,
    );
    assert_has(
        r#"
        interface Person { name: string; age: number; }
        type Keys = keyof Person;
        const k: Keys = "height";
        "#,
        "not assignable",
    );
}

#[test]
fn indexed_access_projects_member_types() {
    assert_clean(
        r#"
        interface Person { name: string; age: number; }
        type Name = Person["name"];
        const n: Name = "x";
        "#,
    );
}

#[test]
fn partial_makes_members_optional() {
    assert_clean(
        r#"
        interface Person { name: string; age: number; }
        type Draft = Partial<Person>;
        const empty: Draft = {};
        const named: Draft = { name: "a" };
        "#,
    );
}

#[test]
fn pick_projects_a_subset() {
    assert_clean(
        r#"
        interface Todo { title: string; body: string; done: boolean; }
        type Preview = Pick<Todo, "title">;
        const p: Preview = { title: "x" };
        "#,
    );
}

#[test]
fn record_builds_an_index_signature() {
    assert_clean(
        r#"
        type Counts = Record<string, number>;
        const c: Counts = { a: 1, b: 2 };
        "#,
    );
}

#[test]
fn homomorphic_mapped_type_applies() {
    assert_clean(
        r#"
        interface Person { name: string; age: number; }
        type Optionalized = { [K in keyof Person]?: Person[K] };
        const o: Optionalized = { name: "a" };
        "#,
    );
}

#[test]
fn conditional_type_selects_branches() {
    assert_clean(
        r#"
        type IsString<T> = T extends string ? true : false;
        const yes: IsString<"a"> = true;
        const no: IsString<number> = false;
        "#,
    );
}

#[test]
fn conditional_type_distributes_over_unions() {
    assert_clean(
        r#"
        type NonNull<T> = T extends null ? never : T;
        const v: NonNull<string | null> = "x";
        "#,
    );
}

#[test]
fn infer_binds_positions_in_the_extends_clause() {
    assert_clean(
        r#"
        type ElementOf<T> = T extends (infer U)[] ? U : never;
        const n: ElementOf<number[]> = 1;
        "#,
    );
}

#[test]
fn return_type_utility_projects_signatures() {
    assert_clean(
        r#"
        type R = ReturnType<() => string>;
        const r: R = "x";
        "#,
    );
}

#[test]
fn template_literal_types_match_patterns() {
    assert_clean(
        r#"
        type Greeting = `Hello ${string}`;
        const g: Greeting = "Hello world";
        "#,
    );
    assert_has(
        r#"
        type Greeting = `Hello ${string}`;
        const g: Greeting = "Goodbye";
        "#,
        "not assignable",
    );
}

// ============================================================================
// Narrowing
// ============================================================================

#[test]
fn typeof_guard_narrows_unions() {
    assert_clean(
        r#"
        function f(x: string | number) {
            if (typeof x === "string") {
                const s: string = x;
            } else {
                const n: number = x;
            }
        }
        "#,
    );
}

#[test]
fn truthiness_narrows_out_null() {
    assert_clean(
        r#"
        function f(x: string | null) {
            if (x) {
                const s: string = x;
            }
        }
        "#,
    );
}

#[test]
fn literal_equality_pins_the_value() {
    assert_clean(
        r#"
        function f(x: "a" | "b") {
            if (x === "a") {
                const a: "a" = x;
            } else {
                const b: "b" = x;
            }
        }
        "#,
    );
}

#[test]
fn discriminant_property_narrows_union_members() {
    assert_clean(
        r#"
        interface Square { kind: "square"; size: number; }
        interface Circle { kind: "circle"; radius: number; }
        type Shape = Square | Circle;
        function area(s: Shape): number {
            if (s.kind === "square") {
                return s.size * s.size;
            } else {
                return s.radius * s.radius;
            }
        }
        "#,
    );
}

#[test]
fn logical_operators_preserve_truthy_facts() {
    assert_clean(
        r#"
        function f(x: string | null): string {
            return x ?? "fallback";
        }
        "#,
    );
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn arithmetic_requires_numeric_operands() {
    assert_has(
        r#"const r = "a" - 1;"#,
        "left-hand side of an arithmetic operation",
    );
}

#[test]
fn plus_concatenates_strings_and_adds_numbers() {
    assert_clean(
        r#"
        const s: string = "a" + "b";
        const n: number = 1 + 2;
        const mixed: string = "a" + 1;
        "#,
    );
}

#[test]
fn bigint_and_number_do_not_mix() {
    assert_has(
        "const r = 1n + 1;",
        "'bigint' and 'number'",
    );
}

#[test]
fn comparisons_without_overlap_report() {
    assert_has(
        r#"const eq = "a" === 1;"#,
        "have no overlap",
    );
    // Relational operators run the same heuristic.
    assert_has(
        r#"const lt = "a" < 1;"#,
        "have no overlap",
    );
}

#[test]
fn relational_operands_in_the_same_domain_are_fine() {
    assert_clean(
        r#"
        let i = 0;
        const below = i < 10;
        const ordered = "a" < "b";
        "#,
    );
}

#[test]
fn relational_operands_must_be_orderable() {
    assert_has(
        "const weird = {} < {};",
        "cannot be applied to types",
    );
}

#[test]
fn nan_comparison_suggests_is_nan() {
    assert_has(
        "const b = NaN === 5;",
        "never equal to anything",
    );
}

#[test]
fn in_operator_requires_a_non_primitive_right_side() {
    assert_has(
        r#"const has = "a" in 42;"#,
        "must not be a primitive",
    );
}

#[test]
fn assignment_to_const_reports() {
    assert_has(
        r#"
        const c = 1;
        c = 2;
        "#,
        "it is a constant",
    );
}

#[test]
fn compound_assignment_round_trips() {
    assert_clean(
        r#"
        let x: number = 10;
        x += 5;
        x *= 2;
        "#,
    );
}

// ============================================================================
// Name resolution
// ============================================================================

#[test]
fn unresolved_names_report() {
    assert_has("const x = missing;", "Cannot find name 'missing'");
}

#[test]
fn misspelled_names_get_suggestions() {
    assert_has(
        r#"
        const count = 1;
        const c = cout;
        "#,
        "Did you mean 'count'?",
    );
}

#[test]
fn misspelled_properties_get_suggestions() {
    assert_has(
        r#"
        const o = { color: "red" };
        const c = o.colour;
        "#,
        "Did you mean 'color'?",
    );
}

#[test]
fn well_known_globals_are_untyped_but_present() {
    assert_clean(
        r#"
        console.log("hello");
        const t = Date.now();
        "#,
    );
}

#[test]
fn node_globals_suggest_installing_types() {
    assert_has(
        "const p = process;",
        "Try installing '@types/node'",
    );
}

#[test]
fn block_scoped_use_before_declaration_reports() {
    assert_has(
        r#"
        const a = b;
        const b = 1;
        "#,
        "used before its declaration",
    );
}

#[test]
fn block_scoped_redeclaration_reports() {
    assert_has(
        r#"
        let a = 1;
        let a = 2;
        "#,
        "Cannot redeclare block-scoped variable",
    );
}

#[test]
fn type_only_names_cannot_be_values() {
    assert_has(
        r#"
        interface Shape { x: number; }
        const s = Shape;
        "#,
        "only refers to a type",
    );
}

#[test]
fn self_referential_initializer_reports_once() {
    assert_has(
        "const x = x;",
        "its own type annotation or initializer",
    );
}

// ============================================================================
// Circularity
// ============================================================================

#[test]
fn direct_alias_cycle_reports() {
    assert_has("type A = A;", "circularly references itself");
}

#[test]
fn mutual_alias_cycle_reports() {
    assert_has(
        r#"
        type A = B;
        type B = A;
        "#,
        "circularly references itself",
    );
}

#[test]
fn recursive_interface_terminates_without_diagnostics() {
    assert_clean(
        r#"
        interface Node { value: number; next: Node | null; }
        function value(n: Node): number { return n.value; }
        "#,
    );
}

#[test]
fn recursive_type_literal_alias_terminates() {
    assert_clean(
        r#"
        type Tree = { value: number; left: Tree | null; right: Tree | null; };
        function v(t: Tree): number { return t.value; }
        "#,
    );
}

#[test]
fn class_extending_itself_reports() {
    assert_has(
        "class A extends A { }",
        "recursively references itself",
    );
}

#[test]
fn mutually_circular_constraints_report() {
    assert_has(
        r#"
        function f<T extends U, U extends T>(x: T, y: U) {
            const s: string = x;
        }
        "#,
        "circular constraint",
    );
}

// ============================================================================
// Namespaces and merging
// ============================================================================

#[test]
fn namespace_exports_resolve_as_values_and_types() {
    assert_clean(
        r#"
        namespace Geometry {
            export const pi: number = 3.14;
            export interface Point { x: number; y: number; }
        }
        const t: number = Geometry.pi;
        const p: Geometry.Point = { x: 1, y: 2 };
        "#,
    );
}

#[test]
fn namespace_merges_with_class() {
    assert_clean(
        r#"
        class Lib { x: number = 1; }
        namespace Lib { export const version: string = "1"; }
        const v: string = Lib.version;
        "#,
    );
}

// ============================================================================
// Modules
// ============================================================================

#[test]
fn named_imports_resolve_exports() {
    let diags = check_program(&[
        ("lib.ts", "export const value: number = 1;"),
        (
            "main.ts",
            r#"
            import { value } from "lib";
            const n: number = value;
            "#,
        ),
    ]);
    assert!(diags.is_empty(), "{:?}", diags);
}

#[test]
fn missing_exports_report() {
    let diags = check_program(&[
        ("lib.ts", "export const value: number = 1;"),
        ("main.ts", r#"import { missing } from "lib";"#),
    ]);
    assert!(
        diags.iter().any(|d| d.contains("has no exported member")),
        "{:?}",
        diags
    );
}

#[test]
fn missing_modules_report() {
    assert_has(
        r#"import { x } from "nowhere";"#,
        "Cannot find module",
    );
}

#[test]
fn type_only_imports_reject_value_use() {
    let diags = check_program(&[
        ("lib.ts", "export interface Thing { x: number; }"),
        (
            "main.ts",
            r#"
            import type { Thing } from "lib";
            const t = Thing;
            "#,
        ),
    ]);
    assert!(
        diags
            .iter()
            .any(|d| d.contains("imported using 'import type'")),
        "{:?}",
        diags
    );
}

#[test]
fn star_exports_re_export_members() {
    let diags = check_program(&[
        ("base.ts", "export const shared: number = 1;"),
        ("hub.ts", r#"export * from "base";"#),
        (
            "main.ts",
            r#"
            import { shared } from "hub";
            const n: number = shared;
            "#,
        ),
    ]);
    assert!(diags.is_empty(), "{:?}", diags);
}

#[test]
fn renamed_imports_and_exports_follow_aliases() {
    let diags = check_program(&[
        (
            "lib.ts",
            r#"
            const internal: string = "x";
            export { internal as external };
            "#,
        ),
        (
            "main.ts",
            r#"
            import { external as mine } from "lib";
            const s: string = mine;
            "#,
        ),
    ]);
    assert!(diags.is_empty(), "{:?}", diags);
}

// ============================================================================
// Promises and await
// ============================================================================

#[test]
fn await_unwraps_promises() {
    assert_clean(
        r#"
        function load(): Promise<string>;
        async function main() {
            const s: string = await load();
        }
        "#,
    );
}

#[test]
fn missing_await_hint_on_promise_property_access() {
    assert_has(
        r#"
        function load(): Promise<string>;
        const n = load().length;
        "#,
        "forget to use 'await'",
    );
}

// ============================================================================
// Assertions
// ============================================================================

#[test]
fn satisfies_checks_without_widening() {
    assert_clean("const v = { a: 1 } satisfies { a: number };");
    assert_has(
        r#"const w = { a: "x" } satisfies { a: number };"#,
        "not assignable",
    );
}

#[test]
fn as_assertions_retype_expressions() {
    assert_clean(
        r#"
        const raw: unknown = "data" as unknown;
        const s = raw as string;
        const len: number = s.length;
        "#,
    );
}

#[test]
fn non_null_assertions_strip_nullability() {
    assert_clean(
        r#"
        function f(x: string | null): string {
            return x!;
        }
        "#,
    );
}

#[test]
fn optional_chains_add_undefined_once() {
    assert_clean(
        r#"
        interface User { profile?: { name: string }; }
        function name(u: User): string | undefined {
            return u.profile?.name;
        }
        "#,
    );
}

#[test]
fn unguarded_nullable_access_reports() {
    assert_has(
        r#"
        function f(x: { a: number } | undefined) {
            const n = x.a;
        }
        "#,
        "possibly 'undefined'",
    );
}

// ============================================================================
// Compiler options
// ============================================================================

#[test]
fn no_implicit_any_flags_untyped_parameters() {
    let diags = check_with_options(
        "function f(x) { return x; }",
        CompilerOptions {
            no_implicit_any: Some(true),
            ..Default::default()
        },
    );
    assert!(
        diags.iter().any(|d| d.contains("implicitly has an 'any' type")),
        "{:?}",
        diags
    );
}

#[test]
fn unchecked_indexed_access_adds_undefined() {
    let diags = check_with_options(
        r#"
        function get(xs: number[], i: number): number {
            return xs[i];
        }
        "#,
        CompilerOptions {
            strict: Some(true),
            no_unchecked_indexed_access: Some(true),
            ..Default::default()
        },
    );
    assert!(
        diags.iter().any(|d| d.contains("not assignable")),
        "{:?}",
        diags
    );
}

#[test]
fn index_signature_property_access_can_be_restricted() {
    let diags = check_with_options(
        r#"
        interface Bag { [key: string]: number; }
        function f(b: Bag) { const n = b.anything; }
        "#,
        CompilerOptions {
            strict: Some(true),
            no_property_access_from_index_signature: Some(true),
            ..Default::default()
        },
    );
    assert!(
        diags.iter().any(|d| d.contains("comes from an index signature")),
        "{:?}",
        diags
    );
}

#[test]
fn catch_variables_are_unknown_under_the_strict_family() {
    assert_has(
        r#"
        try { } catch (e) {
            const s: string = e;
        }
        "#,
        "not assignable",
    );
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn cancellation_aborts_between_statements() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let mut parser = Parser::new(&arena, &interner, "test.ts", "const a = 1; const b = 2;");
    let file = parser.parse_source_file();
    let mut binder = Binder::new(&interner);
    binder.bind_source_file(&file, SourceFileId(0));
    let token = CancellationToken::new();
    token.cancel();
    let mut checker = Checker::new(binder, strict_options()).with_cancellation(token);
    let result = checker.check_source_file(&file, SourceFileId(0));
    assert_eq!(result, Err(CheckAborted));
    // Cancellation is not a diagnostic.
    assert!(checker.take_diagnostics().into_diagnostics().is_empty());
}

// ============================================================================
// Fixtures
// ============================================================================

#[test]
fn basic_fixture_checks_cleanly() {
    let source = include_str!("../../../tests/fixtures/basic.ts");
    assert_clean(source);
}

#[test]
fn types_fixture_checks_cleanly() {
    let source = include_str!("../../../tests/fixtures/types.ts");
    assert_clean(source);
}

#[test]
fn classes_fixture_checks_cleanly() {
    let source = include_str!("../../../tests/fixtures/classes.ts");
    assert_clean(source);
}

#[test]
fn generics_fixture_checks_cleanly() {
    let source = include_str!("../../../tests/fixtures/generics.ts");
    assert_clean(source);
}

// ============================================================================
// Stress (no panic, no hang)
// ============================================================================

#[test]
fn many_declarations_check_quickly() {
    let mut source = String::new();
    for i in 0..200 {
        source.push_str(&format!("const x{}: number = {};\n", i, i));
    }
    let diags = check_source(&source);
    assert!(diags.is_empty(), "{:?}", diags);
}

#[test]
fn deeply_nested_expressions_do_not_overflow() {
    let mut expr = String::from("1");
    for _ in 0..30 {
        expr = format!("({} + 1)", expr);
    }
    let source = format!("const x: number = {};", expr);
    let diags = check_source(&source);
    assert!(diags.is_empty(), "{:?}", diags);
}

#[test]
fn wide_interfaces_resolve_members() {
    let mut source = String::from("interface Wide {\n");
    for i in 0..100 {
        source.push_str(&format!("  p{}: number;\n", i));
    }
    source.push_str("}\nconst w: Wide = {\n");
    for i in 0..100 {
        source.push_str(&format!("  p{}: {},\n", i, i));
    }
    source.push_str("};\nconst n: number = w.p42;\n");
    let diags = check_source(&source);
    assert!(diags.is_empty(), "{:?}", diags);
}
