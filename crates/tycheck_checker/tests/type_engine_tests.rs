//! Type universe invariants, exercised directly through the factory API.
//!
//! Interning gives structurally identical construction calls identical
//! type ids; the reduction rules have fixed points; sentinels are
//! distinguishable by identity.

use tycheck_ast::types::{ElementFlags, ObjectFlags, TypeFlags, TypeId};
use tycheck_binder::Binder;
use tycheck_checker::{Checker, TypeMapper, UnionReduction};
use tycheck_core::intern::StringInterner;
use tycheck_tsoptions::CompilerOptions;

fn engine() -> Checker<'static> {
    let interner = StringInterner::new();
    Checker::new(Binder::new(&interner), CompilerOptions::default())
}

fn fresh_type_param(checker: &mut Checker<'_>, name: &str) -> TypeId {
    checker.create_type_parameter(name, None)
}

// ============================================================================
// Interning soundness
// ============================================================================

#[test]
fn union_interning_is_order_independent() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    let a = checker.get_union_type(vec![string, number]);
    let b = checker.get_union_type(vec![number, string]);
    assert_eq!(a, b);
}

#[test]
fn union_with_different_members_gets_a_different_id() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    let boolean = checker.types.boolean_type;
    let a = checker.get_union_type(vec![string, number]);
    let b = checker.get_union_type(vec![string, boolean]);
    assert_ne!(a, b);
}

#[test]
fn literal_types_intern_by_value() {
    let mut checker = engine();
    assert_eq!(
        checker.get_string_literal_type("a"),
        checker.get_string_literal_type("a")
    );
    assert_ne!(
        checker.get_string_literal_type("a"),
        checker.get_string_literal_type("b")
    );
    assert_eq!(
        checker.get_number_literal_type(1.0),
        checker.get_number_literal_type(1.0)
    );
}

#[test]
fn array_types_intern_by_element() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    assert_eq!(
        checker.create_array_type(string),
        checker.create_array_type(string)
    );
    assert_ne!(
        checker.create_array_type(string),
        checker.create_array_type(number)
    );
}

#[test]
fn indexed_access_and_keyof_intern_on_generic_operands() {
    let mut checker = engine();
    let t = fresh_type_param(&mut checker, "T");
    let key = checker.get_string_literal_type("x");
    assert_eq!(checker.get_index_type(t), checker.get_index_type(t));
    assert_eq!(
        checker.get_indexed_access_type(t, key, None),
        checker.get_indexed_access_type(t, key, None)
    );
}

// ============================================================================
// Union reduction
// ============================================================================

#[test]
fn union_flattening_is_grouping_independent() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    let boolean = checker.types.boolean_type;
    let inner = checker.get_union_type(vec![string, number]);
    let nested = checker.get_union_type(vec![inner, boolean]);
    let flat = checker.get_union_type(vec![string, number, boolean]);
    assert_eq!(nested, flat);
    assert_eq!(checker.types.union_members(nested).len(), 3);
}

#[test]
fn never_is_the_union_identity() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let never = checker.types.never_type;
    assert_eq!(checker.get_union_type(vec![string, never]), string);
    assert_eq!(checker.get_union_type(vec![never, never]), never);
}

#[test]
fn any_and_unknown_absorb_unions() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let any = checker.types.any_type;
    let unknown = checker.types.unknown_type;
    assert_eq!(checker.get_union_type(vec![string, any]), any);
    assert_eq!(checker.get_union_type(vec![string, unknown]), unknown);
}

#[test]
fn literals_subsumed_by_their_primitive_drop_out() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let literal = checker.get_string_literal_type("a");
    assert_eq!(checker.get_union_type(vec![literal, string]), string);
}

#[test]
fn boolean_literal_pair_collapses_to_boolean() {
    let mut checker = engine();
    let true_type = checker.types.true_type;
    let false_type = checker.types.false_type;
    let boolean = checker.types.boolean_type;
    assert_eq!(
        checker.get_union_type(vec![true_type, false_type]),
        boolean
    );
}

#[test]
fn subtype_reduction_removes_strict_subtypes() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let literal = checker.get_string_literal_type("a");
    let reduced = checker.get_union_type_ex(vec![literal, string], UnionReduction::Subtype);
    assert_eq!(reduced, string);
}

#[test]
fn union_reduction_none_keeps_constituents() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let literal = checker.get_string_literal_type("a");
    let unreduced = checker.get_union_type_ex(vec![literal, string], UnionReduction::None);
    assert_eq!(checker.types.union_members(unreduced).len(), 2);
}

// ============================================================================
// Intersections
// ============================================================================

#[test]
fn disjoint_primitive_intersection_is_never() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    assert_eq!(
        checker.get_intersection_type(vec![string, number]),
        checker.types.never_type
    );
}

#[test]
fn conflicting_unit_types_intersect_to_never() {
    let mut checker = engine();
    let a = checker.get_string_literal_type("a");
    let b = checker.get_string_literal_type("b");
    assert_eq!(
        checker.get_intersection_type(vec![a, b]),
        checker.types.never_type
    );
}

#[test]
fn never_absorbs_intersections() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let never = checker.types.never_type;
    assert_eq!(checker.get_intersection_type(vec![string, never]), never);
}

#[test]
fn unknown_is_the_intersection_identity() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let unknown = checker.types.unknown_type;
    assert_eq!(checker.get_intersection_type(vec![string, unknown]), string);
}

#[test]
fn literal_absorbs_its_base_primitive() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let literal = checker.get_string_literal_type("a");
    assert_eq!(checker.get_intersection_type(vec![literal, string]), literal);
}

#[test]
fn type_variable_intersection_stays_irreducible() {
    let mut checker = engine();
    let t = fresh_type_param(&mut checker, "T");
    let empty = checker.types.empty_object_type;
    let result = checker.get_intersection_type(vec![t, empty]);
    assert!(checker
        .types
        .object_flags(result)
        .contains(ObjectFlags::IS_CONSTRAINED_TYPE_VARIABLE));
}

#[test]
fn intersection_distributes_over_union() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    let a = checker.get_string_literal_type("a");
    let union = checker.get_union_type(vec![string, number]);
    // "a" & (string | number) = "a" & string | "a" & number = "a"
    let result = checker.get_intersection_type(vec![a, union]);
    assert_eq!(result, a);
}

// ============================================================================
// Instantiation
// ============================================================================

#[test]
fn identity_instantiation_returns_the_same_type() {
    let mut checker = engine();
    let t = fresh_type_param(&mut checker, "T");
    let array = checker.create_array_type(t);
    let identity = TypeMapper::new(vec![t], vec![t]);
    assert_eq!(checker.instantiate_type(array, &identity), array);
}

#[test]
fn instantiation_substitutes_type_parameters() {
    let mut checker = engine();
    let t = fresh_type_param(&mut checker, "T");
    let string = checker.types.string_type;
    let array = checker.create_array_type(t);
    let mapper = TypeMapper::new(vec![t], vec![string]);
    let instantiated = checker.instantiate_type(array, &mapper);
    assert_eq!(instantiated, checker.create_array_type(string));
}

#[test]
fn instantiation_of_a_concrete_type_is_a_no_op() {
    let mut checker = engine();
    let t = fresh_type_param(&mut checker, "T");
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    let array = checker.create_array_type(string);
    let mapper = TypeMapper::new(vec![t], vec![number]);
    assert_eq!(checker.instantiate_type(array, &mapper), array);
}

// ============================================================================
// Tuples
// ============================================================================

#[test]
fn tuple_construction_interns_per_shape() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    let a = checker.create_tuple_type(
        vec![string, number],
        vec![ElementFlags::REQUIRED, ElementFlags::REQUIRED],
        false,
        None,
    );
    let b = checker.create_tuple_type(
        vec![string, number],
        vec![ElementFlags::REQUIRED, ElementFlags::REQUIRED],
        false,
        None,
    );
    assert_eq!(a, b);
}

#[test]
fn tuple_normalization_promotes_optional_before_required() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    let promoted = checker.create_tuple_type(
        vec![string, number],
        vec![ElementFlags::OPTIONAL, ElementFlags::REQUIRED],
        false,
        None,
    );
    let explicit = checker.create_tuple_type(
        vec![string, number],
        vec![ElementFlags::REQUIRED, ElementFlags::REQUIRED],
        false,
        None,
    );
    // A hole cannot precede a guaranteed element, so the shapes agree.
    assert_eq!(promoted, explicit);
}

#[test]
fn tuple_normalization_is_a_fixed_point() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let first = checker.create_tuple_type(
        vec![string],
        vec![ElementFlags::REQUIRED],
        false,
        None,
    );
    let again = checker.create_tuple_type(
        vec![string],
        vec![ElementFlags::REQUIRED],
        false,
        None,
    );
    assert_eq!(first, again);
}

#[test]
fn variadic_tuple_splices_concrete_tuples() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    let inner = checker.create_tuple_type(
        vec![number, number],
        vec![ElementFlags::REQUIRED, ElementFlags::REQUIRED],
        false,
        None,
    );
    let spliced = checker.create_tuple_type(
        vec![string, inner],
        vec![ElementFlags::REQUIRED, ElementFlags::VARIADIC],
        false,
        None,
    );
    let flat = checker.create_tuple_type(
        vec![string, number, number],
        vec![
            ElementFlags::REQUIRED,
            ElementFlags::REQUIRED,
            ElementFlags::REQUIRED,
        ],
        false,
        None,
    );
    assert_eq!(spliced, flat);
}

// ============================================================================
// Array literal identity split
// ============================================================================

#[test]
fn array_literal_type_is_distinct_from_plain_array() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let number = checker.types.number_type;
    let element = checker.get_union_type(vec![string, number]);
    let plain = checker.create_array_type(element);
    let literal = checker.create_array_literal_type(element);
    assert_ne!(plain, literal);
    assert!(checker
        .types
        .object_flags(literal)
        .contains(ObjectFlags::ARRAY_LITERAL));
    // Still assignable both ways.
    assert!(checker.is_type_assignable_to(literal, plain));
    // And interned per element.
    assert_eq!(literal, checker.create_array_literal_type(element));
}

// ============================================================================
// Template literal types
// ============================================================================

#[test]
fn all_literal_template_collapses_to_a_string_literal() {
    let mut checker = engine();
    let b = checker.get_string_literal_type("b");
    let collapsed = checker.get_template_literal_type(
        &["a".to_string(), "c".to_string()],
        &[b],
    );
    assert_eq!(collapsed, checker.get_string_literal_type("abc"));
}

#[test]
fn pattern_template_stays_symbolic_and_matches_literals() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let pattern = checker.get_template_literal_type(
        &["Hello ".to_string(), String::new()],
        &[string],
    );
    assert!(checker.types.flags(pattern).contains(TypeFlags::TEMPLATE_LITERAL));
    let greeting = checker.get_string_literal_type("Hello world");
    let other = checker.get_string_literal_type("Goodbye");
    assert!(checker.is_type_assignable_to(greeting, pattern));
    assert!(!checker.is_type_assignable_to(other, pattern));
    // Interning applies to template literals too.
    let again = checker.get_template_literal_type(
        &["Hello ".to_string(), String::new()],
        &[string],
    );
    assert_eq!(pattern, again);
}

#[test]
fn template_literal_matched_strings_reduce_out_of_unions() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let pattern = checker.get_template_literal_type(
        &["id-".to_string(), String::new()],
        &[string],
    );
    let matched = checker.get_string_literal_type("id-1");
    let reduced = checker.get_union_type(vec![pattern, matched]);
    assert_eq!(reduced, pattern);
}

// ============================================================================
// Relations and sentinels
// ============================================================================

#[test]
fn freshness_splits_identity_but_not_value() {
    let mut checker = engine();
    let regular = checker.get_number_literal_type(1.0);
    let fresh = checker.get_fresh_literal_type(regular);
    assert_ne!(regular, fresh);
    assert_eq!(checker.get_regular_type(fresh), regular);
    assert_eq!(
        checker.get_widened_literal_type(fresh),
        checker.types.number_type
    );
    // Regular literals do not widen.
    assert_eq!(checker.get_widened_literal_type(regular), regular);
}

#[test]
fn error_type_relates_in_both_directions() {
    let mut checker = engine();
    let error = checker.types.error_type;
    let string = checker.types.string_type;
    assert!(checker.is_type_assignable_to(error, string));
    assert!(checker.is_type_assignable_to(string, error));
}

#[test]
fn undefined_is_assignable_to_void() {
    let mut checker = engine();
    let undefined = checker.types.undefined_type;
    let void = checker.types.void_type;
    assert!(checker.is_type_assignable_to(undefined, void));
}

#[test]
fn tuple_is_assignable_to_array_but_not_conversely() {
    let mut checker = engine();
    let number = checker.types.number_type;
    let tuple = checker.create_tuple_type(
        vec![number, number],
        vec![ElementFlags::REQUIRED, ElementFlags::REQUIRED],
        false,
        None,
    );
    let array = checker.create_array_type(number);
    assert!(checker.is_type_assignable_to(tuple, array));
    assert!(!checker.is_type_assignable_to(array, tuple));
}

#[test]
fn base_constraint_follows_constraint_chains() {
    let mut checker = engine();
    let string = checker.types.string_type;
    let t = checker.create_type_parameter("T", Some(string));
    assert_eq!(checker.get_base_constraint_of_type(t), Some(string));
    // A parameter constrained by a constrained parameter bottoms out at
    // the same concrete bound.
    let u = checker.create_type_parameter("U", Some(t));
    assert_eq!(checker.get_base_constraint_of_type(u), Some(string));
}
