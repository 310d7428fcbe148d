//! Scenario bindings for the `parfor-syntax` BDD feature file.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::scenario;

use super::TestWorld;

/// Fixture providing the shared BDD world.
#[fixture]
fn world() -> RefCell<TestWorld> {
    super::world()
}

#[scenario(
    path = "tests/features/parfor_syntax.feature",
    name = "Clean loop becomes a parallel for_each"
)]
fn clean_loop(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/parfor_syntax.feature",
    name = "Annotation on a traditional for loop is rejected"
)]
fn traditional_for(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/parfor_syntax.feature",
    name = "Break in the body blocks the rewrite"
)]
fn break_blocks_rewrite(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/parfor_syntax.feature",
    name = "Loops are classified independently"
)]
fn independent_loops(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/parfor_syntax.feature",
    name = "Misplaced annotation does not block a clean loop"
)]
fn misplaced_and_clean(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/parfor_syntax.feature",
    name = "Break inside an inner loop stays local"
)]
fn inner_loop_break(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/parfor_syntax.feature",
    name = "Return inside a lambda stays local"
)]
fn lambda_return(world: RefCell<TestWorld>) {
    drop(world);
}
