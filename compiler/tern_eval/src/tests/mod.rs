//! Evaluator scenario tests.
//!
//! Programs are built node by node with [`harness::Ast`] and run through a
//! real `Interpreter`.


mod method_tests;
