//! Stack safety for the tree-walking evaluator.
//!
//! Statement and expression evaluation recurse once per syntax level and once
//! per interpreted call. Wrapping those recursion points in
//! [`ensure_sufficient_stack`] keeps deeply nested programs (and deep
//! interpreted recursion) from overflowing the host stack.
//!
//! - **Native targets**: grows the stack on demand through `stacker`.
//! - **WASM targets**: passthrough.

/// If less than this much stack remains, grow before recursing (128KB).
///
/// Slightly larger than a typical expression frame chain so a single
/// `eval_stmt -> eval_expr -> call` round-trip never runs out in between checks.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment (1MB).
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below the red zone.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_scope_walk_survives_deep_chains() {
        struct Frame {
            outer: Option<Box<Frame>>,
        }

        fn depth(frame: &Frame) -> usize {
            ensure_sufficient_stack(|| frame.outer.as_deref().map_or(1, |outer| depth(outer) + 1))
        }

        let mut frame = Frame { outer: None };
        for _ in 1..50_000 {
            frame = Frame {
                outer: Some(Box::new(frame)),
            };
        }
        assert_eq!(depth(&frame), 50_000);

        // Unlink iteratively so dropping does not recurse.
        let mut next = frame.outer.take();
        while let Some(mut f) = next {
            next = f.outer.take();
        }
    }

    #[test]
    fn passes_results_through() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Ok(123));
        assert_eq!(result, Ok(123));
    }
}
