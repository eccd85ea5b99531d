use std::sync::OnceLock;

const DEFAULT_MAX_USE_DEPTH: usize = 16;
const DEFAULT_MAX_REACT_ITERATIONS: usize = 10;
const DEFAULT_MAX_HOOK_DEPTH: usize = 32;
const DEFAULT_MAX_CONCURRENT_CALLS: usize = 4;
const DEFAULT_MAX_TECHNIQUE_CALLS: usize = 256;

fn env_true(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|val| {
        let trimmed = val.trim();
        !trimmed.is_empty() && !matches!(trimmed, "0" | "false" | "FALSE" | "False")
    })
}

fn bool_from_env(key: &str) -> bool {
    env_true(key).unwrap_or(false)
}

fn usize_from_env(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => value,
            _ => {
                tracing::warn!("ignoring invalid {}={:?}; using {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

/// Ceiling on nested `use` statements.
pub fn max_use_depth() -> usize {
    static DEPTH: OnceLock<usize> = OnceLock::new();
    *DEPTH.get_or_init(|| usize_from_env("NUDGE_MAX_USE_DEPTH", DEFAULT_MAX_USE_DEPTH))
}

pub fn max_react_iterations() -> usize {
    static ITERS: OnceLock<usize> = OnceLock::new();
    *ITERS.get_or_init(|| {
        usize_from_env("NUDGE_MAX_REACT_ITERATIONS", DEFAULT_MAX_REACT_ITERATIONS)
    })
}

pub fn max_hook_depth() -> usize {
    static DEPTH: OnceLock<usize> = OnceLock::new();
    *DEPTH.get_or_init(|| usize_from_env("NUDGE_MAX_HOOK_DEPTH", DEFAULT_MAX_HOOK_DEPTH))
}

pub fn max_concurrent_calls() -> usize {
    static CALLS: OnceLock<usize> = OnceLock::new();
    *CALLS.get_or_init(|| {
        usize_from_env("NUDGE_MAX_CONCURRENT_CALLS", DEFAULT_MAX_CONCURRENT_CALLS)
    })
}

/// Ceiling on the provider calls a single technique may plan, such as
/// `generations` or the size of a thought tree.
pub fn max_technique_calls() -> usize {
    static CALLS: OnceLock<usize> = OnceLock::new();
    *CALLS.get_or_init(|| {
        usize_from_env("NUDGE_MAX_TECHNIQUE_CALLS", DEFAULT_MAX_TECHNIQUE_CALLS)
    })
}

pub fn strict_identifiers() -> bool {
    static STRICT: OnceLock<bool> = OnceLock::new();
    *STRICT.get_or_init(|| bool_from_env("NUDGE_STRICT_IDENTIFIERS"))
}
