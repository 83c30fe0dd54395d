// src/config/defaults.rs
use crate::config::app::{Filter, Kdf};
use crate::consts::{DEFAULT_MIN_ASSISTANT_MESSAGES, KDF_ITERATIONS};

pub fn default_filter() -> Filter {
    Filter {
        min_assistant_messages: DEFAULT_MIN_ASSISTANT_MESSAGES,
    }
}

pub fn default_kdf() -> Kdf {
    Kdf {
        iterations: KDF_ITERATIONS,
    }
}
