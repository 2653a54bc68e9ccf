// Copyplus Transform Layer
// Pure text rewriting applied to clipboard contents

pub mod text;

pub use text::{
    is_ascii_word_char, is_removable_space, transform, transform_opt, TransformOptions,
    CAJ_MARKER,
};
